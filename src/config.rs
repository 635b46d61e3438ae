//! Runtime settings: where the store and the two seed files live.
//!
//! Everything is relative to a single working directory. The seed files
//! always use the conventional names the dataset ships with; only the store
//! location can be overridden from the command line.

use std::path::{Path, PathBuf};

use crate::store::TableKind;

pub const DEFAULT_DATABASE: &str = "digital_transformation.db";
pub const DEFAULT_INDEX_SOURCE: &str = "1999-2023年数字化转型指数结果表(含行业信息).csv";
pub const DEFAULT_KEYWORD_SOURCE: &str = "1999-2023年年报技术关键词统计.csv";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub workdir: PathBuf,
    pub database: PathBuf,
    pub index_source: PathBuf,
    pub keyword_source: PathBuf,
}

impl Settings {
    /// Settings rooted at `workdir` using the conventional file names.
    pub fn in_dir(workdir: impl Into<PathBuf>) -> Self {
        let workdir = workdir.into();
        Self {
            database: workdir.join(DEFAULT_DATABASE),
            index_source: workdir.join(DEFAULT_INDEX_SOURCE),
            keyword_source: workdir.join(DEFAULT_KEYWORD_SOURCE),
            workdir,
        }
    }

    /// Overrides the store location. Relative paths resolve against the
    /// working directory.
    pub fn with_database(mut self, database: &Path) -> Self {
        self.database = self.resolve(database);
        self
    }

    pub fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.workdir.join(path)
        }
    }

    /// Seed files in the order they are ingested.
    pub fn seed_sources(&self) -> [(TableKind, &Path); 2] {
        [
            (TableKind::Index, self.index_source.as_path()),
            (TableKind::Keywords, self.keyword_source.as_path()),
        ]
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self::in_dir(".")
    }
}
