#![allow(dead_code)]

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::{TempDir, tempdir};

use dti_explorer::config::{DEFAULT_INDEX_SOURCE, DEFAULT_KEYWORD_SOURCE, Settings};

pub const INDEX_HEADER: &str = "股票代码,企业名称,年份,数字化转型指数(0-100分),人工智能词频数,大数据词频数,云计算词频数,区块链词频数,数字技术运用词频数,总词频数,行业代码,行业名称";
pub const KEYWORD_HEADER: &str =
    "股票代码,企业名称,年份,人工智能词频数,大数据词频数,云计算词频数,区块链词频数,数字技术运用词频数";

/// One index-table source line with fixed keyword counts summing to 15.
pub fn index_row(code: &str, name: &str, year: &str, index: &str, industry: &str) -> String {
    format!("{code},{name},{year},{index},1,2,3,4,5,15,X01,{industry}")
}

pub fn keyword_row(code: &str, name: &str, year: &str) -> String {
    format!("{code},{name},{year},5,4,3,2,1")
}

/// Scratch directory helper that cleans up files automatically on drop.
pub struct TestWorkspace {
    temp_dir: TempDir,
}

impl TestWorkspace {
    /// Creates a fresh scratch directory for the current test case.
    pub fn new() -> Self {
        Self {
            temp_dir: tempdir().expect("temp dir"),
        }
    }

    /// Returns the root path for all files owned by this workspace.
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Settings rooted at this workspace with the conventional file names.
    pub fn settings(&self) -> Settings {
        Settings::in_dir(self.path())
    }

    /// Writes `contents` into a file under the workspace and returns the path.
    pub fn write(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.temp_dir.path().join(name);
        let mut file = File::create(&path).expect("create temp file");
        file.write_all(contents.as_bytes())
            .expect("write temp file contents");
        path
    }

    /// Writes an index-table source with the given data lines.
    pub fn write_index_source(&self, name: &str, rows: &[String]) -> PathBuf {
        self.write(name, &with_header(INDEX_HEADER, rows))
    }

    pub fn write_keyword_source(&self, name: &str, rows: &[String]) -> PathBuf {
        self.write(name, &with_header(KEYWORD_HEADER, rows))
    }

    /// Places both seed files under their conventional names.
    pub fn write_seed_sources(&self, index_rows: &[String], keyword_rows: &[String]) {
        self.write_index_source(DEFAULT_INDEX_SOURCE, index_rows);
        self.write_keyword_source(DEFAULT_KEYWORD_SOURCE, keyword_rows);
    }
}

fn with_header(header: &str, rows: &[String]) -> String {
    let mut contents = String::from(header);
    contents.push('\n');
    for row in rows {
        contents.push_str(row);
        contents.push('\n');
    }
    contents
}
