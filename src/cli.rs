use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::store::{ConflictPolicy, TableKind};

#[derive(Debug, Parser)]
#[command(
    author,
    version,
    about = "Browse and summarise digital transformation index scores",
    long_about = None
)]
pub struct Cli {
    /// Directory holding the store and the seed CSV files
    #[arg(long, global = true, default_value = ".")]
    pub workdir: PathBuf,
    /// Store file (relative paths resolve against --workdir)
    #[arg(long, global = true)]
    pub database: Option<PathBuf>,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Create the tables and seed them from the source files on first run
    Init(InitArgs),
    /// Upsert one source file into a table
    Ingest(IngestArgs),
    /// Print summary figures for the loaded dataset
    Overview,
    /// Filter the dataset and print the table and industry aggregates
    Explore(ExploreArgs),
}

#[derive(Debug, Args, Default)]
pub struct SourceArgs {
    /// CSV delimiter character (supports ',', 'tab', ';', '|')
    #[arg(long, value_parser = parse_delimiter)]
    pub delimiter: Option<u8>,
    /// Character encoding of the input file (defaults to utf-8)
    #[arg(long = "input-encoding")]
    pub input_encoding: Option<String>,
}

#[derive(Debug, Args)]
pub struct InitArgs {
    #[command(flatten)]
    pub source: SourceArgs,
}

#[derive(Debug, Args)]
pub struct IngestArgs {
    /// Source CSV file
    #[arg(short = 'i', long = "input")]
    pub input: PathBuf,
    /// Target table
    #[arg(short, long, value_enum)]
    pub table: TableKind,
    /// How rows sharing (stock code, year) with a stored row are handled
    #[arg(long = "on-conflict", value_enum, default_value_t = ConflictPolicy::Replace)]
    pub on_conflict: ConflictPolicy,
    #[command(flatten)]
    pub source: SourceArgs,
}

#[derive(Debug, Args, Default)]
pub struct ExploreArgs {
    /// First year to include (defaults to the earliest year in the data)
    #[arg(long = "from")]
    pub from: Option<i64>,
    /// Last year to include (defaults to the latest year in the data)
    #[arg(long = "to")]
    pub to: Option<i64>,
    /// Industry name to include; repeat or comma-separate for several
    #[arg(long = "industry", action = clap::ArgAction::Append, value_delimiter = ',')]
    pub industries: Vec<String>,
    /// Case-insensitive company name substring
    #[arg(long = "company")]
    pub company: Option<String>,
    /// Maximum number of table rows to print (0 prints all)
    #[arg(long, default_value_t = 50)]
    pub limit: usize,
    /// Emit the filtered view as JSON instead of text tables
    #[arg(long)]
    pub json: bool,
    /// Write the filtered rows to CSV; without a value the file is named after the year range
    #[arg(long)]
    pub export: Option<Option<PathBuf>>,
}

pub fn parse_delimiter(value: &str) -> Result<u8, String> {
    match value {
        "tab" | "\t" => Ok(b'\t'),
        "comma" | "," => Ok(b','),
        "|" | "pipe" => Ok(b'|'),
        ";" | "semicolon" => Ok(b';'),
        other => {
            let mut chars = other.chars();
            let first = chars
                .next()
                .ok_or_else(|| "Delimiter cannot be empty".to_string())?;
            if chars.next().is_some() {
                return Err("Delimiter must be a single character".to_string());
            }
            if !first.is_ascii() {
                return Err("Delimiter must be ASCII".to_string());
            }
            Ok(first as u8)
        }
    }
}
