pub mod cli;
pub mod config;
pub mod dataset;
pub mod error;
pub mod export;
pub mod ingest;
pub mod io_utils;
pub mod logging;
pub mod mapper;
pub mod pipeline;
pub mod query;
pub mod record;
pub mod report;
pub mod seed;
pub mod store;
pub mod table;

use anyhow::{Context, Result, anyhow, bail};
use clap::Parser;
use log::{debug, info};

use crate::{
    cli::{Cli, Commands, SourceArgs},
    config::Settings,
    ingest::IngestOptions,
    pipeline::{FilterSpec, YearRange},
    seed::{SeedOutcome, ensure_schema_and_seed},
    store::ConflictPolicy,
};

pub fn run() -> Result<()> {
    logging::init(Vec::new());
    let cli = Cli::parse();
    let mut settings = Settings::in_dir(&cli.workdir);
    if let Some(database) = &cli.database {
        settings = settings.with_database(database);
    }
    debug!("Settings: {settings:?}");
    match cli.command {
        Commands::Init(args) => handle_init(&settings, &args.source),
        Commands::Ingest(args) => handle_ingest(&settings, &args),
        Commands::Overview => handle_overview(&settings),
        Commands::Explore(args) => handle_explore(&settings, &args),
    }
}

fn ingest_options(source: &SourceArgs, policy: ConflictPolicy) -> Result<IngestOptions> {
    Ok(IngestOptions {
        delimiter: source.delimiter,
        encoding: io_utils::resolve_encoding(source.input_encoding.as_deref())?,
        policy,
    })
}

fn handle_init(settings: &Settings, source: &SourceArgs) -> Result<()> {
    let options = ingest_options(source, ConflictPolicy::Replace)?;
    match ensure_schema_and_seed(settings, &options) {
        SeedOutcome::AlreadyPopulated { rows } => {
            println!("Store already holds {rows} row(s); nothing imported.");
        }
        SeedOutcome::Seeded(seeds) => {
            for seed in seeds {
                match seed.report {
                    Some(report) => println!(
                        "{}: {} written, {} skipped ({:?})",
                        seed.table.table_name(),
                        report.rows_written,
                        report.rows_skipped,
                        seed.source
                    ),
                    None => println!("{}: not seeded ({:?})", seed.table.table_name(), seed.source),
                }
            }
        }
        SeedOutcome::Failed => bail!("Initializing {:?} failed", settings.database),
    }
    Ok(())
}

fn handle_ingest(settings: &Settings, args: &cli::IngestArgs) -> Result<()> {
    let options = ingest_options(&args.source, args.on_conflict)?;
    let input = settings.resolve(&args.input);
    info!(
        "Ingesting '{}' into '{}' using delimiter '{}'",
        input.display(),
        args.table.table_name(),
        printable_delimiter(io_utils::resolve_input_delimiter(&input, options.delimiter))
    );
    let report = ingest::ingest(&settings.database, &input, args.table, &options)
        .ok_or_else(|| anyhow!("Ingestion of {input:?} failed"))?;
    println!(
        "{}: {} read, {} written, {} skipped",
        args.table.table_name(),
        report.rows_read,
        report.rows_written,
        report.rows_skipped
    );
    Ok(())
}

fn handle_overview(settings: &Settings) -> Result<()> {
    let Some(dataset) = load_dataset(settings) else {
        println!("{}", report::NO_DATA_MESSAGE);
        return Ok(());
    };
    print!("{}", report::render_overview(&dataset.overview()));
    Ok(())
}

fn handle_explore(settings: &Settings, args: &cli::ExploreArgs) -> Result<()> {
    let Some(dataset) = load_dataset(settings) else {
        println!("{}", report::NO_DATA_MESSAGE);
        return Ok(());
    };

    let year_range = YearRange::of(&dataset).narrow(args.from, args.to);
    let filter = FilterSpec::unrestricted(&dataset)
        .with_year_range(year_range)
        .with_industries(args.industries.iter().cloned())
        .with_name_substring(args.company.clone().unwrap_or_default());
    debug!("Filter: {filter:?}");
    let view = pipeline::apply(&dataset, &filter);
    info!(
        "{} of {} row(s) match the active filters",
        view.rows.len(),
        dataset.len()
    );

    if args.json {
        let json = serde_json::to_string_pretty(&view).context("Serializing filtered view")?;
        println!("{json}");
    } else {
        print!("{}", report::render_view(&view, args.limit));
    }

    if let Some(path) = &args.export {
        if view.is_empty() {
            info!("Nothing to export");
            return Ok(());
        }
        let path = match path {
            Some(path) => settings.resolve(path),
            None => settings.workdir.join(export::default_file_name(year_range)),
        };
        export::export_rows(&path, &view.rows)?;
    }
    Ok(())
}

/// Seeds on first run, then loads the full dataset once for this process.
fn load_dataset(settings: &Settings) -> Option<dataset::Dataset> {
    if !ensure_schema_and_seed(settings, &IngestOptions::default()).is_ok() {
        return None;
    }
    query::fetch_all(&settings.database)
}

pub(crate) fn printable_delimiter(delimiter: u8) -> String {
    match delimiter {
        b',' => ",".to_string(),
        b'\t' => "\\t".to_string(),
        b'\n' => "\\n".to_string(),
        other => (other as char).to_string(),
    }
}
