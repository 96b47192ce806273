use anyhow::{bail, Result};
use campus_import::{db, import};
use clap::Parser;
use std::path::PathBuf;
use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Bulk importer for the campus administration store. Reads the fixed set of
/// CSV sources from a directory and commits them as one atomic snapshot.
#[derive(Parser)]
#[clap(author, version, about)]
struct Cli {
    /// Directory containing the CSV input files.
    #[clap(default_value = "data")]
    data_dir: PathBuf,

    /// SQLite database file to import into.
    #[clap(short, long, default_value = "campus.sqlite3")]
    database: PathBuf,

    /// Emit the summary as JSON instead of the human-readable block.
    #[clap(long)]
    summary_json: bool,

    #[clap(short, long)]
    log_level: Option<String>,
}

fn main() -> Result<()> {
    let args = Cli::parse();

    let level = match args.log_level.as_deref().unwrap_or("info") {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };
    // Logs go to stderr; stdout carries only the summary.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(level.to_string()))
        .with_writer(std::io::stderr)
        .without_time()
        .init();

    if !args.data_dir.exists() {
        bail!("data directory \"{}\" not found", args.data_dir.display());
    }

    let mut conn = db::open_db(&args.database)?;
    let summary = import::run(&mut conn, &args.data_dir)?;

    if args.summary_json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!("{}", summary);
    }
    Ok(())
}
