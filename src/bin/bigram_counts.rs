// Bigram counting utility
// Walks a directory of text files and prints `bigram\tcount` records sorted by
// descending count, the format the passage scanner loads as its weight table

use anyhow::{Context, Result};
use clap::Parser;
use passage_scan::discovery::DiscoveryConfig;
use passage_scan::reader::ReaderConfig;
use passage_scan::run_bigram_count;
use std::path::PathBuf;
use std::process::ExitCode;
use tokio::io::{AsyncWriteExt, BufWriter};
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(name = "bigram-counts")]
#[command(about = "Count word bigrams across a directory of text files")]
#[command(version)]
struct Args {
    /// Directory to walk for .txt and .md files
    #[arg(short = 'd', long = "dir")]
    dir: PathBuf,

    /// Output file (default: stdout)
    #[arg(short = 'o', long = "output")]
    output: Option<PathBuf>,

    /// Files processed concurrently (default: CPU cores)
    #[arg(long)]
    workers: Option<usize>,

    /// Use memory-mapped I/O instead of async buffered reads
    #[arg(long)]
    use_mmap: bool,

    /// Suppress the console progress spinner
    #[arg(long)]
    no_progress: bool,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_target(false)
        .with_writer(std::io::stderr)
        .json()
        .init();

    let args = Args::parse();
    info!(?args, "Parsed CLI arguments");

    if !args.dir.is_dir() {
        anyhow::bail!("Root path is not a directory: {}", args.dir.display());
    }

    let report = run_bigram_count(
        &args.dir,
        args.workers.unwrap_or_else(|| num_cpus::get().max(1)).max(1),
        ReaderConfig {
            use_mmap: args.use_mmap,
            ..Default::default()
        },
        DiscoveryConfig::default(),
        !args.no_progress,
    )
    .await;

    let mut lines = String::new();
    for (bigram, count) in report.sorted() {
        lines.push_str(&format!("{bigram}\t{count}\n"));
    }

    match &args.output {
        Some(path) => tokio::fs::write(path, lines)
            .await
            .with_context(|| format!("Error writing {}", path.display()))?,
        None => {
            let mut stdout = BufWriter::new(tokio::io::stdout());
            stdout.write_all(lines.as_bytes()).await?;
            stdout.flush().await?;
        }
    }

    info!(
        "Counted {} distinct bigrams in {} files",
        report.counts.len(),
        report.files_scanned
    );

    if !report.errors.is_empty() {
        warn!("{} errors occurred while counting", report.errors.len());
        return Ok(ExitCode::FAILURE);
    }
    Ok(ExitCode::SUCCESS)
}
