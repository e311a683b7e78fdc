use anyhow::{Context, Result};
use clap::Parser;
use passage_scan::discovery::DiscoveryConfig;
use passage_scan::output::{format_final_stats, write_results, write_run_summary};
use passage_scan::reader::ReaderConfig;
use passage_scan::parallel_processing::default_workers;
use passage_scan::{run_passage_scan, BigramWeights, PipelineConfig, WeightTransform, WindowParams};
use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{info, warn, Level};

#[derive(Parser, Debug)]
#[command(name = "passages")]
#[command(about = "Find the highest-scoring bounded-length passages in a directory of text files")]
#[command(version)]
struct Args {
    /// Directory to walk for .txt and .md files
    #[arg(short = 'd', long = "dir")]
    dir: PathBuf,

    /// TSV file with bigram counts
    #[arg(short = 'f', long = "bigram-file", default_value = "sonnets-bigrams.tsv")]
    bigram_file: PathBuf,

    /// Maximum characters in a passage (repeatable: -c 150 -c 300)
    #[arg(short = 'c', long = "max-chars", default_values_t = vec![200])]
    max_chars: Vec<usize>,

    /// Weight transformation (repeatable: -w log1p -w normal)
    #[arg(short = 'w', long = "weight", value_enum, default_values_t = vec![WeightTransform::Raw])]
    transforms: Vec<WeightTransform>,

    /// Number of top-scoring passages kept per size and weight
    #[arg(short = 'n', long = "top-n", default_value_t = 50)]
    top_n: usize,

    /// Output file for results (default: stdout, grouped by configuration)
    #[arg(short = 'o', long = "output")]
    output: Option<PathBuf>,

    /// Print running and final statistics
    #[arg(short = 'v', long)]
    verbose: bool,

    /// Files processed concurrently (default: 1.5x CPU cores)
    #[arg(long)]
    workers: Option<usize>,

    /// Use memory-mapped I/O instead of async buffered reads
    #[arg(long)]
    use_mmap: bool,

    /// Suppress the console progress spinner
    #[arg(long)]
    no_progress: bool,

    /// Write run statistics as JSON to this path
    #[arg(long)]
    stats_out: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let args = Args::parse();

    // stdout carries the result table
    tracing_subscriber::fmt()
        .with_target(false)
        .with_max_level(if args.verbose { Level::DEBUG } else { Level::INFO })
        .with_writer(std::io::stderr)
        .json()
        .init();

    info!(?args, "Parsed CLI arguments");

    if !args.dir.exists() {
        anyhow::bail!("Root directory does not exist: {}", args.dir.display());
    }
    if !args.dir.is_dir() {
        anyhow::bail!("Root path is not a directory: {}", args.dir.display());
    }

    let output_file = match &args.output {
        Some(path) => Some(
            tokio::fs::File::create(path)
                .await
                .with_context(|| format!("Error creating output file {}", path.display()))?,
        ),
        None => None,
    };

    let params_list = build_params(&args).await?;

    let config = PipelineConfig {
        workers: args.workers.unwrap_or_else(default_workers).max(1),
        top_n: args.top_n,
        verbose: args.verbose,
        show_progress: !args.no_progress,
        reader: ReaderConfig {
            use_mmap: args.use_mmap,
            ..Default::default()
        },
        discovery: DiscoveryConfig::default(),
    };

    if args.verbose {
        eprintln!("\nProcessing files and collecting statistics...");
    }

    let report = run_passage_scan(&args.dir, params_list, &config).await;

    if args.verbose {
        eprintln!("{}", format_final_stats(&report.configs));
    }

    match output_file {
        Some(file) => write_results(file, &report.configs, false).await?,
        None => write_results(tokio::io::stdout(), &report.configs, true).await?,
    }

    if let Some(stats_path) = &args.stats_out {
        write_run_summary(stats_path, &report.summary())
            .await
            .with_context(|| format!("Error writing stats to {}", stats_path.display()))?;
    }

    if report.has_errors() {
        warn!("{} errors occurred during the scan", report.errors.len());
        return Ok(ExitCode::FAILURE);
    }
    Ok(ExitCode::SUCCESS)
}

/// One configuration per (transform, size) pair, transforms outermost.
/// Each distinct transform's table is loaded once and shared.
async fn build_params(args: &Args) -> Result<Vec<Arc<WindowParams>>> {
    let mut tables: HashMap<WeightTransform, Arc<BigramWeights>> = HashMap::new();
    let mut seen = HashSet::new();
    let mut params_list = Vec::new();

    for &transform in &args.transforms {
        let weights = match tables.get(&transform) {
            Some(weights) => Arc::clone(weights),
            None => {
                let weights = BigramWeights::load(&args.bigram_file, transform)
                    .await
                    .with_context(|| format!("Error loading bigrams with transform {transform}"))?;
                let weights = Arc::new(weights);
                tables.insert(transform, Arc::clone(&weights));
                weights
            }
        };

        for &max_chars in &args.max_chars {
            if !seen.insert((transform, max_chars)) {
                warn!("Configuration {} chars ({}) given more than once", max_chars, transform);
            }
            params_list.push(Arc::new(WindowParams::new(Arc::clone(&weights), max_chars)));
        }
    }

    Ok(params_list)
}
