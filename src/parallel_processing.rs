// Worker pool feeding files through the window scorer and a single
// aggregator that owns every ranker and stats accumulator

use crate::bigrams::count_bigrams_into;
use crate::discovery::{discover_files, DiscoveryConfig};
use crate::error::ScanError;
use crate::passage::{find_best_passages, Passage};
use crate::ranking::PassageRanker;
use crate::reader::{FileReader, ReadStats, ReaderConfig};
use crate::stats::RunningStats;
use crate::weights::WeightTransform;
use crate::window::WindowParams;
use futures::stream::StreamExt;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use std::collections::HashMap;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Settings for a parallel scan
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Files processed concurrently
    pub workers: usize,
    /// Passages kept per configuration
    pub top_n: usize,
    /// Log running stats every 10 files per configuration
    pub verbose: bool,
    pub show_progress: bool,
    pub reader: ReaderConfig,
    pub discovery: DiscoveryConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            workers: default_workers(),
            top_n: 50,
            verbose: false,
            show_progress: false,
            reader: ReaderConfig::default(),
            discovery: DiscoveryConfig::default(),
        }
    }
}

/// One and a half workers per CPU core
pub fn default_workers() -> usize {
    (num_cpus::get() * 3 / 2).max(1)
}

/// Per-file result handed from a worker to the aggregator
#[derive(Debug)]
pub struct FileOutcome {
    pub path: PathBuf,
    /// One slot per configuration, aligned with the params list
    pub passages: Vec<Option<Passage>>,
    pub read_stats: ReadStats,
}

/// Ranked passages and stats for one configuration
#[derive(Debug, Clone)]
pub struct ConfigResult {
    pub params: Arc<WindowParams>,
    pub ranker: PassageRanker<Passage>,
    pub stats: RunningStats,
}

impl ConfigResult {
    pub fn transform(&self) -> WeightTransform {
        self.params.weights().transform()
    }

    pub fn max_chars(&self) -> usize {
        self.params.max_chars()
    }

    pub fn passages(&self) -> &[Passage] {
        self.ranker.entries()
    }
}

/// Single consumer of worker results. Configurations are identified by their
/// index in the params list, never by `WindowParams::id`.
#[derive(Debug)]
pub struct Aggregator {
    results: Vec<ConfigResult>,
    errors: Vec<ScanError>,
    files_scanned: u64,
    words_read: u64,
    bytes_read: u64,
    verbose: bool,
}

impl Aggregator {
    pub fn new(params_list: &[Arc<WindowParams>], top_n: usize, verbose: bool) -> Self {
        let results = params_list
            .iter()
            .map(|params| ConfigResult {
                params: Arc::clone(params),
                ranker: PassageRanker::new(top_n),
                stats: RunningStats::new(),
            })
            .collect();

        Self {
            results,
            errors: Vec::new(),
            files_scanned: 0,
            words_read: 0,
            bytes_read: 0,
            verbose,
        }
    }

    /// Fold one file's best passages into the rankings and stats
    pub fn record_file(&mut self, outcome: FileOutcome) {
        self.files_scanned += 1;
        self.words_read += outcome.read_stats.words_read;
        self.bytes_read += outcome.read_stats.bytes_read;
        debug!(
            "Recorded {}: {} words, {} bytes in {}ms",
            outcome.path.display(),
            outcome.read_stats.words_read,
            outcome.read_stats.bytes_read,
            outcome.read_stats.duration_ms
        );

        for (result, passage) in self.results.iter_mut().zip(outcome.passages) {
            let Some(passage) = passage else {
                continue;
            };

            let score = passage.score();
            let position = result.ranker.insert(passage);
            result.stats.update(score);

            if let (Some(0), Some(best)) = (position, result.ranker.best()) {
                info!(
                    "New best passage for {} characters ({}) from {}: {}",
                    result.params.max_chars(),
                    result.transform(),
                    best.file_path().display(),
                    best.text()
                );
            }

            if self.verbose && result.stats.files_processed % 10 == 0 {
                info!(
                    "MaxChars {}; Weight {}: {}",
                    result.params.max_chars(),
                    result.transform(),
                    result.stats
                );
            }
        }
    }

    /// Recoverable errors are reported as they arrive and kept for the exit status
    pub fn record_error(&mut self, error: ScanError) {
        warn!("Error: {}", error);
        self.errors.push(error);
    }

    pub fn finish(self) -> ScanReport {
        ScanReport {
            configs: self.results,
            errors: self.errors,
            files_scanned: self.files_scanned,
            words_read: self.words_read,
            bytes_read: self.bytes_read,
        }
    }
}

/// Everything a passage scan produced, including partial results
#[derive(Debug)]
pub struct ScanReport {
    pub configs: Vec<ConfigResult>,
    pub errors: Vec<ScanError>,
    pub files_scanned: u64,
    pub words_read: u64,
    pub bytes_read: u64,
}

impl ScanReport {
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn summary(&self) -> RunSummary {
        RunSummary {
            files_scanned: self.files_scanned,
            words_read: self.words_read,
            bytes_read: self.bytes_read,
            files_failed: self
                .errors
                .iter()
                .filter(|e| !matches!(e, ScanError::Walk { .. }))
                .count() as u64,
            errors: self.errors.iter().map(|e| e.to_string()).collect(),
            configurations: self
                .configs
                .iter()
                .map(|c| ConfigSummary {
                    transform: c.transform(),
                    max_chars: c.max_chars(),
                    passages_kept: c.ranker.len(),
                    std_dev: c.stats.std_dev(),
                    stats: c.stats.clone(),
                })
                .collect(),
        }
    }
}

/// Serializable run statistics for `--stats-out`
#[derive(Serialize, Debug, Clone)]
pub struct RunSummary {
    pub files_scanned: u64,
    pub words_read: u64,
    pub bytes_read: u64,
    pub files_failed: u64,
    pub errors: Vec<String>,
    pub configurations: Vec<ConfigSummary>,
}

#[derive(Serialize, Debug, Clone)]
pub struct ConfigSummary {
    pub transform: WeightTransform,
    pub max_chars: usize,
    pub passages_kept: usize,
    pub std_dev: f64,
    pub stats: RunningStats,
}

/// Read one file and find its best passage for every configuration
pub async fn scan_file(
    path: PathBuf,
    params_list: Arc<Vec<Arc<WindowParams>>>,
    reader: FileReader,
) -> Result<FileOutcome, ScanError> {
    let (words, read_stats) = reader.read_words(&path).await?;

    // scoring is CPU bound; keep it off the async worker threads
    let scoring_path = path.clone();
    let passages = tokio::task::spawn_blocking(move || find_best_passages(words, &params_list, &scoring_path))
        .await
        .map_err(|e| ScanError::Worker {
            path: path.clone(),
            message: e.to_string(),
        })?;

    Ok(FileOutcome {
        path,
        passages,
        read_stats,
    })
}

fn progress_bar(enabled: bool, label: &'static str) -> ProgressBar {
    if !enabled {
        return ProgressBar::hidden();
    }
    let bar = ProgressBar::new_spinner();
    let style = ProgressStyle::with_template("{spinner} {pos} files {msg} [{elapsed}]")
        .unwrap_or_else(|_| ProgressStyle::default_spinner());
    bar.set_style(style);
    bar.set_message(label);
    bar.enable_steady_tick(Duration::from_millis(120));
    bar
}

/// Discover files under `root_dir` and push each through `work` on its own
/// task, at most `workers` at a time. Outcomes reach `sink` one by one on the
/// calling task, in completion order.
async fn run_pool<T, W, Fut, S>(
    root_dir: &Path,
    discovery: DiscoveryConfig,
    workers: usize,
    work: W,
    mut sink: S,
) where
    T: Send + 'static,
    W: Fn(PathBuf) -> Fut,
    Fut: Future<Output = Result<T, ScanError>> + Send + 'static,
    S: FnMut(Result<T, ScanError>),
{
    let mut outcomes = discover_files(root_dir, discovery)
        .map(|item| {
            let task = item.map(|path| (path.clone(), tokio::spawn(work(path))));
            async move {
                match task {
                    Ok((path, handle)) => handle.await.unwrap_or_else(|e| {
                        Err(ScanError::Worker {
                            path,
                            message: e.to_string(),
                        })
                    }),
                    Err(e) => Err(e),
                }
            }
        })
        .buffer_unordered(workers.max(1));

    while let Some(outcome) = outcomes.next().await {
        sink(outcome);
    }
}

/// Scan every text file under `root_dir` against every configuration.
///
/// Per-file and walk errors are recorded in the report and never stop the
/// run; the report always carries whatever passages were found.
pub async fn run_passage_scan(
    root_dir: impl AsRef<Path>,
    params_list: Vec<Arc<WindowParams>>,
    config: &PipelineConfig,
) -> ScanReport {
    let root_dir = root_dir.as_ref();
    let start = std::time::Instant::now();
    info!(
        "Scanning {} with {} configurations and {} workers",
        root_dir.display(),
        params_list.len(),
        config.workers
    );

    let mut aggregator = Aggregator::new(&params_list, config.top_n, config.verbose);
    let params_list = Arc::new(params_list);
    let reader = FileReader::new(config.reader.clone());
    let progress = progress_bar(config.show_progress, "scanned");

    run_pool(
        root_dir,
        config.discovery.clone(),
        config.workers,
        |path| scan_file(path, Arc::clone(&params_list), reader.clone()),
        |outcome| match outcome {
            Ok(file) => {
                progress.inc(1);
                aggregator.record_file(file);
            }
            Err(e) => aggregator.record_error(e),
        },
    )
    .await;

    progress.finish_and_clear();
    let report = aggregator.finish();
    info!(
        "Scan completed in {}ms: {} files scanned, {} errors",
        start.elapsed().as_millis(),
        report.files_scanned,
        report.errors.len()
    );
    report
}

/// Merged bigram counts over a directory tree
#[derive(Debug, Default)]
pub struct BigramCountReport {
    pub counts: HashMap<String, u64>,
    pub errors: Vec<ScanError>,
    pub files_scanned: u64,
}

impl BigramCountReport {
    /// Counts by descending frequency, ties broken by bigram
    pub fn sorted(&self) -> Vec<(&str, u64)> {
        let mut entries: Vec<(&str, u64)> = self.counts.iter().map(|(b, &c)| (b.as_str(), c)).collect();
        entries.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        entries
    }
}

/// Count bigrams in every text file under `root_dir`, one file per worker
pub async fn run_bigram_count(
    root_dir: impl AsRef<Path>,
    workers: usize,
    reader_config: ReaderConfig,
    discovery: DiscoveryConfig,
    show_progress: bool,
) -> BigramCountReport {
    let reader = FileReader::new(reader_config);
    let progress = progress_bar(show_progress, "counted");
    let mut report = BigramCountReport::default();

    run_pool(
        root_dir.as_ref(),
        discovery,
        workers,
        |path| {
            let reader = reader.clone();
            async move {
                let (words, _) = reader.read_words(&path).await?;
                let mut counts = HashMap::new();
                count_bigrams_into(&words, &mut counts);
                Ok::<_, ScanError>(counts)
            }
        },
        |outcome| match outcome {
            Ok(counts) => {
                progress.inc(1);
                report.files_scanned += 1;
                for (bigram, count) in counts {
                    *report.counts.entry(bigram).or_insert(0) += count;
                }
            }
            Err(e) => {
                warn!("Error: {}", e);
                report.errors.push(e);
            }
        },
    )
    .await;

    progress.finish_and_clear();
    report
}
