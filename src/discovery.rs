use crate::error::ScanError;
use futures::stream::Stream;
use std::path::{Path, PathBuf};
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tracing::{debug, info};
use walkdir::WalkDir;

/// Extensions scanned by default, compared case-insensitively
pub const DEFAULT_EXTENSIONS: [&str; 2] = ["txt", "md"];

/// Configuration for file discovery behavior
#[derive(Debug, Clone)]
pub struct DiscoveryConfig {
    /// Allowed file extensions, without the leading dot
    pub extensions: Vec<String>,
    /// Paths buffered ahead of the consumers before the walker blocks
    pub queue_capacity: usize,
    pub follow_links: bool,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            extensions: DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
            queue_capacity: 256,
            follow_links: false,
        }
    }
}

impl DiscoveryConfig {
    pub fn matches(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| self.extensions.iter().any(|allowed| allowed.eq_ignore_ascii_case(ext)))
    }
}

/// Walk `root_dir` recursively on a blocking thread and stream every regular
/// file with an allowed extension.
///
/// Entries that cannot be read come through as `Err` items and the walk
/// carries on. The channel is bounded, so a slow consumer stalls the walker.
pub fn discover_files(
    root_dir: impl AsRef<Path>,
    config: DiscoveryConfig,
) -> impl Stream<Item = Result<PathBuf, ScanError>> {
    let root_path = root_dir.as_ref().to_path_buf();
    let (tx, rx) = mpsc::channel(config.queue_capacity.max(1));

    tokio::task::spawn_blocking(move || {
        info!("Starting directory traversal in: {}", root_path.display());
        let traversal_start = std::time::Instant::now();
        let mut file_count = 0usize;

        let walker = WalkDir::new(&root_path).follow_links(config.follow_links);
        for entry in walker {
            let item = match entry {
                Ok(entry) => {
                    if !entry.file_type().is_file() || !config.matches(entry.path()) {
                        continue;
                    }
                    debug!("Found matching file: {}", entry.path().display());
                    file_count += 1;
                    Ok(entry.into_path())
                }
                Err(e) => Err(ScanError::from(e)),
            };

            if tx.blocking_send(item).is_err() {
                debug!("Receiver dropped, stopping discovery");
                return;
            }
        }

        info!(
            "Discovery completed in {}ms, streamed {} files",
            traversal_start.elapsed().as_millis(),
            file_count
        );
    });

    ReceiverStream::new(rx)
}
