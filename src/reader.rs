use crate::error::ScanError;
use memmap2::Mmap;
use std::path::Path;
use tokio::fs::File;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::debug;

/// Configuration for file reading behavior
#[derive(Debug, Clone)]
pub struct ReaderConfig {
    /// Buffer size for async reading (default: 8KB)
    pub buffer_size: usize,
    /// Map the file into memory instead of streaming it through a buffer
    pub use_mmap: bool,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            buffer_size: 8192,
            use_mmap: false,
        }
    }
}

/// Statistics for one file read
#[derive(Debug, Clone)]
pub struct ReadStats {
    pub file_path: String,
    pub words_read: u64,
    pub bytes_read: u64,
    pub duration_ms: u64,
}

/// Reads a text file into its whitespace-delimited words
#[derive(Debug, Clone, Default)]
pub struct FileReader {
    config: ReaderConfig,
}

impl FileReader {
    pub fn new(config: ReaderConfig) -> Self {
        Self { config }
    }

    /// Read every word of a file in order. Fails on open errors and on I/O
    /// errors part way through. Bytes that are not valid UTF-8 decode to
    /// U+FFFD and never fail the read.
    pub async fn read_words<P: AsRef<Path>>(&self, file_path: P) -> Result<(Vec<String>, ReadStats), ScanError> {
        let path = file_path.as_ref();
        let start_time = std::time::Instant::now();
        debug!("Starting read of file: {}", path.display());

        let (words, bytes_read) = if self.config.use_mmap {
            let owned = path.to_path_buf();
            tokio::task::spawn_blocking(move || read_words_mmap(&owned))
                .await
                .map_err(|e| ScanError::Worker {
                    path: path.to_path_buf(),
                    message: e.to_string(),
                })??
        } else {
            self.read_words_buffered(path).await?
        };

        let stats = ReadStats {
            file_path: path.display().to_string(),
            words_read: words.len() as u64,
            bytes_read,
            duration_ms: start_time.elapsed().as_millis() as u64,
        };

        debug!(
            "Read {}: {} words, {} bytes in {}ms",
            path.display(),
            stats.words_read,
            stats.bytes_read,
            stats.duration_ms
        );
        Ok((words, stats))
    }

    async fn read_words_buffered(&self, path: &Path) -> Result<(Vec<String>, u64), ScanError> {
        let file = File::open(path).await.map_err(|source| ScanError::Open {
            path: path.to_path_buf(),
            source,
        })?;

        let mut reader = BufReader::with_capacity(self.config.buffer_size, file);
        let mut line = Vec::new();
        let mut words = Vec::new();
        let mut byte_count = 0u64;

        loop {
            line.clear();
            match reader.read_until(b'\n', &mut line).await {
                Ok(0) => break,
                Ok(n) => {
                    byte_count += n as u64;
                    words.extend(String::from_utf8_lossy(&line).split_whitespace().map(str::to_string));
                }
                Err(source) => {
                    return Err(ScanError::Read {
                        path: path.to_path_buf(),
                        words_read: words.len() as u64,
                        source,
                    });
                }
            }
        }

        Ok((words, byte_count))
    }
}

fn read_words_mmap(path: &Path) -> Result<(Vec<String>, u64), ScanError> {
    let open_error = |source| ScanError::Open {
        path: path.to_path_buf(),
        source,
    };
    let file = std::fs::File::open(path).map_err(open_error)?;
    if file.metadata().map_err(open_error)?.len() == 0 {
        return Ok((Vec::new(), 0));
    }

    // SAFETY: the map is read-only and dropped before returning; a file
    // truncated by another process while mapped is outside what we support
    let mmap = unsafe { Mmap::map(&file) }.map_err(open_error)?;
    let text = String::from_utf8_lossy(&mmap);
    let words = text.split_whitespace().map(str::to_string).collect();
    Ok((words, mmap.len() as u64))
}
