use crate::parallel_processing::{ConfigResult, RunSummary};
use crate::passage::Passage;
use anyhow::Result;
use std::path::Path;
use tokio::io::{AsyncWrite, AsyncWriteExt, BufWriter};

pub const RESULTS_HEADER: &str = "transform\tmaxChar\tpath\tscore\tsize\ttext";

/// One TSV record for a ranked passage
pub fn format_passage(config: &ConfigResult, passage: &Passage) -> String {
    format!(
        "{}\t{}\t{}\t{:.2}\t{}\t{}",
        config.transform(),
        config.max_chars(),
        passage.file_path().display(),
        passage.score(),
        passage.size(),
        passage.text()
    )
}

/// Write ranked passages as TSV in configuration order, skipping
/// configurations that found nothing.
///
/// With `sectioned`, each configuration gets its own banner and header line;
/// otherwise a single header precedes every record.
pub async fn write_results<W: AsyncWrite + Unpin>(writer: W, configs: &[ConfigResult], sectioned: bool) -> Result<()> {
    let mut writer = BufWriter::new(writer);

    if !sectioned {
        writer.write_all(RESULTS_HEADER.as_bytes()).await?;
        writer.write_all(b"\n").await?;
    }

    for config in configs.iter().filter(|c| !c.passages().is_empty()) {
        if sectioned {
            let banner = format!(
                "\n=== Results for {} character passages ({}) ===\n{}\n",
                config.max_chars(),
                config.transform(),
                RESULTS_HEADER
            );
            writer.write_all(banner.as_bytes()).await?;
        }

        for passage in config.passages() {
            writer.write_all(format_passage(config, passage).as_bytes()).await?;
            writer.write_all(b"\n").await?;
        }
    }

    writer.flush().await?;
    Ok(())
}

/// Per-configuration stats block printed after a verbose run
pub fn format_final_stats(configs: &[ConfigResult]) -> String {
    let mut out = String::from("\nFinal Statistics:\n");
    for config in configs {
        out.push_str(&format!(
            "MaxChars {}; Weight {}: {}\n",
            config.max_chars(),
            config.transform(),
            config.stats
        ));
    }
    out
}

/// Persist run statistics as pretty JSON
pub async fn write_run_summary(path: &Path, summary: &RunSummary) -> Result<()> {
    let content = serde_json::to_string_pretty(summary)?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(path, content).await?;
    Ok(())
}
