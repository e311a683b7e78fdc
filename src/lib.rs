pub mod bigrams;
pub mod discovery;
pub mod error;
pub mod output;
pub mod parallel_processing;
pub mod passage;
pub mod ranking;
pub mod reader;
pub mod stats;
pub mod weights;
pub mod window;

// Re-export the scoring core for convenient access
pub use bigrams::{extract_bigrams, normalize_word};
pub use error::{ScanError, WeightsError};
pub use passage::{find_best_passages, Passage};
pub use ranking::{insert_sorted, PassageRanker, Scored};
pub use stats::RunningStats;
pub use weights::{BigramWeights, WeightTransform};
pub use window::{Window, WindowParams};

// Re-export the pipeline entry points used by the binaries and benchmarks
pub use parallel_processing::{
    run_bigram_count, run_passage_scan, PipelineConfig, ScanReport,
};
