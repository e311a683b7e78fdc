use serde::Serialize;
use std::fmt;

/// Online score statistics for one configuration, one update per file.
/// Mean and variance follow Welford's algorithm.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct RunningStats {
    pub files_processed: u64,
    pub max_score: f64,
    pub min_score: f64,
    pub sum: f64,
    pub mean: f64,
    /// Sum of squared deviations from the running mean
    pub m2: f64,
}

impl Default for RunningStats {
    fn default() -> Self {
        Self::new()
    }
}

impl RunningStats {
    pub fn new() -> Self {
        Self {
            files_processed: 0,
            max_score: f64::NEG_INFINITY,
            min_score: f64::INFINITY,
            sum: 0.0,
            mean: 0.0,
            m2: 0.0,
        }
    }

    pub fn update(&mut self, score: f64) {
        self.files_processed += 1;

        if score > self.max_score {
            self.max_score = score;
        }
        if score < self.min_score {
            self.min_score = score;
        }

        self.sum += score;

        let delta = score - self.mean;
        self.mean += delta / self.files_processed as f64;
        let delta2 = score - self.mean;
        self.m2 += delta * delta2;
    }

    /// Population variance of the scores seen
    pub fn variance(&self) -> f64 {
        if self.files_processed < 2 {
            return 0.0;
        }
        self.m2 / self.files_processed as f64
    }

    pub fn std_dev(&self) -> f64 {
        self.variance().sqrt()
    }
}

impl fmt::Display for RunningStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Files: {} | Max Score: {:.2} | Min Score: {:.2} | Mean: {:.2} | StdDev: {:.2}",
            self.files_processed,
            self.max_score,
            self.min_score,
            self.mean,
            self.std_dev()
        )
    }
}
