//! Training statistics.

use serde::{Deserialize, Serialize};

/// Mean validation error recorded after one epoch
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TrainingStats {
    pub epoch: usize,
    pub error: f64,
}

/// Aggregate view of a training history
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TrainingSummary {
    pub epochs: usize,
    pub first_error: f64,
    pub last_error: f64,
    pub best: TrainingStats,
}

impl TrainingSummary {
    /// Summarize a history; `None` when nothing was recorded
    pub fn from_history(history: &[TrainingStats]) -> Option<Self> {
        let first = history.first()?;
        let last = history.last()?;
        let best = history
            .iter()
            .copied()
            .min_by(|a, b| a.error.total_cmp(&b.error))?;
        Some(Self {
            epochs: history.len(),
            first_error: first.error,
            last_error: last.error,
            best,
        })
    }

    /// Whether the run ended below where it started
    pub fn improved(&self) -> bool {
        self.last_error < self.first_error
    }
}

impl std::fmt::Display for TrainingSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Training Summary ===")?;
        writeln!(f, "Epochs: {}", self.epochs)?;
        writeln!(f, "Error: {:.6} -> {:.6}", self.first_error, self.last_error)?;
        writeln!(f, "Best: {:.6} (epoch {})", self.best.error, self.best.epoch)?;
        Ok(())
    }
}

/// Save a training history to a JSON file
pub fn save_json(history: &[TrainingStats], path: &str) -> std::io::Result<()> {
    let json = serde_json::to_string_pretty(history)?;
    std::fs::write(path, json)
}

/// Load a training history from a JSON file
pub fn load_json(path: &str) -> std::io::Result<Vec<TrainingStats>> {
    let json = std::fs::read_to_string(path)?;
    serde_json::from_str(&json).map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn history() -> Vec<TrainingStats> {
        vec![
            TrainingStats { epoch: 1, error: 0.4 },
            TrainingStats { epoch: 2, error: 0.1 },
            TrainingStats { epoch: 3, error: 0.2 },
        ]
    }

    #[test]
    fn test_summary() {
        let summary = TrainingSummary::from_history(&history()).unwrap();
        assert_eq!(summary.epochs, 3);
        assert_eq!(summary.best.epoch, 2);
        assert!(summary.improved());
        assert!(TrainingSummary::from_history(&[]).is_none());
    }

    #[test]
    fn test_json_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stats.json");
        let path = path.to_str().unwrap();

        save_json(&history(), path).unwrap();
        assert_eq!(load_json(path).unwrap(), history());
    }
}
