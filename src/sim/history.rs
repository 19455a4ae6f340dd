/// Completed-run times for the current process.
///
/// Append-only. Entries are seconds rounded to two decimals, the same
/// precision the HUD shows. Survives maze resets; nothing is written to disk.

use std::time::Duration;

#[derive(Clone, Debug, Default)]
pub struct RunHistory {
    runs: Vec<f64>,
}

/// Seconds, rounded half away from zero to two decimal places.
pub fn round_centis(elapsed: Duration) -> f64 {
    (elapsed.as_secs_f64() * 100.0).round() / 100.0
}

impl RunHistory {
    pub fn new() -> Self {
        RunHistory { runs: Vec::new() }
    }

    /// Append a finished run. Returns the stored (rounded) value.
    pub fn record(&mut self, elapsed: Duration) -> f64 {
        let secs = round_centis(elapsed);
        self.runs.push(secs);
        secs
    }

    pub fn len(&self) -> usize {
        self.runs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.runs.is_empty()
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = f64> + ExactSizeIterator + '_ {
        self.runs.iter().copied()
    }

    pub fn last(&self) -> Option<f64> {
        self.runs.last().copied()
    }

    /// Fastest run so far, with its 1-based run number.
    pub fn best(&self) -> Option<(usize, f64)> {
        self.runs
            .iter()
            .copied()
            .enumerate()
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(i, t)| (i + 1, t))
    }
}
