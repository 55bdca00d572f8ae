//! Non-uniform time axis
//!
//! Frames have different durations, so the graph's X axis is cumulative time
//! rather than sample index.

use crate::capture::FrameSample;

/// Cumulative start time of every sample
///
/// Holds `n + 1` prefix sums: `start(i)` is the time at which sample `i`
/// begins and `start(n)` is the end of the last sample.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TimeAxis {
    times: Vec<f64>,
}

impl TimeAxis {
    pub fn from_samples(samples: &[FrameSample]) -> Self {
        Self::from_durations(samples.iter().map(|s| s.frame_ms))
    }

    pub fn from_durations(durations: impl IntoIterator<Item = f64>) -> Self {
        let mut times = vec![0.0];
        let mut acc = 0.0;
        for ms in durations {
            acc += ms;
            times.push(acc);
        }
        Self { times }
    }

    /// Number of samples on the axis
    pub fn len(&self) -> usize {
        self.times.len().saturating_sub(1)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Start time of sample `index` (`index == len()` gives the end time)
    #[inline]
    pub fn start(&self, index: usize) -> f64 {
        self.times.get(index).copied().unwrap_or(0.0)
    }

    /// Total duration of the capture
    pub fn total(&self) -> f64 {
        self.times.last().copied().unwrap_or(0.0)
    }

    /// Time span `[start(first), start(first + count))` of a window
    pub fn span(&self, first: usize, count: usize) -> (f64, f64) {
        let end = (first + count).min(self.len());
        (self.start(first.min(end)), self.start(end))
    }

    /// Greatest index in `lo..hi` whose start time is `<= target`
    ///
    /// Among samples sharing one start time (zero-length frames) the lowest
    /// index wins. Targets before `start(lo)` give `lo`.
    pub fn index_at(&self, target: f64, lo: usize, hi: usize) -> Option<usize> {
        let hi = hi.min(self.len());
        if lo >= hi {
            return None;
        }
        let starts = &self.times[lo..hi];
        let after = starts.partition_point(|&t| t <= target);
        if after == 0 {
            return Some(lo);
        }
        let t = starts[after - 1];
        let first_equal = starts[..after].partition_point(|&s| s < t);
        Some(lo + first_equal)
    }
}
