//! Capture aggregation
//!
//! Reduces a full sample sequence to the numbers that point at the
//! bottleneck: per-channel mean/min/max, per-label breakdown sorted worst
//! first, and a spike report. Also answers range queries for a selected slice
//! of the timeline.

use super::{Channel, FrameSample};
use crate::config::SamplerConfig;
use std::collections::{BTreeSet, HashMap};

/// Averages at or below this are treated as zero
pub const NEAR_ZERO_MS: f64 = 1e-4;

/// Labels whose rows should be reported. An empty filter reports every label.
pub type LabelFilter = BTreeSet<String>;

/// Avg/min/max of one breakdown label
#[derive(Debug, Clone, PartialEq)]
pub struct LabelStats {
    pub label: String,
    pub avg_ms: f64,
    pub min_ms: f64,
    pub max_ms: f64,
    /// Number of frames that carried this label
    pub count: usize,
}

/// Spike statistics for one channel
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelSpikes {
    pub channel: Channel,
    /// Value above which a frame counts as a spike on this channel
    pub threshold_ms: f64,
    /// Frames flagged as spikes
    pub count: usize,
    /// Share of frames flagged (0..=100)
    pub frames_pct: f64,
    /// Share of total frame time spent in flagged frames (0..=100)
    pub time_pct: f64,
}

/// How often each thread channel runs far above its own average
#[derive(Debug, Clone, PartialEq)]
pub struct SpikeReport {
    pub channels: Vec<ChannelSpikes>,
    pub total_frames: usize,
    pub total_time_ms: f64,
}

impl SpikeReport {
    /// Flag samples that exceed `multiplier * average` (or an absolute
    /// threshold when the average is ~0).
    ///
    /// Each flag attributes the frame's total `frame_ms` to the channel, so
    /// `time_pct` answers "how much wall-clock time did this channel's spikes
    /// dominate". Returns `None` for empty input or zero total time.
    pub fn compute(samples: &[FrameSample], average: &FrameSample, config: &SamplerConfig) -> Option<Self> {
        let total_frames = samples.len();
        let total_time_ms: f64 = samples.iter().map(|s| s.frame_ms).sum();
        if total_frames == 0 || total_time_ms <= 0.0 {
            return None;
        }

        let channels = Channel::THREADS
            .iter()
            .map(|&channel| {
                let avg = channel.value(average).max(0.0);
                let threshold_ms = if avg > config.near_zero {
                    avg * config.spike_multiplier
                } else {
                    config.spike_absolute_ms
                };

                let (count, time_ms) = samples
                    .iter()
                    .filter(|s| channel.value(s) > threshold_ms)
                    .fold((0usize, 0.0f64), |(n, t), s| (n + 1, t + s.frame_ms));

                ChannelSpikes {
                    channel,
                    threshold_ms,
                    count,
                    frames_pct: count as f64 * 100.0 / total_frames as f64,
                    time_pct: time_ms * 100.0 / total_time_ms,
                }
            })
            .collect();

        Some(Self {
            channels,
            total_frames,
            total_time_ms,
        })
    }

    pub fn channel(&self, channel: Channel) -> Option<&ChannelSpikes> {
        self.channels.iter().find(|c| c.channel == channel)
    }
}

/// Whole-capture aggregate, computed once when sampling stops
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Summary {
    pub avg: FrameSample,
    pub min: FrameSample,
    pub max: FrameSample,
    /// Per-label stats, slowest average first
    pub labels: Vec<LabelStats>,
    /// Spike report (`None` when there was nothing to analyse)
    pub spikes: Option<SpikeReport>,
    /// Wall-clock length of the capture
    pub total_elapsed_seconds: f64,
    pub sample_count: usize,
}

impl Summary {
    /// Reduce a full sample sequence. Pure: calling twice gives the same result.
    pub fn compute(samples: &[FrameSample], total_elapsed_seconds: f64, config: &SamplerConfig) -> Self {
        if samples.is_empty() {
            tracing::warn!("No frames recorded; summary left at defaults");
            return Self {
                total_elapsed_seconds,
                ..Default::default()
            };
        }

        let avg = average(samples, config);
        let spikes = SpikeReport::compute(samples, &avg, config);

        Self {
            min: minimum(samples, config),
            max: maximum(samples),
            labels: label_stats(samples, None),
            spikes,
            avg,
            total_elapsed_seconds,
            sample_count: samples.len(),
        }
    }

    /// Stats row for one label
    pub fn label(&self, label: &str) -> Option<&LabelStats> {
        self.labels.iter().find(|l| l.label == label)
    }

    /// The slowest label on average
    pub fn bottleneck(&self) -> Option<&LabelStats> {
        self.labels.first()
    }

    /// Label rows restricted to a filter (empty filter keeps all)
    pub fn filtered_labels<'a>(&'a self, filter: &'a LabelFilter) -> impl Iterator<Item = &'a LabelStats> + 'a {
        self.labels
            .iter()
            .filter(move |l| filter.is_empty() || filter.contains(&l.label))
    }

    pub fn average_fps(&self) -> f64 {
        fps_from_ms(self.avg.frame_ms)
    }

    /// Write the summary to the log
    pub fn log(&self) {
        tracing::info!("{} frames over {:.2}s", self.sample_count, self.total_elapsed_seconds);
        for (tag, s) in [("AVG", &self.avg), ("MAX", &self.max), ("MIN", &self.min)] {
            tracing::info!(
                "{} Frame {:.2} | Game {:.2} | Draw {:.2} | RHI {:.2} | GPU {:.2}",
                tag,
                s.frame_ms,
                s.game_ms,
                s.draw_ms,
                s.rhi_ms,
                s.gpu_ms
            );
        }

        match &self.spikes {
            Some(report) => {
                for c in &report.channels {
                    tracing::info!(
                        "{:<4} spikes (> {:.2} ms): Count={} | Frames%={:.2}% | Time%={:.2}%",
                        c.channel.name(),
                        c.threshold_ms,
                        c.count,
                        c.frames_pct,
                        c.time_pct
                    );
                }
            }
            None => tracing::warn!("Frame data empty or zero total time; skipping spike analysis"),
        }

        if let Some(worst) = self.bottleneck() {
            tracing::info!("Bottleneck: {} (avg {:.2} ms)", worst.label, worst.avg_ms);
        }
    }
}

/// Stats for a selected index range of one capture
#[derive(Debug, Clone, PartialEq)]
pub struct RangeStats {
    /// First index (inclusive, clamped)
    pub start: usize,
    /// Last index (inclusive, clamped)
    pub end: usize,
    pub frame_count: usize,
    pub avg_frame_ms: f64,
    pub min_frame_ms: f64,
    pub max_frame_ms: f64,
    pub avg_fps: f64,
    /// Per-label stats over the range, slowest average first
    pub labels: Vec<LabelStats>,
}

impl RangeStats {
    /// Stats over `start..=end`. The bounds may come in either order and are
    /// clamped to the sequence; `None` only for an empty sequence.
    pub fn compute(samples: &[FrameSample], start: usize, end: usize, filter: Option<&LabelFilter>) -> Option<Self> {
        if samples.is_empty() {
            return None;
        }
        let last = samples.len() - 1;
        let (lo, hi) = if start <= end { (start, end) } else { (end, start) };
        let (lo, hi) = (lo.min(last), hi.min(last));

        let slice = &samples[lo..=hi];
        let mut sum = 0.0;
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        for s in slice {
            sum += s.frame_ms;
            min = min.min(s.frame_ms);
            max = max.max(s.frame_ms);
        }
        let avg = sum / slice.len() as f64;

        Some(Self {
            start: lo,
            end: hi,
            frame_count: slice.len(),
            avg_frame_ms: avg,
            min_frame_ms: min,
            max_frame_ms: max,
            avg_fps: fps_from_ms(avg),
            labels: label_stats(slice, filter),
        })
    }
}

fn fps_from_ms(ms: f64) -> f64 {
    if ms > NEAR_ZERO_MS {
        1000.0 / ms
    } else {
        0.0
    }
}

/// Chunk size used for the two-level average of `len` samples.
///
/// Tiers: below `first_tier_limit` the base chunk; each further factor of 100
/// in length multiplies the chunk by 10.
pub fn chunk_size_for(len: usize, config: &SamplerConfig) -> usize {
    let mut chunk = config.base_chunk_size.max(1);
    let mut limit = config.first_tier_limit.max(1);
    while len >= limit {
        chunk = chunk.saturating_mul(10);
        limit = limit.saturating_mul(100);
        if limit == usize::MAX {
            break;
        }
    }
    chunk
}

/// Per-chunk channel means (the last chunk may be short)
pub fn chunk_means(samples: &[FrameSample], chunk_size: usize) -> Vec<FrameSample> {
    assert!(chunk_size > 0, "chunk size must be positive");
    samples.chunks(chunk_size).map(mean).collect()
}

/// Per-channel mean: direct below the limit, mean of chunk means above it
pub fn average(samples: &[FrameSample], config: &SamplerConfig) -> FrameSample {
    if samples.len() < config.direct_average_limit {
        return mean(samples);
    }
    let chunk_size = chunk_size_for(samples.len(), config);
    tracing::debug!("Chunked average: {} samples, chunk {}", samples.len(), chunk_size);
    mean(&chunk_means(samples, chunk_size))
}

fn mean(samples: &[FrameSample]) -> FrameSample {
    let mut acc = FrameSample::default();
    if samples.is_empty() {
        return acc;
    }
    for s in samples {
        acc.zip_channels(s, |a, v| a + v);
    }
    let n = samples.len() as f64;
    acc.zip_channels(&FrameSample::default(), |a, _| a / n);
    acc
}

/// Per-channel maximum over every sample (never approximated)
pub fn maximum(samples: &[FrameSample]) -> FrameSample {
    let Some(first) = samples.first() else {
        return FrameSample::default();
    };
    let mut max = first.channels_only();
    for s in &samples[1..] {
        max.zip_channels(s, f64::max);
    }
    max
}

/// Per-channel minimum, skipping the warm-up head and frames with no frame time
pub fn minimum(samples: &[FrameSample], config: &SamplerConfig) -> FrameSample {
    if samples.is_empty() {
        return FrameSample::default();
    }
    let start = (samples.len() / config.warmup_divisor.max(1)).min(samples.len() - 1);
    let tail = &samples[start..];
    let seed = tail.iter().find(|s| s.frame_ms > 0.0).unwrap_or(&tail[0]);
    let mut min = seed.channels_only();
    for s in tail.iter().filter(|s| s.frame_ms > 0.0) {
        min.zip_channels(s, f64::min);
    }
    min
}

/// Group breakdown rows by label; slowest average first, ties in first-seen order
pub fn label_stats(samples: &[FrameSample], filter: Option<&LabelFilter>) -> Vec<LabelStats> {
    struct Acc {
        sum: f64,
        count: usize,
        min: f64,
        max: f64,
    }

    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut order: Vec<(&str, Acc)> = Vec::new();

    for s in samples {
        for entry in &s.breakdown {
            let label: &str = &entry.label;
            if let Some(filter) = filter {
                if !filter.is_empty() && !filter.contains(label) {
                    continue;
                }
            }
            let slot = *index.entry(label).or_insert_with(|| {
                order.push((
                    label,
                    Acc {
                        sum: 0.0,
                        count: 0,
                        min: f64::INFINITY,
                        max: f64::NEG_INFINITY,
                    },
                ));
                order.len() - 1
            });
            let acc = &mut order[slot].1;
            acc.sum += entry.time_ms;
            acc.count += 1;
            acc.min = acc.min.min(entry.time_ms);
            acc.max = acc.max.max(entry.time_ms);
        }
    }

    let mut stats: Vec<LabelStats> = order
        .into_iter()
        .map(|(label, acc)| LabelStats {
            label: label.to_string(),
            avg_ms: acc.sum / acc.count as f64,
            min_ms: acc.min,
            max_ms: acc.max,
            count: acc.count,
        })
        .collect();
    stats.sort_by(|a, b| b.avg_ms.total_cmp(&a.avg_ms));
    stats
}
