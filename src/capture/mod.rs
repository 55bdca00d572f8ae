//! Capture data model
//!
//! Frame samples recorded while a camera path plays back, the named captures
//! they end up in, and the store that holds every capture of one analysis
//! session.

pub mod sampler;
pub mod summary;
pub mod synthetic;

pub use sampler::*;
pub use summary::*;
pub use synthetic::*;

use chrono::{DateTime, Local};
use std::borrow::Cow;
use std::sync::Arc;

/// One of the five fixed timing channels recorded per frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[derive(serde::Serialize, serde::Deserialize)]
pub enum Channel {
    Frame,
    Game,
    Draw,
    Rhi,
    Gpu,
}

impl Channel {
    pub const ALL: [Channel; 5] = [
        Channel::Frame,
        Channel::Game,
        Channel::Draw,
        Channel::Rhi,
        Channel::Gpu,
    ];

    /// Channels attributed to a thread (everything except the frame total)
    pub const THREADS: [Channel; 4] = [Channel::Game, Channel::Draw, Channel::Rhi, Channel::Gpu];

    pub fn name(&self) -> &'static str {
        match self {
            Channel::Frame => "Frame",
            Channel::Game => "Game",
            Channel::Draw => "Draw",
            Channel::Rhi => "RHI",
            Channel::Gpu => "GPU",
        }
    }

    /// Read this channel from a sample
    #[inline]
    pub fn value(&self, sample: &FrameSample) -> f64 {
        match self {
            Channel::Frame => sample.frame_ms,
            Channel::Game => sample.game_ms,
            Channel::Draw => sample.draw_ms,
            Channel::Rhi => sample.rhi_ms,
            Channel::Gpu => sample.gpu_ms,
        }
    }

    #[inline]
    fn slot<'a>(&self, sample: &'a mut FrameSample) -> &'a mut f64 {
        match self {
            Channel::Frame => &mut sample.frame_ms,
            Channel::Game => &mut sample.game_ms,
            Channel::Draw => &mut sample.draw_ms,
            Channel::Rhi => &mut sample.rhi_ms,
            Channel::Gpu => &mut sample.gpu_ms,
        }
    }
}

/// A labelled per-thread timing inside one frame
#[derive(Debug, Clone, PartialEq)]
pub struct LabelSample {
    /// Source label, unique within one frame
    pub label: Cow<'static, str>,
    /// Time spent by this source (ms)
    pub time_ms: f64,
}

impl LabelSample {
    pub fn new(label: impl Into<Cow<'static, str>>, time_ms: f64) -> Self {
        Self {
            label: label.into(),
            time_ms,
        }
    }
}

/// One immutable timing record
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameSample {
    pub frame_ms: f64,
    pub game_ms: f64,
    pub draw_ms: f64,
    pub rhi_ms: f64,
    pub gpu_ms: f64,
    /// Optional per-label breakdown (empty when the capture has no detail)
    pub breakdown: Vec<LabelSample>,
}

impl FrameSample {
    /// Sample without a breakdown
    pub fn from_channels(frame_ms: f64, game_ms: f64, draw_ms: f64, rhi_ms: f64, gpu_ms: f64) -> Self {
        Self {
            frame_ms,
            game_ms,
            draw_ms,
            rhi_ms,
            gpu_ms,
            breakdown: Vec::new(),
        }
    }

    /// Sample where every channel holds the same value
    pub fn splat(ms: f64) -> Self {
        Self::from_channels(ms, ms, ms, ms, ms)
    }

    pub fn with_breakdown(mut self, breakdown: Vec<LabelSample>) -> Self {
        debug_assert!(
            labels_unique(&breakdown),
            "breakdown labels must be unique within one frame"
        );
        self.breakdown = breakdown;
        self
    }

    /// Look up a labelled timing
    pub fn label_time(&self, label: &str) -> Option<f64> {
        self.breakdown
            .iter()
            .find(|entry| entry.label == label)
            .map(|entry| entry.time_ms)
    }

    /// Apply `f` to every channel pair of `self` and `other`, keeping the breakdown of `self`
    pub(crate) fn zip_channels(&mut self, other: &FrameSample, mut f: impl FnMut(f64, f64) -> f64) {
        for channel in Channel::ALL {
            let slot = channel.slot(self);
            *slot = f(*slot, channel.value(other));
        }
    }

    /// Channel values only (breakdown dropped)
    pub(crate) fn channels_only(&self) -> Self {
        Self::from_channels(self.frame_ms, self.game_ms, self.draw_ms, self.rhi_ms, self.gpu_ms)
    }
}

fn labels_unique(breakdown: &[LabelSample]) -> bool {
    breakdown
        .iter()
        .enumerate()
        .all(|(i, a)| breakdown[i + 1..].iter().all(|b| a.label != b.label))
}

/// A completed recording session for one path
#[derive(Debug, Clone)]
pub struct Capture {
    /// Path / test node name
    pub name: String,
    /// Samples in temporal order
    pub samples: Vec<FrameSample>,
    /// Aggregate computed when sampling stopped
    pub summary: Summary,
    /// When the capture was finished
    pub recorded_at: DateTime<Local>,
}

impl Capture {
    pub fn new(name: impl Into<String>, samples: Vec<FrameSample>, summary: Summary) -> Self {
        Self {
            name: name.into(),
            samples,
            summary,
            recorded_at: Local::now(),
        }
    }

    /// Build a capture and compute its summary in one go
    pub fn from_samples(name: impl Into<String>, samples: Vec<FrameSample>, elapsed_seconds: f64) -> Self {
        let summary = Summary::compute(&samples, elapsed_seconds, &crate::config::SamplerConfig::default());
        Self::new(name, samples, summary)
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Every distinct breakdown label, in first-seen order
    pub fn labels(&self) -> Vec<String> {
        let mut labels: Vec<String> = Vec::new();
        for sample in &self.samples {
            for entry in &sample.breakdown {
                if !labels.iter().any(|l| *l == entry.label) {
                    labels.push(entry.label.to_string());
                }
            }
        }
        labels
    }
}

/// In-memory captures of one analysis session
///
/// Captures are immutable once stored and handed out as `Arc`s so a graph and
/// a summary panel can read the same data without copying.
#[derive(Debug, Default)]
pub struct CaptureStore {
    captures: Vec<Arc<Capture>>,
}

impl CaptureStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a capture. A capture with the same name is replaced in place.
    pub fn insert(&mut self, capture: Capture) -> Arc<Capture> {
        let capture = Arc::new(capture);
        match self.captures.iter_mut().find(|c| c.name == capture.name) {
            Some(slot) => {
                tracing::info!("Replacing capture '{}'", capture.name);
                *slot = capture.clone();
            }
            None => {
                tracing::info!("Stored capture '{}' ({} frames)", capture.name, capture.len());
                self.captures.push(capture.clone());
            }
        }
        capture
    }

    /// Load a capture for display
    pub fn load(&self, name: &str) -> Option<Arc<Capture>> {
        self.captures.iter().find(|c| c.name == name).cloned()
    }

    pub fn get(&self, index: usize) -> Option<&Arc<Capture>> {
        self.captures.get(index)
    }

    /// Discard a capture
    pub fn remove(&mut self, name: &str) -> Option<Arc<Capture>> {
        let pos = self.captures.iter().position(|c| c.name == name)?;
        Some(self.captures.remove(pos))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.captures.iter().map(|c| c.name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<Capture>> {
        self.captures.iter()
    }

    pub fn len(&self) -> usize {
        self.captures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.captures.is_empty()
    }

    pub fn clear(&mut self) {
        self.captures.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_lookup() {
        let sample = FrameSample::from_channels(16.0, 8.0, 6.0, 3.0, 12.0);
        assert_eq!(Channel::Frame.value(&sample), 16.0);
        assert_eq!(Channel::Game.value(&sample), 8.0);
        assert_eq!(Channel::Draw.value(&sample), 6.0);
        assert_eq!(Channel::Rhi.value(&sample), 3.0);
        assert_eq!(Channel::Gpu.value(&sample), 12.0);
    }

    #[test]
    fn test_label_time() {
        let sample = FrameSample::splat(1.0).with_breakdown(vec![
            LabelSample::new("Game Thread", 4.0),
            LabelSample::new("GPU", 9.5),
        ]);
        assert_eq!(sample.label_time("GPU"), Some(9.5));
        assert_eq!(sample.label_time("RHI Thread"), None);
    }

    #[test]
    fn test_store_replaces_by_name() {
        let mut store = CaptureStore::new();
        store.insert(Capture::from_samples("PathA", vec![FrameSample::splat(10.0)], 0.01));
        store.insert(Capture::from_samples("PathB", vec![FrameSample::splat(20.0)], 0.02));
        store.insert(Capture::from_samples("PathA", vec![FrameSample::splat(30.0); 3], 0.09));

        assert_eq!(store.len(), 2);
        assert_eq!(store.names().collect::<Vec<_>>(), vec!["PathA", "PathB"]);
        assert_eq!(store.load("PathA").unwrap().len(), 3);

        assert!(store.remove("PathB").is_some());
        assert!(store.load("PathB").is_none());
        assert!(store.remove("PathB").is_none());
    }

    #[test]
    fn test_capture_labels_first_seen_order() {
        let samples = vec![
            FrameSample::splat(1.0).with_breakdown(vec![
                LabelSample::new("B", 1.0),
                LabelSample::new("A", 1.0),
            ]),
            FrameSample::splat(1.0).with_breakdown(vec![
                LabelSample::new("A", 2.0),
                LabelSample::new("C", 2.0),
            ]),
        ];
        let capture = Capture::from_samples("Labels", samples, 0.0);
        assert_eq!(capture.labels(), vec!["B", "A", "C"]);
    }
}
