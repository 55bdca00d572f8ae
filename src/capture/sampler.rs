//! Per-frame sampling
//!
//! Smooths the raw per-thread timings reported each tick and keeps the
//! resulting sample sequence until the capture is stopped.

use super::{Capture, FrameSample, LabelSample, Summary};
use crate::config::SamplerConfig;
use std::borrow::Cow;

/// Labels of the per-thread breakdown attached to every sampled frame
pub const BREAKDOWN_LABELS: [&str; 4] = ["Game Thread", "Render Thread", "RHI Thread", "GPU"];

/// Raw timings for one tick, as reported by the engine
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RawReadings {
    pub game_ms: f64,
    pub draw_ms: f64,
    pub rhi_ms: f64,
    pub gpu_ms: f64,
    pub frame_ms: f64,
}

impl RawReadings {
    pub fn new(game_ms: f64, draw_ms: f64, rhi_ms: f64, gpu_ms: f64, frame_ms: f64) -> Self {
        Self {
            game_ms,
            draw_ms,
            rhi_ms,
            gpu_ms,
            frame_ms,
        }
    }

    fn blend(&mut self, raw: &RawReadings, alpha: f64) {
        let keep = 1.0 - alpha;
        self.game_ms = keep * self.game_ms + alpha * raw.game_ms;
        self.draw_ms = keep * self.draw_ms + alpha * raw.draw_ms;
        self.rhi_ms = keep * self.rhi_ms + alpha * raw.rhi_ms;
        self.gpu_ms = keep * self.gpu_ms + alpha * raw.gpu_ms;
        self.frame_ms = keep * self.frame_ms + alpha * raw.frame_ms;
    }
}

/// Records one capture
///
/// One sampler per test node. The EMA accumulators are owned by the instance
/// so independent samplers never share smoothing history.
#[derive(Debug)]
pub struct Sampler {
    config: SamplerConfig,
    /// EMA state
    smoothed: RawReadings,
    samples: Vec<FrameSample>,
    elapsed_seconds: f64,
    sampling: bool,
}

impl Sampler {
    pub fn new(config: SamplerConfig) -> Self {
        Self {
            config,
            smoothed: RawReadings::default(),
            samples: Vec::new(),
            elapsed_seconds: 0.0,
            sampling: false,
        }
    }

    /// Begin a capture: clears previous samples and resets the EMA to zero
    pub fn start(&mut self) {
        assert!(!self.sampling, "Sampler::start called while already sampling");
        self.smoothed = RawReadings::default();
        self.samples.clear();
        self.elapsed_seconds = 0.0;
        self.sampling = true;
        tracing::info!("Sampling started");
    }

    /// Smooth one tick of raw readings and append the resulting sample
    pub fn record_frame(&mut self, raw: RawReadings, elapsed_delta: f64) {
        assert!(self.sampling, "Sampler::record_frame called before start");
        self.smoothed.blend(&raw, self.config.ema_alpha);
        self.elapsed_seconds += elapsed_delta;

        let s = self.smoothed;
        let sample = FrameSample::from_channels(s.frame_ms, s.game_ms, s.draw_ms, s.rhi_ms, s.gpu_ms)
            .with_breakdown(vec![
                LabelSample::new(Cow::Borrowed(BREAKDOWN_LABELS[0]), s.game_ms),
                LabelSample::new(Cow::Borrowed(BREAKDOWN_LABELS[1]), s.draw_ms),
                LabelSample::new(Cow::Borrowed(BREAKDOWN_LABELS[2]), s.rhi_ms),
                LabelSample::new(Cow::Borrowed(BREAKDOWN_LABELS[3]), s.gpu_ms),
            ]);
        tracing::trace!(
            "frame {}: {:.2} ms (game {:.2}, draw {:.2}, rhi {:.2}, gpu {:.2})",
            self.samples.len(),
            s.frame_ms,
            s.game_ms,
            s.draw_ms,
            s.rhi_ms,
            s.gpu_ms
        );
        self.samples.push(sample);
    }

    /// End the capture and reduce the recorded sequence
    ///
    /// The samples stay available through [`Sampler::samples`] until the next
    /// `start`.
    pub fn stop(&mut self) -> Summary {
        assert!(self.sampling, "Sampler::stop called while not sampling");
        self.sampling = false;
        tracing::info!(
            "Sampling stopped: {} frames, {:.2}s",
            self.samples.len(),
            self.elapsed_seconds
        );
        let summary = Summary::compute(&self.samples, self.elapsed_seconds, &self.config);
        summary.log();
        summary
    }

    /// Stop and move the recorded samples into a named capture
    pub fn finish(&mut self, name: impl Into<String>) -> Capture {
        let summary = self.stop();
        let capture = Capture::new(name, std::mem::take(&mut self.samples), summary);
        tracing::info!("Capture '{}' finished", capture.name);
        capture
    }

    pub fn is_sampling(&self) -> bool {
        self.sampling
    }

    pub fn samples(&self) -> &[FrameSample] {
        &self.samples
    }

    pub fn elapsed_seconds(&self) -> f64 {
        self.elapsed_seconds
    }

    pub fn config(&self) -> &SamplerConfig {
        &self.config
    }
}

impl Default for Sampler {
    fn default() -> Self {
        Self::new(SamplerConfig::default())
    }
}
