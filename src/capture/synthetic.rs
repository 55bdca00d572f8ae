//! Synthetic workload
//!
//! Deterministic, noise-driven per-thread timings used to drive a [`Sampler`]
//! without an engine attached (preview runs and tests).

use super::{Capture, RawReadings, Sampler};
use crate::config::SamplerConfig;
use noise::{NoiseFn, Perlin};

/// Noise-driven stand-in for an engine running a camera path
pub struct SyntheticWorkload {
    perlin: Perlin,
    seed: u32,
    frame: u64,
    /// Added to every thread's baseline (ms), models a heavier scene
    base_load_ms: f64,
    /// Roughly one frame in this many gets a hitch
    spike_period: u64,
}

impl SyntheticWorkload {
    pub fn new(seed: u32) -> Self {
        Self {
            perlin: Perlin::new(seed),
            seed,
            frame: 0,
            base_load_ms: 0.0,
            spike_period: 240,
        }
    }

    pub fn with_base_load(mut self, base_load_ms: f64) -> Self {
        self.base_load_ms = base_load_ms.max(0.0);
        self
    }

    pub fn with_spike_period(mut self, spike_period: u64) -> Self {
        self.spike_period = spike_period.max(1);
        self
    }

    /// Raw readings for the next tick
    pub fn next_readings(&mut self) -> RawReadings {
        let t = self.frame as f64 * 0.013;
        let wave = |offset: f64, scale: f64| self.perlin.get([t * scale, offset]);

        let mut game = 6.0 + self.base_load_ms + 3.0 * wave(0.37, 1.0);
        let draw = 5.0 + self.base_load_ms * 0.5 + 2.0 * wave(1.71, 0.8);
        let rhi = 1.5 + 0.6 * wave(2.93, 1.6);
        let mut gpu = 9.0 + self.base_load_ms + 4.0 * wave(4.19, 0.5);

        // Hitches alternate between a game-thread stall and a GPU stall
        let hash = self.frame.wrapping_mul(2_654_435_761) ^ u64::from(self.seed);
        if hash % self.spike_period == 0 {
            if (hash / self.spike_period) % 2 == 0 {
                game += 25.0;
            } else {
                gpu += 18.0;
            }
        }

        let (game, draw, rhi, gpu) = (game.max(0.0), draw.max(0.0), rhi.max(0.0), gpu.max(0.0));
        let frame = game.max(draw).max(rhi).max(gpu) + 0.4;
        self.frame += 1;

        RawReadings::new(game, draw, rhi, gpu, frame)
    }

    /// Record `frames` ticks of this workload into a new capture
    pub fn record(&mut self, name: &str, frames: usize, config: &SamplerConfig) -> Capture {
        let mut sampler = Sampler::new(config.clone());
        sampler.start();
        for _ in 0..frames {
            let raw = self.next_readings();
            sampler.record_frame(raw, raw.frame_ms / 1000.0);
        }
        sampler.finish(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deterministic_for_seed() {
        let mut a = SyntheticWorkload::new(7);
        let mut b = SyntheticWorkload::new(7);
        for _ in 0..100 {
            assert_eq!(a.next_readings(), b.next_readings());
        }
    }

    #[test]
    fn test_readings_are_non_negative() {
        let mut workload = SyntheticWorkload::new(3).with_spike_period(10);
        for _ in 0..1000 {
            let r = workload.next_readings();
            assert!(r.game_ms >= 0.0 && r.draw_ms >= 0.0 && r.rhi_ms >= 0.0 && r.gpu_ms >= 0.0);
            assert!(r.frame_ms >= r.game_ms.max(r.gpu_ms));
        }
    }

    #[test]
    fn test_record_produces_capture() {
        let mut workload = SyntheticWorkload::new(1337).with_base_load(2.0);
        let capture = workload.record("Harbor Sweep", 500, &SamplerConfig::default());

        assert_eq!(capture.name, "Harbor Sweep");
        assert_eq!(capture.len(), 500);
        assert!(capture.summary.avg.frame_ms > 0.0);
        assert!(capture.summary.max.frame_ms >= capture.summary.avg.frame_ms);
        assert!(capture.summary.total_elapsed_seconds > 0.0);
    }
}
