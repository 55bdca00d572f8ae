//! Viewer, sampler and graph configuration
//!
//! Everything has a sensible default; a JSON file can override any subset of
//! fields.

use crate::capture::{Channel, NEAR_ZERO_MS};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Configuration loading failures
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Sampling and aggregation tunables
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplerConfig {
    /// EMA weight of the newest raw reading
    pub ema_alpha: f64,
    /// Sequences shorter than this are averaged directly
    pub direct_average_limit: usize,
    /// Chunk size of the first chunked tier
    pub base_chunk_size: usize,
    /// Upper bound (exclusive) of the first chunked tier
    pub first_tier_limit: usize,
    /// A value above `spike_multiplier * average` counts as a spike
    pub spike_multiplier: f64,
    /// Spike threshold (ms) used when the channel average is ~0
    pub spike_absolute_ms: f64,
    /// Averages at or below this are treated as zero
    pub near_zero: f64,
    /// The first `len / warmup_divisor` samples are ignored for the minimum
    pub warmup_divisor: usize,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            ema_alpha: 0.1,
            direct_average_limit: 36_000,
            base_chunk_size: 10_000,
            first_tier_limit: 3_600_000,
            spike_multiplier: 1.5,
            spike_absolute_ms: 1.0,
            near_zero: NEAR_ZERO_MS,
            warmup_divisor: 10,
        }
    }
}

/// Graph widget geometry and zoom feel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphConfig {
    /// Space reserved for the Y axis labels
    pub margin_left: f32,
    pub margin_right: f32,
    pub margin_top: f32,
    /// Space reserved for the X axis labels
    pub margin_bottom: f32,
    /// Window scale per wheel notch when zooming in
    pub zoom_in_base: f64,
    /// Window scale per wheel notch when zooming out
    pub zoom_out_base: f64,
    /// Scroll distance (points) that counts as one wheel notch
    pub wheel_points_per_notch: f32,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            margin_left: 55.0,
            margin_right: 48.0,
            margin_top: 20.0,
            margin_bottom: 28.0,
            zoom_in_base: 0.8,
            zoom_out_base: 1.25,
            wheel_points_per_notch: 50.0,
        }
    }
}

/// Synthetic preview runs (one capture per path)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreviewConfig {
    /// Path names to capture
    pub paths: Vec<String>,
    /// Frames recorded per path
    pub frames_per_path: usize,
    /// Noise seed
    pub seed: u32,
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self {
            paths: vec![
                "Courtyard Flythrough".to_string(),
                "Market Street".to_string(),
                "Harbor Sweep".to_string(),
            ],
            frames_per_path: 3_600,
            seed: 1337,
        }
    }
}

/// Viewer configuration for library usage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    /// Window title
    pub title: String,
    /// Window width
    pub width: u32,
    /// Window height
    pub height: u32,
    /// Show the whole-capture summary panel
    pub show_summary: bool,
    /// Curves drawn when a capture is loaded
    pub visible_channels: Vec<Channel>,
    pub sampler: SamplerConfig,
    pub graph: GraphConfig,
    pub preview: PreviewConfig,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            title: "perf-scope - Performance Analyzer".to_string(),
            width: 1280,
            height: 720,
            show_summary: true,
            visible_channels: vec![Channel::Frame, Channel::Game, Channel::Draw, Channel::Gpu],
            sampler: SamplerConfig::default(),
            graph: GraphConfig::default(),
            preview: PreviewConfig::default(),
        }
    }
}

impl ViewerConfig {
    /// Read a JSON config file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Default per-user config location
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("perf-scope").join("config.json"))
    }

    /// Explicit path if given, else the per-user file if it exists, else defaults
    pub fn discover(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            return Self::load(path);
        }
        match Self::default_path() {
            Some(path) if path.is_file() => {
                tracing::info!("Using config {}", path.display());
                Self::load(&path)
            }
            _ => Ok(Self::default()),
        }
    }

    /// Small window, short preview runs
    pub fn minimal() -> Self {
        Self {
            width: 800,
            height: 600,
            preview: PreviewConfig {
                paths: vec!["Preview".to_string()],
                frames_per_path: 600,
                ..Default::default()
            },
            ..Default::default()
        }
    }

    /// Preview runs long enough to take the chunked-average path
    pub fn for_long_capture() -> Self {
        Self {
            title: "perf-scope - Long Capture".to_string(),
            preview: PreviewConfig {
                paths: vec!["Endurance Loop".to_string()],
                frames_per_path: 120_000,
                ..Default::default()
            },
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_partial_override() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(
            &path,
            r#"{ "title": "Nightly", "graph": { "zoom_in_base": 0.5 }, "visible_channels": ["Rhi"] }"#,
        )
        .unwrap();

        let config = ViewerConfig::load(&path).unwrap();
        assert_eq!(config.title, "Nightly");
        assert_eq!(config.graph.zoom_in_base, 0.5);
        assert_eq!(config.graph.zoom_out_base, 1.25);
        assert_eq!(config.visible_channels, vec![Channel::Rhi]);
        assert_eq!(config.sampler, SamplerConfig::default());
    }

    #[test]
    fn test_load_errors_carry_path() {
        let dir = tempdir().unwrap();

        let missing = dir.path().join("missing.json");
        let err = ViewerConfig::load(&missing).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
        assert!(err.to_string().contains("missing.json"));

        let broken = dir.path().join("broken.json");
        std::fs::write(&broken, "{ not json").unwrap();
        let err = ViewerConfig::load(&broken).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_explicit_path_wins() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("explicit.json");
        std::fs::write(&path, r#"{ "width": 1920 }"#).unwrap();

        let config = ViewerConfig::discover(Some(&path)).unwrap();
        assert_eq!(config.width, 1920);
        assert_eq!(config.height, 720);
    }
}
