//! perf-scope: frame-time capture and timeline analysis
//!
//! Records smoothed per-thread frame timings while a scripted camera path
//! plays back, reduces each capture to the numbers that reveal the
//! bottleneck, and lets you pan, zoom and select ranges of the result in an
//! interactive graph.
//!
//! # Library Usage
//!
//! ```rust,no_run
//! use perf_scope::{capture::RawReadings, Sampler, SamplerConfig};
//!
//! let mut sampler = Sampler::new(SamplerConfig::default());
//! sampler.start();
//! for _ in 0..600 {
//!     sampler.record_frame(RawReadings::new(8.0, 6.0, 2.0, 12.0, 16.6), 0.0166);
//! }
//! let capture = sampler.finish("Courtyard Flythrough");
//! println!("avg frame {:.2} ms", capture.summary.avg.frame_ms);
//! ```
//!
//! Viewing captures:
//!
//! ```rust,no_run
//! use perf_scope::{launch_viewer, ViewerConfig};
//!
//! launch_viewer(ViewerConfig::default()).unwrap();
//! ```

pub mod app;
pub mod capture;
pub mod config;
pub mod renderer;
pub mod ui;
pub mod view;

use anyhow::Result;
use winit::event_loop::{ControlFlow, EventLoop};

// Re-export key types
pub use app::App;
pub use capture::{Capture, CaptureStore, FrameSample, Sampler, Summary};
pub use config::{ConfigError, GraphConfig, SamplerConfig, ViewerConfig};
pub use view::{ViewEvent, ViewState};

/// Open the viewer with one synthetic capture per configured preview path
///
/// This function blocks until the window is closed.
pub fn launch_viewer(config: ViewerConfig) -> Result<()> {
    run(App::new(config))
}

/// Open the viewer on captures recorded elsewhere
pub fn launch_viewer_with(config: ViewerConfig, store: CaptureStore) -> Result<()> {
    run(App::with_store(config, store))
}

fn run(mut app: App) -> Result<()> {
    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Wait);

    // Run event loop (winit 0.29 style)
    event_loop.run(move |event, target| {
        app.handle_event(event, target);
    })?;

    Ok(())
}

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
