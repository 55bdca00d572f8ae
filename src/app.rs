//! Main application state and event handling (winit 0.29 compat)

use crate::capture::{CaptureStore, Channel, SyntheticWorkload};
use crate::config::ViewerConfig;
use crate::renderer::Renderer;
use crate::ui::Ui;
use anyhow::{Context, Result};
use std::sync::Arc;
use winit::{
    dpi::PhysicalSize,
    event::{ElementState, Event, KeyEvent, WindowEvent},
    event_loop::EventLoopWindowTarget,
    keyboard::{KeyCode, PhysicalKey},
    window::Window,
};

/// Record one capture per configured preview path
///
/// Each path gets its own sampler and a progressively heavier synthetic
/// workload, so the captures differ in a way that shows up in the graph.
pub fn record_previews(config: &ViewerConfig) -> CaptureStore {
    let mut store = CaptureStore::new();
    let preview = &config.preview;
    for (i, path) in preview.paths.iter().enumerate() {
        let seed = preview.seed.wrapping_add(i as u32);
        let mut workload = SyntheticWorkload::new(seed).with_base_load(i as f64 * 4.0);
        tracing::info!("Recording preview path '{}' ({} frames)", path, preview.frames_per_path);
        store.insert(workload.record(path, preview.frames_per_path, &config.sampler));
    }
    store
}

/// Application state
pub struct App {
    window: Option<Arc<Window>>,
    renderer: Option<Renderer>,
    ui: Ui,
    /// Captures of this analysis session
    store: CaptureStore,
    config: ViewerConfig,
}

impl App {
    /// Create App with the preview captures recorded up front
    pub fn new(config: ViewerConfig) -> Self {
        let store = record_previews(&config);
        Self::with_store(config, store)
    }

    /// Create App around existing captures (for library usage)
    pub fn with_store(config: ViewerConfig, store: CaptureStore) -> Self {
        Self {
            window: None,
            renderer: None,
            ui: Ui::new(&config),
            store,
            config,
        }
    }

    pub fn store(&self) -> &CaptureStore {
        &self.store
    }

    /// Init window and renderer
    pub fn init(&mut self, target: &EventLoopWindowTarget<()>) -> Result<()> {
        if self.window.is_some() {
            return Ok(());
        }

        let window = Arc::new(
            winit::window::WindowBuilder::new()
                .with_title(&self.config.title)
                .with_inner_size(PhysicalSize::new(self.config.width, self.config.height))
                .build(target)
                .context("failed to create window")?,
        );

        self.renderer = Some(pollster::block_on(Renderer::new(window.clone()))?);
        window.request_redraw();
        self.window = Some(window);
        Ok(())
    }

    fn handle_key(&mut self, key: KeyCode, pressed: bool) {
        if !pressed {
            return;
        }

        tracing::debug!("Key pressed: {:?}", key);

        match key {
            KeyCode::F2 => self.ui.toggle_summary(),
            KeyCode::KeyR => self.ui.reset_zoom(),
            KeyCode::Escape => self.ui.clear_selection(),
            KeyCode::Tab => {
                self.ui.select_next(&self.store);
                if let Some(capture) = self.ui.current_capture() {
                    tracing::info!("Showing capture '{}'", capture.name);
                }
            }
            KeyCode::Digit1 => self.ui.toggle_channel(Channel::Frame),
            KeyCode::Digit2 => self.ui.toggle_channel(Channel::Game),
            KeyCode::Digit3 => self.ui.toggle_channel(Channel::Draw),
            KeyCode::Digit4 => self.ui.toggle_channel(Channel::Rhi),
            KeyCode::Digit5 => self.ui.toggle_channel(Channel::Gpu),
            KeyCode::F11 => {
                if let Some(window) = &self.window {
                    let fullscreen = window.fullscreen();
                    window.set_fullscreen(if fullscreen.is_some() {
                        None
                    } else {
                        Some(winit::window::Fullscreen::Borderless(None))
                    });
                    tracing::info!("Fullscreen toggled");
                }
            }
            _ => {}
        }
    }

    fn request_redraw(&self) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }

    /// Main event handling logic (winit 0.29 style)
    pub fn handle_event(&mut self, event: Event<()>, target: &EventLoopWindowTarget<()>) {
        // Handle UI events first
        if let (Some(renderer), Some(window), Event::WindowEvent { event: ref w_event, .. }) =
            (&mut self.renderer, &self.window, &event)
        {
            let response = renderer.on_window_event(window, w_event);
            if response.repaint {
                window.request_redraw();
            }
            if response.consumed {
                return;
            }
        }

        match event {
            Event::Resumed => {
                if let Err(e) = self.init(target) {
                    tracing::error!("Failed to initialise viewer: {:#}", e);
                    target.exit();
                }
            }
            Event::WindowEvent { event, .. } => match event {
                WindowEvent::CloseRequested => target.exit(),
                WindowEvent::Resized(size) => {
                    if let Some(renderer) = &mut self.renderer {
                        renderer.resize(size);
                    }
                    self.request_redraw();
                }
                WindowEvent::KeyboardInput {
                    event: KeyEvent {
                        physical_key: PhysicalKey::Code(key),
                        state,
                        ..
                    },
                    ..
                } => {
                    self.handle_key(key, state == ElementState::Pressed);
                    self.request_redraw();
                }
                WindowEvent::RedrawRequested => {
                    let (Some(window), Some(renderer)) = (&self.window, &mut self.renderer) else {
                        return;
                    };
                    match renderer.render(window, &mut self.ui, &mut self.store) {
                        Ok(true) => window.request_redraw(),
                        Ok(false) => {}
                        Err(e) => tracing::error!("Render error: {:#}", e),
                    }
                    if self.ui.take_exit_request() {
                        target.exit();
                    }
                }
                _ => {}
            },
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PreviewConfig;

    #[test]
    fn test_record_previews_one_capture_per_path() {
        let config = ViewerConfig {
            preview: PreviewConfig {
                paths: vec!["Light".to_string(), "Heavy".to_string()],
                frames_per_path: 2000,
                seed: 9,
            },
            ..Default::default()
        };
        let store = record_previews(&config);

        assert_eq!(store.names().collect::<Vec<_>>(), vec!["Light", "Heavy"]);
        let light = store.load("Light").unwrap();
        let heavy = store.load("Heavy").unwrap();
        assert_eq!(light.len(), 2000);
        assert!(heavy.summary.avg.game_ms > light.summary.avg.game_ms);
    }

    #[test]
    fn test_record_previews_empty_path_list() {
        let config = ViewerConfig {
            preview: PreviewConfig {
                paths: Vec::new(),
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(record_previews(&config).is_empty());
    }
}
