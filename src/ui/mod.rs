//! User interface module using egui
//!
//! Capture list on the left, statistics on the right, the timeline graph in
//! the middle. All panels read the same shared `Arc<Capture>`.

mod graph;
mod hover;
mod stats;

pub use graph::*;
pub use hover::*;
pub use stats::*;

use crate::capture::{Capture, CaptureStore, Channel, LabelFilter, RangeStats};
use crate::config::ViewerConfig;
use crate::view::ViewEvent;
use egui::{Color32, FullOutput, RichText};
use std::sync::Arc;

/// UI state and rendering
pub struct Ui {
    about_open: bool,
    summary_open: bool,
    exit_requested: bool,
    graph: GraphPanel,
    hover: HoverCard,
    /// Capture shown in the graph
    current: Option<Arc<Capture>>,
    /// Labels shown in the breakdown tables
    label_filter: LabelFilter,
    /// Stats of the current selection, refreshed on selection changes
    range: Option<RangeStats>,
}

impl Ui {
    pub fn new(config: &ViewerConfig) -> Self {
        Self {
            about_open: false,
            summary_open: config.show_summary,
            exit_requested: false,
            graph: GraphPanel::new(&config.graph, &config.visible_channels),
            hover: HoverCard::new(),
            current: None,
            label_filter: LabelFilter::new(),
            range: None,
        }
    }

    /// Show a capture in the graph and panels
    pub fn select_capture(&mut self, capture: Arc<Capture>) {
        self.graph.view_mut().load_capture(&capture);
        self.label_filter = capture.labels().into_iter().collect();
        self.hover.clear();
        self.range = None;
        self.current = Some(capture);
    }

    pub fn current_capture(&self) -> Option<&Arc<Capture>> {
        self.current.as_ref()
    }

    /// Select the capture after the current one (wrapping)
    pub fn select_next(&mut self, store: &CaptureStore) {
        if store.is_empty() {
            return;
        }
        let next = self
            .current
            .as_ref()
            .and_then(|c| store.iter().position(|s| Arc::ptr_eq(s, c)))
            .map(|i| (i + 1) % store.len())
            .unwrap_or(0);
        if let Some(capture) = store.get(next) {
            self.select_capture(capture.clone());
        }
    }

    pub fn toggle_summary(&mut self) {
        self.summary_open = !self.summary_open;
    }

    /// Show the whole capture again
    pub fn reset_zoom(&mut self) {
        self.graph.view_mut().set_window(0, 0);
    }

    pub fn clear_selection(&mut self) {
        self.graph.view_mut().clear_selection();
        self.range = None;
    }

    pub fn toggle_channel(&mut self, channel: Channel) {
        let visible = self.graph.view_mut().toggle_channel(channel);
        tracing::debug!("Channel {} {}", channel.name(), if visible { "shown" } else { "hidden" });
    }

    /// Show or hide one label's rows; the last shown label cannot be hidden,
    /// since an empty filter reports every label
    fn set_label_shown(&mut self, label: &str, shown: bool) -> bool {
        if shown {
            return self.label_filter.insert(label.to_string());
        }
        if self.label_filter.len() == 1 && self.label_filter.contains(label) {
            return false;
        }
        self.label_filter.remove(label)
    }

    /// True once after the user picked File > Exit
    pub fn take_exit_request(&mut self) -> bool {
        std::mem::take(&mut self.exit_requested)
    }

    fn apply_events(&mut self, events: Vec<ViewEvent>) {
        for event in &events {
            match event {
                ViewEvent::HoverChanged { .. } => self.hover.apply(event),
                ViewEvent::SelectionChanged(selection) => {
                    self.range = match (selection, &self.current) {
                        (Some((start, end)), Some(capture)) => {
                            RangeStats::compute(&capture.samples, *start, *end, Some(&self.label_filter))
                        }
                        _ => None,
                    };
                }
            }
        }
        self.hover.set_locked(self.graph.view().is_hover_locked());
    }

    /// Render UI
    pub fn render(&mut self, ctx: &egui::Context, raw_input: egui::RawInput, store: &mut CaptureStore) -> FullOutput {
        ctx.begin_frame(raw_input);

        if self.current.is_none() {
            if let Some(first) = store.get(0).cloned() {
                self.select_capture(first);
            }
        }

        // 1. Top Menu Bar
        egui::TopBottomPanel::top("menu_bar").show(ctx, |ui| {
            egui::menu::bar(ui, |ui| {
                ui.menu_button("File", |ui| {
                    if ui.button("Exit").clicked() {
                        self.exit_requested = true;
                        ui.close_menu();
                    }
                });

                ui.menu_button("View", |ui| {
                    if ui.checkbox(&mut self.summary_open, "Summary Panel (F2)").clicked() {
                        ui.close_menu();
                    }
                    if ui.button("Reset Zoom (R)").clicked() {
                        self.reset_zoom();
                        ui.close_menu();
                    }
                    if ui.button("Clear Selection (Esc)").clicked() {
                        self.clear_selection();
                        ui.close_menu();
                    }

                    ui.separator();
                    ui.label(RichText::new("Shortcuts").small().weak());
                    ui.label(RichText::new("  Wheel: Zoom").small().weak());
                    ui.label(RichText::new("  Middle/Right drag: Pan").small().weak());
                    ui.label(RichText::new("  Left drag: Select range").small().weak());
                    ui.label(RichText::new("  Ctrl+Click: Lock hover").small().weak());
                    ui.label(RichText::new("  Tab: Next capture").small().weak());
                });

                ui.menu_button("Help", |ui| {
                    if ui.button("About").clicked() {
                        self.about_open = true;
                        ui.close_menu();
                    }
                });

                if let Some(capture) = &self.current {
                    let view = self.graph.view();
                    ui.separator();
                    ui.label(RichText::new(&capture.name).color(Color32::LIGHT_BLUE));
                    ui.separator();
                    ui.label(format!(
                        "Window: {}+{} of {}",
                        view.window_start(),
                        view.window_count(),
                        view.total_samples()
                    ));
                    if view.is_hover_locked() {
                        ui.separator();
                        ui.label(RichText::new("HOVER LOCKED").color(Color32::YELLOW));
                    }
                }
            });
        });

        // 2. Capture list
        let mut picked: Option<Arc<Capture>> = None;
        let mut discard: Option<String> = None;
        egui::SidePanel::left("capture_list")
            .default_width(200.0)
            .resizable(true)
            .show(ctx, |ui| {
                ui.heading("Captures");
                if store.is_empty() {
                    ui.label(RichText::new("No captures recorded").weak());
                }
                egui::ScrollArea::vertical().show(ui, |ui| {
                    for capture in store.iter() {
                        let selected = self.current.as_ref().is_some_and(|c| Arc::ptr_eq(c, capture));
                        ui.horizontal(|ui| {
                            if ui.selectable_label(selected, &capture.name).clicked() && !selected {
                                picked = Some(capture.clone());
                            }
                            if ui.small_button("x").on_hover_text("Discard capture").clicked() {
                                discard = Some(capture.name.clone());
                            }
                        });
                        ui.label(
                            RichText::new(format!(
                                "{} frames, {:.1}s, {}",
                                capture.len(),
                                capture.summary.total_elapsed_seconds,
                                capture.recorded_at.format("%H:%M:%S")
                            ))
                            .small()
                            .weak(),
                        );
                        ui.add_space(4.0);
                    }
                });
            });

        if let Some(name) = discard {
            store.remove(&name);
            tracing::info!("Discarded capture '{}'", name);
            if self.current.as_ref().is_some_and(|c| c.name == name) {
                self.current = None;
                self.range = None;
                self.hover.clear();
                picked = picked.or_else(|| store.get(0).cloned());
            }
        }
        if let Some(capture) = picked {
            self.select_capture(capture);
        }

        // 3. Statistics
        if self.summary_open {
            if let Some(capture) = self.current.clone() {
                egui::SidePanel::right("summary_panel")
                    .default_width(320.0)
                    .resizable(true)
                    .show(ctx, |ui| {
                        egui::ScrollArea::vertical().show(ui, |ui| {
                            render_summary(ui, &capture, &self.label_filter);
                            ui.separator();
                            render_range_stats(ui, self.range.as_ref());
                        });
                    });
            }
        }

        // 4. Channel toggles, label filter, graph
        let mut events = Vec::new();
        egui::CentralPanel::default().show(ctx, |ui| {
            let Some(capture) = self.current.clone() else {
                ui.centered_and_justified(|ui| {
                    ui.label(RichText::new("No capture selected").weak());
                });
                return;
            };

            ui.horizontal(|ui| {
                for channel in Channel::ALL {
                    let mut visible = self.graph.view().is_channel_visible(channel);
                    let text = RichText::new(channel.name()).color(channel_color(channel));
                    if ui.checkbox(&mut visible, text).changed() {
                        self.toggle_channel(channel);
                    }
                }
            });

            let labels = capture.labels();
            if !labels.is_empty() {
                let mut filter_changed = false;
                ui.collapsing("Label filter", |ui| {
                    ui.horizontal_wrapped(|ui| {
                        for label in labels {
                            let mut shown = self.label_filter.contains(&label);
                            let last = shown && self.label_filter.len() == 1;
                            let checkbox = egui::Checkbox::new(&mut shown, &label);
                            let response = ui
                                .add_enabled(!last, checkbox)
                                .on_disabled_hover_text("At least one label stays shown");
                            if response.changed() {
                                filter_changed |= self.set_label_shown(&label, shown);
                            }
                        }
                    });
                });
                if filter_changed {
                    self.range = self.graph.view().range_stats(&capture.samples, Some(&self.label_filter));
                }
            }

            events = self.graph.show(ui, &capture);
        });
        self.apply_events(events);

        // 5. Hover card
        if let Some(capture) = &self.current {
            self.hover
                .show(ctx, self.graph.origin(), capture, self.range.as_ref());
        }

        // 6. About Dialog
        if self.about_open {
            egui::Window::new("About perf-scope")
                .collapsible(false)
                .resizable(false)
                .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
                .show(ctx, |ui| {
                    ui.vertical_centered(|ui| {
                        ui.heading("perf-scope");
                        ui.label(RichText::new("Frame-time capture analysis").italics());
                        ui.add_space(10.0);
                        ui.label(format!("v{}", env!("CARGO_PKG_VERSION")));
                        ui.label("Powered by Rust + wgpu + egui");
                        ui.add_space(10.0);
                        if ui.button("Close").clicked() {
                            self.about_open = false;
                        }
                    });
                });
        }

        // End frame and return output
        ctx.end_frame()
    }
}
