//! Timeline graph widget
//!
//! Paints the visible window of a capture and forwards pointer input to the
//! [`ViewState`] that owns window, selection and hover.

use crate::capture::{Capture, Channel};
use crate::config::GraphConfig;
use crate::view::{Modifiers, PointerButton, ViewEvent, ViewState};
use egui::epaint::PathShape;
use egui::{Align2, Color32, FontId, Pos2, Rect, Sense, Stroke};
use glam::Vec2;

/// Curve colour of a channel
pub fn channel_color(channel: Channel) -> Color32 {
    match channel {
        Channel::Frame => Color32::WHITE,
        Channel::Game => Color32::from_rgb(80, 220, 100),
        Channel::Draw => Color32::from_rgb(90, 150, 255),
        Channel::Rhi => Color32::from_rgb(240, 210, 60),
        Channel::Gpu => Color32::from_rgb(240, 80, 80),
    }
}

const AXIS_COLOR: Color32 = Color32::from_gray(150);
const GRID_COLOR: Color32 = Color32::from_gray(45);
const SELECTION_FILL: Color32 = Color32::from_rgba_premultiplied(8, 23, 38, 38);
const HOVER_COLOR: Color32 = Color32::from_rgb(255, 217, 51);

/// Graph state plus the bits of pointer bookkeeping egui does not track for us
pub struct GraphPanel {
    view: ViewState,
    pointer_inside: bool,
    wheel_points_per_notch: f32,
    /// Screen-space origin of the widget in the last frame
    origin: Pos2,
    /// Reused polyline buffer
    points: Vec<Pos2>,
}

impl GraphPanel {
    pub fn new(config: &GraphConfig, visible: &[Channel]) -> Self {
        Self {
            view: ViewState::new(config.clone()).with_visible_channels(visible.iter().copied()),
            pointer_inside: false,
            wheel_points_per_notch: config.wheel_points_per_notch.max(1.0),
            origin: Pos2::ZERO,
            points: Vec::new(),
        }
    }

    pub fn view(&self) -> &ViewState {
        &self.view
    }

    pub fn view_mut(&mut self) -> &mut ViewState {
        &mut self.view
    }

    /// Widget origin in screen space (for placing overlays next to the pointer)
    pub fn origin(&self) -> Pos2 {
        self.origin
    }

    /// Draw the graph and translate this frame's input. Returns the view notifications.
    pub fn show(&mut self, ui: &mut egui::Ui, capture: &Capture) -> Vec<ViewEvent> {
        let size = ui.available_size();
        let (rect, _response) = ui.allocate_exact_size(size, Sense::click_and_drag());
        self.origin = rect.min;
        self.view.set_size(Vec2::new(rect.width(), rect.height()));

        if self.handle_input(ui, rect) {
            ui.ctx().request_repaint();
        }

        self.paint(ui, rect, capture);
        self.view.drain_events()
    }

    fn handle_input(&mut self, ui: &egui::Ui, rect: Rect) -> bool {
        let (events, scroll, pointer) = ui.input(|i| (i.events.clone(), i.raw_scroll_delta.y, i.pointer.hover_pos()));
        let local = |pos: Pos2| Vec2::new(pos.x - rect.min.x, pos.y - rect.min.y);
        let mut repaint = false;

        for event in events {
            match event {
                egui::Event::PointerMoved(pos) => {
                    let inside = rect.contains(pos);
                    if inside {
                        repaint |= self.view.on_pointer_move(local(pos));
                    } else if self.view.is_panning() || self.view.is_selecting() {
                        repaint |= self.view.on_drag_outside(local(pos));
                    }
                    if self.pointer_inside && !inside {
                        repaint |= self.view.on_pointer_leave();
                    }
                    self.pointer_inside = inside;
                }
                egui::Event::PointerButton {
                    pos,
                    button,
                    pressed,
                    modifiers,
                } => {
                    let Some(button) = map_button(button) else {
                        continue;
                    };
                    if pressed {
                        if rect.contains(pos) {
                            let modifiers = Modifiers {
                                ctrl: modifiers.ctrl || modifiers.mac_cmd,
                                shift: modifiers.shift,
                                alt: modifiers.alt,
                            };
                            repaint |= self.view.on_pointer_down(button, modifiers, local(pos));
                        }
                    } else {
                        repaint |= self.view.on_pointer_up(button);
                    }
                }
                egui::Event::PointerGone => {
                    if self.pointer_inside {
                        repaint |= self.view.on_pointer_leave();
                    }
                    self.pointer_inside = false;
                }
                egui::Event::WindowFocused(false) => {
                    repaint |= self.view.on_capture_lost();
                }
                _ => {}
            }
        }

        if scroll != 0.0 {
            if let Some(pos) = pointer.filter(|p| rect.contains(*p)) {
                repaint |= self.view.on_wheel(scroll / self.wheel_points_per_notch, local(pos));
            }
        }
        repaint
    }

    fn paint(&mut self, ui: &egui::Ui, rect: Rect, capture: &Capture) {
        let painter = ui.painter_at(rect);
        let to_screen = |x: f32, y: f32| Pos2::new(rect.min.x + x, rect.min.y + y);
        let plot = self.view.plot();

        painter.rect_filled(rect, 2.0, Color32::from_black_alpha(120));
        if plot.is_degenerate() || plot.height() <= 0.0 {
            return;
        }
        let plot_rect = Rect::from_min_max(to_screen(plot.left, plot.top), to_screen(plot.right, plot.bottom));
        painter.rect_stroke(plot_rect, 0.0, Stroke::new(1.0, AXIS_COLOR));

        if capture.is_empty() {
            painter.text(
                plot_rect.center(),
                Align2::CENTER_CENTER,
                "No frames recorded",
                FontId::proportional(14.0),
                AXIS_COLOR,
            );
            return;
        }

        let font = FontId::monospace(10.0);
        let range = self.view.value_range(&capture.samples);

        // Y ticks and grid
        for (y, label) in self.view.y_ticks(range) {
            painter.line_segment(
                [to_screen(plot.left, y), to_screen(plot.right, y)],
                Stroke::new(1.0, GRID_COLOR),
            );
            painter.line_segment(
                [to_screen(plot.left - 4.0, y), to_screen(plot.left, y)],
                Stroke::new(1.0, AXIS_COLOR),
            );
            painter.text(to_screen(plot.left - 6.0, y), Align2::RIGHT_CENTER, label, font.clone(), AXIS_COLOR);
        }

        // X ticks
        for (x, label) in self.view.x_ticks() {
            painter.line_segment(
                [to_screen(x, plot.bottom), to_screen(x, plot.bottom + 4.0)],
                Stroke::new(1.0, AXIS_COLOR),
            );
            painter.text(to_screen(x, plot.bottom + 6.0), Align2::CENTER_TOP, label, font.clone(), AXIS_COLOR);
        }

        // Selection band
        if let Some((a, b)) = self.view.current_selection() {
            if let (Some(x1), Some(x2)) = (self.view.index_to_pixel_x(a), self.view.index_to_pixel_x(b)) {
                let (left, right) = (x1.min(x2).max(plot.left), x1.max(x2).min(plot.right));
                if right >= left {
                    painter.rect_filled(
                        Rect::from_min_max(to_screen(left, plot.top), to_screen(right.max(left + 1.0), plot.bottom)),
                        0.0,
                        SELECTION_FILL,
                    );
                }
            }
        }

        // Curves
        if let Some((first, last)) = self.view.visible_index_range() {
            let window = &capture.samples[first..=last.min(capture.len() - 1)];
            // At most two points per pixel column
            let stride = (window.len() / (plot.width() as usize * 2).max(1)).max(1);
            let channels: Vec<Channel> = self.view.visible_channels().collect();

            for channel in channels {
                self.points.clear();
                for (offset, sample) in window.iter().enumerate().step_by(stride) {
                    let x = self.view.time_to_pixel_x(self.view.axis().start(first + offset));
                    let y = self.view.value_to_pixel_y(channel.value(sample), range);
                    self.points.push(to_screen(x, y));
                }
                if self.points.len() >= 2 {
                    painter.add(PathShape::line(
                        self.points.clone(),
                        Stroke::new(1.4, channel_color(channel)),
                    ));
                }
            }
        }

        // Hover line and marker on the frame curve
        if let Some(index) = self.view.current_hover() {
            if let Some(x) = self.view.index_to_pixel_x(index) {
                if x >= plot.left - 1.0 && x <= plot.right + 1.0 {
                    painter.line_segment(
                        [to_screen(x, plot.top), to_screen(x, plot.bottom)],
                        Stroke::new(1.8, HOVER_COLOR),
                    );
                    if let Some(sample) = capture.samples.get(index) {
                        let y = self.view.value_to_pixel_y(sample.frame_ms, range);
                        let c = to_screen(x, y);
                        let stroke = Stroke::new(1.2, Color32::WHITE);
                        painter.line_segment([c + egui::vec2(-4.0, -4.0), c + egui::vec2(4.0, 4.0)], stroke);
                        painter.line_segment([c + egui::vec2(-4.0, 4.0), c + egui::vec2(4.0, -4.0)], stroke);
                    }
                }
            }
        }
    }
}

fn map_button(button: egui::PointerButton) -> Option<PointerButton> {
    match button {
        egui::PointerButton::Primary => Some(PointerButton::Left),
        egui::PointerButton::Middle => Some(PointerButton::Middle),
        egui::PointerButton::Secondary => Some(PointerButton::Right),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_button_mapping() {
        assert_eq!(map_button(egui::PointerButton::Primary), Some(PointerButton::Left));
        assert_eq!(map_button(egui::PointerButton::Secondary), Some(PointerButton::Right));
        assert_eq!(map_button(egui::PointerButton::Middle), Some(PointerButton::Middle));
        assert_eq!(map_button(egui::PointerButton::Extra1), None);
    }

    #[test]
    fn test_channel_colors_are_distinct() {
        let colors: Vec<Color32> = Channel::ALL.iter().map(|c| channel_color(*c)).collect();
        for (i, a) in colors.iter().enumerate() {
            for b in &colors[i + 1..] {
                assert_ne!(a, b);
            }
        }
        assert_eq!(channel_color(Channel::Frame), Color32::WHITE);
    }
}
