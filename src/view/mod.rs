//! Interactive graph state
//!
//! `ViewState` turns pointer gestures into a visible window, a selection and
//! a hover index, and maps between plot pixels and sample indices on the
//! non-uniform time axis. It knows nothing about the UI toolkit: the widget
//! feeds it plain events and reads back the query surface and the
//! [`ViewEvent`] queue.

pub mod timeline;

pub use timeline::TimeAxis;

use crate::capture::{Capture, Channel, FrameSample, LabelFilter, RangeStats};
use crate::config::GraphConfig;
use glam::Vec2;
use std::collections::BTreeSet;

/// Slack (in pixels) applied when mapping a pixel back to a sample, so a
/// pixel produced by `index_to_pixel_x` maps back to the same index
const PIXEL_EPSILON: f64 = 1e-3;

/// Number of intervals between axis labels
pub const TICK_INTERVALS: usize = 5;

/// Pointer buttons the graph reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerButton {
    Left,
    Middle,
    Right,
}

/// Modifier keys held during a pointer event
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub ctrl: bool,
    pub shift: bool,
    pub alt: bool,
}

impl Modifiers {
    pub const NONE: Self = Self {
        ctrl: false,
        shift: false,
        alt: false,
    };

    pub const CTRL: Self = Self {
        ctrl: true,
        shift: false,
        alt: false,
    };
}

/// Notifications for the panels that follow the graph
#[derive(Debug, Clone, PartialEq)]
pub enum ViewEvent {
    /// Hovered sample changed; `local` is the pointer position for tooltip placement
    HoverChanged { index: Option<usize>, local: Vec2 },
    /// Normalized inclusive selection, `None` when cancelled or cleared
    SelectionChanged(Option<(usize, usize)>),
}

/// Plot area inside the widget, in widget-local pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlotRect {
    pub left: f32,
    pub right: f32,
    pub top: f32,
    pub bottom: f32,
}

impl PlotRect {
    pub fn new(size: Vec2, config: &GraphConfig) -> Self {
        Self {
            left: config.margin_left,
            right: size.x - config.margin_right,
            top: config.margin_top,
            bottom: size.y - config.margin_bottom,
        }
    }

    pub fn width(&self) -> f32 {
        self.right - self.left
    }

    pub fn height(&self) -> f32 {
        self.bottom - self.top
    }

    pub fn contains_x(&self, x: f32) -> bool {
        x >= self.left && x <= self.right
    }

    pub fn is_degenerate(&self) -> bool {
        self.width() <= 0.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Drag {
    Idle,
    Panning {
        button: PointerButton,
        anchor_x: f32,
        anchor_start: usize,
    },
    Selecting,
}

/// Window, selection and hover of one graph
#[derive(Debug, Clone)]
pub struct ViewState {
    config: GraphConfig,
    plot: PlotRect,
    axis: TimeAxis,
    window_start: usize,
    window_count: usize,
    /// Raw (start, end) as dragged; normalized on release
    selection: Option<(usize, usize)>,
    drag: Drag,
    hover: Option<usize>,
    hover_local: Vec2,
    hover_locked: bool,
    visible: BTreeSet<Channel>,
    /// Channels restored on every reset
    default_visible: BTreeSet<Channel>,
    events: Vec<ViewEvent>,
}

impl ViewState {
    pub fn new(config: GraphConfig) -> Self {
        let plot = PlotRect::new(Vec2::ZERO, &config);
        let visible: BTreeSet<Channel> = [Channel::Frame, Channel::Game, Channel::Draw, Channel::Gpu].into_iter().collect();
        Self {
            config,
            plot,
            axis: TimeAxis::default(),
            window_start: 0,
            window_count: 0,
            selection: None,
            drag: Drag::Idle,
            hover: None,
            hover_local: Vec2::ZERO,
            hover_locked: false,
            default_visible: visible.clone(),
            visible,
            events: Vec::new(),
        }
    }

    /// Default channel set, shown now and after every reset
    pub fn with_visible_channels(mut self, channels: impl IntoIterator<Item = Channel>) -> Self {
        self.default_visible = channels.into_iter().collect();
        self.visible = self.default_visible.clone();
        self
    }

    /// Update the widget size; returns true when the plot area changed
    pub fn set_size(&mut self, size: Vec2) -> bool {
        let plot = PlotRect::new(size, &self.config);
        let changed = plot != self.plot;
        self.plot = plot;
        changed
    }

    pub fn plot(&self) -> PlotRect {
        self.plot
    }

    pub fn axis(&self) -> &TimeAxis {
        &self.axis
    }

    pub fn total_samples(&self) -> usize {
        self.axis.len()
    }

    // Loading

    /// Show a capture: full range, no selection, no hover, default channels
    pub fn load_capture(&mut self, capture: &Capture) {
        tracing::info!("Loading capture '{}' into graph ({} frames)", capture.name, capture.len());
        self.reset(TimeAxis::from_samples(&capture.samples));
    }

    /// Replace the time axis and drop every index derived from the previous one
    pub fn reset(&mut self, axis: TimeAxis) {
        self.axis = axis;
        self.window_start = 0;
        self.window_count = self.axis.len();
        self.selection = None;
        self.drag = Drag::Idle;
        self.hover = None;
        self.hover_locked = false;
        self.visible = self.default_visible.clone();
        self.events.clear();
    }

    // Window

    /// Set the visible window; a count of 0 means the full range
    pub fn set_window(&mut self, start: usize, count: usize) {
        let n = self.axis.len();
        if n == 0 {
            self.window_start = 0;
            self.window_count = 0;
            return;
        }
        let count = if count == 0 { n } else { count.min(n) };
        self.window_count = count;
        self.window_start = start.min(n - count);
    }

    pub fn window_start(&self) -> usize {
        self.window_start
    }

    pub fn window_count(&self) -> usize {
        self.window_count
    }

    /// Inclusive index range currently visible
    pub fn visible_index_range(&self) -> Option<(usize, usize)> {
        if self.window_count == 0 {
            return None;
        }
        Some((self.window_start, self.window_start + self.window_count - 1))
    }

    /// Time span covered by the visible window (end of the last sample included)
    pub fn visible_time_span(&self) -> (f64, f64) {
        self.axis.span(self.window_start, self.window_count)
    }

    // Coordinate mapping

    /// Sample under a widget-local X coordinate, by time
    pub fn index_at_pixel(&self, x: f32) -> Option<usize> {
        let width = self.plot.width();
        if self.axis.is_empty() || self.window_count == 0 || width <= 0.0 || !self.plot.contains_x(x) {
            return None;
        }
        let (ts, te) = self.visible_time_span();
        let range = te - ts;
        if range <= 0.0 {
            return Some(self.window_start);
        }
        let offset = (f64::from(x) - f64::from(self.plot.left) + PIXEL_EPSILON) / f64::from(width);
        self.axis
            .index_at(ts + offset * range, self.window_start, self.window_start + self.window_count)
    }

    /// X coordinate where a sample starts; indices outside the window map outside the plot
    pub fn index_to_pixel_x(&self, index: usize) -> Option<f32> {
        let n = self.axis.len();
        if n == 0 || self.plot.is_degenerate() {
            return None;
        }
        Some(self.time_to_pixel_x(self.axis.start(index.min(n - 1))))
    }

    pub fn time_to_pixel_x(&self, time_ms: f64) -> f32 {
        let (ts, te) = self.visible_time_span();
        let range = te - ts;
        let alpha = if range > 0.0 { (time_ms - ts) / range } else { 0.0 };
        (f64::from(self.plot.left) + alpha * f64::from(self.plot.width())) as f32
    }

    /// Map a value onto the plot's Y axis for a `(min, max)` range
    pub fn value_to_pixel_y(&self, value: f64, range: (f64, f64)) -> f32 {
        let span = range.1 - range.0;
        let alpha = if span > 0.0 { (value - range.0) / span } else { 0.0 };
        (f64::from(self.plot.bottom) - alpha * f64::from(self.plot.height())) as f32
    }

    // Channels

    pub fn is_channel_visible(&self, channel: Channel) -> bool {
        self.visible.contains(&channel)
    }

    pub fn set_channel_visible(&mut self, channel: Channel, visible: bool) {
        if visible {
            self.visible.insert(channel);
        } else {
            self.visible.remove(&channel);
        }
    }

    /// Flip a channel; returns whether it is now visible
    pub fn toggle_channel(&mut self, channel: Channel) -> bool {
        let now = !self.is_channel_visible(channel);
        self.set_channel_visible(channel, now);
        now
    }

    pub fn visible_channels(&self) -> impl Iterator<Item = Channel> + '_ {
        self.visible.iter().copied()
    }

    /// Y range of the visible channels inside the window, padded by 5%
    pub fn value_range(&self, samples: &[FrameSample]) -> (f64, f64) {
        let end = (self.window_start + self.window_count).min(samples.len());
        let window = samples.get(self.window_start..end).unwrap_or(&[]);

        let mut lo = f64::INFINITY;
        let mut hi = f64::NEG_INFINITY;
        for s in window {
            for channel in &self.visible {
                let v = channel.value(s);
                lo = lo.min(v);
                hi = hi.max(v);
            }
        }
        if !lo.is_finite() || !hi.is_finite() {
            lo = 0.0;
            hi = 1.0;
        }
        if hi <= lo {
            let fallback = (hi.abs() * 0.1 + 0.01).max(0.01);
            lo -= fallback * 0.5;
            hi += fallback * 0.5;
        }
        let pad = (hi - lo) * 0.05;
        ((lo - pad).max(0.0), hi + pad)
    }

    /// Time labels along the X axis
    pub fn x_ticks(&self) -> Vec<(f32, String)> {
        if self.axis.is_empty() || self.plot.is_degenerate() {
            return Vec::new();
        }
        let (ts, te) = self.visible_time_span();
        (0..=TICK_INTERVALS)
            .map(|i| {
                let alpha = i as f32 / TICK_INTERVALS as f32;
                let x = self.plot.left + alpha * self.plot.width();
                (x, format_time_label(ts + f64::from(alpha) * (te - ts)))
            })
            .collect()
    }

    /// Value labels along the Y axis
    pub fn y_ticks(&self, range: (f64, f64)) -> Vec<(f32, String)> {
        (0..=TICK_INTERVALS)
            .map(|i| {
                let alpha = i as f64 / TICK_INTERVALS as f64;
                let value = range.0 + alpha * (range.1 - range.0);
                (self.value_to_pixel_y(value, range), format!("{:.2} ms", value))
            })
            .collect()
    }

    // Selection & hover

    /// Normalized selection; `None` while nothing or a single point is selected
    pub fn current_selection(&self) -> Option<(usize, usize)> {
        let (a, b) = self.selection?;
        match a.cmp(&b) {
            std::cmp::Ordering::Less => Some((a, b)),
            std::cmp::Ordering::Greater => Some((b, a)),
            std::cmp::Ordering::Equal => None,
        }
    }

    pub fn clear_selection(&mut self) {
        self.selection = None;
        if self.drag == Drag::Selecting {
            self.drag = Drag::Idle;
        }
        self.events.push(ViewEvent::SelectionChanged(None));
    }

    pub fn current_hover(&self) -> Option<usize> {
        self.hover
    }

    /// Pointer position of the last hover update
    pub fn hover_local(&self) -> Vec2 {
        self.hover_local
    }

    pub fn is_hover_locked(&self) -> bool {
        self.hover_locked
    }

    pub fn is_panning(&self) -> bool {
        matches!(self.drag, Drag::Panning { .. })
    }

    pub fn is_selecting(&self) -> bool {
        self.drag == Drag::Selecting
    }

    /// Stats over the current selection of `samples`
    pub fn range_stats(&self, samples: &[FrameSample], filter: Option<&LabelFilter>) -> Option<RangeStats> {
        let (start, end) = self.current_selection()?;
        RangeStats::compute(samples, start, end, filter)
    }

    /// Take the pending notifications
    pub fn drain_events(&mut self) -> Vec<ViewEvent> {
        std::mem::take(&mut self.events)
    }

    // Pointer input (each returns whether a repaint is needed)

    pub fn on_pointer_down(&mut self, button: PointerButton, modifiers: Modifiers, pos: Vec2) -> bool {
        match button {
            PointerButton::Left if modifiers.ctrl => {
                self.hover_locked = !self.hover_locked;
                tracing::debug!("Hover lock {}", if self.hover_locked { "on" } else { "off" });
                self.events.push(ViewEvent::HoverChanged {
                    index: self.hover,
                    local: self.hover_local,
                });
                true
            }
            PointerButton::Left => {
                if self.drag != Drag::Idle {
                    return false;
                }
                let Some(index) = self.index_at_pixel(pos.x) else {
                    return false;
                };
                tracing::debug!("Begin selection at {}", index);
                self.selection = Some((index, index));
                self.drag = Drag::Selecting;
                true
            }
            PointerButton::Middle | PointerButton::Right => {
                if self.drag != Drag::Idle {
                    return false;
                }
                tracing::debug!("Begin panning at x={:.1}, start={}", pos.x, self.window_start);
                self.drag = Drag::Panning {
                    button,
                    anchor_x: pos.x,
                    anchor_start: self.window_start,
                };
                false
            }
        }
    }

    pub fn on_pointer_move(&mut self, pos: Vec2) -> bool {
        let mut repaint = self.advance_drag(pos);
        if !self.hover_locked {
            self.hover = self.index_at_pixel(pos.x);
            self.hover_local = pos;
            self.events.push(ViewEvent::HoverChanged {
                index: self.hover,
                local: pos,
            });
            repaint = true;
        }
        repaint
    }

    /// Pointer moved outside the widget while a pan or selection holds it; hover is left alone
    pub fn on_drag_outside(&mut self, pos: Vec2) -> bool {
        self.advance_drag(pos)
    }

    pub fn on_pointer_up(&mut self, button: PointerButton) -> bool {
        match self.drag {
            Drag::Selecting if button == PointerButton::Left => {
                self.finish_selection();
                true
            }
            Drag::Panning { button: pan_button, .. } if pan_button == button => {
                tracing::debug!("End panning at start={}", self.window_start);
                self.drag = Drag::Idle;
                false
            }
            _ => false,
        }
    }

    pub fn on_pointer_leave(&mut self) -> bool {
        if self.is_panning() {
            tracing::debug!("Pointer left graph; ending pan");
            self.drag = Drag::Idle;
        }
        if self.hover_locked {
            return false;
        }
        self.hover = None;
        self.events.push(ViewEvent::HoverChanged {
            index: None,
            local: self.hover_local,
        });
        true
    }

    pub fn on_capture_lost(&mut self) -> bool {
        match self.drag {
            Drag::Panning { .. } => {
                tracing::debug!("Pointer capture lost; ending pan");
                self.drag = Drag::Idle;
                false
            }
            Drag::Selecting => {
                self.finish_selection();
                true
            }
            Drag::Idle => false,
        }
    }

    /// Zoom around the sample under the cursor; positive `delta` zooms in
    pub fn on_wheel(&mut self, delta: f32, pos: Vec2) -> bool {
        let n = self.axis.len();
        if delta == 0.0 || n == 0 || self.window_count == 0 {
            return false;
        }

        let anchor = self
            .index_at_pixel(pos.x)
            .unwrap_or(self.window_start + self.window_count / 2);
        let (ts, te) = self.visible_time_span();
        let range = te - ts;
        let alpha = if range > 0.0 {
            ((self.axis.start(anchor) - ts) / range).clamp(0.0, 1.0)
        } else {
            0.0
        };

        let delta = f64::from(delta);
        let factor = if delta > 0.0 {
            self.config.zoom_in_base.powf(delta)
        } else {
            self.config.zoom_out_base.powf(-delta)
        };
        let count = ((self.window_count as f64 * factor).round() as usize).clamp(1, n);
        let offset = (alpha * (count - 1) as f64).round() as usize;
        let start = anchor.saturating_sub(offset).min(n - count);

        if (start, count) == (self.window_start, self.window_count) {
            return false;
        }
        tracing::debug!("Zoom {:+.1}: window {}+{} -> {}+{}", delta, self.window_start, self.window_count, start, count);
        self.window_start = start;
        self.window_count = count;
        true
    }

    fn advance_drag(&mut self, pos: Vec2) -> bool {
        match self.drag {
            Drag::Panning {
                anchor_x,
                anchor_start,
                ..
            } => self.pan_to(anchor_x, anchor_start, pos.x),
            Drag::Selecting => {
                let x = pos.x.clamp(self.plot.left, self.plot.right.max(self.plot.left));
                let Some(index) = self.index_at_pixel(x) else {
                    return false;
                };
                let Some(sel) = self.selection.as_mut() else {
                    return false;
                };
                sel.1 = index;
                let current = self.current_selection();
                self.events.push(ViewEvent::SelectionChanged(current));
                true
            }
            Drag::Idle => false,
        }
    }

    fn pan_to(&mut self, anchor_x: f32, anchor_start: usize, x: f32) -> bool {
        let width = self.plot.width();
        let n = self.axis.len();
        if width <= 0.0 || n == 0 {
            return false;
        }
        let shift = (f64::from(x - anchor_x) / f64::from(width) * self.window_count as f64).round() as i64;
        let max_start = (n - self.window_count) as i64;
        let start = (anchor_start as i64 - shift).clamp(0, max_start) as usize;
        if start == self.window_start {
            return false;
        }
        self.window_start = start;
        true
    }

    fn finish_selection(&mut self) {
        self.drag = Drag::Idle;
        self.selection = self.current_selection();
        tracing::debug!("Selection committed: {:?}", self.selection);
        self.events.push(ViewEvent::SelectionChanged(self.selection));
    }
}

impl Default for ViewState {
    fn default() -> Self {
        Self::new(GraphConfig::default())
    }
}

/// Axis label for a time in milliseconds
pub fn format_time_label(time_ms: f64) -> String {
    if time_ms >= 1000.0 {
        format!("{:.2}s", time_ms / 1000.0)
    } else {
        format!("{:.1}ms", time_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const SIZE: Vec2 = Vec2::new(1000.0, 300.0);

    fn view_with(durations: &[f64]) -> ViewState {
        let mut view = ViewState::default();
        view.set_size(SIZE);
        view.reset(TimeAxis::from_durations(durations.iter().copied()));
        view
    }

    fn uniform(n: usize, ms: f64) -> ViewState {
        view_with(&vec![ms; n])
    }

    fn at(x: f32) -> Vec2 {
        Vec2::new(x, 150.0)
    }

    #[test]
    fn test_click_without_drag_cancels_selection() {
        let mut view = uniform(100, 16.0);
        assert!(view.on_pointer_down(PointerButton::Left, Modifiers::NONE, at(100.0)));
        assert!(view.drain_events().is_empty());
        assert!(view.on_pointer_up(PointerButton::Left));

        assert_eq!(view.current_selection(), None);
        assert_eq!(view.drain_events(), vec![ViewEvent::SelectionChanged(None)]);
    }

    #[test]
    fn test_drag_selection_is_normalized() {
        let mut view = uniform(100, 16.0);
        view.on_pointer_down(PointerButton::Left, Modifiers::NONE, at(700.0));
        view.on_pointer_move(at(200.0));
        assert!(view.is_selecting());
        let live = view.current_selection().unwrap();
        assert!(live.0 < live.1);
        assert!(view
            .drain_events()
            .contains(&ViewEvent::SelectionChanged(Some(live))));

        view.on_pointer_up(PointerButton::Left);
        assert!(!view.is_selecting());
        assert_eq!(view.current_selection(), Some(live));
        assert_eq!(view.index_at_pixel(200.0), Some(live.0));
        assert_eq!(view.index_at_pixel(700.0), Some(live.1));
    }

    #[test]
    fn test_click_outside_plot_does_not_select() {
        let mut view = uniform(100, 16.0);
        assert!(!view.on_pointer_down(PointerButton::Left, Modifiers::NONE, at(10.0)));
        assert!(!view.is_selecting());
    }

    #[test]
    fn test_capture_lost_commits_selection() {
        let mut view = uniform(100, 16.0);
        view.on_pointer_down(PointerButton::Left, Modifiers::NONE, at(200.0));
        view.on_pointer_move(at(400.0));
        view.drain_events();

        assert!(view.on_capture_lost());
        assert!(!view.is_selecting());
        let selection = view.current_selection();
        assert!(selection.is_some());
        assert_eq!(view.drain_events(), vec![ViewEvent::SelectionChanged(selection)]);
    }

    #[test]
    fn test_capture_lost_ends_pan() {
        let mut view = uniform(1000, 10.0);
        view.set_window(300, 100);
        view.on_pointer_down(PointerButton::Right, Modifiers::NONE, at(400.0));
        view.on_pointer_move(at(600.0));
        let start = view.window_start();
        view.drain_events();

        assert!(!view.on_capture_lost());
        assert!(!view.is_panning());
        assert!(view.drain_events().is_empty());
        view.on_pointer_move(at(900.0));
        assert_eq!(view.window_start(), start);
    }

    #[test]
    fn test_selection_drag_outside_keeps_hover_cleared() {
        let mut view = uniform(100, 10.0);
        view.on_pointer_move(at(300.0));
        view.on_pointer_down(PointerButton::Left, Modifiers::NONE, at(300.0));
        view.on_pointer_leave();
        assert_eq!(view.current_hover(), None);
        view.drain_events();

        // Above the widget but level with the plot
        assert!(view.on_drag_outside(Vec2::new(600.0, -40.0)));
        assert_eq!(view.current_hover(), None);
        let selection = view.current_selection();
        assert!(selection.is_some());
        assert_eq!(view.drain_events(), vec![ViewEvent::SelectionChanged(selection)]);
    }

    #[test]
    fn test_clear_selection() {
        let mut view = uniform(100, 16.0);
        view.on_pointer_down(PointerButton::Left, Modifiers::NONE, at(200.0));
        view.on_pointer_move(at(400.0));
        view.on_pointer_up(PointerButton::Left);
        view.drain_events();

        view.clear_selection();
        assert_eq!(view.current_selection(), None);
        assert_eq!(view.drain_events(), vec![ViewEvent::SelectionChanged(None)]);
    }

    #[test]
    fn test_round_trip_on_non_uniform_axis() {
        let durations: Vec<f64> = (0..101).map(|i| if i % 2 == 0 { 10.0 } else { 20.0 }).collect();
        let mut view = view_with(&durations);

        for i in 0..durations.len() {
            let x = view.index_to_pixel_x(i).unwrap();
            assert_eq!(view.index_at_pixel(x), Some(i), "full window, index {}", i);
        }

        view.set_window(17, 40);
        for i in 17..57 {
            let x = view.index_to_pixel_x(i).unwrap();
            assert_eq!(view.index_at_pixel(x), Some(i), "zoomed window, index {}", i);
        }
    }

    #[test]
    fn test_index_at_pixel_is_time_based() {
        // First sample takes 90% of the time
        let view = view_with(&[90.0, 5.0, 5.0]);
        let plot = view.plot();
        let x = plot.left + plot.width() * 0.5;
        assert_eq!(view.index_at_pixel(x), Some(0));
        assert_eq!(view.index_at_pixel(plot.right), Some(2));
        assert_eq!(view.index_at_pixel(plot.left - 1.0), None);
        assert_eq!(view.index_at_pixel(plot.right + 1.0), None);
    }

    #[test]
    fn test_degenerate_geometry() {
        let mut view = uniform(10, 16.0);
        view.set_size(Vec2::new(90.0, 300.0));
        assert!(view.plot().is_degenerate());
        assert_eq!(view.index_at_pixel(60.0), None);
        assert_eq!(view.index_to_pixel_x(3), None);
        assert!(view.x_ticks().is_empty());

        let mut empty = ViewState::default();
        empty.set_size(SIZE);
        assert_eq!(empty.index_at_pixel(300.0), None);
        assert_eq!(empty.visible_index_range(), None);
        assert!(!empty.on_wheel(1.0, at(300.0)));
        assert!(!empty.on_pointer_down(PointerButton::Left, Modifiers::NONE, at(300.0)));
    }

    #[test]
    fn test_pan_shifts_window_by_fraction_of_count() {
        let mut view = uniform(1000, 10.0);
        view.set_window(500, 100);
        let half = view.plot().width() * 0.5;

        assert!(!view.on_pointer_down(PointerButton::Middle, Modifiers::NONE, at(500.0)));
        assert!(view.is_panning());
        view.on_pointer_move(at(500.0 + half));
        assert_eq!(view.window_start(), 450);
        view.on_pointer_move(at(500.0 - half));
        assert_eq!(view.window_start(), 550);

        // Other button does not end the pan
        view.on_pointer_up(PointerButton::Right);
        assert!(view.is_panning());
        view.on_pointer_up(PointerButton::Middle);
        assert!(!view.is_panning());
        assert_eq!(view.window_count(), 100);
    }

    #[test]
    fn test_pan_clamps_and_ends_on_leave() {
        let mut view = uniform(1000, 10.0);
        view.set_window(50, 100);
        view.on_pointer_down(PointerButton::Right, Modifiers::NONE, at(100.0));
        view.on_pointer_move(at(5000.0));
        assert_eq!(view.window_start(), 0);
        view.on_pointer_move(at(-9000.0));
        assert_eq!(view.window_start(), 900);

        view.on_pointer_leave();
        assert!(!view.is_panning());
    }

    #[test]
    fn test_hover_tracks_pointer_and_clears_on_leave() {
        let mut view = uniform(100, 10.0);
        assert!(view.on_pointer_move(at(300.0)));
        let hovered = view.current_hover();
        assert!(hovered.is_some());
        assert_eq!(
            view.drain_events(),
            vec![ViewEvent::HoverChanged {
                index: hovered,
                local: at(300.0)
            }]
        );

        view.on_pointer_move(at(20.0));
        assert_eq!(view.current_hover(), None);

        view.on_pointer_move(at(300.0));
        assert!(view.on_pointer_leave());
        assert_eq!(view.current_hover(), None);
    }

    #[test]
    fn test_hover_lock_survives_leave() {
        let mut view = uniform(100, 10.0);
        view.on_pointer_move(at(300.0));
        let hovered = view.current_hover();
        view.drain_events();

        assert!(view.on_pointer_down(PointerButton::Left, Modifiers::CTRL, at(300.0)));
        assert!(view.is_hover_locked());
        assert!(!view.is_selecting());
        assert_eq!(
            view.drain_events(),
            vec![ViewEvent::HoverChanged {
                index: hovered,
                local: at(300.0)
            }]
        );

        view.on_pointer_move(at(800.0));
        assert!(!view.on_pointer_leave());
        assert_eq!(view.current_hover(), hovered);

        view.on_pointer_down(PointerButton::Left, Modifiers::CTRL, at(800.0));
        assert!(!view.is_hover_locked());
        view.on_pointer_leave();
        assert_eq!(view.current_hover(), None);
    }

    #[test]
    fn test_zoom_keeps_anchor_under_cursor() {
        let mut view = uniform(1000, 10.0);
        let plot = view.plot();
        let center = plot.left + plot.width() * 0.5;
        assert_eq!(view.index_at_pixel(center), Some(500));

        assert!(view.on_wheel(1.0, at(center)));
        assert_eq!(view.window_count(), 800);
        assert_eq!(view.window_start(), 100);
        assert_eq!(view.index_at_pixel(center), Some(500));

        assert!(view.on_wheel(-1.0, at(center)));
        assert_eq!((view.window_start(), view.window_count()), (0, 1000));
        assert!(!view.on_wheel(-1.0, at(center)));
    }

    #[test]
    fn test_zoom_anchor_uses_time_fraction() {
        // One long frame then short ones: time and index fractions differ
        let mut durations = vec![90.0];
        durations.extend(std::iter::repeat(5.0).take(99));
        let mut view = view_with(&durations);

        let x = view.index_to_pixel_x(50).unwrap();
        assert_eq!(view.index_at_pixel(x), Some(50));

        // Anchor at 335 of 585 ms: round(0.5726 * 79) = 45 samples before it
        assert!(view.on_wheel(1.0, at(x)));
        assert_eq!(view.window_count(), 80);
        assert_eq!(view.window_start(), 5);
        assert_eq!(view.index_at_pixel(x), Some(50));
    }

    #[test]
    fn test_zoom_outside_plot_anchors_on_window_center() {
        let mut view = uniform(1000, 10.0);
        view.set_window(200, 500);
        view.on_wheel(2.0, at(5.0));
        // 500 * 0.64 = 320 frames around index 450
        assert_eq!(view.window_count(), 320);
        let (lo, hi) = view.visible_index_range().unwrap();
        assert!(lo <= 450 && 450 <= hi);
    }

    #[test]
    fn test_zoom_never_below_one_sample() {
        let mut view = uniform(10, 10.0);
        for _ in 0..50 {
            view.on_wheel(3.0, at(400.0));
        }
        assert_eq!(view.window_count(), 1);
        assert!(view.window_start() < 10);
    }

    #[test]
    fn test_reset_clears_state() {
        let mut view = uniform(100, 10.0);
        view.set_window(20, 30);
        view.on_pointer_move(at(300.0));
        view.on_pointer_down(PointerButton::Left, Modifiers::CTRL, at(300.0));
        view.on_pointer_down(PointerButton::Left, Modifiers::NONE, at(200.0));

        view.reset(TimeAxis::from_durations([16.0; 5]));
        assert_eq!((view.window_start(), view.window_count()), (0, 5));
        assert_eq!(view.current_selection(), None);
        assert_eq!(view.current_hover(), None);
        assert!(!view.is_hover_locked());
        assert!(!view.is_selecting());
        assert!(view.drain_events().is_empty());
    }

    #[test]
    fn test_load_restores_default_channels() {
        let mut view = ViewState::default().with_visible_channels([Channel::Frame, Channel::Game, Channel::Draw, Channel::Gpu]);
        view.set_size(SIZE);
        let first = Capture::from_samples("A", vec![FrameSample::splat(10.0); 10], 0.1);
        let second = Capture::from_samples("B", vec![FrameSample::splat(12.0); 20], 0.24);

        view.load_capture(&first);
        view.toggle_channel(Channel::Rhi);
        view.toggle_channel(Channel::Frame);
        assert_eq!(
            view.visible_channels().collect::<Vec<_>>(),
            vec![Channel::Game, Channel::Draw, Channel::Rhi, Channel::Gpu]
        );

        view.load_capture(&second);
        assert_eq!(
            view.visible_channels().collect::<Vec<_>>(),
            vec![Channel::Frame, Channel::Game, Channel::Draw, Channel::Gpu]
        );
    }

    #[test]
    fn test_set_window_full_range_and_clamp() {
        let mut view = uniform(100, 10.0);
        view.set_window(90, 30);
        assert_eq!((view.window_start(), view.window_count()), (70, 30));
        view.set_window(5, 0);
        assert_eq!((view.window_start(), view.window_count()), (0, 100));
        assert_eq!(view.visible_index_range(), Some((0, 99)));
    }

    #[test]
    fn test_value_range_padding() {
        let mut view = uniform(3, 10.0);
        let samples = vec![
            FrameSample::from_channels(10.0, 2.0, 4.0, 50.0, 8.0),
            FrameSample::from_channels(20.0, 3.0, 5.0, 60.0, 9.0),
            FrameSample::from_channels(30.0, 4.0, 6.0, 70.0, 10.0),
        ];
        // RHI hidden by default
        let (lo, hi) = view.value_range(&samples);
        assert!((lo - 0.6).abs() < 1e-9);
        assert!((hi - 31.4).abs() < 1e-9);

        view.toggle_channel(Channel::Rhi);
        let (_, hi) = view.value_range(&samples);
        assert!((hi - 73.4).abs() < 1e-9);
    }

    #[test]
    fn test_value_range_flat_and_empty() {
        let mut view = uniform(2, 10.0);
        view.set_channel_visible(Channel::Game, false);
        view.set_channel_visible(Channel::Draw, false);
        view.set_channel_visible(Channel::Gpu, false);
        let samples = vec![FrameSample::splat(10.0); 2];

        let (lo, hi) = view.value_range(&samples);
        assert!(lo < 10.0 && hi > 10.0);
        assert!((hi - lo - 1.01 * 1.1).abs() < 1e-9);

        let (lo, hi) = view.value_range(&[]);
        assert_eq!(lo, 0.0);
        assert!((hi - 1.05).abs() < 1e-9);
    }

    #[test]
    fn test_axis_labels() {
        assert_eq!(format_time_label(250.0), "250.0ms");
        assert_eq!(format_time_label(1500.0), "1.50s");

        let view = uniform(200, 10.0);
        let ticks = view.x_ticks();
        assert_eq!(ticks.len(), TICK_INTERVALS + 1);
        assert_eq!(ticks[0].1, "0.0ms");
        assert_eq!(ticks[5].1, "2.00s");
        assert_eq!(ticks[0].0, view.plot().left);

        let y = view.y_ticks((0.0, 20.0));
        assert_eq!(y[0].1, "0.00 ms");
        assert_eq!(y[5].1, "20.00 ms");
        assert_eq!(y[0].0, view.plot().bottom);
    }

    #[test]
    fn test_range_stats_follow_selection() {
        let samples: Vec<FrameSample> = (0..100).map(|i| FrameSample::splat(i as f64 + 1.0)).collect();
        let mut view = view_with(&samples.iter().map(|s| s.frame_ms).collect::<Vec<_>>());
        assert!(view.range_stats(&samples, None).is_none());

        view.on_pointer_down(PointerButton::Left, Modifiers::NONE, at(300.0));
        view.on_pointer_move(at(700.0));
        view.on_pointer_up(PointerButton::Left);

        let (start, end) = view.current_selection().unwrap();
        let stats = view.range_stats(&samples, None).unwrap();
        assert_eq!(stats.frame_count, end - start + 1);
        assert_eq!(stats.min_frame_ms, start as f64 + 1.0);
        assert_eq!(stats.max_frame_ms, end as f64 + 1.0);
    }

    #[derive(Debug, Clone)]
    enum Gesture {
        PanDown(f32),
        Move(f32),
        PanUp,
        Wheel(i8, f32),
        Leave,
        Select(f32, f32),
    }

    fn gesture() -> impl Strategy<Value = Gesture> {
        let x = -200.0f32..1200.0;
        prop_oneof![
            x.clone().prop_map(Gesture::PanDown),
            x.clone().prop_map(Gesture::Move),
            Just(Gesture::PanUp),
            (-4i8..=4, x.clone()).prop_map(|(d, x)| Gesture::Wheel(d, x)),
            Just(Gesture::Leave),
            (x.clone(), x).prop_map(|(a, b)| Gesture::Select(a, b)),
        ]
    }

    proptest! {
        #[test]
        fn test_window_stays_in_bounds(
            durations in prop::collection::vec(0.5f64..40.0, 1..400),
            gestures in prop::collection::vec(gesture(), 1..80),
        ) {
            let mut view = view_with(&durations);
            let n = durations.len();

            for g in gestures {
                match g {
                    Gesture::PanDown(x) => { view.on_pointer_down(PointerButton::Middle, Modifiers::NONE, at(x)); }
                    Gesture::Move(x) => { view.on_pointer_move(at(x)); }
                    Gesture::PanUp => { view.on_pointer_up(PointerButton::Middle); }
                    Gesture::Wheel(d, x) => { view.on_wheel(f32::from(d), at(x)); }
                    Gesture::Leave => { view.on_pointer_leave(); }
                    Gesture::Select(a, b) => {
                        view.on_pointer_down(PointerButton::Left, Modifiers::NONE, at(a));
                        view.on_pointer_move(at(b));
                        view.on_pointer_up(PointerButton::Left);
                    }
                }

                prop_assert!(view.window_count() >= 1);
                prop_assert!(view.window_start() + view.window_count() <= n);
                if let Some((a, b)) = view.current_selection() {
                    prop_assert!(a < b && b < n);
                }
                if let Some(h) = view.current_hover() {
                    prop_assert!(h < n);
                }
            }
        }
    }
}
