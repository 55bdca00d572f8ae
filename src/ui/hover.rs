//! Hover card next to the pointer

use super::graph::channel_color;
use crate::capture::{Capture, Channel, RangeStats};
use crate::view::ViewEvent;
use egui::{Color32, Pos2, RichText, Stroke};
use glam::Vec2;

/// Frame under the pointer, fed from [`ViewEvent::HoverChanged`]
#[derive(Debug, Clone, Copy, Default)]
pub struct HoverCard {
    index: Option<usize>,
    local: Vec2,
    locked: bool,
}

impl HoverCard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Track hover notifications; other events are ignored
    pub fn apply(&mut self, event: &ViewEvent) {
        if let ViewEvent::HoverChanged { index, local } = event {
            self.index = *index;
            self.local = *local;
        }
    }

    pub fn set_locked(&mut self, locked: bool) {
        self.locked = locked;
    }

    pub fn index(&self) -> Option<usize> {
        self.index
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Draw the card at the pointer position (`origin` is the graph's screen origin)
    pub fn show(&self, ctx: &egui::Context, origin: Pos2, capture: &Capture, range: Option<&RangeStats>) {
        let Some(index) = self.index else {
            return;
        };
        let Some(sample) = capture.samples.get(index) else {
            return;
        };

        let anchor = Pos2::new(origin.x + self.local.x + 16.0, origin.y + self.local.y + 16.0);
        egui::Area::new(egui::Id::new("hover_card"))
            .fixed_pos(anchor)
            .interactable(false)
            .show(ctx, |ui| {
                egui::Frame::popup(ui.style())
                    .fill(Color32::from_rgba_premultiplied(10, 10, 10, 230))
                    .stroke(Stroke::new(1.0, Color32::from_gray(60)))
                    .inner_margin(8.0)
                    .show(ui, |ui| {
                        ui.horizontal(|ui| {
                            ui.label(RichText::new(format!("Frame #{}", index)).strong().color(Color32::WHITE));
                            if self.locked {
                                ui.label(RichText::new("LOCKED").small().color(Color32::YELLOW));
                            }
                        });

                        egui::Grid::new("hover_channels")
                            .num_columns(2)
                            .spacing([16.0, 2.0])
                            .show(ui, |ui| {
                                for channel in Channel::ALL {
                                    ui.colored_label(channel_color(channel), channel.name());
                                    ui.monospace(format!("{:.2} ms", channel.value(sample)));
                                    ui.end_row();
                                }
                            });

                        if !sample.breakdown.is_empty() {
                            ui.separator();
                            for entry in &sample.breakdown {
                                ui.label(RichText::new(format!("{}: {:.2} ms", entry.label, entry.time_ms)).small());
                            }
                        }

                        if let Some(stats) = range {
                            ui.separator();
                            ui.label(
                                RichText::new(format!(
                                    "Range {}..={}  avg {:.2} ms  ({:.1} FPS)",
                                    stats.start, stats.end, stats.avg_frame_ms, stats.avg_fps
                                ))
                                .small()
                                .weak(),
                            );
                        }
                    });
            });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tracks_hover_events_only() {
        let mut card = HoverCard::new();
        card.apply(&ViewEvent::HoverChanged {
            index: Some(12),
            local: Vec2::new(40.0, 8.0),
        });
        assert_eq!(card.index(), Some(12));

        card.apply(&ViewEvent::SelectionChanged(Some((1, 5))));
        assert_eq!(card.index(), Some(12));

        card.apply(&ViewEvent::HoverChanged {
            index: None,
            local: Vec2::ZERO,
        });
        assert_eq!(card.index(), None);
    }
}
