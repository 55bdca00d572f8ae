//! Capture statistics panels
//!
//! Whole-capture summary (avg/min/max rows, spikes, per-label breakdown) and
//! the stats of the selected range.

use super::graph::channel_color;
use crate::capture::{Capture, Channel, FrameSample, LabelFilter, LabelStats, RangeStats, Summary};
use egui::{Color32, RichText};

/// Colour for an FPS figure: green at 55+, yellow at 30+, red below
pub fn fps_color(fps: f64) -> Color32 {
    if fps > 55.0 {
        Color32::GREEN
    } else if fps > 30.0 {
        Color32::YELLOW
    } else {
        Color32::RED
    }
}

/// Colour for a spike share: red once more than `alarm` percent of frames spike
fn spike_color(frames_pct: f64, alarm: f64) -> Color32 {
    if frames_pct > alarm {
        Color32::RED
    } else if frames_pct > alarm / 4.0 {
        Color32::YELLOW
    } else {
        Color32::GRAY
    }
}

/// Summary of a whole capture
pub fn render_summary(ui: &mut egui::Ui, capture: &Capture, filter: &LabelFilter) {
    let summary = &capture.summary;

    ui.horizontal(|ui| {
        ui.label(RichText::new(&capture.name).strong().color(Color32::WHITE));
        ui.label(
            RichText::new(capture.recorded_at.format("%Y-%m-%d %H:%M:%S").to_string())
                .small()
                .weak(),
        );
    });
    ui.label(format!(
        "{} frames over {:.2}s",
        summary.sample_count, summary.total_elapsed_seconds
    ));
    ui.horizontal(|ui| {
        ui.label("Average:");
        let fps = summary.average_fps();
        ui.colored_label(fps_color(fps), format!("{:.1} FPS", fps));
    });

    ui.add_space(4.0);
    channel_grid(ui, summary);

    if let Some(report) = &summary.spikes {
        ui.add_space(6.0);
        ui.label(RichText::new("Spikes").strong());
        egui::Grid::new("spike_grid")
            .num_columns(4)
            .spacing([12.0, 2.0])
            .striped(true)
            .show(ui, |ui| {
                ui.label("");
                ui.label("Count");
                ui.label("Frames");
                ui.label("Time");
                ui.end_row();
                for c in &report.channels {
                    ui.colored_label(channel_color(c.channel), c.channel.name())
                        .on_hover_text(format!("> {:.2} ms", c.threshold_ms));
                    ui.monospace(c.count.to_string());
                    ui.colored_label(spike_color(c.frames_pct, 5.0), format!("{:.2}%", c.frames_pct));
                    ui.monospace(format!("{:.2}%", c.time_pct));
                    ui.end_row();
                }
            });
    }

    let rows: Vec<&LabelStats> = summary.filtered_labels(filter).collect();
    if !rows.is_empty() {
        ui.add_space(6.0);
        ui.label(RichText::new("Breakdown (slowest first)").strong());
        label_grid(ui, "summary_labels", &rows);
    }
}

/// Stats of the selected range, or a hint when nothing is selected
pub fn render_range_stats(ui: &mut egui::Ui, stats: Option<&RangeStats>) {
    ui.label(RichText::new("Selection").strong());
    let Some(stats) = stats else {
        ui.label(RichText::new("Drag on the graph to select a range").small().weak());
        return;
    };

    egui::Grid::new("range_grid")
        .num_columns(2)
        .spacing([20.0, 2.0])
        .show(ui, |ui| {
            ui.label("Frames:");
            ui.monospace(format!("{}..={} ({})", stats.start, stats.end, stats.frame_count));
            ui.end_row();

            ui.label("Avg:");
            ui.monospace(format!("{:.2} ms", stats.avg_frame_ms));
            ui.end_row();

            ui.label("Min:");
            ui.monospace(format!("{:.2} ms", stats.min_frame_ms));
            ui.end_row();

            ui.label("Max:");
            ui.monospace(format!("{:.2} ms", stats.max_frame_ms));
            ui.end_row();

            ui.label("FPS:");
            ui.colored_label(fps_color(stats.avg_fps), format!("{:.1}", stats.avg_fps));
            ui.end_row();
        });

    if !stats.labels.is_empty() {
        let rows: Vec<&LabelStats> = stats.labels.iter().collect();
        label_grid(ui, "range_labels", &rows);
    }
}

fn channel_grid(ui: &mut egui::Ui, summary: &Summary) {
    let rows: [(&str, &FrameSample); 3] = [("Avg", &summary.avg), ("Min", &summary.min), ("Max", &summary.max)];

    egui::Grid::new("channel_grid")
        .num_columns(Channel::ALL.len() + 1)
        .spacing([10.0, 2.0])
        .striped(true)
        .show(ui, |ui| {
            ui.label("");
            for channel in Channel::ALL {
                ui.colored_label(channel_color(channel), channel.name());
            }
            ui.end_row();

            for (tag, sample) in rows {
                ui.label(tag);
                for channel in Channel::ALL {
                    ui.monospace(format!("{:.2}", channel.value(sample)));
                }
                ui.end_row();
            }
        });
}

fn label_grid(ui: &mut egui::Ui, id: &str, rows: &[&LabelStats]) {
    egui::Grid::new(id)
        .num_columns(4)
        .spacing([12.0, 2.0])
        .striped(true)
        .show(ui, |ui| {
            ui.label("");
            ui.label("Avg");
            ui.label("Min");
            ui.label("Max");
            ui.end_row();
            for row in rows {
                ui.label(&row.label);
                ui.monospace(format!("{:.2}", row.avg_ms));
                ui.monospace(format!("{:.2}", row.min_ms));
                ui.monospace(format!("{:.2}", row.max_ms));
                ui.end_row();
            }
        });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fps_color_thresholds() {
        assert_eq!(fps_color(60.0), Color32::GREEN);
        assert_eq!(fps_color(45.0), Color32::YELLOW);
        assert_eq!(fps_color(20.0), Color32::RED);
        assert_eq!(fps_color(0.0), Color32::RED);
    }

    #[test]
    fn test_spike_color_thresholds() {
        assert_eq!(spike_color(10.0, 5.0), Color32::RED);
        assert_eq!(spike_color(2.0, 5.0), Color32::YELLOW);
        assert_eq!(spike_color(0.5, 5.0), Color32::GRAY);
    }
}
