use std::f32::consts::TAU;

use eframe::egui::{Color32, Pos2, RichText, Sense, Shape, Stroke, Ui, Vec2};
use egui_extras::{Column, TableBuilder};
use egui_plot::{Bar, BarChart, BoxElem, BoxPlot, BoxSpread, GridMark, Legend, Line, Plot, PlotPoints, Points};

use crate::data::table::TableData;

const CHART_HEIGHT: f32 = 320.0;

// ---------------------------------------------------------------------------
// Axis helpers
// ---------------------------------------------------------------------------

/// Formatter that labels integer grid marks with category names.
fn category_axis(labels: Vec<String>) -> impl Fn(GridMark, &std::ops::RangeInclusive<f64>) -> String {
    move |mark, _range| {
        let idx = mark.value.round();
        if (mark.value - idx).abs() > 1e-6 || idx < 0.0 {
            return String::new();
        }
        labels.get(idx as usize).cloned().unwrap_or_default()
    }
}

fn base_plot(id: &str) -> Plot {
    Plot::new(id.to_owned())
        .height(CHART_HEIGHT)
        .allow_scroll(false)
        .allow_drag(false)
        .allow_boxed_zoom(false)
        .show_grid([false, true])
}

// ---------------------------------------------------------------------------
// Bar / line / scatter
// ---------------------------------------------------------------------------

/// One bar per `(label, value)`. Horizontal bars list categories down the y
/// axis with the first entry on top.
pub fn bar_chart(
    ui: &mut Ui,
    id: &str,
    data: &[(String, f64)],
    horizontal: bool,
    value_label: &str,
    color: impl Fn(&str, f64) -> Color32,
) {
    let n = data.len();
    let bars: Vec<Bar> = data
        .iter()
        .enumerate()
        .map(|(i, (label, value))| {
            let pos = if horizontal { (n - 1 - i) as f64 } else { i as f64 };
            Bar::new(pos, *value)
                .name(label)
                .fill(color(label, *value))
                .width(0.7)
        })
        .collect();

    let mut labels: Vec<String> = data.iter().map(|(l, _)| l.clone()).collect();
    let mut chart = BarChart::new(bars);
    let mut plot = base_plot(id);
    if horizontal {
        labels.reverse();
        chart = chart.horizontal();
        plot = plot.y_axis_formatter(category_axis(labels)).x_axis_label(value_label.to_owned());
    } else {
        plot = plot.x_axis_formatter(category_axis(labels)).y_axis_label(value_label.to_owned());
    }
    plot.show(ui, |plot_ui| plot_ui.bar_chart(chart));
}

/// Line with markers across ordered categories.
pub fn line_chart(ui: &mut Ui, id: &str, data: &[(String, f64)], value_label: &str) {
    let points: Vec<[f64; 2]> = data
        .iter()
        .enumerate()
        .map(|(i, (_, v))| [i as f64, *v])
        .collect();
    let labels = data.iter().map(|(l, _)| l.clone()).collect();
    let color = crate::color::sequential(0.3);

    base_plot(id)
        .x_axis_formatter(category_axis(labels))
        .y_axis_label(value_label.to_owned())
        .show(ui, |plot_ui| {
            plot_ui.line(Line::new(PlotPoints::from(points.clone())).color(color).width(2.0));
            plot_ui.points(Points::new(points).radius(4.0).color(color));
        });
}

/// A marker in a scatter plot.
pub struct ScatterPoint {
    pub x: f64,
    pub y: f64,
    pub radius: f32,
    pub color: Color32,
    pub name: String,
}

pub fn scatter_chart(ui: &mut Ui, id: &str, points: &[ScatterPoint], x_label: &str, y_label: &str) {
    base_plot(id)
        .allow_drag(true)
        .show_grid(true)
        .x_axis_label(x_label.to_owned())
        .y_axis_label(y_label.to_owned())
        .legend(Legend::default())
        .show(ui, |plot_ui| {
            for p in points {
                plot_ui.points(
                    Points::new(vec![[p.x, p.y]])
                        .radius(p.radius)
                        .color(p.color)
                        .name(&p.name),
                );
            }
        });
}

// ---------------------------------------------------------------------------
// Distribution plots
// ---------------------------------------------------------------------------

/// Linear-interpolated quantile of sorted values.
fn quantile(sorted: &[f64], q: f64) -> f64 {
    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64)
}

/// Quartiles with whiskers at the furthest values within 1.5 IQR.
pub fn box_spread(values: &[f64]) -> Option<BoxSpread> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let q1 = quantile(&sorted, 0.25);
    let median = quantile(&sorted, 0.5);
    let q3 = quantile(&sorted, 0.75);
    let fence = 1.5 * (q3 - q1);
    let lower = sorted.iter().copied().find(|&v| v >= q1 - fence).unwrap_or(q1);
    let upper = sorted.iter().rev().copied().find(|&v| v <= q3 + fence).unwrap_or(q3);
    Some(BoxSpread::new(lower, q1, median, q3, upper))
}

/// Box per group, optionally overlaid with every observation.
pub fn box_chart(
    ui: &mut Ui,
    id: &str,
    groups: &[(String, Vec<f64>)],
    value_label: &str,
    show_points: bool,
    color: impl Fn(&str) -> Color32,
) {
    let labels = groups.iter().map(|(l, _)| l.clone()).collect();
    base_plot(id)
        .x_axis_formatter(category_axis(labels))
        .y_axis_label(value_label.to_owned())
        .show(ui, |plot_ui| {
            for (i, (label, values)) in groups.iter().enumerate() {
                let Some(spread) = box_spread(values) else {
                    continue;
                };
                let c = color(label);
                let elem = BoxElem::new(i as f64, spread)
                    .name(label)
                    .box_width(0.5)
                    .fill(c.gamma_multiply(0.4))
                    .stroke(Stroke::new(1.5, c));
                plot_ui.box_plot(BoxPlot::new(vec![elem]).name(label));

                if show_points {
                    // Spread points sideways so equal values stay visible.
                    let pts: Vec<[f64; 2]> = values
                        .iter()
                        .enumerate()
                        .map(|(j, v)| [i as f64 + 0.3 + (j % 7) as f64 * 0.02, *v])
                        .collect();
                    plot_ui.points(Points::new(pts).radius(1.5).color(c));
                }
            }
        });
}

// ---------------------------------------------------------------------------
// Pie chart (painted directly; egui_plot has none)
// ---------------------------------------------------------------------------

pub fn pie_chart(ui: &mut Ui, data: &[(String, f64)], color: impl Fn(&str) -> Color32) {
    let total: f64 = data.iter().map(|(_, v)| v.max(0.0)).sum();
    if total <= 0.0 {
        return;
    }

    ui.horizontal(|ui| {
        let size = CHART_HEIGHT * 0.8;
        let (rect, _) = ui.allocate_exact_size(Vec2::splat(size), Sense::hover());
        let painter = ui.painter_at(rect);
        let center = rect.center();
        let radius = size * 0.48;

        let mut start = -TAU / 4.0;
        for (label, value) in data {
            let sweep = (value.max(0.0) / total) as f32 * TAU;
            let steps = ((sweep / TAU) * 90.0).ceil().max(1.0) as usize;
            let fill = color(label);
            for s in 0..steps {
                let a0 = start + sweep * s as f32 / steps as f32;
                let a1 = start + sweep * (s + 1) as f32 / steps as f32;
                let p = |a: f32| Pos2::new(center.x + radius * a.cos(), center.y + radius * a.sin());
                painter.add(Shape::convex_polygon(vec![center, p(a0), p(a1)], fill, Stroke::NONE));
            }
            start += sweep;
        }

        ui.vertical(|ui| {
            for (label, value) in data {
                let share = 100.0 * value / total;
                ui.label(RichText::new(format!("■ {label}: {value:.0} ({share:.1}%)")).color(color(label)));
            }
        });
    });
}

// ---------------------------------------------------------------------------
// Tables
// ---------------------------------------------------------------------------

/// Scrollable, virtualised table. Returns true when the export button was
/// clicked.
pub fn data_table(ui: &mut Ui, id: &str, table: &TableData, max_height: f32) -> bool {
    let mut export = false;
    ui.push_id(id, |ui| {
        ui.horizontal(|ui| {
            ui.label(format!("{} rows", table.len()));
            export = ui.small_button("Export CSV…").clicked();
        });
        if table.columns.is_empty() {
            return;
        }
        TableBuilder::new(ui)
            .striped(true)
            .resizable(true)
            .max_scroll_height(max_height)
            .columns(Column::auto().at_least(60.0).clip(true), table.columns.len())
            .header(20.0, |mut header| {
                for col in &table.columns {
                    header.col(|ui| {
                        ui.strong(col);
                    });
                }
            })
            .body(|body| {
                body.rows(18.0, table.rows.len(), |mut row| {
                    let cells = &table.rows[row.index()];
                    for cell in cells {
                        row.col(|ui| {
                            ui.label(cell);
                        });
                    }
                });
            });
    });
    export
}

/// Section heading with an optional caption, as used above each chart.
pub fn heading(ui: &mut Ui, title: &str, caption: Option<&str>) {
    ui.add_space(8.0);
    ui.heading(title);
    if let Some(caption) = caption {
        ui.label(RichText::new(caption).italics().weak());
    }
}

/// Placeholder when a filter leaves nothing to draw.
pub fn empty_hint(ui: &mut Ui) {
    ui.label(RichText::new("No listings match the current filters.").weak());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quartiles_of_small_sample() {
        let spread = box_spread(&[1.0, 2.0, 3.0, 4.0, 5.0]).unwrap();
        assert_eq!(spread.quartile1, 2.0);
        assert_eq!(spread.median, 3.0);
        assert_eq!(spread.quartile3, 4.0);
        assert_eq!(spread.lower_whisker, 1.0);
        assert_eq!(spread.upper_whisker, 5.0);
    }

    #[test]
    fn whiskers_stop_at_fences() {
        let spread = box_spread(&[10.0, 11.0, 12.0, 13.0, 365.0]).unwrap();
        assert_eq!(spread.upper_whisker, 13.0);
        assert_eq!(spread.lower_whisker, 10.0);
    }

    #[test]
    fn no_values_no_box() {
        assert!(box_spread(&[]).is_none());
    }

    #[test]
    fn category_axis_labels_integer_marks_only() {
        let fmt = category_axis(vec!["FR".into(), "US".into()]);
        let range = 0.0..=1.0;
        let mark = |value| GridMark { value, step_size: 1.0 };
        assert_eq!(fmt(mark(1.0), &range), "US");
        assert_eq!(fmt(mark(0.5), &range), "");
        assert_eq!(fmt(mark(2.0), &range), "");
        assert_eq!(fmt(mark(-1.0), &range), "");
    }
}
