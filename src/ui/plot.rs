use std::f64::consts::FRAC_PI_2;

use eframe::egui::{Color32, Rect, RichText, Stroke, Ui};
use egui_plot::{
    Bar, BarChart, Legend, Line, Plot, PlotPoint, PlotPoints, PlotUi, Points, Polygon, Text,
};

use crate::chart::prepare::{Band, ChartData, HistBin, PolarPoint, Series, Slice, XAxis};
use crate::color::{fill, generate_palette, series_color};
use crate::state::AppState;

/// Largest angle covered by one filled pie piece; keeps every piece convex.
const MAX_PIECE_ANGLE: f64 = FRAC_PI_2;

/// Arc resolution in radians.
const ARC_STEP: f64 = 0.035;

/// Polar charts with more points than this skip the point labels.
const MAX_POLAR_LABELS: usize = 24;

// ---------------------------------------------------------------------------
// Chart (central panel)
// ---------------------------------------------------------------------------

/// Render the last prepared chart in the central panel.
pub fn chart_plot(ui: &mut Ui, state: &mut AppState) {
    let hint = match (&state.dataset, &state.chart) {
        (None, _) => Some("Open a file to start  (File → Open…)"),
        (Some(_), None) => Some("Choose a chart type and columns, then press Plot"),
        _ => None,
    };
    if let Some(hint) = hint {
        state.plot_rect = None;
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading(hint);
        });
        return;
    }
    let Some(chart) = &state.chart else {
        return;
    };

    let rect = match chart {
        ChartData::Line { x_name, x, series } => line_chart(ui, x_name, x, series),
        ChartData::StackedArea { x_name, x, bands, .. } => area_chart(ui, x_name, x, bands),
        ChartData::Pie { slices, .. } => pie_chart(ui, slices),
        ChartData::Histogram { column, bins, .. } => histogram_chart(ui, column, bins),
        ChartData::Polar { column, points, .. } => polar_chart(ui, column, points),
    };
    state.plot_rect = Some(rect);
}

/// Cartesian plot with a categorical X formatter when needed.
fn show_cartesian(
    ui: &mut Ui,
    id: &str,
    x_name: &str,
    y_name: &str,
    x: Option<&XAxis>,
    add: impl FnOnce(&mut PlotUi),
) -> Rect {
    let mut plot = Plot::new(id)
        .legend(Legend::default())
        .x_axis_label(x_name)
        .y_axis_label(y_name)
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(true)
        .allow_zoom(true);

    if let Some(axis) = x.filter(|axis| axis.is_categorical()) {
        let axis = axis.clone();
        plot = plot.x_axis_formatter(move |mark, _range| {
            axis.label_at(mark.value).unwrap_or_default().to_string()
        });
    }
    plot.show(ui, add).response.rect
}

/// Round plot without axes, used by pie and polar charts.
fn show_round(ui: &mut Ui, id: &str, add: impl FnOnce(&mut PlotUi)) -> Rect {
    Plot::new(id)
        .legend(Legend::default())
        .data_aspect(1.0)
        .show_axes(false)
        .show_grid(false)
        .allow_drag(false)
        .allow_scroll(false)
        .allow_zoom(false)
        .allow_boxed_zoom(false)
        .show(ui, add)
        .response
        .rect
}

fn line_chart(ui: &mut Ui, x_name: &str, x: &XAxis, series: &[Series]) -> Rect {
    let colors = generate_palette(series.len());
    show_cartesian(ui, "line_chart", x_name, "Value", Some(x), |plot_ui| {
        for (s, &color) in series.iter().zip(&colors) {
            for segment in s.segments(x) {
                plot_ui.line(
                    Line::new(PlotPoints::from(segment.clone()))
                        .name(&s.name)
                        .color(color)
                        .width(1.5),
                );
                plot_ui.points(
                    Points::new(PlotPoints::from(segment))
                        .name(&s.name)
                        .color(color)
                        .radius(2.5),
                );
            }
        }
    })
}

fn area_chart(ui: &mut Ui, x_name: &str, x: &XAxis, bands: &[Band]) -> Rect {
    let colors = generate_palette(bands.len());
    show_cartesian(ui, "area_chart", x_name, "Value", Some(x), |plot_ui| {
        for (band, &color) in bands.iter().zip(&colors) {
            for quad in band_pieces(band) {
                plot_ui.polygon(
                    Polygon::new(PlotPoints::from(quad))
                        .name(&band.name)
                        .fill_color(fill(color))
                        .stroke(Stroke::NONE),
                );
            }
            plot_ui.line(
                Line::new(PlotPoints::from(band.upper.clone()))
                    .name(&band.name)
                    .color(color)
                    .width(1.0),
            );
        }
    })
}

fn pie_chart(ui: &mut Ui, slices: &[Slice]) -> Rect {
    let colors = generate_palette(slices.len());
    show_round(ui, "pie_chart", |plot_ui| {
        for (slice, &color) in slices.iter().zip(&colors) {
            for piece in wedge_pieces(slice.start_angle, slice.end_angle, 1.0) {
                plot_ui.polygon(
                    Polygon::new(PlotPoints::from(piece))
                        .name(&slice.label)
                        .fill_color(color)
                        .stroke(Stroke::new(0.7, Color32::WHITE)),
                );
            }
            let (s, c) = ((slice.start_angle + slice.end_angle) / 2.0).sin_cos();
            plot_ui.text(Text::new(
                PlotPoint::new(0.65 * c, 0.65 * s),
                RichText::new(format!("{:.1}%", slice.fraction * 100.0)).strong(),
            ));
            plot_ui.text(Text::new(PlotPoint::new(1.15 * c, 1.15 * s), slice.label.as_str()));
        }
    })
}

fn histogram_chart(ui: &mut Ui, column: &str, bins: &[HistBin]) -> Rect {
    let color = series_color(0, 1);
    let bars: Vec<Bar> = bins
        .iter()
        .map(|b| {
            Bar::new((b.start + b.end) / 2.0, b.count as f64)
                .width(b.end - b.start)
                .stroke(Stroke::new(1.0, Color32::BLACK))
        })
        .collect();

    show_cartesian(ui, "histogram_chart", column, "Count", None, |plot_ui| {
        plot_ui.bar_chart(BarChart::new(bars).name(column).color(color));
    })
}

fn polar_chart(ui: &mut Ui, column: &str, points: &[PolarPoint]) -> Rect {
    let color = series_color(0, 1);
    let xy: Vec<[f64; 2]> = points
        .iter()
        .map(|p| [p.radius * p.angle.cos(), p.radius * p.angle.sin()])
        .collect();
    let outer = points
        .iter()
        .map(|p| p.radius.abs())
        .fold(0.0, f64::max)
        .max(f64::MIN_POSITIVE);

    show_round(ui, "polar_chart", |plot_ui| {
        polar_grid(plot_ui, outer, points);

        for triangle in fan_pieces(&xy) {
            plot_ui.polygon(
                Polygon::new(PlotPoints::from(triangle))
                    .name(column)
                    .fill_color(fill(color).gamma_multiply(0.5))
                    .stroke(Stroke::NONE),
            );
        }
        plot_ui.line(
            Line::new(PlotPoints::from(xy.clone()))
                .name(column)
                .color(color)
                .width(1.5),
        );
        plot_ui.points(
            Points::new(PlotPoints::from(xy))
                .name(column)
                .color(color)
                .radius(3.0),
        );
    })
}

/// Rings, spokes and point labels behind a polar chart.
fn polar_grid(plot_ui: &mut PlotUi, outer: f64, points: &[PolarPoint]) {
    let grid = Color32::from_gray(140).gamma_multiply(0.5);
    for ring in 1..=4 {
        let r = outer * ring as f64 / 4.0;
        let circle: Vec<[f64; 2]> = arc(0.0, std::f64::consts::TAU, r);
        plot_ui.line(Line::new(PlotPoints::from(circle)).color(grid).width(0.5));
        plot_ui.text(Text::new(
            PlotPoint::new(0.0, r),
            RichText::new(format!("{r:.3}")).small().weak(),
        ));
    }
    for p in points {
        let (s, c) = p.angle.sin_cos();
        plot_ui.line(
            Line::new(PlotPoints::from(vec![[0.0, 0.0], [outer * c, outer * s]]))
                .color(grid)
                .width(0.5),
        );
        if points.len() <= MAX_POLAR_LABELS {
            plot_ui.text(Text::new(
                PlotPoint::new(1.1 * outer * c, 1.1 * outer * s),
                p.label.as_str(),
            ));
        }
    }
}

// ---------------------------------------------------------------------------
// Convex pieces for filled shapes
// ---------------------------------------------------------------------------

/// Points on a circle of `radius` from `start` to `end` (radians).
fn arc(start: f64, end: f64, radius: f64) -> Vec<[f64; 2]> {
    let steps = (((end - start).abs() / ARC_STEP).ceil() as usize).max(1);
    (0..=steps)
        .map(|i| {
            let a = start + (end - start) * i as f64 / steps as f64;
            [radius * a.cos(), radius * a.sin()]
        })
        .collect()
}

/// A pie wedge as sectors of at most a quarter turn each.
pub fn wedge_pieces(start: f64, end: f64, radius: f64) -> Vec<Vec<[f64; 2]>> {
    let pieces = (((end - start) / MAX_PIECE_ANGLE).ceil() as usize).max(1);
    let span = (end - start) / pieces as f64;
    (0..pieces)
        .map(|i| {
            let from = start + span * i as f64;
            let mut piece = vec![[0.0, 0.0]];
            piece.extend(arc(from, from + span, radius));
            piece
        })
        .collect()
}

/// One quadrilateral per pair of neighbouring rows.
pub fn band_pieces(band: &Band) -> Vec<Vec<[f64; 2]>> {
    band.lower
        .windows(2)
        .zip(band.upper.windows(2))
        .map(|(lo, hi)| vec![lo[0], lo[1], hi[1], hi[0]])
        .collect()
}

/// Triangles from the origin to each pair of neighbouring points, closed.
pub fn fan_pieces(xy: &[[f64; 2]]) -> Vec<Vec<[f64; 2]>> {
    if xy.len() < 2 {
        return Vec::new();
    }
    (0..xy.len())
        .map(|i| vec![[0.0, 0.0], xy[i], xy[(i + 1) % xy.len()]])
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::{PI, TAU};

    #[test]
    fn full_pie_splits_into_quarter_sectors() {
        let pieces = wedge_pieces(FRAC_PI_2, FRAC_PI_2 + TAU, 1.0);
        assert_eq!(pieces.len(), 4);
        for piece in &pieces {
            assert_eq!(piece[0], [0.0, 0.0]);
            let first = piece[1];
            assert!((first[0].hypot(first[1]) - 1.0).abs() < 1e-12);
        }
        let start = pieces[0][1];
        assert!(start[0].abs() < 1e-12 && (start[1] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn small_wedge_is_one_piece() {
        let pieces = wedge_pieces(0.0, PI / 6.0, 2.0);
        assert_eq!(pieces.len(), 1);
        let last = *pieces[0].last().unwrap();
        assert!((last[0] - 2.0 * (PI / 6.0).cos()).abs() < 1e-12);
    }

    #[test]
    fn band_quads_join_lower_and_upper() {
        let band = Band {
            name: "a".into(),
            lower: vec![[0.0, 0.0], [1.0, 1.0], [2.0, 0.0]],
            upper: vec![[0.0, 2.0], [1.0, 3.0], [2.0, 5.0]],
        };
        let quads = band_pieces(&band);
        assert_eq!(quads.len(), 2);
        assert_eq!(quads[1], vec![[1.0, 1.0], [2.0, 0.0], [2.0, 5.0], [1.0, 3.0]]);
    }

    #[test]
    fn fan_closes_the_loop() {
        let xy = [[1.0, 0.0], [0.0, 1.0], [-1.0, 0.0]];
        let fan = fan_pieces(&xy);
        assert_eq!(fan.len(), 3);
        assert_eq!(fan[2], vec![[0.0, 0.0], [-1.0, 0.0], [1.0, 0.0]]);
        assert!(fan_pieces(&xy[..1]).is_empty());
    }
}
