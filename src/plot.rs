//! egui_plot renderer for [`ChartDescription`].
//!
//! This module is the charting boundary: it draws a description as-is and
//! reports user zoom, pan, box-zoom and double-click resets back as relayout
//! payloads for the view tracker. It holds no state of its own.

use std::ops::RangeInclusive;
use std::time::Duration;

use egui::Color32;
use egui_plot::{
    AxisHints, Corner, GridMark, HPlacement, Legend, Line, LineStyle, MarkerShape, Plot, Points,
};
use serde_json::{json, Value};

use crate::chart::{
    AxisFormat, AxisScale, ChartDescription, LegendPlacement, LineDash, MarkerSymbol, Series,
    YAxisSide,
};
use crate::data::time_format::format_timestamp;
use crate::view::RelayoutPayload;

/// Allocate a distinct color for series without an explicit one.
fn palette_color(index: usize) -> Color32 {
    const PALETTE: [Color32; 4] = [
        Color32::from_rgb(31, 119, 180),
        Color32::from_rgb(255, 127, 14),
        Color32::from_rgb(44, 160, 44),
        Color32::from_rgb(148, 103, 189),
    ];
    PALETTE[index % PALETTE.len()]
}

fn rgba(c: [u8; 4]) -> Color32 {
    Color32::from_rgba_unmultiplied(c[0], c[1], c[2], c[3])
}

/// Opacity of a freshly built chart `elapsed` into its transition.
pub fn transition_opacity(elapsed: Duration, transition_ms: u32) -> f32 {
    if transition_ms == 0 {
        return 1.0;
    }
    (elapsed.as_secs_f32() * 1000.0 / transition_ms as f32).clamp(0.0, 1.0)
}

/// egui_plot cannot rotate tick labels, so steep angles stack date over time.
fn date_tick_label(secs: f64, tick_format: &str, tick_angle: i32) -> String {
    let label = format_timestamp(secs, tick_format);
    if tick_angle.abs() >= 30 {
        label.replacen(' ', "\n", 1)
    } else {
        label
    }
}

fn legend_corner(placement: LegendPlacement) -> Corner {
    match placement {
        LegendPlacement::TopRightHorizontal => Corner::RightTop,
    }
}

/// Linear map from the secondary axis' data range onto the primary one, so
/// both share a single plot transform.
#[derive(Debug, Clone, Copy, PartialEq)]
struct SecondaryMapping {
    src: (f64, f64),
    dst: (f64, f64),
}

impl SecondaryMapping {
    fn new(src: (f64, f64), dst: Option<(f64, f64)>) -> Self {
        let src = widen(src);
        let dst = dst.map(widen).unwrap_or(src);
        Self { src, dst }
    }

    fn to_primary(&self, v: f64) -> f64 {
        self.dst.0 + (v - self.src.0) / (self.src.1 - self.src.0) * (self.dst.1 - self.dst.0)
    }

    fn to_secondary(&self, y: f64) -> f64 {
        self.src.0 + (y - self.dst.0) / (self.dst.1 - self.dst.0) * (self.src.1 - self.src.0)
    }
}

/// A zero-width span would make the mapping singular.
fn widen((lo, hi): (f64, f64)) -> (f64, f64) {
    if hi - lo > f64::EPSILON {
        (lo, hi)
    } else {
        (lo - 0.5, hi + 0.5)
    }
}

fn extent<'a>(ys: impl Iterator<Item = f64> + 'a) -> Option<(f64, f64)> {
    ys.filter(|v| v.is_finite()).fold(None, |acc, v| match acc {
        None => Some((v, v)),
        Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
    })
}

/// What the user did to the plot during this frame.
#[derive(Debug, Default, Clone, Copy)]
struct Interaction {
    changed: bool,
    reset: bool,
}

/// Draw `chart` into `ui`.
///
/// With `apply_framing` the chart's axis ranges are pushed into the plot;
/// this is done once per new description so the user stays free to zoom in
/// between. `opacity` fades series in during the chart's transition.
/// Returns a relayout payload when the user changed the view.
pub fn show_chart(
    ui: &mut egui::Ui,
    chart: &ChartDescription,
    apply_framing: bool,
    opacity: f32,
) -> Option<RelayoutPayload> {
    let y_log = chart.y_axis.scale == AxisScale::Log;
    let to_plot_y = move |y: f64| if y_log { y.log10() } else { y };
    let from_plot_y = move |y: f64| if y_log { 10f64.powf(y) } else { y };

    let primary_extent = extent(
        chart
            .series
            .iter()
            .filter(|s| s.y_axis == YAxisSide::Primary)
            .flat_map(|s| s.points.iter().map(move |p| to_plot_y(p.y))),
    );
    let mapping = extent(
        chart
            .series
            .iter()
            .filter(|s| s.y_axis == YAxisSide::Secondary)
            .flat_map(|s| s.points.iter().map(|p| p.y)),
    )
    .map(|src| SecondaryMapping::new(src, primary_extent));

    let mut plot = Plot::new("phplot_chart")
        .legend(Legend::default().position(legend_corner(chart.legend)))
        .allow_boxed_zoom(true);

    if let Some(title) = &chart.x_axis.title {
        plot = plot.x_axis_label(title.clone());
    }
    if let AxisFormat::DateTime {
        tick_format,
        tick_angle,
    } = &chart.x_axis.format
    {
        let (tick_format, tick_angle) = (tick_format.clone(), *tick_angle);
        plot = plot.x_axis_formatter(move |mark: GridMark, _range: &RangeInclusive<f64>| {
            date_tick_label(mark.value, &tick_format, tick_angle)
        });
    }

    let y_label = chart.y_axis.title.clone().unwrap_or_default();
    let mut y_axes = vec![AxisHints::new_y()
        .label(y_label)
        .placement(HPlacement::Left)
        .formatter(move |mark: GridMark, _range: &RangeInclusive<f64>| {
            format!("{:.3}", from_plot_y(mark.value))
        })];
    if let (Some(y2), Some(m)) = (&chart.y2_axis, mapping) {
        y_axes.push(
            AxisHints::new_y()
                .label(y2.title.clone().unwrap_or_default())
                .placement(HPlacement::Right)
                .formatter(move |mark: GridMark, _range: &RangeInclusive<f64>| {
                    format!("{:.0}", m.to_secondary(mark.value))
                }),
        );
    }
    plot = plot.custom_y_axes(y_axes);

    let response = plot.show(ui, |plot_ui| {
        if apply_framing {
            plot_ui.set_auto_bounds(egui::Vec2b::new(
                chart.x_axis.range.is_none(),
                chart.y_axis.range.is_none(),
            ));
            if let Some([lo, hi]) = chart.x_axis.range {
                plot_ui.set_plot_bounds_x(lo..=hi);
            }
            if let Some([lo, hi]) = chart.y_axis.range {
                plot_ui.set_plot_bounds_y(to_plot_y(lo)..=to_plot_y(hi));
            }
        }

        for (i, series) in chart.series.iter().enumerate() {
            let pts: Vec<[f64; 2]> = series
                .points
                .iter()
                .filter_map(|p| {
                    let x = p.x?;
                    let y = match (series.y_axis, mapping) {
                        (YAxisSide::Secondary, Some(m)) => m.to_primary(p.y),
                        _ => to_plot_y(p.y),
                    };
                    y.is_finite().then_some([x, y])
                })
                .collect();
            draw_series(plot_ui, series, pts, palette_color(i), opacity);
        }

        let resp = plot_ui.response();
        let scroll = resp.ctx.input(|i| i.raw_scroll_delta);
        Interaction {
            changed: resp.dragged_by(egui::PointerButton::Primary)
                || resp.drag_stopped_by(egui::PointerButton::Secondary)
                || (resp.hovered() && (scroll.x != 0.0 || scroll.y != 0.0)),
            reset: resp.double_clicked(),
        }
    });

    let interaction = response.inner;
    if interaction.reset {
        return Some(autorange_payload());
    }
    if !interaction.changed {
        return None;
    }
    let bounds = response.transform.bounds();
    let (x0, x1) = (bounds.min()[0], bounds.max()[0]);
    let (y0, y1) = (from_plot_y(bounds.min()[1]), from_plot_y(bounds.max()[1]));
    Some(range_payload([x0, x1], [y0, y1]))
}

fn draw_series(
    plot_ui: &mut egui_plot::PlotUi,
    series: &Series,
    pts: Vec<[f64; 2]>,
    fallback: Color32,
    opacity: f32,
) {
    if series.mode.has_lines() {
        let style = series.line.unwrap_or(crate::chart::LineStyle {
            width: 1.5,
            dash: LineDash::Solid,
            color_rgba: None,
        });
        let color = style
            .color_rgba
            .map(rgba)
            .unwrap_or(fallback)
            .gamma_multiply(opacity);
        let dash = match style.dash {
            LineDash::Solid => LineStyle::Solid,
            LineDash::Dotted => LineStyle::Dotted { spacing: 4.0 },
        };
        plot_ui.line(
            Line::new(&series.name, pts.clone())
                .color(color)
                .width(style.width)
                .style(dash),
        );
    }
    if series.mode.has_markers() {
        let Some(marker) = series.marker else {
            return;
        };
        let color = marker
            .color_rgba
            .map(rgba)
            .unwrap_or(fallback)
            .gamma_multiply(opacity);
        let shape = match marker.symbol {
            MarkerSymbol::Circle => MarkerShape::Circle,
            MarkerSymbol::Cross => MarkerShape::Cross,
        };
        // a line already carries the legend entry
        let name = if series.mode.has_lines() { "" } else { series.name.as_str() };
        plot_ui.points(
            Points::new(name, pts)
                .radius((marker.size / 2.0).max(0.5))
                .shape(shape)
                .color(color),
        );
    }
}

fn autorange_payload() -> RelayoutPayload {
    let mut payload = RelayoutPayload::new();
    payload.insert("xaxis.autorange".into(), Value::Bool(true));
    payload.insert("yaxis.autorange".into(), Value::Bool(true));
    payload
}

fn range_payload(x: [f64; 2], y: [f64; 2]) -> RelayoutPayload {
    let mut payload = RelayoutPayload::new();
    payload.insert("xaxis.range[0]".into(), json!(x[0]));
    payload.insert("xaxis.range[1]".into(), json!(x[1]));
    payload.insert("yaxis.range[0]".into(), json!(y[0]));
    payload.insert("yaxis.range[1]".into(), json!(y[1]));
    payload
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn secondary_mapping_round_trips_into_primary_range() {
        let m = SecondaryMapping::new((0.0, 100.0), Some((7.0, 8.0)));
        assert!((m.to_primary(0.0) - 7.0).abs() < 1e-12);
        assert!((m.to_primary(100.0) - 8.0).abs() < 1e-12);
        assert!((m.to_secondary(7.5) - 50.0).abs() < 1e-9);
    }

    #[test]
    fn secondary_mapping_handles_flat_ranges() {
        let m = SecondaryMapping::new((3.0, 3.0), None);
        assert!(m.to_primary(3.0).is_finite());
        assert!((m.to_secondary(m.to_primary(3.0)) - 3.0).abs() < 1e-12);
    }

    #[test]
    fn transition_fades_in_linearly() {
        assert_eq!(transition_opacity(Duration::ZERO, 300), 0.0);
        assert!((transition_opacity(Duration::from_millis(150), 300) - 0.5).abs() < 1e-6);
        assert_eq!(transition_opacity(Duration::from_secs(1), 300), 1.0);
        assert_eq!(transition_opacity(Duration::ZERO, 0), 1.0);
    }

    #[test]
    fn steep_tick_angle_stacks_date_over_time() {
        let fmt = "%Y-%m-%d %H:%M:%S";
        assert_eq!(date_tick_label(60.0, fmt, 45), "1970-01-01\n00:01:00");
        assert_eq!(date_tick_label(60.0, fmt, 0), "1970-01-01 00:01:00");
    }

    #[test]
    fn legend_placement_maps_to_a_corner() {
        assert_eq!(legend_corner(LegendPlacement::TopRightHorizontal), Corner::RightTop);
    }

    #[test]
    fn reset_payload_requests_autorange_on_both_axes() {
        let p = autorange_payload();
        assert_eq!(p.get("xaxis.autorange"), Some(&Value::Bool(true)));
        assert_eq!(p.get("yaxis.autorange"), Some(&Value::Bool(true)));
    }
}
