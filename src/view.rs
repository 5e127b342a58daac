//! View-state tracking: keeps the user's zoom/pan across refreshes.
//!
//! Renderers report interactions as loosely typed relayout payloads (a JSON
//! object with keys such as `"xaxis.range[0]"` or `"yaxis.autorange"`). The
//! tracker narrows such a payload into a typed [`ViewState`] immediately, so
//! nothing downstream ever looks at raw keys.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::chart::{Axis, AxisScale, ChartDescription};
use crate::data::time_format::parse_timestamp;

/// A relayout payload as emitted by the renderer.
pub type RelayoutPayload = Map<String, Value>;

/// Framing intent for one axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum AxisRange {
    /// Let the renderer fit the data.
    Auto,
    /// Fixed `[low, high]`, `low <= high`.
    Explicit([f64; 2]),
}

/// The user's current axis framing.
///
/// `None` fields were never touched by an interaction.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ViewState {
    pub x_range: Option<AxisRange>,
    pub y_range: Option<AxisRange>,
    pub x_scale: Option<AxisScale>,
    pub y_scale: Option<AxisScale>,
}

impl ViewState {
    pub fn is_empty(&self) -> bool {
        *self == ViewState::default()
    }
}

/// What one payload says about one axis.
#[derive(Debug, Default, PartialEq)]
struct AxisUpdate {
    range: Option<AxisRange>,
    scale: Option<AxisScale>,
}

/// Owns the session's [`ViewState`].
#[derive(Debug, Default, Clone)]
pub struct ViewStateTracker {
    state: ViewState,
}

impl ViewStateTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    /// Fold an interaction payload into the stored state and return a copy.
    ///
    /// Only axes mentioned in the payload change. A payload without any view
    /// keys (legend clicks, hover, `autosize`) leaves the state as it was.
    pub fn capture(&mut self, payload: &RelayoutPayload) -> ViewState {
        let x = axis_update(payload, "xaxis");
        let y = axis_update(payload, "yaxis");
        if let Some(r) = x.range {
            self.state.x_range = Some(r);
        }
        if let Some(s) = x.scale {
            self.state.x_scale = Some(s);
        }
        if let Some(r) = y.range {
            self.state.y_range = Some(r);
        }
        if let Some(s) = y.scale {
            self.state.y_scale = Some(s);
        }
        if x == AxisUpdate::default() && y == AxisUpdate::default() {
            log::trace!("Relayout payload carried no view keys");
        }
        self.state
    }

    /// [`apply_view`] with the stored state.
    pub fn reapply(&self, chart: ChartDescription) -> ChartDescription {
        apply_view(chart, &self.state)
    }
}

/// Patch the axis framing of `chart` from `view`.
///
/// Explicit ranges overwrite the axis range, `Auto` hands framing back to the
/// renderer, untouched axes keep whatever the chart was built with. Only the
/// primary y axis is affected and series are never modified.
pub fn apply_view(mut chart: ChartDescription, view: &ViewState) -> ChartDescription {
    patch_axis(&mut chart.x_axis, view.x_range, view.x_scale);
    patch_axis(&mut chart.y_axis, view.y_range, view.y_scale);
    chart
}

fn patch_axis(axis: &mut Axis, range: Option<AxisRange>, scale: Option<AxisScale>) {
    match range {
        Some(AxisRange::Explicit(r)) => {
            axis.range = Some(r);
            axis.autorange = false;
        }
        Some(AxisRange::Auto) => {
            axis.range = None;
            axis.autorange = true;
        }
        None => {}
    }
    if let Some(s) = scale {
        axis.scale = s;
    }
}

fn axis_update(payload: &RelayoutPayload, axis: &str) -> AxisUpdate {
    let lo = payload.get(&format!("{axis}.range[0]")).and_then(range_bound);
    let hi = payload.get(&format!("{axis}.range[1]")).and_then(range_bound);
    let pair = match (lo, hi) {
        (Some(lo), Some(hi)) => Some([lo, hi]),
        _ => payload
            .get(&format!("{axis}.range"))
            .and_then(Value::as_array)
            .filter(|a| a.len() == 2)
            .and_then(|a| Some([range_bound(&a[0])?, range_bound(&a[1])?])),
    };

    let range = match pair {
        Some([a, b]) => Some(AxisRange::Explicit([a.min(b), a.max(b)])),
        None => match payload.get(&format!("{axis}.autorange")) {
            Some(Value::Bool(true)) => Some(AxisRange::Auto),
            _ => None,
        },
    };

    let scale = payload
        .get(&format!("{axis}.type"))
        .and_then(Value::as_str)
        .and_then(|t| match t {
            "linear" => Some(AxisScale::Linear),
            "log" => Some(AxisScale::Log),
            "date" => Some(AxisScale::Date),
            _ => None,
        });

    AxisUpdate { range, scale }
}

/// Numbers as-is, strings as numbers or timestamps.
fn range_bound(v: &Value) -> Option<f64> {
    let n = match v {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok().or_else(|| parse_timestamp(s)),
        _ => None,
    }?;
    n.is_finite().then_some(n)
}
