//! Validation of raw monthly series payloads.
//!
//! Turns loosely-typed JSON arrays of `{month, <value>}` objects into
//! [`ValidatedSeries`]. Validation stops at the first offending element.

use lens_core::error::{LensError, Result};
use lens_core::models::{SeriesKind, SeriesPoint, ValidatedSeries};
use lens_core::months::Month;
use serde_json::Value;
use tracing::debug;

/// Label used for the FX series in messages.
pub const FX_LABEL: &str = "USD/TRY";

// ── Public API ────────────────────────────────────────────────────────────────

/// Validate one raw series array.
///
/// Each element must be an object with a `month` in `YYYY-MM` form and a
/// value under [`SeriesKind::value_field`] that coerces to a finite number
/// within the kind's bounds. Elements are then sorted and checked for
/// duplicates and gaps.
pub fn parse_series(label: &str, kind: SeriesKind, items: &[Value]) -> Result<ValidatedSeries> {
    let points = items
        .iter()
        .enumerate()
        .map(|(i, item)| parse_point(label, kind, i + 1, item))
        .collect::<Result<Vec<_>>>()?;

    let series = ValidatedSeries::from_points(label, kind, points)?;
    debug!(
        "Validated {} series: {} points ({:?} … {:?})",
        label,
        series.len(),
        series.first_month().map(|m| m.to_string()),
        series.last_month().map(|m| m.to_string()),
    );
    Ok(series)
}

/// Parse and validate a USD/TRY payload `{ "series": [{month, usdtry}] }`.
pub fn parse_fx_text(text: &str) -> Result<ValidatedSeries> {
    let data: Value = serde_json::from_str(text).map_err(|source| LensError::MalformedJson {
        label: FX_LABEL.to_string(),
        source,
    })?;
    parse_fx_value(&data)
}

/// Validate an already-parsed USD/TRY payload.
pub fn parse_fx_value(data: &Value) -> Result<ValidatedSeries> {
    let items = series_array(data).ok_or_else(|| {
        LensError::UnrecognizedSchema(format!("{} JSON must have a series array", FX_LABEL))
    })?;
    parse_series(FX_LABEL, SeriesKind::Fx, items)
}

/// The `series` array of `obj`, if present.
pub(crate) fn series_array(obj: &Value) -> Option<&Vec<Value>> {
    obj.get("series").and_then(Value::as_array)
}

// ── Internal helpers ──────────────────────────────────────────────────────────

fn parse_point(label: &str, kind: SeriesKind, index: usize, item: &Value) -> Result<SeriesPoint> {
    let obj = item.as_object().ok_or_else(|| LensError::MalformedElement {
        label: label.to_string(),
        index,
    })?;

    let raw_month = obj.get("month").unwrap_or(&Value::Null);
    let month: Month = raw_month
        .as_str()
        .and_then(|s| s.parse().ok())
        .ok_or_else(|| LensError::InvalidMonth {
            label: label.to_string(),
            index,
            month: display_raw(raw_month),
        })?;

    let invalid = |reason: &str| LensError::InvalidValue {
        label: label.to_string(),
        month: month.to_string(),
        reason: reason.to_string(),
    };

    let value = obj
        .get(kind.value_field())
        .and_then(coerce_number)
        .filter(|v| v.is_finite())
        .ok_or_else(|| invalid("must be a number"))?;
    kind.check_value(value).map_err(invalid)?;

    Ok(SeriesPoint { month, value })
}

/// Accept a JSON number or a string holding a decimal number.
///
/// `null`, booleans and blank strings are not numbers, unlike JS `Number()`
/// which maps them to 0 or 1.
fn coerce_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                None
            } else {
                trimmed.parse().ok()
            }
        }
        _ => None,
    }
}

fn display_raw(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────
