//! Inflation collection resolution and active-source selection.
//!
//! Accepted inflation payloads:
//!
//! * legacy `{ "series": [...] }` with a single default series;
//! * `{ "TUIK": { "series": [...] }, "ENAG": { "series": [...] } }` with either
//!   or both named sources.
//!
//! When both named sources cover exactly the same months, an `AVG` series is
//! derived from their month-wise mean.

use lens_core::error::{LensError, Result};
use lens_core::models::{InflationCollection, SeriesKind, SeriesPoint, SourceKey, ValidatedSeries};
use serde_json::Value;
use tracing::{debug, info};

use crate::validator::{parse_series, series_array};

/// Parse and resolve raw inflation JSON text.
pub fn parse_inflation_text(text: &str) -> Result<InflationCollection> {
    let data: Value = serde_json::from_str(text).map_err(|source| LensError::MalformedJson {
        label: "Inflation".to_string(),
        source,
    })?;
    resolve_collection(&data)
}

/// Resolve an already-parsed inflation payload into a collection.
pub fn resolve_collection(data: &Value) -> Result<InflationCollection> {
    if let Some(items) = series_array(data) {
        let series = parse_series(SourceKey::Default.label(), SeriesKind::Inflation, items)?;
        debug!("Resolved single-series inflation payload");
        return Ok(InflationCollection::single(series));
    }

    let named = [SourceKey::Tuik, SourceKey::Enag];
    if !named.iter().any(|k| data.get(k.label()).is_some()) {
        return Err(LensError::UnrecognizedSchema(
            "Inflation JSON must have either a series array or TUIK/ENAG objects".to_string(),
        ));
    }

    let mut collection = InflationCollection::default();
    for key in named {
        let Some(entry) = data.get(key.label()) else {
            continue;
        };
        let items = series_array(entry).ok_or_else(|| {
            LensError::UnrecognizedSchema(format!("{} must hold a series array", key.label()))
        })?;
        collection.insert(key, parse_series(key.label(), SeriesKind::Inflation, items)?);
    }

    let average = match (collection.get(SourceKey::Tuik), collection.get(SourceKey::Enag)) {
        (Some(tuik), Some(enag)) => synthesize_average(tuik, enag)?,
        _ => None,
    };
    match average {
        Some(avg) => collection.insert(SourceKey::Avg, avg),
        None if collection.len() == 2 => {
            info!("TUIK and ENAG months differ; AVG source not available")
        }
        None => {}
    }

    debug!(
        "Resolved inflation sources: {:?}",
        collection.keys().collect::<Vec<_>>()
    );
    Ok(collection)
}

/// Month-wise mean of two series, or `None` when their months differ.
pub fn synthesize_average(a: &ValidatedSeries, b: &ValidatedSeries) -> Result<Option<ValidatedSeries>> {
    if a.len() != b.len() || !a.months().eq(b.months()) {
        return Ok(None);
    }

    let points = a
        .points()
        .iter()
        .zip(b.points())
        .map(|(pa, pb)| SeriesPoint {
            month: pa.month,
            value: (pa.value + pb.value) / 2.0,
        })
        .collect();

    ValidatedSeries::from_points(SourceKey::Avg.label(), SeriesKind::Inflation, points).map(Some)
}

/// Pick the source to compute with.
///
/// A single-default collection always yields [`SourceKey::Default`]. Otherwise
/// `preferred` wins when present, falling back through
/// [`SourceKey::FALLBACK_ORDER`]. Returns `None` only for an empty collection.
pub fn select_active(collection: &InflationCollection, preferred: Option<SourceKey>) -> Option<SourceKey> {
    if collection.is_single_default() {
        return Some(SourceKey::Default);
    }
    if let Some(key) = preferred.filter(|k| collection.contains(*k)) {
        return Some(key);
    }
    let fallback = SourceKey::FALLBACK_ORDER
        .into_iter()
        .find(|k| collection.contains(*k));
    if let (Some(wanted), Some(got)) = (preferred, fallback) {
        info!("Inflation source {} unavailable, using {}", wanted, got);
    }
    fallback
}

// ── Tests ──────────────────────────────────────────────────────────────────────
