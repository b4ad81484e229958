//! Latest validated state of a SalaryLens run.
//!
//! A [`LensSession`] owns the validated inflation collection, the FX series,
//! the active inflation source and the alignment derived from them. Every
//! change replaces the derived snapshot wholesale; nothing is patched in place.

use lens_core::error::{LensError, Result};
use lens_core::models::{Alignment, InflationCollection, SourceKey, ValidatedSeries};
use lens_data::aligner::align_by_common_months;
use lens_data::analysis::{build_report, AnalysisResult, ReportOptions};
use lens_data::collection::{parse_inflation_text, select_active};
use lens_data::validator::parse_fx_text;

use crate::loader::{PayloadPaths, RawPayloads};

pub struct LensSession {
    collection: InflationCollection,
    fx: ValidatedSeries,
    active: SourceKey,
    alignment: Alignment,
}

impl LensSession {
    /// Load both payloads from disk and validate them.
    pub async fn load(paths: &PayloadPaths, preferred: Option<SourceKey>) -> Result<Self> {
        let raw = paths.load().await?;
        Self::from_payloads(&raw, preferred)
    }

    /// Validate raw payload text and align the selected source with FX.
    pub fn from_payloads(raw: &RawPayloads, preferred: Option<SourceKey>) -> Result<Self> {
        let collection = parse_inflation_text(&raw.inflation)?;
        let fx = parse_fx_text(&raw.fx)?;
        Self::new(collection, fx, preferred)
    }

    /// Build a session from already-validated inputs.
    pub fn new(
        collection: InflationCollection,
        fx: ValidatedSeries,
        preferred: Option<SourceKey>,
    ) -> Result<Self> {
        let active = select_active(&collection, preferred)
            .ok_or_else(|| LensError::UnrecognizedSchema("no inflation source available".to_string()))?;
        let alignment = align(&collection, &fx, active)?;
        tracing::info!(
            source = %active,
            months = alignment.dataset.len(),
            "session ready"
        );
        Ok(Self {
            collection,
            fx,
            active,
            alignment,
        })
    }

    pub fn active_source(&self) -> SourceKey {
        self.active
    }

    /// Sources the user can choose between, in display order.
    ///
    /// Empty for a single-series payload.
    pub fn available_sources(&self) -> Vec<SourceKey> {
        if self.collection.is_single_default() {
            return Vec::new();
        }
        [SourceKey::Tuik, SourceKey::Enag, SourceKey::Avg]
            .into_iter()
            .filter(|k| self.collection.contains(*k))
            .collect()
    }

    pub fn collection(&self) -> &InflationCollection {
        &self.collection
    }

    pub fn fx(&self) -> &ValidatedSeries {
        &self.fx
    }

    pub fn alignment(&self) -> &Alignment {
        &self.alignment
    }

    /// Switch the active inflation source and re-align.
    ///
    /// An unavailable source falls back like [`select_active`]. Returns `true`
    /// when the active source changed. On error the session is left as it was.
    pub fn switch_source(&mut self, preferred: SourceKey) -> Result<bool> {
        let Some(next) = select_active(&self.collection, Some(preferred)) else {
            return Ok(false);
        };
        if next == self.active {
            return Ok(false);
        }

        let alignment = align(&self.collection, &self.fx, next)?;
        tracing::info!(from = %self.active, to = %next, "inflation source switched");
        self.active = next;
        self.alignment = alignment;
        Ok(true)
    }

    /// Compute a report on the current alignment.
    pub fn report(&self, options: &ReportOptions) -> Result<AnalysisResult> {
        build_report(&self.alignment.dataset, options)
    }
}

fn align(collection: &InflationCollection, fx: &ValidatedSeries, key: SourceKey) -> Result<Alignment> {
    let infl = collection
        .get(key)
        .ok_or_else(|| LensError::UnrecognizedSchema(format!("inflation source {} is missing", key)))?;
    align_by_common_months(infl, fx)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
