//! Report pipeline for SalaryLens.
//!
//! Rebases an aligned dataset at the chosen start month, runs the series
//! computation and returns an [`AnalysisResult`] ready for presentation or
//! CSV export.

use chrono::Utc;
use lens_core::calculations::SeriesCalculator;
use lens_core::error::{LensError, Result};
use lens_core::models::{
    AlignedDataset, ComputedSeries, ReportRow, Scenario, SummaryMetrics, INFLATION_DISPLAY_CAP,
};
use lens_core::months::Month;
use tracing::debug;

use crate::aligner::trim_to_start;

// ── Public types ──────────────────────────────────────────────────────────────

/// User inputs for one report.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportOptions {
    /// Monthly salary at the start month.
    pub base_salary: f64,
    /// Month of the last raise. `None` means the first aligned month.
    pub start_month: Option<Month>,
    /// Month a hypothetical raise takes effect. `None` means the last month.
    pub what_if_month: Option<Month>,
    /// Hypothetical raise in percent; clamped to `[0, 200]`.
    pub what_if_pct: f64,
}

/// Metadata produced alongside the report.
#[derive(Debug, Clone, serde::Serialize)]
pub struct AnalysisMetadata {
    /// ISO-8601 timestamp when this result was generated.
    pub generated_at: String,
    /// First month of the rebased range.
    pub first_month: Month,
    /// Last month of the rebased range.
    pub last_month: Month,
    /// Number of months in the report.
    pub months: usize,
    /// Months dropped before the start month.
    pub months_trimmed: usize,
    /// Month the what-if raise applies from, after clamping.
    pub what_if_month: Month,
    /// Rows whose displayed inflation was capped.
    pub capped_rows: usize,
}

/// The complete output of [`build_report`].
#[derive(Debug, Clone)]
pub struct AnalysisResult {
    /// The dataset after rebasing at the start month.
    pub dataset: AlignedDataset,
    pub scenario: Scenario,
    pub series: ComputedSeries,
    pub summary: SummaryMetrics,
    /// One row per month, in order.
    pub rows: Vec<ReportRow>,
    pub metadata: AnalysisMetadata,
}

// ── Public functions ──────────────────────────────────────────────────────────

/// Run the report pipeline.
///
/// 1. Rebase `dataset` at the start month with [`trim_to_start`].
/// 2. Clamp the what-if month into the rebased range and find its index.
/// 3. Compute every derived series.
/// 4. Build display rows and summary figures.
pub fn build_report(dataset: &AlignedDataset, options: &ReportOptions) -> Result<AnalysisResult> {
    let first = dataset.first_month().ok_or(LensError::EmptyDataset)?;

    // ── Step 1: Rebase ────────────────────────────────────────────────────────
    let start = options.start_month.unwrap_or(first);
    let rebased = trim_to_start(dataset, start)?;
    let months_trimmed = dataset.len() - rebased.len();

    // ── Step 2: What-if month ─────────────────────────────────────────────────
    let what_if_month = clamp_what_if_month(&rebased, options.what_if_month)
        .ok_or(LensError::EmptyDataset)?;
    let what_if_index = rebased.index_of(what_if_month).unwrap_or(0);

    // ── Step 3: Compute ───────────────────────────────────────────────────────
    let scenario = Scenario::new(options.base_salary, options.what_if_pct, what_if_index)?;
    let series = SeriesCalculator::compute_series(&rebased, &scenario)?;
    let summary = SeriesCalculator::summarize(&series).ok_or(LensError::EmptyDataset)?;

    // ── Step 4: Rows ──────────────────────────────────────────────────────────
    let rows = build_rows(&rebased, &series);
    let capped_rows = rows.iter().filter(|r| r.is_capped()).count();

    let metadata = AnalysisMetadata {
        generated_at: Utc::now().to_rfc3339(),
        first_month: start,
        last_month: rebased.last_month().unwrap_or(start),
        months: rebased.len(),
        months_trimmed,
        what_if_month,
        capped_rows,
    };

    debug!(
        "Report built: {} months from {}, raise {}% at {}",
        metadata.months, metadata.first_month, scenario.what_if_pct, what_if_month
    );

    Ok(AnalysisResult {
        dataset: rebased,
        scenario,
        series,
        summary,
        rows,
        metadata,
    })
}

/// Clamp `requested` into the range of `dataset`.
///
/// `None` selects the last month. Returns `None` only for an empty dataset.
pub fn clamp_what_if_month(dataset: &AlignedDataset, requested: Option<Month>) -> Option<Month> {
    let first = dataset.first_month()?;
    let last = dataset.last_month()?;
    Some(requested.unwrap_or(last).clamp(first, last))
}

/// Pair each month with its computed values.
///
/// Displayed inflation is capped to ±[`INFLATION_DISPLAY_CAP`]; the raw value
/// is kept alongside.
pub fn build_rows(dataset: &AlignedDataset, series: &ComputedSeries) -> Vec<ReportRow> {
    dataset
        .months()
        .iter()
        .enumerate()
        .map(|(i, &month)| {
            let raw = dataset.inflation_pct()[i];
            ReportRow {
                month,
                inflation_pct_raw: raw,
                inflation_pct: raw.clamp(-INFLATION_DISPLAY_CAP, INFLATION_DISPLAY_CAP),
                cpi: series.cpi[i],
                cum_inflation: series.cum_inflation[i],
                nominal: series.actual_salary[i],
                required: series.required_salary[i],
                gap_pct: series.gap_pct[i],
                real: series.real_salary[i],
                usdtry: dataset.usdtry()[i],
                usd: series.usd_salary[i],
            }
        })
        .collect()
}

// ── Tests ─────────────────────────────────────────────────────────────────────
