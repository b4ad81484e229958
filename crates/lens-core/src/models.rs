use std::collections::BTreeMap;
use std::fmt;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::{LensError, Result};
use crate::months::Month;

/// Largest accepted monthly inflation magnitude, in percent.
pub const MAX_INFLATION_PCT: f64 = 50.0;

/// Display cap for monthly inflation in tables and exports.
pub const INFLATION_DISPLAY_CAP: f64 = 50.0;

/// Upper bound for the what-if raise percentage.
pub const MAX_WHAT_IF_PCT: f64 = 200.0;

// ── SeriesKind ────────────────────────────────────────────────────────────────

/// Which kind of monthly series a payload carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeriesKind {
    /// Month-over-month inflation in percent (signed).
    Inflation,
    /// USD/TRY exchange rate (strictly positive).
    Fx,
}

impl SeriesKind {
    /// JSON field holding the value of each element.
    pub fn value_field(self) -> &'static str {
        match self {
            SeriesKind::Inflation => "inflationPct",
            SeriesKind::Fx => "usdtry",
        }
    }

    /// Check the kind-specific constraint on an already-finite value.
    ///
    /// Returns the reason for rejection, if any.
    pub fn check_value(self, value: f64) -> std::result::Result<(), &'static str> {
        match self {
            SeriesKind::Inflation if value.abs() > MAX_INFLATION_PCT => Err("exceeds ±50%"),
            SeriesKind::Fx if value <= 0.0 => Err("must be > 0"),
            _ => Ok(()),
        }
    }
}

// ── SeriesPoint / ValidatedSeries ─────────────────────────────────────────────

/// One dated value of a monthly series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeriesPoint {
    pub month: Month,
    pub value: f64,
}

/// A monthly series whose months are strictly ascending, gap-free and
/// duplicate-free.
///
/// The only way to obtain one is [`ValidatedSeries::from_points`], so every
/// instance upholds the invariant. Instances are never mutated.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedSeries {
    label: String,
    kind: SeriesKind,
    points: Vec<SeriesPoint>,
}

impl ValidatedSeries {
    /// Sort `points` by month and enforce continuity.
    ///
    /// Fails with [`LensError::DuplicateMonth`] on a repeated month and with
    /// [`LensError::MonthGap`] naming the first missing month.
    pub fn from_points(
        label: impl Into<String>,
        kind: SeriesKind,
        mut points: Vec<SeriesPoint>,
    ) -> Result<Self> {
        let label = label.into();
        points.sort_by_key(|p| p.month);

        // Duplicates anywhere in the series take precedence over gaps.
        if let Some(pair) = points.windows(2).find(|w| w[0].month == w[1].month) {
            return Err(LensError::DuplicateMonth {
                label,
                month: pair[1].month.to_string(),
            });
        }

        for pair in points.windows(2) {
            let (prev, cur) = (pair[0].month, pair[1].month);
            let expected = prev.next();
            if expected != Some(cur) {
                return Err(LensError::MonthGap {
                    label,
                    expected: expected.map(|m| m.to_string()).unwrap_or_default(),
                    after: prev.to_string(),
                });
            }
        }

        Ok(Self {
            label,
            kind,
            points,
        })
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn kind(&self) -> SeriesKind {
        self.kind
    }

    pub fn points(&self) -> &[SeriesPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn first_month(&self) -> Option<Month> {
        self.points.first().map(|p| p.month)
    }

    pub fn last_month(&self) -> Option<Month> {
        self.points.last().map(|p| p.month)
    }

    /// Months in ascending order.
    pub fn months(&self) -> impl Iterator<Item = Month> + '_ {
        self.points.iter().map(|p| p.month)
    }

    /// Value recorded for `month`, if the series covers it.
    pub fn value_at(&self, month: Month) -> Option<f64> {
        self.points
            .binary_search_by_key(&month, |p| p.month)
            .ok()
            .map(|idx| self.points[idx].value)
    }
}

// ── Inflation sources ─────────────────────────────────────────────────────────

/// Key of an entry in an [`InflationCollection`].
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ValueEnum,
)]
pub enum SourceKey {
    /// The only series of a legacy `{ "series": [...] }` payload.
    #[value(skip)]
    Default,
    /// Primary source (official statistics office).
    #[serde(rename = "TUIK")]
    Tuik,
    /// Secondary, independent source.
    #[serde(rename = "ENAG")]
    Enag,
    /// Month-wise mean of the primary and secondary sources.
    #[serde(rename = "AVG")]
    Avg,
}

impl SourceKey {
    /// Fallback order used when the preferred source is unavailable.
    pub const FALLBACK_ORDER: [SourceKey; 3] = [SourceKey::Avg, SourceKey::Tuik, SourceKey::Enag];

    /// Label used in messages and as the JSON key of the named sources.
    pub fn label(self) -> &'static str {
        match self {
            SourceKey::Default => "inflation",
            SourceKey::Tuik => "TUIK",
            SourceKey::Enag => "ENAG",
            SourceKey::Avg => "AVG",
        }
    }
}

impl fmt::Display for SourceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Validated inflation series keyed by source.
///
/// Holds either exactly one [`SourceKey::Default`] entry, or any non-empty
/// subset of the named sources.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InflationCollection {
    entries: BTreeMap<SourceKey, ValidatedSeries>,
}

impl InflationCollection {
    pub fn single(series: ValidatedSeries) -> Self {
        let mut entries = BTreeMap::new();
        entries.insert(SourceKey::Default, series);
        Self { entries }
    }

    pub fn insert(&mut self, key: SourceKey, series: ValidatedSeries) {
        self.entries.insert(key, series);
    }

    pub fn get(&self, key: SourceKey) -> Option<&ValidatedSeries> {
        self.entries.get(&key)
    }

    pub fn contains(&self, key: SourceKey) -> bool {
        self.entries.contains_key(&key)
    }

    pub fn keys(&self) -> impl Iterator<Item = SourceKey> + '_ {
        self.entries.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// `true` for a legacy single-series payload, which has no source choice.
    pub fn is_single_default(&self) -> bool {
        self.contains(SourceKey::Default)
    }
}

// ── AlignedDataset ────────────────────────────────────────────────────────────

/// Inflation and FX values paired month by month over a contiguous range.
///
/// Index `i` of every column refers to the same month.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AlignedDataset {
    months: Vec<Month>,
    inflation_pct: Vec<f64>,
    usdtry: Vec<f64>,
}

impl AlignedDataset {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Assemble a dataset from parallel columns.
    ///
    /// Fails with [`LensError::AlignmentInconsistency`] when the columns
    /// differ in length or the months are not contiguous.
    pub fn from_columns(months: Vec<Month>, inflation_pct: Vec<f64>, usdtry: Vec<f64>) -> Result<Self> {
        if months.len() != inflation_pct.len() || months.len() != usdtry.len() {
            return Err(LensError::AlignmentInconsistency {
                label: "aligned dataset".to_string(),
                month: format!(
                    "column lengths {}/{}/{}",
                    months.len(),
                    inflation_pct.len(),
                    usdtry.len()
                ),
            });
        }
        for pair in months.windows(2) {
            if pair[0].next() != Some(pair[1]) {
                return Err(LensError::AlignmentInconsistency {
                    label: "aligned dataset".to_string(),
                    month: pair[1].to_string(),
                });
            }
        }
        Ok(Self {
            months,
            inflation_pct,
            usdtry,
        })
    }

    pub fn months(&self) -> &[Month] {
        &self.months
    }

    pub fn inflation_pct(&self) -> &[f64] {
        &self.inflation_pct
    }

    pub fn usdtry(&self) -> &[f64] {
        &self.usdtry
    }

    pub fn len(&self) -> usize {
        self.months.len()
    }

    pub fn is_empty(&self) -> bool {
        self.months.is_empty()
    }

    pub fn first_month(&self) -> Option<Month> {
        self.months.first().copied()
    }

    pub fn last_month(&self) -> Option<Month> {
        self.months.last().copied()
    }

    /// Position of `month` in the dataset.
    pub fn index_of(&self, month: Month) -> Option<usize> {
        self.months.binary_search(&month).ok()
    }

    /// A new dataset holding the rows from `start` onward.
    pub fn slice_from(&self, start: usize) -> Self {
        let start = start.min(self.months.len());
        Self {
            months: self.months[start..].to_vec(),
            inflation_pct: self.inflation_pct[start..].to_vec(),
            usdtry: self.usdtry[start..].to_vec(),
        }
    }
}

/// Non-fatal condition reported alongside an alignment result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AlignmentWarning {
    /// The two series share no month; the dataset is empty.
    NoOverlap,
    /// Points outside the common range were dropped.
    Truncated {
        start: Month,
        end: Month,
        discarded: usize,
    },
}

impl fmt::Display for AlignmentWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AlignmentWarning::NoOverlap => f.write_str(
                "No overlapping months between series. Please provide matching ranges.",
            ),
            AlignmentWarning::Truncated {
                start,
                end,
                discarded,
            } => write!(
                f,
                "Using common range: {} … {} ({} months truncated).",
                start, end, discarded
            ),
        }
    }
}

/// Output of the aligner: a dataset plus an optional soft warning.
#[derive(Debug, Clone, PartialEq)]
pub struct Alignment {
    pub dataset: AlignedDataset,
    pub warning: Option<AlignmentWarning>,
}

// ── Scenario ──────────────────────────────────────────────────────────────────

/// Clamp a what-if raise percentage into `[0, MAX_WHAT_IF_PCT]`.
///
/// Non-finite input is treated as no raise.
pub fn clamp_what_if_pct(pct: f64) -> f64 {
    if pct.is_finite() {
        pct.clamp(0.0, MAX_WHAT_IF_PCT)
    } else {
        0.0
    }
}

/// Salary parameters for one computation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Scenario {
    /// Monthly salary at month 0.
    pub base_salary: f64,
    /// One-time raise in percent, already clamped.
    pub what_if_pct: f64,
    /// Zero-based index of the month from which the raise applies.
    pub what_if_index: usize,
}

impl Scenario {
    /// Validate the salary and clamp the raise percentage.
    pub fn new(base_salary: f64, what_if_pct: f64, what_if_index: usize) -> Result<Self> {
        if !base_salary.is_finite() || base_salary <= 0.0 {
            return Err(LensError::InvalidSalary(base_salary.to_string()));
        }
        Ok(Self {
            base_salary,
            what_if_pct: clamp_what_if_pct(what_if_pct),
            what_if_index,
        })
    }
}

// ── ComputedSeries ────────────────────────────────────────────────────────────

/// Every derived per-month series, parallel to the dataset's months.
///
/// Fractions (`cum_inflation`, `gap_pct`, `required_raise_today_pct`) are
/// plain ratios, e.g. `0.21` for 21 %.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComputedSeries {
    pub cpi: Vec<f64>,
    pub cum_inflation: Vec<f64>,
    pub required_salary: Vec<f64>,
    pub actual_salary: Vec<f64>,
    pub real_salary: Vec<f64>,
    pub gap_pct: Vec<f64>,
    pub usd_salary: Vec<f64>,
    pub required_raise_today_pct: f64,
}

impl ComputedSeries {
    pub fn len(&self) -> usize {
        self.cpi.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cpi.is_empty()
    }
}

/// Headline figures at the latest month.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SummaryMetrics {
    pub cum_inflation_latest: f64,
    pub required_raise_today_pct: f64,
    pub usd_salary_latest: f64,
    pub purchasing_power_gap_pct: f64,
}

/// One month of the table / CSV export.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportRow {
    pub month: Month,
    /// Validated monthly inflation used in the computation.
    pub inflation_pct_raw: f64,
    /// Monthly inflation capped to ±[`INFLATION_DISPLAY_CAP`] for display.
    pub inflation_pct: f64,
    pub cpi: f64,
    pub cum_inflation: f64,
    pub nominal: f64,
    pub required: f64,
    pub gap_pct: f64,
    pub real: f64,
    pub usdtry: f64,
    pub usd: f64,
}

impl ReportRow {
    /// Whether the displayed inflation differs from the raw value.
    pub fn is_capped(&self) -> bool {
        self.inflation_pct_raw.abs() > INFLATION_DISPLAY_CAP
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────
