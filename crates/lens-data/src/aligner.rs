//! Month-wise alignment of the inflation and FX series.

use std::collections::HashMap;

use lens_core::error::{LensError, Result};
use lens_core::models::{AlignedDataset, Alignment, AlignmentWarning, ValidatedSeries};
use lens_core::months::{month_range, Month};
use tracing::{debug, warn};

/// Intersect two validated series over their common month range.
///
/// The first series fills the inflation column and the second the FX column;
/// swapping the arguments swaps the columns and nothing else. Having no month
/// in common is not an error: the result is an empty dataset with
/// [`AlignmentWarning::NoOverlap`]. When points outside the common range are
/// dropped, [`AlignmentWarning::Truncated`] reports how many.
pub fn align_by_common_months(infl: &ValidatedSeries, fx: &ValidatedSeries) -> Result<Alignment> {
    let bounds = infl
        .first_month()
        .zip(infl.last_month())
        .zip(fx.first_month().zip(fx.last_month()));

    let Some(((infl_first, infl_last), (fx_first, fx_last))) = bounds else {
        return Ok(no_overlap(infl, fx));
    };

    let start = infl_first.max(fx_first);
    let end = infl_last.min(fx_last);
    if start > end {
        return Ok(no_overlap(infl, fx));
    }

    let months = month_range(start, end)?;
    let infl_by_month = value_map(infl);
    let fx_by_month = value_map(fx);

    let lookup = |map: &HashMap<Month, f64>, series: &ValidatedSeries, month: Month| {
        map.get(&month)
            .copied()
            .ok_or_else(|| LensError::AlignmentInconsistency {
                label: series.label().to_string(),
                month: month.to_string(),
            })
    };

    let mut infl_col = Vec::with_capacity(months.len());
    let mut fx_col = Vec::with_capacity(months.len());
    for &month in &months {
        infl_col.push(lookup(&infl_by_month, infl, month)?);
        fx_col.push(lookup(&fx_by_month, fx, month)?);
    }

    let discarded = (infl.len() + fx.len()).saturating_sub(2 * months.len());
    let warning = (discarded > 0).then(|| {
        let w = AlignmentWarning::Truncated {
            start,
            end,
            discarded,
        };
        warn!("{}", w);
        w
    });

    debug!(
        "Aligned {} and {} over {} … {} ({} months)",
        infl.label(),
        fx.label(),
        start,
        end,
        months.len()
    );

    Ok(Alignment {
        dataset: AlignedDataset::from_columns(months, infl_col, fx_col)?,
        warning,
    })
}

/// Drop every month before `start`, making it the new baseline month.
///
/// Fails with [`LensError::StartMonthOutOfRange`] when `start` is not part
/// of `dataset`.
pub fn trim_to_start(dataset: &AlignedDataset, start: Month) -> Result<AlignedDataset> {
    let out_of_range = || LensError::StartMonthOutOfRange {
        month: start.to_string(),
        first: dataset.first_month().map(|m| m.to_string()).unwrap_or_default(),
        last: dataset.last_month().map(|m| m.to_string()).unwrap_or_default(),
    };

    let idx = dataset.index_of(start).ok_or_else(out_of_range)?;
    if idx > 0 {
        debug!("Trimming {} months before {}", idx, start);
    }
    Ok(dataset.slice_from(idx))
}

// ── Internal helpers ──────────────────────────────────────────────────────────

fn value_map(series: &ValidatedSeries) -> HashMap<Month, f64> {
    series.points().iter().map(|p| (p.month, p.value)).collect()
}

fn no_overlap(infl: &ValidatedSeries, fx: &ValidatedSeries) -> Alignment {
    warn!(
        "No overlapping months between {} and {}",
        infl.label(),
        fx.label()
    );
    Alignment {
        dataset: AlignedDataset::empty(),
        warning: Some(AlignmentWarning::NoOverlap),
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use lens_core::models::{SeriesKind, SeriesPoint};

    fn m(s: &str) -> Month {
        s.parse().unwrap()
    }

    fn series(label: &str, kind: SeriesKind, start: &str, values: &[f64]) -> ValidatedSeries {
        let mut month = m(start);
        let mut points = Vec::new();
        for &value in values {
            points.push(SeriesPoint { month, value });
            month = month.next().unwrap();
        }
        ValidatedSeries::from_points(label, kind, points).unwrap()
    }

    fn infl(start: &str, values: &[f64]) -> ValidatedSeries {
        series("inflation", SeriesKind::Inflation, start, values)
    }

    fn fx(start: &str, values: &[f64]) -> ValidatedSeries {
        series("USD/TRY", SeriesKind::Fx, start, values)
    }

    #[test]
    fn test_align_identical_ranges_no_warning() {
        let a = align_by_common_months(&infl("2024-01", &[1.0, 2.0]), &fx("2024-01", &[30.0, 31.0]))
            .unwrap();
        assert!(a.warning.is_none());
        assert_eq!(a.dataset.months(), &[m("2024-01"), m("2024-02")]);
        assert_eq!(a.dataset.inflation_pct(), &[1.0, 2.0]);
        assert_eq!(a.dataset.usdtry(), &[30.0, 31.0]);
    }

    #[test]
    fn test_align_truncates_to_common_range() {
        let a = align_by_common_months(
            &infl("2023-11", &[1.0, 2.0, 3.0, 4.0]),
            &fx("2024-01", &[30.0, 31.0, 32.0]),
        )
        .unwrap();
        assert_eq!(a.dataset.months(), &[m("2024-01"), m("2024-02")]);
        assert_eq!(a.dataset.inflation_pct(), &[3.0, 4.0]);
        assert_eq!(
            a.warning,
            Some(AlignmentWarning::Truncated {
                start: m("2024-01"),
                end: m("2024-02"),
                discarded: 3,
            })
        );
    }

    #[test]
    fn test_align_no_overlap_is_not_an_error() {
        let a = align_by_common_months(&infl("2020-01", &[1.0, 2.0]), &fx("2024-01", &[30.0]))
            .unwrap();
        assert!(a.dataset.is_empty());
        assert_eq!(a.warning, Some(AlignmentWarning::NoOverlap));
        assert!(!a.warning.unwrap().to_string().is_empty());
    }

    #[test]
    fn test_align_empty_series_is_no_overlap() {
        let a = align_by_common_months(&infl("2024-01", &[]), &fx("2024-01", &[30.0])).unwrap();
        assert!(a.dataset.is_empty());
        assert_eq!(a.warning, Some(AlignmentWarning::NoOverlap));
    }

    #[test]
    fn test_align_is_commutative_up_to_roles() {
        let i = infl("2023-10", &[1.0, 2.0, 3.0, 4.0, 5.0]);
        let f = fx("2023-12", &[30.0, 31.0, 32.0, 33.0, 34.0]);

        let ab = align_by_common_months(&i, &f).unwrap();
        let ba = align_by_common_months(&f, &i).unwrap();

        assert_eq!(ab.dataset.months(), ba.dataset.months());
        assert_eq!(ab.dataset.inflation_pct(), ba.dataset.usdtry());
        assert_eq!(ab.dataset.usdtry(), ba.dataset.inflation_pct());
        assert_eq!(ab.warning, ba.warning);
    }

    #[test]
    fn test_trim_to_start_rebases() {
        let a = align_by_common_months(
            &infl("2024-01", &[1.0, 2.0, 3.0]),
            &fx("2024-01", &[30.0, 31.0, 32.0]),
        )
        .unwrap();
        let trimmed = trim_to_start(&a.dataset, m("2024-02")).unwrap();
        assert_eq!(trimmed.months(), &[m("2024-02"), m("2024-03")]);
        assert_eq!(trimmed.inflation_pct(), &[2.0, 3.0]);

        let same = trim_to_start(&a.dataset, m("2024-01")).unwrap();
        assert_eq!(same, a.dataset);
    }

    #[test]
    fn test_trim_to_start_out_of_range() {
        let a = align_by_common_months(&infl("2024-01", &[1.0]), &fx("2024-01", &[30.0])).unwrap();
        let err = trim_to_start(&a.dataset, m("2025-01")).unwrap_err();
        match err {
            LensError::StartMonthOutOfRange { month, first, last } => {
                assert_eq!(month, "2025-01");
                assert_eq!(first, "2024-01");
                assert_eq!(last, "2024-01");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
