use crate::error::{LensError, Result};
use crate::models::{AlignedDataset, ComputedSeries, Scenario, SummaryMetrics};

/// Baseline value of the compounding index.
pub const CPI_BASE: f64 = 100.0;

// ── SeriesCalculator ──────────────────────────────────────────────────────────

/// Stateless collection of salary-versus-inflation calculations.
pub struct SeriesCalculator;

impl SeriesCalculator {
    /// Chain monthly inflation rates into a compounding index.
    ///
    /// Month 0's own rate is part of the chain: `cpi[0]` is already
    /// `100 * (1 + infl[0] / 100)`, not the bare baseline. The first labelled
    /// month is treated as still subject to its own price change. Do not
    /// "correct" this to start at exactly 100.
    pub fn compounding_index(inflation_pct: &[f64]) -> Vec<f64> {
        inflation_pct
            .iter()
            .scan(CPI_BASE, |level, pct| {
                *level *= 1.0 + pct / 100.0;
                Some(*level)
            })
            .collect()
    }

    /// Step-function salary: `S0` before the raise index, raised from it on.
    pub fn actual_salary(n: usize, scenario: &Scenario) -> Vec<f64> {
        let raised = scenario.base_salary * (1.0 + scenario.what_if_pct / 100.0);
        (0..n)
            .map(|i| {
                if i >= scenario.what_if_index {
                    raised
                } else {
                    scenario.base_salary
                }
            })
            .collect()
    }

    /// Compute every derived series for `dataset` under `scenario`.
    ///
    /// No rounding is applied. All denominators are positive because CPI
    /// levels stay above zero (|inflation| ≤ 50) and FX rates are validated
    /// to be positive.
    pub fn compute_series(dataset: &AlignedDataset, scenario: &Scenario) -> Result<ComputedSeries> {
        let n = dataset.len();
        if n == 0 {
            return Err(LensError::EmptyDataset);
        }

        let cpi = Self::compounding_index(dataset.inflation_pct());
        let ratio: Vec<f64> = cpi.iter().map(|v| v / CPI_BASE).collect();

        let cum_inflation = ratio.iter().map(|r| r - 1.0).collect();
        let required_salary: Vec<f64> = ratio.iter().map(|r| scenario.base_salary * r).collect();
        let actual_salary = Self::actual_salary(n, scenario);

        let real_salary = actual_salary
            .iter()
            .zip(&ratio)
            .map(|(s, r)| s / r)
            .collect();
        let gap_pct = actual_salary
            .iter()
            .zip(&required_salary)
            .map(|(s, req)| s / req - 1.0)
            .collect();
        let usd_salary = actual_salary
            .iter()
            .zip(dataset.usdtry())
            .map(|(s, fx)| s / fx)
            .collect();

        let last = n - 1;
        let required_raise_today_pct = required_salary[last] / actual_salary[last] - 1.0;

        Ok(ComputedSeries {
            cpi,
            cum_inflation,
            required_salary,
            actual_salary,
            real_salary,
            gap_pct,
            usd_salary,
            required_raise_today_pct,
        })
    }

    /// Headline figures at the last month of `series`.
    ///
    /// Returns `None` for an empty series.
    pub fn summarize(series: &ComputedSeries) -> Option<SummaryMetrics> {
        let cum_inflation_latest = *series.cum_inflation.last()?;
        let usd_salary_latest = *series.usd_salary.last()?;
        let actual = *series.actual_salary.last()?;
        let required = *series.required_salary.last()?;

        Some(SummaryMetrics {
            cum_inflation_latest,
            required_raise_today_pct: series.required_raise_today_pct,
            usd_salary_latest,
            purchasing_power_gap_pct: actual / required - 1.0,
        })
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────
