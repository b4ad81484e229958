//! Plain-text presentation of a report.

use std::fmt::Write as _;

use lens_core::formatting::{format_number, format_signed_pct, format_try, format_usd};
use lens_core::models::{ReportRow, SourceKey};
use lens_data::analysis::AnalysisResult;

/// Headline block shown above the table.
pub fn render_summary(report: &AnalysisResult, source: SourceKey) -> String {
    let meta = &report.metadata;
    let summary = &report.summary;
    let mut out = String::new();

    let source_label = match source {
        SourceKey::Default => String::new(),
        other => format!(" ({} inflation)", other),
    };
    let _ = writeln!(
        out,
        "SalaryLens{}: {} - {}, {} months",
        source_label, meta.first_month, meta.last_month, meta.months
    );
    let _ = writeln!(
        out,
        "Base salary {} from {}, what-if {} at {}",
        format_try(report.scenario.base_salary),
        meta.first_month,
        format_signed_pct(report.scenario.what_if_pct / 100.0, 1),
        meta.what_if_month
    );
    let _ = writeln!(out);
    let _ = writeln!(
        out,
        "  Cumulative inflation       {:>14}",
        format_signed_pct(summary.cum_inflation_latest, 2)
    );
    let _ = writeln!(
        out,
        "  Required raise today       {:>14}",
        format_signed_pct(summary.required_raise_today_pct, 2)
    );
    let _ = writeln!(
        out,
        "  Salary in USD (latest)     {:>14}",
        format_usd(summary.usd_salary_latest)
    );
    let _ = writeln!(
        out,
        "  Purchasing power vs. need  {:>14}",
        format_signed_pct(summary.purchasing_power_gap_pct, 2)
    );
    out
}

/// Monthly table. Capped inflation values are marked with `*`.
pub fn render_table(rows: &[ReportRow]) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<8} {:>8} {:>8} {:>9} {:>15} {:>15} {:>9} {:>15} {:>9} {:>11}",
        "Month", "MoM %", "CPI", "Cum %", "Nominal", "Required", "Gap %", "Real", "USD/TRY", "USD"
    );

    for r in rows {
        let marker = if r.is_capped() { "*" } else { "" };
        let _ = writeln!(
            out,
            "{:<8} {:>8} {:>8} {:>9} {:>15} {:>15} {:>9} {:>15} {:>9} {:>11}",
            r.month.to_string(),
            format!("{}{}", format_number(r.inflation_pct, 2), marker),
            format_number(r.cpi, 2),
            format_signed_pct(r.cum_inflation, 2),
            format_try(r.nominal),
            format_try(r.required),
            format_signed_pct(r.gap_pct, 2),
            format_try(r.real),
            format_number(r.usdtry, 4),
            format_usd(r.usd),
        );
    }
    out
}
