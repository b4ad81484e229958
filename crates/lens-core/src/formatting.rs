//! Number, currency and CSV formatting.
//!
//! Nothing here affects the computation: rounding happens only when a value
//! is turned into text.

use crate::error::Result;
use crate::models::ReportRow;

// ── Locales ───────────────────────────────────────────────────────────────────

/// Separator pair used when grouping digits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NumberLocale {
    pub thousands: char,
    pub decimal: char,
}

/// `1,234.56`
pub const EN_US: NumberLocale = NumberLocale {
    thousands: ',',
    decimal: '.',
};

/// `1.234,56`
pub const TR_TR: NumberLocale = NumberLocale {
    thousands: '.',
    decimal: ',',
};

/// Format a floating-point number with thousands separators and a fixed number
/// of decimal places, using en-US separators.
///
/// # Examples
///
/// ```
/// use lens_core::formatting::format_number;
///
/// assert_eq!(format_number(1234.5,  1), "1,234.5");
/// assert_eq!(format_number(1234567.0, 0), "1,234,567");
/// assert_eq!(format_number(0.0, 2), "0.00");
/// assert_eq!(format_number(-9876.5, 1), "-9,876.5");
/// ```
pub fn format_number(value: f64, decimals: usize) -> String {
    format_number_in(value, decimals, EN_US)
}

/// Same as [`format_number`] with explicit separators.
pub fn format_number_in(value: f64, decimals: usize, locale: NumberLocale) -> String {
    let negative = value < 0.0;
    let fixed = format!("{:.*}", decimals, value.abs());

    let (int_part, frac_part) = match fixed.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (fixed.as_str(), None),
    };

    let mut out = String::with_capacity(fixed.len() + fixed.len() / 3 + 1);
    // "-0.00" reads badly; drop the sign when everything rounded to zero.
    if negative && fixed.bytes().any(|b| b.is_ascii_digit() && b != b'0') {
        out.push('-');
    }
    out.push_str(&group_thousands(int_part, locale.thousands));
    if let Some(frac) = frac_part {
        out.push(locale.decimal);
        out.push_str(frac);
    }
    out
}

/// Format an amount in Turkish lira, Turkish grouping, two decimals.
///
/// ```
/// use lens_core::formatting::format_try;
///
/// assert_eq!(format_try(1234.5), "₺1.234,50");
/// ```
pub fn format_try(amount: f64) -> String {
    if amount < 0.0 {
        format!("-₺{}", format_number_in(amount.abs(), 2, TR_TR))
    } else {
        format!("₺{}", format_number_in(amount, 2, TR_TR))
    }
}

/// Format an amount in US dollars, en-US grouping, two decimals.
///
/// ```
/// use lens_core::formatting::format_usd;
///
/// assert_eq!(format_usd(1234.56), "$1,234.56");
/// ```
pub fn format_usd(amount: f64) -> String {
    if amount < 0.0 {
        format!("-${}", format_number(amount.abs(), 2))
    } else {
        format!("${}", format_number(amount, 2))
    }
}

/// Format a fraction as an explicitly signed percentage, e.g. `"+21.50%"`.
pub fn format_signed_pct(fraction: f64, decimals: usize) -> String {
    let pct = fraction * 100.0;
    let sign = if pct >= 0.0 { "+" } else { "" };
    format!("{}{:.*}%", sign, decimals, pct)
}

// ── Salary input ──────────────────────────────────────────────────────────────

/// Parse a salary typed in Turkish notation.
///
/// Whitespace is ignored, `.` groups thousands and `,` starts the fraction,
/// of which at most two digits are kept. Any other non-digit is dropped.
/// Returns `None` for empty input, a missing integer part, or more than one
/// comma.
///
/// ```
/// use lens_core::formatting::parse_salary;
///
/// assert_eq!(parse_salary("100.000"), Some(100_000.0));
/// assert_eq!(parse_salary("12.345,678"), Some(12_345.67));
/// assert_eq!(parse_salary("1,2,3"), None);
/// ```
pub fn parse_salary(raw: &str) -> Option<f64> {
    let compact: String = raw.chars().filter(|c| !c.is_whitespace()).collect();
    if compact.is_empty() {
        return None;
    }

    let mut parts = compact.split(',');
    let int_raw = parts.next().unwrap_or_default();
    let frac_raw = parts.next();
    if parts.next().is_some() {
        return None;
    }

    let int_digits: String = int_raw.chars().filter(char::is_ascii_digit).collect();
    if int_digits.is_empty() {
        return None;
    }
    let frac_digits: String = frac_raw
        .unwrap_or_default()
        .chars()
        .filter(char::is_ascii_digit)
        .take(2)
        .collect();

    let literal = if frac_digits.is_empty() {
        int_digits
    } else {
        format!("{}.{}", int_digits, frac_digits)
    };
    literal.parse().ok()
}

// ── CSV export ────────────────────────────────────────────────────────────────

/// Column titles of the CSV export, in order.
pub const CSV_HEADER: [&str; 10] = [
    "Month",
    "MoM Inflation %",
    "CPI Index",
    "Cumulative Inflation %",
    "Nominal Salary (TRY)",
    "Required Salary (TRY)",
    "Gap vs Required %",
    "Real Salary (TRY)",
    "USD/TRY",
    "Salary (USD)",
];

/// Render report rows as CSV text.
///
/// Every field is quoted. Currency and percentage columns use two decimals,
/// the exchange rate four. Cumulative inflation and the gap are written as
/// percentages. Lines are separated by `\n` with no trailing newline.
pub fn to_csv(rows: &[ReportRow]) -> Result<String> {
    let mut writer = csv::WriterBuilder::new()
        .quote_style(csv::QuoteStyle::Always)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    writer.write_record(CSV_HEADER)?;
    for r in rows {
        writer.write_record([
            r.month.to_string(),
            format!("{:.2}", r.inflation_pct),
            format!("{:.2}", r.cpi),
            format!("{:.2}", r.cum_inflation * 100.0),
            format!("{:.2}", r.nominal),
            format!("{:.2}", r.required),
            format!("{:.2}", r.gap_pct * 100.0),
            format!("{:.2}", r.real),
            format!("{:.4}", r.usdtry),
            format!("{:.2}", r.usd),
        ])?;
    }

    let bytes = writer.into_inner().map_err(|e| e.into_error())?;
    let mut text = String::from_utf8(bytes).map_err(anyhow::Error::from)?;
    if text.ends_with('\n') {
        text.pop();
    }
    Ok(text)
}

// ── Internal helpers ──────────────────────────────────────────────────────────

/// Insert `sep` every three digits from the right of an integer string.
fn group_thousands(s: &str, sep: char) -> String {
    if s.len() <= 3 {
        return s.to_string();
    }
    let chars: Vec<char> = s.chars().collect();
    let mut result = String::with_capacity(s.len() + s.len() / 3);
    let remainder = chars.len() % 3;
    for (i, &c) in chars.iter().enumerate() {
        if i != 0 && (i % 3 == remainder) {
            result.push(sep);
        }
        result.push(c);
    }
    result
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::months::Month;

    fn sample_row() -> ReportRow {
        ReportRow {
            month: "2024-03".parse::<Month>().unwrap(),
            inflation_pct_raw: 3.16,
            inflation_pct: 3.16,
            cpi: 110.123_456,
            cum_inflation: 0.101_234_56,
            nominal: 45_000.0,
            required: 49_555.5,
            gap_pct: -0.091_93,
            real: 40_863.7,
            usdtry: 32.123_456_7,
            usd: 1_400.87,
        }
    }

    // ── format_number ────────────────────────────────────────────────────────

    #[test]
    fn test_format_number_zero() {
        assert_eq!(format_number(0.0, 0), "0");
        assert_eq!(format_number(0.0, 2), "0.00");
    }

    #[test]
    fn test_format_number_no_thousands() {
        assert_eq!(format_number(123.456, 2), "123.46");
    }

    #[test]
    fn test_format_number_millions() {
        assert_eq!(format_number(1_234_567.0, 0), "1,234,567");
    }

    #[test]
    fn test_format_number_negative() {
        assert_eq!(format_number(-9_876.5, 1), "-9,876.5");
    }

    #[test]
    fn test_format_number_negative_rounds_to_zero() {
        assert_eq!(format_number(-0.001, 2), "0.00");
    }

    #[test]
    fn test_format_number_turkish() {
        assert_eq!(format_number_in(1_234_567.891, 2, TR_TR), "1.234.567,89");
    }

    // ── currency / percent ───────────────────────────────────────────────────

    #[test]
    fn test_format_try() {
        assert_eq!(format_try(100_000.0), "₺100.000,00");
        assert_eq!(format_try(-12.5), "-₺12,50");
    }

    #[test]
    fn test_format_usd() {
        assert_eq!(format_usd(1_000_000.0), "$1,000,000.00");
        assert_eq!(format_usd(0.0), "$0.00");
    }

    #[test]
    fn test_format_signed_pct() {
        assert_eq!(format_signed_pct(0.21, 2), "+21.00%");
        assert_eq!(format_signed_pct(-0.0919, 2), "-9.19%");
        assert_eq!(format_signed_pct(0.0, 2), "+0.00%");
    }

    // ── parse_salary ─────────────────────────────────────────────────────────

    #[test]
    fn test_parse_salary_plain() {
        assert_eq!(parse_salary("45000"), Some(45_000.0));
    }

    #[test]
    fn test_parse_salary_grouped_with_fraction() {
        assert_eq!(parse_salary(" 1.250.000,5 "), Some(1_250_000.5));
    }

    #[test]
    fn test_parse_salary_truncates_fraction() {
        assert_eq!(parse_salary("10,999"), Some(10.99));
    }

    #[test]
    fn test_parse_salary_rejects() {
        assert_eq!(parse_salary(""), None);
        assert_eq!(parse_salary("   "), None);
        assert_eq!(parse_salary(",50"), None);
        assert_eq!(parse_salary("1,000,000"), None);
        assert_eq!(parse_salary("abc"), None);
    }

    // ── CSV ──────────────────────────────────────────────────────────────────

    #[test]
    fn test_to_csv_header_only() {
        let csv = to_csv(&[]).unwrap();
        assert!(!csv.ends_with('\n'));
        assert!(csv.starts_with("\"Month\",\"MoM Inflation %\""));
        assert_eq!(csv.lines().count(), 1);
    }

    #[test]
    fn test_to_csv_row_layout() {
        let csv = to_csv(&[sample_row()]).unwrap();
        let lines: Vec<&str> = csv.split('\n').collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(
            lines[1],
            "\"2024-03\",\"3.16\",\"110.12\",\"10.12\",\"45000.00\",\"49555.50\",\"-9.19\",\"40863.70\",\"32.1235\",\"1400.87\""
        );
    }

    #[test]
    fn test_to_csv_multiple_rows_no_trailing_newline() {
        let rows = vec![sample_row(); 3];
        let csv = to_csv(&rows).unwrap();
        assert!(!csv.ends_with('\n'));
        assert_eq!(csv.split('\n').count(), 4);
    }

    #[test]
    fn test_to_csv_round_trips_through_csv_reader() {
        let row = sample_row();
        let text = to_csv(&[row.clone()]).unwrap();

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_reader(text.as_bytes());

        let headers = reader.headers().unwrap().clone();
        assert_eq!(headers.iter().collect::<Vec<_>>(), CSV_HEADER.to_vec());

        let records: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
        assert_eq!(records.len(), 1);
        let rec = &records[0];

        let num = |i: usize| rec.get(i).unwrap().parse::<f64>().unwrap();
        assert_eq!(rec.get(0), Some("2024-03"));
        assert!((num(1) - row.inflation_pct).abs() <= 0.005);
        assert!((num(2) - row.cpi).abs() <= 0.005);
        assert!((num(3) - row.cum_inflation * 100.0).abs() <= 0.005);
        assert!((num(4) - row.nominal).abs() <= 0.005);
        assert!((num(5) - row.required).abs() <= 0.005);
        assert!((num(6) - row.gap_pct * 100.0).abs() <= 0.005);
        assert!((num(7) - row.real).abs() <= 0.005);
        assert!((num(8) - row.usdtry).abs() <= 0.000_05);
        assert!((num(9) - row.usd).abs() <= 0.005);
    }
}
