use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{LensError, Result};

/// Upper bound on the number of months [`month_range`] will enumerate.
pub const MAX_RANGE_MONTHS: usize = 1000;

fn month_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[0-9]{4}-[0-9]{2}$").expect("regex is valid"))
}

// ── Month ─────────────────────────────────────────────────────────────────────

/// A calendar year-month, textually `YYYY-MM`.
///
/// Field order makes the derived ordering agree with lexicographic comparison
/// of the fixed-width textual form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Month {
    year: u16,
    month: u8,
}

impl Month {
    /// Build a month from numeric parts. Returns `None` when `month` is not in
    /// `1..=12` or `year` does not fit four digits.
    pub fn new(year: u16, month: u8) -> Option<Self> {
        if year > 9999 || !(1..=12).contains(&month) {
            return None;
        }
        Some(Self { year, month })
    }

    pub fn year(self) -> u16 {
        self.year
    }

    pub fn month(self) -> u8 {
        self.month
    }

    /// Calendar successor: December wraps to January of the following year.
    ///
    /// Returns `None` past `9999-12`, which has no four-digit successor.
    pub fn next(self) -> Option<Self> {
        if self.month == 12 {
            Self::new(self.year.checked_add(1)?, 1)
        } else {
            Self::new(self.year, self.month + 1)
        }
    }
}

impl fmt::Display for Month {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for Month {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        if !month_pattern().is_match(s) {
            return Err(format!("expected YYYY-MM, got \"{}\"", s));
        }
        let year: u16 = s[0..4].parse().map_err(|_| format!("bad year in \"{}\"", s))?;
        let month: u8 = s[5..7].parse().map_err(|_| format!("bad month in \"{}\"", s))?;
        Month::new(year, month).ok_or_else(|| format!("month out of range in \"{}\"", s))
    }
}

impl TryFrom<String> for Month {
    type Error = String;

    fn try_from(value: String) -> std::result::Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Month> for String {
    fn from(value: Month) -> Self {
        value.to_string()
    }
}

// ── String-level helpers ──────────────────────────────────────────────────────

/// `true` iff `s` is a fixed-width `YYYY-MM` string with month in `01..=12`.
pub fn is_valid_month(s: &str) -> bool {
    s.parse::<Month>().is_ok()
}

/// Lexicographic ordering of two month strings.
///
/// Only meaningful for strings that pass [`is_valid_month`].
pub fn compare_months(a: &str, b: &str) -> Ordering {
    a.cmp(b)
}

/// Calendar successor of `m`.
pub fn next_month(m: Month) -> Option<Month> {
    m.next()
}

/// Inclusive ascending months from `start` to `end`.
///
/// Built by repeated successor application. Fails with
/// [`LensError::RangeTooLarge`] once the sequence would exceed
/// [`MAX_RANGE_MONTHS`], which also covers `start > end`.
pub fn month_range(start: Month, end: Month) -> Result<Vec<Month>> {
    let too_large = || LensError::RangeTooLarge {
        start: start.to_string(),
        end: end.to_string(),
        limit: MAX_RANGE_MONTHS,
    };

    let mut months = vec![start];
    let mut current = start;
    while current != end {
        if months.len() >= MAX_RANGE_MONTHS {
            return Err(too_large());
        }
        current = current.next().ok_or_else(too_large)?;
        months.push(current);
    }
    Ok(months)
}

// ── Tests ──────────────────────────────────────────────────────────────────────
