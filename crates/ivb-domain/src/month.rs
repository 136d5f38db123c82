//! Reporting-period tokens (`YYYY-MM`).

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// A validated `YYYY-MM` month token used to bucket transactions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MonthToken {
    year: i32,
    month: u32,
}

/// Raised when a string is not a `YYYY-MM` token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthTokenError(pub String);

impl fmt::Display for MonthTokenError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "`{}` is not a YYYY-MM month", self.0)
    }
}

impl std::error::Error for MonthTokenError {}

impl MonthToken {
    pub fn new(year: i32, month: u32) -> Option<Self> {
        if !(1..=12).contains(&month) || !(0..=9999).contains(&year) {
            return None;
        }
        Some(Self { year, month })
    }

    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    /// Returns `true` when `date` lies inside this month.
    pub fn contains(&self, date: NaiveDate) -> bool {
        date.year() == self.year && date.month() == self.month
    }
}

impl FromStr for MonthToken {
    type Err = MonthTokenError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let raw = value.trim();
        let invalid = || MonthTokenError(value.to_string());
        let bytes = raw.as_bytes();
        if bytes.len() != 7 || bytes[4] != b'-' {
            return Err(invalid());
        }
        let (year, month) = (&raw[..4], &raw[5..]);
        if !year.chars().chain(month.chars()).all(|c| c.is_ascii_digit()) {
            return Err(invalid());
        }
        let year: i32 = year.parse().map_err(|_| invalid())?;
        let month: u32 = month.parse().map_err(|_| invalid())?;
        MonthToken::new(year, month).ok_or_else(invalid)
    }
}

impl TryFrom<String> for MonthToken {
    type Error = MonthTokenError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<MonthToken> for String {
    fn from(value: MonthToken) -> Self {
        value.to_string()
    }
}

impl fmt::Display for MonthToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_and_displays_zero_padded_tokens() {
        let token: MonthToken = "2024-03".parse().expect("valid token");
        assert_eq!(token.year(), 2024);
        assert_eq!(token.month(), 3);
        assert_eq!(token.to_string(), "2024-03");
    }

    #[test]
    fn rejects_malformed_tokens() {
        for raw in ["2024-3", "2024/03", "2024-13", "2024-00", "24-03", "abcd-ef", ""] {
            assert!(raw.parse::<MonthToken>().is_err(), "{raw} should be rejected");
        }
    }

    #[test]
    fn contains_matches_year_and_month() {
        let token: MonthToken = "2024-03".parse().unwrap();
        assert!(token.contains(NaiveDate::from_ymd_opt(2024, 3, 31).unwrap()));
        assert!(!token.contains(NaiveDate::from_ymd_opt(2024, 4, 1).unwrap()));
        assert!(!token.contains(NaiveDate::from_ymd_opt(2023, 3, 1).unwrap()));
    }
}
