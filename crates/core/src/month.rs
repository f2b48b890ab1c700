//! Calendar month value used to key demand series.

use core::str::FromStr;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::EngineError;

/// A calendar month (`YYYY-MM`).
///
/// Ordering is chronological (year, then month).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct YearMonth {
    year: i32,
    month: u32,
}

impl YearMonth {
    /// Fails with `MalformedRecord` for a month outside 1..=12 or a year the
    /// calendar cannot represent.
    pub fn new(year: i32, month: u32) -> Result<Self, EngineError> {
        NaiveDate::from_ymd_opt(year, month, 1)
            .map(Self::from_date)
            .ok_or_else(|| EngineError::malformed(format!("month out of range: {year}-{month}")))
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

    /// First calendar day of the month. `None` only when `succ` has walked
    /// past the last representable year.
    pub fn first_day(&self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, 1)
    }

    /// The following calendar month.
    pub fn succ(&self) -> Self {
        if self.month == 12 {
            Self {
                year: self.year + 1,
                month: 1,
            }
        } else {
            Self {
                year: self.year,
                month: self.month + 1,
            }
        }
    }

    /// Signed number of months from `self` to `other`.
    pub fn months_until(&self, other: YearMonth) -> i64 {
        (other.year as i64 - self.year as i64) * 12 + (other.month as i64 - self.month as i64)
    }
}

impl core::fmt::Display for YearMonth {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for YearMonth {
    type Err = EngineError;

    /// Accepts `YYYY-MM`, `YYYY-MM-DD`, and date-times such as
    /// `YYYY-MM-DD HH:MM:SS` / `YYYY-MM-DDTHH:MM:SS`. The day and time are
    /// discarded.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = s.trim();
        let date_part = raw.split([' ', 'T']).next().unwrap_or_default();

        let parsed = if date_part.len() == 7 {
            NaiveDate::parse_from_str(&format!("{date_part}-01"), "%Y-%m-%d")
        } else {
            NaiveDate::parse_from_str(date_part, "%Y-%m-%d")
        };

        parsed
            .map(Self::from_date)
            .map_err(|e| EngineError::malformed(format!("invalid year_month '{raw}': {e}")))
    }
}

impl Serialize for YearMonth {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for YearMonth {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
