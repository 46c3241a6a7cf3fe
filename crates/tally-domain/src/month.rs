//! Month keys used to index assignments and budget views.

use std::{fmt, str::FromStr};

use chrono::{Datelike, Duration, NaiveDate};
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

/// A calendar month, always normalized to its first day.
///
/// Serialized as `YYYY-MM-01`. Parsing accepts `YYYY-MM` or any full date, which
/// is normalized to the first of its month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MonthKey(NaiveDate);

impl MonthKey {
    pub fn new(year: i32, month: u32) -> Result<Self, MonthKeyError> {
        NaiveDate::from_ymd_opt(year, month, 1)
            .map(Self)
            .ok_or_else(|| MonthKeyError::Malformed(format!("{year:04}-{month:02}")))
    }

    /// Returns the month containing `date`.
    pub fn containing(date: NaiveDate) -> Self {
        Self(date - Duration::days(i64::from(date.day0())))
    }

    pub fn year(self) -> i32 {
        self.0.year()
    }

    pub fn month(self) -> u32 {
        self.0.month()
    }

    pub fn first_day(self) -> NaiveDate {
        self.0
    }

    /// The true last calendar day of the month.
    pub fn last_day(self) -> NaiveDate {
        let next = self.next();
        if next == self {
            return NaiveDate::MAX;
        }
        next.0 - Duration::days(1)
    }

    /// Inclusive `(first_day, last_day)` bounds.
    pub fn range(self) -> (NaiveDate, NaiveDate) {
        (self.first_day(), self.last_day())
    }

    pub fn contains(self, date: NaiveDate) -> bool {
        date.year() == self.year() && date.month() == self.month()
    }

    /// The following month. Saturates at the end of the supported calendar.
    pub fn next(self) -> Self {
        let (year, month) = if self.month() == 12 {
            (self.year() + 1, 1)
        } else {
            (self.year(), self.month() + 1)
        };
        Self::new(year, month).unwrap_or(self)
    }

    /// The preceding month. Saturates at the start of the supported calendar.
    pub fn previous(self) -> Self {
        let (year, month) = if self.month() == 1 {
            (self.year() - 1, 12)
        } else {
            (self.year(), self.month() - 1)
        };
        Self::new(year, month).unwrap_or(self)
    }

    /// Human readable label, e.g. `November 2025`.
    pub fn format_for_display(self) -> String {
        self.0.format("%B %Y").to_string()
    }
}

impl From<NaiveDate> for MonthKey {
    fn from(date: NaiveDate) -> Self {
        Self::containing(date)
    }
}

impl fmt::Display for MonthKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d"))
    }
}

impl FromStr for MonthKey {
    type Err = MonthKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
            return Ok(Self::containing(date));
        }
        NaiveDate::parse_from_str(&format!("{trimmed}-01"), "%Y-%m-%d")
            .map(Self)
            .map_err(|_| MonthKeyError::Malformed(trimmed.to_string()))
    }
}

impl Serialize for MonthKey {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for MonthKey {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(de::Error::custom)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MonthKeyError {
    Malformed(String),
}

impl fmt::Display for MonthKeyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MonthKeyError::Malformed(raw) => {
                write!(f, "`{raw}` is not a month (expected YYYY-MM)")
            }
        }
    }
}

impl std::error::Error for MonthKeyError {}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn range_ends_on_true_last_day() {
        let cases = [
            (2024, 2, 29),
            (2025, 2, 28),
            (2025, 4, 30),
            (2025, 12, 31),
            (2025, 1, 31),
        ];
        for (year, month, last) in cases {
            let key = MonthKey::new(year, month).unwrap();
            assert_eq!(key.range(), (date(year, month, 1), date(year, month, last)));
        }
    }

    #[test]
    fn navigation_rolls_over_year_boundaries() {
        let december = MonthKey::new(2024, 12).unwrap();
        assert_eq!(december.next(), MonthKey::new(2025, 1).unwrap());
        assert_eq!(december.next().previous(), december);
        assert_eq!(
            MonthKey::new(2025, 1).unwrap().previous(),
            MonthKey::new(2024, 12).unwrap()
        );
    }

    #[test]
    fn parses_and_normalizes_to_first_day() {
        let key: MonthKey = "2025-11-18".parse().unwrap();
        assert_eq!(key.first_day(), date(2025, 11, 1));
        assert_eq!(key, "2025-11".parse().unwrap());
        assert_eq!(key.to_string(), "2025-11-01");
        assert!("2025-13".parse::<MonthKey>().is_err());
        assert!("november".parse::<MonthKey>().is_err());
    }

    #[test]
    fn display_label_uses_full_month_name() {
        assert_eq!(
            MonthKey::new(2025, 11).unwrap().format_for_display(),
            "November 2025"
        );
    }

    #[test]
    fn contains_matches_only_same_month() {
        let key = MonthKey::new(2025, 3).unwrap();
        assert!(key.contains(date(2025, 3, 31)));
        assert!(!key.contains(date(2025, 4, 1)));
        assert!(!key.contains(date(2024, 3, 15)));
        assert_eq!(MonthKey::containing(date(2025, 3, 17)), key);
    }

    #[test]
    fn serde_uses_iso_string() {
        let key = MonthKey::new(2025, 1).unwrap();
        let json = serde_json::to_string(&key).unwrap();
        assert_eq!(json, "\"2025-01-01\"");
        let parsed: MonthKey = serde_json::from_str("\"2025-01-20\"").unwrap();
        assert_eq!(parsed, key);
    }
}
