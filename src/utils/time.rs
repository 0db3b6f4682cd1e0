use std::fmt::Display;

use anyhow::{anyhow, Result};
use chrono::{DateTime, Local, NaiveDate};
use chrono_english::parse_date_string;
use clap::ValueEnum;

/// This is the standard way of converting a date to a string in streakgrid.
pub fn date_to_record_name(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

#[derive(Debug, Clone, Copy, ValueEnum, Default)]
pub enum DateStyle {
    #[default]
    Uk,
    Us,
}

impl From<DateStyle> for chrono_english::Dialect {
    fn from(value: DateStyle) -> Self {
        match value {
            DateStyle::Uk => Self::Uk,
            DateStyle::Us => Self::Us,
        }
    }
}

impl Display for DateStyle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DateStyle::Uk => write!(f, "uk"),
            DateStyle::Us => write!(f, "us"),
        }
    }
}

/// Parses dates like "yesterday", "2 days ago", "15/03/2025" or "2025-03-15" relative to `now`.
pub fn parse_day(value: &str, now: DateTime<Local>, style: DateStyle) -> Result<NaiveDate> {
    if let Ok(date) = NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d") {
        return Ok(date);
    }
    parse_date_string(value, now, style.into())
        .map(|v| v.date_naive())
        .map_err(|e| anyhow!("Can't parse {value} into a date: {e}"))
}

#[cfg(test)]
mod tests {
    use anyhow::Result;
    use chrono::{Local, NaiveDate, TimeZone};

    use super::{date_to_record_name, parse_day, DateStyle};

    #[test]
    fn record_names() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 5).unwrap();
        assert_eq!(date_to_record_name(date), "2024-03-05");
    }

    #[test]
    fn relative_and_absolute_days() -> Result<()> {
        let now = Local.with_ymd_and_hms(2025, 3, 16, 12, 0, 0).unwrap();
        assert_eq!(
            parse_day("2025-01-02", now, DateStyle::Uk)?,
            NaiveDate::from_ymd_opt(2025, 1, 2).unwrap()
        );
        assert_eq!(
            parse_day("yesterday", now, DateStyle::Uk)?,
            NaiveDate::from_ymd_opt(2025, 3, 15).unwrap()
        );
        assert_eq!(
            parse_day("04/03/2025", now, DateStyle::Uk)?,
            NaiveDate::from_ymd_opt(2025, 3, 4).unwrap()
        );
        assert_eq!(
            parse_day("04/03/2025", now, DateStyle::Us)?,
            NaiveDate::from_ymd_opt(2025, 4, 3).unwrap()
        );
        assert!(parse_day("the day after never", now, DateStyle::Uk).is_err());
        Ok(())
    }
}
