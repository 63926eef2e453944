use anyhow::{anyhow, Result};
use cadence_core::models::parse_weekday_code;
use chrono::{NaiveDate, TimeZone, Utc, Weekday};
use chrono_english::{parse_date_string, Dialect};

/// Parses `2026-02-05`, or natural language ('tomorrow', 'next friday')
/// relative to `today`.
pub fn parse_date(input: &str, today: NaiveDate) -> Result<NaiveDate> {
    let input = input.trim();
    if let Ok(date) = NaiveDate::parse_from_str(input, "%Y-%m-%d") {
        return Ok(date);
    }

    let noon = today
        .and_hms_opt(12, 0, 0)
        .ok_or_else(|| anyhow!("Invalid reference date {}", today))?;
    parse_date_string(input, Utc.from_utc_datetime(&noon), Dialect::Uk)
        .map(|dt| dt.date_naive())
        .map_err(|e| anyhow!("Failed to parse date '{}': {}", input, e))
}

pub fn parse_optional_date(input: Option<&str>, today: NaiveDate) -> Result<Option<NaiveDate>> {
    input.map(|s| parse_date(s, today)).transpose()
}

/// Accepts 'mon', 'Monday' or RRULE codes like 'MO'.
pub fn parse_weekday(input: &str) -> Result<Weekday> {
    let input = input.trim();
    parse_weekday_code(input)
        .or_else(|| input.parse::<Weekday>().ok())
        .ok_or_else(|| anyhow!("Invalid weekday '{}'", input))
}

/// Comma- or space-separated weekdays.
pub fn parse_weekdays(input: &str) -> Result<Vec<Weekday>> {
    input
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|part| !part.is_empty())
        .map(parse_weekday)
        .collect()
}
