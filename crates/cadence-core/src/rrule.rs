//! Compact textual encoding of a [`RecurrenceRule`], loosely modelled on
//! RFC 5545: `DTSTART:20260201;FREQ=WEEKLY;INTERVAL=2;BYDAY=MO,WE;UNTIL=20260630`.

use chrono::{Datelike, NaiveDate, Weekday};
use tracing::warn;

use crate::error::CoreError;
use crate::models::{
    is_valid_nth, parse_weekday_code, weekday_code, Frequency, RecurrenceRule, WeekDays,
};

const COMPACT_DATE: &str = "%Y%m%d";

/// How `decode` treats input it cannot make sense of.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DecodeMode {
    /// Unknown `FREQ` becomes daily, a missing `DTSTART` becomes the fallback
    /// start date and unreadable values are dropped. Never fails.
    #[default]
    Lenient,
    /// Any of the above is an `InvalidRRule` error.
    Strict,
}

pub fn encode(rule: &RecurrenceRule) -> String {
    let mut parts = vec![
        format!("DTSTART:{}", rule.start_date.format(COMPACT_DATE)),
        format!("FREQ={}", rule.frequency.as_rrule()),
    ];

    if rule.interval > 1 {
        parts.push(format!("INTERVAL={}", rule.interval));
    }

    match rule.frequency {
        Frequency::Weekly if !rule.week_days.is_empty() => {
            let days: Vec<&str> = rule.week_days.iter().map(weekday_code).collect();
            parts.push(format!("BYDAY={}", days.join(",")));
        }
        Frequency::Monthly => match (rule.nth_weekday_mode(), rule.day_of_month) {
            (Some((nth, weekday)), _) => parts.push(format!("BYDAY={}{}", nth, weekday_code(weekday))),
            (None, Some(day)) => parts.push(format!("BYMONTHDAY={}", day)),
            (None, None) => {}
        },
        _ => {}
    }

    if let Some(end) = rule.end_date {
        parts.push(format!("UNTIL={}", end.format(COMPACT_DATE)));
    }

    parts.join(";")
}

/// Decodes a stored rule. `fallback_start` stands in for a missing or
/// unreadable `DTSTART` in lenient mode; callers pass their local today.
pub fn decode(
    input: &str,
    mode: DecodeMode,
    fallback_start: NaiveDate,
) -> Result<RecurrenceRule, CoreError> {
    let mut frequency: Option<Frequency> = None;
    let mut start_date: Option<NaiveDate> = None;
    let mut end_date: Option<NaiveDate> = None;
    let mut interval: u32 = 1;
    let mut week_days = WeekDays::new();
    let mut nth: Option<(i32, Weekday)> = None;
    let mut day_of_month: Option<u32> = None;

    for token in input
        .split(|c| c == ';' || c == '\n' || c == '\r')
        .map(str::trim)
        .filter(|t| !t.is_empty())
    {
        let token = strip_prefix_ignore_case(token, "RRULE:").unwrap_or(token);
        let Some((key, value)) = token.split_once(|c| c == ':' || c == '=') else {
            reject(mode, format!("token '{}' has no value", token))?;
            continue;
        };
        let value = value.trim();

        match key.trim().to_uppercase().as_str() {
            "DTSTART" => match parse_rrule_date(value) {
                Some(date) => start_date = Some(date),
                None => reject(mode, format!("unreadable DTSTART '{}'", value))?,
            },
            "UNTIL" => match parse_rrule_date(value) {
                Some(date) => end_date = Some(date),
                None => reject(mode, format!("unreadable UNTIL '{}'", value))?,
            },
            "FREQ" => match value.parse::<Frequency>() {
                Ok(freq) => frequency = Some(freq),
                Err(_) => {
                    reject(mode, format!("unknown FREQ '{}', using DAILY", value))?;
                    frequency = Some(Frequency::Daily);
                }
            },
            "INTERVAL" => match value.parse::<u32>() {
                Ok(n) if n > 0 => interval = n,
                _ => reject(mode, format!("invalid INTERVAL '{}'", value))?,
            },
            "BYDAY" => match match_nth_weekday(value) {
                Some((ordinal, weekday)) => {
                    if !ordinal.is_some_and(is_valid_nth) {
                        reject(mode, format!("BYDAY ordinal out of range in '{}', rule never fires", value))?;
                    }
                    // 0 matches no week of any month
                    nth = Some((ordinal.unwrap_or(0), weekday));
                }
                None => {
                    for code in value.split(',').filter(|c| !c.trim().is_empty()) {
                        match parse_weekday_code(code) {
                            Some(day) => week_days.insert(day),
                            None => reject(mode, format!("unknown BYDAY entry '{}'", code))?,
                        }
                    }
                }
            },
            "BYMONTHDAY" => match value.parse::<u32>() {
                Ok(day) if (1..=31).contains(&day) => day_of_month = Some(day),
                _ => reject(mode, format!("invalid BYMONTHDAY '{}'", value))?,
            },
            other => reject(mode, format!("unsupported key '{}'", other))?,
        }
    }

    let frequency = match frequency {
        Some(freq) => freq,
        None => {
            reject(mode, format!("missing FREQ in '{}', using DAILY", input))?;
            Frequency::Daily
        }
    };
    let start_date = match start_date {
        Some(date) => date,
        None => {
            reject(mode, format!("missing DTSTART in '{}', using {}", input, fallback_start))?;
            fallback_start
        }
    };

    if frequency != Frequency::Monthly {
        if let Some((n, weekday)) = nth {
            reject(
                mode,
                format!("BYDAY={}{} only applies to MONTHLY rules, ignoring it", n, weekday_code(weekday)),
            )?;
        }
    }

    let mut rule = RecurrenceRule {
        frequency,
        interval,
        week_days: WeekDays::new(),
        day_of_month: None,
        nth_weekday: None,
        weekday_for_nth: None,
        start_date,
        end_date,
    };

    match frequency {
        Frequency::Weekly => {
            if week_days.is_empty() {
                week_days.insert(start_date.weekday());
            }
            rule.week_days = week_days;
        }
        Frequency::Monthly => {
            // nth-weekday wins when both modes are present
            if let Some((n, weekday)) = nth {
                rule.nth_weekday = Some(n);
                rule.weekday_for_nth = Some(weekday);
            } else {
                rule.day_of_month = Some(day_of_month.unwrap_or_else(|| start_date.day()));
            }
        }
        Frequency::Daily | Frequency::Yearly => {}
    }

    Ok(rule)
}

fn reject(mode: DecodeMode, message: String) -> Result<(), CoreError> {
    match mode {
        DecodeMode::Strict => Err(CoreError::InvalidRRule(message)),
        DecodeMode::Lenient => {
            warn!("{}", message);
            Ok(())
        }
    }
}

fn strip_prefix_ignore_case<'a>(s: &'a str, prefix: &str) -> Option<&'a str> {
    match s.get(..prefix.len()) {
        Some(head) if head.eq_ignore_ascii_case(prefix) => Some(&s[prefix.len()..]),
        _ => None,
    }
}

/// `YYYYMMDD`, `YYYYMMDDTHHMMSS[Z]` (date part) or `YYYY-MM-DD`.
fn parse_rrule_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    if let Some(compact) = value.get(..8) {
        if compact.bytes().all(|b| b.is_ascii_digit()) {
            return NaiveDate::parse_from_str(compact, COMPACT_DATE).ok();
        }
    }
    value
        .get(..10)
        .and_then(|iso| NaiveDate::parse_from_str(iso, "%Y-%m-%d").ok())
}

/// `^(-?\d+)([A-Z]{2})$`, e.g. `2TU` or `-1FR`. The ordinal is returned
/// unchecked, `None` only when it overflows.
fn match_nth_weekday(value: &str) -> Option<(Option<i32>, Weekday)> {
    let value = value.trim();
    if value.len() < 3 || !value.is_char_boundary(value.len() - 2) {
        return None;
    }
    let (number, code) = value.split_at(value.len() - 2);
    let digits = number.strip_prefix('-').unwrap_or(number);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    if !code.bytes().all(|b| b.is_ascii_uppercase()) {
        return None;
    }
    let weekday = parse_weekday_code(code)?;
    Some((number.parse().ok(), weekday))
}
