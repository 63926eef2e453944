use chrono::{Datelike, Duration, NaiveDate};
use tracing::debug;

use crate::models::{Frequency, RecurrenceRule};

/// Hard ceiling on day steps for one walk, whatever the window size.
pub const MAX_ITERATIONS: usize = 5000;

/// Dates produced for a window, plus whether the iteration ceiling cut the
/// walk short before the end of the window.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Occurrences {
    pub dates: Vec<NaiveDate>,
    pub truncated: bool,
}

impl Occurrences {
    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }
}

/// Does `rule` fire on `date`?
///
/// Never true before the rule's start date or after its end date. The
/// interval is measured from the start date in whole units of the
/// frequency: days, weeks (day distance / 7), calendar months or years.
pub fn is_occurrence(rule: &RecurrenceRule, date: NaiveDate) -> bool {
    let start = rule.start_date;
    if date < start {
        return false;
    }
    if rule.end_date.is_some_and(|end| date > end) {
        return false;
    }

    let interval = i64::from(rule.interval.max(1));
    let days = (date - start).num_days();

    match rule.frequency {
        Frequency::Daily => days % interval == 0,
        Frequency::Weekly => {
            rule.week_days.contains(date.weekday()) && (days / 7) % interval == 0
        }
        Frequency::Monthly => {
            let months = i64::from(date.year() - start.year()) * 12
                + i64::from(date.month()) - i64::from(start.month());
            months % interval == 0 && matches_month_day(rule, date)
        }
        Frequency::Yearly => {
            let years = i64::from(date.year() - start.year());
            years % interval == 0 && date.month() == start.month() && date.day() == start.day()
        }
    }
}

fn matches_month_day(rule: &RecurrenceRule, date: NaiveDate) -> bool {
    match rule.nth_weekday_mode() {
        Some((nth, weekday)) => {
            if date.weekday() != weekday {
                return false;
            }
            if nth == -1 {
                (date + Duration::days(7)).month() != date.month()
            } else {
                ((date.day() - 1) / 7 + 1) as i32 == nth
            }
        }
        // No clamping: day 31 simply never fires in a 30-day month
        None => date.day() == rule.day_of_month.unwrap_or_else(|| rule.start_date.day()),
    }
}

/// All occurrences of `rule` in `[window_start, window_end]`, ascending.
pub fn generate(rule: &RecurrenceRule, window_start: NaiveDate, window_end: NaiveDate) -> Occurrences {
    generate_with_limit(rule, window_start, window_end, MAX_ITERATIONS)
}

pub fn generate_with_limit(
    rule: &RecurrenceRule,
    window_start: NaiveDate,
    window_end: NaiveDate,
    max_iterations: usize,
) -> Occurrences {
    let mut result = Occurrences::default();
    let last = match rule.end_date {
        Some(end) => end.min(window_end),
        None => window_end,
    };

    let mut cursor = rule.start_date.max(window_start);
    let mut steps = 0;
    while cursor <= last {
        if steps >= max_iterations {
            result.truncated = true;
            debug!(%cursor, %last, max_iterations, "occurrence walk hit the iteration ceiling");
            break;
        }
        if is_occurrence(rule, cursor) {
            result.dates.push(cursor);
        }
        steps += 1;
        cursor = match cursor.succ_opt() {
            Some(next) => next,
            None => break,
        };
    }

    result
}

/// First occurrence strictly after `after`, if one lies within the
/// iteration ceiling and before the rule's end date.
pub fn next_occurrence_after(rule: &RecurrenceRule, after: NaiveDate) -> Option<NaiveDate> {
    let from = after.succ_opt()?;
    preview(rule, from, 1).into_iter().next()
}

/// Up to `count` occurrences on or after `from`.
pub fn preview(rule: &RecurrenceRule, from: NaiveDate, count: usize) -> Vec<NaiveDate> {
    let mut dates = Vec::with_capacity(count.min(64));
    if count == 0 {
        return dates;
    }

    let mut cursor = rule.start_date.max(from);
    for _ in 0..MAX_ITERATIONS {
        if rule.end_date.is_some_and(|end| cursor > end) {
            break;
        }
        if is_occurrence(rule, cursor) {
            dates.push(cursor);
            if dates.len() == count {
                break;
            }
        }
        cursor = match cursor.succ_opt() {
            Some(next) => next,
            None => break,
        };
    }
    dates
}
