use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::error::CoreError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskStatus {
    Open,
    InProgress,
    Done,
    Cancelled,
}

#[derive(Error, Debug, PartialEq)]
#[error("Invalid task status: {0}")]
pub struct ParseTaskStatusError(String);

impl FromStr for TaskStatus {
    type Err = ParseTaskStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "open" | "todo" | "pending" => Ok(TaskStatus::Open),
            "in-progress" | "in_progress" | "doing" => Ok(TaskStatus::InProgress),
            "done" | "completed" | "complete" => Ok(TaskStatus::Done),
            "cancelled" | "canceled" => Ok(TaskStatus::Cancelled),
            _ => Err(ParseTaskStatusError(s.to_string())),
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskStatus::Open => write!(f, "open"),
            TaskStatus::InProgress => write!(f, "in-progress"),
            TaskStatus::Done => write!(f, "done"),
            TaskStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// Which field a series-level reschedule moves. Stored verbatim in
/// `recurrence_anchor`; the generator never reads it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecurrenceAnchor {
    Scheduled,
    Completion,
}

/// The four attention buckets, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum AttentionGroup {
    Now,
    Past,
    Upcoming,
    Wrapped,
}

impl AttentionGroup {
    pub const ALL: [AttentionGroup; 4] = [
        AttentionGroup::Now,
        AttentionGroup::Past,
        AttentionGroup::Upcoming,
        AttentionGroup::Wrapped,
    ];
}

impl fmt::Display for AttentionGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttentionGroup::Now => write!(f, "Now"),
            AttentionGroup::Past => write!(f, "Past"),
            AttentionGroup::Upcoming => write!(f, "Upcoming"),
            AttentionGroup::Wrapped => write!(f, "Wrapped"),
        }
    }
}

/// Scope of a reschedule on a recurring task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditScope {
    /// Move only the occurrence originally dated on this day
    ThisOccurrence(NaiveDate),
    /// Move the task's own `scheduled` date
    EntireSeries,
}

impl fmt::Display for EditScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EditScope::ThisOccurrence(date) => write!(f, "occurrence {}", date),
            EditScope::EntireSeries => write!(f, "series"),
        }
    }
}

// ============================================================================
// Recurrence rule
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Frequency {
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

impl Frequency {
    pub fn as_rrule(&self) -> &'static str {
        match self {
            Frequency::Daily => "DAILY",
            Frequency::Weekly => "WEEKLY",
            Frequency::Monthly => "MONTHLY",
            Frequency::Yearly => "YEARLY",
        }
    }
}

#[derive(Error, Debug, PartialEq)]
#[error("Invalid frequency: {0}")]
pub struct ParseFrequencyError(String);

impl FromStr for Frequency {
    type Err = ParseFrequencyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "DAILY" => Ok(Frequency::Daily),
            "WEEKLY" => Ok(Frequency::Weekly),
            "MONTHLY" => Ok(Frequency::Monthly),
            "YEARLY" => Ok(Frequency::Yearly),
            _ => Err(ParseFrequencyError(s.to_string())),
        }
    }
}

/// Two-letter RRULE weekday code (`MO`..`SU`).
pub fn weekday_code(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "MO",
        Weekday::Tue => "TU",
        Weekday::Wed => "WE",
        Weekday::Thu => "TH",
        Weekday::Fri => "FR",
        Weekday::Sat => "SA",
        Weekday::Sun => "SU",
    }
}

pub fn parse_weekday_code(code: &str) -> Option<Weekday> {
    match code.trim().to_uppercase().as_str() {
        "MO" => Some(Weekday::Mon),
        "TU" => Some(Weekday::Tue),
        "WE" => Some(Weekday::Wed),
        "TH" => Some(Weekday::Thu),
        "FR" => Some(Weekday::Fri),
        "SA" => Some(Weekday::Sat),
        "SU" => Some(Weekday::Sun),
        _ => None,
    }
}

/// A set of weekdays, iterated Monday first.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct WeekDays(u8);

impl WeekDays {
    pub fn new() -> Self {
        Self(0)
    }

    #[inline]
    fn bit(day: Weekday) -> u8 {
        1 << day.num_days_from_monday()
    }

    pub fn insert(&mut self, day: Weekday) {
        self.0 |= Self::bit(day);
    }

    pub fn remove(&mut self, day: Weekday) {
        self.0 &= !Self::bit(day);
    }

    #[inline]
    pub fn contains(&self, day: Weekday) -> bool {
        self.0 & Self::bit(day) != 0
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    pub fn iter(&self) -> impl Iterator<Item = Weekday> + '_ {
        let mut day = Weekday::Mon;
        (0..7).filter_map(move |_| {
            let current = day;
            day = day.succ();
            self.contains(current).then_some(current)
        })
    }
}

impl FromIterator<Weekday> for WeekDays {
    fn from_iter<I: IntoIterator<Item = Weekday>>(iter: I) -> Self {
        let mut set = WeekDays::new();
        for day in iter {
            set.insert(day);
        }
        set
    }
}

/// An abstract repeating-task rule in the user's local calendar.
///
/// Only the fields meaningful for `frequency` are consulted by the generator:
/// `week_days` for weekly, `day_of_month` or `nth_weekday` + `weekday_for_nth`
/// for monthly. Anything else is carried but ignored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecurrenceRule {
    pub frequency: Frequency,
    /// Every N units of `frequency`; never zero
    pub interval: u32,
    pub week_days: WeekDays,
    /// 1..=31, fires only in months that have the day
    pub day_of_month: Option<u32>,
    /// -1 (last) or 1..=5
    pub nth_weekday: Option<i32>,
    pub weekday_for_nth: Option<Weekday>,
    pub start_date: NaiveDate,
    /// Inclusive
    pub end_date: Option<NaiveDate>,
}

impl RecurrenceRule {
    fn base(frequency: Frequency, start_date: NaiveDate) -> Self {
        Self {
            frequency,
            interval: 1,
            week_days: WeekDays::new(),
            day_of_month: None,
            nth_weekday: None,
            weekday_for_nth: None,
            start_date,
            end_date: None,
        }
    }

    pub fn daily(start_date: NaiveDate) -> Self {
        Self::base(Frequency::Daily, start_date)
    }

    /// Weekly on `days`. An empty set means the weekday of `start_date`,
    /// not every day.
    pub fn weekly(start_date: NaiveDate, days: impl IntoIterator<Item = Weekday>) -> Self {
        let mut week_days: WeekDays = days.into_iter().collect();
        if week_days.is_empty() {
            week_days.insert(start_date.weekday());
        }
        Self {
            week_days,
            ..Self::base(Frequency::Weekly, start_date)
        }
    }

    pub fn monthly_by_day(start_date: NaiveDate, day_of_month: u32) -> Result<Self, CoreError> {
        if !(1..=31).contains(&day_of_month) {
            return Err(CoreError::InvalidInput(format!(
                "day of month must be between 1 and 31, got {}",
                day_of_month
            )));
        }
        Ok(Self {
            day_of_month: Some(day_of_month),
            ..Self::base(Frequency::Monthly, start_date)
        })
    }

    /// Monthly on the `nth` `weekday`; `nth == -1` is the last one in the month.
    pub fn monthly_nth_weekday(
        start_date: NaiveDate,
        nth: i32,
        weekday: Weekday,
    ) -> Result<Self, CoreError> {
        if !is_valid_nth(nth) {
            return Err(CoreError::InvalidInput(format!(
                "nth weekday must be -1 or 1..=5, got {}",
                nth
            )));
        }
        Ok(Self {
            nth_weekday: Some(nth),
            weekday_for_nth: Some(weekday),
            ..Self::base(Frequency::Monthly, start_date)
        })
    }

    /// Yearly on the month and day of `start_date`.
    pub fn yearly(start_date: NaiveDate) -> Self {
        Self::base(Frequency::Yearly, start_date)
    }

    pub fn with_interval(mut self, interval: u32) -> Self {
        self.interval = interval.max(1);
        self
    }

    pub fn until(mut self, end_date: NaiveDate) -> Self {
        self.end_date = Some(end_date);
        self
    }

    /// The nth-weekday pair, when the rule is in that monthly mode.
    pub fn nth_weekday_mode(&self) -> Option<(i32, Weekday)> {
        self.nth_weekday.zip(self.weekday_for_nth)
    }
}

pub(crate) fn is_valid_nth(nth: i32) -> bool {
    nth == -1 || (1..=5).contains(&nth)
}

fn ordinal_word(nth: i32) -> String {
    match nth {
        -1 => "last".to_string(),
        1 => "1st".to_string(),
        2 => "2nd".to_string(),
        3 => "3rd".to_string(),
        n => format!("{}th", n),
    }
}

impl fmt::Display for RecurrenceRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let unit = match self.frequency {
            Frequency::Daily => "day",
            Frequency::Weekly => "week",
            Frequency::Monthly => "month",
            Frequency::Yearly => "year",
        };
        if self.interval == 1 {
            write!(f, "every {}", unit)?;
        } else {
            write!(f, "every {} {}s", self.interval, unit)?;
        }

        match self.frequency {
            Frequency::Weekly => {
                let days: Vec<String> = self.week_days.iter().map(|d| d.to_string()).collect();
                write!(f, " on {}", days.join(", "))?;
            }
            Frequency::Monthly => match (self.nth_weekday_mode(), self.day_of_month) {
                (Some((nth, weekday)), _) => write!(f, " on the {} {}", ordinal_word(nth), weekday)?,
                (None, Some(day)) => write!(f, " on day {}", day)?,
                (None, None) => write!(f, " on day {}", self.start_date.day())?,
            },
            Frequency::Yearly => write!(f, " on {}", self.start_date.format("%b %-d"))?,
            Frequency::Daily => {}
        }

        write!(f, " from {}", self.start_date)?;
        if let Some(end) = self.end_date {
            write!(f, " until {}", end)?;
        }
        Ok(())
    }
}
