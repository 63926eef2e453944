use anyhow::{anyhow, Result};
use cadence_core::models::{RecurrenceAnchor, RecurrenceRule};
use cadence_core::store::TaskStore;
use chrono::{Datelike, NaiveDate, Weekday};
use owo_colors::OwoColorize;

use super::Context;
use crate::cli::{RecurCommand, RecurrenceShortcut};
use crate::parser::{parse_optional_date, parse_weekday, parse_weekdays};
use crate::util::resolve_task;

pub fn recur_task(store: &mut impl TaskStore, ctx: &Context, command: RecurCommand) -> Result<()> {
    let today = ctx.today();
    let mut task = resolve_task(store, &command.id)?;

    let start = parse_optional_date(command.start.as_deref(), today)?
        .or(task.record.scheduled)
        .unwrap_or(today);
    let rule = build_rule(&command, start, today)?;

    task.record.set_rule(&rule);
    if task.record.recurrence_anchor.is_none() {
        task.record.recurrence_anchor = Some(RecurrenceAnchor::Scheduled);
    }
    store.save(&task)?;

    println!(
        "'{}' now repeats {}",
        task.display_name(),
        rule.to_string().green()
    );
    Ok(())
}

/// Turns the command-line flags into a rule starting on `start`.
pub fn build_rule(command: &RecurCommand, start: NaiveDate, today: NaiveDate) -> Result<RecurrenceRule> {
    let rule = match command.every {
        RecurrenceShortcut::Daily => RecurrenceRule::daily(start),
        RecurrenceShortcut::Weekly => {
            let days = match &command.on {
                Some(on) => parse_weekdays(on)?,
                None => Vec::new(),
            };
            RecurrenceRule::weekly(start, days)
        }
        RecurrenceShortcut::Weekdays => RecurrenceRule::weekly(
            start,
            [Weekday::Mon, Weekday::Tue, Weekday::Wed, Weekday::Thu, Weekday::Fri],
        ),
        RecurrenceShortcut::Weekends => RecurrenceRule::weekly(start, [Weekday::Sat, Weekday::Sun]),
        RecurrenceShortcut::Monthly => match (command.nth, &command.weekday) {
            (Some(nth), Some(weekday)) => RecurrenceRule::monthly_nth_weekday(start, nth, parse_weekday(weekday)?)?,
            (Some(_), None) | (None, Some(_)) => {
                return Err(anyhow!("--nth and --weekday must be given together"));
            }
            (None, None) => RecurrenceRule::monthly_by_day(start, command.day.unwrap_or_else(|| start.day()))?,
        },
        RecurrenceShortcut::Yearly => RecurrenceRule::yearly(start),
    };

    let rule = rule.with_interval(command.interval);
    match parse_optional_date(command.until.as_deref(), today)? {
        Some(until) if until < start => Err(anyhow!("--until {} is before the start date {}", until, start)),
        Some(until) => Ok(rule.until(until)),
        None => Ok(rule),
    }
}
