use chrono::NaiveDate;
use tracing::info;

use crate::error::CoreError;
use crate::models::EditScope;
use crate::record::TaskRecord;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RescheduleOutcome {
    /// `scheduled` moved; rule and instances untouched
    SeriesMoved {
        from: Option<NaiveDate>,
        to: NaiveDate,
    },
    /// One occurrence now displays on `to`
    InstanceMoved {
        original: NaiveDate,
        previous: Option<NaiveDate>,
        to: NaiveDate,
    },
}

/// Moves a one-shot task, or a whole series, by rewriting `scheduled`.
pub fn reschedule_series(record: &mut TaskRecord, new_date: NaiveDate) -> RescheduleOutcome {
    let from = record.scheduled.replace(new_date);
    info!(from = ?from, to = %new_date, "rescheduled task");
    RescheduleOutcome::SeriesMoved { from, to: new_date }
}

/// Moves the single occurrence originally dated `original` to `new_date`.
///
/// The only write is `rescheduled_instances[original] = new_date`; a second
/// call for the same `original` replaces the first.
pub fn reschedule_instance(
    record: &mut TaskRecord,
    original: NaiveDate,
    new_date: NaiveDate,
) -> Result<RescheduleOutcome, CoreError> {
    if !record.is_series_template() {
        return Err(CoreError::NotRecurring);
    }
    if !record.instances.active_instances.contains(&original) {
        return Err(CoreError::NotAnOccurrence(original));
    }

    let previous = record
        .instances
        .rescheduled_instances
        .insert(original, new_date);
    info!(%original, to = %new_date, "rescheduled occurrence");
    Ok(RescheduleOutcome::InstanceMoved {
        original,
        previous,
        to: new_date,
    })
}

pub fn reschedule(
    record: &mut TaskRecord,
    scope: EditScope,
    new_date: NaiveDate,
) -> Result<RescheduleOutcome, CoreError> {
    match scope {
        EditScope::EntireSeries => Ok(reschedule_series(record, new_date)),
        EditScope::ThisOccurrence(original) => reschedule_instance(record, original, new_date),
    }
}

/// Drops a single-occurrence override so the occurrence shows on its
/// original date again. Returns the date it had been moved to.
pub fn clear_instance_reschedule(record: &mut TaskRecord, original: NaiveDate) -> Option<NaiveDate> {
    record.instances.rescheduled_instances.remove(&original)
}

/// Collapses a series back into a plain task: the rule and anchor go,
/// active instances after `today` go, and `scheduled` becomes `today`.
/// There is no way back.
pub fn remove_recurrence(record: &mut TaskRecord, today: NaiveDate) {
    record.recurrence = None;
    record.recurrence_anchor = None;
    record
        .instances
        .active_instances
        .retain(|date| *date <= today);
    record.scheduled = Some(today);
    info!(%today, "recurrence removed");
}
