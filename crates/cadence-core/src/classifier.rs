//! Attention classification: which of Now / Past / Upcoming / Wrapped a task
//! (or one occurrence of a series) belongs in on a given day.
//!
//! Rules, first match wins:
//!
//! 1. **Wrapped** when the task is done, the occurrence is completed or
//!    skipped, or there is no date to act on at all. An undated backlog is
//!    quiet, not upcoming.
//! 2. **Past** when the relevant date is before today.
//! 3. **Now** when it is today.
//! 4. **Upcoming** when it is after today.
//!
//! For an occurrence the relevant date is its effective (possibly
//! rescheduled) date, while completion is always looked up by the original
//! occurrence date.

use chrono::NaiveDate;
use std::cmp::Ordering;
use std::collections::BTreeMap;

use crate::models::AttentionGroup;
use crate::record::TaskRecord;
use crate::tracker::unresolved_instances;

/// Classifies `record`, or its occurrence originally dated `instance_date`.
pub fn classify(today: NaiveDate, record: &TaskRecord, instance_date: Option<NaiveDate>) -> AttentionGroup {
    if record.is_done() {
        return AttentionGroup::Wrapped;
    }

    let instances = &record.instances;
    match instance_date {
        Some(original) => {
            if instances.is_resolved(original) {
                return AttentionGroup::Wrapped;
            }
            by_date(today, instances.effective_date(original))
        }
        None if record.is_series_template() => match earliest_open_date(record) {
            Some(date) => by_date(today, date),
            None => match record.plain_date() {
                Some(date) if date > today => AttentionGroup::Upcoming,
                _ => AttentionGroup::Wrapped,
            },
        },
        None => {
            let Some(date) = record.plain_date() else {
                return AttentionGroup::Wrapped;
            };
            let completed = [Some(date), record.scheduled, record.due]
                .into_iter()
                .flatten()
                .any(|d| instances.complete_instances.contains(&d));
            if completed {
                AttentionGroup::Wrapped
            } else {
                by_date(today, date)
            }
        }
    }
}

#[inline]
fn by_date(today: NaiveDate, date: NaiveDate) -> AttentionGroup {
    match date.cmp(&today) {
        Ordering::Less => AttentionGroup::Past,
        Ordering::Equal => AttentionGroup::Now,
        Ordering::Greater => AttentionGroup::Upcoming,
    }
}

/// Earliest effective date among a series' unresolved occurrences.
fn earliest_open_date(record: &TaskRecord) -> Option<NaiveDate> {
    unresolved_instances(record)
        .into_iter()
        .map(|original| record.instances.effective_date(original))
        .min()
}

/// One displayed line: a task, or one open occurrence of a series.
#[derive(Debug, Clone, PartialEq)]
pub struct AttentionRow<'a> {
    /// Position of the record in the input
    pub index: usize,
    pub record: &'a TaskRecord,
    /// Original occurrence date, for occurrence rows
    pub instance_date: Option<NaiveDate>,
    /// Date the row is shown under
    pub effective_date: Option<NaiveDate>,
    pub group: AttentionGroup,
}

/// Expands records into display rows: one per unresolved occurrence for a
/// series with open occurrences, otherwise one per record.
pub fn attention_rows<'a, I>(today: NaiveDate, records: I) -> Vec<AttentionRow<'a>>
where
    I: IntoIterator<Item = &'a TaskRecord>,
{
    let mut rows = Vec::new();
    for (index, record) in records.into_iter().enumerate() {
        let open = if record.is_series_template() {
            unresolved_instances(record)
        } else {
            Vec::new()
        };

        if open.is_empty() {
            rows.push(AttentionRow {
                index,
                record,
                instance_date: None,
                effective_date: record.plain_date(),
                group: classify(today, record, None),
            });
            continue;
        }

        for original in open {
            rows.push(AttentionRow {
                index,
                record,
                instance_date: Some(original),
                effective_date: Some(record.instances.effective_date(original)),
                group: classify(today, record, Some(original)),
            });
        }
    }
    rows
}

/// Rows grouped by attention bucket, each bucket ordered by effective date
/// (undated last), then title.
#[derive(Debug, Clone, Default)]
pub struct AttentionBoard<'a> {
    groups: BTreeMap<AttentionGroup, Vec<AttentionRow<'a>>>,
}

impl<'a> AttentionBoard<'a> {
    pub fn build<I>(today: NaiveDate, records: I) -> Self
    where
        I: IntoIterator<Item = &'a TaskRecord>,
    {
        let mut groups: BTreeMap<AttentionGroup, Vec<AttentionRow<'a>>> = BTreeMap::new();
        for row in attention_rows(today, records) {
            groups.entry(row.group).or_default().push(row);
        }
        for rows in groups.values_mut() {
            rows.sort_by(|a, b| {
                let date_order = match (a.effective_date, b.effective_date) {
                    (Some(x), Some(y)) => x.cmp(&y),
                    (Some(_), None) => Ordering::Less,
                    (None, Some(_)) => Ordering::Greater,
                    (None, None) => Ordering::Equal,
                };
                date_order.then_with(|| a.record.title.cmp(&b.record.title))
            });
        }
        Self { groups }
    }

    pub fn group(&self, group: AttentionGroup) -> &[AttentionRow<'a>] {
        self.groups.get(&group).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.groups.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Non-empty buckets in display order.
    pub fn iter(&self) -> impl Iterator<Item = (AttentionGroup, &[AttentionRow<'a>])> {
        self.groups
            .iter()
            .filter(|(_, rows)| !rows.is_empty())
            .map(|(group, rows)| (*group, rows.as_slice()))
    }
}
