//! The typed task record and its YAML frontmatter boundary.
//!
//! Field names and the `YYYY-MM-DD` date format are shared with other tools
//! reading the same files, so they are written exactly as listed here.
//! Unknown keys are carried through untouched.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::error::CoreError;
use crate::models::{RecurrenceAnchor, RecurrenceRule, TaskStatus};
use crate::rrule::{self, DecodeMode};

/// Per-occurrence state of a series template, keyed by original
/// occurrence date.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstanceState {
    #[serde(
        default,
        skip_serializing_if = "BTreeSet::is_empty",
        deserialize_with = "lenient::date_set"
    )]
    pub active_instances: BTreeSet<NaiveDate>,
    #[serde(
        default,
        skip_serializing_if = "BTreeSet::is_empty",
        deserialize_with = "lenient::date_set"
    )]
    pub complete_instances: BTreeSet<NaiveDate>,
    #[serde(
        default,
        skip_serializing_if = "BTreeSet::is_empty",
        deserialize_with = "lenient::date_set"
    )]
    pub skipped_instances: BTreeSet<NaiveDate>,
    /// original occurrence date -> display date
    #[serde(
        default,
        skip_serializing_if = "BTreeMap::is_empty",
        deserialize_with = "lenient::date_map"
    )]
    pub rescheduled_instances: BTreeMap<NaiveDate, NaiveDate>,
}

impl InstanceState {
    /// Display date of the occurrence originally dated `original`.
    #[inline]
    pub fn effective_date(&self, original: NaiveDate) -> NaiveDate {
        self.rescheduled_instances
            .get(&original)
            .copied()
            .unwrap_or(original)
    }

    /// Completed or skipped.
    #[inline]
    pub fn is_resolved(&self, original: NaiveDate) -> bool {
        self.complete_instances.contains(&original) || self.skipped_instances.contains(&original)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaskRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient::optional_date"
    )]
    pub scheduled: Option<NaiveDate>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient::optional_date"
    )]
    pub due: Option<NaiveDate>,
    /// Encoded [`RecurrenceRule`]; absent for one-shot tasks
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recurrence: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recurrence_anchor: Option<RecurrenceAnchor>,
    #[serde(flatten)]
    pub instances: InstanceState,
    #[serde(flatten)]
    pub extra: serde_yaml::Mapping,
}

impl TaskRecord {
    pub fn is_series_template(&self) -> bool {
        self.recurrence.is_some()
    }

    /// Parsed `status`; unrecognised values read as `None`.
    pub fn task_status(&self) -> Option<TaskStatus> {
        self.status.as_deref().and_then(|s| s.parse().ok())
    }

    pub fn is_done(&self) -> bool {
        self.task_status() == Some(TaskStatus::Done)
    }

    pub fn set_status(&mut self, status: TaskStatus) {
        self.status = Some(status.to_string());
    }

    /// The earlier of `scheduled` and `due`.
    pub fn plain_date(&self) -> Option<NaiveDate> {
        match (self.scheduled, self.due) {
            (Some(s), Some(d)) => Some(s.min(d)),
            (s, d) => s.or(d),
        }
    }

    /// Decodes `recurrence`, if any. `today` fills a missing `DTSTART` in
    /// lenient mode.
    pub fn rule(&self, mode: DecodeMode, today: NaiveDate) -> Result<Option<RecurrenceRule>, CoreError> {
        self.recurrence
            .as_deref()
            .map(|encoded| rrule::decode(encoded, mode, today))
            .transpose()
    }

    /// Turns the record into a series template for `rule`. A task without a
    /// scheduled date gets the rule's start date.
    pub fn set_rule(&mut self, rule: &RecurrenceRule) {
        self.recurrence = Some(rrule::encode(rule));
        if self.scheduled.is_none() {
            self.scheduled = Some(rule.start_date);
        }
    }
}

/// A markdown task file: YAML frontmatter plus an opaque body.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskDocument {
    pub record: TaskRecord,
    pub body: String,
}

impl TaskDocument {
    pub fn parse(text: &str) -> Result<Self, CoreError> {
        let Some((yaml, body)) = split_frontmatter(text) else {
            return Ok(Self {
                record: TaskRecord::default(),
                body: text.to_string(),
            });
        };

        let record = if yaml.trim().is_empty() {
            TaskRecord::default()
        } else {
            serde_yaml::from_str(yaml)?
        };

        Ok(Self {
            record,
            body: body.to_string(),
        })
    }

    pub fn render(&self) -> Result<String, CoreError> {
        let yaml = serde_yaml::to_string(&self.record)?;
        let mut out = String::with_capacity(yaml.len() + self.body.len() + 8);
        out.push_str("---\n");
        if yaml.trim() != "{}" {
            out.push_str(&yaml);
            if !yaml.ends_with('\n') {
                out.push('\n');
            }
        }
        out.push_str("---\n");
        out.push_str(&self.body);
        Ok(out)
    }
}

/// Splits `---\n<yaml>\n---\n<body>`; `None` when there is no frontmatter.
fn split_frontmatter(text: &str) -> Option<(&str, &str)> {
    let rest = text.strip_prefix("---")?;
    let rest = rest
        .strip_prefix("\r\n")
        .or_else(|| rest.strip_prefix('\n'))?;

    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        let trimmed = line.trim_end_matches(['\r', '\n']);
        if trimmed == "---" || trimmed == "..." {
            return Some((&rest[..offset], &rest[offset + line.len()..]));
        }
        offset += line.len();
    }
    None
}

/// Reads `YYYY-MM-DD`, or any string starting with one
/// (`2026-02-05T09:00` reads as 2026-02-05). Empty lists and maps may be
/// written as null.
mod lenient {
    use chrono::NaiveDate;
    use serde::de::Error;
    use serde::{Deserialize, Deserializer};
    use std::collections::{BTreeMap, BTreeSet};

    fn parse_date(value: &str) -> Option<NaiveDate> {
        value
            .trim()
            .get(..10)
            .and_then(|head| NaiveDate::parse_from_str(head, "%Y-%m-%d").ok())
    }

    fn date<E: Error>(value: &str) -> Result<NaiveDate, E> {
        parse_date(value).ok_or_else(|| E::custom(format!("invalid date '{}', expected YYYY-MM-DD", value)))
    }

    pub fn optional_date<'de, D: Deserializer<'de>>(d: D) -> Result<Option<NaiveDate>, D::Error> {
        match Option::<String>::deserialize(d)? {
            Some(s) if s.trim().is_empty() => Ok(None),
            Some(s) => date(&s).map(Some),
            None => Ok(None),
        }
    }

    pub fn date_set<'de, D: Deserializer<'de>>(d: D) -> Result<BTreeSet<NaiveDate>, D::Error> {
        Option::<Vec<String>>::deserialize(d)?
            .unwrap_or_default()
            .iter()
            .map(|s| date(s))
            .collect()
    }

    pub fn date_map<'de, D: Deserializer<'de>>(
        d: D,
    ) -> Result<BTreeMap<NaiveDate, NaiveDate>, D::Error> {
        Option::<BTreeMap<String, String>>::deserialize(d)?
            .unwrap_or_default()
            .iter()
            .map(|(from, to)| Ok((date::<D::Error>(from)?, date::<D::Error>(to)?)))
            .collect()
    }
}
