use chrono::{Duration, NaiveDate};
use std::collections::BTreeSet;
use tracing::{debug, info, warn};

use crate::error::CoreError;
use crate::generator;
use crate::models::{RecurrenceRule, TaskStatus};
use crate::record::TaskRecord;
use crate::rrule::DecodeMode;
use crate::store::TaskStore;

/// Configuration for materialization behavior
#[derive(Debug, Clone)]
pub struct MaterializationConfig {
    /// How stored rules are decoded
    pub decode_mode: DecodeMode,
    /// Whether to also activate occurrences missed while the app was closed
    pub enable_catchup: bool,
    /// How far back catch-up looks (days)
    pub catchup_days: u32,
}

impl Default for MaterializationConfig {
    fn default() -> Self {
        Self {
            decode_mode: DecodeMode::Lenient,
            enable_catchup: false,
            catchup_days: 7,
        }
    }
}

/// Statistics collected during a materialization pass
#[derive(Debug, Clone, Default)]
pub struct MaterializationSummary {
    /// Number of series templates looked at
    pub series_processed: usize,
    /// Dates added to `active_instances` across all series
    pub instances_created: usize,
    /// Number of series whose rule could not be decoded or whose update
    /// could not be saved
    pub series_with_errors: usize,
    /// Of those, updates the store refused; the pass is worth retrying
    pub save_failures: usize,
    /// Detailed error messages
    pub errors: Vec<String>,
    /// Records the store could not read, as `key: error`
    pub unreadable: Vec<String>,
}

/// A pending update for one series template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaterializedInstance {
    /// Position of the template in the slice handed to the manager
    pub index: usize,
    /// Dates that were not active yet
    pub added: Vec<NaiveDate>,
    /// The template's `active_instances` with `added` merged in
    pub active_instances: BTreeSet<NaiveDate>,
}

#[derive(Debug, Clone, Default)]
pub struct MaterializationPlan {
    pub updates: Vec<MaterializedInstance>,
    pub summary: MaterializationSummary,
}

/// MaterializationManager: turns "the rule fires today" into an entry in
/// `active_instances`.
///
/// Every pass is idempotent: running it again for the same `today` against
/// the resulting state adds nothing. Cost is one predicate check per series
/// template (plus a bounded window walk when catch-up is enabled).
#[derive(Debug, Clone, Default)]
pub struct MaterializationManager {
    config: MaterializationConfig,
}

impl MaterializationManager {
    pub fn new(config: MaterializationConfig) -> Self {
        Self { config }
    }

    pub fn with_defaults() -> Self {
        Self::new(MaterializationConfig::default())
    }

    pub fn config(&self) -> &MaterializationConfig {
        &self.config
    }

    pub fn update_config(&mut self, config: MaterializationConfig) {
        self.config = config;
    }

    /// Occurrence dates that should be active as of `today`.
    fn dates_due(&self, rule: &RecurrenceRule, today: NaiveDate) -> Vec<NaiveDate> {
        if self.config.enable_catchup {
            let from = today - Duration::days(i64::from(self.config.catchup_days));
            generator::generate(rule, from, today).dates
        } else if generator::is_occurrence(rule, today) {
            vec![today]
        } else {
            Vec::new()
        }
    }

    /// Works out which series templates gain an active instance today,
    /// without touching the records. Non-template records are ignored.
    pub fn materialize_today(&self, records: &[TaskRecord], today: NaiveDate) -> MaterializationPlan {
        let mut plan = MaterializationPlan::default();

        for (index, record) in records.iter().enumerate() {
            if !record.is_series_template() {
                continue;
            }
            plan.summary.series_processed += 1;

            let rule = match record.rule(self.config.decode_mode, today) {
                Ok(Some(rule)) => rule,
                Ok(None) => continue,
                Err(e) => {
                    warn!(title = record.title.as_deref().unwrap_or(""), error = %e, "skipping series with unreadable rule");
                    plan.summary.series_with_errors += 1;
                    plan.summary.errors.push(format!(
                        "{}: {}",
                        record.title.as_deref().unwrap_or("<untitled>"),
                        e
                    ));
                    continue;
                }
            };

            let active = &record.instances.active_instances;
            let added: Vec<NaiveDate> = self
                .dates_due(&rule, today)
                .into_iter()
                .filter(|date| !active.contains(date))
                .collect();
            if added.is_empty() {
                continue;
            }

            debug!(index, ?added, "activating occurrences");
            plan.summary.instances_created += added.len();
            let mut active_instances = active.clone();
            active_instances.extend(added.iter().copied());
            plan.updates.push(MaterializedInstance {
                index,
                added,
                active_instances,
            });
        }

        plan
    }

    /// Applies [`materialize_today`](Self::materialize_today) in place.
    pub fn apply_today(&self, records: &mut [TaskRecord], today: NaiveDate) -> MaterializationSummary {
        let plan = self.materialize_today(records, today);
        for update in plan.updates {
            records[update.index].instances.active_instances = update.active_instances;
        }
        plan.summary
    }

    /// Loads every record from `store`, materializes, and saves only the
    /// records that changed.
    pub fn materialize_store<S: TaskStore + ?Sized>(
        &self,
        store: &mut S,
        today: NaiveDate,
    ) -> Result<MaterializationSummary, CoreError> {
        let report = store.load_all()?;
        let records: Vec<TaskRecord> = report.tasks.iter().map(|t| t.record.clone()).collect();
        let plan = self.materialize_today(&records, today);

        let mut summary = plan.summary;
        for update in &plan.updates {
            let mut task = report.tasks[update.index].clone();
            task.record.instances.active_instances = update.active_instances.clone();
            if let Err(e) = store.save(&task) {
                warn!(key = %task.key, error = %e, "could not save materialized series");
                summary.instances_created -= update.added.len();
                summary.series_with_errors += 1;
                summary.save_failures += 1;
                summary.errors.push(format!("{}: {}", task.key, e));
            }
        }

        for (key, error) in &report.failures {
            summary.unreadable.push(format!("{}: {}", key, error));
        }
        info!(
            today = %today,
            series = summary.series_processed,
            created = summary.instances_created,
            errors = summary.errors.len(),
            unreadable = summary.unreadable.len(),
            "materialization pass finished"
        );
        Ok(summary)
    }
}

/// Detects process start and local-midnight rollover.
#[derive(Debug, Clone, Default)]
pub struct DayClock {
    last_seen: Option<NaiveDate>,
}

impl DayClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// True on the first tick and whenever the date differs from the
    /// previous tick's.
    pub fn tick(&mut self, today: NaiveDate) -> bool {
        let rolled = self.last_seen != Some(today);
        self.last_seen = Some(today);
        rolled
    }

    pub fn last_seen(&self) -> Option<NaiveDate> {
        self.last_seen
    }

    /// Forgets the last tick so the next one fires again, for a pass that
    /// has to be retried.
    pub fn reset(&mut self) {
        self.last_seen = None;
    }
}

// ============================================================================
// Per-occurrence state changes
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompletionResult {
    /// A one-shot task was marked done
    Task,
    /// One occurrence of a series was completed
    Instance {
        original: NaiveDate,
        effective: NaiveDate,
    },
}

fn require_active(record: &TaskRecord, original: NaiveDate) -> Result<(), CoreError> {
    if !record.is_series_template() {
        return Err(CoreError::NotRecurring);
    }
    if !record.instances.active_instances.contains(&original) {
        return Err(CoreError::NotAnOccurrence(original));
    }
    Ok(())
}

/// Active instances neither completed nor skipped, ascending by original date.
pub fn unresolved_instances(record: &TaskRecord) -> Vec<NaiveDate> {
    record
        .instances
        .active_instances
        .iter()
        .copied()
        .filter(|date| !record.instances.is_resolved(*date))
        .collect()
}

/// Marks the occurrence originally dated `original` done. Always keyed by
/// the original date, even when the occurrence was moved.
pub fn complete_instance(record: &mut TaskRecord, original: NaiveDate) -> Result<CompletionResult, CoreError> {
    require_active(record, original)?;
    record.instances.skipped_instances.remove(&original);
    record.instances.complete_instances.insert(original);
    Ok(CompletionResult::Instance {
        original,
        effective: record.instances.effective_date(original),
    })
}

pub fn reopen_instance(record: &mut TaskRecord, original: NaiveDate) -> Result<bool, CoreError> {
    require_active(record, original)?;
    Ok(record.instances.complete_instances.remove(&original))
}

pub fn skip_instance(record: &mut TaskRecord, original: NaiveDate) -> Result<bool, CoreError> {
    require_active(record, original)?;
    record.instances.complete_instances.remove(&original);
    Ok(record.instances.skipped_instances.insert(original))
}

pub fn unskip_instance(record: &mut TaskRecord, original: NaiveDate) -> Result<bool, CoreError> {
    require_active(record, original)?;
    Ok(record.instances.skipped_instances.remove(&original))
}

/// Completes a task the way a "done" action does: the given occurrence of a
/// series, the oldest unresolved occurrence when none is given, or the task
/// itself when it is not recurring.
pub fn complete(
    record: &mut TaskRecord,
    occurrence: Option<NaiveDate>,
) -> Result<CompletionResult, CoreError> {
    if !record.is_series_template() {
        if let Some(date) = occurrence {
            return Err(CoreError::NotAnOccurrence(date));
        }
        record.set_status(TaskStatus::Done);
        return Ok(CompletionResult::Task);
    }

    let original = match occurrence {
        Some(date) => date,
        None => unresolved_instances(record)
            .first()
            .copied()
            .ok_or_else(|| CoreError::NotFound("no open occurrence to complete".to_string()))?,
    };
    complete_instance(record, original)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RecurrenceRule;
    use crate::store::{MemoryStore, StoredTask};
    use chrono::Weekday;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn series(rule: &RecurrenceRule) -> TaskRecord {
        let mut record = TaskRecord {
            title: Some("Series".into()),
            ..Default::default()
        };
        record.set_rule(rule);
        record
    }

    mod materialization_tests {
        use super::*;

        #[test]
        fn test_adds_today_when_rule_fires() {
            let manager = MaterializationManager::with_defaults();
            let records = vec![
                series(&RecurrenceRule::daily(date(2026, 2, 1)).with_interval(2)),
                series(&RecurrenceRule::weekly(date(2026, 2, 2), [Weekday::Mon])),
                TaskRecord::default(),
            ];

            let plan = manager.materialize_today(&records, date(2026, 2, 5));
            assert_eq!(plan.updates.len(), 1);
            assert_eq!(plan.updates[0].index, 0);
            assert_eq!(plan.updates[0].added, vec![date(2026, 2, 5)]);
            assert_eq!(plan.summary.series_processed, 2);
            assert_eq!(plan.summary.instances_created, 1);
        }

        #[test]
        fn test_is_idempotent() {
            let manager = MaterializationManager::with_defaults();
            let mut records = vec![series(&RecurrenceRule::daily(date(2026, 2, 1)))];
            let today = date(2026, 2, 5);

            let first = manager.apply_today(&mut records, today);
            assert_eq!(first.instances_created, 1);
            let after_first = records.clone();

            let second = manager.apply_today(&mut records, today);
            assert_eq!(second.instances_created, 0);
            assert_eq!(records, after_first);
            assert_eq!(
                records[0].instances.active_instances.iter().copied().collect::<Vec<_>>(),
                vec![today]
            );
        }

        #[test]
        fn test_never_shrinks_active_instances() {
            let manager = MaterializationManager::with_defaults();
            let mut record = series(&RecurrenceRule::daily(date(2026, 2, 1)));
            record.instances.active_instances.insert(date(2026, 2, 1));
            let mut records = vec![record];

            manager.apply_today(&mut records, date(2026, 2, 3));
            let active: Vec<_> = records[0].instances.active_instances.iter().copied().collect();
            assert_eq!(active, vec![date(2026, 2, 1), date(2026, 2, 3)]);
        }

        #[test]
        fn test_catchup_fills_missed_days() {
            let manager = MaterializationManager::new(MaterializationConfig {
                enable_catchup: true,
                catchup_days: 3,
                ..Default::default()
            });
            let mut records = vec![series(&RecurrenceRule::daily(date(2026, 2, 1)))];

            let summary = manager.apply_today(&mut records, date(2026, 2, 10));
            assert_eq!(summary.instances_created, 4);
            let active: Vec<_> = records[0].instances.active_instances.iter().copied().collect();
            assert_eq!(active, vec![date(2026, 2, 7), date(2026, 2, 8), date(2026, 2, 9), date(2026, 2, 10)]);
        }

        #[test]
        fn test_strict_mode_reports_bad_rule_and_continues() {
            let manager = MaterializationManager::new(MaterializationConfig {
                decode_mode: DecodeMode::Strict,
                ..Default::default()
            });
            let broken = TaskRecord {
                title: Some("Broken".into()),
                recurrence: Some("FREQ=SOMETIMES".into()),
                ..Default::default()
            };
            let mut records = vec![broken, series(&RecurrenceRule::daily(date(2026, 2, 1)))];

            let summary = manager.apply_today(&mut records, date(2026, 2, 5));
            assert_eq!(summary.series_with_errors, 1);
            assert_eq!(summary.instances_created, 1);
            assert!(summary.errors[0].starts_with("Broken:"));
        }

        #[test]
        fn test_materialize_store_saves_only_changed_records() {
            let mut store = MemoryStore::new();
            store.insert(StoredTask::new("daily", series(&RecurrenceRule::daily(date(2026, 2, 1)))));
            store.insert(StoredTask::new(
                "mondays",
                series(&RecurrenceRule::weekly(date(2026, 2, 2), [Weekday::Mon])),
            ));
            let manager = MaterializationManager::with_defaults();

            let summary = manager.materialize_store(&mut store, date(2026, 2, 5)).unwrap();
            assert_eq!(summary.instances_created, 1);
            assert_eq!(store.save_count(), 1);
            assert!(store
                .get("daily")
                .unwrap()
                .record
                .instances
                .active_instances
                .contains(&date(2026, 2, 5)));

            manager.materialize_store(&mut store, date(2026, 2, 5)).unwrap();
            assert_eq!(store.save_count(), 1);
        }
    }

    mod save_failure_tests {
        use super::*;
        use crate::store::LoadReport;

        /// Refuses to save one key, and reports one unreadable record.
        struct RefusingStore {
            inner: MemoryStore,
            refused: &'static str,
        }

        impl TaskStore for RefusingStore {
            fn load_all(&self) -> Result<LoadReport, CoreError> {
                let mut report = self.inner.load_all()?;
                report
                    .failures
                    .push(("broken.md".to_string(), CoreError::Parse("bad date".into())));
                Ok(report)
            }

            fn save(&mut self, task: &StoredTask) -> Result<(), CoreError> {
                if task.key == self.refused {
                    return Err(CoreError::NotFound(task.key.clone()));
                }
                self.inner.save(task)
            }
        }

        #[test]
        fn test_failed_save_does_not_stop_the_pass() {
            let mut inner = MemoryStore::new();
            for key in ["a", "b", "c"] {
                inner.insert(StoredTask::new(key, series(&RecurrenceRule::daily(date(2026, 2, 1)))));
            }
            let mut store = RefusingStore { inner, refused: "a" };
            let today = date(2026, 2, 5);

            let summary = MaterializationManager::with_defaults()
                .materialize_store(&mut store, today)
                .unwrap();

            assert_eq!(summary.series_processed, 3);
            assert_eq!(summary.instances_created, 2);
            assert_eq!(summary.series_with_errors, 1);
            assert_eq!(summary.save_failures, 1);
            assert_eq!(summary.errors.len(), 1);
            assert!(summary.errors[0].starts_with("a:"));
            assert_eq!(summary.unreadable.len(), 1);
            assert!(summary.unreadable[0].starts_with("broken.md:"));

            for key in ["b", "c"] {
                let active = store.inner.get(key).unwrap().record.instances.active_instances;
                assert!(active.contains(&today), "{key}");
            }
            assert!(store.inner.get("a").unwrap().record.instances.active_instances.is_empty());
        }
    }

    mod day_clock_tests {
        use super::*;

        #[test]
        fn test_fires_on_start_and_rollover_only() {
            let mut clock = DayClock::new();
            assert!(clock.tick(date(2026, 2, 5)));
            assert!(!clock.tick(date(2026, 2, 5)));
            assert!(clock.tick(date(2026, 2, 6)));
            assert_eq!(clock.last_seen(), Some(date(2026, 2, 6)));
        }

        #[test]
        fn test_reset_makes_the_same_day_fire_again() {
            let mut clock = DayClock::new();
            assert!(clock.tick(date(2026, 2, 5)));
            clock.reset();
            assert_eq!(clock.last_seen(), None);
            assert!(clock.tick(date(2026, 2, 5)));
            assert!(!clock.tick(date(2026, 2, 5)));
        }
    }

    mod instance_state_tests {
        use super::*;

        fn active_series() -> TaskRecord {
            let mut record = series(&RecurrenceRule::daily(date(2026, 2, 1)));
            record.instances.active_instances.extend([date(2026, 2, 1), date(2026, 2, 2)]);
            record
        }

        #[test]
        fn test_complete_keys_off_original_date() {
            let mut record = active_series();
            record.instances.rescheduled_instances.insert(date(2026, 2, 1), date(2026, 2, 3));

            let result = complete_instance(&mut record, date(2026, 2, 1)).unwrap();
            assert_eq!(
                result,
                CompletionResult::Instance {
                    original: date(2026, 2, 1),
                    effective: date(2026, 2, 3)
                }
            );
            assert!(record.instances.complete_instances.contains(&date(2026, 2, 1)));
            assert!(!record.instances.complete_instances.contains(&date(2026, 2, 3)));
        }

        #[test]
        fn test_complete_and_skip_are_exclusive() {
            let mut record = active_series();
            skip_instance(&mut record, date(2026, 2, 2)).unwrap();
            complete_instance(&mut record, date(2026, 2, 2)).unwrap();
            assert!(!record.instances.skipped_instances.contains(&date(2026, 2, 2)));

            skip_instance(&mut record, date(2026, 2, 2)).unwrap();
            assert!(!record.instances.complete_instances.contains(&date(2026, 2, 2)));
        }

        #[test]
        fn test_unknown_occurrence_is_rejected() {
            let mut record = active_series();
            let result = skip_instance(&mut record, date(2026, 2, 9));
            assert!(matches!(result, Err(CoreError::NotAnOccurrence(d)) if d == date(2026, 2, 9)));

            let mut plain = TaskRecord::default();
            assert!(matches!(
                complete_instance(&mut plain, date(2026, 2, 1)),
                Err(CoreError::NotRecurring)
            ));
        }

        #[test]
        fn test_reopen_and_unskip() {
            let mut record = active_series();
            complete_instance(&mut record, date(2026, 2, 1)).unwrap();
            assert!(reopen_instance(&mut record, date(2026, 2, 1)).unwrap());
            assert!(!reopen_instance(&mut record, date(2026, 2, 1)).unwrap());

            skip_instance(&mut record, date(2026, 2, 2)).unwrap();
            assert!(unskip_instance(&mut record, date(2026, 2, 2)).unwrap());
            assert_eq!(unresolved_instances(&record), vec![date(2026, 2, 1), date(2026, 2, 2)]);
        }

        #[test]
        fn test_complete_picks_oldest_open_occurrence() {
            let mut record = active_series();
            complete(&mut record, None).unwrap();
            assert_eq!(unresolved_instances(&record), vec![date(2026, 2, 2)]);
            complete(&mut record, None).unwrap();
            assert!(matches!(complete(&mut record, None), Err(CoreError::NotFound(_))));
        }

        #[test]
        fn test_complete_plain_task_sets_status() {
            let mut record = TaskRecord::default();
            assert_eq!(complete(&mut record, None).unwrap(), CompletionResult::Task);
            assert!(record.is_done());
        }
    }
}
