use cadence_core::classifier::{classify, AttentionBoard};
use cadence_core::error::CoreError;
use cadence_core::generator;
use cadence_core::models::{AttentionGroup, EditScope, RecurrenceRule};
use cadence_core::record::{TaskDocument, TaskRecord};
use cadence_core::reschedule::{remove_recurrence, reschedule};
use cadence_core::rrule::{self, DecodeMode};
use cadence_core::store::{MemoryStore, StoredTask, TaskStore};
use cadence_core::tracker::{complete, skip_instance, DayClock, MaterializationManager};
use chrono::{Duration, NaiveDate, Weekday};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Helper function to create a titled series template
fn create_test_series(title: &str, rule: &RecurrenceRule) -> TaskRecord {
    let mut record = TaskRecord {
        title: Some(title.to_string()),
        ..Default::default()
    };
    record.set_rule(rule);
    record
}

/// Helper function to create a store holding a few series and a plain task
fn setup_test_store() -> MemoryStore {
    let mut store = MemoryStore::new();
    store.insert(StoredTask::new(
        "water-plants",
        create_test_series("Water plants", &RecurrenceRule::daily(date(2026, 2, 1)).with_interval(3)),
    ));
    store.insert(StoredTask::new(
        "gym",
        create_test_series(
            "Gym",
            &RecurrenceRule::weekly(date(2026, 2, 2), [Weekday::Mon, Weekday::Wed, Weekday::Fri]),
        ),
    ));
    store.insert(StoredTask::new(
        "pay-rent",
        create_test_series(
            "Pay rent",
            &RecurrenceRule::monthly_nth_weekday(date(2026, 1, 1), -1, Weekday::Fri).unwrap(),
        ),
    ));
    store.insert(StoredTask::new(
        "dentist",
        TaskRecord {
            title: Some("Dentist".into()),
            scheduled: Some(date(2026, 2, 10)),
            ..Default::default()
        },
    ));
    store
}

/// Runs the daily pass for every day in `[from, to]`, as a long-running
/// shell would at each midnight.
fn run_days(store: &mut MemoryStore, from: NaiveDate, to: NaiveDate) {
    let manager = MaterializationManager::with_defaults();
    let mut clock = DayClock::new();
    let mut day = from;
    while day <= to {
        if clock.tick(day) {
            manager.materialize_store(store, day).unwrap();
        }
        // a second tick on the same day must not trigger another pass
        assert!(!clock.tick(day));
        day += Duration::days(1);
    }
}

fn active(store: &MemoryStore, key: &str) -> Vec<NaiveDate> {
    store
        .get(key)
        .unwrap()
        .record
        .instances
        .active_instances
        .into_iter()
        .collect()
}

#[test]
fn test_daily_materialization_matches_generator() {
    let mut store = setup_test_store();
    run_days(&mut store, date(2026, 2, 1), date(2026, 2, 10));

    assert_eq!(
        active(&store, "water-plants"),
        vec![date(2026, 2, 1), date(2026, 2, 4), date(2026, 2, 7), date(2026, 2, 10)]
    );
    assert_eq!(
        active(&store, "gym"),
        vec![
            date(2026, 2, 2),
            date(2026, 2, 4),
            date(2026, 2, 6),
            date(2026, 2, 9)
        ]
    );
    assert!(active(&store, "pay-rent").is_empty());
    assert!(active(&store, "dentist").is_empty());

    let rule = store
        .get("gym")
        .unwrap()
        .record
        .rule(DecodeMode::Strict, date(2026, 2, 10))
        .unwrap()
        .unwrap();
    assert_eq!(
        generator::generate(&rule, date(2026, 2, 1), date(2026, 2, 10)).dates,
        active(&store, "gym")
    );
}

#[test]
fn test_materialization_is_idempotent_per_day() {
    let mut store = setup_test_store();
    let manager = MaterializationManager::with_defaults();
    let today = date(2026, 2, 4);

    let first = manager.materialize_store(&mut store, today).unwrap();
    assert_eq!(first.instances_created, 2);
    let snapshot: Vec<_> = store.load_all().unwrap().tasks;
    let saves = store.save_count();

    let second = manager.materialize_store(&mut store, today).unwrap();
    assert_eq!(second.instances_created, 0);
    assert_eq!(store.save_count(), saves);
    assert_eq!(store.load_all().unwrap().tasks, snapshot);
}

#[test]
fn test_reschedule_then_complete_workflow() {
    let mut store = setup_test_store();
    run_days(&mut store, date(2026, 2, 1), date(2026, 2, 5));
    let today = date(2026, 2, 5);

    // Move Monday's gym session to Saturday
    let mut gym = store.get("gym").unwrap();
    let before = gym.record.clone();
    reschedule(&mut gym.record, EditScope::ThisOccurrence(date(2026, 2, 2)), date(2026, 2, 7)).unwrap();
    assert_eq!(gym.record.recurrence, before.recurrence);
    assert_eq!(gym.record.instances.active_instances, before.instances.active_instances);
    assert_eq!(classify(today, &gym.record, Some(date(2026, 2, 2))), AttentionGroup::Upcoming);

    // Moving it again replaces the first move
    reschedule(&mut gym.record, EditScope::ThisOccurrence(date(2026, 2, 2)), date(2026, 2, 8)).unwrap();
    assert_eq!(gym.record.instances.rescheduled_instances.len(), 1);
    assert_eq!(gym.record.instances.effective_date(date(2026, 2, 2)), date(2026, 2, 8));

    // Completing it is recorded under the original date
    complete(&mut gym.record, Some(date(2026, 2, 2))).unwrap();
    assert!(gym.record.instances.complete_instances.contains(&date(2026, 2, 2)));
    assert!(!gym.record.instances.complete_instances.contains(&date(2026, 2, 8)));
    assert_eq!(classify(today, &gym.record, Some(date(2026, 2, 2))), AttentionGroup::Wrapped);

    // Wednesday is skipped
    skip_instance(&mut gym.record, date(2026, 2, 4)).unwrap();
    assert_eq!(classify(today, &gym.record, Some(date(2026, 2, 4))), AttentionGroup::Wrapped);

    store.save(&gym).unwrap();
    let reloaded = store.get("gym").unwrap();
    assert_eq!(reloaded.record, gym.record);
}

#[test]
fn test_rescheduling_a_day_that_never_fired_is_rejected() {
    let mut store = setup_test_store();
    run_days(&mut store, date(2026, 2, 1), date(2026, 2, 5));

    let mut gym = store.get("gym").unwrap();
    let result = reschedule(&mut gym.record, EditScope::ThisOccurrence(date(2026, 2, 3)), date(2026, 2, 7));
    assert!(matches!(result, Err(CoreError::NotAnOccurrence(_))));
    assert!(gym.record.instances.rescheduled_instances.is_empty());

    let mut dentist = store.get("dentist").unwrap();
    let result = reschedule(&mut dentist.record, EditScope::ThisOccurrence(date(2026, 2, 3)), date(2026, 2, 7));
    assert!(matches!(result, Err(CoreError::NotRecurring)));
}

#[test]
fn test_attention_board_on_a_day() {
    let mut store = setup_test_store();
    run_days(&mut store, date(2026, 2, 1), date(2026, 2, 5));
    let today = date(2026, 2, 5);

    let tasks = store.load_all().unwrap().tasks;
    let board = AttentionBoard::build(today, tasks.iter().map(|t| &t.record));

    // Past: water plants 02-01, 02-04; gym 02-02, 02-04
    assert_eq!(board.group(AttentionGroup::Past).len(), 4);
    assert!(board.group(AttentionGroup::Now).is_empty());
    let upcoming: Vec<_> = board
        .group(AttentionGroup::Upcoming)
        .iter()
        .map(|row| row.record.title.as_deref().unwrap())
        .collect();
    assert_eq!(upcoming, vec!["Dentist"]);
    // pay-rent has fired nothing yet and its start date is behind us
    let wrapped = board.group(AttentionGroup::Wrapped);
    assert_eq!(wrapped.len(), 1);
    assert_eq!(wrapped[0].record.title.as_deref(), Some("Pay rent"));
}

#[test]
fn test_remove_recurrence_then_classify_as_plain_task() {
    let mut store = setup_test_store();
    run_days(&mut store, date(2026, 2, 1), date(2026, 2, 7));
    let today = date(2026, 2, 5);

    let mut plants = store.get("water-plants").unwrap();
    remove_recurrence(&mut plants.record, today);
    assert!(!plants.record.is_series_template());
    assert_eq!(
        plants.record.instances.active_instances.iter().copied().collect::<Vec<_>>(),
        vec![date(2026, 2, 1), date(2026, 2, 4)]
    );
    assert_eq!(classify(today, &plants.record, None), AttentionGroup::Now);

    store.save(&plants).unwrap();
    let manager = MaterializationManager::with_defaults();
    let summary = manager.materialize_store(&mut store, date(2026, 2, 10)).unwrap();
    assert_eq!(active(&store, "water-plants").len(), 2);
    assert_eq!(summary.series_processed, 2);
}

#[test]
fn test_document_round_trip_through_engine() {
    let text = "---
title: Review budget
recurrence: DTSTART:20260131;FREQ=MONTHLY;BYMONTHDAY=31
recurrence_anchor: scheduled
scheduled: 2026-01-31
area: finance
---
Check the shared sheet.
";
    let mut doc = TaskDocument::parse(text).unwrap();
    let mut records = vec![doc.record.clone()];
    let manager = MaterializationManager::with_defaults();
    for day in [date(2026, 1, 31), date(2026, 2, 28), date(2026, 3, 31)] {
        manager.apply_today(&mut records, day);
    }
    doc.record = records.remove(0);

    let rendered = doc.render().unwrap();
    let reparsed = TaskDocument::parse(&rendered).unwrap();
    assert_eq!(
        reparsed.record.instances.active_instances.iter().copied().collect::<Vec<_>>(),
        vec![date(2026, 1, 31), date(2026, 3, 31)]
    );
    assert!(reparsed.record.extra.contains_key("area"));
    assert_eq!(reparsed.body, "Check the shared sheet.\n");

    let rule = reparsed.record.rule(DecodeMode::Strict, date(2026, 4, 1)).unwrap().unwrap();
    assert_eq!(rrule::encode(&rule), "DTSTART:20260131;FREQ=MONTHLY;BYMONTHDAY=31");
}
