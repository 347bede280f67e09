mod common;

use common::{aggregator, date, noon, seed_item, seed_topic};
use grindlog_core::db::open_db_in_memory;
use grindlog_core::{
    AggregateRepository, Clock, ItemRepository, ItemStatus, ProgressCounts, SnapshotRepository,
    SqliteItemRepository, SqliteProgressRepository,
};

#[test]
fn get_current_lazily_creates_zero_singleton() {
    let conn = open_db_in_memory().unwrap();
    let clock = noon(date(2024, 1, 2));
    let progress = SqliteProgressRepository::new(&conn);
    assert!(progress.get_current().unwrap().is_none());

    let current = aggregator(&conn, &clock).get_current().unwrap();
    assert_eq!(current.counts, ProgressCounts::default());
    assert_eq!(current.updated_at, clock.now_ms());
    assert_eq!(progress.get_current().unwrap(), Some(current));

    clock.advance_ms(10_000);
    let again = aggregator(&conn, &clock).get_current().unwrap();
    assert_eq!(again, current, "existing singleton must not be rewritten by reads");
}

#[test]
fn recompute_matches_full_scan_of_items() {
    let conn = open_db_in_memory().unwrap();
    let clock = noon(date(2024, 3, 10));
    let topic = seed_topic(&conn, &clock, "Mixed");
    let statuses = [
        ItemStatus::Done,
        ItemStatus::Todo,
        ItemStatus::InProgress,
        ItemStatus::Done,
        ItemStatus::Todo,
        ItemStatus::Todo,
    ];
    for (number, status) in (1..).zip(statuses) {
        seed_item(&conn, &clock, &topic, number, status);
    }

    let current = aggregator(&conn, &clock).recompute().unwrap();
    let all = SqliteItemRepository::new(&conn).list_all().unwrap();

    assert_eq!(current.counts.total as usize, all.len());
    assert!(current.counts.is_consistent());
    assert_eq!(current.counts.completed, 2);
    assert_eq!(current.counts.in_progress, 1);
    assert_eq!(current.counts.todo, 3);
}

#[test]
fn recompute_is_idempotent_within_a_day() {
    let conn = open_db_in_memory().unwrap();
    let clock = noon(date(2024, 3, 10));
    let topic = seed_topic(&conn, &clock, "Idempotence");
    seed_item(&conn, &clock, &topic, 1, ItemStatus::Done);
    seed_item(&conn, &clock, &topic, 2, ItemStatus::InProgress);

    let aggregator = aggregator(&conn, &clock);
    let progress = SqliteProgressRepository::new(&conn);

    let first = aggregator.recompute().unwrap();
    let first_snapshot = progress.find_by_date(clock.today()).unwrap().unwrap();
    let second = aggregator.recompute().unwrap();
    let second_snapshot = progress.find_by_date(clock.today()).unwrap().unwrap();

    assert_eq!(first, second);
    assert_eq!(first_snapshot, second_snapshot);
    assert_eq!(progress.find_range(clock.today(), clock.today()).unwrap().len(), 1);
}

#[test]
fn mutations_keep_aggregate_and_todays_snapshot_current() {
    let conn = open_db_in_memory().unwrap();
    let clock = noon(date(2024, 1, 2));
    let topic = seed_topic(&conn, &clock, "Scenario");
    let progress = SqliteProgressRepository::new(&conn);

    seed_item(&conn, &clock, &topic, 1, ItemStatus::Done);
    seed_item(&conn, &clock, &topic, 2, ItemStatus::Done);
    let c = seed_item(&conn, &clock, &topic, 3, ItemStatus::Todo);

    let expected = ProgressCounts {
        total: 3,
        completed: 2,
        in_progress: 0,
        todo: 1,
    };
    assert_eq!(progress.get_current().unwrap().unwrap().counts, expected);
    assert_eq!(
        progress.find_by_date(date(2024, 1, 2)).unwrap().unwrap().counts,
        expected
    );

    common::items(&conn, &clock).delete_item(c.id).unwrap();
    let after_delete = progress.get_current().unwrap().unwrap().counts;
    assert_eq!(after_delete.total, 2);
    assert_eq!(after_delete.todo, 0);
    assert!(after_delete.is_consistent());
}

#[test]
fn past_snapshots_are_frozen_once_the_day_rolls_over() {
    let conn = open_db_in_memory().unwrap();
    let clock = noon(date(2024, 1, 1));
    let topic = seed_topic(&conn, &clock, "Rollover");
    let progress = SqliteProgressRepository::new(&conn);

    let item = seed_item(&conn, &clock, &topic, 1, ItemStatus::Todo);
    clock.advance_days(1);
    common::items(&conn, &clock)
        .set_status(item.id, ItemStatus::Done)
        .unwrap();

    let day_one = progress.find_by_date(date(2024, 1, 1)).unwrap().unwrap();
    let day_two = progress.find_by_date(date(2024, 1, 2)).unwrap().unwrap();
    assert_eq!(day_one.counts.todo, 1);
    assert_eq!(day_one.counts.completed, 0);
    assert_eq!(day_two.counts.todo, 0);
    assert_eq!(day_two.counts.completed, 1);
}

#[test]
fn history_survives_item_deletion() {
    let conn = open_db_in_memory().unwrap();
    let clock = noon(date(2024, 2, 1));
    let topic = seed_topic(&conn, &clock, "Ephemeral");
    let item = seed_item(&conn, &clock, &topic, 1, ItemStatus::Done);

    clock.advance_days(1);
    common::items(&conn, &clock).delete_item(item.id).unwrap();

    let progress = SqliteProgressRepository::new(&conn);
    let yesterday = progress.find_by_date(date(2024, 2, 1)).unwrap().unwrap();
    assert_eq!(yesterday.counts.completed, 1);
    assert_eq!(progress.get_current().unwrap().unwrap().counts.total, 0);
}

#[test]
fn record_daily_overwrites_the_row_for_that_date() {
    let conn = open_db_in_memory().unwrap();
    let clock = noon(date(2024, 6, 1));
    let aggregator = aggregator(&conn, &clock);
    let progress = SqliteProgressRepository::new(&conn);

    let mut aggregate = aggregator.get_current().unwrap();
    aggregate.counts = ProgressCounts {
        total: 4,
        completed: 1,
        in_progress: 1,
        todo: 2,
    };
    aggregator.record_daily(date(2024, 5, 20), &aggregate).unwrap();
    aggregate.counts.completed = 2;
    aggregate.counts.todo = 1;
    aggregator.record_daily(date(2024, 5, 20), &aggregate).unwrap();

    let rows = progress.find_range(date(2024, 5, 20), date(2024, 5, 20)).unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].counts, aggregate.counts);
}
