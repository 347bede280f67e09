#![allow(dead_code)]

use chrono::NaiveDate;
use grindlog_core::{
    CompletionSeriesAggregator, Difficulty, FixedClock, HistoryReconstructor, Item, ItemService,
    ItemStatus, ProgressAggregator, SqliteItemRepository, SqliteProgressRepository,
    SqliteTopicRepository, Topic, TopicService,
};
use rusqlite::Connection;

pub type Aggregator<'c> =
    ProgressAggregator<SqliteItemRepository<'c>, SqliteProgressRepository<'c>, FixedClock>;

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Clock pinned to local noon so date math never straddles midnight.
pub fn noon(day: NaiveDate) -> FixedClock {
    FixedClock::at_local(day, 12, 0)
}

pub fn aggregator<'c>(conn: &'c Connection, clock: &FixedClock) -> Aggregator<'c> {
    ProgressAggregator::new(
        SqliteItemRepository::new(conn),
        SqliteProgressRepository::new(conn),
        clock.clone(),
    )
}

pub fn items<'c>(
    conn: &'c Connection,
    clock: &FixedClock,
) -> ItemService<SqliteItemRepository<'c>, SqliteProgressRepository<'c>, FixedClock> {
    ItemService::new(aggregator(conn, clock))
}

pub fn topics<'c>(
    conn: &'c Connection,
    clock: &FixedClock,
) -> TopicService<
    SqliteTopicRepository<'c>,
    SqliteItemRepository<'c>,
    SqliteProgressRepository<'c>,
    FixedClock,
> {
    TopicService::new(SqliteTopicRepository::new(conn), aggregator(conn, clock))
}

pub fn history<'c>(
    conn: &'c Connection,
    clock: &FixedClock,
) -> HistoryReconstructor<SqliteItemRepository<'c>, SqliteProgressRepository<'c>, FixedClock> {
    HistoryReconstructor::new(aggregator(conn, clock))
}

pub fn completions(conn: &Connection) -> CompletionSeriesAggregator<SqliteItemRepository<'_>> {
    CompletionSeriesAggregator::new(SqliteItemRepository::new(conn))
}

pub fn seed_topic(conn: &Connection, clock: &FixedClock, name: &str) -> Topic {
    topics(conn, clock).create_topic(name, None).unwrap()
}

/// Creates an item at the clock's current instant and moves it to `status`.
pub fn seed_item(
    conn: &Connection,
    clock: &FixedClock,
    topic: &Topic,
    number: i64,
    status: ItemStatus,
) -> Item {
    let service = items(conn, clock);
    let created = service
        .create_item(Item::new(
            topic.id,
            number,
            format!("problem {number}"),
            Difficulty::Medium,
        ))
        .unwrap();
    if status == ItemStatus::Todo {
        return created;
    }
    service.set_status(created.id, status).unwrap()
}
