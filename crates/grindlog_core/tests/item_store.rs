mod common;

use common::{date, noon, seed_item, seed_topic};
use grindlog_core::clock::{local_day_end_ms, local_day_start_ms, local_naive_to_ms};
use grindlog_core::db::open_db_in_memory;
use grindlog_core::{
    Clock, Difficulty, Item, ItemRepository, ItemStatus, ItemValidationError, RepoError,
    SqliteItemRepository, SqliteTopicRepository, TopicRepository,
};
use uuid::Uuid;

#[test]
fn create_and_get_roundtrip() {
    let conn = open_db_in_memory().unwrap();
    let clock = noon(date(2024, 5, 1));
    let topic = seed_topic(&conn, &clock, "Arrays");

    let mut item = Item::new(topic.id, 1, "Two Sum", Difficulty::Easy);
    item.link = Some("https://example.com/two-sum".to_string());
    item.is_important = true;
    item.reminder_at = Some(clock.now_ms() + 60_000);
    let created = common::items(&conn, &clock).create_item(item).unwrap();

    let repo = SqliteItemRepository::new(&conn);
    let loaded = repo.get_item(created.id).unwrap().unwrap();
    assert_eq!(loaded, created);
    assert_eq!(loaded.created_at, clock.now_ms());
    assert_eq!(loaded.updated_at, clock.now_ms());
    assert_eq!(loaded.status, ItemStatus::Todo);
}

#[test]
fn every_update_path_refreshes_last_modified() {
    let conn = open_db_in_memory().unwrap();
    let clock = noon(date(2024, 5, 1));
    let topic = seed_topic(&conn, &clock, "Graphs");
    let service = common::items(&conn, &clock);
    let created = seed_item(&conn, &clock, &topic, 200, ItemStatus::Todo);

    clock.advance_ms(1_000);
    let mut edited = created.clone();
    edited.title = "Number of Islands".to_string();
    let updated = service.update_item(&edited).unwrap();
    assert_eq!(updated.title, "Number of Islands");
    assert_eq!(updated.created_at, created.created_at);
    assert_eq!(updated.updated_at, created.updated_at + 1_000);

    clock.advance_ms(1_000);
    let done = service.set_status(created.id, ItemStatus::Done).unwrap();
    assert_eq!(done.status, ItemStatus::Done);
    assert_eq!(done.updated_at, created.updated_at + 2_000);

    clock.advance_ms(1_000);
    let flagged = service.toggle_important(created.id).unwrap();
    assert!(flagged.is_important);
    assert_eq!(flagged.updated_at, created.updated_at + 3_000);
}

#[test]
fn create_rejects_missing_topic_and_invalid_fields() {
    let conn = open_db_in_memory().unwrap();
    let clock = noon(date(2024, 5, 1));
    let service = common::items(&conn, &clock);

    let orphan = Item::new(Uuid::new_v4(), 1, "orphan", Difficulty::Hard);
    let orphan_topic = orphan.topic_id;
    let err = service.create_item(orphan).unwrap_err();
    assert!(matches!(err, RepoError::TopicNotFound(id) if id == orphan_topic));

    let topic = seed_topic(&conn, &clock, "Trees");
    let blank = Item::new(topic.id, 1, "  ", Difficulty::Easy);
    let err = service.create_item(blank).unwrap_err();
    assert!(matches!(
        err,
        RepoError::InvalidItem(ItemValidationError::BlankTitle)
    ));
    assert!(SqliteItemRepository::new(&conn).list_all().unwrap().is_empty());
}

#[test]
fn mutating_unknown_item_returns_not_found() {
    let conn = open_db_in_memory().unwrap();
    let clock = noon(date(2024, 5, 1));
    let service = common::items(&conn, &clock);
    let missing = Uuid::new_v4();

    assert!(matches!(
        service.set_status(missing, ItemStatus::Done).unwrap_err(),
        RepoError::ItemNotFound(id) if id == missing
    ));
    assert!(matches!(
        service.delete_item(missing).unwrap_err(),
        RepoError::ItemNotFound(id) if id == missing
    ));
    assert!(matches!(
        service.toggle_important(missing).unwrap_err(),
        RepoError::ItemNotFound(id) if id == missing
    ));
}

#[test]
fn deleting_topic_cascades_to_items() {
    let conn = open_db_in_memory().unwrap();
    let clock = noon(date(2024, 5, 1));
    let arrays = seed_topic(&conn, &clock, "arrays");
    let graphs = seed_topic(&conn, &clock, "Graphs");
    seed_item(&conn, &clock, &arrays, 1, ItemStatus::Done);
    seed_item(&conn, &clock, &arrays, 2, ItemStatus::Todo);
    seed_item(&conn, &clock, &graphs, 3, ItemStatus::InProgress);

    let summaries = SqliteTopicRepository::new(&conn)
        .list_topic_summaries()
        .unwrap();
    let counts: Vec<_> = summaries
        .iter()
        .map(|summary| (summary.topic.name.as_str(), summary.item_count))
        .collect();
    assert_eq!(counts, vec![("arrays", 2), ("Graphs", 1)]);

    common::topics(&conn, &clock).delete_topic(arrays.id).unwrap();

    let repo = SqliteItemRepository::new(&conn);
    assert_eq!(repo.count_by_topic(arrays.id).unwrap(), 0);
    assert_eq!(repo.list_all().unwrap().len(), 1);
}

#[test]
fn topic_notes_update_is_independent_of_other_fields() {
    let conn = open_db_in_memory().unwrap();
    let clock = noon(date(2024, 5, 1));
    let service = common::topics(&conn, &clock);
    let topic = service
        .create_topic("Dynamic Programming", Some("memo vs tab".to_string()))
        .unwrap();

    clock.advance_ms(5_000);
    let noted = service
        .update_notes(topic.id, Some("start from the recurrence"))
        .unwrap();
    assert_eq!(noted.notes.as_deref(), Some("start from the recurrence"));
    assert_eq!(noted.description.as_deref(), Some("memo vs tab"));
    assert_eq!(noted.updated_at, topic.updated_at + 5_000);

    assert!(matches!(
        service.update_notes(Uuid::new_v4(), None).unwrap_err(),
        RepoError::TopicNotFound(_)
    ));
}

#[test]
fn recent_completed_is_newest_first_and_limited() {
    let conn = open_db_in_memory().unwrap();
    let clock = noon(date(2024, 5, 1));
    let topic = seed_topic(&conn, &clock, "Heaps");
    let mut done_ids = Vec::new();
    for number in 1..=7 {
        clock.advance_ms(1_000);
        done_ids.push(seed_item(&conn, &clock, &topic, number, ItemStatus::Done).id);
    }
    seed_item(&conn, &clock, &topic, 99, ItemStatus::InProgress);

    let service = common::items(&conn, &clock);
    let recent = service.recent_completed(None).unwrap();
    let recent_ids: Vec<_> = recent.iter().map(|item| item.id).collect();
    let expected: Vec<_> = done_ids.iter().rev().take(5).copied().collect();
    assert_eq!(recent_ids, expected);

    assert_eq!(service.recent_completed(Some(2)).unwrap().len(), 2);
}

#[test]
fn upcoming_reminders_exclude_past_ones() {
    let conn = open_db_in_memory().unwrap();
    let clock = noon(date(2024, 5, 1));
    let topic = seed_topic(&conn, &clock, "Strings");
    let service = common::items(&conn, &clock);
    let now = clock.now_ms();

    for (number, offset) in [(1, -3_600_000), (2, 7_200_000), (3, 3_600_000)] {
        let mut item = Item::new(topic.id, number, format!("problem {number}"), Difficulty::Easy);
        item.reminder_at = Some(now + offset);
        service.create_item(item).unwrap();
    }
    service
        .create_item(Item::new(topic.id, 4, "no reminder", Difficulty::Easy))
        .unwrap();

    let all: Vec<_> = service
        .reminders()
        .unwrap()
        .iter()
        .map(|item| item.external_number)
        .collect();
    assert_eq!(all, vec![1, 3, 2]);

    let upcoming: Vec<_> = service
        .upcoming_reminders()
        .unwrap()
        .iter()
        .map(|item| item.external_number)
        .collect();
    assert_eq!(upcoming, vec![3, 2]);
}

#[test]
fn reminder_set_and_cleared_through_update() {
    let conn = open_db_in_memory().unwrap();
    let clock = noon(date(2024, 5, 1));
    let topic = seed_topic(&conn, &clock, "Graphs");
    let service = common::items(&conn, &clock);
    let mut item = seed_item(&conn, &clock, &topic, 1, ItemStatus::Todo);
    assert!(service.reminders().unwrap().is_empty());

    let remind_at = local_naive_to_ms(date(2024, 5, 3).and_hms_opt(18, 30, 0).unwrap());
    item.reminder_at = Some(remind_at);
    let updated = service.update_item(&item).unwrap();
    assert_eq!(updated.reminder_at, Some(remind_at));
    assert_eq!(service.upcoming_reminders().unwrap(), vec![updated.clone()]);

    item.reminder_at = None;
    service.update_item(&item).unwrap();
    assert!(service.reminders().unwrap().is_empty());
}

#[test]
fn grouped_completion_count_buckets_by_local_date() {
    let conn = open_db_in_memory().unwrap();
    let clock = noon(date(2024, 1, 1));
    let topic = seed_topic(&conn, &clock, "Sorting");

    seed_item(&conn, &clock, &topic, 1, ItemStatus::Done);
    clock.set_local(date(2024, 1, 3), 0, 5);
    seed_item(&conn, &clock, &topic, 2, ItemStatus::Done);
    seed_item(&conn, &clock, &topic, 3, ItemStatus::Done);
    seed_item(&conn, &clock, &topic, 4, ItemStatus::InProgress);
    clock.set_local(date(2024, 1, 3), 23, 59);
    seed_item(&conn, &clock, &topic, 5, ItemStatus::Done);

    let rows = SqliteItemRepository::new(&conn)
        .count_completed_grouped_by_date(
            local_day_start_ms(date(2024, 1, 1)),
            local_day_end_ms(date(2024, 1, 3)),
        )
        .unwrap();
    let rows: Vec<_> = rows.iter().map(|row| (row.date, row.completed)).collect();
    assert_eq!(rows, vec![(date(2024, 1, 1), 1), (date(2024, 1, 3), 3)]);
}
