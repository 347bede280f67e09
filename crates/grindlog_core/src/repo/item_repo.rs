//! Item repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide CRUD over the `items` table.
//! - Provide the full-scan and grouped-count reads the progress engine
//!   consumes (`list_all`, `count_by_topic`, `count_completed_grouped_by_date`).
//!
//! # Invariants
//! - Every update path writes `updated_at`; callers cannot skip the refresh.
//! - An item always references an existing topic.
//! - Grouping by date uses the local calendar date of `updated_at`.

use crate::model::item::{Difficulty, Item, ItemId, ItemStatus};
use crate::model::progress::DailyCompletionCount;
use crate::model::topic::TopicId;
use crate::repo::{bool_to_int, int_to_bool, parse_uuid, RepoError, RepoResult};
use chrono::NaiveDate;
use rusqlite::{params, Connection, Row};

const ITEM_SELECT_SQL: &str = "SELECT
    uuid,
    topic_uuid,
    external_number,
    title,
    link,
    difficulty,
    status,
    is_important,
    reminder_at,
    created_at,
    updated_at
FROM items";

/// Repository interface for item persistence and progress-facing reads.
pub trait ItemRepository {
    fn create_item(&self, item: &Item) -> RepoResult<ItemId>;
    /// Replaces every editable field and stamps `updated_at = touched_at`.
    fn update_item(&self, item: &Item, touched_at: i64) -> RepoResult<()>;
    /// Changes only the status, stamping `updated_at = touched_at`.
    fn set_status(&self, id: ItemId, status: ItemStatus, touched_at: i64) -> RepoResult<()>;
    fn get_item(&self, id: ItemId) -> RepoResult<Option<Item>>;
    /// Full scan, oldest first.
    fn list_all(&self) -> RepoResult<Vec<Item>>;
    fn list_by_topic(&self, topic_id: TopicId) -> RepoResult<Vec<Item>>;
    fn count_by_topic(&self, topic_id: TopicId) -> RepoResult<u32>;
    fn delete_item(&self, id: ItemId) -> RepoResult<()>;
    /// `Done` items, most recently modified first.
    fn list_recent_completed(&self, limit: u32) -> RepoResult<Vec<Item>>;
    /// Items with a reminder set, earliest reminder first.
    fn list_with_reminders(&self) -> RepoResult<Vec<Item>>;
    /// Items whose reminder is strictly after `after_ms`, earliest first.
    fn list_reminders_after(&self, after_ms: i64) -> RepoResult<Vec<Item>>;
    /// Counts `Done` items per local date of `updated_at` within
    /// `[start_ms, end_ms]`, ascending by date. Dates without items are absent.
    fn count_completed_grouped_by_date(
        &self,
        start_ms: i64,
        end_ms: i64,
    ) -> RepoResult<Vec<DailyCompletionCount>>;
}

/// SQLite-backed item repository.
#[derive(Clone, Copy)]
pub struct SqliteItemRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteItemRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    fn topic_exists(&self, topic_id: TopicId) -> RepoResult<bool> {
        let exists: i64 = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM topics WHERE uuid = ?1);",
            [topic_id.to_string()],
            |row| row.get(0),
        )?;
        Ok(exists == 1)
    }

    fn query_items(&self, sql: &str, params: impl rusqlite::Params) -> RepoResult<Vec<Item>> {
        let mut stmt = self.conn.prepare(sql)?;
        let mut rows = stmt.query(params)?;
        let mut items = Vec::new();
        while let Some(row) = rows.next()? {
            items.push(parse_item_row(row)?);
        }
        Ok(items)
    }
}

impl ItemRepository for SqliteItemRepository<'_> {
    fn create_item(&self, item: &Item) -> RepoResult<ItemId> {
        item.validate()?;
        if !self.topic_exists(item.topic_id)? {
            return Err(RepoError::TopicNotFound(item.topic_id));
        }

        self.conn.execute(
            "INSERT INTO items (
                uuid,
                topic_uuid,
                external_number,
                title,
                link,
                difficulty,
                status,
                is_important,
                reminder_at,
                created_at,
                updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11);",
            params![
                item.id.to_string(),
                item.topic_id.to_string(),
                item.external_number,
                item.title.as_str(),
                item.link.as_deref(),
                difficulty_to_db(item.difficulty),
                status_to_db(item.status),
                bool_to_int(item.is_important),
                item.reminder_at,
                item.created_at,
                item.updated_at,
            ],
        )?;

        Ok(item.id)
    }

    fn update_item(&self, item: &Item, touched_at: i64) -> RepoResult<()> {
        let mut stamped = item.clone();
        stamped.updated_at = touched_at;
        stamped.validate()?;
        if !self.topic_exists(stamped.topic_id)? {
            return Err(RepoError::TopicNotFound(stamped.topic_id));
        }

        let changed = self.conn.execute(
            "UPDATE items
             SET
                topic_uuid = ?1,
                external_number = ?2,
                title = ?3,
                link = ?4,
                difficulty = ?5,
                status = ?6,
                is_important = ?7,
                reminder_at = ?8,
                updated_at = ?9
             WHERE uuid = ?10;",
            params![
                stamped.topic_id.to_string(),
                stamped.external_number,
                stamped.title.as_str(),
                stamped.link.as_deref(),
                difficulty_to_db(stamped.difficulty),
                status_to_db(stamped.status),
                bool_to_int(stamped.is_important),
                stamped.reminder_at,
                touched_at,
                stamped.id.to_string(),
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::ItemNotFound(stamped.id));
        }
        Ok(())
    }

    fn set_status(&self, id: ItemId, status: ItemStatus, touched_at: i64) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE items
             SET status = ?1, updated_at = ?2
             WHERE uuid = ?3;",
            params![status_to_db(status), touched_at, id.to_string()],
        )?;

        if changed == 0 {
            return Err(RepoError::ItemNotFound(id));
        }
        Ok(())
    }

    fn get_item(&self, id: ItemId) -> RepoResult<Option<Item>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{ITEM_SELECT_SQL} WHERE uuid = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_item_row(row)?));
        }
        Ok(None)
    }

    fn list_all(&self) -> RepoResult<Vec<Item>> {
        self.query_items(
            &format!("{ITEM_SELECT_SQL} ORDER BY created_at ASC, uuid ASC;"),
            [],
        )
    }

    fn list_by_topic(&self, topic_id: TopicId) -> RepoResult<Vec<Item>> {
        self.query_items(
            &format!(
                "{ITEM_SELECT_SQL} WHERE topic_uuid = ?1 ORDER BY created_at ASC, uuid ASC;"
            ),
            [topic_id.to_string()],
        )
    }

    fn count_by_topic(&self, topic_id: TopicId) -> RepoResult<u32> {
        let count = self.conn.query_row(
            "SELECT COUNT(*) FROM items WHERE topic_uuid = ?1;",
            [topic_id.to_string()],
            |row| row.get::<_, u32>(0),
        )?;
        Ok(count)
    }

    fn delete_item(&self, id: ItemId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM items WHERE uuid = ?1;", [id.to_string()])?;
        if changed == 0 {
            return Err(RepoError::ItemNotFound(id));
        }
        Ok(())
    }

    fn list_recent_completed(&self, limit: u32) -> RepoResult<Vec<Item>> {
        self.query_items(
            &format!(
                "{ITEM_SELECT_SQL}
                 WHERE status = 'done'
                 ORDER BY updated_at DESC, uuid ASC
                 LIMIT ?1;"
            ),
            [i64::from(limit)],
        )
    }

    fn list_with_reminders(&self) -> RepoResult<Vec<Item>> {
        self.query_items(
            &format!(
                "{ITEM_SELECT_SQL}
                 WHERE reminder_at IS NOT NULL
                 ORDER BY reminder_at ASC, uuid ASC;"
            ),
            [],
        )
    }

    fn list_reminders_after(&self, after_ms: i64) -> RepoResult<Vec<Item>> {
        self.query_items(
            &format!(
                "{ITEM_SELECT_SQL}
                 WHERE reminder_at IS NOT NULL
                   AND reminder_at > ?1
                 ORDER BY reminder_at ASC, uuid ASC;"
            ),
            [after_ms],
        )
    }

    fn count_completed_grouped_by_date(
        &self,
        start_ms: i64,
        end_ms: i64,
    ) -> RepoResult<Vec<DailyCompletionCount>> {
        let mut stmt = self.conn.prepare(
            "SELECT
                date(updated_at / 1000, 'unixepoch', 'localtime') AS day,
                COUNT(*) AS completed
             FROM items
             WHERE status = 'done'
               AND updated_at BETWEEN ?1 AND ?2
             GROUP BY day
             ORDER BY day ASC;",
        )?;
        let mut rows = stmt.query(params![start_ms, end_ms])?;
        let mut counts = Vec::new();
        while let Some(row) = rows.next()? {
            let day: String = row.get("day")?;
            counts.push(DailyCompletionCount {
                date: parse_day(&day)?,
                completed: row.get("completed")?,
            });
        }
        Ok(counts)
    }
}

/// Lookup used by services that need an item or a typed not-found error.
pub(crate) fn require_item<R: ItemRepository + ?Sized>(repo: &R, id: ItemId) -> RepoResult<Item> {
    repo.get_item(id)?.ok_or(RepoError::ItemNotFound(id))
}

fn parse_item_row(row: &Row<'_>) -> RepoResult<Item> {
    let uuid_text: String = row.get("uuid")?;
    let topic_text: String = row.get("topic_uuid")?;

    let difficulty_text: String = row.get("difficulty")?;
    let difficulty = parse_difficulty(&difficulty_text).ok_or_else(|| {
        RepoError::InvalidData(format!(
            "invalid difficulty `{difficulty_text}` in items.difficulty"
        ))
    })?;

    let status_text: String = row.get("status")?;
    let status = parse_status(&status_text).ok_or_else(|| {
        RepoError::InvalidData(format!("invalid status `{status_text}` in items.status"))
    })?;

    let item = Item {
        id: parse_uuid(&uuid_text, "items.uuid")?,
        topic_id: parse_uuid(&topic_text, "items.topic_uuid")?,
        external_number: row.get("external_number")?,
        title: row.get("title")?,
        link: row.get("link")?,
        difficulty,
        status,
        is_important: int_to_bool(row.get("is_important")?, "items.is_important")?,
        reminder_at: row.get("reminder_at")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    };
    item.validate()?;
    Ok(item)
}

pub(crate) fn parse_day(value: &str) -> RepoResult<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|_| RepoError::InvalidData(format!("invalid calendar date `{value}`")))
}

pub(crate) fn day_to_db(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

fn difficulty_to_db(difficulty: Difficulty) -> &'static str {
    match difficulty {
        Difficulty::Easy => "easy",
        Difficulty::Medium => "medium",
        Difficulty::Hard => "hard",
    }
}

fn parse_difficulty(value: &str) -> Option<Difficulty> {
    match value {
        "easy" => Some(Difficulty::Easy),
        "medium" => Some(Difficulty::Medium),
        "hard" => Some(Difficulty::Hard),
        _ => None,
    }
}

fn status_to_db(status: ItemStatus) -> &'static str {
    match status {
        ItemStatus::Todo => "todo",
        ItemStatus::InProgress => "in_progress",
        ItemStatus::Done => "done",
    }
}

fn parse_status(value: &str) -> Option<ItemStatus> {
    match value {
        "todo" => Some(ItemStatus::Todo),
        "in_progress" => Some(ItemStatus::InProgress),
        "done" => Some(ItemStatus::Done),
        _ => None,
    }
}
