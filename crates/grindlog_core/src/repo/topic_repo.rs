//! Topic repository contracts and SQLite implementation.
//!
//! # Invariants
//! - Deleting a topic deletes its items (`ON DELETE CASCADE`).
//! - Summaries count items with one grouped query, not one query per topic.

use crate::model::topic::{Topic, TopicId, TopicSummary};
use crate::repo::{parse_uuid, RepoError, RepoResult};
use rusqlite::{params, Connection, Row};

const TOPIC_SELECT_SQL: &str = "SELECT
    uuid,
    name,
    description,
    notes,
    created_at,
    updated_at
FROM topics";

pub trait TopicRepository {
    fn create_topic(&self, topic: &Topic) -> RepoResult<TopicId>;
    /// Replaces name, description and notes; stamps `updated_at`.
    fn update_topic(&self, topic: &Topic, touched_at: i64) -> RepoResult<()>;
    fn update_notes(&self, id: TopicId, notes: Option<&str>, touched_at: i64) -> RepoResult<()>;
    fn get_topic(&self, id: TopicId) -> RepoResult<Option<Topic>>;
    /// All topics ordered by name (case-insensitive).
    fn list_topics(&self) -> RepoResult<Vec<Topic>>;
    /// All topics with their item counts, ordered like `list_topics`.
    fn list_topic_summaries(&self) -> RepoResult<Vec<TopicSummary>>;
    fn delete_topic(&self, id: TopicId) -> RepoResult<()>;
}

#[derive(Clone, Copy)]
pub struct SqliteTopicRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteTopicRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl TopicRepository for SqliteTopicRepository<'_> {
    fn create_topic(&self, topic: &Topic) -> RepoResult<TopicId> {
        topic.validate()?;
        self.conn.execute(
            "INSERT INTO topics (uuid, name, description, notes, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6);",
            params![
                topic.id.to_string(),
                topic.name.trim(),
                topic.description.as_deref(),
                topic.notes.as_deref(),
                topic.created_at,
                topic.updated_at,
            ],
        )?;
        Ok(topic.id)
    }

    fn update_topic(&self, topic: &Topic, touched_at: i64) -> RepoResult<()> {
        topic.validate()?;
        let changed = self.conn.execute(
            "UPDATE topics
             SET name = ?1, description = ?2, notes = ?3, updated_at = ?4
             WHERE uuid = ?5;",
            params![
                topic.name.trim(),
                topic.description.as_deref(),
                topic.notes.as_deref(),
                touched_at,
                topic.id.to_string(),
            ],
        )?;
        if changed == 0 {
            return Err(RepoError::TopicNotFound(topic.id));
        }
        Ok(())
    }

    fn update_notes(&self, id: TopicId, notes: Option<&str>, touched_at: i64) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE topics SET notes = ?1, updated_at = ?2 WHERE uuid = ?3;",
            params![notes, touched_at, id.to_string()],
        )?;
        if changed == 0 {
            return Err(RepoError::TopicNotFound(id));
        }
        Ok(())
    }

    fn get_topic(&self, id: TopicId) -> RepoResult<Option<Topic>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{TOPIC_SELECT_SQL} WHERE uuid = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_topic_row(row)?));
        }
        Ok(None)
    }

    fn list_topics(&self) -> RepoResult<Vec<Topic>> {
        let mut stmt = self.conn.prepare(&format!(
            "{TOPIC_SELECT_SQL} ORDER BY name COLLATE NOCASE ASC, uuid ASC;"
        ))?;
        let mut rows = stmt.query([])?;
        let mut topics = Vec::new();
        while let Some(row) = rows.next()? {
            topics.push(parse_topic_row(row)?);
        }
        Ok(topics)
    }

    fn list_topic_summaries(&self) -> RepoResult<Vec<TopicSummary>> {
        let mut stmt = self.conn.prepare(
            "SELECT
                t.uuid,
                t.name,
                t.description,
                t.notes,
                t.created_at,
                t.updated_at,
                COUNT(i.uuid) AS item_count
             FROM topics t
             LEFT JOIN items i ON i.topic_uuid = t.uuid
             GROUP BY t.uuid
             ORDER BY t.name COLLATE NOCASE ASC, t.uuid ASC;",
        )?;
        let mut rows = stmt.query([])?;
        let mut summaries = Vec::new();
        while let Some(row) = rows.next()? {
            summaries.push(TopicSummary {
                topic: parse_topic_row(row)?,
                item_count: row.get("item_count")?,
            });
        }
        Ok(summaries)
    }

    fn delete_topic(&self, id: TopicId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM topics WHERE uuid = ?1;", [id.to_string()])?;
        if changed == 0 {
            return Err(RepoError::TopicNotFound(id));
        }
        Ok(())
    }
}

fn parse_topic_row(row: &Row<'_>) -> RepoResult<Topic> {
    let uuid_text: String = row.get("uuid")?;
    let topic = Topic {
        id: parse_uuid(&uuid_text, "topics.uuid")?,
        name: row.get("name")?,
        description: row.get("description")?,
        notes: row.get("notes")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    };
    topic.validate()?;
    Ok(topic)
}
