//! Aggregate and snapshot persistence.
//!
//! # Responsibility
//! - `AggregateRepository`: the only access path to the singleton
//!   `CurrentAggregate` row (`progress.id = 1`).
//! - `SnapshotRepository`: date-keyed `DailySnapshot` rows in
//!   `progress_history`.
//!
//! # Invariants
//! - Both tables are written with `INSERT .. ON CONFLICT`, so concurrent
//!   writers converge on the last full recompute instead of duplicating rows.
//! - The singleton row is never deleted.

use crate::model::progress::{
    CurrentAggregate, DailySnapshot, ProgressCounts, CURRENT_AGGREGATE_ID,
};
use crate::repo::item_repo::{day_to_db, parse_day};
use crate::repo::{RepoError, RepoResult};
use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension, Row};

pub trait AggregateRepository {
    /// Reads the singleton without creating it.
    fn get_current(&self) -> RepoResult<Option<CurrentAggregate>>;
    /// Reads the singleton, first inserting a zero row stamped `now_ms` if
    /// it does not exist yet. An existing row is left untouched.
    fn ensure_current(&self, now_ms: i64) -> RepoResult<CurrentAggregate>;
    /// Overwrites the singleton with `counts`, creating it when absent.
    fn upsert_current(&self, counts: &ProgressCounts, now_ms: i64) -> RepoResult<CurrentAggregate>;
}

pub trait SnapshotRepository {
    fn find_by_date(&self, date: NaiveDate) -> RepoResult<Option<DailySnapshot>>;
    /// Snapshots with `start <= date <= end`. Callers must not rely on order.
    fn find_range(&self, start: NaiveDate, end: NaiveDate) -> RepoResult<Vec<DailySnapshot>>;
    /// Inserts or overwrites the row for `snapshot.date`.
    fn upsert(&self, snapshot: &DailySnapshot) -> RepoResult<DailySnapshot>;
}

#[derive(Clone, Copy)]
pub struct SqliteProgressRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteProgressRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    fn read_current(&self) -> RepoResult<Option<CurrentAggregate>> {
        let aggregate = self
            .conn
            .query_row(
                "SELECT total, completed, in_progress, todo, updated_at
                 FROM progress
                 WHERE id = ?1;",
                [CURRENT_AGGREGATE_ID],
                |row| {
                    Ok(CurrentAggregate {
                        counts: counts_from_row(row)?,
                        updated_at: row.get("updated_at")?,
                    })
                },
            )
            .optional()?;
        Ok(aggregate)
    }
}

impl AggregateRepository for SqliteProgressRepository<'_> {
    fn get_current(&self) -> RepoResult<Option<CurrentAggregate>> {
        self.read_current()
    }

    fn ensure_current(&self, now_ms: i64) -> RepoResult<CurrentAggregate> {
        self.conn.execute(
            "INSERT INTO progress (id, total, completed, in_progress, todo, updated_at)
             VALUES (?1, 0, 0, 0, 0, ?2)
             ON CONFLICT(id) DO NOTHING;",
            params![CURRENT_AGGREGATE_ID, now_ms],
        )?;
        self.read_current()?.ok_or_else(|| {
            RepoError::InvalidData("progress singleton missing after guarded insert".to_string())
        })
    }

    fn upsert_current(&self, counts: &ProgressCounts, now_ms: i64) -> RepoResult<CurrentAggregate> {
        self.conn.execute(
            "INSERT INTO progress (id, total, completed, in_progress, todo, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)
             ON CONFLICT(id) DO UPDATE SET
                total = excluded.total,
                completed = excluded.completed,
                in_progress = excluded.in_progress,
                todo = excluded.todo,
                updated_at = excluded.updated_at;",
            params![
                CURRENT_AGGREGATE_ID,
                counts.total,
                counts.completed,
                counts.in_progress,
                counts.todo,
                now_ms,
            ],
        )?;
        Ok(CurrentAggregate {
            counts: *counts,
            updated_at: now_ms,
        })
    }
}

impl SnapshotRepository for SqliteProgressRepository<'_> {
    fn find_by_date(&self, date: NaiveDate) -> RepoResult<Option<DailySnapshot>> {
        let mut stmt = self.conn.prepare(
            "SELECT date, total, completed, in_progress, todo
             FROM progress_history
             WHERE date = ?1;",
        )?;
        let mut rows = stmt.query([day_to_db(date)])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_snapshot_row(row)?));
        }
        Ok(None)
    }

    fn find_range(&self, start: NaiveDate, end: NaiveDate) -> RepoResult<Vec<DailySnapshot>> {
        // ISO-8601 text sorts like the dates it encodes.
        let mut stmt = self.conn.prepare(
            "SELECT date, total, completed, in_progress, todo
             FROM progress_history
             WHERE date BETWEEN ?1 AND ?2;",
        )?;
        let mut rows = stmt.query([day_to_db(start), day_to_db(end)])?;
        let mut snapshots = Vec::new();
        while let Some(row) = rows.next()? {
            snapshots.push(parse_snapshot_row(row)?);
        }
        Ok(snapshots)
    }

    fn upsert(&self, snapshot: &DailySnapshot) -> RepoResult<DailySnapshot> {
        self.conn.execute(
            "INSERT INTO progress_history (date, total, completed, in_progress, todo)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT(date) DO UPDATE SET
                total = excluded.total,
                completed = excluded.completed,
                in_progress = excluded.in_progress,
                todo = excluded.todo;",
            params![
                day_to_db(snapshot.date),
                snapshot.counts.total,
                snapshot.counts.completed,
                snapshot.counts.in_progress,
                snapshot.counts.todo,
            ],
        )?;
        Ok(*snapshot)
    }
}

fn counts_from_row(row: &Row<'_>) -> rusqlite::Result<ProgressCounts> {
    Ok(ProgressCounts {
        total: row.get("total")?,
        completed: row.get("completed")?,
        in_progress: row.get("in_progress")?,
        todo: row.get("todo")?,
    })
}

fn parse_snapshot_row(row: &Row<'_>) -> RepoResult<DailySnapshot> {
    let day: String = row.get("date")?;
    Ok(DailySnapshot {
        date: parse_day(&day)?,
        counts: counts_from_row(row)?,
    })
}
