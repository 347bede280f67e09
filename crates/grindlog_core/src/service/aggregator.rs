//! Progress aggregation service.
//!
//! # Responsibility
//! - Recompute item counts from a full scan of the item store.
//! - Persist them as the singleton `CurrentAggregate` and as today's
//!   `DailySnapshot`.
//!
//! # Invariants
//! - A recompute never trusts previously stored counts; it always rescans.
//! - `total == completed + in_progress + todo` for every persisted aggregate.
//! - "Today" and `updated_at` come from one clock reading per recompute.
//!
//! Concurrent recomputes are not serialized. Each one writes a complete
//! tally through an `ON CONFLICT` upsert, so the stored rows always hold
//! some full recompute, though not necessarily the latest mutation's.

use crate::clock::{local_date_of_ms, Clock};
use crate::model::progress::{CurrentAggregate, DailySnapshot, ProgressCounts};
use crate::repo::item_repo::ItemRepository;
use crate::repo::progress_repo::{AggregateRepository, SnapshotRepository};
use crate::repo::RepoResult;
use chrono::NaiveDate;
use log::{debug, error, info};
use std::time::Instant;

/// Recomputes and persists the live aggregate.
#[derive(Clone)]
pub struct ProgressAggregator<I, P, C> {
    items: I,
    progress: P,
    clock: C,
}

impl<I, P, C> ProgressAggregator<I, P, C>
where
    I: ItemRepository,
    P: AggregateRepository + SnapshotRepository,
    C: Clock,
{
    pub fn new(items: I, progress: P, clock: C) -> Self {
        Self {
            items,
            progress,
            clock,
        }
    }

    /// Rescans every item, overwrites the singleton aggregate and upserts
    /// today's snapshot with the same counts.
    ///
    /// # Errors
    /// - Store failures propagate unchanged; nothing is retried.
    pub fn recompute(&self) -> RepoResult<CurrentAggregate> {
        self.recompute_at(self.clock.now_ms())
            .map(|(aggregate, _)| aggregate)
    }

    /// Returns the stored aggregate, persisting a zero-valued one first if
    /// this is the very first read.
    pub fn get_current(&self) -> RepoResult<CurrentAggregate> {
        self.progress.ensure_current(self.clock.now_ms())
    }

    /// Upserts the snapshot for `date` with the counts of `aggregate`.
    pub fn record_daily(
        &self,
        date: NaiveDate,
        aggregate: &CurrentAggregate,
    ) -> RepoResult<DailySnapshot> {
        let snapshot = self.progress.upsert(&DailySnapshot {
            date,
            counts: aggregate.counts,
        })?;
        debug!(
            "event=snapshot_upsert module=progress status=ok date={date} total={}",
            snapshot.counts.total
        );
        Ok(snapshot)
    }

    pub(crate) fn recompute_at(&self, now_ms: i64) -> RepoResult<(CurrentAggregate, DailySnapshot)> {
        let started_at = Instant::now();
        let today = local_date_of_ms(now_ms);

        let result = self.items.list_all().and_then(|items| {
            let counts = ProgressCounts::tally(&items);
            let aggregate = self.progress.upsert_current(&counts, now_ms)?;
            let snapshot = self.record_daily(today, &aggregate)?;
            Ok((aggregate, snapshot))
        });

        match &result {
            Ok((aggregate, _)) => info!(
                "event=progress_recompute module=progress status=ok date={today} duration_ms={} total={} completed={} in_progress={} todo={}",
                started_at.elapsed().as_millis(),
                aggregate.counts.total,
                aggregate.counts.completed,
                aggregate.counts.in_progress,
                aggregate.counts.todo
            ),
            Err(err) => error!(
                "event=progress_recompute module=progress status=error date={today} duration_ms={} error={err}",
                started_at.elapsed().as_millis()
            ),
        }
        result
    }

    pub(crate) fn items(&self) -> &I {
        &self.items
    }

    pub(crate) fn progress(&self) -> &P {
        &self.progress
    }

    pub(crate) fn clock(&self) -> &C {
        &self.clock
    }
}
