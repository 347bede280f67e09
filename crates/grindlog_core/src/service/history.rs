//! Daily progress history.
//!
//! # Responsibility
//! - Serve today's snapshot, computing it on first access of the day.
//! - Reconstruct a dense, ascending daily series for any date range.
//!
//! # Invariants
//! - `get_range(start, end)` returns exactly one entry per date in
//!   `[start, end]`; dates with no stored row get a zero-valued snapshot
//!   that is never persisted.
//! - `get_range` never writes. `get_today` may write (see its docs).

use crate::clock::{local_date_of_ms, Clock};
use crate::model::progress::DailySnapshot;
use crate::repo::item_repo::ItemRepository;
use crate::repo::progress_repo::{AggregateRepository, SnapshotRepository};
use crate::repo::{RepoError, RepoResult};
use crate::service::aggregator::ProgressAggregator;
use crate::service::series::fill_daily;
use chrono::{Days, NaiveDate};
use log::info;
use std::time::Instant;

/// Default window used by callers that ask for "recent" history.
pub const DEFAULT_RECENT_DAYS: u32 = 7;

pub struct HistoryReconstructor<I, P, C> {
    aggregator: ProgressAggregator<I, P, C>,
}

impl<I, P, C> HistoryReconstructor<I, P, C>
where
    I: ItemRepository,
    P: AggregateRepository + SnapshotRepository,
    C: Clock,
{
    pub fn new(aggregator: ProgressAggregator<I, P, C>) -> Self {
        Self { aggregator }
    }

    /// Returns today's snapshot.
    ///
    /// This is a command, not a pure query: when no row exists for today it
    /// runs a full recompute, persisting both the current aggregate and
    /// today's snapshot before returning.
    pub fn get_today(&self) -> RepoResult<DailySnapshot> {
        let now_ms = self.aggregator.clock().now_ms();
        let today = local_date_of_ms(now_ms);
        if let Some(snapshot) = self.aggregator.progress().find_by_date(today)? {
            return Ok(snapshot);
        }

        info!("event=snapshot_backfill_today module=history status=start date={today}");
        let (_, snapshot) = self.aggregator.recompute_at(now_ms)?;
        Ok(snapshot)
    }

    /// Returns one snapshot per date in `[start, end]`, ascending.
    ///
    /// An inverted range yields an empty series.
    pub fn get_range(&self, start: NaiveDate, end: NaiveDate) -> RepoResult<Vec<DailySnapshot>> {
        if start > end {
            return Ok(Vec::new());
        }

        let started_at = Instant::now();
        let stored = self.aggregator.progress().find_range(start, end)?;
        let stored_days = stored.len();
        let series = fill_daily(
            start,
            end,
            stored.into_iter().map(|snapshot| (snapshot.date, snapshot)),
            DailySnapshot::zero,
        );

        info!(
            "event=history_range module=history status=ok start={start} end={end} days={} stored_days={stored_days} duration_ms={}",
            series.len(),
            started_at.elapsed().as_millis()
        );
        Ok(series)
    }

    /// Returns the last `days` days ending today. `days == 0` is empty.
    ///
    /// # Errors
    /// - `RepoError::WindowOutOfRange` when the window would start before
    ///   the earliest representable date.
    pub fn get_recent(&self, days: u32) -> RepoResult<Vec<DailySnapshot>> {
        match recent_window(self.aggregator.clock().today(), days)? {
            Some((start, end)) => self.get_range(start, end),
            None => Ok(Vec::new()),
        }
    }
}

/// Inclusive `[start, today]` window spanning `days` calendar days.
///
/// `Ok(None)` for `days == 0`.
pub fn recent_window(today: NaiveDate, days: u32) -> RepoResult<Option<(NaiveDate, NaiveDate)>> {
    if days == 0 {
        return Ok(None);
    }
    today
        .checked_sub_days(Days::new(u64::from(days) - 1))
        .map(|start| Some((start, today)))
        .ok_or(RepoError::WindowOutOfRange { days })
}
