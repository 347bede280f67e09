//! Daily completion series derived from item timestamps.
//!
//! Counts come from the item store, not from stored snapshots. An item is
//! counted on the local date of its last modification if it is `Done` at
//! query time, so reverting an item removes it from the day it was once
//! counted on.

use crate::clock::{local_day_end_ms, local_day_start_ms};
use crate::model::progress::DailyCompletionCount;
use crate::repo::item_repo::ItemRepository;
use crate::repo::RepoResult;
use crate::service::series::fill_daily;
use chrono::NaiveDate;
use log::info;
use std::time::Instant;

pub struct CompletionSeriesAggregator<I> {
    items: I,
}

impl<I: ItemRepository> CompletionSeriesAggregator<I> {
    pub fn new(items: I) -> Self {
        Self { items }
    }

    /// One count per date in `[start, end]`, ascending, zero where nothing
    /// was completed. An inverted range yields an empty series.
    pub fn get_daily_completions(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> RepoResult<Vec<DailyCompletionCount>> {
        if start > end {
            return Ok(Vec::new());
        }

        let started_at = Instant::now();
        let grouped = self
            .items
            .count_completed_grouped_by_date(local_day_start_ms(start), local_day_end_ms(end))?;
        let series = fill_daily(
            start,
            end,
            grouped.into_iter().map(|row| (row.date, row)),
            |date| DailyCompletionCount { date, completed: 0 },
        );

        info!(
            "event=completions_range module=completions status=ok start={start} end={end} days={} duration_ms={}",
            series.len(),
            started_at.elapsed().as_millis()
        );
        Ok(series)
    }
}
