//! Dense daily series helpers shared by history and completion queries.

use chrono::NaiveDate;
use std::collections::HashMap;

/// Every calendar date in `[start, end]`, ascending. Empty when `start > end`.
pub(crate) fn days_inclusive(start: NaiveDate, end: NaiveDate) -> impl Iterator<Item = NaiveDate> {
    start.iter_days().take_while(move |day| *day <= end)
}

/// Walks `[start, end]` emitting the known value for each date, or `fill(date)`
/// when the date is absent from `known`.
pub(crate) fn fill_daily<T>(
    start: NaiveDate,
    end: NaiveDate,
    known: impl IntoIterator<Item = (NaiveDate, T)>,
    mut fill: impl FnMut(NaiveDate) -> T,
) -> Vec<T> {
    let mut by_date: HashMap<NaiveDate, T> = known.into_iter().collect();
    days_inclusive(start, end)
        .map(|day| by_date.remove(&day).unwrap_or_else(|| fill(day)))
        .collect()
}
