//! Progress facts derived from the item set.
//!
//! # Responsibility
//! - `ProgressCounts`: one full-scan tally of items by status.
//! - `CurrentAggregate`: the singleton "right now" record.
//! - `DailySnapshot`: a date-keyed copy of the counts for one calendar day.
//! - `DailyCompletionCount`: a derived, never-persisted completions point.
//!
//! # Invariants
//! - `total == completed + in_progress + todo` for every tally produced by
//!   `ProgressCounts::tally`.
//! - At most one `DailySnapshot` exists per date.

use crate::model::item::{Item, ItemStatus};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Fixed identity of the `CurrentAggregate` row.
pub const CURRENT_AGGREGATE_ID: i64 = 1;

/// Item counts grouped by status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressCounts {
    pub total: u32,
    pub completed: u32,
    pub in_progress: u32,
    pub todo: u32,
}

impl ProgressCounts {
    /// Counts every item by status. `total` is the number of items seen.
    pub fn tally<'a>(items: impl IntoIterator<Item = &'a Item>) -> Self {
        items
            .into_iter()
            .fold(Self::default(), |mut counts, item| {
                counts.total += 1;
                match item.status {
                    ItemStatus::Done => counts.completed += 1,
                    ItemStatus::InProgress => counts.in_progress += 1,
                    ItemStatus::Todo => counts.todo += 1,
                }
                counts
            })
    }

    pub fn is_consistent(&self) -> bool {
        u64::from(self.total)
            == u64::from(self.completed) + u64::from(self.in_progress) + u64::from(self.todo)
    }

    pub fn count_for(&self, status: ItemStatus) -> u32 {
        match status {
            ItemStatus::Todo => self.todo,
            ItemStatus::InProgress => self.in_progress,
            ItemStatus::Done => self.completed,
        }
    }
}

/// Singleton live aggregate over all items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentAggregate {
    #[serde(flatten)]
    pub counts: ProgressCounts,
    /// Epoch milliseconds of the last write to this record.
    pub updated_at: i64,
}

/// Counts frozen for one calendar day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailySnapshot {
    pub date: NaiveDate,
    #[serde(flatten)]
    pub counts: ProgressCounts,
}

impl DailySnapshot {
    /// Zero-valued snapshot, used for gap-filling and first-time rows.
    pub fn zero(date: NaiveDate) -> Self {
        Self {
            date,
            counts: ProgressCounts::default(),
        }
    }

    pub fn is_zero(&self) -> bool {
        self.counts == ProgressCounts::default()
    }
}

/// Number of items currently `Done` whose last modification fell on `date`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyCompletionCount {
    pub date: NaiveDate,
    pub completed: u32,
}

#[cfg(test)]
mod tests {
    use super::ProgressCounts;
    use crate::model::item::{Difficulty, Item, ItemStatus};
    use uuid::Uuid;

    fn item_with(status: ItemStatus) -> Item {
        let mut item = Item::new(Uuid::new_v4(), 7, "item", Difficulty::Medium);
        item.status = status;
        item
    }

    #[test]
    fn tally_of_nothing_is_zero() {
        let items: Vec<Item> = Vec::new();
        let counts = ProgressCounts::tally(&items);
        assert_eq!(counts, ProgressCounts::default());
        assert!(counts.is_consistent());
    }

    #[test]
    fn tally_counts_each_status() {
        let items = vec![
            item_with(ItemStatus::Done),
            item_with(ItemStatus::Done),
            item_with(ItemStatus::InProgress),
            item_with(ItemStatus::Todo),
            item_with(ItemStatus::Todo),
            item_with(ItemStatus::Todo),
        ];
        let counts = ProgressCounts::tally(&items);
        assert_eq!(counts.total, 6);
        assert_eq!(counts.count_for(ItemStatus::Done), 2);
        assert_eq!(counts.count_for(ItemStatus::InProgress), 1);
        assert_eq!(counts.count_for(ItemStatus::Todo), 3);
        assert!(counts.is_consistent());
    }
}
