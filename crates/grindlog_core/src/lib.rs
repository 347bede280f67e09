//! Core logic for grindlog, a practice-item progress tracker.
//!
//! Owns the item/topic store, the live progress aggregate, the date-keyed
//! snapshot history and the derived daily completion series.

pub mod clock;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use clock::{Clock, FixedClock, SystemClock};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::item::{Difficulty, Item, ItemId, ItemStatus, ItemValidationError};
pub use model::progress::{CurrentAggregate, DailyCompletionCount, DailySnapshot, ProgressCounts};
pub use model::topic::{Topic, TopicId, TopicSummary, TopicValidationError};
pub use repo::item_repo::{ItemRepository, SqliteItemRepository};
pub use repo::progress_repo::{AggregateRepository, SnapshotRepository, SqliteProgressRepository};
pub use repo::topic_repo::{SqliteTopicRepository, TopicRepository};
pub use repo::{RepoError, RepoResult};
pub use service::aggregator::ProgressAggregator;
pub use service::completions::CompletionSeriesAggregator;
pub use service::history::{recent_window, HistoryReconstructor, DEFAULT_RECENT_DAYS};
pub use service::item_service::{ItemService, RECENT_COMPLETED_DEFAULT_LIMIT};
pub use service::topic_service::TopicService;

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
