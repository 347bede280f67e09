//! Item use-case service.
//!
//! # Responsibility
//! - Provide item CRUD entry points for core callers.
//! - Stamp creation/modification instants from the service clock.
//! - Trigger a progress recompute after every successful mutation.
//!
//! # Invariants
//! - A failed mutation never triggers a recompute.
//! - Reads never touch progress state.

use crate::clock::Clock;
use crate::model::item::{Item, ItemId, ItemStatus};
use crate::model::topic::TopicId;
use crate::repo::item_repo::{require_item, ItemRepository};
use crate::repo::progress_repo::{AggregateRepository, SnapshotRepository};
use crate::repo::RepoResult;
use crate::service::aggregator::ProgressAggregator;
use log::{info, warn};

/// Default number of entries returned by `recent_completed`.
pub const RECENT_COMPLETED_DEFAULT_LIMIT: u32 = 5;
const RECENT_COMPLETED_LIMIT_MAX: u32 = 100;

pub struct ItemService<I, P, C> {
    aggregator: ProgressAggregator<I, P, C>,
}

impl<I, P, C> ItemService<I, P, C>
where
    I: ItemRepository,
    P: AggregateRepository + SnapshotRepository,
    C: Clock,
{
    pub fn new(aggregator: ProgressAggregator<I, P, C>) -> Self {
        Self { aggregator }
    }

    /// Persists a new item stamped with the current instant.
    ///
    /// # Contract
    /// - `created_at` and `updated_at` on the input are overwritten.
    /// - Returns the stored item.
    pub fn create_item(&self, mut item: Item) -> RepoResult<Item> {
        let now_ms = self.aggregator.clock().now_ms();
        item.created_at = now_ms;
        item.updated_at = now_ms;
        self.repo().create_item(&item)?;
        self.after_mutation("create", item.id)?;
        Ok(item)
    }

    /// Replaces every editable field of an existing item.
    ///
    /// `created_at` is preserved from storage regardless of the input value.
    pub fn update_item(&self, item: &Item) -> RepoResult<Item> {
        let existing = require_item(self.repo(), item.id)?;
        let mut replacement = item.clone();
        replacement.created_at = existing.created_at;
        self.repo()
            .update_item(&replacement, self.aggregator.clock().now_ms())?;
        self.after_mutation("update", item.id)?;
        require_item(self.repo(), item.id)
    }

    pub fn set_status(&self, id: ItemId, status: ItemStatus) -> RepoResult<Item> {
        self.repo()
            .set_status(id, status, self.aggregator.clock().now_ms())?;
        self.after_mutation("set_status", id)?;
        require_item(self.repo(), id)
    }

    /// Flips the importance flag.
    pub fn toggle_important(&self, id: ItemId) -> RepoResult<Item> {
        let mut item = require_item(self.repo(), id)?;
        item.is_important = !item.is_important;
        self.repo()
            .update_item(&item, self.aggregator.clock().now_ms())?;
        self.after_mutation("toggle_important", id)?;
        require_item(self.repo(), id)
    }

    pub fn delete_item(&self, id: ItemId) -> RepoResult<()> {
        self.repo().delete_item(id)?;
        self.after_mutation("delete", id)?;
        Ok(())
    }

    pub fn get_item(&self, id: ItemId) -> RepoResult<Option<Item>> {
        self.repo().get_item(id)
    }

    pub fn list_items(&self) -> RepoResult<Vec<Item>> {
        self.repo().list_all()
    }

    pub fn list_by_topic(&self, topic_id: TopicId) -> RepoResult<Vec<Item>> {
        self.repo().list_by_topic(topic_id)
    }

    /// Most recently completed items. `None` uses the default limit; larger
    /// requests are clamped.
    pub fn recent_completed(&self, limit: Option<u32>) -> RepoResult<Vec<Item>> {
        let limit = limit
            .unwrap_or(RECENT_COMPLETED_DEFAULT_LIMIT)
            .min(RECENT_COMPLETED_LIMIT_MAX);
        self.repo().list_recent_completed(limit)
    }

    /// Every item with a reminder, earliest first.
    pub fn reminders(&self) -> RepoResult<Vec<Item>> {
        self.repo().list_with_reminders()
    }

    /// Reminders strictly in the future, earliest first.
    pub fn upcoming_reminders(&self) -> RepoResult<Vec<Item>> {
        self.repo()
            .list_reminders_after(self.aggregator.clock().now_ms())
    }

    fn repo(&self) -> &I {
        self.aggregator.items()
    }

    fn after_mutation(&self, op: &'static str, id: ItemId) -> RepoResult<()> {
        info!("event=item_mutation module=items status=ok op={op} item_id={id}");
        if let Err(err) = self.aggregator.recompute() {
            warn!("event=item_mutation module=items status=recompute_failed op={op} item_id={id} error={err}");
            return Err(err);
        }
        Ok(())
    }
}
