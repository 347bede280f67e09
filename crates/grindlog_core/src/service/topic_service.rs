//! Topic use-case service.
//!
//! Deleting a topic cascades to its items, so it is the one topic
//! mutation that triggers a progress recompute.

use crate::clock::Clock;
use crate::model::topic::{Topic, TopicId, TopicSummary};
use crate::repo::item_repo::ItemRepository;
use crate::repo::progress_repo::{AggregateRepository, SnapshotRepository};
use crate::repo::topic_repo::TopicRepository;
use crate::repo::{RepoError, RepoResult};
use crate::service::aggregator::ProgressAggregator;
use log::info;

pub struct TopicService<T, I, P, C> {
    topics: T,
    aggregator: ProgressAggregator<I, P, C>,
}

impl<T, I, P, C> TopicService<T, I, P, C>
where
    T: TopicRepository,
    I: ItemRepository,
    P: AggregateRepository + SnapshotRepository,
    C: Clock,
{
    pub fn new(topics: T, aggregator: ProgressAggregator<I, P, C>) -> Self {
        Self { topics, aggregator }
    }

    pub fn create_topic(
        &self,
        name: impl Into<String>,
        description: Option<String>,
    ) -> RepoResult<Topic> {
        let now_ms = self.aggregator.clock().now_ms();
        let mut topic = Topic::new(name);
        topic.description = description;
        topic.created_at = now_ms;
        topic.updated_at = now_ms;
        self.topics.create_topic(&topic)?;
        info!("event=topic_mutation module=topics status=ok op=create topic_id={}", topic.id);
        Ok(topic)
    }

    /// Replaces name, description and notes of an existing topic.
    pub fn update_topic(&self, topic: &Topic) -> RepoResult<Topic> {
        self.topics
            .update_topic(topic, self.aggregator.clock().now_ms())?;
        self.require_topic(topic.id)
    }

    pub fn update_notes(&self, id: TopicId, notes: Option<&str>) -> RepoResult<Topic> {
        self.topics
            .update_notes(id, notes, self.aggregator.clock().now_ms())?;
        self.require_topic(id)
    }

    pub fn get_topic(&self, id: TopicId) -> RepoResult<Option<Topic>> {
        self.topics.get_topic(id)
    }

    pub fn list_topics(&self) -> RepoResult<Vec<Topic>> {
        self.topics.list_topics()
    }

    /// Topics with their current item counts.
    pub fn list_topic_summaries(&self) -> RepoResult<Vec<TopicSummary>> {
        self.topics.list_topic_summaries()
    }

    /// Deletes the topic and, through the cascade, its items.
    pub fn delete_topic(&self, id: TopicId) -> RepoResult<()> {
        let removed_items = self.aggregator.items().count_by_topic(id)?;
        self.topics.delete_topic(id)?;
        info!(
            "event=topic_mutation module=topics status=ok op=delete topic_id={id} removed_items={removed_items}"
        );
        self.aggregator.recompute()?;
        Ok(())
    }

    fn require_topic(&self, id: TopicId) -> RepoResult<Topic> {
        self.topics
            .get_topic(id)?
            .ok_or(RepoError::TopicNotFound(id))
    }
}
