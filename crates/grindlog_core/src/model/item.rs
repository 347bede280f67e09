//! Practice item ("question") model.
//!
//! # Invariants
//! - `title` is never blank.
//! - `external_number` is strictly positive.
//! - `link`, when present, is at most `MAX_LINK_CHARS` characters.
//! - `updated_at >= created_at` for persisted items.

use crate::model::topic::TopicId;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

pub type ItemId = Uuid;

pub const MAX_LINK_CHARS: usize = 500;

/// Perceived difficulty of a practice item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

/// Completion state of a practice item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ItemStatus {
    Todo,
    InProgress,
    Done,
}

/// One practice item tracked under a topic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    pub topic_id: TopicId,
    /// Identifier on the external judge site (problem number).
    pub external_number: i64,
    pub title: String,
    pub link: Option<String>,
    pub difficulty: Difficulty,
    pub status: ItemStatus,
    pub is_important: bool,
    /// Epoch milliseconds.
    pub reminder_at: Option<i64>,
    /// Epoch milliseconds, set once on create.
    pub created_at: i64,
    /// Epoch milliseconds, refreshed by every repository update.
    pub updated_at: i64,
}

impl Item {
    /// Creates a `Todo` item with a fresh id and zeroed timestamps.
    ///
    /// Timestamps are stamped by the service layer on create.
    pub fn new(
        topic_id: TopicId,
        external_number: i64,
        title: impl Into<String>,
        difficulty: Difficulty,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            topic_id,
            external_number,
            title: title.into(),
            link: None,
            difficulty,
            status: ItemStatus::Todo,
            is_important: false,
            reminder_at: None,
            created_at: 0,
            updated_at: 0,
        }
    }

    /// Checks field-level invariants before persistence.
    pub fn validate(&self) -> Result<(), ItemValidationError> {
        if self.title.trim().is_empty() {
            return Err(ItemValidationError::BlankTitle);
        }
        if self.external_number <= 0 {
            return Err(ItemValidationError::NonPositiveNumber(self.external_number));
        }
        if let Some(link) = self.link.as_deref() {
            let chars = link.chars().count();
            if chars > MAX_LINK_CHARS {
                return Err(ItemValidationError::LinkTooLong(chars));
            }
        }
        if self.updated_at < self.created_at {
            return Err(ItemValidationError::ModifiedBeforeCreated {
                created_at: self.created_at,
                updated_at: self.updated_at,
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemValidationError {
    BlankTitle,
    NonPositiveNumber(i64),
    LinkTooLong(usize),
    ModifiedBeforeCreated { created_at: i64, updated_at: i64 },
}

impl Display for ItemValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankTitle => write!(f, "item title must not be blank"),
            Self::NonPositiveNumber(value) => {
                write!(f, "item external number must be positive, got {value}")
            }
            Self::LinkTooLong(chars) => write!(
                f,
                "item link has {chars} characters, limit is {MAX_LINK_CHARS}"
            ),
            Self::ModifiedBeforeCreated {
                created_at,
                updated_at,
            } => write!(
                f,
                "item updated_at ({updated_at}) is earlier than created_at ({created_at})"
            ),
        }
    }
}

impl Error for ItemValidationError {}
