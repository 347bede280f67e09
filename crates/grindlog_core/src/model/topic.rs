//! Topic model: a named group of practice items.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

pub type TopicId = Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Topic {
    pub id: TopicId,
    pub name: String,
    pub description: Option<String>,
    /// Free-form study notes edited independently of the other fields.
    pub notes: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Topic {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            description: None,
            notes: None,
            created_at: 0,
            updated_at: 0,
        }
    }

    pub fn validate(&self) -> Result<(), TopicValidationError> {
        if self.name.trim().is_empty() {
            return Err(TopicValidationError::BlankName);
        }
        Ok(())
    }
}

/// Topic joined with the number of items that reference it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicSummary {
    #[serde(flatten)]
    pub topic: Topic,
    pub item_count: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TopicValidationError {
    BlankName,
}

impl Display for TopicValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankName => write!(f, "topic name must not be blank"),
        }
    }
}

impl Error for TopicValidationError {}
