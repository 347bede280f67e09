//! Repository layer contracts and SQLite implementations.
//!
//! # Responsibility
//! - `item_repo`/`topic_repo`: the item store consumed by the progress engine.
//! - `progress_repo`: the singleton aggregate and the date-keyed snapshot store.
//! - Keep SQL details out of the service layer.
//!
//! # Invariants
//! - Write paths validate models before any SQL mutation.
//! - Read paths reject invalid persisted state instead of masking it.
//! - Storage failures surface as `RepoError::Db`, unchanged.

use crate::db::DbError;
use crate::model::item::{ItemId, ItemValidationError};
use crate::model::topic::{TopicId, TopicValidationError};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod item_repo;
pub mod progress_repo;
pub mod topic_repo;

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error shared by item, topic and progress persistence.
#[derive(Debug)]
pub enum RepoError {
    InvalidItem(ItemValidationError),
    InvalidTopic(TopicValidationError),
    Db(DbError),
    ItemNotFound(ItemId),
    TopicNotFound(TopicId),
    InvalidData(String),
    /// A day window reaching before the earliest representable date.
    WindowOutOfRange { days: u32 },
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidItem(err) => write!(f, "{err}"),
            Self::InvalidTopic(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::ItemNotFound(id) => write!(f, "item not found: {id}"),
            Self::TopicNotFound(id) => write!(f, "topic not found: {id}"),
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
            Self::WindowOutOfRange { days } => {
                write!(f, "a window of {days} days starts before the earliest supported date")
            }
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidItem(err) => Some(err),
            Self::InvalidTopic(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::ItemNotFound(_)
            | Self::TopicNotFound(_)
            | Self::InvalidData(_)
            | Self::WindowOutOfRange { .. } => None,
        }
    }
}

impl From<ItemValidationError> for RepoError {
    fn from(value: ItemValidationError) -> Self {
        Self::InvalidItem(value)
    }
}

impl From<TopicValidationError> for RepoError {
    fn from(value: TopicValidationError) -> Self {
        Self::InvalidTopic(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

pub(crate) fn parse_uuid(value: &str, column: &str) -> RepoResult<uuid::Uuid> {
    uuid::Uuid::parse_str(value)
        .map_err(|_| RepoError::InvalidData(format!("invalid uuid value `{value}` in {column}")))
}

pub(crate) fn bool_to_int(value: bool) -> i64 {
    i64::from(value)
}

pub(crate) fn int_to_bool(value: i64, column: &str) -> RepoResult<bool> {
    match value {
        0 => Ok(false),
        1 => Ok(true),
        other => Err(RepoError::InvalidData(format!(
            "invalid boolean value `{other}` in {column}"
        ))),
    }
}
