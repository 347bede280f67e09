//! Core use-case services.
//!
//! # Responsibility
//! - `aggregator`: recompute and persist the live aggregate and today's snapshot.
//! - `history`: today's snapshot and dense date-range history.
//! - `completions`: dense per-day completion counts derived from items.
//! - `item_service`/`topic_service`: store mutations that keep progress current.
//!
//! # Invariants
//! - Every successful item mutation is followed by a full recompute.
//! - Range queries never write.

pub mod aggregator;
pub mod completions;
pub mod history;
pub mod item_service;
mod series;
pub mod topic_service;
