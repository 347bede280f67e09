//! Domain model for practice items, topics and progress facts.
//!
//! # Responsibility
//! - Define canonical data structures used by repositories and services.
//! - Keep derived progress facts (`CurrentAggregate`, `DailySnapshot`)
//!   decoupled from items so history survives item deletion.
//!
//! # Invariants
//! - Items and topics are identified by stable UUIDs.
//! - Instants are Unix epoch milliseconds; calendar dates are local dates.

pub mod item;
pub mod progress;
pub mod topic;
