//! Core types for slotdb
//!
//! This crate defines the foundational types used throughout the system:
//! - SlotIndex: Stable storage slot assigned to a primary key
//! - TableId: Identifies the key table of an (entity type, key type) pair
//! - IndexKey: Capability bound for primary key values
//! - Error: Error type hierarchy shared by the index and its drivers

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod types;

pub use error::{DriverError, Error, Result};
pub use types::{IndexKey, SlotIndex, TableId, NOT_FOUND_SENTINEL};
