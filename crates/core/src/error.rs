//! Error types for slotdb
//!
//! This module defines the error types shared by the key index and the
//! drivers that persist key tables. We use `thiserror` for automatic
//! `Display` and `Error` trait implementations.
//!
//! Looking up or removing an absent key is never an error: lookups return
//! `None` and removals are silent no-ops.

use crate::types::TableId;
use std::io;
use thiserror::Error;

/// Result type alias for slotdb operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by a key table driver
#[derive(Debug, Error)]
pub enum DriverError {
    /// I/O error from the storage medium
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Encoding or decoding of a key table failed
    #[error("Codec error: {0}")]
    Codec(String),

    /// The persisted key table does not match the expected file format
    #[error("Format error: {0}")]
    Format(String),

    /// The persisted key table decoded but violates an index invariant
    #[error("Corrupt key table: {0}")]
    Corrupt(String),

    /// The driver cannot service the request (shut down, task failure, etc.)
    #[error("Driver unavailable: {0}")]
    Unavailable(String),
}

/// Error types for the key index
#[derive(Debug, Error)]
pub enum Error {
    /// Reading the key table failed during construction or refresh
    #[error("Failed to read key table {table}: {source}")]
    DriverRead {
        /// Table being read
        table: TableId,
        /// Underlying driver failure
        #[source]
        source: DriverError,
    },

    /// Writing the key table failed during flush
    #[error("Failed to write key table {table}: {source}")]
    DriverWrite {
        /// Table being written
        table: TableId,
        /// Underlying driver failure
        #[source]
        source: DriverError,
    },

    /// Every slot of the table has been handed out
    #[error("Slot space exhausted for key table {0}")]
    SlotSpaceExhausted(TableId),

    /// Invalid driver configuration
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// I/O error outside of a key table read or write (opening a data directory)
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl Error {
    /// Wrap a driver failure that happened while reading `table`
    pub fn read(table: &TableId, source: DriverError) -> Self {
        Error::DriverRead {
            table: table.clone(),
            source,
        }
    }

    /// Wrap a driver failure that happened while writing `table`
    pub fn write(table: &TableId, source: DriverError) -> Self {
        Error::DriverWrite {
            table: table.clone(),
            source,
        }
    }

    /// True for read failures (construction or refresh)
    pub fn is_read_failure(&self) -> bool {
        matches!(self, Error::DriverRead { .. })
    }

    /// True for write failures (flush)
    pub fn is_write_failure(&self) -> bool {
        matches!(self, Error::DriverWrite { .. })
    }
}

impl From<rmp_serde::encode::Error> for DriverError {
    fn from(e: rmp_serde::encode::Error) -> Self {
        DriverError::Codec(e.to_string())
    }
}

impl From<rmp_serde::decode::Error> for DriverError {
    fn from(e: rmp_serde::decode::Error) -> Self {
        DriverError::Codec(e.to_string())
    }
}
