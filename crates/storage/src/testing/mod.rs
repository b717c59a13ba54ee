//! Test doubles for key table drivers
//!
//! Wrappers around any [`KeyTableDriver`](crate::driver::KeyTableDriver)
//! that observe or perturb its I/O:
//!
//! - **CountingDriver**: counts reads and writes (flush coalescing checks)
//! - **FailingDriver**: switchable read/write failure injection
//! - **GatedDriver**: holds writes until released (in-flight flush checks)
//! - **ReferenceModel**: expected index state for model-based tests
//!
//! # Example
//!
//! ```ignore
//! use slotdb_storage::testing::{CountingDriver, FailingDriver};
//!
//! let counting = Arc::new(CountingDriver::new(Arc::new(MemoryDriver::new())));
//! let index = KeyIndex::<Person, String>::open(counting.clone(), resolve).await?;
//! index.flush().await?;
//! assert_eq!(counting.writes(), 0);
//! ```

mod counting;
mod failing;
mod gated;
mod reference_model;

pub use counting::CountingDriver;
pub use failing::FailingDriver;
pub use gated::GatedDriver;
pub use reference_model::{assert_matches_model, Operation, ReferenceModel, StateMismatch};
