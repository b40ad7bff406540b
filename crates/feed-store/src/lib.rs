//! Persistent state for product feed mapping.
//!
//! Shops own an uploaded feed, their target channels, comments and the
//! committed mapping sets. The mapping engine never touches this state; the
//! CLI loads it through a [`StateRepository`] and hands snapshots onward.

mod error;
mod repository;
mod store;

pub use error::{Result, StoreError};
pub use repository::{JsonFileRepository, MemoryRepository, StateRepository};
pub use store::{ID_LEN, ShopStore, short_id};
