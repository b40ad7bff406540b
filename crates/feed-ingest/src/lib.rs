//! Product feed ingestion.
//!
//! This crate turns a raw XML product feed into flat records and an inferred
//! field schema.
//!
//! # Example
//!
//! ```ignore
//! use feed_ingest::parse_feed;
//!
//! let feed = parse_feed("<items><item><sku>1</sku></item></items>")?;
//! assert_eq!(feed.records[0].get("sku"), Some("1"));
//! ```

mod error;
mod feed;
mod xml;

// === Error Types ===
pub use error::{IngestError, Result};

// === Feed Parsing ===
pub use feed::{ITEM_TAG, count_items, parse_feed, parse_feed_bytes, read_feed};
