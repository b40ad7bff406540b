//! Product feed data model.
//!
//! Records and schemas produced by the feed parser, the field mapping types
//! consumed by the mapping engine, channel field definitions, and the shop
//! state kept by the persistence layer.

pub mod error;
pub mod mapping;
pub mod record;
pub mod schema;
pub mod shop;

pub use error::{ModelError, Result};
pub use mapping::{
    Condition, FieldRef, Mapping, MappingBuilder, MappingKind, MappingSet, Operator, Predicate,
};
pub use record::{FeedData, Fields, Record};
pub use schema::{ChannelField, SchemaEntry, is_xml_name};
pub use shop::{ChannelRef, Comment, Shop, StoreState};
