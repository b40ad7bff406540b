//! Shop, channel and comment records kept by the persistence layer.
//!
//! These types are plain data. The mapping engine never reads them; the
//! store crate owns the operations that mutate them.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::mapping::MappingSet;

/// A target channel attached to a shop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelRef {
    pub id: String,
    pub name: String,
}

/// A free-text note, optionally attached to one field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub id: String,
    pub text: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Shop {
    pub id: String,
    pub name: String,
    /// Raw source feed as uploaded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub xml_content: Option<String>,
    pub product_count: usize,
    pub comments: Vec<Comment>,
    pub ab_tests: Vec<String>,
    pub is_locked: bool,
    pub channels: Vec<ChannelRef>,
    /// Channel ids whose mapping has been saved at least once. Unique.
    pub mapped_channels: Vec<String>,
    /// Committed mapping set over the shop's own fields.
    pub internal_mappings: MappingSet,
    /// Committed mapping set per channel id.
    pub channel_mappings: BTreeMap<String, MappingSet>,
}

impl Shop {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn channel(&self, channel_id: &str) -> Option<&ChannelRef> {
        self.channels.iter().find(|c| c.id == channel_id)
    }

    pub fn comments_for_field<'a>(&'a self, field: &'a str) -> impl Iterator<Item = &'a Comment> {
        self.comments
            .iter()
            .filter(move |c| c.field.as_deref() == Some(field))
    }

    pub fn is_channel_mapped(&self, channel_id: &str) -> bool {
        self.mapped_channels.iter().any(|c| c == channel_id)
    }
}

/// Everything the persistence layer stores.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreState {
    pub shops: Vec<Shop>,
}

impl StoreState {
    pub fn shop(&self, shop_id: &str) -> Option<&Shop> {
        self.shops.iter().find(|s| s.id == shop_id)
    }

    pub fn shop_mut(&mut self, shop_id: &str) -> Option<&mut Shop> {
        self.shops.iter_mut().find(|s| s.id == shop_id)
    }

    /// Case-insensitive search over shop names and ids.
    pub fn search<'a>(&'a self, term: &str) -> Vec<&'a Shop> {
        let term = term.to_lowercase();
        self.shops
            .iter()
            .filter(|s| s.name.to_lowercase().contains(&term) || s.id.to_lowercase().contains(&term))
            .collect()
    }
}
