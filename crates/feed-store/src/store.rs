//! Shop, channel and comment operations.
//!
//! Every mutating operation applies its change to a copy of the state and
//! persists that copy. The in-memory state only moves forward once the save
//! succeeded, so a failed validation, feed parse or save leaves both the
//! memory and the stored state untouched.

use chrono::Utc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use feed_model::{ChannelRef, Comment, MappingSet, Shop, StoreState};

use crate::error::{Result, StoreError};
use crate::repository::StateRepository;

/// Length of generated shop, channel and comment ids.
pub const ID_LEN: usize = 5;

/// Short lowercase hex id.
pub fn short_id() -> String {
    let mut id = Uuid::new_v4().simple().to_string();
    id.truncate(ID_LEN);
    id
}

/// Shop state backed by a repository.
#[derive(Debug)]
pub struct ShopStore<R: StateRepository> {
    repository: R,
    state: StoreState,
}

impl<R: StateRepository> ShopStore<R> {
    pub fn open(repository: R) -> Result<Self> {
        let state = repository.load()?;
        Ok(Self { repository, state })
    }

    pub fn state(&self) -> &StoreState {
        &self.state
    }

    pub fn shops(&self) -> &[Shop] {
        &self.state.shops
    }

    pub fn shop(&self, shop_id: &str) -> Result<&Shop> {
        self.state
            .shop(shop_id)
            .ok_or_else(|| shop_not_found(shop_id))
    }

    /// Shop by id, or by exact name when no id matches.
    pub fn find(&self, id_or_name: &str) -> Result<&Shop> {
        self.state
            .shop(id_or_name)
            .or_else(|| self.state.shops.iter().find(|s| s.name == id_or_name))
            .ok_or_else(|| shop_not_found(id_or_name))
    }

    pub fn search(&self, term: &str) -> Vec<&Shop> {
        self.state.search(term)
    }

    /// Creates a shop, optionally with an initial feed.
    pub fn add_shop(&mut self, name: &str, xml_content: Option<String>) -> Result<Shop> {
        let product_count = match &xml_content {
            Some(xml) => feed_ingest::count_items(xml)?,
            None => 0,
        };
        let shop = self.update(|state| {
            let id = unused(|id| state.shop(id).is_some());
            let mut shop = Shop::new(id, name);
            shop.xml_content = xml_content;
            shop.product_count = product_count;
            state.shops.push(shop.clone());
            Ok(shop)
        })?;
        info!(shop = %shop.id, name, "added shop");
        Ok(shop)
    }

    pub fn delete_shop(&mut self, shop_id: &str) -> Result<Shop> {
        let removed = self.update(|state| {
            editable(state, shop_id)?;
            let index = state
                .shops
                .iter()
                .position(|s| s.id == shop_id)
                .ok_or_else(|| shop_not_found(shop_id))?;
            Ok(state.shops.remove(index))
        })?;
        info!(shop = shop_id, "deleted shop");
        Ok(removed)
    }

    pub fn rename_shop(&mut self, shop_id: &str, name: &str) -> Result<()> {
        self.update(|state| {
            editable(state, shop_id)?.name = name.to_string();
            Ok(())
        })
    }

    /// Replaces the shop's feed and recounts its products.
    pub fn upload_feed(&mut self, shop_id: &str, xml_content: String) -> Result<usize> {
        if self.shop(shop_id)?.is_locked {
            return Err(StoreError::ShopLocked {
                id: shop_id.to_string(),
            });
        }
        let product_count = match feed_ingest::count_items(&xml_content) {
            Ok(count) => count,
            Err(error) => {
                warn!(shop = shop_id, %error, "rejected feed upload");
                return Err(error.into());
            }
        };
        self.update(|state| {
            let shop = editable(state, shop_id)?;
            shop.xml_content = Some(xml_content);
            shop.product_count = product_count;
            Ok(())
        })?;
        info!(shop = shop_id, products = product_count, "uploaded feed");
        Ok(product_count)
    }

    /// Flips the lock flag and returns the new value.
    pub fn toggle_lock(&mut self, shop_id: &str) -> Result<bool> {
        self.update(|state| {
            let shop = shop_mut(state, shop_id)?;
            shop.is_locked = !shop.is_locked;
            Ok(shop.is_locked)
        })
    }

    pub fn add_ab_test(&mut self, shop_id: &str, label: &str) -> Result<()> {
        self.update(|state| {
            editable(state, shop_id)?.ab_tests.push(label.to_string());
            Ok(())
        })
    }

    /// Attaches a channel. Adding a known channel id renames it.
    pub fn add_channel(&mut self, shop_id: &str, channel_id: &str, name: &str) -> Result<()> {
        self.update(|state| {
            let shop = editable(state, shop_id)?;
            match shop.channels.iter_mut().find(|c| c.id == channel_id) {
                Some(existing) => existing.name = name.to_string(),
                None => shop.channels.push(ChannelRef {
                    id: channel_id.to_string(),
                    name: name.to_string(),
                }),
            }
            Ok(())
        })
    }

    /// Detaches a channel along with its saved mapping.
    pub fn delete_channel(&mut self, shop_id: &str, channel_id: &str) -> Result<()> {
        self.update(|state| {
            let shop = editable(state, shop_id)?;
            let before = shop.channels.len();
            shop.channels.retain(|c| c.id != channel_id);
            if shop.channels.len() == before {
                return Err(channel_not_found(shop_id, channel_id));
            }
            shop.channel_mappings.remove(channel_id);
            shop.mapped_channels.retain(|c| c != channel_id);
            Ok(())
        })
    }

    pub fn rename_channel(&mut self, shop_id: &str, channel_id: &str, name: &str) -> Result<()> {
        self.update(|state| {
            let channel = editable(state, shop_id)?
                .channels
                .iter_mut()
                .find(|c| c.id == channel_id)
                .ok_or_else(|| channel_not_found(shop_id, channel_id))?;
            channel.name = name.to_string();
            Ok(())
        })
    }

    /// Records that a channel's mapping has been saved. Ids stay unique.
    pub fn mark_channel_mapped(&mut self, shop_id: &str, channel_id: &str) -> Result<()> {
        self.update(|state| {
            let shop = editable(state, shop_id)?;
            if !shop.is_channel_mapped(channel_id) {
                shop.mapped_channels.push(channel_id.to_string());
            }
            Ok(())
        })
    }

    pub fn add_comment(
        &mut self,
        shop_id: &str,
        text: &str,
        field: Option<&str>,
    ) -> Result<Comment> {
        let comment = self.update(|state| {
            let shop = shop_mut(state, shop_id)?;
            let comment = Comment {
                id: unused(|id| shop.comments.iter().any(|c| c.id == id)),
                text: text.to_string(),
                timestamp: Utc::now(),
                field: field.map(str::to_string),
            };
            shop.comments.push(comment.clone());
            Ok(comment)
        })?;
        debug!(shop = shop_id, comment = %comment.id, "added comment");
        Ok(comment)
    }

    pub fn delete_comment(&mut self, shop_id: &str, comment_id: &str) -> Result<()> {
        self.update(|state| {
            let shop = shop_mut(state, shop_id)?;
            let before = shop.comments.len();
            shop.comments.retain(|c| c.id != comment_id);
            if shop.comments.len() == before {
                return Err(StoreError::CommentNotFound {
                    shop: shop_id.to_string(),
                    comment: comment_id.to_string(),
                });
            }
            Ok(())
        })
    }

    /// Stores the committed mapping set over the shop's own fields.
    pub fn save_internal_mappings(&mut self, shop_id: &str, mappings: MappingSet) -> Result<()> {
        self.update(|state| {
            editable(state, shop_id)?.internal_mappings = mappings;
            Ok(())
        })
    }

    /// Stores a channel's committed mapping set and marks the channel mapped.
    pub fn save_channel_mappings(
        &mut self,
        shop_id: &str,
        channel_id: &str,
        mappings: MappingSet,
    ) -> Result<()> {
        self.update(|state| {
            let shop = editable(state, shop_id)?;
            if shop.channel(channel_id).is_none() {
                return Err(channel_not_found(shop_id, channel_id));
            }
            shop.channel_mappings.insert(channel_id.to_string(), mappings);
            if !shop.is_channel_mapped(channel_id) {
                shop.mapped_channels.push(channel_id.to_string());
            }
            Ok(())
        })
    }

    /// Removes every shop.
    pub fn clear(&mut self) -> Result<()> {
        self.update(|state| {
            *state = StoreState::default();
            Ok(())
        })
    }

    /// Applies `change` to a copy of the state and persists the copy.
    ///
    /// The in-memory state is replaced only once the repository accepted the
    /// new state.
    fn update<T>(&mut self, change: impl FnOnce(&mut StoreState) -> Result<T>) -> Result<T> {
        let mut next = self.state.clone();
        let value = change(&mut next)?;
        self.repository.save(&next)?;
        self.state = next;
        Ok(value)
    }
}

fn shop_not_found(shop_id: &str) -> StoreError {
    StoreError::ShopNotFound {
        id: shop_id.to_string(),
    }
}

fn channel_not_found(shop_id: &str, channel_id: &str) -> StoreError {
    StoreError::ChannelNotFound {
        shop: shop_id.to_string(),
        channel: channel_id.to_string(),
    }
}

fn shop_mut<'a>(state: &'a mut StoreState, shop_id: &str) -> Result<&'a mut Shop> {
    state.shop_mut(shop_id).ok_or_else(|| shop_not_found(shop_id))
}

/// Mutable shop that is not locked.
fn editable<'a>(state: &'a mut StoreState, shop_id: &str) -> Result<&'a mut Shop> {
    let shop = shop_mut(state, shop_id)?;
    if shop.is_locked {
        return Err(StoreError::ShopLocked {
            id: shop_id.to_string(),
        });
    }
    Ok(shop)
}

fn unused(taken: impl Fn(&str) -> bool) -> String {
    loop {
        let id = short_id();
        if !taken(&id) {
            return id;
        }
    }
}
