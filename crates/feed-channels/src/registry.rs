#![deny(unsafe_code)]

use std::collections::BTreeSet;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use feed_model::{ChannelField, is_xml_name};

use crate::builtin::{BUILTIN_VERSION, builtin_channels};
use crate::error::{ChannelError, Result};

/// Output schema of one target channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelDefinition {
    pub id: String,
    pub name: String,
    #[serde(rename = "field", default)]
    pub fields: Vec<ChannelField>,
}

impl ChannelDefinition {
    pub fn field(&self, name: &str) -> Option<&ChannelField> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn required_fields(&self) -> impl Iterator<Item = &ChannelField> {
        self.fields.iter().filter(|f| f.is_required())
    }

    pub fn optional_fields(&self) -> impl Iterator<Item = &ChannelField> {
        self.fields.iter().filter(|f| f.optional)
    }
}

#[derive(Debug, Deserialize)]
struct ChannelTable {
    version: Option<String>,
    #[serde(rename = "channel", default)]
    channels: Vec<ChannelDefinition>,
}

/// Channel id to ordered field list.
#[derive(Debug, Clone)]
pub struct ChannelRegistry {
    version: String,
    channels: Vec<ChannelDefinition>,
}

impl Default for ChannelRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

impl ChannelRegistry {
    /// The channels shipped with the tool.
    pub fn builtin() -> Self {
        Self {
            version: BUILTIN_VERSION.to_string(),
            channels: builtin_channels(),
        }
    }

    /// Parses a standalone channel table.
    ///
    /// ```toml
    /// version = "custom-1"
    ///
    /// [[channel]]
    /// id = "pinterest"
    /// name = "Pinterest"
    ///
    /// [[channel.field]]
    /// name = "id"
    /// ```
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let table: ChannelTable =
            toml::from_str(text).map_err(|source| ChannelError::Toml { source })?;
        for channel in &table.channels {
            validate_channel(channel)?;
        }
        let mut ids = BTreeSet::new();
        for channel in &table.channels {
            if !ids.insert(channel.id.as_str()) {
                return Err(ChannelError::invalid(format!(
                    "duplicate channel id '{}'",
                    channel.id
                )));
            }
        }
        Ok(Self {
            version: table.version.unwrap_or_else(|| "custom".to_string()),
            channels: table.channels,
        })
    }

    /// Reads a channel table from disk.
    pub fn from_toml_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| ChannelError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Built-in channels with the table at `path` merged over them.
    pub fn with_overlay(path: &Path) -> Result<Self> {
        let mut registry = Self::builtin();
        registry.merge(Self::from_toml_file(path)?);
        Ok(registry)
    }

    /// Merges `other` into this registry. Channels with a known id replace
    /// the existing definition in place; new ids are appended.
    pub fn merge(&mut self, other: ChannelRegistry) {
        for channel in other.channels {
            match self.channels.iter_mut().find(|c| c.id == channel.id) {
                Some(existing) => {
                    debug!(channel = %channel.id, "overriding channel definition");
                    *existing = channel;
                }
                None => self.channels.push(channel),
            }
        }
        self.version = format!("{}+{}", self.version, other.version);
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn channels(&self) -> &[ChannelDefinition] {
        &self.channels
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.channels.iter().map(|c| c.id.as_str())
    }

    pub fn get(&self, id: &str) -> Option<&ChannelDefinition> {
        self.channels.iter().find(|c| c.id == id)
    }

    /// Field list of a channel.
    pub fn schema(&self, id: &str) -> Result<&[ChannelField]> {
        self.get(id)
            .map(|c| c.fields.as_slice())
            .ok_or_else(|| ChannelError::UnknownChannel { id: id.to_string() })
    }
}

fn validate_channel(channel: &ChannelDefinition) -> Result<()> {
    if channel.id.trim().is_empty() {
        return Err(ChannelError::invalid("channel id must not be empty"));
    }
    let mut names = BTreeSet::new();
    for field in &channel.fields {
        if field.name.trim().is_empty() {
            return Err(ChannelError::invalid(format!(
                "channel '{}' has a field with an empty name",
                channel.id
            )));
        }
        if !is_xml_name(&field.name) {
            return Err(ChannelError::invalid(format!(
                "channel '{}' field '{}' is not a valid XML element name",
                channel.id, field.name
            )));
        }
        if !names.insert(field.name.as_str()) {
            return Err(ChannelError::invalid(format!(
                "channel '{}' lists field '{}' twice",
                channel.id, field.name
            )));
        }
    }
    Ok(())
}
