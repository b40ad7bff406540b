use serde::{Deserialize, Serialize};

/// A field discovered in the source feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaEntry {
    pub name: String,
    /// True when the first occurrence of the tag carried a `required` attribute.
    #[serde(default)]
    pub required: bool,
    /// Text of the `description` attribute on the first occurrence.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub help_text: Option<String>,
}

impl SchemaEntry {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            required: false,
            help_text: None,
        }
    }
}

/// One field of a target channel's output schema.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChannelField {
    pub name: String,
    #[serde(default)]
    pub optional: bool,
}

impl ChannelField {
    pub fn required(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            optional: false,
        }
    }

    pub fn optional(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            optional: true,
        }
    }

    pub fn is_required(&self) -> bool {
        !self.optional
    }
}

/// True when `name` can be written as an XML element name.
///
/// Follows the XML 1.0 `Name` production: a letter, `_` or `:` first, then
/// letters, digits, `-`, `.`, `_`, `:` or U+00B7.
pub fn is_xml_name(name: &str) -> bool {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    is_name_start(first)
        && chars.all(|c| {
            is_name_start(c) || c.is_alphanumeric() || matches!(c, '-' | '.' | '\u{B7}')
        })
}

fn is_name_start(c: char) -> bool {
    c.is_alphabetic() || matches!(c, '_' | ':')
}
