//! Field mapping types.
//!
//! A [`Mapping`] describes how one target field is derived from a source
//! record. The derivation ([`MappingKind`]) and the per-record predicate
//! ([`Condition`]) are independent: any kind may carry any condition.
//!
//! Mappings serialize as flat objects:
//!
//! ```json
//! { "targetField": "title", "type": "rename", "sourceField": "name", "condition": "all" }
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{ModelError, Result};
use crate::schema::is_xml_name;

/// Reference to a source field inside a combine mapping.
///
/// Deserializes from a plain field name or from a field option object
/// (`{"value": "color", "label": "Color"}`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "FieldRefRepr", into = "String")]
pub struct FieldRef(String);

impl FieldRef {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for FieldRef {
    fn from(name: &str) -> Self {
        Self(name.to_string())
    }
}

impl From<String> for FieldRef {
    fn from(name: String) -> Self {
        Self(name)
    }
}

impl From<FieldRef> for String {
    fn from(field: FieldRef) -> Self {
        field.0
    }
}

impl fmt::Display for FieldRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum FieldRefRepr {
    Name(String),
    Option { value: String },
}

impl From<FieldRefRepr> for FieldRef {
    fn from(repr: FieldRefRepr) -> Self {
        match repr {
            FieldRefRepr::Name(name) | FieldRefRepr::Option { value: name } => Self(name),
        }
    }
}

/// How a target field's value is computed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase", rename_all_fields = "camelCase")]
pub enum MappingKind {
    /// Copy the value of a source field verbatim.
    Rename { source_field: String },
    /// A constant value, independent of the record.
    Static { value: String },
    /// Join several source fields with a separator. Missing fields
    /// contribute empty segments.
    Combine {
        fields: Vec<FieldRef>,
        #[serde(default)]
        separator: String,
    },
    /// Always the empty string.
    Empty,
}

impl MappingKind {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Rename { .. } => "rename",
            Self::Static { .. } => "static",
            Self::Combine { .. } => "combine",
            Self::Empty => "empty",
        }
    }

    /// Source fields read by this kind, in evaluation order.
    pub fn source_fields(&self) -> Vec<&str> {
        match self {
            Self::Rename { source_field } => vec![source_field.as_str()],
            Self::Combine { fields, .. } => fields.iter().map(FieldRef::as_str).collect(),
            Self::Static { .. } | Self::Empty => Vec::new(),
        }
    }
}

/// Comparison operator of an `onlyIf` condition.
///
/// Accepts the labels shown in the mapping editor as aliases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operator {
    #[serde(rename = "equalTo", alias = "is equal to")]
    EqualTo,
    #[serde(rename = "notEqualTo", alias = "is not equal to")]
    NotEqualTo,
    #[serde(rename = "includes")]
    Includes,
    #[serde(rename = "excludesSubstring", alias = "doesn't include")]
    ExcludesSubstring,
}

impl Operator {
    pub const ALL: [Operator; 4] = [
        Operator::EqualTo,
        Operator::NotEqualTo,
        Operator::Includes,
        Operator::ExcludesSubstring,
    ];

    /// Applies the operator. Comparisons are exact and case-sensitive.
    pub fn evaluate(self, operand: &str, value: &str) -> bool {
        match self {
            Self::EqualTo => operand == value,
            Self::NotEqualTo => operand != value,
            Self::Includes => operand.contains(value),
            Self::ExcludesSubstring => !operand.contains(value),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::EqualTo => "is equal to",
            Self::NotEqualTo => "is not equal to",
            Self::Includes => "includes",
            Self::ExcludesSubstring => "doesn't include",
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Operator {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self> {
        let normalized = s.trim();
        match normalized {
            "equalTo" | "is equal to" | "eq" | "==" => Ok(Self::EqualTo),
            "notEqualTo" | "is not equal to" | "ne" | "!=" => Ok(Self::NotEqualTo),
            "includes" | "contains" => Ok(Self::Includes),
            "excludesSubstring" | "doesn't include" | "excludes" => Ok(Self::ExcludesSubstring),
            _ => Err(ModelError::UnknownOperator(s.to_string())),
        }
    }
}

/// Predicate evaluated against a single record field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Predicate {
    pub field: String,
    pub operator: Operator,
    #[serde(default)]
    pub value: String,
}

/// When a mapping applies to a record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Condition {
    #[default]
    All,
    OnlyIf(Predicate),
}

impl Condition {
    pub fn only_if(field: impl Into<String>, operator: Operator, value: impl Into<String>) -> Self {
        Self::OnlyIf(Predicate {
            field: field.into(),
            operator,
            value: value.into(),
        })
    }

    pub fn is_all(&self) -> bool {
        matches!(self, Self::All)
    }
}

/// The rule that derives one target field.
///
/// Construct through [`Mapping::new`] or [`MappingBuilder`]; both validate
/// that every field name the mapping refers to is non-empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "RawMapping")]
pub struct Mapping {
    target_field: String,
    #[serde(flatten)]
    kind: MappingKind,
    #[serde(default, skip_serializing_if = "Condition::is_all")]
    condition: Condition,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawMapping {
    target_field: String,
    #[serde(flatten)]
    kind: MappingKind,
    #[serde(default)]
    condition: Condition,
}

impl TryFrom<RawMapping> for Mapping {
    type Error = ModelError;

    fn try_from(raw: RawMapping) -> Result<Self> {
        Mapping::new(raw.target_field, raw.kind, raw.condition)
    }
}

impl Mapping {
    pub fn new(
        target_field: impl Into<String>,
        kind: MappingKind,
        condition: Condition,
    ) -> Result<Self> {
        let target_field = target_field.into();
        if target_field.trim().is_empty() {
            return Err(ModelError::EmptyTargetField);
        }
        if !is_xml_name(&target_field) {
            return Err(ModelError::InvalidTargetField(target_field));
        }
        let target = target_field.as_str();
        match &kind {
            MappingKind::Rename { source_field } if source_field.trim().is_empty() => {
                return Err(ModelError::EmptySourceField {
                    target: target.to_string(),
                });
            }
            MappingKind::Combine { fields, .. } => {
                if let Some(index) = fields.iter().position(|f| f.as_str().trim().is_empty()) {
                    return Err(ModelError::EmptyCombineField {
                        target: target.to_string(),
                        index,
                    });
                }
            }
            _ => {}
        }
        if let Condition::OnlyIf(predicate) = &condition
            && predicate.field.trim().is_empty()
        {
            return Err(ModelError::EmptyConditionField {
                target: target.to_string(),
            });
        }
        Ok(Self {
            target_field,
            kind,
            condition,
        })
    }

    pub fn rename(target_field: impl Into<String>, source_field: impl Into<String>) -> Result<Self> {
        Self::new(
            target_field,
            MappingKind::Rename {
                source_field: source_field.into(),
            },
            Condition::All,
        )
    }

    pub fn static_value(target_field: impl Into<String>, value: impl Into<String>) -> Result<Self> {
        Self::new(
            target_field,
            MappingKind::Static {
                value: value.into(),
            },
            Condition::All,
        )
    }

    pub fn combine<I, F>(
        target_field: impl Into<String>,
        fields: I,
        separator: impl Into<String>,
    ) -> Result<Self>
    where
        I: IntoIterator<Item = F>,
        F: Into<FieldRef>,
    {
        Self::new(
            target_field,
            MappingKind::Combine {
                fields: fields.into_iter().map(Into::into).collect(),
                separator: separator.into(),
            },
            Condition::All,
        )
    }

    pub fn empty(target_field: impl Into<String>) -> Result<Self> {
        Self::new(target_field, MappingKind::Empty, Condition::All)
    }

    pub fn builder(target_field: impl Into<String>) -> MappingBuilder {
        MappingBuilder::new(target_field)
    }

    /// Returns a copy of this mapping restricted by `condition`.
    pub fn with_condition(self, condition: Condition) -> Result<Self> {
        Self::new(self.target_field, self.kind, condition)
    }

    pub fn target_field(&self) -> &str {
        &self.target_field
    }

    pub fn kind(&self) -> &MappingKind {
        &self.kind
    }

    pub fn condition(&self) -> &Condition {
        &self.condition
    }
}

/// Incremental editor for a draft mapping.
///
/// Mirrors how a mapping is assembled one control at a time; nothing is
/// validated until [`MappingBuilder::build`].
#[derive(Debug, Clone)]
pub struct MappingBuilder {
    target_field: String,
    kind: MappingKind,
    condition: Condition,
}

impl MappingBuilder {
    pub fn new(target_field: impl Into<String>) -> Self {
        Self {
            target_field: target_field.into(),
            kind: MappingKind::Empty,
            condition: Condition::All,
        }
    }

    /// Starts from an existing mapping.
    pub fn from_mapping(mapping: &Mapping) -> Self {
        Self {
            target_field: mapping.target_field.clone(),
            kind: mapping.kind.clone(),
            condition: mapping.condition.clone(),
        }
    }

    #[must_use]
    pub fn rename(mut self, source_field: impl Into<String>) -> Self {
        self.kind = MappingKind::Rename {
            source_field: source_field.into(),
        };
        self
    }

    #[must_use]
    pub fn static_value(mut self, value: impl Into<String>) -> Self {
        self.kind = MappingKind::Static {
            value: value.into(),
        };
        self
    }

    /// Switches to a combine mapping, keeping any separator already set.
    #[must_use]
    pub fn combine_field(mut self, field: impl Into<FieldRef>) -> Self {
        match &mut self.kind {
            MappingKind::Combine { fields, .. } => fields.push(field.into()),
            _ => {
                self.kind = MappingKind::Combine {
                    fields: vec![field.into()],
                    separator: String::new(),
                }
            }
        }
        self
    }

    /// Removes a field from a combine mapping; a no-op for other kinds.
    #[must_use]
    pub fn remove_combine_field(mut self, field: &str) -> Self {
        if let MappingKind::Combine { fields, .. } = &mut self.kind {
            fields.retain(|f| f.as_str() != field);
        }
        self
    }

    #[must_use]
    pub fn separator(mut self, value: impl Into<String>) -> Self {
        let value = value.into();
        match &mut self.kind {
            MappingKind::Combine { separator, .. } => *separator = value,
            _ => {
                self.kind = MappingKind::Combine {
                    fields: Vec::new(),
                    separator: value,
                }
            }
        }
        self
    }

    #[must_use]
    pub fn empty(mut self) -> Self {
        self.kind = MappingKind::Empty;
        self
    }

    #[must_use]
    pub fn all(mut self) -> Self {
        self.condition = Condition::All;
        self
    }

    #[must_use]
    pub fn only_if(
        mut self,
        field: impl Into<String>,
        operator: Operator,
        value: impl Into<String>,
    ) -> Self {
        self.condition = Condition::only_if(field, operator, value);
        self
    }

    pub fn build(self) -> Result<Mapping> {
        Mapping::new(self.target_field, self.kind, self.condition)
    }
}

/// Mappings keyed by target field, in insertion order.
///
/// Inserting a mapping for a target that already has one replaces it in
/// place, so a set never holds two mappings for the same target.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<Mapping>", into = "Vec<Mapping>")]
pub struct MappingSet {
    mappings: Vec<Mapping>,
}

impl MappingSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces the mapping for its target field.
    ///
    /// Returns the replaced mapping, if any.
    pub fn insert(&mut self, mapping: Mapping) -> Option<Mapping> {
        match self
            .mappings
            .iter_mut()
            .find(|m| m.target_field == mapping.target_field)
        {
            Some(existing) => Some(std::mem::replace(existing, mapping)),
            None => {
                self.mappings.push(mapping);
                None
            }
        }
    }

    pub fn remove(&mut self, target_field: &str) -> Option<Mapping> {
        let index = self
            .mappings
            .iter()
            .position(|m| m.target_field == target_field)?;
        Some(self.mappings.remove(index))
    }

    pub fn get(&self, target_field: &str) -> Option<&Mapping> {
        self.mappings
            .iter()
            .find(|m| m.target_field == target_field)
    }

    pub fn contains(&self, target_field: &str) -> bool {
        self.get(target_field).is_some()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Mapping> {
        self.mappings.iter()
    }

    pub fn target_fields(&self) -> impl Iterator<Item = &str> {
        self.mappings.iter().map(Mapping::target_field)
    }

    pub fn len(&self) -> usize {
        self.mappings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mappings.is_empty()
    }

    pub fn clear(&mut self) {
        self.mappings.clear();
    }
}

impl From<Vec<Mapping>> for MappingSet {
    fn from(mappings: Vec<Mapping>) -> Self {
        mappings.into_iter().collect()
    }
}

impl From<MappingSet> for Vec<Mapping> {
    fn from(set: MappingSet) -> Self {
        set.mappings
    }
}

impl FromIterator<Mapping> for MappingSet {
    fn from_iter<I: IntoIterator<Item = Mapping>>(iter: I) -> Self {
        let mut set = Self::new();
        for mapping in iter {
            set.insert(mapping);
        }
        set
    }
}

impl Extend<Mapping> for MappingSet {
    fn extend<I: IntoIterator<Item = Mapping>>(&mut self, iter: I) {
        for mapping in iter {
            self.insert(mapping);
        }
    }
}

impl<'a> IntoIterator for &'a MappingSet {
    type Item = &'a Mapping;
    type IntoIter = std::slice::Iter<'a, Mapping>;

    fn into_iter(self) -> Self::IntoIter {
        self.mappings.iter()
    }
}

impl IntoIterator for MappingSet {
    type Item = Mapping;
    type IntoIter = std::vec::IntoIter<Mapping>;

    fn into_iter(self) -> Self::IntoIter {
        self.mappings.into_iter()
    }
}
