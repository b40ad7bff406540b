//! Mapping state management for interactive mapping workflows.
//!
//! A [`MappingState`] keeps two mapping sets: the committed `saved` set and a
//! `draft` that receives every edit. Saving copies the draft over the saved
//! set; discarding does the reverse. The engine only ever sees snapshots.

use feed_model::{ChannelField, FeedData, Mapping, MappingSet};

use crate::error::{MappingError, Result};
use crate::utils::field_options;

/// An editable target field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappingField {
    pub name: String,
    /// Must be mapped for a complete output.
    pub required: bool,
    pub help_text: Option<String>,
}

/// State of a mapping session for one field list.
#[derive(Debug, Clone)]
pub struct MappingState {
    fields: Vec<MappingField>,
    draft: MappingSet,
    saved: MappingSet,
}

impl MappingState {
    pub fn new(fields: Vec<MappingField>, saved: MappingSet) -> Self {
        Self {
            fields,
            draft: saved.clone(),
            saved,
        }
    }

    /// Session over the feed's own fields.
    ///
    /// Fields are the distinct names that carry a value in at least one
    /// record; required flags and help text come from the inferred schema.
    pub fn for_feed(feed: &FeedData, saved: MappingSet) -> Self {
        let fields = field_options(&feed.records)
            .into_iter()
            .map(|name| {
                let entry = feed.schema_entry(&name);
                MappingField {
                    required: entry.is_some_and(|e| e.required),
                    help_text: entry.and_then(|e| e.help_text.clone()),
                    name,
                }
            })
            .collect();
        Self::new(fields, saved)
    }

    /// Session over a channel's output fields.
    pub fn for_channel(schema: &[ChannelField], saved: MappingSet) -> Self {
        let fields = schema
            .iter()
            .map(|field| MappingField {
                name: field.name.clone(),
                required: field.is_required(),
                help_text: None,
            })
            .collect();
        Self::new(fields, saved)
    }

    pub fn fields(&self) -> &[MappingField] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&MappingField> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn draft(&self) -> &MappingSet {
        &self.draft
    }

    pub fn saved(&self) -> &MappingSet {
        &self.saved
    }

    pub fn mapping_for(&self, field: &str) -> Option<&Mapping> {
        self.draft.get(field)
    }

    /// Adds or replaces the draft mapping for a listed field.
    pub fn set_mapping(&mut self, mapping: Mapping) -> Result<Option<Mapping>> {
        if self.field(mapping.target_field()).is_none() {
            return Err(MappingError::UnknownTargetField(
                mapping.target_field().to_string(),
            ));
        }
        Ok(self.draft.insert(mapping))
    }

    /// Removes the draft mapping for a field.
    pub fn clear_mapping(&mut self, field: &str) -> bool {
        self.draft.remove(field).is_some()
    }

    pub fn has_unsaved_changes(&self) -> bool {
        self.draft != self.saved
    }

    /// Commits the draft and returns the committed snapshot.
    pub fn save(&mut self) -> MappingSet {
        self.saved = self.draft.clone();
        self.saved.clone()
    }

    /// Reverts the draft to the last saved snapshot.
    pub fn discard(&mut self) {
        self.draft = self.saved.clone();
    }

    pub fn field_status(&self, field: &str) -> FieldMappingStatus {
        match (self.draft.get(field), self.saved.get(field)) {
            (None, None) => FieldMappingStatus::Unmapped,
            (Some(draft), Some(saved)) if draft == saved => FieldMappingStatus::Saved,
            _ => FieldMappingStatus::Modified,
        }
    }

    /// Get summary counts.
    pub fn summary(&self) -> MappingSummary {
        let required_total = self.fields.iter().filter(|f| f.required).count();
        let required_mapped = self
            .fields
            .iter()
            .filter(|f| f.required && self.draft.contains(&f.name))
            .count();
        MappingSummary {
            total_fields: self.fields.len(),
            mapped: self
                .fields
                .iter()
                .filter(|f| self.draft.contains(&f.name))
                .count(),
            modified: self
                .fields
                .iter()
                .filter(|f| self.field_status(&f.name) == FieldMappingStatus::Modified)
                .count(),
            required_total,
            required_mapped,
        }
    }
}

/// Status of a field's mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldMappingStatus {
    /// Draft matches the saved mapping.
    Saved,
    /// Draft differs from the saved state (added, changed or cleared).
    Modified,
    /// No mapping in either set.
    Unmapped,
}

/// Summary of mapping counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MappingSummary {
    pub total_fields: usize,
    /// Fields with a draft mapping.
    pub mapped: usize,
    /// Fields whose draft differs from the saved set.
    pub modified: usize,
    pub required_total: usize,
    pub required_mapped: usize,
}
