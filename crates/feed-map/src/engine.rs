//! Mapping engine implementation.
//!
//! The engine is a pure function of a record set and a mapping set. It holds
//! no mutable state, so the same engine may be applied repeatedly (for
//! previews) or from several threads at once.

use std::collections::BTreeSet;

use tracing::{debug, debug_span};

use feed_model::{Condition, Mapping, MappingKind, MappingSet, Record};

/// Engine applying one immutable mapping set snapshot to record sets.
///
/// # Example
///
/// ```ignore
/// use feed_map::MappingEngine;
///
/// let engine = MappingEngine::new(mappings);
/// let mapped = engine.apply(&feed.records);
/// assert_eq!(mapped.len(), feed.records.len());
/// ```
#[derive(Debug, Clone)]
pub struct MappingEngine {
    mappings: MappingSet,
}

impl MappingEngine {
    pub fn new(mappings: MappingSet) -> Self {
        Self { mappings }
    }

    pub fn mappings(&self) -> &MappingSet {
        &self.mappings
    }

    /// Maps every record. Output has the input's length and order.
    pub fn apply(&self, records: &[Record]) -> Vec<Record> {
        let span = debug_span!(
            "apply_mappings",
            records = records.len(),
            mappings = self.mappings.len()
        );
        let _guard = span.enter();
        let mapped: Vec<Record> = records
            .iter()
            .map(|record| map_record(record, &self.mappings))
            .collect();
        debug!(records = mapped.len(), "applied mappings");
        mapped
    }

    /// Source fields referenced by the mappings (rename, combine and
    /// condition fields) that do not occur in `available`.
    ///
    /// Such references are legal and resolve to empty strings; callers may
    /// surface them as warnings.
    pub fn unresolved_sources<'a, I>(&self, available: I) -> Vec<String>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let available: BTreeSet<&str> = available.into_iter().collect();
        let mut missing = BTreeSet::new();
        for mapping in &self.mappings {
            let mut referenced = mapping.kind().source_fields();
            if let Condition::OnlyIf(predicate) = mapping.condition() {
                referenced.push(predicate.field.as_str());
            }
            for field in referenced {
                if !available.contains(field) {
                    missing.insert(field.to_string());
                }
            }
        }
        missing.into_iter().collect()
    }
}

/// Applies `mappings` to every record in `records`.
///
/// Only mapped target fields appear in the output; unmapped source fields are
/// not passed through.
pub fn apply_mappings(records: &[Record], mappings: &MappingSet) -> Vec<Record> {
    records
        .iter()
        .map(|record| map_record(record, mappings))
        .collect()
}

/// Builds the output record for a single source record.
pub fn map_record(record: &Record, mappings: &MappingSet) -> Record {
    let mut out = Record::new();
    for mapping in mappings {
        if let Some(value) = apply_mapping(record, mapping) {
            out.insert(mapping.target_field(), value);
        }
    }
    out
}

/// Value of one mapping for one record, or `None` when its condition does
/// not hold for the record.
pub fn apply_mapping(record: &Record, mapping: &Mapping) -> Option<String> {
    if !evaluate_condition(mapping.condition(), record) {
        return None;
    }
    Some(compute_value(mapping.kind(), record))
}

/// Evaluates a condition. Absent fields compare as the empty string.
pub fn evaluate_condition(condition: &Condition, record: &Record) -> bool {
    match condition {
        Condition::All => true,
        Condition::OnlyIf(predicate) => {
            let operand = record.value_or_empty(&predicate.field);
            predicate.operator.evaluate(operand, &predicate.value)
        }
    }
}

/// Computes a mapping kind's value for one record.
pub fn compute_value(kind: &MappingKind, record: &Record) -> String {
    match kind {
        MappingKind::Rename { source_field } => record.value_or_empty(source_field).to_string(),
        MappingKind::Static { value } => value.clone(),
        MappingKind::Combine { fields, separator } => fields
            .iter()
            .map(|field| record.value_or_empty(field.as_str()))
            .collect::<Vec<_>>()
            .join(separator.as_str()),
        MappingKind::Empty => String::new(),
    }
}
