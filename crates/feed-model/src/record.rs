#![deny(unsafe_code)]

use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::schema::SchemaEntry;

/// One flat product record: field name to text value.
///
/// Field names are unique within a record. Fields keep the order in which
/// they were first inserted, which for parsed records is document order.
#[derive(Debug, Clone, Default)]
pub struct Record(Vec<(String, String)>);

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.position(field).map(|index| self.0[index].1.as_str())
    }

    /// Value of `field`, or the empty string when the field is absent.
    pub fn value_or_empty(&self, field: &str) -> &str {
        self.get(field).unwrap_or_default()
    }

    /// True when the field is present with a non-empty value.
    pub fn has_value(&self, field: &str) -> bool {
        self.get(field).is_some_and(|value| !value.is_empty())
    }

    pub fn contains(&self, field: &str) -> bool {
        self.position(field).is_some()
    }

    /// Sets a field, returning the previous value if one existed.
    ///
    /// A known field is updated in place and keeps its position.
    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<String>) -> Option<String> {
        let field = field.into();
        let value = value.into();
        match self.position(&field) {
            Some(index) => Some(std::mem::replace(&mut self.0[index].1, value)),
            None => {
                self.0.push((field, value));
                None
            }
        }
    }

    pub fn remove(&mut self, field: &str) -> Option<String> {
        self.position(field).map(|index| self.0.remove(index).1)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> Fields<'_> {
        Fields(self.0.iter())
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(name, _)| name.as_str())
    }

    pub fn into_fields(self) -> Vec<(String, String)> {
        self.0
    }

    fn position(&self, field: &str) -> Option<usize> {
        self.0.iter().position(|(name, _)| name == field)
    }
}

/// Records are equal when they hold the same fields with the same values,
/// regardless of field order.
impl PartialEq for Record {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().all(|(field, value)| other.get(field) == Some(value))
    }
}

impl Eq for Record {}

/// Fields of a [`Record`] in insertion order.
#[derive(Debug, Clone)]
pub struct Fields<'a>(std::slice::Iter<'a, (String, String)>);

impl<'a> Iterator for Fields<'a> {
    type Item = (&'a str, &'a str);

    fn next(&mut self) -> Option<Self::Item> {
        self.0
            .next()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.0.size_hint()
    }
}

impl ExactSizeIterator for Fields<'_> {}

impl<K, V> FromIterator<(K, V)> for Record
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut record = Self::new();
        for (field, value) in iter {
            record.insert(field, value);
        }
        record
    }
}

impl<'a> IntoIterator for &'a Record {
    type Item = (&'a str, &'a str);
    type IntoIter = Fields<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (field, value) in self {
            map.serialize_entry(field, value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Record {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct RecordVisitor;

        impl<'de> Visitor<'de> for RecordVisitor {
            type Value = Record;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of field names to string values")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Record, A::Error> {
                let mut record = Record::new();
                while let Some((field, value)) = access.next_entry::<String, String>()? {
                    record.insert(field, value);
                }
                Ok(record)
            }
        }

        deserializer.deserialize_map(RecordVisitor)
    }
}

/// A parsed source feed: records in document order plus the inferred schema.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedData {
    pub records: Vec<Record>,
    pub schema: Vec<SchemaEntry>,
}

impl FeedData {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn schema_entry(&self, name: &str) -> Option<&SchemaEntry> {
        self.schema.iter().find(|entry| entry.name == name)
    }
}
