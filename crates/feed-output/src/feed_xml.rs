//! Feed XML output generation.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result, bail};
use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use tracing::{debug, info, warn};

use feed_model::{ChannelField, Record, is_xml_name};

use crate::common::ensure_parent_dir;

pub const ROOT_TAG: &str = "items";
pub const ITEM_TAG: &str = "item";

/// Options for feed XML output.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct XmlOptions {
    /// Spaces per nesting level; `None` writes everything on one line.
    pub indent: Option<usize>,
    /// Emit an `<?xml version="1.0" encoding="UTF-8"?>` declaration.
    pub declaration: bool,
}

impl XmlOptions {
    pub fn pretty() -> Self {
        Self {
            indent: Some(2),
            declaration: true,
        }
    }
}

/// Serializes records as an `<items>` document.
///
/// Without a channel schema every key of a record becomes a child element,
/// in the record's key order. With a schema the schema's fields are walked
/// in order: a field is written when the record has a non-empty value for
/// it or when the field is required (written empty). Records left without
/// children are still written, as `<item/>`.
///
/// Returns an empty string, and logs a warning, when a field name cannot be
/// written as an element name. Use [`generate_xml_with`] to get the error.
pub fn generate_xml(records: &[Record], schema: Option<&[ChannelField]>) -> String {
    generate_xml_with(records, schema, &XmlOptions::default()).unwrap_or_else(|error| {
        warn!(%error, "feed not serialized");
        String::new()
    })
}

/// [`generate_xml`] with explicit formatting options.
///
/// Either the complete document is returned or nothing is.
pub fn generate_xml_with(
    records: &[Record],
    schema: Option<&[ChannelField]>,
    options: &XmlOptions,
) -> Result<String> {
    let mut buffer = Vec::new();
    write_feed_xml(&mut buffer, records, schema, options)?;
    Ok(String::from_utf8(buffer)?)
}

/// Writes the feed document into `out`.
pub fn write_feed_xml<W: Write>(
    out: W,
    records: &[Record],
    schema: Option<&[ChannelField]>,
    options: &XmlOptions,
) -> Result<()> {
    check_element_names(records, schema)?;
    let mut xml = match options.indent {
        Some(width) if width > 0 => Writer::new_with_indent(out, b' ', width),
        _ => Writer::new(out),
    };

    if options.declaration {
        xml.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
    }

    if records.is_empty() {
        xml.write_event(Event::Empty(BytesStart::new(ROOT_TAG)))?;
        return Ok(());
    }

    xml.write_event(Event::Start(BytesStart::new(ROOT_TAG)))?;
    let mut empty_items = 0usize;
    for record in records {
        let children = item_children(record, schema);
        if children.is_empty() {
            empty_items += 1;
            xml.write_event(Event::Empty(BytesStart::new(ITEM_TAG)))?;
            continue;
        }
        xml.write_event(Event::Start(BytesStart::new(ITEM_TAG)))?;
        for (name, value) in children {
            xml.write_event(Event::Start(BytesStart::new(name)))?;
            // An empty text event keeps `<id></id>` on one line when indenting.
            xml.write_event(Event::Text(BytesText::new(value)))?;
            xml.write_event(Event::End(BytesEnd::new(name)))?;
        }
        xml.write_event(Event::End(BytesEnd::new(ITEM_TAG)))?;
    }
    xml.write_event(Event::End(BytesEnd::new(ROOT_TAG)))?;

    debug!(
        items = records.len(),
        empty_items,
        constrained = schema.is_some(),
        "serialized feed"
    );
    Ok(())
}

/// Writes the feed document to `output_path`, creating parent directories.
pub fn write_feed_file(
    output_path: &Path,
    records: &[Record],
    schema: Option<&[ChannelField]>,
    options: &XmlOptions,
) -> Result<()> {
    check_element_names(records, schema)?;
    ensure_parent_dir(output_path)?;
    let file =
        File::create(output_path).with_context(|| format!("create {}", output_path.display()))?;
    let mut writer = BufWriter::new(file);
    write_feed_xml(&mut writer, records, schema, options)
        .with_context(|| format!("write {}", output_path.display()))?;
    writer
        .flush()
        .with_context(|| format!("flush {}", output_path.display()))?;
    info!(path = %output_path.display(), items = records.len(), "wrote feed");
    Ok(())
}

/// Fails before anything is written if a child element name is not an XML name.
fn check_element_names(records: &[Record], schema: Option<&[ChannelField]>) -> Result<()> {
    let invalid = match schema {
        Some(fields) => fields
            .iter()
            .map(|field| field.name.as_str())
            .find(|name| !is_xml_name(name)),
        None => records
            .iter()
            .flat_map(Record::field_names)
            .find(|name| !is_xml_name(name)),
    };
    if let Some(name) = invalid {
        bail!("field name '{name}' is not a valid XML element name");
    }
    Ok(())
}

fn item_children<'a>(
    record: &'a Record,
    schema: Option<&'a [ChannelField]>,
) -> Vec<(&'a str, &'a str)> {
    match schema {
        None => record.iter().collect(),
        Some(fields) => fields
            .iter()
            .filter_map(|field| {
                let value = record.get(&field.name).filter(|v| !v.is_empty());
                match value {
                    Some(value) => Some((field.name.as_str(), value)),
                    None if field.is_required() => Some((field.name.as_str(), "")),
                    None => None,
                }
            })
            .collect(),
    }
}
