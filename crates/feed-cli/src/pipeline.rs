//! Pipeline stages shared by the commands.
//!
//! Each stage either returns a complete result or an error before the next
//! stage runs:
//!
//! 1. **Ingest**: read and parse the source feed
//! 2. **Map**: apply a mapping set snapshot to the records
//! 3. **Output**: serialize the mapped records, optionally against a channel schema

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, anyhow, bail};
use serde::Deserialize;
use tracing::{debug, info, info_span, trace, warn};

use feed_channels::ChannelRegistry;
use feed_map::MappingEngine;
use feed_model::{ChannelField, FeedData, MappingSet, Record, Shop};
use feed_output::{XmlOptions, generate_xml_with};

use crate::logging::redact_value;

/// On-disk encoding of a mapping set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MappingFormat {
    /// A JSON array of mappings.
    Json,
    /// A TOML document with `[[mapping]]` tables.
    Toml,
}

impl MappingFormat {
    pub fn from_path(path: &Path) -> Result<Self> {
        match path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase)
            .as_deref()
        {
            Some("json") => Ok(Self::Json),
            Some("toml") => Ok(Self::Toml),
            _ => bail!(
                "unsupported mapping file {} (expected .json or .toml)",
                path.display()
            ),
        }
    }
}

#[derive(Deserialize)]
struct TomlMappingFile {
    #[serde(default)]
    mapping: MappingSet,
}

pub fn parse_mappings(text: &str, format: MappingFormat) -> Result<MappingSet> {
    let mappings: MappingSet = match format {
        MappingFormat::Json => serde_json::from_str(text)?,
        MappingFormat::Toml => toml::from_str::<TomlMappingFile>(text)?.mapping,
    };
    Ok(mappings)
}

pub fn load_mappings(path: &Path) -> Result<MappingSet> {
    let format = MappingFormat::from_path(path)?;
    let text =
        fs::read_to_string(path).with_context(|| format!("read mappings {}", path.display()))?;
    let mappings =
        parse_mappings(&text, format).with_context(|| format!("parse mappings {}", path.display()))?;
    debug!(path = %path.display(), mappings = mappings.len(), "loaded mappings");
    Ok(mappings)
}

/// Stage 1: read and parse a feed file.
pub fn ingest(path: &Path) -> Result<FeedData> {
    let span = info_span!("ingest", path = %path.display());
    let _guard = span.enter();
    let feed = feed_ingest::read_feed(path).map_err(|error| {
        debug!(%error, "feed rejected");
        let category = error.category();
        anyhow::Error::new(error).context(format!("{category}: {}", path.display()))
    })?;
    info!(records = feed.len(), fields = feed.schema.len(), "ingested feed");
    Ok(feed)
}

/// Parses a feed held in memory, such as a shop's stored upload.
pub fn ingest_str(xml: &str) -> Result<FeedData> {
    let span = info_span!("ingest");
    let _guard = span.enter();
    let feed = feed_ingest::parse_feed(xml).map_err(|error| {
        debug!(%error, "stored feed rejected");
        let category = error.category();
        anyhow::Error::new(error).context(category)
    })?;
    info!(records = feed.len(), fields = feed.schema.len(), "ingested feed");
    Ok(feed)
}

/// Result of the map stage.
#[derive(Debug, Clone)]
pub struct MapStage {
    pub records: Vec<Record>,
    /// Referenced source fields that never occur in the feed.
    pub unresolved_sources: Vec<String>,
}

/// Stage 2: apply a mapping set.
pub fn map(feed: &FeedData, mappings: &MappingSet) -> MapStage {
    let span = info_span!("map", mappings = mappings.len());
    let _guard = span.enter();

    let engine = MappingEngine::new(mappings.clone());
    let available = feed_map::field_options(&feed.records);
    let unresolved_sources = engine.unresolved_sources(available.iter().map(String::as_str));
    for field in &unresolved_sources {
        warn!(field = %field, "mapping references a field that is not in the feed");
    }

    let records = engine.apply(&feed.records);
    for (index, record) in records.iter().enumerate() {
        for (field, value) in record.iter() {
            trace!(record = index, field, value = redact_value(value), "mapped value");
        }
    }
    info!(records = records.len(), "mapped records");
    MapStage {
        records,
        unresolved_sources,
    }
}

/// Required channel fields without a mapping.
pub fn unmapped_required(schema: &[ChannelField], mappings: &MappingSet) -> Vec<String> {
    schema
        .iter()
        .filter(|field| field.is_required() && !mappings.contains(&field.name))
        .map(|field| field.name.clone())
        .collect()
}

/// Stage 3: serialize mapped records.
pub fn output(
    records: &[Record],
    schema: Option<&[ChannelField]>,
    options: &XmlOptions,
) -> Result<String> {
    let span = info_span!("output", constrained = schema.is_some());
    let _guard = span.enter();
    let xml = generate_xml_with(records, schema, options).context("serialize feed")?;
    info!(bytes = xml.len(), "serialized feed");
    Ok(xml)
}

/// Summary of a complete parse, map and serialize run.
#[derive(Debug, Clone)]
pub struct MapOutcome {
    pub source_records: usize,
    pub mapped_records: usize,
    pub mappings: usize,
    pub unresolved_sources: Vec<String>,
    pub unmapped_required: Vec<String>,
    pub xml: String,
}

/// Runs the map and output stages over a parsed feed.
pub fn run_map(
    feed: &FeedData,
    mappings: &MappingSet,
    schema: Option<&[ChannelField]>,
    options: &XmlOptions,
) -> Result<MapOutcome> {
    let unmapped_required = schema
        .map(|schema| unmapped_required(schema, mappings))
        .unwrap_or_default();
    for field in &unmapped_required {
        warn!(field = %field, "required channel field has no mapping");
    }
    let stage = map(feed, mappings);
    let xml = output(&stage.records, schema, options)?;
    Ok(MapOutcome {
        source_records: feed.len(),
        mapped_records: stage.records.len(),
        mappings: mappings.len(),
        unresolved_sources: stage.unresolved_sources,
        unmapped_required,
        xml,
    })
}

/// Applies a shop's saved mappings to its stored feed.
///
/// The internal mapping set, when not empty, is applied first. With a
/// channel, the channel's saved mapping set is applied to that result and
/// the channel schema constrains the output; without one the records are
/// written as they are.
pub fn export_shop_feed(
    shop: &Shop,
    registry: &ChannelRegistry,
    channel: Option<&str>,
    options: &XmlOptions,
) -> Result<String> {
    let span = info_span!("export", shop = %shop.id, channel = channel.unwrap_or("-"));
    let _guard = span.enter();

    let xml = shop
        .xml_content
        .as_deref()
        .ok_or_else(|| anyhow!("shop {} has no uploaded feed", shop.name))?;
    let mut feed = ingest_str(xml)?;
    if !shop.internal_mappings.is_empty() {
        feed.records = map(&feed, &shop.internal_mappings).records;
    }

    let Some(channel_id) = channel else {
        return output(&feed.records, None, options);
    };
    if shop.channel(channel_id).is_none() {
        bail!("channel {channel_id} is not attached to shop {}", shop.name);
    }
    let mappings = shop
        .channel_mappings
        .get(channel_id)
        .ok_or_else(|| anyhow!("channel {channel_id} has no saved mappings"))?;
    let schema = registry.schema(channel_id)?;
    Ok(run_map(&feed, mappings, Some(schema), options)?.xml)
}
