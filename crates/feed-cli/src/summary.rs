//! Table rendering for command output.

use std::path::Path;

use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use feed_channels::ChannelRegistry;
use feed_map::PreviewRow;
use feed_model::{Comment, FeedData, Shop};

use feed_cli::pipeline::MapOutcome;

/// Display text for a missing preview value.
const NOT_AVAILABLE: &str = "N/A";

pub fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

pub fn channels_table(registry: &ChannelRegistry) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Channel"),
        header_cell("Name"),
        header_cell("Required"),
        header_cell("Optional"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 2, CellAlignment::Right);
    align_column(&mut table, 3, CellAlignment::Right);
    for channel in registry.channels() {
        table.add_row(vec![
            id_cell(&channel.id),
            Cell::new(&channel.name),
            Cell::new(channel.required_fields().count()),
            count_cell(channel.optional_fields().count()),
        ]);
    }
    table
}

pub fn schema_table(feed: &FeedData) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Field"),
        header_cell("Required"),
        header_cell("Populated"),
        header_cell("Description"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Center);
    align_column(&mut table, 2, CellAlignment::Right);
    for entry in &feed.schema {
        let populated = feed
            .records
            .iter()
            .filter(|record| record.has_value(&entry.name))
            .count();
        table.add_row(vec![
            id_cell(&entry.name),
            if entry.required {
                Cell::new("✓").fg(Color::Green).add_attribute(Attribute::Bold)
            } else {
                dim_cell("-")
            },
            Cell::new(format!("{populated}/{}", feed.len())),
            entry
                .help_text
                .as_deref()
                .map_or_else(|| dim_cell("-"), Cell::new),
        ]);
    }
    table
}

pub fn preview_table(rows: &[PreviewRow]) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("ID"),
        header_cell("Product"),
        header_cell("Original"),
        header_cell("Mapped"),
    ]);
    apply_table_style(&mut table);
    for row in rows {
        table.add_row(vec![
            id_cell(&row.record_id),
            Cell::new(&row.record_label),
            value_cell(row.original_value.as_deref()),
            value_cell(row.mapped_value.as_deref()),
        ]);
    }
    table
}

pub fn shops_table(shops: &[&Shop]) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("ID"),
        header_cell("Name"),
        header_cell("Products"),
        header_cell("Channels"),
        header_cell("Comments"),
        header_cell("Locked"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 2, CellAlignment::Right);
    align_column(&mut table, 4, CellAlignment::Right);
    align_column(&mut table, 5, CellAlignment::Center);
    for shop in shops {
        let channels = shop
            .channels
            .iter()
            .map(|c| {
                if shop.is_channel_mapped(&c.id) {
                    format!("{} ✓", c.id)
                } else {
                    c.id.clone()
                }
            })
            .collect::<Vec<_>>()
            .join(", ");
        table.add_row(vec![
            id_cell(&shop.id),
            Cell::new(&shop.name),
            Cell::new(shop.product_count),
            if channels.is_empty() {
                dim_cell("-")
            } else {
                Cell::new(channels)
            },
            count_cell(shop.comments.len()),
            if shop.is_locked {
                Cell::new("locked").fg(Color::Yellow)
            } else {
                dim_cell("-")
            },
        ]);
    }
    table
}

pub fn comments_table<'a>(comments: impl IntoIterator<Item = &'a Comment>) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("ID"),
        header_cell("When"),
        header_cell("Field"),
        header_cell("Comment"),
    ]);
    apply_table_style(&mut table);
    for comment in comments {
        table.add_row(vec![
            id_cell(&comment.id),
            Cell::new(comment.timestamp.format("%Y-%m-%d %H:%M")),
            comment
                .field
                .as_deref()
                .map_or_else(|| dim_cell("-"), Cell::new),
            Cell::new(&comment.text),
        ]);
    }
    table
}

pub fn print_map_outcome(outcome: &MapOutcome, channel: Option<&str>, path: &Path) {
    println!("Channel: {}", channel.unwrap_or("(none)"));
    println!("Output: {}", path.display());
    println!(
        "Records: {} mapped from {} source records using {} mappings",
        outcome.mapped_records, outcome.source_records, outcome.mappings
    );
    if !outcome.unresolved_sources.is_empty() {
        println!(
            "Source fields not in feed: {}",
            outcome.unresolved_sources.join(", ")
        );
    }
    if !outcome.unmapped_required.is_empty() {
        println!(
            "Required fields without mapping: {}",
            outcome.unmapped_required.join(", ")
        );
    }
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn id_cell(value: &str) -> Cell {
    Cell::new(value)
        .fg(Color::Blue)
        .add_attribute(Attribute::Bold)
}

fn value_cell(value: Option<&str>) -> Cell {
    match value {
        Some(text) => Cell::new(text),
        None => dim_cell(NOT_AVAILABLE),
    }
}

fn count_cell(count: usize) -> Cell {
    if count > 0 {
        Cell::new(count)
    } else {
        dim_cell(count)
    }
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}
