use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use simstore_io::{EntryInfo, EntryKind};

use crate::commands::{Hashed, Inspection, Written};

pub fn print_inspection(inspection: &Inspection) {
    println!("File: {}", inspection.path.display());
    println!("Format: {}", inspection.format);
    println!("Node: {} at {}", inspection.node_type, inspection.address);
    if !inspection.entries.is_empty() {
        println!("{}", entry_table(&inspection.entries));
    }
    if !inspection.markers.is_empty() {
        println!("{}", marker_table(&inspection.markers));
        println!(
            "{} array(s) are referenced without data; only .hdf5 files keep arrays.",
            inspection.markers.len()
        );
    }
}

pub fn print_written(written: &Written) {
    match written.node_type {
        Some(node_type) => println!(
            "Wrote {node_type} to {} ({} bytes)",
            written.path.display(),
            written.bytes
        ),
        None => println!(
            "Wrote {} ({}, {} bytes)",
            written.path.display(),
            written.format,
            written.bytes
        ),
    }
}

pub fn print_hash(hashed: &Hashed) {
    println!("{}  {} {}", hashed.hash, hashed.node_type, hashed.address);
}

/// One row per container entry: key, kind, array kind, shape, size.
pub fn entry_table(entries: &[EntryInfo]) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Key"),
        header_cell("Entry"),
        header_cell("Array kind"),
        header_cell("Shape"),
        header_cell("Bytes"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 4, CellAlignment::Right);
    let mut total = 0u64;
    for entry in entries {
        total += entry.bytes;
        let key = match entry.kind {
            EntryKind::Document => Cell::new(&entry.key).fg(Color::Cyan),
            EntryKind::Array | EntryKind::Attachment => Cell::new(&entry.key),
        };
        table.add_row(vec![
            key,
            Cell::new(entry.kind.label()),
            entry
                .array_kind
                .as_deref()
                .map_or_else(|| dim_cell("-"), Cell::new),
            entry
                .shape
                .as_deref()
                .map_or_else(|| dim_cell("-"), |shape| Cell::new(format_shape(shape))),
            Cell::new(entry.bytes),
        ]);
    }
    table.add_row(vec![
        Cell::new("TOTAL")
            .fg(Color::Cyan)
            .add_attribute(Attribute::Bold),
        dim_cell("-"),
        dim_cell("-"),
        dim_cell("-"),
        Cell::new(total).add_attribute(Attribute::Bold),
    ]);
    table
}

fn marker_table(markers: &[(simstore_model::Address, String)]) -> Table {
    let mut table = Table::new();
    table.set_header(vec![header_cell("Address"), header_cell("Marker")]);
    apply_table_style(&mut table);
    for (address, marker) in markers {
        table.add_row(vec![
            Cell::new(address),
            Cell::new(marker).fg(Color::Yellow),
        ]);
    }
    table
}

fn format_shape(shape: &[usize]) -> String {
    let dims: Vec<String> = shape.iter().map(usize::to_string).collect();
    format!("({})", dims.join(", "))
}

fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
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

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}
