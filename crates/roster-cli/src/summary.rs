use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::{UTF8_FULL, UTF8_FULL_CONDENSED};
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use roster_cli::export::MappedSummary;
use roster_map::{ConfidenceLevel, ConfidenceThresholds, KnowledgeBase, RankedColumn};
use roster_model::{Confidence, Detection, FieldKind, MatchType};

use crate::commands::{ClassifyResult, ConfirmResult};

/// Examples shown per column in the ranking table.
const EXAMPLES_SHOWN: usize = 3;

pub fn print_classification(result: &ClassifyResult) {
    println!("Columns: {}", result.columns.len());

    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Field"),
        header_cell("Label"),
        header_cell("Column"),
        header_cell("Match"),
        header_cell("Confidence"),
    ]);
    apply_summary_table_style(&mut table);
    align_column(&mut table, 4, CellAlignment::Right);

    for field in FieldKind::ALL {
        let detection = result.report.detection_for(field);
        table.add_row(vec![
            Cell::new(field.as_str()),
            Cell::new(field.label()),
            match detection {
                Some(detection) => Cell::new(&detection.column_name).add_attribute(Attribute::Bold),
                None => dim_cell("-"),
            },
            match detection {
                Some(detection) => match_cell(Some(detection.match_type)),
                None => dim_cell("-"),
            },
            detection_confidence_cell(detection),
        ]);
    }
    println!("{table}");

    let unmatched = result.report.unmatched_fields().len();
    println!(
        "Matched {} of {} fields ({} unmatched)",
        FieldKind::ALL.len() - unmatched,
        FieldKind::ALL.len(),
        unmatched
    );
    if result.learned > 0 {
        println!("Learned {} new mapping(s)", result.learned);
    }
}

pub fn print_ranking(ranked: &[RankedColumn]) {
    let thresholds = ConfidenceThresholds::default();
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Column"),
        header_cell("NPI"),
        header_cell("Confidence"),
        header_cell("Level"),
        header_cell("Match"),
        header_cell("Examples"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Center);
    align_column(&mut table, 2, CellAlignment::Right);

    for column in ranked {
        let examples: Vec<String> = column
            .examples
            .iter()
            .take(EXAMPLES_SHOWN)
            .map(ToString::to_string)
            .collect();
        table.add_row(vec![
            if column.is_identifier_column {
                Cell::new(&column.name)
                    .fg(Color::Green)
                    .add_attribute(Attribute::Bold)
            } else {
                Cell::new(&column.name)
            },
            if column.is_identifier_column {
                Cell::new("✓").fg(Color::Green)
            } else {
                dim_cell("")
            },
            confidence_cell(column.confidence),
            level_cell(thresholds.categorize(column.confidence)),
            match_cell(column.match_type),
            dim_cell(examples.join(", ")),
        ]);
    }
    println!("{table}");
}

pub fn print_mapped(summary: &MappedSummary) {
    println!(
        "Wrote {} row(s) with {} column(s) to {}",
        summary.rows,
        summary.columns,
        summary.output.display()
    );
    if let Some(column) = &summary.split_column {
        println!("Split names from {column} into First Name and Last Name");
    }
    for column in &summary.missing_columns {
        println!("Column {column} not found in input; left blank");
    }
}

pub fn print_knowledge(profile: &str, store: &KnowledgeBase) {
    println!("Profile: {profile}");
    if store.is_empty() {
        println!("No learned mappings");
        return;
    }
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Field"),
        header_cell("Column"),
        header_cell("Confidence"),
        header_cell("Match"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 2, CellAlignment::Right);

    for (field, entries) in store.categories() {
        for entry in entries {
            table.add_row(vec![
                Cell::new(field.as_str()),
                Cell::new(&entry.normalized_name),
                Cell::new(entry.confidence),
                match_cell(Some(entry.match_type)),
            ]);
        }
    }
    println!("{table}");
    println!("{} mapping(s)", store.len());
}

pub fn print_confirmation(result: &ConfirmResult) {
    if result.added {
        println!("Recorded {} -> {}", result.column, result.field);
    } else {
        println!("{} is already known as {}", result.column, result.field);
    }
}

pub fn print_fields(fields: &[FieldKind]) {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Key"),
        header_cell("Label"),
        header_cell("Detection"),
    ]);
    apply_table_style(&mut table);
    for field in fields {
        let method = if field.is_identifier() {
            "full-scan scoring"
        } else {
            "first matching column"
        };
        table.add_row(vec![
            Cell::new(field.as_str()),
            Cell::new(field.label()),
            dim_cell(method),
        ]);
    }
    println!("{table}");
}

pub fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn apply_summary_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::DynamicFullWidth)
        .set_width(140);
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

fn match_cell(match_type: Option<MatchType>) -> Cell {
    match match_type {
        Some(MatchType::KnowledgeBase) => Cell::new(MatchType::KnowledgeBase).fg(Color::Magenta),
        Some(MatchType::ExactHeader) => Cell::new(MatchType::ExactHeader).fg(Color::Green),
        Some(match_type) => Cell::new(match_type),
        None => dim_cell("-"),
    }
}

fn detection_confidence_cell(detection: Option<&Detection>) -> Cell {
    match detection.and_then(|detection| detection.confidence) {
        Some(confidence) => confidence_cell(confidence),
        None => dim_cell("-"),
    }
}

fn confidence_cell(confidence: Confidence) -> Cell {
    let color = match ConfidenceThresholds::default().categorize(confidence) {
        Some(ConfidenceLevel::High) => Color::Green,
        Some(ConfidenceLevel::Medium) => Color::Yellow,
        Some(ConfidenceLevel::Low) => Color::Red,
        None => Color::DarkGrey,
    };
    Cell::new(confidence).fg(color)
}

fn level_cell(level: Option<ConfidenceLevel>) -> Cell {
    match level {
        Some(level) => Cell::new(level.description()),
        None => dim_cell("-"),
    }
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}
