use tracing::warn;

use crate::acquire::{DocumentSource, SourceKind, extract_layout_text};
use crate::config::Capabilities;
use crate::model::{AcquiredDocument, ItemRow};
use crate::text;

use super::TableStrategy;
use super::grid::{self, ColumnKind};

/// Structural-table reader: two passes over layout-preserving text, a ruled
/// pass (explicit `|` separators) then a text-alignment pass, restricted to
/// the order-details region when locatable.
pub(crate) struct LayoutTableStrategy {
    capabilities: Capabilities,
    max_pages: Option<usize>,
}

impl LayoutTableStrategy {
    pub(crate) fn new(capabilities: Capabilities, max_pages: Option<usize>) -> Self {
        Self {
            capabilities,
            max_pages,
        }
    }
}

impl TableStrategy for LayoutTableStrategy {
    fn name(&self) -> &'static str {
        "layout-table"
    }

    fn extract(&self, source: &DocumentSource, _acquired: &AcquiredDocument) -> Vec<ItemRow> {
        if source.kind != SourceKind::Pdf {
            return Vec::new();
        }

        let layout_text = match extract_layout_text(&self.capabilities, &source.path, self.max_pages)
        {
            Ok(layout_text) => layout_text,
            Err(error) => {
                warn!(error = %error, "layout text extraction failed");
                return Vec::new();
            }
        };

        parse_layout_tables(&layout_text)
    }
}

pub(crate) fn parse_layout_tables(layout_text: &str) -> Vec<ItemRow> {
    let lines = layout_text.lines().collect::<Vec<&str>>();
    let region = restrict_region(&lines);

    let rows = ruled_pass(region);
    if !rows.is_empty() {
        return rows;
    }
    alignment_pass(region)
}

/// Text-alignment pass over arbitrary plain text, shared with the item
/// extraction fallback ladder.
pub(crate) fn aligned_rows_from_text(plain_text: &str) -> Vec<ItemRow> {
    let lines = plain_text.lines().collect::<Vec<&str>>();
    alignment_pass(&lines)
}

fn restrict_region<'a>(lines: &'a [&'a str]) -> &'a [&'a str] {
    let Some(start) = lines
        .iter()
        .position(|line| line.to_lowercase().contains("order details"))
    else {
        return lines;
    };

    let end = lines[start + 1..]
        .iter()
        .position(|line| grid::is_totals_marker_line(line))
        .map(|offset| start + 1 + offset)
        .unwrap_or(lines.len());

    &lines[start + 1..end]
}

fn split_ruled_cells(line: &str) -> Vec<String> {
    let mut cells = line
        .split('|')
        .map(|cell| cell.trim().to_string())
        .collect::<Vec<String>>();
    if cells.first().map(|cell| cell.is_empty()).unwrap_or(false) {
        cells.remove(0);
    }
    if cells.last().map(|cell| cell.is_empty()).unwrap_or(false) {
        cells.pop();
    }
    cells
}

fn is_rule_separator(cells: &[String]) -> bool {
    cells.iter().all(|cell| {
        cell.chars()
            .all(|character| matches!(character, '-' | '=' | '+' | ' '))
    })
}

/// Map header cells to logical columns. A header is accepted only when it has
/// product, qty and at least one of price/subtotal.
fn header_cell_map(cells: &[String]) -> Option<Vec<(usize, ColumnKind)>> {
    let mut claimed: Vec<ColumnKind> = Vec::new();
    let mut map = Vec::new();

    for (index, cell) in cells.iter().enumerate() {
        let Some(kind) = cell_kind(cell) else {
            continue;
        };
        if claimed.contains(&kind) {
            continue;
        }
        claimed.push(kind);
        map.push((index, kind));
    }

    let has_product = claimed.contains(&ColumnKind::Product);
    let has_qty = claimed.contains(&ColumnKind::Qty);
    let has_value = claimed.contains(&ColumnKind::Price) || claimed.contains(&ColumnKind::Subtotal);
    if has_product && has_qty && has_value {
        Some(map)
    } else {
        None
    }
}

fn cell_kind(cell: &str) -> Option<ColumnKind> {
    let lowered = cell.trim().to_lowercase();
    if lowered.is_empty() {
        return None;
    }
    if matches!(lowered.as_str(), "no" | "no." | "#" | "sn" | "s/n") {
        return Some(ColumnKind::No);
    }
    if lowered.contains("variation") || lowered.contains("variant") || lowered.contains("option") {
        return Some(ColumnKind::Variation);
    }
    if lowered.contains("qty") || lowered.contains("quantity") || lowered.contains("pcs") {
        return Some(ColumnKind::Qty);
    }
    if lowered.contains("price")
        || lowered.contains("unit")
        || lowered.contains("cost")
        || lowered.contains("rate")
    {
        return Some(ColumnKind::Price);
    }
    if lowered.contains("subtotal")
        || lowered.contains("sub-total")
        || lowered.contains("amount")
        || lowered.contains("total")
        || lowered.contains("net")
    {
        return Some(ColumnKind::Subtotal);
    }
    if lowered.contains("product")
        || lowered.contains("item")
        || lowered.contains("description")
        || lowered.contains("details")
    {
        return Some(ColumnKind::Product);
    }
    None
}

enum ParsedLine {
    Row(ItemRow),
    Continuation(String),
    Nothing,
}

fn ruled_pass(lines: &[&str]) -> Vec<ItemRow> {
    let mut header: Option<Vec<(usize, ColumnKind)>> = None;
    let mut rows: Vec<ItemRow> = Vec::new();

    for line in lines {
        if line.matches('|').count() < 2 {
            continue;
        }
        let cells = split_ruled_cells(line);
        if cells.is_empty() || is_rule_separator(&cells) {
            continue;
        }

        match &header {
            None => {
                if let Some(map) = header_cell_map(&cells) {
                    header = Some(map);
                }
            }
            Some(map) => {
                if grid::is_totals_marker_line(line) {
                    break;
                }
                match mapped_row(&cells, map) {
                    ParsedLine::Row(row) => rows.push(row),
                    ParsedLine::Continuation(extra) => {
                        if let Some(last) = rows.last_mut() {
                            last.description.push(' ');
                            last.description.push_str(&extra);
                        }
                    }
                    ParsedLine::Nothing => {}
                }
            }
        }
    }

    rows
}

fn mapped_row(cells: &[String], map: &[(usize, ColumnKind)]) -> ParsedLine {
    let mut row = ItemRow::default();

    for (index, kind) in map {
        let Some(cell) = cells.get(*index) else {
            continue;
        };
        let cell = cell.trim();
        if cell.is_empty() {
            continue;
        }
        match kind {
            ColumnKind::No => row.sequence_number = first_integer(cell),
            ColumnKind::Product => row.description = cell.to_string(),
            ColumnKind::Variation => row.variation = Some(cell.to_string()),
            ColumnKind::Price => row.unit_price = text::parse_money(cell),
            ColumnKind::Qty => row.quantity = first_integer(cell),
            ColumnKind::Subtotal => row.line_subtotal = text::parse_money(cell),
        }
    }

    if row.is_acceptable() {
        return ParsedLine::Row(row);
    }

    let leftover = cells
        .iter()
        .map(|cell| cell.trim())
        .filter(|cell| !cell.is_empty())
        .collect::<Vec<&str>>()
        .join(" ");
    if leftover.is_empty() {
        ParsedLine::Nothing
    } else {
        ParsedLine::Continuation(leftover)
    }
}

fn first_integer(cell: &str) -> Option<i64> {
    let digits = cell
        .chars()
        .skip_while(|character| !character.is_ascii_digit())
        .take_while(|character| character.is_ascii_digit())
        .collect::<String>();
    if digits.is_empty() || digits.len() > 4 {
        return None;
    }
    let value = digits.parse::<i64>().ok()?;
    if (1..=9999).contains(&value) { Some(value) } else { None }
}

/// Character offsets of cells split on runs of two or more spaces.
fn cells_with_offsets(line: &str) -> Vec<(usize, String)> {
    let mut cells = Vec::new();
    let mut current = String::new();
    let mut start = 0usize;
    let mut gap = 0usize;

    for (offset, character) in line.chars().enumerate() {
        if character == ' ' || character == '\t' {
            gap += if character == '\t' { 2 } else { 1 };
            if gap >= 2 && !current.is_empty() {
                cells.push((start, current.trim().to_string()));
                current = String::new();
            }
            if gap < 2 && !current.is_empty() {
                current.push(' ');
            }
            continue;
        }
        if current.is_empty() {
            start = offset;
        }
        gap = 0;
        current.push(character);
    }
    if !current.is_empty() {
        cells.push((start, current.trim().to_string()));
    }

    cells
        .into_iter()
        .filter(|(_, cell)| !cell.is_empty())
        .collect()
}

fn alignment_pass(lines: &[&str]) -> Vec<ItemRow> {
    for (index, line) in lines.iter().enumerate() {
        let cells = cells_with_offsets(line);
        if cells.len() < 3 {
            continue;
        }
        let texts = cells.iter().map(|(_, cell)| cell.clone()).collect::<Vec<String>>();
        let Some(map) = header_cell_map(&texts) else {
            continue;
        };
        let columns = map
            .iter()
            .map(|(cell_index, kind)| (cells[*cell_index].0, *kind))
            .collect::<Vec<(usize, ColumnKind)>>();
        return aligned_rows(&lines[index + 1..], &columns);
    }
    Vec::new()
}

fn aligned_rows(lines: &[&str], columns: &[(usize, ColumnKind)]) -> Vec<ItemRow> {
    let mut rows: Vec<ItemRow> = Vec::new();

    for line in lines {
        if line.trim().is_empty() {
            continue;
        }
        if grid::is_totals_marker_line(line) {
            break;
        }

        let cells = cells_with_offsets(line);
        if cells.is_empty() {
            continue;
        }

        // Nearest header offset wins; colliding cells are joined with a space.
        let mut bucketed: Vec<String> = vec![String::new(); columns.len()];
        for (offset, cell) in &cells {
            let Some(column_index) = nearest_column(*offset, columns) else {
                continue;
            };
            if !bucketed[column_index].is_empty() {
                bucketed[column_index].push(' ');
            }
            bucketed[column_index].push_str(cell);
        }

        let map = columns
            .iter()
            .enumerate()
            .map(|(index, (_, kind))| (index, *kind))
            .collect::<Vec<(usize, ColumnKind)>>();
        match mapped_row(&bucketed, &map) {
            ParsedLine::Row(row) => rows.push(row),
            ParsedLine::Continuation(extra) => {
                if let Some(last) = rows.last_mut() {
                    last.description.push(' ');
                    last.description.push_str(&extra);
                }
            }
            ParsedLine::Nothing => {}
        }
    }

    rows
}

fn nearest_column(offset: usize, columns: &[(usize, ColumnKind)]) -> Option<usize> {
    columns
        .iter()
        .enumerate()
        .min_by_key(|(_, (column_offset, _))| offset.abs_diff(*column_offset))
        .map(|(index, _)| index)
}
