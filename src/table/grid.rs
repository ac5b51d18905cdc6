use regex::Regex;

use crate::model::{ItemRow, WordBox};
use crate::text;

/// Adjacent column boundaries closer than this are merged.
pub(crate) const BOUNDARY_MERGE_TOLERANCE: f64 = 5.0;
/// Words within this vertical distance belong to the same row.
pub(crate) const LINE_GROUP_TOLERANCE: f64 = 5.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ColumnKind {
    No,
    Product,
    Variation,
    Price,
    Qty,
    Subtotal,
}

/// Horizontal range owned by one logical column, derived from a header row.
/// Bands are non-overlapping and sorted by left edge.
#[derive(Debug, Clone)]
pub(crate) struct ColumnBand {
    pub kind: ColumnKind,
    pub left: f64,
    pub right: f64,
}

impl ColumnBand {
    fn contains(&self, mid_x: f64) -> bool {
        mid_x >= self.left - BOUNDARY_MERGE_TOLERANCE && mid_x < self.right
    }
}

fn token_kind(token: &str) -> Option<ColumnKind> {
    let cleaned = token
        .trim()
        .trim_matches(|character: char| !character.is_ascii_alphanumeric() && character != '#')
        .to_ascii_lowercase();

    match cleaned.as_str() {
        "no" | "#" | "sn" | "s/n" => Some(ColumnKind::No),
        "variation" | "variant" | "option" | "options" => Some(ColumnKind::Variation),
        "qty" | "quantity" | "pcs" => Some(ColumnKind::Qty),
        "price" | "unit" | "cost" | "rate" => Some(ColumnKind::Price),
        "subtotal" | "amount" | "total" | "net" => Some(ColumnKind::Subtotal),
        "product" | "item" | "description" | "details" | "desc" => Some(ColumnKind::Product),
        _ => None,
    }
}

/// Words of a two-word label ("Product Price") sit a character-width apart;
/// column gaps are far wider.
fn phrase_adjacent(previous: &WordBox, word: &WordBox) -> bool {
    let length = previous.text.chars().count().max(1) as f64;
    let char_width = (previous.x1 - previous.x0).abs() / length;
    let gap = word.x0 - previous.x1;
    gap >= 0.0 && gap <= char_width * 2.5
}

/// A line qualifies as a header only when all four of product, qty, price and
/// subtotal hints are present simultaneously. Matched token positions become
/// the column boundaries.
pub(crate) fn detect_header_bands(line: &[WordBox]) -> Option<Vec<ColumnBand>> {
    let mut claimed: Vec<ColumnKind> = Vec::new();
    let mut boundaries: Vec<(f64, ColumnKind)> = Vec::new();
    let mut pending: Option<&WordBox> = None;

    for word in line {
        match token_kind(&word.text) {
            Some(kind) if !claimed.contains(&kind) => {
                let left = match pending {
                    Some(previous) if phrase_adjacent(previous, word) => previous.x0,
                    _ => word.x0,
                };
                boundaries.push((left, kind));
                claimed.push(kind);
                pending = None;
            }
            // A claimed category seen again usually starts a two-word label.
            Some(_) => pending = Some(word),
            None => pending = None,
        }
    }

    let required = [
        ColumnKind::Product,
        ColumnKind::Qty,
        ColumnKind::Price,
        ColumnKind::Subtotal,
    ];
    if !required.iter().all(|kind| claimed.contains(kind)) {
        return None;
    }

    boundaries.sort_by(|a, b| a.0.total_cmp(&b.0));

    let mut merged: Vec<(f64, ColumnKind)> = Vec::new();
    for (left, kind) in boundaries {
        match merged.last() {
            Some((previous, _)) if left - previous <= BOUNDARY_MERGE_TOLERANCE => {}
            _ => merged.push((left, kind)),
        }
    }

    let bands = merged
        .iter()
        .enumerate()
        .map(|(index, (left, kind))| ColumnBand {
            kind: *kind,
            left: *left,
            right: merged
                .get(index + 1)
                .map(|(next_left, _)| *next_left)
                .unwrap_or(f64::INFINITY),
        })
        .collect::<Vec<ColumnBand>>();

    Some(bands)
}

/// Group a flat word list into rows by vertical proximity.
pub(crate) fn group_into_lines(words: Vec<WordBox>, tolerance: f64) -> Vec<Vec<WordBox>> {
    let mut sorted = words;
    sorted.sort_by(|a, b| a.mid_y().total_cmp(&b.mid_y()).then(a.x0.total_cmp(&b.x0)));

    let mut lines: Vec<Vec<WordBox>> = Vec::new();
    for word in sorted {
        let matches_last = lines
            .last()
            .and_then(|line| line.first())
            .map(|anchor| (word.mid_y() - anchor.mid_y()).abs() <= tolerance)
            .unwrap_or(false);
        if matches_last {
            if let Some(line) = lines.last_mut() {
                line.push(word);
            }
        } else {
            lines.push(vec![word]);
        }
    }

    for line in &mut lines {
        line.sort_by(|a, b| a.x0.total_cmp(&b.x0));
    }
    lines
}

/// Word heights vary by source (points vs pixels); derive a grouping tolerance
/// from the median word height instead of assuming one unit system.
pub(crate) fn adaptive_line_tolerance(words: &[WordBox]) -> f64 {
    let mut heights = words
        .iter()
        .map(|word| (word.y1 - word.y0).abs())
        .filter(|height| *height > 0.0)
        .collect::<Vec<f64>>();
    if heights.is_empty() {
        return LINE_GROUP_TOLERANCE;
    }
    heights.sort_by(f64::total_cmp);
    let median = heights[heights.len() / 2];
    (median * 0.6).max(LINE_GROUP_TOLERANCE)
}

pub(crate) fn line_text(line: &[WordBox]) -> String {
    line.iter()
        .map(|word| word.text.as_str())
        .collect::<Vec<&str>>()
        .join(" ")
}

/// Totals lines start with a totals label; used to stop row collection.
pub(crate) fn is_totals_marker_line(line: &str) -> bool {
    let normalized = line
        .trim_start_matches(|character: char| character == '|' || character.is_whitespace())
        .to_lowercase();
    let regex = Regex::new(
        r"^(merchandise subtotal|subtotal|sub-total|sub total|shipping|voucher|grand total|total|amount due|payment method|payment)\b",
    );
    regex.map(|regex| regex.is_match(&normalized)).unwrap_or(false)
}

fn is_region_end_marker(line: &str) -> bool {
    let lowered = line.to_lowercase();
    is_totals_marker_line(line)
        || lowered.contains("qty:")
        || lowered.contains("quantity:")
}

fn currency_marker_word(token: &str) -> bool {
    matches!(token.trim(), "₱" | "PHP" | "Php" | "$")
}

fn parse_cell_quantity(cell: &str) -> Option<i64> {
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

/// Assign each word of each line to the first band containing its horizontal
/// midpoint; words outside every band are dropped. Lines with product text
/// and no numeric value are continuations of the previous row.
pub(crate) fn rows_from_lines(lines: &[Vec<WordBox>], bands: &[ColumnBand]) -> Vec<ItemRow> {
    let mut rows: Vec<ItemRow> = Vec::new();

    for line in lines {
        let rendered = line_text(line);
        if rendered.trim().is_empty() {
            continue;
        }
        if is_totals_marker_line(&rendered) {
            break;
        }

        let mut cells: Vec<String> = vec![String::new(); bands.len()];
        for word in line {
            let Some(index) = bands.iter().position(|band| band.contains(word.mid_x())) else {
                continue;
            };
            if !cells[index].is_empty() {
                cells[index].push(' ');
            }
            cells[index].push_str(&word.text);
        }

        match row_from_cells(&cells, bands) {
            CellParse::Row(row) => rows.push(row),
            CellParse::Continuation(text) => {
                if let Some(last) = rows.last_mut() {
                    last.description.push(' ');
                    last.description.push_str(&text);
                }
            }
            CellParse::Empty => {}
        }
    }

    rows
}

pub(crate) enum CellParse {
    Row(ItemRow),
    Continuation(String),
    Empty,
}

pub(crate) fn row_from_cells(cells: &[String], bands: &[ColumnBand]) -> CellParse {
    let mut row = ItemRow::default();

    for (cell, band) in cells.iter().zip(bands) {
        let cell = cell.trim();
        if cell.is_empty() {
            continue;
        }
        match band.kind {
            ColumnKind::No => row.sequence_number = parse_cell_quantity(cell),
            ColumnKind::Product => row.description = cell.to_string(),
            ColumnKind::Variation => row.variation = Some(cell.to_string()),
            ColumnKind::Price => row.unit_price = text::parse_money(cell),
            ColumnKind::Qty => row.quantity = parse_cell_quantity(cell),
            ColumnKind::Subtotal => row.line_subtotal = text::parse_money(cell),
        }
    }

    if row.is_acceptable() {
        return CellParse::Row(row);
    }

    let leftover = cells
        .iter()
        .map(|cell| cell.trim())
        .filter(|cell| !cell.is_empty())
        .collect::<Vec<&str>>()
        .join(" ");
    if leftover.is_empty() {
        CellParse::Empty
    } else {
        CellParse::Continuation(leftover)
    }
}

/// Header-driven extraction when a qualifying header exists on the page,
/// otherwise the region heuristic.
pub(crate) fn rows_from_word_lines(lines: &[Vec<WordBox>]) -> Vec<ItemRow> {
    for (index, line) in lines.iter().enumerate() {
        if let Some(bands) = detect_header_bands(line) {
            return rows_from_lines(&lines[index + 1..], &bands);
        }
    }
    region_rows(lines)
}

/// Region heuristic: rows between the "Order Details" line and the first
/// totals/quantity marker. Right-most money token is the line subtotal, the
/// second-right-most the unit price, the first bare 1-3 digit token the
/// quantity; everything else is description.
pub(crate) fn region_rows(lines: &[Vec<WordBox>]) -> Vec<ItemRow> {
    let Some(start) = lines
        .iter()
        .position(|line| line_text(line).to_lowercase().contains("order details"))
    else {
        return Vec::new();
    };

    let mut rows = Vec::new();
    for line in &lines[start + 1..] {
        let rendered = line_text(line);
        if rendered.trim().is_empty() {
            continue;
        }
        if is_region_end_marker(&rendered) {
            break;
        }

        if let Some(row) = region_row_from_line(line) {
            rows.push(row);
        }
    }
    rows
}

fn region_row_from_line(line: &[WordBox]) -> Option<ItemRow> {
    let money_indexes = line
        .iter()
        .enumerate()
        .filter(|(_, word)| text::is_money_token(&word.text))
        .map(|(index, _)| index)
        .collect::<Vec<usize>>();

    let mut used = vec![false; line.len()];
    let mut row = ItemRow::default();

    if let Some(&last) = money_indexes.last() {
        row.line_subtotal = text::parse_money(&line[last].text);
        used[last] = true;
    }
    if money_indexes.len() >= 2 {
        let second = money_indexes[money_indexes.len() - 2];
        row.unit_price = text::parse_money(&line[second].text);
        used[second] = true;
    }

    for (index, word) in line.iter().enumerate() {
        if used[index] {
            continue;
        }
        if text::is_bare_quantity_token(&word.text) {
            row.quantity = text::parse_quantity(&word.text);
            used[index] = true;
            break;
        }
    }

    let description = line
        .iter()
        .enumerate()
        .filter(|(index, word)| !used[*index] && !currency_marker_word(&word.text))
        .map(|(_, word)| word.text.as_str())
        .collect::<Vec<&str>>()
        .join(" ");
    row.description = description.trim().to_string();

    if row.is_acceptable() { Some(row) } else { None }
}
