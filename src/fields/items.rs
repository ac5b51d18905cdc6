use regex::Regex;
use tracing::debug;

use crate::model::{FieldSet, ItemRow};
use crate::table::layout;
use crate::text;

/// Money fragment for the fixed row patterns: optional currency marker,
/// digits with optional grouping and decimals.
const MONEY_FRAGMENT: &str = r"(?:₱|PHP|Php|\$)?\s?[\d,]+(?:\.\d{1,2})?";

/// Item list resolution. Rows from the table cascade take precedence; the
/// regex ladder below only runs when the cascade found nothing.
pub(super) fn fill(found: &mut FieldSet, text_content: &str, table_rows: &[ItemRow]) {
    if !found.items.is_empty() {
        return;
    }

    if !table_rows.is_empty() {
        found.items = table_rows.to_vec();
        return;
    }

    let ladder: [(&str, fn(&str) -> Vec<ItemRow>); 5] = [
        ("product-qty-table", parse_product_qty_table),
        ("order-details-block", parse_order_details_block),
        ("aligned-columns", layout::aligned_rows_from_text),
        ("labeled-blocks", parse_labeled_blocks),
        ("description-quantity-pairs", parse_description_quantity_pairs),
    ];

    for (name, parser) in ladder {
        let rows = parser(text_content)
            .into_iter()
            .filter(ItemRow::is_acceptable)
            .collect::<Vec<ItemRow>>();
        if !rows.is_empty() {
            debug!(parser = name, rows = rows.len(), "item parser produced rows");
            found.items = rows;
            return;
        }
    }
}

/// Final cleanup: rows whose description is known non-item noise, or that
/// carry no numeric evidence at all, are discarded.
pub(super) fn cleanup(found: &mut FieldSet) {
    found
        .items
        .retain(|row| row.is_acceptable() && !is_noise_description(&row.description));
}

fn is_noise_description(description: &str) -> bool {
    let lowered = description.to_lowercase();
    let noise_words = [
        "tracking",
        "order id",
        "order no",
        "invoice no",
        "payment",
        "cash on delivery",
        "address",
        "barangay",
        "province",
        "postal",
        "zip code",
        "thank you",
        "seller",
        "buyer",
        "customer",
        "subtotal",
        "shipping",
        "voucher",
        "amount due",
        "total",
    ];
    if noise_words.iter().any(|word| lowered.contains(word)) {
        return true;
    }
    Regex::new(r"\d{9,}")
        .map(|regex| regex.is_match(description))
        .unwrap_or(false)
}

/// Fixed-pattern rows under a header containing both "Product" and "Qty":
/// `no description price qty subtotal` or `no description qty x price = subtotal`.
/// Short non-numeric-leading lines continue the previous row's variation.
fn parse_product_qty_table(text_content: &str) -> Vec<ItemRow> {
    let lines = text_content.lines().collect::<Vec<&str>>();
    let Some(header_index) = lines.iter().position(|line| {
        let lowered = line.to_lowercase();
        lowered.contains("product") && lowered.contains("qty")
    }) else {
        return Vec::new();
    };

    let pattern_multiply = Regex::new(&format!(
        r"^\s*(\d{{1,3}})[.)]?\s+(.+?)\s+(\d{{1,4}})\s*[xX×]\s*({MONEY_FRAGMENT})\s*=?\s*({MONEY_FRAGMENT})\s*$"
    ))
    .ok();
    let pattern_columns = Regex::new(&format!(
        r"^\s*(\d{{1,3}})[.)]?\s+(.+?)\s+({MONEY_FRAGMENT})\s+(\d{{1,4}})\s+({MONEY_FRAGMENT})\s*$"
    ))
    .ok();

    let mut rows: Vec<ItemRow> = Vec::new();
    for line in &lines[header_index + 1..] {
        if line.trim().is_empty() {
            continue;
        }
        if is_totals_boundary(line) {
            break;
        }

        if let Some(captures) = pattern_multiply.as_ref().and_then(|regex| regex.captures(line)) {
            rows.push(ItemRow {
                sequence_number: captures[1].parse::<i64>().ok(),
                description: captures[2].trim().to_string(),
                variation: None,
                quantity: text::parse_quantity(&captures[3]),
                unit_price: text::parse_money(&captures[4]),
                line_subtotal: text::parse_money(&captures[5]),
            });
            continue;
        }
        if let Some(captures) = pattern_columns.as_ref().and_then(|regex| regex.captures(line)) {
            rows.push(ItemRow {
                sequence_number: captures[1].parse::<i64>().ok(),
                description: captures[2].trim().to_string(),
                variation: None,
                unit_price: text::parse_money(&captures[3]),
                quantity: text::parse_quantity(&captures[4]),
                line_subtotal: text::parse_money(&captures[5]),
            });
            continue;
        }
        if let Some(last) = rows.last_mut() {
            if is_variation_continuation(line) {
                match &mut last.variation {
                    Some(variation) => {
                        variation.push_str(", ");
                        variation.push_str(line.trim());
                    }
                    None => last.variation = Some(line.trim().to_string()),
                }
            }
        }
    }

    rows
}

fn is_totals_boundary(line: &str) -> bool {
    let lowered = line.trim().to_lowercase();
    [
        "merchandise subtotal",
        "subtotal",
        "sub total",
        "shipping",
        "voucher",
        "grand total",
        "total",
        "amount due",
        "payment",
    ]
    .iter()
    .any(|marker| lowered.starts_with(marker))
}

fn is_variation_continuation(line: &str) -> bool {
    let trimmed = line.trim();
    !trimmed.is_empty()
        && trimmed.chars().count() <= 40
        && !trimmed.starts_with(|character: char| character.is_ascii_digit())
        && !trimmed.contains(':')
        && text::money_amounts(trimmed).is_empty()
}

/// Region-bounded reconstructor inside an "Order Details" block: rows start
/// at a leading row number; trailing money tokens become subtotal and unit
/// price, quantity comes from multiplier or unit-suffix forms, and a
/// parenthetical in the description becomes the variation.
fn parse_order_details_block(text_content: &str) -> Vec<ItemRow> {
    let lines = text_content.lines().collect::<Vec<&str>>();
    let Some(start) = lines
        .iter()
        .position(|line| line.to_lowercase().contains("order details"))
    else {
        return Vec::new();
    };

    let row_start_regex = match Regex::new(r"^\s*(\d{1,3})[.)]?\s+(\S.*)$") {
        Ok(regex) => regex,
        Err(_) => return Vec::new(),
    };

    let mut groups: Vec<(i64, Vec<String>)> = Vec::new();
    for line in &lines[start + 1..] {
        if line.trim().is_empty() {
            continue;
        }
        if is_totals_boundary(line) {
            break;
        }
        if let Some(captures) = row_start_regex.captures(line) {
            let sequence = captures[1].parse::<i64>().unwrap_or(0);
            groups.push((sequence, vec![captures[2].trim().to_string()]));
        } else if let Some((_, body)) = groups.last_mut() {
            body.push(line.trim().to_string());
        }
    }

    groups
        .into_iter()
        .filter_map(|(sequence, body)| reconstruct_row(sequence, &body.join(" ")))
        .collect()
}

fn reconstruct_row(sequence: i64, body: &str) -> Option<ItemRow> {
    let amounts = text::money_amounts(body);
    let line_subtotal = amounts.last().copied();
    let unit_price = if amounts.len() >= 2 {
        Some(amounts[amounts.len() - 2])
    } else {
        None
    };

    let quantity = quantity_from_body(body);

    // Description is everything ahead of the first money token, minus any
    // trailing multiplier fragment.
    let money_regex = text::money_regex();
    let description_end = money_regex.find(body).map(|m| m.start()).unwrap_or(body.len());
    let mut description = body[..description_end].trim().to_string();
    if let Ok(trailer) = Regex::new(r"(?i)[\s,]*(?:\d{1,4}\s*[xX×]?|[xX×])\s*$") {
        description = trailer.replace(&description, "").trim().to_string();
    }

    let variation = Regex::new(r"\(([^)]+)\)")
        .ok()
        .and_then(|regex| regex.captures(&description).map(|captures| captures[1].trim().to_string()))
        .filter(|value| !value.is_empty());
    if variation.is_some() {
        if let Ok(parenthetical) = Regex::new(r"\s*\([^)]*\)") {
            description = parenthetical.replace_all(&description, "").trim().to_string();
        }
    }

    let row = ItemRow {
        sequence_number: if sequence > 0 { Some(sequence) } else { None },
        description,
        variation,
        unit_price,
        quantity,
        line_subtotal,
    };
    if row.is_acceptable() { Some(row) } else { None }
}

fn quantity_from_body(body: &str) -> Option<i64> {
    let multiplier = Regex::new(r"(?i)\b(\d{1,4})\s*[x×]")
        .ok()
        .and_then(|regex| regex.captures(body))
        .and_then(|captures| captures[1].parse::<i64>().ok());
    if let Some(value) = multiplier {
        return Some(value).filter(|value| (1..=9999).contains(value));
    }

    let suffixed = Regex::new(r"(?i)\b(\d{1,4})\s*(?:pcs?|pieces?|packs?|sets?|units?)\b")
        .ok()
        .and_then(|regex| regex.captures(body))
        .and_then(|captures| captures[1].parse::<i64>().ok());
    suffixed.filter(|value| (1..=9999).contains(value))
}

/// Label-cued blocks: a description line followed by "Product Price:",
/// "Qty:" and "Subtotal:" lines.
fn parse_labeled_blocks(text_content: &str) -> Vec<ItemRow> {
    let price_regex = Regex::new(r"(?i)^\s*(?:product\s+)?price\s*:\s*(.+)$").ok();
    let qty_regex = Regex::new(r"(?i)^\s*(?:qty|quantity)\s*:\s*(.+)$").ok();
    let subtotal_regex = Regex::new(r"(?i)^\s*subtotal\s*:\s*(.+)$").ok();

    let mut rows: Vec<ItemRow> = Vec::new();
    let mut current: Option<ItemRow> = None;

    for line in text_content.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        if let Some(value) = captured(&price_regex, trimmed) {
            if let Some(row) = current.as_mut() {
                row.unit_price = text::parse_money(&value);
            }
            continue;
        }
        if let Some(value) = captured(&qty_regex, trimmed) {
            if let Some(row) = current.as_mut() {
                row.quantity = text::parse_quantity(&value);
            }
            continue;
        }
        if let Some(value) = captured(&subtotal_regex, trimmed) {
            if let Some(row) = current.as_mut() {
                row.line_subtotal = text::parse_money(&value);
            }
            continue;
        }

        // A plain text line starts the next block.
        if trimmed.contains(':') {
            continue;
        }
        if let Some(row) = current.take() {
            if row.is_acceptable() {
                rows.push(row);
            }
        }
        if trimmed.chars().any(|character| character.is_alphabetic()) {
            current = Some(ItemRow {
                description: trimmed.to_string(),
                ..ItemRow::default()
            });
        }
    }

    if let Some(row) = current.take() {
        if row.is_acceptable() {
            rows.push(row);
        }
    }

    rows
}

fn captured(regex: &Option<Regex>, line: &str) -> Option<String> {
    let captures = regex.as_ref()?.captures(line)?;
    Some(captures.get(1)?.as_str().trim().to_string())
}

/// Last resort: a description line paired with a following bare small
/// integer, guarded against unit counts embedded in the description.
fn parse_description_quantity_pairs(text_content: &str) -> Vec<ItemRow> {
    let lines = text_content.lines().collect::<Vec<&str>>();
    let unit_count_regex = Regex::new(r"(?i)\b\d{1,4}\s*(?:pcs?|pieces?|packs?|sets?)\b").ok();

    let mut rows = Vec::new();
    let mut index = 0usize;
    while index + 1 < lines.len() {
        let description = lines[index].trim();
        let candidate = lines[index + 1].trim();
        index += 1;

        if description.chars().count() < 4
            || !description.chars().any(|character| character.is_alphabetic())
            || description.contains(':')
            || is_noise_description(description)
        {
            continue;
        }
        if !text::is_bare_quantity_token(candidate) {
            continue;
        }
        // "Widget 20 pcs" followed by "20" is the unit count, not a quantity.
        if unit_count_regex
            .as_ref()
            .map(|regex| regex.is_match(description))
            .unwrap_or(false)
        {
            continue;
        }

        rows.push(ItemRow {
            description: description.to_string(),
            quantity: text::parse_quantity(candidate),
            ..ItemRow::default()
        });
        index += 1;
    }

    rows
}
