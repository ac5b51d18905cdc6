use regex::Regex;

use crate::model::FieldSet;

/// Seller/buyer names and addresses. Explicit labels first; a platform block
/// parser handles the "Delivery Details" / "Sold By" / "Order Details"
/// layout variant when its markers are present.
pub(super) fn fill(found: &mut FieldSet, text_content: &str) {
    let lines = text_content.lines().collect::<Vec<&str>>();

    let seller_regex = Regex::new(r"(?i)^\s*(?:sold\s+by|seller|merchant)\s*[:.-]\s*(\S.*)$").ok();
    let buyer_regex =
        Regex::new(r"(?i)^\s*(?:bill\s+to|ship\s+to|buyer|customer)\s*[:.-]\s*(\S.*)$").ok();
    let seller_address_regex =
        Regex::new(r"(?i)^\s*(?:seller|merchant|pickup)\s+address\s*:?\s*(.*)$").ok();
    let buyer_address_regex =
        Regex::new(r"(?i)^\s*(?:buyer|customer|billing|delivery|shipping)\s+address\s*:?\s*(.*)$")
            .ok();

    for (index, line) in lines.iter().enumerate() {
        let lowered = line.to_lowercase();

        if found.seller.is_none() && !lowered.contains("address") {
            if let Some(value) = capture(&seller_regex, line) {
                found.seller = Some(strip_trailing_parenthetical(&value));
            }
        }
        if found.buyer.is_none() && !lowered.contains("address") {
            if let Some(value) = capture(&buyer_regex, line) {
                found.buyer = Some(value);
            }
        }
        if found.seller_address.is_none() {
            if let Some(inline) = capture_allow_empty(&seller_address_regex, line) {
                found.seller_address = capture_address_block(&lines, index, &inline);
            }
        }
        if found.buyer_address.is_none() {
            if let Some(inline) = capture_allow_empty(&buyer_address_regex, line) {
                found.buyer_address = capture_address_block(&lines, index, &inline);
            }
        }
    }

    platform_block(found, &lines);
}

fn capture(regex: &Option<Regex>, line: &str) -> Option<String> {
    let captures = regex.as_ref()?.captures(line)?;
    let value = captures.get(1)?.as_str().trim();
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

fn capture_allow_empty(regex: &Option<Regex>, line: &str) -> Option<String> {
    let captures = regex.as_ref()?.captures(line)?;
    Some(captures.get(1).map(|m| m.as_str().trim()).unwrap_or("").to_string())
}

/// "Seller Name (some note)" keeps only the name.
pub(super) fn strip_trailing_parenthetical(value: &str) -> String {
    Regex::new(r"\s*\([^)]*\)\s*$")
        .map(|regex| regex.replace(value, "").trim().to_string())
        .unwrap_or_else(|_| value.trim().to_string())
}

/// The label line's inline remainder plus up to three following non-blank
/// lines, stopping at the next section label.
fn capture_address_block(lines: &[&str], label_index: usize, inline: &str) -> Option<String> {
    let mut parts: Vec<String> = Vec::new();
    if !inline.is_empty() {
        parts.push(inline.to_string());
    }

    for line in lines.iter().skip(label_index + 1).take(3) {
        let trimmed = line.trim();
        if trimmed.is_empty() || is_section_label(trimmed) {
            break;
        }
        parts.push(trimmed.to_string());
    }

    if parts.is_empty() {
        None
    } else {
        Some(parts.join(", "))
    }
}

fn is_section_label(line: &str) -> bool {
    let lowered = line.to_lowercase();
    let known_section = lowered.starts_with("order details")
        || lowered.starts_with("sold by")
        || lowered.starts_with("delivery details")
        || lowered.starts_with("payment")
        || lowered.starts_with("grand total")
        || lowered.starts_with("subtotal");
    if known_section {
        return true;
    }
    Regex::new(r"^[A-Z][A-Za-z ./#&-]{1,30}:")
        .map(|regex| regex.is_match(line))
        .unwrap_or(false)
}

/// Marketplace receipts place the buyer under "Delivery Details" and the
/// seller under "Sold By", both ahead of the "Order Details" table.
fn platform_block(found: &mut FieldSet, lines: &[&str]) {
    let lowered = lines
        .iter()
        .map(|line| line.trim().to_lowercase())
        .collect::<Vec<String>>();

    let delivery_index = lowered
        .iter()
        .position(|line| line.starts_with("delivery details"));
    let sold_by_index = lowered.iter().position(|line| line.starts_with("sold by"));
    let (Some(delivery_index), Some(sold_by_index)) = (delivery_index, sold_by_index) else {
        return;
    };

    if found.buyer.is_none() {
        let mut address_lines: Vec<String> = Vec::new();
        for line in lines
            .iter()
            .skip(delivery_index + 1)
            .take(sold_by_index.saturating_sub(delivery_index + 1).min(5))
        {
            let trimmed = line.trim();
            if trimmed.is_empty() {
                break;
            }
            if found.buyer.is_none() {
                found.buyer = Some(trimmed.to_string());
            } else {
                address_lines.push(trimmed.to_string());
            }
        }
        if found.buyer_address.is_none() && !address_lines.is_empty() {
            found.buyer_address = Some(address_lines.join(", "));
        }
    }

    if found.seller.is_none() {
        let inline = lines[sold_by_index]
            .trim()
            .get("sold by".len()..)
            .map(|rest| rest.trim_start_matches([':', '-', ' ']).trim())
            .unwrap_or("");
        if !inline.is_empty() {
            found.seller = Some(strip_trailing_parenthetical(inline));
        } else {
            let mut address_lines: Vec<String> = Vec::new();
            for line in lines.iter().skip(sold_by_index + 1).take(5) {
                let trimmed = line.trim();
                if trimmed.is_empty() || is_section_label(trimmed) {
                    break;
                }
                if found.seller.is_none() {
                    found.seller = Some(strip_trailing_parenthetical(trimmed));
                } else {
                    address_lines.push(trimmed.to_string());
                }
            }
            if found.seller_address.is_none() && !address_lines.is_empty() {
                found.seller_address = Some(address_lines.join(", "));
            }
        }
    }
}
