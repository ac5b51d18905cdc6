use regex::Regex;

use crate::model::FieldSet;
use crate::text;

use super::number_words;

/// Words whose presence marks a line as a component rather than the grand
/// total, unless "grand" appears alongside them.
pub(super) const NEGATIVE_CONTEXT: &[&str] = &[
    "subtotal",
    "sub-total",
    "shipping",
    "discount",
    "voucher",
    "tax",
    "vat",
    "fee",
    "deposit",
    "balance",
    "change",
];

/// Grand total resolution ladder: bold currency hints, explicit grand-total
/// lines, scored total keywords, amount-in-words, then the largest
/// currency-tagged number as an absolute fallback.
pub(super) fn fill(found: &mut FieldSet, text_content: &str, bold_total_lines: &[String]) {
    if found.total.is_some() {
        return;
    }

    found.total = from_bold_hints(bold_total_lines)
        .or_else(|| from_grand_total_lines(text_content))
        .or_else(|| from_scored_keywords(text_content))
        .or_else(|| from_amount_in_words(text_content))
        .or_else(|| largest_currency_amount(text_content));
}

pub(super) fn has_negative_context(line: &str) -> bool {
    let lowered = line.to_lowercase();
    NEGATIVE_CONTEXT.iter().any(|word| lowered.contains(word))
}

fn grand_total_regex() -> Option<Regex> {
    Regex::new(r"(?i)\bgrand\s*total\b(?:\s*\(includes\s*VAT\))?").ok()
}

fn from_bold_hints(bold_total_lines: &[String]) -> Option<f64> {
    let regex = grand_total_regex()?;
    for line in bold_total_lines {
        if !regex.is_match(line) {
            continue;
        }
        if let Some(amount) = positive_amounts(line).into_iter().next() {
            return Some(amount);
        }
    }
    None
}

/// Explicit "Grand Total" lines; the amount may sit on the same line or on
/// one of the two following lines. Currency presence and later position both
/// raise the score.
fn from_grand_total_lines(text_content: &str) -> Option<f64> {
    let regex = grand_total_regex()?;
    let lines = text_content.lines().collect::<Vec<&str>>();
    let line_count = lines.len().max(1) as f64;

    let mut best: Option<(f64, f64)> = None;
    for (index, line) in lines.iter().enumerate() {
        if !regex.is_match(line) {
            continue;
        }

        let candidate = [0usize, 1, 2].iter().find_map(|offset| {
            let target = lines.get(index + offset)?;
            positive_amounts(target)
                .into_iter()
                .next()
                .map(|amount| (amount, text::has_currency_marker(target)))
        });
        let Some((amount, has_currency)) = candidate else {
            continue;
        };

        let score = if has_currency { 2.0 } else { 0.0 } + index as f64 / line_count;
        let better = match best {
            None => true,
            Some((best_score, best_amount)) => {
                score > best_score || (score == best_score && amount > best_amount)
            }
        };
        if better {
            best = Some((score, amount));
        }
    }

    best.map(|(_, amount)| amount)
}

/// General total keywords scored by specificity, currency presence and line
/// position; component-context lines are excluded unless "grand" is present.
fn from_scored_keywords(text_content: &str) -> Option<f64> {
    let keywords: [(&str, f64); 5] = [
        (r"\bgrand\s+total\b", 5.0),
        (r"\bamount\s+due\b", 4.0),
        (r"\btotal\s+amount\b", 4.0),
        (r"\binvoice\s+total\b", 4.0),
        (r"\btotal\b", 1.0),
    ];
    let regexes = keywords
        .iter()
        .filter_map(|(pattern, weight)| {
            Regex::new(&format!("(?i){pattern}"))
                .ok()
                .map(|regex| (regex, *weight))
        })
        .collect::<Vec<(Regex, f64)>>();

    let lines = text_content.lines().collect::<Vec<&str>>();
    let line_count = lines.len().max(1) as f64;

    let mut best: Option<(f64, f64)> = None;
    for (index, line) in lines.iter().enumerate() {
        let lowered = line.to_lowercase();
        if has_negative_context(line) && !lowered.contains("grand") {
            continue;
        }

        let Some(specificity) = regexes
            .iter()
            .filter(|(regex, _)| regex.is_match(line))
            .map(|(_, weight)| *weight)
            .reduce(f64::max)
        else {
            continue;
        };

        let Some(amount) = positive_amounts(line).into_iter().reduce(f64::max) else {
            continue;
        };

        let score = specificity
            + if text::has_currency_marker(line) { 2.0 } else { 0.0 }
            + index as f64 / line_count;
        let better = match best {
            None => true,
            Some((best_score, best_amount)) => {
                score > best_score || (score == best_score && amount > best_amount)
            }
        };
        if better {
            best = Some((score, amount));
        }
    }

    best.map(|(_, amount)| amount)
}

fn from_amount_in_words(text_content: &str) -> Option<f64> {
    let regex = Regex::new(r"(?i)\bamount\s+in\s+words?\s*[:.]?\s*(.+)$").ok()?;
    for line in text_content.lines() {
        if let Some(captures) = regex.captures(line) {
            if let Some(amount) = number_words::parse_amount(&captures[1]) {
                if amount > 0.0 {
                    return Some(amount);
                }
            }
        }
    }
    None
}

/// Absolute fallback: the largest currency-tagged number in the document,
/// excluding component-context lines.
fn largest_currency_amount(text_content: &str) -> Option<f64> {
    let mut largest: Option<f64> = None;
    for line in text_content.lines() {
        if has_negative_context(line) {
            continue;
        }
        for amount in text::currency_amounts(line) {
            if amount > 0.0 && largest.map_or(true, |current| amount > current) {
                largest = Some(amount);
            }
        }
    }
    largest
}

fn positive_amounts(line: &str) -> Vec<f64> {
    text::money_amounts(line)
        .into_iter()
        .filter(|amount| *amount > 0.0)
        .collect()
}
