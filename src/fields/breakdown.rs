use regex::Regex;
use strsim::normalized_levenshtein;
use tracing::debug;

use crate::model::FieldSet;
use crate::text;

/// Similarity floor for fuzzy label matching.
const FUZZY_THRESHOLD: f64 = 0.78;
/// Fixed ceiling for arithmetically derived components.
const DERIVED_COMPONENT_CAP: f64 = 20_000.0;
/// Components larger than this multiple of the grand total are discarded.
const DISPROPORTION_LIMIT: f64 = 5.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Component {
    Subtotal,
    ShippingFee,
    ShippingDiscount,
    Voucher,
}

const COMPONENTS: [Component; 4] = [
    Component::Subtotal,
    Component::ShippingFee,
    Component::ShippingDiscount,
    Component::Voucher,
];

fn labels_for(component: Component) -> &'static [&'static str] {
    match component {
        Component::Subtotal => &[
            "merchandise subtotal",
            "subtotal",
            "sub total",
            "item total",
            "items subtotal",
            "order subtotal",
        ],
        Component::ShippingFee => &[
            "shipping fee",
            "shipping subtotal",
            "delivery fee",
            "shipping charge",
            "postage",
            "freight",
        ],
        Component::ShippingDiscount => &[
            "shipping discount",
            "shipping discount subtotal",
            "free shipping discount",
            "shipping fee discount",
        ],
        Component::Voucher => &[
            "platform voucher",
            "voucher",
            "platform voucher applied",
            "voucher applied",
            "seller voucher",
            "voucher discount",
        ],
    }
}

fn field_name(component: Component) -> &'static str {
    match component {
        Component::Subtotal => "subtotal",
        Component::ShippingFee => "shippingFee",
        Component::ShippingDiscount => "shippingDiscount",
        Component::Voucher => "voucher",
    }
}

fn slot<'a>(found: &'a mut FieldSet, component: Component) -> &'a mut Option<f64> {
    match component {
        Component::Subtotal => &mut found.subtotal,
        Component::ShippingFee => &mut found.shipping_fee,
        Component::ShippingDiscount => &mut found.shipping_discount,
        Component::Voucher => &mut found.voucher,
    }
}

fn value_of(found: &FieldSet, component: Component) -> Option<f64> {
    match component {
        Component::Subtotal => found.subtotal,
        Component::ShippingFee => found.shipping_fee,
        Component::ShippingDiscount => found.shipping_discount,
        Component::Voucher => found.voucher,
    }
}

/// Discounts are stored as negative magnitudes, fees and subtotals positive.
fn assign(found: &mut FieldSet, component: Component, raw_amount: f64) {
    let value = match component {
        Component::Subtotal | Component::ShippingFee => raw_amount.abs(),
        Component::ShippingDiscount | Component::Voucher => -raw_amount.abs(),
    };
    *slot(found, component) = Some(value);
}

/// Monetary breakdown labels: fuzzy match, then exact patterns, then a global
/// substring search. Each line can settle at most one component.
pub(super) fn fill_labels(found: &mut FieldSet, text_content: &str) {
    fuzzy_pass(found, text_content);
    exact_pass(found, text_content);
    global_pass(found, text_content);
}

/// Lines that carry ID/tracking/receipt metadata are excluded from label
/// matching; their digit runs masquerade as amounts.
fn is_metadata_line(line: &str) -> bool {
    let lowered = line.to_lowercase();
    let keyword = ["tracking", "order id", "order no", "receipt", "reference", "transaction", "invoice no"]
        .iter()
        .any(|word| lowered.contains(word));
    if keyword {
        return true;
    }
    Regex::new(r"\d{9,}")
        .map(|regex| regex.is_match(line))
        .unwrap_or(false)
}

fn fuzzy_pass(found: &mut FieldSet, text_content: &str) {
    for line in text_content.lines() {
        if is_metadata_line(line) {
            continue;
        }
        let Some(raw_amount) = text::first_money_amount(line) else {
            continue;
        };
        let normalized = text::normalize_label_text(line);
        if normalized.is_empty() {
            continue;
        }

        let mut best: Option<(Component, f64)> = None;
        for component in COMPONENTS {
            if value_of(found, component).is_some() {
                continue;
            }
            for label in labels_for(component) {
                let similarity = normalized_levenshtein(&normalized, label);
                if similarity < FUZZY_THRESHOLD {
                    continue;
                }
                if best.map_or(true, |(_, best_similarity)| similarity > best_similarity) {
                    best = Some((component, similarity));
                }
            }
        }

        if let Some((component, similarity)) = best {
            debug!(
                component = field_name(component),
                similarity, "fuzzy label matched"
            );
            assign(found, component, raw_amount);
        }
    }
}

fn exact_pass(found: &mut FieldSet, text_content: &str) {
    let subtotal_regex = Regex::new(r"(?i)\b(?:merchandise\s+)?sub\s*-?\s*total\b").ok();
    let shipping_discount_regex = Regex::new(r"(?i)\bshipping\s+(?:fee\s+)?discount\b").ok();
    let shipping_fee_regex = Regex::new(r"(?i)\bshipping\s*(?:fee|charge|subtotal)?\b").ok();
    let voucher_regex = Regex::new(r"(?i)\bvoucher\b").ok();

    for line in text_content.lines() {
        if is_metadata_line(line) {
            continue;
        }
        let Some(raw_amount) = text::first_money_amount(line) else {
            continue;
        };
        let lowered = line.to_lowercase();

        if found.subtotal.is_none() && matches(&subtotal_regex, line) {
            assign(found, Component::Subtotal, raw_amount);
            continue;
        }
        if found.shipping_discount.is_none() && matches(&shipping_discount_regex, line) {
            assign(found, Component::ShippingDiscount, raw_amount);
            continue;
        }
        if found.shipping_fee.is_none()
            && matches(&shipping_fee_regex, line)
            && !lowered.contains("discount")
        {
            assign(found, Component::ShippingFee, raw_amount);
            continue;
        }
        if found.voucher.is_none()
            && matches(&voucher_regex, line)
            && !lowered.contains("shipping")
        {
            assign(found, Component::Voucher, raw_amount);
        }
    }
}

fn matches(regex: &Option<Regex>, line: &str) -> bool {
    regex
        .as_ref()
        .map(|regex| regex.is_match(line))
        .unwrap_or(false)
}

/// Last label resort: find a canonical label anywhere in the text and take
/// the first amount on the same line. Lines without an amount never settle a
/// component.
fn global_pass(found: &mut FieldSet, text_content: &str) {
    for component in COMPONENTS {
        if value_of(found, component).is_some() {
            continue;
        }
        'labels: for label in labels_for(component) {
            for line in text_content.lines() {
                if is_metadata_line(line) || !line.to_lowercase().contains(label) {
                    continue;
                }
                if let Some(raw_amount) = text::first_money_amount(line) {
                    assign(found, component, raw_amount);
                    break 'labels;
                }
            }
        }
    }
}

/// Arithmetic derivation for fields still null, bounded by sanity limits and
/// flagged as derived rather than extracted.
pub(super) fn derive(found: &mut FieldSet) {
    if found.subtotal.is_none() {
        let sum: f64 = found
            .items
            .iter()
            .filter_map(|row| row.line_subtotal)
            .sum();
        if sum > 0.0 {
            found.subtotal = Some(round2(sum));
            found.derived_fields.push("subtotal".to_string());
        }
    }

    if found.shipping_fee.is_none() {
        if let (Some(total), Some(subtotal)) = (found.total, found.subtotal) {
            let fee = total
                - subtotal
                - found.shipping_discount.unwrap_or(0.0)
                - found.voucher.unwrap_or(0.0);
            let cap = (total * 0.5).max(DERIVED_COMPONENT_CAP);
            if fee > 0.009 && fee <= cap {
                found.shipping_fee = Some(round2(fee));
                found.derived_fields.push("shippingFee".to_string());
            }
        }
    }

    if found.voucher.is_none() {
        if let (Some(total), Some(subtotal)) = (found.total, found.subtotal) {
            let residual = total
                - subtotal
                - found.shipping_fee.unwrap_or(0.0)
                - found.shipping_discount.unwrap_or(0.0);
            let cap = (total * 0.5).max(DERIVED_COMPONENT_CAP);
            if residual < -0.009 && residual.abs() <= cap {
                found.voucher = Some(round2(residual));
                found.derived_fields.push("voucher".to_string());
            }
        }
    }
}

/// Components wildly disproportionate to the grand total are discarded
/// rather than trusted.
pub(super) fn cleanup(found: &mut FieldSet) {
    let Some(total) = found.total else {
        return;
    };
    if total <= 0.0 {
        return;
    }

    for component in COMPONENTS {
        let Some(value) = value_of(found, component) else {
            continue;
        };
        if value.abs() > total * DISPROPORTION_LIMIT {
            *slot(found, component) = None;
            let name = field_name(component);
            found.derived_fields.retain(|entry| entry != name);
        }
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
