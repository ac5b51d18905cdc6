use regex::Regex;

use crate::model::FieldSet;

/// Per-line identifier extraction. Scanning stops as soon as every identifier
/// field is filled; the label map harvest runs over the whole text.
pub(super) fn fill(found: &mut FieldSet, text_content: &str) {
    let invoice_regex = Regex::new(
        r"(?i)\b(?:invoice|inv)\.?\s*(?:(?:no|number|num)\.?\s*[:#]?|[:#])\s*([A-Za-z0-9][A-Za-z0-9/_-]*)",
    )
    .ok();
    let order_summary_regex =
        Regex::new(r"(?i)\border\s+summary\s+no\.?\s*[:#]?\s*([A-Za-z0-9][A-Za-z0-9/_-]*)").ok();
    let order_id_regex =
        Regex::new(r"(?i)\border\s+id\s*[:#]?\s*([A-Za-z0-9][A-Za-z0-9/_-]*)").ok();
    let order_no_regex =
        Regex::new(r"(?i)\border\s+(?:no|number)\.?\s*[:#]?\s*([A-Za-z0-9][A-Za-z0-9/_-]*)").ok();
    let date_issued_regex = Regex::new(r"(?i)\bdate\s+issued\s*:?\s*(\S.*)").ok();
    let paid_date_regex = Regex::new(r"(?i)\border\s+paid(?:\s+date)?\s*:?\s*(\S.*)").ok();
    let payment_regex = Regex::new(r"(?i)\bpayment\s+method\s*:?\s*(\S.*)").ok();

    for line in text_content.lines() {
        fill_capture(&mut found.invoice_number, &invoice_regex, line);
        fill_capture(&mut found.order_summary_no, &order_summary_regex, line);
        fill_capture(&mut found.order_id, &order_id_regex, line);
        fill_capture(&mut found.order_id, &order_no_regex, line);
        fill_capture(&mut found.date_issued, &date_issued_regex, line);
        fill_capture(&mut found.order_paid_date, &paid_date_regex, line);
        fill_capture(&mut found.payment_method, &payment_regex, line);

        if all_identifiers_found(found) {
            break;
        }
    }

    harvest_labels(found, text_content);
}

fn fill_capture(slot: &mut Option<String>, regex: &Option<Regex>, line: &str) {
    if slot.is_some() {
        return;
    }
    let Some(regex) = regex else {
        return;
    };
    if let Some(captures) = regex.captures(line) {
        if let Some(value) = captures.get(1) {
            let value = value.as_str().trim();
            if !value.is_empty() {
                *slot = Some(value.to_string());
            }
        }
    }
}

fn all_identifiers_found(found: &FieldSet) -> bool {
    found.invoice_number.is_some()
        && found.order_summary_no.is_some()
        && found.order_id.is_some()
        && found.date_issued.is_some()
        && found.order_paid_date.is_some()
        && found.payment_method.is_some()
}

/// Harvest `Label: value` lines into the raw label map used by the overview
/// normalizer's synonym resolution. First occurrence of a label wins.
fn harvest_labels(found: &mut FieldSet, text_content: &str) {
    let Some(label_regex) =
        Regex::new(r"^\s*([A-Za-z][A-Za-z0-9 ./#&()'-]{1,39}?)\s*:\s*(\S.*)$").ok()
    else {
        return;
    };

    for line in text_content.lines() {
        let Some(captures) = label_regex.captures(line) else {
            continue;
        };
        let key = captures[1]
            .to_lowercase()
            .split_whitespace()
            .collect::<Vec<&str>>()
            .join(" ");
        let value = captures[2].trim().to_string();
        if key.len() < 2 || value.is_empty() {
            continue;
        }
        found.labels.entry(key).or_insert(value);
    }
}
