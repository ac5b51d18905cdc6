use regex::Regex;

/// Amounts written with an explicit currency marker, or with a decimal part.
/// Bare integers are deliberately excluded so quantities never parse as money.
pub fn money_regex() -> Regex {
    Regex::new(
        r"(?:(?P<sign1>-)\s*)?(?:₱|PHP|Php|\$|\bP)\s*(?P<marked>\d[\d,]*(?:\.\d{1,2})?)|(?P<sign2>-)?\b(?P<plain>\d[\d,]*\.\d{1,2})\b",
    )
    .expect("money regex compiles")
}

fn currency_marked_regex() -> Regex {
    Regex::new(r"(?:(?P<sign>-)\s*)?(?:₱|PHP|Php|\$|\bP)\s*(?P<amount>\d[\d,]*(?:\.\d{1,2})?)")
        .expect("currency regex compiles")
}

/// Every money-shaped amount on the line, in order of appearance.
pub fn money_amounts(line: &str) -> Vec<f64> {
    let regex = money_regex();
    let mut amounts = Vec::new();
    for captures in regex.captures_iter(line) {
        let (sign, body) = if let Some(marked) = captures.name("marked") {
            (captures.name("sign1").is_some(), marked.as_str())
        } else if let Some(plain) = captures.name("plain") {
            (captures.name("sign2").is_some(), plain.as_str())
        } else {
            continue;
        };
        if let Some(value) = parse_numeric_body(body) {
            amounts.push(if sign { -value } else { value });
        }
    }
    amounts
}

pub fn first_money_amount(line: &str) -> Option<f64> {
    money_amounts(line).into_iter().next()
}

/// Amounts carrying an explicit currency marker only.
pub fn currency_amounts(line: &str) -> Vec<f64> {
    let regex = currency_marked_regex();
    let mut amounts = Vec::new();
    for captures in regex.captures_iter(line) {
        let Some(body) = captures.name("amount") else {
            continue;
        };
        if let Some(value) = parse_numeric_body(body.as_str()) {
            let negative = captures.name("sign").is_some();
            amounts.push(if negative { -value } else { value });
        }
    }
    amounts
}

pub fn has_currency_marker(line: &str) -> bool {
    if line.contains('₱') || line.contains('$') || line.contains("PHP") || line.contains("Php") {
        return true;
    }
    Regex::new(r"\bP\s?\d")
        .map(|regex| regex.is_match(line))
        .unwrap_or(false)
}

pub fn detect_currency(text: &str) -> Option<String> {
    if text.contains('₱') || text.contains("PHP") || text.contains("Php") {
        return Some("PHP".to_string());
    }
    if text.contains('$') {
        return Some("USD".to_string());
    }
    if Regex::new(r"\bP\s?\d")
        .map(|regex| regex.is_match(text))
        .unwrap_or(false)
    {
        return Some("PHP".to_string());
    }
    None
}

/// Parse a single money-shaped token such as `₱1,234.50`, `-50.00` or `(50.00)`.
pub fn parse_money(token: &str) -> Option<f64> {
    let trimmed = token.trim();
    if !trimmed.chars().any(|character| character.is_ascii_digit()) {
        return None;
    }
    let negative = trimmed.contains('-') || (trimmed.starts_with('(') && trimmed.ends_with(')'));
    let body = trimmed
        .chars()
        .filter(|character| character.is_ascii_digit() || *character == '.' || *character == ',')
        .collect::<String>();
    let value = parse_numeric_body(&body)?;
    Some(if negative { -value } else { value })
}

/// Tolerates comma thousands separators and OCR-doubled decimal points.
fn parse_numeric_body(body: &str) -> Option<f64> {
    let mut cleaned = body.replace(',', "");
    if cleaned.matches('.').count() > 1 {
        let parts = cleaned.split('.').collect::<Vec<&str>>();
        let (last, rest) = parts.split_last()?;
        cleaned = format!("{}.{}", rest.concat(), last);
    }
    cleaned.parse::<f64>().ok()
}

/// True for a token that reads as money on its own: explicit marker, decimal
/// part, or comma-grouped digits.
pub fn is_money_token(token: &str) -> bool {
    let trimmed = token.trim().trim_matches(|character| character == '(' || character == ')');
    if !trimmed.chars().any(|character| character.is_ascii_digit()) {
        return false;
    }
    let marked = trimmed.contains('₱')
        || trimmed.contains('$')
        || trimmed.starts_with("PHP")
        || trimmed.starts_with("Php")
        || (trimmed.starts_with('P')
            && trimmed
                .chars()
                .nth(1)
                .map(|character| character.is_ascii_digit())
                .unwrap_or(false));
    if marked {
        return true;
    }
    let body = trimmed.trim_start_matches('-');
    let decimal = Regex::new(r"^\d[\d,]*\.\d{1,2}$")
        .map(|regex| regex.is_match(body))
        .unwrap_or(false);
    let grouped = Regex::new(r"^\d{1,3}(?:,\d{3})+$")
        .map(|regex| regex.is_match(body))
        .unwrap_or(false);
    decimal || grouped
}

/// A bare 1-3 digit integer, the shape quantities take in item rows.
pub fn is_bare_quantity_token(token: &str) -> bool {
    let trimmed = token.trim();
    !trimmed.is_empty()
        && trimmed.len() <= 3
        && trimmed.chars().all(|character| character.is_ascii_digit())
}

pub fn parse_quantity(token: &str) -> Option<i64> {
    let cleaned = token
        .trim()
        .trim_start_matches(['x', 'X', '×'])
        .trim_end_matches(['x', 'X', '×', '.', ')'])
        .trim();
    let value = cleaned.parse::<i64>().ok()?;
    if (1..=9999).contains(&value) {
        Some(value)
    } else {
        None
    }
}

/// Strip currency, digits and punctuation from a line, leaving the lowercase
/// label words used for fuzzy matching.
pub fn normalize_label_text(line: &str) -> String {
    let letters = line
        .chars()
        .map(|character| {
            if character.is_alphabetic() {
                character.to_ascii_lowercase()
            } else {
                ' '
            }
        })
        .collect::<String>();
    letters
        .split_whitespace()
        .filter(|word| !matches!(*word, "php" | "p" | "peso" | "pesos" | "usd"))
        .collect::<Vec<&str>>()
        .join(" ")
}

pub fn unescape_xml(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}
