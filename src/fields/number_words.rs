use regex::Regex;

/// Parse an English amount-in-words phrase such as
/// "Three Hundred Forty Four Pesos and 60/100" into 344.60.
/// Supports magnitudes up to millions plus a trailing NN/100 fraction.
pub(super) fn parse_amount(phrase: &str) -> Option<f64> {
    let lowered = phrase.to_lowercase();

    let fraction = Regex::new(r"(\d{1,2})\s*/\s*100")
        .ok()
        .and_then(|regex| regex.captures(&lowered))
        .and_then(|captures| captures[1].parse::<f64>().ok());

    let mut total = 0.0_f64;
    let mut current = 0.0_f64;
    let mut seen_number_word = false;

    for token in lowered
        .split(|character: char| !character.is_ascii_alphabetic())
        .filter(|token| !token.is_empty())
    {
        if let Some(value) = unit_value(token) {
            current += value;
            seen_number_word = true;
            continue;
        }
        match token {
            "hundred" => {
                current = if current == 0.0 { 100.0 } else { current * 100.0 };
                seen_number_word = true;
            }
            "thousand" => {
                let multiplier = if current == 0.0 { 1.0 } else { current };
                total += multiplier * 1_000.0;
                current = 0.0;
                seen_number_word = true;
            }
            "million" => {
                let multiplier = if current == 0.0 { 1.0 } else { current };
                total += multiplier * 1_000_000.0;
                current = 0.0;
                seen_number_word = true;
            }
            // Currency and filler words carry no value.
            _ => {}
        }
    }

    if !seen_number_word {
        return None;
    }

    Some(total + current + fraction.unwrap_or(0.0) / 100.0)
}

fn unit_value(token: &str) -> Option<f64> {
    let value = match token {
        "zero" => 0.0,
        "one" => 1.0,
        "two" => 2.0,
        "three" => 3.0,
        "four" => 4.0,
        "five" => 5.0,
        "six" => 6.0,
        "seven" => 7.0,
        "eight" => 8.0,
        "nine" => 9.0,
        "ten" => 10.0,
        "eleven" => 11.0,
        "twelve" => 12.0,
        "thirteen" => 13.0,
        "fourteen" => 14.0,
        "fifteen" => 15.0,
        "sixteen" => 16.0,
        "seventeen" => 17.0,
        "eighteen" => 18.0,
        "nineteen" => 19.0,
        "twenty" => 20.0,
        "thirty" => 30.0,
        "forty" => 40.0,
        "fifty" => 50.0,
        "sixty" => 60.0,
        "seventy" => 70.0,
        "eighty" => 80.0,
        "ninety" => 90.0,
        _ => return None,
    };
    Some(value)
}
