use std::str::FromStr;

/// Collapse runs of whitespace into single spaces and trim the ends
pub fn normalize_ws(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Normalize a table header or list label into a column key.
/// "Date of birth" -> "date_of_birth", "Avg. speed" -> "avg_speed", "#" -> "rank"
pub fn column_key(label: &str) -> String {
    let trimmed = label.trim();
    if trimmed == "#" || trimmed == "Pos." {
        return "rank".to_string();
    }

    let mut key = String::with_capacity(trimmed.len());
    let mut pending_sep = false;
    for c in trimmed.chars() {
        if c.is_alphanumeric() {
            if pending_sep && !key.is_empty() {
                key.push('_');
            }
            pending_sep = false;
            key.extend(c.to_lowercase());
        } else {
            pending_sep = true;
        }
    }
    key
}

/// Parse an integer out of a table cell: "1,234" -> 1234, "52 riders" -> 52.
///
/// `,` `'` and `.` count as thousands separators only when exactly three
/// digits follow; anything else ends the number, so "27.9" -> 27.
/// Returns None when the text does not start with a digit.
pub fn parse_count<T: FromStr>(s: &str) -> Option<T> {
    let chars: Vec<char> = s.trim().chars().collect();
    let mut digits = String::new();
    for (i, &c) in chars.iter().enumerate() {
        if c.is_ascii_digit() {
            digits.push(c);
            continue;
        }
        let separator = matches!(c, ',' | '\'' | '.') && !digits.is_empty();
        if !separator || !is_digit_group(&chars[i + 1..]) {
            break;
        }
    }
    if digits.is_empty() {
        return None;
    }
    digits.parse().ok()
}

/// Exactly three digits, then a non-digit or the end
fn is_digit_group(rest: &[char]) -> bool {
    rest.len() >= 3
        && rest[..3].iter().all(char::is_ascii_digit)
        && !rest.get(3).is_some_and(char::is_ascii_digit)
}

/// Parse a decimal out of a table cell: "3,405.8 km" -> 3405.8, "41.25 km/h" -> 41.25
pub fn parse_decimal(s: &str) -> Option<f64> {
    let number: String = s
        .trim()
        .chars()
        .take_while(|c| c.is_ascii_digit() || *c == '.' || *c == ',')
        .filter(|c| *c != ',')
        .collect();
    if number.is_empty() || number == "." {
        return None;
    }
    number.parse().ok()
}
