//! Phone number display and normalisation for North American shop numbers.

fn digits(raw: &str) -> String {
    raw.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// The ten national digits of a NANP number, if `raw` is one.
fn national_digits(raw: &str) -> Option<String> {
    let digits = digits(raw);
    match digits.len() {
        10 => Some(digits),
        11 if digits.starts_with('1') => Some(digits[1..].to_string()),
        _ => None,
    }
}

/// Display form `(555) 123-4567`.
///
/// Numbers that are not ten-digit NANP numbers (with or without the leading
/// country code) are returned trimmed but otherwise untouched, so formatting
/// a formatted string yields the same string.
pub fn format_phone(raw: &str) -> String {
    match national_digits(raw) {
        Some(national) => format!(
            "({}) {}-{}",
            &national[0..3],
            &national[3..6],
            &national[6..10]
        ),
        None => raw.trim().to_string(),
    }
}

/// E.164 form used by the API for lookups (`+15551234567`).
pub fn normalize_phone(raw: &str) -> Option<String> {
    if let Some(national) = national_digits(raw) {
        return Some(format!("+1{national}"));
    }

    let trimmed = raw.trim();
    if trimmed.starts_with('+') {
        let digits = digits(trimmed);
        if (8..=15).contains(&digits.len()) {
            return Some(format!("+{digits}"));
        }
    }

    None
}

pub fn caller_label(number: Option<&str>) -> String {
    match number.map(str::trim).filter(|n| !n.is_empty()) {
        Some(number) => format_phone(number),
        None => "Unknown caller".to_string(),
    }
}
