#![forbid(unsafe_code)]

//! View-count parsing and display.
//!
//! The upstream client is configured for the Turkish locale, so display
//! strings use `.` as the thousands separator, `,` as the decimal point and
//! `B` (bin), `Mn` (milyon), `Mr` (milyar) as magnitude suffixes.

use crate::raw::{CountField, RawVideoItem};

/// Magnitude suffixes, longest-match first.
const MAGNITUDES: &[(&str, f64)] = &[("Mr", 1_000_000_000.0), ("Mn", 1_000_000.0), ("B", 1_000.0)];

/// Resolves the view count of an item.
///
/// Encodings are consulted in a fixed order: `view_count.text`,
/// `short_view_count.text`, numeric `views`, numeric `view_count`. The first
/// encoding that is present decides the result; when it cannot be parsed the
/// count is 0 and later encodings are not consulted.
pub fn view_count(item: &RawVideoItem) -> u64 {
    if let Some(text) = present_text(item.view_count.as_ref()) {
        return parse_localized_count(&text);
    }
    if let Some(text) = present_text(item.short_view_count.as_ref()) {
        return parse_abbreviated_count(&text);
    }
    if let Some(number) = item.views.as_ref().and_then(CountField::as_number) {
        return clamp_count(number);
    }
    if let Some(number) = item.view_count.as_ref().and_then(CountField::as_number) {
        return clamp_count(number);
    }
    0
}

/// Reads any counter field: exact numbers as-is, display strings through
/// [`parse_abbreviated_count`].
pub fn count_field(field: Option<&CountField>) -> u64 {
    match field {
        Some(CountField::Number(number)) => clamp_count(*number),
        Some(CountField::Text(text)) => parse_abbreviated_count(&text.to_plain()),
        None => 0,
    }
}

fn present_text(field: Option<&CountField>) -> Option<String> {
    let text = field?.as_text()?.to_plain();
    if text.trim().is_empty() {
        None
    } else {
        Some(text)
    }
}

/// `"1.234.567 görüntüleme"` → 1234567. Takes the first digit run including
/// grouping separators and drops the separators.
pub fn parse_localized_count(text: &str) -> u64 {
    let Some(start) = text.find(|c: char| c.is_ascii_digit()) else {
        return 0;
    };
    let digits: String = text[start..]
        .chars()
        .take_while(|c| c.is_ascii_digit() || *c == '.' || *c == ',')
        .filter(char::is_ascii_digit)
        .collect();
    digits.parse().unwrap_or(0)
}

/// `"2,5 Mn"` → 2500000, `"850 B"` → 850000. Strings without a known suffix
/// are read as exact localized counts.
pub fn parse_abbreviated_count(text: &str) -> u64 {
    let Some(multiplier) = MAGNITUDES
        .iter()
        .find(|(suffix, _)| text.contains(suffix))
        .map(|(_, multiplier)| *multiplier)
    else {
        return parse_localized_count(text);
    };
    match leading_decimal(text) {
        Some(number) => clamp_count(number * multiplier),
        None => 0,
    }
}

/// Parses the first decimal number in `text`, accepting `,` as the decimal
/// point. Only the first separator is honoured.
fn leading_decimal(text: &str) -> Option<f64> {
    let start = text.find(|c: char| c.is_ascii_digit())?;
    let mut number = String::new();
    let mut seen_separator = false;
    for c in text[start..].chars() {
        match c {
            '0'..='9' => number.push(c),
            '.' | ',' if !seen_separator => {
                seen_separator = true;
                number.push('.');
            }
            _ => break,
        }
    }
    number.trim_end_matches('.').parse().ok()
}

fn clamp_count(value: f64) -> u64 {
    if value.is_finite() && value > 0.0 {
        value.floor() as u64
    } else {
        0
    }
}

/// Short display label for a view count, e.g. `"2,5 Mn"`.
pub fn format_views(views: u64) -> String {
    match views {
        0 => "0 görüntüleme".to_string(),
        1_000_000.. => format!("{} Mn", one_decimal(views as f64 / 1_000_000.0)),
        1_000.. => format!("{} B", one_decimal(views as f64 / 1_000.0)),
        _ => views.to_string(),
    }
}

fn one_decimal(value: f64) -> String {
    format!("{value:.1}").replace('.', ",")
}
