#![forbid(unsafe_code)]

//! Duration display helpers.

/// A duration as the upstream hands it over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DurationValue<'a> {
    /// Already formatted (`"3:40"`, `"1:02:03"`); passed through untouched.
    Text(&'a str),
    Seconds(u64),
}

/// Renders a duration as `minutes:seconds`. Minutes are not padded (and
/// not folded into hours), seconds always have two digits.
pub fn format_duration(value: Option<DurationValue<'_>>) -> String {
    match value {
        Some(DurationValue::Text(text)) => text.to_string(),
        Some(DurationValue::Seconds(total)) => format!("{}:{:02}", total / 60, total % 60),
        None => String::new(),
    }
}

/// Inverse of [`format_duration`]: `"m:ss"` or `"h:mm:ss"` to seconds.
pub fn parse_duration_seconds(text: &str) -> Option<u64> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }
    let parts = trimmed
        .split(':')
        .map(|part| part.trim().parse::<u64>().ok())
        .collect::<Option<Vec<_>>>()?;
    match parts.as_slice() {
        [seconds] => Some(*seconds),
        [minutes, seconds] if *seconds < 60 => Some(minutes * 60 + seconds),
        [hours, minutes, seconds] if *minutes < 60 && *seconds < 60 => {
            Some(hours * 3600 + minutes * 60 + seconds)
        }
        _ => None,
    }
}
