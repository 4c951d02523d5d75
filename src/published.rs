#![forbid(unsafe_code)]

//! "Time ago" labels for publish dates.

use chrono::{DateTime, NaiveDate, TimeDelta, Utc};

/// Label used when an item carries no publish information at all.
pub const UNKNOWN_PUBLISHED: &str = "Bilinmiyor";

/// Formats `raw` relative to the current time. See [`format_published_at`].
pub fn format_published(raw: &str) -> String {
    format_published_at(raw, Utc::now())
}

/// Turns an absolute timestamp into a coarse label such as `"3 gün önce"`.
///
/// Accepts RFC 3339 timestamps, `YYYY-MM-DD`, yt-dlp style `YYYYMMDD`
/// dates and Unix seconds. Empty input gives an empty label; anything else that does not parse
/// (including labels the upstream already localized) is returned verbatim.
pub fn format_published_at(raw: &str, now: DateTime<Utc>) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return String::new();
    }
    match parse_timestamp(trimmed) {
        Some(published) => relative_label(now.signed_duration_since(published)),
        None => raw.to_string(),
    }
}

fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(datetime) = DateTime::parse_from_rfc3339(value) {
        return Some(datetime.with_timezone(&Utc));
    }

    let date = NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .or_else(|| compact_date(value));
    match date {
        Some(date) => Some(date.and_hms_opt(0, 0, 0)?.and_utc()),
        None => unix_seconds(value),
    }
}

/// All-digit strings that are not `YYYYMMDD` dates are epoch seconds.
fn unix_seconds(value: &str) -> Option<DateTime<Utc>> {
    if !value.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    DateTime::from_timestamp(value.parse::<i64>().ok()?, 0)
}

fn compact_date(value: &str) -> Option<NaiveDate> {
    if value.len() != 8 || !value.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    NaiveDate::parse_from_str(value, "%Y%m%d").ok()
}

/// Smallest matching bucket wins; every division floors. Future timestamps
/// count as zero elapsed time.
fn relative_label(elapsed: TimeDelta) -> String {
    let elapsed = elapsed.max(TimeDelta::zero());
    let days = elapsed.num_days();

    if elapsed.num_hours() < 1 {
        format!("{} dakika önce", elapsed.num_minutes())
    } else if days < 1 {
        format!("{} saat önce", elapsed.num_hours())
    } else if days < 7 {
        format!("{days} gün önce")
    } else if days < 30 {
        format!("{} hafta önce", days / 7)
    } else if days < 365 {
        format!("{} ay önce", days / 30)
    } else {
        format!("{} yıl önce", days / 365)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 15, 12, 0, 0).unwrap()
    }

    fn ago(delta: TimeDelta) -> String {
        (now() - delta).to_rfc3339()
    }

    #[test]
    fn minutes_bucket() {
        assert_eq!(format_published_at(&ago(TimeDelta::minutes(45)), now()), "45 dakika önce");
        assert_eq!(format_published_at(&ago(TimeDelta::seconds(20)), now()), "0 dakika önce");
    }

    #[test]
    fn hours_bucket() {
        assert_eq!(format_published_at(&ago(TimeDelta::minutes(60)), now()), "1 saat önce");
        assert_eq!(format_published_at(&ago(TimeDelta::hours(23)), now()), "23 saat önce");
    }

    #[test]
    fn days_weeks_months_years() {
        assert_eq!(format_published_at(&ago(TimeDelta::days(3)), now()), "3 gün önce");
        assert_eq!(format_published_at(&ago(TimeDelta::days(20)), now()), "2 hafta önce");
        assert_eq!(format_published_at(&ago(TimeDelta::days(95)), now()), "3 ay önce");
        assert_eq!(format_published_at(&ago(TimeDelta::days(362)), now()), "12 ay önce");
        assert_eq!(format_published_at(&ago(TimeDelta::days(400)), now()), "1 yıl önce");
        assert_eq!(format_published_at(&ago(TimeDelta::days(800)), now()), "2 yıl önce");
    }

    #[test]
    fn date_only_inputs_are_understood() {
        assert_eq!(format_published_at("2026-03-12", now()), "3 gün önce");
        assert_eq!(format_published_at("20250101", now()), "1 yıl önce");
    }

    #[test]
    fn epoch_seconds_are_understood() {
        let three_days = (now() - TimeDelta::days(3)).timestamp().to_string();
        assert_eq!(format_published_at(&three_days, now()), "3 gün önce");
        let two_hours = (now() - TimeDelta::hours(2)).timestamp().to_string();
        assert_eq!(format_published_at(&two_hours, now()), "2 saat önce");
        assert_eq!(format_published_at("99999999999999999999", now()), "99999999999999999999");
    }

    #[test]
    fn future_timestamps_clamp_to_zero() {
        assert_eq!(format_published_at(&ago(TimeDelta::hours(-5)), now()), "0 dakika önce");
    }

    #[test]
    fn unparseable_input_is_returned_verbatim() {
        assert_eq!(format_published_at("2 gün önce", now()), "2 gün önce");
        assert_eq!(format_published_at("yesterday-ish", now()), "yesterday-ish");
        assert_eq!(format_published_at("   ", now()), "");
    }
}
