//! Display formatting shared by the HTML and terminal views.

use chrono::{DateTime, Local, NaiveDateTime, SecondsFormat, TimeZone, Utc};

const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Parse an RFC 3339 timestamp, or a naive one taken as local time.
pub fn parse_timestamp(timestamp: &str) -> Option<DateTime<Local>> {
    let timestamp = timestamp.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(timestamp) {
        return Some(dt.with_timezone(&Local));
    }
    NAIVE_FORMATS.iter().find_map(|format| {
        let naive = NaiveDateTime::parse_from_str(timestamp, format).ok()?;
        Local.from_local_datetime(&naive).earliest()
    })
}

/// Time of day, or the raw text when it does not parse.
pub fn local_time(timestamp: &str) -> String {
    format_or_raw(timestamp, "%H:%M:%S")
}

pub fn local_datetime(timestamp: &str) -> String {
    format_or_raw(timestamp, "%Y-%m-%d %H:%M:%S")
}

fn format_or_raw(timestamp: &str, format: &str) -> String {
    if timestamp.trim().is_empty() {
        return "-".to_string();
    }
    match parse_timestamp(timestamp) {
        Some(dt) => dt.format(format).to_string(),
        None => timestamp.to_string(),
    }
}

/// Current UTC time, as stamped on locally recorded turns.
pub fn now_iso() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Similarity in [0, 1] as a percentage with one decimal.
pub fn percent(similarity: f64) -> String {
    format!("{:.1}", similarity * 100.0)
}

pub fn round_average(value: f64) -> i64 {
    value.round() as i64
}

/// Cut `text` to `max_chars` characters, marking the cut with "...".
pub fn truncate(text: &str, max_chars: usize) -> String {
    let text = text.trim();
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let cut: String = text.chars().take(max_chars).collect();
    format!("{}...", cut.trim_end())
}

pub fn plural(count: u64, singular: &str, plural: &str) -> String {
    if count == 1 {
        format!("{} {}", count, singular)
    } else {
        format!("{} {}", count, plural)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_naive_timestamps_keep_wall_clock() {
        assert_eq!(local_time("2024-05-01T10:00:00"), "10:00:00");
        assert_eq!(local_time("2024-05-01T10:00:00.123456"), "10:00:00");
        assert_eq!(local_datetime("2024-05-01 09:30:15"), "2024-05-01 09:30:15");
    }

    #[test]
    fn test_unparseable_timestamps_pass_through() {
        assert_eq!(local_time("yesterday"), "yesterday");
        assert_eq!(local_time(""), "-");
    }

    #[test]
    fn test_rfc3339_parses() {
        assert!(parse_timestamp("2024-05-01T10:00:00Z").is_some());
        assert!(parse_timestamp(&now_iso()).is_some());
    }

    #[test]
    fn test_percent() {
        assert_eq!(percent(0.92), "92.0");
        assert_eq!(percent(0.875), "87.5");
        assert_eq!(percent(0.0), "0.0");
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("a longer excerpt", 8), "a longer...");
        assert_eq!(truncate("éèàùç", 2), "éè...");
    }

    #[test]
    fn test_round_average() {
        assert_eq!(round_average(12.5), 13);
        assert_eq!(round_average(12.4), 12);
    }
}
