//! Formatting utilities for file sizes, dates, and transfer rates.

use chrono::{DateTime, FixedOffset, Utc};

/// Format a byte count for display (e.g., "512 B", "1.50 KB", "34 MB").
///
/// Units are powers of 1024; two decimals are shown below 10 of a unit.
pub fn format_size(size: Option<u64>) -> String {
    const UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];

    let Some(bytes) = size else {
        return "-".to_string();
    };

    let mut num = bytes as f64;
    let mut idx = 0;
    while num >= 1024.0 && idx < UNITS.len() - 1 {
        num /= 1024.0;
        idx += 1;
    }

    if num < 10.0 && idx > 0 {
        format!("{:.2} {}", num, UNITS[idx])
    } else {
        format!("{:.0} {}", num, UNITS[idx])
    }
}

/// Format a transfer rate in bytes per second (e.g., "1.20 MB/s").
pub fn format_rate(bytes_per_second: f64) -> String {
    if !bytes_per_second.is_finite() || bytes_per_second < 0.0 {
        return "-".to_string();
    }
    format!("{}/s", format_size(Some(bytes_per_second as u64)))
}

/// Render Unix seconds as an RFC 1123 HTTP-date ("Thu, 01 Jan 1970 00:00:00 GMT").
///
/// This is the same form servers send in `Last-Modified`, so every listing
/// protocol ends up with one timestamp representation.
pub fn format_http_date(timestamp: i64) -> Option<String> {
    DateTime::<Utc>::from_timestamp(timestamp, 0)
        .map(|dt| dt.format("%a, %d %b %Y %H:%M:%S GMT").to_string())
}

/// Parse an HTTP-date or RFC 3339 timestamp.
pub fn parse_timestamp(value: &str) -> Option<DateTime<FixedOffset>> {
    let value = value.trim();
    DateTime::parse_from_rfc2822(value)
        .or_else(|_| DateTime::parse_from_rfc3339(value))
        .ok()
}

/// Format a timestamp string for the list view as `YYYY-MM-DD HH:MM` (UTC).
///
/// Returns `-` when the value is absent or cannot be parsed.
pub fn format_date(value: Option<&str>) -> String {
    value
        .and_then(parse_timestamp)
        .map(|dt| dt.with_timezone(&Utc).format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| "-".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(None), "-");
        assert_eq!(format_size(Some(0)), "0 B");
        assert_eq!(format_size(Some(500)), "500 B");
        assert_eq!(format_size(Some(1536)), "1.50 KB");
        assert_eq!(format_size(Some(20 * 1024)), "20 KB");
        assert_eq!(format_size(Some(3 * 1024 * 1024)), "3.00 MB");
    }

    #[test]
    fn test_format_rate() {
        assert_eq!(format_rate(2048.0), "2.00 KB/s");
        assert_eq!(format_rate(f64::INFINITY), "-");
    }

    #[test]
    fn test_format_http_date() {
        assert_eq!(
            format_http_date(0).as_deref(),
            Some("Thu, 01 Jan 1970 00:00:00 GMT")
        );
        // 2024-01-01 00:00:00 UTC
        assert_eq!(
            format_http_date(1704067200).as_deref(),
            Some("Mon, 01 Jan 2024 00:00:00 GMT")
        );
    }

    #[test]
    fn test_format_date() {
        assert_eq!(
            format_date(Some("Mon, 01 Jan 2024 13:05:00 GMT")),
            "2024-01-01 13:05"
        );
        assert_eq!(format_date(Some("2024-01-01T13:05:00+02:00")), "2024-01-01 11:05");
        assert_eq!(format_date(Some("yesterday")), "-");
        assert_eq!(format_date(None), "-");
    }
}
