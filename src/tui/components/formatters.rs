// Formatters
//
// Shared text helpers for table cells and headers.

use chrono::NaiveDateTime;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Format a large number with commas for readability
///
/// # Examples
/// ```ignore
/// assert_eq!(format_number(1234567), "1,234,567");
/// assert_eq!(format_number(42), "42");
/// ```
pub fn format_number(n: u64) -> String {
    let s = n.to_string();
    let mut result = String::with_capacity(s.len() + s.len() / 3);
    for (count, ch) in s.chars().rev().enumerate() {
        if count > 0 && count % 3 == 0 {
            result.push(',');
        }
        result.push(ch);
    }
    result.chars().rev().collect()
}

/// Shorten server timestamps ("2025-01-01T09:30:12.123456") to "01-01 09:30:12"
///
/// Anything that does not parse is shown as-is.
pub fn format_timestamp(raw: &str) -> String {
    let trimmed = raw.trim_end_matches('Z');
    let parsed = NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%d %H:%M:%S%.f"));
    match parsed {
        Ok(ts) => ts.format("%m-%d %H:%M:%S").to_string(),
        Err(_) => raw.to_string(),
    }
}

/// Cut `text` to `max` display columns, ending with '…' when shortened
///
/// Counts terminal columns, not chars, so emoji and CJK in usernames and
/// greetings don't overflow their cell. Newlines become spaces.
pub fn truncate(text: &str, max: usize) -> String {
    let flat: String = text
        .chars()
        .map(|c| if c == '\n' || c == '\r' { ' ' } else { c })
        .collect();
    if flat.width() <= max {
        return flat;
    }
    if max == 0 {
        return String::new();
    }

    let mut out = String::new();
    let mut used = 0;
    for ch in flat.chars() {
        let w = ch.width().unwrap_or(0);
        if used + w > max - 1 {
            break;
        }
        out.push(ch);
        used += w;
    }
    out.push('…');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(0), "0");
        assert_eq!(format_number(999), "999");
        assert_eq!(format_number(1000), "1,000");
        assert_eq!(format_number(1234567), "1,234,567");
    }

    #[test]
    fn test_format_timestamp() {
        assert_eq!(format_timestamp("2025-01-01T09:30:12"), "01-01 09:30:12");
        assert_eq!(
            format_timestamp("2024-12-31T23:59:59.123456"),
            "12-31 23:59:59"
        );
        assert_eq!(format_timestamp("yesterday"), "yesterday");
    }

    #[test]
    fn test_truncate_by_display_width() {
        assert_eq!(truncate("hello", 10), "hello");
        assert_eq!(truncate("hello world", 6), "hello…");
        // Each of these is two columns wide
        assert_eq!(truncate("新年快乐", 5), "新年…");
        assert_eq!(truncate("line\nbreak", 20), "line break");
        assert_eq!(truncate("abc", 0), "");
    }
}
