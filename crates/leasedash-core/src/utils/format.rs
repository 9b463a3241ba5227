use std::cmp::Ordering;

/// Truncate a string to a maximum length, adding ellipsis if needed
pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else if max_len <= 3 {
        s.chars().take(max_len).collect()
    } else {
        let truncated: String = s.chars().take(max_len - 3).collect();
        format!("{}...", truncated)
    }
}

/// Format a date or timestamp string for display
pub fn format_date(date: &str) -> String {
    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(date) {
        dt.format("%b %d, %Y").to_string()
    } else if let Ok(d) = chrono::NaiveDate::parse_from_str(date, "%Y-%m-%d") {
        d.format("%b %d, %Y").to_string()
    } else if date.len() >= 10 && date.is_char_boundary(10) {
        date[..10].to_string()
    } else {
        date.to_string()
    }
}

pub fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

pub fn cmp_ignore_case(a: &str, b: &str) -> Ordering {
    a.to_lowercase().cmp(&b.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_string() {
        assert_eq!(truncate_string("Hello", 10), "Hello");
        assert_eq!(truncate_string("Hello World", 8), "Hello...");
        assert_eq!(truncate_string("Hi", 2), "Hi");
        assert_eq!(truncate_string("Årsrapport", 5), "År...");
    }

    #[test]
    fn test_format_date() {
        assert_eq!(format_date("2024-12-31"), "Dec 31, 2024");
        assert_eq!(format_date("2024-01-05T10:00:00Z"), "Jan 05, 2024");
        assert_eq!(format_date("2024-01-05 10:00:00"), "2024-01-05");
        assert_eq!(format_date("soon"), "soon");
    }

    #[test]
    fn test_case_insensitive_helpers() {
        assert!(contains_ignore_case("Lease Portfolio Q4", "portfolio"));
        assert!(!contains_ignore_case("Lease", "rent"));
        assert_eq!(cmp_ignore_case("alpha", "Beta"), Ordering::Less);
        assert_eq!(cmp_ignore_case("IFRS", "ifrs"), Ordering::Equal);
    }
}
