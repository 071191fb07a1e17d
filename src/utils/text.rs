// Text processing utilities

/// String and text manipulation utilities
pub mod string {
    use unicode_segmentation::UnicodeSegmentation;

    /// Marker appended to truncated text
    pub const ELLIPSIS: &str = "...";

    /// Keep the first `max_graphemes` grapheme clusters, appending an ellipsis
    /// only when something was cut off.
    pub fn truncate_with_ellipsis(text: &str, max_graphemes: usize) -> String {
        let mut graphemes = text.graphemes(true);
        let head: String = graphemes.by_ref().take(max_graphemes).collect();

        if graphemes.next().is_some() {
            format!("{}{}", head, ELLIPSIS)
        } else {
            head
        }
    }
}

/// Human friendly time formatting
pub mod time {
    use chrono::{DateTime, Local, Utc};

    /// Describe `timestamp` relative to `now`: "just now", "N minutes ago",
    /// "N hours ago", or the local calendar date for anything older.
    pub fn relative_time(timestamp: DateTime<Utc>, now: DateTime<Utc>) -> String {
        let elapsed = now.signed_duration_since(timestamp);

        if elapsed.num_seconds() < 60 {
            "just now".to_string()
        } else if elapsed.num_minutes() < 60 {
            format!("{} minutes ago", elapsed.num_minutes())
        } else if elapsed.num_hours() < 24 {
            format!("{} hours ago", elapsed.num_hours())
        } else {
            timestamp
                .with_timezone(&Local)
                .format("%Y-%m-%d")
                .to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};
    use unicode_segmentation::UnicodeSegmentation;

    #[test]
    fn test_truncate_with_ellipsis() {
        assert_eq!(
            string::truncate_with_ellipsis("Hello there, how are you today friend", 20),
            "Hello there, how are..."
        );
        assert_eq!(string::truncate_with_ellipsis("Hello", 20), "Hello");
        assert_eq!(string::truncate_with_ellipsis("", 20), "");
    }

    #[test]
    fn test_truncate_exact_length_has_no_ellipsis() {
        let text = "a".repeat(20);
        assert_eq!(string::truncate_with_ellipsis(&text, 20), text);
    }

    #[test]
    fn test_truncate_counts_graphemes_not_bytes() {
        let text = "你好世界你好世界你好世界你好世界你好世界你好";
        assert_eq!(text.graphemes(true).count(), 22);

        let truncated = string::truncate_with_ellipsis(text, 20);
        assert_eq!(truncated.graphemes(true).count(), 23);
        assert!(truncated.ends_with(string::ELLIPSIS));
    }

    #[test]
    fn test_relative_time_buckets() {
        let now = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();

        assert_eq!(time::relative_time(now - Duration::seconds(30), now), "just now");
        assert_eq!(time::relative_time(now - Duration::minutes(5), now), "5 minutes ago");
        assert_eq!(time::relative_time(now - Duration::hours(3), now), "3 hours ago");

        let old = time::relative_time(now - Duration::days(3), now);
        assert!(old.starts_with("2024-04-"));
    }
}
