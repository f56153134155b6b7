pub fn truncate_utf8_prefix(value: &str, max_bytes: usize) -> String {
    if max_bytes == 0 {
        return String::new();
    }
    if value.len() <= max_bytes {
        return value.to_string();
    }
    let mut end = max_bytes;
    while end > 0 && !value.is_char_boundary(end) {
        end -= 1;
    }
    value[..end].to_string()
}

/// Caps upstream text (often whole HTML error pages) before it reaches a tool result.
pub fn truncate_with_ellipsis(value: &str, max_bytes: usize) -> String {
    if value.len() <= max_bytes {
        return value.to_string();
    }
    format!("{}...", truncate_utf8_prefix(value, max_bytes))
}

/// Drops a single leading `/` so the value can follow a `/` separator.
pub fn strip_leading_slash(value: &str) -> &str {
    value.strip_prefix('/').unwrap_or(value)
}

#[cfg(test)]
mod tests {
    use super::{strip_leading_slash, truncate_utf8_prefix, truncate_with_ellipsis};

    #[test]
    fn truncate_utf8_prefix_handles_ascii() {
        assert_eq!(truncate_utf8_prefix("hello", 3), "hel");
    }

    #[test]
    fn truncate_utf8_prefix_does_not_split_utf8() {
        assert_eq!(truncate_utf8_prefix("a\u{1F600}b", 2), "a");
        assert_eq!(truncate_utf8_prefix("a\u{1F600}b", 5), "a\u{1F600}");
    }

    #[test]
    fn ellipsis_only_when_truncated() {
        assert_eq!(truncate_with_ellipsis("short", 10), "short");
        assert_eq!(truncate_with_ellipsis("0123456789ab", 10), "0123456789...");
    }

    #[test]
    fn strips_one_leading_slash() {
        assert_eq!(strip_leading_slash("/en/products"), "en/products");
        assert_eq!(strip_leading_slash("en/products"), "en/products");
        assert_eq!(strip_leading_slash("//en"), "/en");
    }
}
