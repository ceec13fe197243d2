// src/util.rs — Shared utility functions

/// Truncate a string for display/logging (UTF-8 safe).
///
/// Returns a substring of at most `max_len` bytes, ensuring the cut
/// point falls on a valid UTF-8 character boundary.
pub fn truncate_str(s: &str, max_len: usize) -> &str {
    if s.len() <= max_len {
        s
    } else {
        let mut end = max_len;
        while end > 0 && !s.is_char_boundary(end) {
            end -= 1;
        }
        &s[..end]
    }
}

/// Derive a session title from the first user prompt: at most 30 bytes,
/// with a trailing ellipsis when the prompt was cut.
pub fn title_excerpt(prompt: &str) -> String {
    let trimmed = prompt.trim();
    let cut = truncate_str(trimmed, 30);
    if cut.len() < trimmed.len() {
        format!("{cut}...")
    } else {
        cut.to_string()
    }
}

/// Format an integer dollar amount with thousands separators: `$1,500`.
pub fn format_usd(amount: u32) -> String {
    let digits = amount.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    let offset = digits.len() % 3;
    for (i, c) in digits.chars().enumerate() {
        if i != 0 && (i + 3 - offset) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    format!("${out}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_short() {
        assert_eq!(truncate_str("hello", 10), "hello");
    }

    #[test]
    fn test_truncate_exact() {
        assert_eq!(truncate_str("hello", 5), "hello");
    }

    #[test]
    fn test_truncate_long() {
        assert_eq!(truncate_str("hello world", 5), "hello");
    }

    #[test]
    fn test_truncate_multibyte() {
        // "café" is 5 bytes (é = 2 bytes), truncating at 4 should not split é
        let s = "café";
        let t = truncate_str(s, 4);
        assert_eq!(t, "caf");
    }

    #[test]
    fn test_title_excerpt_short_prompt_unchanged() {
        assert_eq!(title_excerpt("red velvet sofa"), "red velvet sofa");
    }

    #[test]
    fn test_title_excerpt_long_prompt_gets_ellipsis() {
        let prompt = "a very long prompt about redesigning my entire living room";
        let title = title_excerpt(prompt);
        assert!(title.ends_with("..."));
        assert_eq!(title.len(), 33); // 30 bytes + "..."
    }

    #[test]
    fn test_format_usd_grouping() {
        assert_eq!(format_usd(0), "$0");
        assert_eq!(format_usd(300), "$300");
        assert_eq!(format_usd(1500), "$1,500");
        assert_eq!(format_usd(10000), "$10,000");
        assert_eq!(format_usd(1234567), "$1,234,567");
    }
}
