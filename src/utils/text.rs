//! Text helpers for rendering cards

/// Shorten `content` to at most `max_chars` characters, ending with an
/// ellipsis when something was cut. Respects UTF-8 boundaries.
pub fn truncate_chars(content: &str, max_chars: usize) -> String {
    if content.chars().count() <= max_chars {
        return content.to_string();
    }
    if max_chars == 0 {
        return String::new();
    }
    let kept: String = content.chars().take(max_chars - 1).collect();
    format!("{}…", kept.trim_end())
}

/// Case-insensitive substring match; an empty needle matches everything
pub fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    let needle = needle.trim().to_lowercase();
    needle.is_empty() || haystack.to_lowercase().contains(&needle)
}
