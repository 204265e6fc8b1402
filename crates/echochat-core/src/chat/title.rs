//! Session title derivation from the first user message.

/// Maximum number of characters kept from the first message.
pub const TITLE_MAX_CHARS: usize = 30;

/// Marker appended to a title cut at [`TITLE_MAX_CHARS`].
pub const TITLE_TRUNCATION_MARKER: &str = "...";

/// Derive a session title from the first user message.
///
/// Content of at most [`TITLE_MAX_CHARS`] characters is used verbatim.
/// Longer content keeps its first [`TITLE_MAX_CHARS`] characters followed by
/// [`TITLE_TRUNCATION_MARKER`]. Counting is by `char`, so a multi-byte
/// character is never split.
pub fn derive_title(content: &str) -> String {
    match content.char_indices().nth(TITLE_MAX_CHARS) {
        Some((cut, _)) => format!("{}{}", &content[..cut], TITLE_TRUNCATION_MARKER),
        None => content.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_content_is_verbatim() {
        assert_eq!(derive_title("hi"), "hi");
        assert_eq!(derive_title(""), "");
    }

    #[test]
    fn test_exactly_thirty_chars_is_verbatim() {
        let content = "a".repeat(30);
        assert_eq!(derive_title(&content), content);
    }

    #[test]
    fn test_long_content_is_truncated() {
        let content = "abcdefghijklmnopqrstuvwxyz0123456789";
        assert_eq!(derive_title(content), "abcdefghijklmnopqrstuvwxyz0123...");
    }

    #[test]
    fn test_truncation_counts_chars_not_bytes() {
        let content = "é".repeat(31);
        let title = derive_title(&content);
        assert_eq!(title.chars().count(), 33);
        assert!(title.starts_with(&"é".repeat(30)));
        assert!(title.ends_with("..."));
    }
}
