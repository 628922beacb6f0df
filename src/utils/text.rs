/// Trimmed user text, stored exactly as typed.
///
/// Nothing is escaped here; clients escape at render time.
pub fn clean_text(input: &str) -> String {
    input.trim().to_string()
}

/// Like `clean_text`, but maps empty results to `None`.
pub fn clean_optional(input: Option<&str>) -> Option<String> {
    input.map(clean_text).filter(|text| !text.is_empty())
}
