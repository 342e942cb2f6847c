/// Converts an arbitrary string into a name safe for use as an object key
/// segment: leading and trailing whitespace removed, interior spaces turned
/// into underscores, and everything except alphanumerics, `-`, `_`, and `.`
/// dropped.
pub fn valid_object_name(raw: &str) -> String {
    raw.trim()
        .chars()
        .map(|c| if c == ' ' { '_' } else { c })
        .filter(|c| c.is_alphanumeric() || matches!(c, '-' | '_' | '.'))
        .collect()
}
