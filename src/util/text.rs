/// Truncates a response body for inclusion in error diagnostics without
/// splitting a UTF-8 character.
pub(crate) fn truncate_snippet(body: &str, max_len: usize) -> String {
    if body.len() <= max_len {
        return body.to_string();
    }

    let cut = if body.is_char_boundary(max_len) {
        max_len
    } else {
        body.char_indices()
            .take_while(|(idx, _)| *idx < max_len)
            .last()
            .map(|(idx, _)| idx)
            .unwrap_or(0)
    };

    let mut out = body[..cut].to_string();
    out.push_str("...");
    out
}
