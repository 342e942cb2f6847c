//! Deterministic request canonicalization: percent encoding, canonical
//! query strings, and canonical header blocks. Pure functions, no I/O.

use http::HeaderMap;

fn is_unreserved(byte: u8) -> bool {
    matches!(byte, b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~')
}

/// Percent-encodes every reserved byte, including `/`.
pub(crate) fn percent_encode(input: &str) -> String {
    percent_encode_impl(input, false)
}

/// Percent-encodes reserved bytes but preserves `/` segment separators.
pub(crate) fn percent_encode_path(input: &str) -> String {
    percent_encode_impl(input, true)
}

fn percent_encode_impl(input: &str, preserve_slash: bool) -> String {
    let bytes = input.as_bytes();
    let mut out = String::with_capacity(bytes.len());
    for &b in bytes {
        if is_unreserved(b) || (preserve_slash && b == b'/') {
            out.push(b as char);
            continue;
        }

        out.push('%');
        out.push(hex_upper(b >> 4));
        out.push(hex_upper(b & 0x0F));
    }
    out
}

fn hex_upper(nibble: u8) -> char {
    match nibble {
        0..=9 => (b'0' + nibble) as char,
        10..=15 => (b'A' + (nibble - 10)) as char,
        _ => '0',
    }
}

/// Encodes and sorts query parameters into the canonical `k=v&k=v` form.
///
/// Pairs are ordered by encoded key, then encoded value. An empty parameter
/// list produces an empty string.
pub(crate) fn canonical_query_string(params: &[(String, String)]) -> String {
    let mut items = params
        .iter()
        .map(|(k, v)| (percent_encode(k), percent_encode(v)))
        .collect::<Vec<_>>();

    items.sort_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.cmp(&b.1)));

    let mut out = String::new();
    for (idx, (k, v)) in items.into_iter().enumerate() {
        if idx > 0 {
            out.push('&');
        }
        out.push_str(&k);
        out.push('=');
        out.push_str(&v);
    }
    out
}

/// Builds the canonical header block and the signed-header-names list.
///
/// Header names are lowercased and sorted; values are trimmed with interior
/// whitespace collapsed. The block carries one `name:value\n` line per
/// header (trailing newline included); the second value is the `;`-joined
/// name list.
pub(crate) fn canonical_headers(headers: &HeaderMap) -> (String, String) {
    let mut pairs = headers
        .iter()
        .filter_map(|(name, value)| {
            let name_str = name.as_str();
            if !is_signable_header(name_str) {
                return None;
            }
            let value_str = value.to_str().ok()?;
            Some((
                name_str.to_ascii_lowercase(),
                normalize_header_value(value_str),
            ))
        })
        .collect::<Vec<_>>();

    pairs.sort_by(|a, b| a.0.cmp(&b.0));

    let mut canonical = String::new();
    let mut signed_names = String::new();
    for (idx, (name, value)) in pairs.into_iter().enumerate() {
        canonical.push_str(&name);
        canonical.push(':');
        canonical.push_str(&value);
        canonical.push('\n');

        if idx > 0 {
            signed_names.push(';');
        }
        signed_names.push_str(&name);
    }

    (canonical, signed_names)
}

fn is_signable_header(name: &str) -> bool {
    match name {
        "host" | "content-type" | "content-md5" => true,
        _ => name.starts_with("x-amz-"),
    }
}

fn normalize_header_value(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut in_ws = false;
    for c in value.trim().chars() {
        if c.is_whitespace() {
            in_ws = true;
            continue;
        }
        if in_ws && !out.is_empty() {
            out.push(' ');
        }
        in_ws = false;
        out.push(c);
    }
    out
}
