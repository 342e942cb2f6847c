use base64::Engine as _;

/// Returns the Content-MD5 value for a request body: the Base64 encoding of
/// its MD5 digest.
pub(crate) fn content_md5(bytes: &[u8]) -> String {
    use md5::Digest as _;

    let digest = md5::Md5::digest(bytes);
    base64::engine::general_purpose::STANDARD.encode(digest)
}
