//! File-extension to media-type mapping used when no explicit content type
//! was provided and none was observed on a response.

/// Fallback media type for unrecognized content.
pub(crate) const DEFAULT_CONTENT_TYPE: &str = "binary/octet-stream";

/// Extension table, matched case-sensitively against the extension as given.
const CONTENT_TYPES: &[(&str, &str)] = &[
    ("bmp", "image/bmp"),
    ("css", "text/css"),
    ("gif", "image/gif"),
    ("html", "text/html"),
    ("jpeg", "image/jpeg"),
    ("jpg", "image/jpeg"),
    ("mp3", "audio/mpeg"),
    ("pdf", "application/pdf"),
    ("png", "image/png"),
    ("rtf", "text/rtf"),
    ("tiff", "image/tiff"),
    ("txt", "text/plain"),
    ("zip", "application/zip"),
];

/// Guesses a media type from the key's file extension.
pub(crate) fn guess_content_type(key: &str) -> &'static str {
    let file_name = key.rsplit('/').next().unwrap_or(key);
    let Some((_, extension)) = file_name.rsplit_once('.') else {
        return DEFAULT_CONTENT_TYPE;
    };

    CONTENT_TYPES
        .iter()
        .find(|(ext, _)| *ext == extension)
        .map(|(_, media_type)| *media_type)
        .unwrap_or(DEFAULT_CONTENT_TYPE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_extensions_resolve() {
        assert_eq!(guess_content_type("/notes/todo.txt"), "text/plain");
        assert_eq!(guess_content_type("/static/css/app.css"), "text/css");
        assert_eq!(guess_content_type("photo.jpeg"), "image/jpeg");
    }

    #[test]
    fn unknown_or_missing_extension_falls_back() {
        assert_eq!(guess_content_type("/data.parquet"), DEFAULT_CONTENT_TYPE);
        assert_eq!(guess_content_type("/README"), DEFAULT_CONTENT_TYPE);
        assert_eq!(guess_content_type(""), DEFAULT_CONTENT_TYPE);
    }

    #[test]
    fn extension_match_is_case_sensitive() {
        assert_eq!(guess_content_type("/shout.TXT"), DEFAULT_CONTENT_TYPE);
    }

    #[test]
    fn dot_in_directory_does_not_confuse_lookup() {
        assert_eq!(guess_content_type("/v1.2/binary"), DEFAULT_CONTENT_TYPE);
    }
}
