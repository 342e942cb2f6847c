//! Shared response types.

use std::collections::BTreeSet;

use http::HeaderMap;
use time::OffsetDateTime;

use crate::util;

/// Object metadata recovered from response headers, without fetching the
/// body.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ObjectMetadata {
    /// Content type, if reported.
    pub content_type: Option<String>,
    /// Object size in bytes, if reported.
    pub content_length: Option<u64>,
    /// Last modification time, if reported and well-formed.
    pub last_modified: Option<OffsetDateTime>,
    /// Entity tag, if reported.
    pub etag: Option<String>,
}

impl ObjectMetadata {
    pub(crate) fn from_headers(headers: &HeaderMap) -> Self {
        Self {
            content_type: util::headers::header_string(headers, http::header::CONTENT_TYPE),
            content_length: util::headers::header_u64(headers, http::header::CONTENT_LENGTH),
            last_modified: util::headers::header_string(headers, http::header::LAST_MODIFIED)
                .as_deref()
                .and_then(util::headers::parse_http_date),
            etag: util::headers::header_string(headers, http::header::ETAG),
        }
    }
}

/// One level of a pseudo-directory: the names immediately under the queried
/// prefix, split into directories and files. Both are sets; there is no
/// meaningful order and no duplicates.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Listing {
    /// Immediate child directories, relative to the queried prefix.
    pub directories: BTreeSet<String>,
    /// Immediate child files, relative to the queried prefix.
    pub files: BTreeSet<String>,
}
