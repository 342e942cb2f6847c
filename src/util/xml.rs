//! XML decoding for listing and error responses.
//!
//! The listing parser discovers the document namespace from the root
//! element instead of assuming one, then only honors `Contents`/`Key`
//! elements bound to that same namespace.

use quick_xml::NsReader;
use quick_xml::events::Event;
use quick_xml::name::{Namespace, ResolveResult};

use crate::error::{Error, Result};

/// Error document shape returned by the service alongside non-success
/// statuses.
#[derive(Debug, serde::Deserialize)]
pub(crate) struct ServiceErrorBody {
    #[serde(rename = "Code")]
    pub(crate) code: Option<String>,
    #[serde(rename = "Message")]
    pub(crate) message: Option<String>,
}

pub(crate) fn parse_error_xml(body: &str) -> Option<ServiceErrorBody> {
    if body.trim().is_empty() {
        return None;
    }

    quick_xml::de::from_str::<ServiceErrorBody>(body).ok()
}

/// Extracts every `Contents/Key` value from a `ListBucketResult` document.
pub(crate) fn parse_list_keys(body: &str) -> Result<Vec<String>> {
    let mut reader = NsReader::from_str(body);
    reader.config_mut().trim_text(true);

    // The root element's own namespace binding; all lookups below must
    // resolve to the same binding.
    let mut root_ns: Option<Option<Vec<u8>>> = None;
    let mut in_contents = false;
    let mut in_key = false;
    let mut current_key = String::new();
    let mut keys = Vec::new();

    loop {
        let (resolve, event) = reader
            .read_resolved_event()
            .map_err(|e| Error::decode("failed to parse listing XML response", Some(Box::new(e))))?;

        match event {
            Event::Start(e) => {
                let ns = namespace_of(&resolve);
                let local = e.local_name();
                match &root_ns {
                    None => {
                        if local.as_ref() != b"ListBucketResult" {
                            return Err(Error::decode(
                                "unexpected root element in listing response",
                                None,
                            ));
                        }
                        root_ns = Some(ns);
                    }
                    Some(expected) if ns == *expected => {
                        if local.as_ref() == b"Contents" {
                            in_contents = true;
                        } else if in_contents && local.as_ref() == b"Key" {
                            in_key = true;
                            current_key.clear();
                        }
                    }
                    Some(_) => {}
                }
            }
            Event::End(e) => {
                let local = e.local_name();
                if in_key && local.as_ref() == b"Key" {
                    in_key = false;
                    keys.push(std::mem::take(&mut current_key));
                } else if local.as_ref() == b"Contents" {
                    in_contents = false;
                }
            }
            Event::Text(t) if in_key => {
                let text = t.unescape().map_err(|e| {
                    Error::decode("invalid text content in listing response", Some(Box::new(e)))
                })?;
                current_key.push_str(&text);
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if root_ns.is_none() {
        return Err(Error::decode(
            "listing response contained no root element",
            None,
        ));
    }

    Ok(keys)
}

fn namespace_of(resolve: &ResolveResult<'_>) -> Option<Vec<u8>> {
    match resolve {
        ResolveResult::Bound(Namespace(ns)) => Some(ns.to_vec()),
        ResolveResult::Unbound | ResolveResult::Unknown(_) => None,
    }
}
