//! Single-level pseudo-directory listing.
//!
//! The bucket namespace is flat; a "directory" exists only as a shared key
//! prefix. Listing asks the service for every key under the prefix and
//! folds the immediate children back into directories and files.

use crate::{
    error::{Error, Result},
    handle::{Mode, ObjectHandle},
    types::Listing,
};

impl ObjectHandle {
    /// Lists the immediate children of the directory-shaped key this handle
    /// was opened on.
    ///
    /// The handle must be open in read mode and the key must end in `/`.
    /// Only one level is supported: a key that still contains `/` after
    /// stripping its outer slashes (for example `/static/css/`) fails with
    /// [`Error::Unsupported`] before any network call.
    pub fn listdir(&self) -> Result<Listing> {
        if self.is_closed() {
            return Err(Error::invalid_config("handle is closed"));
        }
        if self.mode() != Mode::Read {
            return Err(Error::invalid_config(
                "listing requires a handle opened in read mode",
            ));
        }

        let key = self.key();
        if !key.ends_with('/') {
            return Err(Error::unsupported(
                "listing requires a directory-shaped key ending in '/'",
            ));
        }

        let prefix = key.trim_matches('/');
        if prefix.contains('/') {
            return Err(Error::unsupported(
                "multi-level directory listing is not supported",
            ));
        }

        let keys = self.bucket().list_prefix(prefix)?;
        Ok(partition_keys(&keys, prefix))
    }
}

/// Splits the returned keys into the immediate children of `prefix`.
///
/// Each key is stripped of the queried prefix; a remainder that still
/// contains `/` contributes its first segment as a directory, anything else
/// is a file. Set semantics deduplicate repeated parents.
pub(crate) fn partition_keys(keys: &[String], prefix: &str) -> Listing {
    let mut listing = Listing::default();

    for key in keys {
        let Some(rest) = key.strip_prefix(prefix) else {
            continue;
        };
        let rest = rest.trim_start_matches('/');
        if rest.is_empty() {
            continue;
        }

        match rest.split_once('/') {
            Some((directory, _)) if !directory.is_empty() => {
                listing.directories.insert(directory.to_string());
            }
            Some(_) => {}
            None => {
                listing.files.insert(rest.to_string());
            }
        }
    }

    listing
}
