//! File-like handles over remote objects.
//!
//! A handle is produced in a definite state by [`OpenRequest::finish`] and
//! only moves forward: `Reading` or `Writing` until `close()`/`delete()`,
//! then `Closed` for good. A finished handle is never reset in place; open
//! a fresh one instead.

use bytes::Bytes;
use http::{HeaderMap, Method, StatusCode};

use crate::{
    auth::Acl,
    client::{Bucket, normalize_key},
    error::{Error, Result},
    transport::{TransportResponse, response_error},
    types::ObjectMetadata,
    util,
};

/// Mode in which an object handle is opened.
///
/// `Write` and `Append` both flush the buffered content on `close()`; they
/// differ only in intent, as the service replaces the stored object either
/// way.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
    Read,
    Write,
    Append,
}

/// Builder for an [`ObjectHandle`], created by [`Bucket::open`].
pub struct OpenRequest {
    bucket: Bucket,
    key: String,
    mode: Mode,
    content_type: Option<String>,
    acl: Acl,
    extra_headers: Vec<(String, String)>,
}

impl OpenRequest {
    pub(crate) fn new(bucket: Bucket, key: String, mode: Mode) -> Self {
        Self {
            bucket,
            key,
            mode,
            content_type: None,
            acl: Acl::default(),
            extra_headers: Vec::new(),
        }
    }

    /// Sets an explicit content type, bypassing extension-based guessing.
    pub fn content_type(mut self, value: impl Into<String>) -> Self {
        self.content_type = Some(value.into());
        self
    }

    /// Sets the canned ACL applied when the object is stored.
    pub fn acl(mut self, acl: Acl) -> Self {
        self.acl = acl;
        self
    }

    /// Adds a header sent (and signed) with every request of this handle.
    pub fn extra_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra_headers.push((name.into(), value.into()));
        self
    }

    /// Validates the key and returns a fresh handle.
    pub fn finish(self) -> Result<ObjectHandle> {
        let key = normalize_key(&self.key)?;
        let state = match self.mode {
            Mode::Read => HandleState::Reading { fetched: None },
            Mode::Write | Mode::Append => HandleState::Writing { buffer: Vec::new() },
        };

        Ok(ObjectHandle {
            bucket: self.bucket,
            key,
            mode: self.mode,
            acl: self.acl,
            explicit_content_type: self.content_type,
            extra_headers: self.extra_headers,
            state,
        })
    }
}

struct Fetched {
    body: Bytes,
    headers: HeaderMap,
}

enum HandleState {
    Reading { fetched: Option<Fetched> },
    Writing { buffer: Vec<u8> },
    Closed,
}

/// A stateful cursor over one remote object key.
///
/// All mutating operations take `&mut self`, so a single handle cannot be
/// used concurrently; clone the [`Bucket`] and open independent handles
/// instead.
pub struct ObjectHandle {
    bucket: Bucket,
    key: String,
    mode: Mode,
    acl: Acl,
    explicit_content_type: Option<String>,
    extra_headers: Vec<(String, String)>,
    state: HandleState,
}

impl ObjectHandle {
    /// The normalized object key this handle is bound to.
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// URL of the object: scheme, virtual-hosted bucket host, and key. No
    /// query, no fragment.
    pub fn url(&self) -> Result<String> {
        let prefixed = self.bucket.prefixed_key(&self.key);
        Ok(self.bucket.object_url(&prefixed)?.to_string())
    }

    /// Resolved content type: the explicit value set at open time, else the
    /// type observed on a previous `read()`, else a guess from the file
    /// extension, else the generic binary default.
    pub fn content_type(&self) -> String {
        if let Some(explicit) = &self.explicit_content_type {
            return explicit.clone();
        }

        if let HandleState::Reading {
            fetched: Some(fetched),
        } = &self.state
        {
            if let Some(observed) =
                util::headers::header_string(&fetched.headers, http::header::CONTENT_TYPE)
            {
                return observed;
            }
        }

        util::mime::guess_content_type(&self.key).to_string()
    }

    /// Size of the locally held bytes. Pure: reports the write buffer or
    /// the last fetched body, never the network; use [`Self::metadata`] for
    /// the remote size.
    pub fn buffered_size(&self) -> usize {
        match &self.state {
            HandleState::Reading {
                fetched: Some(fetched),
            } => fetched.body.len(),
            HandleState::Reading { fetched: None } => 0,
            HandleState::Writing { buffer } => buffer.len(),
            HandleState::Closed => 0,
        }
    }

    /// Fetches the object's content.
    ///
    /// Distinguishes an absent object (`Error::NotFound`, signalled by a
    /// non-success response with no length indicator) from every other
    /// failure, which carries the status and body.
    pub fn read(&mut self) -> Result<Bytes> {
        match &self.state {
            HandleState::Reading { .. } => {}
            HandleState::Writing { .. } => {
                return Err(Error::invalid_config("handle is not open for reading"));
            }
            HandleState::Closed => return Err(Error::invalid_config("handle is closed")),
        }

        let resp = self.send(Method::GET, &[])?;
        if resp.status != StatusCode::OK {
            if resp.headers.get(http::header::CONTENT_LENGTH).is_none() {
                return Err(Error::not_found(self.key.clone()));
            }
            return Err(response_error(resp.status, &resp.body));
        }

        let body = resp.body.clone();
        if let HandleState::Reading { fetched } = &mut self.state {
            *fetched = Some(Fetched {
                body: resp.body,
                headers: resp.headers,
            });
        }

        Ok(body)
    }

    /// Appends content to the local buffer. No network I/O happens until
    /// `close()`.
    pub fn write(&mut self, content: impl AsRef<[u8]>) -> Result<()> {
        match &mut self.state {
            HandleState::Writing { buffer } => {
                buffer.extend_from_slice(content.as_ref());
                Ok(())
            }
            HandleState::Reading { .. } => Err(Error::invalid_config(
                "handle must be opened in write or append mode to write",
            )),
            HandleState::Closed => Err(Error::invalid_config("handle is closed")),
        }
    }

    /// Flushes the buffer, if any, and finishes the handle.
    ///
    /// A handle opened for writing with a non-empty buffer is stored with a
    /// single PUT; 200 and 204 both count as success. Closing a read-mode
    /// or never-written handle is a deliberate no-op. On a failed flush the
    /// handle keeps its buffer so the caller may retry.
    pub fn close(&mut self) -> Result<()> {
        let state = std::mem::replace(&mut self.state, HandleState::Closed);
        let HandleState::Writing { buffer } = state else {
            return Ok(());
        };
        if buffer.is_empty() {
            return Ok(());
        }

        match self.send(Method::PUT, &buffer) {
            Ok(resp) if resp.status == StatusCode::OK || resp.status == StatusCode::NO_CONTENT => {
                Ok(())
            }
            Ok(resp) => {
                self.state = HandleState::Writing { buffer };
                Err(response_error(resp.status, &resp.body))
            }
            Err(err) => {
                self.state = HandleState::Writing { buffer };
                Err(err)
            }
        }
    }

    /// Removes the object. 200 and 204 both count as success, so deleting
    /// an already-deleted key succeeds. The handle is finished afterwards.
    pub fn delete(&mut self) -> Result<()> {
        if matches!(self.state, HandleState::Closed) {
            return Err(Error::invalid_config("handle is closed"));
        }

        let resp = self.send(Method::DELETE, &[])?;
        self.state = HandleState::Closed;

        if resp.status == StatusCode::OK || resp.status == StatusCode::NO_CONTENT {
            Ok(())
        } else {
            Err(response_error(resp.status, &resp.body))
        }
    }

    /// Probes the object with a HEAD request.
    pub fn exists(&self) -> Result<bool> {
        if matches!(self.state, HandleState::Closed) {
            return Err(Error::invalid_config("handle is closed"));
        }

        let resp = self.send(Method::HEAD, &[])?;
        if resp.status == StatusCode::OK {
            Ok(true)
        } else if resp.status == StatusCode::NOT_FOUND {
            Ok(false)
        } else {
            Err(response_error(resp.status, &resp.body))
        }
    }

    /// Fetches the object's metadata with a HEAD request.
    ///
    /// This is the explicit replacement for size/mtime accessors: it always
    /// performs network I/O and never touches the local buffer.
    pub fn metadata(&self) -> Result<ObjectMetadata> {
        if matches!(self.state, HandleState::Closed) {
            return Err(Error::invalid_config("handle is closed"));
        }

        let resp = self.send(Method::HEAD, &[])?;
        if resp.status == StatusCode::OK {
            Ok(ObjectMetadata::from_headers(&resp.headers))
        } else if resp.status == StatusCode::NOT_FOUND {
            Err(Error::not_found(self.key.clone()))
        } else {
            Err(response_error(resp.status, &resp.body))
        }
    }

    pub(crate) fn bucket(&self) -> &Bucket {
        &self.bucket
    }

    pub(crate) fn is_closed(&self) -> bool {
        matches!(self.state, HandleState::Closed)
    }

    fn send(&self, method: Method, body: &[u8]) -> Result<TransportResponse> {
        self.bucket.send_object(
            method,
            &self.key,
            body,
            &self.content_type(),
            self.acl,
            &self.extra_headers,
        )
    }
}

impl Drop for ObjectHandle {
    fn drop(&mut self) {
        if let HandleState::Writing { buffer } = &self.state {
            if !buffer.is_empty() {
                tracing::warn!(
                    key = %self.key,
                    buffered = buffer.len(),
                    "object handle dropped with unflushed content; call close() to store it"
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use http::HeaderValue;

    use crate::auth::{Auth, Credentials};
    use crate::transport::mock::MockTransport;

    fn bucket_with(transport: Arc<MockTransport>) -> Bucket {
        Bucket::builder("assets")
            .auth(Auth::Static(
                Credentials::new("AKIDEXAMPLE", "secret").unwrap(),
            ))
            .transport(transport)
            .build()
            .unwrap()
    }

    fn ok_response(body: &[u8], content_type: &str) -> TransportResponse {
        let mut headers = HeaderMap::new();
        headers.insert(
            http::header::CONTENT_TYPE,
            HeaderValue::from_str(content_type).unwrap(),
        );
        headers.insert(http::header::CONTENT_LENGTH, HeaderValue::from(body.len()));
        MockTransport::response(StatusCode::OK, headers, body)
    }

    #[test]
    fn read_returns_body_and_caches_response_metadata() {
        let transport = Arc::new(MockTransport::respond_with(vec![ok_response(
            b"hello world",
            "text/html",
        )]));
        let mut handle = bucket_with(transport.clone())
            .open("/greeting", Mode::Read)
            .finish()
            .unwrap();

        let body = handle.read().unwrap();
        assert_eq!(&body[..], b"hello world");
        assert_eq!(handle.buffered_size(), 11);
        // Observed response type wins over the extension guess.
        assert_eq!(handle.content_type(), "text/html");

        let requests = transport.requests.lock().unwrap();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].method, Method::GET);
        assert_eq!(requests[0].url.path(), "/greeting");
        assert!(requests[0].headers.get("authorization").is_some());
        assert!(requests[0].body.is_none());
    }

    #[test]
    fn read_maps_lengthless_failure_to_not_found() {
        let transport = Arc::new(MockTransport::respond_with(vec![MockTransport::response(
            StatusCode::NOT_FOUND,
            HeaderMap::new(),
            b"",
        )]));
        let mut handle = bucket_with(transport)
            .open("/missing.txt", Mode::Read)
            .finish()
            .unwrap();

        let err = handle.read().unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn read_surfaces_other_failures_with_status_and_body() {
        let mut headers = HeaderMap::new();
        headers.insert(http::header::CONTENT_LENGTH, HeaderValue::from_static("9"));
        let transport = Arc::new(MockTransport::respond_with(vec![MockTransport::response(
            StatusCode::FORBIDDEN,
            headers,
            b"forbidden",
        )]));
        let mut handle = bucket_with(transport)
            .open("/secret.txt", Mode::Read)
            .finish()
            .unwrap();

        let err = handle.read().unwrap_err();
        assert_eq!(err.status(), Some(StatusCode::FORBIDDEN));
    }

    #[test]
    fn write_requires_write_or_append_mode() {
        let transport = Arc::new(MockTransport::default());
        let bucket = bucket_with(transport.clone());

        let mut read_handle = bucket.open("/a.txt", Mode::Read).finish().unwrap();
        assert!(read_handle.write(b"nope").is_err());

        let mut append_handle = bucket.open("/a.txt", Mode::Append).finish().unwrap();
        append_handle.write(b"ok").unwrap();
        assert_eq!(append_handle.buffered_size(), 2);

        // Nothing hit the network.
        assert!(transport.requests.lock().unwrap().is_empty());
        append_handle.write(b"").unwrap();
    }

    #[test]
    fn multiple_writes_accumulate() {
        let transport = Arc::new(MockTransport::default());
        let mut handle = bucket_with(transport)
            .open("/a.txt", Mode::Write)
            .finish()
            .unwrap();

        handle.write(b"hello ").unwrap();
        handle.write(b"world").unwrap();
        assert_eq!(handle.buffered_size(), 11);
    }

    #[test]
    fn close_flushes_buffer_with_signed_put() {
        let transport = Arc::new(MockTransport::respond_with(vec![MockTransport::response(
            StatusCode::OK,
            HeaderMap::new(),
            b"",
        )]));
        let mut handle = bucket_with(transport.clone())
            .open("/notes/todo.txt", Mode::Write)
            .acl(Acl::PublicRead)
            .finish()
            .unwrap();

        handle.write(b"hello world").unwrap();
        handle.close().unwrap();

        let requests = transport.requests.lock().unwrap();
        assert_eq!(requests.len(), 1);
        let put = &requests[0];
        assert_eq!(put.method, Method::PUT);
        assert_eq!(put.url.path(), "/notes/todo.txt");
        assert_eq!(put.body.as_deref(), Some(b"hello world".as_slice()));
        assert_eq!(
            put.headers.get("content-md5").unwrap().to_str().unwrap(),
            "XrY7u+Ae7tCTyyK7j1rNww=="
        );
        assert_eq!(
            put.headers.get("content-type").unwrap().to_str().unwrap(),
            "text/plain"
        );
        assert_eq!(
            put.headers.get("x-amz-acl").unwrap().to_str().unwrap(),
            "public-read"
        );
        assert_eq!(
            put.headers.get("content-length").unwrap().to_str().unwrap(),
            "11"
        );
        drop(requests);

        // The handle is finished; further writes are refused.
        assert!(handle.write(b"more").is_err());
    }

    #[test]
    fn close_without_writes_is_a_no_op() {
        let transport = Arc::new(MockTransport::default());
        let bucket = bucket_with(transport.clone());

        let mut read_handle = bucket.open("/a.txt", Mode::Read).finish().unwrap();
        read_handle.close().unwrap();

        let mut write_handle = bucket.open("/a.txt", Mode::Write).finish().unwrap();
        write_handle.close().unwrap();
        // Closing twice stays a no-op.
        write_handle.close().unwrap();

        assert!(transport.requests.lock().unwrap().is_empty());
    }

    #[test]
    fn failed_flush_keeps_buffer_for_retry() {
        let mut error_headers = HeaderMap::new();
        error_headers.insert(http::header::CONTENT_LENGTH, HeaderValue::from_static("5"));
        let transport = Arc::new(MockTransport::respond_with(vec![
            MockTransport::response(StatusCode::INTERNAL_SERVER_ERROR, error_headers, b"boom!"),
            MockTransport::response(StatusCode::OK, HeaderMap::new(), b""),
        ]));
        let mut handle = bucket_with(transport.clone())
            .open("/a.txt", Mode::Write)
            .finish()
            .unwrap();

        handle.write(b"payload").unwrap();
        let err = handle.close().unwrap_err();
        assert_eq!(err.status(), Some(StatusCode::INTERNAL_SERVER_ERROR));

        handle.close().unwrap();
        let requests = transport.requests.lock().unwrap();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[1].body.as_deref(), Some(b"payload".as_slice()));
    }

    #[test]
    fn delete_accepts_both_success_statuses() {
        let transport = Arc::new(MockTransport::respond_with(vec![
            MockTransport::response(StatusCode::NO_CONTENT, HeaderMap::new(), b""),
            MockTransport::response(StatusCode::OK, HeaderMap::new(), b""),
        ]));
        let bucket = bucket_with(transport);

        let mut first = bucket.open("/a.txt", Mode::Read).finish().unwrap();
        first.delete().unwrap();
        assert!(first.delete().is_err());

        let mut second = bucket.open("/a.txt", Mode::Read).finish().unwrap();
        second.delete().unwrap();
    }

    #[test]
    fn exists_distinguishes_present_absent_and_error() {
        let mut error_headers = HeaderMap::new();
        error_headers.insert(http::header::CONTENT_LENGTH, HeaderValue::from_static("0"));
        let transport = Arc::new(MockTransport::respond_with(vec![
            MockTransport::response(StatusCode::OK, HeaderMap::new(), b""),
            MockTransport::response(StatusCode::NOT_FOUND, HeaderMap::new(), b""),
            MockTransport::response(StatusCode::FORBIDDEN, error_headers, b""),
        ]));
        let bucket = bucket_with(transport);
        let handle = bucket.open("/a.txt", Mode::Read).finish().unwrap();

        assert!(handle.exists().unwrap());
        assert!(!handle.exists().unwrap());
        assert_eq!(
            handle.exists().unwrap_err().status(),
            Some(StatusCode::FORBIDDEN)
        );
    }

    #[test]
    fn metadata_is_an_explicit_network_fetch() {
        let mut headers = HeaderMap::new();
        headers.insert(
            http::header::CONTENT_TYPE,
            HeaderValue::from_static("text/plain"),
        );
        headers.insert(http::header::CONTENT_LENGTH, HeaderValue::from_static("42"));
        headers.insert(
            http::header::LAST_MODIFIED,
            HeaderValue::from_static("Sun, 06 Nov 1994 08:49:37 GMT"),
        );
        let transport = Arc::new(MockTransport::respond_with(vec![
            MockTransport::response(StatusCode::OK, headers, b""),
            MockTransport::response(StatusCode::NOT_FOUND, HeaderMap::new(), b""),
        ]));
        let bucket = bucket_with(transport.clone());
        let handle = bucket.open("/a.txt", Mode::Read).finish().unwrap();

        let meta = handle.metadata().unwrap();
        assert_eq!(meta.content_length, Some(42));
        assert_eq!(meta.content_type.as_deref(), Some("text/plain"));
        assert_eq!(meta.last_modified.unwrap().unix_timestamp(), 784_111_777);

        assert!(handle.metadata().unwrap_err().is_not_found());
        assert_eq!(transport.requests.lock().unwrap().len(), 2);
    }

    #[test]
    fn content_type_resolution_order() {
        let transport = Arc::new(MockTransport::default());
        let bucket = bucket_with(transport);

        let explicit = bucket
            .open("/a.bin", Mode::Write)
            .content_type("application/json")
            .finish()
            .unwrap();
        assert_eq!(explicit.content_type(), "application/json");

        let guessed = bucket.open("/notes/todo.txt", Mode::Write).finish().unwrap();
        assert_eq!(guessed.content_type(), "text/plain");

        let fallback = bucket.open("/blob.xyz", Mode::Write).finish().unwrap();
        assert_eq!(fallback.content_type(), "binary/octet-stream");
    }

    #[test]
    fn url_composes_virtual_hosted_address() {
        let transport = Arc::new(MockTransport::default());
        let bucket = Bucket::builder("assets")
            .name_prefix("staging")
            .transport(transport)
            .build()
            .unwrap();

        let handle = bucket.open("/img/logo.png", Mode::Read).finish().unwrap();
        assert_eq!(
            handle.url().unwrap(),
            "http://assets.s3.amazonaws.com/staging/img/logo.png"
        );
    }
}
