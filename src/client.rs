use std::{sync::Arc, time::Duration};

use http::{HeaderMap, Method, StatusCode};
use time::OffsetDateTime;
use url::Url;

use crate::{
    auth::{Acl, Auth, Region},
    error::{Error, Result},
    handle::{Mode, OpenRequest},
    sign,
    transport::{OneShotTransport, Transport, TransportResponse},
    util,
};

const DEFAULT_DOMAIN: &str = "s3.amazonaws.com";
const DEFAULT_SCHEME: &str = "http";
const DEFAULT_REGION: &str = "us-east-1";

/// A session bound to one bucket.
///
/// Cheap to clone; clones share the credentials and transport but nothing
/// else. Handles produced from a `Bucket` are fully isolated from each
/// other.
#[derive(Clone)]
pub struct Bucket {
    inner: Arc<Inner>,
}

struct Inner {
    name: String,
    domain: String,
    scheme: String,
    region: Region,
    auth: Auth,
    name_prefix: Option<String>,
    transport: Arc<dyn Transport>,
}

pub struct BucketBuilder {
    name: String,
    domain: String,
    scheme: String,
    region: Option<String>,
    auth: Auth,
    name_prefix: Option<String>,
    timeout: Option<Duration>,
    transport: Option<Arc<dyn Transport>>,
}

impl Bucket {
    pub fn builder(name: impl Into<String>) -> BucketBuilder {
        BucketBuilder {
            name: name.into(),
            domain: DEFAULT_DOMAIN.to_string(),
            scheme: DEFAULT_SCHEME.to_string(),
            region: None,
            auth: Auth::Anonymous,
            name_prefix: None,
            timeout: None,
            transport: None,
        }
    }

    /// The bucket name this session is bound to.
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// Starts opening an object handle for the given key and mode.
    pub fn open(&self, key: impl Into<String>, mode: Mode) -> OpenRequest {
        OpenRequest::new(self.clone(), key.into(), mode)
    }

    /// Returns a key that is free for new content, probing existence and
    /// suffixing `_1`, `_2`, ... before the extension until one is found.
    ///
    /// Each probe is a HEAD request, so this performs network I/O.
    pub fn available_key(&self, key: &str) -> Result<String> {
        let key = normalize_key(key)?;
        let (stem, extension) = split_extension(&key);

        let mut candidate = key.clone();
        let mut counter = 1u32;
        while self.open(candidate.as_str(), Mode::Read).finish()?.exists()? {
            candidate = format!("{stem}_{counter}{extension}");
            counter += 1;
        }

        Ok(candidate)
    }

    /// Virtual-hosted host for this bucket.
    pub(crate) fn host(&self) -> String {
        format!("{}.{}", self.inner.name, self.inner.domain)
    }

    /// Key as sent on the wire, with the configured name prefix applied.
    pub(crate) fn prefixed_key(&self, key: &str) -> String {
        let Some(prefix) = &self.inner.name_prefix else {
            return key.to_string();
        };

        let mut out = String::new();
        if !prefix.starts_with('/') {
            out.push('/');
        }
        out.push_str(prefix.trim_end_matches('/'));
        out.push_str(key);
        out
    }

    pub(crate) fn object_url(&self, prefixed_key: &str) -> Result<Url> {
        let path = util::encode::percent_encode_path(prefixed_key);
        Url::parse(&format!(
            "{}://{}{path}",
            self.inner.scheme,
            self.host()
        ))
        .map_err(|_| Error::invalid_config("key does not form a valid object URL"))
    }

    /// Sends one signed object operation and returns the raw exchange.
    pub(crate) fn send_object(
        &self,
        method: Method,
        key: &str,
        body: &[u8],
        content_type: &str,
        acl: Acl,
        extra_headers: &[(String, String)],
    ) -> Result<TransportResponse> {
        let prefixed = self.prefixed_key(key);
        let now = OffsetDateTime::now_utc();
        let headers = sign::v2::request_headers(
            &method,
            &self.inner.name,
            &prefixed,
            &self.inner.auth,
            acl,
            content_type,
            body,
            extra_headers,
            now,
        )?;
        let url = self.object_url(&prefixed)?;

        let span = tracing::debug_span!("bucketfile.request", method = %method, key = %prefixed);
        let _guard = span.enter();

        let body = if body.is_empty() { None } else { Some(body) };
        self.inner.transport.send(&method, &url, &headers, body)
    }

    /// Fetches one page of keys under `prefix` from the bucket root.
    pub(crate) fn list_prefix(&self, prefix: &str) -> Result<Vec<String>> {
        let params: Vec<(String, String)> = if prefix.is_empty() {
            Vec::new()
        } else {
            vec![("prefix".to_string(), prefix.to_string())]
        };
        let canonical_query = util::encode::canonical_query_string(&params);

        let mut url = Url::parse(&format!("{}://{}/", self.inner.scheme, self.host()))
            .map_err(|_| Error::invalid_config("bucket does not form a valid URL"))?;
        if !canonical_query.is_empty() {
            url.set_query(Some(&canonical_query));
        }

        let now = OffsetDateTime::now_utc();
        let headers = match self.inner.auth.credentials() {
            Some(creds) => sign::v4::sign_request(
                &Method::GET,
                &self.host(),
                "/",
                &canonical_query,
                &self.inner.region,
                creds,
                now,
            )?,
            None => HeaderMap::new(),
        };

        let span = tracing::debug_span!("bucketfile.list", prefix = %prefix);
        let _guard = span.enter();

        let resp = self.inner.transport.send(&Method::GET, &url, &headers, None)?;
        if resp.status != StatusCode::OK {
            return Err(crate::transport::response_error(resp.status, &resp.body));
        }

        util::xml::parse_list_keys(&String::from_utf8_lossy(&resp.body))
    }
}

impl BucketBuilder {
    pub fn auth(mut self, auth: Auth) -> Self {
        self.auth = auth;
        self
    }

    /// Signing region for listing requests. Defaults to `us-east-1`.
    pub fn region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    /// Storage service domain; requests go to `{bucket}.{domain}`.
    pub fn domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = domain.into();
        self
    }

    pub fn scheme(mut self, scheme: impl Into<String>) -> Self {
        self.scheme = scheme.into();
        self
    }

    /// Prepends a virtual directory to every key of this session.
    pub fn name_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.name_prefix = Some(prefix.into());
        self
    }

    /// Connect/read deadline applied by the transport.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Replaces the HTTP transport collaborator.
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    pub fn build(self) -> Result<Bucket> {
        if self.name.trim().is_empty() {
            return Err(Error::invalid_config("bucket name must not be empty"));
        }
        if self.domain.trim().is_empty() {
            return Err(Error::invalid_config("storage domain must not be empty"));
        }
        if self.scheme != "http" && self.scheme != "https" {
            return Err(Error::invalid_config("scheme must be http or https"));
        }

        let region = Region::new(
            self.region
                .unwrap_or_else(|| DEFAULT_REGION.to_string()),
        )?;
        let transport: Arc<dyn Transport> = match self.transport {
            Some(transport) => transport,
            None => Arc::new(OneShotTransport::new(self.timeout)),
        };

        Ok(Bucket {
            inner: Arc::new(Inner {
                name: self.name,
                domain: self.domain,
                scheme: self.scheme,
                region,
                auth: self.auth,
                name_prefix: self.name_prefix,
                transport,
            }),
        })
    }
}

/// Validates a caller-supplied key and normalizes it to a leading slash.
pub(crate) fn normalize_key(key: &str) -> Result<String> {
    let key = key.trim();
    if key.is_empty() {
        return Err(Error::invalid_config("object key must not be empty"));
    }
    if key.starts_with('/') {
        Ok(key.to_string())
    } else {
        Ok(format!("/{key}"))
    }
}

fn split_extension(key: &str) -> (&str, &str) {
    let last_segment_start = key.rfind('/').map(|i| i + 1).unwrap_or(0);
    match key[last_segment_start..].rfind('.') {
        Some(dot) => key.split_at(last_segment_start + dot),
        None => (key, ""),
    }
}
