#![allow(dead_code)]

//! In-memory stand-in for the object-storage service, plugged in through
//! the transport seam. Just enough behavior to exercise the client
//! end-to-end: store on PUT, serve on GET, probe on HEAD, drop on DELETE,
//! and answer prefix listings with a namespaced XML document.

use std::collections::BTreeMap;
use std::sync::Mutex;

use bytes::Bytes;
use http::{HeaderMap, HeaderValue, Method, StatusCode};
use url::Url;

use bucketfile::transport::{Transport, TransportResponse};

const LAST_MODIFIED: &str = "Sun, 06 Nov 1994 08:49:37 GMT";

pub struct StoredObject {
    pub body: Vec<u8>,
    pub content_type: String,
}

#[derive(Default)]
pub struct FakeStore {
    objects: Mutex<BTreeMap<String, StoredObject>>,
}

impl FakeStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_objects(entries: &[(&str, &str)]) -> Self {
        let store = Self::new();
        {
            let mut objects = store.objects.lock().unwrap();
            for (key, body) in entries {
                objects.insert(
                    key.to_string(),
                    StoredObject {
                        body: body.as_bytes().to_vec(),
                        content_type: "binary/octet-stream".to_string(),
                    },
                );
            }
        }
        store
    }

    pub fn contains(&self, key: &str) -> bool {
        self.objects.lock().unwrap().contains_key(key)
    }

    fn list_response(&self, prefix: &str) -> TransportResponse {
        let objects = self.objects.lock().unwrap();
        let mut xml = String::from(
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
             <ListBucketResult xmlns=\"http://s3.amazonaws.com/doc/2006-03-01/\">",
        );
        for key in objects.keys() {
            let relative = key.trim_start_matches('/');
            if relative.starts_with(prefix) {
                xml.push_str("<Contents><Key>");
                xml.push_str(relative);
                xml.push_str("</Key></Contents>");
            }
        }
        xml.push_str("</ListBucketResult>");

        response(StatusCode::OK, &[("content-type", "application/xml")], xml.into_bytes())
    }
}

impl Transport for FakeStore {
    fn send(
        &self,
        method: &Method,
        url: &Url,
        headers: &HeaderMap,
        body: Option<&[u8]>,
    ) -> bucketfile::Result<TransportResponse> {
        let path = url.path().to_string();

        match method.as_str() {
            "PUT" => {
                let content_type = headers
                    .get("content-type")
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or("binary/octet-stream")
                    .to_string();
                self.objects.lock().unwrap().insert(
                    path,
                    StoredObject {
                        body: body.unwrap_or_default().to_vec(),
                        content_type,
                    },
                );
                Ok(response(StatusCode::OK, &[], Vec::new()))
            }
            "GET" if path == "/" => {
                let prefix = url
                    .query_pairs()
                    .find(|(k, _)| k == "prefix")
                    .map(|(_, v)| v.into_owned())
                    .unwrap_or_default();
                Ok(self.list_response(&prefix))
            }
            "GET" => match self.objects.lock().unwrap().get(&path) {
                Some(object) => Ok(response(
                    StatusCode::OK,
                    &[
                        ("content-type", &object.content_type),
                        ("content-length", &object.body.len().to_string()),
                        ("last-modified", LAST_MODIFIED),
                    ],
                    object.body.clone(),
                )),
                // Absent objects answer with no length indicator at all.
                None => Ok(response(StatusCode::NOT_FOUND, &[], Vec::new())),
            },
            "HEAD" => match self.objects.lock().unwrap().get(&path) {
                Some(object) => Ok(response(
                    StatusCode::OK,
                    &[
                        ("content-type", &object.content_type),
                        ("content-length", &object.body.len().to_string()),
                        ("last-modified", LAST_MODIFIED),
                    ],
                    Vec::new(),
                )),
                None => Ok(response(StatusCode::NOT_FOUND, &[], Vec::new())),
            },
            "DELETE" => {
                self.objects.lock().unwrap().remove(&path);
                Ok(response(StatusCode::NO_CONTENT, &[], Vec::new()))
            }
            _ => Ok(response(StatusCode::METHOD_NOT_ALLOWED, &[], Vec::new())),
        }
    }
}

fn response(status: StatusCode, headers: &[(&str, &str)], body: Vec<u8>) -> TransportResponse {
    let mut header_map = HeaderMap::new();
    for (name, value) in headers {
        header_map.insert(
            http::header::HeaderName::from_bytes(name.as_bytes()).unwrap(),
            HeaderValue::from_str(value).unwrap(),
        );
    }

    TransportResponse {
        status,
        headers: header_map,
        body: Bytes::from(body),
    }
}
