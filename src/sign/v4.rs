//! Scoped signing: a canonical request hashed into a string-to-sign, signed
//! with a key derived from the secret through four chained HMAC-SHA256
//! steps, carried in an `AWS4-HMAC-SHA256` Authorization header.

use http::{HeaderMap, HeaderName, HeaderValue, Method};
use time::OffsetDateTime;

use crate::{
    auth::{Credentials, Region},
    error::{Error, Result},
    sign::{amz_datetime, date_stamp, hmac_sha256, sha256_hex},
    util,
};

const ALGORITHM: &str = "AWS4-HMAC-SHA256";
const SERVICE: &str = "s3";
const TERMINATOR: &str = "aws4_request";

pub(crate) fn payload_hash_empty() -> String {
    sha256_hex(b"")
}

/// `{date}/{region}/{service}/aws4_request`.
pub(crate) fn credential_scope(region: &Region, service: &str, now: OffsetDateTime) -> String {
    format!(
        "{}/{}/{service}/{TERMINATOR}",
        date_stamp(now),
        region.as_str()
    )
}

pub(crate) fn canonical_request(
    method: &Method,
    canonical_uri: &str,
    canonical_query_string: &str,
    canonical_headers: &str,
    signed_headers: &str,
    payload_hash: &str,
) -> String {
    format!(
        "{method}\n{canonical_uri}\n{canonical_query_string}\n{canonical_headers}\n{signed_headers}\n{payload_hash}"
    )
}

pub(crate) fn string_to_sign(
    region: &Region,
    service: &str,
    now: OffsetDateTime,
    canonical_request: &str,
) -> String {
    let amz_date = amz_datetime(now);
    let scope = credential_scope(region, service, now);
    let hashed = sha256_hex(canonical_request.as_bytes());
    format!("{ALGORITHM}\n{amz_date}\n{scope}\n{hashed}")
}

/// Derives the scoped signing key:
/// `HMAC(HMAC(HMAC(HMAC("AWS4"+secret, date), region), service), "aws4_request")`.
pub(crate) fn signing_key(
    secret_key: &str,
    region: &Region,
    service: &str,
    now: OffsetDateTime,
) -> Result<Vec<u8>> {
    let k_date = hmac_sha256(
        format!("AWS4{secret_key}").as_bytes(),
        date_stamp(now).as_bytes(),
    )?;
    let k_region = hmac_sha256(&k_date, region.as_str().as_bytes())?;
    let k_service = hmac_sha256(&k_region, service.as_bytes())?;
    hmac_sha256(&k_service, TERMINATOR.as_bytes())
}

pub(crate) fn signature(
    credentials: &Credentials,
    region: &Region,
    service: &str,
    now: OffsetDateTime,
    string_to_sign: &str,
) -> Result<String> {
    let key = signing_key(&credentials.secret_key, region, service, now)?;
    let sig = hmac_sha256(&key, string_to_sign.as_bytes())?;
    Ok(hex::encode(sig))
}

/// Signs a bodyless request and returns its full header set.
///
/// The caller supplies one frozen `now`; it is reused for the `x-amz-date`
/// header, the scope, and the string-to-sign so the three can never
/// disagree.
pub(crate) fn sign_request(
    method: &Method,
    host: &str,
    canonical_uri: &str,
    canonical_query_string: &str,
    region: &Region,
    credentials: &Credentials,
    now: OffsetDateTime,
) -> Result<HeaderMap> {
    let payload_hash = payload_hash_empty();

    let mut headers = HeaderMap::new();
    headers.insert(
        http::header::HOST,
        HeaderValue::from_str(host).map_err(|_| Error::invalid_config("invalid host header"))?,
    );
    headers.insert(
        HeaderName::from_static("x-amz-date"),
        HeaderValue::from_str(&amz_datetime(now))
            .map_err(|_| Error::invalid_config("invalid x-amz-date header"))?,
    );
    headers.insert(
        HeaderName::from_static("x-amz-content-sha256"),
        HeaderValue::from_str(&payload_hash)
            .map_err(|_| Error::invalid_config("invalid x-amz-content-sha256 header"))?,
    );

    let (canonical_headers, signed_headers) = util::encode::canonical_headers(&headers);
    let request = canonical_request(
        method,
        canonical_uri,
        canonical_query_string,
        &canonical_headers,
        &signed_headers,
        &payload_hash,
    );

    let to_sign = string_to_sign(region, SERVICE, now, &request);
    let sig = signature(credentials, region, SERVICE, now, &to_sign)?;
    let scope = credential_scope(region, SERVICE, now);

    let authorization = format!(
        "{ALGORITHM} Credential={}/{scope},SignedHeaders={signed_headers},Signature={sig}",
        credentials.access_key
    );
    headers.insert(
        http::header::AUTHORIZATION,
        HeaderValue::from_str(&authorization)
            .map_err(|_| Error::invalid_config("invalid Authorization header"))?,
    );

    Ok(headers)
}
