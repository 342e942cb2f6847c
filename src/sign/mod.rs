//! Request signing.
//!
//! Two incompatible schemes coexist: the legacy per-request HMAC-SHA1
//! scheme ([`v2`]) used for object operations, and the scoped
//! HMAC-SHA256 scheme ([`v4`]) used for listing. Each call site picks
//! exactly one; the schemes share only the timestamp and digest helpers
//! below.
//!
//! Every signing function takes the request timestamp as a parameter. The
//! caller freezes `now` once per request so the same instant flows through
//! header values, scope, and string-to-sign.

pub(crate) mod v2;
pub(crate) mod v4;

use hmac::{Hmac, Mac as _};
use sha2::{Digest as _, Sha256};
use time::{Month, OffsetDateTime, Weekday};

use crate::error::{Error, Result};

type HmacSha256 = Hmac<Sha256>;

pub(crate) fn hmac_sha256(key: &[u8], data: &[u8]) -> Result<Vec<u8>> {
    let mut mac =
        HmacSha256::new_from_slice(key).map_err(|_| Error::invalid_config("invalid HMAC key"))?;
    mac.update(data);
    Ok(mac.finalize().into_bytes().to_vec())
}

pub(crate) fn sha256_hex(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

/// `YYYYMMDD` date stamp used in the credential scope.
pub(crate) fn date_stamp(now: OffsetDateTime) -> String {
    let year = now.year();
    let month = now.month() as u8;
    let day = now.day();
    format!("{year:04}{month:02}{day:02}")
}

/// ISO-8601 basic timestamp, `YYYYMMDDTHHMMSSZ`.
pub(crate) fn amz_datetime(now: OffsetDateTime) -> String {
    let year = now.year();
    let month = now.month() as u8;
    let day = now.day();
    let hour = now.hour();
    let minute = now.minute();
    let second = now.second();
    format!("{year:04}{month:02}{day:02}T{hour:02}{minute:02}{second:02}Z")
}

/// RFC 1123 `Date` header value in GMT.
pub(crate) fn http_date(now: OffsetDateTime) -> String {
    let weekday = match now.weekday() {
        Weekday::Monday => "Mon",
        Weekday::Tuesday => "Tue",
        Weekday::Wednesday => "Wed",
        Weekday::Thursday => "Thu",
        Weekday::Friday => "Fri",
        Weekday::Saturday => "Sat",
        Weekday::Sunday => "Sun",
    };
    let month = match now.month() {
        Month::January => "Jan",
        Month::February => "Feb",
        Month::March => "Mar",
        Month::April => "Apr",
        Month::May => "May",
        Month::June => "Jun",
        Month::July => "Jul",
        Month::August => "Aug",
        Month::September => "Sep",
        Month::October => "Oct",
        Month::November => "Nov",
        Month::December => "Dec",
    };

    format!(
        "{weekday}, {:02} {month} {:04} {:02}:{:02}:{:02} GMT",
        now.day(),
        now.year(),
        now.hour(),
        now.minute(),
        now.second()
    )
}
