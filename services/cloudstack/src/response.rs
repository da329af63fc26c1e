//! Classify CloudStack HTTP responses.

use bytes::Bytes;
use http::StatusCode;
use log::{debug, warn};
use stacksign_core::{Error, Result};

use crate::constants::*;
use crate::Document;

/// Turn a raw HTTP response into a document, "no data" or an error.
///
/// - `200`: the body is parsed, `Ok(Some(doc))`.
/// - `401`/`403`: authentication error.
/// - `430`/`431`/`432`/`436` with an HTML body: `Ok(None)`, CloudStack uses
///   them for "nothing matched".
/// - anything else: service error, code and message taken from
///   `errorcode`/`errortext` when the body carries them.
pub fn parse_response(status: StatusCode, body: Bytes) -> Result<Option<Document>> {
    let code = status.as_u16();
    if status == StatusCode::OK {
        return Document::parse(code, body).map(Some);
    }

    let html = is_html(&body);
    if html && SENTINEL_NOT_FOUND_CODES.contains(&code) {
        warn!("cloudstack answered {code} with an html page, treating as no data");
        return Ok(None);
    }

    let (err_code, message) = parse_error(code, &body, html);
    debug!("cloudstack error response: status {code}, errorcode {err_code}: {message}");

    let err = match code {
        401 | 403 => Error::authentication_failed(err_code, message),
        _ => Error::service(err_code, message),
    };
    Err(err.with_context(format!("http_status: {code}")).with_body(body))
}

/// Extract `(code, message)` from an error body.
///
/// Code falls back to the HTTP status and message to [`default_message`].
fn parse_error(status: u16, body: &Bytes, html: bool) -> (u32, String) {
    let doc = if html {
        None
    } else {
        Document::parse(status, body.clone()).ok()
    };

    let code = doc
        .as_ref()
        .and_then(|d| d.find_text(TAG_ERROR_CODE))
        .and_then(|v| v.parse::<u32>().ok())
        .unwrap_or(u32::from(status));
    let message = doc
        .as_ref()
        .and_then(|d| d.find_text(TAG_ERROR_TEXT))
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| default_message(code));

    (code, message)
}

/// Fallback message for an error code without `errortext`.
pub fn default_message(code: u32) -> String {
    match code {
        401 => "Unauthorized user".to_string(),
        430 => "Malformed parameters".to_string(),
        530 | 547 => format!("Server error in cloud ({code})"),
        531 => "Unable to find account".to_string(),
        _ => format!("Received error code from server: {code}"),
    }
}

fn is_html(body: &[u8]) -> bool {
    let head = &body[..body.len().min(512)];
    let head = String::from_utf8_lossy(head).to_ascii_lowercase();
    head.trim_start().starts_with("<!doctype html") || head.contains("<html")
}
