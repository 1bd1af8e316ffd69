//! Character-set detection and decoding of fetched pages.
//!
//! Several agency portals still serve ISO-8859-1 / Windows-1252 pages, so the
//! raw body cannot be assumed to be UTF-8. The encoding is picked in this
//! order:
//!
//! 1. A byte-order mark at the start of the body
//! 2. The `charset` parameter of the response `Content-Type` header
//! 3. A `<meta charset>` or `<meta http-equiv="Content-Type">` declaration
//!    within the first 1024 bytes
//! 4. UTF-8, with invalid sequences replaced by U+FFFD
//!
//! Labels are resolved with the WHATWG rules of `encoding_rs`, so
//! `iso-8859-1` and `latin1` both decode as Windows-1252.

use encoding_rs::{Encoding, UTF_8, UTF_16BE, UTF_16LE};
use once_cell::sync::Lazy;
use regex::Regex;
use regex::bytes::Regex as BytesRegex;
use std::borrow::Cow;
use tracing::debug;

/// How far into the body a `<meta>` declaration is looked for.
const META_SNIFF_LIMIT: usize = 1024;

static CONTENT_TYPE_CHARSET: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)charset\s*=\s*["']?\s*([a-z0-9_:.\-]+)"#).expect("valid charset regex")
});

static META_CHARSET: Lazy<BytesRegex> = Lazy::new(|| {
    BytesRegex::new(r#"(?i-u)<meta[^>]*?charset\s*=\s*["']?\s*([a-z0-9_:.\-]+)"#)
        .expect("valid meta charset regex")
});

/// Extract the `charset` parameter from a `Content-Type` header value.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(charset_from_content_type("text/html; charset=ISO-8859-1").as_deref(), Some("ISO-8859-1"));
/// assert_eq!(charset_from_content_type("text/html"), None);
/// ```
pub fn charset_from_content_type(content_type: &str) -> Option<String> {
    CONTENT_TYPE_CHARSET
        .captures(content_type)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
}

/// Find the encoding declared by a `<meta>` tag near the start of `body`.
///
/// A declared UTF-16 is treated as UTF-8: a page whose meta tag could be read
/// as ASCII cannot actually be UTF-16.
pub fn sniff_meta_charset(body: &[u8]) -> Option<&'static Encoding> {
    let head = &body[..body.len().min(META_SNIFF_LIMIT)];
    let label = META_CHARSET.captures(head)?.get(1)?.as_bytes();
    let encoding = Encoding::for_label(label)?;
    if encoding == UTF_16LE || encoding == UTF_16BE {
        Some(UTF_8)
    } else {
        Some(encoding)
    }
}

/// Decode an HTML body to text.
///
/// # Arguments
///
/// * `body` - Raw response bytes
/// * `charset` - The `Content-Type` charset label, if the server sent one
///
/// # Returns
///
/// The decoded page. Decoding never fails; unmappable bytes become U+FFFD.
pub fn decode_html<'a>(body: &'a [u8], charset: Option<&str>) -> Cow<'a, str> {
    let declared = charset.and_then(|label| Encoding::for_label(label.trim().as_bytes()));
    let encoding = declared
        .or_else(|| sniff_meta_charset(body))
        .unwrap_or(UTF_8);

    // `decode` gives a byte-order mark precedence over `encoding`.
    let (text, used, had_errors) = encoding.decode(body);
    debug!(encoding = used.name(), had_errors, "Decoded page body");
    text
}
