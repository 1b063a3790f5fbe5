//! TXT decoding.
//!
//! Best effort: UTF-8 with invalid byte sequences dropped, so an odd byte in
//! a pasted BRD never blocks analysis. A UTF-16 byte-order mark switches to
//! UTF-16, unless the payload does not hold up as UTF-16: then the bytes are
//! read as UTF-8 like any other file.

use crate::error::ExtractError;
use encoding_rs::{Encoding, UTF_8};
use tracing::{debug, warn};

/// Never fails today; the `Result` keeps the signature shared with the
/// other extraction stages.
pub fn decode_text(filename: &str, bytes: &[u8]) -> Result<String, ExtractError> {
    let (encoding, body) = match Encoding::for_bom(bytes) {
        Some((encoding, bom_len)) => (encoding, &bytes[bom_len..]),
        None => (UTF_8, bytes),
    };

    if encoding == UTF_8 {
        return Ok(decode_utf8_ignoring_errors(body));
    }

    // ASCII-range UTF-16 always carries NUL bytes; a NUL-free, valid UTF-8
    // payload behind `FF FE` / `FE FF` is UTF-8 with stray leading bytes.
    if !body.contains(&0) && std::str::from_utf8(body).is_ok() {
        debug!("TXT '{}' has a UTF-16 BOM but a UTF-8 payload", filename);
        return Ok(decode_utf8_ignoring_errors(body));
    }

    let (text, had_errors) = encoding.decode_without_bom_handling(body);
    if had_errors {
        warn!(
            "TXT '{}' is not valid {}; decoding as UTF-8",
            filename,
            encoding.name()
        );
        return Ok(decode_utf8_ignoring_errors(bytes));
    }
    debug!("TXT '{}' decoded as {}", filename, encoding.name());
    Ok(text.into_owned())
}

/// UTF-8 decode that skips invalid sequences instead of replacing them.
fn decode_utf8_ignoring_errors(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len());
    for chunk in bytes.utf8_chunks() {
        out.push_str(chunk.valid());
    }
    out
}
