//! Transport decoding of fetched file bodies.
//!
//! The contents endpoint wraps base64 payloads at 60 columns; the embedded
//! line breaks have to go before decoding.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use crate::error::{HarvesterError, Result};
use crate::fetch::FileContent;

/// The only transport encoding accepted from the code host.
pub const BASE64_ENCODING: &str = "base64";

/// Decode a base64 body with embedded whitespace into source text.
///
/// # Examples
/// ```
/// use holiday_harvester::decode::decode_content;
///
/// assert_eq!(decode_content("Y2xh\nc3M=\n").unwrap(), "class");
/// ```
pub fn decode_content(encoded: &str) -> Result<String> {
    let compact: String = encoded
        .chars()
        .filter(|c| !matches!(c, '\n' | '\r' | ' ' | '\t'))
        .collect();

    let bytes = STANDARD
        .decode(compact.as_bytes())
        .map_err(|e| HarvesterError::Decode(e.to_string()))?;

    String::from_utf8(bytes).map_err(|e| HarvesterError::Decode(format!("not valid UTF-8: {e}")))
}

/// Decode a fetched file, rejecting any encoding but base64.
pub fn decode_file(file: &FileContent) -> Result<String> {
    if !file.encoding.eq_ignore_ascii_case(BASE64_ENCODING) {
        return Err(HarvesterError::UnsupportedEncoding(file.encoding.clone()));
    }
    decode_content(&file.content)
}
