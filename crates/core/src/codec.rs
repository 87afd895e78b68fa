//! Reversible envelope for storing template bodies inside the JSON index.
//!
//! Template bodies may contain anything a markdown file can hold, including
//! sequences that would need heavy escaping inside structured storage. The
//! envelope is standard base64 over the raw bytes, so every input survives a
//! round trip unchanged.

use base64::prelude::*;
use thiserror::Error;

/// Errors produced when an envelope cannot be turned back into text.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("envelope is not valid base64: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("envelope does not contain UTF-8 text: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// Encode text into an envelope.
pub fn encode(text: &str) -> String {
    encode_bytes(text.as_bytes())
}

/// Decode an envelope produced by [`encode`].
pub fn decode(envelope: &str) -> Result<String, DecodeError> {
    let bytes = decode_bytes(envelope)?;
    Ok(String::from_utf8(bytes)?)
}

/// Encode arbitrary bytes into an envelope.
pub fn encode_bytes(bytes: &[u8]) -> String {
    BASE64_STANDARD.encode(bytes)
}

/// Decode an envelope into the original bytes.
pub fn decode_bytes(envelope: &str) -> Result<Vec<u8>, DecodeError> {
    Ok(BASE64_STANDARD.decode(envelope.trim())?)
}
