//! JSON codec for typed payloads.

use serde::Serialize;
use serde::de::DeserializeOwned;

const NULL: &[u8] = b"null";

#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error("json encode: {0}")]
    Encode(#[source] serde_json::Error),
    #[error("json decode: {0}")]
    Decode(#[source] serde_json::Error),
}

pub fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>, CodecError> {
    serde_json::to_vec(value).map_err(CodecError::Encode)
}

/// `None` encodes as the empty payload.
pub fn encode_opt<T: Serialize>(value: Option<&T>) -> Result<Vec<u8>, CodecError> {
    value.map_or_else(|| Ok(Vec::new()), encode)
}

/// An empty payload decodes as JSON `null`.
pub fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, CodecError> {
    let bytes = if bytes.is_empty() { NULL } else { bytes };
    serde_json::from_slice(bytes).map_err(CodecError::Decode)
}
