//! Codec Module
//!
//! Converts the whole cache document to text and back. The cache never
//! inspects payloads itself; everything format-specific lives here.

use serde::{de::DeserializeOwned, Serialize};

use crate::error::CodecError;

// == Codec ==
/// Text encoding for a complete cache document.
pub trait Codec: Send + Sync {
    /// Encodes `document`, human-readable when `pretty` is set.
    fn encode<D: Serialize>(&self, document: &D, pretty: bool) -> Result<String, CodecError>;

    /// Decodes a document previously produced by [`Codec::encode`].
    fn decode<D: DeserializeOwned>(&self, content: &str) -> Result<D, CodecError>;
}

// == JSON Codec ==
/// JSON encoding, compact or with 2-space indentation.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl Codec for JsonCodec {
    fn encode<D: Serialize>(&self, document: &D, pretty: bool) -> Result<String, CodecError> {
        let text = if pretty {
            serde_json::to_string_pretty(document)?
        } else {
            serde_json::to_string(document)?
        };
        Ok(text)
    }

    fn decode<D: DeserializeOwned>(&self, content: &str) -> Result<D, CodecError> {
        Ok(serde_json::from_str(content)?)
    }
}
