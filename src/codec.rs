//! Byte/text codecs
//!
//! Reversible conversions between byte buffers and their textual forms.
//! Malformed input is always rejected, never truncated or substituted.

use crate::error::TransformError;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use serde::{Deserialize, Serialize};

/// Textual encoding of a byte buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Encoding {
    #[serde(alias = "utf-8", alias = "text")]
    Utf8,
    Hex,
    Base64,
}

impl Encoding {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Utf8 => "UTF-8",
            Self::Hex => "hex",
            Self::Base64 => "base64",
        }
    }
}

impl std::fmt::Display for Encoding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Binary-safe encodings allowed for transform output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputEncoding {
    Hex,
    #[default]
    Base64,
}

impl From<OutputEncoding> for Encoding {
    fn from(value: OutputEncoding) -> Self {
        match value {
            OutputEncoding::Hex => Encoding::Hex,
            OutputEncoding::Base64 => Encoding::Base64,
        }
    }
}

/// Decode `text` into bytes according to `encoding`
pub fn decode(text: &str, encoding: Encoding) -> Result<Vec<u8>, TransformError> {
    match encoding {
        Encoding::Utf8 => Ok(text.as_bytes().to_vec()),
        Encoding::Hex => hex::decode(text)
            .map_err(|e| TransformError::invalid_encoding(encoding.name(), e.to_string())),
        Encoding::Base64 => BASE64
            .decode(text)
            .map_err(|e| TransformError::invalid_encoding(encoding.name(), e.to_string())),
    }
}

/// Encode `bytes` as text according to `encoding`
///
/// Only UTF-8 can fail: bytes that are not valid UTF-8 are rejected rather than
/// rendered with replacement characters.
pub fn encode(bytes: &[u8], encoding: Encoding) -> Result<String, TransformError> {
    match encoding {
        Encoding::Utf8 => std::str::from_utf8(bytes)
            .map(str::to_owned)
            .map_err(|e| TransformError::invalid_encoding(encoding.name(), e.to_string())),
        Encoding::Hex => Ok(hex::encode(bytes)),
        Encoding::Base64 => Ok(BASE64.encode(bytes)),
    }
}

/// Encode with one of the binary-safe encodings, which cannot fail
pub fn encode_binary(bytes: &[u8], encoding: OutputEncoding) -> String {
    match encoding {
        OutputEncoding::Hex => hex::encode(bytes),
        OutputEncoding::Base64 => BASE64.encode(bytes),
    }
}

/// Probe whether `bytes` are valid UTF-8 without treating failure as an error
pub fn try_decode_utf8(bytes: &[u8]) -> Option<String> {
    std::str::from_utf8(bytes).ok().map(str::to_owned)
}

/// Convert `text` from one encoding to another
pub fn convert(text: &str, from: Encoding, to: Encoding) -> Result<String, TransformError> {
    EncodedBuffer::from_text(text, from)?.reencode(to).to_text()
}

/// A byte sequence paired with the encoding it was last expressed in
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedBuffer {
    bytes: Vec<u8>,
    encoding: Encoding,
}

impl EncodedBuffer {
    pub fn new(bytes: Vec<u8>, encoding: Encoding) -> Self {
        EncodedBuffer { bytes, encoding }
    }

    /// Decode `text` and remember the encoding it arrived in
    pub fn from_text(text: &str, encoding: Encoding) -> Result<Self, TransformError> {
        Ok(EncodedBuffer {
            bytes: decode(text, encoding)?,
            encoding,
        })
    }

    /// Plain UTF-8 text, which always decodes
    pub fn utf8(text: &str) -> Self {
        EncodedBuffer {
            bytes: text.as_bytes().to_vec(),
            encoding: Encoding::Utf8,
        }
    }

    /// Render the bytes in the current encoding
    pub fn to_text(&self) -> Result<String, TransformError> {
        encode(&self.bytes, self.encoding)
    }

    /// Same bytes, expressed in another encoding
    pub fn reencode(self, encoding: Encoding) -> Self {
        EncodedBuffer {
            bytes: self.bytes,
            encoding,
        }
    }

    pub fn encoding(&self) -> Encoding {
        self.encoding
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}


#[cfg(test)]
mod proptest_tests {
    use super::*;
    use crate::error::ErrorKind;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn test_binary_encodings_roundtrip(bytes in any::<Vec<u8>>()) {
            for encoding in [Encoding::Hex, Encoding::Base64] {
                let text = encode(&bytes, encoding).unwrap();
                prop_assert_eq!(decode(&text, encoding).unwrap(), bytes.clone());
            }
        }

        #[test]
        fn test_utf8_roundtrip(text in any::<String>()) {
            let bytes = decode(&text, Encoding::Utf8).unwrap();
            prop_assert_eq!(bytes.as_slice(), text.as_bytes());
            prop_assert_eq!(encode(&bytes, Encoding::Utf8).unwrap(), text);
        }

        #[test]
        fn test_odd_length_hex_rejected(text in "([0-9a-fA-F]{2}){0,16}[0-9a-fA-F]") {
            let err = decode(&text, Encoding::Hex).unwrap_err();
            prop_assert_eq!(err.kind(), ErrorKind::InvalidEncoding);
        }

        #[test]
        fn test_non_hex_character_rejected(text in "([0-9a-f]{2}){0,8}[g-zG-Z_ !%][0-9a-f]") {
            // Even length, one character outside the hex alphabet
            let err = decode(&text, Encoding::Hex).unwrap_err();
            prop_assert_eq!(err.kind(), ErrorKind::InvalidEncoding);
        }
    }
}
