//! Wire representation of a transform request
//!
//! Hosts exchange requests as JSON objects with string-tagged fields. This
//! module deserializes them and converts them into a typed
//! [`TransformRequest`], decoding the message text on the way.
//!
//! ```json
//! {
//!   "operation": "encrypt",
//!   "keyText": "-----BEGIN PUBLIC KEY-----...",
//!   "keyFormat": "pem",
//!   "keyRole": "public",
//!   "padding": "oaep",
//!   "hash": "SHA-256",
//!   "message": "hello",
//!   "messageEncoding": "utf8",
//!   "outputEncoding": "base64"
//! }
//! ```

use crate::codec::{EncodedBuffer, Encoding, OutputEncoding};
use crate::error::TransformError;
use crate::key::{KeyFormat, KeyRole};
use crate::scheme::{OaepHash, Padding};
use crate::transform::{Operation, TransformRequest};
use serde::{Deserialize, Serialize};

/// A transform request as it arrives from a host
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransformParams {
    pub operation: Operation,

    #[serde(default)]
    pub key_text: String,

    pub key_format: KeyFormat,

    pub key_role: KeyRole,

    pub padding: Padding,

    /// Only consulted for OAEP; SHA-256 when omitted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hash: Option<OaepHash>,

    #[serde(default)]
    pub message: String,

    /// Defaults to UTF-8 for encryption and base64 for decryption
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message_encoding: Option<Encoding>,

    #[serde(default)]
    pub output_encoding: OutputEncoding,
}

impl TransformParams {
    /// Encoding the message text is expected in
    pub fn effective_message_encoding(&self) -> Encoding {
        self.message_encoding.unwrap_or(match self.operation {
            Operation::Encrypt => Encoding::Utf8,
            Operation::Decrypt => Encoding::Base64,
        })
    }

    /// True when the executor would skip this request
    pub fn is_incomplete(&self) -> bool {
        self.key_text.trim().is_empty() || self.message.is_empty()
    }

    /// Decode the message and build a typed request
    ///
    /// Fails with `InvalidEncoding` if the message text does not match its
    /// declared encoding. Incomplete params are not decoded at all, so they
    /// always reach the executor's no-op path.
    pub fn into_request(self) -> Result<TransformRequest, TransformError> {
        let encoding = self.effective_message_encoding();
        let message = if self.is_incomplete() {
            EncodedBuffer::new(Vec::new(), encoding)
        } else {
            EncodedBuffer::from_text(&self.message, encoding)?
        };
        let padding = self.padding.with_hash(self.hash.unwrap_or_default());

        Ok(TransformRequest::builder(self.operation)
            .key(self.key_text, self.key_format, self.key_role)
            .padding(padding)
            .message(message)
            .output_encoding(self.output_encoding)
            .build())
    }
}

impl TryFrom<TransformParams> for TransformRequest {
    type Error = TransformError;

    fn try_from(params: TransformParams) -> Result<Self, Self::Error> {
        params.into_request()
    }
}
