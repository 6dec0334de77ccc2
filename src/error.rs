//! Error taxonomy for the transform pipeline
//!
//! Every stage rewraps its own failures into one of the [`TransformError`]
//! variants before they cross the executor boundary. Callers only ever see a
//! stable [`ErrorKind`] plus a human-readable summary.
//!
//! # Example
//!
//! ```
//! use rsa_transform::{ErrorKind, TransformError};
//!
//! let err = TransformError::MessageTooLong { len: 300, max: 190 };
//! assert_eq!(err.kind(), ErrorKind::MessageTooLong);
//! assert!(!err.is_retryable());
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Stable error kind reported across the public contract
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    InvalidEncoding,
    MalformedKey,
    WrongKeyRole,
    MessageTooLong,
    PrimitiveFailure,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidEncoding => "InvalidEncoding",
            Self::MalformedKey => "MalformedKey",
            Self::WrongKeyRole => "WrongKeyRole",
            Self::MessageTooLong => "MessageTooLong",
            Self::PrimitiveFailure => "PrimitiveFailure",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unified error type for all transform operations
///
/// # Error Categories
///
/// - **InvalidEncoding**: malformed hex, base64 or UTF-8 input
/// - **MalformedKey**: key text does not parse under the declared format and role
/// - **WrongKeyRole**: the key role does not match the requested operation
/// - **MessageTooLong**: plaintext exceeds the padding scheme's bound
/// - **PrimitiveFailure**: the underlying cipher rejected the operation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransformError {
    /// Malformed input to the codec layer
    #[error("invalid {encoding} input: {reason}")]
    InvalidEncoding {
        encoding: &'static str,
        reason: String,
    },

    /// Key text could not be parsed under the declared format
    #[error("malformed {format} key: {reason}")]
    MalformedKey {
        format: &'static str,
        reason: String,
    },

    /// Role and operation disagree
    #[error("a {role} key cannot be used to {operation}")]
    WrongKeyRole {
        role: &'static str,
        operation: &'static str,
    },

    /// Plaintext is larger than the scheme allows
    #[error("message is {len} bytes, maximum for this key and padding is {max} bytes")]
    MessageTooLong { len: usize, max: usize },

    /// The cipher primitive rejected the operation
    #[error("{operation} failed: {reason}")]
    PrimitiveFailure {
        operation: &'static str,
        reason: String,
    },
}

impl TransformError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidEncoding { .. } => ErrorKind::InvalidEncoding,
            Self::MalformedKey { .. } => ErrorKind::MalformedKey,
            Self::WrongKeyRole { .. } => ErrorKind::WrongKeyRole,
            Self::MessageTooLong { .. } => ErrorKind::MessageTooLong,
            Self::PrimitiveFailure { .. } => ErrorKind::PrimitiveFailure,
        }
    }

    /// Human-readable summary, without the kind prefix
    pub fn message(&self) -> String {
        self.to_string()
    }

    /// Always false: every kind is a deterministic input problem
    pub fn is_retryable(&self) -> bool {
        false
    }

    /// Returns a suggestion for resolving this error
    pub fn suggestion(&self) -> Option<&str> {
        match self {
            Self::InvalidEncoding { .. } => {
                Some("Check the input for stray characters or pick the matching encoding")
            }
            Self::MalformedKey { .. } => {
                Some("Verify the key text and that the selected key format matches it")
            }
            Self::WrongKeyRole { .. } => {
                Some("Encrypt with a public key and decrypt with a private key")
            }
            Self::MessageTooLong { .. } => Some(
                "Shorten the message, use a larger key, or switch to PKCS#1 v1.5 padding",
            ),
            Self::PrimitiveFailure { .. } => {
                Some("Make sure the ciphertext was produced with this key pair and padding")
            }
        }
    }

    pub(crate) fn malformed_key(format: &'static str, reason: impl Into<String>) -> Self {
        Self::MalformedKey {
            format,
            reason: reason.into(),
        }
    }

    pub(crate) fn invalid_encoding(encoding: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidEncoding {
            encoding,
            reason: reason.into(),
        }
    }
}
