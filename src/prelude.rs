//! Prelude
//!
//! Commonly used types in one import.
//!
//! # Example
//!
//! ```rust
//! use rsa_transform::prelude::*;
//!
//! let buffer = EncodedBuffer::from_text("68656c6c6f", Encoding::Hex).unwrap();
//! assert_eq!(buffer.reencode(Encoding::Utf8).to_text().unwrap(), "hello");
//! ```

pub use crate::codec::{EncodedBuffer, Encoding, OutputEncoding};
pub use crate::config::TransformConfig;
pub use crate::error::{ErrorKind, TransformError};
pub use crate::key::{KeyFormat, KeyRole};
pub use crate::params::TransformParams;
pub use crate::provider::{CipherProvider, RustCryptoProvider};
pub use crate::scheme::{OaepHash, Padding, PaddingScheme};
pub use crate::sizing::SizePolicy;
pub use crate::transform::{Executor, Operation, TransformOutput, TransformRequest};
