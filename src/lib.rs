//! RSA encrypt/decrypt transform pipeline
//!
//! Imports a key from PEM, base64 DER or JWK text, checks the message against
//! the padding scheme's size bound, runs a single-shot RSA operation through
//! an injected [`CipherProvider`], and renders the result as text.
//!
//! Every call is independent: keys are re-imported from text on each request
//! and nothing is cached or shared between requests.

pub mod codec;
pub mod config;
mod error;
pub mod key;
pub mod params;
pub mod prelude;
pub mod provider;
pub mod scheme;
pub mod sizing;
pub mod transform;

pub use codec::{EncodedBuffer, Encoding, OutputEncoding};
pub use config::TransformConfig;
pub use error::{ErrorKind, TransformError};
pub use key::{KeyFormat, KeyMaterial, KeyRole};
pub use params::TransformParams;
pub use provider::{CipherProvider, KeySource, ProviderError, RustCryptoProvider};
pub use scheme::{OaepHash, Padding, PaddingScheme};
pub use sizing::SizePolicy;
pub use transform::{
    Executor, Operation, TransformOutput, TransformRequest, TransformRequestBuilder,
    TransformResult,
};
