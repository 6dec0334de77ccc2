//! Transform executor
//!
//! The single entry point of the pipeline. A request moves through
//!
//! ```text
//! Idle -> KeyImporting -> (Validating, encrypt only) -> Executing -> Encoding -> Done
//! ```
//!
//! and any stage may end the request in `Failed`. Nothing is retried and no
//! state survives between requests: every call re-imports its key from text.
//!
//! # Example
//!
//! ```no_run
//! use rsa_transform::{
//!     EncodedBuffer, Executor, KeyFormat, KeyRole, OaepHash, Operation, OutputEncoding,
//!     PaddingScheme, TransformRequest,
//! };
//!
//! # fn example(public_pem: &str) -> Result<(), Box<dyn std::error::Error>> {
//! let request = TransformRequest::builder(Operation::Encrypt)
//!     .key(public_pem, KeyFormat::Pem, KeyRole::Public)
//!     .padding(PaddingScheme::Oaep(OaepHash::Sha256))
//!     .message(EncodedBuffer::utf8("hello"))
//!     .output_encoding(OutputEncoding::Base64)
//!     .build();
//!
//! let output = Executor::rustcrypto(Default::default()).execute(&request)?;
//! println!("{:?}", output.text());
//! # Ok(())
//! # }
//! ```

use crate::codec::{self, EncodedBuffer, Encoding, OutputEncoding};
use crate::config::TransformConfig;
use crate::error::TransformError;
use crate::key::{self, KeyFormat, KeyMaterial, KeyRole};
use crate::provider::{CipherProvider, RustCryptoProvider};
use crate::scheme::PaddingScheme;
use crate::sizing;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Direction of a transform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    Encrypt,
    Decrypt,
}

impl Operation {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Encrypt => "encrypt",
            Self::Decrypt => "decrypt",
        }
    }
}

/// Pipeline stage, used for tracing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Idle,
    KeyImporting,
    Validating,
    Executing,
    Encoding,
    Done,
}

/// Immutable input to one executor call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransformRequest {
    operation: Operation,
    key_text: String,
    key_format: KeyFormat,
    key_role: KeyRole,
    padding: PaddingScheme,
    message: EncodedBuffer,
    output_encoding: OutputEncoding,
}

impl TransformRequest {
    /// Start building a request for `operation`
    ///
    /// Defaults: PEM key whose role matches the operation, RSA-OAEP with
    /// SHA-256, empty message, base64 output.
    pub fn builder(operation: Operation) -> TransformRequestBuilder {
        TransformRequestBuilder {
            request: TransformRequest {
                operation,
                key_text: String::new(),
                key_format: KeyFormat::Pem,
                key_role: match operation {
                    Operation::Encrypt => KeyRole::Public,
                    Operation::Decrypt => KeyRole::Private,
                },
                padding: PaddingScheme::default(),
                message: EncodedBuffer::utf8(""),
                output_encoding: OutputEncoding::default(),
            },
        }
    }

    pub fn operation(&self) -> Operation {
        self.operation
    }

    pub fn key_text(&self) -> &str {
        &self.key_text
    }

    pub fn key_format(&self) -> KeyFormat {
        self.key_format
    }

    pub fn key_role(&self) -> KeyRole {
        self.key_role
    }

    pub fn padding(&self) -> PaddingScheme {
        self.padding
    }

    pub fn message(&self) -> &EncodedBuffer {
        &self.message
    }

    pub fn output_encoding(&self) -> OutputEncoding {
        self.output_encoding
    }

    /// True when the request has nothing to act on yet
    pub fn is_incomplete(&self) -> bool {
        self.key_text.trim().is_empty() || self.message.is_empty()
    }
}

/// Builder for [`TransformRequest`]
#[derive(Debug, Clone)]
pub struct TransformRequestBuilder {
    request: TransformRequest,
}

impl TransformRequestBuilder {
    pub fn key(mut self, text: impl Into<String>, format: KeyFormat, role: KeyRole) -> Self {
        self.request.key_text = text.into();
        self.request.key_format = format;
        self.request.key_role = role;
        self
    }

    pub fn padding(mut self, padding: PaddingScheme) -> Self {
        self.request.padding = padding;
        self
    }

    pub fn message(mut self, message: EncodedBuffer) -> Self {
        self.request.message = message;
        self
    }

    pub fn output_encoding(mut self, encoding: OutputEncoding) -> Self {
        self.request.output_encoding = encoding;
        self
    }

    pub fn build(self) -> TransformRequest {
        self.request
    }
}

/// Successful outcome of a transform
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransformOutput {
    /// Key or message was empty; nothing was done
    Empty,

    /// Result text and the encoding it is expressed in
    Encoded { text: String, encoding: Encoding },
}

impl TransformOutput {
    pub fn text(&self) -> Option<&str> {
        match self {
            Self::Empty => None,
            Self::Encoded { text, .. } => Some(text),
        }
    }

    pub fn encoding(&self) -> Option<Encoding> {
        match self {
            Self::Empty => None,
            Self::Encoded { encoding, .. } => Some(*encoding),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }
}

pub type TransformResult = Result<TransformOutput, TransformError>;

/// Runs transform requests against an injected cipher provider
#[derive(Debug, Clone, Default)]
pub struct Executor<P = RustCryptoProvider> {
    provider: P,
    config: TransformConfig,
}

impl Executor<RustCryptoProvider> {
    /// Executor backed by the RustCrypto `rsa` provider
    pub fn rustcrypto(config: TransformConfig) -> Self {
        Executor::with_config(RustCryptoProvider::new(), config)
    }
}

impl<P: CipherProvider> Executor<P> {
    pub fn new(provider: P) -> Self {
        Executor {
            provider,
            config: TransformConfig::default(),
        }
    }

    pub fn with_config(provider: P, config: TransformConfig) -> Self {
        Executor { provider, config }
    }

    pub fn config(&self) -> &TransformConfig {
        &self.config
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Run one request to completion
    pub fn execute(&self, request: &TransformRequest) -> TransformResult {
        if request.is_incomplete() {
            debug!(stage = ?Stage::Done, "Key or message empty, skipping transform");
            return Ok(TransformOutput::Empty);
        }

        let mut stage = Stage::Idle;
        let result = self.run(request, &mut stage);
        match &result {
            Ok(_) => debug!(
                stage = ?Stage::Done,
                operation = request.operation.name(),
                "Transform complete"
            ),
            Err(e) => debug!(
                stage = ?stage,
                operation = request.operation.name(),
                kind = %e.kind(),
                "Transform failed: {}",
                e
            ),
        }
        result
    }

    fn run(&self, request: &TransformRequest, stage: &mut Stage) -> TransformResult {
        self.enter(stage, Stage::KeyImporting);
        let key: KeyMaterial<P> = key::import(
            &self.provider,
            &request.key_text,
            request.key_format,
            request.key_role,
            request.operation,
            request.padding,
        )?;

        let message = request.message.as_bytes();
        let output = match request.operation {
            Operation::Encrypt => {
                self.enter(stage, Stage::Validating);
                sizing::validate(
                    message.len(),
                    key.scheme(),
                    key.size_bytes(),
                    self.config.size_policy,
                )?;

                self.enter(stage, Stage::Executing);
                let ciphertext = key.encrypt(&self.provider, message)?;

                self.enter(stage, Stage::Encoding);
                encode_ciphertext(&ciphertext, request.output_encoding)
            }
            Operation::Decrypt => {
                self.enter(stage, Stage::Executing);
                let plaintext = zeroize::Zeroizing::new(key.decrypt(&self.provider, message)?);

                self.enter(stage, Stage::Encoding);
                encode_plaintext(&plaintext, request.output_encoding)
            }
        };

        self.enter(stage, Stage::Done);
        Ok(output)
    }

    fn enter(&self, stage: &mut Stage, next: Stage) {
        debug!(from = ?*stage, to = ?next, "Transform stage");
        *stage = next;
    }
}

/// Ciphertext is never human-readable; always use the binary encoding
fn encode_ciphertext(ciphertext: &[u8], encoding: OutputEncoding) -> TransformOutput {
    TransformOutput::Encoded {
        text: codec::encode_binary(ciphertext, encoding),
        encoding: encoding.into(),
    }
}

/// Prefer readable text; fall back to the requested binary encoding
fn encode_plaintext(plaintext: &[u8], fallback: OutputEncoding) -> TransformOutput {
    match codec::try_decode_utf8(plaintext) {
        Some(text) => TransformOutput::Encoded {
            text,
            encoding: Encoding::Utf8,
        },
        None => TransformOutput::Encoded {
            text: codec::encode_binary(plaintext, fallback),
            encoding: fallback.into(),
        },
    }
}
