//! Common test utilities for rsa-transform integration tests
//!
//! Key generation is slow, so every test binary shares one 2048-bit pair.

#![allow(dead_code)]

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use rsa::pkcs1::{EncodeRsaPrivateKey, EncodeRsaPublicKey};
use rsa::pkcs8::{EncodePrivateKey, EncodePublicKey, LineEnding};
use rsa::traits::{PrivateKeyParts, PublicKeyParts};
use rsa::{RsaPrivateKey, RsaPublicKey};
use std::sync::OnceLock;

pub use rsa_transform::{
    EncodedBuffer, Encoding, ErrorKind, Executor, KeyFormat, KeyRole, OaepHash, Operation,
    OutputEncoding, PaddingScheme, TransformOutput, TransformRequest,
};

pub const KEY_BITS: usize = 2048;

/// Test data for encryption/decryption
pub const TEST_PLAINTEXT: &str = "hello";

pub fn private_key() -> &'static RsaPrivateKey {
    static KEY: OnceLock<RsaPrivateKey> = OnceLock::new();
    KEY.get_or_init(|| {
        let mut rng = rand::rngs::OsRng;
        RsaPrivateKey::new(&mut rng, KEY_BITS).expect("failed to generate test key")
    })
}

/// A second, unrelated key for wrong-key decrypts
pub fn other_private_key() -> &'static RsaPrivateKey {
    static KEY: OnceLock<RsaPrivateKey> = OnceLock::new();
    KEY.get_or_init(|| {
        let mut rng = rand::rngs::OsRng;
        RsaPrivateKey::new(&mut rng, KEY_BITS).expect("failed to generate test key")
    })
}

pub fn public_key() -> RsaPublicKey {
    private_key().to_public_key()
}

/// SPKI PEM ("BEGIN PUBLIC KEY")
pub fn public_pem() -> String {
    public_key()
        .to_public_key_pem(LineEnding::LF)
        .expect("failed to encode public key")
}

/// PKCS#8 PEM ("BEGIN PRIVATE KEY")
pub fn private_pem() -> String {
    private_key()
        .to_pkcs8_pem(LineEnding::LF)
        .expect("failed to encode private key")
        .to_string()
}

pub fn other_private_pem() -> String {
    other_private_key()
        .to_pkcs8_pem(LineEnding::LF)
        .expect("failed to encode private key")
        .to_string()
}

/// PKCS#1 PEM ("BEGIN RSA PUBLIC KEY")
pub fn public_pkcs1_pem() -> String {
    public_key()
        .to_pkcs1_pem(LineEnding::LF)
        .expect("failed to encode public key")
}

/// PKCS#1 PEM ("BEGIN RSA PRIVATE KEY")
pub fn private_pkcs1_pem() -> String {
    private_key()
        .to_pkcs1_pem(LineEnding::LF)
        .expect("failed to encode private key")
        .to_string()
}

/// Base64 of the SPKI DER bytes
pub fn public_der_b64() -> String {
    let der = public_key()
        .to_public_key_der()
        .expect("failed to encode public key");
    rsa_transform::codec::encode_binary(der.as_bytes(), OutputEncoding::Base64)
}

/// Base64 of the PKCS#8 DER bytes
pub fn private_der_b64() -> String {
    let der = private_key()
        .to_pkcs8_der()
        .expect("failed to encode private key");
    rsa_transform::codec::encode_binary(der.as_bytes(), OutputEncoding::Base64)
}

fn b64url(value: &rsa::BigUint) -> String {
    URL_SAFE_NO_PAD.encode(value.to_bytes_be())
}

pub fn public_jwk(alg: &str) -> String {
    let key = private_key();
    serde_json::json!({
        "kty": "RSA",
        "alg": alg,
        "key_ops": ["encrypt"],
        "n": b64url(key.n()),
        "e": b64url(key.e()),
    })
    .to_string()
}

pub fn private_jwk(alg: &str) -> String {
    let key = private_key();
    let primes = key.primes();
    serde_json::json!({
        "kty": "RSA",
        "alg": alg,
        "key_ops": ["decrypt"],
        "n": b64url(key.n()),
        "e": b64url(key.e()),
        "d": b64url(key.d()),
        "p": b64url(&primes[0]),
        "q": b64url(&primes[1]),
    })
    .to_string()
}

pub fn encrypt_request(
    key_text: &str,
    format: KeyFormat,
    padding: PaddingScheme,
    message: EncodedBuffer,
) -> TransformRequest {
    TransformRequest::builder(Operation::Encrypt)
        .key(key_text, format, KeyRole::Public)
        .padding(padding)
        .message(message)
        .output_encoding(OutputEncoding::Base64)
        .build()
}

pub fn decrypt_request(
    key_text: &str,
    format: KeyFormat,
    padding: PaddingScheme,
    ciphertext_b64: &str,
    fallback: OutputEncoding,
) -> TransformRequest {
    TransformRequest::builder(Operation::Decrypt)
        .key(key_text, format, KeyRole::Private)
        .padding(padding)
        .message(
            EncodedBuffer::from_text(ciphertext_b64, Encoding::Base64)
                .expect("ciphertext is valid base64"),
        )
        .output_encoding(fallback)
        .build()
}

/// Encrypt `message` with the shared public key and return the base64 ciphertext
pub fn encrypt_with_pem(padding: PaddingScheme, message: EncodedBuffer) -> String {
    let request = encrypt_request(&public_pem(), KeyFormat::Pem, padding, message);
    let output = Executor::rustcrypto(Default::default())
        .execute(&request)
        .expect("encryption failed");
    assert_eq!(output.encoding(), Some(Encoding::Base64));
    output.text().expect("non-empty output").to_string()
}
