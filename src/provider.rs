//! Cipher primitive providers
//!
//! The executor never touches an RSA implementation directly. It is handed a
//! [`CipherProvider`] which parses key material into operation-scoped handles
//! and runs the single-shot encrypt/decrypt primitives. The default provider
//! is backed by the RustCrypto `rsa` crate; tests can inject their own.

use crate::scheme::{OaepHash, PaddingScheme};
use rand::rngs::OsRng;
use rsa::{
    pkcs1::{DecodeRsaPrivateKey, DecodeRsaPublicKey},
    pkcs8::{DecodePrivateKey, DecodePublicKey},
    traits::PublicKeyParts,
    BigUint, Oaep, Pkcs1v15Encrypt, RsaPrivateKey, RsaPublicKey,
};
use sha2::{Sha256, Sha384, Sha512};
use thiserror::Error;
use zeroize::Zeroizing;

/// Errors raised inside a provider
///
/// These never cross the executor boundary as-is; they are rewrapped into
/// [`crate::TransformError`] by the stage that called the provider.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("invalid key: {0}")]
    InvalidKey(String),

    #[error("encryption failed: {0}")]
    EncryptFailed(String),

    #[error("decryption failed: {0}")]
    DecryptFailed(String),
}

impl ProviderError {
    /// Provider message without the variant prefix
    pub fn detail(&self) -> &str {
        match self {
            Self::InvalidKey(msg) | Self::EncryptFailed(msg) | Self::DecryptFailed(msg) => msg,
        }
    }
}

/// Raw RSA integers taken from a JWK, big-endian
pub struct RsaComponents {
    pub n: Vec<u8>,
    pub e: Vec<u8>,
    /// Private exponent and primes, present for private keys only
    pub private: Option<RsaPrivateComponents>,
}

pub struct RsaPrivateComponents {
    pub d: Zeroizing<Vec<u8>>,
    pub p: Zeroizing<Vec<u8>>,
    pub q: Zeroizing<Vec<u8>>,
}

/// Key material after framing has been removed
pub enum KeySource<'a> {
    /// DER bytes (SubjectPublicKeyInfo / PKCS#8, PKCS#1 accepted as fallback)
    Der(&'a [u8]),

    /// Decoded JWK integers
    Jwk(&'a RsaComponents),
}

/// Capability that performs the actual asymmetric primitives
///
/// Key handles are split by purpose: an [`CipherProvider::EncryptKey`] can
/// only reach [`CipherProvider::encrypt`], a [`CipherProvider::DecryptKey`]
/// only [`CipherProvider::decrypt`].
pub trait CipherProvider {
    /// Handle bound to the encrypt operation
    type EncryptKey;

    /// Handle bound to the decrypt operation
    type DecryptKey;

    /// Parse public key material into an encrypt-only handle
    fn import_encrypt_key(
        &self,
        source: KeySource<'_>,
        scheme: PaddingScheme,
    ) -> Result<Self::EncryptKey, ProviderError>;

    /// Parse private key material into a decrypt-only handle
    fn import_decrypt_key(
        &self,
        source: KeySource<'_>,
        scheme: PaddingScheme,
    ) -> Result<Self::DecryptKey, ProviderError>;

    /// Modulus length in bytes
    fn encrypt_key_size(&self, key: &Self::EncryptKey) -> usize;

    /// Modulus length in bytes
    fn decrypt_key_size(&self, key: &Self::DecryptKey) -> usize;

    fn encrypt(
        &self,
        key: &Self::EncryptKey,
        scheme: PaddingScheme,
        plaintext: &[u8],
    ) -> Result<Vec<u8>, ProviderError>;

    fn decrypt(
        &self,
        key: &Self::DecryptKey,
        scheme: PaddingScheme,
        ciphertext: &[u8],
    ) -> Result<Vec<u8>, ProviderError>;
}

// ============================================================================
// RustCrypto rsa backend
// ============================================================================

/// Provider backed by the RustCrypto `rsa` crate
///
/// Stateless; randomness is drawn from `OsRng` on every encrypt call, so a
/// single instance can be shared freely between threads.
#[derive(Debug, Clone, Copy, Default)]
pub struct RustCryptoProvider;

impl RustCryptoProvider {
    pub fn new() -> Self {
        RustCryptoProvider
    }
}

impl CipherProvider for RustCryptoProvider {
    type EncryptKey = RsaPublicKey;
    type DecryptKey = RsaPrivateKey;

    fn import_encrypt_key(
        &self,
        source: KeySource<'_>,
        _scheme: PaddingScheme,
    ) -> Result<RsaPublicKey, ProviderError> {
        match source {
            KeySource::Der(der) => RsaPublicKey::from_public_key_der(der).or_else(|spki_err| {
                RsaPublicKey::from_pkcs1_der(der).map_err(|_| {
                    ProviderError::InvalidKey(format!(
                        "not an RSA SubjectPublicKeyInfo: {}",
                        spki_err
                    ))
                })
            }),
            KeySource::Jwk(components) => RsaPublicKey::new(
                BigUint::from_bytes_be(&components.n),
                BigUint::from_bytes_be(&components.e),
            )
            .map_err(|e| ProviderError::InvalidKey(e.to_string())),
        }
    }

    fn import_decrypt_key(
        &self,
        source: KeySource<'_>,
        _scheme: PaddingScheme,
    ) -> Result<RsaPrivateKey, ProviderError> {
        match source {
            KeySource::Der(der) => RsaPrivateKey::from_pkcs8_der(der).or_else(|pkcs8_err| {
                RsaPrivateKey::from_pkcs1_der(der).map_err(|_| {
                    ProviderError::InvalidKey(format!("not an RSA PKCS#8 private key: {}", pkcs8_err))
                })
            }),
            KeySource::Jwk(components) => {
                let private = components.private.as_ref().ok_or_else(|| {
                    ProviderError::InvalidKey("private exponent missing".to_string())
                })?;
                let key = RsaPrivateKey::from_components(
                    BigUint::from_bytes_be(&components.n),
                    BigUint::from_bytes_be(&components.e),
                    BigUint::from_bytes_be(&private.d),
                    vec![
                        BigUint::from_bytes_be(&private.p),
                        BigUint::from_bytes_be(&private.q),
                    ],
                )
                .map_err(|e| ProviderError::InvalidKey(e.to_string()))?;
                key.validate()
                    .map_err(|e| ProviderError::InvalidKey(e.to_string()))?;
                Ok(key)
            }
        }
    }

    fn encrypt_key_size(&self, key: &RsaPublicKey) -> usize {
        key.size()
    }

    fn decrypt_key_size(&self, key: &RsaPrivateKey) -> usize {
        key.size()
    }

    fn encrypt(
        &self,
        key: &RsaPublicKey,
        scheme: PaddingScheme,
        plaintext: &[u8],
    ) -> Result<Vec<u8>, ProviderError> {
        let mut rng = OsRng;
        let result = match scheme {
            PaddingScheme::Oaep(OaepHash::Sha256) => {
                key.encrypt(&mut rng, Oaep::new::<Sha256>(), plaintext)
            }
            PaddingScheme::Oaep(OaepHash::Sha384) => {
                key.encrypt(&mut rng, Oaep::new::<Sha384>(), plaintext)
            }
            PaddingScheme::Oaep(OaepHash::Sha512) => {
                key.encrypt(&mut rng, Oaep::new::<Sha512>(), plaintext)
            }
            PaddingScheme::Pkcs1v15 => key.encrypt(&mut rng, Pkcs1v15Encrypt, plaintext),
        };
        result.map_err(|e| ProviderError::EncryptFailed(format!("{}: {}", scheme, e)))
    }

    fn decrypt(
        &self,
        key: &RsaPrivateKey,
        scheme: PaddingScheme,
        ciphertext: &[u8],
    ) -> Result<Vec<u8>, ProviderError> {
        let result = match scheme {
            PaddingScheme::Oaep(OaepHash::Sha256) => key.decrypt(Oaep::new::<Sha256>(), ciphertext),
            PaddingScheme::Oaep(OaepHash::Sha384) => key.decrypt(Oaep::new::<Sha384>(), ciphertext),
            PaddingScheme::Oaep(OaepHash::Sha512) => key.decrypt(Oaep::new::<Sha512>(), ciphertext),
            PaddingScheme::Pkcs1v15 => key.decrypt(Pkcs1v15Encrypt, ciphertext),
        };
        result.map_err(|e| ProviderError::DecryptFailed(format!("{}: {}", scheme, e)))
    }
}
