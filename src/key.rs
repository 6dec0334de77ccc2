//! Key import
//!
//! Turns key text in one of three representations into a [`KeyMaterial`]
//! whose handle is bound to exactly one operation. The role check happens
//! before any parsing, so a mismatched request never reaches the provider.
//!
//! Supported representations:
//!
//! - **PEM**: `-----BEGIN ...-----` framed base64 (SubjectPublicKeyInfo or PKCS#8;
//!   PKCS#1 `RSA PUBLIC KEY` / `RSA PRIVATE KEY` bodies are accepted too)
//! - **DER**: the same bytes as a bare base64 string
//! - **JWK**: an RFC 7517 RSA key object

use crate::error::TransformError;
use crate::provider::{CipherProvider, KeySource, RsaComponents, RsaPrivateComponents};
use crate::scheme::PaddingScheme;
use crate::transform::Operation;
use base64::{
    engine::general_purpose::{STANDARD as BASE64, URL_SAFE_NO_PAD},
    Engine as _,
};
use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

/// Textual key representation supplied by the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyFormat {
    Pem,
    Der,
    Jwk,
}

impl KeyFormat {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Pem => "PEM",
            Self::Der => "DER",
            Self::Jwk => "JWK",
        }
    }
}

/// Declared role of the supplied key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyRole {
    Public,
    Private,
}

impl KeyRole {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Public => "public",
            Self::Private => "private",
        }
    }

    /// The only operation a key of this role may be bound to
    pub fn operation(&self) -> Operation {
        match self {
            Self::Public => Operation::Encrypt,
            Self::Private => Operation::Decrypt,
        }
    }
}

/// Operation-scoped key handle
pub enum KeyHandle<P: CipherProvider> {
    Encrypt(P::EncryptKey),
    Decrypt(P::DecryptKey),
}

/// An imported key, ready for a single transform
pub struct KeyMaterial<P: CipherProvider> {
    role: KeyRole,
    format: KeyFormat,
    scheme: PaddingScheme,
    size_bytes: usize,
    handle: KeyHandle<P>,
}

impl<P: CipherProvider> KeyMaterial<P> {
    pub fn role(&self) -> KeyRole {
        self.role
    }

    pub fn format(&self) -> KeyFormat {
        self.format
    }

    pub fn scheme(&self) -> PaddingScheme {
        self.scheme
    }

    pub fn algorithm_name(&self) -> &'static str {
        self.scheme.algorithm_name()
    }

    /// Modulus length in bytes
    pub fn size_bytes(&self) -> usize {
        self.size_bytes
    }

    pub fn handle(&self) -> &KeyHandle<P> {
        &self.handle
    }

    /// Encrypt with an encrypt-bound handle
    pub fn encrypt(&self, provider: &P, plaintext: &[u8]) -> Result<Vec<u8>, TransformError> {
        match &self.handle {
            KeyHandle::Encrypt(key) => provider
                .encrypt(key, self.scheme, plaintext)
                .map_err(|e| TransformError::PrimitiveFailure {
                    operation: Operation::Encrypt.name(),
                    reason: e.detail().to_string(),
                }),
            KeyHandle::Decrypt(_) => Err(wrong_role(self.role, Operation::Encrypt)),
        }
    }

    /// Decrypt with a decrypt-bound handle
    pub fn decrypt(&self, provider: &P, ciphertext: &[u8]) -> Result<Vec<u8>, TransformError> {
        match &self.handle {
            KeyHandle::Decrypt(key) => provider
                .decrypt(key, self.scheme, ciphertext)
                .map_err(|e| TransformError::PrimitiveFailure {
                    operation: Operation::Decrypt.name(),
                    reason: e.detail().to_string(),
                }),
            KeyHandle::Encrypt(_) => Err(wrong_role(self.role, Operation::Decrypt)),
        }
    }
}

fn wrong_role(role: KeyRole, operation: Operation) -> TransformError {
    TransformError::WrongKeyRole {
        role: role.name(),
        operation: operation.name(),
    }
}

/// Import `key_text` and bind it to `operation`
///
/// Fails with `WrongKeyRole` before touching the key text if `role` cannot
/// perform `operation`.
pub fn import<P: CipherProvider>(
    provider: &P,
    key_text: &str,
    format: KeyFormat,
    role: KeyRole,
    operation: Operation,
    scheme: PaddingScheme,
) -> Result<KeyMaterial<P>, TransformError> {
    if role.operation() != operation {
        return Err(wrong_role(role, operation));
    }

    let handle = match format {
        KeyFormat::Pem | KeyFormat::Der => {
            let body = match format {
                KeyFormat::Pem => strip_pem_framing(key_text)?,
                _ => strip_whitespace(key_text),
            };
            let der = decode_key_body(&body, format)?;
            bind(provider, KeySource::Der(&der), format, role, scheme)?
        }
        KeyFormat::Jwk => {
            let components = parse_jwk(key_text, role, scheme)?;
            bind(provider, KeySource::Jwk(&components), format, role, scheme)?
        }
    };

    let size_bytes = match &handle {
        KeyHandle::Encrypt(key) => provider.encrypt_key_size(key),
        KeyHandle::Decrypt(key) => provider.decrypt_key_size(key),
    };

    Ok(KeyMaterial {
        role,
        format,
        scheme,
        size_bytes,
        handle,
    })
}

fn bind<P: CipherProvider>(
    provider: &P,
    source: KeySource<'_>,
    format: KeyFormat,
    role: KeyRole,
    scheme: PaddingScheme,
) -> Result<KeyHandle<P>, TransformError> {
    let handle = match role {
        KeyRole::Public => provider
            .import_encrypt_key(source, scheme)
            .map(KeyHandle::Encrypt),
        KeyRole::Private => provider
            .import_decrypt_key(source, scheme)
            .map(KeyHandle::Decrypt),
    };
    handle.map_err(|e| TransformError::malformed_key(format.name(), e.detail()))
}

const PEM_BEGIN: &str = "-----BEGIN ";
const PEM_END: &str = "-----END ";
const PEM_DASHES: &str = "-----";

/// Remove the BEGIN/END delimiters and all whitespace, leaving the base64 body
fn strip_pem_framing(text: &str) -> Result<String, TransformError> {
    let missing = |what: &str| TransformError::malformed_key("PEM", format!("missing {}", what));

    let begin = text.find(PEM_BEGIN).ok_or_else(|| missing("BEGIN line"))?;
    let after_begin = &text[begin + PEM_BEGIN.len()..];
    let label_end = after_begin
        .find(PEM_DASHES)
        .ok_or_else(|| missing("BEGIN line terminator"))?;
    let rest = &after_begin[label_end + PEM_DASHES.len()..];
    let end = rest.find(PEM_END).ok_or_else(|| missing("END line"))?;

    Ok(strip_whitespace(&rest[..end]))
}

fn strip_whitespace(text: &str) -> String {
    text.chars().filter(|c| !c.is_whitespace()).collect()
}

fn decode_key_body(body: &str, format: KeyFormat) -> Result<Zeroizing<Vec<u8>>, TransformError> {
    if body.is_empty() {
        return Err(TransformError::malformed_key(format.name(), "key body is empty"));
    }
    BASE64.decode(body).map(Zeroizing::new).map_err(|e| {
        TransformError::invalid_encoding("base64", format!("{} key body: {}", format.name(), e))
    })
}

/// RSA JSON Web Key members this importer understands
#[derive(Deserialize)]
struct RsaJwk {
    kty: String,
    n: Option<String>,
    e: Option<String>,
    d: Option<String>,
    p: Option<String>,
    q: Option<String>,
    alg: Option<String>,
    key_ops: Option<Vec<String>>,
    #[serde(rename = "use")]
    key_use: Option<String>,
}

fn parse_jwk(
    text: &str,
    role: KeyRole,
    scheme: PaddingScheme,
) -> Result<RsaComponents, TransformError> {
    let malformed = |reason: String| TransformError::malformed_key("JWK", reason);

    let jwk: RsaJwk =
        serde_json::from_str(text).map_err(|e| malformed(format!("invalid JSON: {}", e)))?;

    if jwk.kty != "RSA" {
        return Err(malformed(format!("expected kty \"RSA\", found \"{}\"", jwk.kty)));
    }
    if let Some(alg) = &jwk.alg {
        if alg != scheme.jwk_alg() {
            return Err(malformed(format!(
                "alg \"{}\" does not match {} (expected \"{}\")",
                alg,
                scheme,
                scheme.jwk_alg()
            )));
        }
    }
    let operation = role.operation().name();
    if let Some(ops) = &jwk.key_ops {
        if !ops.iter().any(|op| op == operation) {
            return Err(malformed(format!("key_ops does not allow \"{}\"", operation)));
        }
    }
    if let Some(key_use) = &jwk.key_use {
        if key_use != "enc" {
            return Err(malformed(format!("use \"{}\" is not \"enc\"", key_use)));
        }
    }

    let member = |name: &str, value: &Option<String>| -> Result<Vec<u8>, TransformError> {
        let value = value
            .as_deref()
            .ok_or_else(|| malformed(format!("missing member \"{}\"", name)))?;
        let bytes = URL_SAFE_NO_PAD
            .decode(value)
            .map_err(|e| malformed(format!("member \"{}\" is not base64url: {}", name, e)))?;
        if bytes.is_empty() {
            return Err(malformed(format!("member \"{}\" is empty", name)));
        }
        Ok(bytes)
    };

    let n = member("n", &jwk.n)?;
    let e = member("e", &jwk.e)?;

    let private = match role {
        KeyRole::Public => {
            if jwk.d.is_some() {
                return Err(malformed(
                    "private key supplied where a public key was declared".to_string(),
                ));
            }
            None
        }
        KeyRole::Private => Some(RsaPrivateComponents {
            d: Zeroizing::new(member("d", &jwk.d)?),
            p: Zeroizing::new(member("p", &jwk.p)?),
            q: Zeroizing::new(member("q", &jwk.q)?),
        }),
    };

    Ok(RsaComponents { n, e, private })
}
