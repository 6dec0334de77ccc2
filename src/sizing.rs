//! Plaintext size limits for RSA encryption
//!
//! The exact bound depends on the modulus and the padding:
//! `k - 2*hLen - 2` for OAEP, `k - 11` for PKCS#1 v1.5.

use crate::error::TransformError;
use crate::scheme::PaddingScheme;
use serde::{Deserialize, Serialize};

/// Fixed OAEP ceiling (2048-bit key with SHA-256)
pub const FIXED_OAEP_MAX: usize = 190;

/// Fixed PKCS#1 v1.5 ceiling (2048-bit key)
pub const FIXED_PKCS1V15_MAX: usize = 245;

const PKCS1V15_OVERHEAD: usize = 11;

/// How the plaintext ceiling is chosen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SizePolicy {
    /// Derive the bound from the imported key's modulus
    #[default]
    Exact,

    /// Use the fixed per-scheme ceilings, capped by the key's exact bound
    Fixed,
}

impl std::str::FromStr for SizePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "exact" => Ok(SizePolicy::Exact),
            "fixed" => Ok(SizePolicy::Fixed),
            other => Err(format!("unknown size policy '{}'", other)),
        }
    }
}

/// Maximum plaintext length for `scheme` with a modulus of `key_bytes`
pub fn max_plaintext_bytes(scheme: PaddingScheme, key_bytes: usize) -> usize {
    match scheme {
        PaddingScheme::Oaep(hash) => key_bytes.saturating_sub(2 * hash.output_len() + 2),
        PaddingScheme::Pkcs1v15 => key_bytes.saturating_sub(PKCS1V15_OVERHEAD),
    }
}

/// Fixed ceiling used when the modulus is not consulted
pub fn fixed_plaintext_bytes(scheme: PaddingScheme) -> usize {
    match scheme {
        PaddingScheme::Oaep(_) => FIXED_OAEP_MAX,
        PaddingScheme::Pkcs1v15 => FIXED_PKCS1V15_MAX,
    }
}

/// Ceiling for `scheme` under `policy`
///
/// The fixed ceilings never exceed what the modulus can carry.
pub fn limit(policy: SizePolicy, scheme: PaddingScheme, key_bytes: usize) -> usize {
    let exact = max_plaintext_bytes(scheme, key_bytes);
    match policy {
        SizePolicy::Exact => exact,
        SizePolicy::Fixed => fixed_plaintext_bytes(scheme).min(exact),
    }
}

/// Reject plaintext longer than the ceiling
pub fn validate(
    len: usize,
    scheme: PaddingScheme,
    key_bytes: usize,
    policy: SizePolicy,
) -> Result<(), TransformError> {
    let max = limit(policy, scheme, key_bytes);
    if len > max {
        return Err(TransformError::MessageTooLong { len, max });
    }
    Ok(())
}
