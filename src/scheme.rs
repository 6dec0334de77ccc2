//! Padding scheme and hash selection
//!
//! The scheme is a closed enum: OAEP always carries its hash, PKCS#1 v1.5
//! never does. Adding a variant forces every match site to be updated.

use serde::{Deserialize, Serialize};

/// OAEP hash algorithm selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum OaepHash {
    /// SHA-256 (default)
    #[default]
    #[serde(rename = "SHA-256", alias = "sha256", alias = "sha-256")]
    Sha256,

    #[serde(rename = "SHA-384", alias = "sha384", alias = "sha-384")]
    Sha384,

    #[serde(rename = "SHA-512", alias = "sha512", alias = "sha-512")]
    Sha512,
}

impl OaepHash {
    /// Digest output length in bytes
    pub fn output_len(&self) -> usize {
        match self {
            Self::Sha256 => 32,
            Self::Sha384 => 48,
            Self::Sha512 => 64,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Sha256 => "SHA-256",
            Self::Sha384 => "SHA-384",
            Self::Sha512 => "SHA-512",
        }
    }
}

/// RSA encryption padding scheme
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PaddingScheme {
    /// RSAES-OAEP with MGF1 over the same hash
    Oaep(OaepHash),

    /// RSAES-PKCS1-v1_5
    Pkcs1v15,
}

impl Default for PaddingScheme {
    fn default() -> Self {
        PaddingScheme::Oaep(OaepHash::default())
    }
}

impl PaddingScheme {
    /// Algorithm name the key handle is bound to
    pub fn algorithm_name(&self) -> &'static str {
        match self {
            Self::Oaep(_) => "RSA-OAEP",
            Self::Pkcs1v15 => "RSAES-PKCS1-v1_5",
        }
    }

    pub fn hash(&self) -> Option<OaepHash> {
        match self {
            Self::Oaep(hash) => Some(*hash),
            Self::Pkcs1v15 => None,
        }
    }

    /// JWK `alg` value matching this scheme (RFC 7518 §4.1)
    pub fn jwk_alg(&self) -> &'static str {
        match self {
            Self::Oaep(OaepHash::Sha256) => "RSA-OAEP-256",
            Self::Oaep(OaepHash::Sha384) => "RSA-OAEP-384",
            Self::Oaep(OaepHash::Sha512) => "RSA-OAEP-512",
            Self::Pkcs1v15 => "RSA1_5",
        }
    }
}

impl std::fmt::Display for PaddingScheme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Oaep(hash) => write!(f, "RSA-OAEP/{}", hash.name()),
            Self::Pkcs1v15 => f.write_str("RSAES-PKCS1-v1_5"),
        }
    }
}

/// Padding family as it appears on the wire, before the hash is attached
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Padding {
    #[default]
    #[serde(alias = "rsa-oaep")]
    Oaep,
    #[serde(alias = "pkcs1", alias = "pkcs1-v1_5")]
    Pkcs1v15,
}

impl Padding {
    /// Attach the hash; it is ignored for PKCS#1 v1.5
    pub fn with_hash(self, hash: OaepHash) -> PaddingScheme {
        match self {
            Padding::Oaep => PaddingScheme::Oaep(hash),
            Padding::Pkcs1v15 => PaddingScheme::Pkcs1v15,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_lengths() {
        assert_eq!(OaepHash::Sha256.output_len(), 32);
        assert_eq!(OaepHash::Sha384.output_len(), 48);
        assert_eq!(OaepHash::Sha512.output_len(), 64);
    }

    #[test]
    fn test_scheme_names() {
        let oaep = PaddingScheme::Oaep(OaepHash::Sha384);
        assert_eq!(oaep.algorithm_name(), "RSA-OAEP");
        assert_eq!(oaep.jwk_alg(), "RSA-OAEP-384");
        assert_eq!(oaep.to_string(), "RSA-OAEP/SHA-384");
        assert_eq!(PaddingScheme::Pkcs1v15.hash(), None);
        assert_eq!(PaddingScheme::default(), PaddingScheme::Oaep(OaepHash::Sha256));
    }

    #[test]
    fn test_padding_with_hash() {
        assert_eq!(
            Padding::Oaep.with_hash(OaepHash::Sha512),
            PaddingScheme::Oaep(OaepHash::Sha512)
        );
        assert_eq!(
            Padding::Pkcs1v15.with_hash(OaepHash::Sha512),
            PaddingScheme::Pkcs1v15
        );
    }

    #[test]
    fn test_wire_names() {
        let hash: OaepHash = serde_json::from_str("\"SHA-512\"").unwrap();
        assert_eq!(hash, OaepHash::Sha512);
        let padding: Padding = serde_json::from_str("\"pkcs1v15\"").unwrap();
        assert_eq!(padding, Padding::Pkcs1v15);
        assert_eq!(serde_json::to_string(&OaepHash::Sha256).unwrap(), "\"SHA-256\"");
    }
}
