//! Pipeline configuration
//!
//! Values can be built directly, deserialized, or read from the environment.

use crate::sizing::SizePolicy;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Environment variable selecting the plaintext size policy (`exact` or `fixed`)
pub const SIZE_POLICY_ENV: &str = "RSA_TRANSFORM_SIZE_POLICY";

/// Configuration shared by every transform an executor runs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransformConfig {
    #[serde(default)]
    pub size_policy: SizePolicy,
}

impl TransformConfig {
    pub fn with_size_policy(mut self, size_policy: SizePolicy) -> Self {
        self.size_policy = size_policy;
        self
    }

    /// Load configuration from environment variables
    ///
    /// Unset or unparseable values fall back to the defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = TransformConfig::default();
        if let Some(raw) = lookup(SIZE_POLICY_ENV) {
            match raw.parse::<SizePolicy>() {
                Ok(policy) => config.size_policy = policy,
                Err(e) => warn!("Ignoring {}: {}", SIZE_POLICY_ENV, e),
            }
        }
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = TransformConfig::default();
        assert_eq!(config.size_policy, SizePolicy::Exact);
    }

    #[test]
    fn test_from_lookup() {
        let config = TransformConfig::from_lookup(|_| Some("fixed".to_string()));
        assert_eq!(config.size_policy, SizePolicy::Fixed);

        let config = TransformConfig::from_lookup(|_| Some("bogus".to_string()));
        assert_eq!(config.size_policy, SizePolicy::Exact);

        let config = TransformConfig::from_lookup(|_| None);
        assert_eq!(config, TransformConfig::default());
    }

    #[test]
    fn test_deserialize() {
        let config: TransformConfig = serde_json::from_str(r#"{"sizePolicy":"fixed"}"#).unwrap();
        assert_eq!(config.size_policy, SizePolicy::Fixed);

        let config: TransformConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config.size_policy, SizePolicy::Exact);
    }
}
