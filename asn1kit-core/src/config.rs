//! Codec configuration
//!
//! A [`CodecConfig`] travels with every decode/encode call. It carries the
//! encoding rules plus the resource limits that bound stack usage and memory
//! when decoding untrusted input.
//!
//! # Usage Example
//!
//! ```rust
//! use asn1kit_core::{CodecConfig, EncodingRules};
//!
//! let config = CodecConfig::builder()
//!     .rules(EncodingRules::Ber)
//!     .max_depth(32)
//!     .build()
//!     .unwrap();
//! assert_eq!(config.rules, EncodingRules::Ber);
//! ```

use crate::error::{Asn1Error, Asn1Result};
use crate::rules::EncodingRules;
use serde::{Deserialize, Serialize};

/// Default maximum nesting depth of constructed encodings
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Default maximum declared length of a single TLV (16 MiB)
pub const DEFAULT_MAX_LENGTH: usize = 16 * 1024 * 1024;

/// Configuration threaded through every codec call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CodecConfig {
    /// Encoding rules
    pub rules: EncodingRules,
    /// Maximum nesting depth of constructed encodings
    pub max_depth: usize,
    /// Maximum declared length of any TLV
    pub max_length: usize,
}

impl CodecConfig {
    /// DER configuration with default limits
    pub fn der() -> Self {
        Self::with_rules(EncodingRules::Der)
    }

    /// CER configuration with default limits
    pub fn cer() -> Self {
        Self::with_rules(EncodingRules::Cer)
    }

    /// BER configuration with default limits
    pub fn ber() -> Self {
        Self::with_rules(EncodingRules::Ber)
    }

    /// Configuration for the given rules with default limits
    pub fn with_rules(rules: EncodingRules) -> Self {
        Self {
            rules,
            max_depth: DEFAULT_MAX_DEPTH,
            max_length: DEFAULT_MAX_LENGTH,
        }
    }

    /// Start building a configuration
    pub fn builder() -> CodecConfigBuilder {
        CodecConfigBuilder::new()
    }
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self::der()
    }
}

/// Builder for [`CodecConfig`]
///
/// # Default Settings
/// - Rules: DER
/// - Max depth: 64
/// - Max length: 16 MiB
#[derive(Debug, Clone)]
pub struct CodecConfigBuilder {
    rules: EncodingRules,
    max_depth: usize,
    max_length: usize,
}

impl CodecConfigBuilder {
    /// Create a new builder with default settings
    pub fn new() -> Self {
        Self {
            rules: EncodingRules::Der,
            max_depth: DEFAULT_MAX_DEPTH,
            max_length: DEFAULT_MAX_LENGTH,
        }
    }

    /// Set the encoding rules
    pub fn rules(mut self, rules: EncodingRules) -> Self {
        self.rules = rules;
        self
    }

    /// Set the maximum nesting depth
    pub fn max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Set the maximum declared TLV length
    pub fn max_length(mut self, max_length: usize) -> Self {
        self.max_length = max_length;
        self
    }

    /// Build the configuration
    ///
    /// # Errors
    /// Returns `InvalidValue` if either limit is zero.
    pub fn build(self) -> Asn1Result<CodecConfig> {
        if self.max_depth == 0 {
            return Err(Asn1Error::InvalidValue(
                "max_depth must be at least 1".to_string(),
            ));
        }
        if self.max_length == 0 {
            return Err(Asn1Error::InvalidValue(
                "max_length must be at least 1".to_string(),
            ));
        }
        Ok(CodecConfig {
            rules: self.rules,
            max_depth: self.max_depth,
            max_length: self.max_length,
        })
    }
}

impl Default for CodecConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let config = CodecConfigBuilder::new().build().unwrap();
        assert_eq!(config, CodecConfig::der());
        assert_eq!(config.max_depth, DEFAULT_MAX_DEPTH);
    }

    #[test]
    fn test_builder_rejects_zero_depth() {
        let result = CodecConfig::builder().max_depth(0).build();
        assert!(matches!(result, Err(Asn1Error::InvalidValue(_))));
    }

    #[test]
    fn test_config_from_partial_json() {
        let config: CodecConfig = serde_json::from_str(r#"{"rules":"ber","max_depth":8}"#).unwrap();
        assert_eq!(config.rules, EncodingRules::Ber);
        assert_eq!(config.max_depth, 8);
        assert_eq!(config.max_length, DEFAULT_MAX_LENGTH);
    }
}
