//! Encoding rule sets (ITU-T X.690)

use serde::{Deserialize, Serialize};
use std::fmt;

/// Encoding rules applied by a decode or encode call
///
/// - **BER**: permissive; any valid X.690 encoding is accepted on decode
/// - **CER**: canonical values, indefinite length for constructed encodings
/// - **DER**: canonical values, definite length only
///
/// The rules are always passed explicitly; there is no process-wide default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EncodingRules {
    Ber,
    Cer,
    #[default]
    Der,
}

impl EncodingRules {
    /// Whether value-level canonical forms are enforced on decode
    /// (booleans, minimal integers and lengths, SET ordering, times)
    pub fn is_canonical(self) -> bool {
        matches!(self, EncodingRules::Cer | EncodingRules::Der)
    }

    /// Whether indefinite lengths may appear on the wire
    pub fn allows_indefinite(self) -> bool {
        !matches!(self, EncodingRules::Der)
    }

    /// Whether constructed (segmented) string encodings may appear on the wire
    pub fn allows_constructed_strings(self) -> bool {
        !matches!(self, EncodingRules::Der)
    }
}

impl fmt::Display for EncodingRules {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EncodingRules::Ber => write!(f, "BER"),
            EncodingRules::Cer => write!(f, "CER"),
            EncodingRules::Der => write!(f, "DER"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rules_flags() {
        assert!(EncodingRules::Der.is_canonical());
        assert!(!EncodingRules::Der.allows_indefinite());
        assert!(EncodingRules::Cer.allows_indefinite());
        assert!(!EncodingRules::Ber.is_canonical());
        assert_eq!(EncodingRules::default(), EncodingRules::Der);
    }

    #[test]
    fn test_rules_serde() {
        let json = serde_json::to_string(&EncodingRules::Cer).unwrap();
        assert_eq!(json, "\"cer\"");
        let rules: EncodingRules = serde_json::from_str("\"ber\"").unwrap();
        assert_eq!(rules, EncodingRules::Ber);
    }
}
