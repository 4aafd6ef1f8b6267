//! Arbitrary-precision ASN.1 INTEGER

use crate::error::{Asn1Error, Asn1Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Signed integer of any size, kept as minimal big-endian two's complement
///
/// Certificate serial numbers routinely exceed 64 bits, so the value is
/// stored as octets rather than a machine integer. The octets are always
/// minimal: no redundant leading 0x00 or 0xFF.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "IntegerRepr")]
pub struct Integer {
    #[serde(with = "serde_bytes")]
    bytes: Vec<u8>,
}

#[derive(Deserialize)]
struct IntegerRepr {
    #[serde(with = "serde_bytes")]
    bytes: Vec<u8>,
}

impl TryFrom<IntegerRepr> for Integer {
    type Error = Asn1Error;

    fn try_from(repr: IntegerRepr) -> Asn1Result<Self> {
        if !Self::is_minimal(&repr.bytes) {
            return Err(Asn1Error::InvalidValue(format!(
                "Integer octets {:02X?} are not minimal two's complement",
                repr.bytes
            )));
        }
        Ok(Self { bytes: repr.bytes })
    }
}

impl Integer {
    /// Create from a machine integer
    pub fn from_i64(value: i64) -> Self {
        Self {
            bytes: minimize(&value.to_be_bytes()).to_vec(),
        }
    }

    /// Create from big-endian two's complement octets
    ///
    /// Redundant leading octets are stripped.
    ///
    /// # Errors
    /// Returns `InvalidValue` if `bytes` is empty.
    pub fn from_signed_bytes(bytes: &[u8]) -> Asn1Result<Self> {
        if bytes.is_empty() {
            return Err(Asn1Error::InvalidValue(
                "Integer needs at least one octet".to_string(),
            ));
        }
        Ok(Self {
            bytes: minimize(bytes).to_vec(),
        })
    }

    /// Create a non-negative integer from big-endian magnitude octets
    pub fn from_unsigned_bytes(bytes: &[u8]) -> Self {
        let start = bytes.iter().position(|&b| b != 0).unwrap_or(bytes.len());
        let magnitude = &bytes[start..];
        let mut out = Vec::with_capacity(magnitude.len() + 1);
        if magnitude.first().is_none_or(|&b| b & 0x80 != 0) {
            out.push(0x00);
        }
        out.extend_from_slice(magnitude);
        Self { bytes: out }
    }

    /// Check that `bytes` is a minimal two's complement encoding
    pub fn is_minimal(bytes: &[u8]) -> bool {
        match bytes {
            [] => false,
            [first, second, ..] => !((*first == 0x00 && second & 0x80 == 0)
                || (*first == 0xFF && second & 0x80 != 0)),
            _ => true,
        }
    }

    /// Get the two's complement octets
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Check if the value is negative
    pub fn is_negative(&self) -> bool {
        self.bytes[0] & 0x80 != 0
    }

    /// Convert to `i64`, or `None` if the value does not fit
    pub fn to_i64(&self) -> Option<i64> {
        if self.bytes.len() > 8 {
            return None;
        }
        let fill = if self.is_negative() { 0xFF } else { 0x00 };
        let mut buf = [fill; 8];
        buf[8 - self.bytes.len()..].copy_from_slice(&self.bytes);
        Some(i64::from_be_bytes(buf))
    }
}

fn minimize(bytes: &[u8]) -> &[u8] {
    let mut start = 0;
    while start + 1 < bytes.len() {
        let (first, second) = (bytes[start], bytes[start + 1]);
        if (first == 0x00 && second & 0x80 == 0) || (first == 0xFF && second & 0x80 != 0) {
            start += 1;
        } else {
            break;
        }
    }
    &bytes[start..]
}

impl From<i64> for Integer {
    fn from(value: i64) -> Self {
        Self::from_i64(value)
    }
}

impl fmt::Display for Integer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_i64() {
            Some(value) => write!(f, "{}", value),
            None => {
                write!(f, "0x")?;
                for byte in &self.bytes {
                    write!(f, "{:02x}", byte)?;
                }
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integer_minimal_forms() {
        assert_eq!(Integer::from_i64(0).as_bytes(), &[0x00]);
        assert_eq!(Integer::from_i64(127).as_bytes(), &[0x7F]);
        assert_eq!(Integer::from_i64(128).as_bytes(), &[0x00, 0x80]);
        assert_eq!(Integer::from_i64(-128).as_bytes(), &[0x80]);
        assert_eq!(Integer::from_i64(-129).as_bytes(), &[0xFF, 0x7F]);
    }

    #[test]
    fn test_integer_to_i64() {
        for value in [0i64, 1, -1, 255, -256, i64::MAX, i64::MIN] {
            assert_eq!(Integer::from_i64(value).to_i64(), Some(value));
        }
    }

    #[test]
    fn test_integer_large_serial() {
        let serial = [
            0x02, 0xAC, 0x5C, 0x26, 0x6A, 0x0B, 0x40, 0x9B, 0x8F, 0x0B, 0x79, 0xF2, 0xAE, 0x46,
            0x25, 0x77,
        ];
        let integer = Integer::from_signed_bytes(&serial).unwrap();
        assert_eq!(integer.as_bytes(), &serial);
        assert_eq!(integer.to_i64(), None);
        assert!(integer.to_string().starts_with("0x02ac5c"));
    }

    #[test]
    fn test_integer_from_unsigned_bytes() {
        assert_eq!(Integer::from_unsigned_bytes(&[0xFF]).as_bytes(), &[0x00, 0xFF]);
        assert_eq!(Integer::from_unsigned_bytes(&[0x00, 0x00, 0x01]).as_bytes(), &[0x01]);
        assert_eq!(Integer::from_unsigned_bytes(&[]).as_bytes(), &[0x00]);
    }

    #[test]
    fn test_integer_is_minimal() {
        assert!(Integer::is_minimal(&[0x00]));
        assert!(Integer::is_minimal(&[0x00, 0x80]));
        assert!(!Integer::is_minimal(&[0x00, 0x7F]));
        assert!(!Integer::is_minimal(&[0xFF, 0x80]));
        assert!(!Integer::is_minimal(&[]));
    }

    #[test]
    fn test_integer_deserialize_validates() {
        let value: Integer = serde_json::from_str(r#"{"bytes":[0,128]}"#).unwrap();
        assert_eq!(value.to_i64(), Some(128));
        assert_eq!(serde_json::to_string(&value).unwrap(), r#"{"bytes":[0,128]}"#);

        assert!(serde_json::from_str::<Integer>(r#"{"bytes":[0,5]}"#).is_err());
        assert!(serde_json::from_str::<Integer>(r#"{"bytes":[255,128]}"#).is_err());
        assert!(serde_json::from_str::<Integer>(r#"{"bytes":[]}"#).is_err());
    }
}
