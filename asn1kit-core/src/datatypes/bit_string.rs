//! ASN.1 BIT STRING value

use crate::error::{Asn1Error, Asn1Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Arbitrary string of bits (zeros and ones). A bit string value can have any length including zero.
///
/// Bits are stored MSB first; the final octet may carry 0-7 unused trailing bits.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "BitStringRepr")]
pub struct BitString {
    #[serde(with = "serde_bytes")]
    bytes: Vec<u8>,
    num_bits: usize,
}

#[derive(Deserialize)]
struct BitStringRepr {
    #[serde(with = "serde_bytes")]
    bytes: Vec<u8>,
    num_bits: usize,
}

impl TryFrom<BitStringRepr> for BitString {
    type Error = Asn1Error;

    fn try_from(repr: BitStringRepr) -> Asn1Result<Self> {
        Self::new(repr.bytes, repr.num_bits)
    }
}

impl BitString {
    /// Construct a new bit string object.
    ///
    /// # Arguments
    ///
    /// * `bit_string` - The bit string as a byte array
    /// * `num_bits` - The number of bits
    ///
    /// # Errors
    ///
    /// Returns `InvalidValue` unless `bit_string` holds exactly
    /// `ceil(num_bits / 8)` octets.
    pub fn new(bit_string: Vec<u8>, num_bits: usize) -> Asn1Result<Self> {
        if num_bits.div_ceil(8) != bit_string.len() {
            return Err(Asn1Error::InvalidValue(format!(
                "bit string of {} bits needs {} bytes, got {}",
                num_bits,
                num_bits.div_ceil(8),
                bit_string.len()
            )));
        }

        Ok(Self {
            bytes: bit_string,
            num_bits,
        })
    }

    /// Construct from octets and the count of unused bits in the final octet
    ///
    /// # Errors
    ///
    /// Returns `InvalidValue` if `unused_bits` is above 7, or non-zero for an
    /// empty string.
    pub fn from_raw(bytes: Vec<u8>, unused_bits: u8) -> Asn1Result<Self> {
        if unused_bits > 7 {
            return Err(Asn1Error::InvalidValue(format!(
                "Invalid unused bits: {} (must be 0-7)",
                unused_bits
            )));
        }
        if bytes.is_empty() && unused_bits != 0 {
            return Err(Asn1Error::InvalidValue(
                "Empty bit string cannot have unused bits".to_string(),
            ));
        }
        let num_bits = bytes.len() * 8 - unused_bits as usize;
        Ok(Self { bytes, num_bits })
    }

    /// Get the bit string as byte array.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// The number of bits in the byte array.
    pub fn num_bits(&self) -> usize {
        self.num_bits
    }

    /// Number of unused bits in the final octet (0-7)
    pub fn unused_bits(&self) -> u8 {
        (self.bytes.len() * 8 - self.num_bits) as u8
    }

    /// Check that every unused trailing bit is zero, as DER requires
    pub fn has_clean_padding(&self) -> bool {
        let mask = (1u8 << self.unused_bits()) - 1;
        self.bytes.last().is_none_or(|&last| last & mask == 0)
    }

    /// Get the bit at a specific position
    ///
    /// # Arguments
    /// * `index` - The bit index (0-based)
    ///
    /// # Returns
    /// * `true` if the bit is set, `false` otherwise
    /// * `Err` if the index is out of bounds
    pub fn get_bit(&self, index: usize) -> Asn1Result<bool> {
        if index >= self.num_bits {
            return Err(Asn1Error::InvalidValue(format!(
                "Bit index {} out of bounds (num_bits: {})",
                index, self.num_bits
            )));
        }
        let byte_index = index / 8;
        let bit_index = 7 - (index % 8); // MSB first
        Ok((self.bytes[byte_index] >> bit_index) & 1 == 1)
    }

    /// Set the bit at a specific position
    ///
    /// # Arguments
    /// * `index` - The bit index (0-based)
    /// * `value` - The value to set (true = 1, false = 0)
    pub fn set_bit(&mut self, index: usize, value: bool) -> Asn1Result<()> {
        if index >= self.num_bits {
            return Err(Asn1Error::InvalidValue(format!(
                "Bit index {} out of bounds (num_bits: {})",
                index, self.num_bits
            )));
        }
        let byte_index = index / 8;
        let bit_index = 7 - (index % 8); // MSB first
        if value {
            self.bytes[byte_index] |= 1 << bit_index;
        } else {
            self.bytes[byte_index] &= !(1 << bit_index);
        }
        Ok(())
    }
}

impl fmt::Display for BitString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, byte) in self.bytes.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{:02X}", byte)?;
        }
        Ok(())
    }
}
