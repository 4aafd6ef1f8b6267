//! BER TLV writer
//!
//! # Usage Example
//!
//! ```rust
//! use asn1kit_codec::ber::{BerEncoder, Tag};
//!
//! let mut encoder = BerEncoder::new();
//! encoder.encode_tlv(Tag::INTEGER, false, &[0x30, 0x39]);
//! assert_eq!(encoder.into_bytes(), vec![0x02, 0x02, 0x30, 0x39]);
//! ```

use crate::ber::types::{Length, Tag};
use bytes::{BufMut, BytesMut};

/// BER TLV writer
///
/// Identifier octets always use the canonical form and definite lengths are
/// always minimal, so everything written is valid DER unless the caller asks
/// for an indefinite length (CER).
pub struct BerEncoder {
    buffer: BytesMut,
}

impl BerEncoder {
    /// Create a new BER encoder
    pub fn new() -> Self {
        Self {
            buffer: BytesMut::new(),
        }
    }

    /// Create a new BER encoder with initial capacity
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buffer: BytesMut::with_capacity(capacity),
        }
    }

    /// Write identifier and length octets
    pub fn write_header(&mut self, tag: Tag, constructed: bool, length: Length) {
        self.buffer.put_slice(&tag.encode(constructed));
        self.buffer.put_slice(&length.encode());
    }

    /// Encode a TLV (Tag-Length-Value) triplet with a definite length
    pub fn encode_tlv(&mut self, tag: Tag, constructed: bool, value: &[u8]) {
        self.write_header(tag, constructed, Length::Definite(value.len()));
        self.buffer.put_slice(value);
    }

    /// Write the end-of-contents marker closing an indefinite length
    pub fn write_end_of_contents(&mut self) {
        self.buffer.put_slice(&[0x00, 0x00]);
    }

    /// Append already encoded octets
    pub fn write_raw(&mut self, bytes: &[u8]) {
        self.buffer.put_slice(bytes);
    }

    /// Number of bytes written so far
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// Check if nothing has been written
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Get the encoded bytes
    pub fn into_bytes(self) -> Vec<u8> {
        self.buffer.to_vec()
    }

    /// Get a reference to the encoded bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.buffer
    }

    /// Clear the encoder buffer
    pub fn clear(&mut self) {
        self.buffer.clear();
    }
}

impl Default for BerEncoder {
    fn default() -> Self {
        Self::new()
    }
}
