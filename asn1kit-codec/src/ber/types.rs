//! BER encoding types (Tag, Length, Header)

use asn1kit_core::{Asn1Error, Asn1Result, EncodingRules};
use serde::{Deserialize, Serialize};
use std::fmt;

/// BER Tag Class
///
/// ASN.1 defines four tag classes:
/// - **Universal**: Standard ASN.1 types (INTEGER, OCTET STRING, etc.)
/// - **Application**: Application-specific types
/// - **Context-specific**: Context-dependent types (used in SEQUENCE/SET)
/// - **Private**: Private/implementation-specific types
///
/// The declaration order is the canonical order used to sort SET members.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TagClass {
    /// Universal class (00)
    Universal = 0,
    /// Application class (01)
    Application = 1,
    /// Context-specific class (10)
    ContextSpecific = 2,
    /// Private class (11)
    Private = 3,
}

impl TagClass {
    /// Get tag class from bits (bits 8-7 of the identifier octet)
    pub fn from_bits(bits: u8) -> Self {
        match (bits >> 6) & 0x03 {
            0 => TagClass::Universal,
            1 => TagClass::Application,
            2 => TagClass::ContextSpecific,
            _ => TagClass::Private,
        }
    }

    /// Convert tag class to bits (for encoding)
    pub fn to_bits(self) -> u8 {
        (self as u8) << 6
    }
}

/// ASN.1 tag: class plus number
///
/// The primitive/constructed bit is a property of an encoding, not of a
/// type, so it travels separately in [`Header`]. Tags order first by class,
/// then by number, which is the canonical order of X.680 8.6.
///
/// # Encoding Format
///
/// Low form (tag number 0-30):
/// ```text
/// Bits: 8 7 6 5 4 3 2 1
///       C C P T T T T T
/// ```
///
/// High form (tag number >= 31):
/// ```text
/// First byte:  C C P 1 1 1 1 1
/// Following bytes: 1 T T T T T T T ... 0 T T T T T T T
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Tag {
    class: TagClass,
    number: u32,
}

impl Tag {
    pub const END_OF_CONTENTS: Tag = Tag::universal(0);
    pub const BOOLEAN: Tag = Tag::universal(1);
    pub const INTEGER: Tag = Tag::universal(2);
    pub const BIT_STRING: Tag = Tag::universal(3);
    pub const OCTET_STRING: Tag = Tag::universal(4);
    pub const NULL: Tag = Tag::universal(5);
    pub const OBJECT_IDENTIFIER: Tag = Tag::universal(6);
    pub const ENUMERATED: Tag = Tag::universal(10);
    pub const UTF8_STRING: Tag = Tag::universal(12);
    pub const SEQUENCE: Tag = Tag::universal(16);
    pub const SET: Tag = Tag::universal(17);
    pub const NUMERIC_STRING: Tag = Tag::universal(18);
    pub const PRINTABLE_STRING: Tag = Tag::universal(19);
    pub const TELETEX_STRING: Tag = Tag::universal(20);
    pub const IA5_STRING: Tag = Tag::universal(22);
    pub const UTC_TIME: Tag = Tag::universal(23);
    pub const GENERALIZED_TIME: Tag = Tag::universal(24);
    pub const VISIBLE_STRING: Tag = Tag::universal(26);
    pub const UNIVERSAL_STRING: Tag = Tag::universal(28);
    pub const BMP_STRING: Tag = Tag::universal(30);

    /// Create a new tag
    pub const fn new(class: TagClass, number: u32) -> Self {
        Self { class, number }
    }

    /// Create a Universal class tag
    pub const fn universal(number: u32) -> Self {
        Self::new(TagClass::Universal, number)
    }

    /// Create an Application class tag
    pub const fn application(number: u32) -> Self {
        Self::new(TagClass::Application, number)
    }

    /// Create a Context-specific class tag
    pub const fn context_specific(number: u32) -> Self {
        Self::new(TagClass::ContextSpecific, number)
    }

    /// Create a Private class tag
    pub const fn private(number: u32) -> Self {
        Self::new(TagClass::Private, number)
    }

    /// Get tag class
    pub fn class(&self) -> TagClass {
        self.class
    }

    /// Get tag number
    pub fn number(&self) -> u32 {
        self.number
    }

    /// Encode the identifier octets
    ///
    /// Numbers up to 30 use the single-octet low form. Larger numbers use
    /// the high form with the minimal count of base-128 octets.
    pub fn encode(&self, constructed: bool) -> Vec<u8> {
        let mut result = Vec::with_capacity(2);

        let class_bits = self.class.to_bits();
        let constructed_bit = if constructed { 0x20 } else { 0x00 };

        if self.number <= 30 {
            result.push(class_bits | constructed_bit | self.number as u8);
        } else {
            result.push(class_bits | constructed_bit | 0x1F);

            let mut remaining = self.number;
            let mut bytes = Vec::with_capacity(5);
            while remaining > 0 {
                bytes.push((remaining & 0x7F) as u8);
                remaining >>= 7;
            }

            // Reverse bytes and set continuation bit on all but last
            for (i, &byte) in bytes.iter().rev().enumerate() {
                if i < bytes.len() - 1 {
                    result.push(byte | 0x80);
                } else {
                    result.push(byte);
                }
            }
        }

        result
    }

    /// Decode identifier octets
    ///
    /// # Returns
    /// Returns `Ok((tag, constructed, bytes_consumed))`
    ///
    /// # Error Handling
    /// - `MalformedEncoding` for an empty buffer, a truncated high-form
    ///   number or a number that overflows `u32`
    /// - `NonCanonicalEncoding` under canonical rules for a high-form number
    ///   below 31 or a leading 0x80 continuation octet
    pub fn decode(data: &[u8], rules: EncodingRules) -> Asn1Result<(Self, bool, usize)> {
        let Some(&first_byte) = data.first() else {
            return Err(Asn1Error::MalformedEncoding(
                "Empty buffer for tag decoding".to_string(),
            ));
        };

        let class = TagClass::from_bits(first_byte);
        let constructed = (first_byte & 0x20) != 0;
        let tag_bits = first_byte & 0x1F;

        if tag_bits < 31 {
            return Ok((Self::new(class, tag_bits as u32), constructed, 1));
        }

        if data.get(1) == Some(&0x80) && rules.is_canonical() {
            return Err(Asn1Error::NonCanonicalEncoding(
                "Tag number padded with leading 0x80 octet".to_string(),
            ));
        }

        let mut number = 0u32;
        let mut pos = 1;
        loop {
            let Some(&byte) = data.get(pos) else {
                return Err(Asn1Error::MalformedEncoding(
                    "Incomplete high-form tag number".to_string(),
                ));
            };
            if number > (u32::MAX >> 7) {
                return Err(Asn1Error::MalformedEncoding(
                    "Tag number too large".to_string(),
                ));
            }
            number = (number << 7) | (byte & 0x7F) as u32;
            pos += 1;
            if byte & 0x80 == 0 {
                break;
            }
        }

        if number < 31 && rules.is_canonical() {
            return Err(Asn1Error::NonCanonicalEncoding(format!(
                "Tag number {} must use the single-octet form",
                number
            )));
        }

        Ok((Self::new(class, number), constructed, pos))
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.class {
            TagClass::Universal => write!(f, "[UNIVERSAL {}]", self.number),
            TagClass::Application => write!(f, "[APPLICATION {}]", self.number),
            TagClass::ContextSpecific => write!(f, "[{}]", self.number),
            TagClass::Private => write!(f, "[PRIVATE {}]", self.number),
        }
    }
}

/// BER Length
///
/// - **Definite**: byte count, short form (0-127, one octet) or long form
///   (`0x80 | n` followed by `n` big-endian octets)
/// - **Indefinite**: `0x80`, constructed encodings only, terminated by an
///   end-of-contents marker `00 00`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Length {
    Definite(usize),
    Indefinite,
}

impl Length {
    /// Get the definite length value, if any
    pub fn definite(&self) -> Option<usize> {
        match self {
            Length::Definite(length) => Some(*length),
            Length::Indefinite => None,
        }
    }

    /// Encode length octets
    ///
    /// Definite lengths always use the minimal form: short form below 128,
    /// otherwise the fewest long-form octets with no leading zero.
    pub fn encode(&self) -> Vec<u8> {
        match *self {
            Length::Indefinite => vec![0x80],
            Length::Definite(length) if length < 128 => vec![length as u8],
            Length::Definite(length) => {
                let bytes = length.to_be_bytes();
                let skip = bytes.iter().take_while(|&&b| b == 0).count();
                let significant = &bytes[skip..];

                let mut result = Vec::with_capacity(1 + significant.len());
                result.push(0x80 | significant.len() as u8);
                result.extend_from_slice(significant);
                result
            }
        }
    }

    /// Decode length octets
    ///
    /// # Returns
    /// Returns `Ok((length, bytes_consumed))`
    ///
    /// # Error Handling
    /// - `MalformedEncoding` for an empty buffer, the reserved 0xFF octet or
    ///   truncated long-form octets
    /// - `LimitExceeded` if the value does not fit in `usize`
    /// - `NonCanonicalEncoding` for indefinite length under DER, and for
    ///   non-minimal long forms under canonical rules
    pub fn decode(data: &[u8], rules: EncodingRules) -> Asn1Result<(Self, usize)> {
        let Some(&first_byte) = data.first() else {
            return Err(Asn1Error::MalformedEncoding(
                "Empty buffer for length decoding".to_string(),
            ));
        };

        if (first_byte & 0x80) == 0 {
            return Ok((Length::Definite(first_byte as usize), 1));
        }

        if first_byte == 0x80 {
            if !rules.allows_indefinite() {
                return Err(Asn1Error::NonCanonicalEncoding(format!(
                    "Indefinite length not allowed under {}",
                    rules
                )));
            }
            return Ok((Length::Indefinite, 1));
        }

        if first_byte == 0xFF {
            return Err(Asn1Error::MalformedEncoding(
                "Reserved length octet 0xFF".to_string(),
            ));
        }

        let num_bytes = (first_byte & 0x7F) as usize;
        if data.len() < 1 + num_bytes {
            return Err(Asn1Error::MalformedEncoding(format!(
                "Buffer too short for long form length: need {} bytes, got {}",
                1 + num_bytes,
                data.len()
            )));
        }

        let octets = &data[1..1 + num_bytes];
        if rules.is_canonical() && octets[0] == 0 {
            return Err(Asn1Error::NonCanonicalEncoding(
                "Long form length has a leading zero octet".to_string(),
            ));
        }

        let mut length = 0usize;
        for &octet in octets {
            if length > (usize::MAX >> 8) {
                return Err(Asn1Error::LimitExceeded(
                    "Length does not fit in usize".to_string(),
                ));
            }
            length = (length << 8) | octet as usize;
        }

        if rules.is_canonical() && length < 128 {
            return Err(Asn1Error::NonCanonicalEncoding(format!(
                "Length {} must use the short form",
                length
            )));
        }

        Ok((Length::Definite(length), 1 + num_bytes))
    }
}

impl fmt::Display for Length {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Length::Definite(length) => write!(f, "{}", length),
            Length::Indefinite => write!(f, "indefinite"),
        }
    }
}

/// Decoded identifier and length octets of one TLV
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    pub tag: Tag,
    pub constructed: bool,
    pub length: Length,
    /// Number of identifier plus length octets
    pub header_len: usize,
}

impl Header {
    /// Check whether this header is the end-of-contents marker `00 00`
    pub fn is_end_of_contents(&self) -> bool {
        self.tag == Tag::END_OF_CONTENTS
            && !self.constructed
            && self.length == Length::Definite(0)
    }
}

/// Read the tag and length at the start of `buffer`
///
/// # Error Handling
/// - `MalformedEncoding` if fewer than 2 bytes remain, the tag or length is
///   truncated, or a primitive encoding claims indefinite length
/// - `NonCanonicalEncoding` for forms the rules forbid (see [`Tag::decode`]
///   and [`Length::decode`])
pub fn read_tag_and_length(buffer: &[u8], rules: EncodingRules) -> Asn1Result<Header> {
    if buffer.len() < 2 {
        return Err(Asn1Error::MalformedEncoding(format!(
            "Need at least 2 bytes for a TLV header, got {}",
            buffer.len()
        )));
    }

    let (tag, constructed, tag_len) = Tag::decode(buffer, rules)?;
    let (length, length_len) = Length::decode(&buffer[tag_len..], rules)?;

    if length == Length::Indefinite && !constructed {
        return Err(Asn1Error::MalformedEncoding(format!(
            "Primitive encoding of {} with indefinite length",
            tag
        )));
    }

    Ok(Header {
        tag,
        constructed,
        length,
        header_len: tag_len + length_len,
    })
}
