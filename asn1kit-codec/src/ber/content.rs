//! Contents-octet codec for primitive ASN.1 types
//!
//! Each function maps the contents octets of one TLV (header already
//! stripped) to a value, or a value to contents octets. Canonical-form
//! checks depend on the [`EncodingRules`] passed in.
//!
//! | Type              | Contents                                             |
//! |-------------------|------------------------------------------------------|
//! | BOOLEAN           | one octet, 0x00 false, 0xFF true (DER/CER)           |
//! | INTEGER           | minimal big-endian two's complement                  |
//! | NULL              | empty                                                |
//! | BIT STRING        | unused-bit count octet (0-7), then the bits          |
//! | OBJECT IDENTIFIER | base-128 arcs, first two combined as `40 * X + Y`    |

use crate::ber::decoder::BerDecoder;
use crate::ber::types::Tag;
use asn1kit_core::{
    Asn1Error, Asn1Result, BitString, CodecConfig, EncodingRules, Integer, ObjectIdentifier,
};

/// Segment size CER uses for constructed string encodings
pub const CER_SEGMENT_SIZE: usize = 1000;

/// Decode BOOLEAN contents
pub fn decode_boolean(content: &[u8], rules: EncodingRules) -> Asn1Result<bool> {
    let [octet] = content else {
        return Err(Asn1Error::MalformedEncoding(format!(
            "BOOLEAN needs exactly 1 content octet, got {}",
            content.len()
        )));
    };
    match *octet {
        0x00 => Ok(false),
        0xFF => Ok(true),
        other if rules.is_canonical() => Err(Asn1Error::NonCanonicalEncoding(format!(
            "BOOLEAN true must be 0xFF under {}, got 0x{:02X}",
            rules, other
        ))),
        _ => Ok(true),
    }
}

/// Encode BOOLEAN contents
pub fn encode_boolean(value: bool) -> [u8; 1] {
    if value { [0xFF] } else { [0x00] }
}

/// Decode INTEGER (or ENUMERATED) contents
///
/// Under BER a redundant leading octet is tolerated and dropped, so the value
/// re-encodes in minimal form.
pub fn decode_integer(content: &[u8], rules: EncodingRules) -> Asn1Result<Integer> {
    if content.is_empty() {
        return Err(Asn1Error::MalformedEncoding(
            "Empty integer encoding".to_string(),
        ));
    }
    if rules.is_canonical() && !Integer::is_minimal(content) {
        return Err(Asn1Error::NonCanonicalEncoding(
            "INTEGER has a redundant leading octet".to_string(),
        ));
    }
    Integer::from_signed_bytes(content)
}

/// Decode NULL contents
pub fn decode_null(content: &[u8]) -> Asn1Result<()> {
    if !content.is_empty() {
        return Err(Asn1Error::MalformedEncoding(format!(
            "NULL must be empty, got {} content octets",
            content.len()
        )));
    }
    Ok(())
}

/// Decode primitive BIT STRING contents
pub fn decode_bit_string(content: &[u8], rules: EncodingRules) -> Asn1Result<BitString> {
    let Some((&unused_bits, bits)) = content.split_first() else {
        return Err(Asn1Error::MalformedEncoding(
            "BIT STRING is missing its unused-bits octet".to_string(),
        ));
    };
    let bit_string = BitString::from_raw(bits.to_vec(), unused_bits)
        .map_err(|e| Asn1Error::MalformedEncoding(e.to_string()))?;
    if rules.is_canonical() && !bit_string.has_clean_padding() {
        return Err(Asn1Error::NonCanonicalEncoding(
            "BIT STRING unused bits must be zero".to_string(),
        ));
    }
    Ok(bit_string)
}

/// Encode BIT STRING contents, clearing the unused trailing bits
pub fn encode_bit_string(value: &BitString) -> Vec<u8> {
    let mut content = Vec::with_capacity(value.as_bytes().len() + 1);
    content.push(value.unused_bits());
    content.extend_from_slice(value.as_bytes());
    if let Some(last) = content.last_mut().filter(|_| value.unused_bits() > 0) {
        *last &= 0xFFu8 << value.unused_bits();
    }
    content
}

/// Decode OBJECT IDENTIFIER contents
///
/// # Error Handling
/// Returns `InvalidOid` for empty contents, a sub-identifier padded with a
/// leading 0x80 octet, a truncated final sub-identifier or an arc that
/// overflows `u64`.
pub fn decode_object_identifier(content: &[u8]) -> Asn1Result<ObjectIdentifier> {
    if content.is_empty() {
        return Err(Asn1Error::InvalidOid(
            "Empty object identifier encoding".to_string(),
        ));
    }

    let mut subidentifiers = Vec::new();
    let mut pos = 0;
    while pos < content.len() {
        if content[pos] == 0x80 {
            return Err(Asn1Error::InvalidOid(
                "Sub-identifier has a leading 0x80 octet".to_string(),
            ));
        }
        let mut value = 0u64;
        loop {
            let Some(&byte) = content.get(pos) else {
                return Err(Asn1Error::InvalidOid(
                    "Truncated sub-identifier".to_string(),
                ));
            };
            if value > (u64::MAX >> 7) {
                return Err(Asn1Error::InvalidOid("OID arc overflow".to_string()));
            }
            value = (value << 7) | (byte & 0x7F) as u64;
            pos += 1;
            if byte & 0x80 == 0 {
                break;
            }
        }
        subidentifiers.push(value);
    }

    let first = subidentifiers[0];
    let (x, y) = match first {
        0..40 => (0, first),
        40..80 => (1, first - 40),
        _ => (2, first - 80),
    };

    let mut arcs = Vec::with_capacity(subidentifiers.len() + 1);
    arcs.push(x);
    arcs.push(y);
    arcs.extend_from_slice(&subidentifiers[1..]);
    ObjectIdentifier::new(arcs)
}

/// Encode OBJECT IDENTIFIER contents
pub fn encode_object_identifier(oid: &ObjectIdentifier) -> Vec<u8> {
    let arcs = oid.arcs();
    let mut bytes = Vec::with_capacity(arcs.len() * 2);

    push_base128(&mut bytes, arcs[0] * 40 + arcs[1]);
    for &arc in &arcs[2..] {
        push_base128(&mut bytes, arc);
    }
    bytes
}

fn push_base128(out: &mut Vec<u8>, mut value: u64) {
    let mut groups = [0u8; 10];
    let mut count = 0;
    loop {
        groups[count] = (value & 0x7F) as u8;
        count += 1;
        value >>= 7;
        if value == 0 {
            break;
        }
    }
    for i in (0..count).rev() {
        let continuation = if i > 0 { 0x80 } else { 0x00 };
        out.push(groups[i] | continuation);
    }
}

/// Check the length of a primitive string encoding
///
/// CER carries strings whose contents exceed [`CER_SEGMENT_SIZE`] octets in
/// the constructed form only. For BIT STRING the count includes the
/// unused-bits octet.
pub fn check_primitive_string_size(content: &[u8], rules: EncodingRules) -> Asn1Result<()> {
    if rules == EncodingRules::Cer && content.len() > CER_SEGMENT_SIZE {
        return Err(Asn1Error::NonCanonicalEncoding(format!(
            "CER string of {} octets must be segmented, limit is {}",
            content.len(),
            CER_SEGMENT_SIZE
        )));
    }
    Ok(())
}

/// Collect the primitive segments of a constructed string encoding
///
/// `content` is the contents of the constructed TLV. Every segment must
/// carry `segment_tag`; nested constructed segments are followed under BER
/// only. Under CER every segment except the last must hold exactly
/// [`CER_SEGMENT_SIZE`] octets and the whole string must be longer than
/// one segment.
pub fn collect_segments<'a>(
    content: &'a [u8],
    segment_tag: Tag,
    config: &CodecConfig,
    depth: usize,
) -> Asn1Result<Vec<&'a [u8]>> {
    if !config.rules.allows_constructed_strings() {
        return Err(Asn1Error::NonCanonicalEncoding(format!(
            "Constructed string encoding not allowed under {}",
            config.rules
        )));
    }

    let mut segments = Vec::new();
    gather(content, segment_tag, config, depth, &mut segments)?;

    if config.rules == EncodingRules::Cer {
        let total: usize = segments.iter().map(|s| s.len()).sum();
        let (last, init) = segments
            .split_last()
            .ok_or_else(|| Asn1Error::NonCanonicalEncoding("Empty constructed string".to_string()))?;
        if total <= CER_SEGMENT_SIZE
            || init.iter().any(|s| s.len() != CER_SEGMENT_SIZE)
            || last.is_empty()
            || last.len() > CER_SEGMENT_SIZE
        {
            return Err(Asn1Error::NonCanonicalEncoding(format!(
                "CER strings are segmented into {}-octet fragments only when longer than one",
                CER_SEGMENT_SIZE
            )));
        }
    }

    Ok(segments)
}

fn gather<'a>(
    content: &'a [u8],
    segment_tag: Tag,
    config: &CodecConfig,
    depth: usize,
    segments: &mut Vec<&'a [u8]>,
) -> Asn1Result<()> {
    if depth > config.max_depth {
        return Err(Asn1Error::LimitExceeded(format!(
            "String segments nested deeper than {}",
            config.max_depth
        )));
    }

    let mut decoder = BerDecoder::new(content, config);
    while decoder.has_remaining() {
        let tlv = decoder.read_tlv()?;
        if tlv.header.tag != segment_tag {
            return Err(Asn1Error::MalformedEncoding(format!(
                "String segment tagged {}, expected {}",
                tlv.header.tag, segment_tag
            )));
        }
        if tlv.header.constructed {
            if config.rules != EncodingRules::Ber {
                return Err(Asn1Error::NonCanonicalEncoding(
                    "Nested constructed string segment".to_string(),
                ));
            }
            gather(tlv.content, segment_tag, config, depth + 1, segments)?;
        } else {
            segments.push(tlv.content);
        }
    }
    Ok(())
}

/// Join BIT STRING segments (each with its own unused-bits octet)
///
/// Only the final segment may have unused bits.
pub fn join_bit_string_segments(segments: &[&[u8]], rules: EncodingRules) -> Asn1Result<BitString> {
    let mut bytes = Vec::new();
    let mut unused_bits = 0u8;
    for (i, segment) in segments.iter().enumerate() {
        let Some((&unused, bits)) = segment.split_first() else {
            return Err(Asn1Error::MalformedEncoding(
                "BIT STRING segment is missing its unused-bits octet".to_string(),
            ));
        };
        if unused != 0 && i + 1 != segments.len() {
            return Err(Asn1Error::MalformedEncoding(
                "Only the final BIT STRING segment may have unused bits".to_string(),
            ));
        }
        bytes.extend_from_slice(bits);
        unused_bits = unused;
    }
    let bit_string = BitString::from_raw(bytes, unused_bits)
        .map_err(|e| Asn1Error::MalformedEncoding(e.to_string()))?;
    if rules.is_canonical() && !bit_string.has_clean_padding() {
        return Err(Asn1Error::NonCanonicalEncoding(
            "BIT STRING unused bits must be zero".to_string(),
        ));
    }
    Ok(bit_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_boolean() {
        assert!(decode_boolean(&[0xFF], EncodingRules::Der).unwrap());
        assert!(!decode_boolean(&[0x00], EncodingRules::Der).unwrap());
        assert!(matches!(
            decode_boolean(&[0x01], EncodingRules::Der),
            Err(Asn1Error::NonCanonicalEncoding(_))
        ));
        assert!(decode_boolean(&[0x01], EncodingRules::Ber).unwrap());
        assert!(matches!(
            decode_boolean(&[0xFF, 0xFF], EncodingRules::Ber),
            Err(Asn1Error::MalformedEncoding(_))
        ));
        assert_eq!(encode_boolean(true), [0xFF]);
    }

    #[test]
    fn test_integer_redundant_octet() {
        assert!(matches!(
            decode_integer(&[0x00, 0x05], EncodingRules::Der),
            Err(Asn1Error::NonCanonicalEncoding(_))
        ));
        let value = decode_integer(&[0x00, 0x05], EncodingRules::Ber).unwrap();
        assert_eq!(value.as_bytes(), &[0x05]);
        assert_eq!(decode_integer(&[0x00, 0x80], EncodingRules::Der).unwrap().to_i64(), Some(128));
        assert!(matches!(
            decode_integer(&[], EncodingRules::Ber),
            Err(Asn1Error::MalformedEncoding(_))
        ));
    }

    #[test]
    fn test_null() {
        assert!(decode_null(&[]).is_ok());
        assert!(decode_null(&[0x00]).is_err());
    }

    #[test]
    fn test_bit_string() {
        let bits = decode_bit_string(&[0x01, 0x86], EncodingRules::Der).unwrap();
        assert_eq!(bits.num_bits(), 7);
        assert_eq!(encode_bit_string(&bits), vec![0x01, 0x86]);

        assert!(matches!(
            decode_bit_string(&[0x01, 0x87], EncodingRules::Der),
            Err(Asn1Error::NonCanonicalEncoding(_))
        ));
        let dirty = decode_bit_string(&[0x01, 0x87], EncodingRules::Ber).unwrap();
        assert_eq!(encode_bit_string(&dirty), vec![0x01, 0x86]);

        assert!(matches!(
            decode_bit_string(&[0x08, 0x00], EncodingRules::Ber),
            Err(Asn1Error::MalformedEncoding(_))
        ));
        assert!(matches!(
            decode_bit_string(&[], EncodingRules::Ber),
            Err(Asn1Error::MalformedEncoding(_))
        ));
    }

    #[test]
    fn test_object_identifier() {
        // sha256WithRSAEncryption
        let content = [0x2A, 0x86, 0x48, 0x86, 0xF7, 0x0D, 0x01, 0x01, 0x0B];
        let oid = decode_object_identifier(&content).unwrap();
        assert_eq!(oid.to_string(), "1.2.840.113549.1.1.11");
        assert_eq!(encode_object_identifier(&oid), content.to_vec());
    }

    #[test]
    fn test_object_identifier_joint_iso_itu() {
        // 2.999.3
        let content = [0x88, 0x37, 0x03];
        let oid = decode_object_identifier(&content).unwrap();
        assert_eq!(oid.arcs(), &[2, 999, 3]);
        assert_eq!(encode_object_identifier(&oid), content.to_vec());
    }

    #[test]
    fn test_object_identifier_invalid() {
        for content in [&[][..], &[0x2A, 0x80, 0x01][..], &[0x2A, 0x86][..]] {
            assert!(matches!(
                decode_object_identifier(content),
                Err(Asn1Error::InvalidOid(_))
            ));
        }
    }

    #[test]
    fn test_collect_segments_ber() {
        // OCTET STRING segments "ab" and "c", second one nested
        let content = [0x04, 0x02, b'a', b'b', 0x24, 0x03, 0x04, 0x01, b'c'];
        let config = CodecConfig::ber();
        let segments = collect_segments(&content, Tag::OCTET_STRING, &config, 1).unwrap();
        assert_eq!(segments.concat(), b"abc".to_vec());
    }

    #[test]
    fn test_collect_segments_der_rejected() {
        let content = [0x04, 0x01, b'a'];
        assert!(matches!(
            collect_segments(&content, Tag::OCTET_STRING, &CodecConfig::der(), 1),
            Err(Asn1Error::NonCanonicalEncoding(_))
        ));
    }

    #[test]
    fn test_collect_segments_cer_short_string_rejected() {
        let content = [0x04, 0x01, b'a'];
        assert!(matches!(
            collect_segments(&content, Tag::OCTET_STRING, &CodecConfig::cer(), 1),
            Err(Asn1Error::NonCanonicalEncoding(_))
        ));
    }

    #[test]
    fn test_primitive_string_size() {
        let long = vec![0x41; CER_SEGMENT_SIZE + 1];
        assert!(matches!(
            check_primitive_string_size(&long, EncodingRules::Cer),
            Err(Asn1Error::NonCanonicalEncoding(_))
        ));
        assert!(check_primitive_string_size(&long[..CER_SEGMENT_SIZE], EncodingRules::Cer).is_ok());
        assert!(check_primitive_string_size(&long, EncodingRules::Der).is_ok());
        assert!(check_primitive_string_size(&long, EncodingRules::Ber).is_ok());
    }

    #[test]
    fn test_join_bit_string_segments() {
        let segments: [&[u8]; 2] = [&[0x00, 0xFF], &[0x04, 0xF0]];
        let bits = join_bit_string_segments(&segments, EncodingRules::Ber).unwrap();
        assert_eq!(bits.as_bytes(), &[0xFF, 0xF0]);
        assert_eq!(bits.num_bits(), 12);

        let segments: [&[u8]; 2] = [&[0x04, 0xF0], &[0x00, 0xFF]];
        assert!(join_bit_string_segments(&segments, EncodingRules::Ber).is_err());
    }
}
