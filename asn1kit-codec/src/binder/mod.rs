//! Schema binder: decode bytes into [`Value`]s and encode them back
//!
//! The binder walks a [`Schema`] type and the TLV stream together. The
//! [`CodecConfig`] passed to every call selects the encoding rules and the
//! resource limits; nothing is kept between calls, so one schema can serve
//! any number of threads.
//!
//! # Usage Example
//!
//! ```rust
//! use asn1kit_codec::binder::{decode, encode};
//! use asn1kit_codec::schema::{SchemaBuilder, TypeNode};
//! use asn1kit_codec::value::Value;
//! use asn1kit_core::CodecConfig;
//!
//! let mut builder = SchemaBuilder::new();
//! let int = builder.add(TypeNode::integer());
//! let list = builder.add(TypeNode::sequence_of(int));
//! let schema = builder.finish().unwrap();
//!
//! let config = CodecConfig::der();
//! let data = [0x30, 0x06, 0x02, 0x01, 0x01, 0x02, 0x01, 0x02, 0x00, 0x00];
//! let (value, rest) = decode(&data, &schema, list, &config).unwrap();
//! assert_eq!(value, Value::SequenceOf(vec![Value::integer(1), Value::integer(2)]));
//! assert_eq!(rest, &[0x00, 0x00]);
//! assert_eq!(encode(&value, &schema, list, &config).unwrap(), &data[..8]);
//! ```

mod decode;
mod encode;

use crate::ber::decoder::BerDecoder;
use crate::schema::{Schema, TypeId};
use crate::value::Value;
use asn1kit_core::{Asn1Error, Asn1Result, CodecConfig};
use decode::SchemaDecoder;
use encode::SchemaEncoder;

/// Decode one value of type `ty` from the start of `buffer`
///
/// Returns the value and the unconsumed suffix of `buffer`.
///
/// # Error Handling
/// Any [`Asn1Error`]; the buffer is never partially consumed on error.
pub fn decode<'a>(
    buffer: &'a [u8],
    schema: &Schema,
    ty: TypeId,
    config: &CodecConfig,
) -> Asn1Result<(Value, &'a [u8])> {
    let node = schema.resolve(ty)?;
    log::debug!(
        "Decoding {} from {} bytes under {}",
        node.display_name(),
        buffer.len(),
        config.rules
    );
    let mut reader = BerDecoder::new(buffer, config);
    let value = SchemaDecoder::new(schema, config)
        .decode_value(ty, &mut reader, 1)
        .inspect_err(|e| log::debug!("Decode failed: {}", e))?;
    let rest = reader.rest();
    log::debug!("Decoded {} bytes, {} remaining", reader.position(), rest.len());
    Ok((value, rest))
}

/// Decode one value that must span the whole buffer
pub fn decode_exact(buffer: &[u8], schema: &Schema, ty: TypeId, config: &CodecConfig) -> Asn1Result<Value> {
    let (value, rest) = decode(buffer, schema, ty, config)?;
    if !rest.is_empty() {
        return Err(Asn1Error::SchemaMismatch(format!(
            "{} bytes remain after the value",
            rest.len()
        )));
    }
    Ok(value)
}

/// Encode `value` as type `ty`
///
/// # Error Handling
/// - `SchemaMismatch` if the value does not have the shape of the type
/// - `InvalidValue` if an ANY value is not a single TLV or a time string is
///   not in canonical form under DER/CER
/// - `LimitExceeded` if the value nests deeper than `max_depth`
pub fn encode(value: &Value, schema: &Schema, ty: TypeId, config: &CodecConfig) -> Asn1Result<Vec<u8>> {
    let node = schema.resolve(ty)?;
    log::debug!(
        "Encoding {} under {}",
        node.display_name(),
        config.rules
    );
    let bytes = SchemaEncoder::new(schema, config)
        .encode_value(ty, value, 1)
        .inspect_err(|e| log::debug!("Encode failed: {}", e))?;
    log::debug!("Encoded {} bytes", bytes.len());
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ber::types::Tag;
    use crate::schema::{Alternative, Field, SchemaBuilder, StringKind, TypeNode};
    use asn1kit_core::{BitString, EncodingRules, ErrorKind, ObjectIdentifier};

    fn integer_list() -> (Schema, TypeId) {
        let mut builder = SchemaBuilder::new();
        let int = builder.add(TypeNode::integer());
        let list = builder.add(TypeNode::sequence_of(int).named("IntegerList"));
        (builder.finish().unwrap(), list)
    }

    fn x_or_y() -> (Schema, TypeId) {
        let mut builder = SchemaBuilder::new();
        let int = builder.add(TypeNode::integer());
        let text = builder.add(TypeNode::octet_string());
        let choice = builder.add(TypeNode::choice(vec![
            Alternative::new("x", int),
            Alternative::new("y", text),
        ]));
        (builder.finish().unwrap(), choice)
    }

    /// Record ::= SEQUENCE {
    ///     id        INTEGER,
    ///     extra     ANY,
    ///     critical  BOOLEAN DEFAULT FALSE,
    ///     label     [0] IMPLICIT UTF8String OPTIONAL,
    ///     algorithm [1] EXPLICIT OBJECT IDENTIFIER OPTIONAL,
    ///     flags     BIT STRING OPTIONAL }
    fn record() -> (Schema, TypeId) {
        let mut builder = SchemaBuilder::new();
        let int = builder.add(TypeNode::integer());
        let flag = builder.add(TypeNode::boolean());
        let label = builder.add(TypeNode::string(StringKind::Utf8).implicit(Tag::context_specific(0)));
        let algorithm = builder.add(TypeNode::object_identifier().explicit(Tag::context_specific(1)));
        let bits = builder.add(TypeNode::bit_string());
        let any = builder.add(TypeNode::any());
        let record = builder.add(
            TypeNode::sequence(vec![
                Field::required("id", int),
                Field::required("extra", any),
                Field::with_default("critical", flag, Value::Boolean(false)),
                Field::optional("label", label),
                Field::optional("algorithm", algorithm),
                Field::optional("flags", bits),
            ])
            .named("Record"),
        );
        (builder.finish().unwrap(), record)
    }

    #[test]
    fn test_sequence_of_stops_at_region_end() {
        let (schema, list) = integer_list();
        let data = [0x30, 0x06, 0x02, 0x01, 0x01, 0x02, 0x01, 0x02, 0x00, 0x00];
        let (value, rest) = decode(&data, &schema, list, &CodecConfig::der()).unwrap();
        assert_eq!(value.elements().unwrap().len(), 2);
        assert_eq!(rest, &[0x00, 0x00]);

        assert_eq!(
            decode_exact(&data, &schema, list, &CodecConfig::der()).unwrap_err().kind(),
            ErrorKind::SchemaMismatch
        );
        assert!(decode_exact(&data[..8], &schema, list, &CodecConfig::der()).is_ok());
    }

    #[test]
    fn test_choice_selection() {
        let (schema, choice) = x_or_y();
        let config = CodecConfig::der();

        let (value, _) = decode(&[0x02, 0x01, 0x05], &schema, choice, &config).unwrap();
        assert_eq!(value, Value::choice("x", Value::integer(5)));

        let (value, _) = decode(&[0x04, 0x01, 0x41], &schema, choice, &config).unwrap();
        assert_eq!(value, Value::choice("y", Value::OctetString(b"A".to_vec())));
        assert_eq!(encode(&value, &schema, choice, &config).unwrap(), vec![0x04, 0x01, 0x41]);

        let result = decode(&[0x01, 0x01, 0xFF], &schema, choice, &config);
        assert!(matches!(result, Err(Asn1Error::NoMatchingAlternative(_))));

        let unknown = Value::choice("z", Value::Null);
        assert!(matches!(
            encode(&unknown, &schema, choice, &config),
            Err(Asn1Error::SchemaMismatch(_))
        ));
    }

    #[test]
    fn test_record_round_trip() {
        let (schema, record) = record();
        let config = CodecConfig::der();
        let value = Value::sequence([
            ("id", Value::integer(-129)),
            ("extra", Value::Any(vec![0x05, 0x00])),
            ("critical", Value::Boolean(false)),
            ("label", Value::String(b"hi".to_vec())),
            ("algorithm", Value::ObjectIdentifier("1.2.840.113549".parse::<ObjectIdentifier>().unwrap())),
            ("flags", Value::BitString(BitString::new(vec![0xA0], 3).unwrap())),
        ]);

        let bytes = encode(&value, &schema, record, &config).unwrap();
        assert_eq!(
            bytes,
            vec![
                0x30, 0x18, // Record
                0x02, 0x02, 0xFF, 0x7F, // id -129
                0x05, 0x00, // extra
                0x80, 0x02, b'h', b'i', // label, critical omitted
                0xA1, 0x08, 0x06, 0x06, 0x2A, 0x86, 0x48, 0x86, 0xF7, 0x0D, // algorithm
                0x03, 0x02, 0x05, 0xA0, // flags
            ]
        );

        let back = decode_exact(&bytes, &schema, record, &config).unwrap();
        assert_eq!(back, value);
        assert_eq!(encode(&back, &schema, record, &config).unwrap(), bytes);
    }

    #[test]
    fn test_default_substituted_and_checked() {
        let (schema, record) = record();

        let minimal = [0x30, 0x05, 0x02, 0x01, 0x07, 0x05, 0x00];
        let value = decode_exact(&minimal, &schema, record, &CodecConfig::der()).unwrap();
        assert_eq!(value.get("critical"), Some(&Value::Boolean(false)));
        assert!(value.get("label").is_none());

        let explicit_default = [0x30, 0x08, 0x02, 0x01, 0x07, 0x05, 0x00, 0x01, 0x01, 0x00];
        assert!(matches!(
            decode(&explicit_default, &schema, record, &CodecConfig::der()),
            Err(Asn1Error::NonCanonicalEncoding(_))
        ));
        let value = decode_exact(&explicit_default, &schema, record, &CodecConfig::ber()).unwrap();
        assert_eq!(encode(&value, &schema, record, &CodecConfig::ber()).unwrap(), minimal.to_vec());
    }

    #[test]
    fn test_round_trip_fills_omitted_default() {
        let (schema, record) = record();
        let config = CodecConfig::der();

        let sparse = Value::sequence([
            ("id", Value::integer(7)),
            ("extra", Value::Any(vec![0x05, 0x00])),
        ]);
        let normalized = Value::sequence([
            ("id", Value::integer(7)),
            ("extra", Value::Any(vec![0x05, 0x00])),
            ("critical", Value::Boolean(false)),
        ]);

        let bytes = encode(&sparse, &schema, record, &config).unwrap();
        assert_eq!(bytes, vec![0x30, 0x05, 0x02, 0x01, 0x07, 0x05, 0x00]);
        assert_eq!(encode(&normalized, &schema, record, &config).unwrap(), bytes);

        // Decoding yields the value with its default filled in
        let back = decode_exact(&bytes, &schema, record, &config).unwrap();
        assert_ne!(back, sparse);
        assert_eq!(back, normalized);
        let reencoded = encode(&back, &schema, record, &config).unwrap();
        assert_eq!(reencoded, bytes);
        assert_eq!(decode_exact(&reencoded, &schema, record, &config).unwrap(), normalized);
    }

    #[test]
    fn test_der_rejects_indefinite_and_ber_diverges() {
        let (schema, list) = integer_list();
        let indefinite = [0x30, 0x80, 0x02, 0x01, 0x01, 0x00, 0x00];

        assert!(matches!(
            decode(&indefinite, &schema, list, &CodecConfig::der()),
            Err(Asn1Error::NonCanonicalEncoding(_))
        ));

        let value = decode_exact(&indefinite, &schema, list, &CodecConfig::ber()).unwrap();
        assert_eq!(value, Value::SequenceOf(vec![Value::integer(1)]));
        let reencoded = encode(&value, &schema, list, &CodecConfig::der()).unwrap();
        assert_eq!(reencoded, vec![0x30, 0x03, 0x02, 0x01, 0x01]);
        assert_ne!(reencoded, indefinite.to_vec());
    }

    #[test]
    fn test_redundant_integer_octet() {
        let (schema, list) = integer_list();
        let data = [0x30, 0x04, 0x02, 0x02, 0x00, 0x05];

        assert!(matches!(
            decode(&data, &schema, list, &CodecConfig::der()),
            Err(Asn1Error::NonCanonicalEncoding(_))
        ));
        let value = decode_exact(&data, &schema, list, &CodecConfig::ber()).unwrap();
        assert_eq!(
            encode(&value, &schema, list, &CodecConfig::ber()).unwrap(),
            vec![0x30, 0x03, 0x02, 0x01, 0x05]
        );
    }

    #[test]
    fn test_nested_overrun_is_truncated() {
        let (schema, list) = integer_list();
        // INTEGER claims 5 bytes inside a 3-byte SEQUENCE body
        let data = [0x30, 0x03, 0x02, 0x05, 0x01, 0x02, 0x03, 0x04, 0x05];
        assert!(matches!(
            decode(&data, &schema, list, &CodecConfig::der()),
            Err(Asn1Error::TruncatedContent(_))
        ));
    }

    #[test]
    fn test_sequence_trailing_bytes() {
        let (schema, record) = record();
        // id and extra, then an INTEGER no component accepts
        let data = [0x30, 0x08, 0x02, 0x01, 0x07, 0x05, 0x00, 0x02, 0x01, 0x08];
        assert!(matches!(
            decode(&data, &schema, record, &CodecConfig::der()),
            Err(Asn1Error::SchemaMismatch(_))
        ));
    }

    #[test]
    fn test_missing_required_member() {
        let (schema, record) = record();
        assert!(matches!(
            decode(&[0x30, 0x00], &schema, record, &CodecConfig::der()),
            Err(Asn1Error::SchemaMismatch(_))
        ));
        let value = Value::sequence([("critical", Value::Boolean(true))]);
        assert!(matches!(
            encode(&value, &schema, record, &CodecConfig::der()),
            Err(Asn1Error::SchemaMismatch(_))
        ));
    }

    #[test]
    fn test_set_member_order() {
        let mut builder = SchemaBuilder::new();
        let a = builder.add(TypeNode::integer().implicit(Tag::context_specific(1)));
        let b = builder.add(TypeNode::boolean().implicit(Tag::context_specific(0)));
        let set = builder.add(TypeNode::set(vec![Field::required("a", a), Field::required("b", b)]));
        let schema = builder.finish().unwrap();

        let value = Value::set([("a", Value::integer(5)), ("b", Value::Boolean(true))]);
        let canonical = vec![0x31, 0x06, 0x80, 0x01, 0xFF, 0x81, 0x01, 0x05];
        assert_eq!(encode(&value, &schema, set, &CodecConfig::der()).unwrap(), canonical);
        assert_eq!(decode_exact(&canonical, &schema, set, &CodecConfig::der()).unwrap(), value);

        let unordered = [0x31, 0x06, 0x81, 0x01, 0x05, 0x80, 0x01, 0xFF];
        assert!(matches!(
            decode(&unordered, &schema, set, &CodecConfig::der()),
            Err(Asn1Error::NonCanonicalEncoding(_))
        ));
        assert_eq!(decode_exact(&unordered, &schema, set, &CodecConfig::ber()).unwrap(), value);

        let duplicate = [0x31, 0x06, 0x80, 0x01, 0xFF, 0x80, 0x01, 0x00];
        assert!(matches!(
            decode(&duplicate, &schema, set, &CodecConfig::ber()),
            Err(Asn1Error::SchemaMismatch(_))
        ));
    }

    #[test]
    fn test_set_of_sorted() {
        let mut builder = SchemaBuilder::new();
        let int = builder.add(TypeNode::integer());
        let set_of = builder.add(TypeNode::set_of(int));
        let schema = builder.finish().unwrap();

        let value = Value::SetOf(vec![Value::integer(3), Value::integer(1), Value::integer(2)]);
        let bytes = encode(&value, &schema, set_of, &CodecConfig::der()).unwrap();
        assert_eq!(bytes, vec![0x31, 0x09, 0x02, 0x01, 0x01, 0x02, 0x01, 0x02, 0x02, 0x01, 0x03]);

        let unordered = [0x31, 0x06, 0x02, 0x01, 0x02, 0x02, 0x01, 0x01];
        assert!(matches!(
            decode(&unordered, &schema, set_of, &CodecConfig::der()),
            Err(Asn1Error::NonCanonicalEncoding(_))
        ));
        assert!(decode(&unordered, &schema, set_of, &CodecConfig::ber()).is_ok());
    }

    #[test]
    fn test_size_constraint() {
        let mut builder = SchemaBuilder::new();
        let int = builder.add(TypeNode::integer());
        let list = builder.add(TypeNode::sequence_of(int).size(1, Some(2)));
        let schema = builder.finish().unwrap();

        assert!(matches!(
            decode(&[0x30, 0x00], &schema, list, &CodecConfig::der()),
            Err(Asn1Error::SchemaMismatch(_))
        ));
        let three = Value::SequenceOf(vec![Value::integer(1); 3]);
        assert!(matches!(
            encode(&three, &schema, list, &CodecConfig::der()),
            Err(Asn1Error::SchemaMismatch(_))
        ));
    }

    #[test]
    fn test_depth_limit() {
        // Tree ::= SEQUENCE OF Tree
        let mut builder = SchemaBuilder::new();
        let tree = builder.declare("Tree");
        builder.define(tree, TypeNode::sequence_of(tree)).unwrap();
        let schema = builder.finish().unwrap();

        let data = [0x30, 0x04, 0x30, 0x02, 0x30, 0x00];
        assert!(decode_exact(&data, &schema, tree, &CodecConfig::der()).is_ok());

        let shallow = CodecConfig::builder().max_depth(2).build().unwrap();
        assert!(matches!(
            decode(&data, &schema, tree, &shallow),
            Err(Asn1Error::LimitExceeded(_))
        ));
    }

    #[test]
    fn test_length_limit() {
        let (schema, list) = integer_list();
        let config = CodecConfig::builder().max_length(4).build().unwrap();
        let data = [0x30, 0x06, 0x02, 0x01, 0x01, 0x02, 0x01, 0x02];
        assert!(matches!(
            decode(&data, &schema, list, &config),
            Err(Asn1Error::LimitExceeded(_))
        ));
    }

    #[test]
    fn test_constructed_octet_string() {
        let mut builder = SchemaBuilder::new();
        let octets = builder.add(TypeNode::octet_string());
        let schema = builder.finish().unwrap();

        let data = [0x24, 0x80, 0x04, 0x02, b'a', b'b', 0x04, 0x01, b'c', 0x00, 0x00];
        let value = decode_exact(&data, &schema, octets, &CodecConfig::ber()).unwrap();
        assert_eq!(value, Value::OctetString(b"abc".to_vec()));
        assert_eq!(
            decode(&data, &schema, octets, &CodecConfig::der()).unwrap_err().kind(),
            ErrorKind::NonCanonicalEncoding
        );

        let definite = [0x24, 0x03, 0x04, 0x01, b'a'];
        assert!(matches!(
            decode(&definite, &schema, octets, &CodecConfig::der()),
            Err(Asn1Error::NonCanonicalEncoding(_))
        ));
    }

    #[test]
    fn test_primitive_constructed_mismatch() {
        let (schema, list) = integer_list();
        assert!(matches!(
            decode(&[0x30, 0x03, 0x22, 0x01, 0x00], &schema, list, &CodecConfig::ber()),
            Err(Asn1Error::MalformedEncoding(_))
        ));
    }

    #[test]
    fn test_cer_encoding() {
        let mut builder = SchemaBuilder::new();
        let octets = builder.add(TypeNode::octet_string());
        let wrapper = builder.add(TypeNode::sequence(vec![Field::required("data", octets)]));
        let schema = builder.finish().unwrap();
        let config = CodecConfig::cer();

        let value = Value::sequence([("data", Value::OctetString(vec![0x5A; 2500]))]);
        let bytes = encode(&value, &schema, wrapper, &config).unwrap();
        assert_eq!(&bytes[..4], &[0x30, 0x80, 0x24, 0x80]);
        assert_eq!(&bytes[4..8], &[0x04, 0x82, 0x03, 0xE8]);
        assert_eq!(&bytes[bytes.len() - 4..], &[0x00, 0x00, 0x00, 0x00]);
        assert_eq!(bytes.len(), 4 + 3 * 4 + 2500 + 4);

        assert_eq!(decode_exact(&bytes, &schema, wrapper, &config).unwrap(), value);
        assert!(decode(&bytes, &schema, wrapper, &CodecConfig::der()).is_err());

        let short = Value::sequence([("data", Value::OctetString(vec![1, 2]))]);
        assert_eq!(
            encode(&short, &schema, wrapper, &config).unwrap(),
            vec![0x30, 0x80, 0x04, 0x02, 0x01, 0x02, 0x00, 0x00]
        );
    }

    #[test]
    fn test_cer_bit_string_fragments() {
        let mut builder = SchemaBuilder::new();
        let bits = builder.add(TypeNode::bit_string());
        let schema = builder.finish().unwrap();
        let config = CodecConfig::cer();

        let value = Value::BitString(BitString::new(vec![0xFF; 1500], 1500 * 8).unwrap());
        let bytes = encode(&value, &schema, bits, &config).unwrap();
        // 999 data octets plus the unused-bits octet per full segment
        assert_eq!(&bytes[..7], &[0x23, 0x80, 0x03, 0x82, 0x03, 0xE8, 0x00]);
        assert_eq!(decode_exact(&bytes, &schema, bits, &config).unwrap(), value);
    }

    #[test]
    fn test_cer_long_primitive_string_rejected() {
        let mut builder = SchemaBuilder::new();
        let octets = builder.add(TypeNode::octet_string());
        let bits = builder.add(TypeNode::bit_string());
        let schema = builder.finish().unwrap();

        // OCTET STRING of 1001 octets in primitive form
        let mut long = vec![0x04, 0x82, 0x03, 0xE9];
        long.extend_from_slice(&[0x41; 1001]);
        assert!(matches!(
            decode(&long, &schema, octets, &CodecConfig::cer()),
            Err(Asn1Error::NonCanonicalEncoding(_))
        ));
        assert_eq!(
            decode_exact(&long, &schema, octets, &CodecConfig::der()).unwrap(),
            Value::OctetString(vec![0x41; 1001])
        );

        // BIT STRING: unused-bits octet plus 1000 data octets
        let mut long_bits = vec![0x03, 0x82, 0x03, 0xE9, 0x00];
        long_bits.extend_from_slice(&[0xFF; 1000]);
        assert!(matches!(
            decode(&long_bits, &schema, bits, &CodecConfig::cer()),
            Err(Asn1Error::NonCanonicalEncoding(_))
        ));

        // Exactly one full segment stays primitive
        let value = Value::OctetString(vec![0x41; 1000]);
        let bytes = encode(&value, &schema, octets, &CodecConfig::cer()).unwrap();
        assert_eq!(&bytes[..4], &[0x04, 0x82, 0x03, 0xE8]);
        assert_eq!(decode_exact(&bytes, &schema, octets, &CodecConfig::cer()).unwrap(), value);
    }

    #[test]
    fn test_time_forms() {
        let mut builder = SchemaBuilder::new();
        let utc = builder.add(TypeNode::string(StringKind::UtcTime));
        let schema = builder.finish().unwrap();

        let mut data = vec![0x17, 0x0D];
        data.extend_from_slice(b"061110000000Z");
        assert!(decode_exact(&data, &schema, utc, &CodecConfig::der()).is_ok());

        let mut offset = vec![0x17, 0x0F];
        offset.extend_from_slice(b"0611100000+0100");
        assert!(matches!(
            decode(&offset, &schema, utc, &CodecConfig::der()),
            Err(Asn1Error::NonCanonicalEncoding(_))
        ));
        assert!(decode_exact(&offset, &schema, utc, &CodecConfig::ber()).is_ok());

        let value = Value::String(b"0611100000+0100".to_vec());
        assert!(matches!(
            encode(&value, &schema, utc, &CodecConfig::der()),
            Err(Asn1Error::InvalidValue(_))
        ));
    }

    #[test]
    fn test_any_must_be_single_tlv() {
        let (schema, record) = record();
        let value = Value::sequence([
            ("id", Value::integer(1)),
            ("extra", Value::Any(vec![0x05, 0x00, 0x05, 0x00])),
        ]);
        assert!(matches!(
            encode(&value, &schema, record, &CodecConfig::der()),
            Err(Asn1Error::InvalidValue(_))
        ));
    }

    #[test]
    fn test_value_kind_mismatch() {
        let (schema, list) = integer_list();
        let value = Value::SequenceOf(vec![Value::Boolean(true)]);
        assert!(matches!(
            encode(&value, &schema, list, &CodecConfig::der()),
            Err(Asn1Error::SchemaMismatch(_))
        ));
        assert!(matches!(
            encode(&Value::Null, &schema, list, &CodecConfig::with_rules(EncodingRules::Ber)),
            Err(Asn1Error::SchemaMismatch(_))
        ));
    }

    #[test]
    fn test_explicit_tag_trailing_bytes() {
        let mut builder = SchemaBuilder::new();
        let tagged = builder.add(TypeNode::integer().explicit(Tag::context_specific(0)));
        let schema = builder.finish().unwrap();
        let config = CodecConfig::der();

        let data = [0xA0, 0x03, 0x02, 0x01, 0x05];
        assert_eq!(decode_exact(&data, &schema, tagged, &config).unwrap(), Value::integer(5));

        let padded = [0xA0, 0x05, 0x02, 0x01, 0x05, 0x05, 0x00];
        assert!(matches!(
            decode(&padded, &schema, tagged, &config),
            Err(Asn1Error::SchemaMismatch(_))
        ));
        let primitive = [0x80, 0x01, 0x05];
        assert!(matches!(
            decode(&primitive, &schema, tagged, &config),
            Err(Asn1Error::MalformedEncoding(_))
        ));
    }

    #[test]
    fn test_foreign_type_id() {
        let (schema, _) = integer_list();
        let (other, record) = record();
        assert!(other.len() > schema.len());
        assert!(matches!(
            decode(&[0x30, 0x00], &schema, record, &CodecConfig::der()),
            Err(Asn1Error::SchemaMismatch(_))
        ));
    }
}
