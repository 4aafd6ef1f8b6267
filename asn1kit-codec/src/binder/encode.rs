//! Schema-driven encoding
//!
//! Every element is produced as a complete TLV so SET members and SET OF
//! elements can be sorted on their encodings before they are joined. Values
//! are always emitted in canonical form; the rules only decide between
//! definite and indefinite lengths (CER) and whether long strings are
//! fragmented.

use crate::ber::canonical::{check_time, sort_set_members, sort_set_of};
use crate::ber::content::{
    CER_SEGMENT_SIZE, encode_bit_string, encode_boolean, encode_object_identifier,
};
use crate::ber::decoder::BerDecoder;
use crate::ber::encoder::BerEncoder;
use crate::ber::types::{Length, Tag};
use crate::schema::{Field, Kind, Presence, Schema, SizeConstraint, StringKind, Tagging, TypeId, TypeNode};
use crate::value::{Member, Value};
use asn1kit_core::{Asn1Error, Asn1Result, CodecConfig, EncodingRules};

pub(crate) struct SchemaEncoder<'s> {
    schema: &'s Schema,
    config: CodecConfig,
}

impl<'s> SchemaEncoder<'s> {
    pub(crate) fn new(schema: &'s Schema, config: &CodecConfig) -> Self {
        Self {
            schema,
            config: *config,
        }
    }

    /// Encode `value` as one complete element of type `ty`
    pub(crate) fn encode_value(&self, ty: TypeId, value: &Value, depth: usize) -> Asn1Result<Vec<u8>> {
        let node = self.schema.resolve(ty)?;
        if depth > self.config.max_depth {
            return Err(Asn1Error::LimitExceeded(format!(
                "{} is nested deeper than {}",
                node.display_name(),
                self.config.max_depth
            )));
        }
        log::trace!("Encoding {} (depth {})", node.display_name(), depth);

        match node.tagging {
            Some(Tagging::Explicit(tag)) => {
                let inner = self.encode_untagged(node, value, depth)?;
                Ok(self.frame(tag, true, &inner))
            }
            Some(Tagging::Implicit(tag)) => self.encode_with_tag(node, tag, value, depth),
            None => self.encode_untagged(node, value, depth),
        }
    }

    fn encode_untagged(&self, node: &TypeNode, value: &Value, depth: usize) -> Asn1Result<Vec<u8>> {
        match (&node.kind, value) {
            (Kind::Any, Value::Any(encoded)) => {
                self.check_single_tlv(node, encoded)?;
                Ok(encoded.clone())
            }
            (Kind::Choice(alternatives), Value::Choice { alternative, value }) => {
                let chosen = alternatives
                    .iter()
                    .find(|a| a.name == *alternative)
                    .ok_or_else(|| {
                        Asn1Error::SchemaMismatch(format!(
                            "{} has no alternative named {}",
                            node.display_name(),
                            alternative
                        ))
                    })?;
                self.encode_value(chosen.ty, value, depth + 1)
            }
            (Kind::Any | Kind::Choice(_), _) => Err(self.mismatch(node, value)),
            (kind, _) => {
                let tag = kind.universal_tag().ok_or_else(|| {
                    Asn1Error::SchemaMismatch(format!("{} has no tag", node.display_name()))
                })?;
                self.encode_with_tag(node, tag, value, depth)
            }
        }
    }

    /// Encode a tagged kind under `tag` (its own universal tag or an implicit one)
    fn encode_with_tag(&self, node: &TypeNode, tag: Tag, value: &Value, depth: usize) -> Asn1Result<Vec<u8>> {
        let rules = self.config.rules;
        match (&node.kind, value) {
            (Kind::Boolean, Value::Boolean(b)) => Ok(self.frame(tag, false, &encode_boolean(*b))),
            (Kind::Integer, Value::Integer(i)) | (Kind::Enumerated, Value::Enumerated(i)) => {
                Ok(self.frame(tag, false, i.as_bytes()))
            }
            (Kind::Null, Value::Null) => Ok(self.frame(tag, false, &[])),
            (Kind::ObjectIdentifier, Value::ObjectIdentifier(oid)) => {
                Ok(self.frame(tag, false, &encode_object_identifier(oid)))
            }
            (Kind::BitString, Value::BitString(bits)) => {
                let content = encode_bit_string(bits);
                if rules == EncodingRules::Cer && content.len() > CER_SEGMENT_SIZE {
                    Ok(self.fragment_bit_string(tag, &content))
                } else {
                    Ok(self.frame(tag, false, &content))
                }
            }
            (Kind::OctetString, Value::OctetString(octets)) => Ok(self.encode_string(tag, octets)),
            (Kind::String(kind), Value::String(octets)) => {
                if kind.is_time() {
                    check_time(octets, *kind == StringKind::GeneralizedTime, rules)
                        .map_err(|e| Asn1Error::InvalidValue(e.to_string()))?;
                }
                Ok(self.encode_string(tag, octets))
            }
            (Kind::Sequence(fields), Value::Sequence(members)) => {
                let parts = self.encode_members(node, fields, members, depth)?;
                Ok(self.frame(tag, true, &parts.concat()))
            }
            (Kind::Set(fields), Value::Set(members)) => {
                let mut parts = self.encode_members(node, fields, members, depth)?;
                sort_set_members(&mut parts)?;
                Ok(self.frame(tag, true, &parts.concat()))
            }
            (Kind::SequenceOf { element, size }, Value::SequenceOf(elements)) => {
                let parts = self.encode_elements(node, *element, *size, elements, depth)?;
                Ok(self.frame(tag, true, &parts.concat()))
            }
            (Kind::SetOf { element, size }, Value::SetOf(elements)) => {
                let mut parts = self.encode_elements(node, *element, *size, elements, depth)?;
                sort_set_of(&mut parts);
                Ok(self.frame(tag, true, &parts.concat()))
            }
            _ => Err(self.mismatch(node, value)),
        }
    }

    fn encode_members(
        &self,
        node: &TypeNode,
        fields: &[Field],
        members: &[Member],
        depth: usize,
    ) -> Asn1Result<Vec<Vec<u8>>> {
        if let Some(unknown) = members
            .iter()
            .find(|m| !fields.iter().any(|f| f.name == m.name))
        {
            return Err(Asn1Error::SchemaMismatch(format!(
                "{} has no member named {}",
                node.display_name(),
                unknown.name
            )));
        }

        let mut parts = Vec::with_capacity(fields.len());
        for field in fields {
            let member = members.iter().find(|m| m.name == field.name);
            match (member, &field.presence) {
                (Some(member), Presence::Default(default)) if member.value == *default => {}
                (Some(member), _) => parts.push(self.encode_value(field.ty, &member.value, depth + 1)?),
                (None, Presence::Required) => {
                    return Err(Asn1Error::SchemaMismatch(format!(
                        "Missing required member {} of {}",
                        field.name,
                        node.display_name()
                    )));
                }
                (None, _) => {}
            }
        }
        Ok(parts)
    }

    fn encode_elements(
        &self,
        node: &TypeNode,
        element: TypeId,
        size: Option<SizeConstraint>,
        elements: &[Value],
        depth: usize,
    ) -> Asn1Result<Vec<Vec<u8>>> {
        if let Some(size) = size
            && !size.contains(elements.len())
        {
            return Err(Asn1Error::SchemaMismatch(format!(
                "{} has {} elements, outside {}",
                node.display_name(),
                elements.len(),
                size
            )));
        }
        elements
            .iter()
            .map(|element_value| self.encode_value(element, element_value, depth + 1))
            .collect()
    }

    /// Write one TLV; constructed encodings use indefinite length under CER
    fn frame(&self, tag: Tag, constructed: bool, content: &[u8]) -> Vec<u8> {
        let mut encoder = BerEncoder::with_capacity(content.len() + 8);
        if constructed && self.config.rules == EncodingRules::Cer {
            encoder.write_header(tag, true, Length::Indefinite);
            encoder.write_raw(content);
            encoder.write_end_of_contents();
        } else {
            encoder.encode_tlv(tag, constructed, content);
        }
        encoder.into_bytes()
    }

    fn encode_string(&self, tag: Tag, octets: &[u8]) -> Vec<u8> {
        if self.config.rules != EncodingRules::Cer || octets.len() <= CER_SEGMENT_SIZE {
            return self.frame(tag, false, octets);
        }
        let mut segments = BerEncoder::with_capacity(octets.len() + octets.len() / 250 + 4);
        for chunk in octets.chunks(CER_SEGMENT_SIZE) {
            segments.encode_tlv(Tag::OCTET_STRING, false, chunk);
        }
        self.frame(tag, true, segments.as_bytes())
    }

    /// Split primitive BIT STRING contents into CER segments
    ///
    /// Each segment carries its own unused-bits octet, so it holds one data
    /// octet less than [`CER_SEGMENT_SIZE`]; only the last keeps the real count.
    fn fragment_bit_string(&self, tag: Tag, content: &[u8]) -> Vec<u8> {
        let (unused_bits, data) = (content[0], &content[1..]);
        let chunks: Vec<&[u8]> = data.chunks(CER_SEGMENT_SIZE - 1).collect();
        let mut segments = BerEncoder::with_capacity(content.len() + chunks.len() * 5);
        for (i, chunk) in chunks.iter().enumerate() {
            let unused = if i + 1 == chunks.len() { unused_bits } else { 0 };
            let mut segment = Vec::with_capacity(chunk.len() + 1);
            segment.push(unused);
            segment.extend_from_slice(chunk);
            segments.encode_tlv(Tag::BIT_STRING, false, &segment);
        }
        self.frame(tag, true, segments.as_bytes())
    }

    fn check_single_tlv(&self, node: &TypeNode, encoded: &[u8]) -> Asn1Result<()> {
        let mut reader = BerDecoder::new(encoded, &self.config);
        let tlv = reader.read_tlv().map_err(|e| {
            Asn1Error::InvalidValue(format!("{} value is not a valid TLV: {}", node.display_name(), e))
        })?;
        if reader.has_remaining() || tlv.encoded.is_empty() {
            return Err(Asn1Error::InvalidValue(format!(
                "{} value must be exactly one TLV",
                node.display_name()
            )));
        }
        Ok(())
    }

    fn mismatch(&self, node: &TypeNode, value: &Value) -> Asn1Error {
        Asn1Error::SchemaMismatch(format!(
            "{} ({}) cannot hold a {} value",
            node.display_name(),
            node.kind.name(),
            value.kind_name()
        ))
    }
}
