//! Schema-driven decoding
//!
//! Recursive descent over the schema: each call consumes exactly one
//! element from a [`BerDecoder`] region. Nested regions are the contents of
//! the enclosing TLV, so a component can never read past its parent.

use crate::ber::canonical::{check_set_member_order, check_set_of_order, check_time};
use crate::ber::content::{
    check_primitive_string_size, collect_segments, decode_bit_string, decode_boolean,
    decode_integer, decode_null, decode_object_identifier, join_bit_string_segments,
};
use crate::ber::decoder::{BerDecoder, Tlv};
use crate::ber::types::Tag;
use crate::schema::{Field, Kind, Presence, Schema, SizeConstraint, StringKind, Tagging, TypeId, TypeNode};
use crate::value::{Member, Value};
use asn1kit_core::{Asn1Error, Asn1Result, CodecConfig};

pub(crate) struct SchemaDecoder<'s> {
    schema: &'s Schema,
    config: CodecConfig,
}

impl<'s> SchemaDecoder<'s> {
    pub(crate) fn new(schema: &'s Schema, config: &CodecConfig) -> Self {
        Self {
            schema,
            config: *config,
        }
    }

    /// Decode one element of type `ty` from `reader`
    pub(crate) fn decode_value(
        &self,
        ty: TypeId,
        reader: &mut BerDecoder<'_>,
        depth: usize,
    ) -> Asn1Result<Value> {
        let node = self.schema.resolve(ty)?;
        if depth > self.config.max_depth {
            return Err(Asn1Error::LimitExceeded(format!(
                "{} is nested deeper than {}",
                node.display_name(),
                self.config.max_depth
            )));
        }
        log::trace!(
            "Decoding {} at offset {} (depth {})",
            node.display_name(),
            reader.position(),
            depth
        );

        match node.tagging {
            Some(Tagging::Explicit(tag)) => {
                let tlv = self.expect_tlv(reader, tag, node)?;
                if !tlv.header.constructed {
                    return Err(Asn1Error::MalformedEncoding(format!(
                        "Explicit tag {} of {} must be constructed",
                        tag,
                        node.display_name()
                    )));
                }
                let mut inner = BerDecoder::new(tlv.content, &self.config);
                let value = self.decode_untagged(ty, node, &mut inner, depth)?;
                if inner.has_remaining() {
                    return Err(Asn1Error::SchemaMismatch(format!(
                        "{} trailing bytes inside explicit tag {} of {}",
                        inner.remaining(),
                        tag,
                        node.display_name()
                    )));
                }
                Ok(value)
            }
            Some(Tagging::Implicit(tag)) => {
                let tlv = self.expect_tlv(reader, tag, node)?;
                self.decode_contents(ty, node, &tlv, depth)
            }
            None => self.decode_untagged(ty, node, reader, depth),
        }
    }

    /// Decode a node as if it carried no tagging of its own
    fn decode_untagged(
        &self,
        ty: TypeId,
        node: &TypeNode,
        reader: &mut BerDecoder<'_>,
        depth: usize,
    ) -> Asn1Result<Value> {
        match &node.kind {
            Kind::Any => {
                let tlv = reader.read_tlv()?;
                Ok(Value::Any(tlv.encoded.to_vec()))
            }
            Kind::Choice(alternatives) => {
                let header = reader.peek_header()?;
                let index = self.schema.dispatch(ty)?.find(header.tag).ok_or_else(|| {
                    Asn1Error::NoMatchingAlternative(format!(
                        "Tag {} selects no alternative of {}",
                        header.tag,
                        node.display_name()
                    ))
                })?;
                let alternative = &alternatives[index];
                log::trace!("{} selects alternative {}", header.tag, alternative.name);
                let value = self.decode_value(alternative.ty, reader, depth + 1)?;
                Ok(Value::choice(alternative.name.clone(), value))
            }
            kind => {
                let tag = kind.universal_tag().ok_or_else(|| {
                    Asn1Error::SchemaMismatch(format!("{} has no tag", node.display_name()))
                })?;
                let tlv = self.expect_tlv(reader, tag, node)?;
                self.decode_contents(ty, node, &tlv, depth)
            }
        }
    }

    fn expect_tlv<'a>(
        &self,
        reader: &mut BerDecoder<'a>,
        tag: Tag,
        node: &TypeNode,
    ) -> Asn1Result<Tlv<'a>> {
        let header = reader.peek_header()?;
        if header.tag != tag {
            return Err(Asn1Error::SchemaMismatch(format!(
                "Expected {} for {}, found {}",
                tag,
                node.display_name(),
                header.tag
            )));
        }
        reader.read_tlv()
    }

    /// Interpret the contents of a TLV whose tag has already been matched
    fn decode_contents(
        &self,
        ty: TypeId,
        node: &TypeNode,
        tlv: &Tlv<'_>,
        depth: usize,
    ) -> Asn1Result<Value> {
        let rules = self.config.rules;
        let constructed = tlv.header.constructed;
        let content = tlv.content;

        match &node.kind {
            Kind::Boolean => {
                self.require_primitive(node, constructed)?;
                Ok(Value::Boolean(decode_boolean(content, rules)?))
            }
            Kind::Integer => {
                self.require_primitive(node, constructed)?;
                Ok(Value::Integer(decode_integer(content, rules)?))
            }
            Kind::Enumerated => {
                self.require_primitive(node, constructed)?;
                Ok(Value::Enumerated(decode_integer(content, rules)?))
            }
            Kind::Null => {
                self.require_primitive(node, constructed)?;
                decode_null(content)?;
                Ok(Value::Null)
            }
            Kind::ObjectIdentifier => {
                self.require_primitive(node, constructed)?;
                Ok(Value::ObjectIdentifier(decode_object_identifier(content)?))
            }
            Kind::BitString => {
                if constructed {
                    let segments = collect_segments(content, Tag::BIT_STRING, &self.config, depth + 1)?;
                    Ok(Value::BitString(join_bit_string_segments(&segments, rules)?))
                } else {
                    check_primitive_string_size(content, rules)?;
                    Ok(Value::BitString(decode_bit_string(content, rules)?))
                }
            }
            Kind::OctetString => Ok(Value::OctetString(self.string_octets(tlv, depth)?)),
            Kind::String(kind) => {
                let octets = self.string_octets(tlv, depth)?;
                if kind.is_time() {
                    check_time(&octets, *kind == StringKind::GeneralizedTime, rules)?;
                }
                Ok(Value::String(octets))
            }
            Kind::Sequence(fields) => {
                self.require_constructed(node, constructed)?;
                self.decode_sequence(node, fields, content, depth)
            }
            Kind::Set(fields) => {
                self.require_constructed(node, constructed)?;
                self.decode_set(ty, node, fields, content, depth)
            }
            Kind::SequenceOf { element, size } => {
                self.require_constructed(node, constructed)?;
                let elements = self.decode_elements(node, *element, *size, content, depth, false)?;
                Ok(Value::SequenceOf(elements))
            }
            Kind::SetOf { element, size } => {
                self.require_constructed(node, constructed)?;
                let elements = self.decode_elements(node, *element, *size, content, depth, true)?;
                Ok(Value::SetOf(elements))
            }
            Kind::Any | Kind::Choice(_) => Err(Asn1Error::SchemaMismatch(format!(
                "{} cannot be implicitly tagged",
                node.display_name()
            ))),
        }
    }

    fn string_octets(&self, tlv: &Tlv<'_>, depth: usize) -> Asn1Result<Vec<u8>> {
        if tlv.header.constructed {
            let segments = collect_segments(tlv.content, Tag::OCTET_STRING, &self.config, depth + 1)?;
            Ok(segments.concat())
        } else {
            check_primitive_string_size(tlv.content, self.config.rules)?;
            Ok(tlv.content.to_vec())
        }
    }

    fn decode_sequence(
        &self,
        node: &TypeNode,
        fields: &[Field],
        content: &[u8],
        depth: usize,
    ) -> Asn1Result<Value> {
        let mut reader = BerDecoder::new(content, &self.config);
        let mut members = Vec::with_capacity(fields.len());

        for field in fields {
            let present = reader.has_remaining()
                && self.schema.tag_set(field.ty).matches(reader.peek_header()?.tag);
            if !present {
                if let Some(value) = self.absent_field(node, field)? {
                    members.push(Member::new(field.name.clone(), value));
                }
                continue;
            }
            let value = self.decode_value(field.ty, &mut reader, depth + 1)?;
            self.check_not_default(node, field, &value)?;
            members.push(Member::new(field.name.clone(), value));
        }

        if reader.has_remaining() {
            return Err(Asn1Error::SchemaMismatch(format!(
                "{} unexpected trailing bytes in {}",
                reader.remaining(),
                node.display_name()
            )));
        }
        Ok(Value::Sequence(members))
    }

    fn decode_set(
        &self,
        ty: TypeId,
        node: &TypeNode,
        fields: &[Field],
        content: &[u8],
        depth: usize,
    ) -> Asn1Result<Value> {
        let dispatch = self.schema.dispatch(ty)?;
        let mut reader = BerDecoder::new(content, &self.config);
        let mut slots: Vec<Option<Value>> = vec![None; fields.len()];
        let mut previous: Option<Tag> = None;

        while reader.has_remaining() {
            let tag = reader.peek_header()?.tag;
            let index = dispatch.find(tag).ok_or_else(|| {
                Asn1Error::SchemaMismatch(format!(
                    "Tag {} matches no member of {}",
                    tag,
                    node.display_name()
                ))
            })?;
            let field = &fields[index];
            if slots[index].is_some() {
                return Err(Asn1Error::SchemaMismatch(format!(
                    "Member {} of {} appears twice",
                    field.name,
                    node.display_name()
                )));
            }
            if self.config.rules.is_canonical() {
                if let Some(previous) = previous {
                    check_set_member_order(previous, tag)?;
                }
                previous = Some(tag);
            }
            slots[index] = Some(self.decode_value(field.ty, &mut reader, depth + 1)?);
        }

        let mut members = Vec::with_capacity(fields.len());
        for (field, slot) in fields.iter().zip(slots) {
            let value = match slot {
                Some(value) => {
                    self.check_not_default(node, field, &value)?;
                    Some(value)
                }
                None => self.absent_field(node, field)?,
            };
            if let Some(value) = value {
                members.push(Member::new(field.name.clone(), value));
            }
        }
        Ok(Value::Set(members))
    }

    fn decode_elements(
        &self,
        node: &TypeNode,
        element: TypeId,
        size: Option<SizeConstraint>,
        content: &[u8],
        depth: usize,
        sorted: bool,
    ) -> Asn1Result<Vec<Value>> {
        let mut reader = BerDecoder::new(content, &self.config);
        let mut elements = Vec::new();
        let mut previous: Option<&[u8]> = None;

        while reader.has_remaining() {
            let start = reader.position();
            elements.push(self.decode_value(element, &mut reader, depth + 1)?);
            if sorted && self.config.rules.is_canonical() {
                let encoding = &reader.region()[start..reader.position()];
                if let Some(previous) = previous {
                    check_set_of_order(previous, encoding)?;
                }
                previous = Some(encoding);
            }
        }

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
        Ok(elements)
    }

    /// Value recorded for a component missing from the encoding
    fn absent_field(&self, node: &TypeNode, field: &Field) -> Asn1Result<Option<Value>> {
        match &field.presence {
            Presence::Required => Err(Asn1Error::SchemaMismatch(format!(
                "Missing required member {} of {}",
                field.name,
                node.display_name()
            ))),
            Presence::Optional => Ok(None),
            Presence::Default(value) => Ok(Some(value.clone())),
        }
    }

    fn check_not_default(&self, node: &TypeNode, field: &Field, value: &Value) -> Asn1Result<()> {
        if let Presence::Default(default) = &field.presence
            && self.config.rules.is_canonical()
            && value == default
        {
            return Err(Asn1Error::NonCanonicalEncoding(format!(
                "Member {} of {} encodes its DEFAULT value",
                field.name,
                node.display_name()
            )));
        }
        Ok(())
    }

    fn require_primitive(&self, node: &TypeNode, constructed: bool) -> Asn1Result<()> {
        if constructed {
            return Err(Asn1Error::MalformedEncoding(format!(
                "{} must use the primitive form",
                node.display_name()
            )));
        }
        Ok(())
    }

    fn require_constructed(&self, node: &TypeNode, constructed: bool) -> Asn1Result<()> {
        if !constructed {
            return Err(Asn1Error::MalformedEncoding(format!(
                "{} must use the constructed form",
                node.display_name()
            )));
        }
        Ok(())
    }
}
