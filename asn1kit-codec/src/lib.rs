//! Schema-driven ASN.1 codec for BER, CER and DER
//!
//! This crate provides the TLV layer (ITU-T X.690), a type model for ASN.1
//! schemas and the binder that decodes bytes into [`Value`]s and encodes
//! them back under the rules selected in a [`CodecConfig`].
//!
//! - [`ber`]: tags, lengths, TLV reader/writer, primitive contents, canonical checks
//! - [`schema`]: [`Schema`] arena, [`SchemaBuilder`], [`TypeNode`]
//! - [`value`]: [`Value`] tree produced and consumed by the binder
//! - [`binder`]: [`decode`], [`decode_exact`], [`encode`]
//!
//! # TODO
//!
//! ## 类型支持
//! - [x] BOOLEAN, INTEGER, ENUMERATED, NULL, BIT STRING, OCTET STRING, OBJECT IDENTIFIER
//! - [x] 字符串与时间类型 (UTF8String ... GeneralizedTime)
//! - [x] SEQUENCE, SET, SEQUENCE OF, SET OF, CHOICE, ANY
//! - [ ] REAL, RELATIVE-OID
//! - [ ] 扩展标记 (`...`) 的解码支持
//!
//! ## 编码规则
//! - [x] BER 解码（定长、不定长、构造字符串）
//! - [x] DER 编码/解码与规范性检查
//! - [x] CER 编码（不定长、1000 字节分段）

pub mod ber;
pub mod binder;
pub mod schema;
pub mod value;

pub use asn1kit_core::{Asn1Error, Asn1Result, CodecConfig, EncodingRules};
pub use ber::{BerDecoder, BerEncoder, Header, Length, Tag, TagClass, Tlv, read_tag_and_length};
pub use binder::{decode, decode_exact, encode};
pub use schema::{
    Alternative, Field, Kind, Presence, Schema, SchemaBuilder, SizeConstraint, StringKind, TagSet,
    Tagging, TypeId, TypeNode,
};
pub use value::{Member, Value};
