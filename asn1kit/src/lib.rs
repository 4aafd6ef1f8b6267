//! asn1kit - schema-driven ASN.1 codec for BER, CER and DER
//!
//! # Architecture
//!
//! This library is organized as a workspace with multiple crates:
//!
//! - `asn1kit-core`: errors, encoding rules, codec configuration, INTEGER /
//!   BIT STRING / OBJECT IDENTIFIER types
//! - `asn1kit-codec`: TLV layer, schema type model and the binder
//! - `asn1kit-modules`: RFC 5280 / RFC 7296 schemas and the PEM adapter
//!
//! # Implementation Status
//!
//! ## ✅ 已完成
//! - X.690 标签/长度编解码（高标签号、长格式、不定长）
//! - DER 规范性检查与编码（SET 排序、DEFAULT 省略、时间格式）
//! - CER 编码（不定长、字符串分段）
//! - Schema 构建器（前向声明、递归类型、CHOICE/SET 标签分派表）
//! - RFC 5280 证书/CRL、RFC 7296 CertificateBundle
//!
//! ## 📋 待实现
//! - REAL、RELATIVE-OID
//! - ASN.1 模块文本解析（目前以 Rust 代码构建 Schema）
//!
//! # Usage
//!
//! ```no_run
//! use asn1kit::{CodecConfig, modules::CertBundleSchema, modules::read_base64_from_text};
//!
//! # fn main() -> asn1kit::Asn1Result<()> {
//! let text = std::fs::read_to_string("bundle.b64").unwrap_or_default();
//! let der = read_base64_from_text(&text)?;
//! let bundle_schema = CertBundleSchema::new()?;
//! let (bundle, rest) = bundle_schema.decode(&der, &CodecConfig::der())?;
//! assert!(rest.is_empty());
//! assert_eq!(bundle_schema.encode(&bundle, &CodecConfig::der())?, der);
//! # Ok(())
//! # }
//! ```

// Re-export core types
pub use asn1kit_core::datatypes::*;
pub use asn1kit_core::{
    Asn1Error, Asn1Result, CodecConfig, CodecConfigBuilder, EncodingRules, ErrorKind,
};

// Re-export codec API
pub use asn1kit_codec::{
    Alternative, Field, Kind, Member, Presence, Schema, SchemaBuilder, SizeConstraint, StringKind,
    Tag, TagClass, TagSet, Tagging, TypeId, TypeNode, Value, decode, decode_exact, encode,
};

pub mod ber {
    pub use asn1kit_codec::ber::*;
}

// Re-export protocol schemas
pub mod modules {
    pub use asn1kit_modules::*;
}
