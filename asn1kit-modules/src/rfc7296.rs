//! IKEv2 certificate bundle (RFC 7296 appendix, "Hash and URL of X.509 bundle")
//!
//! ```text
//! CertificateOrCRL ::= CHOICE {
//!     cert [0] Certificate,
//!     crl  [1] CertificateList }
//!
//! CertificateBundle ::= SEQUENCE OF CertificateOrCRL
//! ```
//!
//! The module uses EXPLICIT TAGS, so each entry is wrapped in a
//! constructed context-specific tag around the complete certificate or CRL.

use crate::rfc5280::{self, PkixTypes};
use asn1kit_codec::ber::Tag;
use asn1kit_codec::binder;
use asn1kit_codec::schema::{Alternative, Schema, SchemaBuilder, Tagging, TypeId, TypeNode};
use asn1kit_codec::value::Value;
use asn1kit_core::{Asn1Error, Asn1Result, CodecConfig};
use std::fmt;

/// Alternative of a `CertificateOrCRL` entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryKind {
    Certificate,
    Crl,
}

impl EntryKind {
    pub fn alternative_name(self) -> &'static str {
        match self {
            EntryKind::Certificate => "cert",
            EntryKind::Crl => "crl",
        }
    }

    pub fn from_alternative(name: &str) -> Option<Self> {
        match name {
            "cert" => Some(EntryKind::Certificate),
            "crl" => Some(EntryKind::Crl),
            _ => None,
        }
    }
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.alternative_name())
    }
}

/// Finished schema for `CertificateBundle`
///
/// Build it once and share it; decoding and encoding only borrow it.
#[derive(Debug, Clone)]
pub struct CertBundleSchema {
    schema: Schema,
    bundle: TypeId,
    entry: TypeId,
    pkix: PkixTypes,
}

impl CertBundleSchema {
    pub fn new() -> Asn1Result<Self> {
        let mut builder = SchemaBuilder::new();
        let pkix = rfc5280::define(&mut builder)?;

        let cert = builder.tagged(pkix.certificate, Tagging::Explicit(Tag::context_specific(0)))?;
        let crl = builder.tagged(
            pkix.certificate_list,
            Tagging::Explicit(Tag::context_specific(1)),
        )?;
        let entry = builder.add(
            TypeNode::choice(vec![
                Alternative::new(EntryKind::Certificate.alternative_name(), cert),
                Alternative::new(EntryKind::Crl.alternative_name(), crl),
            ])
            .named("CertificateOrCRL"),
        );
        let bundle = builder.add(TypeNode::sequence_of(entry).named("CertificateBundle"));

        Ok(Self {
            schema: builder.finish()?,
            bundle,
            entry,
            pkix,
        })
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Id of `CertificateBundle`
    pub fn bundle_type(&self) -> TypeId {
        self.bundle
    }

    /// Id of `CertificateOrCRL`
    pub fn entry_type(&self) -> TypeId {
        self.entry
    }

    /// Ids of the RFC 5280 types the bundle is built on
    pub fn pkix(&self) -> &PkixTypes {
        &self.pkix
    }

    /// Decode a bundle from the start of `buffer`, returning the unused suffix
    pub fn decode<'a>(&self, buffer: &'a [u8], config: &CodecConfig) -> Asn1Result<(Value, &'a [u8])> {
        binder::decode(buffer, &self.schema, self.bundle, config)
    }

    pub fn encode(&self, bundle: &Value, config: &CodecConfig) -> Asn1Result<Vec<u8>> {
        binder::encode(bundle, &self.schema, self.bundle, config)
    }
}

/// Kinds of the entries of a decoded bundle, in order
pub fn entry_kinds(bundle: &Value) -> Asn1Result<Vec<EntryKind>> {
    let entries = bundle.elements().ok_or_else(|| {
        Asn1Error::SchemaMismatch(format!(
            "CertificateBundle must be a SEQUENCE OF, got {}",
            bundle.kind_name()
        ))
    })?;
    entries
        .iter()
        .map(|entry| {
            entry
                .alternative()
                .and_then(EntryKind::from_alternative)
                .ok_or_else(|| {
                    Asn1Error::NoMatchingAlternative(format!(
                        "Bundle entry {:?} is neither cert nor crl",
                        entry.alternative()
                    ))
                })
        })
        .collect()
}
