//! Internet X.509 PKI certificate and CRL profile (RFC 5280)
//!
//! Defines the explicitly tagged module types needed to decode and
//! re-encode certificates and CRLs byte for byte. Attribute values,
//! algorithm parameters and extension contents stay as open types / octet
//! strings; interpreting them is left to the caller.
//!
//! ```text
//! Certificate  ::=  SEQUENCE  {
//!      tbsCertificate       TBSCertificate,
//!      signatureAlgorithm   AlgorithmIdentifier,
//!      signatureValue       BIT STRING  }
//!
//! CertificateList  ::=  SEQUENCE  {
//!      tbsCertList          TBSCertList,
//!      signatureAlgorithm   AlgorithmIdentifier,
//!      signatureValue       BIT STRING  }
//! ```

use asn1kit_codec::ber::Tag;
use asn1kit_codec::schema::{
    Alternative, Field, Schema, SchemaBuilder, StringKind, Tagging, TypeId, TypeNode,
};
use asn1kit_codec::value::Value;
use asn1kit_core::{Asn1Result, ObjectIdentifier};

/// Version v1
pub const V1: i64 = 0;
/// Version v2
pub const V2: i64 = 1;
/// Version v3
pub const V3: i64 = 2;

pub const ID_CE_SUBJECT_KEY_IDENTIFIER: &str = "2.5.29.14";
pub const ID_CE_KEY_USAGE: &str = "2.5.29.15";
pub const ID_CE_SUBJECT_ALT_NAME: &str = "2.5.29.17";
pub const ID_CE_BASIC_CONSTRAINTS: &str = "2.5.29.19";
pub const ID_CE_CRL_NUMBER: &str = "2.5.29.20";
pub const ID_CE_CRL_DISTRIBUTION_POINTS: &str = "2.5.29.31";
pub const ID_CE_CERTIFICATE_POLICIES: &str = "2.5.29.32";
pub const ID_CE_AUTHORITY_KEY_IDENTIFIER: &str = "2.5.29.35";
pub const ID_CE_EXT_KEY_USAGE: &str = "2.5.29.37";

/// Ids of the main RFC 5280 types inside a schema
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PkixTypes {
    pub certificate: TypeId,
    pub certificate_list: TypeId,
    pub tbs_certificate: TypeId,
    pub tbs_cert_list: TypeId,
    pub algorithm_identifier: TypeId,
    pub name: TypeId,
    pub time: TypeId,
    pub extensions: TypeId,
}

/// Add the RFC 5280 types to `builder`
pub fn define(builder: &mut SchemaBuilder) -> Asn1Result<PkixTypes> {
    let oid = builder.add(TypeNode::object_identifier());
    let any = builder.add(TypeNode::any());
    let boolean = builder.add(TypeNode::boolean());
    let octets = builder.add(TypeNode::octet_string());
    let bits = builder.add(TypeNode::bit_string());

    let version = builder.add(TypeNode::integer().named("Version"));
    let serial_number = builder.add(TypeNode::integer().named("CertificateSerialNumber"));

    let algorithm_identifier = builder.add(
        TypeNode::sequence(vec![
            Field::required("algorithm", oid),
            Field::optional("parameters", any),
        ])
        .named("AlgorithmIdentifier"),
    );

    // Name
    let attribute = builder.add(
        TypeNode::sequence(vec![Field::required("type", oid), Field::required("value", any)])
            .named("AttributeTypeAndValue"),
    );
    let rdn = builder.add(
        TypeNode::set_of(attribute)
            .size(1, None)
            .named("RelativeDistinguishedName"),
    );
    let rdn_sequence = builder.add(TypeNode::sequence_of(rdn).named("RDNSequence"));
    let name = builder.add(
        TypeNode::choice(vec![Alternative::new("rdnSequence", rdn_sequence)]).named("Name"),
    );

    // Time
    let utc_time = builder.add(TypeNode::string(StringKind::UtcTime));
    let generalized_time = builder.add(TypeNode::string(StringKind::GeneralizedTime));
    let time = builder.add(
        TypeNode::choice(vec![
            Alternative::new("utcTime", utc_time),
            Alternative::new("generalTime", generalized_time),
        ])
        .named("Time"),
    );
    let validity = builder.add(
        TypeNode::sequence(vec![
            Field::required("notBefore", time),
            Field::required("notAfter", time),
        ])
        .named("Validity"),
    );

    let subject_public_key_info = builder.add(
        TypeNode::sequence(vec![
            Field::required("algorithm", algorithm_identifier),
            Field::required("subjectPublicKey", bits),
        ])
        .named("SubjectPublicKeyInfo"),
    );

    // Extensions
    let extension = builder.add(
        TypeNode::sequence(vec![
            Field::required("extnID", oid),
            Field::with_default("critical", boolean, Value::Boolean(false)),
            Field::required("extnValue", octets),
        ])
        .named("Extension"),
    );
    let extensions = builder.add(
        TypeNode::sequence_of(extension)
            .size(1, None)
            .named("Extensions"),
    );

    let unique_identifier = builder.add(TypeNode::bit_string().named("UniqueIdentifier"));
    let tagged_version = builder.tagged(version, Tagging::Explicit(Tag::context_specific(0)))?;
    let issuer_unique_id =
        builder.tagged(unique_identifier, Tagging::Implicit(Tag::context_specific(1)))?;
    let subject_unique_id =
        builder.tagged(unique_identifier, Tagging::Implicit(Tag::context_specific(2)))?;
    let certificate_extensions =
        builder.tagged(extensions, Tagging::Explicit(Tag::context_specific(3)))?;

    let tbs_certificate = builder.add(
        TypeNode::sequence(vec![
            Field::with_default("version", tagged_version, Value::integer(V1)),
            Field::required("serialNumber", serial_number),
            Field::required("signature", algorithm_identifier),
            Field::required("issuer", name),
            Field::required("validity", validity),
            Field::required("subject", name),
            Field::required("subjectPublicKeyInfo", subject_public_key_info),
            Field::optional("issuerUniqueID", issuer_unique_id),
            Field::optional("subjectUniqueID", subject_unique_id),
            Field::optional("extensions", certificate_extensions),
        ])
        .named("TBSCertificate"),
    );
    let certificate = builder.add(
        TypeNode::sequence(vec![
            Field::required("tbsCertificate", tbs_certificate),
            Field::required("signatureAlgorithm", algorithm_identifier),
            Field::required("signatureValue", bits),
        ])
        .named("Certificate"),
    );

    // CRL
    let revoked_certificate = builder.add(
        TypeNode::sequence(vec![
            Field::required("userCertificate", serial_number),
            Field::required("revocationDate", time),
            Field::optional("crlEntryExtensions", extensions),
        ])
        .named("RevokedCertificate"),
    );
    let revoked_certificates = builder.add(TypeNode::sequence_of(revoked_certificate));
    let crl_extensions = builder.tagged(extensions, Tagging::Explicit(Tag::context_specific(0)))?;

    let tbs_cert_list = builder.add(
        TypeNode::sequence(vec![
            Field::optional("version", version),
            Field::required("signature", algorithm_identifier),
            Field::required("issuer", name),
            Field::required("thisUpdate", time),
            Field::optional("nextUpdate", time),
            Field::optional("revokedCertificates", revoked_certificates),
            Field::optional("crlExtensions", crl_extensions),
        ])
        .named("TBSCertList"),
    );
    let certificate_list = builder.add(
        TypeNode::sequence(vec![
            Field::required("tbsCertList", tbs_cert_list),
            Field::required("signatureAlgorithm", algorithm_identifier),
            Field::required("signatureValue", bits),
        ])
        .named("CertificateList"),
    );

    Ok(PkixTypes {
        certificate,
        certificate_list,
        tbs_certificate,
        tbs_cert_list,
        algorithm_identifier,
        name,
        time,
        extensions,
    })
}

/// Build a schema holding only the RFC 5280 types
pub fn schema() -> Asn1Result<(Schema, PkixTypes)> {
    let mut builder = SchemaBuilder::new();
    let types = define(&mut builder)?;
    Ok((builder.finish()?, types))
}

/// Find an extension of a decoded `Certificate` or `CertificateList` by OID
pub fn find_extension<'v>(signed: &'v Value, extn_id: &ObjectIdentifier) -> Option<&'v Value> {
    let extensions = match signed.get("tbsCertificate") {
        Some(tbs) => tbs.get("extensions")?,
        None => signed.get("tbsCertList")?.get("crlExtensions")?,
    };
    extensions
        .elements()?
        .iter()
        .find(|extension| extension.get("extnID").and_then(Value::as_oid) == Some(extn_id))
}
