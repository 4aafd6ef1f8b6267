//! Ready-made schemas and text adapters for asn1kit
//!
//! - [`rfc5280`]: X.509 certificate and CRL types
//! - [`rfc7296`]: IKEv2 `CertificateBundle`
//! - [`pem`]: PEM / base64 text to DER bytes

pub mod pem;
pub mod rfc5280;
pub mod rfc7296;

pub use pem::{PemBlock, read_base64_from_text, read_pem_blocks};
pub use rfc5280::PkixTypes;
pub use rfc7296::{CertBundleSchema, EntryKind, entry_kinds};
