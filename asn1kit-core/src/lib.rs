//! Core types and utilities for the asn1kit ASN.1 codec
//!
//! This crate provides the error taxonomy, encoding-rule selection, codec
//! configuration and the primitive value types (INTEGER, BIT STRING,
//! OBJECT IDENTIFIER) used throughout the workspace.

pub mod config;
pub mod datatypes;
pub mod error;
pub mod rules;

pub use config::{CodecConfig, CodecConfigBuilder};
pub use datatypes::{BitString, Integer, ObjectIdentifier};
pub use error::{Asn1Error, Asn1Result, ErrorKind};
pub use rules::EncodingRules;
