//! Primitive ASN.1 value types shared by the codec and its callers

pub mod bit_string;
pub mod integer;
pub mod object_identifier;

// Re-export types
pub use bit_string::BitString;
pub use integer::Integer;
pub use object_identifier::ObjectIdentifier;
