//! Decoded/encodable ASN.1 values
//!
//! A [`Value`] is plain data: it owns every byte it holds and carries no
//! reference to the schema or to the buffer it was decoded from. The schema
//! binder pairs it with a schema type on every decode/encode call.

use asn1kit_core::{BitString, Integer, ObjectIdentifier};
use serde::{Deserialize, Serialize};
use std::fmt::{self, Write};

/// A typed ASN.1 value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Value {
    Boolean(bool),
    Integer(Integer),
    Enumerated(Integer),
    Null,
    BitString(BitString),
    OctetString(#[serde(with = "serde_bytes")] Vec<u8>),
    ObjectIdentifier(ObjectIdentifier),
    /// Character or time string contents, exactly as carried on the wire
    String(#[serde(with = "serde_bytes")] Vec<u8>),
    /// Complete TLV of an open-type (ANY) value
    Any(#[serde(with = "serde_bytes")] Vec<u8>),
    /// SEQUENCE members in schema order; absent OPTIONAL members are left out,
    /// absent DEFAULT members carry their default
    Sequence(Vec<Member>),
    /// SET members in schema order, whatever the wire order was
    Set(Vec<Member>),
    SequenceOf(Vec<Value>),
    SetOf(Vec<Value>),
    /// Selected CHOICE alternative
    Choice {
        alternative: String,
        value: Box<Value>,
    },
}

/// Named member of a SEQUENCE or SET value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub name: String,
    pub value: Value,
}

impl Member {
    pub fn new(name: impl Into<String>, value: Value) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }
}

impl Value {
    /// Build a SEQUENCE value from `(name, value)` pairs
    pub fn sequence<N: Into<String>>(members: impl IntoIterator<Item = (N, Value)>) -> Self {
        Value::Sequence(
            members
                .into_iter()
                .map(|(name, value)| Member::new(name, value))
                .collect(),
        )
    }

    /// Build a SET value from `(name, value)` pairs
    pub fn set<N: Into<String>>(members: impl IntoIterator<Item = (N, Value)>) -> Self {
        Value::Set(
            members
                .into_iter()
                .map(|(name, value)| Member::new(name, value))
                .collect(),
        )
    }

    /// Build a CHOICE value
    pub fn choice(alternative: impl Into<String>, value: Value) -> Self {
        Value::Choice {
            alternative: alternative.into(),
            value: Box::new(value),
        }
    }

    /// Build an INTEGER value
    pub fn integer(value: i64) -> Self {
        Value::Integer(Integer::from_i64(value))
    }

    /// Get a SEQUENCE/SET member by name
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.members()?
            .iter()
            .find(|member| member.name == name)
            .map(|member| &member.value)
    }

    /// Get a mutable SEQUENCE/SET member by name
    pub fn get_mut(&mut self, name: &str) -> Option<&mut Value> {
        match self {
            Value::Sequence(members) | Value::Set(members) => members
                .iter_mut()
                .find(|member| member.name == name)
                .map(|member| &mut member.value),
            _ => None,
        }
    }

    /// Get SEQUENCE/SET members
    pub fn members(&self) -> Option<&[Member]> {
        match self {
            Value::Sequence(members) | Value::Set(members) => Some(members),
            _ => None,
        }
    }

    /// Get SEQUENCE OF / SET OF elements
    pub fn elements(&self) -> Option<&[Value]> {
        match self {
            Value::SequenceOf(elements) | Value::SetOf(elements) => Some(elements),
            _ => None,
        }
    }

    /// Name of the selected CHOICE alternative
    pub fn alternative(&self) -> Option<&str> {
        match self {
            Value::Choice { alternative, .. } => Some(alternative),
            _ => None,
        }
    }

    /// Value of the selected CHOICE alternative
    pub fn chosen(&self) -> Option<&Value> {
        match self {
            Value::Choice { value, .. } => Some(value),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<&Integer> {
        match self {
            Value::Integer(i) | Value::Enumerated(i) => Some(i),
            _ => None,
        }
    }

    pub fn as_oid(&self) -> Option<&ObjectIdentifier> {
        match self {
            Value::ObjectIdentifier(oid) => Some(oid),
            _ => None,
        }
    }

    pub fn as_bit_string(&self) -> Option<&BitString> {
        match self {
            Value::BitString(bits) => Some(bits),
            _ => None,
        }
    }

    /// Octets of an OCTET STRING, character string or ANY value
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::OctetString(bytes) | Value::String(bytes) | Value::Any(bytes) => Some(bytes),
            _ => None,
        }
    }

    /// Short name of the variant, for error messages
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Boolean(_) => "BOOLEAN",
            Value::Integer(_) => "INTEGER",
            Value::Enumerated(_) => "ENUMERATED",
            Value::Null => "NULL",
            Value::BitString(_) => "BIT STRING",
            Value::OctetString(_) => "OCTET STRING",
            Value::ObjectIdentifier(_) => "OBJECT IDENTIFIER",
            Value::String(_) => "string",
            Value::Any(_) => "ANY",
            Value::Sequence(_) => "SEQUENCE",
            Value::Set(_) => "SET",
            Value::SequenceOf(_) => "SEQUENCE OF",
            Value::SetOf(_) => "SET OF",
            Value::Choice { .. } => "CHOICE",
        }
    }
}

/// Indented dump of a value tree
///
/// One line per node. Members are printed as `name=`, list elements as
/// `[index]=` and a CHOICE as `alternative: ` in front of its value.
/// Constructed values print their kind and nest their children two spaces
/// deeper.
///
/// ```text
/// SEQUENCE OF
///   [0]=cert: SEQUENCE
///     tbsCertificate=SEQUENCE
///       version=2
/// ```
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_pretty(f, 0)
    }
}

impl Value {
    /// Render the indented dump produced by [`Display`](fmt::Display)
    pub fn pretty(&self) -> String {
        self.to_string()
    }

    fn write_pretty(&self, f: &mut fmt::Formatter<'_>, depth: usize) -> fmt::Result {
        match self {
            Value::Boolean(b) => writeln!(f, "{}", if *b { "TRUE" } else { "FALSE" }),
            Value::Integer(i) | Value::Enumerated(i) => writeln!(f, "{}", i),
            Value::Null => writeln!(f, "NULL"),
            Value::BitString(bits) => {
                writeln!(f, "{} ({} bits)", hex(bits.as_bytes()), bits.num_bits())
            }
            Value::OctetString(bytes) | Value::Any(bytes) => writeln!(f, "{}", hex(bytes)),
            Value::ObjectIdentifier(oid) => writeln!(f, "{}", oid),
            Value::String(bytes) => match std::str::from_utf8(bytes) {
                Ok(text) if !text.chars().any(char::is_control) => writeln!(f, "{:?}", text),
                _ => writeln!(f, "{}", hex(bytes)),
            },
            Value::Sequence(members) | Value::Set(members) => {
                writeln!(f, "{}", self.kind_name())?;
                for member in members {
                    write!(f, "{:indent$}{}=", "", member.name, indent = (depth + 1) * 2)?;
                    member.value.write_pretty(f, depth + 1)?;
                }
                Ok(())
            }
            Value::SequenceOf(elements) | Value::SetOf(elements) => {
                writeln!(f, "{}", self.kind_name())?;
                for (index, element) in elements.iter().enumerate() {
                    write!(f, "{:indent$}[{}]=", "", index, indent = (depth + 1) * 2)?;
                    element.write_pretty(f, depth + 1)?;
                }
                Ok(())
            }
            Value::Choice { alternative, value } => {
                write!(f, "{}: ", alternative)?;
                value.write_pretty(f, depth)
            }
        }
    }
}

fn hex(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(2 + bytes.len() * 2);
    out.push_str("0x");
    for byte in bytes {
        let _ = write!(out, "{:02x}", byte);
    }
    out
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Boolean(value)
    }
}

impl From<Integer> for Value {
    fn from(value: Integer) -> Self {
        Value::Integer(value)
    }
}

impl From<ObjectIdentifier> for Value {
    fn from(value: ObjectIdentifier) -> Self {
        Value::ObjectIdentifier(value)
    }
}

impl From<BitString> for Value {
    fn from(value: BitString) -> Self {
        Value::BitString(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_member_lookup() {
        let mut value = Value::sequence([
            ("version", Value::integer(2)),
            ("critical", Value::Boolean(true)),
        ]);
        assert_eq!(value.get("critical").and_then(Value::as_bool), Some(true));
        assert!(value.get("missing").is_none());

        *value.get_mut("version").unwrap() = Value::integer(1);
        assert_eq!(
            value.get("version").and_then(Value::as_integer).and_then(Integer::to_i64),
            Some(1)
        );
    }

    #[test]
    fn test_choice_accessors() {
        let value = Value::choice("crl", Value::Null);
        assert_eq!(value.alternative(), Some("crl"));
        assert_eq!(value.chosen(), Some(&Value::Null));
        assert_eq!(Value::Null.alternative(), None);
    }

    #[test]
    fn test_value_serde() {
        let value = Value::sequence([("data", Value::OctetString(vec![1, 2, 3]))]);
        let json = serde_json::to_string(&value).unwrap();
        let back: Value = serde_json::from_str(&json).unwrap();
        assert_eq!(back, value);
    }

    #[test]
    fn test_value_serde_rejects_invalid_primitives() {
        for json in [
            r#"{"BitString":{"bytes":[],"num_bits":5}}"#,
            r#"{"ObjectIdentifier":{"arcs":[]}}"#,
            r#"{"Integer":{"bytes":[0,5]}}"#,
            r#"{"Integer":{"bytes":[]}}"#,
        ] {
            assert!(serde_json::from_str::<Value>(json).is_err(), "accepted {}", json);
        }
    }

    #[test]
    fn test_pretty_print() {
        let value = Value::SequenceOf(vec![Value::choice(
            "cert",
            Value::sequence([
                ("version", Value::integer(2)),
                ("extnID", Value::ObjectIdentifier("2.5.29.19".parse().unwrap())),
                ("critical", Value::Boolean(true)),
                ("notBefore", Value::choice("utcTime", Value::String(b"061110000000Z".to_vec()))),
                ("extnValue", Value::OctetString(vec![0x30, 0x00])),
                ("signature", Value::BitString(BitString::from_raw(vec![0xA0], 4).unwrap())),
                ("parameters", Value::Null),
            ]),
        )]);
        assert_eq!(
            value.pretty(),
            "SEQUENCE OF\n\
             \x20 [0]=cert: SEQUENCE\n\
             \x20   version=2\n\
             \x20   extnID=2.5.29.19\n\
             \x20   critical=TRUE\n\
             \x20   notBefore=utcTime: \"061110000000Z\"\n\
             \x20   extnValue=0x3000\n\
             \x20   signature=0xa0 (4 bits)\n\
             \x20   parameters=NULL\n"
        );
    }
}
