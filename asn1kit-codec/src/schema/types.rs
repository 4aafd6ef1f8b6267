//! Schema node definitions
//!
//! A [`TypeNode`] describes one ASN.1 type: its [`Kind`], an optional
//! [`Tagging`] and an optional name. Constructed kinds refer to their
//! component types through [`TypeId`] handles into the owning schema, so a
//! node never owns another node and recursive types need no special casing.

use crate::ber::types::Tag;
use crate::schema::TypeId;
use crate::value::Value;
use std::fmt;

/// Character and time string types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StringKind {
    Utf8,
    Numeric,
    Printable,
    Teletex,
    Ia5,
    Visible,
    Universal,
    Bmp,
    UtcTime,
    GeneralizedTime,
}

impl StringKind {
    /// Universal tag of the string type
    pub fn tag(self) -> Tag {
        match self {
            StringKind::Utf8 => Tag::UTF8_STRING,
            StringKind::Numeric => Tag::NUMERIC_STRING,
            StringKind::Printable => Tag::PRINTABLE_STRING,
            StringKind::Teletex => Tag::TELETEX_STRING,
            StringKind::Ia5 => Tag::IA5_STRING,
            StringKind::Visible => Tag::VISIBLE_STRING,
            StringKind::Universal => Tag::UNIVERSAL_STRING,
            StringKind::Bmp => Tag::BMP_STRING,
            StringKind::UtcTime => Tag::UTC_TIME,
            StringKind::GeneralizedTime => Tag::GENERALIZED_TIME,
        }
    }

    /// Check if this is UTCTime or GeneralizedTime
    pub fn is_time(self) -> bool {
        matches!(self, StringKind::UtcTime | StringKind::GeneralizedTime)
    }
}

/// Tag applied on top of a type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tagging {
    /// `[tag] EXPLICIT T`: the tag wraps the complete encoding of T
    Explicit(Tag),
    /// `[tag] IMPLICIT T`: the tag replaces the tag of T
    Implicit(Tag),
}

impl Tagging {
    pub fn tag(&self) -> Tag {
        match self {
            Tagging::Explicit(tag) | Tagging::Implicit(tag) => *tag,
        }
    }
}

/// `SIZE (min..max)` constraint on SEQUENCE OF / SET OF
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SizeConstraint {
    pub min: usize,
    pub max: Option<usize>,
}

impl SizeConstraint {
    pub fn contains(&self, count: usize) -> bool {
        count >= self.min && self.max.is_none_or(|max| count <= max)
    }
}

impl fmt::Display for SizeConstraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.max {
            Some(max) => write!(f, "SIZE ({}..{})", self.min, max),
            None => write!(f, "SIZE ({}..MAX)", self.min),
        }
    }
}

/// Presence of a SEQUENCE/SET component
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Presence {
    Required,
    Optional,
    Default(Value),
}

/// Named component of a SEQUENCE or SET
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub name: String,
    pub ty: TypeId,
    pub presence: Presence,
}

impl Field {
    pub fn required(name: impl Into<String>, ty: TypeId) -> Self {
        Self {
            name: name.into(),
            ty,
            presence: Presence::Required,
        }
    }

    pub fn optional(name: impl Into<String>, ty: TypeId) -> Self {
        Self {
            name: name.into(),
            ty,
            presence: Presence::Optional,
        }
    }

    pub fn with_default(name: impl Into<String>, ty: TypeId, default: Value) -> Self {
        Self {
            name: name.into(),
            ty,
            presence: Presence::Default(default),
        }
    }
}

/// Named alternative of a CHOICE
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alternative {
    pub name: String,
    pub ty: TypeId,
}

impl Alternative {
    pub fn new(name: impl Into<String>, ty: TypeId) -> Self {
        Self {
            name: name.into(),
            ty,
        }
    }
}

/// Structural kind of a schema node
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Kind {
    Boolean,
    Integer,
    Enumerated,
    Null,
    BitString,
    OctetString,
    ObjectIdentifier,
    String(StringKind),
    /// Open type: matches any single TLV and keeps it verbatim
    Any,
    Sequence(Vec<Field>),
    Set(Vec<Field>),
    SequenceOf {
        element: TypeId,
        size: Option<SizeConstraint>,
    },
    SetOf {
        element: TypeId,
        size: Option<SizeConstraint>,
    },
    Choice(Vec<Alternative>),
}

impl Kind {
    /// Universal tag of the kind; `None` for CHOICE and ANY
    pub fn universal_tag(&self) -> Option<Tag> {
        let tag = match self {
            Kind::Boolean => Tag::BOOLEAN,
            Kind::Integer => Tag::INTEGER,
            Kind::Enumerated => Tag::ENUMERATED,
            Kind::Null => Tag::NULL,
            Kind::BitString => Tag::BIT_STRING,
            Kind::OctetString => Tag::OCTET_STRING,
            Kind::ObjectIdentifier => Tag::OBJECT_IDENTIFIER,
            Kind::String(kind) => kind.tag(),
            Kind::Sequence(_) | Kind::SequenceOf { .. } => Tag::SEQUENCE,
            Kind::Set(_) | Kind::SetOf { .. } => Tag::SET,
            Kind::Any | Kind::Choice(_) => return None,
        };
        Some(tag)
    }

    /// Whether encodings of this kind are constructed
    pub fn is_constructed(&self) -> bool {
        matches!(
            self,
            Kind::Sequence(_) | Kind::Set(_) | Kind::SequenceOf { .. } | Kind::SetOf { .. }
        )
    }

    /// Whether this kind has no tag of its own
    pub fn is_untagged(&self) -> bool {
        matches!(self, Kind::Any | Kind::Choice(_))
    }

    pub fn name(&self) -> &'static str {
        match self {
            Kind::Boolean => "BOOLEAN",
            Kind::Integer => "INTEGER",
            Kind::Enumerated => "ENUMERATED",
            Kind::Null => "NULL",
            Kind::BitString => "BIT STRING",
            Kind::OctetString => "OCTET STRING",
            Kind::ObjectIdentifier => "OBJECT IDENTIFIER",
            Kind::String(StringKind::UtcTime) => "UTCTime",
            Kind::String(StringKind::GeneralizedTime) => "GeneralizedTime",
            Kind::String(_) => "string",
            Kind::Any => "ANY",
            Kind::Sequence(_) => "SEQUENCE",
            Kind::Set(_) => "SET",
            Kind::SequenceOf { .. } => "SEQUENCE OF",
            Kind::SetOf { .. } => "SET OF",
            Kind::Choice(_) => "CHOICE",
        }
    }
}

/// One type of a schema
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeNode {
    pub name: Option<String>,
    pub kind: Kind,
    pub tagging: Option<Tagging>,
}

impl TypeNode {
    pub fn new(kind: Kind) -> Self {
        Self {
            name: None,
            kind,
            tagging: None,
        }
    }

    pub fn boolean() -> Self {
        Self::new(Kind::Boolean)
    }

    pub fn integer() -> Self {
        Self::new(Kind::Integer)
    }

    pub fn enumerated() -> Self {
        Self::new(Kind::Enumerated)
    }

    pub fn null() -> Self {
        Self::new(Kind::Null)
    }

    pub fn bit_string() -> Self {
        Self::new(Kind::BitString)
    }

    pub fn octet_string() -> Self {
        Self::new(Kind::OctetString)
    }

    pub fn object_identifier() -> Self {
        Self::new(Kind::ObjectIdentifier)
    }

    pub fn string(kind: StringKind) -> Self {
        Self::new(Kind::String(kind))
    }

    pub fn any() -> Self {
        Self::new(Kind::Any)
    }

    pub fn sequence(fields: Vec<Field>) -> Self {
        Self::new(Kind::Sequence(fields))
    }

    pub fn set(fields: Vec<Field>) -> Self {
        Self::new(Kind::Set(fields))
    }

    pub fn sequence_of(element: TypeId) -> Self {
        Self::new(Kind::SequenceOf {
            element,
            size: None,
        })
    }

    pub fn set_of(element: TypeId) -> Self {
        Self::new(Kind::SetOf {
            element,
            size: None,
        })
    }

    pub fn choice(alternatives: Vec<Alternative>) -> Self {
        Self::new(Kind::Choice(alternatives))
    }

    /// Set the type name
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Apply `[tag] EXPLICIT`
    pub fn explicit(mut self, tag: Tag) -> Self {
        self.tagging = Some(Tagging::Explicit(tag));
        self
    }

    /// Apply `[tag] IMPLICIT`
    pub fn implicit(mut self, tag: Tag) -> Self {
        self.tagging = Some(Tagging::Implicit(tag));
        self
    }

    /// Apply a `SIZE` constraint; ignored for kinds other than SEQUENCE OF / SET OF
    pub fn size(mut self, min: usize, max: Option<usize>) -> Self {
        match &mut self.kind {
            Kind::SequenceOf { size, .. } | Kind::SetOf { size, .. } => {
                *size = Some(SizeConstraint { min, max });
            }
            _ => {}
        }
        self
    }

    /// Outer tag of the encoding, if the node has a fixed one
    pub fn outer_tag(&self) -> Option<Tag> {
        match self.tagging {
            Some(tagging) => Some(tagging.tag()),
            None => self.kind.universal_tag(),
        }
    }

    /// Name for log and error messages
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(self.kind.name())
    }
}
