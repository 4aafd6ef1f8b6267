//! ASN.1 type model
//!
//! A [`Schema`] is an arena of [`TypeNode`]s addressed by [`TypeId`]. It is
//! assembled with a [`SchemaBuilder`]: forward-declare a type with
//! [`SchemaBuilder::declare`], refer to its id from other nodes, then
//! [`SchemaBuilder::define`] it. [`SchemaBuilder::finish`] validates the
//! whole graph once and precomputes the tag dispatch tables the binder uses,
//! so a finished schema is immutable and can be shared between threads.
//!
//! # Usage Example
//!
//! ```rust
//! use asn1kit_codec::schema::{Alternative, SchemaBuilder, TypeNode};
//! use asn1kit_codec::ber::Tag;
//!
//! let mut builder = SchemaBuilder::new();
//! let int = builder.add(TypeNode::integer());
//! let text = builder.add(TypeNode::octet_string());
//! let choice = builder.add(
//!     TypeNode::choice(vec![Alternative::new("x", int), Alternative::new("y", text)])
//!         .named("XorY"),
//! );
//! let schema = builder.finish().unwrap();
//! assert_eq!(schema.lookup("XorY"), Some(choice));
//! assert!(schema.tags_of(choice).unwrap().matches(Tag::INTEGER));
//! ```

pub mod types;

pub use types::{Alternative, Field, Kind, Presence, SizeConstraint, StringKind, Tagging, TypeNode};

use crate::ber::types::Tag;
use crate::value::Value;
use asn1kit_core::{Asn1Error, Asn1Result};
use std::collections::{HashMap, HashSet};

/// Handle of a type inside a [`Schema`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeId(usize);

impl TypeId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Outer tags an encoding of a type may start with
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagSet {
    /// Open type: any tag
    Any,
    /// Sorted list of possible tags
    Tags(Vec<Tag>),
}

impl TagSet {
    pub fn matches(&self, tag: Tag) -> bool {
        match self {
            TagSet::Any => true,
            TagSet::Tags(tags) => tags.binary_search(&tag).is_ok(),
        }
    }

    fn overlaps(&self, other: &TagSet) -> bool {
        match (self, other) {
            (TagSet::Any, _) | (_, TagSet::Any) => true,
            (TagSet::Tags(a), TagSet::Tags(b)) => a.iter().any(|tag| b.binary_search(tag).is_ok()),
        }
    }
}

/// Tag-to-component lookup of one CHOICE or SET
#[derive(Debug, Clone, Default)]
pub(crate) struct Dispatch {
    by_tag: HashMap<Tag, usize>,
    wildcard: Option<usize>,
}

impl Dispatch {
    pub(crate) fn find(&self, tag: Tag) -> Option<usize> {
        self.by_tag.get(&tag).copied().or(self.wildcard)
    }
}

/// Incremental schema construction
#[derive(Debug, Default)]
pub struct SchemaBuilder {
    nodes: Vec<Option<TypeNode>>,
    names: HashMap<String, TypeId>,
    errors: Vec<String>,
}

impl SchemaBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forward-declare a named type
    ///
    /// Declaring the same name twice returns the same id.
    pub fn declare(&mut self, name: impl Into<String>) -> TypeId {
        let name = name.into();
        if let Some(&id) = self.names.get(&name) {
            return id;
        }
        let id = TypeId(self.nodes.len());
        self.nodes.push(None);
        self.names.insert(name, id);
        id
    }

    /// Define a previously declared type
    ///
    /// The node inherits the declared name unless it carries its own.
    pub fn define(&mut self, id: TypeId, mut node: TypeNode) -> Asn1Result<()> {
        let declared = self
            .names
            .iter()
            .find(|(_, other)| **other == id)
            .map(|(name, _)| name.clone());
        let slot = self.nodes.get_mut(id.0).ok_or_else(|| {
            Asn1Error::SchemaMismatch(format!("Type id {} was never declared", id.0))
        })?;
        if slot.is_some() {
            return Err(Asn1Error::SchemaMismatch(format!(
                "Type {} is already defined",
                declared.as_deref().unwrap_or("<anonymous>")
            )));
        }
        if node.name.is_none() {
            node.name = declared;
        }
        *slot = Some(node);
        Ok(())
    }

    /// Add a fully specified type and return its id
    ///
    /// A named node is registered for [`Schema::lookup`]; a clashing name is
    /// reported by [`SchemaBuilder::finish`].
    pub fn add(&mut self, node: TypeNode) -> TypeId {
        let id = TypeId(self.nodes.len());
        if let Some(name) = &node.name {
            if self.names.contains_key(name) {
                self.errors.push(format!("Type name {} is used twice", name));
            } else {
                self.names.insert(name.clone(), id);
            }
        }
        self.nodes.push(Some(node));
        id
    }

    /// Add a tagged copy of an already defined type
    ///
    /// Covers `[1] IMPLICIT UniqueIdentifier` or `[0] EXPLICIT Certificate`
    /// where the base type is also used untagged. The copy is not registered
    /// under the base name.
    pub fn tagged(&mut self, base: TypeId, tagging: Tagging) -> Asn1Result<TypeId> {
        let node = self
            .nodes
            .get(base.0)
            .and_then(Option::as_ref)
            .ok_or_else(|| {
                Asn1Error::SchemaMismatch(format!(
                    "Type id {} must be defined before it is tagged",
                    base.0
                ))
            })?;
        if node.tagging.is_some() {
            return Err(Asn1Error::SchemaMismatch(format!(
                "{} already carries a tag",
                node.display_name()
            )));
        }
        let mut copy = node.clone();
        copy.tagging = Some(tagging);
        let id = TypeId(self.nodes.len());
        self.nodes.push(Some(copy));
        Ok(id)
    }

    /// Validate the graph and build the immutable schema
    ///
    /// # Error Handling
    /// Returns `SchemaMismatch` for a declared but undefined type, a dangling
    /// type id, duplicate type or component names, a CHOICE or SET whose
    /// components share a tag, an OPTIONAL/DEFAULT SEQUENCE component whose
    /// tags collide with a following component, a DEFAULT value of the wrong
    /// kind, or a cycle of untagged CHOICEs.
    pub fn finish(self) -> Asn1Result<Schema> {
        if let Some(error) = self.errors.into_iter().next() {
            return Err(Asn1Error::SchemaMismatch(error));
        }

        let mut nodes = Vec::with_capacity(self.nodes.len());
        for (index, node) in self.nodes.into_iter().enumerate() {
            let Some(mut node) = node else {
                let name = self
                    .names
                    .iter()
                    .find(|(_, id)| id.0 == index)
                    .map(|(name, _)| name.as_str())
                    .unwrap_or("<anonymous>");
                return Err(Asn1Error::SchemaMismatch(format!(
                    "Type {} is declared but never defined",
                    name
                )));
            };
            // An implicit tag cannot replace a tag that does not exist
            if let (Some(Tagging::Implicit(tag)), true) = (node.tagging, node.kind.is_untagged()) {
                node.tagging = Some(Tagging::Explicit(tag));
            }
            nodes.push(node);
        }

        for node in &nodes {
            check_references(node, nodes.len())?;
            check_component_names(node)?;
        }

        let mut resolver = TagResolver::new(&nodes);
        let mut tag_sets = Vec::with_capacity(nodes.len());
        for index in 0..nodes.len() {
            tag_sets.push(resolver.resolve(index)?);
        }

        let mut dispatch = Vec::with_capacity(nodes.len());
        for node in &nodes {
            dispatch.push(build_dispatch(node, &tag_sets)?);
            check_sequence_ambiguity(node, &tag_sets)?;
            check_defaults(node, &nodes)?;
        }

        log::debug!(
            "Schema finished: {} types, {} named",
            nodes.len(),
            self.names.len()
        );

        Ok(Schema {
            nodes,
            tag_sets,
            dispatch,
            names: self.names,
        })
    }
}

/// Immutable, validated collection of ASN.1 types
#[derive(Debug, Clone)]
pub struct Schema {
    nodes: Vec<TypeNode>,
    tag_sets: Vec<TagSet>,
    dispatch: Vec<Option<Dispatch>>,
    names: HashMap<String, TypeId>,
}

impl Schema {
    /// Find a named type
    pub fn lookup(&self, name: &str) -> Option<TypeId> {
        self.names.get(name).copied()
    }

    /// Get the node of a type
    pub fn node(&self, id: TypeId) -> Option<&TypeNode> {
        self.nodes.get(id.0)
    }

    /// Outer tags the encoding of a type can start with
    pub fn tags_of(&self, id: TypeId) -> Option<&TagSet> {
        self.tag_sets.get(id.0)
    }

    /// Number of types in the schema
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub(crate) fn resolve(&self, id: TypeId) -> Asn1Result<&TypeNode> {
        self.node(id).ok_or_else(|| {
            Asn1Error::SchemaMismatch(format!("Type id {} does not belong to this schema", id.0))
        })
    }

    pub(crate) fn tag_set(&self, id: TypeId) -> &TagSet {
        &self.tag_sets[id.0]
    }

    pub(crate) fn dispatch(&self, id: TypeId) -> Asn1Result<&Dispatch> {
        self.dispatch
            .get(id.0)
            .and_then(Option::as_ref)
            .ok_or_else(|| {
                Asn1Error::SchemaMismatch(format!("Type id {} has no dispatch table", id.0))
            })
    }
}

fn referenced_ids(kind: &Kind) -> Vec<TypeId> {
    match kind {
        Kind::Sequence(fields) | Kind::Set(fields) => fields.iter().map(|f| f.ty).collect(),
        Kind::SequenceOf { element, .. } | Kind::SetOf { element, .. } => vec![*element],
        Kind::Choice(alternatives) => alternatives.iter().map(|a| a.ty).collect(),
        _ => Vec::new(),
    }
}

fn check_references(node: &TypeNode, count: usize) -> Asn1Result<()> {
    for id in referenced_ids(&node.kind) {
        if id.0 >= count {
            return Err(Asn1Error::SchemaMismatch(format!(
                "{} refers to unknown type id {}",
                node.display_name(),
                id.0
            )));
        }
    }
    Ok(())
}

fn check_component_names(node: &TypeNode) -> Asn1Result<()> {
    let names: Vec<&str> = match &node.kind {
        Kind::Sequence(fields) | Kind::Set(fields) => fields.iter().map(|f| f.name.as_str()).collect(),
        Kind::Choice(alternatives) => alternatives.iter().map(|a| a.name.as_str()).collect(),
        _ => return Ok(()),
    };
    let mut seen = HashSet::new();
    for name in names {
        if !seen.insert(name) {
            return Err(Asn1Error::SchemaMismatch(format!(
                "{} has two components named {}",
                node.display_name(),
                name
            )));
        }
    }
    Ok(())
}

/// Resolves outer tag sets, following untagged CHOICE alternatives
struct TagResolver<'n> {
    nodes: &'n [TypeNode],
    resolved: Vec<Option<TagSet>>,
    in_progress: Vec<bool>,
}

impl<'n> TagResolver<'n> {
    fn new(nodes: &'n [TypeNode]) -> Self {
        Self {
            nodes,
            resolved: vec![None; nodes.len()],
            in_progress: vec![false; nodes.len()],
        }
    }

    fn resolve(&mut self, index: usize) -> Asn1Result<TagSet> {
        if let Some(set) = &self.resolved[index] {
            return Ok(set.clone());
        }
        let node = &self.nodes[index];
        if self.in_progress[index] {
            return Err(Asn1Error::SchemaMismatch(format!(
                "Untagged CHOICE {} contains itself without an intervening tag",
                node.display_name()
            )));
        }

        let set = if let Some(tag) = node.outer_tag() {
            TagSet::Tags(vec![tag])
        } else {
            match &node.kind {
                Kind::Choice(alternatives) => {
                    self.in_progress[index] = true;
                    let mut tags = Vec::new();
                    let mut any = false;
                    for alternative in alternatives {
                        match self.resolve(alternative.ty.0)? {
                            TagSet::Any => any = true,
                            TagSet::Tags(alt_tags) => tags.extend(alt_tags),
                        }
                    }
                    self.in_progress[index] = false;
                    if any {
                        TagSet::Any
                    } else {
                        tags.sort();
                        tags.dedup();
                        TagSet::Tags(tags)
                    }
                }
                _ => TagSet::Any,
            }
        };

        self.resolved[index] = Some(set.clone());
        Ok(set)
    }
}

fn build_dispatch(node: &TypeNode, tag_sets: &[TagSet]) -> Asn1Result<Option<Dispatch>> {
    let components: Vec<(&str, TypeId)> = match &node.kind {
        Kind::Choice(alternatives) => alternatives.iter().map(|a| (a.name.as_str(), a.ty)).collect(),
        Kind::Set(fields) => fields.iter().map(|f| (f.name.as_str(), f.ty)).collect(),
        _ => return Ok(None),
    };

    let mut dispatch = Dispatch::default();
    for (index, (name, ty)) in components.into_iter().enumerate() {
        match &tag_sets[ty.0] {
            TagSet::Any => {
                if dispatch.wildcard.replace(index).is_some() {
                    return Err(Asn1Error::SchemaMismatch(format!(
                        "{} has more than one open-type component",
                        node.display_name()
                    )));
                }
            }
            TagSet::Tags(tags) => {
                for &tag in tags {
                    if dispatch.by_tag.insert(tag, index).is_some() {
                        return Err(Asn1Error::SchemaMismatch(format!(
                            "{} is ambiguous: tag {} is used by {} and another component",
                            node.display_name(),
                            tag,
                            name
                        )));
                    }
                }
            }
        }
    }
    Ok(Some(dispatch))
}

fn check_sequence_ambiguity(node: &TypeNode, tag_sets: &[TagSet]) -> Asn1Result<()> {
    let Kind::Sequence(fields) = &node.kind else {
        return Ok(());
    };
    for (i, field) in fields.iter().enumerate() {
        if field.presence == Presence::Required {
            continue;
        }
        for next in &fields[i + 1..] {
            if tag_sets[field.ty.0].overlaps(&tag_sets[next.ty.0]) {
                return Err(Asn1Error::SchemaMismatch(format!(
                    "{}: optional component {} cannot be told apart from {}",
                    node.display_name(),
                    field.name,
                    next.name
                )));
            }
            if next.presence == Presence::Required {
                break;
            }
        }
    }
    Ok(())
}

fn check_defaults(node: &TypeNode, nodes: &[TypeNode]) -> Asn1Result<()> {
    let (Kind::Sequence(fields) | Kind::Set(fields)) = &node.kind else {
        return Ok(());
    };
    for field in fields {
        if let Presence::Default(value) = &field.presence
            && !default_fits(&nodes[field.ty.0].kind, value)
        {
            return Err(Asn1Error::SchemaMismatch(format!(
                "{}: DEFAULT of {} is a {} value",
                node.display_name(),
                field.name,
                value.kind_name()
            )));
        }
    }
    Ok(())
}

fn default_fits(kind: &Kind, value: &Value) -> bool {
    matches!(
        (kind, value),
        (Kind::Boolean, Value::Boolean(_))
            | (Kind::Integer, Value::Integer(_))
            | (Kind::Enumerated, Value::Enumerated(_))
            | (Kind::Null, Value::Null)
            | (Kind::BitString, Value::BitString(_))
            | (Kind::OctetString, Value::OctetString(_))
            | (Kind::ObjectIdentifier, Value::ObjectIdentifier(_))
            | (Kind::String(_), Value::String(_))
            | (Kind::Any, Value::Any(_))
            | (Kind::Sequence(_), Value::Sequence(_))
            | (Kind::Set(_), Value::Set(_))
            | (Kind::SequenceOf { .. }, Value::SequenceOf(_))
            | (Kind::SetOf { .. }, Value::SetOf(_))
            | (Kind::Choice(_), Value::Choice { .. })
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forward_declaration() {
        // Node ::= SEQUENCE { value INTEGER, next [0] EXPLICIT Node OPTIONAL }
        let mut builder = SchemaBuilder::new();
        let node = builder.declare("Node");
        let int = builder.add(TypeNode::integer());
        let next = builder.add(TypeNode::sequence_of(node).explicit(Tag::context_specific(0)));
        builder
            .define(
                node,
                TypeNode::sequence(vec![Field::required("value", int), Field::optional("next", next)]),
            )
            .unwrap();
        let schema = builder.finish().unwrap();

        assert_eq!(schema.lookup("Node"), Some(node));
        assert_eq!(schema.node(node).unwrap().name.as_deref(), Some("Node"));
        assert_eq!(schema.tags_of(node), Some(&TagSet::Tags(vec![Tag::SEQUENCE])));
    }

    #[test]
    fn test_undefined_declaration() {
        let mut builder = SchemaBuilder::new();
        builder.declare("Missing");
        assert!(matches!(builder.finish(), Err(Asn1Error::SchemaMismatch(_))));
    }

    #[test]
    fn test_define_twice() {
        let mut builder = SchemaBuilder::new();
        let id = builder.declare("T");
        builder.define(id, TypeNode::integer()).unwrap();
        assert!(builder.define(id, TypeNode::boolean()).is_err());
    }

    #[test]
    fn test_duplicate_name() {
        let mut builder = SchemaBuilder::new();
        builder.add(TypeNode::integer().named("T"));
        builder.add(TypeNode::boolean().named("T"));
        assert!(matches!(builder.finish(), Err(Asn1Error::SchemaMismatch(_))));
    }

    #[test]
    fn test_untagged_choice_tag_union() {
        let mut builder = SchemaBuilder::new();
        let utc = builder.add(TypeNode::string(StringKind::UtcTime));
        let generalized = builder.add(TypeNode::string(StringKind::GeneralizedTime));
        let time = builder.add(TypeNode::choice(vec![
            Alternative::new("utcTime", utc),
            Alternative::new("generalTime", generalized),
        ]));
        let schema = builder.finish().unwrap();
        assert_eq!(
            schema.tags_of(time),
            Some(&TagSet::Tags(vec![Tag::UTC_TIME, Tag::GENERALIZED_TIME]))
        );
        let dispatch = schema.dispatch(time).unwrap();
        assert_eq!(dispatch.find(Tag::GENERALIZED_TIME), Some(1));
        assert_eq!(dispatch.find(Tag::INTEGER), None);
    }

    #[test]
    fn test_ambiguous_choice() {
        let mut builder = SchemaBuilder::new();
        let a = builder.add(TypeNode::integer());
        let b = builder.add(TypeNode::integer());
        builder.add(TypeNode::choice(vec![Alternative::new("a", a), Alternative::new("b", b)]));
        assert!(matches!(builder.finish(), Err(Asn1Error::SchemaMismatch(_))));
    }

    #[test]
    fn test_untagged_choice_cycle() {
        let mut builder = SchemaBuilder::new();
        let choice = builder.declare("Loop");
        let int = builder.add(TypeNode::integer());
        builder
            .define(
                choice,
                TypeNode::choice(vec![Alternative::new("again", choice), Alternative::new("int", int)]),
            )
            .unwrap();
        assert!(matches!(builder.finish(), Err(Asn1Error::SchemaMismatch(_))));
    }

    #[test]
    fn test_implicit_choice_becomes_explicit() {
        let mut builder = SchemaBuilder::new();
        let int = builder.add(TypeNode::integer());
        let choice = builder.add(
            TypeNode::choice(vec![Alternative::new("int", int)]).implicit(Tag::context_specific(3)),
        );
        let schema = builder.finish().unwrap();
        assert_eq!(
            schema.node(choice).unwrap().tagging,
            Some(Tagging::Explicit(Tag::context_specific(3)))
        );
    }

    #[test]
    fn test_optional_field_ambiguity() {
        let mut builder = SchemaBuilder::new();
        let int = builder.add(TypeNode::integer());
        builder.add(TypeNode::sequence(vec![
            Field::optional("a", int),
            Field::required("b", int),
        ]));
        assert!(matches!(builder.finish(), Err(Asn1Error::SchemaMismatch(_))));
    }

    #[test]
    fn test_default_kind_checked() {
        let mut builder = SchemaBuilder::new();
        let flag = builder.add(TypeNode::boolean());
        builder.add(TypeNode::sequence(vec![Field::with_default(
            "critical",
            flag,
            Value::integer(0),
        )]));
        assert!(matches!(builder.finish(), Err(Asn1Error::SchemaMismatch(_))));
    }

    #[test]
    fn test_tagged_copy() {
        let mut builder = SchemaBuilder::new();
        let bits = builder.add(TypeNode::bit_string().named("UniqueIdentifier"));
        let tagged = builder
            .tagged(bits, Tagging::Implicit(Tag::context_specific(1)))
            .unwrap();
        assert!(builder.tagged(tagged, Tagging::Explicit(Tag::context_specific(2))).is_err());
        let schema = builder.finish().unwrap();

        assert_eq!(schema.lookup("UniqueIdentifier"), Some(bits));
        assert_eq!(schema.tags_of(bits), Some(&TagSet::Tags(vec![Tag::BIT_STRING])));
        assert_eq!(
            schema.tags_of(tagged),
            Some(&TagSet::Tags(vec![Tag::context_specific(1)]))
        );
    }

    #[test]
    fn test_schema_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Schema>();
    }
}
