//! Compiled schema object model.
//!
//! This is the representation a schema compiler hands to the relation map
//! pipeline: object definitions, their relations, rewrite-rule trees and
//! allowed direct types, with polymorphic metadata messages attached to
//! definitions and relations.
//!
//! The model mirrors the shape of compiled SpiceDB namespace definitions so
//! that other compilers can target it. It carries no validation logic; the
//! compiler is expected to reject malformed schemas before producing it.

use std::fmt;

pub mod metadata;

pub use metadata::{
    extract_metadata, DocComment, MetadataBlock, MetadataMessage, MetadataPayload,
    RelationMetadata, DOC_COMMENT_TYPE_URL, RELATION_METADATA_TYPE_URL,
};

/// Ellipsis relation name, meaning "the subject itself" in an allowed type.
pub const ELLIPSIS: &str = "...";

/// A compiled schema.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompiledSchema {
    pub object_definitions: Vec<ObjectDefinition>,
}

impl CompiledSchema {
    pub fn definition(&self, name: &str) -> Option<&ObjectDefinition> {
        self.object_definitions.iter().find(|d| d.name == name)
    }
}

/// A `definition` block.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObjectDefinition {
    pub name: String,
    pub metadata: MetadataBlock,
    pub relations: Vec<RelationDefinition>,
}

impl ObjectDefinition {
    pub fn relation(&self, name: &str) -> Option<&RelationDefinition> {
        self.relations.iter().find(|r| r.name == name)
    }
}

/// A `relation` or `permission` inside a definition.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RelationDefinition {
    pub name: String,
    pub metadata: MetadataBlock,
    /// Set for permissions.
    pub rewrite: Option<UsersetRewrite>,
    /// Allowed direct types. Empty for permissions.
    pub allowed_direct_relations: Vec<AllowedRelation>,
}

/// One allowed direct subject type of a relation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllowedRelation {
    pub namespace: String,
    pub target: AllowedTarget,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AllowedTarget {
    /// `ns#rel`, or `ns` alone as the ellipsis relation `...`.
    Relation(String),
    /// `ns:*`
    PublicWildcard,
}

impl AllowedRelation {
    pub fn relation(namespace: impl Into<String>, relation: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            target: AllowedTarget::Relation(relation.into()),
        }
    }

    pub fn ellipsis(namespace: impl Into<String>) -> Self {
        Self::relation(namespace, ELLIPSIS)
    }

    pub fn wildcard(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            target: AllowedTarget::PublicWildcard,
        }
    }
}

/// A rewrite-rule tree root.
#[derive(Debug, Clone, PartialEq)]
pub enum UsersetRewrite {
    Union(SetOperation),
    Intersection(SetOperation),
    Exclusion(SetOperation),
}

impl UsersetRewrite {
    pub fn operation(&self) -> &SetOperation {
        match self {
            Self::Union(op) | Self::Intersection(op) | Self::Exclusion(op) => op,
        }
    }

    fn tag(&self) -> &'static str {
        match self {
            Self::Union(_) => "union",
            Self::Intersection(_) => "intersection",
            Self::Exclusion(_) => "exclusion",
        }
    }
}

/// Ordered children of a set operation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SetOperation {
    pub children: Vec<SetChild>,
}

impl SetOperation {
    pub fn new(children: Vec<SetChild>) -> Self {
        Self { children }
    }
}

/// One term of a set operation.
#[derive(Debug, Clone, PartialEq)]
pub enum SetChild {
    /// The relation's own direct subjects.
    This,
    /// Another relation or permission on the same definition.
    ComputedUserset { relation: String },
    /// `tupleset->computed`: walk `tupleset`, then evaluate `computed` on
    /// whatever it points at.
    TupleToUserset { tupleset: String, computed: String },
    /// A parenthesised sub-expression with a different operator.
    Rewrite(Box<UsersetRewrite>),
    /// The empty set.
    Nil,
}

impl SetChild {
    pub fn computed(relation: impl Into<String>) -> Self {
        Self::ComputedUserset {
            relation: relation.into(),
        }
    }

    pub fn arrow(tupleset: impl Into<String>, computed: impl Into<String>) -> Self {
        Self::TupleToUserset {
            tupleset: tupleset.into(),
            computed: computed.into(),
        }
    }
}

// Text rendering used in warnings, modelled on protobuf text format so the raw
// term is recognizable to anyone who has looked at compiled namespaces.

impl fmt::Display for SetChild {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::This => f.write_str("_this:{}"),
            Self::ComputedUserset { relation } => {
                write!(f, "computed_userset:{{relation:{relation:?}}}")
            }
            Self::TupleToUserset { tupleset, computed } => write!(
                f,
                "tuple_to_userset:{{tupleset:{{relation:{tupleset:?}}} computed_userset:{{relation:{computed:?}}}}}"
            ),
            Self::Rewrite(rw) => write!(f, "userset_rewrite:{{{rw}}}"),
            Self::Nil => f.write_str("_nil:{}"),
        }
    }
}

impl fmt::Display for UsersetRewrite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{{", self.tag())?;
        for (i, child) in self.operation().children.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "child:{{{child}}}")?;
        }
        f.write_str("}")
    }
}
