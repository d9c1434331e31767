//! Relation map data model.
//!
//! These types are the output of the pipeline and the shape of the JSON/YAML
//! documents written by the CLI. Field names on the wire are stable:
//!
//! ```yaml
//! entities:
//!   document:
//!     relations:
//!       viewer:
//!         type: RELATION
//!         metadata: { comment: "", attributes: {} }
//!         downstreamPermissions: [{ entity: document, relation: view }]
//!         allowedDirectRelations: [{ entity: user }]
//!     metadata: { comment: "", attributes: {} }
//! schemaHash: 5f2c...
//! warnings: [...]
//! ```
//!
//! Maps are `BTreeMap` so iteration (and therefore permission resolution and
//! serialization) is sorted by name.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Entities keyed by definition name.
pub type EntityMap = BTreeMap<String, Entity>;

/// Root result of parsing a schema.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedSchema {
    pub entities: EntityMap,
    pub schema_hash: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

/// A named object type.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub relations: BTreeMap<String, Relation>,
    pub metadata: Metadata,
}

impl Entity {
    pub fn new(metadata: Metadata) -> Self {
        Self {
            relations: BTreeMap::new(),
            metadata,
        }
    }
}

/// A relation or permission on an entity.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Relation {
    #[serde(rename = "type")]
    pub kind: RelationKind,
    pub metadata: Metadata,
    /// Permissions, possibly on other entities, ultimately backed by this
    /// relation. Populated only by the resolver; duplicates are kept.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub downstream_permissions: Vec<RelationTuple>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub allowed_direct_relations: Vec<RelationTuple>,
}

impl Relation {
    pub fn is_base_relation(&self) -> bool {
        self.kind == RelationKind::Relation
    }
}

/// Kind marker carried by relation metadata.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RelationKind {
    /// No kind metadata was attached.
    #[default]
    #[serde(rename = "")]
    Unspecified,
    #[serde(rename = "UNKNOWN_KIND")]
    Unknown,
    #[serde(rename = "RELATION")]
    Relation,
    #[serde(rename = "PERMISSION")]
    Permission,
}

impl RelationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unspecified => "",
            Self::Unknown => "UNKNOWN_KIND",
            Self::Relation => "RELATION",
            Self::Permission => "PERMISSION",
        }
    }
}

impl fmt::Display for RelationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An `(entity, relation)` pair.
///
/// An empty relation denotes an ellipsis reference (`user` / `user#...`),
/// `*` a public wildcard (`user:*`).
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RelationTuple {
    pub entity: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub relation: String,
}

impl RelationTuple {
    pub fn new(entity: impl Into<String>, relation: impl Into<String>) -> Self {
        Self {
            entity: entity.into(),
            relation: relation.into(),
        }
    }

    /// Both sides are non-empty.
    pub fn is_complete(&self) -> bool {
        !self.entity.is_empty() && !self.relation.is_empty()
    }
}

impl fmt::Display for RelationTuple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.relation.is_empty() {
            write!(f, "{}", self.entity)
        } else {
            write!(f, "{}#{}", self.entity, self.relation)
        }
    }
}

/// Documentation and annotations attached to an entity or relation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    pub comment: String,
    pub attributes: BTreeMap<String, AttributeValue>,
}

/// An `@attr` value: bare names are `true`, `name=value` is a string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    Bool(bool),
    String(String),
}

impl AttributeValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            Self::Bool(_) => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            Self::String(_) => None,
        }
    }
}

impl From<bool> for AttributeValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<&str> for AttributeValue {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl ParsedSchema {
    pub fn entity(&self, name: &str) -> Option<&Entity> {
        self.entities.get(name)
    }

    pub fn relation(&self, entity: &str, relation: &str) -> Option<&Relation> {
        self.entities.get(entity)?.relations.get(relation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn empty_lists_and_relation_are_omitted() {
        let mut entity = Entity::default();
        entity.relations.insert(
            "owner".to_string(),
            Relation {
                kind: RelationKind::Relation,
                allowed_direct_relations: vec![RelationTuple::new("user", "")],
                ..Default::default()
            },
        );
        let mut schema = ParsedSchema {
            schema_hash: "00".to_string(),
            ..Default::default()
        };
        schema.entities.insert("doc".to_string(), entity);

        let v = serde_json::to_value(&schema).unwrap();
        assert_eq!(
            v,
            json!({
                "entities": {
                    "doc": {
                        "relations": {
                            "owner": {
                                "type": "RELATION",
                                "metadata": { "comment": "", "attributes": {} },
                                "allowedDirectRelations": [{ "entity": "user" }]
                            }
                        },
                        "metadata": { "comment": "", "attributes": {} }
                    }
                },
                "schemaHash": "00"
            })
        );
    }

    #[test]
    fn attribute_values_are_untagged() {
        let mut md = Metadata::default();
        md.attributes.insert("flag".into(), true.into());
        md.attributes.insert("key".into(), "a=b".into());
        let v = serde_json::to_value(&md).unwrap();
        assert_eq!(v["attributes"]["flag"], json!(true));
        assert_eq!(v["attributes"]["key"], json!("a=b"));

        let back: Metadata = serde_json::from_value(v).unwrap();
        assert_eq!(back, md);
    }

    #[test]
    fn unspecified_kind_serializes_empty() {
        assert_eq!(serde_json::to_value(RelationKind::Unspecified).unwrap(), json!(""));
        assert_eq!(serde_json::to_value(RelationKind::Permission).unwrap(), json!("PERMISSION"));
    }

    #[test]
    fn tuple_display() {
        assert_eq!(RelationTuple::new("user", "").to_string(), "user");
        assert_eq!(RelationTuple::new("group", "member").to_string(), "group#member");
    }
}
