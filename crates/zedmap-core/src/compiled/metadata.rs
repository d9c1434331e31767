//! Polymorphic metadata messages attached to compiled definitions.
//!
//! Each message is a type URL plus an encoded payload, the way compiled
//! namespaces carry `Any` messages. Only two payload types matter to the
//! relation map: documentation comments and the relation kind marker. Other
//! types are skipped.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::annotations;
use crate::errors::{ZedmapError, ZedmapResult};
use crate::model::{Metadata, RelationKind};

pub const DOC_COMMENT_TYPE_URL: &str = "type.googleapis.com/impl.v1.DocComment";
pub const RELATION_METADATA_TYPE_URL: &str = "type.googleapis.com/impl.v1.RelationMetadata";

/// Metadata attached to a definition or relation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetadataBlock {
    pub messages: Vec<MetadataMessage>,
}

impl MetadataBlock {
    pub fn push(&mut self, payload: &MetadataPayload) {
        self.messages.push(MetadataMessage::encode(payload));
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

/// An encoded metadata message.
#[derive(Debug, Clone, PartialEq)]
pub struct MetadataMessage {
    pub type_url: String,
    pub value: Value,
}

/// `impl.v1.DocComment`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocComment {
    pub comment: String,
}

/// `impl.v1.RelationMetadata`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationMetadata {
    pub kind: RelationKind,
}

/// Decoded form of a metadata message.
#[derive(Debug, Clone, PartialEq)]
pub enum MetadataPayload {
    DocComment(DocComment),
    Relation(RelationMetadata),
    /// A message type the relation map does not consume.
    Unrecognized(String),
}

impl MetadataMessage {
    pub fn encode(payload: &MetadataPayload) -> Self {
        match payload {
            MetadataPayload::DocComment(dc) => Self {
                type_url: DOC_COMMENT_TYPE_URL.to_string(),
                value: serde_json::json!({ "comment": dc.comment }),
            },
            MetadataPayload::Relation(rm) => Self {
                type_url: RELATION_METADATA_TYPE_URL.to_string(),
                value: serde_json::json!({ "kind": rm.kind.as_str() }),
            },
            MetadataPayload::Unrecognized(type_url) => Self {
                type_url: type_url.clone(),
                value: Value::Null,
            },
        }
    }

    /// Decode the payload according to its type URL.
    ///
    /// A known type whose payload does not decode is an error; unknown types
    /// decode to `MetadataPayload::Unrecognized`.
    pub fn decode(&self) -> ZedmapResult<MetadataPayload> {
        match self.type_url.as_str() {
            DOC_COMMENT_TYPE_URL => serde_json::from_value(self.value.clone())
                .map(MetadataPayload::DocComment)
                .map_err(|e| ZedmapError::decode(&self.type_url, e.to_string())),
            RELATION_METADATA_TYPE_URL => serde_json::from_value(self.value.clone())
                .map(MetadataPayload::Relation)
                .map_err(|e| ZedmapError::decode(&self.type_url, e.to_string())),
            other => Ok(MetadataPayload::Unrecognized(other.to_string())),
        }
    }
}

/// Decode a metadata block into relation map `Metadata` and the relation kind.
///
/// When several doc comments are attached the last one wins. The kind is
/// `RelationKind::Unspecified` when no kind marker is present.
pub fn extract_metadata(block: &MetadataBlock) -> ZedmapResult<(Metadata, RelationKind)> {
    let mut comment = String::new();
    let mut kind = RelationKind::Unspecified;

    for msg in &block.messages {
        match msg.decode()? {
            MetadataPayload::DocComment(dc) => {
                comment = annotations::strip_decoration(&dc.comment);
            }
            MetadataPayload::Relation(rm) => kind = rm.kind,
            MetadataPayload::Unrecognized(type_url) => {
                tracing::debug!(%type_url, "skipping unrecognized metadata message");
            }
        }
    }

    let mut md = Metadata {
        comment,
        ..Default::default()
    };
    annotations::apply_attributes(&mut md);

    Ok((md, kind))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::AttributeValue;
    use assert_matches::assert_matches;

    fn doc(comment: &str) -> MetadataPayload {
        MetadataPayload::DocComment(DocComment {
            comment: comment.to_string(),
        })
    }

    #[test]
    fn extracts_comment_and_kind() {
        let mut block = MetadataBlock::default();
        block.push(&doc("/** @attr hidden\n * the owner\n */"));
        block.push(&MetadataPayload::Relation(RelationMetadata {
            kind: RelationKind::Relation,
        }));

        let (md, kind) = extract_metadata(&block).unwrap();
        assert_eq!(kind, RelationKind::Relation);
        assert_eq!(md.comment, "the owner");
        assert_eq!(md.attributes["hidden"], AttributeValue::Bool(true));
    }

    #[test]
    fn last_doc_comment_wins() {
        let mut block = MetadataBlock::default();
        block.push(&doc("// first"));
        block.push(&doc("// second"));

        let (md, kind) = extract_metadata(&block).unwrap();
        assert_eq!(md.comment, "second");
        assert_eq!(kind, RelationKind::Unspecified);
    }

    #[test]
    fn unrecognized_messages_are_skipped() {
        let block = MetadataBlock {
            messages: vec![MetadataMessage {
                type_url: "type.googleapis.com/impl.v1.TypeAnnotations".to_string(),
                value: serde_json::json!({ "types": ["x"] }),
            }],
        };
        let (md, kind) = extract_metadata(&block).unwrap();
        assert_eq!(md, Metadata::default());
        assert_eq!(kind, RelationKind::Unspecified);
    }

    #[test]
    fn corrupt_known_message_is_fatal() {
        let block = MetadataBlock {
            messages: vec![MetadataMessage {
                type_url: RELATION_METADATA_TYPE_URL.to_string(),
                value: serde_json::json!({ "kind": 7 }),
            }],
        };
        assert_matches!(extract_metadata(&block), Err(ZedmapError::Decode { .. }));
    }
}
