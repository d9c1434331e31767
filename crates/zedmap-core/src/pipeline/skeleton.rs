//! First pass: the entity/relation skeleton.

use crate::compiled::{extract_metadata, AllowedRelation, AllowedTarget, CompiledSchema, ELLIPSIS};
use crate::errors::ZedmapResult;
use crate::model::{Entity, EntityMap, Relation, RelationTuple};

use super::{PipelineContext, Stage};

/// Creates one `Entity` per object definition and one `Relation` per relation
/// or permission, with metadata and allowed direct types. Downstream
/// permissions are left empty.
pub struct BuildSkeletonStage;

impl Stage for BuildSkeletonStage {
    fn id(&self) -> &str {
        "graph.skeleton"
    }

    fn run(
        &self,
        _ctx: &mut PipelineContext,
        schema: &CompiledSchema,
        entities: &mut EntityMap,
    ) -> ZedmapResult<()> {
        for def in &schema.object_definitions {
            let (metadata, _) = extract_metadata(&def.metadata)?;
            let mut entity = Entity::new(metadata);

            for rel in &def.relations {
                let (metadata, kind) = extract_metadata(&rel.metadata)?;
                let allowed_direct_relations = rel
                    .allowed_direct_relations
                    .iter()
                    .map(allowed_to_tuple)
                    .collect();

                tracing::trace!(entity = %def.name, relation = %rel.name, %kind, "adding relation");
                entity.relations.insert(
                    rel.name.clone(),
                    Relation {
                        kind,
                        metadata,
                        downstream_permissions: Vec::new(),
                        allowed_direct_relations,
                    },
                );
            }

            tracing::debug!(entity = %def.name, relations = entity.relations.len(), "built entity");
            entities.insert(def.name.clone(), entity);
        }

        Ok(())
    }
}

/// `ns#rel` → `(ns, rel)`, `ns` / `ns#...` → `(ns, "")`, `ns:*` → `(ns, "*")`.
pub fn allowed_to_tuple(allowed: &AllowedRelation) -> RelationTuple {
    match &allowed.target {
        AllowedTarget::Relation(rel) if rel == ELLIPSIS => {
            RelationTuple::new(allowed.namespace.clone(), "")
        }
        AllowedTarget::Relation(rel) => RelationTuple::new(allowed.namespace.clone(), rel.clone()),
        AllowedTarget::PublicWildcard => RelationTuple::new(allowed.namespace.clone(), "*"),
    }
}
