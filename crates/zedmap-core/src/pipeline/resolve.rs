//! Second pass: downstream permission resolution.
//!
//! For every permission defined as a union, each term is turned into the
//! `(entity, relation)` it references, that reference is resolved to the base
//! relations behind it, and the permission is appended to each of those base
//! relations' `downstream_permissions`.
//!
//! Permissions are visited sorted by entity name, then relation name. In
//! `ResolutionMode::SinglePass` a reference to another permission is resolved
//! by looking for base relations that already list that permission as
//! downstream, so a permission only picks up links created by permissions
//! visited before it. `ResolutionMode::Closure` expands the referenced
//! permission's own union terms instead and does not depend on order.

use std::collections::BTreeMap;

use crate::compiled::{CompiledSchema, SetChild, SetOperation, UsersetRewrite};
use crate::config::{ResolutionMode, ResolverConfig, TuplesetResolution};
use crate::errors::{ZedmapError, ZedmapResult};
use crate::model::{EntityMap, RelationTuple};

use super::{codes, PipelineContext, Stage};

pub struct ResolvePermissionsStage;

impl Stage for ResolvePermissionsStage {
    fn id(&self) -> &str {
        "graph.resolve"
    }

    fn run(
        &self,
        ctx: &mut PipelineContext,
        schema: &CompiledSchema,
        entities: &mut EntityMap,
    ) -> ZedmapResult<()> {
        let rewrites = RewriteIndex::new(schema);
        let config = ctx.config.resolver;
        tracing::debug!(
            mode = config.mode.as_str(),
            tupleset = config.tupleset.as_str(),
            "resolving downstream permissions"
        );

        for (name, rewrite) in rewrites.sorted() {
            let (entity, relation) = (name.entity.as_str(), name.relation.as_str());
            match rewrite {
                UsersetRewrite::Union(op) => {
                    resolve_union(ctx, &rewrites, entities, config, entity, relation, op)?;
                }
                UsersetRewrite::Intersection(_) => ctx.push_warning(
                    codes::UNSUPPORTED_INTERSECTION,
                    format!(
                        "{entity}->{relation}: intersections (& operator) are currently not supported"
                    ),
                ),
                UsersetRewrite::Exclusion(_) => ctx.push_warning(
                    codes::UNSUPPORTED_EXCLUSION,
                    format!(
                        "{entity}->{relation}: exclusions (- operator) are currently not supported"
                    ),
                ),
            }
        }

        Ok(())
    }
}

fn resolve_union(
    ctx: &mut PipelineContext,
    rewrites: &RewriteIndex<'_>,
    entities: &mut EntityMap,
    config: ResolverConfig,
    entity: &str,
    relation: &str,
    op: &SetOperation,
) -> ZedmapResult<()> {
    let permission = RelationTuple::new(entity, relation);

    for child in &op.children {
        let targets = reference_tuples(entities, config.tupleset, entity, child);
        if targets.is_empty() {
            ctx.push_warning(
                codes::UNRESOLVED_UNION_TERM,
                format!(
                    "{entity}->{relation}: could not determine reference tuple from union type: {child}"
                ),
            );
            continue;
        }

        let mut bases = Vec::new();
        for target in &targets {
            let mut path = Vec::new();
            match config.mode {
                ResolutionMode::SinglePass => {
                    resolve_single_pass(entities, target, &mut path, &mut bases)
                }
                ResolutionMode::Closure => {
                    resolve_closure(entities, rewrites, config, target, &mut path, &mut bases)
                }
            }
        }

        tracing::trace!(
            permission = %permission,
            term = %child,
            bases = bases.len(),
            "resolved union term"
        );

        for base in bases {
            let rel = entities
                .get_mut(&base.entity)
                .and_then(|e| e.relations.get_mut(&base.relation))
                .ok_or_else(|| {
                    ZedmapError::invariant(format!("resolved relation {base} is not in the map"))
                })?;
            rel.downstream_permissions.push(permission.clone());
        }
    }

    Ok(())
}

/// The `(entity, relation)` pairs a union term refers to. Empty when the term
/// cannot be resolved to a complete pair.
pub fn reference_tuples(
    entities: &EntityMap,
    tupleset_mode: TuplesetResolution,
    entity: &str,
    child: &SetChild,
) -> Vec<RelationTuple> {
    let tuples = match child {
        SetChild::ComputedUserset { relation } => vec![RelationTuple::new(entity, relation.as_str())],
        SetChild::TupleToUserset { tupleset, computed } => match tupleset_mode {
            TuplesetResolution::RelationName => {
                vec![RelationTuple::new(tupleset.as_str(), computed.as_str())]
            }
            TuplesetResolution::AllowedTypes => {
                let mut out: Vec<RelationTuple> = Vec::new();
                let allowed = entities
                    .get(entity)
                    .and_then(|e| e.relations.get(tupleset))
                    .map(|r| r.allowed_direct_relations.as_slice())
                    .unwrap_or_default();
                for subject in allowed {
                    if !out.iter().any(|t| t.entity == subject.entity) {
                        out.push(RelationTuple::new(subject.entity.as_str(), computed.as_str()));
                    }
                }
                out
            }
        },
        SetChild::This | SetChild::Nil | SetChild::Rewrite(_) => Vec::new(),
    };

    if tuples.iter().all(RelationTuple::is_complete) {
        tuples
    } else {
        Vec::new()
    }
}

/// Resolve `tuple` to base relations using the downstream links recorded so
/// far.
///
/// Missing entities or relations resolve to nothing. `path` holds the
/// permissions currently being expanded; meeting one again ends that branch.
fn resolve_single_pass(
    entities: &EntityMap,
    tuple: &RelationTuple,
    path: &mut Vec<RelationTuple>,
    out: &mut Vec<RelationTuple>,
) {
    let Some(relation) = entities
        .get(&tuple.entity)
        .and_then(|e| e.relations.get(&tuple.relation))
    else {
        return;
    };

    if relation.is_base_relation() {
        out.push(tuple.clone());
        return;
    }

    if path.contains(tuple) {
        tracing::debug!(%tuple, "cycle detected while resolving permission");
        return;
    }
    path.push(tuple.clone());

    for (entity_name, entity) in entities {
        for (relation_name, candidate) in &entity.relations {
            for permission in &candidate.downstream_permissions {
                if permission == tuple {
                    let identity = RelationTuple::new(entity_name.as_str(), relation_name.as_str());
                    resolve_single_pass(entities, &identity, path, out);
                }
            }
        }
    }

    path.pop();
}

/// Resolve `tuple` to base relations by expanding permissions through their
/// own union terms.
fn resolve_closure(
    entities: &EntityMap,
    rewrites: &RewriteIndex<'_>,
    config: ResolverConfig,
    tuple: &RelationTuple,
    path: &mut Vec<RelationTuple>,
    out: &mut Vec<RelationTuple>,
) {
    let Some(relation) = entities
        .get(&tuple.entity)
        .and_then(|e| e.relations.get(&tuple.relation))
    else {
        return;
    };

    if relation.is_base_relation() {
        out.push(tuple.clone());
        return;
    }

    // Only unions are expanded; intersections and exclusions contribute
    // nothing, as they do at the top level.
    let Some(UsersetRewrite::Union(op)) = rewrites.get(tuple) else {
        return;
    };

    if path.contains(tuple) {
        tracing::debug!(%tuple, "cycle detected while resolving permission");
        return;
    }
    path.push(tuple.clone());

    for child in &op.children {
        for target in reference_tuples(entities, config.tupleset, &tuple.entity, child) {
            resolve_closure(entities, rewrites, config, &target, path, out);
        }
    }

    path.pop();
}

/// Rewrites of the compiled schema keyed by `(entity, relation)`, iterated in
/// name order.
struct RewriteIndex<'a> {
    by_name: BTreeMap<RelationTuple, &'a UsersetRewrite>,
}

impl<'a> RewriteIndex<'a> {
    fn new(schema: &'a CompiledSchema) -> Self {
        let mut by_name = BTreeMap::new();
        for def in &schema.object_definitions {
            for rel in &def.relations {
                if let Some(rewrite) = &rel.rewrite {
                    by_name.insert(RelationTuple::new(def.name.as_str(), rel.name.as_str()), rewrite);
                }
            }
        }
        Self { by_name }
    }

    fn get(&self, tuple: &RelationTuple) -> Option<&'a UsersetRewrite> {
        self.by_name.get(tuple).copied()
    }

    fn sorted(&self) -> impl Iterator<Item = (&RelationTuple, &'a UsersetRewrite)> + '_ {
        self.by_name.iter().map(|(k, &v)| (k, v))
    }
}
