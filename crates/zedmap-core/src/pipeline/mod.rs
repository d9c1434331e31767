//! Relation map pipeline.
//!
//! A compiled schema is turned into a `ParsedSchema` by an ordered list of
//! stages that all operate on the same `EntityMap`:
//!
//! 1. `skeleton` builds entities, relations, metadata and allowed direct types.
//! 2. `resolve` walks union rewrites and records downstream permissions on the
//!    base relations they depend on.
//!
//! Stages never fail on schema content they cannot handle; they record a
//! warning in the `PipelineContext` and move on. Errors are reserved for a
//! corrupt compiled representation.
//!
//! The pipeline does no filesystem I/O. Callers pass the raw schema bytes (for
//! the digest) and either a compiler or an already compiled schema.

use crate::compiled::CompiledSchema;
use crate::compiler::SchemaCompiler;
use crate::config::{validate_config, CoreConfig};
use crate::determinism::hashing::schema_hash_hex;
use crate::errors::{ZedmapError, ZedmapResult};
use crate::model::{EntityMap, ParsedSchema};

pub mod resolve;
pub mod skeleton;

/// A warning emitted by a pipeline stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineDiagnostic {
    pub code: &'static str,
    pub message: String,
}

/// Diagnostic codes. Stable; consumers may match on them.
pub mod codes {
    pub const UNRESOLVED_UNION_TERM: &str = "resolve.union.unresolved";
    pub const UNSUPPORTED_INTERSECTION: &str = "resolve.intersection.unsupported";
    pub const UNSUPPORTED_EXCLUSION: &str = "resolve.exclusion.unsupported";
}

/// Context shared by all stages of one run.
#[derive(Debug, Clone, Default)]
pub struct PipelineContext {
    pub config: CoreConfig,
    pub diagnostics: Vec<PipelineDiagnostic>,
}

impl PipelineContext {
    pub fn new(config: CoreConfig) -> Self {
        Self {
            config,
            diagnostics: Vec::new(),
        }
    }

    pub fn push_warning(&mut self, code: &'static str, message: impl Into<String>) {
        let message = message.into();
        tracing::warn!(code, "{message}");
        self.diagnostics.push(PipelineDiagnostic {
            code,
            message,
        });
    }

    /// Warning messages in the order they were recorded.
    pub fn warnings(&self) -> Vec<String> {
        self.diagnostics.iter().map(|d| d.message.clone()).collect()
    }
}

/// A pipeline stage.
pub trait Stage {
    fn id(&self) -> &str;
    fn run(
        &self,
        ctx: &mut PipelineContext,
        schema: &CompiledSchema,
        entities: &mut EntityMap,
    ) -> ZedmapResult<()>;
}

/// An ordered list of stages.
#[derive(Default)]
pub struct Pipeline {
    stages: Vec<Box<dyn Stage + Send + Sync>>,
}

impl Pipeline {
    pub fn new() -> Self {
        Self { stages: Vec::new() }
    }

    /// Skeleton construction followed by permission resolution.
    pub fn relation_map() -> Self {
        let mut p = Self::new();
        p.push_stage(skeleton::BuildSkeletonStage)
            .push_stage(resolve::ResolvePermissionsStage);
        p
    }

    pub fn push_stage<S: Stage + Send + Sync + 'static>(&mut self, s: S) -> &mut Self {
        self.stages.push(Box::new(s));
        self
    }

    pub fn stages(&self) -> usize {
        self.stages.len()
    }

    pub fn run(&self, ctx: &mut PipelineContext, schema: &CompiledSchema) -> ZedmapResult<EntityMap> {
        let mut entities = EntityMap::new();

        for st in &self.stages {
            tracing::debug!(stage = st.id(), "starting stage");
            st.run(ctx, schema, &mut entities)?;
        }

        Ok(entities)
    }
}

/// Build the relation map for an already compiled schema.
///
/// `raw_schema` is only hashed; it should be the bytes the schema was compiled
/// from.
pub fn build_relation_map(
    raw_schema: &[u8],
    compiled: &CompiledSchema,
    config: &CoreConfig,
) -> ZedmapResult<ParsedSchema> {
    validate_config(config)?;

    let mut ctx = PipelineContext::new(config.clone());
    let entities = Pipeline::relation_map().run(&mut ctx, compiled)?;

    Ok(ParsedSchema {
        entities,
        schema_hash: schema_hash_hex(raw_schema),
        warnings: ctx.warnings(),
    })
}

/// Compile `raw_schema` and build its relation map.
pub fn parse_schema(
    source_name: &str,
    raw_schema: &[u8],
    compiler: &dyn SchemaCompiler,
    config: &CoreConfig,
) -> ZedmapResult<ParsedSchema> {
    validate_config(config)?;

    if raw_schema.len() > config.limits.max_schema_bytes {
        return Err(ZedmapError::invalid_argument(format!(
            "schema too large ({} bytes > limit {})",
            raw_schema.len(),
            config.limits.max_schema_bytes
        )));
    }

    let source = std::str::from_utf8(raw_schema).map_err(|e| {
        ZedmapError::invalid_argument(format!("schema [{source_name}] is not valid UTF-8: {e}"))
    })?;

    let compiled = compiler.compile(source_name, source)?;
    build_relation_map(raw_schema, &compiled, config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::ZedCompiler;
    use assert_matches::assert_matches;

    struct RecordingStage;
    impl Stage for RecordingStage {
        fn id(&self) -> &str {
            "test.record"
        }
        fn run(
            &self,
            ctx: &mut PipelineContext,
            _schema: &CompiledSchema,
            _entities: &mut EntityMap,
        ) -> ZedmapResult<()> {
            ctx.push_warning("test.warning", "first");
            ctx.push_warning("test.warning", "second");
            Ok(())
        }
    }

    struct ErrorStage;
    impl Stage for ErrorStage {
        fn id(&self) -> &str {
            "test.error"
        }
        fn run(
            &self,
            _ctx: &mut PipelineContext,
            _schema: &CompiledSchema,
            _entities: &mut EntityMap,
        ) -> ZedmapResult<()> {
            Err(ZedmapError::invariant("stage failed"))
        }
    }

    #[test]
    fn warnings_keep_order() {
        let mut p = Pipeline::new();
        p.push_stage(RecordingStage);
        let mut ctx = PipelineContext::default();
        p.run(&mut ctx, &CompiledSchema::default()).unwrap();
        assert_eq!(ctx.warnings(), vec!["first".to_string(), "second".to_string()]);
        assert!(ctx.diagnostics.iter().all(|d| d.code == "test.warning"));
    }

    #[test]
    fn pipeline_propagates_error() {
        let mut p = Pipeline::new();
        p.push_stage(ErrorStage);
        let mut ctx = PipelineContext::default();
        assert!(p.run(&mut ctx, &CompiledSchema::default()).is_err());
    }

    #[test]
    fn relation_map_has_two_stages() {
        assert_eq!(Pipeline::relation_map().stages(), 2);
    }

    #[test]
    fn oversized_schema_rejected() {
        let mut cfg = CoreConfig::default();
        cfg.limits.max_schema_bytes = 4;
        let err = parse_schema("big.zed", b"definition user {}", &ZedCompiler, &cfg).unwrap_err();
        assert!(err.to_string().contains("too large"));
    }

    #[test]
    fn non_utf8_rejected() {
        let err = parse_schema("bin.zed", &[0xff, 0xfe], &ZedCompiler, &CoreConfig::default())
            .unwrap_err();
        assert_matches!(err, ZedmapError::InvalidArgument(_));
    }

    #[test]
    fn compile_errors_propagate() {
        let err = parse_schema("bad.zed", b"definition {", &ZedCompiler, &CoreConfig::default())
            .unwrap_err();
        assert_matches!(err, ZedmapError::Compile { .. });
    }
}
