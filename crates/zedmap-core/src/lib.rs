//! zedmap-core
//!
//! Core primitives for zedmap:
//! - Compiled ReBAC schema object model and its metadata messages
//! - A `.zed` compiler producing that model
//! - Doc comment and `@attr` annotation extraction
//! - Relation map construction with downstream permission resolution
//! - JSON/YAML encoding of the resulting map

pub mod annotations;
pub mod codec;
pub mod compiled;
pub mod compiler;
pub mod config;
pub mod determinism;
pub mod errors;
pub mod model;
pub mod pipeline;

pub use crate::errors::{ZedmapError, ZedmapResult};

/// Convenience re-exports.
pub mod prelude {
    pub use crate::codec::{decode, encode, OutputFormat};
    pub use crate::compiled::CompiledSchema;
    pub use crate::compiler::{SchemaCompiler, ZedCompiler};
    pub use crate::config::{CoreConfig, ResolutionMode, TuplesetResolution};
    pub use crate::model::{
        AttributeValue, Entity, EntityMap, Metadata, ParsedSchema, Relation, RelationKind,
        RelationTuple,
    };
    pub use crate::pipeline::{build_relation_map, parse_schema};
    pub use crate::{ZedmapError, ZedmapResult};
}
