//! Schema compilation.
//!
//! The relation map pipeline consumes a `CompiledSchema`; anything that can
//! produce one implements `SchemaCompiler`. `ZedCompiler` is the built-in
//! implementation for `.zed` source covering definitions, relations with
//! allowed types (`user`, `group#member`, `user:*`), permissions over
//! `+ & - ->` and `nil`, and doc comments.

use crate::compiled::CompiledSchema;
use crate::errors::ZedmapResult;

pub mod lexer;
pub mod parser;

/// Turns schema source text into the compiled object model.
pub trait SchemaCompiler {
    /// `source_name` identifies the source in error messages (usually a path).
    fn compile(&self, source_name: &str, source: &str) -> ZedmapResult<CompiledSchema>;
}

/// Built-in `.zed` compiler.
#[derive(Debug, Clone, Copy, Default)]
pub struct ZedCompiler;

impl SchemaCompiler for ZedCompiler {
    fn compile(&self, source_name: &str, source: &str) -> ZedmapResult<CompiledSchema> {
        let tokens = lexer::tokenize(source_name, source)?;
        let schema = parser::Parser::new(source_name, tokens).parse_schema()?;
        tracing::debug!(
            source = source_name,
            definitions = schema.object_definitions.len(),
            "compiled schema"
        );
        Ok(schema)
    }
}
