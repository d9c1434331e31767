//! Error types for zedmap-core.
//!
//! Only fatal conditions are errors. Recoverable findings (unsupported rewrite
//! operators, unresolvable union terms) are collected as warnings on the
//! `ParsedSchema` instead, see `crate::pipeline::PipelineContext`.

use thiserror::Error;

/// Result alias used across the core crate.
pub type ZedmapResult<T> = Result<T, ZedmapError>;

#[derive(Debug, Error)]
pub enum ZedmapError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The schema source could not be compiled.
    #[error("{source_name}:{line}:{column}: {message}")]
    Compile {
        source_name: String,
        line: usize,
        column: usize,
        message: String,
    },

    /// A metadata message attached to the compiled schema did not decode into
    /// its declared type. The compiled representation is considered corrupt.
    #[error("failed to decode metadata message [{type_url}]: {message}")]
    Decode { type_url: String, message: String },

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("invariant violated: {0}")]
    Invariant(String),
}

impl ZedmapError {
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    pub fn compile(
        source_name: impl Into<String>,
        line: usize,
        column: usize,
        message: impl Into<String>,
    ) -> Self {
        Self::Compile {
            source_name: source_name.into(),
            line,
            column,
            message: message.into(),
        }
    }

    pub fn decode(type_url: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Decode {
            type_url: type_url.into(),
            message: message.into(),
        }
    }

    pub fn serialization(msg: impl Into<String>) -> Self {
        Self::Serialization(msg.into())
    }

    pub fn invariant(msg: impl Into<String>) -> Self {
        Self::Invariant(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compile_error_carries_position() {
        let e = ZedmapError::compile("schema.zed", 3, 7, "expected `{`");
        assert_eq!(e.to_string(), "schema.zed:3:7: expected `{`");
    }

    #[test]
    fn decode_error_names_type() {
        let e = ZedmapError::decode("type.googleapis.com/impl.v1.DocComment", "missing field");
        assert!(e.to_string().contains("impl.v1.DocComment"));
    }
}
