//! Configuration structures for zedmap-core.
//!
//! The core crate does not read environment variables. All configuration is
//! provided explicitly by the caller so that the same input always yields the
//! same relation map.

use crate::errors::{ZedmapError, ZedmapResult};

/// Global configuration container.
#[derive(Debug, Clone, Default)]
pub struct CoreConfig {
    pub resolver: ResolverConfig,
    pub limits: LimitsConfig,
}

/// Permission resolver configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResolverConfig {
    pub mode: ResolutionMode,
    pub tupleset: TuplesetResolution,
}

/// How a reference to another permission is expanded into base relations.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ResolutionMode {
    /// Single forward pass over sorted names. A permission only sees the
    /// downstream links created by permissions processed before it.
    #[default]
    SinglePass,
    /// Expand referenced permissions through their own union terms, giving a
    /// transitive closure that does not depend on name order.
    Closure,
}

impl ResolutionMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SinglePass => "single-pass",
            Self::Closure => "closure",
        }
    }
}

/// How the entity side of a tuple-to-userset (`parent->view`) term is chosen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TuplesetResolution {
    /// Use the tupleset relation name as the entity name.
    #[default]
    RelationName,
    /// Follow the allowed direct types of the tupleset relation.
    AllowedTypes,
}

impl TuplesetResolution {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RelationName => "relation-name",
            Self::AllowedTypes => "allowed-types",
        }
    }
}

/// Input limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LimitsConfig {
    pub max_schema_bytes: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_schema_bytes: 16 * 1024 * 1024,
        }
    }
}

/// Validate a full configuration object.
pub fn validate_config(cfg: &CoreConfig) -> ZedmapResult<()> {
    if cfg.limits.max_schema_bytes == 0 {
        return Err(ZedmapError::invalid_argument(
            "max_schema_bytes must be greater than zero",
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let cfg = CoreConfig::default();
        validate_config(&cfg).unwrap();
        assert_eq!(cfg.resolver.mode, ResolutionMode::SinglePass);
        assert_eq!(cfg.resolver.tupleset, TuplesetResolution::RelationName);
    }

    #[test]
    fn zero_limit_detected() {
        let mut cfg = CoreConfig::default();
        cfg.limits.max_schema_bytes = 0;
        assert!(validate_config(&cfg).is_err());
    }
}
