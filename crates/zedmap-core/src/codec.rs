//! JSON and YAML encoding of the relation map.
//!
//! Both formats carry the same fields. JSON is written with four-space
//! indentation, YAML with two.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::Serialize;

use crate::errors::{ZedmapError, ZedmapResult};
use crate::model::ParsedSchema;

/// Output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Json,
    #[cfg(feature = "yaml")]
    Yaml,
}

impl OutputFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Json => "json",
            #[cfg(feature = "yaml")]
            Self::Yaml => "yaml",
        }
    }

    /// Pick a format: an explicit choice wins, then the output file extension,
    /// then JSON. `output` is `None` when writing to stdout.
    pub fn select(explicit: Option<&str>, output: Option<&Path>) -> ZedmapResult<Self> {
        if let Some(f) = explicit.filter(|f| !f.is_empty()) {
            return f.parse();
        }

        match output.and_then(|p| p.extension()).and_then(|e| e.to_str()) {
            Some(ext) if !ext.is_empty() => ext.parse(),
            _ => Ok(Self::Json),
        }
    }
}

impl FromStr for OutputFormat {
    type Err = ZedmapError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "json" => Ok(Self::Json),
            #[cfg(feature = "yaml")]
            "yaml" | "yml" => Ok(Self::Yaml),
            other => Err(ZedmapError::invalid_argument(format!("unknown format: {other}"))),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Encode `schema` in `format`. The output ends with a newline.
pub fn encode(schema: &ParsedSchema, format: OutputFormat) -> ZedmapResult<String> {
    match format {
        OutputFormat::Json => to_json_string(schema),
        #[cfg(feature = "yaml")]
        OutputFormat::Yaml => to_yaml_string(schema),
    }
}

/// Decode a relation map previously written in `format`.
pub fn decode(text: &str, format: OutputFormat) -> ZedmapResult<ParsedSchema> {
    match format {
        OutputFormat::Json => serde_json::from_str(text)
            .map_err(|e| ZedmapError::serialization(format!("failed to decode json: {e}"))),
        #[cfg(feature = "yaml")]
        OutputFormat::Yaml => serde_yaml::from_str(text)
            .map_err(|e| ZedmapError::serialization(format!("failed to decode yaml: {e}"))),
    }
}

pub fn to_json_string(schema: &ParsedSchema) -> ZedmapResult<String> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    schema
        .serialize(&mut ser)
        .map_err(|e| ZedmapError::serialization(format!("error encoding output with json: {e}")))?;
    buf.push(b'\n');

    String::from_utf8(buf).map_err(|e| ZedmapError::serialization(e.to_string()))
}

#[cfg(feature = "yaml")]
pub fn to_yaml_string(schema: &ParsedSchema) -> ZedmapResult<String> {
    serde_yaml::to_string(schema)
        .map_err(|e| ZedmapError::serialization(format!("error encoding output with yaml: {e}")))
}
