use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

/// Read the raw schema bytes. They are hashed as is, so no decoding happens
/// here.
pub fn read_schema(path: &Path) -> Result<Vec<u8>> {
    fs::read(path).with_context(|| format!("error opening schema file [{}]", path.display()))
}
