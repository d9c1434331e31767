//! Determinism helpers: content hashing of the raw schema and newline
//! normalization of comment text.

pub mod hashing;
pub mod normalize_text;
