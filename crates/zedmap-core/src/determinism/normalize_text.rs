//! Text normalization applied to documentation comments before annotation
//! scanning.
//!
//! Marker matching is line based, so every line ending must be a bare LF for
//! the `$` anchor to line up with the end of a marker line.

use std::borrow::Cow;

/// Normalize newlines deterministically.
///
/// Rules:
/// - remove UTF-8 BOM if present
/// - convert CRLF and CR to LF
///
/// Input that needs no change is returned borrowed.
pub fn normalize_newlines(input: &str) -> Cow<'_, str> {
    let s = input.strip_prefix('\u{FEFF}').unwrap_or(input);

    if !s.contains('\r') {
        return if s.len() == input.len() {
            Cow::Borrowed(input)
        } else {
            Cow::Owned(s.to_string())
        };
    }

    Cow::Owned(s.replace("\r\n", "\n").replace('\r', "\n"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_crlf_and_cr() {
        assert_eq!(normalize_newlines("a\r\nb\rc\n"), "a\nb\nc\n");
    }

    #[test]
    fn remove_bom() {
        assert_eq!(normalize_newlines("\u{FEFF}hello\n"), "hello\n");
    }

    #[test]
    fn clean_input_is_borrowed() {
        assert!(matches!(normalize_newlines("a\nb"), Cow::Borrowed(_)));
    }
}
