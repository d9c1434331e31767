//! Documentation comment annotations.
//!
//! Definitions may carry boolean and string attributes by adding an `@attr`
//! line to their comment block:
//!
//! ```text
//! /** @attr internal owner=team-a
//!  * user represents a user that can be granted role(s)
//!  */
//! definition user {}
//! ```
//!
//! yields the comment `user represents a user that can be granted role(s)` and
//! the attributes `{internal: true, owner: "team-a"}`.
//!
//! Extraction is total: anything that does not look like a marker line is left
//! in the comment untouched.

use std::sync::OnceLock;

use regex::Regex;

use crate::determinism::normalize_text::normalize_newlines;
use crate::model::{AttributeValue, Metadata};

struct Patterns {
    /// `@attr` followed by one or more space separated tokens, one per line.
    attribute: Regex,
    /// Leading comment decoration (`//`, `/**`, ` * `) on each line.
    decoration: Regex,
}

fn patterns() -> &'static Patterns {
    static PATTERNS: OnceLock<Patterns> = OnceLock::new();
    PATTERNS.get_or_init(|| Patterns {
        attribute: Regex::new(r"(?mi)^[ ]*@attr([ ]+[\w -=]+)$").expect("attribute pattern"),
        decoration: Regex::new(r"(?m)^[ \t/*]+").expect("decoration pattern"),
    })
}

/// Strip comment decoration from every line of a raw comment block.
pub fn strip_decoration(raw: &str) -> String {
    let text = normalize_newlines(raw);
    patterns().decoration.replace_all(&text, "").into_owned()
}

/// Parse a raw documentation comment into `Metadata`.
pub fn parse_doc_comment(raw: &str) -> Metadata {
    let mut md = Metadata {
        comment: strip_decoration(raw),
        ..Default::default()
    };
    apply_attributes(&mut md);
    md
}

/// Move `@attr` marker lines out of `md.comment` into `md.attributes`, then
/// trim the remaining comment.
///
/// Later duplicates overwrite earlier ones.
pub fn apply_attributes(md: &mut Metadata) {
    let p = patterns();

    for caps in p.attribute.captures_iter(&md.comment) {
        let Some(tokens) = caps.get(1) else {
            continue;
        };

        for token in tokens.as_str().split(' ') {
            let token = token.trim();
            if token.is_empty() {
                continue;
            }

            match token.split_once('=') {
                None => {
                    md.attributes
                        .insert(token.to_string(), AttributeValue::Bool(true));
                }
                Some(("", _)) => {}
                Some((name, value)) => {
                    md.attributes
                        .insert(name.to_string(), AttributeValue::String(value.to_string()));
                }
            }
        }
    }

    let stripped = p.attribute.replace_all(&md.comment, "");
    md.comment = stripped.trim().to_string();
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn extracts_flag_and_string() {
        let md = parse_doc_comment("/** @attr flag key=val\n * hello world\n */");
        assert_eq!(md.comment, "hello world");
        assert_eq!(md.attributes.len(), 2);
        assert_eq!(md.attributes["flag"], AttributeValue::Bool(true));
        assert_eq!(md.attributes["key"], AttributeValue::String("val".into()));
    }

    #[test]
    fn value_keeps_later_equals_signs() {
        let md = parse_doc_comment("// @attr expr=a=b");
        assert_eq!(md.attributes["expr"], AttributeValue::String("a=b".into()));
        assert_eq!(md.comment, "");
    }

    #[test]
    fn marker_is_case_insensitive_and_repeatable() {
        let md = parse_doc_comment("/**\n * @ATTR one\n * docs\n * @attr two one=x\n */");
        assert_eq!(md.comment, "docs");
        assert_eq!(md.attributes["one"], AttributeValue::String("x".into()));
        assert_eq!(md.attributes["two"], AttributeValue::Bool(true));
    }

    #[test]
    fn empty_names_are_ignored() {
        let md = parse_doc_comment("// @attr  =stray  ok ");
        assert_eq!(md.attributes.len(), 1);
        assert!(md.attributes.contains_key("ok"));
    }

    #[test]
    fn bare_marker_is_left_in_comment() {
        let md = parse_doc_comment("// @attr\n// text");
        assert!(md.attributes.is_empty());
        assert_eq!(md.comment, "@attr\ntext");
    }

    #[test]
    fn marker_must_start_the_line() {
        let md = parse_doc_comment("/** see @attr flag */");
        assert!(md.attributes.is_empty());
        assert_eq!(md.comment, "see @attr flag */");
    }

    #[test]
    fn crlf_comments_are_scanned() {
        let md = parse_doc_comment("/** @attr flag\r\n * text\r\n */");
        assert_eq!(md.attributes["flag"], AttributeValue::Bool(true));
        assert_eq!(md.comment, "text");
    }

    #[test]
    fn plain_comment_untouched() {
        let md = parse_doc_comment("// a document");
        assert_eq!(md.comment, "a document");
        assert!(md.attributes.is_empty());
    }

    proptest! {
        #[test]
        fn extraction_never_panics(raw in "\\PC{0,200}") {
            let md = parse_doc_comment(&raw);
            prop_assert_eq!(md.comment.trim(), md.comment.as_str());
        }
    }
}
