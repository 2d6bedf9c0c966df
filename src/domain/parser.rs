//! Doc comment parser
//!
//! A doc comment is either a one-liner `/** @tag value */` or spans
//! several lines, each optionally prefixed by a single `*`:
//!
//! ```text
//! /**
//!  * @phpstan-var string $string
//!  * @deprecated
//!  */
//! ```
//!
//! Every line whose content starts with `@` is a tag. The tag key runs up
//! to the first space or tab; the rest of the line, trimmed, is the value.
//! Keys are split on [`GROUP_DELIMITER`] into a group path plus a leaf
//! name. Multi-line values are not supported.

use tracing::{debug, trace};

use crate::domain::error::{DomainError, DomainResult};
use crate::domain::tags::TagTree;

/// Separates group path components in a tag key (`foo-barQux-corge`).
pub const GROUP_DELIMITER: char = '-';

const OPENING: &str = "/**";
const CLOSING: &str = "*/";

const LINE_TRIM: &[char] = &[' ', '\t', '\r'];
const INLINE_TRIM: &[char] = &[' ', '\t'];

/// A single `@key value` annotation borrowed from the comment text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tag<'a> {
    /// Fully-qualified key without the leading `@`
    pub key: &'a str,
    /// Value with surrounding spaces and tabs removed, possibly empty
    pub value: &'a str,
}

impl<'a> Tag<'a> {
    /// Key components in order: group path first, leaf name last.
    pub fn path(&self) -> impl Iterator<Item = &'a str> {
        self.key.split(GROUP_DELIMITER)
    }
}

/// Parse a complete doc comment into a tag tree.
///
/// The input must start with `/**` and end with `*/`. Tags are applied
/// in document order, so when the same fully-qualified key occurs twice
/// the last occurrence wins.
///
/// # Errors
/// Returns [`DomainError::InvalidFormat`] when the envelope is missing.
pub fn parse(doc: &str) -> DomainResult<TagTree> {
    let body = comment_body(doc)?;

    let mut tree = TagTree::new();
    let mut count = 0usize;
    for tag in tags(body) {
        trace!(key = tag.key, value = tag.value, "tag");
        tree.insert(tag.key, tag.value);
        count += 1;
    }
    debug!("parse: {} tags", count);

    Ok(tree)
}

/// Iterate over the tags of a comment body (the text between the delimiters).
pub fn tags(body: &str) -> impl Iterator<Item = Tag<'_>> {
    body.split('\n').filter_map(parse_tag)
}

/// Extract the tag from one line of a comment body.
///
/// Returns `None` for blank lines and lines that are not tags.
pub fn parse_tag(line: &str) -> Option<Tag<'_>> {
    let line = line.trim_matches(LINE_TRIM);
    if line.is_empty() {
        return None;
    }

    // Conventional line-prefix asterisk, at most one
    let line = match line.strip_prefix('*') {
        Some(rest) => rest.trim_matches(INLINE_TRIM),
        None => line,
    };

    let body = line.strip_prefix('@')?;
    let (key, value) = match separator(body) {
        Some(pos) => (&body[..pos], body[pos..].trim_matches(INLINE_TRIM)),
        None => (body, ""),
    };

    Some(Tag { key, value })
}

/// Position of the first space or tab, whichever comes first.
fn separator(body: &str) -> Option<usize> {
    match (body.find(' '), body.find('\t')) {
        (None, None) => None,
        (Some(pos), None) | (None, Some(pos)) => Some(pos),
        (Some(space), Some(tab)) => Some(space.min(tab)),
    }
}

fn comment_body(doc: &str) -> DomainResult<&str> {
    if !doc.starts_with(OPENING) {
        return Err(DomainError::InvalidFormat(format!(
            "expected `{}` at start",
            OPENING
        )));
    }
    if !doc.ends_with(CLOSING) {
        return Err(DomainError::InvalidFormat(format!(
            "expected `{}` at end",
            CLOSING
        )));
    }

    // `/**/` shares its asterisk between both delimiters
    Ok(doc
        .get(OPENING.len()..doc.len() - CLOSING.len())
        .unwrap_or(""))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("@a b", "a", "b")]
    #[case("@c   d", "c", "d")]
    #[case("  * @e-f g  ", "e-f", "g")]
    #[case("@h-i", "h-i", "")]
    #[case("@tab\tvalue", "tab", "value")]
    #[case("@mixed\t x y", "mixed", "x y")]
    #[case("@mixed \tx", "mixed", "x")]
    #[case("@j-m n o\r", "j-m", "n o")]
    #[case("*@tight value", "tight", "value")]
    #[case("@", "", "")]
    fn test_parse_tag(#[case] line: &str, #[case] key: &str, #[case] value: &str) {
        let tag = parse_tag(line).expect("tag line");
        assert_eq!(tag.key, key);
        assert_eq!(tag.value, value);
    }

    #[rstest]
    #[case("")]
    #[case("   \t\r")]
    #[case("*")]
    #[case(" * ")]
    #[case("plain description text")]
    #[case("* not a tag @here")]
    #[case("** @double")]
    fn test_parse_tag_skips_non_tags(#[case] line: &str) {
        assert_eq!(parse_tag(line), None);
    }

    #[test]
    fn test_separator_picks_earliest() {
        assert_eq!(separator("abc"), None);
        assert_eq!(separator("ab c"), Some(2));
        assert_eq!(separator("a\tb c"), Some(1));
        assert_eq!(separator("a b\tc"), Some(1));
    }

    #[test]
    fn test_tag_path() {
        let tag = parse_tag("@foo-barQux-corge 1").unwrap();
        assert_eq!(tag.path().collect::<Vec<_>>(), vec!["foo", "barQux", "corge"]);
    }

    #[rstest]
    #[case("/***/")]
    #[case("/** */")]
    #[case("/**/")]
    #[case("/**\n*/")]
    fn test_comment_body_accepts_envelope(#[case] doc: &str) {
        assert!(comment_body(doc).is_ok());
    }

    #[rstest]
    #[case("")]
    #[case("/* @a b */")]
    #[case("/** @a b")]
    #[case("@a b */")]
    #[case(" /** @a b */")]
    #[case("/** @a b */ ")]
    #[case("/*/")]
    fn test_comment_body_rejects_missing_envelope(#[case] doc: &str) {
        assert!(matches!(
            comment_body(doc),
            Err(DomainError::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_parse_last_value_wins() {
        let tree = parse("/**\n@a one\n@a two\n*/").unwrap();
        assert_eq!(tree.value("a").unwrap(), Some("two"));
    }
}
