//! Tag parameters
//!
//! A tag is a `{name}` or `@name` token anywhere in commitment content. Tags
//! group commitments so a later DELETE can target them, and the same tokens
//! double as compact agent references in FROM/IMPORT/TEAM content.
//!
//! - `{name}` must not contain `:` or braces; `{X: value}` is a parameter
//!   with a value, not a tag.
//! - `@name` must not follow a word character, so `user@example.com` is not
//!   a tag, and neither is `@name` inside an absolute URL.
//! - Names are whitespace-trimmed and compared case-insensitively.

use crate::knowledge::find_url_spans;
use regex::Regex;
use std::collections::BTreeSet;
use std::sync::LazyLock;

static BRACE_TAG_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{([^{}:\n]+)\}").expect("brace tag pattern is valid")
});

static AT_TAG_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(^|[^\w@])@([\p{L}\p{N}_][\p{L}\p{N}_-]*)").expect("at tag pattern is valid")
});

/// Shape of a tag token as written in the source
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagStyle {
    /// `{name}`
    Brace,
    /// `@name`
    At,
}

/// One tag occurrence with its byte span in the scanned text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagToken {
    /// Name as written, trimmed
    pub name: String,
    pub style: TagStyle,
    pub start: usize,
    pub end: usize,
}

impl TagToken {
    /// Case-insensitive comparison key
    pub fn key(&self) -> String {
        normalize_tag(&self.name)
    }
}

/// Normalize a tag name for comparison
pub fn normalize_tag(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Find every tag token in `text`, ordered by position
pub fn find_tag_tokens(text: &str) -> Vec<TagToken> {
    let mut tokens = Vec::new();

    for cap in BRACE_TAG_PATTERN.captures_iter(text) {
        let (Some(whole), Some(inner)) = (cap.get(0), cap.get(1)) else {
            continue;
        };
        let name = inner.as_str().trim();
        if name.is_empty() {
            continue;
        }
        tokens.push(TagToken {
            name: name.to_string(),
            style: TagStyle::Brace,
            start: whole.start(),
            end: whole.end(),
        });
    }

    let url_spans = find_url_spans(text);
    for cap in AT_TAG_PATTERN.captures_iter(text) {
        let (Some(prefix), Some(name)) = (cap.get(1), cap.get(2)) else {
            continue;
        };
        let start = prefix.end();
        if url_spans.iter().any(|span| span.contains(&start)) {
            continue;
        }
        tokens.push(TagToken {
            name: name.as_str().to_string(),
            style: TagStyle::At,
            start,
            end: name.end(),
        });
    }

    tokens.sort_by_key(|t| t.start);
    tokens
}

/// Set of normalized tag names carried by `text`
pub fn extract_tags(text: &str) -> BTreeSet<String> {
    find_tag_tokens(text).iter().map(TagToken::key).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_brace_and_at_tags() {
        let tags = extract_tags("@Sales knowledge for {Pricing } team");
        assert_eq!(
            tags.into_iter().collect::<Vec<_>>(),
            vec!["pricing".to_string(), "sales".to_string()]
        );
    }

    #[test]
    fn test_tags_are_case_insensitive() {
        assert_eq!(extract_tags("{X}"), extract_tags("@x"));
    }

    #[test]
    fn test_valued_parameter_is_not_a_tag() {
        assert!(extract_tags("{X: second knowledge below}").is_empty());
    }

    #[test]
    fn test_email_is_not_a_tag() {
        assert!(extract_tags("write to support@example.com").is_empty());
    }

    #[test]
    fn test_at_inside_url_is_not_a_tag() {
        let tags = extract_tags("see https://github.com/@team/repo with @Owner");
        assert_eq!(tags.into_iter().collect::<Vec<_>>(), vec!["owner".to_string()]);
    }

    #[test]
    fn test_empty_braces_are_ignored() {
        assert!(extract_tags("{ } and {}").is_empty());
    }

    #[test]
    fn test_token_spans() {
        let text = "Ask @Alice or {Bob}";
        let tokens = find_tag_tokens(text);
        assert_eq!(tokens.len(), 2);
        assert_eq!(&text[tokens[0].start..tokens[0].end], "@Alice");
        assert_eq!(tokens[0].style, TagStyle::At);
        assert_eq!(&text[tokens[1].start..tokens[1].end], "{Bob}");
        assert_eq!(tokens[1].name, "Bob");
    }

    #[test]
    fn test_adjacent_at_tags() {
        let tags = extract_tags("@one @two");
        assert!(tags.contains("one"));
        assert!(tags.contains("two"));
    }
}
