//! Document-local variable declarations
//!
//! A document declares its own variables with HTML comments on a line of
//! their own:
//!
//! ```text
//! <!-- @var title: Release notes -->
//! ```
//!
//! Declaration lines are removed from the document body. Include markers
//! (`<!-- @include: other.md -->`) are recognized and removed as well, but
//! nothing is ever included.

use crate::store::Variable;

const VAR_PREFIX: &str = "<!-- @var ";
const INCLUDE_PREFIX: &str = "<!-- @include:";
const COMMENT_SUFFIX: &str = " -->";

/// Result of scanning a document for declarations
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Extracted {
    /// Declared variables in declaration order (duplicates kept)
    pub variables: Vec<Variable>,
    /// Include marker targets, trimmed
    pub includes: Vec<String>,
    /// Document text with declaration and include lines removed
    pub body: String,
}

enum Line<'a> {
    Declaration(Variable),
    Include(&'a str),
    Text,
}

fn classify(line: &str) -> Line<'_> {
    let trimmed = line.trim();

    if trimmed.starts_with(VAR_PREFIX) && trimmed.ends_with(COMMENT_SUFFIX) {
        let inner = &trimmed[VAR_PREFIX.len()..];
        let inner = inner.strip_suffix(COMMENT_SUFFIX).unwrap_or(inner);

        // Without a colon the comment is left in the document as plain text
        return match inner.split_once(':') {
            Some((name, value)) => Line::Declaration(Variable::new(name.trim(), value.trim())),
            None => Line::Text,
        };
    }

    if trimmed.starts_with(INCLUDE_PREFIX) && trimmed.ends_with(COMMENT_SUFFIX) {
        let target = &trimmed[INCLUDE_PREFIX.len()..];
        let target = target.strip_suffix(COMMENT_SUFFIX).unwrap_or(target);
        return Line::Include(target.trim());
    }

    Line::Text
}

/// Split `content` into its declarations and the remaining body.
///
/// Removed lines leave no blank line behind; the surviving lines are joined
/// with `\n` in their original order.
pub fn extract_declarations(content: &str) -> Extracted {
    let mut extracted = Extracted::default();
    let mut kept = Vec::new();

    for line in content.split('\n') {
        match classify(line) {
            Line::Declaration(var) => extracted.variables.push(var),
            Line::Include(target) => extracted.includes.push(target.to_string()),
            Line::Text => kept.push(line),
        }
    }

    extracted.body = kept.join("\n");
    extracted
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_declaration_is_stripped() {
        let extracted = extract_declarations("line1\n<!-- @var x: 5 -->\nline2");
        assert_eq!(extracted.body, "line1\nline2");
        assert_eq!(extracted.variables, vec![Variable::new("x", "5")]);
    }

    #[test]
    fn test_name_and_value_are_trimmed() {
        let extracted = extract_declarations("   <!-- @var   title :  My Doc   -->  ");
        assert_eq!(extracted.variables, vec![Variable::new("title", "My Doc")]);
        assert_eq!(extracted.body, "");
    }

    #[test]
    fn test_value_split_on_first_colon() {
        let extracted = extract_declarations("<!-- @var url: https://example.com:8080 -->");
        assert_eq!(
            extracted.variables,
            vec![Variable::new("url", "https://example.com:8080")]
        );
    }

    #[test]
    fn test_missing_colon_keeps_line() {
        let content = "before\n<!-- @var nothing here -->\nafter";
        let extracted = extract_declarations(content);
        assert!(extracted.variables.is_empty());
        assert_eq!(extracted.body, content);
    }

    #[test]
    fn test_duplicates_kept_in_order() {
        let extracted = extract_declarations("<!-- @var x: 1 -->\n<!-- @var x: 2 -->");
        assert_eq!(
            extracted.variables,
            vec![Variable::new("x", "1"), Variable::new("x", "2")]
        );
    }

    #[test]
    fn test_include_marker_removed() {
        let extracted = extract_declarations("a\n<!-- @include: header.md -->\nb");
        assert_eq!(extracted.body, "a\nb");
        assert_eq!(extracted.includes, vec!["header.md".to_string()]);
        assert!(extracted.variables.is_empty());
    }

    #[test]
    fn test_comment_must_fill_the_line() {
        let content = "text <!-- @var x: 1 -->\n<!-- @var y: 2 --> trailing";
        let extracted = extract_declarations(content);
        assert!(extracted.variables.is_empty());
        assert_eq!(extracted.body, content);
    }

    #[test]
    fn test_missing_space_before_close_is_text() {
        let content = "<!-- @var x: 1-->";
        let extracted = extract_declarations(content);
        assert!(extracted.variables.is_empty());
        assert_eq!(extracted.body, content);
    }

    #[test]
    fn test_blank_lines_preserved() {
        let extracted = extract_declarations("a\n\n<!-- @var x: 1 -->\n\nb\n");
        assert_eq!(extracted.body, "a\n\n\nb\n");
    }

    #[test]
    fn test_crlf_declaration() {
        let extracted = extract_declarations("<!-- @var x: 1 -->\r\nbody\r\n");
        assert_eq!(extracted.variables, vec![Variable::new("x", "1")]);
        assert_eq!(extracted.body, "body\r\n");
    }
}
