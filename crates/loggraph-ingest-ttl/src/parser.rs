//! Line-oriented parsing of grouped-Turtle fragments.
//!
//! A fragment is a sequence of subject groups: a standalone line introduces a
//! subject, and each following line holds one statement (relation plus one or
//! more objects, optionally a trailing label in labeled evaluation data).
//!
//! [`TokenLines`] is the lazy per-line view mandated by the format's quirks:
//! header and blank lines are skipped, and exactly one trailing statement
//! terminator (`.`) or list continuation (`;`) is stripped before the
//! quote-aware tokenizer runs. [`parse_fragment`] layers grouping, comma
//! removal, and label handling on top.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::tokenize::{split_tokens, TokenizeError};
use crate::PREFIX_MARKER;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("{fragment}:{line}: statement has no preceding subject")]
    StatementBeforeSubject { fragment: String, line: usize },
    #[error("{fragment}:{line}: {source}")]
    BadToken {
        fragment: String,
        line: usize,
        #[source]
        source: TokenizeError,
    },
}

/// One relation with its objects, plus the trailing label when the fragment
/// carries labeled evaluation data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Statement {
    pub relation: String,
    pub objects: Vec<String>,
    pub label: Option<String>,
}

/// A contiguous run of statements sharing one subject.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubjectGroup {
    pub subject: String,
    pub statements: Vec<Statement>,
}

/// Lazy iterator over the token-lists of one fragment, with 1-based physical
/// line numbers. Re-created per fragment; holds no cross-file state.
pub struct TokenLines<'a> {
    lines: std::iter::Enumerate<std::str::Lines<'a>>,
}

impl<'a> TokenLines<'a> {
    pub fn new(text: &'a str) -> Self {
        Self {
            lines: text.lines().enumerate(),
        }
    }
}

impl Iterator for TokenLines<'_> {
    type Item = (usize, Result<Vec<String>, TokenizeError>);

    fn next(&mut self) -> Option<Self::Item> {
        for (index, raw) in self.lines.by_ref() {
            if raw.trim().is_empty() || raw.starts_with(PREFIX_MARKER) {
                continue;
            }
            match split_tokens(strip_statement_end(raw)) {
                Ok(tokens) if tokens.is_empty() => continue,
                result => return Some((index + 1, result)),
            }
        }
        None
    }
}

/// Strip one trailing `.` terminator or `;` continuation, tolerating
/// whitespace around it. Interior occurrences (and quoted ones) are left for
/// the tokenizer.
fn strip_statement_end(line: &str) -> &str {
    let trimmed = line.trim_end();
    match trimmed.as_bytes().last() {
        Some(b'.' | b';') => trimmed[..trimmed.len() - 1].trim_end(),
        _ => trimmed,
    }
}

/// Parse one fragment into subject groups.
///
/// `fragment` names the source (used in errors only). With `labeled` set, the
/// final token of every statement is its label rather than an object.
///
/// Object-separator commas are dropped here, but only when a token is exactly
/// `,` — a comma inside a quoted literal survives as token content.
pub fn parse_fragment(
    fragment: &str,
    text: &str,
    labeled: bool,
) -> Result<Vec<SubjectGroup>, ParseError> {
    let mut groups: Vec<SubjectGroup> = Vec::new();

    for (line, tokens) in TokenLines::new(text) {
        let mut tokens = tokens.map_err(|source| ParseError::BadToken {
            fragment: fragment.to_string(),
            line,
            source,
        })?;
        tokens.retain(|t| t != ",");

        match tokens.len() {
            0 => continue,
            1 => groups.push(SubjectGroup {
                subject: tokens.remove(0),
                statements: Vec::new(),
            }),
            _ => {
                let group =
                    groups
                        .last_mut()
                        .ok_or_else(|| ParseError::StatementBeforeSubject {
                            fragment: fragment.to_string(),
                            line,
                        })?;
                let relation = tokens.remove(0);
                let label = if labeled { tokens.pop() } else { None };
                group.statements.push(Statement {
                    relation,
                    objects: tokens,
                    label,
                });
            }
        }
    }

    Ok(groups)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
@prefix ex: <http://example.org/> .

<s1>
    <rel1> <o1> , <o2> .
<s2>
    <rel1> <o3> .
";

    #[test]
    fn groups_statements_under_their_subject() {
        let groups = parse_fragment("sample.ttl", SAMPLE, false).expect("parse");
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].subject, "<s1>");
        assert_eq!(
            groups[0].statements,
            vec![Statement {
                relation: "<rel1>".into(),
                objects: vec!["<o1>".into(), "<o2>".into()],
                label: None,
            }]
        );
        assert_eq!(groups[1].subject, "<s2>");
        assert_eq!(groups[1].statements[0].objects, vec!["<o3>".to_string()]);
    }

    #[test]
    fn labeled_mode_reinterprets_the_last_token() {
        let text = "<s1>\n    <rel1> <o1> <o2> observed .\n";
        let groups = parse_fragment("test.ttl", text, true).expect("parse");
        let stmt = &groups[0].statements[0];
        assert_eq!(stmt.objects, vec!["<o1>".to_string(), "<o2>".to_string()]);
        assert_eq!(stmt.label.as_deref(), Some("observed"));
    }

    #[test]
    fn labeled_statement_may_have_no_objects() {
        let text = "<s1>\n    <rel1> observed .\n";
        let groups = parse_fragment("test.ttl", text, true).expect("parse");
        let stmt = &groups[0].statements[0];
        assert!(stmt.objects.is_empty());
        assert_eq!(stmt.label.as_deref(), Some("observed"));
    }

    #[test]
    fn strips_one_terminator_or_continuation() {
        assert_eq!(strip_statement_end("<rel> <o> ."), "<rel> <o>");
        assert_eq!(strip_statement_end("<rel> <o> ;"), "<rel> <o>");
        assert_eq!(strip_statement_end("<rel> <o>.  "), "<rel> <o>");
        // Only one symbol comes off; anything else is token text.
        assert_eq!(strip_statement_end("<rel> <o>.."), "<rel> <o>.");
        assert_eq!(strip_statement_end("<s1>"), "<s1>");
    }

    #[test]
    fn quoted_terminators_reach_the_tokenizer_intact() {
        let text = "<s1>\n    <msg> \"session opened.\" .\n";
        let groups = parse_fragment("test.ttl", text, false).expect("parse");
        assert_eq!(
            groups[0].statements[0].objects,
            vec!["session opened.".to_string()]
        );
    }

    #[test]
    fn commas_are_dropped_only_as_standalone_tokens() {
        let text = "<s1>\n    <rel> <o1> , \"a, b\" .\n";
        let groups = parse_fragment("test.ttl", text, false).expect("parse");
        assert_eq!(
            groups[0].statements[0].objects,
            vec!["<o1>".to_string(), "a, b".to_string()]
        );
    }

    #[test]
    fn skips_headers_and_blank_lines() {
        let mut lines = TokenLines::new(SAMPLE);
        let (line, tokens) = lines.next().expect("first content line");
        assert_eq!(line, 3);
        assert_eq!(tokens.expect("tokens"), vec!["<s1>".to_string()]);
    }

    #[test]
    fn statement_before_subject_is_rejected() {
        let text = "@prefix ex: <http://example.org/> .\n    <rel1> <o1> .\n";
        let err = parse_fragment("orphan.ttl", text, false).unwrap_err();
        match err {
            ParseError::StatementBeforeSubject { fragment, line } => {
                assert_eq!(fragment, "orphan.ttl");
                assert_eq!(line, 2);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn tokenizer_errors_carry_fragment_and_line() {
        let text = "<s1>\n    <rel1> \"oops .\n";
        let err = parse_fragment("bad.ttl", text, false).unwrap_err();
        match err {
            ParseError::BadToken { fragment, line, .. } => {
                assert_eq!(fragment, "bad.ttl");
                assert_eq!(line, 2);
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
