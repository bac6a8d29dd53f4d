//! Shell-style word splitting for serialized-graph lines.
//!
//! The upstream producer quotes literals that may contain whitespace, commas,
//! and statement terminators; those must survive tokenization verbatim.
//! Semantics follow POSIX word splitting: whitespace delimits tokens outside
//! quotes, single quotes preserve their content literally, double quotes
//! preserve everything except `\"` and `\\` escapes, and a backslash outside
//! quotes escapes the next character.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenizeError {
    #[error("unterminated quote opened at column {column}")]
    UnterminatedQuote { column: usize },
    #[error("trailing backslash")]
    TrailingEscape,
}

/// Split one line into tokens. Quoting marks token boundaries but is not part
/// of the token text, so `"a b"` yields the single token `a b` and adjacent
/// quoted/unquoted runs (`pre"fix"`) fuse into one token.
pub fn split_tokens(line: &str) -> Result<Vec<String>, TokenizeError> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    // Distinguishes "no token yet" from an explicitly empty quoted token.
    let mut in_token = false;
    let mut chars = line.char_indices();

    while let Some((at, c)) = chars.next() {
        match c {
            c if c.is_whitespace() => {
                if in_token {
                    tokens.push(std::mem::take(&mut current));
                    in_token = false;
                }
            }
            '\'' => {
                in_token = true;
                let mut closed = false;
                for (_, q) in chars.by_ref() {
                    if q == '\'' {
                        closed = true;
                        break;
                    }
                    current.push(q);
                }
                if !closed {
                    return Err(TokenizeError::UnterminatedQuote { column: at + 1 });
                }
            }
            '"' => {
                in_token = true;
                let mut closed = false;
                while let Some((_, q)) = chars.next() {
                    match q {
                        '"' => {
                            closed = true;
                            break;
                        }
                        '\\' => match chars.next() {
                            Some((_, esc @ ('"' | '\\'))) => current.push(esc),
                            Some((_, other)) => {
                                current.push('\\');
                                current.push(other);
                            }
                            None => {
                                return Err(TokenizeError::UnterminatedQuote { column: at + 1 })
                            }
                        },
                        _ => current.push(q),
                    }
                }
                if !closed {
                    return Err(TokenizeError::UnterminatedQuote { column: at + 1 });
                }
            }
            '\\' => {
                in_token = true;
                match chars.next() {
                    Some((_, esc)) => current.push(esc),
                    None => return Err(TokenizeError::TrailingEscape),
                }
            }
            _ => {
                in_token = true;
                current.push(c);
            }
        }
    }

    if in_token {
        tokens.push(current);
    }
    Ok(tokens)
}
