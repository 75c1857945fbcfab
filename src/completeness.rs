//! Decides whether console input can be submitted or needs another physical line.

use crate::lexer::{self, Token, TokenKind};

/// Outcome of [`check_completeness`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Completeness {
    /// Ready to translate and run.
    Complete,
    /// More lines are needed: open brackets, an open triple-quoted string, a trailing
    /// line continuation, or an indented suite that has not been closed by a blank line.
    Incomplete,
    /// No continuation can fix the input. Submitting it lets the script engine report the error.
    Invalid(String),
}

/// Classifies `text` using only its tokens.
///
/// Empty input is complete.
pub fn check_completeness(text: &str) -> Completeness {
    let tokens = lexer::tokens(text);
    let mut open: Vec<char> = Vec::new();

    for token in &tokens {
        match token.kind() {
            TokenKind::Bracket if token.is_opening_bracket() => {
                open.extend(token.text().chars());
            }
            TokenKind::Bracket => {
                let Some(close) = token.text().chars().next() else {
                    continue;
                };
                match open.pop() {
                    Some(opener) if matching_close(opener) == close => {}
                    Some(opener) => {
                        return Completeness::Invalid(format!(
                            "closing '{close}' does not match '{opener}'"
                        ));
                    }
                    None => {
                        return Completeness::Invalid(format!("unmatched '{close}'"));
                    }
                }
            }
            TokenKind::StringLiteral if !token.is_terminated_string() => {
                if token.is_triple_quoted() || continues_on_next_line(token) {
                    return Completeness::Incomplete;
                }
                return Completeness::Invalid("unterminated string literal".to_string());
            }
            _ => {}
        }
    }

    if !open.is_empty() {
        return Completeness::Incomplete;
    }
    if tokens.last().is_some_and(is_continuation) {
        return Completeness::Incomplete;
    }
    if opens_suite(&tokens) && !ends_with_blank_line(text) {
        return Completeness::Incomplete;
    }
    Completeness::Complete
}

fn matching_close(opener: char) -> char {
    match opener {
        '(' => ')',
        '[' => ']',
        _ => '}',
    }
}

fn is_continuation(token: &Token) -> bool {
    token.kind() == TokenKind::Whitespace && token.text().starts_with('\\')
}

/// An unterminated single-quoted string whose only line break is a trailing
/// backslash-newline: `'abc\` followed by Enter.
fn continues_on_next_line(token: &Token) -> bool {
    let mut chars = token.text().chars().peekable();
    let mut continued = false;
    while let Some(ch) = chars.next() {
        match ch {
            '\\' => {
                continued = match chars.next() {
                    Some('\n') => true,
                    Some('\r') if chars.peek() == Some(&'\n') => {
                        chars.next();
                        true
                    }
                    _ => false,
                };
            }
            '\n' => return false,
            _ => continued = false,
        }
    }
    continued
}

/// Any logical line whose last significant token is `:`.
fn opens_suite(tokens: &[Token]) -> bool {
    let mut last_significant: Option<&Token> = None;
    for token in tokens {
        match token.kind() {
            TokenKind::Whitespace | TokenKind::Comment => {}
            TokenKind::Newline => {
                if last_significant.is_some_and(|t| t.is(TokenKind::Operator, ":")) {
                    return true;
                }
                last_significant = None;
            }
            _ => last_significant = Some(token),
        }
    }
    last_significant.is_some_and(|t| t.is(TokenKind::Operator, ":"))
}

/// The final physical line is empty or blank and follows at least one newline.
fn ends_with_blank_line(text: &str) -> bool {
    match text.rfind('\n') {
        Some(idx) => {
            text[idx + 1..].trim().is_empty()
                && text[..idx].trim_end_matches([' ', '\t', '\r']).ends_with('\n')
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_lines_are_complete() {
        for text in ["", "pos x 10", "x = [1, 2]", "'''doc'''", "pos 1 # c", "a; b"] {
            assert_eq!(check_completeness(text), Completeness::Complete, "{text:?}");
        }
    }

    #[test]
    fn test_open_brackets_need_more_lines() {
        assert_eq!(check_completeness("pos x [1,"), Completeness::Incomplete);
        assert_eq!(check_completeness("f(a,\n  {1: 2"), Completeness::Incomplete);
        assert_eq!(check_completeness("f(a,\n  b)"), Completeness::Complete);
    }

    #[test]
    fn test_open_triple_quote_needs_more_lines() {
        assert_eq!(check_completeness("s = '''abc"), Completeness::Incomplete);
        assert_eq!(check_completeness("s = \"\"\"abc\n"), Completeness::Incomplete);
    }

    #[test]
    fn test_trailing_continuation_needs_more_lines() {
        assert_eq!(check_completeness("pos x \\\n"), Completeness::Incomplete);
        assert_eq!(check_completeness("pos x \\\n 10"), Completeness::Complete);
    }

    #[test]
    fn test_suite_waits_for_blank_line() {
        assert_eq!(check_completeness("for i in x:"), Completeness::Incomplete);
        assert_eq!(check_completeness("for i in x:\n    pos i"), Completeness::Incomplete);
        assert_eq!(
            check_completeness("for i in x:\n    pos i\n"),
            Completeness::Incomplete
        );
        assert_eq!(
            check_completeness("for i in x:\n    pos i\n\n"),
            Completeness::Complete
        );
        assert_eq!(
            check_completeness("if x: # note\n    y()\n   \n"),
            Completeness::Complete
        );
    }

    #[test]
    fn test_colon_inside_brackets_is_not_a_suite() {
        assert_eq!(check_completeness("d = {1:\n 2}"), Completeness::Complete);
        assert_eq!(check_completeness("x[1:]"), Completeness::Complete);
    }

    #[test]
    fn test_unmatched_or_mismatched_close_is_invalid() {
        assert!(matches!(check_completeness("x)"), Completeness::Invalid(_)));
        assert!(matches!(check_completeness("(]"), Completeness::Invalid(_)));
        assert!(matches!(
            check_completeness("pos foo [1, 2, 3, 4)"),
            Completeness::Invalid(_)
        ));
    }

    #[test]
    fn test_unterminated_single_quote_is_invalid() {
        assert_eq!(
            check_completeness("pos 'abc"),
            Completeness::Invalid("unterminated string literal".to_string())
        );
        assert!(matches!(
            check_completeness("s = 'abc\n"),
            Completeness::Invalid(_)
        ));
        // An escaped backslash does not continue the line.
        assert!(matches!(
            check_completeness("s = 'abc\\\\\n"),
            Completeness::Invalid(_)
        ));
    }

    #[test]
    fn test_backslash_newline_inside_string_needs_more_lines() {
        assert_eq!(check_completeness("s = 'abc\\\n"), Completeness::Incomplete);
        assert_eq!(check_completeness("s = \"abc\\\r\n"), Completeness::Incomplete);
        assert_eq!(check_completeness("s = 'abc\\\ndef'\n"), Completeness::Complete);
        assert!(matches!(
            check_completeness("s = 'abc\\\ndef\n"),
            Completeness::Invalid(_)
        ));
    }
}
