//! Lossless tokenizer for Python-like console input.
//!
//! Every character of the input lands in exactly one token, so concatenating the
//! token texts always gives back the original string, even for unterminated strings
//! and unbalanced brackets. Classification of newlines depends on bracket depth:
//! inside brackets a newline is just more whitespace, at the top level it ends a statement.

use std::fmt;

/// Kind of a lexical token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// Identifiers, numeric literals and dotted chains such as `foo.bar` or `6.02e23`.
    Word,
    /// A run of spaces/tabs, a single backslash-newline continuation, or (inside brackets)
    /// a run of spaces, tabs and newlines.
    Whitespace,
    /// A bare newline at bracket depth 0.
    Newline,
    /// Quoted or triple-quoted string, possibly with a one-letter prefix and possibly unterminated.
    StringLiteral,
    /// One of `(`, `)`, `[`, `]`, `{`, `}`.
    Bracket,
    /// The `,` separator.
    Comma,
    /// `#` up to the end of the physical line.
    Comment,
    /// Any other single character, e.g. `=`, `:`, `;`, `+`.
    Operator,
}

/// A token: its kind plus the exact source text it covers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    kind: TokenKind,
    text: String,
}

impl Token {
    pub fn new(kind: TokenKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
        }
    }

    pub fn kind(&self) -> TokenKind {
        self.kind
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// True for `(`, `[` and `{`.
    pub fn is_opening_bracket(&self) -> bool {
        self.kind == TokenKind::Bracket && matches!(self.text.as_str(), "(" | "[" | "{")
    }

    /// True for `)`, `]` and `}`.
    pub fn is_closing_bracket(&self) -> bool {
        self.kind == TokenKind::Bracket && matches!(self.text.as_str(), ")" | "]" | "}")
    }

    /// Checks both kind and text, e.g. `token.is(TokenKind::Operator, ";")`.
    pub fn is(&self, kind: TokenKind, text: &str) -> bool {
        self.kind == kind && self.text == text
    }

    /// Whether a string literal token contains its closing quote(s).
    ///
    /// Always `false` for tokens that are not string literals.
    pub fn is_terminated_string(&self) -> bool {
        if self.kind != TokenKind::StringLiteral {
            return false;
        }
        let mut scanner = Scanner::new(&self.text);
        let terminated = scanner.scan_string();
        terminated && scanner.pos == scanner.input.len()
    }

    /// Whether a string literal token opens with a triple quote.
    pub fn is_triple_quoted(&self) -> bool {
        if self.kind != TokenKind::StringLiteral {
            return false;
        }
        let body = self.text.trim_start_matches(is_string_prefix);
        body.starts_with("'''") || body.starts_with("\"\"\"")
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}({:?})", self.kind, self.text)
    }
}

/// Applies a bracket token to a running depth counter. Depth never goes below zero.
pub(crate) fn track_depth(depth: usize, token: &Token) -> usize {
    if token.is_opening_bracket() {
        depth + 1
    } else if token.is_closing_bracket() {
        depth.saturating_sub(1)
    } else {
        depth
    }
}

fn is_string_prefix(c: char) -> bool {
    matches!(c, 'r' | 'R' | 'b' | 'B' | 'u' | 'U' | 'f' | 'F')
}

fn is_quote(c: char) -> bool {
    c == '\'' || c == '"'
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '.'
}

fn is_blank(c: char) -> bool {
    c == ' ' || c == '\t'
}

struct Scanner {
    input: Vec<char>,
    pos: usize,
    depth: usize,
}

impl Scanner {
    fn new(text: &str) -> Self {
        Scanner {
            input: text.chars().collect(),
            pos: 0,
            depth: 0,
        }
    }

    fn make_tokens(mut self) -> Vec<Token> {
        let mut out = Vec::new();

        while let Some(ch) = self.peek_char() {
            let start = self.pos;
            let kind = self.scan_token(ch);
            debug_assert!(self.pos > start, "scanner must always advance");
            let text: String = self.input[start..self.pos].iter().collect();
            let token = Token::new(kind, text);
            self.depth = track_depth(self.depth, &token);
            out.push(token);
        }

        out
    }

    fn peek_char(&self) -> Option<char> {
        self.peek_at(0)
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.input.get(self.pos + offset).copied()
    }

    fn advance(&mut self, n: usize) {
        self.pos = (self.pos + n).min(self.input.len());
    }

    /// Length of the newline sequence at `pos + offset`: 1 for `\n`, 2 for `\r\n`, else 0.
    fn newline_len(&self, offset: usize) -> usize {
        match (self.peek_at(offset), self.peek_at(offset + 1)) {
            (Some('\n'), _) => 1,
            (Some('\r'), Some('\n')) => 2,
            _ => 0,
        }
    }

    /// Length of a backslash-newline continuation at the cursor, or 0.
    fn continuation_len(&self) -> usize {
        if self.peek_char() != Some('\\') {
            return 0;
        }
        match self.newline_len(1) {
            0 => 0,
            n => n + 1,
        }
    }

    fn at_string_start(&self, ch: char) -> bool {
        is_quote(ch) || (is_string_prefix(ch) && self.peek_at(1).is_some_and(is_quote))
    }

    fn scan_token(&mut self, ch: char) -> TokenKind {
        if self.at_string_start(ch) {
            self.scan_string();
            return TokenKind::StringLiteral;
        }

        match ch {
            '#' => {
                self.scan_comment();
                TokenKind::Comment
            }
            '(' | ')' | '[' | ']' | '{' | '}' => {
                self.advance(1);
                TokenKind::Bracket
            }
            ',' => {
                self.advance(1);
                TokenKind::Comma
            }
            ' ' | '\t' => {
                self.scan_blanks();
                TokenKind::Whitespace
            }
            '\\' if self.continuation_len() > 0 => {
                self.advance(self.continuation_len());
                TokenKind::Whitespace
            }
            '\n' | '\r' if self.newline_len(0) > 0 => {
                if self.depth > 0 {
                    self.scan_blanks();
                    TokenKind::Whitespace
                } else {
                    self.advance(self.newline_len(0));
                    TokenKind::Newline
                }
            }
            c if is_word_char(c) => {
                self.scan_word();
                TokenKind::Word
            }
            _ => {
                self.advance(1);
                TokenKind::Operator
            }
        }
    }

    /// Spaces and tabs; inside brackets newlines are swallowed too.
    fn scan_blanks(&mut self) {
        while let Some(ch) = self.peek_char() {
            if is_blank(ch) {
                self.advance(1);
            } else if self.depth > 0 && self.newline_len(0) > 0 {
                self.advance(self.newline_len(0));
            } else {
                break;
            }
        }
    }

    fn scan_comment(&mut self) {
        while self.peek_char().is_some() {
            if self.newline_len(0) > 0 || self.continuation_len() > 0 {
                break;
            }
            self.advance(1);
        }
    }

    fn scan_word(&mut self) {
        let start = self.pos;
        loop {
            match self.peek_char() {
                Some(c) if is_word_char(c) => self.advance(1),
                Some('+' | '-') if self.at_exponent_sign(start) => self.advance(1),
                _ => break,
            }
        }
    }

    /// `1e-5`: a sign directly after the exponent marker of a decimal numeral, followed by a digit.
    fn at_exponent_sign(&self, start: usize) -> bool {
        let word = &self.input[start..self.pos];
        let numeric = match word {
            ['0', 'x' | 'X', ..] => false,
            [first, ..] if first.is_ascii_digit() => true,
            ['.', second, ..] => second.is_ascii_digit(),
            _ => false,
        };
        numeric
            && matches!(word.last(), Some('e' | 'E'))
            && self.peek_at(1).is_some_and(|c| c.is_ascii_digit())
    }

    /// Scans a string literal starting at the cursor. Returns whether the closing quote was found.
    fn scan_string(&mut self) -> bool {
        if self.peek_char().is_some_and(is_string_prefix) {
            self.advance(1);
        }
        let Some(quote) = self.peek_char() else {
            return false;
        };

        let triple = self.peek_at(1) == Some(quote) && self.peek_at(2) == Some(quote);
        if triple {
            self.advance(3);
        } else {
            self.advance(1);
        }

        while let Some(ch) = self.peek_char() {
            if ch == '\\' {
                self.advance(2);
                continue;
            }
            if ch == quote {
                if !triple {
                    self.advance(1);
                    return true;
                }
                if self.peek_at(1) == Some(quote) && self.peek_at(2) == Some(quote) {
                    self.advance(3);
                    return true;
                }
            }
            self.advance(1);
        }
        false
    }
}

/// Splits `text` into tokens.
///
/// Total for any input: unterminated strings become a single string token running to
/// the end, unmatched brackets are emitted as-is, and the concatenation of all token
/// texts always equals `text`.
pub fn tokens(text: &str) -> Vec<Token> {
    Scanner::new(text).make_tokens()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use TokenKind::*;

    fn tok(kind: TokenKind, text: &str) -> Token {
        Token::new(kind, text)
    }

    fn concat(tokens: &[Token]) -> String {
        tokens.iter().map(Token::text).collect()
    }

    #[test]
    fn test_empty_input_has_no_tokens() {
        assert!(tokens("").is_empty());
    }

    #[test]
    fn test_triple_quoted_string_spans_lines() {
        assert_eq!(
            tokens("'''foo\nbar'''"),
            vec![tok(StringLiteral, "'''foo\nbar'''")]
        );
    }

    #[test]
    fn test_whitespace_around_string() {
        assert_eq!(
            tokens(" \t 'string'   "),
            vec![
                tok(Whitespace, " \t "),
                tok(StringLiteral, "'string'"),
                tok(Whitespace, "   "),
            ]
        );
    }

    #[test]
    fn test_simple_command() {
        assert_eq!(
            tokens("pos x 10"),
            vec![
                tok(Word, "pos"),
                tok(Whitespace, " "),
                tok(Word, "x"),
                tok(Whitespace, " "),
                tok(Word, "10"),
            ]
        );
    }

    #[test]
    fn test_dotted_chain_and_numerals_are_single_words() {
        for word in ["foo.bar", "a.b.c_d", "0x23", "6.02e23", ".1", "1e-5", "2E+10"] {
            assert_eq!(tokens(word), vec![tok(Word, word)], "word {word:?}");
        }
    }

    #[test]
    fn test_minus_after_identifier_is_operator() {
        assert_eq!(
            tokens("e-5"),
            vec![tok(Word, "e"), tok(Operator, "-"), tok(Word, "5")]
        );
    }

    #[test]
    fn test_adjacent_strings_are_separate_tokens() {
        assert_eq!(
            tokens("'one''two'"),
            vec![tok(StringLiteral, "'one'"), tok(StringLiteral, "'two'")]
        );
    }

    #[test]
    fn test_escaped_quote_does_not_end_string() {
        assert_eq!(
            tokens(r#"'it\'s' "a \" b""#),
            vec![
                tok(StringLiteral, r"'it\'s'"),
                tok(Whitespace, " "),
                tok(StringLiteral, r#""a \" b""#),
            ]
        );
    }

    #[test]
    fn test_prefixed_string() {
        assert_eq!(
            tokens(r"r'\d+' b'x'"),
            vec![
                tok(StringLiteral, r"r'\d+'"),
                tok(Whitespace, " "),
                tok(StringLiteral, "b'x'"),
            ]
        );
    }

    #[test]
    fn test_unterminated_strings_run_to_end() {
        assert_eq!(
            tokens("x = 'abc"),
            vec![
                tok(Word, "x"),
                tok(Whitespace, " "),
                tok(Operator, "="),
                tok(Whitespace, " "),
                tok(StringLiteral, "'abc"),
            ]
        );
        assert_eq!(tokens("\"\"\"doc\nmore"), vec![tok(StringLiteral, "\"\"\"doc\nmore")]);
        assert_eq!(tokens("'trailing\\"), vec![tok(StringLiteral, "'trailing\\")]);
    }

    #[test]
    fn test_string_termination_flags() {
        let first = |text: &str| tokens(text).remove(0);

        assert!(first("'a'").is_terminated_string());
        assert!(!first("'a'").is_triple_quoted());
        assert!(first("'''b'''").is_terminated_string());
        assert!(first("'''b'''").is_triple_quoted());
        assert!(!first("'c").is_terminated_string());
        assert!(!first("\"\"\"d\"\"").is_terminated_string());
        assert!(first("\"\"\"d\"\"").is_triple_quoted());
        assert!(!first("abc").is_terminated_string());
    }

    #[test]
    fn test_top_level_newline_is_its_own_token() {
        assert_eq!(
            tokens("a  \nb"),
            vec![
                tok(Word, "a"),
                tok(Whitespace, "  "),
                tok(Newline, "\n"),
                tok(Word, "b"),
            ]
        );
    }

    #[test]
    fn test_crlf_is_one_newline() {
        assert_eq!(
            tokens("a\r\nb"),
            vec![tok(Word, "a"), tok(Newline, "\r\n"), tok(Word, "b")]
        );
    }

    #[test]
    fn test_newline_inside_brackets_merges_with_spaces() {
        assert_eq!(
            tokens("f(1, \n  2)"),
            vec![
                tok(Word, "f"),
                tok(Bracket, "("),
                tok(Word, "1"),
                tok(Comma, ","),
                tok(Whitespace, " \n  "),
                tok(Word, "2"),
                tok(Bracket, ")"),
            ]
        );
    }

    #[test]
    fn test_newline_after_closing_bracket_is_newline_again() {
        let toks = tokens("[1]\nx");
        assert_eq!(toks[3], tok(Newline, "\n"));
    }

    #[test]
    fn test_continuation_is_never_merged() {
        assert_eq!(
            tokens("a \\\n b"),
            vec![
                tok(Word, "a"),
                tok(Whitespace, " "),
                tok(Whitespace, "\\\n"),
                tok(Whitespace, " "),
                tok(Word, "b"),
            ]
        );
        assert_eq!(
            tokens("(a \\\n b)"),
            vec![
                tok(Bracket, "("),
                tok(Word, "a"),
                tok(Whitespace, " "),
                tok(Whitespace, "\\\n"),
                tok(Whitespace, " "),
                tok(Word, "b"),
                tok(Bracket, ")"),
            ]
        );
    }

    #[test]
    fn test_backslash_without_newline_is_operator() {
        assert_eq!(
            tokens("a\\b"),
            vec![tok(Word, "a"), tok(Operator, "\\"), tok(Word, "b")]
        );
    }

    #[test]
    fn test_comment_stops_before_line_end() {
        assert_eq!(
            tokens("x # note\ny"),
            vec![
                tok(Word, "x"),
                tok(Whitespace, " "),
                tok(Comment, "# note"),
                tok(Newline, "\n"),
                tok(Word, "y"),
            ]
        );
        assert_eq!(
            tokens("# a \\\n"),
            vec![tok(Comment, "# a "), tok(Whitespace, "\\\n")]
        );
    }

    #[test]
    fn test_hash_inside_string_is_not_comment() {
        assert_eq!(tokens("'#x'"), vec![tok(StringLiteral, "'#x'")]);
    }

    #[test]
    fn test_operators_are_single_characters() {
        assert_eq!(
            tokens("a==b;"),
            vec![
                tok(Word, "a"),
                tok(Operator, "="),
                tok(Operator, "="),
                tok(Word, "b"),
                tok(Operator, ";"),
            ]
        );
    }

    #[test]
    fn test_unmatched_closing_bracket_keeps_depth_at_zero() {
        let toks = tokens(")\n(");
        assert_eq!(
            toks,
            vec![tok(Bracket, ")"), tok(Newline, "\n"), tok(Bracket, "(")]
        );
    }

    proptest! {
        #[test]
        fn prop_tokens_round_trip(text in "[a-z0-9 \t\n\\\\'\"#()\\[\\]{},.;:=+_-]{0,40}") {
            prop_assert_eq!(concat(&tokens(&text)), text);
        }

        #[test]
        fn prop_tokens_round_trip_any_unicode(text in any::<String>()) {
            prop_assert_eq!(concat(&tokens(&text)), text);
        }
    }
}
