//! Rewriting of command-style alias invocations into call syntax.
//!
//! `pos x 10` becomes `pos(x, 10)` when `pos` is a registered alias, while ordinary code
//! passes through untouched. Rewriting only happens for an alias word found at a statement
//! start: the beginning of the input, after a top-level newline (which also covers the
//! `:` + newline that opens an indented suite), or after a top-level `;`.

use crate::lexer::{self, Token, TokenKind};
use std::collections::BTreeSet;
use tracing::{debug, trace};

/// How the bare arguments of an alias are passed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AliasKind {
    /// `name a b` → `name(a, b)`
    Plain,
    /// `name a b` → `name([a, b])`
    Vararg,
}

/// Registered alias names, split into two disjoint sets.
#[derive(Debug, Clone, Default)]
pub struct AliasTable {
    plain: BTreeSet<String>,
    vararg: BTreeSet<String>,
}

impl AliasTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `name` with the given kind. A name registered earlier with the other
    /// kind is moved, so a name is never in both sets.
    pub fn insert(&mut self, name: impl Into<String>, kind: AliasKind) {
        let name = name.into();
        let (target, other) = match kind {
            AliasKind::Plain => (&mut self.plain, &mut self.vararg),
            AliasKind::Vararg => (&mut self.vararg, &mut self.plain),
        };
        other.remove(&name);
        target.insert(name);
    }

    pub fn kind_of(&self, name: &str) -> Option<AliasKind> {
        if self.plain.contains(name) {
            Some(AliasKind::Plain)
        } else if self.vararg.contains(name) {
            Some(AliasKind::Vararg)
        } else {
            None
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.kind_of(name).is_some()
    }

    /// All aliases in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, AliasKind)> {
        let mut all: Vec<(&str, AliasKind)> = self
            .plain
            .iter()
            .map(|n| (n.as_str(), AliasKind::Plain))
            .chain(self.vararg.iter().map(|n| (n.as_str(), AliasKind::Vararg)))
            .collect();
        all.sort_by(|a, b| a.0.cmp(b.0));
        all.into_iter()
    }

    pub fn len(&self) -> usize {
        self.plain.len() + self.vararg.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Translates console input into valid calls of the embedded scripting language.
///
/// The translator keeps no state between calls to [`Translator::translate`]; every call
/// scans its input as a self-contained unit.
///
/// Example
/// ```
/// use alias_console::Translator;
/// let mut tr = Translator::new();
/// tr.add_aliased_command("pos");
/// tr.add_aliased_vararg_command("foo");
/// assert_eq!(tr.translate("pos x 10"), "pos(x, 10)");
/// assert_eq!(tr.translate("foo 1 2 3"), "foo([1, 2, 3])");
/// assert_eq!(tr.translate("x = 1"), "x = 1");
/// ```
#[derive(Debug, Clone, Default)]
pub struct Translator {
    aliases: AliasTable,
}

impl Translator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a plain alias. Idempotent.
    pub fn add_aliased_command(&mut self, name: impl Into<String>) {
        self.aliases.insert(name, AliasKind::Plain);
    }

    /// Registers a vararg alias whose bare arguments are collected into one list. Idempotent.
    pub fn add_aliased_vararg_command(&mut self, name: impl Into<String>) {
        self.aliases.insert(name, AliasKind::Vararg);
    }

    pub fn aliases(&self) -> &AliasTable {
        &self.aliases
    }

    /// Rewrites every bare alias invocation in `text` into call syntax.
    ///
    /// Never fails: malformed input is rewritten on a best-effort basis and left for the
    /// script engine to reject.
    pub fn translate(&self, text: &str) -> String {
        let rewriter = Rewriter::new(lexer::tokens(text), &self.aliases);
        let out = rewriter.rewrite();
        if out != text {
            debug!(input = text, output = out.as_str(), "translated input");
        }
        out
    }
}

struct Rewriter<'a> {
    tokens: Vec<Token>,
    pos: usize,
    aliases: &'a AliasTable,
    out: String,
    depth: usize,
    statement_start: bool,
}

impl<'a> Rewriter<'a> {
    fn new(tokens: Vec<Token>, aliases: &'a AliasTable) -> Self {
        Rewriter {
            tokens,
            pos: 0,
            aliases,
            out: String::new(),
            depth: 0,
            statement_start: true,
        }
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn consume(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn emit(&mut self, token: &Token) {
        self.out.push_str(token.text());
        self.depth = lexer::track_depth(self.depth, token);
    }

    fn rewrite(mut self) -> String {
        while let Some(token) = self.consume() {
            match token.kind() {
                // Indentation and comments do not end the search for a statement's first word.
                TokenKind::Whitespace | TokenKind::Comment if self.statement_start => {
                    self.emit(&token);
                }
                TokenKind::Word if self.statement_start => {
                    self.statement_start = false;
                    match self.aliases.kind_of(token.text()) {
                        Some(kind) if !self.next_is_call_paren() => {
                            self.rewrite_invocation(token.text(), kind);
                        }
                        _ => self.emit(&token),
                    }
                }
                TokenKind::Newline if self.depth == 0 => {
                    self.emit(&token);
                    self.statement_start = true;
                }
                TokenKind::Operator if self.depth == 0 && token.text() == ";" => {
                    self.emit(&token);
                    self.statement_start = true;
                }
                _ => {
                    self.emit(&token);
                    self.statement_start = false;
                }
            }
        }
        self.out
    }

    /// `name(` with nothing in between is already a call.
    fn next_is_call_paren(&self) -> bool {
        self.peek().is_some_and(|t| t.is(TokenKind::Bracket, "("))
    }

    fn rewrite_invocation(&mut self, name: &str, kind: AliasKind) {
        let region = self.take_region();
        let units = split_units(&region);

        let call = match units.as_slice() {
            // `pos (a, b)`: the group already is the argument list.
            [only] if is_parenthesized(only) => format!("{}{}", name, unit_text(only)),
            _ => {
                let args = units
                    .iter()
                    .map(|unit| unit_text(unit))
                    .collect::<Vec<_>>()
                    .join(", ");
                match kind {
                    AliasKind::Plain => format!("{name}({args})"),
                    // Zero bare arguments give `name()`, not `name([])`.
                    AliasKind::Vararg if units.is_empty() => format!("{name}()"),
                    AliasKind::Vararg => format!("{name}([{args}])"),
                }
            }
        };

        trace!(
            alias = name,
            ?kind,
            units = units.len(),
            call = call.as_str(),
            "rewrote bare invocation"
        );
        self.out.push_str(&call);
    }

    /// Consumes the argument region: everything up to the first region-level newline,
    /// `;`, comment, or the end of input. The terminator itself is left in place.
    fn take_region(&mut self) -> Vec<Token> {
        let mut region = Vec::new();
        let mut depth = 0;

        while let Some(token) = self.peek() {
            let ends_statement = depth == 0
                && (matches!(token.kind(), TokenKind::Newline | TokenKind::Comment)
                    || token.is(TokenKind::Operator, ";"));
            if ends_statement {
                break;
            }
            depth = lexer::track_depth(depth, token);
            if let Some(token) = self.consume() {
                region.push(token);
            }
        }

        self.depth = depth;
        region
    }
}

/// Splits an argument region on commas and whitespace at bracket depth 0.
///
/// Separator runs collapse into one boundary, except that two commas with only
/// whitespace between them keep an empty unit: `1, , 3` stays `1, , 3`, and so does a
/// leading `, , 3`.
fn split_units(region: &[Token]) -> Vec<Vec<&Token>> {
    let mut units: Vec<Vec<&Token>> = Vec::new();
    let mut current: Vec<&Token> = Vec::new();
    let mut depth = 0;
    let mut after_comma = false;

    for token in region {
        let separator =
            depth == 0 && matches!(token.kind(), TokenKind::Whitespace | TokenKind::Comma);
        if !separator {
            depth = lexer::track_depth(depth, token);
            current.push(token);
            continue;
        }

        if !current.is_empty() {
            units.push(std::mem::take(&mut current));
            after_comma = false;
        }
        if token.kind() == TokenKind::Comma {
            if after_comma {
                units.push(Vec::new());
            }
            after_comma = true;
        }
    }

    if !current.is_empty() {
        units.push(current);
    }
    units
}

/// A unit that is exactly one `( ... )` group.
fn is_parenthesized(unit: &[&Token]) -> bool {
    let Some(first) = unit.first() else {
        return false;
    };
    if !first.is(TokenKind::Bracket, "(") {
        return false;
    }

    let mut depth = 0;
    for (i, token) in unit.iter().enumerate() {
        depth = lexer::track_depth(depth, token);
        if depth == 0 {
            return i == unit.len() - 1;
        }
    }
    false
}

fn unit_text(unit: &[&Token]) -> String {
    unit.iter().map(|t| t.text()).collect()
}
