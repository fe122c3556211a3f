// Copyright 2026 The garnet authors
// SPDX-License-Identifier: Apache-2.0

//! Pratt parser for Ruby source code.
//!
//! The parser pulls tokens lazily from a [`Lexer`] and builds an
//! [`ast::Program`](crate::ast::Program). It is designed for tooling use
//! with comprehensive error recovery:
//!
//! - **Error recovery is mandatory** — parsing always produces a program
//! - **Multiple errors** — all diagnostics are reported, not just the first
//! - **No panics** — failed productions yield `None` sub-trees
//!
//! # Precedence
//!
//! Expression parsing is Pratt-style: each token kind may act as a *prefix*
//! (starting an expression) and/or an *infix* (extending a left operand),
//! and the parse loop climbs while the next token binds tighter than the
//! caller's minimum. The ladder, ascending:
//!
//! | Level | Tokens |
//! |-------|--------|
//! | `MODIFIER` | `if` `unless` `while` `until` as modifiers |
//! | `RESCUE_MOD` | `rescue` modifier |
//! | `ASSIGNMENT` | `=` and compound assignments (right-assoc) |
//! | `TERNARY` | `? :` |
//! | `RANGE` | `..` `...` |
//! | `OR` / `AND` | `or` / `and` (with `\|\|` and `&&` five above) |
//! | `NOT` | prefix `not` |
//! | `EQUALS` | `==` `!=` `===` `<=>` `=~` `!~` |
//! | `COMPARE` | `<` `>` `<=` `>=` |
//! | `BITOR` / `BITAND` | `\|` `^` / `&` |
//! | `SHIFT` | `<<` `>>` |
//! | `SUM` / `PRODUCT` | `+` `-` / `*` `/` `%` |
//! | `UNARY` | prefix `!` `~` `+` `-` |
//! | `POWER` | `**` (right-assoc) |
//! | `INDEX` | `[` |
//! | `CALL` | `.` `&.` `::` |
//!
//! # Lookahead
//!
//! The parser holds exactly two tokens, `cur` and `peek`. Advancing slides
//! `peek` into `cur` and pulls a new `peek`, transparently skipping
//! newlines and comments; a `saw_newline` flag records whether a newline
//! went by, which is what terminates paren-less argument lists and
//! statements.

use ecow::EcoString;

use crate::ast::Program;
use crate::source_analysis::{Lexer, Position, Token, TokenKind};

mod expressions;
mod statements;

/// Precedence levels for Ruby operators, ascending.
pub(super) mod precedence {
    pub const LOWEST: u8 = 1;
    /// `if`, `unless`, `while`, `until` as modifiers.
    pub const MODIFIER: u8 = 2;
    /// `rescue` as a modifier.
    pub const RESCUE_MOD: u8 = 3;
    /// `=` and compound assignments; right-associative.
    pub const ASSIGNMENT: u8 = 4;
    /// `? :`
    pub const TERNARY: u8 = 5;
    /// `..` and `...`
    pub const RANGE: u8 = 6;
    /// Keyword `or`; `||` binds five levels above.
    pub const OR: u8 = 7;
    /// Keyword `and`; `&&` binds five levels above.
    pub const AND: u8 = 8;
    /// Prefix `not`.
    pub const NOT: u8 = 9;
    /// `==` `!=` `===` `<=>` `=~` `!~`
    pub const EQUALS: u8 = 10;
    /// `<` `>` `<=` `>=`
    pub const COMPARE: u8 = 11;
    /// `|` `^`
    pub const BITOR: u8 = 12;
    /// `&`
    pub const BITAND: u8 = 13;
    /// `<<` `>>`
    pub const SHIFT: u8 = 14;
    /// `+` `-`
    pub const SUM: u8 = 15;
    /// `*` `/` `%`
    pub const PRODUCT: u8 = 16;
    /// Prefix `!` `~` and unary `+` `-`.
    pub const UNARY: u8 = 17;
    /// `**`; right-associative via parsing its RHS at `POWER - 1`.
    pub const POWER: u8 = 18;
    /// `[` indexing.
    pub const INDEX: u8 = 19;
    /// `.` `&.` `::`
    pub const CALL: u8 = 20;
}

/// The infix binding strength of a token kind; `LOWEST` when the kind
/// cannot extend an expression.
pub(super) fn token_precedence(kind: TokenKind) -> u8 {
    use precedence::{
        AND, ASSIGNMENT, BITAND, BITOR, CALL, COMPARE, EQUALS, INDEX, LOWEST, MODIFIER, OR, POWER,
        PRODUCT, RANGE, RESCUE_MOD, SHIFT, SUM, TERNARY,
    };
    match kind {
        TokenKind::KeywordIf
        | TokenKind::KeywordIfModifier
        | TokenKind::KeywordUnless
        | TokenKind::KeywordUnlessModifier
        | TokenKind::KeywordWhile
        | TokenKind::KeywordWhileModifier
        | TokenKind::KeywordUntil
        | TokenKind::KeywordUntilModifier => MODIFIER,
        TokenKind::KeywordRescue | TokenKind::KeywordRescueModifier => RESCUE_MOD,
        TokenKind::Equal
        | TokenKind::PlusEqual
        | TokenKind::MinusEqual
        | TokenKind::StarEqual
        | TokenKind::SlashEqual
        | TokenKind::PercentEqual
        | TokenKind::StarStarEqual
        | TokenKind::AmpersandEqual
        | TokenKind::PipeEqual
        | TokenKind::CaretEqual
        | TokenKind::LessLessEqual
        | TokenKind::GreaterGreaterEqual
        | TokenKind::PipePipeEqual
        | TokenKind::AmpersandAmpersandEqual => ASSIGNMENT,
        TokenKind::Question => TERNARY,
        TokenKind::DotDot | TokenKind::DotDotDot => RANGE,
        TokenKind::KeywordOr => OR,
        TokenKind::KeywordAnd => AND,
        TokenKind::PipePipe => OR + 5,
        TokenKind::AmpersandAmpersand => AND + 5,
        TokenKind::EqualEqual
        | TokenKind::BangEqual
        | TokenKind::EqualEqualEqual
        | TokenKind::LessEqualGreater
        | TokenKind::EqualTilde
        | TokenKind::BangTilde => EQUALS,
        TokenKind::Less | TokenKind::Greater | TokenKind::LessEqual | TokenKind::GreaterEqual => {
            COMPARE
        }
        TokenKind::Pipe | TokenKind::Caret => BITOR,
        TokenKind::Ampersand => BITAND,
        TokenKind::LessLess | TokenKind::GreaterGreater => SHIFT,
        TokenKind::Plus | TokenKind::Minus => SUM,
        TokenKind::Star | TokenKind::Slash | TokenKind::Percent => PRODUCT,
        TokenKind::StarStar => POWER,
        TokenKind::LBracket => INDEX,
        TokenKind::Dot | TokenKind::AmpersandDot | TokenKind::ColonColon => CALL,
        _ => LOWEST,
    }
}

/// Nesting depth past which expression parsing reports an error instead of
/// recursing further.
const MAX_NESTING_DEPTH: u32 = 256;

/// A parser diagnostic: the message and the source position it refers to.
///
/// `Display` yields the message alone, so `errors().iter().map(ToString)`
/// produces the documented diagnostic strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// The error message.
    pub message: EcoString,
    /// The source position of the offending token.
    pub position: Position,
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

/// Parses a whole source string.
///
/// This is the main entry point. It always returns a [`Program`], even for
/// malformed input — check the returned diagnostics for errors.
///
/// # Examples
///
/// ```
/// use garnet_core::source_analysis::parse;
///
/// let (program, diagnostics) = parse("x = 1 + 2");
/// assert!(diagnostics.is_empty());
/// assert_eq!(program.statements.len(), 1);
/// ```
#[must_use]
pub fn parse(source: &str) -> (Program, Vec<Diagnostic>) {
    let mut parser = Parser::new(Lexer::new(source));
    let program = parser.parse_program();
    (program, parser.diagnostics)
}

/// The parser state.
pub struct Parser<'src> {
    lexer: Lexer<'src>,
    /// The token under consideration.
    pub(super) cur: Token,
    /// One token of lookahead.
    pub(super) peek: Token,
    /// Whether a newline was skipped while pulling the current `peek`.
    pub(super) saw_newline: bool,
    pub(super) diagnostics: Vec<Diagnostic>,
    nesting: u32,
}

impl<'src> Parser<'src> {
    /// Creates a parser pulling from the given lexer.
    #[must_use]
    pub fn new(lexer: Lexer<'src>) -> Self {
        let placeholder = Token::new(TokenKind::Eof, "", Position::new(1, 1, 0));
        let mut parser = Self {
            lexer,
            cur: placeholder.clone(),
            peek: placeholder,
            saw_newline: false,
            diagnostics: Vec::new(),
            nesting: 0,
        };
        // Load cur and peek.
        parser.advance();
        parser.advance();
        parser
    }

    /// The diagnostics collected so far, in source order.
    #[must_use]
    pub fn errors(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    // ========================================================================
    // Token management
    // ========================================================================

    /// Slides `peek` into `cur` and pulls a new `peek`, skipping newline
    /// and comment trivia. `saw_newline` records whether a hard newline
    /// went by, for statement-termination decisions.
    pub(super) fn advance(&mut self) {
        self.cur = std::mem::replace(&mut self.peek, self.lexer.next_token());
        self.saw_newline = false;
        while matches!(
            self.peek.kind(),
            TokenKind::Newline
                | TokenKind::IgnoredNewline
                | TokenKind::Comment
                | TokenKind::EmbdocBegin
                | TokenKind::EmbdocLine
                | TokenKind::EmbdocEnd
        ) {
            if self.peek.kind() == TokenKind::Newline {
                self.saw_newline = true;
            }
            self.peek = self.lexer.next_token();
        }
    }

    pub(super) fn cur_is(&self, kind: TokenKind) -> bool {
        self.cur.kind() == kind
    }

    pub(super) fn peek_is(&self, kind: TokenKind) -> bool {
        self.peek.kind() == kind
    }

    pub(super) fn cur_precedence(&self) -> u8 {
        token_precedence(self.cur.kind())
    }

    pub(super) fn peek_precedence(&self) -> u8 {
        token_precedence(self.peek.kind())
    }

    /// Advances when `peek` has the expected kind; otherwise records the
    /// mismatch and leaves the position untouched.
    pub(super) fn expect_peek(&mut self, kind: TokenKind) -> bool {
        if self.peek_is(kind) {
            self.advance();
            true
        } else {
            self.peek_error(kind);
            false
        }
    }

    // ========================================================================
    // Error handling
    // ========================================================================

    pub(super) fn peek_error(&mut self, expected: TokenKind) {
        let message = ecow::eco_format!(
            "expected next token to be {}, got {} instead (literal: {:?})",
            expected,
            self.peek.kind(),
            self.peek.literal()
        );
        self.diagnostics.push(Diagnostic {
            message,
            position: self.peek.position(),
        });
    }

    pub(super) fn no_prefix_error(&mut self) {
        tracing::trace!(kind = %self.cur.kind(), "no prefix parse function; recovering");
        let message = ecow::eco_format!(
            "no prefix parse function for {} found (literal: {:?})",
            self.cur.kind(),
            self.cur.literal()
        );
        self.diagnostics.push(Diagnostic {
            message,
            position: self.cur.position(),
        });
    }

    pub(super) fn error(&mut self, message: impl Into<EcoString>) {
        self.diagnostics.push(Diagnostic {
            message: message.into(),
            position: self.cur.position(),
        });
    }

    /// Guards expression recursion; reports once the depth cap is hit.
    pub(super) fn enter_nesting(&mut self) -> bool {
        if self.nesting >= MAX_NESTING_DEPTH {
            self.error("expression nesting too deep");
            return false;
        }
        self.nesting += 1;
        true
    }

    pub(super) fn leave_nesting(&mut self) {
        self.nesting = self.nesting.saturating_sub(1);
    }

    // ========================================================================
    // Program parsing
    // ========================================================================

    /// Parses statements until `EOF` and returns the program.
    ///
    /// Never fails; inspect [`Parser::errors`] afterwards. Forward progress
    /// is guaranteed: every iteration consumes at least one token.
    pub fn parse_program(&mut self) -> Program {
        let mut program = Program::default();

        while !self.cur_is(TokenKind::Eof) {
            match self.cur.kind() {
                // Empty statement.
                TokenKind::Semicolon => {}
                // __END__ terminates the program text.
                TokenKind::EndMarker => break,
                _ => {
                    self.nesting = 0;
                    if let Some(statement) = self.parse_statement() {
                        program.statements.push(statement);
                    }
                }
            }
            self.advance();
        }

        tracing::debug!(
            statements = program.statements.len(),
            errors = self.diagnostics.len(),
            "parsed program"
        );
        program
    }

    /// `true` when `peek` cannot continue the current statement.
    pub(super) fn peek_is_statement_end(&self) -> bool {
        if self.saw_newline {
            return true;
        }
        matches!(
            self.peek.kind(),
            TokenKind::Eof
                | TokenKind::Newline
                | TokenKind::Semicolon
                | TokenKind::KeywordEnd
                | TokenKind::KeywordElse
                | TokenKind::KeywordElsif
                | TokenKind::KeywordWhen
                | TokenKind::KeywordRescue
                | TokenKind::KeywordEnsure
                | TokenKind::RBrace
                | TokenKind::RParen
                | TokenKind::RBracket
        )
    }

    /// `true` when `peek` is a clause keyword that terminates statements
    /// inside `begin`-like bodies.
    pub(super) fn peek_is_clause_keyword(&self) -> bool {
        matches!(
            self.peek.kind(),
            TokenKind::KeywordRescue
                | TokenKind::KeywordElse
                | TokenKind::KeywordEnsure
                | TokenKind::KeywordEnd
                | TokenKind::KeywordElsif
                | TokenKind::KeywordWhen
        )
    }
}

/// Checks whether source text looks complete enough for a REPL to evaluate.
///
/// A heuristic for multi-line input handling: it balances parentheses,
/// brackets, braces, string framing, and block-opening keywords against
/// `end`, and treats a trailing operator, comma, or dot as expecting more
/// input. Keywords in modifier position (`x if y`) do not open blocks, and
/// the `do` that closes a `while`/`until`/`for` condition does not either.
///
/// Extra closers (a stray `end` or `]`) count as complete so the parser can
/// report the error instead of prompting forever.
///
/// # Examples
///
/// ```
/// use garnet_core::source_analysis::is_input_complete;
///
/// assert!(is_input_complete("x = 3 + 4"));
/// assert!(!is_input_complete("def foo"));       // open method body
/// assert!(!is_input_complete("[1, 2"));         // unclosed bracket
/// assert!(!is_input_complete("x = \"abc"));     // unterminated string
/// assert!(is_input_complete("puts 1 if debug")); // modifier, not a block
/// ```
#[must_use]
pub fn is_input_complete(source: &str) -> bool {
    if source.trim().is_empty() {
        return true;
    }

    let tokens = super::lex_with_eof(source);

    let mut paren_depth: i32 = 0;
    let mut bracket_depth: i32 = 0;
    let mut brace_depth: i32 = 0;
    let mut block_depth: i32 = 0;
    let mut string_depth: i32 = 0;
    // `do` closing a loop condition does not open a new block.
    let mut pending_loop_do = false;
    let mut prev: Option<TokenKind> = None;

    for token in &tokens {
        let kind = token.kind();
        match kind {
            TokenKind::LParen | TokenKind::LParenArg | TokenKind::LParenBeg => paren_depth += 1,
            TokenKind::RParen => paren_depth -= 1,
            TokenKind::LBracket | TokenKind::LBracketArray => bracket_depth += 1,
            TokenKind::RBracket => bracket_depth -= 1,
            TokenKind::LBrace | TokenKind::LBraceArg | TokenKind::LBraceBlock => brace_depth += 1,
            TokenKind::RBrace => brace_depth -= 1,

            TokenKind::StringBegin
            | TokenKind::XstringBegin
            | TokenKind::RegexpBegin
            | TokenKind::WordsBegin
            | TokenKind::SymbolsBegin
            | TokenKind::HeredocBegin
            | TokenKind::EmbexprBegin => string_depth += 1,
            // A bare `:name` symbol introducer has no closing token.
            TokenKind::SymbolBegin if token.literal().len() > 1 => string_depth += 1,
            TokenKind::StringEnd
            | TokenKind::RegexpEnd
            | TokenKind::HeredocEnd
            | TokenKind::EmbexprEnd => string_depth -= 1,

            TokenKind::KeywordDef
            | TokenKind::KeywordClass
            | TokenKind::KeywordModule
            | TokenKind::KeywordCase
            | TokenKind::KeywordBegin => block_depth += 1,
            TokenKind::KeywordFor => {
                block_depth += 1;
                pending_loop_do = true;
            }
            TokenKind::KeywordIf
            | TokenKind::KeywordUnless
            | TokenKind::KeywordWhile
            | TokenKind::KeywordUntil => {
                // Modifier position follows a value; only expression
                // position opens a block.
                if !prev.is_some_and(is_value_end) {
                    block_depth += 1;
                    if matches!(kind, TokenKind::KeywordWhile | TokenKind::KeywordUntil) {
                        pending_loop_do = true;
                    }
                }
            }
            TokenKind::KeywordDo
            | TokenKind::KeywordDoBlock
            | TokenKind::KeywordDoCond
            | TokenKind::KeywordDoLambda => {
                if pending_loop_do {
                    pending_loop_do = false;
                } else {
                    block_depth += 1;
                }
            }
            TokenKind::KeywordEnd => block_depth -= 1,

            TokenKind::Newline | TokenKind::Semicolon => pending_loop_do = false,
            TokenKind::Eof => break,
            _ => {}
        }

        if !matches!(
            kind,
            TokenKind::Newline | TokenKind::IgnoredNewline | TokenKind::Comment | TokenKind::Eof
        ) {
            prev = Some(kind);
        }
    }

    if paren_depth > 0 || bracket_depth > 0 || brace_depth > 0 || string_depth > 0 {
        return false;
    }
    if block_depth > 0 {
        return false;
    }

    // A trailing token that demands a right operand keeps the prompt open.
    match prev {
        Some(kind) if kind.is_operator() => false,
        Some(TokenKind::Comma | TokenKind::Question | TokenKind::Colon) => false,
        _ => true,
    }
}

/// `true` for kinds that end a value, putting a following keyword into
/// modifier position.
fn is_value_end(kind: TokenKind) -> bool {
    matches!(
        kind,
        TokenKind::Ident
            | TokenKind::Constant
            | TokenKind::MethodName
            | TokenKind::Ivar
            | TokenKind::Cvar
            | TokenKind::Gvar
            | TokenKind::NthRef
            | TokenKind::BackRef
            | TokenKind::Integer
            | TokenKind::Float
            | TokenKind::Rational
            | TokenKind::Imaginary
            | TokenKind::Char
            | TokenKind::StringEnd
            | TokenKind::RegexpEnd
            | TokenKind::HeredocEnd
            | TokenKind::RParen
            | TokenKind::RBracket
            | TokenKind::RBrace
            | TokenKind::KeywordEnd
            | TokenKind::KeywordTrue
            | TokenKind::KeywordFalse
            | TokenKind::KeywordNil
            | TokenKind::KeywordSelf
    )
}
