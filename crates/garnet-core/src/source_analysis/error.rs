// Copyright 2026 The garnet authors
// SPDX-License-Identifier: Apache-2.0

//! Structured lexer-level diagnostics.
//!
//! The lexer itself never fails: bad bytes become
//! [`TokenKind::Illegal`](super::TokenKind::Illegal) tokens and unterminated
//! literals flush their buffered content before `EOF`. This module distils
//! those recovery artifacts into [`LexError`] values with labelled spans so
//! embedding tools can render rich reports via miette.

use ecow::EcoString;
use miette::Diagnostic;
use thiserror::Error;

use super::{Span, Token, TokenKind};

/// A lexer-level error, recovered from the token stream.
#[derive(Debug, Clone, Error, Diagnostic, PartialEq)]
#[error("{kind}")]
pub struct LexError {
    /// What went wrong.
    pub kind: LexErrorKind,
    /// Where it went wrong.
    #[label]
    pub at: miette::SourceSpan,
}

/// The kinds of lexer-level errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LexErrorKind {
    /// A byte no lexical rule matched.
    #[error("unexpected byte {0:?}")]
    UnexpectedByte(EcoString),
    /// The input ended inside a string-like literal.
    #[error("unterminated string literal")]
    UnterminatedString,
    /// The input ended inside a regexp literal.
    #[error("unterminated regexp literal")]
    UnterminatedRegexp,
    /// The input ended before a heredoc terminator line.
    #[error("unterminated heredoc")]
    UnterminatedHeredoc,
}

/// Scans a lexed token stream for recovery artifacts and returns them as
/// structured errors in source order.
///
/// `Illegal` tokens map to [`LexErrorKind::UnexpectedByte`]; a
/// `STRING_BEGIN`/`REGEXP_BEGIN`/`HEREDOC_BEGIN` whose matching end token
/// never arrives before `EOF` maps to the corresponding unterminated kind,
/// labelled at the opening delimiter.
#[must_use]
pub fn collect_lex_errors(tokens: &[Token]) -> Vec<LexError> {
    let mut errors = Vec::new();
    let mut open: Vec<(&Token, LexErrorKind)> = Vec::new();

    for token in tokens {
        match token.kind() {
            TokenKind::Illegal => errors.push(LexError {
                kind: LexErrorKind::UnexpectedByte(token.literal().into()),
                at: Span::new(token.position().offset, token.position().offset + 1).into(),
            }),
            TokenKind::StringBegin
            | TokenKind::XstringBegin
            | TokenKind::WordsBegin
            | TokenKind::SymbolsBegin => {
                open.push((token, LexErrorKind::UnterminatedString));
            }
            TokenKind::RegexpBegin => open.push((token, LexErrorKind::UnterminatedRegexp)),
            TokenKind::HeredocBegin => open.push((token, LexErrorKind::UnterminatedHeredoc)),
            TokenKind::StringEnd | TokenKind::RegexpEnd | TokenKind::HeredocEnd => {
                open.pop();
            }
            _ => {}
        }
    }

    for (token, kind) in open {
        errors.push(LexError {
            kind,
            at: token.span().into(),
        });
    }
    errors.sort_by_key(|e| e.at.offset());
    errors
}
