// Copyright 2026 The garnet authors
// SPDX-License-Identifier: Apache-2.0

//! Parsing infrastructure for Ruby source code.
//!
//! This module contains the lexer, the parser, and their shared token and
//! position types.
//!
//! # Lexical Analysis
//!
//! The [`Lexer`] converts source text into a stream of [`Token`]s, pulled
//! one at a time with [`Lexer::next_token`]. Ruby's surface syntax is
//! ambiguous without lexical context (`/` is a regexp or division, `{` is a
//! hash, a block, or an interpolation close, `<<X` is a heredoc or a shift),
//! so the lexer carries context flags, a string-mode stack, and a heredoc
//! queue; see [`lexer`] for the machinery.
//!
//! ```
//! use garnet_core::source_analysis::{Lexer, TokenKind};
//!
//! let tokens: Vec<_> = Lexer::new("x + 1").collect();
//! assert_eq!(tokens.len(), 3); // x, +, 1 (EOF excluded from iterator)
//! ```
//!
//! # Parsing
//!
//! The [`parse`] function (and the underlying [`Parser`]) converts a token
//! stream into an [`ast::Program`](crate::ast::Program). Operator precedence
//! uses Pratt parsing; see [`parser`] for the precedence ladder.
//!
//! # Error Handling
//!
//! The lexer uses error recovery: invalid bytes become
//! [`TokenKind::Illegal`] tokens rather than stopping the stream. Use
//! [`collect_lex_errors`] to turn those into structured [`LexError`]
//! diagnostics with miette integration. The parser aggregates
//! [`Diagnostic`]s and never aborts; inspect [`Parser::errors`] after
//! [`Parser::parse_program`].

mod error;
mod lexer;
mod parser;
mod position;
mod token;


pub use error::{LexError, LexErrorKind, collect_lex_errors};
pub use lexer::{Lexer, lex, lex_with_eof};
pub use parser::{Diagnostic, Parser, is_input_complete, parse};
pub use position::{Position, Span};
pub use token::{Token, TokenKind, lookup_identifier};
