// Copyright 2026 The garnet authors
// SPDX-License-Identifier: Apache-2.0

//! garnet compiler core.
//!
//! This crate contains the front half of a Ruby processing pipeline:
//! - Lexical analysis (a context-sensitive, pull-based tokenizer)
//! - Parsing (Pratt-style AST construction with error recovery)
//!
//! Downstream consumers — an evaluator, a REPL, a file runner — walk the
//! [`ast::Program`] this crate produces. The core performs no I/O, spawns
//! no threads, and never panics on malformed input: lexing degrades to
//! [`source_analysis::TokenKind::Illegal`] tokens and parsing aggregates
//! diagnostics while returning placeholder sub-trees.

pub mod ast;
pub mod source_analysis;

/// Re-export commonly used types.
pub mod prelude {
    pub use crate::ast::{Expression, Program, Statement};
    pub use crate::source_analysis::{
        Diagnostic, Lexer, Parser, Position, Token, TokenKind, is_input_complete, lex,
        lex_with_eof, parse,
    };
}
