// Copyright 2026 The garnet authors
// SPDX-License-Identifier: Apache-2.0

//! Expression parsing.
//!
//! This module contains the Pratt core — prefix/infix dispatch over the
//! precedence ladder in the parent module — and every expression
//! production: literals, string and symbol framing, collections, operator
//! expressions, method calls (parenthesised, paren-less, with blocks),
//! lambdas, and the control-flow expressions (`if`, `case`, `while`,
//! `for`, `begin`).

use ecow::EcoString;

use crate::ast::{
    AndExpression, ArrayLiteral, AssignmentExpression, BeginExpression, Block, BlockArgExpression,
    BlockBody, BlockParameter, BooleanLiteral, CaseExpression, CharLiteral, ClassVariable,
    Constant, DefinedExpression, DoubleSplatExpression, Expression, FloatLiteral, ForExpression,
    GlobalVariable, HashLiteral, Identifier, IfExpression, ImaginaryLiteral, IndexExpression,
    InfixExpression, InstanceVariable, IntegerLiteral, InterpolatedString, Lambda, MethodCall,
    ModifierExpression, ModifierKind, NilLiteral, NotExpression, OpAssignmentExpression,
    OrExpression, PrefixExpression, RangeLiteral, RationalLiteral, RegexpLiteral, RescueClause,
    RescueModifierExpression, SelfExpression, SplatExpression, StringLiteral, SuperExpression,
    SymbolLiteral, TernaryExpression, WhenClause, WhileExpression, YieldExpression,
};
use crate::source_analysis::TokenKind;

use super::{Parser, precedence};

/// Parses an integer literal, handling base prefixes and underscores.
pub(super) fn parse_integer(literal: &str) -> Result<i64, ()> {
    let digits: String = literal.chars().filter(|&c| c != '_').collect();
    if let Some(hex) = digits.strip_prefix("0x").or_else(|| digits.strip_prefix("0X")) {
        i64::from_str_radix(hex, 16).map_err(|_| ())
    } else if let Some(octal) = digits.strip_prefix("0o").or_else(|| digits.strip_prefix("0O")) {
        i64::from_str_radix(octal, 8).map_err(|_| ())
    } else if let Some(binary) = digits.strip_prefix("0b").or_else(|| digits.strip_prefix("0B")) {
        i64::from_str_radix(binary, 2).map_err(|_| ())
    } else if let Some(decimal) = digits.strip_prefix("0d").or_else(|| digits.strip_prefix("0D")) {
        decimal.parse().map_err(|_| ())
    } else {
        digits.parse().map_err(|_| ())
    }
}

impl Parser<'_> {
    // ========================================================================
    // Pratt core
    // ========================================================================

    /// Parses an expression, climbing while `peek` binds tighter than
    /// `min_precedence`.
    pub(super) fn parse_expression(&mut self, min_precedence: u8) -> Option<Expression> {
        if !self.enter_nesting() {
            return None;
        }
        let result = self.parse_expression_inner(min_precedence, false);
        self.leave_nesting();
        result
    }

    /// Like [`Self::parse_expression`], but refuses to treat the clause
    /// keywords (`rescue`, `else`, `ensure`, `end`, `elsif`, `when`) as
    /// infix continuations — used inside `begin`-like bodies where those
    /// keywords terminate the statement instead.
    pub(super) fn parse_clause_body_expression(&mut self, min_precedence: u8) -> Option<Expression> {
        if !self.enter_nesting() {
            return None;
        }
        let result = self.parse_expression_inner(min_precedence, true);
        self.leave_nesting();
        result
    }

    fn parse_expression_inner(
        &mut self,
        min_precedence: u8,
        stop_at_clause_keywords: bool,
    ) -> Option<Expression> {
        let mut left = self.parse_prefix()?;

        while !self.peek_is(TokenKind::Eof)
            && !(stop_at_clause_keywords && self.peek_is_clause_keyword())
            && min_precedence < self.peek_precedence()
        {
            if !has_infix(self.peek.kind()) {
                break;
            }
            self.advance();
            left = self.parse_infix(left)?;
        }

        Some(left)
    }

    /// Dispatches on `cur` as the start of an expression; records a
    /// diagnostic and returns `None` when no production starts here.
    fn parse_prefix(&mut self) -> Option<Expression> {
        match self.cur.kind() {
            TokenKind::Integer => self.parse_integer_literal(),
            TokenKind::Float => self.parse_float_literal(),
            TokenKind::Rational => Some(Expression::Rational(RationalLiteral {
                token: self.cur.clone(),
            })),
            TokenKind::Imaginary => Some(Expression::Imaginary(ImaginaryLiteral {
                token: self.cur.clone(),
            })),
            TokenKind::Char => Some(Expression::Char(CharLiteral {
                token: self.cur.clone(),
                value: self.cur.literal().get(1..).unwrap_or("").into(),
            })),
            TokenKind::StringBegin | TokenKind::XstringBegin => Some(self.parse_string_literal()),
            TokenKind::StringContent => Some(Expression::StringLit(StringLiteral {
                token: self.cur.clone(),
                value: self.cur.literal().into(),
            })),
            TokenKind::HeredocBegin => self.parse_heredoc_literal(),
            TokenKind::WordsBegin => Some(self.parse_word_array(false)),
            TokenKind::SymbolsBegin => Some(self.parse_word_array(true)),
            TokenKind::SymbolBegin | TokenKind::Colon => Some(self.parse_symbol_literal()),
            TokenKind::Label => Some(self.parse_label_as_symbol()),
            TokenKind::RegexpBegin => Some(self.parse_regexp_literal()),
            TokenKind::KeywordTrue | TokenKind::KeywordFalse => {
                Some(Expression::Boolean(BooleanLiteral {
                    token: self.cur.clone(),
                    value: self.cur_is(TokenKind::KeywordTrue),
                }))
            }
            TokenKind::KeywordNil => Some(Expression::Nil(NilLiteral {
                token: self.cur.clone(),
            })),
            TokenKind::KeywordSelf => Some(Expression::SelfExpr(SelfExpression {
                token: self.cur.clone(),
            })),
            // __FILE__ and friends surface as plain names; resolving them
            // is the evaluator's concern.
            TokenKind::KeywordFile | TokenKind::KeywordLine | TokenKind::KeywordEncoding => {
                Some(Expression::Identifier(Identifier {
                    token: self.cur.clone(),
                    value: self.cur.literal().into(),
                }))
            }
            TokenKind::Ident | TokenKind::MethodName => Some(self.parse_identifier()),
            TokenKind::Constant => Some(Expression::Constant(Constant {
                token: self.cur.clone(),
                value: self.cur.literal().into(),
            })),
            TokenKind::Ivar => Some(Expression::InstanceVariable(InstanceVariable {
                token: self.cur.clone(),
                name: self.cur.literal().into(),
            })),
            TokenKind::Cvar => Some(Expression::ClassVariable(ClassVariable {
                token: self.cur.clone(),
                name: self.cur.literal().into(),
            })),
            TokenKind::Gvar | TokenKind::NthRef | TokenKind::BackRef => {
                Some(Expression::GlobalVariable(GlobalVariable {
                    token: self.cur.clone(),
                    name: self.cur.literal().into(),
                }))
            }
            TokenKind::Bang | TokenKind::Minus | TokenKind::Plus | TokenKind::Tilde => {
                self.parse_prefix_expression()
            }
            TokenKind::Star => self.parse_splat_expression(),
            TokenKind::StarStar => self.parse_double_splat_expression(),
            TokenKind::Ampersand => self.parse_block_arg_expression(),
            TokenKind::LParen | TokenKind::LParenBeg | TokenKind::LParenArg => {
                self.parse_grouped_expression()
            }
            TokenKind::LBracket | TokenKind::LBracketArray => self.parse_array_literal(),
            TokenKind::LBrace | TokenKind::LBraceArg => self.parse_hash_literal(),
            TokenKind::ColonColon => self.parse_top_level_constant(),
            TokenKind::LambdaBegin | TokenKind::MinusGreater => self.parse_lambda(),
            TokenKind::KeywordIf => self.parse_if_expression(false),
            TokenKind::KeywordUnless => self.parse_if_expression(true),
            TokenKind::KeywordCase => self.parse_case_expression(),
            TokenKind::KeywordWhile => self.parse_while_expression(false),
            TokenKind::KeywordUntil => self.parse_while_expression(true),
            TokenKind::KeywordFor => self.parse_for_expression(),
            TokenKind::KeywordBegin => self.parse_begin_expression(),
            TokenKind::KeywordYield => self.parse_yield_expression(),
            TokenKind::KeywordSuper => self.parse_super_expression(),
            TokenKind::KeywordNot => self.parse_not_expression(),
            TokenKind::KeywordDefined => self.parse_defined_expression(),
            _ => {
                self.no_prefix_error();
                None
            }
        }
    }

    /// Dispatches on `cur` as an infix continuation of `left`.
    fn parse_infix(&mut self, left: Expression) -> Option<Expression> {
        match self.cur.kind() {
            TokenKind::Plus
            | TokenKind::Minus
            | TokenKind::Star
            | TokenKind::Slash
            | TokenKind::Percent
            | TokenKind::StarStar
            | TokenKind::EqualEqual
            | TokenKind::BangEqual
            | TokenKind::EqualEqualEqual
            | TokenKind::LessEqualGreater
            | TokenKind::Less
            | TokenKind::Greater
            | TokenKind::LessEqual
            | TokenKind::GreaterEqual
            | TokenKind::AmpersandAmpersand
            | TokenKind::PipePipe
            | TokenKind::Ampersand
            | TokenKind::Pipe
            | TokenKind::Caret
            | TokenKind::LessLess
            | TokenKind::GreaterGreater
            | TokenKind::EqualTilde
            | TokenKind::BangTilde => self.parse_infix_expression(left),
            TokenKind::DotDot | TokenKind::DotDotDot => self.parse_range_expression(left),
            TokenKind::Equal => self.parse_assignment(left),
            TokenKind::PlusEqual
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
            | TokenKind::AmpersandAmpersandEqual => self.parse_op_assignment(left),
            TokenKind::LBracket => self.parse_index_expression(left),
            TokenKind::Dot => self.parse_method_call(left, false),
            TokenKind::AmpersandDot => self.parse_method_call(left, true),
            TokenKind::ColonColon => self.parse_scoped_constant(left),
            TokenKind::Question => self.parse_ternary_expression(left),
            TokenKind::KeywordAnd => self.parse_and_expression(left),
            TokenKind::KeywordOr => self.parse_or_expression(left),
            TokenKind::KeywordIf | TokenKind::KeywordIfModifier => {
                self.parse_modifier(left, ModifierKind::If)
            }
            TokenKind::KeywordUnless | TokenKind::KeywordUnlessModifier => {
                self.parse_modifier(left, ModifierKind::Unless)
            }
            TokenKind::KeywordWhile | TokenKind::KeywordWhileModifier => {
                self.parse_modifier(left, ModifierKind::While)
            }
            TokenKind::KeywordUntil | TokenKind::KeywordUntilModifier => {
                self.parse_modifier(left, ModifierKind::Until)
            }
            TokenKind::KeywordRescue | TokenKind::KeywordRescueModifier => {
                self.parse_rescue_modifier(left)
            }
            _ => Some(left),
        }
    }

    // ========================================================================
    // Literals
    // ========================================================================

    fn parse_integer_literal(&mut self) -> Option<Expression> {
        match parse_integer(self.cur.literal()) {
            Ok(value) => Some(Expression::Integer(IntegerLiteral {
                token: self.cur.clone(),
                value,
            })),
            Err(()) => {
                let message =
                    ecow::eco_format!("could not parse {:?} as integer", self.cur.literal());
                self.error(message);
                None
            }
        }
    }

    fn parse_float_literal(&mut self) -> Option<Expression> {
        let digits: String = self.cur.literal().chars().filter(|&c| c != '_').collect();
        match digits.parse::<f64>() {
            Ok(value) => Some(Expression::Float(FloatLiteral {
                token: self.cur.clone(),
                value,
            })),
            Err(_) => {
                let message =
                    ecow::eco_format!("could not parse {:?} as float", self.cur.literal());
                self.error(message);
                None
            }
        }
    }

    /// Parses a string literal from its framing tokens. An interpolated
    /// string with no embedded expressions degenerates to a plain literal.
    fn parse_string_literal(&mut self) -> Expression {
        let start_token = self.cur.clone();
        let mut parts: Vec<Expression> = Vec::new();
        let mut content = String::new();
        let mut has_interpolation = false;

        self.advance(); // past the begin token

        while !self.cur_is(TokenKind::StringEnd) && !self.cur_is(TokenKind::Eof) {
            match self.cur.kind() {
                TokenKind::StringContent => content.push_str(self.cur.literal()),
                TokenKind::EmbexprBegin => {
                    flush_string_part(&mut parts, &start_token, &mut content);
                    has_interpolation = true;
                    self.advance(); // past #{
                    if let Some(expression) = self.parse_expression(precedence::LOWEST) {
                        parts.push(expression);
                    }
                    self.expect_peek(TokenKind::EmbexprEnd);
                }
                TokenKind::Embvar => {
                    flush_string_part(&mut parts, &start_token, &mut content);
                    has_interpolation = true;
                    self.advance(); // onto the variable token
                    if let Some(expression) = self.parse_expression(precedence::LOWEST) {
                        parts.push(expression);
                    }
                }
                _ => content.push_str(self.cur.literal()),
            }
            self.advance();
        }

        if has_interpolation {
            flush_string_part(&mut parts, &start_token, &mut content);
            return Expression::InterpolatedString(InterpolatedString {
                token: start_token,
                parts,
            });
        }

        Expression::StringLit(StringLiteral {
            token: start_token,
            value: content.into(),
        })
    }

    /// `<<IDENT` … one body `STRING_CONTENT` … `HEREDOC_END`.
    fn parse_heredoc_literal(&mut self) -> Option<Expression> {
        let start_token = self.cur.clone();
        if !self.expect_peek(TokenKind::StringContent) {
            return None;
        }
        let value: EcoString = self.cur.literal().into();
        if !self.expect_peek(TokenKind::HeredocEnd) {
            return None;
        }
        Some(Expression::StringLit(StringLiteral {
            token: start_token,
            value,
        }))
    }

    /// `%w(...)` / `%i(...)`: an array of string or symbol literals, one
    /// per `STRING_CONTENT` word.
    fn parse_word_array(&mut self, symbols: bool) -> Expression {
        let token = self.cur.clone();
        let mut elements = Vec::new();

        self.advance();
        while !self.cur_is(TokenKind::StringEnd) && !self.cur_is(TokenKind::Eof) {
            if self.cur_is(TokenKind::StringContent) {
                let element = if symbols {
                    Expression::Symbol(SymbolLiteral {
                        token: self.cur.clone(),
                        value: self.cur.literal().into(),
                    })
                } else {
                    Expression::StringLit(StringLiteral {
                        token: self.cur.clone(),
                        value: self.cur.literal().into(),
                    })
                };
                elements.push(element);
            }
            self.advance();
        }

        Expression::Array(ArrayLiteral { token, elements })
    }

    fn parse_symbol_literal(&mut self) -> Expression {
        let start_token = self.cur.clone();

        if self.cur_is(TokenKind::Colon) || self.cur_is(TokenKind::SymbolBegin) {
            self.advance();
        }

        let value: EcoString = match self.cur.kind() {
            TokenKind::StringBegin => match self.parse_string_literal() {
                Expression::StringLit(literal) => literal.value,
                // Interpolated symbols keep their literal text.
                other => other.to_string().into(),
            },
            _ => self.cur.literal().into(),
        };

        if self.peek_is(TokenKind::StringEnd) {
            self.advance();
        }

        Expression::Symbol(SymbolLiteral {
            token: start_token,
            value,
        })
    }

    /// A `LABEL` in expression position is the symbol it names.
    fn parse_label_as_symbol(&mut self) -> Expression {
        let value = self.cur.literal().trim_end_matches(':');
        Expression::Symbol(SymbolLiteral {
            token: self.cur.clone(),
            value: value.into(),
        })
    }

    fn parse_regexp_literal(&mut self) -> Expression {
        let start_token = self.cur.clone();
        let mut content = String::new();

        self.advance(); // past REGEXP_BEGIN
        while !self.cur_is(TokenKind::RegexpEnd) && !self.cur_is(TokenKind::Eof) {
            content.push_str(self.cur.literal());
            self.advance();
        }

        let flags = if self.cur_is(TokenKind::RegexpEnd) {
            self.cur.literal().get(1..).unwrap_or("")
        } else {
            ""
        };

        Expression::Regexp(RegexpLiteral {
            token: start_token,
            value: content.into(),
            flags: flags.into(),
        })
    }

    fn parse_array_literal(&mut self) -> Option<Expression> {
        let token = self.cur.clone();
        let elements = self.parse_expression_list(TokenKind::RBracket)?;
        Some(Expression::Array(ArrayLiteral { token, elements }))
    }

    /// `{ … }` with the three key syntaxes: `key => value`, `label: value`,
    /// and `"string": value`.
    fn parse_hash_literal(&mut self) -> Option<Expression> {
        let token = self.cur.clone();
        let mut entries = Vec::new();

        if self.peek_is(TokenKind::RBrace) {
            self.advance();
            return Some(Expression::Hash(HashLiteral {
                token,
                entries,
                is_keyword_args: false,
            }));
        }

        self.advance();
        loop {
            let key = self.parse_expression(precedence::LOWEST)?;

            if self.cur_is(TokenKind::Label) {
                // The label token carried its own colon.
                self.advance();
            } else if self.peek_is(TokenKind::EqualGreater) {
                self.advance();
                self.advance();
            } else if self.peek_is(TokenKind::Colon) {
                // `"string": value`
                self.advance();
                self.advance();
            } else {
                self.advance();
            }

            let value = self.parse_expression(precedence::LOWEST)?;
            entries.push((key, value));

            if self.peek_is(TokenKind::RBrace) {
                break;
            }
            if !self.expect_peek(TokenKind::Comma) {
                return None;
            }
            self.advance();
        }

        if !self.expect_peek(TokenKind::RBrace) {
            return None;
        }
        Some(Expression::Hash(HashLiteral {
            token,
            entries,
            is_keyword_args: false,
        }))
    }

    // ========================================================================
    // Names in call position
    // ========================================================================

    /// An identifier starts a paren-less call when the next token could
    /// begin an argument — but not `[` (indexing) or `*` (multiplication),
    /// and never across a newline.
    fn parse_identifier(&mut self) -> Expression {
        let identifier = Identifier {
            token: self.cur.clone(),
            value: self.cur.literal().into(),
        };

        if !self.saw_newline && starts_command_argument(self.peek.kind()) {
            return self.parse_call_without_parens(identifier);
        }

        if self.peek_is(TokenKind::LParen) || self.peek_is(TokenKind::LParenArg) {
            return self.parse_call_with_parens(identifier);
        }

        if self.peek_is_block_start() {
            return self.parse_call_with_block(identifier);
        }

        Expression::Identifier(identifier)
    }

    fn peek_is_block_start(&self) -> bool {
        matches!(
            self.peek.kind(),
            TokenKind::LBrace
                | TokenKind::LBraceBlock
                | TokenKind::KeywordDo
                | TokenKind::KeywordDoBlock
        )
    }

    fn parse_call_without_parens(&mut self, identifier: Identifier) -> Expression {
        let mut call = MethodCall {
            token: identifier.token,
            receiver: None,
            method: identifier.value,
            arguments: Vec::new(),
            block: None,
            safe_navigation: false,
        };
        call.arguments = self.parse_arguments_without_parens();

        if self.peek_is_block_start() {
            self.advance();
            call.block = self.parse_block();
        }
        Expression::MethodCall(call)
    }

    fn parse_call_with_parens(&mut self, identifier: Identifier) -> Expression {
        let mut call = MethodCall {
            token: identifier.token,
            receiver: None,
            method: identifier.value,
            arguments: Vec::new(),
            block: None,
            safe_navigation: false,
        };
        self.advance(); // onto (
        call.arguments = self
            .parse_expression_list(TokenKind::RParen)
            .unwrap_or_default();

        if self.peek_is_block_start() {
            self.advance();
            call.block = self.parse_block();
        }
        Expression::MethodCall(call)
    }

    fn parse_call_with_block(&mut self, identifier: Identifier) -> Expression {
        let mut call = MethodCall {
            token: identifier.token,
            receiver: None,
            method: identifier.value,
            arguments: Vec::new(),
            block: None,
            safe_navigation: false,
        };
        self.advance(); // onto { or do
        call.block = self.parse_block();
        Expression::MethodCall(call)
    }

    // ========================================================================
    // Argument lists
    // ========================================================================

    /// Paren-less arguments, each parsed at `MODIFIER` precedence so a
    /// trailing `if`/`unless` modifies the whole call rather than the last
    /// argument.
    fn parse_arguments_without_parens(&mut self) -> Vec<Expression> {
        let mut arguments = Vec::new();

        self.advance();
        if self.cur_is(TokenKind::Label)
            || (self.cur_is(TokenKind::Ident) && self.peek_is(TokenKind::Colon))
        {
            if let Some(hash) = self.parse_implicit_hash(None, precedence::MODIFIER) {
                arguments.push(hash);
            }
            return arguments;
        }

        if let Some(argument) = self.parse_expression(precedence::MODIFIER) {
            arguments.push(argument);
        }
        while self.peek_is(TokenKind::Comma) {
            self.advance();
            self.advance();
            if self.cur_is(TokenKind::Label)
                || (self.cur_is(TokenKind::Ident) && self.peek_is(TokenKind::Colon))
            {
                if let Some(hash) = self.parse_implicit_hash(None, precedence::MODIFIER) {
                    arguments.push(hash);
                }
                return arguments;
            }
            if let Some(argument) = self.parse_expression(precedence::MODIFIER) {
                arguments.push(argument);
            }
        }

        arguments
    }

    /// A comma-separated expression list up to `end`. A `LABEL` (or
    /// `IDENT ':'`) switches the remainder of the list into an implicit
    /// keyword-arguments hash.
    pub(super) fn parse_expression_list(&mut self, end: TokenKind) -> Option<Vec<Expression>> {
        let mut list = Vec::new();

        if self.peek_is(end) {
            self.advance();
            return Some(list);
        }

        self.advance();
        if self.cur_is(TokenKind::Label)
            || (self.cur_is(TokenKind::Ident) && self.peek_is(TokenKind::Colon))
        {
            let hash = self.parse_implicit_hash(Some(end), precedence::LOWEST)?;
            list.push(hash);
            return Some(list);
        }

        list.push(self.parse_expression(precedence::LOWEST)?);
        while self.peek_is(TokenKind::Comma) {
            self.advance();
            self.advance();
            if self.cur_is(TokenKind::Label)
                || (self.cur_is(TokenKind::Ident) && self.peek_is(TokenKind::Colon))
            {
                let hash = self.parse_implicit_hash(Some(end), precedence::LOWEST)?;
                list.push(hash);
                return Some(list);
            }
            list.push(self.parse_expression(precedence::LOWEST)?);
        }

        if !self.expect_peek(end) {
            return None;
        }
        Some(list)
    }

    /// The implicit hash formed by trailing keyword arguments. Consumes
    /// key/value pairs until the list ends; when `end` is given the
    /// closing token is consumed too.
    fn parse_implicit_hash(
        &mut self,
        end: Option<TokenKind>,
        value_precedence: u8,
    ) -> Option<Expression> {
        let token = self.cur.clone();
        let mut entries = Vec::new();

        loop {
            let key_token = self.cur.clone();
            let key_name: EcoString = if self.cur_is(TokenKind::Label) {
                let name = self.cur.literal().trim_end_matches(':').into();
                self.advance();
                name
            } else if self.cur_is(TokenKind::Ident) {
                let name = self.cur.literal().into();
                if !self.expect_peek(TokenKind::Colon) {
                    return None;
                }
                self.advance();
                name
            } else {
                let message =
                    ecow::eco_format!("expected keyword argument, got {}", self.cur.kind());
                self.error(message);
                return None;
            };

            let key = Expression::Symbol(SymbolLiteral {
                token: key_token,
                value: key_name,
            });
            let value = self.parse_expression(value_precedence)?;
            entries.push((key, value));

            if self.peek_is(TokenKind::Comma) {
                self.advance();
                self.advance();
            } else {
                break;
            }
        }

        if let Some(end) = end {
            if !self.expect_peek(end) {
                return None;
            }
        }

        Some(Expression::Hash(HashLiteral {
            token,
            entries,
            is_keyword_args: true,
        }))
    }

    // ========================================================================
    // Operator expressions
    // ========================================================================

    fn parse_prefix_expression(&mut self) -> Option<Expression> {
        let token = self.cur.clone();
        let operator: EcoString = self.cur.literal().into();
        self.advance();
        let right = self.parse_expression(precedence::UNARY)?;
        Some(Expression::Prefix(PrefixExpression {
            token,
            operator,
            right: Box::new(right),
        }))
    }

    fn parse_splat_expression(&mut self) -> Option<Expression> {
        let token = self.cur.clone();
        self.advance();
        let expression = self.parse_expression(precedence::UNARY)?;
        Some(Expression::Splat(SplatExpression {
            token,
            expression: Box::new(expression),
        }))
    }

    fn parse_double_splat_expression(&mut self) -> Option<Expression> {
        let token = self.cur.clone();
        self.advance();
        let expression = self.parse_expression(precedence::UNARY)?;
        Some(Expression::DoubleSplat(DoubleSplatExpression {
            token,
            expression: Box::new(expression),
        }))
    }

    fn parse_block_arg_expression(&mut self) -> Option<Expression> {
        let token = self.cur.clone();
        self.advance();
        let expression = self.parse_expression(precedence::UNARY)?;
        Some(Expression::BlockArg(BlockArgExpression {
            token,
            expression: Box::new(expression),
        }))
    }

    fn parse_grouped_expression(&mut self) -> Option<Expression> {
        self.advance();
        let expression = self.parse_expression(precedence::LOWEST)?;
        if !self.expect_peek(TokenKind::RParen) {
            return None;
        }
        Some(expression)
    }

    fn parse_infix_expression(&mut self, left: Expression) -> Option<Expression> {
        let token = self.cur.clone();
        let operator: EcoString = self.cur.literal().into();
        let mut min_precedence = self.cur_precedence();
        // ** is right-associative.
        if self.cur_is(TokenKind::StarStar) {
            min_precedence -= 1;
        }
        self.advance();
        let right = self.parse_expression(min_precedence)?;
        Some(Expression::Infix(InfixExpression {
            token,
            left: Box::new(left),
            operator,
            right: Box::new(right),
        }))
    }

    fn parse_range_expression(&mut self, left: Expression) -> Option<Expression> {
        let token = self.cur.clone();
        let exclusive = self.cur_is(TokenKind::DotDotDot);
        let min_precedence = self.cur_precedence();
        self.advance();
        let end = self.parse_expression(min_precedence)?;
        Some(Expression::Range(RangeLiteral {
            token,
            start: Some(Box::new(left)),
            end: Some(Box::new(end)),
            exclusive,
        }))
    }

    fn parse_assignment(&mut self, left: Expression) -> Option<Expression> {
        let token = self.cur.clone();
        self.advance();
        let value = self.parse_expression(precedence::ASSIGNMENT - 1)?;
        Some(Expression::Assignment(AssignmentExpression {
            token,
            target: Box::new(left),
            value: Box::new(value),
        }))
    }

    fn parse_op_assignment(&mut self, left: Expression) -> Option<Expression> {
        let token = self.cur.clone();
        let operator: EcoString = self.cur.literal().into();
        self.advance();
        let value = self.parse_expression(precedence::ASSIGNMENT - 1)?;
        Some(Expression::OpAssignment(OpAssignmentExpression {
            token,
            target: Box::new(left),
            operator,
            value: Box::new(value),
        }))
    }

    fn parse_index_expression(&mut self, left: Expression) -> Option<Expression> {
        let token = self.cur.clone();
        self.advance();
        let index = self.parse_expression(precedence::LOWEST)?;
        if !self.expect_peek(TokenKind::RBracket) {
            return None;
        }
        Some(Expression::Index(IndexExpression {
            token,
            left: Box::new(left),
            index: Box::new(index),
        }))
    }

    fn parse_ternary_expression(&mut self, condition: Expression) -> Option<Expression> {
        let token = self.cur.clone();
        self.advance();
        let consequence = self.parse_expression(precedence::LOWEST)?;
        if !self.expect_peek(TokenKind::Colon) {
            return None;
        }
        self.advance();
        let alternative = self.parse_expression(precedence::LOWEST)?;
        Some(Expression::Ternary(TernaryExpression {
            token,
            condition: Box::new(condition),
            consequence: Box::new(consequence),
            alternative: Box::new(alternative),
        }))
    }

    fn parse_and_expression(&mut self, left: Expression) -> Option<Expression> {
        let token = self.cur.clone();
        let min_precedence = self.cur_precedence();
        self.advance();
        let right = self.parse_expression(min_precedence)?;
        Some(Expression::And(AndExpression {
            token,
            left: Box::new(left),
            right: Box::new(right),
        }))
    }

    fn parse_or_expression(&mut self, left: Expression) -> Option<Expression> {
        let token = self.cur.clone();
        let min_precedence = self.cur_precedence();
        self.advance();
        let right = self.parse_expression(min_precedence)?;
        Some(Expression::Or(OrExpression {
            token,
            left: Box::new(left),
            right: Box::new(right),
        }))
    }

    fn parse_modifier(&mut self, body: Expression, modifier: ModifierKind) -> Option<Expression> {
        let token = self.cur.clone();
        self.advance();
        let condition = self.parse_expression(precedence::LOWEST)?;
        Some(Expression::Modifier(ModifierExpression {
            token,
            body: Box::new(body),
            modifier,
            condition: Box::new(condition),
        }))
    }

    fn parse_rescue_modifier(&mut self, body: Expression) -> Option<Expression> {
        let token = self.cur.clone();
        self.advance();
        let rescue = self.parse_expression(precedence::RESCUE_MOD)?;
        Some(Expression::RescueModifier(RescueModifierExpression {
            token,
            body: Box::new(body),
            rescue: Box::new(rescue),
        }))
    }

    // ========================================================================
    // Calls with explicit receivers
    // ========================================================================

    fn parse_method_call(&mut self, receiver: Expression, safe_navigation: bool) -> Option<Expression> {
        let token = self.cur.clone();
        self.advance(); // onto the method name
        let mut call = MethodCall {
            token,
            receiver: Some(Box::new(receiver)),
            method: self.cur.literal().into(),
            arguments: Vec::new(),
            block: None,
            safe_navigation,
        };

        if self.peek_is(TokenKind::LParen) || self.peek_is(TokenKind::LParenArg) {
            self.advance();
            call.arguments = self
                .parse_expression_list(TokenKind::RParen)
                .unwrap_or_default();
        }

        if !safe_navigation && self.peek_is_block_start() {
            self.advance();
            call.block = self.parse_block();
        }

        Some(Expression::MethodCall(call))
    }

    fn parse_scoped_constant(&mut self, left: Expression) -> Option<Expression> {
        let token = self.cur.clone();
        self.advance();
        Some(Expression::ScopedConstant(crate::ast::ScopedConstant {
            token,
            left: Some(Box::new(left)),
            name: self.cur.literal().into(),
        }))
    }

    fn parse_top_level_constant(&mut self) -> Option<Expression> {
        let token = self.cur.clone();
        self.advance();
        Some(Expression::ScopedConstant(crate::ast::ScopedConstant {
            token,
            left: None,
            name: self.cur.literal().into(),
        }))
    }

    // ========================================================================
    // Blocks and lambdas
    // ========================================================================

    /// Parses `{ |params| body }` or `do |params| body end`; `cur` is the
    /// opening token.
    pub(super) fn parse_block(&mut self) -> Option<Block> {
        let token = self.cur.clone();
        let is_brace = matches!(self.cur.kind(), TokenKind::LBrace | TokenKind::LBraceBlock);

        let mut parameters = Vec::new();
        if self.peek_is(TokenKind::Pipe) {
            self.advance();
            parameters = self.parse_block_parameters();
        }

        let body = self.parse_block_body(is_brace);
        Some(Block {
            token,
            parameters,
            body,
        })
    }

    fn parse_block_parameters(&mut self) -> Vec<BlockParameter> {
        let mut parameters = Vec::new();

        self.advance(); // past the opening |
        while !self.cur_is(TokenKind::Pipe) && !self.cur_is(TokenKind::Eof) {
            let mut parameter = BlockParameter {
                token: self.cur.clone(),
                name: EcoString::new(),
                splat: false,
                double_splat: false,
                block: false,
                default: None,
            };

            if self.cur_is(TokenKind::Star) {
                parameter.splat = true;
                self.advance();
            } else if self.cur_is(TokenKind::StarStar) {
                parameter.double_splat = true;
                self.advance();
            } else if self.cur_is(TokenKind::Ampersand) {
                parameter.block = true;
                self.advance();
            }

            parameter.name = self.cur.literal().into();

            if self.peek_is(TokenKind::Equal) {
                self.advance();
                self.advance();
                // BITOR keeps the closing | out of the default value.
                parameter.default = self.parse_expression(precedence::BITOR);
            }

            parameters.push(parameter);

            if self.peek_is(TokenKind::Comma) {
                self.advance();
                self.advance();
            } else {
                self.advance();
            }
        }

        parameters
    }

    /// Statements until the matching close (`}` or `end`).
    pub(super) fn parse_block_body(&mut self, is_brace: bool) -> BlockBody {
        let mut body = BlockBody::default();
        let end = if is_brace {
            TokenKind::RBrace
        } else {
            TokenKind::KeywordEnd
        };

        self.advance();
        while !self.cur_is(end) && !self.cur_is(TokenKind::Eof) {
            if self.cur_is(TokenKind::Semicolon) {
                self.advance();
                continue;
            }
            if let Some(statement) = self.parse_statement() {
                body.statements.push(statement);
            }
            self.advance();
        }
        body
    }

    fn parse_lambda(&mut self) -> Option<Expression> {
        let token = self.cur.clone();
        let mut parameters = Vec::new();

        if self.peek_is(TokenKind::LParen) {
            self.advance();
            parameters = self.parse_lambda_parameters();
        }

        let body = if self.peek_is(TokenKind::LBrace) || self.peek_is(TokenKind::LBraceBlock) {
            self.advance();
            self.parse_block_body(true)
        } else if self.peek_is(TokenKind::KeywordDo) || self.peek_is(TokenKind::KeywordDoLambda) {
            self.advance();
            self.parse_block_body(false)
        } else {
            self.peek_error(TokenKind::LBrace);
            BlockBody::default()
        };

        Some(Expression::Lambda(Lambda {
            token,
            parameters,
            body,
        }))
    }

    fn parse_lambda_parameters(&mut self) -> Vec<BlockParameter> {
        let mut parameters = Vec::new();

        if self.peek_is(TokenKind::RParen) {
            self.advance();
            return parameters;
        }

        self.advance();
        while !self.cur_is(TokenKind::RParen) && !self.cur_is(TokenKind::Eof) {
            let mut parameter = BlockParameter {
                token: self.cur.clone(),
                name: EcoString::new(),
                splat: false,
                double_splat: false,
                block: false,
                default: None,
            };

            if self.cur_is(TokenKind::Star) {
                parameter.splat = true;
                self.advance();
            } else if self.cur_is(TokenKind::StarStar) {
                parameter.double_splat = true;
                self.advance();
            } else if self.cur_is(TokenKind::Ampersand) {
                parameter.block = true;
                self.advance();
            }

            parameter.name = self.cur.literal().into();

            if self.peek_is(TokenKind::Equal) {
                self.advance();
                self.advance();
                parameter.default = self.parse_expression(precedence::LOWEST);
            }

            parameters.push(parameter);

            if self.peek_is(TokenKind::Comma) {
                self.advance();
                self.advance();
            } else {
                self.advance();
            }
        }

        parameters
    }

    // ========================================================================
    // Control flow
    // ========================================================================

    fn parse_if_expression(&mut self, unless: bool) -> Option<Expression> {
        let token = self.cur.clone();
        self.advance();
        let condition = self.parse_expression(precedence::LOWEST)?;
        if self.peek_is(TokenKind::KeywordThen) {
            self.advance();
        }

        let consequence = self.parse_branch_body();
        let mut root = IfExpression {
            token,
            condition: Box::new(condition),
            consequence,
            alternative: None,
            else_body: None,
            unless,
        };

        while !unless && self.cur_is(TokenKind::KeywordElsif) {
            let elsif_token = self.cur.clone();
            self.advance();
            let Some(elsif_condition) = self.parse_expression(precedence::LOWEST) else {
                break;
            };
            if self.peek_is(TokenKind::KeywordThen) {
                self.advance();
            }
            let elsif_consequence = self.parse_branch_body();
            attach_alternative(
                &mut root,
                IfExpression {
                    token: elsif_token,
                    condition: Box::new(elsif_condition),
                    consequence: elsif_consequence,
                    alternative: None,
                    else_body: None,
                    unless: false,
                },
            );
        }

        if self.cur_is(TokenKind::KeywordElse) {
            self.advance();
            let else_body = self.parse_body_until_end();
            attach_else(&mut root, else_body);
        }

        Some(Expression::If(Box::new(root)))
    }

    /// Statements until `elsif`, `else`, `end`, or `EOF`.
    fn parse_branch_body(&mut self) -> BlockBody {
        let mut body = BlockBody::default();
        self.advance();
        while !matches!(
            self.cur.kind(),
            TokenKind::KeywordElsif | TokenKind::KeywordElse | TokenKind::KeywordEnd | TokenKind::Eof
        ) {
            if self.cur_is(TokenKind::Semicolon) {
                self.advance();
                continue;
            }
            if let Some(statement) = self.parse_statement() {
                body.statements.push(statement);
            }
            self.advance();
        }
        body
    }

    /// Statements until `end`; `cur` is already the first body token.
    fn parse_body_until_end(&mut self) -> BlockBody {
        let mut body = BlockBody::default();
        while !self.cur_is(TokenKind::KeywordEnd) && !self.cur_is(TokenKind::Eof) {
            if self.cur_is(TokenKind::Semicolon) {
                self.advance();
                continue;
            }
            if let Some(statement) = self.parse_statement() {
                body.statements.push(statement);
            }
            self.advance();
        }
        body
    }

    fn parse_case_expression(&mut self) -> Option<Expression> {
        let token = self.cur.clone();
        let mut subject = None;

        if self.peek_is(TokenKind::KeywordWhen) {
            self.advance();
        } else {
            self.advance();
            if !self.cur_is(TokenKind::KeywordWhen) {
                subject = self.parse_expression(precedence::LOWEST).map(Box::new);
                self.advance();
            }
        }

        let mut whens = Vec::new();
        while self.cur_is(TokenKind::KeywordWhen) {
            whens.push(self.parse_when_clause()?);
        }

        let mut else_body = None;
        if self.cur_is(TokenKind::KeywordElse) {
            self.advance();
            else_body = Some(self.parse_body_until_end());
        }

        Some(Expression::Case(CaseExpression {
            token,
            subject,
            whens,
            else_body,
        }))
    }

    fn parse_when_clause(&mut self) -> Option<WhenClause> {
        let token = self.cur.clone();
        self.advance();

        let mut conditions = vec![self.parse_expression(precedence::LOWEST)?];
        while self.peek_is(TokenKind::Comma) {
            self.advance();
            self.advance();
            conditions.push(self.parse_expression(precedence::LOWEST)?);
        }

        if self.peek_is(TokenKind::KeywordThen) {
            self.advance();
        }

        let mut body = BlockBody::default();
        self.advance();
        while !matches!(
            self.cur.kind(),
            TokenKind::KeywordWhen | TokenKind::KeywordElse | TokenKind::KeywordEnd | TokenKind::Eof
        ) {
            if self.cur_is(TokenKind::Semicolon) {
                self.advance();
                continue;
            }
            if let Some(statement) = self.parse_statement() {
                body.statements.push(statement);
            }
            self.advance();
        }

        Some(WhenClause {
            token,
            conditions,
            body,
        })
    }

    fn parse_while_expression(&mut self, until: bool) -> Option<Expression> {
        let token = self.cur.clone();
        self.advance();
        let condition = self.parse_expression(precedence::LOWEST)?;

        if self.peek_is(TokenKind::KeywordDo) || self.peek_is(TokenKind::KeywordDoCond) {
            self.advance();
        }

        let body = self.parse_loop_body();
        Some(Expression::While(WhileExpression {
            token,
            condition: Box::new(condition),
            body,
            until,
        }))
    }

    fn parse_for_expression(&mut self) -> Option<Expression> {
        let token = self.cur.clone();
        self.advance();
        let variable = self.parse_expression(precedence::LOWEST)?;

        if !self.expect_peek(TokenKind::KeywordIn) {
            return None;
        }
        self.advance();
        let iterable = self.parse_expression(precedence::LOWEST)?;

        if self.peek_is(TokenKind::KeywordDo) || self.peek_is(TokenKind::KeywordDoCond) {
            self.advance();
        }

        let body = self.parse_loop_body();
        Some(Expression::For(ForExpression {
            token,
            variable: Box::new(variable),
            iterable: Box::new(iterable),
            body,
        }))
    }

    fn parse_loop_body(&mut self) -> BlockBody {
        let mut body = BlockBody::default();
        self.advance();
        while !self.cur_is(TokenKind::KeywordEnd) && !self.cur_is(TokenKind::Eof) {
            if self.cur_is(TokenKind::Semicolon) {
                self.advance();
                continue;
            }
            if let Some(statement) = self.parse_statement() {
                body.statements.push(statement);
            }
            self.advance();
        }
        body
    }

    fn parse_begin_expression(&mut self) -> Option<Expression> {
        let token = self.cur.clone();
        let mut body = BlockBody::default();

        self.advance();
        while !matches!(
            self.cur.kind(),
            TokenKind::KeywordRescue
                | TokenKind::KeywordElse
                | TokenKind::KeywordEnsure
                | TokenKind::KeywordEnd
                | TokenKind::Eof
        ) {
            if self.cur_is(TokenKind::Semicolon) {
                self.advance();
                continue;
            }
            if let Some(statement) = self.parse_clause_body_statement() {
                body.statements.push(statement);
            }
            self.advance();
        }

        Some(Expression::Begin(self.parse_begin_tail(token, body)))
    }

    /// Parses the `rescue`/`else`/`ensure` tail of a begin-like body;
    /// `cur` is the first clause keyword (or `end`).
    pub(super) fn parse_begin_tail(
        &mut self,
        token: crate::source_analysis::Token,
        body: BlockBody,
    ) -> BeginExpression {
        let mut rescues = Vec::new();
        while self.cur_is(TokenKind::KeywordRescue) {
            rescues.push(self.parse_rescue_clause());
        }

        let mut else_body = None;
        if self.cur_is(TokenKind::KeywordElse) {
            let mut block = BlockBody::default();
            self.advance();
            while !matches!(
                self.cur.kind(),
                TokenKind::KeywordEnsure | TokenKind::KeywordEnd | TokenKind::Eof
            ) {
                if let Some(statement) = self.parse_clause_body_statement() {
                    block.statements.push(statement);
                }
                self.advance();
            }
            else_body = Some(block);
        }

        let mut ensure_body = None;
        if self.cur_is(TokenKind::KeywordEnsure) {
            let mut block = BlockBody::default();
            self.advance();
            while !matches!(self.cur.kind(), TokenKind::KeywordEnd | TokenKind::Eof) {
                if let Some(statement) = self.parse_clause_body_statement() {
                    block.statements.push(statement);
                }
                self.advance();
            }
            ensure_body = Some(block);
        }

        BeginExpression {
            token,
            body,
            rescues,
            else_body,
            ensure_body,
        }
    }

    /// `rescue TypeA, TypeB => name` with a body. Exception types are
    /// constants; a bare `rescue` binds everything.
    fn parse_rescue_clause(&mut self) -> RescueClause {
        let token = self.cur.clone();
        self.advance();

        let mut exceptions = Vec::new();
        if self.cur_is(TokenKind::Constant) {
            if let Some(exception) = self.parse_expression(precedence::LOWEST) {
                exceptions.push(exception);
            }
            while self.peek_is(TokenKind::Comma) {
                self.advance();
                self.advance();
                if let Some(exception) = self.parse_expression(precedence::LOWEST) {
                    exceptions.push(exception);
                }
            }
            self.advance();
        }

        let mut variable = None;
        if self.cur_is(TokenKind::EqualGreater) {
            self.advance();
            variable = Some(Identifier {
                token: self.cur.clone(),
                value: self.cur.literal().into(),
            });
            self.advance();
        }

        if self.cur_is(TokenKind::KeywordThen) {
            self.advance();
        }

        let mut body = BlockBody::default();
        while !matches!(
            self.cur.kind(),
            TokenKind::KeywordRescue
                | TokenKind::KeywordElse
                | TokenKind::KeywordEnsure
                | TokenKind::KeywordEnd
                | TokenKind::Eof
        ) {
            if self.cur_is(TokenKind::Semicolon) {
                self.advance();
                continue;
            }
            if let Some(statement) = self.parse_clause_body_statement() {
                body.statements.push(statement);
            }
            self.advance();
        }

        RescueClause {
            token,
            exceptions,
            variable,
            body,
        }
    }

    // ========================================================================
    // yield / super / not / defined?
    // ========================================================================

    fn parse_yield_expression(&mut self) -> Option<Expression> {
        let token = self.cur.clone();
        let mut arguments = Vec::new();

        if self.peek_is(TokenKind::LParen) {
            self.advance();
            arguments = self
                .parse_expression_list(TokenKind::RParen)
                .unwrap_or_default();
        } else if !self.peek_is_statement_end() {
            arguments = self.parse_arguments_without_parens();
        }

        Some(Expression::Yield(YieldExpression { token, arguments }))
    }

    fn parse_super_expression(&mut self) -> Option<Expression> {
        let token = self.cur.clone();
        let mut arguments = Vec::new();
        let mut has_parens = false;

        if self.peek_is(TokenKind::LParen) {
            has_parens = true;
            self.advance();
            arguments = self
                .parse_expression_list(TokenKind::RParen)
                .unwrap_or_default();
        } else if !self.peek_is_statement_end()
            && !self.peek_is(TokenKind::KeywordDo)
            && !self.peek_is(TokenKind::LBrace)
            && matches!(
                self.peek.kind(),
                TokenKind::Ident
                    | TokenKind::Integer
                    | TokenKind::StringBegin
                    | TokenKind::SymbolBegin
            )
        {
            arguments = self.parse_arguments_without_parens();
        }

        Some(Expression::Super(SuperExpression {
            token,
            arguments,
            has_parens,
        }))
    }

    fn parse_not_expression(&mut self) -> Option<Expression> {
        let token = self.cur.clone();
        self.advance();
        let expression = self.parse_expression(precedence::NOT)?;
        Some(Expression::Not(NotExpression {
            token,
            expression: Box::new(expression),
        }))
    }

    fn parse_defined_expression(&mut self) -> Option<Expression> {
        let token = self.cur.clone();
        let expression = if self.peek_is(TokenKind::LParen) {
            self.advance();
            self.advance();
            let expression = self.parse_expression(precedence::LOWEST)?;
            if !self.expect_peek(TokenKind::RParen) {
                return None;
            }
            expression
        } else {
            self.advance();
            self.parse_expression(precedence::LOWEST)?
        };
        Some(Expression::Defined(DefinedExpression {
            token,
            expression: Box::new(expression),
        }))
    }
}

/// `true` when a token kind can begin a paren-less call's first argument.
///
/// `[` and `*` are excluded — they read as indexing and multiplication —
/// and `{` is a block, never a hash argument.
fn starts_command_argument(kind: TokenKind) -> bool {
    matches!(
        kind,
        TokenKind::Ident
            | TokenKind::Constant
            | TokenKind::Integer
            | TokenKind::Float
            | TokenKind::Rational
            | TokenKind::Imaginary
            | TokenKind::Char
            | TokenKind::StringBegin
            | TokenKind::XstringBegin
            | TokenKind::HeredocBegin
            | TokenKind::Colon
            | TokenKind::SymbolBegin
            | TokenKind::Label
            | TokenKind::KeywordTrue
            | TokenKind::KeywordFalse
            | TokenKind::KeywordNil
            | TokenKind::Ivar
            | TokenKind::Cvar
            | TokenKind::Gvar
            | TokenKind::Ampersand
    )
}

/// `true` when the kind may continue an expression as an infix.
fn has_infix(kind: TokenKind) -> bool {
    use TokenKind::{
        Ampersand, AmpersandAmpersand, AmpersandAmpersandEqual, AmpersandDot, AmpersandEqual,
        BangEqual, BangTilde, Caret, CaretEqual, ColonColon, Dot, DotDot, DotDotDot, Equal,
        EqualEqual, EqualEqualEqual, EqualTilde, Greater, GreaterEqual, GreaterGreater,
        GreaterGreaterEqual, KeywordAnd, KeywordIf, KeywordIfModifier, KeywordOr, KeywordRescue,
        KeywordRescueModifier, KeywordUnless, KeywordUnlessModifier, KeywordUntil,
        KeywordUntilModifier, KeywordWhile, KeywordWhileModifier, LBracket, Less, LessEqual,
        LessEqualGreater, LessLess, LessLessEqual, Minus, MinusEqual, Percent, PercentEqual, Pipe,
        PipeEqual, PipePipe, PipePipeEqual, Plus, PlusEqual, Question, Slash, SlashEqual, Star,
        StarEqual, StarStar, StarStarEqual,
    };
    matches!(
        kind,
        Plus | Minus
            | Star
            | Slash
            | Percent
            | StarStar
            | EqualEqual
            | BangEqual
            | EqualEqualEqual
            | LessEqualGreater
            | Less
            | Greater
            | LessEqual
            | GreaterEqual
            | AmpersandAmpersand
            | PipePipe
            | Ampersand
            | Pipe
            | Caret
            | LessLess
            | GreaterGreater
            | EqualTilde
            | BangTilde
            | DotDot
            | DotDotDot
            | Equal
            | PlusEqual
            | MinusEqual
            | StarEqual
            | SlashEqual
            | PercentEqual
            | StarStarEqual
            | AmpersandEqual
            | PipeEqual
            | CaretEqual
            | LessLessEqual
            | GreaterGreaterEqual
            | PipePipeEqual
            | AmpersandAmpersandEqual
            | LBracket
            | Dot
            | AmpersandDot
            | ColonColon
            | Question
            | KeywordAnd
            | KeywordOr
            | KeywordIf
            | KeywordIfModifier
            | KeywordUnless
            | KeywordUnlessModifier
            | KeywordWhile
            | KeywordWhileModifier
            | KeywordUntil
            | KeywordUntilModifier
            | KeywordRescue
            | KeywordRescueModifier
    )
}

/// Appends an `elsif` link at the end of the alternative chain.
fn attach_alternative(node: &mut IfExpression, elsif: IfExpression) {
    match &mut node.alternative {
        Some(alternative) => attach_alternative(alternative, elsif),
        None => node.alternative = Some(Box::new(elsif)),
    }
}

/// Hangs a final `else` body off the innermost link of the chain.
fn attach_else(node: &mut IfExpression, body: BlockBody) {
    match &mut node.alternative {
        Some(alternative) => attach_else(alternative, body),
        None => node.else_body = Some(body),
    }
}

/// Turns buffered literal content into a string part; empty runs between
/// adjacent interpolations produce nothing.
fn flush_string_part(
    parts: &mut Vec<Expression>,
    start_token: &crate::source_analysis::Token,
    content: &mut String,
) {
    if content.is_empty() {
        return;
    }
    parts.push(Expression::StringLit(StringLiteral {
        token: start_token.clone(),
        value: content.as_str().into(),
    }));
    content.clear();
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::super::tests::{only_expression, parse_err, parse_ok};
    use crate::ast::{Expression, ModifierKind, Statement};

    /// Asserts the canonical rendering of a single-expression program.
    fn assert_canonical(source: &str, expected: &str) {
        let program = parse_ok(source);
        assert_eq!(program.to_string(), expected, "for input {source:?}");
    }

    #[test]
    fn integer_literals() {
        let program = parse_ok("5");
        match only_expression(&program) {
            Expression::Integer(literal) => assert_eq!(literal.value, 5),
            other => panic!("expected integer, got {other:?}"),
        }

        for (source, expected) in [
            ("0x2A", 42),
            ("0o52", 42),
            ("0b101010", 42),
            ("0d42", 42),
            ("1_000_000", 1_000_000),
        ] {
            let program = parse_ok(source);
            match only_expression(&program) {
                Expression::Integer(literal) => {
                    assert_eq!(literal.value, expected, "for {source}");
                }
                other => panic!("expected integer, got {other:?}"),
            }
        }
    }

    #[test]
    fn float_rational_imaginary_literals() {
        let program = parse_ok("3.14");
        match only_expression(&program) {
            Expression::Float(literal) => assert!((literal.value - 3.14).abs() < 1e-9),
            other => panic!("expected float, got {other:?}"),
        }
        assert!(matches!(
            only_expression(&parse_ok("3r")),
            Expression::Rational(_)
        ));
        assert!(matches!(
            only_expression(&parse_ok("2i")),
            Expression::Imaginary(_)
        ));
        assert!(matches!(
            only_expression(&parse_ok("?a")),
            Expression::Char(_)
        ));
    }

    #[test]
    fn string_literals() {
        let program = parse_ok("\"hello\"");
        match only_expression(&program) {
            Expression::StringLit(literal) => assert_eq!(literal.value, "hello"),
            other => panic!("expected string, got {other:?}"),
        }

        let program = parse_ok("'single'");
        match only_expression(&program) {
            Expression::StringLit(literal) => assert_eq!(literal.value, "single"),
            other => panic!("expected string, got {other:?}"),
        }
    }

    #[test]
    fn interpolated_string_has_two_parts() {
        let program = parse_ok("\"hello #{name}\"");
        match only_expression(&program) {
            Expression::InterpolatedString(interpolated) => {
                assert_eq!(interpolated.parts.len(), 2);
                assert!(matches!(interpolated.parts[0], Expression::StringLit(_)));
                assert!(matches!(interpolated.parts[1], Expression::Identifier(_)));
            }
            other => panic!("expected interpolated string, got {other:?}"),
        }
    }

    #[test]
    fn interpolation_only_degenerates_to_plain_string() {
        // No embedded expressions means a plain literal.
        let program = parse_ok("\"plain\"");
        assert!(matches!(
            only_expression(&program),
            Expression::StringLit(_)
        ));
    }

    #[test]
    fn heredoc_parses_to_string_literal() {
        let program = parse_ok("<<EOF\nhello\nworld\nEOF");
        match only_expression(&program) {
            Expression::StringLit(literal) => assert_eq!(literal.value, "hello\nworld\n"),
            other => panic!("expected string, got {other:?}"),
        }
    }

    #[test]
    fn word_and_symbol_arrays() {
        let program = parse_ok("%w(a b c)");
        match only_expression(&program) {
            Expression::Array(array) => {
                assert_eq!(array.elements.len(), 3);
                assert!(matches!(array.elements[0], Expression::StringLit(_)));
            }
            other => panic!("expected array, got {other:?}"),
        }

        let program = parse_ok("%i[one two]");
        match only_expression(&program) {
            Expression::Array(array) => {
                assert_eq!(array.elements.len(), 2);
                assert!(matches!(array.elements[0], Expression::Symbol(_)));
            }
            other => panic!("expected array, got {other:?}"),
        }
    }

    #[test]
    fn interpolation_only_string_has_one_part() {
        let program = parse_ok("\"#{x}\"");
        match only_expression(&program) {
            Expression::InterpolatedString(interpolated) => {
                assert_eq!(interpolated.parts.len(), 1);
                assert!(matches!(interpolated.parts[0], Expression::Identifier(_)));
            }
            other => panic!("expected interpolated string, got {other:?}"),
        }
    }

    #[test]
    fn symbol_literals() {
        for (source, expected) in [(":foo", "foo"), (":\"with space\"", "with space")] {
            let program = parse_ok(source);
            match only_expression(&program) {
                Expression::Symbol(symbol) => assert_eq!(symbol.value, *expected),
                other => panic!("expected symbol, got {other:?}"),
            }
        }
    }

    #[test]
    fn regexp_literal_with_flags() {
        let program = parse_ok("x =~ /ab+c/im");
        match only_expression(&program) {
            Expression::Infix(infix) => match infix.right.as_ref() {
                Expression::Regexp(regexp) => {
                    assert_eq!(regexp.value, "ab+c");
                    assert_eq!(regexp.flags, "im");
                }
                other => panic!("expected regexp, got {other:?}"),
            },
            other => panic!("expected infix, got {other:?}"),
        }
    }

    #[test]
    fn array_and_hash_literals() {
        assert_canonical("[1, 2 + 3, x]", "[1, (2 + 3), x]");
        assert_canonical("{a: 1, b: 2}", "{:a => 1, :b => 2}");
        assert_canonical("{1 => \"one\", \"two\" => 2}", "{1 => \"one\", \"two\" => 2}");
        assert_canonical("{\"s\": 3}", "{\"s\" => 3}");
        assert_canonical("{}", "{}");
    }

    #[test]
    fn hash_preserves_key_order() {
        let program = parse_ok("{b: 2, a: 1, c: 3}");
        match only_expression(&program) {
            Expression::Hash(hash) => {
                let keys: Vec<String> =
                    hash.entries.iter().map(|(k, _)| k.to_string()).collect();
                assert_eq!(keys, [":b", ":a", ":c"]);
            }
            other => panic!("expected hash, got {other:?}"),
        }
    }

    // ------------------------------------------------------------------
    // Operators and precedence
    // ------------------------------------------------------------------

    #[test]
    fn prefix_expressions() {
        assert_canonical("!true", "(!true)");
        assert_canonical("-15", "(-15)");
        assert_canonical("~x", "(~x)");
        assert_canonical("not x", "not x");
    }

    #[test]
    fn operator_precedence_canonical_forms() {
        for (source, expected) in [
            ("1 + 2 * 3", "(1 + (2 * 3))"),
            ("1 * 2 + 3", "((1 * 2) + 3)"),
            ("2 ** 3 ** 2", "(2 ** (3 ** 2))"),
            ("-a * b", "((-a) * b)"),
            ("!-a", "(!(-a))"),
            ("a + b / c", "(a + (b / c))"),
            ("5 < 4 != 3 > 4", "((5 < 4) != (3 > 4))"),
            ("3 + 4 * 5 == 3 * 1 + 4 * 5", "((3 + (4 * 5)) == ((3 * 1) + (4 * 5)))"),
            ("a % b", "(a % b)"),
            ("a <=> b", "(a <=> b)"),
            ("a === b", "(a === b)"),
            ("x =~ y", "(x =~ y)"),
            ("x !~ y", "(x !~ y)"),
            ("1 | 2 ^ 3", "((1 | 2) ^ 3)"),
            ("1 & 2 | 3", "((1 & 2) | 3)"),
            ("1 << 2 + 3", "(1 << (2 + 3))"),
            ("1 + 2 << 3", "((1 + 2) << 3)"),
            ("a && b || c", "((a && b) || c)"),
            ("a || b && c", "(a || (b && c))"),
            ("(1 + 2) * 3", "((1 + 2) * 3)"),
        ] {
            assert_canonical(source, expected);
        }
    }

    #[test]
    fn keyword_logic_binds_looser_than_symbolic() {
        assert_canonical("a and b", "(a and b)");
        assert_canonical("a or b and c", "(a or (b and c))");
        // `and` binds looser than `&&`.
        assert_canonical("a && b and c", "((a && b) and c)");
    }

    #[test]
    fn assignment_is_right_associative() {
        assert_canonical("x = y = 1", "x = y = 1");
        let program = parse_ok("x = y = 1");
        match only_expression(&program) {
            Expression::Assignment(outer) => {
                assert!(matches!(*outer.value, Expression::Assignment(_)));
            }
            other => panic!("expected assignment, got {other:?}"),
        }
    }

    #[test]
    fn op_assignments() {
        for source in ["x += 1", "x -= 1", "x *= 2", "x /= 2", "x ||= y", "x &&= y", "x <<= 1"] {
            let program = parse_ok(source);
            assert!(
                matches!(only_expression(&program), Expression::OpAssignment(_)),
                "for {source}"
            );
            assert_eq!(program.to_string(), source);
        }
    }

    #[test]
    fn ranges() {
        let program = parse_ok("1..5");
        match only_expression(&program) {
            Expression::Range(range) => assert!(!range.exclusive),
            other => panic!("expected range, got {other:?}"),
        }
        let program = parse_ok("1...5");
        match only_expression(&program) {
            Expression::Range(range) => assert!(range.exclusive),
            other => panic!("expected range, got {other:?}"),
        }
        assert_canonical("1 + 1..10", "(1 + 1)..10");
    }

    #[test]
    fn ternary() {
        assert_canonical("x > 0 ? :pos : :neg", "(x > 0) ? :pos : :neg");
    }

    #[test]
    fn index_expressions() {
        assert_canonical("list[1 + 1]", "list[(1 + 1)]");
        assert_canonical("grid[0][1]", "grid[0][1]");
    }

    // ------------------------------------------------------------------
    // Calls
    // ------------------------------------------------------------------

    #[test]
    fn method_call_with_receiver() {
        let program = parse_ok("obj.method(1, 2)");
        match only_expression(&program) {
            Expression::MethodCall(call) => {
                assert!(call.receiver.is_some());
                assert_eq!(call.method, "method");
                assert_eq!(call.arguments.len(), 2);
                assert!(!call.safe_navigation);
            }
            other => panic!("expected call, got {other:?}"),
        }
    }

    #[test]
    fn safe_navigation_call() {
        let program = parse_ok("obj&.method");
        match only_expression(&program) {
            Expression::MethodCall(call) => assert!(call.safe_navigation),
            other => panic!("expected call, got {other:?}"),
        }
    }

    #[test]
    fn call_chains() {
        assert_canonical("a.b.c", "a.b().c()");
        assert_canonical("[1, 2].length", "[1, 2].length()");
    }

    #[test]
    fn paren_less_call() {
        let program = parse_ok("puts 1, 2");
        match only_expression(&program) {
            Expression::MethodCall(call) => {
                assert_eq!(call.method, "puts");
                assert!(call.receiver.is_none());
                assert_eq!(call.arguments.len(), 2);
            }
            other => panic!("expected call, got {other:?}"),
        }
    }

    #[test]
    fn identifier_across_newline_is_not_a_call() {
        let program = parse_ok("foo\nbar");
        assert!(matches!(
            program.statements[0],
            Statement::Expression(ref s) if matches!(s.expression, Some(Expression::Identifier(_)))
        ));
    }

    #[test]
    fn keyword_arguments_form_implicit_hash() {
        let program = parse_ok("render(partial, layout: false, locals: 1)");
        match only_expression(&program) {
            Expression::MethodCall(call) => {
                assert_eq!(call.arguments.len(), 2);
                match &call.arguments[1] {
                    Expression::Hash(hash) => {
                        assert!(hash.is_keyword_args);
                        assert_eq!(hash.entries.len(), 2);
                    }
                    other => panic!("expected implicit hash, got {other:?}"),
                }
            }
            other => panic!("expected call, got {other:?}"),
        }
    }

    #[test]
    fn paren_less_keyword_arguments() {
        let program = parse_ok("render layout: false");
        match only_expression(&program) {
            Expression::MethodCall(call) => {
                assert_eq!(call.arguments.len(), 1);
                assert!(matches!(
                    &call.arguments[0],
                    Expression::Hash(hash) if hash.is_keyword_args
                ));
            }
            other => panic!("expected call, got {other:?}"),
        }
    }

    #[test]
    fn splat_and_block_arguments() {
        let program = parse_ok("foo(*args, **opts, &blk)");
        match only_expression(&program) {
            Expression::MethodCall(call) => {
                assert!(matches!(call.arguments[0], Expression::Splat(_)));
                assert!(matches!(call.arguments[1], Expression::DoubleSplat(_)));
                assert!(matches!(call.arguments[2], Expression::BlockArg(_)));
            }
            other => panic!("expected call, got {other:?}"),
        }
    }

    #[test]
    fn brace_block_attaches_to_call() {
        let program = parse_ok("items.each { |x| puts x }");
        match only_expression(&program) {
            Expression::MethodCall(call) => {
                let block = call.block.as_ref().expect("block attached");
                assert_eq!(block.parameters.len(), 1);
                assert_eq!(block.parameters[0].name, "x");
                assert_eq!(block.body.statements.len(), 1);
            }
            other => panic!("expected call, got {other:?}"),
        }
    }

    #[test]
    fn do_block_attaches_to_call() {
        let program = parse_ok("items.each do |x, y|\nx + y\nend");
        match only_expression(&program) {
            Expression::MethodCall(call) => {
                let block = call.block.as_ref().expect("block attached");
                assert_eq!(block.parameters.len(), 2);
            }
            other => panic!("expected call, got {other:?}"),
        }
    }

    #[test]
    fn block_on_bare_identifier_is_a_call() {
        let program = parse_ok("loop { work }");
        match only_expression(&program) {
            Expression::MethodCall(call) => {
                assert_eq!(call.method, "loop");
                assert!(call.block.is_some());
                assert!(call.arguments.is_empty());
            }
            other => panic!("expected call, got {other:?}"),
        }
    }

    #[test]
    fn block_parameters_with_splat() {
        let program = parse_ok("each { |first, *rest| first }");
        match only_expression(&program) {
            Expression::MethodCall(call) => {
                let block = call.block.as_ref().expect("block");
                assert!(!block.parameters[0].splat);
                assert!(block.parameters[1].splat);
                assert_eq!(block.parameters[1].name, "rest");
            }
            other => panic!("expected call, got {other:?}"),
        }
    }

    #[test]
    fn scoped_constants() {
        assert_canonical("Foo::Bar", "Foo::Bar");
        assert_canonical("Foo::Bar::Baz", "Foo::Bar::Baz");
        assert_canonical("::TopLevel", "::TopLevel");
    }

    #[test]
    fn lambdas() {
        let program = parse_ok("->(x, y) { x + y }");
        match only_expression(&program) {
            Expression::Lambda(lambda) => {
                assert_eq!(lambda.parameters.len(), 2);
                assert_eq!(lambda.body.statements.len(), 1);
            }
            other => panic!("expected lambda, got {other:?}"),
        }

        // An empty lambda body is legal.
        let program = parse_ok("-> { }");
        match only_expression(&program) {
            Expression::Lambda(lambda) => assert!(lambda.body.statements.is_empty()),
            other => panic!("expected lambda, got {other:?}"),
        }
    }

    // ------------------------------------------------------------------
    // Control flow
    // ------------------------------------------------------------------

    #[test]
    fn if_expression() {
        let program = parse_ok("if x > 1\nyes\nend");
        match only_expression(&program) {
            Expression::If(node) => {
                assert!(!node.unless);
                assert_eq!(node.consequence.statements.len(), 1);
                assert!(node.alternative.is_none());
                assert!(node.else_body.is_none());
            }
            other => panic!("expected if, got {other:?}"),
        }
    }

    #[test]
    fn if_with_then_and_else() {
        let program = parse_ok("if x then a\nelse\nb\nend");
        match only_expression(&program) {
            Expression::If(node) => {
                assert!(node.else_body.is_some());
            }
            other => panic!("expected if, got {other:?}"),
        }
    }

    #[test]
    fn elsif_chain_attaches_else_to_innermost() {
        let program = parse_ok("if a\n1\nelsif b\n2\nelsif c\n3\nelse\n4\nend");
        match only_expression(&program) {
            Expression::If(node) => {
                assert!(node.else_body.is_none());
                let first = node.alternative.as_ref().expect("first elsif");
                assert!(first.else_body.is_none());
                let second = first.alternative.as_ref().expect("second elsif");
                assert!(second.alternative.is_none());
                assert!(second.else_body.is_some(), "else on the innermost link");
            }
            other => panic!("expected if, got {other:?}"),
        }
    }

    #[test]
    fn unless_expression() {
        let program = parse_ok("unless ready\nwait\nend");
        match only_expression(&program) {
            Expression::If(node) => assert!(node.unless),
            other => panic!("expected unless, got {other:?}"),
        }
    }

    #[test]
    fn modifier_forms() {
        for (source, modifier) in [
            ("x = 1 if debug", ModifierKind::If),
            ("warn unless quiet", ModifierKind::Unless),
            ("x += 1 while x < 10", ModifierKind::While),
            ("dig until found", ModifierKind::Until),
        ] {
            let program = parse_ok(source);
            match only_expression(&program) {
                Expression::Modifier(node) => {
                    assert_eq!(node.modifier, modifier, "for {source}");
                }
                other => panic!("expected modifier for {source}, got {other:?}"),
            }
        }
    }

    #[test]
    fn modifier_applies_to_whole_paren_less_call() {
        let program = parse_ok("puts x if verbose");
        match only_expression(&program) {
            Expression::Modifier(node) => {
                assert!(matches!(*node.body, Expression::MethodCall(_)));
            }
            other => panic!("expected modifier, got {other:?}"),
        }
    }

    #[test]
    fn rescue_modifier() {
        let program = parse_ok("risky rescue fallback");
        match only_expression(&program) {
            Expression::RescueModifier(node) => {
                assert_eq!(node.body.to_string(), "risky");
                assert_eq!(node.rescue.to_string(), "fallback");
            }
            other => panic!("expected rescue modifier, got {other:?}"),
        }
    }

    #[test]
    fn case_expression_with_subject() {
        let program = parse_ok(
            "case x\nwhen 1\n\"one\"\nwhen 2\n\"two\"\nelse\n\"other\"\nend",
        );
        match only_expression(&program) {
            Expression::Case(node) => {
                assert_eq!(node.subject.as_ref().map(ToString::to_string), Some("x".into()));
                assert_eq!(node.whens.len(), 2);
                assert_eq!(node.whens[0].conditions.len(), 1);
                assert!(node.else_body.is_some());
            }
            other => panic!("expected case, got {other:?}"),
        }
    }

    #[test]
    fn case_when_with_multiple_conditions() {
        let program = parse_ok("case x\nwhen 1, 2, 3\nsmall\nend");
        match only_expression(&program) {
            Expression::Case(node) => assert_eq!(node.whens[0].conditions.len(), 3),
            other => panic!("expected case, got {other:?}"),
        }
    }

    #[test]
    fn subjectless_case() {
        let program = parse_ok("case\nwhen x > 1\nbig\nend");
        match only_expression(&program) {
            Expression::Case(node) => assert!(node.subject.is_none()),
            other => panic!("expected case, got {other:?}"),
        }
    }

    #[test]
    fn while_and_until_loops() {
        let program = parse_ok("while x < 10\nx += 1\nend");
        match only_expression(&program) {
            Expression::While(node) => {
                assert!(!node.until);
                assert_eq!(node.body.statements.len(), 1);
            }
            other => panic!("expected while, got {other:?}"),
        }

        let program = parse_ok("until done\nstep\nend");
        match only_expression(&program) {
            Expression::While(node) => assert!(node.until),
            other => panic!("expected until, got {other:?}"),
        }
    }

    #[test]
    fn for_loop() {
        let program = parse_ok("for i in 1..3\nputs i\nend");
        match only_expression(&program) {
            Expression::For(node) => {
                assert_eq!(node.variable.to_string(), "i");
                assert!(matches!(*node.iterable, Expression::Range(_)));
            }
            other => panic!("expected for, got {other:?}"),
        }
    }

    #[test]
    fn begin_rescue_ensure() {
        let program = parse_ok(
            "begin\nwork\nrescue TypeError, ArgumentError => e\nhandle e\nelse\ncelebrate\nensure\ncleanup\nend",
        );
        match only_expression(&program) {
            Expression::Begin(node) => {
                assert_eq!(node.body.statements.len(), 1);
                assert_eq!(node.rescues.len(), 1);
                assert_eq!(node.rescues[0].exceptions.len(), 2);
                assert_eq!(
                    node.rescues[0].variable.as_ref().map(|v| v.value.as_str()),
                    Some("e")
                );
                assert!(node.else_body.is_some());
                assert!(node.ensure_body.is_some());
            }
            other => panic!("expected begin, got {other:?}"),
        }
    }

    #[test]
    fn bare_rescue_keeps_its_body() {
        let program = parse_ok("begin\nwork\nrescue\nrecover\nend");
        match only_expression(&program) {
            Expression::Begin(node) => {
                assert!(node.rescues[0].exceptions.is_empty());
                assert_eq!(node.rescues[0].body.statements.len(), 1);
            }
            other => panic!("expected begin, got {other:?}"),
        }
    }

    #[test]
    fn yield_super_defined() {
        assert_canonical("yield", "yield");
        assert_canonical("yield(1, 2)", "yield(1, 2)");
        assert_canonical("super", "super");
        assert_canonical("super()", "super()");
        assert_canonical("super(1)", "super(1)");
        assert_canonical("defined?(foo)", "defined?(foo)");
    }

    #[test]
    fn instance_class_and_global_variables() {
        assert_canonical("@name", "@name");
        assert_canonical("@@count", "@@count");
        assert_canonical("$stdout", "$stdout");
        assert_canonical("$1", "$1");
        assert_canonical("$&", "$&");
    }

    // ------------------------------------------------------------------
    // Round-trip fixed point
    // ------------------------------------------------------------------

    #[test]
    fn canonical_form_is_a_fixed_point() {
        let sources = [
            "1 + 2 * 3",
            "x = y = 1",
            "puts 1, 2",
            "items.each { |x| puts x }",
            "{a: 1, b: 2}",
            "[1, 2 + 3]",
            "if a\n1\nelsif b\n2\nelse\n3\nend",
            "while x < 10\nx += 1\nend",
            "case x\nwhen 1\none\nend",
            "begin\nwork\nrescue TypeError => e\nhandle e\nend",
            "def add(a, b = 1, *rest, key: 2, **opts, &blk)\na + b\nend",
            "a ? b : c",
            "x = 1 if debug",
            "\"hello #{name}\"",
            "-> { }",
            "1..5",
            "not x",
            "a and b or c",
        ];
        for source in sources {
            let first = parse_ok(source).to_string();
            let second = parse_ok(&first).to_string();
            assert_eq!(first, second, "round-trip for {source:?}");
        }
    }

    // ------------------------------------------------------------------
    // Errors
    // ------------------------------------------------------------------

    #[test]
    fn unterminated_index_reports_expected_bracket() {
        let diagnostics = parse_err("a[1");
        assert!(
            diagnostics[0].message.starts_with("expected next token to be ]"),
            "got {diagnostics:?}"
        );
    }

    #[test]
    fn ternary_missing_colon_reports_error() {
        let diagnostics = parse_err("a ? b");
        assert!(
            diagnostics
                .iter()
                .any(|d| d.message.starts_with("expected next token to be :")),
            "got {diagnostics:?}"
        );
    }
}
