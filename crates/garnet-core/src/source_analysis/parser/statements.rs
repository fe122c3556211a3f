// Copyright 2026 The garnet authors
// SPDX-License-Identifier: Apache-2.0

//! Statement and definition parsing.
//!
//! `parse_statement` dispatches on the current token: method, class,
//! singleton-class, and module definitions, the jump statements (`return`,
//! `break`, `next`, `redo`, `retry`), `alias`/`undef`, and otherwise an
//! expression statement.
//!
//! A method body containing `rescue`/`ensure` clauses parses as an
//! implicit begin-expression wrapping the body, so
//! `def f … rescue … end` and `def f; begin … rescue … end; end` build the
//! same shape.

use ecow::EcoString;

use crate::ast::{
    AliasStatement, BlockBody, BreakStatement, ClassDefinition, Constant, Expression, Identifier,
    MethodDefinition, MethodParameter, ModuleDefinition, NextStatement, RedoStatement,
    RetryStatement, ReturnStatement, SelfExpression, SingletonClassDefinition, Statement,
    UndefStatement,
};
use crate::source_analysis::TokenKind;

use super::{Parser, precedence};

impl Parser<'_> {
    /// Parses one statement; `cur` is its first token. Returns `None` when
    /// the production failed (a diagnostic has been recorded).
    pub(super) fn parse_statement(&mut self) -> Option<Statement> {
        match self.cur.kind() {
            TokenKind::KeywordDef => self.parse_method_definition().map(Statement::MethodDefinition),
            TokenKind::KeywordClass => self.parse_class_definition(),
            TokenKind::KeywordModule => self.parse_module_definition().map(Statement::ModuleDefinition),
            TokenKind::KeywordReturn => Some(Statement::Return(self.parse_return_statement())),
            TokenKind::KeywordBreak => Some(Statement::Break(self.parse_break_statement())),
            TokenKind::KeywordNext => Some(Statement::Next(self.parse_next_statement())),
            TokenKind::KeywordRedo => Some(Statement::Redo(RedoStatement {
                token: self.cur.clone(),
            })),
            TokenKind::KeywordRetry => Some(Statement::Retry(RetryStatement {
                token: self.cur.clone(),
            })),
            TokenKind::KeywordAlias => self.parse_alias_statement().map(Statement::Alias),
            TokenKind::KeywordUndef => self.parse_undef_statement().map(Statement::Undef),
            _ => Some(Statement::Expression(self.parse_expression_statement())),
        }
    }

    /// Like [`Self::parse_statement`], but expression statements stop at
    /// the clause keywords that terminate `begin`-like bodies.
    pub(super) fn parse_clause_body_statement(&mut self) -> Option<Statement> {
        match self.cur.kind() {
            TokenKind::KeywordDef
            | TokenKind::KeywordClass
            | TokenKind::KeywordModule
            | TokenKind::KeywordReturn
            | TokenKind::KeywordBreak
            | TokenKind::KeywordNext
            | TokenKind::KeywordRedo
            | TokenKind::KeywordRetry
            | TokenKind::KeywordAlias
            | TokenKind::KeywordUndef => self.parse_statement(),
            _ => {
                let token = self.cur.clone();
                let expression = self.parse_clause_body_expression(precedence::LOWEST);
                Some(Statement::Expression(crate::ast::ExpressionStatement {
                    token,
                    expression,
                }))
            }
        }
    }

    fn parse_expression_statement(&mut self) -> crate::ast::ExpressionStatement {
        crate::ast::ExpressionStatement {
            token: self.cur.clone(),
            expression: self.parse_expression(precedence::LOWEST),
        }
    }

    // ========================================================================
    // Method definitions
    // ========================================================================

    fn parse_method_definition(&mut self) -> Option<MethodDefinition> {
        let token = self.cur.clone();
        self.advance(); // onto the name or singleton receiver

        // `def self.name` / `def obj.name`: the receiver is a simple
        // primary, never a full expression — climbing here would swallow
        // the method name as a call.
        let mut receiver = None;
        if self.peek_is(TokenKind::Dot) {
            receiver = Some(match self.cur.kind() {
                TokenKind::KeywordSelf => Expression::SelfExpr(SelfExpression {
                    token: self.cur.clone(),
                }),
                TokenKind::Constant => Expression::Constant(Constant {
                    token: self.cur.clone(),
                    value: self.cur.literal().into(),
                }),
                _ => Expression::Identifier(Identifier {
                    token: self.cur.clone(),
                    value: self.cur.literal().into(),
                }),
            });
            self.advance(); // onto .
            self.advance(); // onto the name
        }

        let name: EcoString = self.cur.literal().into();

        let mut parameters = Vec::new();
        if self.peek_is(TokenKind::LParen) {
            self.advance();
            parameters = self.parse_method_parameters();
        } else if !self.saw_newline && self.peek_is(TokenKind::Ident) {
            // Paren-less parameters only on the `def` line itself.
            parameters = self.parse_method_parameters_without_parens();
        }

        let body = self.parse_method_body(&token);

        Some(MethodDefinition {
            token,
            name,
            receiver,
            parameters,
            body,
        })
    }

    fn parse_method_parameters(&mut self) -> Vec<MethodParameter> {
        let mut parameters = Vec::new();

        if self.peek_is(TokenKind::RParen) {
            self.advance();
            return parameters;
        }

        self.advance();
        while !self.cur_is(TokenKind::RParen) && !self.cur_is(TokenKind::Eof) {
            let mut parameter = MethodParameter {
                token: self.cur.clone(),
                name: EcoString::new(),
                splat: false,
                double_splat: false,
                block: false,
                keyword: false,
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

            if self.cur_is(TokenKind::Label) {
                // `name:` or `name: default`
                parameter.keyword = true;
                parameter.name = self.cur.literal().trim_end_matches(':').into();
                if !self.peek_is(TokenKind::Comma) && !self.peek_is(TokenKind::RParen) {
                    self.advance();
                    parameter.default = self.parse_expression(precedence::LOWEST);
                }
            } else {
                parameter.name = self.cur.literal().into();
                if self.peek_is(TokenKind::Colon) {
                    parameter.keyword = true;
                    self.advance();
                    if !self.peek_is(TokenKind::Comma) && !self.peek_is(TokenKind::RParen) {
                        self.advance();
                        parameter.default = self.parse_expression(precedence::LOWEST);
                    }
                } else if self.peek_is(TokenKind::Equal) {
                    self.advance();
                    self.advance();
                    parameter.default = self.parse_expression(precedence::LOWEST);
                }
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

    fn parse_method_parameters_without_parens(&mut self) -> Vec<MethodParameter> {
        let mut parameters = Vec::new();

        self.advance();
        while !self.cur_is(TokenKind::KeywordEnd) && !self.cur_is(TokenKind::Eof) {
            let mut parameter = MethodParameter {
                token: self.cur.clone(),
                name: EcoString::new(),
                splat: false,
                double_splat: false,
                block: false,
                keyword: false,
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
                break;
            }
        }

        parameters
    }

    /// A method body runs to `end`; `rescue`/`ensure` clauses wrap the
    /// collected statements in an implicit begin-expression.
    fn parse_method_body(&mut self, def_token: &crate::source_analysis::Token) -> BlockBody {
        let mut body = BlockBody::default();

        self.advance();
        while !matches!(
            self.cur.kind(),
            TokenKind::KeywordEnd
                | TokenKind::KeywordRescue
                | TokenKind::KeywordEnsure
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

        if matches!(
            self.cur.kind(),
            TokenKind::KeywordRescue | TokenKind::KeywordEnsure
        ) {
            let begin = self.parse_begin_tail(def_token.clone(), body);
            return BlockBody {
                statements: vec![Statement::Expression(crate::ast::ExpressionStatement {
                    token: begin.token.clone(),
                    expression: Some(Expression::Begin(begin)),
                })],
            };
        }

        body
    }

    // ========================================================================
    // Class and module definitions
    // ========================================================================

    fn parse_class_definition(&mut self) -> Option<Statement> {
        let token = self.cur.clone();
        self.advance();

        // `class << obj` reopens the object's singleton class.
        if self.cur_is(TokenKind::LessLess) {
            self.advance();
            let object = self.parse_expression(precedence::LOWEST)?;
            let body = self.parse_definition_body();
            return Some(Statement::SingletonClassDefinition(
                SingletonClassDefinition {
                    token,
                    object,
                    body,
                },
            ));
        }

        let name: EcoString = self.cur.literal().into();

        let mut superclass = None;
        if self.peek_is(TokenKind::Less) {
            self.advance();
            self.advance();
            superclass = self.parse_expression(precedence::LOWEST);
        }

        let body = self.parse_definition_body();
        Some(Statement::ClassDefinition(ClassDefinition {
            token,
            name,
            superclass,
            body,
        }))
    }

    fn parse_module_definition(&mut self) -> Option<ModuleDefinition> {
        let token = self.cur.clone();
        self.advance();
        let name: EcoString = self.cur.literal().into();
        let body = self.parse_definition_body();
        Some(ModuleDefinition { token, name, body })
    }

    /// Statements until `end`, for class and module bodies.
    fn parse_definition_body(&mut self) -> BlockBody {
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

    // ========================================================================
    // Jump statements
    // ========================================================================

    fn parse_return_statement(&mut self) -> ReturnStatement {
        let token = self.cur.clone();
        let mut value = None;
        if !self.peek_is_statement_end() {
            self.advance();
            value = self.parse_expression(precedence::LOWEST);
        }
        ReturnStatement { token, value }
    }

    fn parse_break_statement(&mut self) -> BreakStatement {
        let token = self.cur.clone();
        let mut value = None;
        if !self.peek_is_statement_end() {
            self.advance();
            value = self.parse_expression(precedence::LOWEST);
        }
        BreakStatement { token, value }
    }

    fn parse_next_statement(&mut self) -> NextStatement {
        let token = self.cur.clone();
        let mut value = None;
        if !self.peek_is_statement_end() {
            self.advance();
            value = self.parse_expression(precedence::LOWEST);
        }
        NextStatement { token, value }
    }

    // ========================================================================
    // alias / undef
    // ========================================================================

    fn parse_alias_statement(&mut self) -> Option<AliasStatement> {
        let token = self.cur.clone();
        self.advance();
        let new_name = self.parse_name_reference()?;
        self.advance();
        let old_name = self.parse_name_reference()?;
        Some(AliasStatement {
            token,
            new_name,
            old_name,
        })
    }

    fn parse_undef_statement(&mut self) -> Option<UndefStatement> {
        let token = self.cur.clone();
        self.advance();
        let mut methods = vec![self.parse_name_reference()?];
        while self.peek_is(TokenKind::Comma) {
            self.advance();
            self.advance();
            methods.push(self.parse_name_reference()?);
        }
        Some(UndefStatement { token, methods })
    }

    /// A method name in `alias`/`undef` position: a bare name, operator
    /// method name, or symbol — never a call.
    fn parse_name_reference(&mut self) -> Option<Expression> {
        match self.cur.kind() {
            TokenKind::Ident | TokenKind::MethodName => {
                Some(Expression::Identifier(Identifier {
                    token: self.cur.clone(),
                    value: self.cur.literal().into(),
                }))
            }
            TokenKind::Constant => Some(Expression::Constant(Constant {
                token: self.cur.clone(),
                value: self.cur.literal().into(),
            })),
            TokenKind::Gvar => Some(Expression::GlobalVariable(crate::ast::GlobalVariable {
                token: self.cur.clone(),
                name: self.cur.literal().into(),
            })),
            TokenKind::SymbolBegin | TokenKind::Colon => Some(self.parse_symbol_reference()),
            _ => {
                let message =
                    ecow::eco_format!("expected method name, got {}", self.cur.kind());
                self.error(message);
                None
            }
        }
    }

    fn parse_symbol_reference(&mut self) -> Expression {
        let token = self.cur.clone();
        self.advance();
        Expression::Symbol(crate::ast::SymbolLiteral {
            token,
            value: self.cur.literal().into(),
        })
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::super::tests::{only_statement, parse_ok};
    use crate::ast::{Expression, Statement};

    #[test]
    fn method_definition_with_parameters() {
        let program = parse_ok("def add(a, b)\na + b\nend");
        match only_statement(&program) {
            Statement::MethodDefinition(method) => {
                assert_eq!(method.name, "add");
                assert!(method.receiver.is_none());
                assert_eq!(method.parameters.len(), 2);
                assert_eq!(method.body.statements.len(), 1);
            }
            other => panic!("expected method definition, got {other:?}"),
        }
    }

    #[test]
    fn method_definition_parameter_forms() {
        let program = parse_ok("def f(a, b = 1, *rest, key:, opt: 2, **kw, &blk)\nend");
        match only_statement(&program) {
            Statement::MethodDefinition(method) => {
                let rendered: Vec<String> =
                    method.parameters.iter().map(ToString::to_string).collect();
                assert_eq!(
                    rendered,
                    ["a", "b = 1", "*rest", "key:", "opt: 2", "**kw", "&blk"]
                );
            }
            other => panic!("expected method definition, got {other:?}"),
        }
    }

    #[test]
    fn method_definition_without_parens() {
        let program = parse_ok("def greet name\nputs name\nend");
        match only_statement(&program) {
            Statement::MethodDefinition(method) => {
                assert_eq!(method.name, "greet");
                assert_eq!(method.parameters.len(), 1);
                assert_eq!(method.parameters[0].name, "name");
            }
            other => panic!("expected method definition, got {other:?}"),
        }
    }

    #[test]
    fn singleton_method_definition() {
        let program = parse_ok("def self.build(x)\nx\nend");
        match only_statement(&program) {
            Statement::MethodDefinition(method) => {
                assert_eq!(method.name, "build");
                assert!(matches!(
                    method.receiver,
                    Some(Expression::SelfExpr(_))
                ));
                assert_eq!(method.parameters.len(), 1);
            }
            other => panic!("expected method definition, got {other:?}"),
        }
    }

    #[test]
    fn setter_method_definition() {
        let program = parse_ok("def name=(value)\n@name = value\nend");
        match only_statement(&program) {
            Statement::MethodDefinition(method) => {
                assert_eq!(method.name, "name=");
            }
            other => panic!("expected method definition, got {other:?}"),
        }
    }

    #[test]
    fn rescue_in_method_body_wraps_in_implicit_begin() {
        let program = parse_ok("def risky\nwork\nrescue TypeError => e\nrecover\nensure\ncleanup\nend");
        match only_statement(&program) {
            Statement::MethodDefinition(method) => {
                assert_eq!(method.body.statements.len(), 1);
                match &method.body.statements[0] {
                    Statement::Expression(statement) => match statement.expression.as_ref() {
                        Some(Expression::Begin(begin)) => {
                            assert_eq!(begin.body.statements.len(), 1);
                            assert_eq!(begin.rescues.len(), 1);
                            assert!(begin.ensure_body.is_some());
                        }
                        other => panic!("expected implicit begin, got {other:?}"),
                    },
                    other => panic!("expected expression statement, got {other:?}"),
                }
            }
            other => panic!("expected method definition, got {other:?}"),
        }
    }

    #[test]
    fn class_definition_with_superclass() {
        let program = parse_ok("class Dog < Animal\ndef bark\nend\nend");
        match only_statement(&program) {
            Statement::ClassDefinition(class) => {
                assert_eq!(class.name, "Dog");
                assert_eq!(
                    class.superclass.as_ref().map(ToString::to_string),
                    Some("Animal".into())
                );
                assert_eq!(class.body.statements.len(), 1);
            }
            other => panic!("expected class definition, got {other:?}"),
        }
    }

    #[test]
    fn singleton_class_definition() {
        let program = parse_ok("class << self\ndef helper\nend\nend");
        match only_statement(&program) {
            Statement::SingletonClassDefinition(singleton) => {
                assert!(matches!(singleton.object, Expression::SelfExpr(_)));
                assert_eq!(singleton.body.statements.len(), 1);
            }
            other => panic!("expected singleton class, got {other:?}"),
        }
    }

    #[test]
    fn module_definition() {
        let program = parse_ok("module Enumerable\ndef tally\nend\nend");
        match only_statement(&program) {
            Statement::ModuleDefinition(module) => {
                assert_eq!(module.name, "Enumerable");
                assert_eq!(module.body.statements.len(), 1);
            }
            other => panic!("expected module definition, got {other:?}"),
        }
    }

    #[test]
    fn return_break_next_with_and_without_values() {
        let program = parse_ok("return 1 + 2");
        assert_eq!(only_statement(&program).to_string(), "return (1 + 2)");

        let program = parse_ok("return");
        assert_eq!(only_statement(&program).to_string(), "return");

        let program = parse_ok("break");
        assert!(matches!(only_statement(&program), Statement::Break(_)));

        let program = parse_ok("next x");
        assert_eq!(only_statement(&program).to_string(), "next x");

        let program = parse_ok("redo");
        assert!(matches!(only_statement(&program), Statement::Redo(_)));

        let program = parse_ok("retry");
        assert!(matches!(only_statement(&program), Statement::Retry(_)));
    }

    #[test]
    fn alias_statement() {
        let program = parse_ok("alias shout scream");
        assert_eq!(only_statement(&program).to_string(), "alias shout scream");

        let program = parse_ok("alias :shout :scream");
        assert_eq!(only_statement(&program).to_string(), "alias :shout :scream");
    }

    #[test]
    fn undef_statement() {
        let program = parse_ok("undef shout, scream");
        match only_statement(&program) {
            Statement::Undef(undef) => assert_eq!(undef.methods.len(), 2),
            other => panic!("expected undef, got {other:?}"),
        }
    }

    #[test]
    fn definitions_render_round_trip() {
        for source in [
            "def add(a, b)\n(a + b)\nend",
            "class Dog < Animal\ndef bark\n\nend\nend",
            "module M\n\nend",
            "def self.build\n\nend",
        ] {
            let first = parse_ok(source).to_string();
            let second = parse_ok(&first).to_string();
            assert_eq!(first, second, "round-trip for {source:?}");
        }
    }
}
