// Copyright 2026 The garnet authors
// SPDX-License-Identifier: Apache-2.0

//! Abstract Syntax Tree definitions for Ruby.
//!
//! The parser produces a [`Program`]: an ordered sequence of [`Statement`]s,
//! most of which wrap [`Expression`]s — in Ruby nearly everything is an
//! expression. Every expression node records the [`Token`] where it begins,
//! available through [`Expression::token_literal`], for source-position
//! reporting.
//!
//! # Canonical rendering
//!
//! Every node implements [`std::fmt::Display`], producing a deterministic
//! textual form used by tests to compare shape and precedence decisions:
//! infix and logical operators are parenthesised and spaced, blocks render
//! as `{ |params| body }`, statements join with newlines. The rendering is
//! a canonical form, not a source-exact pretty-printer — but it is a fixed
//! point: parsing the rendering of a program and rendering again yields
//! identical output.

use std::fmt;

use ecow::EcoString;

use crate::source_analysis::Token;

/// The root node of every AST: an ordered sequence of statements.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Program {
    /// Top-level statements in source order.
    pub statements: Vec<Statement>,
}

impl Program {
    /// The canonical literal of the program's first token, or `""`.
    #[must_use]
    pub fn token_literal(&self) -> &str {
        self.statements.first().map_or("", Statement::token_literal)
    }
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, statement) in self.statements.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{statement}")?;
        }
        Ok(())
    }
}

/// A statement.
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    /// `def name(params) … end`
    MethodDefinition(MethodDefinition),
    /// `class Name < Super … end`
    ClassDefinition(ClassDefinition),
    /// `class << obj … end`
    SingletonClassDefinition(SingletonClassDefinition),
    /// `module Name … end`
    ModuleDefinition(ModuleDefinition),
    /// `return expr?`
    Return(ReturnStatement),
    /// `break expr?`
    Break(BreakStatement),
    /// `next expr?`
    Next(NextStatement),
    /// `redo`
    Redo(RedoStatement),
    /// `retry`
    Retry(RetryStatement),
    /// `alias new old`
    Alias(AliasStatement),
    /// `undef name, …`
    Undef(UndefStatement),
    /// An expression in statement position.
    Expression(ExpressionStatement),
}

impl Statement {
    /// The canonical literal of this statement's first token.
    #[must_use]
    pub fn token_literal(&self) -> &str {
        match self {
            Self::MethodDefinition(s) => s.token.literal(),
            Self::ClassDefinition(s) => s.token.literal(),
            Self::SingletonClassDefinition(s) => s.token.literal(),
            Self::ModuleDefinition(s) => s.token.literal(),
            Self::Return(s) => s.token.literal(),
            Self::Break(s) => s.token.literal(),
            Self::Next(s) => s.token.literal(),
            Self::Redo(s) => s.token.literal(),
            Self::Retry(s) => s.token.literal(),
            Self::Alias(s) => s.token.literal(),
            Self::Undef(s) => s.token.literal(),
            Self::Expression(s) => s.token.literal(),
        }
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MethodDefinition(s) => s.fmt(f),
            Self::ClassDefinition(s) => s.fmt(f),
            Self::SingletonClassDefinition(s) => s.fmt(f),
            Self::ModuleDefinition(s) => s.fmt(f),
            Self::Return(s) => s.fmt(f),
            Self::Break(s) => s.fmt(f),
            Self::Next(s) => s.fmt(f),
            Self::Redo(s) => s.fmt(f),
            Self::Retry(s) => s.fmt(f),
            Self::Alias(s) => s.fmt(f),
            Self::Undef(s) => s.fmt(f),
            Self::Expression(s) => s.fmt(f),
        }
    }
}

/// An expression wrapped as a statement.
#[derive(Debug, Clone, PartialEq)]
pub struct ExpressionStatement {
    /// The statement's first token.
    pub token: Token,
    /// The expression, or `None` when parsing it failed.
    pub expression: Option<Expression>,
}

impl ExpressionStatement {
    #[must_use]
    pub fn token_literal(&self) -> &str {
        self.token.literal()
    }
}

impl fmt::Display for ExpressionStatement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.expression {
            Some(expression) => expression.fmt(f),
            None => Ok(()),
        }
    }
}

/// An expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    Integer(IntegerLiteral),
    Float(FloatLiteral),
    Rational(RationalLiteral),
    Imaginary(ImaginaryLiteral),
    Char(CharLiteral),
    StringLit(StringLiteral),
    InterpolatedString(InterpolatedString),
    Symbol(SymbolLiteral),
    Regexp(RegexpLiteral),
    Boolean(BooleanLiteral),
    Nil(NilLiteral),
    SelfExpr(SelfExpression),
    Array(ArrayLiteral),
    Hash(HashLiteral),
    Range(RangeLiteral),
    Identifier(Identifier),
    Constant(Constant),
    InstanceVariable(InstanceVariable),
    ClassVariable(ClassVariable),
    GlobalVariable(GlobalVariable),
    ScopedConstant(ScopedConstant),
    Prefix(PrefixExpression),
    Infix(InfixExpression),
    Assignment(AssignmentExpression),
    OpAssignment(OpAssignmentExpression),
    Index(IndexExpression),
    MethodCall(MethodCall),
    Lambda(Lambda),
    If(Box<IfExpression>),
    Ternary(TernaryExpression),
    Modifier(ModifierExpression),
    Case(CaseExpression),
    While(WhileExpression),
    For(ForExpression),
    Begin(BeginExpression),
    Yield(YieldExpression),
    Super(SuperExpression),
    Not(NotExpression),
    And(AndExpression),
    Or(OrExpression),
    RescueModifier(RescueModifierExpression),
    Splat(SplatExpression),
    DoubleSplat(DoubleSplatExpression),
    BlockArg(BlockArgExpression),
    Defined(DefinedExpression),
}

impl Expression {
    /// The canonical literal of the token where this expression begins.
    #[must_use]
    pub fn token_literal(&self) -> &str {
        self.token().literal()
    }

    /// The token where this expression begins.
    #[must_use]
    pub fn token(&self) -> &Token {
        match self {
            Self::Integer(e) => &e.token,
            Self::Float(e) => &e.token,
            Self::Rational(e) => &e.token,
            Self::Imaginary(e) => &e.token,
            Self::Char(e) => &e.token,
            Self::StringLit(e) => &e.token,
            Self::InterpolatedString(e) => &e.token,
            Self::Symbol(e) => &e.token,
            Self::Regexp(e) => &e.token,
            Self::Boolean(e) => &e.token,
            Self::Nil(e) => &e.token,
            Self::SelfExpr(e) => &e.token,
            Self::Array(e) => &e.token,
            Self::Hash(e) => &e.token,
            Self::Range(e) => &e.token,
            Self::Identifier(e) => &e.token,
            Self::Constant(e) => &e.token,
            Self::InstanceVariable(e) => &e.token,
            Self::ClassVariable(e) => &e.token,
            Self::GlobalVariable(e) => &e.token,
            Self::ScopedConstant(e) => &e.token,
            Self::Prefix(e) => &e.token,
            Self::Infix(e) => &e.token,
            Self::Assignment(e) => &e.token,
            Self::OpAssignment(e) => &e.token,
            Self::Index(e) => &e.token,
            Self::MethodCall(e) => &e.token,
            Self::Lambda(e) => &e.token,
            Self::If(e) => &e.token,
            Self::Ternary(e) => &e.token,
            Self::Modifier(e) => &e.token,
            Self::Case(e) => &e.token,
            Self::While(e) => &e.token,
            Self::For(e) => &e.token,
            Self::Begin(e) => &e.token,
            Self::Yield(e) => &e.token,
            Self::Super(e) => &e.token,
            Self::Not(e) => &e.token,
            Self::And(e) => &e.token,
            Self::Or(e) => &e.token,
            Self::RescueModifier(e) => &e.token,
            Self::Splat(e) => &e.token,
            Self::DoubleSplat(e) => &e.token,
            Self::BlockArg(e) => &e.token,
            Self::Defined(e) => &e.token,
        }
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer(e) => e.fmt(f),
            Self::Float(e) => e.fmt(f),
            Self::Rational(e) => e.fmt(f),
            Self::Imaginary(e) => e.fmt(f),
            Self::Char(e) => e.fmt(f),
            Self::StringLit(e) => e.fmt(f),
            Self::InterpolatedString(e) => e.fmt(f),
            Self::Symbol(e) => e.fmt(f),
            Self::Regexp(e) => e.fmt(f),
            Self::Boolean(e) => e.fmt(f),
            Self::Nil(e) => e.fmt(f),
            Self::SelfExpr(e) => e.fmt(f),
            Self::Array(e) => e.fmt(f),
            Self::Hash(e) => e.fmt(f),
            Self::Range(e) => e.fmt(f),
            Self::Identifier(e) => e.fmt(f),
            Self::Constant(e) => e.fmt(f),
            Self::InstanceVariable(e) => e.fmt(f),
            Self::ClassVariable(e) => e.fmt(f),
            Self::GlobalVariable(e) => e.fmt(f),
            Self::ScopedConstant(e) => e.fmt(f),
            Self::Prefix(e) => e.fmt(f),
            Self::Infix(e) => e.fmt(f),
            Self::Assignment(e) => e.fmt(f),
            Self::OpAssignment(e) => e.fmt(f),
            Self::Index(e) => e.fmt(f),
            Self::MethodCall(e) => e.fmt(f),
            Self::Lambda(e) => e.fmt(f),
            Self::If(e) => e.fmt(f),
            Self::Ternary(e) => e.fmt(f),
            Self::Modifier(e) => e.fmt(f),
            Self::Case(e) => e.fmt(f),
            Self::While(e) => e.fmt(f),
            Self::For(e) => e.fmt(f),
            Self::Begin(e) => e.fmt(f),
            Self::Yield(e) => e.fmt(f),
            Self::Super(e) => e.fmt(f),
            Self::Not(e) => e.fmt(f),
            Self::And(e) => e.fmt(f),
            Self::Or(e) => e.fmt(f),
            Self::RescueModifier(e) => e.fmt(f),
            Self::Splat(e) => e.fmt(f),
            Self::DoubleSplat(e) => e.fmt(f),
            Self::BlockArg(e) => e.fmt(f),
            Self::Defined(e) => e.fmt(f),
        }
    }
}

// ============================================================================
// Literals
// ============================================================================

/// `42`, `0x2A`, `1_000`
#[derive(Debug, Clone, PartialEq)]
pub struct IntegerLiteral {
    pub token: Token,
    pub value: i64,
}

impl fmt::Display for IntegerLiteral {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token.literal())
    }
}

/// `3.14`, `1.0e10`
#[derive(Debug, Clone, PartialEq)]
pub struct FloatLiteral {
    pub token: Token,
    pub value: f64,
}

impl fmt::Display for FloatLiteral {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token.literal())
    }
}

/// `3r`, `3.14r` — kept textual; the numerator/denominator split belongs to
/// the runtime.
#[derive(Debug, Clone, PartialEq)]
pub struct RationalLiteral {
    pub token: Token,
}

impl fmt::Display for RationalLiteral {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token.literal())
    }
}

/// `2i`, `3.14i`
#[derive(Debug, Clone, PartialEq)]
pub struct ImaginaryLiteral {
    pub token: Token,
}

impl fmt::Display for ImaginaryLiteral {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token.literal())
    }
}

/// `?a`, `?\n`
#[derive(Debug, Clone, PartialEq)]
pub struct CharLiteral {
    pub token: Token,
    /// The character text without the leading `?`.
    pub value: EcoString,
}

impl fmt::Display for CharLiteral {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token.literal())
    }
}

/// A plain string literal.
#[derive(Debug, Clone, PartialEq)]
pub struct StringLiteral {
    pub token: Token,
    pub value: EcoString,
}

impl fmt::Display for StringLiteral {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\"{}\"", self.value)
    }
}

/// A string with `#{…}` / `#@var` interpolation; parts alternate between
/// [`Expression::StringLit`] segments and embedded expressions.
///
/// An interpolated string with no embedded expressions degenerates to a
/// plain [`StringLiteral`] at parse time, so at least one part here is a
/// non-literal expression.
#[derive(Debug, Clone, PartialEq)]
pub struct InterpolatedString {
    pub token: Token,
    pub parts: Vec<Expression>,
}

impl fmt::Display for InterpolatedString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("\"")?;
        for part in &self.parts {
            match part {
                Expression::StringLit(literal) => f.write_str(&literal.value)?,
                expression => write!(f, "#{{{expression}}}")?,
            }
        }
        f.write_str("\"")
    }
}

/// `:name`, `:"quoted"`, `%s(name)`
#[derive(Debug, Clone, PartialEq)]
pub struct SymbolLiteral {
    pub token: Token,
    pub value: EcoString,
}

impl fmt::Display for SymbolLiteral {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, ":{}", self.value)
    }
}

/// `/pattern/flags`, `%r{pattern}flags`
#[derive(Debug, Clone, PartialEq)]
pub struct RegexpLiteral {
    pub token: Token,
    pub value: EcoString,
    pub flags: EcoString,
}

impl fmt::Display for RegexpLiteral {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/{}/{}", self.value, self.flags)
    }
}

/// `true`, `false`
#[derive(Debug, Clone, PartialEq)]
pub struct BooleanLiteral {
    pub token: Token,
    pub value: bool,
}

impl fmt::Display for BooleanLiteral {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(if self.value { "true" } else { "false" })
    }
}

/// `nil`
#[derive(Debug, Clone, PartialEq)]
pub struct NilLiteral {
    pub token: Token,
}

impl fmt::Display for NilLiteral {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("nil")
    }
}

/// `self`
#[derive(Debug, Clone, PartialEq)]
pub struct SelfExpression {
    pub token: Token,
}

impl fmt::Display for SelfExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("self")
    }
}

/// `[1, 2, 3]`
#[derive(Debug, Clone, PartialEq)]
pub struct ArrayLiteral {
    pub token: Token,
    pub elements: Vec<Expression>,
}

impl fmt::Display for ArrayLiteral {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        write_joined(f, &self.elements, ", ")?;
        f.write_str("]")
    }
}

/// `{a: 1, "b" => 2}` — entries preserve insertion order, so iterating
/// yields keys in source order.
#[derive(Debug, Clone, PartialEq)]
pub struct HashLiteral {
    pub token: Token,
    pub entries: Vec<(Expression, Expression)>,
    /// Set for the implicit hash formed by trailing keyword arguments.
    pub is_keyword_args: bool,
}

impl fmt::Display for HashLiteral {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, (key, value)) in self.entries.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{key} => {value}")?;
        }
        f.write_str("}")
    }
}

/// `1..10` (inclusive) or `1...10` (exclusive)
#[derive(Debug, Clone, PartialEq)]
pub struct RangeLiteral {
    pub token: Token,
    pub start: Option<Box<Expression>>,
    pub end: Option<Box<Expression>>,
    pub exclusive: bool,
}

impl fmt::Display for RangeLiteral {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(start) = &self.start {
            write!(f, "{start}")?;
        }
        f.write_str(if self.exclusive { "..." } else { ".." })?;
        if let Some(end) = &self.end {
            write!(f, "{end}")?;
        }
        Ok(())
    }
}

// ============================================================================
// Names
// ============================================================================

/// A local variable or paren-less method name.
#[derive(Debug, Clone, PartialEq)]
pub struct Identifier {
    pub token: Token,
    pub value: EcoString,
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}

/// `Foo`
#[derive(Debug, Clone, PartialEq)]
pub struct Constant {
    pub token: Token,
    pub value: EcoString,
}

impl fmt::Display for Constant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}

/// `@foo`
#[derive(Debug, Clone, PartialEq)]
pub struct InstanceVariable {
    pub token: Token,
    pub name: EcoString,
}

impl fmt::Display for InstanceVariable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// `@@foo`
#[derive(Debug, Clone, PartialEq)]
pub struct ClassVariable {
    pub token: Token,
    pub name: EcoString,
}

impl fmt::Display for ClassVariable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// `$foo`, `$1`, `` $` ``
#[derive(Debug, Clone, PartialEq)]
pub struct GlobalVariable {
    pub token: Token,
    pub name: EcoString,
}

impl fmt::Display for GlobalVariable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// `Foo::Bar`; `left` is `None` for the top-level form `::Foo`.
#[derive(Debug, Clone, PartialEq)]
pub struct ScopedConstant {
    pub token: Token,
    pub left: Option<Box<Expression>>,
    pub name: EcoString,
}

impl fmt::Display for ScopedConstant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(left) = &self.left {
            write!(f, "{left}")?;
        }
        write!(f, "::{}", self.name)
    }
}

// ============================================================================
// Operators
// ============================================================================

/// `-x`, `!x`, `~x`, `+x`
#[derive(Debug, Clone, PartialEq)]
pub struct PrefixExpression {
    pub token: Token,
    pub operator: EcoString,
    pub right: Box<Expression>,
}

impl fmt::Display for PrefixExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}{})", self.operator, self.right)
    }
}

/// `a + b`, `a <=> b`, …
#[derive(Debug, Clone, PartialEq)]
pub struct InfixExpression {
    pub token: Token,
    pub left: Box<Expression>,
    pub operator: EcoString,
    pub right: Box<Expression>,
}

impl fmt::Display for InfixExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({} {} {})", self.left, self.operator, self.right)
    }
}

/// `target = value`
#[derive(Debug, Clone, PartialEq)]
pub struct AssignmentExpression {
    pub token: Token,
    pub target: Box<Expression>,
    pub value: Box<Expression>,
}

impl fmt::Display for AssignmentExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} = {}", self.target, self.value)
    }
}

/// `target += value` and the other compound assignments.
#[derive(Debug, Clone, PartialEq)]
pub struct OpAssignmentExpression {
    pub token: Token,
    pub target: Box<Expression>,
    pub operator: EcoString,
    pub value: Box<Expression>,
}

impl fmt::Display for OpAssignmentExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.target, self.operator, self.value)
    }
}

/// `left[index]`
#[derive(Debug, Clone, PartialEq)]
pub struct IndexExpression {
    pub token: Token,
    pub left: Box<Expression>,
    pub index: Box<Expression>,
}

impl fmt::Display for IndexExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]", self.left, self.index)
    }
}

// ============================================================================
// Calls and blocks
// ============================================================================

/// A method call: explicit receiver (`a.b`, `a&.b`), paren-less
/// (`puts x`), or parenthesised (`foo(x)`), with an optional block.
#[derive(Debug, Clone, PartialEq)]
pub struct MethodCall {
    pub token: Token,
    /// `None` for calls on the implicit receiver.
    pub receiver: Option<Box<Expression>>,
    pub method: EcoString,
    pub arguments: Vec<Expression>,
    pub block: Option<Block>,
    /// `true` for `&.` calls.
    pub safe_navigation: bool,
}

impl fmt::Display for MethodCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(receiver) = &self.receiver {
            write!(f, "{receiver}")?;
            f.write_str(if self.safe_navigation { "&." } else { "." })?;
        }
        f.write_str(&self.method)?;
        if !self.arguments.is_empty() || self.block.is_none() {
            f.write_str("(")?;
            write_joined(f, &self.arguments, ", ")?;
            f.write_str(")")?;
        }
        if let Some(block) = &self.block {
            write!(f, " {block}")?;
        }
        Ok(())
    }
}

/// A block attached to a call: `{ |x| … }` or `do |x| … end`.
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub token: Token,
    pub parameters: Vec<BlockParameter>,
    pub body: BlockBody,
}

impl fmt::Display for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{ ")?;
        if !self.parameters.is_empty() {
            f.write_str("|")?;
            write_joined(f, &self.parameters, ", ")?;
            f.write_str("| ")?;
        }
        write!(f, "{} }}", self.body)
    }
}

/// One parameter of a block or lambda.
#[derive(Debug, Clone, PartialEq)]
pub struct BlockParameter {
    pub token: Token,
    pub name: EcoString,
    /// `*args`
    pub splat: bool,
    /// `**kwargs`
    pub double_splat: bool,
    /// `&block`
    pub block: bool,
    pub default: Option<Expression>,
}

impl fmt::Display for BlockParameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.splat {
            f.write_str("*")?;
        }
        if self.double_splat {
            f.write_str("**")?;
        }
        if self.block {
            f.write_str("&")?;
        }
        f.write_str(&self.name)?;
        if let Some(default) = &self.default {
            write!(f, " = {default}")?;
        }
        Ok(())
    }
}

/// A possibly-empty statement list forming the body of a block, branch, or
/// definition.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BlockBody {
    pub statements: Vec<Statement>,
}

impl fmt::Display for BlockBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, statement) in self.statements.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{statement}")?;
        }
        Ok(())
    }
}

/// `->(params) { body }` or `-> do body end`. An empty body is legal.
#[derive(Debug, Clone, PartialEq)]
pub struct Lambda {
    pub token: Token,
    pub parameters: Vec<BlockParameter>,
    pub body: BlockBody,
}

impl fmt::Display for Lambda {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("->")?;
        if !self.parameters.is_empty() {
            f.write_str("(")?;
            write_joined(f, &self.parameters, ", ")?;
            f.write_str(")")?;
        }
        write!(f, " {{ {} }}", self.body)
    }
}

// ============================================================================
// Control flow
// ============================================================================

/// `if`/`unless` with an `elsif` chain: `alternative` is itself an
/// if-node, and a final `else` hangs off the innermost link of the chain.
#[derive(Debug, Clone, PartialEq)]
pub struct IfExpression {
    pub token: Token,
    pub condition: Box<Expression>,
    pub consequence: BlockBody,
    pub alternative: Option<Box<IfExpression>>,
    pub else_body: Option<BlockBody>,
    /// `true` for `unless`.
    pub unless: bool,
}

impl fmt::Display for IfExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(if self.unless { "unless " } else { "if " })?;
        write!(f, "{}\n{}", self.condition, self.consequence)?;

        let mut innermost = self;
        while let Some(alternative) = &innermost.alternative {
            write!(f, "\nelsif {}\n{}", alternative.condition, alternative.consequence)?;
            innermost = alternative;
        }
        if let Some(else_body) = &innermost.else_body {
            write!(f, "\nelse\n{else_body}")?;
        }
        f.write_str("\nend")
    }
}

/// `cond ? a : b`
#[derive(Debug, Clone, PartialEq)]
pub struct TernaryExpression {
    pub token: Token,
    pub condition: Box<Expression>,
    pub consequence: Box<Expression>,
    pub alternative: Box<Expression>,
}

impl fmt::Display for TernaryExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ? {} : {}",
            self.condition, self.consequence, self.alternative
        )
    }
}

/// The modifier keyword of a [`ModifierExpression`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModifierKind {
    If,
    Unless,
    While,
    Until,
}

impl ModifierKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::If => "if",
            Self::Unless => "unless",
            Self::While => "while",
            Self::Until => "until",
        }
    }
}

/// `body if cond`, `body unless cond`, `body while cond`, `body until cond`
#[derive(Debug, Clone, PartialEq)]
pub struct ModifierExpression {
    pub token: Token,
    pub body: Box<Expression>,
    pub modifier: ModifierKind,
    pub condition: Box<Expression>,
}

impl fmt::Display for ModifierExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.body, self.modifier.as_str(), self.condition)
    }
}

/// `case subject? when … else … end`
#[derive(Debug, Clone, PartialEq)]
pub struct CaseExpression {
    pub token: Token,
    pub subject: Option<Box<Expression>>,
    pub whens: Vec<WhenClause>,
    pub else_body: Option<BlockBody>,
}

impl fmt::Display for CaseExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("case")?;
        if let Some(subject) = &self.subject {
            write!(f, " {subject}")?;
        }
        writeln!(f)?;
        for when in &self.whens {
            writeln!(f, "{when}")?;
        }
        if let Some(else_body) = &self.else_body {
            writeln!(f, "else\n{else_body}")?;
        }
        f.write_str("end")
    }
}

/// One `when` clause with its comma-separated conditions.
#[derive(Debug, Clone, PartialEq)]
pub struct WhenClause {
    pub token: Token,
    pub conditions: Vec<Expression>,
    pub body: BlockBody,
}

impl fmt::Display for WhenClause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("when ")?;
        write_joined(f, &self.conditions, ", ")?;
        write!(f, "\n{}", self.body)
    }
}

/// `while cond … end` / `until cond … end`
#[derive(Debug, Clone, PartialEq)]
pub struct WhileExpression {
    pub token: Token,
    pub condition: Box<Expression>,
    pub body: BlockBody,
    /// `true` for `until`.
    pub until: bool,
}

impl fmt::Display for WhileExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(if self.until { "until " } else { "while " })?;
        write!(f, "{}\n{}\nend", self.condition, self.body)
    }
}

/// `for var in iterable … end`
#[derive(Debug, Clone, PartialEq)]
pub struct ForExpression {
    pub token: Token,
    pub variable: Box<Expression>,
    pub iterable: Box<Expression>,
    pub body: BlockBody,
}

impl fmt::Display for ForExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "for {} in {}\n{}\nend",
            self.variable, self.iterable, self.body
        )
    }
}

/// `begin … rescue … else … ensure … end`
#[derive(Debug, Clone, PartialEq)]
pub struct BeginExpression {
    pub token: Token,
    pub body: BlockBody,
    pub rescues: Vec<RescueClause>,
    pub else_body: Option<BlockBody>,
    pub ensure_body: Option<BlockBody>,
}

impl fmt::Display for BeginExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "begin\n{}", self.body)?;
        for rescue in &self.rescues {
            write!(f, "\n{rescue}")?;
        }
        if let Some(else_body) = &self.else_body {
            write!(f, "\nelse\n{else_body}")?;
        }
        if let Some(ensure_body) = &self.ensure_body {
            write!(f, "\nensure\n{ensure_body}")?;
        }
        f.write_str("\nend")
    }
}

/// `rescue TypeA, TypeB => name` with a body.
#[derive(Debug, Clone, PartialEq)]
pub struct RescueClause {
    pub token: Token,
    pub exceptions: Vec<Expression>,
    pub variable: Option<Identifier>,
    pub body: BlockBody,
}

impl fmt::Display for RescueClause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("rescue")?;
        if !self.exceptions.is_empty() {
            f.write_str(" ")?;
            write_joined(f, &self.exceptions, ", ")?;
        }
        if let Some(variable) = &self.variable {
            write!(f, " => {variable}")?;
        }
        write!(f, "\n{}", self.body)
    }
}

// ============================================================================
// Other expressions
// ============================================================================

/// `yield`, `yield(args)`
#[derive(Debug, Clone, PartialEq)]
pub struct YieldExpression {
    pub token: Token,
    pub arguments: Vec<Expression>,
}

impl fmt::Display for YieldExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("yield")?;
        if !self.arguments.is_empty() {
            f.write_str("(")?;
            write_joined(f, &self.arguments, ", ")?;
            f.write_str(")")?;
        }
        Ok(())
    }
}

/// `super`, `super()`, `super(args)` — bare `super` forwards the current
/// arguments, so the parens are meaningful.
#[derive(Debug, Clone, PartialEq)]
pub struct SuperExpression {
    pub token: Token,
    pub arguments: Vec<Expression>,
    pub has_parens: bool,
}

impl fmt::Display for SuperExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("super")?;
        if self.has_parens || !self.arguments.is_empty() {
            f.write_str("(")?;
            write_joined(f, &self.arguments, ", ")?;
            f.write_str(")")?;
        }
        Ok(())
    }
}

/// `not expr`
#[derive(Debug, Clone, PartialEq)]
pub struct NotExpression {
    pub token: Token,
    pub expression: Box<Expression>,
}

impl fmt::Display for NotExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "not {}", self.expression)
    }
}

/// `a and b`
#[derive(Debug, Clone, PartialEq)]
pub struct AndExpression {
    pub token: Token,
    pub left: Box<Expression>,
    pub right: Box<Expression>,
}

impl fmt::Display for AndExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({} and {})", self.left, self.right)
    }
}

/// `a or b`
#[derive(Debug, Clone, PartialEq)]
pub struct OrExpression {
    pub token: Token,
    pub left: Box<Expression>,
    pub right: Box<Expression>,
}

impl fmt::Display for OrExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({} or {})", self.left, self.right)
    }
}

/// `body rescue fallback`
#[derive(Debug, Clone, PartialEq)]
pub struct RescueModifierExpression {
    pub token: Token,
    pub body: Box<Expression>,
    pub rescue: Box<Expression>,
}

impl fmt::Display for RescueModifierExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} rescue {}", self.body, self.rescue)
    }
}

/// `*expr`
#[derive(Debug, Clone, PartialEq)]
pub struct SplatExpression {
    pub token: Token,
    pub expression: Box<Expression>,
}

impl fmt::Display for SplatExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "*{}", self.expression)
    }
}

/// `**expr`
#[derive(Debug, Clone, PartialEq)]
pub struct DoubleSplatExpression {
    pub token: Token,
    pub expression: Box<Expression>,
}

impl fmt::Display for DoubleSplatExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "**{}", self.expression)
    }
}

/// `&expr` — a block argument.
#[derive(Debug, Clone, PartialEq)]
pub struct BlockArgExpression {
    pub token: Token,
    pub expression: Box<Expression>,
}

impl fmt::Display for BlockArgExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "&{}", self.expression)
    }
}

/// `defined?(expr)`
#[derive(Debug, Clone, PartialEq)]
pub struct DefinedExpression {
    pub token: Token,
    pub expression: Box<Expression>,
}

impl fmt::Display for DefinedExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "defined?({})", self.expression)
    }
}

// ============================================================================
// Definitions
// ============================================================================

/// `def name(params) … end`, or `def receiver.name(params) … end`.
#[derive(Debug, Clone, PartialEq)]
pub struct MethodDefinition {
    pub token: Token,
    pub name: EcoString,
    /// The singleton receiver; in practice `self` or a simple name.
    pub receiver: Option<Expression>,
    pub parameters: Vec<MethodParameter>,
    pub body: BlockBody,
}

impl MethodDefinition {
    #[must_use]
    pub fn token_literal(&self) -> &str {
        self.token.literal()
    }
}

impl fmt::Display for MethodDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("def ")?;
        if let Some(receiver) = &self.receiver {
            write!(f, "{receiver}.")?;
        }
        f.write_str(&self.name)?;
        if !self.parameters.is_empty() {
            f.write_str("(")?;
            write_joined(f, &self.parameters, ", ")?;
            f.write_str(")")?;
        }
        write!(f, "\n{}\nend", self.body)
    }
}

/// One method parameter: positional, defaulted, splat, keyword, double
/// splat, or block.
#[derive(Debug, Clone, PartialEq)]
pub struct MethodParameter {
    pub token: Token,
    pub name: EcoString,
    /// `*args`
    pub splat: bool,
    /// `**kwargs`
    pub double_splat: bool,
    /// `&block`
    pub block: bool,
    /// `name:` or `name: default`
    pub keyword: bool,
    pub default: Option<Expression>,
}

impl fmt::Display for MethodParameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.splat {
            f.write_str("*")?;
        }
        if self.double_splat {
            f.write_str("**")?;
        }
        if self.block {
            f.write_str("&")?;
        }
        f.write_str(&self.name)?;
        if self.keyword {
            f.write_str(":")?;
            if let Some(default) = &self.default {
                write!(f, " {default}")?;
            }
        } else if let Some(default) = &self.default {
            write!(f, " = {default}")?;
        }
        Ok(())
    }
}

/// `class Name < Superclass … end`
#[derive(Debug, Clone, PartialEq)]
pub struct ClassDefinition {
    pub token: Token,
    pub name: EcoString,
    pub superclass: Option<Expression>,
    pub body: BlockBody,
}

impl ClassDefinition {
    #[must_use]
    pub fn token_literal(&self) -> &str {
        self.token.literal()
    }
}

impl fmt::Display for ClassDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "class {}", self.name)?;
        if let Some(superclass) = &self.superclass {
            write!(f, " < {superclass}")?;
        }
        write!(f, "\n{}\nend", self.body)
    }
}

/// `class << object … end`
#[derive(Debug, Clone, PartialEq)]
pub struct SingletonClassDefinition {
    pub token: Token,
    pub object: Expression,
    pub body: BlockBody,
}

impl fmt::Display for SingletonClassDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "class << {}\n{}\nend", self.object, self.body)
    }
}

/// `module Name … end`
#[derive(Debug, Clone, PartialEq)]
pub struct ModuleDefinition {
    pub token: Token,
    pub name: EcoString,
    pub body: BlockBody,
}

impl fmt::Display for ModuleDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "module {}\n{}\nend", self.name, self.body)
    }
}

// ============================================================================
// Simple statements
// ============================================================================

/// `return expr?`
#[derive(Debug, Clone, PartialEq)]
pub struct ReturnStatement {
    pub token: Token,
    pub value: Option<Expression>,
}

impl fmt::Display for ReturnStatement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("return")?;
        if let Some(value) = &self.value {
            write!(f, " {value}")?;
        }
        Ok(())
    }
}

/// `break expr?`
#[derive(Debug, Clone, PartialEq)]
pub struct BreakStatement {
    pub token: Token,
    pub value: Option<Expression>,
}

impl fmt::Display for BreakStatement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("break")?;
        if let Some(value) = &self.value {
            write!(f, " {value}")?;
        }
        Ok(())
    }
}

/// `next expr?`
#[derive(Debug, Clone, PartialEq)]
pub struct NextStatement {
    pub token: Token,
    pub value: Option<Expression>,
}

impl fmt::Display for NextStatement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("next")?;
        if let Some(value) = &self.value {
            write!(f, " {value}")?;
        }
        Ok(())
    }
}

/// `redo`
#[derive(Debug, Clone, PartialEq)]
pub struct RedoStatement {
    pub token: Token,
}

impl fmt::Display for RedoStatement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("redo")
    }
}

/// `retry`
#[derive(Debug, Clone, PartialEq)]
pub struct RetryStatement {
    pub token: Token,
}

impl fmt::Display for RetryStatement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("retry")
    }
}

/// `alias new old`
#[derive(Debug, Clone, PartialEq)]
pub struct AliasStatement {
    pub token: Token,
    pub new_name: Expression,
    pub old_name: Expression,
}

impl fmt::Display for AliasStatement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "alias {} {}", self.new_name, self.old_name)
    }
}

/// `undef name, …`
#[derive(Debug, Clone, PartialEq)]
pub struct UndefStatement {
    pub token: Token,
    pub methods: Vec<Expression>,
}

impl fmt::Display for UndefStatement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("undef ")?;
        write_joined(f, &self.methods, ", ")
    }
}

fn write_joined<T: fmt::Display>(
    f: &mut fmt::Formatter<'_>,
    items: &[T],
    separator: &str,
) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(separator)?;
        }
        write!(f, "{item}")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source_analysis::{Position, TokenKind};

    fn token(kind: TokenKind, literal: &str) -> Token {
        Token::new(kind, literal, Position::new(1, 1, 0))
    }

    fn ident(name: &str) -> Expression {
        Expression::Identifier(Identifier {
            token: token(TokenKind::Ident, name),
            value: name.into(),
        })
    }

    fn integer(value: i64) -> Expression {
        Expression::Integer(IntegerLiteral {
            token: token(TokenKind::Integer, &value.to_string()),
            value,
        })
    }

    #[test]
    fn infix_renders_parenthesised() {
        let expr = InfixExpression {
            token: token(TokenKind::Plus, "+"),
            left: Box::new(integer(1)),
            operator: "+".into(),
            right: Box::new(integer(2)),
        };
        assert_eq!(expr.to_string(), "(1 + 2)");
    }

    #[test]
    fn prefix_renders_parenthesised() {
        let expr = PrefixExpression {
            token: token(TokenKind::Minus, "-"),
            operator: "-".into(),
            right: Box::new(ident("x")),
        };
        assert_eq!(expr.to_string(), "(-x)");
    }

    #[test]
    fn hash_preserves_entry_order() {
        let hash = HashLiteral {
            token: token(TokenKind::LBrace, "{"),
            entries: vec![
                (
                    Expression::Symbol(SymbolLiteral {
                        token: token(TokenKind::Label, "b:"),
                        value: "b".into(),
                    }),
                    integer(2),
                ),
                (
                    Expression::Symbol(SymbolLiteral {
                        token: token(TokenKind::Label, "a:"),
                        value: "a".into(),
                    }),
                    integer(1),
                ),
            ],
            is_keyword_args: false,
        };
        assert_eq!(hash.to_string(), "{:b => 2, :a => 1}");
    }

    #[test]
    fn interpolated_string_renders_embedded_parts() {
        let interpolated = InterpolatedString {
            token: token(TokenKind::StringBegin, "\""),
            parts: vec![
                Expression::StringLit(StringLiteral {
                    token: token(TokenKind::StringContent, "hello "),
                    value: "hello ".into(),
                }),
                ident("name"),
            ],
        };
        assert_eq!(interpolated.to_string(), "\"hello #{name}\"");
    }

    #[test]
    fn if_chain_renders_innermost_else() {
        let chain = IfExpression {
            token: token(TokenKind::KeywordIf, "if"),
            condition: Box::new(ident("a")),
            consequence: BlockBody {
                statements: vec![Statement::Expression(ExpressionStatement {
                    token: token(TokenKind::Integer, "1"),
                    expression: Some(integer(1)),
                })],
            },
            alternative: Some(Box::new(IfExpression {
                token: token(TokenKind::KeywordElsif, "elsif"),
                condition: Box::new(ident("b")),
                consequence: BlockBody {
                    statements: vec![Statement::Expression(ExpressionStatement {
                        token: token(TokenKind::Integer, "2"),
                        expression: Some(integer(2)),
                    })],
                },
                alternative: None,
                else_body: Some(BlockBody {
                    statements: vec![Statement::Expression(ExpressionStatement {
                        token: token(TokenKind::Integer, "3"),
                        expression: Some(integer(3)),
                    })],
                }),
                unless: false,
            })),
            else_body: None,
            unless: false,
        };
        assert_eq!(chain.to_string(), "if a\n1\nelsif b\n2\nelse\n3\nend");
    }

    #[test]
    fn method_parameter_forms() {
        let splat = MethodParameter {
            token: token(TokenKind::Star, "*"),
            name: "args".into(),
            splat: true,
            double_splat: false,
            block: false,
            keyword: false,
            default: None,
        };
        assert_eq!(splat.to_string(), "*args");

        let keyword = MethodParameter {
            token: token(TokenKind::Label, "depth:"),
            name: "depth".into(),
            splat: false,
            double_splat: false,
            block: false,
            keyword: true,
            default: Some(integer(1)),
        };
        assert_eq!(keyword.to_string(), "depth: 1");

        let defaulted = MethodParameter {
            token: token(TokenKind::Ident, "n"),
            name: "n".into(),
            splat: false,
            double_splat: false,
            block: false,
            keyword: false,
            default: Some(integer(0)),
        };
        assert_eq!(defaulted.to_string(), "n = 0");
    }

    #[test]
    fn method_call_display() {
        let call = MethodCall {
            token: token(TokenKind::Dot, "."),
            receiver: Some(Box::new(ident("list"))),
            method: "map".into(),
            arguments: Vec::new(),
            block: Some(Block {
                token: token(TokenKind::LBrace, "{"),
                parameters: vec![BlockParameter {
                    token: token(TokenKind::Ident, "x"),
                    name: "x".into(),
                    splat: false,
                    double_splat: false,
                    block: false,
                    default: None,
                }],
                body: BlockBody {
                    statements: vec![Statement::Expression(ExpressionStatement {
                        token: token(TokenKind::Ident, "x"),
                        expression: Some(ident("x")),
                    })],
                },
            }),
            safe_navigation: false,
        };
        assert_eq!(call.to_string(), "list.map { |x| x }");
    }

    #[test]
    fn program_token_literal_is_first_statement() {
        let program = Program {
            statements: vec![Statement::Expression(ExpressionStatement {
                token: token(TokenKind::Ident, "foo"),
                expression: Some(ident("foo")),
            })],
        };
        assert_eq!(program.token_literal(), "foo");
        assert_eq!(Program::default().token_literal(), "");
    }
}
