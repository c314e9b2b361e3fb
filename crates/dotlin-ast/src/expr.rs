//! Expression nodes.
//!
//! Operators are kept as their own nodes here; the binder turns them into
//! invocations of operator functions.

use dotlin_core::Span;

use crate::{BinaryOp, Ident, UnaryOp};

/// An expression.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Expr<'ast> {
    /// Identifier reference (variable, type name or `true`/`false`)
    Ident(IdentExpr<'ast>),
    /// Numeric or null literal
    Literal(LiteralExpr<'ast>),
    /// Function call, `f(a)` or `x.f(a)`
    Invocation(&'ast InvocationExpr<'ast>),
    /// Member access, `x.m` or `x?.m`
    Member(&'ast MemberExpr<'ast>),
    /// Binary operation
    Binary(&'ast BinaryExpr<'ast>),
    /// Unary prefix operation
    Unary(&'ast UnaryExpr<'ast>),
    /// Parenthesized expression
    Paren(&'ast ParenExpr<'ast>),
}

impl<'ast> Expr<'ast> {
    /// Get the span of this expression.
    pub fn span(&self) -> Span {
        match self {
            Self::Ident(e) => e.span,
            Self::Literal(e) => e.span,
            Self::Invocation(e) => e.span,
            Self::Member(e) => e.span,
            Self::Binary(e) => e.span,
            Self::Unary(e) => e.span,
            Self::Paren(e) => e.span,
        }
    }
}

/// An identifier expression.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IdentExpr<'ast> {
    /// The identifier
    pub ident: Ident<'ast>,
    /// Source location
    pub span: Span,
}

/// A literal value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LiteralExpr<'ast> {
    /// The literal kind
    pub kind: LiteralKind<'ast>,
    /// Source location
    pub span: Span,
}

/// The kind of literal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LiteralKind<'ast> {
    /// Integer literal
    Int(i64),
    /// Floating-point literal
    Float(f64),
    /// `null`
    Null,
    /// A numeric literal the parsing layer could not convert; keeps the raw text
    Malformed(&'ast str),
}

/// A function call.
///
/// The parsing layer only produces identifier and member-access targets; anything
/// else is rejected by the binder as an internal error.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InvocationExpr<'ast> {
    /// What is being called
    pub target: &'ast Expr<'ast>,
    /// Arguments in order
    pub args: &'ast [Expr<'ast>],
    /// Source location
    pub span: Span,
}

/// Member access.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MemberExpr<'ast> {
    /// The receiver
    pub object: &'ast Expr<'ast>,
    /// The member name
    pub member: Ident<'ast>,
    /// Whether `?.` was used instead of `.`
    pub null_safe: bool,
    /// Source location
    pub span: Span,
}

/// A binary operation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BinaryExpr<'ast> {
    /// Left operand
    pub left: &'ast Expr<'ast>,
    /// Operator
    pub op: BinaryOp,
    /// Right operand
    pub right: &'ast Expr<'ast>,
    /// Source location
    pub span: Span,
}

/// A unary prefix operation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UnaryExpr<'ast> {
    /// Operator
    pub op: UnaryOp,
    /// Operand
    pub operand: &'ast Expr<'ast>,
    /// Source location
    pub span: Span,
}

/// A parenthesized expression.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParenExpr<'ast> {
    /// The inner expression
    pub expr: &'ast Expr<'ast>,
    /// Source location
    pub span: Span,
}
