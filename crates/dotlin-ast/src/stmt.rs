//! Statement nodes.

use dotlin_core::Span;

use crate::decl::VariableDecl;
use crate::expr::Expr;

/// A statement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Stmt<'ast> {
    /// Expression statement
    Expr(ExprStmt<'ast>),
    /// Local `val`/`var` declaration
    Var(&'ast VariableDecl<'ast>),
    /// Assignment, `target = value`
    Assign(&'ast AssignStmt<'ast>),
    /// Return statement
    Return(ReturnStmt<'ast>),
    /// If statement
    If(&'ast IfStmt<'ast>),
    /// Nested block
    Block(Block<'ast>),
}

impl<'ast> Stmt<'ast> {
    /// Get the span of this statement.
    pub fn span(&self) -> Span {
        match self {
            Self::Expr(s) => s.span,
            Self::Var(s) => s.span,
            Self::Assign(s) => s.span,
            Self::Return(s) => s.span,
            Self::If(s) => s.span,
            Self::Block(s) => s.span,
        }
    }
}

/// An expression evaluated for its effects.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExprStmt<'ast> {
    /// The expression
    pub expr: &'ast Expr<'ast>,
    /// Source location
    pub span: Span,
}

/// An assignment.
///
/// The target is an identifier or a member access.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AssignStmt<'ast> {
    /// Left-hand side
    pub target: &'ast Expr<'ast>,
    /// Right-hand side
    pub value: &'ast Expr<'ast>,
    /// Source location
    pub span: Span,
}

/// A return statement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReturnStmt<'ast> {
    /// Returned value (`None` for a bare `return`)
    pub value: Option<&'ast Expr<'ast>>,
    /// Source location
    pub span: Span,
}

/// An if statement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IfStmt<'ast> {
    /// Condition
    pub condition: &'ast Expr<'ast>,
    /// Branch taken when the condition holds
    pub then_branch: Block<'ast>,
    /// Optional else branch
    pub else_branch: Option<Block<'ast>>,
    /// Source location
    pub span: Span,
}

/// A braced sequence of statements.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Block<'ast> {
    /// Statements in textual order
    pub stmts: &'ast [Stmt<'ast>],
    /// Source location
    pub span: Span,
}
