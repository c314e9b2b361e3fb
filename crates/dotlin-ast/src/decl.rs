//! Declaration nodes: functions, variables, structs and imports.

use dotlin_core::{FunctionModifiers, Span};

use crate::expr::Expr;
use crate::stmt::Block;
use crate::types::TypeExpr;
use crate::Ident;

/// A top-level item in a module.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Item<'ast> {
    /// Function declaration
    Function(&'ast FunctionDecl<'ast>),
    /// Module-level variable
    Variable(&'ast VariableDecl<'ast>),
    /// Struct declaration
    Struct(&'ast StructDecl<'ast>),
}

impl<'ast> Item<'ast> {
    /// Get the span of this item.
    pub fn span(&self) -> Span {
        match self {
            Self::Function(d) => d.span,
            Self::Variable(d) => d.span,
            Self::Struct(d) => d.span,
        }
    }

    /// The declared name.
    pub fn name(&self) -> Ident<'ast> {
        match self {
            Self::Function(d) => d.name,
            Self::Variable(d) => d.name,
            Self::Struct(d) => d.name,
        }
    }
}

/// A function declaration.
///
/// Examples:
/// - `fun f(x: Int) { return x }`
/// - `pure fun Int.double() = this + this`
/// - `external operator fun Int.opPlus(other: Int): Int`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FunctionDecl<'ast> {
    /// Function name
    pub name: Ident<'ast>,
    /// `pure`, `readonly`, `nothrow`, `operator`, `external`
    pub modifiers: FunctionModifiers,
    /// Receiver type for extension-style functions
    pub receiver: Option<TypeExpr<'ast>>,
    /// Parameters
    pub params: &'ast [Param<'ast>],
    /// Declared return type; inferred from the body when absent
    pub return_type: Option<TypeExpr<'ast>>,
    /// Body (`None` for external functions)
    pub body: Option<Block<'ast>>,
    /// Source location
    pub span: Span,
}

/// A function parameter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Param<'ast> {
    /// Parameter name
    pub name: Ident<'ast>,
    /// Declared type
    pub ty: Option<TypeExpr<'ast>>,
    /// Source location
    pub span: Span,
}

/// A `val` or `var` declaration, at module level or inside a body.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VariableDecl<'ast> {
    /// Variable name
    pub name: Ident<'ast>,
    /// `var` (true) or `val` (false)
    pub is_mutable: bool,
    /// Declared type
    pub ty: Option<TypeExpr<'ast>>,
    /// Initial value
    pub initializer: Option<&'ast Expr<'ast>>,
    /// Source location
    pub span: Span,
}

/// A struct declaration.
///
/// Example:
/// ```text
/// struct Point : Shape {
///     x: Float = 0.0
///     y: Float = 0.0
/// }
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StructDecl<'ast> {
    /// Struct name
    pub name: Ident<'ast>,
    /// Declared supertypes; `Any` when empty
    pub supertypes: &'ast [TypeExpr<'ast>],
    /// Members in declaration order
    pub members: &'ast [StructMemberDecl<'ast>],
    /// Source location
    pub span: Span,
}

/// A struct member.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StructMemberDecl<'ast> {
    /// Member name
    pub name: Ident<'ast>,
    /// Member type
    pub ty: TypeExpr<'ast>,
    /// Default value
    pub default: Option<&'ast Expr<'ast>>,
    /// Source location
    pub span: Span,
}

/// An import of every declaration of another module, `import a.b.*`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Import<'ast> {
    /// Module path
    pub path: &'ast [Ident<'ast>],
    /// Source location
    pub span: Span,
}

impl Import<'_> {
    /// The imported module name in dotted form.
    pub fn dotted(&self) -> String {
        self.path
            .iter()
            .map(|ident| ident.name)
            .collect::<Vec<_>>()
            .join(".")
    }
}
