//! Type expressions as written in declarations.

use dotlin_core::{Span, TypeModifier};

use crate::Ident;

/// A written type, e.g. `Int`, `Point?` or `immutable Point`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypeExpr<'ast> {
    /// The named type
    pub name: Ident<'ast>,
    /// Whether a trailing `?` marks it nullable
    pub nullable: bool,
    /// Explicit mutability modifier
    pub modifier: Option<TypeModifier>,
    /// Source location
    pub span: Span,
}

impl<'ast> TypeExpr<'ast> {
    /// A plain non-nullable type reference.
    pub fn named(name: Ident<'ast>) -> Self {
        Self {
            name,
            nullable: false,
            modifier: None,
            span: name.span,
        }
    }
}
