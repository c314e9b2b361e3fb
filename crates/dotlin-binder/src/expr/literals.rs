use dotlin_ast::{LiteralExpr, LiteralKind};
use dotlin_core::{Diagnostic, InternalResult, Severity, Span, TypeModifier, TypeRef, builtin_types};

use crate::ids::ContextId;
use crate::program::BoundProgram;
use crate::protocol::BoundNode;

/// An integer or floating point literal.
#[derive(Debug)]
pub struct BoundNumericLiteral<'ast> {
    context: ContextId,
    origin: &'ast LiteralExpr<'ast>,
}

impl<'ast> BoundNumericLiteral<'ast> {
    pub fn new(context: ContextId, origin: &'ast LiteralExpr<'ast>) -> Self {
        Self { context, origin }
    }

    /// `Int` or `Float`; a malformed literal has no type.
    pub fn ty(&self) -> Option<TypeRef> {
        let base = match self.origin.kind {
            LiteralKind::Int(_) => builtin_types::INT,
            LiteralKind::Float(_) => builtin_types::FLOAT,
            LiteralKind::Null | LiteralKind::Malformed(_) => return None,
        };
        Some(TypeRef::simple(base).with_modifier(TypeModifier::Immutable))
    }
}

impl<'ast> BoundNode<'ast> for BoundNumericLiteral<'ast> {
    fn context(&self) -> ContextId {
        self.context
    }

    fn span(&self) -> Span {
        self.origin.span
    }

    fn semantic_analysis_phase1(&self, _program: &BoundProgram<'ast>) -> InternalResult<Vec<Diagnostic>> {
        match self.origin.kind {
            LiteralKind::Malformed(text) => Ok(vec![Diagnostic::forwarded(
                Severity::Error,
                format!("malformed numeric literal '{text}'"),
                self.origin.span,
            )]),
            _ => Ok(Vec::new()),
        }
    }

    fn semantic_analysis_phase2(&self, _program: &BoundProgram<'ast>) -> InternalResult<Vec<Diagnostic>> {
        Ok(Vec::new())
    }

    fn semantic_analysis_phase3(&self, _program: &BoundProgram<'ast>) -> InternalResult<Vec<Diagnostic>> {
        Ok(Vec::new())
    }
}

/// The `null` literal. It has no type of its own; it is assignable to any nullable
/// slot.
#[derive(Debug)]
pub struct BoundNullLiteral<'ast> {
    context: ContextId,
    origin: &'ast LiteralExpr<'ast>,
}

impl<'ast> BoundNullLiteral<'ast> {
    pub fn new(context: ContextId, origin: &'ast LiteralExpr<'ast>) -> Self {
        Self { context, origin }
    }

    pub fn ty(&self) -> Option<TypeRef> {
        None
    }
}

impl<'ast> BoundNode<'ast> for BoundNullLiteral<'ast> {
    fn context(&self) -> ContextId {
        self.context
    }

    fn span(&self) -> Span {
        self.origin.span
    }

    fn semantic_analysis_phase1(&self, _program: &BoundProgram<'ast>) -> InternalResult<Vec<Diagnostic>> {
        Ok(Vec::new())
    }

    fn semantic_analysis_phase2(&self, _program: &BoundProgram<'ast>) -> InternalResult<Vec<Diagnostic>> {
        Ok(Vec::new())
    }

    fn semantic_analysis_phase3(&self, _program: &BoundProgram<'ast>) -> InternalResult<Vec<Diagnostic>> {
        Ok(Vec::new())
    }
}
