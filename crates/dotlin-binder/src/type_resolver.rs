//! Resolution of written types to [`TypeRef`]s.
//!
//! A [`TypeExpr`] names a type by its simple name; the name is looked up through
//! the context chain and imports. Nullability is copied from the expression and
//! the type's implied modifier (numbers are immutable) is applied when none is
//! written.

use dotlin_ast::TypeExpr;
use dotlin_core::{SemanticError, Span, TypeHierarchy, TypeId, TypeRef};

use crate::context::ContextArena;
use crate::ids::ContextId;

/// Resolves type expressions against a context.
#[derive(Clone, Copy)]
pub struct TypeResolver<'a> {
    contexts: &'a ContextArena,
    types: &'a TypeHierarchy,
}

impl<'a> TypeResolver<'a> {
    pub fn new(contexts: &'a ContextArena, types: &'a TypeHierarchy) -> Self {
        Self { contexts, types }
    }

    /// Resolve a written type in `context`.
    pub fn resolve(&self, context: ContextId, type_expr: &TypeExpr<'_>) -> Result<TypeRef, SemanticError> {
        let base = self.resolve_name(context, type_expr.name.name, type_expr.span)?;
        let mut ty = TypeRef::simple(base);
        ty.nullable = type_expr.nullable;
        ty.modifier = type_expr.modifier;
        Ok(self.types.with_implied_modifier(ty))
    }

    /// Resolve a simple type name in `context`.
    pub fn resolve_name(&self, context: ContextId, name: &str, span: Span) -> Result<TypeId, SemanticError> {
        self.contexts
            .resolve_any_type(context, name)
            .ok_or_else(|| SemanticError::UnknownType {
                name: name.to_string(),
                span,
            })
    }

    /// Resolve an optional written type, turning a failure into a diagnostic.
    pub fn resolve_optional(
        &self,
        context: ContextId,
        type_expr: Option<&TypeExpr<'_>>,
        errors: &mut Vec<SemanticError>,
    ) -> Option<TypeRef> {
        match self.resolve(context, type_expr?) {
            Ok(ty) => Some(ty),
            Err(err) => {
                errors.push(err);
                None
            }
        }
    }
}
