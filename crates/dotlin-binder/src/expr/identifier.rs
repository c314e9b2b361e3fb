use dotlin_ast::IdentExpr;
use dotlin_core::{Diagnostic, InternalResult, SemanticError, Span, TypeId, TypeRef, builtin_types};
use once_cell::unsync::OnceCell;

use crate::effects::{Effect, EffectAnalysis, EffectCause, EffectSource};
use crate::ids::{ContextId, VariableId};
use crate::program::BoundProgram;
use crate::protocol::BoundNode;

/// What a bare identifier turned out to name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Referral {
    /// `true` or `false`.
    Literal(bool),
    Variable(VariableId),
    /// A type used as a value, e.g. the receiver of a static-style call.
    TypeName(TypeId),
}

/// A bare identifier in value position.
#[derive(Debug)]
pub struct BoundIdentifier<'ast> {
    context: ContextId,
    origin: &'ast IdentExpr<'ast>,
    /// What phase 1 found; phase 2 may still resolve a name phase 1 missed.
    local_referral: OnceCell<Option<Referral>>,
    referral: OnceCell<Referral>,
    ty: OnceCell<Option<TypeRef>>,
}

impl<'ast> BoundIdentifier<'ast> {
    pub fn new(context: ContextId, origin: &'ast IdentExpr<'ast>) -> Self {
        Self {
            context,
            origin,
            local_referral: OnceCell::new(),
            referral: OnceCell::new(),
            ty: OnceCell::new(),
        }
    }

    pub fn name(&self) -> &'ast str {
        self.origin.ident.name
    }

    /// The resolution result; `None` before phase 1 or when nothing matched.
    pub fn referral(&self) -> Option<Referral> {
        self.referral.get().copied()
    }

    /// The variable referred to, if any.
    pub fn variable(&self) -> Option<VariableId> {
        match self.referral() {
            Some(Referral::Variable(variable)) => Some(variable),
            _ => None,
        }
    }

    pub fn ty(&self) -> Option<TypeRef> {
        self.ty.get().copied().flatten()
    }

    fn resolve(&self, program: &BoundProgram<'ast>) -> Option<Referral> {
        let name = self.name();
        match name {
            "true" => return Some(Referral::Literal(true)),
            "false" => return Some(Referral::Literal(false)),
            _ => {}
        }
        let contexts = program.contexts();
        contexts
            .resolve_variable(self.context, name, false)
            .map(Referral::Variable)
            .or_else(|| contexts.resolve_any_type(self.context, name).map(Referral::TypeName))
    }
}

impl<'ast> BoundNode<'ast> for BoundIdentifier<'ast> {
    fn context(&self) -> ContextId {
        self.context
    }

    fn span(&self) -> Span {
        self.origin.span
    }

    fn semantic_analysis_phase1(&self, program: &BoundProgram<'ast>) -> InternalResult<Vec<Diagnostic>> {
        match *self.local_referral.get_or_init(|| self.resolve(program)) {
            Some(referral) => {
                let _ = self.referral.set(referral);
                Ok(Vec::new())
            }
            None => Ok(vec![Diagnostic::error(SemanticError::UndefinedIdentifier {
                name: self.name().to_string(),
                span: self.origin.span,
            })]),
        }
    }

    fn semantic_analysis_phase2(&self, program: &BoundProgram<'ast>) -> InternalResult<Vec<Diagnostic>> {
        let mut diagnostics = Vec::new();

        if self.referral.get().is_none() {
            match program
                .contexts()
                .resolve_variable(self.context, self.name(), false)
            {
                Some(variable) => {
                    let _ = self.referral.set(Referral::Variable(variable));
                }
                None => diagnostics.push(Diagnostic::error(SemanticError::UnresolvedVariable {
                    name: self.name().to_string(),
                    span: self.origin.span,
                })),
            }
        }

        if self.ty.get().is_none() {
            let ty = match self.referral() {
                Some(Referral::Literal(_)) => Some(TypeRef::simple(builtin_types::BOOLEAN)),
                Some(Referral::Variable(variable)) => program.variable_type(variable)?,
                Some(Referral::TypeName(ty)) => Some(TypeRef::simple(ty)),
                None => None,
            };
            let _ = self.ty.set(ty);
        }

        Ok(diagnostics)
    }

    fn semantic_analysis_phase3(&self, _program: &BoundProgram<'ast>) -> InternalResult<Vec<Diagnostic>> {
        Ok(Vec::new())
    }
}

impl<'ast> EffectAnalysis<'ast> for BoundIdentifier<'ast> {
    fn find_reads_beyond<'b>(
        &'b self,
        boundary: ContextId,
        program: &'b BoundProgram<'ast>,
    ) -> InternalResult<Vec<Effect<'b, 'ast>>> {
        let Some(variable) = self.variable() else {
            return Ok(Vec::new());
        };
        if program
            .contexts()
            .contains_within_boundary(self.context, variable, boundary)
        {
            Ok(Vec::new())
        } else {
            Ok(vec![Effect::new(
                EffectSource::Identifier(self),
                EffectCause::ReadsVariable(variable),
            )])
        }
    }

    fn find_writes_beyond<'b>(
        &'b self,
        _boundary: ContextId,
        _program: &'b BoundProgram<'ast>,
    ) -> InternalResult<Vec<Effect<'b, 'ast>>> {
        Ok(Vec::new())
    }
}
