//! Bound variables: globals, locals and parameters.

use dotlin_ast::{Param, VariableDecl};
use dotlin_core::{Diagnostic, InternalResult, SemanticError, Span, TypeRef};
use once_cell::unsync::OnceCell;

use crate::effects::{Effect, EffectAnalysis};
use crate::expr::BoundExpression;
use crate::ids::{ContextId, FunctionId, VariableId};
use crate::memo::{Phase, PhaseCache};
use crate::program::BoundProgram;
use crate::protocol::{BoundNode, ensure_analysed};

/// Where a variable was declared.
#[derive(Debug, Clone, Copy)]
pub enum VariableOrigin<'ast> {
    /// `val`/`var`, at module level or in a body.
    Declared(&'ast VariableDecl<'ast>),
    /// The `index`-th parameter of `function`.
    Parameter {
        function: FunctionId,
        index: usize,
        param: &'ast Param<'ast>,
    },
}

/// A variable and what is known about it.
#[derive(Debug)]
pub struct BoundVariable<'ast> {
    id: VariableId,
    origin: VariableOrigin<'ast>,
    /// The context the declaration appears in. Locals are visible only in the
    /// binding context opened after it; the initializer cannot see the variable.
    context: ContextId,
    initializer: Option<BoundExpression<'ast>>,
    declared_type: OnceCell<(Option<TypeRef>, Vec<SemanticError>)>,
    ty: OnceCell<Option<TypeRef>>,
    phases: PhaseCache,
}

impl<'ast> BoundVariable<'ast> {
    pub(crate) fn new(
        id: VariableId,
        origin: VariableOrigin<'ast>,
        context: ContextId,
        initializer: Option<BoundExpression<'ast>>,
    ) -> Self {
        Self {
            id,
            origin,
            context,
            initializer,
            declared_type: OnceCell::new(),
            ty: OnceCell::new(),
            phases: PhaseCache::default(),
        }
    }

    pub fn id(&self) -> VariableId {
        self.id
    }

    pub fn origin(&self) -> VariableOrigin<'ast> {
        self.origin
    }

    pub fn name(&self) -> &'ast str {
        match self.origin {
            VariableOrigin::Declared(decl) => decl.name.name,
            VariableOrigin::Parameter { param, .. } => param.name.name,
        }
    }

    /// `var` declarations are mutable; `val` declarations and parameters are not.
    pub fn is_mutable(&self) -> bool {
        match self.origin {
            VariableOrigin::Declared(decl) => decl.is_mutable,
            VariableOrigin::Parameter { .. } => false,
        }
    }

    pub fn initializer(&self) -> Option<&BoundExpression<'ast>> {
        self.initializer.as_ref()
    }

    fn declared_type(&self, program: &BoundProgram<'ast>) -> &(Option<TypeRef>, Vec<SemanticError>) {
        self.declared_type.get_or_init(|| {
            let mut errors = Vec::new();
            let ty = match self.origin {
                VariableOrigin::Declared(decl) => {
                    program
                        .resolver()
                        .resolve_optional(self.context, decl.ty.as_ref(), &mut errors)
                }
                VariableOrigin::Parameter { .. } => None,
            };
            (ty, errors)
        })
    }

    /// The variable's type: declared, or taken from the initializer.
    ///
    /// Parameters report the type from their function's signature. For other
    /// variables without a written type, this analyses the declaration on demand;
    /// asked from within its own initializer, the type is unknown.
    pub fn ty(&self, program: &BoundProgram<'ast>) -> InternalResult<Option<TypeRef>> {
        if let VariableOrigin::Parameter { function, index, .. } = self.origin {
            let signature = program.function(function)?.signature(program);
            return Ok(signature.params.get(index).copied().flatten());
        }
        if let Some(ty) = self.declared_type(program).0 {
            return Ok(Some(ty));
        }
        if self.ty.get().is_none() {
            ensure_analysed(self, Phase::Two, program)?;
        }
        Ok(self.ty.get().copied().flatten())
    }
}

/// `null` needs a nullable declared type; any other initializer of known type
/// must be assignable to it.
fn initializer_mismatch(
    declared: &TypeRef,
    initializer: &BoundExpression<'_>,
    program: &BoundProgram<'_>,
) -> InternalResult<Option<SemanticError>> {
    let types = program.types();
    let actual = match initializer {
        BoundExpression::NullLiteral(_) if !declared.nullable => "null".to_string(),
        BoundExpression::NullLiteral(_) => return Ok(None),
        other => match other.ty() {
            Some(actual) if !types.is_assignable(&actual, declared)? => types.display(&actual),
            _ => return Ok(None),
        },
    };
    Ok(Some(SemanticError::ValueNotAssignable {
        expected: types.display(declared),
        actual,
        span: initializer.span(),
    }))
}

impl<'ast> BoundNode<'ast> for BoundVariable<'ast> {
    fn context(&self) -> ContextId {
        self.context
    }

    fn span(&self) -> Span {
        match self.origin {
            VariableOrigin::Declared(decl) => decl.span,
            VariableOrigin::Parameter { param, .. } => param.span,
        }
    }

    fn semantic_analysis_phase1(&self, program: &BoundProgram<'ast>) -> InternalResult<Vec<Diagnostic>> {
        let diagnostics = self.phases.run(Phase::One, || {
            let mut diagnostics: Vec<Diagnostic> = self
                .declared_type(program)
                .1
                .iter()
                .cloned()
                .map(Diagnostic::error)
                .collect();
            if let Some(initializer) = &self.initializer {
                diagnostics.extend(initializer.semantic_analysis_phase1(program)?);
            }
            Ok(diagnostics)
        })?;
        Ok(diagnostics.unwrap_or_default())
    }

    fn semantic_analysis_phase2(&self, program: &BoundProgram<'ast>) -> InternalResult<Vec<Diagnostic>> {
        let diagnostics = self.phases.run(Phase::Two, || {
            let mut diagnostics = Vec::new();
            if let Some(initializer) = &self.initializer {
                diagnostics.extend(initializer.semantic_analysis_phase2(program)?);
                if let Some(declared) = self.declared_type(program).0
                    && let Some(err) = initializer_mismatch(&declared, initializer, program)?
                {
                    diagnostics.push(Diagnostic::error(err));
                }
            }
            let ty = self
                .declared_type(program)
                .0
                .or_else(|| self.initializer.as_ref().and_then(BoundExpression::ty));
            let _ = self.ty.set(ty);
            Ok(diagnostics)
        })?;
        Ok(diagnostics.unwrap_or_default())
    }

    fn semantic_analysis_phase3(&self, program: &BoundProgram<'ast>) -> InternalResult<Vec<Diagnostic>> {
        let diagnostics = self.phases.run(Phase::Three, || match &self.initializer {
            Some(initializer) => initializer.semantic_analysis_phase3(program),
            None => Ok(Vec::new()),
        })?;
        Ok(diagnostics.unwrap_or_default())
    }
}

impl<'ast> EffectAnalysis<'ast> for BoundVariable<'ast> {
    fn find_reads_beyond<'b>(
        &'b self,
        boundary: ContextId,
        program: &'b BoundProgram<'ast>,
    ) -> InternalResult<Vec<Effect<'b, 'ast>>> {
        match &self.initializer {
            Some(initializer) => initializer.find_reads_beyond(boundary, program),
            None => Ok(Vec::new()),
        }
    }

    fn find_writes_beyond<'b>(
        &'b self,
        boundary: ContextId,
        program: &'b BoundProgram<'ast>,
    ) -> InternalResult<Vec<Effect<'b, 'ast>>> {
        match &self.initializer {
            Some(initializer) => initializer.find_writes_beyond(boundary, program),
            None => Ok(Vec::new()),
        }
    }
}
