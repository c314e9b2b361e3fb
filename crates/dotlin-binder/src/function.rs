//! Bound functions.
//!
//! A function owns a parameter context, which is the boundary for its effect
//! analysis: parameters are declared in it and every local lives below it.
//!
//! ```text
//! module ctx
//!   └─ function ctx      parameters        <- boundary
//!        └─ block ctx
//!             └─ binding ctx   val y
//!                  └─ binding ctx   var z
//! ```
//!
//! Purity and read-only-ness are derived on demand and memoized in a three-state
//! [`Memo`]. Asking while the same question is being answered further up the
//! stack yields `None`, which callers treat as "not established".

use dotlin_ast::FunctionDecl;
use dotlin_core::{
    Diagnostic, FunctionModifiers, InternalResult, SemanticError, Span, TypeRef, builtin_types,
};
use once_cell::unsync::OnceCell;

use crate::builtins::BuiltinFunction;
use crate::effects::{EffectAnalysis, EffectSummary};
use crate::expr::BoundExpression;
use crate::ids::{ContextId, FunctionId, VariableId};
use crate::memo::{Memo, Phase, PhaseCache};
use crate::program::BoundProgram;
use crate::protocol::{BoundNode, ensure_analysed};
use crate::stmt::BoundBlock;

/// Where a function came from.
#[derive(Debug, Clone, Copy)]
pub enum FunctionOrigin<'ast> {
    Declared(&'ast FunctionDecl<'ast>),
    Builtin(&'static BuiltinFunction),
}

/// Resolved declared types of a function. Unknown types are `None` and act as
/// wildcards during overload resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature {
    pub has_receiver: bool,
    pub receiver: Option<TypeRef>,
    pub params: Vec<Option<TypeRef>>,
    pub declared_return: Option<TypeRef>,
    /// Unknown type names in the declaration, reported in phase 1.
    pub errors: Vec<SemanticError>,
}

/// A function and what is known about it.
#[derive(Debug)]
pub struct BoundFunction<'ast> {
    id: FunctionId,
    origin: FunctionOrigin<'ast>,
    /// Where the declaration appears; types in the signature resolve here.
    module_context: ContextId,
    /// Holds the parameters.
    context: ContextId,
    parameters: Vec<VariableId>,
    body: Option<BoundBlock<'ast>>,
    signature: OnceCell<Signature>,
    inferred_return: OnceCell<Option<TypeRef>>,
    phases: PhaseCache,
    purity: Memo<EffectSummary>,
    readonly: Memo<EffectSummary>,
}

impl<'ast> BoundFunction<'ast> {
    pub(crate) fn new(
        id: FunctionId,
        origin: FunctionOrigin<'ast>,
        module_context: ContextId,
        context: ContextId,
    ) -> Self {
        Self {
            id,
            origin,
            module_context,
            context,
            parameters: Vec::new(),
            body: None,
            signature: OnceCell::new(),
            inferred_return: OnceCell::new(),
            phases: PhaseCache::default(),
            purity: Memo::new(),
            readonly: Memo::new(),
        }
    }

    pub(crate) fn set_parameters(&mut self, parameters: Vec<VariableId>) {
        self.parameters = parameters;
    }

    pub(crate) fn set_body(&mut self, body: BoundBlock<'ast>) {
        self.body = Some(body);
    }

    pub fn id(&self) -> FunctionId {
        self.id
    }

    pub fn origin(&self) -> FunctionOrigin<'ast> {
        self.origin
    }

    pub fn name(&self) -> &'ast str {
        match self.origin {
            FunctionOrigin::Declared(decl) => decl.name.name,
            FunctionOrigin::Builtin(builtin) => builtin.name,
        }
    }

    pub fn modifiers(&self) -> FunctionModifiers {
        match self.origin {
            FunctionOrigin::Declared(decl) => decl.modifiers,
            FunctionOrigin::Builtin(builtin) => builtin.modifiers,
        }
    }

    pub fn parameters(&self) -> &[VariableId] {
        &self.parameters
    }

    pub fn body(&self) -> Option<&BoundBlock<'ast>> {
        self.body.as_ref()
    }

    fn name_span(&self) -> Span {
        match self.origin {
            FunctionOrigin::Declared(decl) => decl.name.span,
            FunctionOrigin::Builtin(_) => Span::default(),
        }
    }

    // ==========================================================================
    // Types
    // ==========================================================================

    /// The declared types, resolved on first use.
    pub fn signature(&self, program: &BoundProgram<'ast>) -> &Signature {
        self.signature.get_or_init(|| match self.origin {
            FunctionOrigin::Declared(decl) => self.declared_signature(decl, program),
            FunctionOrigin::Builtin(builtin) => builtin_signature(builtin, program),
        })
    }

    fn declared_signature(&self, decl: &FunctionDecl<'_>, program: &BoundProgram<'ast>) -> Signature {
        let resolver = program.resolver();
        let context = self.module_context;
        let mut errors = Vec::new();

        let receiver = resolver.resolve_optional(context, decl.receiver.as_ref(), &mut errors);
        let params = decl
            .params
            .iter()
            .map(|param| resolver.resolve_optional(context, param.ty.as_ref(), &mut errors))
            .collect();
        let declared_return = resolver.resolve_optional(context, decl.return_type.as_ref(), &mut errors);

        Signature {
            has_receiver: decl.receiver.is_some(),
            receiver,
            params,
            declared_return,
            errors,
        }
    }

    /// The declared return type, or the one inferred from the body's `return`
    /// statements. Analyses the function on demand when inference is needed.
    pub fn return_type(&self, program: &BoundProgram<'ast>) -> InternalResult<Option<TypeRef>> {
        let declares_return = match self.origin {
            FunctionOrigin::Declared(decl) => decl.return_type.is_some(),
            FunctionOrigin::Builtin(_) => true,
        };
        if declares_return {
            return Ok(self.signature(program).declared_return);
        }
        if self.inferred_return.get().is_none() {
            ensure_analysed(self, Phase::Two, program)?;
        }
        Ok(self.inferred_return.get().copied().flatten())
    }

    /// `Unit` without value returns; otherwise the closest common ancestor of the
    /// known return types, nullable if any of them is or if `null` is returned.
    fn infer_return_type(&self, program: &BoundProgram<'ast>) -> InternalResult<Option<TypeRef>> {
        let Some(body) = &self.body else {
            return Ok(Some(TypeRef::simple(builtin_types::UNIT)));
        };
        let values: Vec<_> = body.returns().into_iter().filter_map(|ret| ret.value()).collect();
        if values.is_empty() {
            return Ok(Some(TypeRef::simple(builtin_types::UNIT)));
        }

        let known: Vec<TypeRef> = values.iter().filter_map(|value| value.ty()).collect();
        if known.is_empty() {
            return Ok(None);
        }
        let bases: Vec<_> = known.iter().map(|ty| ty.base).collect();
        let mut inferred = TypeRef::simple(program.types().closest_common_ancestor(&bases)?);
        inferred.nullable = known.iter().any(|ty| ty.nullable)
            || values
                .iter()
                .any(|value| matches!(value, BoundExpression::NullLiteral(_)));
        Ok(Some(program.types().with_implied_modifier(inferred)))
    }

    // ==========================================================================
    // Effects
    // ==========================================================================

    /// Reads of the body beyond the parameter context. `None` while the same
    /// question is being answered further up the stack.
    pub fn reads_summary(&self, program: &BoundProgram<'ast>) -> InternalResult<Option<EffectSummary>> {
        self.purity.compute(|| match &self.body {
            None => Ok(EffectSummary::assumed(self.modifiers().contains(FunctionModifiers::PURE))),
            Some(body) => {
                ensure_analysed(self, Phase::Two, program)?;
                let effects = body.find_reads_beyond(self.context, program)?;
                tracing::debug!(function = self.name(), effects = effects.len(), "computed purity");
                Ok(EffectSummary::from_effects(&effects))
            }
        })
    }

    /// Writes of the body beyond the parameter context.
    pub fn writes_summary(&self, program: &BoundProgram<'ast>) -> InternalResult<Option<EffectSummary>> {
        self.readonly.compute(|| match &self.body {
            None => Ok(EffectSummary::assumed(self.modifiers().claims_readonly())),
            Some(body) => {
                ensure_analysed(self, Phase::Two, program)?;
                let effects = body.find_writes_beyond(self.context, program)?;
                tracing::debug!(function = self.name(), effects = effects.len(), "computed read-only-ness");
                Ok(EffectSummary::from_effects(&effects))
            }
        })
    }

    /// Whether the function reads nothing beyond its own scope.
    pub fn is_pure(&self, program: &BoundProgram<'ast>) -> InternalResult<Option<bool>> {
        Ok(self.reads_summary(program)?.map(|summary| summary.is_clean()))
    }

    /// Whether the function writes nothing beyond its own scope.
    pub fn is_readonly(&self, program: &BoundProgram<'ast>) -> InternalResult<Option<bool>> {
        Ok(self.writes_summary(program)?.map(|summary| summary.is_clean()))
    }

    fn validate_claims(&self, program: &BoundProgram<'ast>) -> InternalResult<Vec<Diagnostic>> {
        let mut diagnostics = Vec::new();
        let mut recursive = Vec::new();
        let modifiers = self.modifiers();

        if modifiers.contains(FunctionModifiers::PURE)
            && let Some(summary) = self.reads_summary(program)?
            && !summary.is_clean()
        {
            diagnostics.push(Diagnostic::error(SemanticError::PurityViolation {
                function: self.name().to_string(),
                count: summary.offending.len(),
                offending: summary.offending.clone(),
                span: self.name_span(),
            }));
            recursive.extend(summary.recursive);
        }

        if modifiers.claims_readonly()
            && let Some(summary) = self.writes_summary(program)?
            && !summary.is_clean()
        {
            diagnostics.push(Diagnostic::error(SemanticError::ReadonlyViolation {
                function: self.name().to_string(),
                count: summary.offending.len(),
                offending: summary.offending.clone(),
                span: self.name_span(),
            }));
            recursive.extend(summary.recursive);
        }

        if program.options().warn_on_recursive_purity {
            recursive.sort_by_key(|(_, span)| span.position());
            recursive.dedup();
            for (callee, span) in recursive {
                diagnostics.push(Diagnostic::warning(SemanticError::RecursivePurityCheck {
                    callee: program.function(callee)?.name().to_string(),
                    span,
                }));
            }
        }

        Ok(diagnostics)
    }
}

fn builtin_signature(builtin: &BuiltinFunction, program: &BoundProgram<'_>) -> Signature {
    let resolver = program.resolver();
    let types = program.types();
    let mut errors = Vec::new();
    let mut resolve = |name: &str, nullable: bool| match resolver.resolve_name(ContextId::BUILTIN, name, Span::default()) {
        Ok(base) => {
            let ty = TypeRef {
                nullable,
                ..TypeRef::simple(base)
            };
            Some(types.with_implied_modifier(ty))
        }
        Err(err) => {
            errors.push(err);
            None
        }
    };

    let receiver = resolve(builtin.receiver, false);
    let params = builtin
        .params
        .iter()
        .map(|param| resolve(param.ty, param.nullable))
        .collect();
    let declared_return = resolve(builtin.return_type, false);

    Signature {
        has_receiver: true,
        receiver,
        params,
        declared_return,
        errors,
    }
}

impl<'ast> BoundNode<'ast> for BoundFunction<'ast> {
    fn context(&self) -> ContextId {
        self.context
    }

    fn span(&self) -> Span {
        match self.origin {
            FunctionOrigin::Declared(decl) => decl.span,
            FunctionOrigin::Builtin(_) => Span::default(),
        }
    }

    fn semantic_analysis_phase1(&self, program: &BoundProgram<'ast>) -> InternalResult<Vec<Diagnostic>> {
        let diagnostics = self.phases.run(Phase::One, || {
            let mut diagnostics: Vec<Diagnostic> = self
                .signature(program)
                .errors
                .iter()
                .cloned()
                .map(Diagnostic::error)
                .collect();
            if let Some(body) = &self.body {
                diagnostics.extend(body.semantic_analysis_phase1(program)?);
            }
            Ok(diagnostics)
        })?;
        Ok(diagnostics.unwrap_or_default())
    }

    fn semantic_analysis_phase2(&self, program: &BoundProgram<'ast>) -> InternalResult<Vec<Diagnostic>> {
        let diagnostics = self.phases.run(Phase::Two, || {
            let diagnostics = match &self.body {
                Some(body) => body.semantic_analysis_phase2(program)?,
                None => Vec::new(),
            };
            let inferred = self.infer_return_type(program)?;
            let _ = self.inferred_return.set(inferred);
            Ok(diagnostics)
        })?;
        Ok(diagnostics.unwrap_or_default())
    }

    fn semantic_analysis_phase3(&self, program: &BoundProgram<'ast>) -> InternalResult<Vec<Diagnostic>> {
        let diagnostics = self.phases.run(Phase::Three, || {
            let mut diagnostics = match &self.body {
                Some(body) => body.semantic_analysis_phase3(program)?,
                None => Vec::new(),
            };
            if self.body.is_some() {
                diagnostics.extend(self.validate_claims(program)?);
            }
            Ok(diagnostics)
        })?;
        Ok(diagnostics.unwrap_or_default())
    }
}
