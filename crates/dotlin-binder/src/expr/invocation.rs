use dotlin_ast::{BinaryExpr, BinaryOp, Expr, Ident, InvocationExpr, UnaryExpr, UnaryOp};
use dotlin_core::{
    Diagnostic, FunctionModifiers, InternalError, InternalResult, SemanticError, Span, TypeRef, builtin_types,
};
use once_cell::unsync::OnceCell;

use crate::effects::{Effect, EffectAnalysis, EffectCause, EffectSource, EffectSummary};
use crate::expr::member::check_traversal;
use crate::expr::{BoundExpression, invalid_invocation_target};
use crate::ids::{ContextId, FunctionId};
use crate::memo::Phase;
use crate::overload::{self, OverloadMatch};
use crate::program::BoundProgram;
use crate::protocol::{BoundNode, analyse_all};

/// How the invocation was written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvocationKind {
    /// `f(a)` or `r.f(a)`.
    Call,
    /// `a + b`, invoking the operator function on `a`.
    Binary(BinaryOp),
    /// `-a`, invoking the operator function on `a`.
    Unary(UnaryOp),
}

impl InvocationKind {
    pub fn is_operator(self) -> bool {
        !matches!(self, InvocationKind::Call)
    }
}

/// A call of a named function, with or without receiver.
#[derive(Debug)]
pub struct BoundInvocation<'ast> {
    context: ContextId,
    span: Span,
    kind: InvocationKind,
    function_name: Ident<'ast>,
    receiver: Option<BoundExpression<'ast>>,
    null_safe: bool,
    arguments: Vec<BoundExpression<'ast>>,
    /// Applicable candidates, best first.
    resolution: OnceCell<Vec<OverloadMatch>>,
    dispatched: OnceCell<Option<FunctionId>>,
    ty: OnceCell<Option<TypeRef>>,
}

impl<'ast> BoundInvocation<'ast> {
    pub(crate) fn bind_call(origin: &'ast InvocationExpr<'ast>, context: ContextId) -> InternalResult<Self> {
        let (function_name, receiver, null_safe) = match origin.target {
            Expr::Ident(ident) => (ident.ident, None, false),
            Expr::Member(member) => (
                member.member,
                Some(BoundExpression::bind(member.object, context)?),
                member.null_safe,
            ),
            _ => return Err(invalid_invocation_target(origin.span)),
        };
        let arguments = origin
            .args
            .iter()
            .map(|arg| BoundExpression::bind(arg, context))
            .collect::<InternalResult<Vec<_>>>()?;

        Ok(Self::new(
            context,
            origin.span,
            InvocationKind::Call,
            function_name,
            receiver,
            null_safe,
            arguments,
        ))
    }

    pub(crate) fn bind_binary(origin: &'ast BinaryExpr<'ast>, context: ContextId) -> InternalResult<Self> {
        let receiver = BoundExpression::bind(origin.left, context)?;
        let argument = BoundExpression::bind(origin.right, context)?;
        Ok(Self::new(
            context,
            origin.span,
            InvocationKind::Binary(origin.op),
            Ident::new(origin.op.function_name(), origin.span),
            Some(receiver),
            false,
            vec![argument],
        ))
    }

    pub(crate) fn bind_unary(origin: &'ast UnaryExpr<'ast>, context: ContextId) -> InternalResult<Self> {
        let receiver = BoundExpression::bind(origin.operand, context)?;
        Ok(Self::new(
            context,
            origin.span,
            InvocationKind::Unary(origin.op),
            Ident::new(origin.op.function_name(), origin.span),
            Some(receiver),
            false,
            Vec::new(),
        ))
    }

    fn new(
        context: ContextId,
        span: Span,
        kind: InvocationKind,
        function_name: Ident<'ast>,
        receiver: Option<BoundExpression<'ast>>,
        null_safe: bool,
        arguments: Vec<BoundExpression<'ast>>,
    ) -> Self {
        Self {
            context,
            span,
            kind,
            function_name,
            receiver,
            null_safe,
            arguments,
            resolution: OnceCell::new(),
            dispatched: OnceCell::new(),
            ty: OnceCell::new(),
        }
    }

    pub fn kind(&self) -> InvocationKind {
        self.kind
    }

    pub fn function_name(&self) -> &'ast str {
        self.function_name.name
    }

    pub fn receiver(&self) -> Option<&BoundExpression<'ast>> {
        self.receiver.as_ref()
    }

    pub fn arguments(&self) -> &[BoundExpression<'ast>] {
        &self.arguments
    }

    /// The function chosen by overload resolution.
    pub fn dispatched(&self) -> Option<FunctionId> {
        self.dispatched.get().copied().flatten()
    }

    pub fn ty(&self) -> Option<TypeRef> {
        self.ty.get().copied().flatten()
    }

    fn children(&self) -> impl Iterator<Item = &BoundExpression<'ast>> {
        self.receiver.iter().chain(self.arguments.iter())
    }

    /// Candidates visible under the function name; operators only consider
    /// functions declared `operator`.
    fn candidates(&self, program: &BoundProgram<'ast>) -> InternalResult<Vec<FunctionId>> {
        let visible = program
            .contexts()
            .resolve_any_functions(self.context, self.function_name());
        if !self.kind.is_operator() {
            return Ok(visible);
        }
        let mut operators = Vec::with_capacity(visible.len());
        for function in visible {
            if program
                .function(function)?
                .modifiers()
                .contains(FunctionModifiers::OPERATOR)
            {
                operators.push(function);
            }
        }
        Ok(operators)
    }

    fn unresolvable(
        &self,
        program: &BoundProgram<'ast>,
        receiver: Option<&TypeRef>,
        arguments: &[Option<TypeRef>],
    ) -> SemanticError {
        let types = program.types();
        let show = |ty: Option<&TypeRef>| ty.map_or_else(|| "?".to_string(), |ty| types.display(ty));

        match self.kind {
            InvocationKind::Call => {
                let params = arguments.iter().map(|ty| show(ty.as_ref())).collect::<Vec<_>>();
                let signature = match receiver {
                    Some(receiver) => format!(
                        "{}.{}({})",
                        show(Some(receiver)),
                        self.function_name(),
                        params.join(", ")
                    ),
                    None => format!("{}({})", self.function_name(), params.join(", ")),
                };
                SemanticError::UnresolvableFunction {
                    signature,
                    span: self.span,
                }
            }
            InvocationKind::Binary(op) => SemanticError::UnresolvableOperator {
                operator: op.as_str().to_string(),
                operands: format!(
                    "{} and {}",
                    show(receiver),
                    show(arguments.first().and_then(Option::as_ref))
                ),
                span: self.span,
            },
            InvocationKind::Unary(op) => SemanticError::UnresolvableOperator {
                operator: op.as_str().to_string(),
                operands: show(receiver),
                span: self.span,
            },
        }
    }

    fn result_type(
        &self,
        function: FunctionId,
        receiver: Option<&TypeRef>,
        program: &BoundProgram<'ast>,
    ) -> InternalResult<Option<TypeRef>> {
        let ty = match self.kind {
            InvocationKind::Binary(op) if op.yields_boolean() => {
                Some(program.types().with_implied_modifier(TypeRef::simple(builtin_types::BOOLEAN)))
            }
            _ => program.return_type(function)?,
        };
        let nullable_receiver = receiver.is_some_and(|ty| ty.nullable);
        Ok(ty.map(|ty| if self.null_safe && nullable_receiver { ty.nullable() } else { ty }))
    }

    fn callee_effect(
        &self,
        summary: Option<EffectSummary>,
        function: FunctionId,
        impure: EffectCause,
    ) -> Option<Effect<'_, 'ast>> {
        match summary {
            Some(summary) if summary.is_clean() => None,
            Some(_) => Some(Effect::new(EffectSource::Invocation(self), impure)),
            None => {
                tracing::debug!(
                    callee = self.function_name(),
                    span = %self.span,
                    "effects of callee still being computed, assuming impure"
                );
                Some(Effect::new(
                    EffectSource::Invocation(self),
                    EffectCause::RecursiveInvocation(function),
                ))
            }
        }
    }
}

impl<'ast> BoundNode<'ast> for BoundInvocation<'ast> {
    fn context(&self) -> ContextId {
        self.context
    }

    fn span(&self) -> Span {
        self.span
    }

    fn semantic_analysis_phase1(&self, program: &BoundProgram<'ast>) -> InternalResult<Vec<Diagnostic>> {
        analyse_all(self.children(), Phase::One, program)
    }

    fn semantic_analysis_phase2(&self, program: &BoundProgram<'ast>) -> InternalResult<Vec<Diagnostic>> {
        let mut diagnostics = analyse_all(self.children(), Phase::Two, program)?;

        let receiver_known = self.receiver.as_ref().and_then(BoundExpression::ty);
        let receiver_ty = self
            .receiver
            .as_ref()
            .map(|_| receiver_known.unwrap_or_else(TypeRef::nullable_any));

        if self.kind == InvocationKind::Call
            && let Some(err) = receiver_known.and_then(|ty| check_traversal(&ty, self.null_safe, self.span))
        {
            diagnostics.push(Diagnostic::error(err));
        }

        let argument_tys: Vec<Option<TypeRef>> = self.arguments.iter().map(BoundExpression::ty).collect();
        let matches = self.resolution.get_or_try_init(|| {
            let candidates = self.candidates(program)?;
            let matches = overload::resolve_overload(program, &candidates, receiver_ty.as_ref(), &argument_tys)?;
            tracing::trace!(
                name = self.function_name(),
                candidates = candidates.len(),
                applicable = matches.len(),
                "resolved overloads"
            );
            Ok::<_, InternalError>(matches)
        })?;

        let Some(best) = matches.first() else {
            diagnostics.push(Diagnostic::error(self.unresolvable(
                program,
                receiver_ty.as_ref(),
                &argument_tys,
            )));
            let _ = self.dispatched.set(None);
            let _ = self.ty.set(None);
            return Ok(diagnostics);
        };

        // A tie caused by an unknown operand is a consequence of an earlier error.
        let has_wildcard = (self.receiver.is_some() && receiver_known.is_none())
            || argument_tys.iter().any(Option::is_none);
        if program.options().report_ambiguous_overloads && !has_wildcard && overload::is_ambiguous(matches) {
            diagnostics.push(Diagnostic::error(overload::ambiguous_invocation_error(
                program,
                self.function_name(),
                matches,
                self.span,
            )?));
        }

        if self.dispatched.get().is_none() {
            tracing::trace!(
                name = self.function_name(),
                function = ?best.function,
                distance = best.distance,
                "dispatched invocation"
            );
            let ty = self.result_type(best.function, receiver_ty.as_ref(), program)?;
            let _ = self.dispatched.set(Some(best.function));
            let _ = self.ty.set(ty);
        }

        Ok(diagnostics)
    }

    fn semantic_analysis_phase3(&self, program: &BoundProgram<'ast>) -> InternalResult<Vec<Diagnostic>> {
        analyse_all(self.children(), Phase::Three, program)
    }
}

impl<'ast> EffectAnalysis<'ast> for BoundInvocation<'ast> {
    fn find_reads_beyond<'b>(
        &'b self,
        boundary: ContextId,
        program: &'b BoundProgram<'ast>,
    ) -> InternalResult<Vec<Effect<'b, 'ast>>> {
        let mut effects = Vec::new();
        for child in self.children() {
            effects.extend(child.find_reads_beyond(boundary, program)?);
        }
        if let Some(function) = self.dispatched() {
            let summary = program.function(function)?.reads_summary(program)?;
            effects.extend(self.callee_effect(summary, function, EffectCause::ImpureInvocation(function)));
        }
        Ok(effects)
    }

    fn find_writes_beyond<'b>(
        &'b self,
        boundary: ContextId,
        program: &'b BoundProgram<'ast>,
    ) -> InternalResult<Vec<Effect<'b, 'ast>>> {
        let mut effects = Vec::new();
        for child in self.children() {
            effects.extend(child.find_writes_beyond(boundary, program)?);
        }
        if let Some(function) = self.dispatched() {
            let summary = program.function(function)?.writes_summary(program)?;
            effects.extend(self.callee_effect(summary, function, EffectCause::MutatingInvocation(function)));
        }
        Ok(effects)
    }
}
