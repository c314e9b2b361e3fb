use dotlin_ast::AssignStmt;
use dotlin_core::{Diagnostic, InternalResult, SemanticError, Span};

use crate::effects::{Effect, EffectAnalysis, EffectCause, EffectSource};
use crate::expr::BoundExpression;
use crate::ids::ContextId;
use crate::memo::Phase;
use crate::program::BoundProgram;
use crate::protocol::BoundNode;

/// `target = value`.
///
/// The target is written, not read: `x = 1` has no read effect on `x`, while
/// `p.x = 1` reads `p` to reach the member and writes `p` through it.
#[derive(Debug)]
pub struct BoundAssignment<'ast> {
    context: ContextId,
    origin: &'ast AssignStmt<'ast>,
    target: BoundExpression<'ast>,
    value: BoundExpression<'ast>,
}

impl<'ast> BoundAssignment<'ast> {
    pub(crate) fn new(
        context: ContextId,
        origin: &'ast AssignStmt<'ast>,
        target: BoundExpression<'ast>,
        value: BoundExpression<'ast>,
    ) -> Self {
        Self {
            context,
            origin,
            target,
            value,
        }
    }

    pub fn target(&self) -> &BoundExpression<'ast> {
        &self.target
    }

    pub fn value(&self) -> &BoundExpression<'ast> {
        &self.value
    }

    fn analyse(&self, phase: Phase, program: &BoundProgram<'ast>) -> InternalResult<Vec<Diagnostic>> {
        let mut diagnostics = self.target.semantic_analysis(phase, program)?;
        diagnostics.extend(self.value.semantic_analysis(phase, program)?);
        Ok(diagnostics)
    }
}

impl<'ast> BoundNode<'ast> for BoundAssignment<'ast> {
    fn context(&self) -> ContextId {
        self.context
    }

    fn span(&self) -> Span {
        self.origin.span
    }

    fn semantic_analysis_phase1(&self, program: &BoundProgram<'ast>) -> InternalResult<Vec<Diagnostic>> {
        self.analyse(Phase::One, program)
    }

    fn semantic_analysis_phase2(&self, program: &BoundProgram<'ast>) -> InternalResult<Vec<Diagnostic>> {
        let mut diagnostics = self.analyse(Phase::Two, program)?;

        if let BoundExpression::Identifier(identifier) = &self.target
            && let Some(variable) = identifier.variable()
            && !program.variable(variable)?.is_mutable()
        {
            diagnostics.push(Diagnostic::error(SemanticError::AssignmentToImmutable {
                name: identifier.name().to_string(),
                span: self.origin.span,
            }));
        }

        Ok(diagnostics)
    }

    fn semantic_analysis_phase3(&self, program: &BoundProgram<'ast>) -> InternalResult<Vec<Diagnostic>> {
        self.analyse(Phase::Three, program)
    }
}

impl<'ast> EffectAnalysis<'ast> for BoundAssignment<'ast> {
    fn find_reads_beyond<'b>(
        &'b self,
        boundary: ContextId,
        program: &'b BoundProgram<'ast>,
    ) -> InternalResult<Vec<Effect<'b, 'ast>>> {
        let mut effects = match &self.target {
            BoundExpression::Identifier(_) => Vec::new(),
            target => target.find_reads_beyond(boundary, program)?,
        };
        effects.extend(self.value.find_reads_beyond(boundary, program)?);
        Ok(effects)
    }

    fn find_writes_beyond<'b>(
        &'b self,
        boundary: ContextId,
        program: &'b BoundProgram<'ast>,
    ) -> InternalResult<Vec<Effect<'b, 'ast>>> {
        let mut effects = Vec::new();
        if let Some(root) = self.target.root_identifier()
            && let Some(variable) = root.variable()
            && !program
                .contexts()
                .contains_within_boundary(root.context(), variable, boundary)
        {
            effects.push(Effect::new(
                EffectSource::Assignment(self),
                EffectCause::WritesVariable(variable),
            ));
        }
        effects.extend(self.target.find_writes_beyond(boundary, program)?);
        effects.extend(self.value.find_writes_beyond(boundary, program)?);
        Ok(effects)
    }
}
