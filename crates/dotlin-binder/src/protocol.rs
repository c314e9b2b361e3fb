//! The three-phase analysis protocol shared by every bound construct.
//!
//! ```text
//! phase 1  local resolution     identifiers, declared types, duplicate members
//! phase 2  typing and dispatch  expression types, overload resolution, nullability
//! phase 3  deferred validation  purity and read-only claims
//! ```
//!
//! Phases may be requested out of order and more than once: an invocation in one
//! function can need the return type of a function that has not been analysed
//! yet. Declarations therefore memoize each phase in a
//! [`PhaseCache`](crate::memo::PhaseCache); expressions and statements only ever
//! assign their set-once fields when unset and recompute their diagnostics
//! deterministically, which makes every phase idempotent.

use dotlin_core::{Diagnostic, InternalResult, Span};

use crate::ids::ContextId;
use crate::memo::Phase;
use crate::program::BoundProgram;

/// A syntax node augmented with resolved semantic facts.
pub trait BoundNode<'ast> {
    /// The context this node was bound in.
    fn context(&self) -> ContextId;

    /// Location of the originating syntax node.
    fn span(&self) -> Span;

    /// Resolve what can be resolved without knowledge of other declarations.
    fn semantic_analysis_phase1(&self, program: &BoundProgram<'ast>) -> InternalResult<Vec<Diagnostic>>;

    /// Resolve types and dispatch targets, triggering analysis of other
    /// declarations where needed.
    fn semantic_analysis_phase2(&self, program: &BoundProgram<'ast>) -> InternalResult<Vec<Diagnostic>>;

    /// Validate what requires the call graph to be resolved.
    fn semantic_analysis_phase3(&self, program: &BoundProgram<'ast>) -> InternalResult<Vec<Diagnostic>>;

    /// Run one phase by value.
    fn semantic_analysis(&self, phase: Phase, program: &BoundProgram<'ast>) -> InternalResult<Vec<Diagnostic>> {
        match phase {
            Phase::One => self.semantic_analysis_phase1(program),
            Phase::Two => self.semantic_analysis_phase2(program),
            Phase::Three => self.semantic_analysis_phase3(program),
        }
    }
}

/// Run a phase on every node, concatenating the diagnostics in order.
pub(crate) fn analyse_all<'n, 'ast: 'n, N>(
    nodes: impl IntoIterator<Item = &'n N>,
    phase: Phase,
    program: &BoundProgram<'ast>,
) -> InternalResult<Vec<Diagnostic>>
where
    N: BoundNode<'ast> + 'n,
{
    let mut diagnostics = Vec::new();
    for node in nodes {
        diagnostics.extend(node.semantic_analysis(phase, program)?);
    }
    Ok(diagnostics)
}

/// Run every phase up to and including `up_to` on a declaration, discarding the
/// diagnostics. Declarations keep them in their phase cache, so the analysis
/// pass still collects them when it reaches the declaration itself.
pub(crate) fn ensure_analysed<'ast, N>(node: &N, up_to: Phase, program: &BoundProgram<'ast>) -> InternalResult<()>
where
    N: BoundNode<'ast> + ?Sized,
{
    for phase in Phase::ALL.into_iter().take_while(|phase| *phase <= up_to) {
        tracing::trace!(?phase, span = %node.span(), "analysing declaration on demand");
        node.semantic_analysis(phase, program)?;
    }
    Ok(())
}
