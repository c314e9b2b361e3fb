//! Effect and purity analysis.
//!
//! Both queries ask which sub-nodes of a construct read or write state outside a
//! boundary context:
//!
//! - a variable reference reads beyond the boundary when the variable is not
//!   declared between the reference's context and the boundary
//! - an assignment writes its target the same way; the target itself is not read
//! - an invocation adds itself when the callee is not known to be pure (for reads)
//!   or read-only (for writes)
//! - everything else is the union of its children
//!
//! Finding out whether a callee is pure runs the callee's own analysis on demand,
//! so effect analysis drives the phase protocol rather than just consuming it.
//! A callee whose purity is being computed further up the stack counts as impure.

use dotlin_core::{InternalResult, Span};

use crate::expr::{BoundIdentifier, BoundInvocation};
use crate::ids::{ContextId, FunctionId, VariableId};
use crate::program::BoundProgram;
use crate::protocol::BoundNode;
use crate::stmt::BoundAssignment;

/// Why a node escapes the boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EffectCause {
    ReadsVariable(VariableId),
    WritesVariable(VariableId),
    /// The callee reads beyond its own scope.
    ImpureInvocation(FunctionId),
    /// The callee writes beyond its own scope.
    MutatingInvocation(FunctionId),
    /// The callee's effects are being computed further up the stack.
    RecursiveInvocation(FunctionId),
}

/// The node responsible for an effect.
#[derive(Debug, Clone, Copy)]
pub enum EffectSource<'b, 'ast> {
    Identifier(&'b BoundIdentifier<'ast>),
    Invocation(&'b BoundInvocation<'ast>),
    Assignment(&'b BoundAssignment<'ast>),
}

impl EffectSource<'_, '_> {
    pub fn span(&self) -> Span {
        match self {
            EffectSource::Identifier(node) => node.span(),
            EffectSource::Invocation(node) => node.span(),
            EffectSource::Assignment(node) => node.span(),
        }
    }
}

/// A read or write that crosses a boundary.
#[derive(Debug, Clone, Copy)]
pub struct Effect<'b, 'ast> {
    pub source: EffectSource<'b, 'ast>,
    pub cause: EffectCause,
}

impl<'b, 'ast> Effect<'b, 'ast> {
    pub fn new(source: EffectSource<'b, 'ast>, cause: EffectCause) -> Self {
        Self { source, cause }
    }

    pub fn span(&self) -> Span {
        self.source.span()
    }
}

/// Constructs that can be asked for their effects relative to a boundary.
pub trait EffectAnalysis<'ast> {
    /// Sub-nodes reading state declared outside `boundary`.
    fn find_reads_beyond<'b>(
        &'b self,
        boundary: ContextId,
        program: &'b BoundProgram<'ast>,
    ) -> InternalResult<Vec<Effect<'b, 'ast>>>;

    /// Sub-nodes writing state declared outside `boundary`.
    fn find_writes_beyond<'b>(
        &'b self,
        boundary: ContextId,
        program: &'b BoundProgram<'ast>,
    ) -> InternalResult<Vec<Effect<'b, 'ast>>>;
}

/// Effects of a function body relative to its own parameter context, reduced to
/// what outlives the borrow of the body.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EffectSummary {
    clean: bool,
    /// Locations of the offending sub-nodes, in source order.
    pub offending: Vec<Span>,
    /// Invocations whose callee was still being analysed.
    pub recursive: Vec<(FunctionId, Span)>,
}

impl EffectSummary {
    pub fn from_effects(effects: &[Effect<'_, '_>]) -> Self {
        let mut summary = Self {
            clean: effects.is_empty(),
            offending: Vec::with_capacity(effects.len()),
            recursive: Vec::new(),
        };
        for effect in effects {
            let span = effect.span();
            if !summary.offending.contains(&span) {
                summary.offending.push(span);
            }
            if let EffectCause::RecursiveInvocation(callee) = effect.cause {
                summary.recursive.push((callee, span));
            }
        }
        summary
    }

    /// The summary of a function without a body, which is whatever it claims.
    pub fn assumed(clean: bool) -> Self {
        Self {
            clean,
            ..Self::default()
        }
    }

    /// Whether nothing escapes the boundary.
    pub fn is_clean(&self) -> bool {
        self.clean
    }
}
