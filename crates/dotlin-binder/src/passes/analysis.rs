//! Analysis pass: run the three phases over every declaration.
//!
//! Phases run breadth-first: phase 1 for all declarations, then phase 2, then
//! phase 3. Declarations may already have been analysed on demand by the time the
//! pass reaches them; their phase cache returns the stored diagnostics, so every
//! finding is collected exactly once and in source order.

use dotlin_core::{Diagnostic, InternalResult};

use crate::memo::Phase;
use crate::program::{BoundProgram, Declaration};
use crate::protocol::BoundNode;

/// Runs the phases over a constructed program.
pub struct AnalysisPass<'p, 'ast> {
    program: &'p BoundProgram<'ast>,
}

impl<'p, 'ast> AnalysisPass<'p, 'ast> {
    pub fn new(program: &'p BoundProgram<'ast>) -> Self {
        Self { program }
    }

    /// Run all phases, returning the diagnostics of each declaration.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn run(&self) -> InternalResult<Vec<Diagnostic>> {
        let mut diagnostics = Vec::new();
        for phase in Phase::ALL {
            let before = diagnostics.len();
            for declaration in self.program.declarations() {
                diagnostics.extend(self.analyse(declaration, phase)?);
            }
            tracing::debug!(?phase, diagnostics = diagnostics.len() - before, "phase complete");
        }
        Ok(diagnostics)
    }

    fn analyse(&self, declaration: Declaration, phase: Phase) -> InternalResult<Vec<Diagnostic>> {
        let program = self.program;
        match declaration {
            Declaration::Function(id) => program.function(id)?.semantic_analysis(phase, program),
            Declaration::Variable(id) => program.variable(id)?.semantic_analysis(phase, program),
            Declaration::Struct(id) => program.struct_(id)?.semantic_analysis(phase, program),
        }
    }
}
