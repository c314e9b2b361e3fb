//! Binder entry point.
//!
//! ```text
//! &[&Module] ──► ConstructionPass ──► BoundProgram ──► AnalysisPass ──► BindOutput
//!                 (contexts, nodes)      (frozen)        (phase 1..3)
//! ```
//!
//! Diagnostics are reported in a fixed order: everything the parsing layer
//! forwarded, then construction findings, then the phases.

use dotlin_ast::Module;
use dotlin_core::{Diagnostic, Diagnostics, InternalResult};

use crate::options::BinderOptions;
use crate::passes::{AnalysisPass, ConstructionPass};
use crate::program::BoundProgram;

/// Result of binding a compilation.
#[derive(Debug)]
pub struct BindOutput<'ast> {
    /// The analysed program; every fact a phase established is readable from it.
    pub program: BoundProgram<'ast>,
    pub diagnostics: Diagnostics,
}

impl BindOutput<'_> {
    /// Whether any error was reported.
    pub fn has_errors(&self) -> bool {
        self.diagnostics.has_errors()
    }
}

/// Binds declaration trees into an analysed program.
#[derive(Debug, Default, Clone, Copy)]
pub struct Binder {
    options: BinderOptions,
}

impl Binder {
    pub fn new(options: BinderOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &BinderOptions {
        &self.options
    }

    /// Bind and analyse all modules of one compilation.
    ///
    /// Semantic problems end up in the returned diagnostics; an `Err` means the
    /// declaration tree itself was malformed.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn bind<'ast>(&self, modules: &[&'ast Module<'ast>]) -> InternalResult<BindOutput<'ast>> {
        let mut diagnostics = Diagnostics::new();
        for module in modules {
            diagnostics.extend(
                module
                    .parse_diagnostics
                    .iter()
                    .map(|d| Diagnostic::forwarded(d.severity, d.message, d.span)),
            );
        }

        let construction = ConstructionPass::new(self.options).run(modules)?;
        diagnostics.extend(construction.diagnostics);

        let program = construction.program;
        diagnostics.extend(AnalysisPass::new(&program).run()?);

        tracing::debug!(
            modules = modules.len(),
            diagnostics = diagnostics.len(),
            errors = diagnostics.errors().count(),
            "binding complete"
        );

        Ok(BindOutput {
            program,
            diagnostics,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bumpalo::Bump;
    use dotlin_ast::AstBuilder;
    use dotlin_core::{SemanticError, Severity};

    #[test]
    fn empty_compilation_binds_cleanly() {
        let output = Binder::default().bind(&[]).unwrap();
        assert!(output.diagnostics.is_empty());
        assert!(output.program.modules().is_empty());
    }

    #[test]
    fn parse_diagnostics_come_first() {
        let arena = Bump::new();
        let ast = AstBuilder::new(&arena);
        let module = ast.module_with_diagnostics(
            "app",
            &[ast.import("nowhere")],
            &[],
            &[(Severity::Warning, "missing newline")],
        );

        let output = Binder::default().bind(&[module]).unwrap();
        let diagnostics: Vec<_> = output.diagnostics.iter().collect();
        assert_eq!(diagnostics.len(), 2);
        assert!(matches!(diagnostics[0].error, SemanticError::Forwarded { .. }));
        assert_eq!(diagnostics[0].severity, Severity::Warning);
        assert!(matches!(diagnostics[1].error, SemanticError::UnresolvedImport { .. }));
        assert!(output.has_errors());
    }
}
