//! Bound statements.
//!
//! Statements are bound by the construction pass, which also derives the context
//! layers: every `val`/`var` opens a new binding context for the statements after
//! it, and every nested block opens a block context.

mod assignment;

pub use assignment::BoundAssignment;

use dotlin_ast::{ExprStmt, IfStmt, ReturnStmt, VariableDecl};
use dotlin_core::{Diagnostic, InternalResult, Span};

use crate::effects::{Effect, EffectAnalysis};
use crate::expr::BoundExpression;
use crate::ids::{ContextId, VariableId};
use crate::memo::Phase;
use crate::program::BoundProgram;
use crate::protocol::{BoundNode, analyse_all};

/// A statement with its resolved facts.
#[derive(Debug)]
pub enum BoundStatement<'ast> {
    Expression(BoundExpressionStatement<'ast>),
    VariableDeclaration(BoundVariableDeclaration<'ast>),
    Assignment(BoundAssignment<'ast>),
    Return(BoundReturn<'ast>),
    If(Box<BoundIf<'ast>>),
    Block(BoundBlock<'ast>),
}

impl<'ast> BoundStatement<'ast> {
    fn node(&self) -> &dyn BoundNode<'ast> {
        match self {
            BoundStatement::Expression(s) => s,
            BoundStatement::VariableDeclaration(s) => s,
            BoundStatement::Assignment(s) => s,
            BoundStatement::Return(s) => s,
            BoundStatement::If(s) => s.as_ref(),
            BoundStatement::Block(s) => s,
        }
    }

    fn effects(&self) -> &dyn EffectAnalysis<'ast> {
        match self {
            BoundStatement::Expression(s) => s,
            BoundStatement::VariableDeclaration(s) => s,
            BoundStatement::Assignment(s) => s,
            BoundStatement::Return(s) => s,
            BoundStatement::If(s) => s.as_ref(),
            BoundStatement::Block(s) => s,
        }
    }

    fn collect_returns<'s>(&'s self, returns: &mut Vec<&'s BoundReturn<'ast>>) {
        match self {
            BoundStatement::Return(ret) => returns.push(ret),
            BoundStatement::If(branch) => {
                branch.then_branch.collect_returns(returns);
                if let Some(else_branch) = &branch.else_branch {
                    else_branch.collect_returns(returns);
                }
            }
            BoundStatement::Block(block) => block.collect_returns(returns),
            _ => {}
        }
    }
}

impl<'ast> BoundNode<'ast> for BoundStatement<'ast> {
    fn context(&self) -> ContextId {
        self.node().context()
    }

    fn span(&self) -> Span {
        self.node().span()
    }

    fn semantic_analysis_phase1(&self, program: &BoundProgram<'ast>) -> InternalResult<Vec<Diagnostic>> {
        self.node().semantic_analysis_phase1(program)
    }

    fn semantic_analysis_phase2(&self, program: &BoundProgram<'ast>) -> InternalResult<Vec<Diagnostic>> {
        self.node().semantic_analysis_phase2(program)
    }

    fn semantic_analysis_phase3(&self, program: &BoundProgram<'ast>) -> InternalResult<Vec<Diagnostic>> {
        self.node().semantic_analysis_phase3(program)
    }
}

impl<'ast> EffectAnalysis<'ast> for BoundStatement<'ast> {
    fn find_reads_beyond<'b>(
        &'b self,
        boundary: ContextId,
        program: &'b BoundProgram<'ast>,
    ) -> InternalResult<Vec<Effect<'b, 'ast>>> {
        self.effects().find_reads_beyond(boundary, program)
    }

    fn find_writes_beyond<'b>(
        &'b self,
        boundary: ContextId,
        program: &'b BoundProgram<'ast>,
    ) -> InternalResult<Vec<Effect<'b, 'ast>>> {
        self.effects().find_writes_beyond(boundary, program)
    }
}

/// Implement [`BoundNode`] for a statement whose phases only recurse into the
/// listed child expressions and blocks.
macro_rules! recursive_node {
    ($ty:ident, |$this:ident| $children:expr) => {
        impl<'ast> BoundNode<'ast> for $ty<'ast> {
            fn context(&self) -> ContextId {
                self.context
            }

            fn span(&self) -> Span {
                self.origin.span
            }

            fn semantic_analysis_phase1(&self, program: &BoundProgram<'ast>) -> InternalResult<Vec<Diagnostic>> {
                let $this = self;
                analyse_all($children, Phase::One, program)
            }

            fn semantic_analysis_phase2(&self, program: &BoundProgram<'ast>) -> InternalResult<Vec<Diagnostic>> {
                let $this = self;
                analyse_all($children, Phase::Two, program)
            }

            fn semantic_analysis_phase3(&self, program: &BoundProgram<'ast>) -> InternalResult<Vec<Diagnostic>> {
                let $this = self;
                analyse_all($children, Phase::Three, program)
            }
        }
    };
}

/// Union of the effects of several nodes.
fn union_of<'b, 'ast: 'b, N: EffectAnalysis<'ast> + 'b>(
    nodes: impl IntoIterator<Item = &'b N>,
    reads: bool,
    boundary: ContextId,
    program: &'b BoundProgram<'ast>,
) -> InternalResult<Vec<Effect<'b, 'ast>>> {
    let mut effects = Vec::new();
    for node in nodes {
        if reads {
            effects.extend(node.find_reads_beyond(boundary, program)?);
        } else {
            effects.extend(node.find_writes_beyond(boundary, program)?);
        }
    }
    Ok(effects)
}

// ============================================================================
// Expression statement
// ============================================================================

/// An expression evaluated for its effects.
#[derive(Debug)]
pub struct BoundExpressionStatement<'ast> {
    context: ContextId,
    origin: &'ast ExprStmt<'ast>,
    expression: BoundExpression<'ast>,
}

impl<'ast> BoundExpressionStatement<'ast> {
    pub(crate) fn new(context: ContextId, origin: &'ast ExprStmt<'ast>, expression: BoundExpression<'ast>) -> Self {
        Self {
            context,
            origin,
            expression,
        }
    }

    pub fn expression(&self) -> &BoundExpression<'ast> {
        &self.expression
    }
}

recursive_node!(BoundExpressionStatement, |this| std::iter::once(&this.expression));

impl<'ast> EffectAnalysis<'ast> for BoundExpressionStatement<'ast> {
    fn find_reads_beyond<'b>(
        &'b self,
        boundary: ContextId,
        program: &'b BoundProgram<'ast>,
    ) -> InternalResult<Vec<Effect<'b, 'ast>>> {
        self.expression.find_reads_beyond(boundary, program)
    }

    fn find_writes_beyond<'b>(
        &'b self,
        boundary: ContextId,
        program: &'b BoundProgram<'ast>,
    ) -> InternalResult<Vec<Effect<'b, 'ast>>> {
        self.expression.find_writes_beyond(boundary, program)
    }
}

// ============================================================================
// Local variable declaration
// ============================================================================

/// `val`/`var` inside a body. The variable itself lives in the program's
/// variable arena; this node forwards to it.
#[derive(Debug)]
pub struct BoundVariableDeclaration<'ast> {
    context: ContextId,
    origin: &'ast VariableDecl<'ast>,
    variable: VariableId,
}

impl<'ast> BoundVariableDeclaration<'ast> {
    pub(crate) fn new(context: ContextId, origin: &'ast VariableDecl<'ast>, variable: VariableId) -> Self {
        Self {
            context,
            origin,
            variable,
        }
    }

    pub fn variable(&self) -> VariableId {
        self.variable
    }
}

impl<'ast> BoundNode<'ast> for BoundVariableDeclaration<'ast> {
    fn context(&self) -> ContextId {
        self.context
    }

    fn span(&self) -> Span {
        self.origin.span
    }

    fn semantic_analysis_phase1(&self, program: &BoundProgram<'ast>) -> InternalResult<Vec<Diagnostic>> {
        program.variable(self.variable)?.semantic_analysis_phase1(program)
    }

    fn semantic_analysis_phase2(&self, program: &BoundProgram<'ast>) -> InternalResult<Vec<Diagnostic>> {
        program.variable(self.variable)?.semantic_analysis_phase2(program)
    }

    fn semantic_analysis_phase3(&self, program: &BoundProgram<'ast>) -> InternalResult<Vec<Diagnostic>> {
        program.variable(self.variable)?.semantic_analysis_phase3(program)
    }
}

impl<'ast> EffectAnalysis<'ast> for BoundVariableDeclaration<'ast> {
    fn find_reads_beyond<'b>(
        &'b self,
        boundary: ContextId,
        program: &'b BoundProgram<'ast>,
    ) -> InternalResult<Vec<Effect<'b, 'ast>>> {
        program.variable(self.variable)?.find_reads_beyond(boundary, program)
    }

    fn find_writes_beyond<'b>(
        &'b self,
        boundary: ContextId,
        program: &'b BoundProgram<'ast>,
    ) -> InternalResult<Vec<Effect<'b, 'ast>>> {
        program.variable(self.variable)?.find_writes_beyond(boundary, program)
    }
}

// ============================================================================
// Return
// ============================================================================

/// `return` with or without value.
#[derive(Debug)]
pub struct BoundReturn<'ast> {
    context: ContextId,
    origin: &'ast ReturnStmt<'ast>,
    value: Option<BoundExpression<'ast>>,
}

impl<'ast> BoundReturn<'ast> {
    pub(crate) fn new(context: ContextId, origin: &'ast ReturnStmt<'ast>, value: Option<BoundExpression<'ast>>) -> Self {
        Self {
            context,
            origin,
            value,
        }
    }

    pub fn value(&self) -> Option<&BoundExpression<'ast>> {
        self.value.as_ref()
    }
}

recursive_node!(BoundReturn, |this| this.value.iter());

impl<'ast> EffectAnalysis<'ast> for BoundReturn<'ast> {
    fn find_reads_beyond<'b>(
        &'b self,
        boundary: ContextId,
        program: &'b BoundProgram<'ast>,
    ) -> InternalResult<Vec<Effect<'b, 'ast>>> {
        union_of(self.value.iter(), true, boundary, program)
    }

    fn find_writes_beyond<'b>(
        &'b self,
        boundary: ContextId,
        program: &'b BoundProgram<'ast>,
    ) -> InternalResult<Vec<Effect<'b, 'ast>>> {
        union_of(self.value.iter(), false, boundary, program)
    }
}

// ============================================================================
// If
// ============================================================================

/// `if (condition) { .. } else { .. }`
#[derive(Debug)]
pub struct BoundIf<'ast> {
    context: ContextId,
    origin: &'ast IfStmt<'ast>,
    condition: BoundExpression<'ast>,
    then_branch: BoundBlock<'ast>,
    else_branch: Option<BoundBlock<'ast>>,
}

impl<'ast> BoundIf<'ast> {
    pub(crate) fn new(
        context: ContextId,
        origin: &'ast IfStmt<'ast>,
        condition: BoundExpression<'ast>,
        then_branch: BoundBlock<'ast>,
        else_branch: Option<BoundBlock<'ast>>,
    ) -> Self {
        Self {
            context,
            origin,
            condition,
            then_branch,
            else_branch,
        }
    }

    pub fn condition(&self) -> &BoundExpression<'ast> {
        &self.condition
    }

    pub fn then_branch(&self) -> &BoundBlock<'ast> {
        &self.then_branch
    }

    pub fn else_branch(&self) -> Option<&BoundBlock<'ast>> {
        self.else_branch.as_ref()
    }

    fn analyse(&self, phase: Phase, program: &BoundProgram<'ast>) -> InternalResult<Vec<Diagnostic>> {
        let mut diagnostics = self.condition.semantic_analysis(phase, program)?;
        diagnostics.extend(self.then_branch.semantic_analysis(phase, program)?);
        if let Some(else_branch) = &self.else_branch {
            diagnostics.extend(else_branch.semantic_analysis(phase, program)?);
        }
        Ok(diagnostics)
    }

    fn union<'b>(
        &'b self,
        reads: bool,
        boundary: ContextId,
        program: &'b BoundProgram<'ast>,
    ) -> InternalResult<Vec<Effect<'b, 'ast>>> {
        let mut effects = union_of(std::iter::once(&self.condition), reads, boundary, program)?;
        effects.extend(union_of(
            std::iter::once(&self.then_branch).chain(self.else_branch.iter()),
            reads,
            boundary,
            program,
        )?);
        Ok(effects)
    }
}

impl<'ast> BoundNode<'ast> for BoundIf<'ast> {
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
        self.analyse(Phase::Two, program)
    }

    fn semantic_analysis_phase3(&self, program: &BoundProgram<'ast>) -> InternalResult<Vec<Diagnostic>> {
        self.analyse(Phase::Three, program)
    }
}

impl<'ast> EffectAnalysis<'ast> for BoundIf<'ast> {
    fn find_reads_beyond<'b>(
        &'b self,
        boundary: ContextId,
        program: &'b BoundProgram<'ast>,
    ) -> InternalResult<Vec<Effect<'b, 'ast>>> {
        self.union(true, boundary, program)
    }

    fn find_writes_beyond<'b>(
        &'b self,
        boundary: ContextId,
        program: &'b BoundProgram<'ast>,
    ) -> InternalResult<Vec<Effect<'b, 'ast>>> {
        self.union(false, boundary, program)
    }
}

// ============================================================================
// Block
// ============================================================================

/// A sequence of statements. `context` is the block's own context; statements
/// after a declaration carry the binding context that declaration opened.
#[derive(Debug)]
pub struct BoundBlock<'ast> {
    context: ContextId,
    span: Span,
    statements: Vec<BoundStatement<'ast>>,
}

impl<'ast> BoundBlock<'ast> {
    pub(crate) fn new(context: ContextId, span: Span, statements: Vec<BoundStatement<'ast>>) -> Self {
        Self {
            context,
            span,
            statements,
        }
    }

    pub fn statements(&self) -> &[BoundStatement<'ast>] {
        &self.statements
    }

    /// Every `return` in the block, including nested branches, in source order.
    pub fn returns(&self) -> Vec<&BoundReturn<'ast>> {
        let mut returns = Vec::new();
        self.collect_returns(&mut returns);
        returns
    }

    fn collect_returns<'s>(&'s self, returns: &mut Vec<&'s BoundReturn<'ast>>) {
        for statement in &self.statements {
            statement.collect_returns(returns);
        }
    }
}

impl<'ast> BoundNode<'ast> for BoundBlock<'ast> {
    fn context(&self) -> ContextId {
        self.context
    }

    fn span(&self) -> Span {
        self.span
    }

    fn semantic_analysis_phase1(&self, program: &BoundProgram<'ast>) -> InternalResult<Vec<Diagnostic>> {
        analyse_all(&self.statements, Phase::One, program)
    }

    fn semantic_analysis_phase2(&self, program: &BoundProgram<'ast>) -> InternalResult<Vec<Diagnostic>> {
        analyse_all(&self.statements, Phase::Two, program)
    }

    fn semantic_analysis_phase3(&self, program: &BoundProgram<'ast>) -> InternalResult<Vec<Diagnostic>> {
        analyse_all(&self.statements, Phase::Three, program)
    }
}

impl<'ast> EffectAnalysis<'ast> for BoundBlock<'ast> {
    fn find_reads_beyond<'b>(
        &'b self,
        boundary: ContextId,
        program: &'b BoundProgram<'ast>,
    ) -> InternalResult<Vec<Effect<'b, 'ast>>> {
        union_of(&self.statements, true, boundary, program)
    }

    fn find_writes_beyond<'b>(
        &'b self,
        boundary: ContextId,
        program: &'b BoundProgram<'ast>,
    ) -> InternalResult<Vec<Effect<'b, 'ast>>> {
        union_of(&self.statements, false, boundary, program)
    }
}

#[cfg(test)]
mod tests {
    use bumpalo::Bump;
    use dotlin_ast::AstBuilder;

    use crate::options::BinderOptions;
    use crate::passes::ConstructionPass;
    use crate::protocol::BoundNode;

    #[test]
    fn returns_include_nested_branches_in_order() {
        let arena = Bump::new();
        let ast = AstBuilder::new(&arena);
        let then_branch = [ast.ret(ast.int(1))];
        let else_branch = [ast.block_stmt(&[ast.ret(ast.int(2))])];
        let f = ast
            .fun("f")
            .param("flag", "Boolean")
            .body(&[
                ast.if_(ast.name("flag"), &then_branch, Some(&else_branch[..])),
                ast.ret(ast.int(3)),
            ])
            .build();
        let module = ast.module("app", &[], &[f]);
        let program = ConstructionPass::new(BinderOptions::default())
            .run(&[module])
            .unwrap()
            .program;

        let body = program.functions().last().unwrap().body().unwrap();
        let spans: Vec<_> = body.returns().iter().map(|ret| ret.span().line).collect();
        assert_eq!(spans.len(), 3);
        assert!(spans.windows(2).all(|pair| pair[0] < pair[1]));
    }
}
