//! Bound expressions.
//!
//! A closed set of variants, one per expression kind. Operators are bound as
//! invocations of operator functions on their left (or only) operand, so binary
//! and unary expressions share [`BoundInvocation`] with ordinary calls.

mod identifier;
mod invocation;
mod literals;
mod member;

pub use identifier::{BoundIdentifier, Referral};
pub use invocation::{BoundInvocation, InvocationKind};
pub use literals::{BoundNullLiteral, BoundNumericLiteral};
pub use member::BoundMemberAccess;

use dotlin_ast::{Expr, ParenExpr};
use dotlin_core::{Diagnostic, InternalError, InternalResult, Span, TypeRef};

use crate::effects::{Effect, EffectAnalysis};
use crate::ids::ContextId;
use crate::program::BoundProgram;
use crate::protocol::BoundNode;

/// An expression with its resolved facts.
#[derive(Debug)]
pub enum BoundExpression<'ast> {
    Identifier(BoundIdentifier<'ast>),
    NumericLiteral(BoundNumericLiteral<'ast>),
    NullLiteral(BoundNullLiteral<'ast>),
    Invocation(Box<BoundInvocation<'ast>>),
    MemberAccess(Box<BoundMemberAccess<'ast>>),
    Paren(Box<BoundParen<'ast>>),
}

impl<'ast> BoundExpression<'ast> {
    /// Bind an expression in `context`.
    ///
    /// # Errors
    ///
    /// [`InternalError::InvalidInvocationTarget`] for an invocation whose target is
    /// neither an identifier nor a member access.
    pub fn bind(expr: &'ast Expr<'ast>, context: ContextId) -> InternalResult<Self> {
        Ok(match expr {
            Expr::Ident(ident) => BoundExpression::Identifier(BoundIdentifier::new(context, ident)),
            Expr::Literal(literal) => match literal.kind {
                dotlin_ast::LiteralKind::Null => {
                    BoundExpression::NullLiteral(BoundNullLiteral::new(context, literal))
                }
                _ => BoundExpression::NumericLiteral(BoundNumericLiteral::new(context, literal)),
            },
            Expr::Invocation(invocation) => {
                BoundExpression::Invocation(Box::new(BoundInvocation::bind_call(*invocation, context)?))
            }
            Expr::Binary(binary) => {
                BoundExpression::Invocation(Box::new(BoundInvocation::bind_binary(*binary, context)?))
            }
            Expr::Unary(unary) => {
                BoundExpression::Invocation(Box::new(BoundInvocation::bind_unary(*unary, context)?))
            }
            Expr::Member(member) => {
                BoundExpression::MemberAccess(Box::new(BoundMemberAccess::bind(*member, context)?))
            }
            Expr::Paren(paren) => BoundExpression::Paren(Box::new(BoundParen::bind(*paren, context)?)),
        })
    }

    /// The type of the expression; `None` until phase 2 and whenever it could not
    /// be determined.
    pub fn ty(&self) -> Option<TypeRef> {
        match self {
            BoundExpression::Identifier(e) => e.ty(),
            BoundExpression::NumericLiteral(e) => e.ty(),
            BoundExpression::NullLiteral(e) => e.ty(),
            BoundExpression::Invocation(e) => e.ty(),
            BoundExpression::MemberAccess(e) => e.ty(),
            BoundExpression::Paren(e) => e.inner.ty(),
        }
    }

    /// The variable this expression ultimately names, looking through member
    /// accesses and parentheses. Used to find what an assignment target mutates.
    pub fn root_identifier(&self) -> Option<&BoundIdentifier<'ast>> {
        match self {
            BoundExpression::Identifier(e) => Some(e),
            BoundExpression::MemberAccess(e) => e.object().root_identifier(),
            BoundExpression::Paren(e) => e.inner.root_identifier(),
            _ => None,
        }
    }

    fn node(&self) -> &dyn BoundNode<'ast> {
        match self {
            BoundExpression::Identifier(e) => e,
            BoundExpression::NumericLiteral(e) => e,
            BoundExpression::NullLiteral(e) => e,
            BoundExpression::Invocation(e) => e.as_ref(),
            BoundExpression::MemberAccess(e) => e.as_ref(),
            BoundExpression::Paren(e) => e.as_ref(),
        }
    }
}

impl<'ast> BoundNode<'ast> for BoundExpression<'ast> {
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

impl<'ast> EffectAnalysis<'ast> for BoundExpression<'ast> {
    fn find_reads_beyond<'b>(
        &'b self,
        boundary: ContextId,
        program: &'b BoundProgram<'ast>,
    ) -> InternalResult<Vec<Effect<'b, 'ast>>> {
        match self {
            BoundExpression::Identifier(e) => e.find_reads_beyond(boundary, program),
            BoundExpression::NumericLiteral(_) | BoundExpression::NullLiteral(_) => Ok(Vec::new()),
            BoundExpression::Invocation(e) => e.find_reads_beyond(boundary, program),
            BoundExpression::MemberAccess(e) => e.find_reads_beyond(boundary, program),
            BoundExpression::Paren(e) => e.inner.find_reads_beyond(boundary, program),
        }
    }

    fn find_writes_beyond<'b>(
        &'b self,
        boundary: ContextId,
        program: &'b BoundProgram<'ast>,
    ) -> InternalResult<Vec<Effect<'b, 'ast>>> {
        match self {
            BoundExpression::Identifier(_)
            | BoundExpression::NumericLiteral(_)
            | BoundExpression::NullLiteral(_) => Ok(Vec::new()),
            BoundExpression::Invocation(e) => e.find_writes_beyond(boundary, program),
            BoundExpression::MemberAccess(e) => e.find_writes_beyond(boundary, program),
            BoundExpression::Paren(e) => e.inner.find_writes_beyond(boundary, program),
        }
    }
}

/// A parenthesized expression; transparent to every analysis.
#[derive(Debug)]
pub struct BoundParen<'ast> {
    context: ContextId,
    origin: &'ast ParenExpr<'ast>,
    inner: BoundExpression<'ast>,
}

impl<'ast> BoundParen<'ast> {
    fn bind(origin: &'ast ParenExpr<'ast>, context: ContextId) -> InternalResult<Self> {
        Ok(Self {
            context,
            origin,
            inner: BoundExpression::bind(origin.expr, context)?,
        })
    }

    pub fn inner(&self) -> &BoundExpression<'ast> {
        &self.inner
    }
}

impl<'ast> BoundNode<'ast> for BoundParen<'ast> {
    fn context(&self) -> ContextId {
        self.context
    }

    fn span(&self) -> Span {
        self.origin.span
    }

    fn semantic_analysis_phase1(&self, program: &BoundProgram<'ast>) -> InternalResult<Vec<Diagnostic>> {
        self.inner.semantic_analysis_phase1(program)
    }

    fn semantic_analysis_phase2(&self, program: &BoundProgram<'ast>) -> InternalResult<Vec<Diagnostic>> {
        self.inner.semantic_analysis_phase2(program)
    }

    fn semantic_analysis_phase3(&self, program: &BoundProgram<'ast>) -> InternalResult<Vec<Diagnostic>> {
        self.inner.semantic_analysis_phase3(program)
    }
}

/// Reject an invocation target the parsing layer should never produce.
pub(crate) fn invalid_invocation_target(span: Span) -> InternalError {
    tracing::debug!(%span, "invocation target is neither identifier nor member access");
    InternalError::InvalidInvocationTarget { span }
}
