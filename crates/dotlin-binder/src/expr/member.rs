use dotlin_ast::MemberExpr;
use dotlin_core::{Diagnostic, InternalResult, SemanticError, Span, TypeRef};
use once_cell::unsync::OnceCell;

use crate::effects::{Effect, EffectAnalysis};
use crate::expr::BoundExpression;
use crate::ids::ContextId;
use crate::program::BoundProgram;
use crate::protocol::BoundNode;

/// `object.member` or `object?.member`.
#[derive(Debug)]
pub struct BoundMemberAccess<'ast> {
    context: ContextId,
    origin: &'ast MemberExpr<'ast>,
    object: BoundExpression<'ast>,
    ty: OnceCell<Option<TypeRef>>,
}

impl<'ast> BoundMemberAccess<'ast> {
    pub(crate) fn bind(origin: &'ast MemberExpr<'ast>, context: ContextId) -> InternalResult<Self> {
        Ok(Self {
            context,
            origin,
            object: BoundExpression::bind(origin.object, context)?,
            ty: OnceCell::new(),
        })
    }

    pub fn object(&self) -> &BoundExpression<'ast> {
        &self.object
    }

    pub fn member_name(&self) -> &'ast str {
        self.origin.member.name
    }

    pub fn is_null_safe(&self) -> bool {
        self.origin.null_safe
    }

    pub fn ty(&self) -> Option<TypeRef> {
        self.ty.get().copied().flatten()
    }

    fn resolve_member(
        &self,
        object_ty: TypeRef,
        program: &BoundProgram<'ast>,
    ) -> InternalResult<Result<Option<TypeRef>, SemanticError>> {
        let unknown = || SemanticError::UnknownMember {
            type_name: program.types().name_of(object_ty.base),
            member: self.member_name().to_string(),
            span: self.origin.member.span,
        };
        let Some(structure) = program.struct_for_type(object_ty.base)? else {
            return Ok(Err(unknown()));
        };
        if !structure.has_member(self.member_name()) {
            return Ok(Err(unknown()));
        }
        let member_ty = structure.member_type(self.member_name(), program);
        Ok(Ok(member_ty.map(|ty| if object_ty.nullable { ty.nullable() } else { ty })))
    }
}

/// Report `.` on a nullable value and `?.` on a non-nullable one.
pub(crate) fn check_traversal(object_ty: &TypeRef, null_safe: bool, span: Span) -> Option<SemanticError> {
    match (object_ty.nullable, null_safe) {
        (true, false) => Some(SemanticError::UnsafeObjectTraversal { span }),
        (false, true) => Some(SemanticError::SuperfluousSafeObjectTraversal { span }),
        _ => None,
    }
}

impl<'ast> BoundNode<'ast> for BoundMemberAccess<'ast> {
    fn context(&self) -> ContextId {
        self.context
    }

    fn span(&self) -> Span {
        self.origin.span
    }

    fn semantic_analysis_phase1(&self, program: &BoundProgram<'ast>) -> InternalResult<Vec<Diagnostic>> {
        self.object.semantic_analysis_phase1(program)
    }

    fn semantic_analysis_phase2(&self, program: &BoundProgram<'ast>) -> InternalResult<Vec<Diagnostic>> {
        let mut diagnostics = self.object.semantic_analysis_phase2(program)?;

        let Some(object_ty) = self.object.ty() else {
            let _ = self.ty.set(None);
            return Ok(diagnostics);
        };

        if let Some(err) = check_traversal(&object_ty, self.is_null_safe(), self.origin.span) {
            diagnostics.push(Diagnostic::error(err));
        }

        let ty = match self.resolve_member(object_ty, program)? {
            Ok(ty) => ty,
            Err(err) => {
                diagnostics.push(Diagnostic::error(err));
                None
            }
        };
        let _ = self.ty.set(ty);

        Ok(diagnostics)
    }

    fn semantic_analysis_phase3(&self, program: &BoundProgram<'ast>) -> InternalResult<Vec<Diagnostic>> {
        self.object.semantic_analysis_phase3(program)
    }
}

impl<'ast> EffectAnalysis<'ast> for BoundMemberAccess<'ast> {
    fn find_reads_beyond<'b>(
        &'b self,
        boundary: ContextId,
        program: &'b BoundProgram<'ast>,
    ) -> InternalResult<Vec<Effect<'b, 'ast>>> {
        self.object.find_reads_beyond(boundary, program)
    }

    fn find_writes_beyond<'b>(
        &'b self,
        boundary: ContextId,
        program: &'b BoundProgram<'ast>,
    ) -> InternalResult<Vec<Effect<'b, 'ast>>> {
        self.object.find_writes_beyond(boundary, program)
    }
}
