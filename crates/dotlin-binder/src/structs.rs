//! Bound struct declarations.

use dotlin_ast::{StructDecl, StructMemberDecl};
use dotlin_core::{Diagnostic, InternalResult, SemanticError, Span, TypeId, TypeRef};
use once_cell::unsync::OnceCell;
use rustc_hash::FxHashMap;

use crate::effects::{Effect, EffectAnalysis};
use crate::expr::BoundExpression;
use crate::ids::{ContextId, StructId};
use crate::memo::{Phase, PhaseCache};
use crate::program::BoundProgram;
use crate::protocol::BoundNode;

/// A member of a struct.
#[derive(Debug)]
pub struct BoundStructMember<'ast> {
    origin: &'ast StructMemberDecl<'ast>,
    default: Option<BoundExpression<'ast>>,
    ty: OnceCell<Result<TypeRef, SemanticError>>,
}

impl<'ast> BoundStructMember<'ast> {
    pub(crate) fn new(origin: &'ast StructMemberDecl<'ast>, default: Option<BoundExpression<'ast>>) -> Self {
        Self {
            origin,
            default,
            ty: OnceCell::new(),
        }
    }

    pub fn name(&self) -> &'ast str {
        self.origin.name.name
    }

    pub fn default(&self) -> Option<&BoundExpression<'ast>> {
        self.default.as_ref()
    }

    fn resolved(&self, context: ContextId, program: &BoundProgram<'ast>) -> &Result<TypeRef, SemanticError> {
        self.ty
            .get_or_init(|| program.resolver().resolve(context, &self.origin.ty))
    }
}

/// A struct and its members. The struct's own context is the scope of the
/// member defaults and the boundary for their effects.
#[derive(Debug)]
pub struct BoundStruct<'ast> {
    id: StructId,
    origin: &'ast StructDecl<'ast>,
    ty: TypeId,
    context: ContextId,
    members: Vec<BoundStructMember<'ast>>,
    phases: PhaseCache,
}

impl<'ast> BoundStruct<'ast> {
    pub(crate) fn new(
        id: StructId,
        origin: &'ast StructDecl<'ast>,
        ty: TypeId,
        context: ContextId,
        members: Vec<BoundStructMember<'ast>>,
    ) -> Self {
        Self {
            id,
            origin,
            ty,
            context,
            members,
            phases: PhaseCache::default(),
        }
    }

    pub fn id(&self) -> StructId {
        self.id
    }

    pub fn name(&self) -> &'ast str {
        self.origin.name.name
    }

    /// The type this struct declares.
    pub fn ty(&self) -> TypeId {
        self.ty
    }

    pub fn members(&self) -> &[BoundStructMember<'ast>] {
        &self.members
    }

    pub fn has_member(&self, name: &str) -> bool {
        self.members.iter().any(|member| member.name() == name)
    }

    /// The resolved type of the first member named `name`.
    pub fn member_type(&self, name: &str, program: &BoundProgram<'ast>) -> Option<TypeRef> {
        let member = self.members.iter().find(|member| member.name() == name)?;
        member.resolved(self.context, program).as_ref().ok().copied()
    }

    /// One diagnostic per duplicated name, located at its second declaration.
    fn duplicate_members(&self) -> Vec<Diagnostic> {
        let mut counts: FxHashMap<&str, (usize, Option<Span>)> = FxHashMap::default();
        let mut order = Vec::new();
        for member in &self.members {
            let entry = counts.entry(member.name()).or_insert_with(|| {
                order.push(member.name());
                (0, None)
            });
            entry.0 += 1;
            if entry.0 == 2 {
                entry.1 = Some(member.origin.span);
            }
        }

        order
            .into_iter()
            .filter_map(|name| {
                let &(count, span) = counts.get(name)?;
                let span = span?;
                Some(Diagnostic::error(SemanticError::DuplicateTypeMembers {
                    struct_name: self.name().to_string(),
                    member: name.to_string(),
                    count,
                    span,
                }))
            })
            .collect()
    }

    fn analyse_defaults(&self, phase: Phase, program: &BoundProgram<'ast>) -> InternalResult<Vec<Diagnostic>> {
        let mut diagnostics = Vec::new();
        for default in self.members.iter().filter_map(BoundStructMember::default) {
            diagnostics.extend(default.semantic_analysis(phase, program)?);
        }
        Ok(diagnostics)
    }
}

impl<'ast> BoundNode<'ast> for BoundStruct<'ast> {
    fn context(&self) -> ContextId {
        self.context
    }

    fn span(&self) -> Span {
        self.origin.span
    }

    fn semantic_analysis_phase1(&self, program: &BoundProgram<'ast>) -> InternalResult<Vec<Diagnostic>> {
        let diagnostics = self.phases.run(Phase::One, || {
            let mut diagnostics = self.duplicate_members();
            for member in &self.members {
                if let Err(err) = member.resolved(self.context, program) {
                    diagnostics.push(Diagnostic::error(err.clone()));
                }
            }
            diagnostics.extend(self.analyse_defaults(Phase::One, program)?);
            Ok(diagnostics)
        })?;
        Ok(diagnostics.unwrap_or_default())
    }

    fn semantic_analysis_phase2(&self, program: &BoundProgram<'ast>) -> InternalResult<Vec<Diagnostic>> {
        let diagnostics = self
            .phases
            .run(Phase::Two, || self.analyse_defaults(Phase::Two, program))?;
        Ok(diagnostics.unwrap_or_default())
    }

    fn semantic_analysis_phase3(&self, program: &BoundProgram<'ast>) -> InternalResult<Vec<Diagnostic>> {
        let diagnostics = self
            .phases
            .run(Phase::Three, || self.analyse_defaults(Phase::Three, program))?;
        Ok(diagnostics.unwrap_or_default())
    }
}

impl<'ast> EffectAnalysis<'ast> for BoundStruct<'ast> {
    /// Reads of the member defaults beyond the struct's own context. The
    /// `boundary` argument is ignored: defaults are evaluated in that context
    /// wherever the struct is instantiated.
    fn find_reads_beyond<'b>(
        &'b self,
        _boundary: ContextId,
        program: &'b BoundProgram<'ast>,
    ) -> InternalResult<Vec<Effect<'b, 'ast>>> {
        let mut effects = Vec::new();
        for default in self.members.iter().filter_map(BoundStructMember::default) {
            effects.extend(default.find_reads_beyond(self.context, program)?);
        }
        Ok(effects)
    }

    fn find_writes_beyond<'b>(
        &'b self,
        _boundary: ContextId,
        program: &'b BoundProgram<'ast>,
    ) -> InternalResult<Vec<Effect<'b, 'ast>>> {
        let mut effects = Vec::new();
        for default in self.members.iter().filter_map(BoundStructMember::default) {
            effects.extend(default.find_writes_beyond(self.context, program)?);
        }
        Ok(effects)
    }
}
