//! The bound program graph.
//!
//! Built once by the construction pass and frozen afterwards: the arenas are
//! never appended to again, so ids handed out stay valid and every derived fact
//! is recorded through the set-once cells inside the nodes.

use dotlin_core::{InternalError, InternalResult, TypeHierarchy, TypeId, TypeRef};
use rustc_hash::FxHashMap;

use crate::context::ContextArena;
use crate::function::BoundFunction;
use crate::ids::{ContextId, FunctionId, StructId, VariableId};
use crate::options::BinderOptions;
use crate::structs::BoundStruct;
use crate::type_resolver::TypeResolver;
use crate::variable::BoundVariable;

/// A module-level declaration, in source order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Declaration {
    Function(FunctionId),
    Variable(VariableId),
    Struct(StructId),
}

/// A bound module.
#[derive(Debug)]
pub struct BoundModule {
    pub name: String,
    pub context: ContextId,
    pub declarations: Vec<Declaration>,
}

/// Everything the binder produced for one compilation.
#[derive(Debug)]
pub struct BoundProgram<'ast> {
    pub(crate) options: BinderOptions,
    pub(crate) types: TypeHierarchy,
    pub(crate) contexts: ContextArena,
    pub(crate) functions: Vec<BoundFunction<'ast>>,
    pub(crate) variables: Vec<BoundVariable<'ast>>,
    pub(crate) structs: Vec<BoundStruct<'ast>>,
    pub(crate) struct_by_type: FxHashMap<TypeId, StructId>,
    pub(crate) modules: Vec<BoundModule>,
}

impl<'ast> BoundProgram<'ast> {
    pub(crate) fn new(options: BinderOptions) -> Self {
        Self {
            options,
            types: TypeHierarchy::with_builtins(),
            contexts: ContextArena::new(),
            functions: Vec::new(),
            variables: Vec::new(),
            structs: Vec::new(),
            struct_by_type: FxHashMap::default(),
            modules: Vec::new(),
        }
    }

    // ==========================================================================
    // Arenas
    // ==========================================================================

    pub fn options(&self) -> &BinderOptions {
        &self.options
    }

    pub fn types(&self) -> &TypeHierarchy {
        &self.types
    }

    pub fn contexts(&self) -> &ContextArena {
        &self.contexts
    }

    pub fn resolver(&self) -> TypeResolver<'_> {
        TypeResolver::new(&self.contexts, &self.types)
    }

    pub fn function(&self, id: FunctionId) -> InternalResult<&BoundFunction<'ast>> {
        self.functions
            .get(id.index())
            .ok_or_else(|| dangling("function", id.0))
    }

    pub fn variable(&self, id: VariableId) -> InternalResult<&BoundVariable<'ast>> {
        self.variables
            .get(id.index())
            .ok_or_else(|| dangling("variable", id.0))
    }

    pub fn struct_(&self, id: StructId) -> InternalResult<&BoundStruct<'ast>> {
        self.structs.get(id.index()).ok_or_else(|| dangling("struct", id.0))
    }

    pub fn functions(&self) -> &[BoundFunction<'ast>] {
        &self.functions
    }

    pub fn variables(&self) -> &[BoundVariable<'ast>] {
        &self.variables
    }

    pub fn structs(&self) -> &[BoundStruct<'ast>] {
        &self.structs
    }

    pub fn modules(&self) -> &[BoundModule] {
        &self.modules
    }

    /// Module-level declarations of every module, in source order.
    pub fn declarations(&self) -> impl Iterator<Item = Declaration> + '_ {
        self.modules
            .iter()
            .flat_map(|module| module.declarations.iter().copied())
    }

    /// Declared (non-builtin) functions named `name`, across all modules.
    pub fn find_functions<'p>(&'p self, name: &str) -> impl Iterator<Item = &'p BoundFunction<'ast>> {
        self.declarations().filter_map(move |declaration| match declaration {
            Declaration::Function(id) => self.function(id).ok().filter(|f| f.name() == name),
            _ => None,
        })
    }

    // ==========================================================================
    // Derived facts
    // ==========================================================================

    /// The type of a variable, analysing its declaration on demand.
    pub fn variable_type(&self, id: VariableId) -> InternalResult<Option<TypeRef>> {
        self.variable(id)?.ty(self)
    }

    /// The declared or inferred return type of a function.
    pub fn return_type(&self, id: FunctionId) -> InternalResult<Option<TypeRef>> {
        self.function(id)?.return_type(self)
    }

    /// Whether a function reads nothing beyond its own scope; `None` while this is
    /// being established further up the stack.
    pub fn is_pure(&self, id: FunctionId) -> InternalResult<Option<bool>> {
        self.function(id)?.is_pure(self)
    }

    /// Whether a function writes nothing beyond its own scope.
    pub fn is_readonly(&self, id: FunctionId) -> InternalResult<Option<bool>> {
        self.function(id)?.is_readonly(self)
    }

    /// The struct declaring `ty`, if `ty` is a struct type.
    pub fn struct_for_type(&self, ty: TypeId) -> InternalResult<Option<&BoundStruct<'ast>>> {
        self.struct_by_type
            .get(&ty)
            .map(|&id| self.struct_(id))
            .transpose()
    }
}

fn dangling(kind: &'static str, index: u32) -> InternalError {
    InternalError::DanglingId { kind, index }
}
