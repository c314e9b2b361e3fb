//! Lexical contexts and name resolution.
//!
//! Contexts form a tree stored in one arena. Each context has at most one parent
//! and every chain ends at [`ContextId::EMPTY`], which resolves nothing:
//!
//! ```text
//! EMPTY
//!  └─ software                      whole program; knows every module by name
//!      └─ dotlin.lang               built-in types and operator functions
//!          └─ module                order-independent: all items see each other
//!              ├─ struct            member defaults are evaluated here
//!              └─ function          parameters
//!                  └─ binding       one layer per `val`/`var`, order-dependent
//!                      └─ block     nested `{ }`
//! ```
//!
//! Module contexts are appended to while declarations are collected. Inside a
//! function body a declaration never mutates a context that was already handed
//! out; it creates a new layer whose parent is the previous one, so statements
//! bound before the declaration cannot see it.

use dotlin_core::{TypeId, builtin_types};
use rustc_hash::FxHashMap;

use crate::ids::{ContextId, FunctionId, StructId, VariableId};

/// What syntactic unit a context was created for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextKind {
    /// The root; has no parent and resolves nothing.
    Empty,
    /// The whole program.
    Software,
    /// A source module (several files may share one).
    Module,
    /// A struct's member scope.
    Struct(StructId),
    /// A function's parameter scope; the purity boundary of its body.
    Function(FunctionId),
    /// A layer introduced by a local declaration.
    Binding,
    /// A nested block.
    Block,
}

/// A single scope.
#[derive(Debug)]
pub struct Context {
    kind: ContextKind,
    parent: Option<ContextId>,
    /// The module context this context belongs to.
    module: Option<ContextId>,
    /// Variables declared here, in declaration order.
    variables: Vec<VariableId>,
    variables_by_name: FxHashMap<String, VariableId>,
    functions: FxHashMap<String, Vec<FunctionId>>,
    types: FxHashMap<String, TypeId>,
    /// Module contexts made visible by `import` directives.
    imports: Vec<ContextId>,
}

impl Context {
    fn new(kind: ContextKind, parent: Option<ContextId>, module: Option<ContextId>) -> Self {
        Self {
            kind,
            parent,
            module,
            variables: Vec::new(),
            variables_by_name: FxHashMap::default(),
            functions: FxHashMap::default(),
            types: FxHashMap::default(),
            imports: Vec::new(),
        }
    }

    pub fn kind(&self) -> ContextKind {
        self.kind
    }

    pub fn parent(&self) -> Option<ContextId> {
        self.parent
    }

    /// The enclosing module context (itself, for a module).
    pub fn module(&self) -> Option<ContextId> {
        self.module
    }

    /// Variables declared directly in this context.
    pub fn variables(&self) -> &[VariableId] {
        &self.variables
    }

    /// Whether `variable` is declared directly in this context.
    pub fn declares(&self, variable: VariableId) -> bool {
        self.variables.contains(&variable)
    }

    pub fn imports(&self) -> &[ContextId] {
        &self.imports
    }
}

/// Arena of all contexts of one compilation.
#[derive(Debug)]
pub struct ContextArena {
    contexts: Vec<Context>,
    modules_by_name: FxHashMap<String, ContextId>,
}

impl Default for ContextArena {
    fn default() -> Self {
        Self::new()
    }
}

impl ContextArena {
    /// Create the arena holding the empty root, the software context and the
    /// (still empty) built-in module context.
    pub fn new() -> Self {
        let mut arena = Self {
            contexts: Vec::new(),
            modules_by_name: FxHashMap::default(),
        };
        let empty = arena.push(Context::new(ContextKind::Empty, None, None));
        let software = arena.push(Context::new(ContextKind::Software, Some(empty), None));
        let builtin = arena.push(Context::new(ContextKind::Module, Some(software), None));
        arena.contexts[builtin.index()].module = Some(builtin);
        arena
            .modules_by_name
            .insert(builtin_types::PACKAGE.join("."), builtin);

        debug_assert_eq!(empty, ContextId::EMPTY);
        debug_assert_eq!(software, ContextId::SOFTWARE);
        debug_assert_eq!(builtin, ContextId::BUILTIN);
        arena
    }

    fn push(&mut self, context: Context) -> ContextId {
        let id = ContextId::from_index(self.contexts.len());
        self.contexts.push(context);
        id
    }

    pub fn get(&self, id: ContextId) -> Option<&Context> {
        self.contexts.get(id.index())
    }

    pub fn len(&self) -> usize {
        self.contexts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contexts.is_empty()
    }

    // ==========================================================================
    // Construction
    // ==========================================================================

    /// Get or create the context of the module with the given dotted name.
    pub fn module_context(&mut self, dotted_name: &str, parent: ContextId) -> ContextId {
        if let Some(&existing) = self.modules_by_name.get(dotted_name) {
            return existing;
        }
        let id = self.push(Context::new(ContextKind::Module, Some(parent), None));
        self.contexts[id.index()].module = Some(id);
        self.modules_by_name.insert(dotted_name.to_string(), id);
        id
    }

    /// Find a module context by dotted name.
    pub fn find_module(&self, dotted_name: &str) -> Option<ContextId> {
        self.modules_by_name.get(dotted_name).copied()
    }

    /// Create a context beneath `parent`.
    pub fn derive(&mut self, parent: ContextId, kind: ContextKind) -> ContextId {
        let module = self.get(parent).and_then(|p| p.module);
        self.push(Context::new(kind, Some(parent), module))
    }

    /// Declare a variable. A name already declared in the same context keeps its
    /// first declaration visible.
    pub fn add_variable(&mut self, context: ContextId, name: &str, variable: VariableId) {
        let ctx = &mut self.contexts[context.index()];
        ctx.variables.push(variable);
        ctx.variables_by_name
            .entry(name.to_string())
            .or_insert(variable);
    }

    pub fn add_function(&mut self, context: ContextId, name: &str, function: FunctionId) {
        self.contexts[context.index()]
            .functions
            .entry(name.to_string())
            .or_default()
            .push(function);
    }

    pub fn add_type(&mut self, context: ContextId, name: &str, ty: TypeId) {
        self.contexts[context.index()]
            .types
            .entry(name.to_string())
            .or_insert(ty);
    }

    pub fn add_import(&mut self, context: ContextId, module: ContextId) {
        let imports = &mut self.contexts[context.index()].imports;
        if !imports.contains(&module) {
            imports.push(module);
        }
    }

    // ==========================================================================
    // Resolution
    // ==========================================================================

    /// The contexts from `context` up to the root, nearest first.
    pub fn chain(&self, context: ContextId) -> impl Iterator<Item = (ContextId, &Context)> + '_ {
        let mut current = Some(context);
        std::iter::from_fn(move || {
            let id = current?;
            let ctx = self.get(id)?;
            current = ctx.parent;
            Some((id, ctx))
        })
    }

    /// Module contexts imported anywhere along the chain of `context`.
    fn imported(&self, context: ContextId) -> Vec<ContextId> {
        let mut modules = Vec::new();
        for (_, ctx) in self.chain(context) {
            for &module in &ctx.imports {
                if !modules.contains(&module) {
                    modules.push(module);
                }
            }
        }
        modules
    }

    /// The variable visible under `name`, nearest declaration first.
    ///
    /// With `only_own` the search stays in `context` itself; otherwise it walks
    /// the parents and finally the imported modules.
    pub fn resolve_variable(&self, context: ContextId, name: &str, only_own: bool) -> Option<VariableId> {
        if only_own {
            return self.get(context)?.variables_by_name.get(name).copied();
        }
        self.chain(context)
            .find_map(|(_, ctx)| ctx.variables_by_name.get(name).copied())
            .or_else(|| {
                self.imported(context).into_iter().find_map(|module| {
                    self.get(module)
                        .and_then(|ctx| ctx.variables_by_name.get(name).copied())
                })
            })
    }

    /// Whether `variable` is declared in `context` or one of its ancestors up to and
    /// including `boundary`.
    ///
    /// A read or write of a variable for which this is false escapes the boundary.
    pub fn contains_within_boundary(
        &self,
        context: ContextId,
        variable: VariableId,
        boundary: ContextId,
    ) -> bool {
        for (id, ctx) in self.chain(context) {
            if ctx.declares(variable) {
                return true;
            }
            if id == boundary {
                return false;
            }
        }
        false
    }

    /// A type declared directly in `context`.
    pub fn resolve_defined_type(&self, context: ContextId, name: &str) -> Option<TypeId> {
        self.get(context)?.types.get(name).copied()
    }

    /// Functions declared directly in `context` under `name`.
    pub fn resolve_defined_functions(&self, context: ContextId, name: &str) -> &[FunctionId] {
        self.get(context)
            .and_then(|ctx| ctx.functions.get(name))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// The type visible under `name` through parents and imports.
    pub fn resolve_any_type(&self, context: ContextId, name: &str) -> Option<TypeId> {
        self.chain(context)
            .find_map(|(_, ctx)| ctx.types.get(name).copied())
            .or_else(|| {
                self.imported(context)
                    .into_iter()
                    .find_map(|module| self.resolve_defined_type(module, name))
            })
    }

    /// Every function visible under `name` through parents and imports, in
    /// declaration order.
    pub fn resolve_any_functions(&self, context: ContextId, name: &str) -> Vec<FunctionId> {
        let mut functions: Vec<FunctionId> = Vec::new();
        let scopes = self
            .chain(context)
            .map(|(id, _)| id)
            .chain(self.imported(context));
        for scope in scopes {
            for &function in self.resolve_defined_functions(scope, name) {
                if !functions.contains(&function) {
                    functions.push(function);
                }
            }
        }
        functions.sort();
        functions
    }
}

impl std::ops::Index<ContextId> for ContextArena {
    type Output = Context;

    fn index(&self, id: ContextId) -> &Context {
        &self.contexts[id.index()]
    }
}
