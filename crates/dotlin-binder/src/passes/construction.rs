//! Construction pass: build the bound program graph.
//!
//! Walks the declaration trees once and creates every context, declaration and
//! bound node. Nothing is resolved here beyond what shapes the graph itself:
//! import targets and struct supertypes.
//!
//! ## Steps
//!
//! 1. Instantiate the built-in module under [`ContextId::BUILTIN`]
//! 2. Declare every module-level item, so siblings see each other regardless of order
//! 3. Resolve imports
//! 4. Seal struct supertypes, rejecting edges that would close a cycle
//! 5. Bind function bodies, deriving one context layer per local declaration
//!
//! ```text
//! EMPTY
//!   └─ SOFTWARE
//!        └─ BUILTIN (dotlin.lang)
//!             ├─ module app.main
//!             └─ module app.util
//! ```

use dotlin_ast::{Block, FunctionDecl, Item, Module, Stmt, StructDecl};
use dotlin_core::{Diagnostic, InternalResult, QualifiedName, SemanticError, TypeId, builtin_types};

use crate::builtins::{BUILTIN_FUNCTIONS, BUILTIN_TYPE_NAMES};
use crate::context::ContextKind;
use crate::expr::BoundExpression;
use crate::function::{BoundFunction, FunctionOrigin};
use crate::ids::{ContextId, FunctionId, StructId, VariableId};
use crate::options::BinderOptions;
use crate::program::{BoundModule, BoundProgram, Declaration};
use crate::protocol::BoundNode;
use crate::stmt::{
    BoundAssignment, BoundBlock, BoundExpressionStatement, BoundIf, BoundReturn, BoundStatement,
    BoundVariableDeclaration,
};
use crate::structs::{BoundStruct, BoundStructMember};
use crate::variable::{BoundVariable, VariableOrigin};

/// Output of the construction pass.
#[derive(Debug)]
pub struct ConstructionOutput<'ast> {
    pub program: BoundProgram<'ast>,
    /// Unresolved imports and rejected supertypes.
    pub diagnostics: Vec<Diagnostic>,
}

/// A struct whose supertypes are attached once every type is declared.
struct PendingSupertypes<'ast> {
    ty: TypeId,
    module: ContextId,
    decl: &'ast StructDecl<'ast>,
}

/// Builds the bound program graph.
pub struct ConstructionPass<'ast> {
    program: BoundProgram<'ast>,
    diagnostics: Vec<Diagnostic>,
    pending_supertypes: Vec<PendingSupertypes<'ast>>,
    pending_bodies: Vec<(FunctionId, &'ast FunctionDecl<'ast>)>,
}

impl<'ast> ConstructionPass<'ast> {
    pub fn new(options: BinderOptions) -> Self {
        Self {
            program: BoundProgram::new(options),
            diagnostics: Vec::new(),
            pending_supertypes: Vec::new(),
            pending_bodies: Vec::new(),
        }
    }

    /// Run the pass over all modules of the compilation.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn run(mut self, modules: &[&'ast Module<'ast>]) -> InternalResult<ConstructionOutput<'ast>> {
        self.instantiate_builtins();

        let parent = if self.program.options.implicit_builtin_import {
            ContextId::BUILTIN
        } else {
            ContextId::SOFTWARE
        };
        let mut module_contexts = Vec::with_capacity(modules.len());
        for &module in modules {
            let name = module.dotted_name();
            let context = self.program.contexts.module_context(&name, parent);
            let declarations = self.declare_items(module, context)?;
            self.program.modules.push(BoundModule {
                name,
                context,
                declarations,
            });
            module_contexts.push(context);
        }

        for (module, &context) in modules.iter().zip(&module_contexts) {
            self.resolve_imports(module, context);
        }

        self.seal_supertypes()?;

        for (function, decl) in std::mem::take(&mut self.pending_bodies) {
            self.bind_function_body(function, decl)?;
        }

        tracing::debug!(
            modules = modules.len(),
            functions = self.program.functions.len(),
            variables = self.program.variables.len(),
            structs = self.program.structs.len(),
            contexts = self.program.contexts.len(),
            "constructed bound program"
        );

        Ok(ConstructionOutput {
            program: self.program,
            diagnostics: self.diagnostics,
        })
    }

    // ==========================================================================
    // Built-in module
    // ==========================================================================

    fn instantiate_builtins(&mut self) {
        for (index, name) in BUILTIN_TYPE_NAMES.iter().enumerate() {
            self.program
                .contexts
                .add_type(ContextId::BUILTIN, name, TypeId(index as u32));
        }

        for builtin in BUILTIN_FUNCTIONS.iter() {
            let id = FunctionId::from_index(self.program.functions.len());
            let context = self
                .program
                .contexts
                .derive(ContextId::BUILTIN, ContextKind::Function(id));
            self.program.functions.push(BoundFunction::new(
                id,
                FunctionOrigin::Builtin(builtin),
                ContextId::BUILTIN,
                context,
            ));
            self.program
                .contexts
                .add_function(ContextId::BUILTIN, builtin.name, id);
        }
    }

    // ==========================================================================
    // Declarations
    // ==========================================================================

    fn declare_items(&mut self, module: &'ast Module<'ast>, context: ContextId) -> InternalResult<Vec<Declaration>> {
        let mut declarations = Vec::with_capacity(module.items.len());
        for item in module.items {
            let declaration = match *item {
                Item::Function(decl) => Declaration::Function(self.declare_function(decl, context)),
                Item::Variable(decl) => {
                    let initializer = decl
                        .initializer
                        .map(|init| BoundExpression::bind(init, context))
                        .transpose()?;
                    let id = self.push_variable(VariableOrigin::Declared(decl), context, initializer);
                    self.program.contexts.add_variable(context, decl.name.name, id);
                    Declaration::Variable(id)
                }
                Item::Struct(decl) => Declaration::Struct(self.declare_struct(module, decl, context)?),
            };
            declarations.push(declaration);
        }
        Ok(declarations)
    }

    fn declare_function(&mut self, decl: &'ast FunctionDecl<'ast>, module: ContextId) -> FunctionId {
        let id = FunctionId::from_index(self.program.functions.len());
        let context = self.program.contexts.derive(module, ContextKind::Function(id));
        self.program.functions.push(BoundFunction::new(
            id,
            FunctionOrigin::Declared(decl),
            module,
            context,
        ));
        self.program.contexts.add_function(module, decl.name.name, id);
        self.pending_bodies.push((id, decl));
        id
    }

    fn declare_struct(
        &mut self,
        module: &'ast Module<'ast>,
        decl: &'ast StructDecl<'ast>,
        module_context: ContextId,
    ) -> InternalResult<StructId> {
        let id = StructId::from_index(self.program.structs.len());
        let ty = self
            .program
            .types
            .declare(QualifiedName::new(decl.name.name, module.package()));
        self.program.contexts.add_type(module_context, decl.name.name, ty);

        let context = self
            .program
            .contexts
            .derive(module_context, ContextKind::Struct(id));
        let members = decl
            .members
            .iter()
            .map(|member| {
                let default = member
                    .default
                    .map(|expr| BoundExpression::bind(expr, context))
                    .transpose()?;
                Ok(BoundStructMember::new(member, default))
            })
            .collect::<InternalResult<Vec<_>>>()?;

        self.program
            .structs
            .push(BoundStruct::new(id, decl, ty, context, members));
        self.program.struct_by_type.insert(ty, id);
        self.pending_supertypes.push(PendingSupertypes {
            ty,
            module: module_context,
            decl,
        });
        Ok(id)
    }

    fn push_variable(
        &mut self,
        origin: VariableOrigin<'ast>,
        context: ContextId,
        initializer: Option<BoundExpression<'ast>>,
    ) -> VariableId {
        let id = VariableId::from_index(self.program.variables.len());
        self.program
            .variables
            .push(BoundVariable::new(id, origin, context, initializer));
        id
    }

    // ==========================================================================
    // Imports and supertypes
    // ==========================================================================

    fn resolve_imports(&mut self, module: &Module<'_>, context: ContextId) {
        for import in module.imports {
            let target = import.dotted();
            match self.program.contexts.find_module(&target) {
                Some(imported) => self.program.contexts.add_import(context, imported),
                None => self
                    .diagnostics
                    .push(Diagnostic::error(SemanticError::UnresolvedImport {
                        module: target,
                        span: import.span,
                    })),
            }
        }
    }

    fn seal_supertypes(&mut self) -> InternalResult<()> {
        for pending in std::mem::take(&mut self.pending_supertypes) {
            let mut attached = 0;
            for supertype in pending.decl.supertypes {
                let resolved = self
                    .program
                    .contexts
                    .resolve_any_type(pending.module, supertype.name.name);
                let Some(resolved) = resolved else {
                    self.diagnostics
                        .push(Diagnostic::error(SemanticError::UnknownType {
                            name: supertype.name.name.to_string(),
                            span: supertype.span,
                        }));
                    continue;
                };
                if self.program.types.add_supertype(pending.ty, resolved)? {
                    attached += 1;
                } else {
                    tracing::debug!(
                        ty = pending.decl.name.name,
                        supertype = supertype.name.name,
                        "rejected cyclic supertype"
                    );
                    self.diagnostics
                        .push(Diagnostic::error(SemanticError::CyclicTypeHierarchy {
                            type_name: pending.decl.name.name.to_string(),
                            supertype: supertype.name.name.to_string(),
                            span: supertype.span,
                        }));
                }
            }
            if attached == 0 {
                self.program.types.add_supertype(pending.ty, builtin_types::ANY)?;
            }
        }
        Ok(())
    }

    // ==========================================================================
    // Bodies
    // ==========================================================================

    fn bind_function_body(&mut self, function: FunctionId, decl: &'ast FunctionDecl<'ast>) -> InternalResult<()> {
        let context = self.program.function(function)?.context();

        let mut parameters = Vec::with_capacity(decl.params.len());
        for (index, param) in decl.params.iter().enumerate() {
            let id = self.push_variable(
                VariableOrigin::Parameter {
                    function,
                    index,
                    param,
                },
                context,
                None,
            );
            self.program.contexts.add_variable(context, param.name.name, id);
            parameters.push(id);
        }

        let body = decl
            .body
            .as_ref()
            .map(|body| self.bind_block(body, context))
            .transpose()?;

        let bound = &mut self.program.functions[function.index()];
        bound.set_parameters(parameters);
        if let Some(body) = body {
            bound.set_body(body);
        }
        Ok(())
    }

    /// Bind a block in a fresh block context below `parent`.
    fn bind_block(&mut self, block: &'ast Block<'ast>, parent: ContextId) -> InternalResult<BoundBlock<'ast>> {
        let block_context = self.program.contexts.derive(parent, ContextKind::Block);
        let mut current = block_context;
        let mut statements = Vec::with_capacity(block.stmts.len());

        for stmt in block.stmts {
            let statement = match stmt {
                Stmt::Expr(s) => BoundStatement::Expression(BoundExpressionStatement::new(
                    current,
                    s,
                    BoundExpression::bind(s.expr, current)?,
                )),
                Stmt::Var(decl) => {
                    let decl = *decl;
                    let initializer = decl
                        .initializer
                        .map(|init| BoundExpression::bind(init, current))
                        .transpose()?;
                    let id = self.push_variable(VariableOrigin::Declared(decl), current, initializer);
                    let binding = self.program.contexts.derive(current, ContextKind::Binding);
                    self.program.contexts.add_variable(binding, decl.name.name, id);
                    let statement =
                        BoundStatement::VariableDeclaration(BoundVariableDeclaration::new(current, decl, id));
                    current = binding;
                    statement
                }
                Stmt::Assign(assign) => {
                    let assign = *assign;
                    BoundStatement::Assignment(BoundAssignment::new(
                        current,
                        assign,
                        BoundExpression::bind(assign.target, current)?,
                        BoundExpression::bind(assign.value, current)?,
                    ))
                }
                Stmt::Return(ret) => BoundStatement::Return(BoundReturn::new(
                    current,
                    ret,
                    ret.value
                        .map(|value| BoundExpression::bind(value, current))
                        .transpose()?,
                )),
                Stmt::If(branch) => {
                    let branch = *branch;
                    let condition = BoundExpression::bind(branch.condition, current)?;
                    let then_branch = self.bind_block(&branch.then_branch, current)?;
                    let else_branch = branch
                        .else_branch
                        .as_ref()
                        .map(|block| self.bind_block(block, current))
                        .transpose()?;
                    BoundStatement::If(Box::new(BoundIf::new(
                        current,
                        branch,
                        condition,
                        then_branch,
                        else_branch,
                    )))
                }
                Stmt::Block(nested) => BoundStatement::Block(self.bind_block(nested, current)?),
            };
            statements.push(statement);
        }

        Ok(BoundBlock::new(block_context, block.span, statements))
    }
}
