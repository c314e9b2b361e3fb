//! Programmatic construction of declaration trees.
//!
//! Used by front ends that lower their own syntax into this tree, and by tests.
//! Every node gets its own line in the synthetic span sequence, so diagnostics
//! raised on different nodes can be told apart.

use std::cell::Cell;

use bumpalo::Bump;
use dotlin_core::{FunctionModifiers, Severity, Span};

use crate::{
    AssignStmt, BinaryExpr, BinaryOp, Block, Expr, ExprStmt, FunctionDecl, Ident, IdentExpr,
    IfStmt, Import, InvocationExpr, Item, LiteralExpr, LiteralKind, MemberExpr, Module, Param,
    ParenExpr, ParseDiagnostic, ReturnStmt, Stmt, StructDecl, StructMemberDecl, TypeExpr,
    UnaryExpr, UnaryOp, VariableDecl,
};

/// Allocates tree nodes into an arena.
pub struct AstBuilder<'ast> {
    arena: &'ast Bump,
    next_line: Cell<u32>,
}

impl<'ast> AstBuilder<'ast> {
    pub fn new(arena: &'ast Bump) -> Self {
        Self {
            arena,
            next_line: Cell::new(1),
        }
    }

    /// The arena nodes are allocated in.
    pub fn arena(&self) -> &'ast Bump {
        self.arena
    }

    /// A fresh span on the next synthetic line.
    pub fn span(&self) -> Span {
        let line = self.next_line.get();
        self.next_line.set(line + 1);
        Span::new(line, 1, 1)
    }

    // ==========================================================================
    // Names and types
    // ==========================================================================

    pub fn ident(&self, name: &str) -> Ident<'ast> {
        Ident::new(self.arena.alloc_str(name), self.span())
    }

    /// A non-nullable type reference.
    pub fn ty(&self, name: &str) -> TypeExpr<'ast> {
        TypeExpr::named(self.ident(name))
    }

    /// A nullable type reference, `name?`.
    pub fn nullable_ty(&self, name: &str) -> TypeExpr<'ast> {
        TypeExpr {
            nullable: true,
            ..self.ty(name)
        }
    }

    // ==========================================================================
    // Expressions
    // ==========================================================================

    pub fn int(&self, value: i64) -> Expr<'ast> {
        self.literal(LiteralKind::Int(value))
    }

    pub fn float(&self, value: f64) -> Expr<'ast> {
        self.literal(LiteralKind::Float(value))
    }

    pub fn null(&self) -> Expr<'ast> {
        self.literal(LiteralKind::Null)
    }

    /// A numeric literal the parsing layer could not convert.
    pub fn malformed(&self, text: &str) -> Expr<'ast> {
        self.literal(LiteralKind::Malformed(self.arena.alloc_str(text)))
    }

    fn literal(&self, kind: LiteralKind<'ast>) -> Expr<'ast> {
        Expr::Literal(LiteralExpr {
            kind,
            span: self.span(),
        })
    }

    /// An identifier expression.
    pub fn name(&self, name: &str) -> Expr<'ast> {
        let ident = self.ident(name);
        Expr::Ident(IdentExpr {
            ident,
            span: ident.span,
        })
    }

    /// `name(args)`
    pub fn call(&self, name: &str, args: &[Expr<'ast>]) -> Expr<'ast> {
        let target = self.name(name);
        self.invoke(target, args)
    }

    /// `receiver.name(args)`
    pub fn method_call(&self, receiver: Expr<'ast>, name: &str, args: &[Expr<'ast>]) -> Expr<'ast> {
        let target = self.member(receiver, name);
        self.invoke(target, args)
    }

    /// `receiver?.name(args)`
    pub fn safe_method_call(
        &self,
        receiver: Expr<'ast>,
        name: &str,
        args: &[Expr<'ast>],
    ) -> Expr<'ast> {
        let target = self.safe_member(receiver, name);
        self.invoke(target, args)
    }

    /// An invocation of an arbitrary target expression.
    pub fn invoke(&self, target: Expr<'ast>, args: &[Expr<'ast>]) -> Expr<'ast> {
        Expr::Invocation(self.arena.alloc(InvocationExpr {
            target: self.arena.alloc(target),
            args: self.arena.alloc_slice_copy(args),
            span: self.span(),
        }))
    }

    /// `object.member`
    pub fn member(&self, object: Expr<'ast>, member: &str) -> Expr<'ast> {
        self.member_access(object, member, false)
    }

    /// `object?.member`
    pub fn safe_member(&self, object: Expr<'ast>, member: &str) -> Expr<'ast> {
        self.member_access(object, member, true)
    }

    fn member_access(&self, object: Expr<'ast>, member: &str, null_safe: bool) -> Expr<'ast> {
        Expr::Member(self.arena.alloc(MemberExpr {
            object: self.arena.alloc(object),
            member: self.ident(member),
            null_safe,
            span: self.span(),
        }))
    }

    pub fn binary(&self, left: Expr<'ast>, op: BinaryOp, right: Expr<'ast>) -> Expr<'ast> {
        Expr::Binary(self.arena.alloc(BinaryExpr {
            left: self.arena.alloc(left),
            op,
            right: self.arena.alloc(right),
            span: self.span(),
        }))
    }

    pub fn unary(&self, op: UnaryOp, operand: Expr<'ast>) -> Expr<'ast> {
        Expr::Unary(self.arena.alloc(UnaryExpr {
            op,
            operand: self.arena.alloc(operand),
            span: self.span(),
        }))
    }

    pub fn paren(&self, expr: Expr<'ast>) -> Expr<'ast> {
        Expr::Paren(self.arena.alloc(ParenExpr {
            expr: self.arena.alloc(expr),
            span: self.span(),
        }))
    }

    // ==========================================================================
    // Statements
    // ==========================================================================

    pub fn expr_stmt(&self, expr: Expr<'ast>) -> Stmt<'ast> {
        Stmt::Expr(ExprStmt {
            expr: self.arena.alloc(expr),
            span: self.span(),
        })
    }

    /// `val name = init`
    pub fn val(&self, name: &str, init: Expr<'ast>) -> Stmt<'ast> {
        Stmt::Var(self.variable(name, false, None, Some(init)))
    }

    /// `var name = init`
    pub fn var(&self, name: &str, init: Expr<'ast>) -> Stmt<'ast> {
        Stmt::Var(self.variable(name, true, None, Some(init)))
    }

    /// A local declaration with every part spelled out.
    pub fn local(
        &self,
        name: &str,
        is_mutable: bool,
        ty: Option<TypeExpr<'ast>>,
        init: Option<Expr<'ast>>,
    ) -> Stmt<'ast> {
        Stmt::Var(self.variable(name, is_mutable, ty, init))
    }

    fn variable(
        &self,
        name: &str,
        is_mutable: bool,
        ty: Option<TypeExpr<'ast>>,
        init: Option<Expr<'ast>>,
    ) -> &'ast VariableDecl<'ast> {
        self.arena.alloc(VariableDecl {
            name: self.ident(name),
            is_mutable,
            ty,
            initializer: init.map(|e| &*self.arena.alloc(e)),
            span: self.span(),
        })
    }

    /// `target = value`
    pub fn assign(&self, target: Expr<'ast>, value: Expr<'ast>) -> Stmt<'ast> {
        Stmt::Assign(self.arena.alloc(AssignStmt {
            target: self.arena.alloc(target),
            value: self.arena.alloc(value),
            span: self.span(),
        }))
    }

    /// `return value`
    pub fn ret(&self, value: Expr<'ast>) -> Stmt<'ast> {
        Stmt::Return(ReturnStmt {
            value: Some(self.arena.alloc(value)),
            span: self.span(),
        })
    }

    /// A bare `return`.
    pub fn ret_unit(&self) -> Stmt<'ast> {
        Stmt::Return(ReturnStmt {
            value: None,
            span: self.span(),
        })
    }

    pub fn if_(
        &self,
        condition: Expr<'ast>,
        then_branch: &[Stmt<'ast>],
        else_branch: Option<&[Stmt<'ast>]>,
    ) -> Stmt<'ast> {
        Stmt::If(self.arena.alloc(IfStmt {
            condition: self.arena.alloc(condition),
            then_branch: self.block(then_branch),
            else_branch: else_branch.map(|stmts| self.block(stmts)),
            span: self.span(),
        }))
    }

    pub fn block(&self, stmts: &[Stmt<'ast>]) -> Block<'ast> {
        Block {
            stmts: self.arena.alloc_slice_copy(stmts),
            span: self.span(),
        }
    }

    pub fn block_stmt(&self, stmts: &[Stmt<'ast>]) -> Stmt<'ast> {
        Stmt::Block(self.block(stmts))
    }

    // ==========================================================================
    // Declarations
    // ==========================================================================

    /// Start a function declaration.
    pub fn fun<'b>(&'b self, name: &str) -> FunctionBuilder<'b, 'ast> {
        FunctionBuilder {
            ast: self,
            decl: FunctionDecl {
                name: self.ident(name),
                modifiers: FunctionModifiers::empty(),
                receiver: None,
                params: &[],
                return_type: None,
                body: None,
                span: self.span(),
            },
            params: Vec::new(),
        }
    }

    /// A module-level `val`.
    pub fn global_val(&self, name: &str, init: Expr<'ast>) -> Item<'ast> {
        Item::Variable(self.variable(name, false, None, Some(init)))
    }

    /// A module-level `var`.
    pub fn global_var(&self, name: &str, init: Expr<'ast>) -> Item<'ast> {
        Item::Variable(self.variable(name, true, None, Some(init)))
    }

    /// A module-level variable with every part spelled out.
    pub fn global(
        &self,
        name: &str,
        is_mutable: bool,
        ty: Option<TypeExpr<'ast>>,
        init: Option<Expr<'ast>>,
    ) -> Item<'ast> {
        Item::Variable(self.variable(name, is_mutable, ty, init))
    }

    /// A struct member `name: ty = default`.
    pub fn struct_member(
        &self,
        name: &str,
        ty: TypeExpr<'ast>,
        default: Option<Expr<'ast>>,
    ) -> StructMemberDecl<'ast> {
        StructMemberDecl {
            name: self.ident(name),
            ty,
            default: default.map(|e| &*self.arena.alloc(e)),
            span: self.span(),
        }
    }

    /// `struct name : supertypes { members }`
    pub fn structure(
        &self,
        name: &str,
        supertypes: &[&str],
        members: &[StructMemberDecl<'ast>],
    ) -> Item<'ast> {
        let supertypes: Vec<TypeExpr<'ast>> = supertypes.iter().map(|s| self.ty(s)).collect();
        Item::Struct(self.arena.alloc(StructDecl {
            name: self.ident(name),
            supertypes: self.arena.alloc_slice_copy(&supertypes),
            members: self.arena.alloc_slice_copy(members),
            span: self.span(),
        }))
    }

    /// `import a.b.*`
    pub fn import(&self, dotted: &str) -> Import<'ast> {
        Import {
            path: self.path(dotted),
            span: self.span(),
        }
    }

    fn path(&self, dotted: &str) -> &'ast [Ident<'ast>] {
        let segments: Vec<Ident<'ast>> = dotted
            .split('.')
            .filter(|s| !s.is_empty())
            .map(|s| self.ident(s))
            .collect();
        self.arena.alloc_slice_copy(&segments)
    }

    /// A module named by a dotted path.
    pub fn module(
        &self,
        name: &str,
        imports: &[Import<'ast>],
        items: &[Item<'ast>],
    ) -> &'ast Module<'ast> {
        self.module_with_diagnostics(name, imports, items, &[])
    }

    /// A module carrying diagnostics from the parsing layer.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn module_with_diagnostics(
        &self,
        name: &str,
        imports: &[Import<'ast>],
        items: &[Item<'ast>],
        diagnostics: &[(Severity, &str)],
    ) -> &'ast Module<'ast> {
        let parse_diagnostics: Vec<ParseDiagnostic<'ast>> = diagnostics
            .iter()
            .map(|&(severity, message)| ParseDiagnostic {
                severity,
                message: self.arena.alloc_str(message),
                span: self.span(),
            })
            .collect();
        self.arena.alloc(Module {
            name: self.path(name),
            imports: self.arena.alloc_slice_copy(imports),
            items: self.arena.alloc_slice_copy(items),
            parse_diagnostics: self.arena.alloc_slice_copy(&parse_diagnostics),
            span: self.span(),
        })
    }
}

/// Incremental construction of a [`FunctionDecl`].
pub struct FunctionBuilder<'b, 'ast> {
    ast: &'b AstBuilder<'ast>,
    decl: FunctionDecl<'ast>,
    params: Vec<Param<'ast>>,
}

impl<'b, 'ast> FunctionBuilder<'b, 'ast> {
    pub fn modifiers(mut self, modifiers: FunctionModifiers) -> Self {
        self.decl.modifiers |= modifiers;
        self
    }

    /// Declare the function on a receiver type, `fun Type.name(...)`.
    pub fn receiver(mut self, ty: &str) -> Self {
        self.decl.receiver = Some(self.ast.ty(ty));
        self
    }

    /// Add a typed parameter.
    pub fn param(mut self, name: &str, ty: &str) -> Self {
        let param = Param {
            name: self.ast.ident(name),
            ty: Some(self.ast.ty(ty)),
            span: self.ast.span(),
        };
        self.params.push(param);
        self
    }

    /// Add a parameter with an explicit (possibly absent) type.
    pub fn param_with(mut self, name: &str, ty: Option<TypeExpr<'ast>>) -> Self {
        let param = Param {
            name: self.ast.ident(name),
            ty,
            span: self.ast.span(),
        };
        self.params.push(param);
        self
    }

    pub fn returns(mut self, ty: &str) -> Self {
        self.decl.return_type = Some(self.ast.ty(ty));
        self
    }

    pub fn returns_type(mut self, ty: TypeExpr<'ast>) -> Self {
        self.decl.return_type = Some(ty);
        self
    }

    pub fn body(mut self, stmts: &[Stmt<'ast>]) -> Self {
        self.decl.body = Some(self.ast.block(stmts));
        self
    }

    /// Finish the declaration as a module item.
    pub fn build(self) -> Item<'ast> {
        Item::Function(self.finish())
    }

    /// Finish the declaration.
    pub fn finish(mut self) -> &'ast FunctionDecl<'ast> {
        let arena = self.ast.arena;
        self.decl.params = arena.alloc_slice_copy(&self.params);
        arena.alloc(self.decl)
    }
}
