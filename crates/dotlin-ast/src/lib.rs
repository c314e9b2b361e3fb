//! Dotlin declaration tree.
//!
//! The tree the parsing layer hands to the binder. It is syntactically valid by
//! construction; the binder never sees tokens or source text.
//!
//! Every node lives in a [`bumpalo::Bump`] arena and is a `Copy` handle borrowing
//! from it, so bound nodes can keep `&'ast` references to their origin for the
//! lifetime of the arena.
//!
//! # Example
//!
//! ```
//! use bumpalo::Bump;
//! use dotlin_ast::{AstBuilder, BinaryOp};
//!
//! let arena = Bump::new();
//! let ast = AstBuilder::new(&arena);
//!
//! // fun f(x: Int) { val y = 3; return x + y }
//! let f = ast
//!     .fun("f")
//!     .param("x", "Int")
//!     .body(&[
//!         ast.val("y", ast.int(3)),
//!         ast.ret(ast.binary(ast.name("x"), BinaryOp::Add, ast.name("y"))),
//!     ])
//!     .build();
//! let module = ast.module("app", &[], &[f]);
//! assert_eq!(module.items.len(), 1);
//! ```

mod builder;
pub mod decl;
pub mod expr;
mod node;
pub mod ops;
pub mod stmt;
pub mod types;

pub use builder::{AstBuilder, FunctionBuilder};
pub use decl::*;
pub use expr::*;
pub use node::Ident;
pub use ops::*;
pub use stmt::*;
pub use types::*;

use dotlin_core::{Severity, Span};

/// One parsed source module.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Module<'ast> {
    /// Dotted module name; empty for the root package
    pub name: &'ast [Ident<'ast>],
    /// `import` directives
    pub imports: &'ast [Import<'ast>],
    /// Top-level declarations in source order
    pub items: &'ast [Item<'ast>],
    /// Non-fatal findings of the parsing layer, forwarded unchanged
    pub parse_diagnostics: &'ast [ParseDiagnostic<'ast>],
    /// Source location
    pub span: Span,
}

impl<'ast> Module<'ast> {
    /// The module name as package path segments.
    pub fn package(&self) -> Vec<String> {
        self.name.iter().map(|ident| ident.name.to_string()).collect()
    }

    /// The module name in dotted form, e.g. `dotlin.lang`.
    pub fn dotted_name(&self) -> String {
        self.package().join(".")
    }
}

/// A diagnostic produced by the parsing layer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParseDiagnostic<'ast> {
    pub severity: Severity,
    pub message: &'ast str,
    pub span: Span,
}
