//! Dotlin semantic analysis.
//!
//! Front ends lower their syntax into a [`dotlin_ast`] declaration tree and hand
//! the modules of one compilation to the [`Binder`](prelude::Binder):
//!
//! ```
//! use dotlin::prelude::*;
//!
//! let arena = Bump::new();
//! let ast = AstBuilder::new(&arena);
//! let module = ast.module("app", &[], &[ast.global_val("answer", ast.int(42))]);
//!
//! let output = Binder::default().bind(&[module]).unwrap();
//! assert!(!output.has_errors());
//! ```

pub use dotlin_ast;
pub use dotlin_binder;
pub use dotlin_core;

pub mod prelude {
    pub use bumpalo::Bump;
    pub use dotlin_ast::{AstBuilder, BinaryOp, Module, UnaryOp};
    pub use dotlin_binder::{
        BindOutput, Binder, BinderOptions, BoundFunction, BoundNode, BoundProgram, BoundStruct,
        BoundVariable, Declaration, EffectAnalysis,
    };
    pub use dotlin_core::{
        Diagnostic, Diagnostics, FunctionModifiers, InternalError, SemanticError, Severity, Span,
        TypeId, TypeRef, builtin_types,
    };
}
