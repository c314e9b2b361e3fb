//! Dotlin binder.
//!
//! Turns declaration trees into a bound program graph and analyses it: names are
//! resolved against lexical contexts, expressions are typed, invocations are
//! dispatched to the most specific overload and declared `pure`/`readonly`
//! claims are checked.
//!
//! ## Architecture
//!
//! - **Construction**: create every context and bound node; nothing is typed yet
//! - **Analysis**: three phases over every declaration, triggering each other
//!   on demand where one declaration needs facts about another
//!
//! ## Modules
//!
//! - [`binder`]: the entry point
//! - [`context`]: lexical contexts and name resolution
//! - [`protocol`]: the three-phase [`BoundNode`] protocol
//! - [`expr`] / [`stmt`]: bound expressions and statements
//! - [`function`] / [`variable`] / [`structs`]: bound declarations
//! - [`overload`]: overload resolution and ranking
//! - [`effects`]: reads and writes beyond a boundary, purity
//! - [`passes`]: the construction and analysis passes
//!
//! # Example
//!
//! ```
//! use bumpalo::Bump;
//! use dotlin_ast::{AstBuilder, BinaryOp};
//! use dotlin_binder::Binder;
//! use dotlin_core::builtin_types;
//!
//! let arena = Bump::new();
//! let ast = AstBuilder::new(&arena);
//! let f = ast
//!     .fun("f")
//!     .param("x", "Int")
//!     .body(&[
//!         ast.val("y", ast.int(3)),
//!         ast.ret(ast.binary(ast.name("x"), BinaryOp::Add, ast.name("y"))),
//!     ])
//!     .build();
//! let module = ast.module("app", &[], &[f]);
//!
//! let output = Binder::default().bind(&[module]).unwrap();
//! assert!(output.diagnostics.is_empty());
//!
//! let f = output.program.find_functions("f").next().unwrap();
//! let ty = f.return_type(&output.program).unwrap().unwrap();
//! assert_eq!(ty.base, builtin_types::INT);
//! ```

pub mod binder;
mod builtins;
pub mod context;
pub mod effects;
pub mod expr;
pub mod function;
mod ids;
mod memo;
mod options;
pub mod overload;
pub mod passes;
mod program;
pub mod protocol;
pub mod stmt;
pub mod structs;
mod type_resolver;
pub mod variable;

pub use binder::{BindOutput, Binder};
pub use builtins::{BUILTIN_TYPE_NAMES, BuiltinFunction, BuiltinParam};
pub use context::{Context, ContextArena, ContextKind};
pub use effects::{Effect, EffectAnalysis, EffectCause, EffectSource, EffectSummary};
pub use expr::{
    BoundExpression, BoundIdentifier, BoundInvocation, BoundMemberAccess, BoundNullLiteral,
    BoundNumericLiteral, BoundParen, InvocationKind, Referral,
};
pub use function::{BoundFunction, FunctionOrigin, Signature};
pub use ids::{ContextId, FunctionId, StructId, VariableId};
pub use memo::{Memo, MemoState, Phase, PhaseCache};
pub use options::BinderOptions;
pub use overload::{OverloadMatch, resolve_overload};
pub use passes::{AnalysisPass, ConstructionOutput, ConstructionPass};
pub use program::{BoundModule, BoundProgram, Declaration};
pub use protocol::BoundNode;
pub use stmt::{
    BoundAssignment, BoundBlock, BoundExpressionStatement, BoundIf, BoundReturn, BoundStatement,
    BoundVariableDeclaration,
};
pub use structs::{BoundStruct, BoundStructMember};
pub use type_resolver::TypeResolver;
pub use variable::{BoundVariable, VariableOrigin};
