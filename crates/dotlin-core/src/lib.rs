//! Dotlin core types.
//!
//! Shared by the declaration tree and the binder:
//!
//! - [`Span`]: source locations
//! - [`SemanticError`] / [`InternalError`]: the two error families
//! - [`Diagnostic`] / [`Diagnostics`]: accumulated user-facing problems
//! - [`QualifiedName`]: package-qualified names
//! - [`FunctionModifiers`] / [`TypeModifier`]: declaration modifiers
//! - [`TypeHierarchy`]: the type arena with subtyping queries

mod diagnostics;
mod error;
mod modifiers;
mod qualified_name;
mod span;
pub mod types;

pub use diagnostics::{Diagnostic, Diagnostics, Severity};
pub use error::{InternalError, InternalResult, SemanticError};
pub use modifiers::{FunctionModifiers, TypeModifier};
pub use qualified_name::QualifiedName;
pub use span::Span;
pub use types::{TypeDef, TypeHierarchy, TypeId, TypeRef, builtin_types};
