//! Error types for semantic analysis.
//!
//! Two families exist and they never mix:
//!
//! ```text
//! SemanticError  - user-facing problems; wrapped into a Diagnostic and accumulated
//! InternalError  - the input or the binder itself is broken; aborts the compilation
//! ```
//!
//! A [`SemanticError`] never stops analysis. Bound nodes record it, leave the affected
//! fact unset and carry on with their siblings. An [`InternalError`] is returned through
//! `Result` and propagated with `?` up to the binder entry point.

use thiserror::Error;

use crate::Span;

// ============================================================================
// Semantic Errors (non-fatal)
// ============================================================================

/// Problems found in syntactically valid input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SemanticError {
    /// No literal, variable or type is visible under the identifier.
    #[error("at {span}: undefined identifier '{name}'")]
    UndefinedIdentifier { name: String, span: Span },

    /// An identifier still did not resolve to a variable after all declarations were known.
    #[error("at {span}: cannot resolve variable '{name}'")]
    UnresolvedVariable { name: String, span: Span },

    /// No function under the name accepts the receiver and argument types.
    #[error("at {span}: cannot resolve function {signature}")]
    UnresolvableFunction { signature: String, span: Span },

    /// No operator function implements the operator for the operand types.
    #[error("at {span}: operator '{operator}' is not defined for {operands}")]
    UnresolvableOperator {
        operator: String,
        operands: String,
        span: Span,
    },

    /// Two or more overloads match equally well.
    #[error("at {span}: invocation of '{name}' is ambiguous between {candidates}")]
    AmbiguousInvocation {
        name: String,
        candidates: String,
        span: Span,
    },

    /// A type reference names no visible type.
    #[error("at {span}: unknown type '{name}'")]
    UnknownType { name: String, span: Span },

    /// Member access names a member the type does not declare.
    #[error("at {span}: type '{type_name}' has no member '{member}'")]
    UnknownMember {
        type_name: String,
        member: String,
        span: Span,
    },

    /// `.` used on a value that may be null.
    #[error("at {span}: unsafe object traversal on nullable value; use '?.' instead")]
    UnsafeObjectTraversal { span: Span },

    /// `?.` used on a value that can never be null.
    #[error("at {span}: superfluous null-safe traversal on non-nullable value; use '.' instead")]
    SuperfluousSafeObjectTraversal { span: Span },

    /// A struct declares the same member name more than once.
    #[error("at {span}: struct '{struct_name}' declares member '{member}' {count} times")]
    DuplicateTypeMembers {
        struct_name: String,
        member: String,
        count: usize,
        span: Span,
    },

    /// A declared supertype would make the hierarchy cyclic; the edge is dropped.
    #[error("at {span}: '{type_name}' cannot extend '{supertype}': the type hierarchy would become cyclic")]
    CyclicTypeHierarchy {
        type_name: String,
        supertype: String,
        span: Span,
    },

    /// An import names a module that is not part of the software context.
    #[error("at {span}: cannot resolve import of module '{module}'")]
    UnresolvedImport { module: String, span: Span },

    /// A function declared `pure` reads state beyond its own scope.
    #[error("at {span}: pure function '{function}' reads state outside its scope ({count} offending site(s))")]
    PurityViolation {
        function: String,
        count: usize,
        offending: Vec<Span>,
        span: Span,
    },

    /// A function declared `readonly` (or `pure`) writes state beyond its own scope.
    #[error("at {span}: readonly function '{function}' modifies state outside its scope ({count} offending site(s))")]
    ReadonlyViolation {
        function: String,
        count: usize,
        offending: Vec<Span>,
        span: Span,
    },

    /// The effects of a call could not be established because the callee is still being analysed.
    #[error("at {span}: effects of recursive invocation of '{callee}' cannot be established; assuming it is not pure")]
    RecursivePurityCheck { callee: String, span: Span },

    /// An initializer whose type does not fit the declared type.
    #[error("at {span}: a value of type {actual} cannot be assigned to a reference of type {expected}")]
    ValueNotAssignable {
        expected: String,
        actual: String,
        span: Span,
    },

    /// Assignment to a `val` binding.
    #[error("at {span}: cannot assign to immutable variable '{name}'")]
    AssignmentToImmutable { name: String, span: Span },

    /// A diagnostic produced by the parsing layer, passed through unchanged.
    #[error("at {span}: {message}")]
    Forwarded { message: String, span: Span },
}

impl SemanticError {
    /// Get the span where this error occurred.
    pub fn span(&self) -> Span {
        match self {
            SemanticError::UndefinedIdentifier { span, .. }
            | SemanticError::UnresolvedVariable { span, .. }
            | SemanticError::UnresolvableFunction { span, .. }
            | SemanticError::UnresolvableOperator { span, .. }
            | SemanticError::AmbiguousInvocation { span, .. }
            | SemanticError::UnknownType { span, .. }
            | SemanticError::UnknownMember { span, .. }
            | SemanticError::UnsafeObjectTraversal { span }
            | SemanticError::SuperfluousSafeObjectTraversal { span }
            | SemanticError::DuplicateTypeMembers { span, .. }
            | SemanticError::CyclicTypeHierarchy { span, .. }
            | SemanticError::UnresolvedImport { span, .. }
            | SemanticError::PurityViolation { span, .. }
            | SemanticError::ReadonlyViolation { span, .. }
            | SemanticError::RecursivePurityCheck { span, .. }
            | SemanticError::ValueNotAssignable { span, .. }
            | SemanticError::AssignmentToImmutable { span, .. }
            | SemanticError::Forwarded { span, .. } => *span,
        }
    }
}

// ============================================================================
// Internal Errors (fatal)
// ============================================================================

/// Conditions the binder cannot recover from.
///
/// These indicate a malformed declaration tree or a bug in the binder, never a
/// mistake in the analysed program.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InternalError {
    /// The parsing layer produced an invocation whose target is neither an identifier
    /// nor a member access.
    #[error("internal compiler error at {span}: invocation target is neither an identifier nor a member access")]
    InvalidInvocationTarget { span: Span },

    /// `hierarchical_distance_to` was called with a type that is not a supertype.
    #[error("internal compiler error: '{supertype}' is not a supertype of '{subtype}'")]
    NotASupertype { subtype: String, supertype: String },

    /// A subtype query walked into a cycle of supertypes.
    #[error("internal compiler error: supertypes of '{type_name}' form a cycle")]
    CyclicSupertypes { type_name: String },

    /// `closest_common_ancestor` was called without any type.
    #[error("internal compiler error: at least one type is required to compute a common ancestor")]
    NoTypesGiven,

    /// An id does not belong to the arena it was used with.
    #[error("internal compiler error: dangling {kind} id {index}")]
    DanglingId { kind: &'static str, index: u32 },
}

/// Result type for operations that may fail fatally.
pub type InternalResult<T> = Result<T, InternalError>;
