//! Types and the supertype hierarchy.
//!
//! - [`TypeId`]: index of a type inside a [`TypeHierarchy`]
//! - [`TypeDef`]: name, supertypes and implied modifier of one type
//! - [`TypeRef`]: what an expression carries (base type, nullability, modifier)
//! - [`TypeHierarchy`]: subtyping, hierarchical distance and common ancestors

mod hierarchy;

pub use hierarchy::TypeHierarchy;

use std::fmt;

use crate::{QualifiedName, TypeModifier};

/// Index of a type in a [`TypeHierarchy`].
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeId(pub u32);

impl TypeId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for TypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeId({})", self.0)
    }
}

/// Stable ids of the built-in `dotlin.lang` types.
///
/// Every [`TypeHierarchy`] created with [`TypeHierarchy::with_builtins`] places these
/// types first, so the ids are valid in every compilation.
pub mod builtin_types {
    use super::TypeId;

    /// The root type; the only type without supertypes.
    pub const ANY: TypeId = TypeId(0);
    pub const UNIT: TypeId = TypeId(1);
    pub const NUMBER: TypeId = TypeId(2);
    pub const FLOAT: TypeId = TypeId(3);
    pub const INT: TypeId = TypeId(4);
    pub const BOOLEAN: TypeId = TypeId(5);

    /// Package of the built-in module.
    pub const PACKAGE: [&str; 2] = ["dotlin", "lang"];
}

/// Definition of a single type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeDef {
    /// Fully-qualified name.
    pub name: QualifiedName,
    /// Direct supertypes; fixed once the hierarchy is sealed.
    pub supertypes: Vec<TypeId>,
    /// Modifier applied to references that do not state one (numbers are immutable).
    pub implied_modifier: Option<TypeModifier>,
}

impl TypeDef {
    pub fn new(name: QualifiedName, supertypes: Vec<TypeId>) -> Self {
        Self {
            name,
            supertypes,
            implied_modifier: None,
        }
    }

    pub fn with_implied_modifier(mut self, modifier: TypeModifier) -> Self {
        self.implied_modifier = Some(modifier);
        self
    }

    /// The simple name, e.g. `Int`.
    pub fn simple_name(&self) -> &str {
        self.name.simple_name()
    }
}

/// A use of a type: base type plus nullability and mutability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TypeRef {
    pub base: TypeId,
    pub nullable: bool,
    pub modifier: Option<TypeModifier>,
}

impl TypeRef {
    /// A non-nullable reference without explicit modifier.
    pub fn simple(base: TypeId) -> Self {
        Self {
            base,
            nullable: false,
            modifier: None,
        }
    }

    /// The same type, nullable.
    pub fn nullable(self) -> Self {
        Self {
            nullable: true,
            ..self
        }
    }

    /// The same type, non-nullable.
    pub fn non_null(self) -> Self {
        Self {
            nullable: false,
            ..self
        }
    }

    pub fn with_modifier(self, modifier: TypeModifier) -> Self {
        Self {
            modifier: Some(modifier),
            ..self
        }
    }

    /// `Any?`, the fallback receiver type when a receiver expression has no type.
    pub fn nullable_any() -> Self {
        Self::simple(builtin_types::ANY).nullable()
    }
}
