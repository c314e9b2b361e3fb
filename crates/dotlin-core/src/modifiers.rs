//! Declaration modifiers.

use std::fmt;

use bitflags::bitflags;

bitflags! {
    /// Modifiers a function declaration may carry.
    ///
    /// `PURE` and `READONLY` are *claims* checked in the third analysis phase; the
    /// derived facts live on the bound function.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct FunctionModifiers: u8 {
        /// Reads no state outside its own scope.
        const PURE = 1 << 0;
        /// Writes no state outside its own scope.
        const READONLY = 1 << 1;
        /// Never throws.
        const NOTHROW = 1 << 2;
        /// Usable as an operator implementation.
        const OPERATOR = 1 << 3;
        /// Implemented outside the language; has no body.
        const EXTERNAL = 1 << 4;
    }
}

impl FunctionModifiers {
    /// Whether the declaration promises not to write beyond its scope.
    ///
    /// `pure` implies `readonly`.
    pub fn claims_readonly(self) -> bool {
        self.intersects(FunctionModifiers::PURE | FunctionModifiers::READONLY)
    }
}

/// Mutability modifier of a type reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeModifier {
    Mutable,
    Readonly,
    Immutable,
}

impl fmt::Display for TypeModifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeModifier::Mutable => write!(f, "mutable"),
            TypeModifier::Readonly => write!(f, "readonly"),
            TypeModifier::Immutable => write!(f, "immutable"),
        }
    }
}
