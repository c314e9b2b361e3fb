//! Arena indices.
//!
//! Every bound declaration and every context lives in a `Vec` owned by the
//! [`BoundProgram`](crate::BoundProgram); these ids index into them. Ids are only
//! meaningful for the program that issued them.

use std::fmt;

macro_rules! arena_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(pub u32);

        impl $name {
            #[inline]
            pub fn index(self) -> usize {
                self.0 as usize
            }

            #[inline]
            pub(crate) fn from_index(index: usize) -> Self {
                Self(index as u32)
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!(stringify!($name), "({})"), self.0)
            }
        }
    };
}

arena_id!(
    /// Index of a [`Context`](crate::Context).
    ContextId
);
arena_id!(
    /// Index of a [`BoundFunction`](crate::BoundFunction).
    FunctionId
);
arena_id!(
    /// Index of a [`BoundVariable`](crate::BoundVariable).
    VariableId
);
arena_id!(
    /// Index of a [`BoundStruct`](crate::BoundStruct).
    StructId
);

impl ContextId {
    /// The empty root every context chain ends in.
    pub const EMPTY: ContextId = ContextId(0);
    /// The whole-program context beneath the root; parent of every module.
    pub const SOFTWARE: ContextId = ContextId(1);
    /// The built-in `dotlin.lang` module.
    pub const BUILTIN: ContextId = ContextId(2);
}
