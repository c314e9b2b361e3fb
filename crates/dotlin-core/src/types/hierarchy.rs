//! The per-compilation type arena and its subtyping queries.

use std::cell::RefCell;

use rustc_hash::FxHashMap;

use super::{TypeDef, TypeId, TypeRef, builtin_types};
use crate::{InternalError, InternalResult, QualifiedName, TypeModifier};

/// All types known to one compilation.
///
/// Types are appended while declarations are collected; afterwards the supertype
/// sets never change, which is what makes the subtype memo table valid for the
/// rest of the compilation.
#[derive(Debug, Default)]
pub struct TypeHierarchy {
    types: Vec<TypeDef>,
    by_name: FxHashMap<QualifiedName, TypeId>,
    /// Memoized `is_subtype_of` answers keyed by `(subtype, supertype)`.
    subtype_cache: RefCell<FxHashMap<(TypeId, TypeId), bool>>,
}

impl TypeHierarchy {
    /// Create an empty hierarchy.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a hierarchy holding the built-in `dotlin.lang` types at their fixed ids.
    pub fn with_builtins() -> Self {
        let mut hierarchy = Self::new();
        let package: Vec<String> = builtin_types::PACKAGE.iter().map(|s| s.to_string()).collect();
        let builtin = |name: &str, supertypes: Vec<TypeId>| {
            TypeDef::new(QualifiedName::new(name, package.clone()), supertypes)
        };

        let defs = [
            (builtin_types::ANY, builtin("Any", vec![])),
            (builtin_types::UNIT, builtin("Unit", vec![builtin_types::ANY])),
            (
                builtin_types::NUMBER,
                builtin("Number", vec![builtin_types::ANY]).with_implied_modifier(TypeModifier::Immutable),
            ),
            (
                builtin_types::FLOAT,
                builtin("Float", vec![builtin_types::NUMBER]).with_implied_modifier(TypeModifier::Immutable),
            ),
            (
                builtin_types::INT,
                builtin("Int", vec![builtin_types::NUMBER]).with_implied_modifier(TypeModifier::Immutable),
            ),
            (
                builtin_types::BOOLEAN,
                builtin("Boolean", vec![builtin_types::ANY]).with_implied_modifier(TypeModifier::Immutable),
            ),
        ];

        for (expected, def) in defs {
            let id = hierarchy.push(def);
            debug_assert_eq!(id, expected);
        }
        hierarchy
    }

    // ==========================================================================
    // Registration
    // ==========================================================================

    /// Register a type whose supertypes are already known.
    pub fn register(&mut self, def: TypeDef) -> InternalResult<TypeId> {
        for &supertype in &def.supertypes {
            self.def(supertype)?;
        }
        Ok(self.push(def))
    }

    /// Register a type whose supertypes are attached later with [`add_supertype`].
    ///
    /// Used for declarations that may name supertypes declared further down.
    ///
    /// [`add_supertype`]: TypeHierarchy::add_supertype
    pub fn declare(&mut self, name: QualifiedName) -> TypeId {
        self.push(TypeDef::new(name, Vec::new()))
    }

    /// Attach a supertype to a declared type.
    ///
    /// Returns `Ok(false)` and leaves the hierarchy untouched if the edge would make
    /// the hierarchy cyclic.
    pub fn add_supertype(&mut self, ty: TypeId, supertype: TypeId) -> InternalResult<bool> {
        self.def(ty)?;
        self.def(supertype)?;
        if self.is_subtype_of(supertype, ty)? {
            return Ok(false);
        }
        let def = &mut self.types[ty.index()];
        if !def.supertypes.contains(&supertype) {
            def.supertypes.push(supertype);
        }
        self.subtype_cache.get_mut().clear();
        Ok(true)
    }

    fn push(&mut self, def: TypeDef) -> TypeId {
        let id = TypeId(self.types.len() as u32);
        self.by_name.insert(def.name.clone(), id);
        self.types.push(def);
        id
    }

    // ==========================================================================
    // Lookup
    // ==========================================================================

    /// Get a type definition.
    pub fn get(&self, id: TypeId) -> Option<&TypeDef> {
        self.types.get(id.index())
    }

    /// Get a type definition, treating an unknown id as an internal error.
    pub fn def(&self, id: TypeId) -> InternalResult<&TypeDef> {
        self.get(id).ok_or(InternalError::DanglingId {
            kind: "type",
            index: id.0,
        })
    }

    /// Find a type by its fully-qualified name.
    pub fn lookup(&self, name: &QualifiedName) -> Option<TypeId> {
        self.by_name.get(name).copied()
    }

    /// Simple name of a type, or `<?>` for a dangling id.
    pub fn name_of(&self, id: TypeId) -> String {
        self.get(id)
            .map(|def| def.simple_name().to_string())
            .unwrap_or_else(|| "<?>".to_string())
    }

    /// Human-readable form of a type reference, e.g. `Int?`.
    pub fn display(&self, ty: &TypeRef) -> String {
        let mut out = String::new();
        if let Some(modifier) = ty.modifier {
            out.push_str(&format!("{} ", modifier));
        }
        out.push_str(&self.name_of(ty.base));
        if ty.nullable {
            out.push('?');
        }
        out
    }

    /// Apply the type's implied modifier when the reference states none.
    pub fn with_implied_modifier(&self, ty: TypeRef) -> TypeRef {
        match (ty.modifier, self.get(ty.base).and_then(|def| def.implied_modifier)) {
            (None, Some(implied)) => ty.with_modifier(implied),
            _ => ty,
        }
    }

    /// Number of registered types.
    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    // ==========================================================================
    // Subtyping
    // ==========================================================================

    /// Whether `a` is `b` or (transitively) one of `b`'s subtypes.
    ///
    /// Depth-first over the supertype sets. A cycle is reported as
    /// [`InternalError::CyclicSupertypes`] instead of looping.
    pub fn is_subtype_of(&self, a: TypeId, b: TypeId) -> InternalResult<bool> {
        let mut visiting = Vec::new();
        self.subtype_walk(a, b, &mut visiting)
    }

    fn subtype_walk(&self, a: TypeId, b: TypeId, visiting: &mut Vec<TypeId>) -> InternalResult<bool> {
        if a == b {
            return Ok(true);
        }
        let cached = self.subtype_cache.borrow().get(&(a, b)).copied();
        if let Some(hit) = cached {
            return Ok(hit);
        }
        if visiting.contains(&a) {
            return Err(InternalError::CyclicSupertypes {
                type_name: self.name_of(a),
            });
        }

        visiting.push(a);
        let mut result = false;
        for &supertype in &self.def(a)?.supertypes {
            if self.subtype_walk(supertype, b, visiting)? {
                result = true;
                break;
            }
        }
        visiting.pop();

        self.subtype_cache.borrow_mut().insert((a, b), result);
        Ok(result)
    }

    /// Whether a value of type `from` may be used where `to` is expected.
    ///
    /// A nullable value never fits a non-nullable slot.
    pub fn is_assignable(&self, from: &TypeRef, to: &TypeRef) -> InternalResult<bool> {
        if from.nullable && !to.nullable {
            return Ok(false);
        }
        self.is_subtype_of(from.base, to.base)
    }

    /// Number of supertype edges on the shortest path from `a` up to `b`.
    ///
    /// For `B : A`, `C : B` the distance from `C` to `A` is 2. Only supertypes that
    /// are themselves subtypes of `b` are followed.
    ///
    /// # Errors
    ///
    /// [`InternalError::NotASupertype`] if `b` is not a supertype of `a`; callers must
    /// check [`is_subtype_of`](TypeHierarchy::is_subtype_of) first.
    pub fn hierarchical_distance_to(&self, a: TypeId, b: TypeId) -> InternalResult<u32> {
        if a == b {
            return Ok(0);
        }
        let not_a_supertype = || InternalError::NotASupertype {
            subtype: self.name_of(a),
            supertype: self.name_of(b),
        };
        if !self.is_subtype_of(a, b)? {
            return Err(not_a_supertype());
        }

        let mut shortest: Option<u32> = None;
        for &supertype in &self.def(a)?.supertypes {
            if self.is_subtype_of(supertype, b)? {
                let distance = self.hierarchical_distance_to(supertype, b)?;
                shortest = Some(shortest.map_or(distance, |s| s.min(distance)));
            }
        }
        shortest.map(|d| d + 1).ok_or_else(not_a_supertype)
    }

    /// The closest type all of `types` are subtypes of.
    ///
    /// Suppose `class A`, `class AB : A`, `class ABC : AB`, `class C`:
    ///
    /// | types    | result |
    /// |----------|--------|
    /// | A, AB    | A      |
    /// | AB, ABC  | AB     |
    /// | C, A     | Any    |
    ///
    /// This is an approximation rather than a least upper bound: the pivot walks up
    /// single-supertype chains, and when it reaches a type with several supertypes it
    /// swaps with the candidate once to climb from the other side. If that also
    /// fails, the result is `Any`.
    pub fn closest_common_ancestor(&self, types: &[TypeId]) -> InternalResult<TypeId> {
        let (first, rest) = types.split_first().ok_or(InternalError::NoTypesGiven)?;

        let mut pivot = *first;
        for &candidate in rest {
            let mut current = candidate;
            let mut swapped = false;
            while !self.is_subtype_of(current, pivot)? {
                match self.def(pivot)?.supertypes.as_slice() {
                    [] => return Ok(builtin_types::ANY),
                    [single] => pivot = *single,
                    _ => {
                        if swapped {
                            return Ok(builtin_types::ANY);
                        }
                        std::mem::swap(&mut pivot, &mut current);
                        swapped = true;
                    }
                }
            }
        }

        Ok(pivot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::builtin_types::*;

    fn user_type(hierarchy: &mut TypeHierarchy, name: &str, supertypes: &[TypeId]) -> TypeId {
        hierarchy
            .register(TypeDef::new(QualifiedName::root(name), supertypes.to_vec()))
            .unwrap()
    }

    #[test]
    fn builtins_have_fixed_ids() {
        let hierarchy = TypeHierarchy::with_builtins();
        assert_eq!(hierarchy.name_of(ANY), "Any");
        assert_eq!(hierarchy.name_of(INT), "Int");
        assert_eq!(hierarchy.name_of(BOOLEAN), "Boolean");
        assert_eq!(
            hierarchy.lookup(&QualifiedName::from_dotted("dotlin.lang.Float")),
            Some(FLOAT)
        );
    }

    #[test]
    fn subtype_is_reflexive_and_reaches_any() {
        let hierarchy = TypeHierarchy::with_builtins();
        for id in [ANY, UNIT, NUMBER, FLOAT, INT, BOOLEAN] {
            assert!(hierarchy.is_subtype_of(id, id).unwrap());
            assert!(hierarchy.is_subtype_of(id, ANY).unwrap());
        }
        assert!(hierarchy.is_subtype_of(INT, NUMBER).unwrap());
        assert!(!hierarchy.is_subtype_of(NUMBER, INT).unwrap());
        assert!(!hierarchy.is_subtype_of(INT, FLOAT).unwrap());
    }

    #[test]
    fn distance_follows_shortest_path() {
        let mut hierarchy = TypeHierarchy::with_builtins();
        // A : Any, B : A, C : B, D : C and Any
        let a = user_type(&mut hierarchy, "A", &[ANY]);
        let b = user_type(&mut hierarchy, "B", &[a]);
        let c = user_type(&mut hierarchy, "C", &[b]);
        let d = user_type(&mut hierarchy, "D", &[c, ANY]);

        assert_eq!(hierarchy.hierarchical_distance_to(a, a).unwrap(), 0);
        assert_eq!(hierarchy.hierarchical_distance_to(c, a).unwrap(), 2);
        assert_eq!(hierarchy.hierarchical_distance_to(d, a).unwrap(), 3);
        assert_eq!(hierarchy.hierarchical_distance_to(d, ANY).unwrap(), 1);
        assert_eq!(hierarchy.hierarchical_distance_to(INT, ANY).unwrap(), 2);
    }

    #[test]
    fn distance_to_non_supertype_is_internal_error() {
        let hierarchy = TypeHierarchy::with_builtins();
        let err = hierarchy.hierarchical_distance_to(INT, BOOLEAN).unwrap_err();
        assert!(matches!(err, InternalError::NotASupertype { .. }));
    }

    #[test]
    fn common_ancestor_single_and_unrelated() {
        let mut hierarchy = TypeHierarchy::with_builtins();
        let a = user_type(&mut hierarchy, "A", &[ANY]);
        let ab = user_type(&mut hierarchy, "AB", &[a]);
        let abc = user_type(&mut hierarchy, "ABC", &[ab]);
        let c = user_type(&mut hierarchy, "C", &[ANY]);

        assert_eq!(hierarchy.closest_common_ancestor(&[abc]).unwrap(), abc);
        assert_eq!(hierarchy.closest_common_ancestor(&[a, ab]).unwrap(), a);
        assert_eq!(hierarchy.closest_common_ancestor(&[ab, abc]).unwrap(), ab);
        assert_eq!(hierarchy.closest_common_ancestor(&[abc, a]).unwrap(), a);
        assert_eq!(hierarchy.closest_common_ancestor(&[c, a]).unwrap(), ANY);
        assert_eq!(hierarchy.closest_common_ancestor(&[INT, FLOAT]).unwrap(), NUMBER);
        assert!(matches!(
            hierarchy.closest_common_ancestor(&[]),
            Err(InternalError::NoTypesGiven)
        ));
    }

    #[test]
    fn common_ancestor_swaps_once_at_multiple_supertypes() {
        let mut hierarchy = TypeHierarchy::with_builtins();
        let a = user_type(&mut hierarchy, "A", &[ANY]);
        let b = user_type(&mut hierarchy, "B", &[ANY]);
        let ab = user_type(&mut hierarchy, "AB", &[a, b]);

        // AB has two supertypes: the pivot swaps and climbs from A instead.
        assert_eq!(hierarchy.closest_common_ancestor(&[ab, a]).unwrap(), a);
        // Neither side can establish anything narrower than the root.
        let c = user_type(&mut hierarchy, "C", &[a, b]);
        assert_eq!(hierarchy.closest_common_ancestor(&[ab, c]).unwrap(), ANY);
    }

    #[test]
    fn add_supertype_rejects_cycles() {
        let mut hierarchy = TypeHierarchy::with_builtins();
        let a = hierarchy.declare(QualifiedName::root("A"));
        let b = hierarchy.declare(QualifiedName::root("B"));

        assert!(hierarchy.add_supertype(a, b).unwrap());
        assert!(!hierarchy.add_supertype(b, a).unwrap());
        assert!(!hierarchy.add_supertype(a, a).unwrap());
        assert!(hierarchy.is_subtype_of(a, b).unwrap());
        assert!(!hierarchy.is_subtype_of(b, a).unwrap());
    }

    #[test]
    fn assignability_respects_nullability() {
        let hierarchy = TypeHierarchy::with_builtins();
        let int = TypeRef::simple(INT);
        let number = TypeRef::simple(NUMBER);

        assert!(hierarchy.is_assignable(&int, &number).unwrap());
        assert!(hierarchy.is_assignable(&int, &number.nullable()).unwrap());
        assert!(!hierarchy.is_assignable(&int.nullable(), &number).unwrap());
        assert!(!hierarchy.is_assignable(&number, &int).unwrap());
    }

    #[test]
    fn display_shows_modifier_and_nullability() {
        let hierarchy = TypeHierarchy::with_builtins();
        let int = hierarchy.with_implied_modifier(TypeRef::simple(INT).nullable());
        assert_eq!(hierarchy.display(&int), "immutable Int?");
        assert_eq!(hierarchy.display(&TypeRef::simple(ANY)), "Any");
    }
}
