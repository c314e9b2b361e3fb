//! Tests of the building blocks through the public API: the type hierarchy,
//! context resolution and memoization.

use dotlin::prelude::*;
use dotlin_binder::{ContextArena, ContextId, ContextKind, FunctionId, Memo, MemoState, VariableId};
use dotlin_core::{QualifiedName, TypeHierarchy};

fn user_type(types: &mut TypeHierarchy, name: &str, supertypes: &[TypeId]) -> TypeId {
    let ty = types.declare(QualifiedName::new(name, vec!["app".to_string()]));
    for &supertype in supertypes {
        assert!(types.add_supertype(ty, supertype).unwrap());
    }
    ty
}

// =============================================================================
// Type hierarchy
// =============================================================================

#[test]
fn test_builtin_numeric_tower() {
    let types = TypeHierarchy::with_builtins();
    assert!(types.is_subtype_of(builtin_types::INT, builtin_types::NUMBER).unwrap());
    assert!(types.is_subtype_of(builtin_types::FLOAT, builtin_types::ANY).unwrap());
    assert!(!types.is_subtype_of(builtin_types::INT, builtin_types::FLOAT).unwrap());
    assert_eq!(
        types
            .hierarchical_distance_to(builtin_types::INT, builtin_types::ANY)
            .unwrap(),
        2
    );
}

#[test]
fn test_distance_to_non_supertype_is_internal_error() {
    let types = TypeHierarchy::with_builtins();
    let err = types
        .hierarchical_distance_to(builtin_types::BOOLEAN, builtin_types::NUMBER)
        .unwrap_err();
    assert!(matches!(err, InternalError::NotASupertype { .. }));
}

#[test]
fn test_common_ancestor_of_user_types() {
    let mut types = TypeHierarchy::with_builtins();
    let a = user_type(&mut types, "A", &[builtin_types::ANY]);
    let ab = user_type(&mut types, "AB", &[a]);
    let abc = user_type(&mut types, "ABC", &[ab]);
    let c = user_type(&mut types, "C", &[builtin_types::ANY]);

    assert_eq!(types.closest_common_ancestor(&[a, ab]).unwrap(), a);
    assert_eq!(types.closest_common_ancestor(&[ab, abc]).unwrap(), ab);
    assert_eq!(types.closest_common_ancestor(&[c, a]).unwrap(), builtin_types::ANY);
    assert!(matches!(
        types.closest_common_ancestor(&[]),
        Err(InternalError::NoTypesGiven)
    ));
}

#[test]
fn test_nullable_never_fits_non_nullable() {
    let types = TypeHierarchy::with_builtins();
    let int = TypeRef::simple(builtin_types::INT);
    let number = TypeRef::simple(builtin_types::NUMBER);
    assert!(types.is_assignable(&int, &number.nullable()).unwrap());
    assert!(!types.is_assignable(&int.nullable(), &number).unwrap());
    assert_eq!(types.display(&int.nullable()), "Int?");
}

// =============================================================================
// Contexts
// =============================================================================

#[test]
fn test_binding_layers_hide_later_declarations() {
    let mut contexts = ContextArena::new();
    let module = contexts.module_context("app", ContextId::BUILTIN);
    let function = contexts.derive(module, ContextKind::Function(FunctionId(0)));
    let block = contexts.derive(function, ContextKind::Block);
    let binding = contexts.derive(block, ContextKind::Binding);
    contexts.add_variable(binding, "y", VariableId(1));
    contexts.add_variable(function, "x", VariableId(0));

    assert_eq!(contexts.resolve_variable(binding, "y", false), Some(VariableId(1)));
    assert_eq!(contexts.resolve_variable(block, "y", false), None);
    assert_eq!(contexts.resolve_variable(binding, "x", false), Some(VariableId(0)));
    assert_eq!(contexts.resolve_variable(binding, "x", true), None);
}

#[test]
fn test_boundary_is_inclusive() {
    let mut contexts = ContextArena::new();
    let module = contexts.module_context("app", ContextId::BUILTIN);
    contexts.add_variable(module, "global", VariableId(0));
    let function = contexts.derive(module, ContextKind::Function(FunctionId(0)));
    contexts.add_variable(function, "param", VariableId(1));
    let block = contexts.derive(function, ContextKind::Block);

    assert!(contexts.contains_within_boundary(block, VariableId(1), function));
    assert!(!contexts.contains_within_boundary(block, VariableId(0), function));
    assert!(contexts.contains_within_boundary(block, VariableId(0), module));
}

#[test]
fn test_imports_extend_function_lookup() {
    let mut contexts = ContextArena::new();
    let util = contexts.module_context("app.util", ContextId::BUILTIN);
    let main = contexts.module_context("app.main", ContextId::BUILTIN);
    contexts.add_function(util, "helper", FunctionId(7));
    contexts.add_function(main, "helper", FunctionId(3));

    assert_eq!(contexts.resolve_any_functions(main, "helper"), vec![FunctionId(3)]);
    contexts.add_import(main, util);
    assert_eq!(
        contexts.resolve_any_functions(main, "helper"),
        vec![FunctionId(3), FunctionId(7)]
    );
    assert_eq!(contexts.find_module("app.util"), Some(util));
    assert_eq!(contexts.find_module("dotlin.lang"), Some(ContextId::BUILTIN));
}

// =============================================================================
// Memoization
// =============================================================================

#[test]
fn test_memo_reports_reentry() {
    let memo: Memo<u32> = Memo::new();
    let outer = memo
        .compute(|| {
            assert_eq!(memo.compute(|| Ok(1)).unwrap(), None);
            assert_eq!(memo.state(), MemoState::InProgress);
            Ok(2)
        })
        .unwrap();
    assert_eq!(outer, Some(2));
    assert_eq!(memo.get(), Some(2));
    assert_eq!(memo.compute(|| Ok(3)).unwrap(), Some(2));
}

#[test]
fn test_memo_resets_after_failure() {
    let memo: Memo<u32> = Memo::new();
    let failed = memo.compute(|| Err(InternalError::NoTypesGiven));
    assert!(failed.is_err());
    assert_eq!(memo.state(), MemoState::Unknown);
    assert_eq!(memo.compute(|| Ok(5)).unwrap(), Some(5));
}
