//! End-to-end binding tests.
//!
//! Each test lowers a small program with the [`AstBuilder`], binds it and checks
//! the facts and diagnostics the binder produced.

use dotlin::prelude::*;
use dotlin_binder::EffectCause;

fn bind<'ast>(modules: &[&'ast Module<'ast>]) -> BindOutput<'ast> {
    Binder::default().bind(modules).expect("binding must not fail internally")
}

fn bind_with<'ast>(options: BinderOptions, modules: &[&'ast Module<'ast>]) -> BindOutput<'ast> {
    Binder::new(options)
        .bind(modules)
        .expect("binding must not fail internally")
}

fn count(output: &BindOutput<'_>, matches: impl Fn(&SemanticError) -> bool) -> usize {
    output.diagnostics.iter().filter(|d| matches(&d.error)).count()
}

fn function<'p, 'ast>(output: &'p BindOutput<'ast>, name: &str) -> &'p BoundFunction<'ast> {
    output
        .program
        .find_functions(name)
        .next()
        .unwrap_or_else(|| panic!("function '{name}' not found"))
}

fn variable<'p, 'ast>(output: &'p BindOutput<'ast>, name: &str) -> &'p BoundVariable<'ast> {
    output
        .program
        .variables()
        .iter()
        .find(|v| v.name() == name)
        .unwrap_or_else(|| panic!("variable '{name}' not found"))
}

fn return_type(output: &BindOutput<'_>, name: &str) -> Option<TypeRef> {
    function(output, name).return_type(&output.program).unwrap()
}

// =============================================================================
// Typing and dispatch
// =============================================================================

#[test]
fn test_infers_return_type_of_operator_expression() {
    let arena = Bump::new();
    let ast = AstBuilder::new(&arena);
    let f = ast
        .fun("f")
        .param("x", "Int")
        .body(&[
            ast.val("y", ast.int(3)),
            ast.ret(ast.binary(ast.name("x"), BinaryOp::Add, ast.name("y"))),
        ])
        .build();
    let output = bind(&[ast.module("app", &[], &[f])]);

    assert!(output.diagnostics.is_empty(), "{}", output.diagnostics);
    let ty = return_type(&output, "f").unwrap();
    assert_eq!(ty.base, builtin_types::INT);
    assert!(!ty.nullable);

    let y = variable(&output, "y").ty(&output.program).unwrap().unwrap();
    assert_eq!(y.base, builtin_types::INT);
}

#[test]
fn test_undeclared_function_is_reported_once() {
    let arena = Bump::new();
    let ast = AstBuilder::new(&arena);
    let g = ast.fun("g").body(&[ast.ret(ast.call("h", &[ast.int(1)]))]).build();
    let output = bind(&[ast.module("app", &[], &[g])]);

    assert_eq!(output.diagnostics.len(), 1, "{}", output.diagnostics);
    let diagnostic = output.diagnostics.iter().next().unwrap();
    match &diagnostic.error {
        SemanticError::UnresolvableFunction { signature, .. } => {
            assert!(signature.starts_with("h("), "{signature}");
            assert!(signature.contains("Int"), "{signature}");
        }
        other => panic!("unexpected diagnostic {other}"),
    }
    assert_eq!(return_type(&output, "g"), None);
}

#[test]
fn test_prefers_most_specific_overload() {
    let arena = Bump::new();
    let ast = AstBuilder::new(&arena);
    let by_number = ast.fun("f").param("n", "Number").returns("Boolean").body(&[]).build();
    let by_int = ast.fun("f").param("n", "Int").returns("Int").body(&[]).build();
    let caller = ast.fun("caller").body(&[ast.ret(ast.call("f", &[ast.int(1)]))]).build();
    let float_caller = ast
        .fun("float_caller")
        .body(&[ast.ret(ast.call("f", &[ast.float(1.5)]))])
        .build();
    let output = bind(&[ast.module("app", &[], &[by_number, by_int, caller, float_caller])]);

    assert!(!output.has_errors(), "{}", output.diagnostics);
    assert_eq!(return_type(&output, "caller").unwrap().base, builtin_types::INT);
    assert_eq!(return_type(&output, "float_caller").unwrap().base, builtin_types::BOOLEAN);
}

#[test]
fn test_argument_count_must_match() {
    let arena = Bump::new();
    let ast = AstBuilder::new(&arena);
    let f = ast.fun("f").param("a", "Int").returns("Int").body(&[]).build();
    let caller = ast
        .fun("caller")
        .body(&[ast.expr_stmt(ast.call("f", &[ast.int(1), ast.int(2)]))])
        .build();
    let output = bind(&[ast.module("app", &[], &[f, caller])]);

    assert_eq!(
        count(&output, |e| matches!(e, SemanticError::UnresolvableFunction { .. })),
        1
    );
}

#[test]
fn test_ambiguous_overloads_dispatch_first_declared() {
    let arena = Bump::new();
    let ast = AstBuilder::new(&arena);
    let a = ast.structure("A", &[], &[]);
    let b = ast.structure("B", &[], &[]);
    let c = ast.structure("C", &["A", "B"], &[]);
    let via_a = ast.fun("f").param("a", "A").returns("Int").body(&[]).build();
    let via_b = ast.fun("f").param("b", "B").returns("Float").body(&[]).build();
    let caller = ast
        .fun("caller")
        .param("c", "C")
        .body(&[ast.ret(ast.call("f", &[ast.name("c")]))])
        .build();
    let module = ast.module("app", &[], &[a, b, c, via_a, via_b, caller]);

    let output = bind(&[module]);
    assert_eq!(
        count(&output, |e| matches!(e, SemanticError::AmbiguousInvocation { .. })),
        1,
        "{}",
        output.diagnostics
    );
    assert_eq!(return_type(&output, "caller").unwrap().base, builtin_types::INT);

    let quiet = bind_with(
        BinderOptions::default().with_report_ambiguous_overloads(false),
        &[module],
    );
    assert!(quiet.diagnostics.is_empty(), "{}", quiet.diagnostics);
}

#[test]
fn test_comparison_yields_boolean() {
    let arena = Bump::new();
    let ast = AstBuilder::new(&arena);
    let f = ast
        .fun("less")
        .param("a", "Int")
        .param("b", "Float")
        .body(&[ast.ret(ast.binary(ast.name("a"), BinaryOp::Less, ast.name("b")))])
        .build();
    let output = bind(&[ast.module("app", &[], &[f])]);

    assert!(output.diagnostics.is_empty(), "{}", output.diagnostics);
    assert_eq!(return_type(&output, "less").unwrap().base, builtin_types::BOOLEAN);
}

#[test]
fn test_operator_without_implementation() {
    let arena = Bump::new();
    let ast = AstBuilder::new(&arena);
    let f = ast
        .fun("f")
        .body(&[ast.ret(ast.binary(ast.name("true"), BinaryOp::Add, ast.int(1)))])
        .build();
    let output = bind(&[ast.module("app", &[], &[f])]);

    let errors: Vec<_> = output.diagnostics.errors().collect();
    assert_eq!(errors.len(), 1, "{}", output.diagnostics);
    match &errors[0].error {
        SemanticError::UnresolvableOperator { operator, operands, .. } => {
            assert_eq!(operator, "+");
            assert!(operands.contains("Boolean"), "{operands}");
        }
        other => panic!("unexpected diagnostic {other}"),
    }
}

#[test]
fn test_mixed_numeric_returns_widen_to_number() {
    let arena = Bump::new();
    let ast = AstBuilder::new(&arena);
    let then_branch = [ast.ret(ast.int(1))];
    let else_branch = [ast.ret(ast.float(2.0))];
    let f = ast
        .fun("pick")
        .param("flag", "Boolean")
        .body(&[ast.if_(ast.name("flag"), &then_branch, Some(&else_branch[..]))])
        .build();
    let output = bind(&[ast.module("app", &[], &[f])]);

    assert!(output.diagnostics.is_empty(), "{}", output.diagnostics);
    assert_eq!(return_type(&output, "pick").unwrap().base, builtin_types::NUMBER);
}

#[test]
fn test_null_return_makes_result_nullable() {
    let arena = Bump::new();
    let ast = AstBuilder::new(&arena);
    let then_branch = [ast.ret(ast.name("x"))];
    let else_branch = [ast.ret(ast.null())];
    let f = ast
        .fun("maybe")
        .param("x", "Int")
        .param("flag", "Boolean")
        .body(&[ast.if_(ast.name("flag"), &then_branch, Some(&else_branch[..]))])
        .build();
    let output = bind(&[ast.module("app", &[], &[f])]);

    let ty = return_type(&output, "maybe").unwrap();
    assert_eq!(ty.base, builtin_types::INT);
    assert!(ty.nullable);
}

#[test]
fn test_function_without_value_returns_unit() {
    let arena = Bump::new();
    let ast = AstBuilder::new(&arena);
    let f = ast.fun("noop").body(&[ast.ret_unit()]).build();
    let output = bind(&[ast.module("app", &[], &[f])]);

    assert_eq!(return_type(&output, "noop").unwrap().base, builtin_types::UNIT);
}

#[test]
fn test_rerunning_phases_reports_the_same_diagnostics() {
    let arena = Bump::new();
    let ast = AstBuilder::new(&arena);
    let f = ast
        .fun("f")
        .body(&[
            ast.expr_stmt(ast.call("nope", &[])),
            ast.ret(ast.name("missing")),
        ])
        .build();
    let output = bind(&[ast.module("app", &[], &[f])]);
    let unresolved = |e: &SemanticError| matches!(e, SemanticError::UnresolvableFunction { .. });
    assert_eq!(count(&output, unresolved), 1);

    let program = &output.program;
    let body = function(&output, "f").body().unwrap();

    let first = body.semantic_analysis_phase1(program).unwrap();
    let second = body.semantic_analysis_phase1(program).unwrap();
    assert_eq!(first.len(), 1);
    assert_eq!(first, second);

    let first = body.semantic_analysis_phase2(program).unwrap();
    let second = body.semantic_analysis_phase2(program).unwrap();
    assert_eq!(first.iter().filter(|d| unresolved(&d.error)).count(), 1);
    assert_eq!(first, second);
}

#[test]
fn test_unknown_operand_does_not_make_operator_ambiguous() {
    let arena = Bump::new();
    let ast = AstBuilder::new(&arena);
    let f = ast
        .fun("f")
        .param("x", "Int")
        .body(&[ast.ret(ast.binary(ast.name("x"), BinaryOp::Add, ast.name("y")))])
        .build();
    let output = bind(&[ast.module("app", &[], &[f])]);

    assert_eq!(
        count(&output, |e| matches!(e, SemanticError::AmbiguousInvocation { .. })),
        0,
        "{}",
        output.diagnostics
    );
    assert_eq!(count(&output, |e| matches!(e, SemanticError::UndefinedIdentifier { .. })), 1);
    assert_eq!(count(&output, |e| matches!(e, SemanticError::UnresolvedVariable { .. })), 1);
    assert_eq!(output.diagnostics.len(), 2, "{}", output.diagnostics);
}

#[test]
fn test_initializer_must_fit_declared_type() {
    let arena = Bump::new();
    let ast = AstBuilder::new(&arena);
    let items = [
        ast.global("widened", false, Some(ast.ty("Number")), Some(ast.int(1))),
        ast.global("narrowed", false, Some(ast.ty("Int")), Some(ast.float(1.5))),
        ast.global("absent", false, Some(ast.ty("Int")), Some(ast.null())),
        ast.global("optional", false, Some(ast.nullable_ty("Int")), Some(ast.null())),
    ];
    let output = bind(&[ast.module("app", &[], &items)]);

    let mismatches: Vec<_> = output
        .diagnostics
        .iter()
        .filter_map(|d| match &d.error {
            SemanticError::ValueNotAssignable { expected, actual, .. } => Some((expected.as_str(), actual.as_str())),
            _ => None,
        })
        .collect();
    assert_eq!(mismatches.len(), 2, "{}", output.diagnostics);
    assert!(mismatches[0].0.ends_with("Int") && mismatches[0].1.ends_with("Float"));
    assert_eq!(mismatches[1].1, "null");
}

// =============================================================================
// Scoping
// =============================================================================

#[test]
fn test_locals_are_visible_only_after_declaration() {
    let arena = Bump::new();
    let ast = AstBuilder::new(&arena);
    let f = ast
        .fun("f")
        .body(&[ast.val("a", ast.name("b")), ast.val("b", ast.int(1))])
        .build();
    let output = bind(&[ast.module("app", &[], &[f])]);

    assert_eq!(
        count(&output, |e| matches!(e, SemanticError::UndefinedIdentifier { name, .. } if name == "b")),
        1
    );
    assert_eq!(
        count(&output, |e| matches!(e, SemanticError::UnresolvedVariable { name, .. } if name == "b")),
        1
    );
    assert_eq!(variable(&output, "a").ty(&output.program).unwrap(), None);
}

#[test]
fn test_module_items_see_each_other_regardless_of_order() {
    let arena = Bump::new();
    let ast = AstBuilder::new(&arena);
    let first = ast.global_val("first", ast.name("second"));
    let second = ast.global_val("second", ast.call("make", &[]));
    let make = ast.fun("make").body(&[ast.ret(ast.float(0.5))]).build();
    let output = bind(&[ast.module("app", &[], &[first, second, make])]);

    assert!(output.diagnostics.is_empty(), "{}", output.diagnostics);
    let ty = variable(&output, "first").ty(&output.program).unwrap().unwrap();
    assert_eq!(ty.base, builtin_types::FLOAT);
}

#[test]
fn test_parameter_shadows_global() {
    let arena = Bump::new();
    let ast = AstBuilder::new(&arena);
    let global = ast.global_val("x", ast.float(1.0));
    let f = ast.fun("f").param("x", "Int").body(&[ast.ret(ast.name("x"))]).build();
    let output = bind(&[ast.module("app", &[], &[global, f])]);

    assert_eq!(return_type(&output, "f").unwrap().base, builtin_types::INT);
    assert_eq!(function(&output, "f").is_pure(&output.program).unwrap(), Some(true));
}

#[test]
fn test_imports_expose_other_modules() {
    let arena = Bump::new();
    let ast = AstBuilder::new(&arena);
    let point = ast.structure("Point", &[], &[ast.struct_member("x", ast.ty("Int"), None)]);
    let geometry = ast.module("geometry", &[], &[point]);

    let uses_point = ast
        .fun("getX")
        .param("p", "Point")
        .body(&[ast.ret(ast.member(ast.name("p"), "x"))])
        .build();
    let app = ast.module("app", &[ast.import("geometry")], &[uses_point]);

    let output = bind(&[app, geometry]);
    assert!(output.diagnostics.is_empty(), "{}", output.diagnostics);
    assert_eq!(return_type(&output, "getX").unwrap().base, builtin_types::INT);
}

#[test]
fn test_types_of_unimported_modules_are_unknown() {
    let arena = Bump::new();
    let ast = AstBuilder::new(&arena);
    let geometry = ast.module("geometry", &[], &[ast.structure("Point", &[], &[])]);
    let f = ast.fun("f").param("p", "Point").body(&[]).build();
    let app = ast.module("app", &[], &[f]);

    let output = bind(&[geometry, app]);
    assert_eq!(
        count(&output, |e| matches!(e, SemanticError::UnknownType { name, .. } if name == "Point")),
        1
    );
}

#[test]
fn test_unknown_import_is_reported() {
    let arena = Bump::new();
    let ast = AstBuilder::new(&arena);
    let app = ast.module("app", &[ast.import("missing.module")], &[]);

    let output = bind(&[app]);
    assert_eq!(
        count(&output, |e| matches!(e, SemanticError::UnresolvedImport { module, .. } if module == "missing.module")),
        1
    );
}

#[test]
fn test_builtins_require_import_when_not_implicit() {
    let arena = Bump::new();
    let ast = AstBuilder::new(&arena);
    let f = ast.fun("f").param("x", "Int").body(&[]).build();
    let module = ast.module("app", &[], &[f]);

    let output = bind_with(
        BinderOptions::default().with_implicit_builtin_import(false),
        &[module],
    );
    assert_eq!(
        count(&output, |e| matches!(e, SemanticError::UnknownType { .. })),
        1
    );

    let g = ast.fun("g").param("x", "Int").body(&[]).build();
    let imported = ast.module("app2", &[ast.import("dotlin.lang")], &[g]);
    let output = bind_with(
        BinderOptions::default().with_implicit_builtin_import(false),
        &[imported],
    );
    assert!(output.diagnostics.is_empty(), "{}", output.diagnostics);
}

// =============================================================================
// Structs and members
// =============================================================================

#[test]
fn test_cyclic_supertypes_are_rejected() {
    let arena = Bump::new();
    let ast = AstBuilder::new(&arena);
    let a = ast.structure("A", &["B"], &[]);
    let b = ast.structure("B", &["A"], &[]);
    let output = bind(&[ast.module("app", &[], &[a, b])]);

    assert_eq!(
        count(&output, |e| matches!(e, SemanticError::CyclicTypeHierarchy { .. })),
        1,
        "{}",
        output.diagnostics
    );
}

#[test]
fn test_duplicate_members_reported_once_per_name() {
    let arena = Bump::new();
    let ast = AstBuilder::new(&arena);
    let s = ast.structure(
        "S",
        &[],
        &[
            ast.struct_member("x", ast.ty("Int"), None),
            ast.struct_member("y", ast.ty("Int"), None),
            ast.struct_member("x", ast.ty("Float"), None),
            ast.struct_member("x", ast.ty("Int"), None),
        ],
    );
    let output = bind(&[ast.module("app", &[], &[s])]);

    let duplicates: Vec<_> = output
        .diagnostics
        .iter()
        .filter_map(|d| match &d.error {
            SemanticError::DuplicateTypeMembers { member, count, .. } => Some((member.clone(), *count)),
            _ => None,
        })
        .collect();
    assert_eq!(duplicates, vec![("x".to_string(), 3)]);
}

#[test]
fn test_null_safe_traversal_rules() {
    let arena = Bump::new();
    let ast = AstBuilder::new(&arena);
    let point = ast.structure("Point", &[], &[ast.struct_member("x", ast.ty("Int"), None)]);
    let unsafe_access = ast
        .fun("unsafe")
        .param_with("p", Some(ast.nullable_ty("Point")))
        .body(&[ast.ret(ast.member(ast.name("p"), "x"))])
        .build();
    let safe_access = ast
        .fun("safe")
        .param_with("p", Some(ast.nullable_ty("Point")))
        .body(&[ast.ret(ast.safe_member(ast.name("p"), "x"))])
        .build();
    let superfluous = ast
        .fun("superfluous")
        .param("p", "Point")
        .body(&[ast.ret(ast.safe_member(ast.name("p"), "x"))])
        .build();
    let output = bind(&[ast.module("app", &[], &[point, unsafe_access, safe_access, superfluous])]);

    assert_eq!(
        count(&output, |e| matches!(e, SemanticError::UnsafeObjectTraversal { .. })),
        1
    );
    assert_eq!(
        count(&output, |e| matches!(e, SemanticError::SuperfluousSafeObjectTraversal { .. })),
        1
    );
    let safe = return_type(&output, "safe").unwrap();
    assert_eq!(safe.base, builtin_types::INT);
    assert!(safe.nullable);
}

#[test]
fn test_unknown_member() {
    let arena = Bump::new();
    let ast = AstBuilder::new(&arena);
    let point = ast.structure("Point", &[], &[ast.struct_member("x", ast.ty("Int"), None)]);
    let f = ast
        .fun("f")
        .param("p", "Point")
        .body(&[ast.ret(ast.member(ast.name("p"), "z"))])
        .build();
    let output = bind(&[ast.module("app", &[], &[point, f])]);

    assert_eq!(
        count(&output, |e| matches!(e, SemanticError::UnknownMember { member, .. } if member == "z")),
        1
    );
    assert_eq!(return_type(&output, "f"), None);
}

#[test]
fn test_extension_function_on_struct() {
    let arena = Bump::new();
    let ast = AstBuilder::new(&arena);
    let point = ast.structure("Point", &[], &[ast.struct_member("x", ast.ty("Int"), None)]);
    let norm = ast.fun("norm").receiver("Point").returns("Float").body(&[]).build();
    let f = ast
        .fun("f")
        .param("p", "Point")
        .body(&[ast.ret(ast.method_call(ast.name("p"), "norm", &[]))])
        .build();
    let output = bind(&[ast.module("app", &[], &[point, norm, f])]);

    assert!(output.diagnostics.is_empty(), "{}", output.diagnostics);
    assert_eq!(return_type(&output, "f").unwrap().base, builtin_types::FLOAT);
}

#[test]
fn test_struct_defaults_use_struct_context_as_boundary() {
    let arena = Bump::new();
    let ast = AstBuilder::new(&arena);
    let items = [
        ast.global_var("origin", ast.int(0)),
        ast.structure(
            "Point",
            &[],
            &[
                ast.struct_member("x", ast.ty("Int"), Some(ast.name("origin"))),
                ast.struct_member("y", ast.ty("Int"), Some(ast.int(0))),
            ],
        ),
        ast.structure("Size", &[], &[ast.struct_member("w", ast.ty("Int"), Some(ast.int(1)))]),
    ];
    let output = bind(&[ast.module("app", &[], &items)]);
    assert!(output.diagnostics.is_empty(), "{}", output.diagnostics);

    let program = &output.program;
    let module = program.modules()[0].context;
    let structure = |name: &str| {
        program
            .structs()
            .iter()
            .find(|s| s.name() == name)
            .unwrap_or_else(|| panic!("struct '{name}' not found"))
    };

    // The module context would cover `origin`; the struct's own context does not.
    let reads = structure("Point").find_reads_beyond(module, program).unwrap();
    assert_eq!(reads.len(), 1);
    assert!(matches!(reads[0].cause, EffectCause::ReadsVariable(_)));
    assert!(structure("Point").find_writes_beyond(module, program).unwrap().is_empty());
    assert!(structure("Size").find_reads_beyond(module, program).unwrap().is_empty());
}

// =============================================================================
// Mutability and effects
// =============================================================================

#[test]
fn test_assignment_to_val_is_rejected() {
    let arena = Bump::new();
    let ast = AstBuilder::new(&arena);
    let f = ast
        .fun("f")
        .param("p", "Int")
        .body(&[
            ast.val("a", ast.int(1)),
            ast.var("b", ast.int(1)),
            ast.assign(ast.name("a"), ast.int(2)),
            ast.assign(ast.name("b"), ast.int(2)),
            ast.assign(ast.name("p"), ast.int(2)),
        ])
        .build();
    let output = bind(&[ast.module("app", &[], &[f])]);

    let names: Vec<_> = output
        .diagnostics
        .iter()
        .filter_map(|d| match &d.error {
            SemanticError::AssignmentToImmutable { name, .. } => Some(name.as_str()),
            _ => None,
        })
        .collect();
    assert_eq!(names, vec!["a", "p"]);
}

#[test]
fn test_purity_classification() {
    let arena = Bump::new();
    let ast = AstBuilder::new(&arena);
    let counter = ast.global_var("counter", ast.int(0));
    let add = ast
        .fun("add")
        .param("a", "Int")
        .param("b", "Int")
        .body(&[ast.ret(ast.binary(ast.name("a"), BinaryOp::Add, ast.name("b")))])
        .build();
    let read = ast.fun("read").body(&[ast.ret(ast.name("counter"))]).build();
    let bump = ast
        .fun("bump")
        .body(&[ast.assign(
            ast.name("counter"),
            ast.binary(ast.name("counter"), BinaryOp::Add, ast.int(1)),
        )])
        .build();
    let local = ast
        .fun("local")
        .body(&[
            ast.var("t", ast.int(1)),
            ast.assign(ast.name("t"), ast.int(2)),
            ast.ret(ast.name("t")),
        ])
        .build();
    let caller = ast.fun("caller").body(&[ast.ret(ast.call("read", &[]))]).build();
    let output = bind(&[ast.module("app", &[], &[counter, add, read, bump, local, caller])]);
    assert!(output.diagnostics.is_empty(), "{}", output.diagnostics);

    let program = &output.program;
    let facts = |name: &str| {
        let f = function(&output, name);
        (f.is_pure(program).unwrap(), f.is_readonly(program).unwrap())
    };
    assert_eq!(facts("add"), (Some(true), Some(true)));
    assert_eq!(facts("read"), (Some(false), Some(true)));
    assert_eq!(facts("bump"), (Some(false), Some(false)));
    assert_eq!(facts("local"), (Some(true), Some(true)));
    assert_eq!(facts("caller"), (Some(false), Some(true)));
}

#[test]
fn test_purity_claims_are_validated() {
    let arena = Bump::new();
    let ast = AstBuilder::new(&arena);
    let counter = ast.global_var("counter", ast.int(0));
    let reads = ast
        .fun("reads")
        .modifiers(FunctionModifiers::PURE)
        .body(&[ast.ret(ast.name("counter"))])
        .build();
    let writes = ast
        .fun("writes")
        .modifiers(FunctionModifiers::READONLY)
        .body(&[ast.assign(ast.name("counter"), ast.int(1))])
        .build();
    let honest = ast
        .fun("honest")
        .modifiers(FunctionModifiers::PURE)
        .param("x", "Int")
        .body(&[ast.ret(ast.unary(UnaryOp::Neg, ast.name("x")))])
        .build();
    let output = bind(&[ast.module("app", &[], &[counter, reads, writes, honest])]);

    let purity: Vec<_> = output
        .diagnostics
        .iter()
        .filter_map(|d| match &d.error {
            SemanticError::PurityViolation { function, count, .. } => Some((function.as_str(), *count)),
            _ => None,
        })
        .collect();
    assert_eq!(purity, vec![("reads", 1)]);

    let readonly: Vec<_> = output
        .diagnostics
        .iter()
        .filter_map(|d| match &d.error {
            SemanticError::ReadonlyViolation { function, .. } => Some(function.as_str()),
            _ => None,
        })
        .collect();
    assert_eq!(readonly, vec!["writes"]);
}

#[test]
fn test_recursive_purity_check_warns() {
    let arena = Bump::new();
    let ast = AstBuilder::new(&arena);
    let fact = ast
        .fun("fact")
        .modifiers(FunctionModifiers::PURE)
        .param("n", "Int")
        .body(&[ast.ret(ast.call("fact", &[ast.name("n")]))])
        .build();
    let module = ast.module("app", &[], &[fact]);

    let output = bind(&[module]);
    assert_eq!(
        count(&output, |e| matches!(e, SemanticError::RecursivePurityCheck { callee, .. } if callee == "fact")),
        1,
        "{}",
        output.diagnostics
    );
    assert_eq!(output.diagnostics.warnings().count(), 1);
    assert_eq!(
        count(&output, |e| matches!(e, SemanticError::PurityViolation { .. })),
        1
    );

    let quiet = bind_with(
        BinderOptions::default().with_warn_on_recursive_purity(false),
        &[module],
    );
    assert_eq!(quiet.diagnostics.warnings().count(), 0);
}

#[test]
fn test_mutual_recursion_terminates() {
    let arena = Bump::new();
    let ast = AstBuilder::new(&arena);
    let ping = ast.fun("ping").body(&[ast.ret(ast.call("pong", &[]))]).build();
    let pong = ast.fun("pong").body(&[ast.ret(ast.call("ping", &[]))]).build();
    let output = bind(&[ast.module("app", &[], &[ping, pong])]);

    assert!(!output.has_errors(), "{}", output.diagnostics);
    assert_eq!(function(&output, "ping").is_pure(&output.program).unwrap(), Some(false));
}

#[test]
fn test_parse_diagnostics_are_forwarded() {
    let arena = Bump::new();
    let ast = AstBuilder::new(&arena);
    let module = ast.module_with_diagnostics("app", &[], &[], &[(Severity::Error, "unexpected token")]);

    let output = bind(&[module]);
    assert!(output.has_errors());
    let diagnostic = output.diagnostics.iter().next().unwrap();
    assert_eq!(diagnostic.message(), format!("at {}: unexpected token", diagnostic.span()));
}

#[test]
fn test_nothrow_is_carried_without_validation() {
    let arena = Bump::new();
    let ast = AstBuilder::new(&arena);
    let f = ast
        .fun("f")
        .modifiers(FunctionModifiers::NOTHROW)
        .body(&[ast.ret(ast.call("g", &[]))])
        .build();
    let g = ast.fun("g").body(&[ast.ret(ast.int(1))]).build();
    let output = bind(&[ast.module("app", &[], &[f, g])]);

    assert!(output.diagnostics.is_empty(), "{}", output.diagnostics);
    assert!(function(&output, "f").modifiers().contains(FunctionModifiers::NOTHROW));
}
