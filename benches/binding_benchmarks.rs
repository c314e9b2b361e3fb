//! Binding benchmarks over synthetic modules.
//!
//! Each module declares a chain of functions where every function calls its
//! predecessor, so return types and purity are resolved on demand across the
//! whole chain.
//!
//! ## Profiling with Puffin
//!
//! ```bash
//! cargo bench --features profile-with-puffin -- --profile-time 5
//! ```

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use dotlin::prelude::*;
use dotlin_ast::Item;
use std::hint::black_box;

#[cfg(feature = "profile-with-puffin")]
static FRAME_VIEW: std::sync::OnceLock<puffin::GlobalFrameView> = std::sync::OnceLock::new();

#[cfg(feature = "profile-with-puffin")]
fn setup_profiler() {
    puffin::set_scopes_on(true);
    FRAME_VIEW.get_or_init(puffin::GlobalFrameView::default);
}

#[cfg(not(feature = "profile-with-puffin"))]
fn setup_profiler() {}

#[cfg(feature = "profile-with-puffin")]
fn end_profiling_frame() {
    puffin::GlobalProfiler::lock().new_frame();
}

#[cfg(not(feature = "profile-with-puffin"))]
fn end_profiling_frame() {}

/// `count` functions `f0..fN`; `fI(x: Int)` returns `fI-1(x) + x` and reads a
/// global every tenth step.
fn call_chain<'ast>(ast: &AstBuilder<'ast>, count: usize) -> &'ast Module<'ast> {
    let mut items: Vec<Item<'ast>> = vec![ast.global_var("counter", ast.int(0))];
    items.push(
        ast.fun("f0")
            .param("x", "Int")
            .body(&[ast.ret(ast.name("x"))])
            .build(),
    );
    for i in 1..count {
        let previous = ast.call(&format!("f{}", i - 1), &[ast.name("x")]);
        let addend = if i % 10 == 0 { ast.name("counter") } else { ast.name("x") };
        let body = [ast.ret(ast.binary(previous, BinaryOp::Add, addend))];
        let mut function = ast.fun(&format!("f{i}")).param("x", "Int").body(&body);
        if i % 10 != 0 {
            function = function.modifiers(FunctionModifiers::PURE);
        }
        items.push(function.build());
    }
    // Reverse so every call is to a function declared further down.
    items[1..].reverse();
    ast.module("bench", &[], &items)
}

fn chain_benchmarks(c: &mut Criterion) {
    setup_profiler();

    let mut group = c.benchmark_group("binder/call_chain");
    for count in [10, 100, 300] {
        group.throughput(Throughput::Elements(count as u64));
        group.bench_with_input(BenchmarkId::from_parameter(count), &count, |b, &count| {
            b.iter(|| {
                let arena = Bump::new();
                let ast = AstBuilder::new(&arena);
                let module = call_chain(&ast, count);
                let output = Binder::default().bind(&[module]).unwrap();
                end_profiling_frame();
                black_box(output.diagnostics.len())
            });
        });
    }
    group.finish();
}

fn analysis_only_benchmarks(c: &mut Criterion) {
    let arena = Bump::new();
    let ast = AstBuilder::new(&arena);
    let module = call_chain(&ast, 200);

    c.bench_function("binder/bind_prebuilt_200", |b| {
        b.iter(|| {
            let output = Binder::default().bind(black_box(&[module])).unwrap();
            black_box(output.has_errors())
        });
    });
}

criterion_group!(benches, chain_benchmarks, analysis_only_benchmarks);
criterion_main!(benches);
