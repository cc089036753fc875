//! Validation Benchmarks
//!
//! Measures the cost of validating argument lists against the documentation
//! fixture in `tests/fixtures/p5_subset.json`.
//!
//! - **Cold**: first call on a fresh validator, including schema compilation
//! - **Cached**: repeated calls served from the schema cache
//! - **Failures**: rejected argument lists, which check every overload
//! - **Type expressions**: splitting and lexing declared types
//!
//! ## Running Benchmarks
//!
//! ```bash
//! cargo bench
//! cargo bench cached_validation
//! ```

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use param_validator::type_expr::split_alternatives;
use param_validator::{Catalog, Predicate, Validator, Value};

const P5_SUBSET: &str = include_str!("../tests/fixtures/p5_subset.json");

fn load_catalog() -> Catalog {
    Catalog::from_json_str(P5_SUBSET).expect("fixture catalog should parse")
}

fn color_validator(catalog: &Catalog) -> Validator<'_> {
    let mut validator = Validator::new(catalog).with_unregistered_type_warnings(false);
    validator.register_type("p5.Color", Predicate::instance_of("p5.Color"));
    validator
}

fn calls() -> Vec<(&'static str, &'static str, Vec<Value>)> {
    vec![
        ("fill_rgb", "fill", vec![255.into(), 128.into(), 0.into()]),
        ("fill_string", "fill", vec!["#ff8800".into()]),
        ("fill_color", "fill", vec![Value::opaque("p5.Color")]),
        ("blend_mode", "blendMode", vec!["MULTIPLY".into()]),
        ("text", "text", vec!["hello".into(), 10.into(), 20.into()]),
        ("vector_add", "p5.Vector.add", vec![vec![1, 2, 3].into()]),
    ]
}

// ============================================================================
// Catalog Loading
// ============================================================================

fn bench_catalog_loading(c: &mut Criterion) {
    let mut group = c.benchmark_group("catalog_loading");
    group.throughput(Throughput::Bytes(P5_SUBSET.len() as u64));
    group.bench_function("p5_subset", |b| {
        b.iter(|| Catalog::from_json_str(black_box(P5_SUBSET)))
    });
    group.finish();
}

// ============================================================================
// Cold vs Cached Validation
// ============================================================================

fn bench_cold_validation(c: &mut Criterion) {
    let catalog = load_catalog();
    let mut group = c.benchmark_group("cold_validation");

    for (name, function, args) in calls() {
        group.throughput(Throughput::Elements(1));
        group.bench_with_input(BenchmarkId::from_parameter(name), &args, |b, args| {
            b.iter(|| {
                let validator = color_validator(&catalog);
                validator.is_valid(black_box(function), black_box(args))
            })
        });
    }

    group.finish();
}

fn bench_cached_validation(c: &mut Criterion) {
    let catalog = load_catalog();
    let validator = color_validator(&catalog);
    let mut group = c.benchmark_group("cached_validation");

    for (name, function, args) in calls() {
        assert!(validator.is_valid(function, &args), "{name} should validate");
        group.throughput(Throughput::Elements(1));
        group.bench_with_input(BenchmarkId::from_parameter(name), &args, |b, args| {
            b.iter(|| validator.is_valid(black_box(function), black_box(args)))
        });
    }

    group.finish();
}

// ============================================================================
// Rejected Arguments
// ============================================================================

fn bench_failures(c: &mut Criterion) {
    let catalog = load_catalog();
    let validator = color_validator(&catalog);
    let mut group = c.benchmark_group("failures");

    let cases: Vec<(&str, &str, Vec<Value>)> = vec![
        ("fill_boolean", "fill", vec![true.into()]),
        ("fill_missing", "fill", vec![100.into(), 100.into()]),
        ("blend_mode_case", "blendMode", vec!["multiply".into()]),
        ("no_loop_extra", "noLoop", vec![1.into()]),
    ];

    for (name, function, args) in cases {
        group.bench_with_input(BenchmarkId::from_parameter(name), &args, |b, args| {
            b.iter(|| validator.validate(black_box(function), black_box(args)).is_err())
        });
    }

    group.finish();
}

// ============================================================================
// Type Expressions
// ============================================================================

fn bench_type_expressions(c: &mut Criterion) {
    let mut group = c.benchmark_group("type_expressions");

    let exprs = [
        ("single", "Number"),
        ("union", "p5.Color|Number[]|String"),
        (
            "enum",
            "BLEND|DARKEST|LIGHTEST|DIFFERENCE|MULTIPLY|EXCLUSION|SCREEN|REPLACE|OVERLAY",
        ),
    ];

    for (name, expr) in exprs {
        group.bench_with_input(BenchmarkId::from_parameter(name), expr, |b, expr| {
            b.iter(|| split_alternatives(black_box(expr)))
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_catalog_loading,
    bench_cold_validation,
    bench_cached_validation,
    bench_failures,
    bench_type_expressions,
);

criterion_main!(benches);
