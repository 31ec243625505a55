//! Benchmarks for conversion classification, overload resolution and
//! expression building.
//!
//! ```bash
//! cargo bench --bench resolution_benchmarks
//! ```

use std::hint::black_box;
use std::rc::Rc;

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use cxxfront::core::TypeHash;
use cxxfront::prelude::*;
use cxxfront::sema::resolve_overload;

fn span() -> Span {
    Span::new(1, 1, 1)
}

fn variable(name: &str, ty: TypeDescriptor) -> Rc<Operand> {
    Operand::identifier(
        Declaration::Variable(Rc::new(VariableEntry::global(name, ty))),
        span(),
    )
}

/// A registry with `width` overloads of `f`, each taking one distinct
/// arithmetic parameter plus a `long` tag.
fn overloaded(width: usize) -> (SymbolRegistry, Vec<TypeHash>) {
    const KINDS: [PrimitiveKind; 8] = [
        PrimitiveKind::Char,
        PrimitiveKind::Short,
        PrimitiveKind::Int,
        PrimitiveKind::UnsignedInt,
        PrimitiveKind::Long,
        PrimitiveKind::Float,
        PrimitiveKind::Double,
        PrimitiveKind::LongDouble,
    ];
    let mut registry = SymbolRegistry::new();
    let mut hashes = Vec::with_capacity(width);
    for (index, kind) in KINDS.iter().cycle().take(width).enumerate() {
        // Repeated signatures need distinct names.
        let entry = FunctionEntry::free(format!("f{}", index / KINDS.len()), TypeDescriptor::void())
            .with_param("x", TypeDescriptor::primitive(*kind))
            .with_param("tag", TypeDescriptor::primitive(PrimitiveKind::Long));
        if let Ok(function) = registry.register_function(entry) {
            hashes.push(function.hash);
        }
    }
    (registry, hashes)
}

/// `Level0 <- Level1 <- ... <- Level{depth}`, single public inheritance.
fn hierarchy(depth: usize) -> SymbolRegistry {
    let mut registry = SymbolRegistry::new();
    let _ = registry.register_class(ClassEntry::structure("Level0"));
    for level in 1..=depth {
        let base = ClassId::new(&format!("Level{}", level - 1));
        let _ = registry.register_class(
            ClassEntry::structure(&format!("Level{level}")).with_base(&base, Access::Public),
        );
    }
    registry
}

fn bench_scalar_classification(c: &mut Criterion) {
    let registry = SymbolRegistry::new();
    let caster = AutoCastManager::new();
    let source = variable("x", TypeDescriptor::primitive(PrimitiveKind::Short));
    let target = TypeDescriptor::primitive(PrimitiveKind::Double);
    c.bench_function("classify_short_to_double", |b| {
        b.iter(|| {
            let mut ctx = SemaContext::new(&registry);
            black_box(caster.classify(&mut ctx, black_box(&source), &target, ConversionMode::Copy))
        })
    });
}

fn bench_derived_to_base(c: &mut Criterion) {
    let mut group = c.benchmark_group("derived_to_base");
    for depth in [1usize, 4, 16] {
        let registry = hierarchy(depth);
        let source = variable(
            "p",
            TypeDescriptor::class(ClassId::new(&format!("Level{depth}"))).pointer_to(),
        );
        let target = TypeDescriptor::class(ClassId::new("Level0")).pointer_to();
        group.bench_with_input(BenchmarkId::from_parameter(depth), &depth, |b, _| {
            b.iter(|| {
                let mut ctx = SemaContext::new(&registry);
                black_box(AutoCastManager::new().classify(
                    &mut ctx,
                    &source,
                    &target,
                    ConversionMode::Copy,
                ))
            })
        });
    }
    group.finish();
}

fn bench_overload_resolution(c: &mut Criterion) {
    let mut group = c.benchmark_group("overload_resolution");
    let args = [
        variable("i", TypeDescriptor::int()),
        Operand::integer(7, span()),
    ];
    for width in [2usize, 8, 32] {
        let (registry, candidates) = overloaded(width);
        group.bench_with_input(BenchmarkId::from_parameter(width), &width, |b, _| {
            b.iter(|| {
                let mut ctx = SemaContext::new(&registry);
                black_box(resolve_overload(&mut ctx, black_box(&candidates), &args, None))
            })
        });
    }
    group.finish();
}

fn bench_expression_building(c: &mut Criterion) {
    let registry = SymbolRegistry::new();
    let x = variable("x", TypeDescriptor::int());
    let d = variable("d", TypeDescriptor::primitive(PrimitiveKind::Double));
    c.bench_function("build_nested_arithmetic", |b| {
        b.iter(|| {
            let mut ctx = SemaContext::new(&registry);
            let mut builder = ExprBuilder::new(&mut ctx);
            let mut node = Rc::clone(&x);
            for _ in 0..32 {
                let sum =
                    builder.build_expression(OperatorCode::Add, &[node, Rc::clone(&d)], span());
                node = builder.build_expression(OperatorCode::Mul, &[sum, Rc::clone(&x)], span());
            }
            black_box(node)
        })
    });
}

criterion_group!(
    benches,
    bench_scalar_classification,
    bench_derived_to_base,
    bench_overload_resolution,
    bench_expression_building
);
criterion_main!(benches);
