use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use salak_core::config::{ConfigLayer, LayerRegistry};
use salak_core::presets::builtin_registry;
use salak_core::{RuleSeverity, resolve};
use std::hint::black_box;

/// Benchmark resolving the built-in presets
fn bench_presets(c: &mut Criterion) {
    let registry = builtin_registry().expect("built-in presets");
    let mut group = c.benchmark_group("presets");

    for name in ["salak", "salak/react", "salak/browser"] {
        group.bench_with_input(BenchmarkId::from_parameter(name), name, |b, name| {
            b.iter(|| black_box(resolve(name, &registry)));
        });
    }

    group.bench_function("resolve_all", |b| {
        b.iter(|| black_box(registry.resolve_all()));
    });

    group.finish();
}

/// Linear chain `layer-0 ← layer-1 ← ... ← layer-n`, each layer adding and
/// overriding rules
fn chain_registry(depth: usize, rules_per_layer: usize) -> LayerRegistry {
    let mut registry = LayerRegistry::new();
    for level in 0..depth {
        let mut layer = ConfigLayer::new(format!("layer-{level}"));
        if level > 0 {
            layer = layer.with_extends([format!("layer-{}", level - 1)]);
        }
        for rule in 0..rules_per_layer {
            let severity = if (rule + level) % 2 == 0 {
                RuleSeverity::Error
            } else {
                RuleSeverity::Warn
            };
            layer = layer.with_rule(format!("rule-{rule}"), severity);
        }
        registry.insert(layer).expect("unique layer names");
    }
    registry
}

/// Benchmark deep `extends` chains
fn bench_chains(c: &mut Criterion) {
    let mut group = c.benchmark_group("chains");

    for depth in [4, 16, 64] {
        let registry = chain_registry(depth, 50);
        let entry = format!("layer-{}", depth - 1);
        group.bench_with_input(BenchmarkId::from_parameter(depth), &entry, |b, entry| {
            b.iter(|| black_box(resolve(entry, &registry)));
        });
    }

    group.finish();
}

/// Benchmark whole-registry validation
fn bench_validate(c: &mut Criterion) {
    let registry = chain_registry(64, 10);
    c.bench_function("validate_chain_64", |b| {
        b.iter(|| black_box(registry.validate()));
    });
}

criterion_group!(benches, bench_presets, bench_chains, bench_validate);
criterion_main!(benches);
