#![allow(clippy::uninlined_format_args)]
//! 容器解析性能基准测试

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use modular::infrastructure::{
    CachingContainer, CompositeModule, Container, KeyConvertingModule, Module, ServiceModule, ServiceProviderContainer,
};
use modular::services::Service;
use modular::tools::inspect;
use std::sync::Arc;

/// 测试用的复杂服务（包含多个字段）
struct ComplexService {
    id: u64,
    name: String,
}

/// 构建一条长度为 `depth` 的依赖链：`s{i}` 依赖 `s{i-1}`
fn chain_module(depth: usize) -> ServiceModule {
    let mut module = ServiceModule::new().factory("s0", Service::value(0u64));
    for i in 1..depth {
        let prev = format!("s{}", i - 1);
        module = module.factory(
            format!("s{}", i),
            Service::factory([prev], |args| Ok(*args.get::<u64>(0)? + 1)),
        );
    }
    module
}

/// 基准测试：依赖链解析，缓存与非缓存
fn bench_chain_resolution(c: &mut Criterion) {
    let mut group = c.benchmark_group("chain_resolution");

    for depth in [1usize, 10, 100] {
        let module = chain_module(depth);
        let top = format!("s{}", depth - 1);

        let provider = ServiceProviderContainer::new(&module);
        group.bench_with_input(BenchmarkId::new("uncached", depth), &top, |b, top| {
            b.iter(|| black_box(provider.get(top).unwrap()))
        });

        let cached = CachingContainer::for_module(&module);
        cached.get(&top).unwrap();
        group.bench_with_input(BenchmarkId::new("cached", depth), &top, |b, top| {
            b.iter(|| black_box(cached.get(top).unwrap()))
        });
    }

    group.finish();
}

/// 基准测试：复杂服务的首次解析（缓存未命中）
fn bench_cache_miss(c: &mut Criterion) {
    let module = ServiceModule::new().factory(
        "complex",
        Service::factory(Vec::<String>::new(), |_| {
            Ok(ComplexService {
                id: 12345,
                name: "TestService".to_string(),
            })
        }),
    );

    c.bench_function("cache_miss", |b| {
        b.iter(|| {
            let container = CachingContainer::for_module(&module);
            let service = container.get("complex").unwrap();
            black_box(service.downcast::<ComplexService>().map(|s| (s.id, s.name.len())))
        })
    });
}

/// 基准测试：检查由多个前缀模块组成的应用
fn bench_inspect(c: &mut Criterion) {
    let mut group = c.benchmark_group("inspect");

    for modules in [1usize, 10, 50] {
        let app: CompositeModule = (0..modules)
            .map(|i| Arc::new(KeyConvertingModule::prefixed(chain_module(20), format!("m{}/", i))) as Arc<dyn Module>)
            .collect();

        group.bench_with_input(BenchmarkId::from_parameter(modules), &app, |b, app| {
            b.iter(|| black_box(inspect(app, Vec::<String>::new())))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_chain_resolution, bench_cache_miss, bench_inspect);
criterion_main!(benches);
