use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use qeutil::{Clause, Mutation, Predicate, SelectClause, UpdateClause};

/// SELECT with `n` predicates alternating between `=` and `in`.
fn build_select(n: usize) -> SelectClause {
    let mut sc = SelectClause::new("orders")
        .columns(["id", "total"])
        .order_by(["id"])
        .limit(50)
        .offset(100);
    for i in 0..n {
        let column = format!("col{i}");
        let predicate = if i % 2 == 0 {
            Predicate::eq(&column, i as i64)
        } else {
            Predicate::in_list(&column, [i as i64, i as i64 + 1, i as i64 + 2])
        };
        sc = sc.filter(predicate.expect("valid predicate"));
    }
    sc
}

fn bench_render(c: &mut Criterion) {
    let mut group = c.benchmark_group("clause/render");

    for n in [1, 5, 10, 50] {
        let sc = build_select(n);
        group.bench_with_input(BenchmarkId::from_parameter(n), &sc, |b, sc| {
            b.iter(|| black_box(sc.render()));
        });
    }

    group.finish();
}

fn bench_cache_key(c: &mut Criterion) {
    let mut group = c.benchmark_group("clause/cache_key");

    for n in [1, 5, 10, 50] {
        let sc = build_select(n);
        group.bench_with_input(BenchmarkId::from_parameter(n), &sc, |b, sc| {
            b.iter(|| black_box(sc.cache_key()));
        });
    }

    group.finish();
}

fn bench_invalidation_patterns(c: &mut Criterion) {
    let mut group = c.benchmark_group("clause/invalidation_patterns");

    for n in [1, 10, 50] {
        let uc = UpdateClause::new("orders")
            .set("status", "closed")
            .filters(build_select(n).predicates);
        group.bench_with_input(BenchmarkId::from_parameter(n), &uc, |b, uc| {
            b.iter(|| black_box(uc.invalidation_patterns()));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_render, bench_cache_key, bench_invalidation_patterns);
criterion_main!(benches);
