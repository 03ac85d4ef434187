//! 购物清单汇总与渲染基准测试

use chrono::NaiveDate;
use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use foodgram::services::shopping_list::{aggregate, render};
use std::hint::black_box;

const UNITS: [&str; 4] = ["g", "ml", "pcs", "tbsp"];

/// recipes 道菜，每道 per_recipe 种配料，名称在 distinct 个之间循环
fn cart_rows(recipes: usize, per_recipe: usize, distinct: usize) -> Vec<(String, String, i64)> {
    (0..recipes * per_recipe)
        .map(|i| {
            let n = i % distinct;
            (
                format!("ingredient_{:04}", n),
                UNITS[n % UNITS.len()].to_string(),
                (i % 500 + 1) as i64,
            )
        })
        .collect()
}

fn bench_aggregate(c: &mut Criterion) {
    let mut group = c.benchmark_group("shopping_list/aggregate");

    for recipes in [1usize, 10, 100] {
        let rows = cart_rows(recipes, 12, 200);
        group.throughput(Throughput::Elements(rows.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(recipes), &rows, |b, rows| {
            b.iter(|| aggregate(black_box(rows.clone())));
        });
    }

    group.finish();
}

fn bench_render(c: &mut Criterion) {
    let today = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap_or_default();
    let mut group = c.benchmark_group("shopping_list/render");

    for distinct in [10usize, 200, 2000] {
        let items = aggregate(cart_rows(50, 40, distinct));
        group.throughput(Throughput::Elements(items.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(distinct), &items, |b, items| {
            b.iter(|| render(black_box("Ivan Petrov"), black_box(items), today));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_aggregate, bench_render);
criterion_main!(benches);
