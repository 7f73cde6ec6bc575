// Copyright (c) The exprus Authors.
// Licensed under the MIT License.

use criterion::{criterion_group, criterion_main, Criterion};
use std::hint::black_box;

use exprus::{compile, Expr, Ref, SymbolTable, Value, Vm};

fn discount_expr() -> Ref<Expr> {
    let price = Expr::column("price", Some(0));
    Expr::if_expr(
        Expr::call("gt", vec![price.clone(), Expr::literal(100)]),
        Expr::call("mul", vec![price.clone(), Expr::literal(0.9)]),
        price,
    )
}

fn bench_compile(c: &mut Criterion) {
    let symbols = SymbolTable::default();
    let expr = discount_expr();

    c.bench_function("compile_discount_expr", |b| {
        b.iter(|| compile(black_box(&expr), &symbols))
    });
}

fn bench_evaluate(c: &mut Criterion) {
    let symbols = SymbolTable::default();
    let program = compile(&discount_expr(), &symbols).unwrap();
    let row = [Value::Integer(250)];

    c.bench_function("evaluate_discount_row", |b| {
        b.iter(|| Vm::evaluate(&program, black_box(&row)))
    });
}

fn bench_accumulate(c: &mut Criterion) {
    let symbols = SymbolTable::default();
    let program = compile(
        &Expr::call("sum", vec![Expr::column("price", Some(0))]),
        &symbols,
    )
    .unwrap();
    let row = [Value::Integer(3)];

    c.bench_function("accumulate_sum_row", |b| {
        let mut instance = Vm::new_instance(&program);
        b.iter(|| Vm::accumulate(&program, &mut instance, black_box(&row)))
    });
}

criterion_group!(benches, bench_compile, bench_evaluate, bench_accumulate);
criterion_main!(benches);
