use RustedEquationSolver::numerical::interval::IntervalSet;
use RustedEquationSolver::numerical::root_finding::{bisection, newton, split_interval};
use RustedEquationSolver::symbolic::symbolic_engine::Expr;
use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;

const FORMULA: &str = "\\frac{x^3}{3}-\\sin{2*x}+\\log_{2}{x^2+1}-2";

fn bench_parse(c: &mut Criterion) {
    c.bench_function("parse formula", |b| {
        b.iter(|| Expr::parse_expression(black_box(FORMULA)))
    });
}

fn bench_differentiate(c: &mut Criterion) {
    let f = Expr::parse_expression(FORMULA).unwrap();
    c.bench_function("differentiate formula", |b| b.iter(|| black_box(&f).differentiate()));
}

fn bench_solvers(c: &mut Criterion) {
    let f = Expr::parse_expression(FORMULA).unwrap();
    let df = f.differentiate();
    let set: IntervalSet = "(-5;5)".parse().unwrap();
    let mut group = c.benchmark_group("root finding");
    group.bench_function("bracket scan", |b| {
        b.iter(|| split_interval(&f, black_box(&set), 0.01))
    });
    group.bench_function("bisection", |b| {
        b.iter(|| bisection(&f, black_box(1.0), black_box(3.0), 10))
    });
    group.bench_function("newton", |b| {
        b.iter(|| newton(&f, &df, black_box(2.0), black_box(3.0), 10))
    });
    group.finish();
}

criterion_group!(benches, bench_parse, bench_differentiate, bench_solvers);
criterion_main!(benches);
