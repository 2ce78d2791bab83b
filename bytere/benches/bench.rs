use bytere::{filter, Regex};
use criterion::{black_box, criterion_group, criterion_main, Criterion};

fn bench_compile(c: &mut Criterion) {
    c.bench_function("compile_medium_pattern", |b| {
        b.iter(|| Regex::new(black_box("[A-Za-z_][A-Za-z0-9_]*(x|y)+z")).unwrap())
    });
}

fn bench_literal_match(c: &mut Criterion) {
    let mut re = Regex::new("needle").unwrap();
    let input = b"a fairly long haystack with a needle buried in the middle of it";

    c.bench_function("literal_match", |b| {
        b.iter(|| black_box(re.exec(black_box(input))))
    });
}

fn bench_class_repeat(c: &mut Criterion) {
    let mut re = Regex::new("[a-z]+ [a-z]+").unwrap();
    let input = b"let x = 42; function_name(); lower words here";

    c.bench_function("class_repeat_match", |b| {
        b.iter(|| black_box(re.exec(black_box(input))))
    });
}

fn bench_backtracking_star(c: &mut Criterion) {
    let mut re = Regex::new(".*b.*c").unwrap();
    let input = b"aaaaaaaaaaaaaaaaaaaaaaaaaaaaaabac";

    c.bench_function("backtracking_star", |b| {
        b.iter(|| black_box(re.exec(black_box(input))))
    });
}

fn bench_filter_array(c: &mut Criterion) {
    let strings: Vec<String> = (0..64)
        .map(|i| format!("item_{i}_{}", if i % 3 == 0 { "keep" } else { "drop" }))
        .collect();

    c.bench_function("filter_array", |b| {
        b.iter(|| black_box(filter(black_box(&strings), b"keep$", 0).unwrap()))
    });
}

criterion_group!(
    benches,
    bench_compile,
    bench_literal_match,
    bench_class_repeat,
    bench_backtracking_star,
    bench_filter_array,
);

criterion_main!(benches);
