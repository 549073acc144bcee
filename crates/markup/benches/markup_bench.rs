use criterion::{Criterion, black_box, criterion_group, criterion_main};
use markup::perf_fixtures::{make_blocks, make_unclosed_quoted_brackets, make_verbatim_blocks};
use markup::{Parser, tokenize};

const SMALL_BLOCKS: usize = 64;
const LARGE_BLOCKS: usize = 20_000;

fn make_bracket_adversarial(bytes: usize) -> String {
    let mut body = String::with_capacity(bytes + 32);
    while body.len() < bytes {
        body.push_str("[a b=\"x [");
        body.push_str("[/");
    }
    body
}

fn bench_tokenize_small(c: &mut Criterion) {
    let input = make_blocks(SMALL_BLOCKS);
    c.bench_function("bench_tokenize_small", |b| {
        b.iter(|| {
            let tokens = tokenize(black_box(&input));
            black_box(tokens.len());
        });
    });
}

fn bench_tokenize_large(c: &mut Criterion) {
    let input = make_blocks(LARGE_BLOCKS);
    c.bench_function("bench_tokenize_large", |b| {
        b.iter(|| {
            let tokens = tokenize(black_box(&input));
            black_box(tokens.len());
        });
    });
}

fn bench_tree_build_large(c: &mut Criterion) {
    let parser = Parser::bbcode();
    let input = make_blocks(LARGE_BLOCKS);
    let tokens = tokenize(&input);
    c.bench_function("bench_tree_build_large", |b| {
        b.iter(|| {
            let tree = parser.build_tree(black_box(&tokens));
            black_box(tree);
        });
    });
}

fn bench_tree_build_verbatim(c: &mut Criterion) {
    let parser = Parser::bbcode();
    let input = make_verbatim_blocks(LARGE_BLOCKS);
    let tokens = tokenize(&input);
    c.bench_function("bench_tree_build_verbatim", |b| {
        b.iter(|| {
            let tree = parser.build_tree(black_box(&tokens));
            black_box(tree);
        });
    });
}

fn bench_parse_large_end_to_end(c: &mut Criterion) {
    let parser = Parser::bbcode();
    let input = make_blocks(LARGE_BLOCKS);
    c.bench_function("bench_parse_large_end_to_end", |b| {
        b.iter(|| {
            let tree = parser.parse(black_box(&input));
            black_box(tree);
        });
    });
}

fn bench_tokenize_bracket_adversarial(c: &mut Criterion) {
    let input = make_bracket_adversarial(512 * 1024);
    c.bench_function("bench_tokenize_bracket_adversarial", |b| {
        b.iter(|| {
            let tokens = tokenize(black_box(&input));
            black_box(tokens.len());
        });
    });
}

fn bench_tokenize_unclosed_quoted_brackets(c: &mut Criterion) {
    let input = make_unclosed_quoted_brackets(80_000);
    c.bench_function("bench_tokenize_unclosed_quoted_brackets", |b| {
        b.iter(|| {
            let tokens = tokenize(black_box(&input));
            black_box(tokens.len());
        });
    });
}

criterion_group!(
    benches,
    bench_tokenize_small,
    bench_tokenize_large,
    bench_tree_build_large,
    bench_tree_build_verbatim,
    bench_parse_large_end_to_end,
    bench_tokenize_bracket_adversarial,
    bench_tokenize_unclosed_quoted_brackets
);
criterion_main!(benches);
