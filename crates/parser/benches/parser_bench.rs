use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;
use whisker_parser::{Lexer, ParseOptions, parse, parse_without_processing};

const PAGE: &str = r#"<!doctype html>
<html>
  <head><title>{{title}}</title></head>
  <body>
    {{#if user}}
      <p>Welcome back, {{user.name}}!</p>
    {{else}}
      <p>Please {{> login-link href="/login"}}</p>
    {{/if}}
    <ul>
    {{#each items as |item index|}}
      <li class="{{#if @first}}first{{/if}}">{{index}}: {{item.label}} ({{format item.price currency="EUR"}})</li>
    {{/each}}
    </ul>
    {{!-- footer --}}
    {{{footer}}}
  </body>
</html>
"#;

fn bench_lexer(c: &mut Criterion) {
    c.bench_function("lexer_page", |b| {
        b.iter(|| {
            let tokens = Lexer::new(black_box(PAGE)).tokenize();
            let _ = black_box(tokens);
        });
    });
}

fn bench_parser_simple(c: &mut Criterion) {
    let options = ParseOptions::default();
    c.bench_function("parser_simple_mustache", |b| {
        b.iter(|| {
            let _ = black_box(parse(black_box("Hello {{name}}!"), &options));
        });
    });
}

fn bench_parser_page(c: &mut Criterion) {
    let options = ParseOptions::default();
    c.bench_function("parser_page", |b| {
        b.iter(|| {
            let _ = black_box(parse(black_box(PAGE), &options));
        });
    });
}

fn bench_whitespace_pass(c: &mut Criterion) {
    let options = ParseOptions::default();
    let raw = ParseOptions {
        track_locations: false,
        ..ParseOptions::default()
    };
    c.bench_function("parser_page_without_whitespace_pass", |b| {
        b.iter(|| {
            let _ = black_box(parse_without_processing(black_box(PAGE), &options));
        });
    });
    c.bench_function("parser_page_without_locations", |b| {
        b.iter(|| {
            let _ = black_box(parse(black_box(PAGE), &raw));
        });
    });
}

criterion_group!(
    benches,
    bench_lexer,
    bench_parser_simple,
    bench_parser_page,
    bench_whitespace_pass
);
criterion_main!(benches);
