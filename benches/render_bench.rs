use criterion::{Criterion, criterion_group, criterion_main};
use serde_json::json;
use std::hint::black_box;
use whisker::{CompileOptions, Environment, Value};

const PAGE: &str = r#"<h1>{{title}}</h1>
<ul>
{{#each items as |item index|}}
  <li class="{{#if @first}}first{{/if}}">{{index}}: {{item.label}} {{> price item}}</li>
{{/each}}
</ul>
{{#unless items}}<p>empty</p>{{/unless}}
"#;

fn context(rows: usize) -> Value {
    let items: Vec<_> = (0..rows)
        .map(|i| json!({"label": format!("row <{}>", i), "price": i * 3}))
        .collect();
    Value::from(json!({"title": "Inventory", "items": items}))
}

fn environment() -> Environment {
    let mut env = Environment::with_builtins();
    env.register_partial("price", "${{price}}");
    env
}

fn bench_compile(c: &mut Criterion) {
    let options = CompileOptions::default();
    c.bench_function("compile_page", |b| {
        b.iter(|| {
            let _ = black_box(whisker::compile(black_box(PAGE), &options));
        });
    });
}

fn bench_render(c: &mut Criterion) {
    let template = whisker::compile(PAGE, &CompileOptions::default()).unwrap();
    let env = environment();
    for rows in [10, 1000] {
        let context = context(rows);
        c.bench_function(&format!("render_page_{}_rows", rows), |b| {
            b.iter(|| {
                let _ = black_box(template.render(black_box(&context), &env));
            });
        });
    }
}

fn bench_render_strict(c: &mut Criterion) {
    let options = CompileOptions {
        strict: true,
        ..CompileOptions::default()
    };
    let template = whisker::compile(PAGE, &options).unwrap();
    let env = environment();
    let context = context(100);
    c.bench_function("render_page_strict", |b| {
        b.iter(|| {
            let _ = black_box(template.render(black_box(&context), &env));
        });
    });
}

criterion_group!(benches, bench_compile, bench_render, bench_render_strict);
criterion_main!(benches);
