//! Partial Tests
//!
//! Registered partials, dynamic names, partial blocks and standalone
//! indentation.

use serde_json::json;
use whisker_codegen::*;
use whisker_parser::parse;

fn render_env(
    source: &str,
    context: serde_json::Value,
    env: &Environment,
    options: &CompileOptions,
) -> TemplateResult<String> {
    let program = parse(source, &options.parse_options(None))?;
    compile(&program, options)?.render(&Value::from(context), env)
}

fn env_with(partials: &[(&str, &str)]) -> Environment {
    let mut env = Environment::with_builtins();
    for (name, source) in partials {
        env.register_partial(*name, *source);
    }
    env
}

fn render(source: &str, context: serde_json::Value, partials: &[(&str, &str)]) -> String {
    render_env(source, context, &env_with(partials), &CompileOptions::default()).unwrap()
}

// ===== Basic Partial Tests =====

#[test]
fn test_partial_uses_current_context() {
    let out = render(
        "Dear {{> name}}.",
        json!({"first": "Ann"}),
        &[("name", "{{first}}")],
    );
    assert_eq!(out, "Dear Ann.");
}

#[test]
fn test_partial_with_context_param() {
    let out = render(
        "{{> card person}}",
        json!({"person": {"name": "Ann"}}),
        &[("card", "<{{name}}>")],
    );
    assert_eq!(out, "<Ann>");
}

#[test]
fn test_partial_hash_overrides_context() {
    let out = render(
        "{{> card name=\"Bob\"}}|{{> card}}",
        json!({"name": "Ann", "age": 3}),
        &[("card", "{{name}}:{{age}}")],
    );
    assert_eq!(out, "Bob:3|Ann:3");
}

#[test]
fn test_partial_in_loop() {
    let out = render(
        "{{#each people}}{{> row}}{{/each}}",
        json!({"people": [{"n": 1}, {"n": 2}]}),
        &[("row", "[{{n}}]")],
    );
    assert_eq!(out, "[1][2]");
}

#[test]
fn test_partial_reaches_caller_contexts() {
    let out = render(
        "{{#each items}}{{> item}}{{/each}}",
        json!({"title": "T", "items": ["a", "b"]}),
        &[("item", "{{../title}}{{.}} ")],
    );
    assert_eq!(out, "Ta Tb ");
}

#[test]
fn test_partial_sees_root_data() {
    let out = render(
        "{{#with inner}}{{> p}}{{/with}}",
        json!({"title": "T", "inner": {"x": 1}}),
        &[("p", "{{@root.title}}{{x}}")],
    );
    assert_eq!(out, "T1");
}

#[test]
fn test_nested_partials() {
    let out = render(
        "{{> outer}}",
        json!({"v": "!"}),
        &[("outer", "({{> inner}})"), ("inner", "{{v}}")],
    );
    assert_eq!(out, "(!)");
}

#[test]
fn test_quoted_partial_names() {
    let out = render(
        "{{> \"my partial\"}}",
        json!({}),
        &[("my partial", "ok")],
    );
    assert_eq!(out, "ok");
}

// ===== Dynamic Partial Tests =====

#[test]
fn test_dynamic_partial_name() {
    let partials = [("a", "A"), ("b", "B")];
    let source = "{{> (lookup . \"which\")}}";
    assert_eq!(render(source, json!({"which": "a"}), &partials), "A");
    assert_eq!(render(source, json!({"which": "b"}), &partials), "B");
}

#[test]
fn test_dynamic_partial_from_helper() {
    let mut env = env_with(&[("admin", "ADMIN"), ("guest", "GUEST")]);
    env.register_helper("role", |_, options| {
        let admin = options.this().get_property("admin").is_truthy();
        Ok(Value::from(if admin { "admin" } else { "guest" }))
    });
    let options = CompileOptions::default();
    assert_eq!(
        render_env("{{> (role)}}", json!({"admin": true}), &env, &options).unwrap(),
        "ADMIN"
    );
    assert_eq!(
        render_env("{{> (role)}}", json!({}), &env, &options).unwrap(),
        "GUEST"
    );
}

// ===== Missing Partial Tests =====

#[test]
fn test_missing_partial() {
    let env = Environment::with_builtins();
    let out = render_env("a{{> nope}}b", json!({}), &env, &CompileOptions::default()).unwrap();
    assert_eq!(out, "ab");

    let strict = CompileOptions {
        strict: true,
        ..CompileOptions::default()
    };
    let error = render_env("a{{> nope}}b", json!({}), &env, &strict).unwrap_err();
    assert!(matches!(
        error,
        TemplateError::Runtime(RuntimeError::MissingPartial { ref name }) if name == "nope"
    ));
}

#[test]
fn test_partial_block_fallback() {
    let out = render("{{#> nope}}fallback {{x}}{{/nope}}", json!({"x": 1}), &[]);
    assert_eq!(out, "fallback 1");
}

#[test]
fn test_partial_block_prefers_registered_partial() {
    let out = render("{{#> p}}fallback{{/p}}", json!({}), &[("p", "found")]);
    assert_eq!(out, "found");
}

#[test]
fn test_unregister_partial() {
    let mut env = env_with(&[("p", "P")]);
    assert!(env.unregister_partial("p").is_some());
    let out = render_env("[{{> p}}]", json!({}), &env, &CompileOptions::default()).unwrap();
    assert_eq!(out, "[]");
}

// ===== Partial Block Tests =====

#[test]
fn test_partial_block_layout() {
    let out = render(
        "{{#> layout}}Hello {{name}}{{/layout}}",
        json!({"name": "Ann"}),
        &[("layout", "<main>{{> @partial-block}}</main>")],
    );
    assert_eq!(out, "<main>Hello Ann</main>");
}

#[test]
fn test_partial_block_sees_call_site_scope() {
    let out = render(
        "{{#each items as |item|}}{{#> wrap}}{{item}}{{/wrap}}{{/each}}",
        json!({"items": ["a", "b"]}),
        &[("wrap", "({{> @partial-block}})")],
    );
    assert_eq!(out, "(a)(b)");
}

#[test]
fn test_nested_partial_blocks() {
    let partials = [
        ("outer", "<o>{{#> inner}}{{> @partial-block}}{{/inner}}</o>"),
        ("inner", "<i>{{> @partial-block}}</i>"),
    ];
    let out = render("{{#> outer}}body{{/outer}}", json!({}), &partials);
    assert_eq!(out, "<o><i>body</i></o>");
}

#[test]
fn test_partial_block_outside_partial() {
    let env = Environment::with_builtins();
    let out = render_env("[{{> @partial-block}}]", json!({}), &env, &CompileOptions::default())
        .unwrap();
    assert_eq!(out, "[]");
}

// ===== Indentation Tests =====

#[test]
fn test_standalone_partial_is_indented() {
    let out = render("a\n  {{> p}}\nb", json!({}), &[("p", "x\ny\n")]);
    assert_eq!(out, "a\n  x\n  y\nb");
}

#[test]
fn test_prevent_indent() {
    let options = CompileOptions {
        prevent_indent: true,
        ..CompileOptions::default()
    };
    let out = render_env(
        "a\n  {{> p}}\nb",
        json!({}),
        &env_with(&[("p", "x\ny\n")]),
        &options,
    )
    .unwrap();
    assert_eq!(out, "a\n  x\ny\nb");
}

#[test]
fn test_inline_partial_is_not_indented() {
    let out = render("a {{> p}} b", json!({}), &[("p", "x\ny")]);
    assert_eq!(out, "a x\ny b");
}

// ===== Option Tests =====

#[test]
fn test_explicit_partial_context() {
    let options = CompileOptions {
        explicit_partial_context: true,
        ..CompileOptions::default()
    };
    let env = env_with(&[("p", "[{{name}}]")]);
    let context = json!({"name": "Ann", "person": {"name": "Bob"}});
    assert_eq!(
        render_env("{{> p}}", context.clone(), &env, &options).unwrap(),
        "[]"
    );
    assert_eq!(
        render_env("{{> p person}}", context, &env, &options).unwrap(),
        "[Bob]"
    );
}

#[test]
fn test_partials_compile_with_caller_options() {
    let strict = CompileOptions {
        strict: true,
        ..CompileOptions::default()
    };
    let env = env_with(&[("p", "{{missing}}")]);
    assert!(render_env("{{> p}}", json!({}), &env, &strict).is_err());
    assert_eq!(
        render_env("{{> p}}", json!({}), &env, &CompileOptions::default()).unwrap(),
        ""
    );
}

#[test]
fn test_source_partial_compiled_per_caller_options() {
    let strict = CompileOptions {
        strict: true,
        ..CompileOptions::default()
    };
    let program = parse("{{> x}}", &strict.parse_options(None)).unwrap();
    let mut env = env_with(&[("x", "[{{missing}}]")]);
    env.register_partial("a", compile(&program, &strict).unwrap());

    // The lenient root compiles `x` first; the strict caller must not reuse it.
    let error = render_env("{{> x}}{{> a}}", json!({}), &env, &CompileOptions::default())
        .unwrap_err();
    assert!(matches!(
        error,
        TemplateError::Runtime(RuntimeError::MissingProperty { ref name, .. }) if name == "missing"
    ));
    assert_eq!(
        render_env("{{> x}}{{> x}}", json!({}), &env, &CompileOptions::default()).unwrap(),
        "[][]"
    );
}

#[test]
fn test_compiled_partial() {
    let program = parse("<{{n}}>", &Default::default()).unwrap();
    let partial = compile(&program, &CompileOptions::default()).unwrap();
    let mut env = Environment::with_builtins();
    env.register_partial("p", partial);
    let out = render_env(
        "{{#each xs}}{{> p n=this}}{{/each}}",
        json!({"xs": [1, 2]}),
        &env,
        &CompileOptions::default(),
    )
    .unwrap();
    assert_eq!(out, "<1><2>");
}

// ===== Error Tests =====

#[test]
fn test_recursive_partial_hits_depth_limit() {
    let env = env_with(&[("p", "{{> p}}")]);
    let error = render_env("{{> p}}", json!({}), &env, &CompileOptions::default()).unwrap_err();
    assert!(matches!(
        error,
        TemplateError::Runtime(RuntimeError::DepthExceeded { limit: 64 })
    ));
}

#[test]
fn test_bounded_recursion_renders() {
    let env = env_with(&[("node", "{{name}}{{#each children}}({{> node}}){{/each}}")]);
    let tree = json!({
        "name": "a",
        "children": [{"name": "b", "children": [{"name": "c"}]}, {"name": "d"}]
    });
    let out = render_env("{{> node}}", tree, &env, &CompileOptions::default()).unwrap();
    assert_eq!(out, "a(b(c))(d)");
}

#[test]
fn test_partial_syntax_error() {
    let env = env_with(&[("broken", "{{#if x}}unclosed")]);
    let error = render_env("{{> broken}}", json!({}), &env, &CompileOptions::default())
        .unwrap_err();
    assert!(matches!(error, TemplateError::Syntax(_)));
}

#[test]
fn test_too_many_partial_params() {
    let error = parse("{{> p a b}}", &Default::default()).unwrap_err();
    assert_eq!(error.message(), "Unsupported number of partial arguments: 2");
}
