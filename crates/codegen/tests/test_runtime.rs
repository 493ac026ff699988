//! Runtime Tests
//!
//! Rendering semantics: lookups, escaping, sections, data variables,
//! strict modes, lambdas, limits and artifact checks.

use serde_json::json;
use whisker_codegen::runtime::{FragmentBuffer, StringBuffer, WriterBuffer};
use whisker_codegen::*;
use whisker_parser::parse;

fn render_with(
    source: &str,
    context: serde_json::Value,
    env: &Environment,
    options: &CompileOptions,
) -> TemplateResult<String> {
    let program = parse(source, &options.parse_options(None))?;
    let artifact = compile(&program, options)?;
    artifact.render(&Value::from(context), env)
}

fn render(source: &str, context: serde_json::Value) -> String {
    render_with(
        source,
        context,
        &Environment::with_builtins(),
        &CompileOptions::default(),
    )
    .unwrap()
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::WARN)
        .with_test_writer()
        .try_init();
}

fn strict() -> CompileOptions {
    CompileOptions {
        strict: true,
        ..CompileOptions::default()
    }
}

// ===== Lookup Tests =====

#[test]
fn test_simple_substitution() {
    assert_eq!(render("Hello {{name}}!", json!({"name": "Ann"})), "Hello Ann!");
}

#[test]
fn test_nested_and_missing_paths() {
    let context = json!({"person": {"name": {"first": "Ann"}}});
    assert_eq!(render("{{person.name.first}}", context.clone()), "Ann");
    assert_eq!(render("{{person/name/first}}", context.clone()), "Ann");
    assert_eq!(render("[{{person.age}}]", context.clone()), "[]");
    assert_eq!(render("[{{nobody.name.first}}]", context), "[]");
}

#[test]
fn test_literal_segments() {
    let context = json!({"a b": {"c-d": 1}, "0": "zero"});
    assert_eq!(render("{{[a b].[c-d]}}", context.clone()), "1");
    assert_eq!(render("{{[0]}}", context), "zero");
}

#[test]
fn test_array_index_and_length() {
    let context = json!({"items": ["x", "y"]});
    assert_eq!(render("{{items.[1]}}/{{items.length}}", context), "y/2");
}

#[test]
fn test_this_and_parent() {
    let context = json!({"title": "T", "items": [{"name": "a"}, {"name": "b"}]});
    assert_eq!(
        render("{{#each items}}{{../title}}-{{this.name}} {{/each}}", context),
        "T-a T-b "
    );
}

#[test]
fn test_scalars_render_like_javascript() {
    let context = json!({"i": 3, "f": 1.5, "t": true, "f0": false, "n": null, "arr": [1, "a"]});
    assert_eq!(
        render("{{i}} {{f}} {{t}} {{f0}} [{{n}}] {{arr}}", context),
        "3 1.5 true false [] 1,a"
    );
}

// ===== Escaping Tests =====

#[test]
fn test_escaping() {
    let context = json!({"html": "<b class=\"x\">&'`=</b>"});
    assert_eq!(
        render("{{html}}", context.clone()),
        "&lt;b class&#x3D;&quot;x&quot;&gt;&amp;&#x27;&#x60;&#x3D;&lt;/b&gt;"
    );
    assert_eq!(render("{{{html}}}", context.clone()), "<b class=\"x\">&'`=</b>");
    assert_eq!(render("{{&html}}", context), "<b class=\"x\">&'`=</b>");
}

#[test]
fn test_safe_values_are_not_escaped() {
    let mut env = Environment::with_builtins();
    env.register_helper("bold", |params, _| {
        Ok(Value::safe(format!("<b>{}</b>", params[0])))
    });
    let out = render_with(
        "{{bold name}}",
        json!({"name": "x"}),
        &env,
        &CompileOptions::default(),
    )
    .unwrap();
    assert_eq!(out, "<b>x</b>");
}

#[test]
fn test_no_escape_option() {
    let options = CompileOptions {
        no_escape: true,
        ..CompileOptions::default()
    };
    let out = render_with("{{a}}", json!({"a": "<"}), &Environment::new(), &options).unwrap();
    assert_eq!(out, "<");
}

// ===== Section Tests =====

#[test]
fn test_boolean_sections() {
    let source = "{{#ok}}yes{{else}}no{{/ok}}";
    assert_eq!(render(source, json!({"ok": true})), "yes");
    assert_eq!(render(source, json!({"ok": false})), "no");
    assert_eq!(render(source, json!({"ok": null})), "no");
    assert_eq!(render(source, json!({})), "no");
}

#[test]
fn test_array_sections_iterate() {
    let context = json!({"items": [{"n": 1}, {"n": 2}]});
    assert_eq!(render("{{#items}}<{{n}}>{{/items}}", context), "<1><2>");
    assert_eq!(
        render("{{#items}}x{{else}}empty{{/items}}", json!({"items": []})),
        "empty"
    );
}

#[test]
fn test_section_iteration_data() {
    let context = json!({"items": ["a", "b", "c"]});
    assert_eq!(
        render(
            "{{#items}}{{@index}}{{.}}{{#if @first}}^{{/if}}{{#if @last}}${{/if}} {{/items}}",
            context
        ),
        "0a^ 1b 2c$ "
    );
}

#[test]
fn test_object_section_changes_context() {
    let context = json!({"person": {"name": "Ann"}, "name": "outer"});
    assert_eq!(render("{{#person}}{{name}}{{/person}}", context), "Ann");
}

#[test]
fn test_scalar_section_uses_value_as_context() {
    assert_eq!(render("{{#word}}[{{.}}]{{/word}}", json!({"word": "hi"})), "[hi]");
    assert_eq!(render("{{#n}}[{{.}}]{{/n}}", json!({"n": 0})), "[0]");
}

#[test]
fn test_inverted_sections() {
    let source = "{{^items}}none{{/items}}";
    assert_eq!(render(source, json!({"items": []})), "none");
    assert_eq!(render(source, json!({"items": [1]})), "");
    assert_eq!(render(source, json!({})), "none");
}

#[test]
fn test_chained_else_if() {
    let source = "{{#if a}}A{{else if b}}B{{else}}C{{/if}}";
    assert_eq!(render(source, json!({"a": true})), "A");
    assert_eq!(render(source, json!({"b": true})), "B");
    assert_eq!(render(source, json!({})), "C");
}

#[test]
fn test_standalone_lines_render_cleanly() {
    let source = "<ul>\n  {{#each items}}\n  <li>{{.}}</li>\n  {{/each}}\n</ul>\n";
    assert_eq!(
        render(source, json!({"items": ["a", "b"]})),
        "<ul>\n  <li>a</li>\n  <li>b</li>\n</ul>\n"
    );
}

#[test]
fn test_whitespace_control() {
    assert_eq!(render("a  {{~x~}}  b", json!({"x": "-"})), "a-b");
}

// ===== Data Tests =====

#[test]
fn test_root_data() {
    let context = json!({"title": "T", "items": [1, 2]});
    assert_eq!(render("{{#each items}}{{@root.title}}{{/each}}", context), "TT");
}

#[test]
fn test_environment_data() {
    let mut env = Environment::with_builtins();
    env.set_data("site", "example.org");
    let out = render_with("{{@site}}", json!({}), &env, &CompileOptions::default()).unwrap();
    assert_eq!(out, "example.org");
}

#[test]
fn test_parent_data_frames() {
    let context = json!({"rows": [[1, 2], [3]]});
    assert_eq!(
        render(
            "{{#each rows}}{{#each this}}{{@../index}}.{{@index}} {{/each}}{{/each}}",
            context
        ),
        "0.0 0.1 1.0 "
    );
}

// ===== Strict Mode Tests =====

#[test]
fn test_strict_missing_property_raises() {
    let error = render_with("{{missing}}", json!({}), &Environment::with_builtins(), &strict())
        .unwrap_err();
    assert!(matches!(
        error,
        TemplateError::Runtime(RuntimeError::MissingProperty { ref name, .. }) if name == "missing"
    ));
}

#[test]
fn test_strict_missing_intermediate_raises() {
    let error = render_with("{{a.b.c}}", json!({"a": {}}), &Environment::with_builtins(), &strict())
        .unwrap_err();
    assert!(matches!(
        error,
        TemplateError::Runtime(RuntimeError::MissingProperty { .. })
    ));
}

#[test]
fn test_strict_allows_missing_helper_params() {
    let out = render_with(
        "{{#if missing}}y{{else}}n{{/if}}",
        json!({}),
        &Environment::with_builtins(),
        &strict(),
    )
    .unwrap();
    assert_eq!(out, "n");
}

#[test]
fn test_strict_present_values_render() {
    let out = render_with(
        "{{a.b}}",
        json!({"a": {"b": null}}),
        &Environment::with_builtins(),
        &strict(),
    )
    .unwrap();
    assert_eq!(out, "");
}

#[test]
fn test_assume_objects() {
    let options = CompileOptions {
        assume_objects: true,
        ..CompileOptions::default()
    };
    let env = Environment::with_builtins();
    assert_eq!(render_with("[{{a}}]", json!({}), &env, &options).unwrap(), "[]");
    assert!(render_with("{{a.b}}", json!({}), &env, &options).is_err());
}

#[test]
fn test_missing_helper_degrades_outside_strict() {
    init_tracing();
    let out = render_with(
        "x{{shout name}}y",
        json!({"name": "a"}),
        &Environment::with_builtins(),
        &CompileOptions::default(),
    )
    .unwrap();
    assert_eq!(out, "xy");

    let error = render_with(
        "x{{shout name}}y",
        json!({"name": "a"}),
        &Environment::with_builtins(),
        &strict(),
    )
    .unwrap_err();
    assert!(matches!(
        error,
        TemplateError::Runtime(RuntimeError::MissingHelper { ref name, .. }) if name == "shout"
    ));
}

// ===== Compat Tests =====

#[test]
fn test_compat_searches_context_stack() {
    let options = CompileOptions {
        compat: true,
        ..CompileOptions::default()
    };
    let context = json!({"title": "T", "items": [{"name": "a"}, {"name": "b", "title": "own"}]});
    let out = render_with(
        "{{#each items}}{{title}}:{{name}} {{/each}}",
        context.clone(),
        &Environment::with_builtins(),
        &options,
    )
    .unwrap();
    assert_eq!(out, "T:a own:b ");

    assert_eq!(
        render("{{#each items}}[{{title}}]{{/each}}", context),
        "[][own]"
    );
}

// ===== Lambda Tests =====

#[test]
fn test_context_functions_are_called() {
    let greet = Helper::new(|_, options| {
        Ok(Value::from(format!("hi {}", options.this().get_property("name"))))
    });
    let context = Value::object([("name", Value::from("Ann")), ("greet", Value::Function(greet))]);
    let program = parse("{{greet}}", &Default::default()).unwrap();
    let artifact = compile(&program, &CompileOptions::default()).unwrap();
    let out = artifact.render(&context, &Environment::new()).unwrap();
    assert_eq!(out, "hi Ann");
}

#[test]
fn test_block_lambda_result_feeds_section() {
    let items = Helper::new(|_, _| Ok(Value::array([Value::from("a"), Value::from("b")])));
    let context = Value::object([("items", Value::Function(items))]);
    let program = parse("{{#items}}<{{.}}>{{/items}}", &Default::default()).unwrap();
    let artifact = compile(&program, &CompileOptions::default()).unwrap();
    assert_eq!(artifact.render(&context, &Environment::new()).unwrap(), "<a><b>");
}

#[test]
fn test_registered_helper_wins_over_context() {
    let mut env = Environment::new();
    env.register_helper("name", |_, _| Ok(Value::from("helper")));
    let out = render_with("{{name}}", json!({"name": "value"}), &env, &CompileOptions::default())
        .unwrap();
    assert_eq!(out, "helper");
}

// ===== Limit Tests =====

#[test]
fn test_depth_limit() {
    let env = Environment::with_builtins().with_limits(RuntimeLimits { max_depth: 2 });
    let source = "{{#a}}{{#b}}{{#c}}x{{/c}}{{/b}}{{/a}}";
    let error = render_with(
        source,
        json!({"a": true, "b": true, "c": true}),
        &env,
        &CompileOptions::default(),
    )
    .unwrap_err();
    assert!(matches!(
        error,
        TemplateError::Runtime(RuntimeError::DepthExceeded { limit: 2 })
    ));

    let env = Environment::with_builtins();
    let out = render_with(
        source,
        json!({"a": true, "b": true, "c": true}),
        &env,
        &CompileOptions::default(),
    )
    .unwrap();
    assert_eq!(out, "x");
}

// ===== Artifact Tests =====

fn artifact(source: &str) -> Artifact {
    let program = parse(source, &Default::default()).unwrap();
    compile(&program, &CompileOptions::default()).unwrap()
}

#[test]
fn test_render_to_buffers() {
    let artifact = artifact("a{{x}}b");
    let context = Value::from(json!({"x": 1}));
    let env = Environment::new();

    let mut out = StringBuffer::new();
    artifact.render_to(&context, &env, &mut out).unwrap();
    assert_eq!(out.into_string(), "a1b");

    let mut out = FragmentBuffer::new();
    artifact.render_to(&context, &env, &mut out).unwrap();
    assert_eq!(out.fragments(), &["a", "1", "b"]);

    let mut out = WriterBuffer::new(Vec::new());
    artifact.render_to(&context, &env, &mut out).unwrap();
    assert_eq!(out.into_inner(), b"a1b");
}

#[test]
fn test_artifact_is_reusable() {
    let artifact = artifact("{{n}}");
    let env = Environment::new();
    for n in 0..3 {
        let out = artifact.render(&Value::from(json!({"n": n})), &env).unwrap();
        assert_eq!(out, n.to_string());
    }
    assert_eq!(
        artifact.invoke(&Value::from(json!({"n": 7})), &env, None).unwrap(),
        "7"
    );
}

#[test]
fn test_precompiled_round_trip() {
    let program = parse("{{#each xs}}{{.}}{{/each}}", &Default::default()).unwrap();
    let spec = precompile(&program, &CompileOptions::default(), Backend::default()).unwrap();
    let artifact = Artifact::from_json(&spec.to_json().unwrap()).unwrap();
    let out = artifact
        .render(&Value::from(json!({"xs": [1, 2]})), &Environment::with_builtins())
        .unwrap();
    assert_eq!(out, "12");
}

#[test]
fn test_revision_mismatch_is_rejected() {
    let mut spec = artifact("x").spec().clone();
    spec.compiler.revision = 7;
    let error = Artifact::from_spec(spec).unwrap_err();
    assert!(matches!(
        error,
        RuntimeError::VersionMismatch { expected: 8, found: 7 }
    ));
}

#[test]
fn test_unknown_features_are_rejected() {
    let mut spec = artifact("x").spec().clone();
    spec.compiler.features = Features::from_bits(1 << 12);
    let error = Artifact::from_spec(spec).unwrap_err();
    assert!(matches!(error, RuntimeError::UnsupportedFeatures { .. }));
}

#[test]
fn test_artifact_is_shareable_across_threads() {
    let artifact = artifact("{{n}}");
    let env = std::sync::Arc::new(Environment::with_builtins());
    let handles: Vec<_> = (0..4)
        .map(|n| {
            let artifact = artifact.clone();
            let env = env.clone();
            std::thread::spawn(move || {
                artifact
                    .render(&Value::from(json!({"n": n})), &env)
                    .unwrap()
            })
        })
        .collect();
    let outputs: Vec<String> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert_eq!(outputs, vec!["0", "1", "2", "3"]);
}
