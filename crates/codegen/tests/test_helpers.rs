//! Helper Tests
//!
//! Built-in helpers and user-registered helpers, including block helpers
//! driving their own body.

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

fn render(source: &str, context: serde_json::Value) -> String {
    render_env(
        source,
        context,
        &Environment::with_builtins(),
        &CompileOptions::default(),
    )
    .unwrap()
}

fn number(value: &Value) -> f64 {
    value.as_f64().unwrap_or(0.0)
}

// ===== Conditional Tests =====

#[test]
fn test_if_else() {
    let source = "{{#if ok}}yes{{else}}no{{/if}}";
    assert_eq!(render(source, json!({"ok": "x"})), "yes");
    assert_eq!(render(source, json!({"ok": ""})), "no");
    assert_eq!(render(source, json!({"ok": []})), "no");
    assert_eq!(render(source, json!({"ok": {}})), "yes");
    assert_eq!(render(source, json!({"ok": 0})), "no");
}

#[test]
fn test_if_include_zero() {
    let source = "{{#if n includeZero=true}}yes{{else}}no{{/if}}";
    assert_eq!(render(source, json!({"n": 0})), "yes");
    assert_eq!(render(source, json!({"n": null})), "no");
}

#[test]
fn test_if_keeps_context() {
    let context = json!({"ok": true, "name": "Ann"});
    assert_eq!(render("{{#if ok}}{{name}}{{/if}}", context), "Ann");
}

#[test]
fn test_unless() {
    let source = "{{#unless ok}}no{{else}}yes{{/unless}}";
    assert_eq!(render(source, json!({"ok": false})), "no");
    assert_eq!(render(source, json!({"ok": true})), "yes");
}

// ===== With Tests =====

#[test]
fn test_with_changes_context() {
    let context = json!({"person": {"first": "Ann", "last": "Lee"}});
    assert_eq!(
        render("{{#with person}}{{first}} {{last}}{{/with}}", context),
        "Ann Lee"
    );
}

#[test]
fn test_with_block_params() {
    let context = json!({"person": {"name": "Ann"}, "name": "outer"});
    assert_eq!(
        render("{{#with person as |p|}}{{p.name}}/{{name}}{{/with}}", context),
        "Ann/Ann"
    );
}

#[test]
fn test_with_else_on_empty() {
    let source = "{{#with person}}{{name}}{{else}}nobody{{/with}}";
    assert_eq!(render(source, json!({})), "nobody");
    assert_eq!(render(source, json!({"person": {"name": "x"}})), "x");
}

// ===== Each Tests =====

#[test]
fn test_each_array() {
    let context = json!({"items": ["a", "b", "c"]});
    assert_eq!(
        render("{{#each items}}{{@index}}:{{this}}{{#unless @last}},{{/unless}}{{/each}}", context),
        "0:a,1:b,2:c"
    );
}

#[test]
fn test_each_object() {
    let context = json!({"scores": {"ann": 3, "bob": 5}});
    assert_eq!(
        render("{{#each scores}}{{@key}}={{.}}{{#if @first}}*{{/if}};{{/each}}", context),
        "ann=3*;bob=5;"
    );
}

#[test]
fn test_each_block_params() {
    let context = json!({"items": ["x", "y"]});
    assert_eq!(
        render("{{#each items as |item i|}}{{i}}={{item}} {{/each}}", context),
        "0=x 1=y "
    );
}

#[test]
fn test_each_else_when_empty() {
    let source = "{{#each items}}{{.}}{{else}}none{{/each}}";
    assert_eq!(render(source, json!({"items": []})), "none");
    assert_eq!(render(source, json!({"items": {}})), "none");
    assert_eq!(render(source, json!({})), "none");
}

#[test]
fn test_each_without_argument_fails() {
    let program = parse("{{#each}}x{{/each}}", &Default::default()).unwrap();
    let options = CompileOptions {
        known_helpers: KnownHelpers::empty(),
        ..CompileOptions::default()
    };
    let artifact = compile(&program, &options).unwrap();
    let error = artifact
        .render(&Value::from(json!({})), &Environment::with_builtins())
        .unwrap_err();
    assert!(error.to_string().contains("Must pass iterator to #each"));
}

// ===== Lookup and Log Tests =====

#[test]
fn test_lookup() {
    let context = json!({"map": {"a": "A"}, "key": "a", "items": ["x", "y"]});
    assert_eq!(render("{{lookup map key}}", context.clone()), "A");
    assert_eq!(render("{{lookup items 1}}", context.clone()), "y");
    assert_eq!(render("[{{lookup missing key}}]", context), "[]");
}

#[test]
fn test_lookup_in_subexpression() {
    let context = json!({"people": [{"name": "Ann"}], "idx": 0});
    assert_eq!(
        render("{{#with (lookup people idx)}}{{name}}{{/with}}", context),
        "Ann"
    );
}

#[test]
fn test_log_renders_nothing() {
    assert_eq!(render("a{{log \"msg\" level=\"warn\"}}b", json!({})), "ab");
}

// ===== Custom Helper Tests =====

#[test]
fn test_custom_helper_with_hash() {
    let mut env = Environment::with_builtins();
    env.register_helper("greet", |params, options| {
        let greeting = options.hash_value("greeting");
        let greeting = if greeting.is_undefined() {
            "Hello".to_string()
        } else {
            greeting.to_string()
        };
        Ok(Value::from(format!("{}, {}!", greeting, params[0])))
    });
    let options = CompileOptions::default();
    assert_eq!(
        render_env("{{greet name}}", json!({"name": "Ann"}), &env, &options).unwrap(),
        "Hello, Ann!"
    );
    assert_eq!(
        render_env("{{greet name greeting=\"Hi\"}}", json!({"name": "Ann"}), &env, &options)
            .unwrap(),
        "Hi, Ann!"
    );
}

#[test]
fn test_custom_block_helper() {
    let mut env = Environment::with_builtins();
    env.register_helper("repeat", |params, options| {
        let times = params.first().map_or(0.0, number) as usize;
        let mut out = String::new();
        for i in 0..times {
            let args = BlockArgs::new().with_data("index", i);
            out.push_str(&options.render_with(options.this(), args)?);
        }
        Ok(Value::from(out))
    });
    let out = render_env(
        "{{#repeat 3}}{{@index}}{{name}}{{/repeat}}",
        json!({"name": "-"}),
        &env,
        &CompileOptions::default(),
    )
    .unwrap();
    assert_eq!(out, "0-1-2-");
}

#[test]
fn test_block_helper_inverse_and_flags() {
    let mut env = Environment::new();
    env.register_helper("check", |_, options| {
        let label = format!("{}{}", options.is_block(), options.has_inverse());
        let body = options.inverse(options.this())?;
        Ok(Value::from(format!("{}:{}", label, body)))
    });
    let options = CompileOptions::default();
    assert_eq!(
        render_env("{{#check 1}}a{{else}}b{{/check}}", json!({}), &env, &options).unwrap(),
        "truetrue:b"
    );
    assert_eq!(
        render_env("{{check 1}}", json!({}), &env, &options).unwrap(),
        "falsefalse:"
    );
}

#[test]
fn test_subexpressions() {
    let mut env = Environment::new();
    env.register_helper("add", |params, _| {
        Ok(Value::from(params.iter().map(number).sum::<f64>()))
    });
    let out = render_env(
        "{{add (add 1 2) n}}",
        json!({"n": 3}),
        &env,
        &CompileOptions::default(),
    )
    .unwrap();
    assert_eq!(out, "6");
}

#[test]
fn test_helper_errors_propagate() {
    let mut env = Environment::new();
    env.register_helper("boom", |_, _| Err(RuntimeError::helper("boom", "bad input").into()));
    let error = render_env("{{boom 1}}", json!({}), &env, &CompileOptions::default()).unwrap_err();
    assert!(matches!(
        error,
        TemplateError::Runtime(RuntimeError::Helper { ref message, .. }) if message == "bad input"
    ));
}

#[test]
fn test_unregistered_helper_is_gone() {
    let mut env = Environment::with_builtins();
    env.register_helper("shout", |params, _| {
        Ok(Value::from(params[0].to_string().to_uppercase()))
    });
    let options = CompileOptions::default();
    assert_eq!(
        render_env("{{shout \"a\"}}", json!({}), &env, &options).unwrap(),
        "A"
    );
    assert!(env.unregister_helper("shout").is_some());
    assert_eq!(
        render_env("{{shout \"a\"}}", json!({}), &env, &options).unwrap(),
        ""
    );
}

// ===== Tracked Id Tests =====

#[test]
fn test_track_ids_context_path() {
    let options = CompileOptions {
        track_ids: true,
        ..CompileOptions::default()
    };
    let env = Environment::with_builtins();
    let context = json!({"person": {"name": "Ann"}, "items": [1, 2]});
    assert_eq!(
        render_env(
            "{{#with person}}{{@contextPath}}{{/with}}",
            context.clone(),
            &env,
            &options
        )
        .unwrap(),
        "person"
    );
    assert_eq!(
        render_env(
            "{{#each items}}{{@contextPath}} {{/each}}",
            context,
            &env,
            &options
        )
        .unwrap(),
        "items.0 items.1 "
    );
}

#[test]
fn test_helper_sees_param_ids() {
    let mut env = Environment::new();
    env.register_helper("ids", |_, options| {
        let ids = options.ids.clone().unwrap_or_default();
        let ids: Vec<String> = ids.into_iter().map(Option::unwrap_or_default).collect();
        Ok(Value::from(ids.join(",")))
    });
    let options = CompileOptions {
        track_ids: true,
        ..CompileOptions::default()
    };
    let out = render_env("{{ids this.a ../b \"s\"}}", json!({}), &env, &options).unwrap();
    assert_eq!(out, "a,../b,");
}
