//! Built-in helpers: `if`, `unless`, `with`, `each`, `lookup` and `log`

use super::env::{Environment, HelperResult};
use super::options::{BlockArgs, HelperOptions};
use super::value::Value;
use crate::error::RuntimeError;

pub(crate) fn register(env: &mut Environment) {
    env.register_helper("if", helper_if)
        .register_helper("unless", helper_unless)
        .register_helper("with", helper_with)
        .register_helper("each", helper_each)
        .register_helper("lookup", helper_lookup)
        .register_helper("log", helper_log);
}

fn single_param<'p>(params: &'p [Value], options: &HelperOptions<'_>) -> Result<&'p Value, RuntimeError> {
    match params {
        [value] => Ok(value),
        _ => Err(RuntimeError::helper(
            &options.name,
            format!("#{} requires exactly one argument", options.name),
        )),
    }
}

/// Falsy values and empty arrays select the inverse; `includeZero=true`
/// makes zero truthy.
fn is_falsy(value: &Value, options: &HelperOptions<'_>) -> bool {
    let include_zero = options.hash_value("includeZero").is_truthy();
    (!include_zero && !value.is_truthy()) || value.is_empty()
}

fn helper_if(params: &[Value], options: &HelperOptions<'_>) -> HelperResult {
    let conditional = single_param(params, options)?;
    let this = options.this();
    let out = if is_falsy(conditional, options) {
        options.inverse(this)?
    } else {
        options.render(this)?
    };
    Ok(Value::String(out))
}

fn helper_unless(params: &[Value], options: &HelperOptions<'_>) -> HelperResult {
    let conditional = single_param(params, options)?;
    helper_if(std::slice::from_ref(conditional), &options.swapped())
}

fn helper_with(params: &[Value], options: &HelperOptions<'_>) -> HelperResult {
    let context = single_param(params, options)?;
    if context.is_empty() {
        return Ok(Value::String(options.inverse(options.this())?));
    }

    let mut args = BlockArgs::new().with_block_params(vec![context.clone()]);
    if let Some(path) = first_id(options) {
        args = args.with_data("contextPath", append_context_path(&options.data("contextPath"), &path));
    }
    Ok(Value::String(options.render_with(context, args)?))
}

fn helper_each(params: &[Value], options: &HelperOptions<'_>) -> HelperResult {
    let Some(context) = params.first() else {
        return Err(RuntimeError::helper("each", "Must pass iterator to #each").into());
    };
    let prefix = first_id(options)
        .map(|path| format!("{}.", append_context_path(&options.data("contextPath"), &path)));

    let iteration = |key: Value, index: usize, last: bool, item: &Value| {
        let mut args = BlockArgs::new()
            .with_data("key", key.clone())
            .with_data("index", index)
            .with_data("first", index == 0)
            .with_data("last", last)
            .with_block_params(vec![item.clone(), key.clone()]);
        if let Some(prefix) = &prefix {
            args = args.with_data("contextPath", format!("{}{}", prefix, key));
        }
        options.render_with(item, args)
    };

    let mut out = String::new();
    let mut count = 0;
    match context {
        Value::Array(items) => {
            for (index, item) in items.iter().enumerate() {
                out.push_str(&iteration(Value::from(index), index, index + 1 == items.len(), item)?);
                count += 1;
            }
        }
        Value::Object(map) => {
            for (index, (key, item)) in map.iter().enumerate() {
                out.push_str(&iteration(Value::from(key.as_str()), index, index + 1 == map.len(), item)?);
                count += 1;
            }
        }
        _ => {}
    }

    if count == 0 {
        out = options.inverse(options.this())?;
    }
    Ok(Value::String(out))
}

fn helper_lookup(params: &[Value], _options: &HelperOptions<'_>) -> HelperResult {
    match params {
        [object, field, ..] if object.is_truthy() => Ok(object.get_property(&field.to_string())),
        [object, ..] => Ok(object.clone()),
        [] => Ok(Value::Undefined),
    }
}

/// Emit the params through `tracing` at `level=` (debug, info, warn or
/// error; info by default).
fn helper_log(params: &[Value], options: &HelperOptions<'_>) -> HelperResult {
    let mut level = options.hash_value("level").to_string();
    if level.is_empty() {
        level = options.data("level").to_string();
    }
    let message = params
        .iter()
        .map(Value::to_string)
        .collect::<Vec<_>>()
        .join(" ");

    match level.to_ascii_lowercase().as_str() {
        "debug" | "0" => tracing::debug!(target: "whisker::log", "{}", message),
        "warn" | "2" => tracing::warn!(target: "whisker::log", "{}", message),
        "error" | "3" => tracing::error!(target: "whisker::log", "{}", message),
        _ => tracing::info!(target: "whisker::log", "{}", message),
    }
    Ok(Value::Undefined)
}

fn first_id(options: &HelperOptions<'_>) -> Option<String> {
    options.ids.as_ref()?.first()?.clone()
}

fn append_context_path(current: &Value, id: &str) -> String {
    match current.as_str() {
        Some(path) if !path.is_empty() => format!("{}.{}", path, id),
        _ => id.to_string(),
    }
}
