use serde_json::{Number, Value};

use super::{arg_str, as_text, SanitizeFn};
use crate::registry::RegistryError;

pub(super) const BUILTIN_SANITIZERS: &[(&str, SanitizeFn)] = &[
    ("trim", trim),
    ("ltrim", ltrim),
    ("rtrim", rtrim),
    ("toInt", to_int),
    ("toFloat", to_float),
    ("toBoolean", to_boolean),
    ("toString", to_string),
    ("escape", escape),
];

/// Builds the character predicate for the trim family: whitespace, or the
/// characters of the first argument when one is given.
fn trim_set<'a>(name: &str, args: &'a [Value]) -> Result<impl Fn(char) -> bool + 'a, RegistryError> {
    let chars = arg_str(name, args, 0)?;
    Ok(move |c: char| match chars {
        Some(set) => set.contains(c),
        None => c.is_whitespace(),
    })
}

fn trim(value: &Value, args: &[Value]) -> Result<Value, RegistryError> {
    let strip = trim_set("trim", args)?;
    Ok(Value::String(as_text(value).trim_matches(strip).to_string()))
}

fn ltrim(value: &Value, args: &[Value]) -> Result<Value, RegistryError> {
    let strip = trim_set("ltrim", args)?;
    Ok(Value::String(as_text(value).trim_start_matches(strip).to_string()))
}

fn rtrim(value: &Value, args: &[Value]) -> Result<Value, RegistryError> {
    let strip = trim_set("rtrim", args)?;
    Ok(Value::String(as_text(value).trim_end_matches(strip).to_string()))
}

/// Parses the leading integer of the text form; `null` when there is none.
fn to_int(value: &Value, _args: &[Value]) -> Result<Value, RegistryError> {
    let text = as_text(value);
    let text = text.trim_start();
    let sign_len = usize::from(text.starts_with(['+', '-']));
    let digits_len = text[sign_len..]
        .bytes()
        .take_while(u8::is_ascii_digit)
        .count();
    if digits_len == 0 {
        return Ok(Value::Null);
    }
    Ok(text[..sign_len + digits_len]
        .parse::<i64>()
        .map(Value::from)
        .unwrap_or(Value::Null))
}

fn to_float(value: &Value, _args: &[Value]) -> Result<Value, RegistryError> {
    Ok(as_text(value)
        .trim()
        .parse::<f64>()
        .ok()
        .and_then(Number::from_f64)
        .map(Value::Number)
        .unwrap_or(Value::Null))
}

/// `toBoolean([strict])`: strict accepts only `1` / `true`, otherwise anything
/// but `0`, `false` and the empty string is true.
fn to_boolean(value: &Value, args: &[Value]) -> Result<Value, RegistryError> {
    let strict = match args.first() {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(other) => {
            return Err(RegistryError::invalid_argument(
                "toBoolean",
                format!("strict flag must be a boolean, got {}", other),
            ))
        }
    };
    let text = as_text(value);
    let result = if strict {
        text == "1" || text == "true"
    } else {
        !matches!(text.as_str(), "0" | "false" | "")
    };
    Ok(Value::Bool(result))
}

fn to_string(value: &Value, _args: &[Value]) -> Result<Value, RegistryError> {
    Ok(Value::String(as_text(value)))
}

fn escape(value: &Value, _args: &[Value]) -> Result<Value, RegistryError> {
    let text = as_text(value);
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#x27;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '/' => escaped.push_str("&#x2F;"),
            '\\' => escaped.push_str("&#x5C;"),
            '`' => escaped.push_str("&#96;"),
            other => escaped.push(other),
        }
    }
    Ok(Value::String(escaped))
}
