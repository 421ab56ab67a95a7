use regex::RegexBuilder;
use serde_json::Value;

use super::{arg_str, arg_usize, as_text, CheckFn};
use crate::registry::RegistryError;

pub(super) const BUILTIN_CHECKS: &[(&str, CheckFn)] = &[
    ("isInt", is_int),
    ("isFloat", is_float),
    ("isNumeric", is_numeric),
    ("isAlpha", is_alpha),
    ("isAlphanumeric", is_alphanumeric),
    ("isLength", is_length),
    ("isBoolean", is_boolean),
    ("isEmpty", is_empty),
    ("isIn", is_in),
    ("equals", equals),
    ("contains", contains),
    ("matches", matches),
    ("isArray", is_array),
    ("isObject", is_object),
    ("isString", is_string),
];

fn is_int(value: &Value, _args: &[Value]) -> Result<bool, RegistryError> {
    let text = as_text(value);
    let digits = text.strip_prefix(['+', '-']).unwrap_or(&text);
    Ok(!digits.is_empty()
        && digits.bytes().all(|b| b.is_ascii_digit())
        && (digits == "0" || !digits.starts_with('0')))
}

fn is_float(value: &Value, _args: &[Value]) -> Result<bool, RegistryError> {
    let text = as_text(value);
    let plausible = !text.is_empty()
        && text != "."
        && text
            .bytes()
            .all(|b| b.is_ascii_digit() || matches!(b, b'+' | b'-' | b'.' | b'e' | b'E'));
    Ok(plausible && text.parse::<f64>().is_ok())
}

fn is_numeric(value: &Value, _args: &[Value]) -> Result<bool, RegistryError> {
    let text = as_text(value);
    let unsigned = text.strip_prefix(['+', '-']).unwrap_or(&text);
    let (whole, fraction) = match unsigned.split_once('.') {
        Some((w, f)) => (w, f),
        None => ("", unsigned),
    };
    Ok(!fraction.is_empty()
        && whole.bytes().all(|b| b.is_ascii_digit())
        && fraction.bytes().all(|b| b.is_ascii_digit()))
}

fn is_alpha(value: &Value, _args: &[Value]) -> Result<bool, RegistryError> {
    let text = as_text(value);
    Ok(!text.is_empty() && text.chars().all(|c| c.is_ascii_alphabetic()))
}

fn is_alphanumeric(value: &Value, _args: &[Value]) -> Result<bool, RegistryError> {
    let text = as_text(value);
    Ok(!text.is_empty() && text.chars().all(|c| c.is_ascii_alphanumeric()))
}

/// `isLength(min[, max])`, counted in Unicode scalar values.
fn is_length(value: &Value, args: &[Value]) -> Result<bool, RegistryError> {
    let min = arg_usize("isLength", args, 0)?.unwrap_or(0);
    let max = arg_usize("isLength", args, 1)?;
    let len = as_text(value).chars().count();
    Ok(len >= min && max.map_or(true, |max| len <= max))
}

fn is_boolean(value: &Value, _args: &[Value]) -> Result<bool, RegistryError> {
    Ok(matches!(
        as_text(value).as_str(),
        "true" | "false" | "1" | "0"
    ))
}

fn is_empty(value: &Value, _args: &[Value]) -> Result<bool, RegistryError> {
    Ok(as_text(value).is_empty())
}

fn is_in(value: &Value, args: &[Value]) -> Result<bool, RegistryError> {
    let options = match args.first() {
        Some(Value::Array(options)) => options.as_slice(),
        Some(other) => std::slice::from_ref(other),
        None => return Err(RegistryError::invalid_argument("isIn", "missing list of options")),
    };
    let text = as_text(value);
    Ok(options.iter().any(|option| as_text(option) == text))
}

fn equals(value: &Value, args: &[Value]) -> Result<bool, RegistryError> {
    let expected = args
        .first()
        .ok_or_else(|| RegistryError::invalid_argument("equals", "missing comparison value"))?;
    Ok(as_text(value) == as_text(expected))
}

fn contains(value: &Value, args: &[Value]) -> Result<bool, RegistryError> {
    let needle = arg_str("contains", args, 0)?
        .ok_or_else(|| RegistryError::invalid_argument("contains", "missing substring"))?;
    Ok(as_text(value).contains(needle))
}

/// `matches(pattern[, flags])`; the only flag honoured is `i`.
fn matches(value: &Value, args: &[Value]) -> Result<bool, RegistryError> {
    let pattern = arg_str("matches", args, 0)?
        .ok_or_else(|| RegistryError::invalid_argument("matches", "missing pattern"))?;
    let flags = arg_str("matches", args, 1)?.unwrap_or("");
    let regex = RegexBuilder::new(pattern)
        .case_insensitive(flags.contains('i'))
        .build()
        .map_err(|e| RegistryError::invalid_argument("matches", e.to_string()))?;
    Ok(regex.is_match(&as_text(value)))
}

fn is_array(value: &Value, _args: &[Value]) -> Result<bool, RegistryError> {
    Ok(value.is_array())
}

fn is_object(value: &Value, _args: &[Value]) -> Result<bool, RegistryError> {
    Ok(value.is_object())
}

fn is_string(value: &Value, _args: &[Value]) -> Result<bool, RegistryError> {
    Ok(value.is_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn check(f: CheckFn, value: Value) -> bool {
        f(&value, &[]).unwrap()
    }

    #[test]
    fn test_is_int() {
        assert!(check(is_int, json!(1)));
        assert!(check(is_int, json!("-42")));
        assert!(check(is_int, json!("0")));
        assert!(!check(is_int, json!("007")));
        assert!(!check(is_int, json!("wrong-id")));
        assert!(!check(is_int, json!(1.5)));
        assert!(!check(is_int, json!(null)));
    }

    #[test]
    fn test_is_float_and_numeric() {
        assert!(check(is_float, json!("3.14")));
        assert!(check(is_float, json!(2)));
        assert!(!check(is_float, json!("inf")));
        assert!(!check(is_float, json!("abc")));

        assert!(check(is_numeric, json!("-12.5")));
        assert!(check(is_numeric, json!(".5")));
        assert!(!check(is_numeric, json!("1.")));
        assert!(!check(is_numeric, json!("1e3")));
    }

    #[test]
    fn test_is_alpha() {
        assert!(check(is_alpha, json!("Spaghetti")));
        assert!(!check(is_alpha, json!("Spaghetti with sauce")));
        assert!(!check(is_alpha, json!("")));
        assert!(check(is_alphanumeric, json!("abc123")));
    }

    #[test]
    fn test_is_length() {
        let bounds = [json!(3), json!(20)];
        assert!(is_length(&json!("Pasta"), &bounds).unwrap());
        assert!(!is_length(&json!("ab"), &bounds).unwrap());
        assert!(!is_length(&json!("a".repeat(40)), &bounds).unwrap());
        assert!(is_length(&json!("a".repeat(40)), &[json!(3)]).unwrap());
        assert!(is_length(&json!("ñandú"), &[json!(5), json!(5)]).unwrap());
        assert!(is_length(&json!("x"), &[json!("3")]).is_err());
    }

    #[test]
    fn test_is_boolean() {
        assert!(check(is_boolean, json!(true)));
        assert!(check(is_boolean, json!("0")));
        assert!(!check(is_boolean, json!("yes")));
    }

    #[test]
    fn test_is_in_and_equals() {
        let options = [json!(["Food", "Drink"])];
        assert!(is_in(&json!("Food"), &options).unwrap());
        assert!(!is_in(&json!("Toy"), &options).unwrap());
        assert!(is_in(&json!("x"), &[]).is_err());

        assert!(equals(&json!(5), &[json!("5")]).unwrap());
        assert!(contains(&json!("Spaghetti"), &[json!("ghet")]).unwrap());
    }

    #[test]
    fn test_matches() {
        assert!(matches(&json!("ABC"), &[json!("^[a-c]+$"), json!("i")]).unwrap());
        assert!(!matches(&json!("ABC"), &[json!("^[a-c]+$")]).unwrap());
        assert!(matches(&json!("x"), &[json!("(")]).is_err());
    }

    #[test]
    fn test_structural() {
        assert!(check(is_array, json!([])));
        assert!(!check(is_array, json!({})));
        assert!(check(is_object, json!({})));
        assert!(check(is_string, json!("")));
        assert!(!check(is_string, json!(1)));
    }
}
