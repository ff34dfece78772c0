//! Capability registry: type guards and type converters
//!
//! Two process-wide, read-only tables looked up by string key during
//! validation. Guards are named predicates over a coerced value
//! (`string`, `string.url`, `number.min(3)`, ...); converters are
//! coercion functions keyed by primitive type name. Unknown names are
//! reportable validation errors, never crashes, so existence checks
//! are part of the contract.

use regex::Regex;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::OnceLock;

/// A named predicate over a value, with an optional call-like argument
/// (the `3` in `min(3)`)
pub type Guard = fn(&Value, Option<&str>) -> bool;

/// A coercion function from a raw value to a typed value; `None` means
/// the value cannot be coerced and is left untouched by the caller
pub type Converter = fn(&Value) -> Option<Value>;

/// Read-only registry of guards and converters
pub struct Registry {
    guards: HashMap<&'static str, Guard>,
    converters: HashMap<&'static str, Converter>,
}

impl Registry {
    /// The process-wide registry, built once and never mutated
    pub fn global() -> &'static Registry {
        static REGISTRY: OnceLock<Registry> = OnceLock::new();
        REGISTRY.get_or_init(Registry::builtin)
    }

    /// Whether a guard with this name exists (call suffix ignored)
    pub fn has_guard(&self, name: &str) -> bool {
        let (base, _) = split_guard(name);
        self.guards.contains_key(base)
    }

    /// Whether a converter for this primitive type exists
    pub fn has_converter(&self, kind: &str) -> bool {
        self.converters.contains_key(kind)
    }

    /// Evaluate a guard against a value
    ///
    /// The call suffix, when present, is passed to the guard as its
    /// argument. Unknown guards evaluate to false; callers are
    /// expected to check existence beforehand.
    pub fn guard_satisfied(&self, name: &str, value: &Value) -> bool {
        let (base, arg) = split_guard(name);
        match self.guards.get(base) {
            Some(guard) => guard(value, arg),
            None => false,
        }
    }

    /// Coerce a value to a primitive type, if a coercion applies
    pub fn convert(&self, kind: &str, value: &Value) -> Option<Value> {
        self.converters.get(kind).and_then(|convert| convert(value))
    }

    /// Registry populated with the built-in capabilities
    fn builtin() -> Self {
        let mut guards: HashMap<&'static str, Guard> = HashMap::new();
        guards.insert("string", |v, _| v.is_string());
        guards.insert("number", |v, _| v.is_number());
        guards.insert("integer", |v, _| {
            v.as_i64().is_some() || v.as_u64().is_some()
        });
        guards.insert("boolean", |v, _| v.is_boolean());
        guards.insert("object", |v, _| v.is_object());
        guards.insert("array", |v, _| v.is_array());
        guards.insert("null", |v, _| v.is_null());
        guards.insert("string.url", guard_string_url);
        guards.insert("string.email", guard_string_email);
        guards.insert("string.min", |v, arg| {
            matches(v.as_str(), arg_usize(arg), |s, n| s.chars().count() >= n)
        });
        guards.insert("string.max", |v, arg| {
            matches(v.as_str(), arg_usize(arg), |s, n| s.chars().count() <= n)
        });
        guards.insert("string.regex", guard_string_regex);
        guards.insert("number.positive", |v, _| {
            v.as_f64().is_some_and(|n| n > 0.0)
        });
        guards.insert("number.negative", |v, _| {
            v.as_f64().is_some_and(|n| n < 0.0)
        });
        guards.insert("number.integer", |v, _| {
            v.as_f64().is_some_and(|n| n.fract() == 0.0)
        });
        guards.insert("number.min", |v, arg| {
            matches(v.as_f64(), arg_f64(arg), |n, min| n >= min)
        });
        guards.insert("number.max", |v, arg| {
            matches(v.as_f64(), arg_f64(arg), |n, max| n <= max)
        });
        guards.insert("array.min", |v, arg| {
            matches(v.as_array(), arg_usize(arg), |a, n| a.len() >= n)
        });
        guards.insert("array.max", |v, arg| {
            matches(v.as_array(), arg_usize(arg), |a, n| a.len() <= n)
        });

        let mut converters: HashMap<&'static str, Converter> = HashMap::new();
        converters.insert("string", convert_string);
        converters.insert("number", convert_number);
        converters.insert("integer", convert_integer);
        converters.insert("boolean", convert_boolean);
        converters.insert("object", |v| v.is_object().then(|| v.clone()));
        converters.insert("array", |v| v.is_array().then(|| v.clone()));

        Self { guards, converters }
    }
}

/// Split a guard name into its base name and call-like argument:
/// `string.min(3)` becomes `("string.min", Some("3"))`
pub fn split_guard(name: &str) -> (&str, Option<&str>) {
    static CALL: OnceLock<Regex> = OnceLock::new();
    let call = CALL.get_or_init(|| Regex::new(r"^([^(]+)\(([\s\S]*)\)$").unwrap());
    match call.captures(name) {
        Some(captures) => (
            captures.get(1).unwrap().as_str(),
            Some(captures.get(2).unwrap().as_str()),
        ),
        None => (name, None),
    }
}

fn matches<V, A>(value: Option<V>, arg: Option<A>, predicate: fn(V, A) -> bool) -> bool {
    match (value, arg) {
        (Some(value), Some(arg)) => predicate(value, arg),
        _ => false,
    }
}

fn arg_usize(arg: Option<&str>) -> Option<usize> {
    arg.and_then(|arg| arg.trim().parse().ok())
}

fn arg_f64(arg: Option<&str>) -> Option<f64> {
    arg.and_then(|arg| arg.trim().parse().ok())
}

fn guard_string_url(value: &Value, _: Option<&str>) -> bool {
    let Some(url) = value.as_str() else {
        return false;
    };
    // Scheme followed by a non-empty authority or path
    match url.split_once("://") {
        Some((scheme, rest)) => {
            !scheme.is_empty()
                && !rest.is_empty()
                && scheme
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || c == '+' || c == '-' || c == '.')
        }
        None => false,
    }
}

fn guard_string_email(value: &Value, _: Option<&str>) -> bool {
    let Some(email) = value.as_str() else {
        return false;
    };
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty() && domain.contains('.') && !domain.starts_with('.')
        }
        None => false,
    }
}

fn guard_string_regex(value: &Value, arg: Option<&str>) -> bool {
    match (value.as_str(), arg) {
        (Some(s), Some(pattern)) => Regex::new(pattern).is_ok_and(|regex| regex.is_match(s)),
        _ => false,
    }
}

fn convert_string(value: &Value) -> Option<Value> {
    match value {
        Value::String(_) => Some(value.clone()),
        Value::Number(n) => Some(Value::String(n.to_string())),
        Value::Bool(b) => Some(Value::String(b.to_string())),
        _ => None,
    }
}

fn convert_number(value: &Value) -> Option<Value> {
    match value {
        Value::Number(_) => Some(value.clone()),
        Value::String(s) => {
            if let Ok(n) = s.trim().parse::<i64>() {
                return Some(Value::from(n));
            }
            s.trim()
                .parse::<f64>()
                .ok()
                .and_then(serde_json::Number::from_f64)
                .map(Value::Number)
        }
        Value::Bool(b) => Some(Value::from(*b as i64)),
        _ => None,
    }
}

fn convert_integer(value: &Value) -> Option<Value> {
    match value {
        Value::Number(_) => {
            if let Some(n) = value.as_i64() {
                return Some(Value::from(n));
            }
            value
                .as_f64()
                .filter(|n| n.fract() == 0.0)
                .map(|n| Value::from(n as i64))
        }
        Value::String(s) => s.trim().parse::<i64>().ok().map(Value::from),
        Value::Bool(b) => Some(Value::from(*b as i64)),
        _ => None,
    }
}

fn convert_boolean(value: &Value) -> Option<Value> {
    match value {
        Value::Bool(_) => Some(value.clone()),
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "yes" | "on" | "1" => Some(Value::Bool(true)),
            "false" | "no" | "off" | "0" => Some(Value::Bool(false)),
            _ => None,
        },
        Value::Number(_) => match value.as_i64() {
            Some(0) => Some(Value::Bool(false)),
            Some(1) => Some(Value::Bool(true)),
            _ => None,
        },
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_split_guard() {
        assert_eq!(split_guard("string"), ("string", None));
        assert_eq!(split_guard("string.min(3)"), ("string.min", Some("3")));
        assert_eq!(
            split_guard("string.regex(^a(b)c$)"),
            ("string.regex", Some("^a(b)c$"))
        );
    }

    #[test]
    fn test_guard_existence_ignores_call_suffix() {
        let registry = Registry::global();
        assert!(registry.has_guard("string.min(3)"));
        assert!(registry.has_guard("number.max(10)"));
        assert!(!registry.has_guard("string.shouting(very)"));
    }

    #[test]
    fn test_primitive_guards() {
        let registry = Registry::global();
        assert!(registry.guard_satisfied("string", &json!("hello")));
        assert!(!registry.guard_satisfied("string", &json!(42)));
        assert!(registry.guard_satisfied("number", &json!(4.2)));
        assert!(registry.guard_satisfied("integer", &json!(42)));
        assert!(!registry.guard_satisfied("integer", &json!(4.2)));
        assert!(registry.guard_satisfied("boolean", &json!(true)));
        assert!(registry.guard_satisfied("object", &json!({})));
        assert!(registry.guard_satisfied("array", &json!([])));
        assert!(registry.guard_satisfied("null", &Value::Null));
    }

    #[test]
    fn test_parameterized_guards() {
        let registry = Registry::global();
        assert!(registry.guard_satisfied("string.min(3)", &json!("abc")));
        assert!(!registry.guard_satisfied("string.min(3)", &json!("ab")));
        assert!(registry.guard_satisfied("number.min(1)", &json!(1)));
        assert!(!registry.guard_satisfied("number.max(10)", &json!(11)));
        assert!(registry.guard_satisfied("array.min(1)", &json!([1])));
        assert!(registry.guard_satisfied("string.regex(^[a-z]+$)", &json!("abc")));
        assert!(!registry.guard_satisfied("string.regex(^[a-z]+$)", &json!("ABC")));
        // Missing argument never satisfies
        assert!(!registry.guard_satisfied("string.min", &json!("abc")));
    }

    #[test]
    fn test_value_guards() {
        let registry = Registry::global();
        assert!(registry.guard_satisfied("string.url", &json!("https://example.com")));
        assert!(registry.guard_satisfied("string.url", &json!("ssh://host:22")));
        assert!(!registry.guard_satisfied("string.url", &json!("example.com")));
        assert!(registry.guard_satisfied("string.email", &json!("ops@example.com")));
        assert!(!registry.guard_satisfied("string.email", &json!("not-an-email")));
    }

    #[test]
    fn test_converters() {
        let registry = Registry::global();
        assert_eq!(registry.convert("string", &json!(42)), Some(json!("42")));
        assert_eq!(registry.convert("number", &json!("3")), Some(json!(3)));
        assert_eq!(registry.convert("number", &json!("3.5")), Some(json!(3.5)));
        assert_eq!(registry.convert("integer", &json!("7")), Some(json!(7)));
        assert_eq!(registry.convert("boolean", &json!("yes")), Some(json!(true)));
        assert_eq!(registry.convert("boolean", &json!("off")), Some(json!(false)));
        // Impossible coercions yield None, the caller keeps the raw value
        assert_eq!(registry.convert("number", &json!("not a number")), None);
        assert_eq!(registry.convert("object", &json!("nope")), None);
    }

    #[test]
    fn test_unknown_names_are_reportable_not_fatal() {
        let registry = Registry::global();
        assert!(!registry.has_guard("quantum"));
        assert!(!registry.has_converter("quantum"));
        assert!(!registry.guard_satisfied("quantum", &json!(1)));
        assert_eq!(registry.convert("quantum", &json!(1)), None);
    }
}
