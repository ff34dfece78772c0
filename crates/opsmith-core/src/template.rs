//! Templating collaborator boundary
//!
//! The validation engine renders string values and default
//! expressions through an injected templating dependency; the
//! templating language itself lives outside the engine. `Templater`
//! is that seam, and `ContextTemplater` is the built-in
//! implementation resolving `${dotted.path}` placeholders against a
//! context mapping.

use crate::error::{Error, Result};
use async_trait::async_trait;
use regex::Regex;
use serde_json::{Map, Value};
use std::sync::OnceLock;

/// Rendering options
#[derive(Debug, Clone, Copy, Default)]
pub struct TemplateOptions {
    /// Suppress resolution failures and return the input unchanged
    pub safe: bool,
    /// Log a warning when a suppressed failure occurs
    pub warn: bool,
}

impl TemplateOptions {
    /// Safe rendering with warnings, as used for value templating
    pub fn safe_with_warnings() -> Self {
        Self {
            safe: true,
            warn: true,
        }
    }
}

/// Asynchronous templating collaborator
///
/// Implementations resolve placeholders in string values against a
/// context mapping. Non-string values pass through unchanged.
#[async_trait]
pub trait Templater: Send + Sync {
    /// Render a value against a context
    async fn render(
        &self,
        input: &Value,
        context: &Map<String, Value>,
        options: &TemplateOptions,
    ) -> Result<Value>;
}

/// Built-in templater resolving `${dotted.path}` placeholders
///
/// A string consisting of a single placeholder yields the typed
/// context value; placeholders embedded in a larger string
/// interpolate their stringified values.
#[derive(Debug, Default, Clone, Copy)]
pub struct ContextTemplater;

#[async_trait]
impl Templater for ContextTemplater {
    async fn render(
        &self,
        input: &Value,
        context: &Map<String, Value>,
        options: &TemplateOptions,
    ) -> Result<Value> {
        let Some(text) = input.as_str() else {
            return Ok(input.clone());
        };
        let placeholder = placeholder_pattern();

        // Single whole-string placeholder keeps the resolved type
        if let Some(captures) = placeholder.captures(text) {
            if captures.get(0).unwrap().as_str() == text {
                let path = captures.get(1).unwrap().as_str();
                return match lookup(context, path) {
                    Some(value) => Ok(value.clone()),
                    None => miss(input, path, options),
                };
            }
        }

        let mut rendered = String::with_capacity(text.len());
        let mut last = 0;
        for captures in placeholder.captures_iter(text) {
            let whole = captures.get(0).unwrap();
            let path = captures.get(1).unwrap().as_str();
            match lookup(context, path) {
                Some(value) => {
                    rendered.push_str(&text[last..whole.start()]);
                    rendered.push_str(&stringify(value));
                }
                None => {
                    miss(input, path, options)?;
                    // Safe mode keeps the unresolved placeholder text
                    rendered.push_str(&text[last..whole.end()]);
                }
            }
            last = whole.end();
        }
        rendered.push_str(&text[last..]);
        Ok(Value::String(rendered))
    }
}

fn placeholder_pattern() -> &'static Regex {
    static PLACEHOLDER: OnceLock<Regex> = OnceLock::new();
    PLACEHOLDER.get_or_init(|| Regex::new(r"\$\{\s*([A-Za-z0-9_][A-Za-z0-9_.-]*)\s*\}").unwrap())
}

/// Resolve a dotted path against the context mapping
fn lookup<'a>(context: &'a Map<String, Value>, path: &str) -> Option<&'a Value> {
    let mut segments = path.split('.');
    let mut current = context.get(segments.next()?)?;
    for segment in segments {
        current = current.as_object()?.get(segment)?;
    }
    Some(current)
}

fn stringify(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn miss(input: &Value, path: &str, options: &TemplateOptions) -> Result<Value> {
    if options.safe {
        if options.warn {
            tracing::warn!("could not resolve template reference: ${{{path}}}");
        }
        Ok(input.clone())
    } else {
        Err(Error::template(format!(
            "unknown template reference: ${{{path}}}"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn context() -> Map<String, Value> {
        json!({
            "host": "web-1",
            "port": 22,
            "ssh": {"login": "admin", "key": null},
        })
        .as_object()
        .unwrap()
        .clone()
    }

    #[tokio::test]
    async fn test_whole_string_placeholder_keeps_type() {
        let rendered = ContextTemplater
            .render(&json!("${port}"), &context(), &TemplateOptions::default())
            .await
            .unwrap();
        assert_eq!(rendered, json!(22));
    }

    #[tokio::test]
    async fn test_interpolation_stringifies() {
        let rendered = ContextTemplater
            .render(
                &json!("${ssh.login}@${host}:${port}"),
                &context(),
                &TemplateOptions::default(),
            )
            .await
            .unwrap();
        assert_eq!(rendered, json!("admin@web-1:22"));
    }

    #[tokio::test]
    async fn test_non_string_passes_through() {
        let rendered = ContextTemplater
            .render(&json!(42), &context(), &TemplateOptions::default())
            .await
            .unwrap();
        assert_eq!(rendered, json!(42));
    }

    #[tokio::test]
    async fn test_missing_reference_errors_when_unsafe() {
        let err = ContextTemplater
            .render(&json!("${missing}"), &context(), &TemplateOptions::default())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("unknown template reference"));
    }

    #[tokio::test]
    async fn test_missing_reference_kept_when_safe() {
        let options = TemplateOptions::safe_with_warnings();
        let rendered = ContextTemplater
            .render(&json!("${missing}"), &context(), &options)
            .await
            .unwrap();
        assert_eq!(rendered, json!("${missing}"));

        let rendered = ContextTemplater
            .render(&json!("a ${missing} b"), &context(), &options)
            .await
            .unwrap();
        assert_eq!(rendered, json!("a ${missing} b"));
    }

    #[tokio::test]
    async fn test_plain_string_untouched() {
        let rendered = ContextTemplater
            .render(&json!("plain text"), &context(), &TemplateOptions::default())
            .await
            .unwrap();
        assert_eq!(rendered, json!("plain text"));
    }
}
