//! Recursive value validator
//!
//! Walks a definition and the raw value tree in lock-step, applying
//! documentation checks, deprecation warnings, templating, defaulting,
//! type coercion, presence checks, guard constraints and enumeration
//! checks, and producing the typed output tree. Fields are processed
//! in definition declaration order, which is observable in finding
//! order.

use crate::error::{Error, Result};
use crate::template::{TemplateOptions, Templater};
use crate::validation::registry::{split_guard, Registry};
use crate::validation::report::{Report, Severity, Strategy};
use crate::validation::resolver;
use crate::validation::schema::{Definition, Schema};
use crate::validation::Mode;
use serde_json::{Map, Value};
use std::future::Future;
use std::pin::Pin;

/// Result of one definition-level pass
pub(crate) enum Outcome {
    /// Null definition with empty input: the whole call yields no
    /// output, bypassing the report
    Empty,
    /// The pass ran; findings, if any, are in the report
    Checked,
}

/// One validation pass bound to a mode, ambient context and
/// collaborators
pub(crate) struct Checker<'a> {
    pub mode: Mode,
    pub context: &'a Map<String, Value>,
    pub templater: &'a dyn Templater,
    pub registry: &'a Registry,
}

impl Checker<'_> {
    /// Validate `args` against `definition`, writing typed values into
    /// `validated` and findings into `report`
    pub fn check<'s>(
        &'s self,
        args: Option<&'s Value>,
        definition: Option<&'s Definition>,
        validated: &'s mut Map<String, Value>,
        defaults: &'s Map<String, Value>,
        report: &'s mut Report,
    ) -> Pin<Box<dyn Future<Output = Result<Outcome>> + Send + 's>> {
        Box::pin(async move {
            // Empty definitions accept empty input only
            let Some(definition) = definition else {
                if is_absent_or_empty(args) {
                    return Ok(Outcome::Empty);
                }
                report.add(Error::validation("no argument allowed"), Severity::Error)?;
                return Ok(Outcome::Checked);
            };

            let Some(Value::Object(raw)) = args else {
                report.add(
                    Error::validation(format!(
                        "expected arguments to be of type object (got {} instead)",
                        args.map_or("null", type_of)
                    )),
                    Severity::Error,
                )?;
                return Ok(Outcome::Checked);
            };
            let mut args = raw.clone();

            // Aliases and relations apply to input mode only; any
            // failure suppresses the value pass at this level
            if self.mode == Mode::Input {
                let aliases_ok = resolver::resolve_aliases(&mut args, definition, report)?;
                let relations_ok = resolver::check_relations(&args, definition, report)?;
                if !aliases_ok || !relations_ok {
                    return Ok(Outcome::Checked);
                }
            }

            let empty = Map::new();
            for (key, schema) in definition {
                if report.strict() {
                    self.check_authoring(key, schema, defaults, report).await?;
                }

                if let Some(notice) = &schema.deprecated {
                    report.add(
                        Error::validation(format!("\"{key}\" is deprecated ({notice})")),
                        Severity::Warning,
                    )?;
                }

                let severity = match self.mode {
                    Mode::Input => Severity::Error,
                    Mode::Output => Severity::Warning,
                };
                let mut value = args.get(key).cloned().unwrap_or(Value::Null);

                // Nested definitions recurse with their own scope
                if let Some(nested) = schema.nested() {
                    if value.is_null() {
                        value = Value::Object(Map::new());
                    }
                    if !value.is_object() {
                        report.add(
                            Error::validation(format!(
                                "\"{key}\" must be of type object (got {} instead)",
                                type_of(&value)
                            )),
                            severity,
                        )?;
                        if self.mode == Mode::Output && !report.strict() {
                            validated.insert(key.clone(), value);
                        }
                        continue;
                    }
                    let nested_defaults = defaults
                        .get(key)
                        .and_then(Value::as_object)
                        .unwrap_or(&empty);
                    let mut nested_validated = Map::new();
                    self.check(
                        Some(&value),
                        Some(nested),
                        &mut nested_validated,
                        nested_defaults,
                        report,
                    )
                    .await?;
                    validated.insert(key.clone(), Value::Object(nested_validated));
                    continue;
                }

                // Qualify match guards with the field type and ensure
                // every guard and the type converter exist
                let groups = qualified_groups(schema);
                let mut missing: Vec<&str> = Vec::new();
                for name in schema.primitive().into_iter().chain(groups.iter().flatten().map(String::as_str)) {
                    let (base, _) = split_guard(name);
                    if !self.registry.has_guard(base) && !missing.contains(&base) {
                        missing.push(base);
                    }
                }
                if !missing.is_empty() {
                    for guard in missing {
                        report.add(
                            Error::validation(format!("unknown type guard: {guard}")),
                            Severity::Error,
                        )?;
                    }
                    continue;
                }
                if let Some(kind) = schema.primitive() {
                    if !self.registry.has_converter(kind) {
                        report.add(
                            Error::validation(format!("unknown type converter: {kind}")),
                            Severity::Error,
                        )?;
                        continue;
                    }
                }

                // Template string values against the ambient context;
                // failures are non-fatal here
                if value.is_string() {
                    if let Ok(rendered) = self
                        .templater
                        .render(&value, self.context, &TemplateOptions::safe_with_warnings())
                        .await
                    {
                        value = rendered;
                    }
                }

                // Substitute the precomputed default if needed
                if self.mode == Mode::Input && schema.default.is_some() && value.is_null() {
                    value = defaults.get(key).cloned().unwrap_or(Value::Null);
                }

                // Type coercion; failed coercions leave the value as-is
                if !value.is_null() {
                    if let Some(kind) = schema.primitive() {
                        if let Some(converted) = self.registry.convert(kind, &value) {
                            value = converted;
                        }
                    }
                }

                // Required and optional check
                if value.is_null() {
                    if self.mode == Mode::Input && schema.required {
                        report.add(
                            Error::validation(format!("\"{key}\" is required")),
                            Severity::Error,
                        )?;
                        continue;
                    }
                    if self.mode == Mode::Output && !schema.optional {
                        report.add(
                            Error::validation(format!(
                                "\"{key}\" is empty (set it to optional if this is expected)"
                            )),
                            Severity::Warning,
                        )?;
                    }
                    validated.insert(key.clone(), Value::Null);
                    continue;
                }

                // Type check
                if let Some(kind) = schema.primitive() {
                    if !self.registry.guard_satisfied(kind, &value) {
                        report.add(
                            Error::validation(format!(
                                "\"{key}\" must be of type {kind} (got {} instead)",
                                type_of(&value)
                            )),
                            severity,
                        )?;
                        if self.mode == Mode::Output {
                            validated.insert(key.clone(), value);
                        }
                        continue;
                    }
                }

                // Type constraints: at least one AND-group must hold
                if !groups.is_empty() {
                    let satisfied = groups.iter().any(|group| {
                        group
                            .iter()
                            .all(|guard| self.registry.guard_satisfied(guard, &value))
                    });
                    if !satisfied {
                        report.add(
                            Error::validation(format!(
                                "\"{key}\" does not satisfy any additional type constraints sets"
                            )),
                            severity,
                        )?;
                        if self.mode == Mode::Output {
                            validated.insert(key.clone(), value);
                        }
                        continue;
                    }
                }

                // Allowed values check
                if !schema.values.is_empty() && !schema.values.contains(&value) {
                    report.add(
                        Error::validation(format!(
                            "\"{key}\" must be one of {} (got {} instead)",
                            serde_json::to_string(&schema.values).unwrap_or_default(),
                            display(&value)
                        )),
                        severity,
                    )?;
                    if self.mode == Mode::Output {
                        validated.insert(key.clone(), value);
                    }
                    continue;
                }

                validated.insert(key.clone(), value);
            }

            // Forbid unsupported keys
            for key in args.keys() {
                let supported = definition
                    .iter()
                    .any(|(name, schema)| name == key || schema.aliases.iter().any(|a| a == key));
                if !supported {
                    report.add(
                        Error::validation(format!("\"{key}\" is not a valid argument")),
                        Severity::Warning,
                    )?;
                }
            }

            Ok(Outcome::Checked)
        })
    }

    /// Strict-mode schema authoring checks: documentation, example
    /// validity and the required/default mutual exclusion
    async fn check_authoring(
        &self,
        key: &str,
        schema: &Schema,
        defaults: &Map<String, Value>,
        report: &mut Report,
    ) -> Result<()> {
        if schema.description.as_deref().map_or(true, str::is_empty) {
            report.add(
                Error::validation(format!("\"{key}\" has no description")),
                Severity::Warning,
            )?;
        }

        for example in &schema.examples {
            // Each example runs through a disposable strict failfast
            // sub-validation restricted to this field's shape
            let mut sub_definition = Definition::new();
            sub_definition.insert(
                key.to_string(),
                Schema {
                    description: Some("<example>".to_string()),
                    kind: schema.kind.clone(),
                    matches: schema.matches.clone(),
                    values: schema.values.clone(),
                    ..Default::default()
                },
            );
            let mut sub_args = Map::new();
            sub_args.insert(key.to_string(), example.clone());
            let sub_args = Value::Object(sub_args);
            let mut sub_validated = Map::new();
            let mut sub_report = Report::new(Strategy::Failfast, true);
            if let Err(error) = self
                .check(
                    Some(&sub_args),
                    Some(&sub_definition),
                    &mut sub_validated,
                    defaults,
                    &mut sub_report,
                )
                .await
            {
                report.add(
                    Error::validation(format!(
                        "\"{key}\" has an invalid example: {} ({})",
                        display(example),
                        error.message()
                    )),
                    Severity::Warning,
                )?;
            }
        }

        if schema.required && schema.default.is_some() {
            report.add(
                Error::validation(format!(
                    "\"{key}\" cannot have a default value when it is also required"
                )),
                Severity::Error,
            )?;
        }
        Ok(())
    }
}

/// Match groups with each guard qualified by the field type
/// (`min(3)` on a `string` field becomes `string.min(3)`); untyped
/// fields use guard names as written
fn qualified_groups(schema: &Schema) -> Vec<Vec<String>> {
    let kind = schema.primitive();
    schema
        .matches
        .iter()
        .map(|group| {
            group
                .guards()
                .iter()
                .map(|guard| match kind {
                    Some(kind) => format!("{kind}.{guard}"),
                    None => guard.clone(),
                })
                .collect()
        })
        .collect()
}

fn is_absent_or_empty(args: Option<&Value>) -> bool {
    match args {
        None | Some(Value::Null) => true,
        Some(Value::Object(map)) => map.is_empty(),
        Some(_) => false,
    }
}

/// JSON type name of a value, as used in finding messages
fn type_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Human-readable rendering of a value inside a finding message
fn display(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_type_of() {
        assert_eq!(type_of(&Value::Null), "null");
        assert_eq!(type_of(&json!("a")), "string");
        assert_eq!(type_of(&json!(1)), "number");
        assert_eq!(type_of(&json!({})), "object");
    }

    #[test]
    fn test_qualified_groups() {
        let definition = crate::validation::schema::definition_from_value(json!({
            "name": {
                "description": "name",
                "type": "string",
                "match": ["min(3)", ["min(3)", "max(8)"]],
            },
        }))
        .unwrap();
        let groups = qualified_groups(&definition["name"]);
        assert_eq!(groups[0], vec!["string.min(3)"]);
        assert_eq!(groups[1], vec!["string.min(3)", "string.max(8)"]);
    }

    #[test]
    fn test_is_absent_or_empty() {
        assert!(is_absent_or_empty(None));
        assert!(is_absent_or_empty(Some(&Value::Null)));
        assert!(is_absent_or_empty(Some(&json!({}))));
        assert!(!is_absent_or_empty(Some(&json!({"a": 1}))));
        assert!(!is_absent_or_empty(Some(&json!(1))));
    }
}
