//! Default computator
//!
//! Recursively derives a default-value tree shaped like the schema.
//! Default expressions are rendered through the templating
//! collaborator against the ambient context, the defaults built so far
//! (so later defaults can reference earlier siblings) and the raw
//! arguments. A default that fails to render falls back to its raw
//! literal with a warning. Fields without a default are simply absent
//! from the tree.

use crate::error::{Error, Result};
use crate::template::{TemplateOptions, Templater};
use crate::validation::report::{Report, Severity};
use crate::validation::schema::{Definition, SchemaType};
use serde_json::{Map, Value};
use std::future::Future;
use std::pin::Pin;

/// Build the default tree for a definition
pub fn compute<'a>(
    definition: Option<&'a Definition>,
    context: &'a Map<String, Value>,
    args: Option<&'a Value>,
    templater: &'a dyn Templater,
    report: &'a mut Report,
) -> Pin<Box<dyn Future<Output = Result<Map<String, Value>>> + Send + 'a>> {
    Box::pin(async move {
        let mut defaults = Map::new();
        let Some(definition) = definition else {
            return Ok(defaults);
        };
        for (key, schema) in definition {
            match (&schema.kind, &schema.default) {
                (Some(SchemaType::Object(nested)), _) => {
                    // Sibling defaults built so far become extra context
                    let mut scoped = context.clone();
                    for (name, value) in &defaults {
                        scoped.entry(name.clone()).or_insert_with(|| value.clone());
                    }
                    let nested =
                        compute(Some(nested), &scoped, args, templater, report).await?;
                    defaults.insert(key.clone(), Value::Object(nested));
                }
                (_, Some(default)) => {
                    let scope = template_scope(&defaults, context, args);
                    let options = TemplateOptions::default();
                    match templater.render(default, &scope, &options).await {
                        Ok(rendered) => {
                            defaults.insert(key.clone(), rendered);
                        }
                        Err(error) => {
                            report.add(
                                Error::validation(format!(
                                    "\"{key}\" default value could not be templated correctly: {}",
                                    error.message()
                                )),
                                Severity::Warning,
                            )?;
                            defaults.insert(key.clone(), default.clone());
                        }
                    }
                }
                _ => {}
            }
        }
        Ok(defaults)
    })
}

/// Template scope for one default expression: defaults built so far,
/// overridden by ambient context, overridden by the raw arguments
fn template_scope(
    defaults: &Map<String, Value>,
    context: &Map<String, Value>,
    args: Option<&Value>,
) -> Map<String, Value> {
    let mut scope = defaults.clone();
    for (key, value) in context {
        scope.insert(key.clone(), value.clone());
    }
    if let Some(Value::Object(args)) = args {
        for (key, value) in args {
            scope.insert(key.clone(), value.clone());
        }
    }
    scope
}
