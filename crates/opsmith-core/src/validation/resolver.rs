//! Alias and relation resolver
//!
//! Input-mode pre-pass over the raw argument mapping: collapse
//! declared aliases to their canonical keys, then check
//! conflicts/requires relations among the keys that are present. Any
//! relation failure suppresses the value pass for this definition
//! level, but remains local to it.

use crate::error::{Error, Result};
use crate::validation::report::{Report, Severity};
use crate::validation::schema::Definition;
use serde_json::{Map, Value};

/// Collapse aliases to canonical keys, in place
///
/// Returns false when a key was supplied several times through its
/// aliases (or an alias alongside the canonical key); scanning
/// continues so every collision is reported.
pub fn resolve_aliases(
    args: &mut Map<String, Value>,
    definition: &Definition,
    report: &mut Report,
) -> Result<bool> {
    let mut valid = true;
    for (key, schema) in definition {
        let present: Vec<&String> = schema
            .aliases
            .iter()
            .filter(|alias| args.contains_key(*alias))
            .collect();
        if present.is_empty() {
            continue;
        }
        if present.len() > 1 || args.contains_key(key) {
            report.add(
                Error::validation(format!(
                    "\"{key}\" is defined multiple times through one of its aliases: {}",
                    serde_json::to_string(&present).unwrap_or_default()
                )),
                Severity::Error,
            )?;
            valid = false;
            continue;
        }
        let alias = present[0].clone();
        if let Some(value) = args.shift_remove(&alias) {
            args.insert(key.clone(), value);
        }
    }
    Ok(valid)
}

/// Check conflicts/requires relations among present keys
pub fn check_relations(
    args: &Map<String, Value>,
    definition: &Definition,
    report: &mut Report,
) -> Result<bool> {
    let mut valid = true;
    for (key, schema) in definition {
        if !args.contains_key(key) {
            continue;
        }
        for conflict in &schema.conflicts {
            if args.contains_key(conflict) {
                report.add(
                    Error::validation(format!("\"{key}\" cannot be used with \"{conflict}\"")),
                    Severity::Error,
                )?;
                valid = false;
            }
        }
        for require in &schema.requires {
            if !args.contains_key(require) {
                report.add(
                    Error::validation(format!("\"{key}\" is required with \"{require}\"")),
                    Severity::Error,
                )?;
                valid = false;
            }
        }
    }
    Ok(valid)
}
