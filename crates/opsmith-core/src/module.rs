//! Module boundary
//!
//! A module ships a JSON descriptor declaring its argument and result
//! definitions. The runtime validates raw arguments in input mode
//! before executing the module, and sanity-checks the module's own
//! result in output mode afterwards. Descriptors are plain,
//! JSON-serializable data so they can be generated and loaded from
//! external manifests.

use crate::error::{Error, Result};
use crate::validation::{validate, Definition, Mode, ValidateOptions};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Declarative description of a module's interface
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModuleDescriptor {
    /// What the module does
    pub description: String,

    /// Whether this is a control module with no target-side effect
    #[serde(default)]
    pub controller: bool,

    /// Input argument definition; `None` means no argument allowed
    #[serde(default)]
    pub args: Option<Definition>,

    /// Prior-state definition probed before execution
    #[serde(default)]
    pub past: Option<Definition>,

    /// Result definition; `None` means no result expected
    #[serde(default)]
    pub result: Option<Definition>,

    /// Maintainer handles
    #[serde(default)]
    pub maintainers: Vec<String>,
}

impl ModuleDescriptor {
    /// Load a descriptor from its JSON manifest text
    pub fn from_json(manifest: &str) -> Result<Self> {
        serde_json::from_str(manifest).map_err(|err| Error::Module {
            message: "failed to parse module descriptor".to_string(),
            source: Some(err.into()),
        })
    }

    /// Load a descriptor from an already-parsed JSON value
    pub fn from_value(manifest: Value) -> Result<Self> {
        serde_json::from_value(manifest).map_err(|err| Error::Module {
            message: "failed to parse module descriptor".to_string(),
            source: Some(err.into()),
        })
    }

    /// Validate raw arguments before execution
    ///
    /// Runs the engine in input mode with the delayed strategy, so
    /// every violation is reported in one aggregated error.
    pub async fn validate_args(
        &self,
        raw: Option<&Value>,
        context: Map<String, Value>,
    ) -> Result<Option<Value>> {
        validate(
            raw,
            self.args.as_ref(),
            ValidateOptions::new(Mode::Input).with_context(context),
        )
        .await
    }

    /// Sanity-check the module's own result after execution
    pub async fn validate_result(&self, raw: Option<&Value>) -> Result<Option<Value>> {
        validate(raw, self.result.as_ref(), ValidateOptions::new(Mode::Output)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    // Mirrors the generated manifest of a minimal logging module
    fn log_module() -> ModuleDescriptor {
        ModuleDescriptor::from_value(json!({
            "description": "Log a message\n",
            "args": {
                "message": {
                    "description": "Message to log",
                    "type": "string",
                    "required": true,
                    "aliases": ["msg"],
                },
            },
            "past": null,
            "result": {
                "message": {"description": "Message logged", "type": "string"},
            },
            "maintainers": ["opsmith"],
        }))
        .unwrap()
    }

    #[test]
    fn test_descriptor_from_json() {
        let descriptor = ModuleDescriptor::from_json(
            r#"{"description": "No operation\n", "controller": true, "args": null, "past": null, "result": null}"#,
        )
        .unwrap();
        assert!(descriptor.controller);
        assert!(descriptor.args.is_none());
        assert!(descriptor.result.is_none());
    }

    #[tokio::test]
    async fn test_validate_args_accepts_alias() {
        let module = log_module();
        let validated = module
            .validate_args(Some(&json!({"msg": "hello"})), Map::new())
            .await
            .unwrap();
        assert_eq!(validated, Some(json!({"message": "hello"})));
    }

    #[tokio::test]
    async fn test_validate_args_rejects_missing_required() {
        let module = log_module();
        let err = module
            .validate_args(Some(&json!({})), Map::new())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("\"message\" is required"));
    }

    #[tokio::test]
    async fn test_validate_result_roundtrip() {
        let module = log_module();
        let validated = module
            .validate_result(Some(&json!({"message": "hello"})))
            .await
            .unwrap();
        assert_eq!(validated, Some(json!({"message": "hello"})));
    }

    #[tokio::test]
    async fn test_controller_module_rejects_arguments() {
        let module = ModuleDescriptor::from_value(json!({
            "description": "No operation\n",
            "controller": true,
            "args": null,
            "result": null,
        }))
        .unwrap();
        assert_eq!(module.validate_args(None, Map::new()).await.unwrap(), None);
        let err = module
            .validate_args(Some(&json!({"anything": 1})), Map::new())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("no argument allowed"));
    }
}
