//! Opsmith Core - Schema validation & coercion engine for declarative
//! automation modules
//!
//! This crate turns raw, untyped module input into strongly-typed,
//! defaulted, constraint-checked data, and validates a module's
//! declared result shape before it is trusted.
//!
//! # Main Components
//!
//! - **Error Handling**: Error types using `thiserror` and `anyhow`
//! - **Schema Model**: plain-data definitions with recursive object
//!   types, aliases, relations, defaults and constraints
//! - **Validation Engine**: recursive dual-mode (input/output)
//!   validator with failfast/delayed reporting
//! - **Capability Registry**: named type guards and converters
//! - **Module Boundary**: JSON module descriptors consumed by the
//!   surrounding runtime
//!
//! # Example
//!
//! ```no_run
//! use opsmith_core::{validate, Result, ValidateOptions};
//! use opsmith_core::validation::definition_from_value;
//! use serde_json::json;
//!
//! async fn example() -> Result<()> {
//!     let definition = definition_from_value(json!({
//!         "message": {"description": "Message to log", "type": "string", "required": true},
//!     }))?;
//!     let validated = validate(
//!         Some(&json!({"message": "hello"})),
//!         Some(&definition),
//!         ValidateOptions::input(),
//!     )
//!     .await?;
//!     assert_eq!(validated, Some(json!({"message": "hello"})));
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod module;
pub mod template;
pub mod validation;

// Re-export main types for convenience
pub use error::{Error, Result};
pub use module::ModuleDescriptor;
pub use template::{ContextTemplater, TemplateOptions, Templater};
pub use validation::{
    validate, Definition, MatchGroup, Mode, Registry, Report, Schema, SchemaType, Severity,
    Strategy, ValidateOptions,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_library_version() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn test_error_creation() {
        let err = Error::validation("test finding");
        assert!(err.to_string().contains("test finding"));
    }

    #[test]
    fn test_mode_equality() {
        assert_eq!(Mode::Input, Mode::Input);
        assert_ne!(Mode::Input, Mode::Output);
    }
}
