//! Schema validation & coercion engine
//!
//! Turns raw, untyped module input into strongly-typed, defaulted,
//! constraint-checked data, and validates a module's declared result
//! shape before it is trusted. The engine is pure: it performs no I/O,
//! knows nothing about hosts, and never retries. Its only suspension
//! points are calls into the templating collaborator and the recursive
//! descent into nested definitions, all strictly sequenced.
//!
//! Validation runs in one of two modes: `input` applies aliases,
//! conflicts/requires relations, `required` and defaulting before a
//! module executes; `output` applies `optional` and emptiness warnings
//! to a result a module produced. Findings accumulate in a per-call
//! [`Report`] under a `failfast` or `delayed` strategy.

pub mod check;
pub mod defaults;
pub mod registry;
pub mod report;
pub mod resolver;
pub mod schema;

pub use registry::{Converter, Guard, Registry};
pub use report::{Report, Severity, Strategy};
pub use schema::{definition_from_value, Definition, MatchGroup, Schema, SchemaType};

use crate::error::Result;
use crate::template::{ContextTemplater, Templater};
use check::{Checker, Outcome};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Validation mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Validating arguments before execution
    Input,
    /// Validating a result after execution
    Output,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Input => write!(f, "input"),
            Mode::Output => write!(f, "output"),
        }
    }
}

static DEFAULT_TEMPLATER: ContextTemplater = ContextTemplater;

/// Options for one `validate` call
#[derive(Clone)]
pub struct ValidateOptions<'a> {
    /// Validation mode
    pub mode: Mode,
    /// Reporting strategy
    pub strategy: Strategy,
    /// Whether to run authoring checks and promote warnings
    pub strict: bool,
    /// Ambient templating context
    pub context: Map<String, Value>,
    /// Templating collaborator
    pub templater: &'a dyn Templater,
}

impl ValidateOptions<'static> {
    /// Options for the given mode, with the delayed strategy, the
    /// built-in templater and an empty context
    pub fn new(mode: Mode) -> Self {
        Self {
            mode,
            strategy: Strategy::Delayed,
            strict: false,
            context: Map::new(),
            templater: &DEFAULT_TEMPLATER,
        }
    }

    /// Input-mode options
    pub fn input() -> Self {
        Self::new(Mode::Input)
    }

    /// Output-mode options
    pub fn output() -> Self {
        Self::new(Mode::Output)
    }
}

impl<'a> ValidateOptions<'a> {
    /// Set the reporting strategy
    pub fn with_strategy(mut self, strategy: Strategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Enable strict mode
    pub fn with_strict(mut self) -> Self {
        self.strict = true;
        self
    }

    /// Set the ambient templating context
    pub fn with_context(mut self, context: Map<String, Value>) -> Self {
        self.context = context;
        self
    }

    /// Inject a templating collaborator
    pub fn with_templater(self, templater: &dyn Templater) -> ValidateOptions<'_> {
        ValidateOptions {
            mode: self.mode,
            strategy: self.strategy,
            strict: self.strict,
            context: self.context,
            templater,
        }
    }
}

/// Validate a set of arguments against a definition
///
/// Computes the default tree, runs the recursive value pass and
/// settles the report. Returns `None` without consulting the report
/// when both the definition and the input are absent or empty;
/// otherwise returns the validated, typed output tree or the
/// aggregated validation error.
pub async fn validate(
    args: Option<&Value>,
    definition: Option<&Definition>,
    options: ValidateOptions<'_>,
) -> Result<Option<Value>> {
    let mut report = Report::new(options.strategy, options.strict);
    let defaults = defaults::compute(
        definition,
        &options.context,
        args,
        options.templater,
        &mut report,
    )
    .await?;

    let checker = Checker {
        mode: options.mode,
        context: &options.context,
        templater: options.templater,
        registry: Registry::global(),
    };
    let mut validated = Map::new();
    match checker
        .check(args, definition, &mut validated, &defaults, &mut report)
        .await?
    {
        Outcome::Empty => Ok(None),
        Outcome::Checked => {
            report.summary()?;
            Ok(Some(Value::Object(validated)))
        }
    }
}
