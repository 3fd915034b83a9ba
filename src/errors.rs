//! Error taxonomy for the harness.
//!
//! Errors fall into two families:
//!
//! - **Example-level** ([`Failure`], [`RaisedError`], [`UnmetExpectation`]):
//!   recovered locally and recorded as the example's outcome. They travel
//!   through [`Interrupt`] so example bodies can short-circuit with `?`.
//! - **Run-level** ([`StructuralError`], [`ConfigError`]): abort the run before
//!   any example executes and are rendered as `miette` diagnostics.

use std::fmt;

use miette::Diagnostic;
use serde::Serialize;
use thiserror::Error;

use crate::value::{Kind, Value};

// ============================================================================
// EXAMPLE-LEVEL ERRORS
// ============================================================================

/// An error raised by the language under test (an exception, not a Rust error).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RaisedError {
    pub kind: Kind,
    pub message: String,
}

impl RaisedError {
    pub fn new(kind: Kind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn no_method(name: &str, receiver: &Value) -> Self {
        Self::new(
            Kind::NoMethodError,
            format!("undefined method `{name}' for {receiver}"),
        )
    }

    pub fn type_error(message: impl Into<String>) -> Self {
        Self::new(Kind::TypeError, message)
    }
}

impl fmt::Display for RaisedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

impl std::error::Error for RaisedError {}

/// A matcher that did not hold, or a double whose expectations were not met.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Failure {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actual: Option<String>,
}

impl Failure {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            expected: None,
            actual: None,
        }
    }

    pub fn with_values(message: impl Into<String>, expected: &Value, actual: &Value) -> Self {
        Self {
            message: message.into(),
            expected: Some(expected.to_string()),
            actual: Some(actual.to_string()),
        }
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// A double's call-count bound that was violated at verification time.
#[derive(Debug, Clone, PartialEq)]
pub struct UnmetExpectation {
    pub double: String,
    pub method: String,
    pub expected: String,
    pub received: usize,
}

impl fmt::Display for UnmetExpectation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Double {:?} expected to receive :{} {}, received it {} time{}",
            self.double,
            self.method,
            self.expected,
            self.received,
            if self.received == 1 { "" } else { "s" }
        )
    }
}

impl From<UnmetExpectation> for Failure {
    fn from(unmet: UnmetExpectation) -> Self {
        Failure::new(unmet.to_string())
    }
}

/// Why an example body stopped early.
#[derive(Debug, Clone, PartialEq)]
pub enum Interrupt {
    Failed(Failure),
    Raised(RaisedError),
}

impl From<Failure> for Interrupt {
    fn from(failure: Failure) -> Self {
        Interrupt::Failed(failure)
    }
}

impl From<RaisedError> for Interrupt {
    fn from(error: RaisedError) -> Self {
        Interrupt::Raised(error)
    }
}

/// Return type of example bodies and hooks.
pub type ExampleResult = Result<(), Interrupt>;

/// What made an example error out.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ErrorCause {
    Raised(RaisedError),
    Panic { message: String },
}

impl fmt::Display for ErrorCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorCause::Raised(error) => write!(f, "{error}"),
            ErrorCause::Panic { message } => write!(f, "panic: {message}"),
        }
    }
}

// ============================================================================
// RUN-LEVEL ERRORS
// ============================================================================

/// Problems in the declared tree. Fatal: the run aborts before execution.
#[derive(Debug, Clone, PartialEq, Error, Diagnostic)]
pub enum StructuralError {
    #[error("malformed guard {guard:?} in `{context}`: {reason}")]
    #[diagnostic(
        code(specrun::structure::malformed_guard),
        help("version ranges look like \"1.9\", \"1.8.7..1.9\" or \"...1.9\"")
    )]
    MalformedGuard {
        context: String,
        guard: String,
        reason: String,
    },

    #[error("`{context}` behaves like undefined shared group {name:?}")]
    #[diagnostic(
        code(specrun::structure::undefined_shared_group),
        help("declare the group with `shared_examples` on the same suite")
    )]
    UndefinedSharedGroup { context: String, name: String },

    #[error("cyclic shared group inclusion in `{context}`: {}", .chain.join(" -> "))]
    #[diagnostic(code(specrun::structure::cyclic_inclusion))]
    CyclicInclusion { context: String, chain: Vec<String> },

    #[error("shared group {name:?} is declared more than once in `{context}`")]
    #[diagnostic(
        code(specrun::structure::duplicate_shared_group),
        help("shared group names are registered per suite and must be unique")
    )]
    DuplicateSharedGroup { context: String, name: String },
}

/// Problems loading or validating run configuration.
#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    #[error("failed to read config file '{path}'")]
    #[diagnostic(code(specrun::config::io))]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config file '{path}'")]
    #[diagnostic(code(specrun::config::yaml))]
    Yaml {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("invalid version {0:?}")]
    #[diagnostic(
        code(specrun::config::version),
        help("versions are dot-separated numbers such as 1.9.3")
    )]
    InvalidVersion(String),

    #[error("unknown suite {0:?}")]
    #[diagnostic(code(specrun::config::suite), help("`specrun suites` lists the bundled suites"))]
    UnknownSuite(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use miette::Report;

    #[test]
    fn structural_errors_render_as_diagnostics() {
        let err = StructuralError::UndefinedSharedGroup {
            context: "Regexp#match".to_string(),
            name: "regexp_match".to_string(),
        };
        let output = format!("{:?}", Report::new(err));
        assert!(output.contains("undefined_shared_group"));
        assert!(output.contains("Regexp#match"));
    }

    #[test]
    fn cyclic_inclusion_names_the_chain() {
        let err = StructuralError::CyclicInclusion {
            context: "root".to_string(),
            chain: vec!["a".to_string(), "b".to_string(), "a".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "cyclic shared group inclusion in `root`: a -> b -> a"
        );
    }

    #[test]
    fn duplicate_group_names_its_scope() {
        let err = StructuralError::DuplicateSharedGroup {
            context: "<suite root>".to_string(),
            name: "twice".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "shared group \"twice\" is declared more than once in `<suite root>`"
        );
    }

    #[test]
    fn unmet_expectation_message() {
        let unmet = UnmetExpectation {
            double: "pseudo-array".to_string(),
            method: "to_a".to_string(),
            expected: "exactly once".to_string(),
            received: 0,
        };
        assert_eq!(
            Failure::from(unmet).message,
            "Double \"pseudo-array\" expected to receive :to_a exactly once, received it 0 times"
        );
    }
}
