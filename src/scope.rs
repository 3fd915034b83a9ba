//! Per-example execution state.
//!
//! The runner builds a fresh [`ExampleScope`] for every example. Hooks and the
//! body share it; nothing in it survives into the next example. This includes
//! the implicit regexp state (`$~`, `$_`) the fixture corpus relies on.

use std::collections::HashMap;

use crate::config::RunConfig;
use crate::double::Double;
use crate::errors::{RaisedError, UnmetExpectation};
use crate::guard::Version;
use crate::value::{Kind, Value};

pub struct ExampleScope<'run> {
    config: &'run RunConfig,
    shared_arg: Option<Value>,
    doubles: Vec<Double>,
    fixtures: HashMap<String, Value>,
    last_match: Value,
    last_line: Value,
}

impl<'run> ExampleScope<'run> {
    pub(crate) fn new(config: &'run RunConfig, shared_arg: Option<Value>) -> Self {
        Self {
            config,
            shared_arg,
            doubles: Vec::new(),
            fixtures: HashMap::new(),
            last_match: Value::Nil,
            last_line: Value::Nil,
        }
    }

    /// Creates a double that is verified when the example finishes.
    pub fn create_double(&mut self, label: impl Into<String>) -> Double {
        let double = Double::new(label);
        self.doubles.push(double.clone());
        double
    }

    /// Argument given to `it_behaves_like_with`, if this example came from a shared group.
    pub fn shared_arg(&self) -> Option<&Value> {
        self.shared_arg.as_ref()
    }

    /// Like [`ExampleScope::shared_arg`] but raises when the group was included without one.
    pub fn require_shared_arg(&self) -> Result<Value, RaisedError> {
        self.shared_arg.clone().ok_or_else(|| {
            RaisedError::new(
                Kind::ArgumentError,
                "shared group was included without an argument",
            )
        })
    }

    pub fn target_version(&self) -> &Version {
        &self.config.target_version
    }

    pub fn platform(&self) -> Option<&str> {
        self.config.platform.as_deref()
    }

    /// Stores a fixture, typically from a `before_each` hook.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.fixtures.insert(name.into(), value.into());
    }

    /// Reads a fixture; a missing one raises `NameError`.
    pub fn get(&self, name: &str) -> Result<Value, RaisedError> {
        self.fixtures.get(name).cloned().ok_or_else(|| {
            RaisedError::new(
                Kind::NameError,
                format!("undefined fixture `{name}'"),
            )
        })
    }

    /// `$~`: the match data of the last regexp match in this example.
    pub fn last_match(&self) -> &Value {
        &self.last_match
    }

    pub fn set_last_match(&mut self, value: Value) {
        self.last_match = value;
    }

    /// `$_`: the last line read, used by unary regexp matching.
    pub fn last_line(&self) -> &Value {
        &self.last_line
    }

    pub fn set_last_line(&mut self, value: impl Into<Value>) {
        self.last_line = value.into();
    }

    pub(crate) fn verify_doubles(&self) -> Vec<UnmetExpectation> {
        self.doubles.iter().flat_map(Double::verify).collect()
    }
}
