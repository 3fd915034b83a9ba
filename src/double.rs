//! Programmable stand-in objects.
//!
//! A [`Double`] answers only the methods it was told about: stubbed methods
//! (any number of calls) and expected methods (a declared call-count bound,
//! exactly once by default). The runner verifies every double created in an
//! example once the example finishes.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use crate::errors::{RaisedError, UnmetExpectation};
use crate::value::Value;

/// Programmed answer to a method call.
#[derive(Clone)]
pub enum Response {
    Value(Value),
    Computed(Rc<dyn Fn(&[Value]) -> Result<Value, RaisedError>>),
}

impl Response {
    pub fn computed<F>(f: F) -> Self
    where
        F: Fn(&[Value]) -> Result<Value, RaisedError> + 'static,
    {
        Response::Computed(Rc::new(f))
    }

    fn respond(&self, args: &[Value]) -> Result<Value, RaisedError> {
        match self {
            Response::Value(value) => Ok(value.clone()),
            Response::Computed(f) => f(args),
        }
    }
}

impl From<Value> for Response {
    fn from(value: Value) -> Self {
        Response::Value(value)
    }
}

/// Allowed number of calls, `max == None` meaning unbounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallCount {
    pub min: usize,
    pub max: Option<usize>,
}

impl CallCount {
    pub fn exactly(n: usize) -> Self {
        Self { min: n, max: Some(n) }
    }

    pub fn at_least(n: usize) -> Self {
        Self { min: n, max: None }
    }

    pub fn at_most(n: usize) -> Self {
        Self { min: 0, max: Some(n) }
    }

    pub fn between(min: usize, max: usize) -> Self {
        Self { min, max: Some(max) }
    }

    pub fn any() -> Self {
        Self::at_least(0)
    }

    pub fn admits(&self, calls: usize) -> bool {
        calls >= self.min && self.max.map_or(true, |max| calls <= max)
    }
}

impl fmt::Display for CallCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn times(n: usize) -> String {
            match n {
                1 => "once".to_string(),
                2 => "twice".to_string(),
                n => format!("{n} times"),
            }
        }
        match (self.min, self.max) {
            (min, Some(max)) if min == max => write!(f, "exactly {}", times(min)),
            (0, None) => f.write_str("any number of times"),
            (min, None) => write!(f, "at least {}", times(min)),
            (0, Some(max)) => write!(f, "at most {}", times(max)),
            (min, Some(max)) => write!(f, "between {min} and {max} times"),
        }
    }
}

struct DoubleState {
    label: String,
    responses: BTreeMap<String, Response>,
    expectations: BTreeMap<String, CallCount>,
    calls: BTreeMap<String, usize>,
}

/// Shared handle to a double; clones observe the same calls.
#[derive(Clone)]
pub struct Double(Rc<RefCell<DoubleState>>);

impl Double {
    pub fn new(label: impl Into<String>) -> Self {
        Self(Rc::new(RefCell::new(DoubleState {
            label: label.into(),
            responses: BTreeMap::new(),
            expectations: BTreeMap::new(),
            calls: BTreeMap::new(),
        })))
    }

    pub fn label(&self) -> String {
        self.0.borrow().label.clone()
    }

    /// Programs `method` to answer with `response`; without an expectation the
    /// method may be called any number of times.
    pub fn program_response(&self, method: impl Into<String>, response: Response) {
        self.0.borrow_mut().responses.insert(method.into(), response);
    }

    /// Alias of [`Double::program_response`] for literal values.
    pub fn stub(&self, method: impl Into<String>, value: impl Into<Value>) {
        self.program_response(method, Response::Value(value.into()));
    }

    pub fn expect_call(&self, method: impl Into<String>, count: CallCount) {
        self.0
            .borrow_mut()
            .expectations
            .insert(method.into(), count);
    }

    /// Declares that `method` must be received, exactly once unless refined.
    pub fn should_receive(&self, method: impl Into<String>) -> Receive<'_> {
        let method = method.into();
        self.expect_call(method.clone(), CallCount::exactly(1));
        Receive {
            double: self,
            method,
        }
    }

    /// Declares that `method` must never be received.
    pub fn should_not_receive(&self, method: impl Into<String>) {
        self.expect_call(method, CallCount::exactly(0));
    }

    pub fn responds_to(&self, method: &str) -> bool {
        let state = self.0.borrow();
        state.responses.contains_key(method) || state.expectations.contains_key(method)
    }

    pub fn calls(&self, method: &str) -> usize {
        self.0.borrow().calls.get(method).copied().unwrap_or(0)
    }

    /// Records the call and answers it. Methods the double was never told
    /// about raise `NoMethodError` and are not counted.
    pub fn invoke(&self, method: &str, args: &[Value]) -> Result<Value, RaisedError> {
        let response = {
            let mut state = self.0.borrow_mut();
            let known =
                state.responses.contains_key(method) || state.expectations.contains_key(method);
            if !known {
                drop(state);
                return Err(RaisedError::no_method(method, &Value::Double(self.clone())));
            }
            *state.calls.entry(method.to_string()).or_insert(0) += 1;
            state.responses.get(method).cloned()
        };
        // Borrow released: computed responses may call back into this double.
        match response {
            Some(response) => response.respond(args),
            None => Ok(Value::Nil),
        }
    }

    /// Every declared expectation whose bound the observed calls violate.
    pub fn verify(&self) -> Vec<UnmetExpectation> {
        let state = self.0.borrow();
        state
            .expectations
            .iter()
            .filter_map(|(method, count)| {
                let received = state.calls.get(method).copied().unwrap_or(0);
                (!count.admits(received)).then(|| UnmetExpectation {
                    double: state.label.clone(),
                    method: method.clone(),
                    expected: count.to_string(),
                    received,
                })
            })
            .collect()
    }

    pub fn same_identity(&self, other: &Double) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for Double {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.0.borrow();
        f.debug_struct("Double")
            .field("label", &state.label)
            .field("expectations", &state.expectations)
            .field("calls", &state.calls)
            .finish()
    }
}

/// Refines an expectation declared with [`Double::should_receive`].
pub struct Receive<'a> {
    double: &'a Double,
    method: String,
}

impl Receive<'_> {
    pub fn and_return(self, value: impl Into<Value>) -> Self {
        self.double
            .program_response(self.method.clone(), Response::Value(value.into()));
        self
    }

    pub fn and_respond_with<F>(self, f: F) -> Self
    where
        F: Fn(&[Value]) -> Result<Value, RaisedError> + 'static,
    {
        self.double
            .program_response(self.method.clone(), Response::computed(f));
        self
    }

    pub fn times(self, n: usize) -> Self {
        self.with_count(CallCount::exactly(n))
    }

    pub fn at_least(self, n: usize) -> Self {
        self.with_count(CallCount::at_least(n))
    }

    pub fn at_most(self, n: usize) -> Self {
        self.with_count(CallCount::at_most(n))
    }

    pub fn any_number_of_times(self) -> Self {
        self.with_count(CallCount::any())
    }

    pub fn with_count(self, count: CallCount) -> Self {
        self.double.expect_call(self.method.clone(), count);
        self
    }
}
