//! Matcher library.
//!
//! Every matcher is a pure function returning a [`Verdict`]: whether the
//! expectation holds, plus the interrupt to report when it does not. Negating
//! a verdict swaps in the outcome of the negated expectation, which gives the
//! `should_not` forms for free:
//!
//! ```rust
//! use specrun::matchers::{equals, responds_to};
//! use specrun::object::Object;
//! use specrun::value::Value;
//!
//! let obj = Value::from(Object::new("Object"));
//! assert!(responds_to(&obj, "to_a").negate().passed());
//! assert!(equals(&Value::from(vec![1, 2]), &Value::from(vec![1, 2])).passed());
//! ```

use crate::errors::{Failure, Interrupt, RaisedError};
use crate::value::{Kind, Value};

/// Outcome of a single matcher.
#[derive(Debug, Clone, PartialEq)]
pub struct Verdict {
    passed: bool,
    negated_passed: bool,
    failure: Interrupt,
    negated_failure: Interrupt,
}

impl Verdict {
    fn new(passed: bool, failure: Failure, negated_failure: Failure) -> Self {
        Self {
            passed,
            negated_passed: !passed,
            failure: Interrupt::Failed(failure),
            negated_failure: Interrupt::Failed(negated_failure),
        }
    }

    /// A verdict that fails either way: the negated form re-raises `error`.
    fn escaped(failure: Failure, error: RaisedError) -> Self {
        Self {
            passed: false,
            negated_passed: false,
            failure: Interrupt::Failed(failure),
            negated_failure: Interrupt::Raised(error),
        }
    }

    pub fn passed(&self) -> bool {
        self.passed
    }

    /// Message describing why the verdict failed (meaningful only when it did).
    pub fn message(&self) -> &str {
        match &self.failure {
            Interrupt::Failed(failure) => &failure.message,
            Interrupt::Raised(error) => &error.message,
        }
    }

    pub fn negate(self) -> Self {
        Self {
            passed: self.negated_passed,
            negated_passed: self.passed,
            failure: self.negated_failure,
            negated_failure: self.failure,
        }
    }

    /// Converts into a result so example bodies can stop at the first failure with `?`.
    pub fn check(self) -> Result<(), Interrupt> {
        if self.passed {
            Ok(())
        } else {
            Err(self.failure)
        }
    }
}

// ============================================================================
// MATCHERS
// ============================================================================

/// Structural equality; arrays report the first differing index.
pub fn equals(actual: &Value, expected: &Value) -> Verdict {
    let passed = actual == expected;
    let detail = if passed {
        None
    } else {
        mismatch_detail(actual, expected)
    };
    let message = match detail {
        Some(detail) => format!("expected {expected}, got {actual} ({detail})"),
        None => format!("expected {expected}, got {actual}"),
    };
    Verdict::new(
        passed,
        Failure::with_values(message, expected, actual),
        Failure::new(format!("expected {actual} not to equal {expected}")),
    )
}

/// Locates the first difference between two values, descending into arrays.
fn mismatch_detail(actual: &Value, expected: &Value) -> Option<String> {
    let (Value::Array(actual_items), Value::Array(expected_items)) = (actual, expected) else {
        return None;
    };
    for (index, (a, e)) in actual_items.iter().zip(expected_items).enumerate() {
        if a != e {
            return Some(match mismatch_detail(a, e) {
                Some(inner) => format!("index {index}: {inner}"),
                None => format!("index {index}: expected {e}, got {a}"),
            });
        }
    }
    (actual_items.len() != expected_items.len()).then(|| {
        format!(
            "length: expected {}, got {}",
            expected_items.len(),
            actual_items.len()
        )
    })
}

pub fn is_nil(actual: &Value) -> Verdict {
    Verdict::new(
        actual.is_nil(),
        Failure::with_values(format!("expected nil, got {actual}"), &Value::Nil, actual),
        Failure::new("expected a value other than nil"),
    )
}

pub fn is_true(actual: &Value) -> Verdict {
    let expected = Value::Bool(true);
    Verdict::new(
        *actual == expected,
        Failure::with_values(format!("expected true, got {actual}"), &expected, actual),
        Failure::new("expected a value other than true"),
    )
}

pub fn is_false(actual: &Value) -> Verdict {
    let expected = Value::Bool(false);
    Verdict::new(
        *actual == expected,
        Failure::with_values(format!("expected false, got {actual}"), &expected, actual),
        Failure::new("expected a value other than false"),
    )
}

pub fn is_kind_of(actual: &Value, kind: Kind) -> Verdict {
    let actual_kind = actual.kind();
    Verdict::new(
        actual_kind.is_a(kind),
        Failure::new(format!(
            "expected {actual} to be a kind of {kind}, but it is a {}",
            actual.type_name()
        )),
        Failure::new(format!("expected {actual} not to be a kind of {kind}")),
    )
}

pub fn responds_to(actual: &Value, member: &str) -> Verdict {
    Verdict::new(
        actual.responds_to(member),
        Failure::new(format!("expected {actual} to respond to :{member}")),
        Failure::new(format!("expected {actual} not to respond to :{member}")),
    )
}

/// Calls `call` and expects it to raise `kind` or one of its subkinds.
///
/// Any other error fails the expectation. Under negation it propagates as a
/// raised error instead, so `should_not raise` never hides an unrelated one.
pub fn raises<F>(call: F, kind: Kind) -> Verdict
where
    F: FnOnce() -> Result<Value, RaisedError>,
{
    match call() {
        Ok(value) => Verdict::new(
            false,
            Failure::new(format!(
                "expected {kind} to be raised, but nothing was raised (returned {value})"
            )),
            Failure::new(format!("expected no {kind}")),
        ),
        Err(error) if error.kind.is_a(kind) => Verdict::new(
            true,
            Failure::new(format!("expected {kind}")),
            Failure::new(format!("expected no {kind}, but {error} was raised")),
        ),
        Err(error) => Verdict::escaped(
            Failure::new(format!("expected {kind} to be raised, but got {error}")),
            error,
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::Object;

    #[test]
    fn array_mismatch_names_the_index() {
        let verdict = equals(&Value::from(vec![1, 2, 3, 4]), &Value::from(vec![1, 2, 3, 5]));
        assert!(!verdict.passed());
        assert_eq!(
            verdict.message(),
            "expected [1, 2, 3, 5], got [1, 2, 3, 4] (index 3: expected 5, got 4)"
        );
    }

    #[test]
    fn array_length_mismatch() {
        let verdict = equals(&Value::from(vec![1, 2]), &Value::from(vec![1, 2, 3]));
        assert!(verdict.message().ends_with("(length: expected 3, got 2)"));
    }

    #[test]
    fn nested_array_mismatch() {
        let actual = Value::from(vec![Value::from(vec![1, 2])]);
        let expected = Value::from(vec![Value::from(vec![1, 3])]);
        assert!(equals(&actual, &expected)
            .message()
            .contains("index 0: index 1: expected 3, got 2"));
    }

    #[test]
    fn negation_swaps_messages() {
        let obj = Value::from(Object::new("Object"));
        let verdict = responds_to(&obj, "inspect").negate();
        assert!(!verdict.passed());
        assert_eq!(verdict.message(), "expected #<Object> not to respond to :inspect");
    }

    #[test]
    fn kind_of_accepts_ancestors() {
        assert!(is_kind_of(&Value::from(3), Kind::Numeric).passed());
        assert!(!is_kind_of(&Value::from("s"), Kind::Numeric).passed());
    }

    #[test]
    fn raises_distinguishes_outcomes() {
        let type_error = || Err(RaisedError::type_error("no implicit conversion"));
        assert!(raises(type_error, Kind::TypeError).passed());
        assert!(raises(type_error, Kind::StandardError).passed());

        let other = raises(|| Err(RaisedError::new(Kind::ArgumentError, "bad")), Kind::TypeError);
        assert!(other.message().contains("but got ArgumentError: bad"));

        let none = raises(|| Ok(Value::Nil), Kind::TypeError);
        assert!(none.message().contains("nothing was raised"));
    }

    #[test]
    fn check_returns_the_failure() {
        match is_nil(&Value::from(1)).check() {
            Err(Interrupt::Failed(failure)) => {
                assert_eq!(failure.expected.as_deref(), Some("nil"));
                assert_eq!(failure.actual.as_deref(), Some("1"));
            }
            other => panic!("expected a failure, got {other:?}"),
        }
    }

    #[test]
    fn negated_raises_propagates_other_kinds() {
        let argument_error = || Err(RaisedError::new(Kind::ArgumentError, "boom"));
        let verdict = raises(argument_error, Kind::TypeError).negate();
        assert!(!verdict.passed());
        match verdict.check() {
            Err(Interrupt::Raised(error)) => {
                assert_eq!(error.kind, Kind::ArgumentError);
                assert_eq!(error.message, "boom");
            }
            other => panic!("expected the error to propagate, got {other:?}"),
        }

        let quiet = raises(|| Ok(Value::Nil), Kind::TypeError).negate();
        assert!(quiet.check().is_ok());
    }
}
