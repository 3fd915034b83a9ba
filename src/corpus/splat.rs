//! Array literals with the unpacking splat operator, and their specs.

use crate::errors::RaisedError;
use crate::matchers::{equals, responds_to};
use crate::object::Object;
use crate::tree::Suite;
use crate::value::Value;

/// One element of an array literal: a plain value or `*value`.
#[derive(Debug, Clone)]
pub enum Element {
    Item(Value),
    Splat(Value),
}

impl Element {
    pub fn item(value: impl Into<Value>) -> Self {
        Element::Item(value.into())
    }

    pub fn splat(value: impl Into<Value>) -> Self {
        Element::Splat(value.into())
    }
}

/// Evaluates an array literal, expanding every splatted element in place.
pub fn array_literal(elements: Vec<Element>) -> Result<Value, RaisedError> {
    let mut items = Vec::with_capacity(elements.len());
    for element in elements {
        match element {
            Element::Item(value) => items.push(value),
            Element::Splat(value) => items.extend(expand(value)?),
        }
    }
    Ok(Value::Array(items))
}

/// Arrays expand to their elements; anything answering `to_a` is converted
/// first; everything else is used unchanged.
fn expand(value: Value) -> Result<Vec<Value>, RaisedError> {
    if let Value::Array(items) = value {
        return Ok(items);
    }
    if !value.responds_to("to_a") {
        return Ok(vec![value]);
    }
    match value.call("to_a", &[])? {
        Value::Array(items) => Ok(items),
        Value::Nil => Ok(vec![value]),
        other => Err(RaisedError::type_error(format!(
            "can't convert {} to Array ({}#to_a gives {})",
            value.type_name(),
            value.type_name(),
            other.type_name()
        ))),
    }
}

pub fn declare(suite: &mut Suite) {
    suite.describe("The unpacking splat operator (*)", |d| {
        d.it(
            "when applied to a non-Array value attempts to coerce it to Array if the object respond_to?(:to_a)",
            |ex| {
                let obj = ex.create_double("pseudo-array");
                obj.should_receive("to_a").and_return(vec![2, 3, 4]);
                let literal = array_literal(vec![Element::item(1), Element::splat(obj)])?;
                equals(&literal, &Value::from(vec![1, 2, 3, 4])).check()?;
                Ok(())
            },
        );

        d.it(
            "when applied to a non-Array value uses it unchanged if it does not respond_to?(:to_a)",
            |_| {
                let obj = Value::from(Object::new("Object"));
                responds_to(&obj, "to_a").negate().check()?;
                let literal = array_literal(vec![Element::item(1), Element::splat(obj.clone())])?;
                equals(&literal, &Value::Array(vec![Value::from(1), obj])).check()?;
                Ok(())
            },
        );

        d.it("can be used before other non-splat elements", |_| {
            let a = Value::from(vec![1, 2]);
            let literal = array_literal(vec![Element::item(0), Element::splat(a), Element::item(3)])?;
            equals(&literal, &Value::from(vec![0, 1, 2, 3])).check()?;
            Ok(())
        });

        d.it("can be used multiple times in the same containing array", |_| {
            let a = Value::from(vec![1, 2]);
            let b = Value::from(vec![1, 0]);
            let literal = array_literal(vec![
                Element::splat(a.clone()),
                Element::item(3),
                Element::splat(a),
                Element::splat(b),
            ])?;
            equals(&literal, &Value::from(vec![1, 2, 3, 1, 2, 1, 0])).check()?;
            Ok(())
        });
    });
}
