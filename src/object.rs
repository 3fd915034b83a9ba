//! Plain objects with an explicit method table.
//!
//! Real (non-double) collaborators in example bodies are modelled as an
//! [`Object`]: a class name plus the methods it defines. Capability checks
//! read the method table, so `Object::new("Object")` answers `false` to
//! `responds_to(.., "to_a")` exactly like a fresh object would.

use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use crate::errors::RaisedError;
use crate::value::Value;

pub type Method = Rc<dyn Fn(&[Value]) -> Result<Value, RaisedError>>;

struct ObjectData {
    class_name: String,
    methods: BTreeMap<String, Method>,
}

/// Shared handle; clones refer to the same object.
#[derive(Clone)]
pub struct Object(Rc<ObjectData>);

impl Object {
    pub fn new(class_name: impl Into<String>) -> Self {
        Self(Rc::new(ObjectData {
            class_name: class_name.into(),
            methods: BTreeMap::new(),
        }))
    }

    /// Builder-style method definition; objects are immutable once shared.
    pub fn with_method<F>(self, name: impl Into<String>, method: F) -> Self
    where
        F: Fn(&[Value]) -> Result<Value, RaisedError> + 'static,
    {
        let mut data = match Rc::try_unwrap(self.0) {
            Ok(data) => data,
            Err(shared) => ObjectData {
                class_name: shared.class_name.clone(),
                methods: shared.methods.clone(),
            },
        };
        data.methods.insert(name.into(), Rc::new(method));
        Self(Rc::new(data))
    }

    pub fn class_name(&self) -> &str {
        &self.0.class_name
    }

    pub fn responds_to(&self, name: &str) -> bool {
        self.0.methods.contains_key(name)
    }

    pub fn invoke(&self, name: &str, args: &[Value]) -> Result<Value, RaisedError> {
        match self.0.methods.get(name) {
            Some(method) => method(args),
            None => Err(RaisedError::no_method(name, &Value::Object(self.clone()))),
        }
    }

    pub fn same_identity(&self, other: &Object) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Object")
            .field("class_name", &self.0.class_name)
            .field("methods", &self.0.methods.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Kind;

    #[test]
    fn defined_methods_are_callable() {
        let obj = Object::new("Point").with_method("to_a", |_| Ok(Value::from(vec![1, 2])));
        assert!(obj.responds_to("to_a"));
        assert_eq!(obj.invoke("to_a", &[]).unwrap(), Value::from(vec![1, 2]));
    }

    #[test]
    fn missing_methods_raise() {
        let obj = Object::new("Object");
        let err = obj.invoke("to_a", &[]).unwrap_err();
        assert_eq!(err.kind, Kind::NoMethodError);
    }

    #[test]
    fn identity_equality() {
        let a = Object::new("Object");
        let b = Object::new("Object");
        assert_eq!(Value::from(a.clone()), Value::from(a.clone()));
        assert_ne!(Value::from(a), Value::from(b));
    }
}
