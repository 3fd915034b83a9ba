//! Dynamic values of the language under test.
//!
//! Example bodies manipulate [`Value`]s where a dynamic language's spec files
//! would manipulate objects: literals, arrays, plain objects, doubles and the
//! results of payload operations such as regexp matches.

use std::fmt;
use std::rc::Rc;

use serde::Serialize;

use crate::double::Double;
use crate::errors::RaisedError;
use crate::object::Object;

/// Kind (class) of a value, arranged in a single-inheritance hierarchy.
///
/// # Examples
///
/// ```rust
/// use specrun::value::Kind;
/// assert!(Kind::TypeError.is_a(Kind::StandardError));
/// assert!(Kind::Integer.is_a(Kind::Numeric));
/// assert!(!Kind::String.is_a(Kind::Numeric));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Kind {
    Object,
    NilClass,
    TrueClass,
    FalseClass,
    Numeric,
    Integer,
    Float,
    String,
    Symbol,
    Array,
    MatchData,
    Double,
    Exception,
    StandardError,
    ArgumentError,
    TypeError,
    NameError,
    NoMethodError,
    RegexpError,
    RuntimeError,
}

impl Kind {
    /// Returns the direct parent kind, `None` for the root.
    pub fn superkind(self) -> Option<Kind> {
        let parent = match self {
            Kind::Object => return None,
            Kind::Integer | Kind::Float => Kind::Numeric,
            Kind::StandardError => Kind::Exception,
            Kind::ArgumentError
            | Kind::TypeError
            | Kind::NameError
            | Kind::RegexpError
            | Kind::RuntimeError => Kind::StandardError,
            Kind::NoMethodError => Kind::NameError,
            _ => Kind::Object,
        };
        Some(parent)
    }

    /// True when `self` is `other` or descends from it.
    pub fn is_a(self, other: Kind) -> bool {
        let mut current = Some(self);
        while let Some(kind) = current {
            if kind == other {
                return true;
            }
            current = kind.superkind();
        }
        false
    }

    pub fn name(self) -> &'static str {
        match self {
            Kind::Object => "Object",
            Kind::NilClass => "NilClass",
            Kind::TrueClass => "TrueClass",
            Kind::FalseClass => "FalseClass",
            Kind::Numeric => "Numeric",
            Kind::Integer => "Integer",
            Kind::Float => "Float",
            Kind::String => "String",
            Kind::Symbol => "Symbol",
            Kind::Array => "Array",
            Kind::MatchData => "MatchData",
            Kind::Double => "Double",
            Kind::Exception => "Exception",
            Kind::StandardError => "StandardError",
            Kind::ArgumentError => "ArgumentError",
            Kind::TypeError => "TypeError",
            Kind::NameError => "NameError",
            Kind::NoMethodError => "NoMethodError",
            Kind::RegexpError => "RegexpError",
            Kind::RuntimeError => "RuntimeError",
        }
    }

    /// Members every value of this kind answers to, excluding user-defined ones.
    fn builtin_members(self) -> &'static [&'static str] {
        match self {
            Kind::NilClass => &["to_a", "to_s", "inspect", "nil?"],
            Kind::Integer | Kind::Float | Kind::Numeric => {
                &["+", "-", "*", "/", "to_i", "to_f", "to_s", "inspect"]
            }
            Kind::String => &["to_s", "to_str", "length", "=~", "[]", "inspect"],
            Kind::Symbol => &["to_s", "to_sym", "to_proc", "inspect"],
            Kind::Array => &["to_a", "to_ary", "[]", "length", "size", "first", "last", "inspect"],
            Kind::MatchData => &["[]", "to_a", "captures", "begin", "pre_match", "post_match"],
            Kind::TrueClass | Kind::FalseClass => &["to_s", "inspect", "&", "|"],
            kind if kind.is_a(Kind::Exception) => &["message", "backtrace", "to_s", "inspect"],
            _ => &[],
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Members answered by every object regardless of kind.
const UNIVERSAL_MEMBERS: &[&str] = &["==", "class", "inspect", "nil?", "respond_to?", "send"];

/// Captured state of a successful regexp match.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchData {
    pub subject: String,
    /// Character offset of the whole match within `subject`.
    pub begin: usize,
    /// Group 0 is the whole match; unmatched optional groups are `None`.
    pub groups: Vec<Option<String>>,
}

impl MatchData {
    pub fn group(&self, index: usize) -> Value {
        match self.groups.get(index) {
            Some(Some(text)) => Value::string(text),
            _ => Value::Nil,
        }
    }
}

/// Represents a value of the language under test.
///
/// # Examples
///
/// ```rust
/// use specrun::value::Value;
/// let v = Value::from(vec![1, 2, 3]);
/// assert_eq!(v.type_name(), "Array");
/// assert!(Value::Nil.is_nil());
/// assert_eq!(Value::from(1), Value::Float(1.0));
/// ```
#[derive(Debug, Clone, Default)]
pub enum Value {
    #[default]
    Nil,
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(String),
    Symbol(String),
    Array(Vec<Value>),
    Object(Object),
    Double(Double),
    MatchData(Rc<MatchData>),
    Exception(Rc<RaisedError>),
}

impl Value {
    pub fn string(text: impl Into<String>) -> Self {
        Value::String(text.into())
    }

    pub fn symbol(name: impl Into<String>) -> Self {
        Value::Symbol(name.into())
    }

    pub fn exception(error: RaisedError) -> Self {
        Value::Exception(Rc::new(error))
    }

    pub fn kind(&self) -> Kind {
        match self {
            Value::Nil => Kind::NilClass,
            Value::Bool(true) => Kind::TrueClass,
            Value::Bool(false) => Kind::FalseClass,
            Value::Integer(_) => Kind::Integer,
            Value::Float(_) => Kind::Float,
            Value::String(_) => Kind::String,
            Value::Symbol(_) => Kind::Symbol,
            Value::Array(_) => Kind::Array,
            Value::Object(_) => Kind::Object,
            Value::Double(_) => Kind::Double,
            Value::MatchData(_) => Kind::MatchData,
            Value::Exception(error) => error.kind,
        }
    }

    /// Class name as the language under test would print it.
    pub fn type_name(&self) -> String {
        match self {
            Value::Object(object) => object.class_name().to_string(),
            other => other.kind().name().to_string(),
        }
    }

    pub fn is_nil(&self) -> bool {
        matches!(self, Value::Nil)
    }

    /// Everything except `nil` and `false` is truthy.
    pub fn is_truthy(&self) -> bool {
        !matches!(self, Value::Nil | Value::Bool(false))
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(text) => Some(text),
            _ => None,
        }
    }

    /// Capability query: does this value expose a callable member `name`?
    pub fn responds_to(&self, name: &str) -> bool {
        match self {
            Value::Double(double) => {
                double.responds_to(name) || UNIVERSAL_MEMBERS.contains(&name)
            }
            Value::Object(object) => {
                object.responds_to(name) || UNIVERSAL_MEMBERS.contains(&name)
            }
            other => {
                UNIVERSAL_MEMBERS.contains(&name) || other.kind().builtin_members().contains(&name)
            }
        }
    }

    /// Sends `name` to the value.
    ///
    /// Doubles and plain objects dispatch to their programmed or defined
    /// methods; built-in values answer the handful of members the harness and
    /// its fixtures rely on. Anything else raises `NoMethodError`.
    pub fn call(&self, name: &str, args: &[Value]) -> Result<Value, RaisedError> {
        match (self, name) {
            (Value::Double(double), _) if double.responds_to(name) => double.invoke(name, args),
            (Value::Object(object), _) if object.responds_to(name) => object.invoke(name, args),
            (_, "inspect") => Ok(Value::string(self.to_string())),
            (_, "class") => Ok(Value::string(self.type_name())),
            (_, "nil?") => Ok(Value::Bool(self.is_nil())),
            (_, "respond_to?") => match args.first() {
                Some(Value::Symbol(member)) | Some(Value::String(member)) => {
                    Ok(Value::Bool(self.responds_to(member)))
                }
                _ => Err(RaisedError::new(
                    Kind::ArgumentError,
                    "respond_to? expects a member name",
                )),
            },
            (Value::Nil, "to_a") => Ok(Value::Array(Vec::new())),
            (Value::Array(items), "to_a" | "to_ary") => Ok(Value::Array(items.clone())),
            (Value::Array(items), "length" | "size") => Ok(Value::Integer(items.len() as i64)),
            (Value::Array(items), "[]") => Ok(index_into(items, args)),
            (Value::MatchData(data), "[]") => match args.first() {
                Some(Value::Integer(index)) if *index >= 0 => Ok(data.group(*index as usize)),
                _ => Ok(Value::Nil),
            },
            (Value::MatchData(data), "to_a") => Ok(Value::Array(
                (0..data.groups.len()).map(|i| data.group(i)).collect(),
            )),
            (Value::String(text), "to_s" | "to_str") => Ok(Value::string(text.clone())),
            (Value::Exception(error), "message" | "to_s") => Ok(Value::string(&error.message)),
            (Value::Symbol(name), "to_s") => Ok(Value::string(name.clone())),
            _ => Err(RaisedError::no_method(name, self)),
        }
    }
}

fn index_into(items: &[Value], args: &[Value]) -> Value {
    let Some(Value::Integer(index)) = args.first() else {
        return Value::Nil;
    };
    let len = items.len() as i64;
    let resolved = if *index < 0 { len + index } else { *index };
    if resolved < 0 {
        return Value::Nil;
    }
    items.get(resolved as usize).cloned().unwrap_or(Value::Nil)
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Nil, Value::Nil) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Integer(a), Value::Integer(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Integer(a), Value::Float(b)) | (Value::Float(b), Value::Integer(a)) => {
                (*a as f64) == *b
            }
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Symbol(a), Value::Symbol(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => a == b,
            (Value::Object(a), Value::Object(b)) => a.same_identity(b),
            (Value::Double(a), Value::Double(b)) => a.same_identity(b),
            (Value::MatchData(a), Value::MatchData(b)) => a == b,
            (Value::Exception(a), Value::Exception(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    /// Renders the value the way `inspect` would.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Nil => f.write_str("nil"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Integer(n) => write!(f, "{n}"),
            Value::Float(n) => write!(f, "{n:?}"),
            Value::String(s) => write!(f, "{s:?}"),
            Value::Symbol(s) => write!(f, ":{s}"),
            Value::Array(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
            Value::Object(object) => write!(f, "#<{}>", object.class_name()),
            Value::Double(double) => write!(f, "#<Double {:?}>", double.label()),
            Value::MatchData(data) => match data.groups.first() {
                Some(Some(text)) => write!(f, "#<MatchData {text:?}>"),
                _ => f.write_str("#<MatchData>"),
            },
            Value::Exception(error) => write!(f, "#<{}: {}>", error.kind, error.message),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Integer(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Integer(n.into())
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Float(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<Object> for Value {
    fn from(object: Object) -> Self {
        Value::Object(object)
    }
}

impl From<Double> for Value {
    fn from(double: Double) -> Self {
        Value::Double(double)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::Array(items.into_iter().map(Into::into).collect())
    }
}
