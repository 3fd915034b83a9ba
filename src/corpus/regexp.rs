//! A small regexp object over the `regex` crate, and its specs.
//!
//! Matching updates the example's last-match state (`$~`); unary matching
//! reads the last line (`$_`). How non-string subjects are coerced depends on
//! the target version: before 1.9 exceptions match against their message.

use std::fmt;
use std::rc::Rc;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::errors::RaisedError;
use crate::guard::Version;
use crate::matchers::{equals, is_kind_of, is_nil, raises};
use crate::scope::ExampleScope;
use crate::tree::Suite;
use crate::value::{Kind, MatchData, Value};

/// First version whose `Regexp#match` refuses exceptions.
static STRICT_COERCION: Lazy<Version> = Lazy::new(|| Version::new(vec![1, 9]));

#[derive(Debug, Clone)]
pub struct Regexp {
    source: String,
    regex: Regex,
}

impl Regexp {
    pub fn new(source: &str) -> Result<Self, RaisedError> {
        let regex = Regex::new(source)
            .map_err(|e| RaisedError::new(Kind::RegexpError, e.to_string()))?;
        Ok(Self {
            source: source.to_string(),
            regex,
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// `Regexp#match`: match data or nil, recorded as the last match.
    pub fn match_in(&self, scope: &mut ExampleScope<'_>, subject: &Value) -> Result<Value, RaisedError> {
        if subject.is_nil() {
            scope.set_last_match(Value::Nil);
            return Ok(Value::Nil);
        }
        let text = coerce_subject(subject, scope.target_version())?;
        let result = match self.regex.captures(&text) {
            Some(captures) => {
                let whole = captures.get(0).map_or(0, |m| m.start());
                Value::MatchData(Rc::new(MatchData {
                    begin: text[..whole].chars().count(),
                    groups: captures
                        .iter()
                        .map(|group| group.map(|m| m.as_str().to_string()))
                        .collect(),
                    subject: text.clone(),
                }))
            }
            None => Value::Nil,
        };
        scope.set_last_match(result.clone());
        Ok(result)
    }

    /// `Regexp#=~`: character index of the match, or nil.
    pub fn match_index(&self, scope: &mut ExampleScope<'_>, subject: &Value) -> Result<Value, RaisedError> {
        Ok(match self.match_in(scope, subject)? {
            Value::MatchData(data) => Value::Integer(data.begin as i64),
            _ => Value::Nil,
        })
    }

    /// `Regexp#~`: matches against the last line; nil when it is not a string.
    pub fn match_last_line(&self, scope: &mut ExampleScope<'_>) -> Result<Value, RaisedError> {
        let line = scope.last_line().clone();
        if line.as_str().is_none() {
            scope.set_last_match(Value::Nil);
            return Ok(Value::Nil);
        }
        self.match_index(scope, &line)
    }

    /// Dynamic dispatch by method name.
    pub fn send(&self, scope: &mut ExampleScope<'_>, method: &str, args: &[Value]) -> Result<Value, RaisedError> {
        match (method, args) {
            ("match", [subject]) => self.match_in(scope, subject),
            ("=~", [subject]) => self.match_index(scope, subject),
            ("~", []) => self.match_last_line(scope),
            ("match" | "=~" | "~", _) => Err(RaisedError::new(
                Kind::ArgumentError,
                format!("wrong number of arguments ({}) for {method}", args.len()),
            )),
            _ => Err(RaisedError::new(
                Kind::NoMethodError,
                format!("undefined method `{method}' for {self}"),
            )),
        }
    }
}

impl fmt::Display for Regexp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/{}/", self.source)
    }
}

fn coerce_subject(subject: &Value, version: &Version) -> Result<String, RaisedError> {
    match subject {
        Value::String(text) | Value::Symbol(text) => Ok(text.clone()),
        Value::Exception(error) if *version < *STRICT_COERCION => Ok(error.message.clone()),
        other if other.responds_to("to_str") => match other.call("to_str", &[])? {
            Value::String(text) => Ok(text),
            converted => Err(RaisedError::type_error(format!(
                "can't convert {} to String ({}#to_str gives {})",
                other.type_name(),
                other.type_name(),
                converted.type_name()
            ))),
        },
        other => Err(RaisedError::type_error(format!(
            "can't convert {} into String",
            other.type_name()
        ))),
    }
}

/// Name of the method a `regexp_match` inclusion is exercising.
fn method_under_test(scope: &ExampleScope<'_>) -> Result<String, RaisedError> {
    match scope.require_shared_arg()? {
        Value::Symbol(name) | Value::String(name) => Ok(name),
        other => Err(RaisedError::new(
            Kind::ArgumentError,
            format!("expected a method name, got {other}"),
        )),
    }
}

pub fn declare(suite: &mut Suite) {
    suite.shared_examples("regexp_match", |g| {
        g.it("returns nil if there is no match", |ex| {
            let method = method_under_test(ex)?;
            let result = Regexp::new("xyz")?.send(ex, &method, &[Value::from("abxyc")])?;
            is_nil(&result).check()?;
            Ok(())
        });

        g.it("returns nil if the object is nil", |ex| {
            let method = method_under_test(ex)?;
            let result = Regexp::new(r"\w+")?.send(ex, &method, &[Value::Nil])?;
            is_nil(&result).check()?;
            Ok(())
        });
    });

    suite.describe("Regexp#=~", |d| {
        d.it_behaves_like_with("regexp_match", Value::symbol("=~"));

        d.it("returns the index of the first character of the matching region", |ex| {
            let index = Regexp::new("(.)(.)(.)")?.match_index(ex, &Value::from("abc"))?;
            equals(&index, &Value::from(0)).check()?;
            Ok(())
        });
    });

    suite.describe("Regexp#match", |d| {
        d.it_behaves_like_with("regexp_match", Value::symbol("match"));

        d.it("returns a MatchData object", |ex| {
            let data = Regexp::new("(.)(.)(.)")?.match_in(ex, &Value::from("abc"))?;
            is_kind_of(&data, Kind::MatchData).check()?;
            Ok(())
        });

        d.it("resets $~ if passed nil", |ex| {
            Regexp::new(".")?.match_in(ex, &Value::from("a"))?;
            is_kind_of(ex.last_match(), Kind::MatchData).check()?;

            Regexp::new("1")?.match_in(ex, &Value::Nil)?;
            is_nil(ex.last_match()).check()?;
            Ok(())
        });

        d.it("raises TypeError when the given argument cannot be coarce to String", |ex| {
            let re = Regexp::new("foo")?;
            let f = Value::from(1);
            raises(|| re.match_in(ex, &f)?.call("[]", &[Value::from(0)]), Kind::TypeError).check()?;
            Ok(())
        });

        d.version_is("...1.9", |d| {
            d.it("coerces Exceptions into strings", |ex| {
                let f = Value::exception(RaisedError::new(Kind::Exception, "foo"));
                let matched = Regexp::new("foo")?.match_in(ex, &f)?.call("[]", &[Value::from(0)])?;
                equals(&matched, &Value::from("foo")).check()?;
                Ok(())
            });
        });

        d.version_is("1.9", |d| {
            d.it("raises TypeError when the given argument is an Exception", |ex| {
                let re = Regexp::new("foo")?;
                let f = Value::exception(RaisedError::new(Kind::Exception, "foo"));
                raises(|| re.match_in(ex, &f)?.call("[]", &[Value::from(0)]), Kind::TypeError)
                    .check()?;
                Ok(())
            });
        });
    });

    suite.describe("Regexp#~", |d| {
        d.it("matches against the contents of $_", |ex| {
            ex.set_last_line("input data");
            let index = Regexp::new("at")?.match_last_line(ex)?;
            equals(&index, &Value::from(7)).check()?;
            Ok(())
        });
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RunConfig;

    fn scope_for(config: &RunConfig) -> ExampleScope<'_> {
        ExampleScope::new(config, None)
    }

    #[test]
    fn match_index_counts_characters() {
        let config = RunConfig::default();
        let mut scope = scope_for(&config);
        let re = Regexp::new("é").unwrap();
        assert_eq!(re.match_index(&mut scope, &Value::from("caf\u{e9}")).unwrap(), Value::from(3));
    }

    #[test]
    fn failed_match_clears_last_match() {
        let config = RunConfig::default();
        let mut scope = scope_for(&config);
        let re = Regexp::new("a").unwrap();
        re.match_in(&mut scope, &Value::from("a")).unwrap();
        assert!(!scope.last_match().is_nil());
        re.match_in(&mut scope, &Value::from("b")).unwrap();
        assert!(scope.last_match().is_nil());
    }

    #[test]
    fn exception_coercion_depends_on_version() {
        let exception = Value::exception(RaisedError::new(Kind::Exception, "foo"));
        let re = Regexp::new("foo").unwrap();

        let old = RunConfig::default().with_target_version("1.8.7").unwrap();
        let mut scope = scope_for(&old);
        assert!(matches!(re.match_in(&mut scope, &exception), Ok(Value::MatchData(_))));

        let new = RunConfig::default().with_target_version("1.9.3").unwrap();
        let mut scope = scope_for(&new);
        let err = re.match_in(&mut scope, &exception).unwrap_err();
        assert_eq!(err.message, "can't convert Exception into String");
    }

    #[test]
    fn strings_and_symbols_match_directly() {
        let config = RunConfig::default();
        let mut scope = scope_for(&config);
        let re = Regexp::new("b").unwrap();
        assert_eq!(re.send(&mut scope, "=~", &[Value::symbol("ab")]).unwrap(), Value::from(1));
        assert!(re.send(&mut scope, "=~", &[]).is_err());
        assert_eq!(
            re.send(&mut scope, "gsub", &[]).unwrap_err().kind,
            Kind::NoMethodError
        );
    }

    #[test]
    fn invalid_pattern_is_a_regexp_error() {
        assert_eq!(Regexp::new("(").unwrap_err().kind, Kind::RegexpError);
    }
}
