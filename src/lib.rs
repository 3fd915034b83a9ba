//! specrun: a behaviour-driven specification harness.
//!
//! Suites are declared with nested `describe` contexts, `it` examples, shared
//! example groups, version and platform guards and programmable doubles, then
//! resolved into a [`tree::SpecTree`] and executed by a [`runner::Runner`].

pub use crate::errors::{ExampleResult, Failure, RaisedError, StructuralError};

pub mod cli;
pub mod config;
pub mod corpus;
pub mod double;
pub mod errors;
pub mod guard;
pub mod matchers;
pub mod object;
pub mod report;
mod resolve;
pub mod runner;
pub mod scope;
pub mod tree;
pub mod value;

/// Everything a spec file needs in scope.
pub mod prelude {
    pub use crate::config::RunConfig;
    pub use crate::double::{CallCount, Double, Response};
    pub use crate::errors::{ExampleResult, Failure, Interrupt, RaisedError, StructuralError};
    pub use crate::guard::{Guard, Version, VersionRange};
    pub use crate::matchers::{
        equals, is_false, is_kind_of, is_nil, is_true, raises, responds_to, Verdict,
    };
    pub use crate::object::Object;
    pub use crate::report::{Outcome, Report, SkipReason};
    pub use crate::runner::Runner;
    pub use crate::scope::ExampleScope;
    pub use crate::tree::{ContextBuilder, SpecTree, Suite};
    pub use crate::value::{Kind, Value};
}
