//! Bundled fixture suites.
//!
//! Each suite is a plain declaration function over a [`Suite`]; the CLI runs
//! them by name. The payload code they exercise (array literals with splats,
//! a regexp wrapper) lives next to the declarations.

use crate::errors::ConfigError;
use crate::tree::Suite;

pub mod regexp;
pub mod splat;

/// A named, bundled suite.
pub struct SuiteDef {
    pub name: &'static str,
    pub summary: &'static str,
    pub declare: fn(&mut Suite),
}

pub const SUITES: &[SuiteDef] = &[
    SuiteDef {
        name: "splat",
        summary: "the unpacking splat operator inside array literals",
        declare: splat::declare,
    },
    SuiteDef {
        name: "regexp",
        summary: "Regexp#=~, Regexp#match and Regexp#~",
        declare: regexp::declare,
    },
];

pub fn find(name: &str) -> Option<&'static SuiteDef> {
    SUITES.iter().find(|def| def.name == name)
}

/// Declarations of the named suite, or of every bundled suite when `name` is `None`.
pub fn load(name: Option<&str>) -> Result<Suite, ConfigError> {
    let mut suite = Suite::new();
    match name {
        Some(name) => {
            let def = find(name).ok_or_else(|| ConfigError::UnknownSuite(name.to_string()))?;
            (def.declare)(&mut suite);
        }
        None => SUITES.iter().for_each(|def| (def.declare)(&mut suite)),
    }
    Ok(suite)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_suites_are_config_errors() {
        assert!(matches!(load(Some("nope")), Err(ConfigError::UnknownSuite(_))));
    }

    #[test]
    fn every_suite_builds() {
        for def in SUITES {
            let mut suite = Suite::new();
            (def.declare)(&mut suite);
            assert!(suite.build().is_ok(), "suite {} failed to build", def.name);
        }
    }
}
