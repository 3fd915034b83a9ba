//! Shared helpers for the integration suites.

#![allow(dead_code)]

use std::cell::Cell;
use std::rc::Rc;

use specrun::prelude::*;

/// Configuration pinned to a version and platform so results do not depend on the host.
pub fn config(version: &str) -> RunConfig {
    RunConfig::default()
        .with_target_version(version)
        .unwrap()
        .with_platform("linux")
}

pub fn run(suite: Suite, version: &str) -> Report {
    let tree = suite.build().unwrap_or_else(|e| panic!("suite failed to build: {e}"));
    Runner::new(config(version)).run(&tree)
}

/// Outcome of the example whose full description is `full`.
pub fn outcome<'r>(report: &'r Report, full: &str) -> &'r Outcome {
    &report
        .find(full)
        .unwrap_or_else(|| panic!("no example named {full:?}"))
        .outcome
}

/// A shared invocation counter for observing which bodies ran.
#[derive(Clone, Default)]
pub struct Counter(Rc<Cell<usize>>);

impl Counter {
    pub fn bump(&self) {
        self.0.set(self.0.get() + 1);
    }

    pub fn get(&self) -> usize {
        self.0.get()
    }
}
