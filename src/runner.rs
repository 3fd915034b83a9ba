//! Executes a resolved [`SpecTree`] and records one outcome per example.
//!
//! Traversal is depth-first in declaration order. A context whose guards do
//! not admit the configuration marks its whole subtree not-run without
//! invoking any body or hook. Every executed example gets a fresh
//! [`ExampleScope`]; `before_each` hooks run outermost first, `after_each`
//! hooks innermost first and always, whatever happened before them.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use tracing::{debug, info, trace};

use crate::config::RunConfig;
use crate::errors::{ErrorCause, Failure, Interrupt};
use crate::report::{Outcome, Report, ReportEntry, SkipReason};
use crate::scope::ExampleScope;
use crate::tree::{Body, Child, ContextId, Example, SpecTree};

pub struct Runner {
    config: RunConfig,
}

impl Runner {
    pub fn new(config: RunConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    pub fn run(&self, tree: &SpecTree) -> Report {
        let mut report = Report::new(
            self.config.target_version.clone(),
            self.config.platform.clone(),
        );
        for &root in tree.roots() {
            self.visit(tree, root, None, &mut report);
        }
        let totals = report.totals();
        info!(
            passed = totals.passed,
            failed = totals.failed,
            errored = totals.errored,
            skipped = totals.skipped,
            "run finished"
        );
        report
    }

    fn visit(
        &self,
        tree: &SpecTree,
        id: ContextId,
        inherited_skip: Option<&SkipReason>,
        report: &mut Report,
    ) {
        let context = tree.context(id);
        let own_skip = match inherited_skip {
            Some(_) => None,
            None => context
                .guards()
                .iter()
                .find(|guard| !guard.admits(&self.config))
                .map(|guard| {
                    debug!(guard = %guard, context = ?tree.path(id), "guard excludes context");
                    SkipReason::Guard(guard.to_string())
                }),
        };
        let skip = inherited_skip.or(own_skip.as_ref());

        for child in context.children() {
            match child {
                Child::Context(nested) => self.visit(tree, *nested, skip, report),
                Child::Example(example) => {
                    let path = tree.path(id);
                    let mut entry = ReportEntry {
                        path,
                        description: example.description.clone(),
                        outcome: Outcome::Passed,
                    };
                    entry.outcome = match skip {
                        Some(reason) => Outcome::NotRun(reason.clone()),
                        None if !self.selected(&entry) => Outcome::NotRun(SkipReason::Filtered),
                        None => self.execute(tree, id, example, &entry.full_description()),
                    };
                    report.record(entry);
                }
            }
        }
    }

    fn selected(&self, entry: &ReportEntry) -> bool {
        self.config
            .filter
            .as_deref()
            .map_or(true, |filter| entry.full_description().contains(filter))
    }

    fn execute(&self, tree: &SpecTree, id: ContextId, example: &Example, name: &str) -> Outcome {
        debug!(example = name, "running example");
        let ancestry = tree.ancestry(id);
        let shared_arg = example.shared_arg.clone().or_else(|| {
            ancestry
                .iter()
                .rev()
                .find_map(|&ctx| tree.context(ctx).shared_arg().cloned())
        });
        let mut scope = ExampleScope::new(&self.config, shared_arg);

        let befores = ancestry
            .iter()
            .flat_map(|&ctx| tree.context(ctx).before_each.iter());
        let mut outcome = Outcome::Passed;
        for hook in befores {
            if let Err(interrupted) = invoke(hook, &mut scope) {
                outcome = interrupted;
                break;
            }
        }
        if outcome.is_passed() {
            if let Err(interrupted) = invoke(&example.body, &mut scope) {
                outcome = interrupted;
            }
        }

        let afters = ancestry
            .iter()
            .rev()
            .flat_map(|&ctx| tree.context(ctx).after_each.iter());
        for hook in afters {
            // The first problem wins; later hooks still run.
            if let Err(interrupted) = invoke(hook, &mut scope) {
                if outcome.is_passed() {
                    outcome = interrupted;
                }
            }
        }

        if outcome.is_passed() {
            let unmet = scope.verify_doubles();
            if !unmet.is_empty() {
                let messages: Vec<String> = unmet.iter().map(ToString::to_string).collect();
                outcome = Outcome::Failed(Failure::new(messages.join("\n")));
            }
        }
        trace!(example = name, outcome = outcome.label(), "example finished");
        outcome
    }
}

/// Runs a body or hook, converting interrupts and panics into outcomes.
fn invoke(body: &Body, scope: &mut ExampleScope<'_>) -> Result<(), Outcome> {
    match panic::catch_unwind(AssertUnwindSafe(|| body(scope))) {
        Ok(Ok(())) => Ok(()),
        Ok(Err(Interrupt::Failed(failure))) => Err(Outcome::Failed(failure)),
        Ok(Err(Interrupt::Raised(error))) => Err(Outcome::Errored(ErrorCause::Raised(error))),
        Err(payload) => Err(Outcome::Errored(ErrorCause::Panic {
            message: panic_message(payload.as_ref()),
        })),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
