mod common;

use common::{outcome, run, Counter};
use specrun::errors::ErrorCause;
use specrun::prelude::*;

#[test]
fn failing_equality_names_the_differing_index() {
    let mut suite = Suite::new();
    suite.describe("Array", |d| {
        d.it("compares element-wise", |_| {
            equals(&Value::from(vec![1, 2, 3, 4]), &Value::from(vec![1, 2, 3, 5])).check()?;
            Ok(())
        });
    });
    let report = run(suite, "1.9.3");
    match outcome(&report, "Array compares element-wise") {
        Outcome::Failed(failure) => assert_eq!(
            failure.message,
            "expected [1, 2, 3, 5], got [1, 2, 3, 4] (index 3: expected 5, got 4)"
        ),
        other => panic!("expected a failure, got {other:?}"),
    }
    assert_eq!(report.exit_code(), 1);
}

#[test]
fn guard_excluded_bodies_never_run() {
    let calls = Counter::default();
    let hook_calls = Counter::default();
    let mut suite = Suite::new();
    let (body, hook) = (calls.clone(), hook_calls.clone());
    suite.describe("Guarded", move |d| {
        d.version_is("...1.9", move |d| {
            d.before_each(move |_| {
                hook.bump();
                Ok(())
            });
            d.it("only on old versions", move |_| {
                body.bump();
                Ok(())
            });
        });
    });

    let report = run(suite, "1.9.3");
    assert_eq!(calls.get(), 0);
    assert_eq!(hook_calls.get(), 0);
    assert_eq!(
        outcome(&report, "Guarded only on old versions"),
        &Outcome::NotRun(SkipReason::Guard("version ...1.9".to_string()))
    );
    assert_eq!(report.exit_code(), 0);
}

#[test]
fn nested_guards_are_conjunctive() {
    let mut suite = Suite::new();
    suite.describe("Outer", |d| {
        d.platform_is(&["linux"], |d| {
            d.version_is("2.0", |d| d.it("needs both", |_| Ok(())));
            d.it("needs linux", |_| Ok(()));
        });
        d.platform_is_not(&["linux"], |d| d.it("never on linux", |_| Ok(())));
    });
    let report = run(suite, "1.9.3");
    assert!(matches!(outcome(&report, "Outer needs both"), Outcome::NotRun(_)));
    assert_eq!(outcome(&report, "Outer needs linux"), &Outcome::Passed);
    assert!(matches!(outcome(&report, "Outer never on linux"), Outcome::NotRun(_)));
}

#[test]
fn examples_do_not_share_state() {
    let mut suite = Suite::new();
    suite.describe("Isolation", |d| {
        d.it("writes a fixture", |ex| {
            ex.set("seen", true);
            ex.set_last_line("leftover");
            Ok(())
        });
        d.it("cannot see it", |ex| {
            let missing = ex.get("seen");
            equals(&Value::from(missing.is_err()), &Value::from(true)).check()?;
            is_nil(ex.last_line()).check()?;
            Ok(())
        });
    });
    let report = run(suite, "1.9.3");
    assert_eq!(report.totals().passed, 2);
}

#[test]
fn unmet_double_expectation_fails_a_passing_body() {
    let mut suite = Suite::new();
    suite.describe("Doubles", |d| {
        d.it("forgets to call to_a", |ex| {
            let obj = ex.create_double("pseudo-array");
            obj.should_receive("to_a").and_return(vec![1]);
            Ok(())
        });
    });
    let report = run(suite, "1.9.3");
    match outcome(&report, "Doubles forgets to call to_a") {
        Outcome::Failed(failure) => assert_eq!(
            failure.message,
            "Double \"pseudo-array\" expected to receive :to_a exactly once, received it 0 times"
        ),
        other => panic!("expected a failure, got {other:?}"),
    }
}

#[test]
fn raised_errors_and_panics_are_errored() {
    let after = Counter::default();
    let seen = after.clone();
    let mut suite = Suite::new();
    suite.describe("Errors", move |d| {
        d.after_each(move |_| {
            seen.bump();
            Ok(())
        });
        d.it("raises", |_| Err(RaisedError::type_error("no implicit conversion").into()));
        d.it("panics", |_| panic!("boom"));
        d.it("fails", |_| {
            is_true(&Value::Bool(false)).check()?;
            Ok(())
        });
    });
    let report = run(suite, "1.9.3");
    assert_eq!(after.get(), 3);
    let totals = report.totals();
    assert_eq!((totals.errored, totals.failed, totals.passed), (2, 1, 0));
}

#[test]
fn should_not_raise_lets_other_errors_through() {
    let mut suite = Suite::new();
    suite.describe("Negated raises", |d| {
        d.it("sees an unrelated error", |_| {
            raises(|| Err(RaisedError::new(Kind::ArgumentError, "boom")), Kind::TypeError)
                .negate()
                .check()?;
            Ok(())
        });
        d.it("passes when nothing is raised", |_| {
            raises(|| Ok(Value::Nil), Kind::TypeError).negate().check()?;
            Ok(())
        });
    });
    let report = run(suite, "1.9.3");
    match outcome(&report, "Negated raises sees an unrelated error") {
        Outcome::Errored(ErrorCause::Raised(error)) => {
            assert_eq!(error.kind, Kind::ArgumentError);
            assert_eq!(error.message, "boom");
        }
        other => panic!("expected the error to propagate, got {other:?}"),
    }
    assert_eq!(
        outcome(&report, "Negated raises passes when nothing is raised"),
        &Outcome::Passed
    );
}

#[test]
fn filter_skips_without_running() {
    let calls = Counter::default();
    let body = calls.clone();
    let mut suite = Suite::new();
    suite.describe("Filter", move |d| {
        d.it("keeps this one", |_| Ok(()));
        d.it("drops that one", move |_| {
            body.bump();
            Ok(())
        });
    });
    let tree = suite.build().unwrap();
    let config = common::config("1.9.3").with_filter("keeps");
    let report = Runner::new(config).run(&tree);
    assert_eq!(calls.get(), 0);
    assert_eq!(outcome(&report, "Filter keeps this one"), &Outcome::Passed);
    assert_eq!(
        outcome(&report, "Filter drops that one"),
        &Outcome::NotRun(SkipReason::Filtered)
    );
}

#[test]
fn repeated_runs_are_deterministic() {
    let build = || {
        let mut suite = Suite::new();
        specrun::corpus::splat::declare(&mut suite);
        specrun::corpus::regexp::declare(&mut suite);
        suite.build().unwrap()
    };
    let runner = Runner::new(common::config("1.9.3"));
    let first = runner.run(&build());
    let second = runner.run(&build());
    assert_eq!(first.entries(), second.entries());
    assert_eq!(first.to_json().unwrap(), second.to_json().unwrap());
}

#[test]
fn anonymous_examples_use_the_context_path() {
    let mut suite = Suite::new();
    suite.describe("Nameless", |d| d.specify(|_| Ok(())));
    let report = run(suite, "1.9.3");
    assert_eq!(report.entries()[0].full_description(), "Nameless");
    assert_eq!(report.entries()[0].description, None);
}
