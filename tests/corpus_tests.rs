mod common;

use common::{config, outcome};
use specrun::corpus;
use specrun::prelude::*;

fn run_corpus(version: &str) -> Report {
    let tree = corpus::load(None).unwrap().build().unwrap();
    Runner::new(config(version)).run(&tree)
}

#[test]
fn corpus_passes_on_1_9_3() {
    let report = run_corpus("1.9.3");
    assert!(!report.has_failures(), "{}", report.to_json().unwrap());
    assert_eq!(
        outcome(&report, "Regexp#match raises TypeError when the given argument is an Exception"),
        &Outcome::Passed
    );
    assert!(matches!(
        outcome(&report, "Regexp#match coerces Exceptions into strings"),
        Outcome::NotRun(SkipReason::Guard(_))
    ));
}

#[test]
fn corpus_passes_on_1_8_7() {
    let report = run_corpus("1.8.7");
    assert!(!report.has_failures(), "{}", report.to_json().unwrap());
    assert_eq!(
        outcome(&report, "Regexp#match coerces Exceptions into strings"),
        &Outcome::Passed
    );
    assert!(matches!(
        outcome(&report, "Regexp#match raises TypeError when the given argument is an Exception"),
        Outcome::NotRun(SkipReason::Guard(_))
    ));
}

#[test]
fn shared_regexp_examples_run_once_per_inclusion() {
    let report = run_corpus("1.9.3");
    for host in ["Regexp#=~", "Regexp#match"] {
        for example in ["returns nil if there is no match", "returns nil if the object is nil"] {
            assert_eq!(outcome(&report, &format!("{host} {example}")), &Outcome::Passed);
        }
    }
    let totals = report.totals();
    assert_eq!(totals.total(), 15);
    assert_eq!((totals.passed, totals.skipped), (14, 1));
}

#[test]
fn splat_coerces_through_to_a() {
    let tree = corpus::load(Some("splat")).unwrap().build().unwrap();
    let report = Runner::new(config("1.9.3")).run(&tree);
    assert_eq!(report.totals().passed, 4);
    assert_eq!(
        outcome(
            &report,
            "The unpacking splat operator (*) when applied to a non-Array value attempts to coerce it to Array if the object respond_to?(:to_a)"
        ),
        &Outcome::Passed
    );
}
