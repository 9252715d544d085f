//! Panic-expectation matching: kind checks, refinements, and the
//! no-panic/wrong-kind failure shapes.

use pretty_assertions::assert_eq;
use specnest::{FailureCause, Outcome, Spec};
use std::panic::panic_any;

#[derive(Debug)]
struct ArithmeticError {
    message: String,
}

#[test]
fn matching_kind_with_satisfied_refinement_passes() {
    let spec = Spec::build("math", |ctx| {
        ctx.should_panic::<ArithmeticError>("on overflow", || {
            panic_any(ArithmeticError {
                message: "integer overflow".to_string(),
            });
        })
        .matching("mentions overflow", |e| e.message.contains("overflow"));
    })
    .unwrap();

    let report = spec.run();
    assert_eq!(report.results[0].outcome, Outcome::Passed);
    assert_eq!(
        report.results[0].path,
        "math > should panic with ArithmeticError on overflow"
    );
}

#[test]
fn failed_refinement_reports_the_predicate_description() {
    let spec = Spec::build("math", |ctx| {
        ctx.should_panic::<ArithmeticError>("on overflow", || {
            panic_any(ArithmeticError {
                message: "division by zero".to_string(),
            });
        })
        .matching("mentions overflow", |e| e.message.contains("overflow"));
    })
    .unwrap();

    let report = spec.run();
    assert_eq!(
        report.results[0].outcome,
        Outcome::Failed(FailureCause::RefinementMismatch(
            "mentions overflow".to_string()
        ))
    );
}

#[test]
fn wrong_kind_records_expected_and_actual() {
    let spec = Spec::build("math", |ctx| {
        ctx.should_panic::<ArithmeticError>("on overflow", || {
            panic!("something unrelated");
        });
    })
    .unwrap();

    let report = spec.run();
    assert_eq!(
        report.results[0].outcome,
        Outcome::Failed(FailureCause::WrongPanicKind {
            expected: "ArithmeticError".to_string(),
            actual: "something unrelated".to_string(),
        })
    );
}

#[test]
fn generic_payload_kinds_keep_their_parameters_in_the_label() {
    let spec = Spec::build("parser", |ctx| {
        ctx.should_panic::<Vec<String>>("on accumulated errors", || {
            panic_any(vec!["first error".to_string()]);
        })
        .matching("is non-empty", |errors| !errors.is_empty());
    })
    .unwrap();

    let report = spec.run();
    assert_eq!(report.results[0].outcome, Outcome::Passed);
    assert_eq!(
        report.results[0].path,
        "parser > should panic with Vec<String> on accumulated errors"
    );
}

#[test]
fn missing_panic_fails_the_expectation() {
    let spec = Spec::build("math", |ctx| {
        ctx.should_panic::<ArithmeticError>("on overflow", || {});
    })
    .unwrap();

    let report = spec.run();
    assert_eq!(
        report.results[0].outcome,
        Outcome::Failed(FailureCause::ExpectedPanicMissing {
            expected: "ArithmeticError".to_string(),
        })
    );
}

#[test]
fn refinements_are_checked_in_declaration_order() {
    let spec = Spec::build("math", |ctx| {
        ctx.should_panic::<String>("with a detailed message", || {
            panic_any("short".to_string());
        })
        .matching("is not empty", |m| !m.is_empty())
        .matching("is long enough", |m| m.len() > 10);
    })
    .unwrap();

    let report = spec.run();
    assert_eq!(
        report.results[0].outcome,
        Outcome::Failed(FailureCause::RefinementMismatch(
            "is long enough".to_string()
        ))
    );
}

#[test]
fn unexpected_panic_without_expectation_fails_with_the_message() {
    let spec = Spec::build("math", |ctx| {
        ctx.should("not panic", || panic!("boom"));
    })
    .unwrap();

    let report = spec.run();
    assert_eq!(
        report.results[0].outcome,
        Outcome::Failed(FailureCause::Panicked("boom".to_string()))
    );
}

#[test]
fn ignored_panic_expectations_never_run() {
    let spec = Spec::build("math", |ctx| {
        ctx.xshould_panic::<ArithmeticError>("on overflow", || {
            unreachable!("ignored body must not run");
        });
        ctx.should("keep the group alive", || {});
    })
    .unwrap();

    let report = spec.run();
    assert_eq!(report.skipped(), 1);
    assert_eq!(report.passed(), 1);
}
