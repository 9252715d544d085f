//! Plan execution — runs composed hooks and test bodies, matches panic
//! expectations, and collects structured results for the host runner.
//!
//! Execution is single-threaded and sequential: build, plan, and run are
//! strictly separate phases, and the engine guarantees only the ordering
//! of hook and body invocations, not isolation of caller-owned fixtures.

use crate::plan::{ExecutableGroup, PlannedCase, TestPlan};
use crate::resolve::SkipReason;
use crate::tree::{ExpectationCheck, Hook, TestCase};
use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};
use thiserror::Error;

// ============================================================================
// Outcomes
// ============================================================================

/// Why a test case failed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FailureCause {
    /// The body panicked and no panic was expected.
    #[error("test body panicked: {0}")]
    Panicked(String),
    /// A panic was expected but the body completed normally.
    #[error("expected a panic with {expected}, but none was raised")]
    ExpectedPanicMissing { expected: String },
    /// The body panicked with a payload of the wrong kind.
    #[error("wrong panic kind: expected {expected}, got: {actual}")]
    WrongPanicKind { expected: String, actual: String },
    /// The payload kind matched but a refinement predicate failed.
    #[error("panic refinement failed: {0}")]
    RefinementMismatch(String),
    /// A fixture hook of an enclosing group failed.
    #[error("group fixture failed: {0}")]
    Fixture(String),
}

/// The resolved outcome of one planned test case.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Passed,
    Failed(FailureCause),
    Skipped(SkipReason),
}

/// Result of one planned test case, under its full description path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaseResult {
    /// `"spec > group > should ..."` chain for reporting.
    pub path: String,
    pub outcome: Outcome,
    /// A panicking `after_each` hook is recorded here; it never overwrites
    /// the primary outcome.
    pub teardown_failure: Option<String>,
}

/// Which once-hook of a group failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FixturePhase {
    BeforeAll,
    AfterAll,
}

/// A fatal once-hook failure, reported at group level rather than attached
/// to any individual test case.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupFailure {
    pub path: String,
    pub phase: FixturePhase,
    pub message: String,
}

/// Structured results of running one spec's plan, for the host to report
/// through its own mechanism.
#[derive(Debug)]
pub struct RunReport {
    pub spec_name: String,
    pub focus_mode: bool,
    pub results: Vec<CaseResult>,
    pub group_failures: Vec<GroupFailure>,
}

impl RunReport {
    pub fn passed(&self) -> usize {
        self.count(|outcome| matches!(outcome, Outcome::Passed))
    }

    pub fn failed(&self) -> usize {
        self.count(|outcome| matches!(outcome, Outcome::Failed(_)))
    }

    pub fn skipped(&self) -> usize {
        self.count(|outcome| matches!(outcome, Outcome::Skipped(_)))
    }

    /// True iff no case failed and no group fixture failed.
    pub fn success(&self) -> bool {
        self.failed() == 0 && self.group_failures.is_empty()
    }

    fn count(&self, matcher: impl Fn(&Outcome) -> bool) -> usize {
        self.results
            .iter()
            .filter(|result| matcher(&result.outcome))
            .count()
    }
}

// ============================================================================
// Runner
// ============================================================================

impl TestPlan<'_> {
    /// Execute the plan depth-first and collect results. One failing test
    /// or fixture never terminates the run; a failing `before_all` aborts
    /// only its own group's subtree.
    pub fn run(&self) -> RunReport {
        let mut report = RunReport {
            spec_name: self.spec_name().to_string(),
            focus_mode: self.focus_mode(),
            results: Vec::new(),
            group_failures: Vec::new(),
        };
        if let Some(root) = self.root() {
            run_group(root, &mut report);
        }
        report
    }
}

fn run_group(group: &ExecutableGroup<'_>, report: &mut RunReport) {
    if let Err(message) = run_hooks(group.before_all) {
        report.group_failures.push(GroupFailure {
            path: group.joined_path(),
            phase: FixturePhase::BeforeAll,
            message: message.clone(),
        });
        abort_subtree(group, &message, report);
        run_own_after_all(group, report);
        return;
    }

    for entry in group.entries() {
        match entry {
            PlannedCase::Runnable(case) => {
                let result = run_case(group, case);
                report.results.push(result);
            }
            PlannedCase::Skipped {
                description,
                reason,
            } => report
                .results
                .push(skipped_result(group, description, *reason)),
        }
    }

    for child in group.children() {
        run_group(child, report);
    }

    run_own_after_all(group, report);
}

/// Mark every eligible case under the group as failed by the fixture.
/// Skipped entries keep their skip reason; descendant hooks never start.
fn abort_subtree(group: &ExecutableGroup<'_>, message: &str, report: &mut RunReport) {
    for entry in group.entries() {
        match entry {
            PlannedCase::Runnable(case) => report.results.push(CaseResult {
                path: case_path(group, &case.description),
                outcome: Outcome::Failed(FailureCause::Fixture(message.to_string())),
                teardown_failure: None,
            }),
            PlannedCase::Skipped {
                description,
                reason,
            } => report
                .results
                .push(skipped_result(group, description, *reason)),
        }
    }
    for child in group.children() {
        abort_subtree(child, message, report);
    }
}

fn run_own_after_all(group: &ExecutableGroup<'_>, report: &mut RunReport) {
    if let Err(message) = run_hooks(group.after_all) {
        report.group_failures.push(GroupFailure {
            path: group.joined_path(),
            phase: FixturePhase::AfterAll,
            message,
        });
    }
}

fn run_case(group: &ExecutableGroup<'_>, case: &TestCase) -> CaseResult {
    let path = case_path(group, &case.description);

    // A failing before_each fails the case without invoking the body; the
    // teardown chain still runs.
    if let Err(message) = run_setup_chain(&group.before_each) {
        let teardown_failure = run_teardown_chain(&group.after_each).err();
        return CaseResult {
            path,
            outcome: Outcome::Failed(FailureCause::Fixture(message)),
            teardown_failure,
        };
    }

    let outcome = invoke_body(case);
    let teardown_failure = run_teardown_chain(&group.after_each).err();

    CaseResult {
        path,
        outcome,
        teardown_failure,
    }
}

fn invoke_body(case: &TestCase) -> Outcome {
    let caught = catch_unwind(AssertUnwindSafe(|| (case.body)()));
    match (&case.expectation, caught) {
        (None, Ok(())) => Outcome::Passed,
        (None, Err(payload)) => {
            Outcome::Failed(FailureCause::Panicked(panic_message(payload.as_ref())))
        }
        (Some(expectation), Ok(())) => Outcome::Failed(FailureCause::ExpectedPanicMissing {
            expected: expectation.kind.clone(),
        }),
        (Some(expectation), Err(payload)) => match expectation.evaluate(payload.as_ref()) {
            ExpectationCheck::Matched => Outcome::Passed,
            ExpectationCheck::WrongKind => Outcome::Failed(FailureCause::WrongPanicKind {
                expected: expectation.kind.clone(),
                actual: panic_message(payload.as_ref()),
            }),
            ExpectationCheck::RefinementFailed(description) => {
                Outcome::Failed(FailureCause::RefinementMismatch(description))
            }
        },
    }
}

fn run_hooks(hooks: &[Hook]) -> Result<(), String> {
    for hook in hooks {
        catch_unwind(AssertUnwindSafe(|| hook()))
            .map_err(|payload| panic_message(payload.as_ref()))?;
    }
    Ok(())
}

/// Setup stops at the first failing hook: later setup assumes earlier
/// setup succeeded.
fn run_setup_chain(hooks: &[&Hook]) -> Result<(), String> {
    for hook in hooks {
        catch_unwind(AssertUnwindSafe(|| hook()))
            .map_err(|payload| panic_message(payload.as_ref()))?;
    }
    Ok(())
}

/// Teardown runs every hook in the chain even after one panics, so a
/// failing child hook never skips ancestor cleanup. The first failure
/// message is reported.
fn run_teardown_chain(hooks: &[&Hook]) -> Result<(), String> {
    let mut first_failure: Option<String> = None;
    for hook in hooks {
        if let Err(payload) = catch_unwind(AssertUnwindSafe(|| hook())) {
            if first_failure.is_none() {
                first_failure = Some(panic_message(payload.as_ref()));
            }
        }
    }
    match first_failure {
        Some(message) => Err(message),
        None => Ok(()),
    }
}

fn skipped_result(group: &ExecutableGroup<'_>, description: &str, reason: SkipReason) -> CaseResult {
    CaseResult {
        path: case_path(group, description),
        outcome: Outcome::Skipped(reason),
        teardown_failure: None,
    }
}

fn case_path(group: &ExecutableGroup<'_>, description: &str) -> String {
    format!("{} > {description}", group.joined_path())
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
