//! The spec tree — groups, test cases, and panic expectations.
//!
//! The tree is populated by the builder ([`crate::Spec::build`]) and is
//! immutable afterwards: planning and running only ever borrow it.

use std::any::Any;

/// A zero-argument lifecycle or test callback. Failure is signalled by
/// panicking, which the runner catches per hook/body invocation.
pub(crate) type Hook = Box<dyn Fn()>;

/// How a test case or group was declared.
///
/// `Ignored` cascades to every descendant and dominates `Focused`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Regular,
    Focused,
    Ignored,
}

/// Dense index of a group within one spec, assigned in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct GroupId(pub(crate) usize);

/// Dense index of a test case within one spec, assigned in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct CaseId(pub(crate) usize);

/// One test group (the spec root included): its own hooks, its own test
/// cases, and its child groups, all in declaration order.
pub(crate) struct GroupNode {
    pub(crate) id: GroupId,
    pub(crate) description: String,
    pub(crate) mode: Mode,
    pub(crate) before_all: Vec<Hook>,
    pub(crate) before_each: Vec<Hook>,
    pub(crate) after_each: Vec<Hook>,
    pub(crate) after_all: Vec<Hook>,
    pub(crate) cases: Vec<TestCase>,
    pub(crate) children: Vec<GroupNode>,
}

impl GroupNode {
    pub(crate) fn new(id: GroupId, description: String, mode: Mode) -> Self {
        GroupNode {
            id,
            description,
            mode,
            before_all: Vec::new(),
            before_each: Vec::new(),
            after_each: Vec::new(),
            after_all: Vec::new(),
            cases: Vec::new(),
            children: Vec::new(),
        }
    }
}

/// A leaf test definition. The `description` is the final report label
/// (the builder already applied the `should` prefix convention).
///
/// Not nameable outside the crate; hosts see it through
/// [`PlannedCase`](crate::PlannedCase).
pub struct TestCase {
    pub(crate) id: CaseId,
    pub(crate) description: String,
    pub(crate) mode: Mode,
    pub(crate) body: Box<dyn Fn()>,
    pub(crate) expectation: Option<Expectation>,
}

// ============================================================================
// Panic expectations
// ============================================================================

/// A named predicate refining a typed panic payload.
pub(crate) struct Refinement<T> {
    pub(crate) description: String,
    pub(crate) predicate: Box<dyn Fn(&T) -> bool>,
}

/// Verdict of matching a caught panic payload against an expectation.
pub(crate) enum ExpectationCheck {
    Matched,
    WrongKind,
    RefinementFailed(String),
}

/// An expected-panic specification: the payload must downcast to the
/// declared kind `T`, and every refinement predicate must hold.
pub(crate) struct Expectation {
    pub(crate) kind: String,
    check: Box<dyn Fn(&(dyn Any + Send)) -> ExpectationCheck>,
}

impl Expectation {
    pub(crate) fn of<T: 'static>(refinements: Vec<Refinement<T>>) -> Self {
        let check = move |payload: &(dyn Any + Send)| match payload.downcast_ref::<T>() {
            None => ExpectationCheck::WrongKind,
            Some(value) => {
                for refinement in &refinements {
                    if !(refinement.predicate)(value) {
                        return ExpectationCheck::RefinementFailed(refinement.description.clone());
                    }
                }
                ExpectationCheck::Matched
            }
        };
        Expectation {
            kind: short_type_name::<T>(),
            check: Box::new(check),
        }
    }

    pub(crate) fn evaluate(&self, payload: &(dyn Any + Send)) -> ExpectationCheck {
        (self.check)(payload)
    }
}

/// Type name with every path prefix stripped, for report labels
/// (`alloc::string::String` -> `String`, `alloc::vec::Vec<alloc::string::String>`
/// -> `Vec<String>`). Generic parameters are shortened segment-wise rather
/// than cut at the last `::` of the whole name.
pub(crate) fn short_type_name<T>() -> String {
    let full = std::any::type_name::<T>();
    let mut out = String::with_capacity(full.len());
    let mut segment = String::new();
    for c in full.chars() {
        if c == ':' {
            segment.clear();
        } else if c.is_alphanumeric() || c == '_' {
            segment.push(c);
        } else {
            out.push_str(&segment);
            segment.clear();
            out.push(c);
        }
    }
    out.push_str(&segment);
    out
}
