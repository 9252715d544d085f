//! Declaration API — `Spec`, `GroupBuilder`, and the `should` family.
//!
//! Declarations run as plain closures that receive an explicit `&mut`
//! builder handle bound to the current group; nesting a group creates a
//! fresh child frame, recurses synchronously, and composes the finished
//! child into the parent on return. No test bodies run during this phase.

use crate::params::ParamsBuilder;
use crate::tree::{CaseId, Expectation, GroupId, GroupNode, Mode, Refinement, TestCase};
use std::fmt::Display;
use std::rc::Rc;
use thiserror::Error;

/// An invalid declaration sequence. Surfaced by [`Spec::build`]; nothing
/// runs when building fails.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BuildError {
    /// A parametrized template was declared but never supplied parameters.
    #[error("parametrized test '{description}' was never supplied parameters")]
    UnsetParameters { description: String },
}

// ============================================================================
// Build state
// ============================================================================

pub(crate) struct BuildState {
    pub(crate) errors: Vec<BuildError>,
    next_group: usize,
    next_case: usize,
}

impl BuildState {
    fn next_group_id(&mut self) -> GroupId {
        let id = GroupId(self.next_group);
        self.next_group += 1;
        id
    }

    fn next_case_id(&mut self) -> CaseId {
        let id = CaseId(self.next_case);
        self.next_case += 1;
        id
    }
}

// ============================================================================
// Spec — a fully built, immutable tree
// ============================================================================

/// A completed spec tree, ready to be compiled into a test plan.
///
/// # Example
/// ```rust
/// let spec = specnest::Spec::build("Calculator", |ctx| {
///     ctx.should("add two numbers", || assert_eq!(2 + 3, 5));
///
///     ctx.describes("with negative numbers", |ctx| {
///         ctx.should("handle negatives", || assert_eq!(-1 + 1, 0));
///     });
/// })
/// .unwrap();
///
/// let report = spec.run();
/// assert!(report.success());
/// ```
pub struct Spec {
    name: String,
    pub(crate) root: GroupNode,
    pub(crate) group_count: usize,
    pub(crate) case_count: usize,
}

impl Spec {
    /// Run the declaration closure and build the spec tree.
    ///
    /// Fails fast on the first invalid declaration; nothing runs in that
    /// case.
    pub fn build(name: &str, body: impl FnOnce(&mut GroupBuilder)) -> Result<Spec, BuildError> {
        let mut state = BuildState {
            errors: Vec::new(),
            next_group: 0,
            next_case: 0,
        };
        let mut root = GroupNode::new(state.next_group_id(), name.to_string(), Mode::Regular);
        {
            let mut builder = GroupBuilder {
                node: &mut root,
                state: &mut state,
            };
            body(&mut builder);
        }
        if let Some(error) = state.errors.into_iter().next() {
            return Err(error);
        }
        Ok(Spec {
            name: name.to_string(),
            root,
            group_count: state.next_group,
            case_count: state.next_case,
        })
    }

    /// The spec's top-level name, for host-side report grouping.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Convenience for `self.plan().run()`.
    pub fn run(&self) -> crate::runner::RunReport {
        self.plan().run()
    }
}

// ============================================================================
// GroupBuilder — the declaration handle for one group
// ============================================================================

/// The handle passed to declaration closures, bound to the group currently
/// being defined. All registrations append in declaration order.
pub struct GroupBuilder<'a> {
    pub(crate) node: &'a mut GroupNode,
    pub(crate) state: &'a mut BuildState,
}

impl<'b> GroupBuilder<'b> {
    // ---- Lifecycle hooks -----------------------------------------------------

    /// Register a hook that runs once before any test in this group's
    /// subtree. Ancestors' `before_all` hooks run first (outside-in).
    pub fn before_all(&mut self, hook: impl Fn() + 'static) {
        self.node.before_all.push(Box::new(hook));
    }

    /// Register a hook that runs before every individual test in this
    /// group's subtree. Ancestors' `before_each` hooks run first
    /// (outside-in).
    pub fn before_each(&mut self, hook: impl Fn() + 'static) {
        self.node.before_each.push(Box::new(hook));
    }

    /// Register a hook that runs after every individual test in this
    /// group's subtree, before ancestors' `after_each` hooks (inside-out).
    pub fn after_each(&mut self, hook: impl Fn() + 'static) {
        self.node.after_each.push(Box::new(hook));
    }

    /// Register a hook that runs once after the last test in this group's
    /// subtree, before ancestors' `after_all` hooks (inside-out).
    pub fn after_all(&mut self, hook: impl Fn() + 'static) {
        self.node.after_all.push(Box::new(hook));
    }

    // ---- Tests ---------------------------------------------------------------

    /// Define a test. The report label is the description prefixed with
    /// the word `should`.
    pub fn should(&mut self, description: &str, body: impl Fn() + 'static) {
        self.push_plain_case(Mode::Regular, description, body);
    }

    /// Focused variant of [`should`](Self::should): if any focused test or
    /// group exists anywhere in the tree, only focused items run.
    #[deprecated(
        note = "focusing is a temporary debugging aid; remove the leading 'f' before committing"
    )]
    pub fn fshould(&mut self, description: &str, body: impl Fn() + 'static) {
        self.push_plain_case(Mode::Focused, description, body);
    }

    /// Ignored variant of [`should`](Self::should): the test is reported
    /// as skipped and its body never runs.
    pub fn xshould(&mut self, description: &str, body: impl Fn() + 'static) {
        self.push_plain_case(Mode::Ignored, description, body);
    }

    // ---- Panic-expecting tests -----------------------------------------------

    /// Define a test that passes only if its body panics with a payload of
    /// kind `T`. Returns a builder for refining the expectation.
    ///
    /// The report label is `should panic with <T> <description>`.
    ///
    /// ```rust
    /// # let spec = specnest::Spec::build("math", |ctx| {
    /// ctx.should_panic::<String>("on division by zero", || {
    ///     std::panic::panic_any("divide by zero".to_string());
    /// })
    /// .matching("mentions zero", |message| message.contains("zero"));
    /// # }).unwrap();
    /// # assert!(spec.run().success());
    /// ```
    pub fn should_panic<'a, T: 'static>(
        &'a mut self,
        description: &str,
        body: impl Fn() + 'static,
    ) -> PanicBuilder<'a, 'b, T> {
        PanicBuilder::new(self, Mode::Regular, description, Box::new(body))
    }

    /// Focused variant of [`should_panic`](Self::should_panic).
    #[deprecated(
        note = "focusing is a temporary debugging aid; remove the leading 'f' before committing"
    )]
    pub fn fshould_panic<'a, T: 'static>(
        &'a mut self,
        description: &str,
        body: impl Fn() + 'static,
    ) -> PanicBuilder<'a, 'b, T> {
        PanicBuilder::new(self, Mode::Focused, description, Box::new(body))
    }

    /// Ignored variant of [`should_panic`](Self::should_panic).
    pub fn xshould_panic<'a, T: 'static>(
        &'a mut self,
        description: &str,
        body: impl Fn() + 'static,
    ) -> PanicBuilder<'a, 'b, T> {
        PanicBuilder::new(self, Mode::Ignored, description, Box::new(body))
    }

    // ---- Parametrized tests --------------------------------------------------

    /// Define a parametrized test from a description template and a body
    /// taking one parameter. Call [`ParamsBuilder::provided`] with the
    /// parameter values to expand it into one independent test case per
    /// value; dropping the builder without doing so is a build error.
    ///
    /// The `%1` placeholder in the template is replaced with each value's
    /// display form.
    ///
    /// ```rust
    /// # let spec = specnest::Spec::build("math", |ctx| {
    /// ctx.parametrized("doubles %1", |n: &i32| {
    ///     assert_eq!(n * 2, n + n);
    /// })
    /// .provided([1, 2, 3]);
    /// # }).unwrap();
    /// # assert!(spec.run().success());
    /// ```
    pub fn parametrized<'a, P: Display + 'static>(
        &'a mut self,
        template: &str,
        body: impl Fn(&P) + 'static,
    ) -> ParamsBuilder<'a, 'b, P> {
        ParamsBuilder::new(self, template, Rc::new(body))
    }

    // ---- Nested groups -------------------------------------------------------

    /// Define a child group. The closure runs immediately and builds the
    /// whole child subtree before returning.
    pub fn describes(&mut self, description: &str, body: impl FnOnce(&mut GroupBuilder)) {
        self.push_group(Mode::Regular, description, body);
    }

    /// Focused variant of [`describes`](Self::describes): every test in
    /// the group counts as focused.
    #[deprecated(
        note = "focusing is a temporary debugging aid; remove the leading 'f' before committing"
    )]
    pub fn fdescribes(&mut self, description: &str, body: impl FnOnce(&mut GroupBuilder)) {
        self.push_group(Mode::Focused, description, body);
    }

    /// Ignored variant of [`describes`](Self::describes): every descendant
    /// test is skipped, regardless of focus markers.
    pub fn xdescribes(&mut self, description: &str, body: impl FnOnce(&mut GroupBuilder)) {
        self.push_group(Mode::Ignored, description, body);
    }

    // ---- Internals -----------------------------------------------------------

    fn push_group(&mut self, mode: Mode, description: &str, body: impl FnOnce(&mut GroupBuilder)) {
        let mut child = GroupNode::new(self.state.next_group_id(), description.to_string(), mode);
        {
            let mut builder = GroupBuilder {
                node: &mut child,
                state: &mut *self.state,
            };
            body(&mut builder);
        }
        self.node.children.push(child);
    }

    fn push_plain_case(&mut self, mode: Mode, description: &str, body: impl Fn() + 'static) {
        let description = format!("should {description}");
        self.push_case(mode, description, Box::new(body), None);
    }

    pub(crate) fn push_case(
        &mut self,
        mode: Mode,
        description: String,
        body: Box<dyn Fn()>,
        expectation: Option<Expectation>,
    ) {
        self.node.cases.push(TestCase {
            id: self.state.next_case_id(),
            description,
            mode,
            body,
            expectation,
        });
    }
}

// ============================================================================
// PanicBuilder — fluent refinements, registers the case on Drop
// ============================================================================

/// Builder returned by the `should_panic` family. Chain
/// [`matching`](Self::matching) calls to refine the expectation; the test
/// case is registered when the builder drops (at the end of the statement).
pub struct PanicBuilder<'a, 'b, T: 'static> {
    ctx: &'a mut GroupBuilder<'b>,
    description: String,
    mode: Mode,
    body: Option<Box<dyn Fn()>>,
    refinements: Vec<Refinement<T>>,
}

impl<'a, 'b, T: 'static> PanicBuilder<'a, 'b, T> {
    fn new(
        ctx: &'a mut GroupBuilder<'b>,
        mode: Mode,
        description: &str,
        body: Box<dyn Fn()>,
    ) -> Self {
        let description = format!(
            "should panic with {} {description}",
            crate::tree::short_type_name::<T>()
        );
        PanicBuilder {
            ctx,
            description,
            mode,
            body: Some(body),
            refinements: Vec::new(),
        }
    }

    /// Add a named predicate the caught payload must satisfy. The
    /// description appears in the failure report when the predicate fails.
    pub fn matching(mut self, description: &str, predicate: impl Fn(&T) -> bool + 'static) -> Self {
        self.refinements.push(Refinement {
            description: description.to_string(),
            predicate: Box::new(predicate),
        });
        self
    }
}

impl<T: 'static> Drop for PanicBuilder<'_, '_, T> {
    fn drop(&mut self) {
        let body = self.body.take().unwrap();
        let expectation = Expectation::of::<T>(std::mem::take(&mut self.refinements));
        self.ctx.push_case(
            self.mode,
            std::mem::take(&mut self.description),
            body,
            Some(expectation),
        );
    }
}
