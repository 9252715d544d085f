//! Plan formulation — turning the resolved tree into an ordered,
//! executable group hierarchy with composed lifecycle hook chains.

use crate::builder::Spec;
use crate::resolve::{self, CaseFlag, Resolution, SkipReason};
use crate::tree::{GroupNode, Hook, TestCase};

/// The compiled execution plan for one spec: a depth-first hierarchy of
/// [`ExecutableGroup`]s covering exactly the groups with at least one
/// eligible descendant test case.
pub struct TestPlan<'a> {
    spec: &'a Spec,
    resolution: Resolution,
    root: Option<ExecutableGroup<'a>>,
}

impl Spec {
    /// Resolve focus/ignore eligibility and compose the execution plan.
    pub fn plan(&self) -> TestPlan<'_> {
        let resolution = resolve::resolve(self);
        let root = formulate(&self.root, &resolution, &[], &[], &[]);
        TestPlan {
            spec: self,
            resolution,
            root,
        }
    }
}

impl<'a> TestPlan<'a> {
    /// The spec's top-level name.
    pub fn spec_name(&self) -> &'a str {
        self.spec.name()
    }

    /// True iff any focused test or group (not shadowed by an ignored
    /// ancestor) exists anywhere in the tree. Hosts can surface this as a
    /// warning or fail CI on it.
    pub fn focus_mode(&self) -> bool {
        self.resolution.focus_mode
    }

    /// The root executable group, or `None` when no test case anywhere is
    /// eligible (in which case no hook runs at all).
    pub fn root(&self) -> Option<&ExecutableGroup<'a>> {
        self.root.as_ref()
    }
}

/// One group that will execute at least one test case: its description
/// chain, its hook chains, its own planned cases, and its live children.
///
/// `before_each`/`after_each` are the full composed ancestor chains
/// (outside-in and inside-out respectively). `before_all`/`after_all` are
/// the group's own once-hooks: ancestors' once-hooks run when the runner
/// enters/leaves the enclosing [`ExecutableGroup`], which yields the same
/// outside-in/inside-out order while guaranteeing each runs exactly once.
pub struct ExecutableGroup<'a> {
    path: Vec<&'a str>,
    pub(crate) before_all: &'a [Hook],
    pub(crate) after_all: &'a [Hook],
    pub(crate) before_each: Vec<&'a Hook>,
    pub(crate) after_each: Vec<&'a Hook>,
    entries: Vec<PlannedCase<'a>>,
    children: Vec<ExecutableGroup<'a>>,
}

impl<'a> ExecutableGroup<'a> {
    /// Description chain from the spec root down to this group.
    pub fn path(&self) -> &[&'a str] {
        &self.path
    }

    /// The group's own planned cases, declaration order preserved.
    /// Ineligible cases appear as [`PlannedCase::Skipped`] for reporting
    /// but are never invoked.
    pub fn entries(&self) -> &[PlannedCase<'a>] {
        &self.entries
    }

    /// Nested groups with eligible descendants, declaration order
    /// preserved. Fully filtered-out child groups are omitted entirely.
    pub fn children(&self) -> &[ExecutableGroup<'a>] {
        &self.children
    }

    pub(crate) fn joined_path(&self) -> String {
        self.path.join(" > ")
    }
}

/// One planned entry of a group's own test cases.
pub enum PlannedCase<'a> {
    /// Eligible: the runner will invoke it.
    Runnable(&'a TestCase),
    /// Ineligible: reported, never invoked.
    Skipped {
        description: &'a str,
        reason: SkipReason,
    },
}

impl PlannedCase<'_> {
    /// The case's final report label.
    pub fn description(&self) -> &str {
        match self {
            PlannedCase::Runnable(case) => &case.description,
            PlannedCase::Skipped { description, .. } => description,
        }
    }
}

fn formulate<'a>(
    node: &'a GroupNode,
    resolution: &Resolution,
    parent_path: &[&'a str],
    inherited_before: &[&'a Hook],
    inherited_after: &[&'a Hook],
) -> Option<ExecutableGroup<'a>> {
    if !resolution.is_live(node) {
        return None;
    }

    let mut path = parent_path.to_vec();
    path.push(node.description.as_str());

    // setup chain outside-in, teardown chain inside-out; within one node,
    // always declaration order.
    let mut before_each = inherited_before.to_vec();
    before_each.extend(node.before_each.iter());
    let mut after_each: Vec<&Hook> = node.after_each.iter().collect();
    after_each.extend(inherited_after.iter().copied());

    let entries = node
        .cases
        .iter()
        .map(|case| match resolution.case_flag(case) {
            CaseFlag::Eligible => PlannedCase::Runnable(case),
            CaseFlag::Skipped(reason) => PlannedCase::Skipped {
                description: case.description.as_str(),
                reason,
            },
        })
        .collect();

    let children = node
        .children
        .iter()
        .filter_map(|child| formulate(child, resolution, &path, &before_each, &after_each))
        .collect();

    Some(ExecutableGroup {
        path,
        before_all: &node.before_all,
        after_all: &node.after_all,
        before_each,
        after_each,
        entries,
        children,
    })
}
