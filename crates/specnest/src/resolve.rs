//! Focus/ignore resolution — a single global pass over the finished tree.
//!
//! A focused leaf anywhere changes what unrelated siblings run, so
//! eligibility cannot be decided during construction: the tree is built
//! first, then resolved in two passes (detect focus mode, then annotate).

use crate::builder::Spec;
use crate::tree::{GroupNode, Mode};

/// Why an ineligible test case was skipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The case, or an ancestor group, was declared ignored.
    Ignored,
    /// Another test or group is focused and this case is not on a focused
    /// path.
    NotFocused,
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::Ignored => write!(f, "ignored"),
            SkipReason::NotFocused => write!(f, "not focused"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CaseFlag {
    Eligible,
    Skipped(SkipReason),
}

/// Eligibility annotations for every case and group, keyed by their dense
/// build-time ids.
pub(crate) struct Resolution {
    pub(crate) focus_mode: bool,
    case_flags: Vec<CaseFlag>,
    group_live: Vec<bool>,
}

impl Resolution {
    pub(crate) fn case_flag(&self, case: &crate::tree::TestCase) -> CaseFlag {
        self.case_flags[case.id.0]
    }

    /// Whether the group has at least one eligible descendant test case.
    /// Gates whether any of the group's hooks run at all.
    pub(crate) fn is_live(&self, group: &GroupNode) -> bool {
        self.group_live[group.id.0]
    }
}

pub(crate) fn resolve(spec: &Spec) -> Resolution {
    let focus_mode = subtree_has_focus(&spec.root);
    let mut resolution = Resolution {
        focus_mode,
        case_flags: vec![CaseFlag::Skipped(SkipReason::Ignored); spec.case_count],
        group_live: vec![false; spec.group_count],
    };
    annotate(&spec.root, Scope::default(), focus_mode, &mut resolution);
    resolution
}

/// Pass 1: does any focused test or group exist, not shadowed by an
/// ignored ancestor? Ignored subtrees are skipped entirely, so a focus
/// marker inside one cannot switch the tree into focus mode.
fn subtree_has_focus(node: &GroupNode) -> bool {
    match node.mode {
        Mode::Ignored => false,
        Mode::Focused => true,
        Mode::Regular => {
            node.cases.iter().any(|case| case.mode == Mode::Focused)
                || node.children.iter().any(subtree_has_focus)
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct Scope {
    ignored: bool,
    focused: bool,
}

/// Pass 2: annotate every case and compute per-group liveness bottom-up.
/// Returns whether the subtree has an eligible case.
fn annotate(node: &GroupNode, parent: Scope, focus_mode: bool, resolution: &mut Resolution) -> bool {
    let scope = Scope {
        ignored: parent.ignored || node.mode == Mode::Ignored,
        focused: parent.focused || node.mode == Mode::Focused,
    };

    let mut live = false;
    for case in &node.cases {
        let flag = if scope.ignored || case.mode == Mode::Ignored {
            CaseFlag::Skipped(SkipReason::Ignored)
        } else if focus_mode && !(scope.focused || case.mode == Mode::Focused) {
            CaseFlag::Skipped(SkipReason::NotFocused)
        } else {
            CaseFlag::Eligible
        };
        live |= flag == CaseFlag::Eligible;
        resolution.case_flags[case.id.0] = flag;
    }

    for child in &node.children {
        live |= annotate(child, scope, focus_mode, resolution);
    }

    resolution.group_live[node.id.0] = live;
    live
}
