//! Focus/ignore resolution: the cascade matrix and global focus mode.

#![allow(deprecated)] // fshould/fdescribes are deprecated on purpose

use pretty_assertions::assert_eq;
use specnest::{Outcome, SkipReason, Spec};
use std::cell::RefCell;
use std::rc::Rc;

fn mark(log: &Rc<RefCell<Vec<String>>>, label: &'static str) -> impl Fn() + 'static {
    let log = Rc::clone(log);
    move || log.borrow_mut().push(label.to_string())
}

#[test]
fn without_focus_every_non_ignored_case_runs() {
    let spec = Spec::build("spec", |ctx| {
        ctx.should("run", || {});
        ctx.xshould("be skipped", || panic!("must never run"));
        ctx.describes("child", |ctx| {
            ctx.should("also run", || {});
        });
    })
    .unwrap();

    let report = spec.run();
    assert!(!report.focus_mode);
    assert_eq!(report.passed(), 2);
    assert_eq!(report.skipped(), 1);
    assert_eq!(
        report.results[1].outcome,
        Outcome::Skipped(SkipReason::Ignored)
    );
}

#[test]
fn a_single_focused_case_sidelines_regular_cases_tree_wide() {
    let log = Rc::new(RefCell::new(Vec::new()));

    let spec = Spec::build("spec", |ctx| {
        ctx.should("regular sibling", mark(&log, "regular sibling"));
        ctx.describes("deep", |ctx| {
            ctx.describes("deeper", |ctx| {
                ctx.fshould("focused leaf", mark(&log, "focused leaf"));
            });
        });
        ctx.describes("unrelated", |ctx| {
            ctx.should("regular cousin", mark(&log, "regular cousin"));
        });
    })
    .unwrap();

    let report = spec.run();
    assert!(report.focus_mode);
    assert_eq!(*log.borrow(), vec!["focused leaf"]);
    assert_eq!(report.passed(), 1);
    assert_eq!(
        report.results[0].outcome,
        Outcome::Skipped(SkipReason::NotFocused)
    );
}

#[test]
fn a_focused_group_focuses_all_of_its_descendants() {
    let log = Rc::new(RefCell::new(Vec::new()));

    let spec = Spec::build("spec", |ctx| {
        ctx.fdescribes("focused group", |ctx| {
            ctx.should("regular inside focused", mark(&log, "inside"));
            ctx.describes("nested", |ctx| {
                ctx.should("nested inside focused", mark(&log, "nested"));
            });
        });
        ctx.should("outside", mark(&log, "outside"));
    })
    .unwrap();

    let report = spec.run();
    assert_eq!(*log.borrow(), vec!["inside", "nested"]);
    assert_eq!(report.passed(), 2);
    assert_eq!(report.skipped(), 1);
}

#[test]
fn ignored_dominates_focused() {
    let log = Rc::new(RefCell::new(Vec::new()));

    let spec = Spec::build("spec", |ctx| {
        ctx.xdescribes("ignored group", |ctx| {
            ctx.fshould("focused under ignored", mark(&log, "shadowed"));
        });
        ctx.should("regular elsewhere", mark(&log, "regular"));
    })
    .unwrap();

    let report = spec.run();
    // The shadowed focus marker does not flip the tree into focus mode
    // either, so the regular case still runs. The ignored group has no
    // eligible descendant and is omitted from the plan altogether.
    assert!(!report.focus_mode);
    assert_eq!(*log.borrow(), vec!["regular"]);
    assert_eq!(report.results.len(), 1);
    assert_eq!(report.results[0].outcome, Outcome::Passed);
}

#[test]
fn ignored_group_cascades_over_focus_elsewhere_in_the_tree() {
    let spec = Spec::build("spec", |ctx| {
        ctx.fshould("focused", || {});
        ctx.xdescribes("ignored group", |ctx| {
            ctx.fshould("still ignored", || panic!("must never run"));
        });
    })
    .unwrap();

    let report = spec.run();
    assert!(report.focus_mode);
    assert_eq!(report.passed(), 1);
    // The ignored group holds no eligible case, so it is not even
    // reported.
    assert_eq!(report.results.len(), 1);
}

#[test]
fn end_to_end_focus_scenario() {
    // Root has a before_all; G1 holds a regular and a focused test, G2 only
    // a regular one. Only the focused test runs, the root once-hooks run
    // exactly once, and G2 vanishes from the plan entirely.
    let log = Rc::new(RefCell::new(Vec::new()));

    let spec = Spec::build("root", |ctx| {
        ctx.before_all(mark(&log, "root before_all"));
        ctx.after_all(mark(&log, "root after_all"));
        ctx.describes("G1", |ctx| {
            ctx.should("t1", mark(&log, "t1"));
            ctx.fshould("t2", mark(&log, "t2"));
        });
        ctx.describes("G2", |ctx| {
            ctx.before_all(mark(&log, "G2 before_all"));
            ctx.should("t3", mark(&log, "t3"));
        });
    })
    .unwrap();

    let plan = spec.plan();
    let root = plan.root().expect("root group must be live");
    let child_names: Vec<&str> = root.children().iter().map(|g| g.path()[1]).collect();
    assert_eq!(child_names, vec!["G1"]);

    let report = plan.run();
    assert_eq!(
        *log.borrow(),
        vec!["root before_all", "t2", "root after_all"]
    );
    assert_eq!(report.passed(), 1);
    assert_eq!(report.skipped(), 1); // t1 reported as not focused
}
