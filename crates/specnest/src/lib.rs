//! # specnest — a hierarchical test-specification engine
//!
//! Declaratively build a tree of nested test groups with lifecycle hooks,
//! compile it into an ordered execution plan, and run it — honoring
//! per-test focus and ignore overrides and panic-expectation assertions.
//!
//! ## Quick example
//!
//! ```rust
//! let spec = specnest::Spec::build("Calculator", |ctx| {
//!     ctx.before_each(|| { /* fresh fixture per test */ });
//!
//!     ctx.should("add two numbers", || {
//!         assert_eq!(2 + 3, 5);
//!     });
//!
//!     ctx.describes("with negative numbers", |ctx| {
//!         ctx.should("handle negatives", || {
//!             assert_eq!(-1 + 1, 0);
//!         });
//!     });
//! })
//! .unwrap();
//!
//! let report = spec.run();
//! assert!(report.success());
//! ```
//!
//! The engine decides *what* runs, *in what order*, and *whether it
//! passed*; assertions, mocking, and report formatting belong to the host.
//!
//! ## Features
//!
//! - `googletest` — re-exports `googletest` matchers via
//!   `specnest::matchers`

mod builder;
mod params;
mod plan;
mod resolve;
mod runner;
mod tree;

pub use builder::{BuildError, GroupBuilder, PanicBuilder, Spec};
pub use params::ParamsBuilder;
pub use plan::{ExecutableGroup, PlannedCase, TestPlan};
pub use resolve::SkipReason;
pub use runner::{CaseResult, FailureCause, FixturePhase, GroupFailure, Outcome, RunReport};
pub use tree::Mode;

/// Re-export of the [`googletest`] crate. Available with the `googletest`
/// feature.
#[cfg(feature = "googletest")]
pub use googletest;

/// Composable matchers re-exported from [`googletest::prelude`].
#[cfg(feature = "googletest")]
pub mod matchers {
    pub use googletest::prelude::*;
}
