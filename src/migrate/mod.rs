//! Plan assembly: ordered changes rendered into executable, optionally reversible steps.

pub mod apply;
pub mod plan;

pub use apply::{Executor, apply_plan};
pub use plan::{Plan, PlanOptions, Planner, Step, plan_changes};
