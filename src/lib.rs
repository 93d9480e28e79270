//! Schema diffing and migration planning.
//!
//! Two snapshots of a database structure ([`catalog::Realm`]) go in; an ordered,
//! dialect-rendered and, where possible, reversible [`migrate::Plan`] comes out:
//!
//! 1. [`diff::realm_diff`] matches entities by name and emits typed [`diff::Change`]s,
//!    asking a [`driver::DiffDriver`] whenever equality is dialect specific.
//! 2. [`diff::order_changes`] sorts them by dependency, detaching foreign keys to break
//!    cycles.
//! 3. [`migrate::Planner`] renders every change through a [`render::ChangeRenderer`]
//!    and collects forward and reverse actions.

pub mod catalog;
pub mod config;
pub mod diff;
pub mod driver;
pub mod error;
pub mod logging;
pub mod migrate;
pub mod render;

pub use catalog::Realm;
pub use diff::{Change, DiffOptions, realm_diff, schema_diff, table_diff};
pub use driver::{DiffDriver, StandardDriver};
pub use error::{DiffError, OrderError, PlanError};
pub use migrate::{Plan, Planner, plan_changes};
pub use render::{AnsiRenderer, ChangeRenderer};
