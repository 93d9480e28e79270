use crate::helpers::simulator;
use anyhow::{Result, ensure};
use schemaplan::catalog::Realm;
use schemaplan::diff::{Change, DiffOptions, order_changes, realm_diff};
use schemaplan::driver::StandardDriver;
use schemaplan::migrate::{Plan, Planner};
use schemaplan::render::AnsiRenderer;

/// Helper for migration tests that eliminates boilerplate setup
pub struct MigrationTestHelper {
    driver: StandardDriver,
    opts: DiffOptions,
}

impl MigrationTestHelper {
    pub fn new() -> Self {
        Self {
            driver: StandardDriver::new(),
            opts: DiffOptions::default(),
        }
    }

    pub fn with_driver(mut self, driver: StandardDriver) -> Self {
        self.driver = driver;
        self
    }

    pub fn with_options(mut self, opts: DiffOptions) -> Self {
        self.opts = opts;
        self
    }

    pub fn diff(&self, from: &Realm, to: &Realm) -> Result<Vec<Change>> {
        Ok(realm_diff(&self.driver, from, to, &self.opts)?)
    }

    /// Run the pipeline up to ordering: realm_diff -> order_changes
    pub fn ordered(&self, from: &Realm, to: &Realm) -> Result<Vec<Change>> {
        Ok(order_changes(self.diff(from, to)?)?)
    }

    pub fn plan(&self, from: &Realm, to: &Realm) -> Result<Plan> {
        let renderer = AnsiRenderer::new();
        Ok(Planner::new(&renderer).plan(self.diff(from, to)?, "test")?)
    }

    /// End-to-end migration test:
    /// 1. Diff and plan `from` -> `to`
    /// 2. Apply every planned change to a copy of `from`, checking dependencies per step
    /// 3. Verify the result diffs clean against `to`
    /// 4. Hand the plan and the final state to `verify`
    pub fn run_migration_test<F>(&self, from: &Realm, to: &Realm, verify: F) -> Result<()>
    where
        F: FnOnce(&Plan, &Realm) -> Result<()>,
    {
        let plan = self.plan(from, to)?;

        let mut state = from.clone();
        simulator::apply_all(&mut state, plan.steps.iter().map(|s| &s.change))?;

        let remaining = self.diff(&state, to)?;
        ensure!(
            remaining.is_empty(),
            "state after migration still differs: {:?}",
            remaining.iter().map(|c| c.to_string()).collect::<Vec<_>>()
        );

        verify(&plan, &state)
    }

    /// Migrate forward and back again, both directions checked like
    /// [`run_migration_test`](Self::run_migration_test).
    pub fn run_roundtrip_test(&self, from: &Realm, to: &Realm) -> Result<()> {
        self.run_migration_test(from, to, |_, _| Ok(()))?;
        self.run_migration_test(to, from, |_, _| Ok(()))
    }
}

impl Default for MigrationTestHelper {
    fn default() -> Self {
        Self::new()
    }
}
