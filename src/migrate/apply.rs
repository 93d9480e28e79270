//! Sequential execution of a plan against an external executor.

use anyhow::{Context, Result};
use tracing::{debug, info, warn};

use crate::migrate::Plan;

/// Runs statements against a database. Implemented outside this crate.
pub trait Executor {
    fn execute(&mut self, sql: &str) -> Result<()>;

    fn begin(&mut self) -> Result<()> {
        Ok(())
    }

    fn commit(&mut self) -> Result<()> {
        Ok(())
    }

    fn rollback(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Execute the forward actions of `plan` in order, stopping at the first failure.
/// Transactional plans are wrapped in begin/commit and rolled back on failure.
/// Returns the number of executed actions.
pub fn apply_plan<E: Executor + ?Sized>(plan: &Plan, executor: &mut E) -> Result<usize> {
    info!("Applying {} ({} steps)...", plan.name, plan.steps.len());
    if plan.transactional {
        executor.begin()?;
    }

    let mut applied = 0;
    for (i, step) in plan.steps.iter().enumerate() {
        for action in &step.forward {
            let result = executor
                .execute(&action.sql)
                .with_context(|| format!("step {} failed: {}", i + 1, step.description));
            if let Err(e) = result {
                if plan.transactional
                    && let Err(rollback) = executor.rollback()
                {
                    warn!("Rollback failed: {:#}", rollback);
                }
                return Err(e);
            }
            applied += 1;
        }
        debug!("Applied step {}: {}", i + 1, step.description);
    }

    if plan.transactional {
        executor.commit()?;
    }
    info!("Applied {} statements", applied);
    Ok(applied)
}
