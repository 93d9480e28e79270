use tracing::{debug, info, warn};

use crate::diff::{Change, order_changes};
use crate::error::PlanError;
use crate::render::{Action, Annotator, ChangeRenderer, Hint, Safety};

/// One rendered change.
#[derive(Debug, Clone)]
pub struct Step {
    pub change: Change,
    pub forward: Vec<Action>,
    pub reverse: Option<Vec<Action>>,
    pub description: String,
    pub hints: Vec<Hint>,
}

impl Step {
    pub fn is_reversible(&self) -> bool {
        self.reverse.is_some()
    }

    pub fn is_destructive(&self) -> bool {
        self.forward.iter().any(|a| a.safety == Safety::Destructive)
    }
}

#[derive(Debug, Clone)]
pub struct Plan {
    pub name: String,
    pub steps: Vec<Step>,
    /// Every step has a reverse.
    pub reversible: bool,
    /// The plan can run inside a single transaction.
    pub transactional: bool,
}

impl Plan {
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Forward actions in execution order.
    pub fn actions(&self) -> impl Iterator<Item = &Action> {
        self.steps.iter().flat_map(|s| s.forward.iter())
    }

    pub fn is_destructive(&self) -> bool {
        self.steps.iter().any(Step::is_destructive)
    }

    pub fn render_sql(&self) -> String {
        if self.is_empty() {
            return "-- No changes detected\n".to_string();
        }
        self.actions()
            .map(|a| a.sql.as_str())
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    /// Reverse actions undoing the whole plan: steps last to first. `None` when any
    /// step is irreversible.
    pub fn render_reverse_sql(&self) -> Option<String> {
        let mut parts = Vec::new();
        for step in self.steps.iter().rev() {
            for action in step.reverse.as_ref()? {
                parts.push(action.sql.as_str());
            }
        }
        Some(parts.join("\n\n"))
    }

    /// md5 hex digest of the forward SQL.
    pub fn checksum(&self) -> String {
        format!("{:x}", md5::compute(self.render_sql()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlanOptions {
    /// When false, a plan with an irreversible step is rejected.
    pub allow_irreversible: bool,
    /// When false, the plan is marked non-transactional regardless of its steps.
    pub transactional: bool,
}

impl Default for PlanOptions {
    fn default() -> Self {
        Self {
            allow_irreversible: true,
            transactional: true,
        }
    }
}

/// Orders changes and renders each one through a dialect renderer.
pub struct Planner<'a> {
    renderer: &'a dyn ChangeRenderer,
    annotator: Option<&'a dyn Annotator>,
    options: PlanOptions,
}

impl<'a> Planner<'a> {
    pub fn new(renderer: &'a dyn ChangeRenderer) -> Self {
        Self {
            renderer,
            annotator: None,
            options: PlanOptions::default(),
        }
    }

    pub fn with_annotator(mut self, annotator: &'a dyn Annotator) -> Self {
        self.annotator = Some(annotator);
        self
    }

    pub fn with_options(mut self, options: PlanOptions) -> Self {
        self.options = options;
        self
    }

    pub fn plan(&self, changes: Vec<Change>, name: &str) -> Result<Plan, PlanError> {
        info!("Ordering {} changes...", changes.len());
        let ordered = order_changes(changes)?;

        info!("Planning {}...", name);
        let mut plan = Plan {
            name: name.to_string(),
            steps: Vec::with_capacity(ordered.len()),
            reversible: true,
            transactional: self.options.transactional,
        };

        for change in ordered {
            let hints = self
                .annotator
                .map(|a| a.annotate(&change))
                .unwrap_or_default();
            if !hints.is_empty() {
                debug!("Hints for {}: {:?}", change, hints);
            }

            let rendered = self
                .renderer
                .render(&change, &hints)
                .map_err(|e| PlanError::Render {
                    change: change.to_string(),
                    source: e.into(),
                })?;

            if rendered.reverse.is_none() {
                warn!("Step is irreversible: {}", rendered.description);
                plan.reversible = false;
            }
            if self.renderer.requires_no_transaction(&change, &hints) {
                if plan.transactional {
                    warn!("Plan {} cannot run in a transaction: {}", name, rendered.description);
                }
                plan.transactional = false;
            }

            plan.steps.push(Step {
                change,
                forward: rendered.forward,
                reverse: rendered.reverse,
                description: rendered.description,
                hints,
            });
        }

        if !plan.reversible && !self.options.allow_irreversible {
            return Err(PlanError::Irreversible {
                name: plan.name,
                steps: plan
                    .steps
                    .iter()
                    .filter(|s| !s.is_reversible())
                    .map(|s| s.description.clone())
                    .collect(),
            });
        }

        info!("Planned {} steps", plan.steps.len());
        Ok(plan)
    }
}

/// Order `changes` and render them into a plan named `name`.
pub fn plan_changes(
    changes: Vec<Change>,
    name: &str,
    renderer: &dyn ChangeRenderer,
) -> Result<Plan, PlanError> {
    Planner::new(renderer).plan(changes, name)
}
