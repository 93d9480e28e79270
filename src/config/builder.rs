use anyhow::{Result, anyhow, bail};
use glob::Pattern;

use crate::config::{merge::Merge, types::*};
use crate::diff::RenameKind;

pub struct ConfigBuilder {
    config_input: ConfigInput,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self {
            config_input: ConfigInput::default(),
        }
    }

    pub fn with_file(mut self, file_input: ConfigInput) -> Self {
        self.config_input = self.config_input.merge(file_input);
        self
    }

    /// Programmatic overrides win over the file.
    pub fn with_overrides(mut self, overrides: ConfigInput) -> Self {
        self.config_input = self.config_input.merge(overrides);
        self
    }

    pub fn resolve(self) -> Result<Config> {
        let defaults = Config::default();

        Ok(Config {
            diff: self.resolve_diff(&defaults.diff)?,
            objects: self.resolve_objects(&defaults.objects)?,
            plan: self.resolve_plan(&defaults.plan),
        })
    }

    fn resolve_diff(&self, defaults: &DiffSettings) -> Result<DiffSettings> {
        let diff_input = self.config_input.diff.as_ref();

        let renames = diff_input
            .and_then(|d| d.renames.as_ref())
            .cloned()
            .unwrap_or_else(|| defaults.renames.clone());
        for hint in &renames {
            if hint.kind != RenameKind::Table && hint.table.is_none() {
                bail!(
                    "Rename hint {} -> {} in schema {} needs a table",
                    hint.from,
                    hint.to,
                    hint.schema
                );
            }
        }

        Ok(DiffSettings {
            case_insensitive: diff_input
                .and_then(|d| d.case_insensitive)
                .unwrap_or(defaults.case_insensitive),
            skip_changes: diff_input
                .and_then(|d| d.skip_changes.as_ref())
                .cloned()
                .unwrap_or_else(|| defaults.skip_changes.clone()),
            renames,
            normalize: diff_input
                .and_then(|d| d.normalize)
                .unwrap_or(defaults.normalize),
        })
    }

    fn resolve_objects(&self, defaults: &Objects) -> Result<Objects> {
        let obj_input = self.config_input.objects.as_ref();

        let include = obj_input
            .and_then(|o| o.include.as_ref())
            .map(|i| ObjectInclude {
                schemas: i.schemas.as_ref().cloned().unwrap_or_default(),
                tables: i.tables.as_ref().cloned().unwrap_or_default(),
            })
            .unwrap_or_else(|| defaults.include.clone());

        let exclude = obj_input
            .and_then(|o| o.exclude.as_ref())
            .map(|e| ObjectExclude {
                schemas: e
                    .schemas
                    .as_ref()
                    .cloned()
                    .unwrap_or_else(|| defaults.exclude.schemas.clone()),
                tables: e
                    .tables
                    .as_ref()
                    .cloned()
                    .unwrap_or_else(|| defaults.exclude.tables.clone()),
            })
            .unwrap_or_else(|| defaults.exclude.clone());

        for pattern in include
            .schemas
            .iter()
            .chain(&include.tables)
            .chain(&exclude.schemas)
            .chain(&exclude.tables)
        {
            Pattern::new(pattern)
                .map_err(|e| anyhow!("Invalid object pattern {:?}: {}", pattern, e))?;
        }

        Ok(Objects { include, exclude })
    }

    fn resolve_plan(&self, defaults: &PlanSettings) -> PlanSettings {
        let plan_input = self.config_input.plan.as_ref();

        PlanSettings {
            name: plan_input
                .and_then(|p| p.name.as_ref())
                .cloned()
                .unwrap_or_else(|| defaults.name.clone()),
            allow_irreversible: plan_input
                .and_then(|p| p.allow_irreversible)
                .unwrap_or(defaults.allow_irreversible),
            transactional: plan_input
                .and_then(|p| p.transactional)
                .unwrap_or(defaults.transactional),
        }
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
