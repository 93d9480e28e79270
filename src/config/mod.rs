pub mod builder;
pub mod defaults;
pub mod filter;
pub mod merge;
pub mod types;


pub use builder::ConfigBuilder;
pub use filter::ObjectFilter;
pub use types::*;

use anyhow::{Context, Result};
use std::path::Path;

use crate::diff::DiffOptions;
use crate::migrate::PlanOptions;

/// Read a YAML config file. A missing file yields an empty input.
pub fn load_config(config_file: impl AsRef<Path>) -> Result<ConfigInput> {
    let path = config_file.as_ref();

    if !path.exists() {
        return Ok(ConfigInput::default());
    }

    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file {}", path.display()))?;
    serde_yaml::from_str(&contents)
        .with_context(|| format!("Failed to parse config file {}", path.display()))
}

/// Load and resolve a config file in one go.
pub fn load(config_file: impl AsRef<Path>) -> Result<Config> {
    ConfigBuilder::new()
        .with_file(load_config(config_file)?)
        .resolve()
}

impl Config {
    pub fn diff_options(&self) -> DiffOptions {
        let mut opts = DiffOptions::new()
            .case_insensitive(self.diff.case_insensitive)
            .skip(self.diff.skip_changes.iter().copied())
            .normalize(self.diff.normalize)
            .with_filter(ObjectFilter::new(&self.objects));
        opts.renames = self.diff.renames.clone();
        opts
    }

    pub fn plan_options(&self) -> PlanOptions {
        PlanOptions {
            allow_irreversible: self.plan.allow_irreversible,
            transactional: self.plan.transactional,
        }
    }
}
