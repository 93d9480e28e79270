use serde::{Deserialize, Serialize};

use crate::diff::{ChangeTag, RenameHint};

/// Raw configuration input - all fields Optional for merging
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ConfigInput {
    pub diff: Option<DiffInput>,
    pub objects: Option<ObjectsInput>,
    pub plan: Option<PlanInput>,
}

/// Resolved configuration with all defaults applied
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub diff: DiffSettings,
    pub objects: Objects,
    pub plan: PlanSettings,
}

// Differ configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct DiffInput {
    pub case_insensitive: Option<bool>,
    pub skip_changes: Option<Vec<ChangeTag>>,
    pub renames: Option<Vec<RenameHint>>,
    pub normalize: Option<bool>,
}

#[derive(Debug, Clone)]
pub struct DiffSettings {
    pub case_insensitive: bool,
    pub skip_changes: Vec<ChangeTag>,
    pub renames: Vec<RenameHint>,
    pub normalize: bool,
}

// Object filtering. Patterns are glob expressions; a table pattern containing a dot is
// matched against the qualified "schema.table" name.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ObjectsInput {
    pub include: Option<ObjectIncludeInput>,
    pub exclude: Option<ObjectExcludeInput>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ObjectIncludeInput {
    pub schemas: Option<Vec<String>>,
    pub tables: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ObjectExcludeInput {
    pub schemas: Option<Vec<String>>,
    pub tables: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Objects {
    pub include: ObjectInclude,
    pub exclude: ObjectExclude,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObjectInclude {
    pub schemas: Vec<String>,
    pub tables: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObjectExclude {
    pub schemas: Vec<String>,
    pub tables: Vec<String>,
}

// Plan configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct PlanInput {
    pub name: Option<String>,
    pub allow_irreversible: Option<bool>,
    pub transactional: Option<bool>,
}

#[derive(Debug, Clone)]
pub struct PlanSettings {
    pub name: String,
    pub allow_irreversible: bool,
    pub transactional: bool,
}
