use crate::config::types::*;

impl Default for DiffSettings {
    fn default() -> Self {
        Self {
            case_insensitive: false,
            skip_changes: vec![],
            renames: vec![],
            normalize: true,
        }
    }
}

impl Default for PlanSettings {
    fn default() -> Self {
        Self {
            name: "migration".to_string(),
            allow_irreversible: true,
            transactional: true,
        }
    }
}
