use crate::config::types::*;

/// Trait for merging optional configuration values
pub trait Merge<T> {
    fn merge(self, other: T) -> T;
}

impl<T> Merge<Option<T>> for Option<T> {
    fn merge(self, other: Option<T>) -> Option<T> {
        other.or(self)
    }
}

impl Merge<ConfigInput> for ConfigInput {
    fn merge(self, other: ConfigInput) -> ConfigInput {
        ConfigInput {
            diff: match (self.diff, other.diff) {
                (Some(a), Some(b)) => Some(a.merge_with(b)),
                (a, b) => b.or(a),
            },
            objects: match (self.objects, other.objects) {
                (Some(a), Some(b)) => Some(a.merge_with(b)),
                (a, b) => b.or(a),
            },
            plan: match (self.plan, other.plan) {
                (Some(a), Some(b)) => Some(a.merge_with(b)),
                (a, b) => b.or(a),
            },
        }
    }
}

impl DiffInput {
    /// Rename hints accumulate; every other field is replaced.
    pub fn merge_with(self, other: DiffInput) -> DiffInput {
        let renames = match (self.renames, other.renames) {
            (Some(mut a), Some(b)) => {
                a.extend(b.into_iter());
                Some(a)
            }
            (a, b) => b.or(a),
        };
        DiffInput {
            case_insensitive: other.case_insensitive.or(self.case_insensitive),
            skip_changes: other.skip_changes.or(self.skip_changes),
            renames,
            normalize: other.normalize.or(self.normalize),
        }
    }
}

impl ObjectsInput {
    pub fn merge_with(self, other: ObjectsInput) -> ObjectsInput {
        ObjectsInput {
            include: match (self.include, other.include) {
                (Some(a), Some(b)) => Some(ObjectIncludeInput {
                    schemas: b.schemas.or(a.schemas),
                    tables: b.tables.or(a.tables),
                }),
                (a, b) => b.or(a),
            },
            exclude: match (self.exclude, other.exclude) {
                (Some(a), Some(b)) => Some(ObjectExcludeInput {
                    schemas: b.schemas.or(a.schemas),
                    tables: b.tables.or(a.tables),
                }),
                (a, b) => b.or(a),
            },
        }
    }
}

impl PlanInput {
    pub fn merge_with(self, other: PlanInput) -> PlanInput {
        PlanInput {
            name: other.name.or(self.name),
            allow_irreversible: other.allow_irreversible.or(self.allow_irreversible),
            transactional: other.transactional.or(self.transactional),
        }
    }
}
