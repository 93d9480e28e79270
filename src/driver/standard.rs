//! Generic reference driver.
//!
//! Implements the capability interface with the behaviour shared by most SQL engines.
//! Dialect drivers usually wrap or replace it.

use tracing::debug;

use super::{DependentDrop, DiffDriver, Registry, registry};
use crate::catalog::{Index, ObjectId, Realm, Table, Type};
use crate::error::DiffError;

#[derive(Debug, Clone)]
pub struct StandardDriver {
    registry: Registry,
    dependent_drop: DependentDrop,
}

impl Default for StandardDriver {
    fn default() -> Self {
        Self::new()
    }
}

impl StandardDriver {
    pub fn new() -> Self {
        Self {
            registry: Registry::standard(),
            dependent_drop: DependentDrop::Explicit,
        }
    }

    pub fn with_registry(mut self, registry: Registry) -> Self {
        self.registry = registry;
        self
    }

    /// Configure whether dropping a column implicitly drops its indexes and foreign keys.
    pub fn with_dependent_drop(mut self, policy: DependentDrop) -> Self {
        self.dependent_drop = policy;
        self
    }

    fn normalize_table(&self, table: &mut Table) -> Result<(), DiffError> {
        for column in &mut table.columns {
            if let Type::Unsupported { raw } = &column.ty.ty
                && let Some(parsed) = self.registry.parse(raw)
            {
                debug!("Classified {} column {} as {}", raw, column.name, parsed);
                column.ty.ty = parsed;
            }
            if let Type::Float { precision } = &mut column.ty.ty {
                *precision = Some(registry::float_bucket(*precision));
            }
            if let Some(raw) = &column.ty.raw
                && let Some(canonical) = self.registry.canonical(raw)
            {
                column.ty.raw = Some(canonical);
            }
        }

        let indexes = table.primary_key.iter().chain(table.indexes.iter());
        for index in indexes {
            check_parts(table, index)?;
        }
        for fk in &table.foreign_keys {
            if let Some(missing) = fk.columns.iter().find(|c| table.column(c).is_none()) {
                return Err(DiffError::Normalize {
                    id: ObjectId::ForeignKey {
                        schema: table.schema.clone(),
                        table: table.name.clone(),
                        symbol: fk.symbol.clone(),
                    },
                    reason: format!("column {missing:?} does not exist"),
                });
            }
            if fk.columns.len() != fk.ref_columns.len() {
                return Err(DiffError::Normalize {
                    id: ObjectId::ForeignKey {
                        schema: table.schema.clone(),
                        table: table.name.clone(),
                        symbol: fk.symbol.clone(),
                    },
                    reason: format!(
                        "{} columns paired with {} referenced columns",
                        fk.columns.len(),
                        fk.ref_columns.len()
                    ),
                });
            }
        }
        Ok(())
    }
}

fn check_parts(table: &Table, index: &Index) -> Result<(), DiffError> {
    match index
        .column_names()
        .into_iter()
        .find(|c| table.column(c).is_none())
    {
        Some(missing) => Err(DiffError::Normalize {
            id: ObjectId::Index {
                schema: table.schema.clone(),
                table: table.name.clone(),
                name: index.name.clone(),
            },
            reason: format!("part references unknown column {missing:?}"),
        }),
        None => Ok(()),
    }
}

impl DiffDriver for StandardDriver {
    fn name(&self) -> &str {
        "standard"
    }

    fn registry(&self) -> &Registry {
        &self.registry
    }

    fn normalize(&self, realm: &mut Realm) -> Result<(), DiffError> {
        for schema in &mut realm.schemas {
            for table in &mut schema.tables {
                self.normalize_table(table)?;
            }
        }
        Ok(())
    }

    fn dependent_drop_policy(&self) -> DependentDrop {
        self.dependent_drop
    }
}
