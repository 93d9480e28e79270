//! Rename hints applied to the current snapshot before matching.
//!
//! A hinted entity is renamed in a copy of the current snapshot, together with every
//! reference to it, so the remaining diff compares like with like. The rename itself
//! is reported as a RenameTable, RenameColumn or RenameIndex change.

use tracing::{debug, warn};

use crate::catalog::{Column, Index, PartTarget, Realm, Table};
use crate::diff::operations::Change;
use crate::diff::options::{RenameHint, RenameKind};

#[derive(Debug, Default)]
pub(crate) struct Renamed {
    /// (schema, from, to)
    tables: Vec<(String, String, String)>,
    /// (schema, table, before, after)
    columns: Vec<(String, String, Column, Column)>,
    indexes: Vec<(String, String, Index, Index)>,
}

impl Renamed {
    /// The RenameTable change producing `schema.table`, if it was renamed.
    pub(crate) fn table_rename(&self, schema: &str, table: &str) -> Option<Change> {
        self.tables
            .iter()
            .find(|(s, _, to)| s == schema && to == table)
            .map(|(s, from, to)| Change::RenameTable {
                schema: s.clone(),
                from: from.clone(),
                to: to.clone(),
            })
    }

    /// Column and index renames inside `schema.table`.
    pub(crate) fn table_changes(&self, schema: &str, table: &str) -> Vec<Change> {
        let columns = self
            .columns
            .iter()
            .filter(|(s, t, _, _)| s == schema && t == table)
            .map(|(_, _, from, to)| Change::RenameColumn {
                from: from.clone(),
                to: to.clone(),
            });
        let indexes = self
            .indexes
            .iter()
            .filter(|(s, t, _, _)| s == schema && t == table)
            .map(|(_, _, from, to)| Change::RenameIndex {
                from: from.clone(),
                to: to.clone(),
            });
        columns.chain(indexes).collect()
    }
}

fn find_table_mut<'a>(realm: &'a mut Realm, schema: &str, name: &str) -> Option<&'a mut Table> {
    realm
        .schemas
        .iter_mut()
        .find(|s| s.name == schema)
        .and_then(|s| s.tables.iter_mut().find(|t| t.name == name))
}

/// Apply `hints` to `from`. Hints whose source is missing, whose target is missing in
/// `to`, or whose target name is already taken in `from` are ignored.
pub(crate) fn apply(hints: &[RenameHint], from: &mut Realm, to: &Realm) -> Renamed {
    let mut renamed = Renamed::default();

    for hint in hints.iter().filter(|h| h.kind == RenameKind::Table) {
        let valid = from.table(&hint.schema, &hint.from).is_some()
            && from.table(&hint.schema, &hint.to).is_none()
            && to.table(&hint.schema, &hint.to).is_some();
        if !valid {
            warn!("Ignoring table rename hint {}.{} -> {}", hint.schema, hint.from, hint.to);
            continue;
        }
        rename_table(from, &hint.schema, &hint.from, &hint.to);
        debug!("Renamed table {}.{} to {}", hint.schema, hint.from, hint.to);
        renamed
            .tables
            .push((hint.schema.clone(), hint.from.clone(), hint.to.clone()));
    }

    for hint in hints.iter().filter(|h| h.kind != RenameKind::Table) {
        let Some(table_name) = hint.table.as_deref() else {
            warn!("Ignoring {:?} rename hint without a table", hint.kind);
            continue;
        };
        let target = to.table(&hint.schema, table_name);
        let Some(table) = find_table_mut(from, &hint.schema, table_name) else {
            warn!("Ignoring rename hint on unknown table {}.{}", hint.schema, table_name);
            continue;
        };

        match hint.kind {
            RenameKind::Column => {
                let valid = table.column(&hint.to).is_none()
                    && target.is_some_and(|t| t.column(&hint.to).is_some());
                let Some(before) = table.column(&hint.from).filter(|_| valid).cloned() else {
                    warn!("Ignoring column rename hint {}.{} -> {}", table_name, hint.from, hint.to);
                    continue;
                };
                rename_column(table, &hint.from, &hint.to);
                let after = Column {
                    name: hint.to.clone(),
                    ..before.clone()
                };
                renamed.columns.push((
                    hint.schema.clone(),
                    table_name.to_string(),
                    before,
                    after,
                ));
                rename_referenced_column(from, &hint.schema, table_name, &hint.from, &hint.to);
            }
            RenameKind::Index => {
                let valid = table.index(&hint.to).is_none()
                    && target.is_some_and(|t| t.index(&hint.to).is_some());
                let Some(before) = table.index(&hint.from).filter(|_| valid).cloned() else {
                    warn!("Ignoring index rename hint {}.{} -> {}", table_name, hint.from, hint.to);
                    continue;
                };
                for index in table.indexes.iter_mut().filter(|i| i.name == hint.from) {
                    index.name = hint.to.clone();
                }
                for column in &mut table.columns {
                    for name in column.indexes.iter_mut().filter(|n| **n == hint.from) {
                        *name = hint.to.clone();
                    }
                }
                let after = Index {
                    name: hint.to.clone(),
                    ..before.clone()
                };
                renamed.indexes.push((
                    hint.schema.clone(),
                    table_name.to_string(),
                    before,
                    after,
                ));
            }
            RenameKind::Table => {}
        }
    }

    renamed
}

fn rename_table(realm: &mut Realm, schema: &str, from: &str, to: &str) {
    if let Some(table) = find_table_mut(realm, schema, from) {
        table.name = to.to_string();
        for index in table.primary_key.iter_mut().chain(table.indexes.iter_mut()) {
            index.table = to.to_string();
        }
        for fk in &mut table.foreign_keys {
            fk.table = to.to_string();
        }
        for check in &mut table.checks {
            check.table = to.to_string();
        }
    }
    for s in &mut realm.schemas {
        let owner = s.name.clone();
        for fk in s.tables.iter_mut().flat_map(|t| t.foreign_keys.iter_mut()) {
            if fk.ref_table == from && fk.ref_schema_or(&owner) == schema {
                fk.ref_table = to.to_string();
            }
        }
    }
}

fn rename_column(table: &mut Table, from: &str, to: &str) {
    for column in table.columns.iter_mut().filter(|c| c.name == from) {
        column.name = to.to_string();
    }
    for index in table.primary_key.iter_mut().chain(table.indexes.iter_mut()) {
        for part in &mut index.parts {
            if let PartTarget::Column(name) = &mut part.target
                && name == from
            {
                *name = to.to_string();
            }
        }
    }
    for fk in &mut table.foreign_keys {
        for name in fk.columns.iter_mut().filter(|n| *n == from) {
            *name = to.to_string();
        }
    }
}

/// Follow a column rename into foreign keys referencing it from any table.
fn rename_referenced_column(realm: &mut Realm, schema: &str, table: &str, from: &str, to: &str) {
    for s in &mut realm.schemas {
        let owner = s.name.clone();
        for fk in s.tables.iter_mut().flat_map(|t| t.foreign_keys.iter_mut()) {
            if fk.ref_table == table && fk.ref_schema_or(&owner) == schema {
                for name in fk.ref_columns.iter_mut().filter(|n| *n == from) {
                    *name = to.to_string();
                }
            }
        }
    }
}
