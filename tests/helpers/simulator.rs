//! In-memory stand-in for a database: applies changes to a realm one at a time and
//! refuses any step whose dependencies are not in place at that moment.

use anyhow::{Result, anyhow, bail, ensure};
use schemaplan::catalog::{Realm, Schema, Table};
use schemaplan::catalog::attr;
use schemaplan::diff::Change;

pub fn apply_all<'a>(state: &mut Realm, changes: impl IntoIterator<Item = &'a Change>) -> Result<()> {
    for change in changes {
        apply_change(state, change).map_err(|e| anyhow!("applying \"{}\": {}", change, e))?;
    }
    Ok(())
}

pub fn apply_change(state: &mut Realm, change: &Change) -> Result<()> {
    match change {
        Change::AddSchema(s) => {
            ensure!(state.schema(&s.name).is_none(), "schema {} exists", s.name);
            state.schemas.push(s.clone());
        }
        Change::DropSchema(s) => {
            let schema = state
                .schema(&s.name)
                .ok_or_else(|| anyhow!("schema {} missing", s.name))?;
            ensure!(
                schema.tables.is_empty() && schema.objects.is_empty(),
                "schema {} is not empty",
                s.name
            );
            state.schemas.retain(|x| x.name != s.name);
        }
        Change::ModifySchema { schema, .. } => {
            schema_mut(state, &schema.name)?.attrs = schema.attrs.clone();
        }

        Change::AddTable(t) => {
            ensure!(state.schema(&t.schema).is_some(), "schema {} missing", t.schema);
            ensure!(state.table(&t.schema, &t.name).is_none(), "table {}.{} exists", t.schema, t.name);
            check_enums(state, t)?;
            for fk in &t.foreign_keys {
                let ref_schema = fk.ref_schema_or(&t.schema);
                let self_ref = ref_schema == t.schema && fk.ref_table == t.name;
                ensure!(
                    self_ref || state.table(ref_schema, &fk.ref_table).is_some(),
                    "foreign key {} references missing table {}.{}",
                    fk.symbol,
                    ref_schema,
                    fk.ref_table
                );
            }
            schema_mut(state, &t.schema)?.tables.push(t.clone());
        }
        Change::DropTable(t) => {
            table_mut(state, &t.schema, &t.name)?;
            if let Some(owner) = referencing(state, &t.schema, &t.name) {
                bail!("table {}.{} is still referenced by {}", t.schema, t.name, owner);
            }
            schema_mut(state, &t.schema)?.tables.retain(|x| x.name != t.name);
        }
        Change::RenameTable { schema, from, to } => {
            ensure!(state.table(schema, to).is_none(), "table {}.{} exists", schema, to);
            table_mut(state, schema, from)?.name = to.clone();
            // references follow the table
            for s in &mut state.schemas {
                let owner_schema = s.name.clone();
                for table in &mut s.tables {
                    for fk in &mut table.foreign_keys {
                        if fk.ref_schema_or(&owner_schema) == schema && fk.ref_table == *from {
                            fk.ref_table = to.clone();
                        }
                    }
                }
            }
        }
        Change::ModifyTable { table, changes } => {
            for child in changes {
                apply_table_change(state, &table.schema, &table.name, child)
                    .map_err(|e| anyhow!("{}: {}", child, e))?;
            }
        }

        Change::AddObject(o) => {
            let schema = schema_mut(state, o.schema())?;
            ensure!(schema.object(o.kind(), o.name()).is_none(), "{} exists", o.id());
            schema.objects.push(o.clone());
        }
        Change::DropObject(o) => {
            let in_use = state.tables().any(|t| {
                t.enum_refs()
                    .iter()
                    .any(|(s, n)| s == o.schema() && n == o.name())
            });
            ensure!(!in_use, "{} is still used by a column", o.id());
            let schema = schema_mut(state, o.schema())?;
            schema
                .objects
                .retain(|x| !(x.kind() == o.kind() && x.name() == o.name()));
        }
        Change::ModifyObject { to, .. } => {
            let schema = schema_mut(state, to.schema())?;
            let slot = schema
                .objects
                .iter_mut()
                .find(|x| x.kind() == to.kind() && x.name() == to.name())
                .ok_or_else(|| anyhow!("{} missing", to.id()))?;
            *slot = to.clone();
        }

        Change::AddAttr(a) | Change::ModifyAttr { to: a, .. } => attr::set(&mut state.attrs, a.clone()),
        Change::DropAttr(a) => state.attrs.retain(|x| x.key() != a.key()),

        other => bail!("{} is not a top-level change", other),
    }
    Ok(())
}

fn apply_table_change(state: &mut Realm, schema: &str, name: &str, change: &Change) -> Result<()> {
    if let Change::Cascaded(inner) = change {
        return apply_table_change(state, schema, name, inner);
    }

    if let Change::AddForeignKey(fk) | Change::ModifyForeignKey { to: fk, .. } = change {
        let ref_schema = fk.ref_schema_or(schema).to_string();
        ensure!(
            state.table(&ref_schema, &fk.ref_table).is_some(),
            "referenced table {}.{} missing",
            ref_schema,
            fk.ref_table
        );
    }

    let table = table_mut(state, schema, name)?;
    match change {
        Change::AddColumn(c) => {
            ensure!(table.column(&c.name).is_none(), "column {} exists", c.name);
            table.columns.push(c.clone());
        }
        Change::DropColumn(c) => {
            ensure!(table.column(&c.name).is_some(), "column {} missing", c.name);
            table.columns.retain(|x| x.name != c.name);
        }
        Change::ModifyColumn { to, .. } => {
            let slot = table
                .columns
                .iter_mut()
                .find(|x| x.name == to.name)
                .ok_or_else(|| anyhow!("column {} missing", to.name))?;
            *slot = to.clone();
        }
        Change::RenameColumn { from, to } => {
            let slot = table
                .columns
                .iter_mut()
                .find(|x| x.name == from.name)
                .ok_or_else(|| anyhow!("column {} missing", from.name))?;
            slot.name = to.name.clone();
        }

        Change::AddIndex(i) => table.indexes.push(i.clone()),
        Change::DropIndex(i) => table.indexes.retain(|x| x.name != i.name),
        Change::ModifyIndex { to, .. } => {
            table.indexes.retain(|x| x.name != to.name);
            table.indexes.push(to.clone());
        }
        Change::RenameIndex { from, to } => {
            let slot = table
                .indexes
                .iter_mut()
                .find(|x| x.name == from.name)
                .ok_or_else(|| anyhow!("index {} missing", from.name))?;
            slot.name = to.name.clone();
        }

        Change::AddPrimaryKey(pk) | Change::ModifyPrimaryKey { to: pk, .. } => {
            table.primary_key = Some(pk.clone())
        }
        Change::DropPrimaryKey(_) => table.primary_key = None,

        Change::AddForeignKey(fk) => table.foreign_keys.push(fk.clone()),
        Change::DropForeignKey(fk) => table.foreign_keys.retain(|x| x.symbol != fk.symbol),
        Change::ModifyForeignKey { to, .. } => {
            table.foreign_keys.retain(|x| x.symbol != to.symbol);
            table.foreign_keys.push(to.clone());
        }

        Change::AddCheck(c) => table.checks.push(c.clone()),
        Change::DropCheck(c) => table.checks.retain(|x| x.name != c.name),
        Change::ModifyCheck { to, .. } => {
            table.checks.retain(|x| x.name != to.name);
            table.checks.push(to.clone());
        }

        Change::AddAttr(a) | Change::ModifyAttr { to: a, .. } => attr::set(&mut table.attrs, a.clone()),
        Change::DropAttr(a) => table.attrs.retain(|x| x.key() != a.key()),

        other => bail!("{} cannot appear inside a table change", other),
    }

    let table = table.clone();
    check_enums(state, &table)
}

fn check_enums(state: &Realm, table: &Table) -> Result<()> {
    for (schema, name) in table.enum_refs() {
        let exists = state
            .schema(&schema)
            .is_some_and(|s| s.object("enum", &name).is_some());
        ensure!(exists, "enum {}.{} used by {} missing", schema, name, table.name);
    }
    Ok(())
}

/// First table, other than the target itself, holding a foreign key to `schema.name`.
fn referencing(state: &Realm, schema: &str, name: &str) -> Option<String> {
    state.schemas.iter().find_map(|s| {
        s.tables
            .iter()
            .filter(|t| !(s.name == schema && t.name == name))
            .find(|t| {
                t.foreign_keys
                    .iter()
                    .any(|fk| fk.ref_schema_or(&s.name) == schema && fk.ref_table == name)
            })
            .map(|t| format!("{}.{}", s.name, t.name))
    })
}

fn schema_mut<'a>(state: &'a mut Realm, name: &str) -> Result<&'a mut Schema> {
    state
        .schemas
        .iter_mut()
        .find(|s| s.name == name)
        .ok_or_else(|| anyhow!("schema {} missing", name))
}

fn table_mut<'a>(state: &'a mut Realm, schema: &str, name: &str) -> Result<&'a mut Table> {
    schema_mut(state, schema)?
        .tables
        .iter_mut()
        .find(|t| t.name == name)
        .ok_or_else(|| anyhow!("table {}.{} missing", schema, name))
}
