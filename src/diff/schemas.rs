use crate::catalog::Schema;
use crate::diff::matching::pair;
use crate::diff::operations::Change;
use crate::diff::{Differ, objects, tables};
use crate::error::DiffError;

/// Diff a single schema. A new schema is created empty and followed by one AddObject and
/// one AddTable per entity; a removed schema is emptied entity by entity before it is
/// dropped.
pub fn diff(
    d: &Differ<'_>,
    old: Option<&Schema>,
    new: Option<&Schema>,
) -> Result<Vec<Change>, DiffError> {
    match (old, new) {
        (None, Some(n)) => {
            let mut out = vec![Change::AddSchema(shell(n))];
            out.extend(n.objects.iter().cloned().map(Change::AddObject));
            out.extend(n.tables.iter().cloned().map(Change::AddTable));
            Ok(out)
        }
        (Some(o), None) => {
            let mut out: Vec<Change> = o.tables.iter().cloned().map(Change::DropTable).collect();
            out.extend(o.objects.iter().cloned().map(Change::DropObject));
            out.push(Change::DropSchema(shell(o)));
            Ok(out)
        }
        (Some(o), Some(n)) => changes(d, o, n),
        (None, None) => Ok(Vec::new()),
    }
}

/// The namespace itself, without its tables and objects.
fn shell(schema: &Schema) -> Schema {
    Schema {
        name: schema.name.clone(),
        tables: Vec::new(),
        objects: Vec::new(),
        attrs: schema.attrs.clone(),
    }
}

/// Changes between two versions of a schema: drops in current order first, then adds
/// and modifications in desired order.
pub fn changes(d: &Differ<'_>, from: &Schema, to: &Schema) -> Result<Vec<Change>, DiffError> {
    let scope = format!("schema {}", to.name);
    let ci = d.opts.case_insensitive;
    let mut out = Vec::new();

    let attrs = d.driver.schema_attr_diff(from, to)?;
    if !attrs.is_empty() {
        out.push(Change::ModifySchema {
            schema: shell(to),
            changes: attrs,
        });
    }

    let objs = pair(&scope, &from.objects, &to.objects, ci)?;
    let tbls = pair(&scope, &from.tables, &to.tables, ci)?;

    for old in objs.dropped {
        out.extend(objects::diff(Some(old), None));
    }
    for old in tbls.dropped {
        out.extend(tables::diff(d, Some(old), None)?);
    }
    for (old, new) in objs.desired {
        out.extend(objects::diff(old, Some(new)));
    }
    for (old, new) in tbls.desired {
        if old.is_some()
            && let Some(rename) = d.renamed.table_rename(&to.name, &new.name)
        {
            out.push(rename);
        }
        out.extend(tables::diff(d, old, Some(new))?);
    }
    Ok(out)
}
