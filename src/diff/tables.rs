use tracing::debug;

use crate::catalog::{ObjectId, Table};
use crate::diff::matching::pair;
use crate::diff::operations::Change;
use crate::diff::{Differ, cascade, checks, columns, foreign_keys, indexes};
use crate::error::DiffError;

/// Diff a single table
pub fn diff(
    d: &Differ<'_>,
    old: Option<&Table>,
    new: Option<&Table>,
) -> Result<Vec<Change>, DiffError> {
    match (old, new) {
        (None, Some(n)) => Ok(vec![Change::AddTable(n.clone())]),
        (Some(o), None) => Ok(vec![Change::DropTable(o.clone())]),
        (Some(o), Some(n)) => {
            let changes = changes(d, o, n)?;
            if changes.is_empty() {
                return Ok(Vec::new());
            }
            Ok(vec![Change::ModifyTable {
                table: n.clone(),
                changes,
            }])
        }
        (None, None) => Ok(Vec::new()),
    }
}

/// Sub-changes turning `from` into `to`, in execution order.
pub fn changes(d: &Differ<'_>, from: &Table, to: &Table) -> Result<Vec<Change>, DiffError> {
    debug!("Diffing table {}.{}", to.schema, to.name);
    let scope = format!("table {}.{}", to.schema, to.name);
    let ci = d.opts.case_insensitive;

    let mut out = d.driver.table_attr_diff(from, to)?;
    out.extend(d.renamed.table_changes(&to.schema, &to.name));

    let pk_id = ObjectId::PrimaryKey {
        schema: to.schema.clone(),
        table: to.name.clone(),
    };
    out.extend(indexes::diff_primary_key(
        d,
        &pk_id,
        from.primary_key.as_ref(),
        to.primary_key.as_ref(),
    )?);

    let cols = pair(&scope, &from.columns, &to.columns, ci)?;
    for old in cols.dropped {
        out.extend(columns::diff(d, to, Some(old), None)?);
    }
    for (old, new) in cols.desired {
        out.extend(columns::diff(d, to, old, Some(new))?);
    }

    let index_id = |name: &str| ObjectId::Index {
        schema: to.schema.clone(),
        table: to.name.clone(),
        name: name.to_string(),
    };
    let idx = pair(&scope, &from.indexes, &to.indexes, ci)?;
    for old in idx.dropped {
        out.extend(indexes::diff(d, &index_id(&old.name), Some(old), None)?);
    }
    for (old, new) in idx.desired {
        out.extend(indexes::diff(d, &index_id(&new.name), old, Some(new))?);
    }

    let fks = pair(&scope, &from.foreign_keys, &to.foreign_keys, ci)?;
    for old in fks.dropped {
        out.extend(foreign_keys::diff(d, to, Some(old), None));
    }
    for (old, new) in fks.desired {
        out.extend(foreign_keys::diff(d, to, old, Some(new)));
    }

    let chk = pair(&scope, &from.checks, &to.checks, ci)?;
    for old in chk.dropped {
        out.extend(checks::diff(Some(old), None));
    }
    for (old, new) in chk.desired {
        out.extend(checks::diff(old, Some(new)));
    }

    let mut out = cascade::mark_cascaded_drops(out, d.driver.dependent_drop_policy());
    cascade::sort_table_changes(&mut out);
    Ok(out)
}
