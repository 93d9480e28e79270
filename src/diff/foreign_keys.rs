use crate::catalog::{Attr, ForeignKey, Table};
use crate::diff::Differ;
use crate::diff::operations::{Change, ChangeKind};

/// Diff a single foreign key of `table`
pub fn diff(
    d: &Differ<'_>,
    table: &Table,
    old: Option<&ForeignKey>,
    new: Option<&ForeignKey>,
) -> Vec<Change> {
    match (old, new) {
        (None, Some(n)) => vec![Change::AddForeignKey(n.clone())],
        (Some(o), None) => vec![Change::DropForeignKey(o.clone())],
        (Some(o), Some(n)) => {
            let change = facets(d, &table.schema, o, n);
            if change.is_empty() {
                return Vec::new();
            }
            vec![Change::ModifyForeignKey {
                from: o.clone(),
                to: n.clone(),
                change,
            }]
        }
        (None, None) => Vec::new(),
    }
}

/// Which facets of a matched foreign key pair differ. `schema` is the owning table's
/// schema, used to resolve an unqualified reference.
pub fn facets(d: &Differ<'_>, schema: &str, from: &ForeignKey, to: &ForeignKey) -> ChangeKind {
    let names_equal = |a: &[String], b: &[String]| {
        a.len() == b.len()
            && a.iter().zip(b).all(|(x, y)| {
                if d.opts.case_insensitive {
                    x.eq_ignore_ascii_case(y)
                } else {
                    x == y
                }
            })
    };

    let mut change = ChangeKind::NONE;
    if !names_equal(&from.columns, &to.columns) {
        change |= ChangeKind::COLUMN;
    }
    if from.ref_schema_or(schema) != to.ref_schema_or(schema) || from.ref_table != to.ref_table {
        change |= ChangeKind::REF_TABLE;
    }
    if !names_equal(&from.ref_columns, &to.ref_columns) {
        change |= ChangeKind::REF_COLUMN;
    }
    if !d
        .driver
        .reference_actions_equal(from.on_update, to.on_update)
    {
        change |= ChangeKind::UPDATE_ACTION;
    }
    if !d
        .driver
        .reference_actions_equal(from.on_delete, to.on_delete)
    {
        change |= ChangeKind::DELETE_ACTION;
    }
    let attrs = |fk: &ForeignKey| -> Vec<Attr> {
        fk.attrs
            .iter()
            .filter(|a| !matches!(a, Attr::SystemNamed))
            .cloned()
            .collect()
    };
    if attrs(from) != attrs(to) {
        change |= ChangeKind::ATTR;
    }
    change
}
