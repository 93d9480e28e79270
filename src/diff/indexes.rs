use crate::catalog::{Index, IndexPart, ObjectId, PartTarget};
use crate::diff::Differ;
use crate::diff::operations::{Change, ChangeKind};
use crate::error::DiffError;

/// Diff a single secondary index
pub fn diff(
    d: &Differ<'_>,
    id: &ObjectId,
    old: Option<&Index>,
    new: Option<&Index>,
) -> Result<Vec<Change>, DiffError> {
    match (old, new) {
        (None, Some(n)) => Ok(vec![Change::AddIndex(n.clone())]),
        (Some(o), None) => Ok(vec![Change::DropIndex(o.clone())]),
        (Some(o), Some(n)) => {
            let change = facets(d, id, o, n)?;
            if change.is_empty() {
                return Ok(Vec::new());
            }
            Ok(vec![Change::ModifyIndex {
                from: o.clone(),
                to: n.clone(),
                change,
            }])
        }
        (None, None) => Ok(Vec::new()),
    }
}

/// Diff the primary key. Its name is not compared: keys are usually named by the database.
pub fn diff_primary_key(
    d: &Differ<'_>,
    id: &ObjectId,
    old: Option<&Index>,
    new: Option<&Index>,
) -> Result<Vec<Change>, DiffError> {
    match (old, new) {
        (None, Some(n)) => Ok(vec![Change::AddPrimaryKey(n.clone())]),
        (Some(o), None) => Ok(vec![Change::DropPrimaryKey(o.clone())]),
        (Some(o), Some(n)) => {
            let change = facets(d, id, o, n)?;
            if change.is_empty() {
                return Ok(Vec::new());
            }
            Ok(vec![Change::ModifyPrimaryKey {
                from: o.clone(),
                to: n.clone(),
                change,
            }])
        }
        (None, None) => Ok(Vec::new()),
    }
}

/// Which facets of a matched index pair differ. Part order is significant.
pub fn facets(
    d: &Differ<'_>,
    id: &ObjectId,
    from: &Index,
    to: &Index,
) -> Result<ChangeKind, DiffError> {
    let mut change = ChangeKind::NONE;
    if from.unique != to.unique {
        change |= ChangeKind::UNIQUE;
    }
    if parts_changed(d, &from.parts, &to.parts) {
        change |= ChangeKind::PARTS;
    }
    if from.comment() != to.comment() {
        change |= ChangeKind::COMMENT;
    }
    if d.driver.index_attrs_changed(id, from, to)? {
        change |= ChangeKind::ATTR;
    }
    Ok(change)
}

fn parts_changed(d: &Differ<'_>, from: &[IndexPart], to: &[IndexPart]) -> bool {
    from.len() != to.len()
        || from.iter().zip(to).any(|(a, b)| {
            !same_target(&a.target, &b.target, d.opts.case_insensitive)
                || a.desc != b.desc
                || d.driver.index_part_attrs_changed(a, b)
        })
}

fn same_target(a: &PartTarget, b: &PartTarget, case_insensitive: bool) -> bool {
    match (a, b) {
        (PartTarget::Column(x), PartTarget::Column(y)) => {
            if case_insensitive {
                x.eq_ignore_ascii_case(y)
            } else {
                x == y
            }
        }
        (PartTarget::Expr(x), PartTarget::Expr(y)) => {
            let canon = |s: &str| crate::driver::strip_casts(s).split_whitespace().collect::<String>();
            canon(x) == canon(y)
        }
        _ => false,
    }
}
