use crate::catalog::{Attr, Column, ObjectId, Table};
use crate::diff::Differ;
use crate::diff::operations::{Change, ChangeKind};
use crate::error::DiffError;

/// Diff a single column
pub fn diff(
    d: &Differ<'_>,
    table: &Table,
    old: Option<&Column>,
    new: Option<&Column>,
) -> Result<Vec<Change>, DiffError> {
    match (old, new) {
        (None, Some(n)) => Ok(vec![Change::AddColumn(n.clone())]),
        (Some(o), None) => Ok(vec![Change::DropColumn(o.clone())]),
        (Some(o), Some(n)) => {
            let id = ObjectId::Column {
                schema: table.schema.clone(),
                table: table.name.clone(),
                name: n.name.clone(),
            };
            let change = facets(d, &id, o, n)?;
            if change.is_empty() {
                return Ok(Vec::new());
            }
            Ok(vec![Change::ModifyColumn {
                from: o.clone(),
                to: n.clone(),
                change,
            }])
        }
        (None, None) => Ok(Vec::new()),
    }
}

/// Which facets of a matched column pair differ.
pub fn facets(
    d: &Differ<'_>,
    id: &ObjectId,
    from: &Column,
    to: &Column,
) -> Result<ChangeKind, DiffError> {
    let mut change = ChangeKind::NONE;
    if from.ty.null != to.ty.null {
        change |= ChangeKind::NULL;
    }
    if !d.driver.types_equal(id, &from.ty, &to.ty)? {
        change |= ChangeKind::TYPE;
    }
    if !d
        .driver
        .defaults_equal(from.default.as_ref(), to.default.as_ref())
    {
        change |= ChangeKind::DEFAULT;
    }
    if from.comment() != to.comment() {
        change |= ChangeKind::COMMENT;
    }
    if from.charset() != to.charset() {
        change |= ChangeKind::CHARSET;
    }
    if from.collation() != to.collation() {
        change |= ChangeKind::COLLATE;
    }
    if !d
        .driver
        .generated_equal(from.generated.as_ref(), to.generated.as_ref())
    {
        change |= ChangeKind::GENERATED;
    }
    if from.identity() != to.identity() {
        change |= ChangeKind::IDENTITY;
    }
    if other_attrs(&from.attrs) != other_attrs(&to.attrs) {
        change |= ChangeKind::ATTR;
    }
    Ok(change)
}

fn other_attrs(attrs: &[Attr]) -> Vec<&Attr> {
    attrs
        .iter()
        .filter(|a| {
            !matches!(
                a,
                Attr::Comment(_) | Attr::Charset(_) | Attr::Collation(_) | Attr::Identity(_)
            )
        })
        .collect()
}
