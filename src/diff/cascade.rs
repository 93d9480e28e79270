//! Ordering and pruning of the sub-changes of a single table.

use std::collections::HashSet;

use tracing::debug;

use crate::diff::operations::Change;
use crate::driver::DependentDrop;

/// Mark drops the database performs on its own. Under [`DependentDrop::Implicit`] an
/// index, primary key or foreign key whose columns are all dropped in the same table
/// change disappears with them, so its drop is wrapped in [`Change::Cascaded`].
pub fn mark_cascaded_drops(changes: Vec<Change>, policy: DependentDrop) -> Vec<Change> {
    if policy == DependentDrop::Explicit {
        return changes;
    }

    let dropped: HashSet<String> = changes
        .iter()
        .filter_map(|c| match c {
            Change::DropColumn(col) => Some(col.name.clone()),
            _ => None,
        })
        .collect();
    if dropped.is_empty() {
        return changes;
    }

    let covered = |columns: Vec<&str>| -> bool {
        !columns.is_empty() && columns.iter().all(|c| dropped.contains(*c))
    };

    changes
        .into_iter()
        .map(|c| {
            let cascaded = match &c {
                Change::DropIndex(idx) | Change::DropPrimaryKey(idx) => {
                    !idx.has_expressions() && covered(idx.column_names())
                }
                Change::DropForeignKey(fk) => {
                    covered(fk.columns.iter().map(String::as_str).collect())
                }
                _ => false,
            };
            if cascaded {
                debug!("{} is removed with its columns", c);
                Change::Cascaded(Box::new(c))
            } else {
                c
            }
        })
        .collect()
}

/// Execution rank of a table sub-change. Dependents are dropped before the columns they
/// cover and created after them.
fn rank(change: &Change) -> u8 {
    match change {
        Change::Cascaded(inner) => rank(inner),
        Change::DropForeignKey(_) => 0,
        Change::DropCheck(_) => 1,
        Change::DropIndex(_) | Change::DropPrimaryKey(_) => 2,
        Change::DropColumn(_) => 3,
        Change::RenameColumn { .. } => 4,
        Change::ModifyColumn { .. } => 5,
        Change::AddColumn(_) => 6,
        Change::AddPrimaryKey(_) | Change::ModifyPrimaryKey { .. } => 7,
        Change::RenameIndex { .. } | Change::ModifyIndex { .. } | Change::AddIndex(_) => 8,
        Change::ModifyCheck { .. } | Change::AddCheck(_) => 9,
        Change::ModifyForeignKey { .. } | Change::AddForeignKey(_) => 10,
        _ => 11,
    }
}

/// Stable sort of the sub-changes of one ModifyTable into execution order.
pub fn sort_table_changes(changes: &mut [Change]) {
    changes.sort_by_key(rank);
}
