use crate::catalog::Check;
use crate::diff::operations::{Change, ChangeKind};
use crate::driver::strip_casts;

/// Diff a single check constraint. A check keeping its name is always modified in
/// place, never dropped and re-added.
pub fn diff(old: Option<&Check>, new: Option<&Check>) -> Vec<Change> {
    match (old, new) {
        (None, Some(n)) => vec![Change::AddCheck(n.clone())],
        (Some(o), None) => vec![Change::DropCheck(o.clone())],
        (Some(o), Some(n)) => {
            let mut change = ChangeKind::NONE;
            if canonical(&o.expr) != canonical(&n.expr) {
                change |= ChangeKind::EXPR;
            }
            if o.attrs != n.attrs {
                change |= ChangeKind::ATTR;
            }
            if change.is_empty() {
                return Vec::new();
            }
            vec![Change::ModifyCheck {
                from: o.clone(),
                to: n.clone(),
                change,
            }]
        }
        (None, None) => Vec::new(),
    }
}

pub(crate) fn canonical(expr: &str) -> String {
    strip_casts(expr)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}
