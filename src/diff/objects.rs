use crate::catalog::Object;
use crate::diff::operations::{Change, ChangeKind};

/// Diff a schema-scoped object such as an enum type
pub fn diff(old: Option<&Object>, new: Option<&Object>) -> Vec<Change> {
    match (old, new) {
        (None, Some(n)) => vec![Change::AddObject(n.clone())],
        (Some(o), None) => vec![Change::DropObject(o.clone())],
        (Some(o), Some(n)) => {
            let change = match (o, n) {
                (Object::Enum { values: a, .. }, Object::Enum { values: b, .. }) if a != b => {
                    ChangeKind::VALUES
                }
                (Object::Dialect { payload: a, .. }, Object::Dialect { payload: b, .. })
                    if a != b =>
                {
                    ChangeKind::ATTR
                }
                _ => ChangeKind::NONE,
            };
            if change.is_empty() {
                return Vec::new();
            }
            vec![Change::ModifyObject {
                from: o.clone(),
                to: n.clone(),
                change,
            }]
        }
        (None, None) => Vec::new(),
    }
}
