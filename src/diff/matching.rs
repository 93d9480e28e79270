//! Name matching between the current and desired side of a diff.

use std::borrow::Cow;

use crate::catalog::{Check, Column, ForeignKey, Index, Object, Schema, Table};
use crate::diff::checks;
use crate::error::DiffError;

/// An entity matched across snapshots by name.
pub(crate) trait Named {
    const KIND: &'static str;

    fn match_name(&self) -> Cow<'_, str>;

    /// Entities of different sub-kinds never match, even under the same name.
    fn match_kind(&self) -> &str {
        ""
    }
}

impl Named for Schema {
    const KIND: &'static str = "schema";
    fn match_name(&self) -> Cow<'_, str> {
        Cow::Borrowed(&self.name)
    }
}

impl Named for Table {
    const KIND: &'static str = "table";
    fn match_name(&self) -> Cow<'_, str> {
        Cow::Borrowed(&self.name)
    }
}

impl Named for Column {
    const KIND: &'static str = "column";
    fn match_name(&self) -> Cow<'_, str> {
        Cow::Borrowed(&self.name)
    }
}

impl Named for Index {
    const KIND: &'static str = "index";
    fn match_name(&self) -> Cow<'_, str> {
        Cow::Borrowed(&self.name)
    }
}

impl Named for Check {
    const KIND: &'static str = "check";

    /// Unnamed checks are matched by their canonical expression.
    fn match_name(&self) -> Cow<'_, str> {
        if self.name.is_empty() {
            Cow::Owned(format!("({})", checks::canonical(&self.expr)))
        } else {
            Cow::Borrowed(&self.name)
        }
    }
}

impl Named for Object {
    const KIND: &'static str = "object";
    fn match_name(&self) -> Cow<'_, str> {
        Cow::Borrowed(self.name())
    }
    fn match_kind(&self) -> &str {
        self.kind()
    }
}

impl Named for ForeignKey {
    const KIND: &'static str = "foreign key";

    /// Unnamed keys are matched by their structure.
    fn match_name(&self) -> Cow<'_, str> {
        if self.symbol.is_empty() {
            Cow::Owned(format!(
                "({})->{}.{}({})",
                self.columns.join(","),
                self.ref_schema.as_deref().unwrap_or_default(),
                self.ref_table,
                self.ref_columns.join(",")
            ))
        } else {
            Cow::Borrowed(&self.symbol)
        }
    }
}

/// Result of matching two lists.
pub(crate) struct Paired<'a, T> {
    /// Entities only present on the current side, in current order.
    pub dropped: Vec<&'a T>,
    /// Every desired entity with its current counterpart, in desired order.
    pub desired: Vec<(Option<&'a T>, &'a T)>,
}

fn same_name(a: &str, b: &str, case_insensitive: bool) -> bool {
    if case_insensitive {
        a.eq_ignore_ascii_case(b)
    } else {
        a == b
    }
}

/// Positions in `pool` of the entities `item` matches.
fn candidates<T: Named>(item: &T, pool: &[T], case_insensitive: bool) -> Vec<usize> {
    let name = item.match_name();
    pool.iter()
        .enumerate()
        .filter(|(_, p)| p.match_kind() == item.match_kind())
        .filter(|(_, p)| same_name(&p.match_name(), &name, case_insensitive))
        .map(|(i, _)| i)
        .collect()
}

fn ambiguous<T: Named>(name: &str, scope: &str, pool: &[T], found: &[usize]) -> DiffError {
    DiffError::AmbiguousMatch {
        kind: T::KIND,
        name: name.to_string(),
        scope: scope.to_string(),
        candidates: found
            .iter()
            .map(|&i| pool[i].match_name().into_owned())
            .collect(),
    }
}

/// Match `from` against `to` by name, one to one. Exact matching takes the first
/// candidate not already paired, so entities sharing a name pair up in order; with
/// `case_insensitive` any name with more than one candidate on the other side fails.
pub(crate) fn pair<'a, T: Named>(
    scope: &str,
    from: &'a [T],
    to: &'a [T],
    case_insensitive: bool,
) -> Result<Paired<'a, T>, DiffError> {
    if case_insensitive {
        for item in from {
            let found = candidates(item, to, true);
            if found.len() > 1 {
                return Err(ambiguous(&item.match_name(), scope, to, &found));
            }
        }
    }

    let mut taken = vec![false; from.len()];
    let mut desired = Vec::with_capacity(to.len());
    for item in to {
        let found = candidates(item, from, case_insensitive);
        if case_insensitive && found.len() > 1 {
            return Err(ambiguous(&item.match_name(), scope, from, &found));
        }
        let matched = found.into_iter().find(|&i| !taken[i]);
        if let Some(i) = matched {
            taken[i] = true;
        }
        desired.push((matched.map(|i| &from[i]), item));
    }

    let dropped = from
        .iter()
        .zip(&taken)
        .filter(|(_, used)| !**used)
        .map(|(item, _)| item)
        .collect();

    Ok(Paired { dropped, desired })
}
