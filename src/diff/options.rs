//! Per-run knobs of the differ.

use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::config::ObjectFilter;
use crate::diff::operations::{Change, ChangeTag};

/// Entity kinds a rename hint can apply to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RenameKind {
    Table,
    Column,
    Index,
}

/// Declares that an entity was renamed, so the pair is reported as a rename rather
/// than a drop and an add. The differ never guesses renames on its own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenameHint {
    pub kind: RenameKind,
    pub schema: String,
    /// Owning table (desired name) for column and index renames.
    #[serde(default)]
    pub table: Option<String>,
    pub from: String,
    pub to: String,
}

impl RenameHint {
    pub fn table(schema: impl Into<String>, from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            kind: RenameKind::Table,
            schema: schema.into(),
            table: None,
            from: from.into(),
            to: to.into(),
        }
    }

    pub fn column(
        schema: impl Into<String>,
        table: impl Into<String>,
        from: impl Into<String>,
        to: impl Into<String>,
    ) -> Self {
        Self {
            kind: RenameKind::Column,
            schema: schema.into(),
            table: Some(table.into()),
            from: from.into(),
            to: to.into(),
        }
    }

    pub fn index(
        schema: impl Into<String>,
        table: impl Into<String>,
        from: impl Into<String>,
        to: impl Into<String>,
    ) -> Self {
        Self {
            kind: RenameKind::Index,
            ..Self::column(schema, table, from, to)
        }
    }

    pub(crate) fn applies_to(&self, kind: RenameKind, schema: &str, table: Option<&str>) -> bool {
        self.kind == kind && self.schema == schema && self.table.as_deref() == table
    }
}

/// Post-processing applied to the change list of a diff. Hooks may filter or decorate
/// changes; they never see the snapshots and cannot influence matching.
pub trait DiffHook: Send + Sync {
    fn apply(&self, changes: Vec<Change>) -> Vec<Change>;
}

impl<F> DiffHook for F
where
    F: Fn(Vec<Change>) -> Vec<Change> + Send + Sync,
{
    fn apply(&self, changes: Vec<Change>) -> Vec<Change> {
        self(changes)
    }
}

#[derive(Clone)]
pub struct DiffOptions {
    /// Match names ignoring ASCII case. More than one candidate is an error.
    pub case_insensitive: bool,
    /// Change kinds removed from the result, at any depth.
    pub skip_changes: BTreeSet<ChangeTag>,
    pub renames: Vec<RenameHint>,
    /// Applied to both snapshots before matching.
    pub filter: ObjectFilter,
    /// Run [`DiffDriver::normalize`](crate::driver::DiffDriver::normalize) on copies of
    /// both snapshots first.
    pub normalize: bool,
    pub hooks: Vec<Arc<dyn DiffHook>>,
}

impl Default for DiffOptions {
    fn default() -> Self {
        Self {
            case_insensitive: false,
            skip_changes: BTreeSet::new(),
            renames: Vec::new(),
            filter: ObjectFilter::default(),
            normalize: true,
            hooks: Vec::new(),
        }
    }
}

impl fmt::Debug for DiffOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DiffOptions")
            .field("case_insensitive", &self.case_insensitive)
            .field("skip_changes", &self.skip_changes)
            .field("renames", &self.renames)
            .field("filter", &self.filter)
            .field("normalize", &self.normalize)
            .field("hooks", &self.hooks.len())
            .finish()
    }
}

impl DiffOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn case_insensitive(mut self, enabled: bool) -> Self {
        self.case_insensitive = enabled;
        self
    }

    pub fn skip(mut self, tags: impl IntoIterator<Item = ChangeTag>) -> Self {
        self.skip_changes.extend(tags);
        self
    }

    pub fn rename(mut self, hint: RenameHint) -> Self {
        self.renames.push(hint);
        self
    }

    pub fn with_filter(mut self, filter: ObjectFilter) -> Self {
        self.filter = filter;
        self
    }

    pub fn normalize(mut self, enabled: bool) -> Self {
        self.normalize = enabled;
        self
    }

    pub fn with_hook(mut self, hook: impl DiffHook + 'static) -> Self {
        self.hooks.push(Arc::new(hook));
        self
    }

    /// Apply skip rules then hooks, in registration order.
    pub(crate) fn post_process(&self, changes: Vec<Change>) -> Vec<Change> {
        let changes = if self.skip_changes.is_empty() {
            changes
        } else {
            skip(changes, &self.skip_changes)
        };
        self.hooks
            .iter()
            .fold(changes, |changes, hook| hook.apply(changes))
    }
}

/// Remove skipped kinds recursively. A ModifyTable or ModifySchema left without
/// children is removed as well. A cascaded drop whose column drop was skipped needs
/// its own statement again.
fn skip(changes: Vec<Change>, tags: &BTreeSet<ChangeTag>) -> Vec<Change> {
    changes
        .into_iter()
        .filter(|c| !tags.contains(&c.tag()))
        .filter(|c| !matches!(c, Change::Cascaded(inner) if tags.contains(&inner.tag())))
        .filter_map(|c| match c {
            Change::ModifyTable { table, changes } => {
                let mut changes = skip(changes, tags);
                if !changes.iter().any(|c| matches!(c, Change::DropColumn(_))) {
                    changes = changes
                        .into_iter()
                        .map(|c| match c {
                            Change::Cascaded(inner) => *inner,
                            other => other,
                        })
                        .collect();
                }
                (!changes.is_empty()).then_some(Change::ModifyTable { table, changes })
            }
            Change::ModifySchema { schema, changes } => {
                let changes = skip(changes, tags);
                (!changes.is_empty()).then_some(Change::ModifySchema { schema, changes })
            }
            other => Some(other),
        })
        .collect()
}
