//! Structural changes produced by the differ.
//!
//! A [`Change`] is a value: the differ creates it, the ordering and plan stages only read
//! it. Modify variants carry a [`ChangeKind`] describing exactly which facets differ, so
//! consumers never need to diff again.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::catalog::{Attr, Check, Column, ForeignKey, Index, Object, Schema, Table};

pub use kind::ChangeKind;

pub mod kind;

#[derive(Debug, Clone, PartialEq)]
#[allow(clippy::large_enum_variant)]
pub enum Change {
    AddSchema(Schema),
    DropSchema(Schema),
    /// Schema attribute changes.
    ModifySchema {
        schema: Schema,
        changes: Vec<Change>,
    },

    AddTable(Table),
    DropTable(Table),
    /// Column, index, key, check and attribute changes of one table, `table` being its
    /// desired state.
    ModifyTable {
        table: Table,
        changes: Vec<Change>,
    },
    RenameTable {
        schema: String,
        from: String,
        to: String,
    },

    AddColumn(Column),
    DropColumn(Column),
    ModifyColumn {
        from: Column,
        to: Column,
        change: ChangeKind,
    },
    RenameColumn {
        from: Column,
        to: Column,
    },

    AddIndex(Index),
    DropIndex(Index),
    ModifyIndex {
        from: Index,
        to: Index,
        change: ChangeKind,
    },
    RenameIndex {
        from: Index,
        to: Index,
    },

    AddPrimaryKey(Index),
    DropPrimaryKey(Index),
    ModifyPrimaryKey {
        from: Index,
        to: Index,
        change: ChangeKind,
    },

    AddForeignKey(ForeignKey),
    DropForeignKey(ForeignKey),
    ModifyForeignKey {
        from: ForeignKey,
        to: ForeignKey,
        change: ChangeKind,
    },

    AddCheck(Check),
    DropCheck(Check),
    ModifyCheck {
        from: Check,
        to: Check,
        change: ChangeKind,
    },

    AddObject(Object),
    DropObject(Object),
    ModifyObject {
        from: Object,
        to: Object,
        change: ChangeKind,
    },

    AddAttr(Attr),
    DropAttr(Attr),
    ModifyAttr {
        from: Attr,
        to: Attr,
    },

    /// A drop the database performs on its own along with the columns it covers. It
    /// renders to nothing but orders and reverses like the drop it wraps.
    Cascaded(Box<Change>),
}

/// Variant of a [`Change`] without its payload. Used to filter changes by kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeTag {
    AddSchema,
    DropSchema,
    ModifySchema,
    AddTable,
    DropTable,
    ModifyTable,
    RenameTable,
    AddColumn,
    DropColumn,
    ModifyColumn,
    RenameColumn,
    AddIndex,
    DropIndex,
    ModifyIndex,
    RenameIndex,
    AddPrimaryKey,
    DropPrimaryKey,
    ModifyPrimaryKey,
    AddForeignKey,
    DropForeignKey,
    ModifyForeignKey,
    AddCheck,
    DropCheck,
    ModifyCheck,
    AddObject,
    DropObject,
    ModifyObject,
    AddAttr,
    DropAttr,
    ModifyAttr,
    Cascaded,
}

impl Change {
    pub fn tag(&self) -> ChangeTag {
        match self {
            Change::AddSchema(_) => ChangeTag::AddSchema,
            Change::DropSchema(_) => ChangeTag::DropSchema,
            Change::ModifySchema { .. } => ChangeTag::ModifySchema,
            Change::AddTable(_) => ChangeTag::AddTable,
            Change::DropTable(_) => ChangeTag::DropTable,
            Change::ModifyTable { .. } => ChangeTag::ModifyTable,
            Change::RenameTable { .. } => ChangeTag::RenameTable,
            Change::AddColumn(_) => ChangeTag::AddColumn,
            Change::DropColumn(_) => ChangeTag::DropColumn,
            Change::ModifyColumn { .. } => ChangeTag::ModifyColumn,
            Change::RenameColumn { .. } => ChangeTag::RenameColumn,
            Change::AddIndex(_) => ChangeTag::AddIndex,
            Change::DropIndex(_) => ChangeTag::DropIndex,
            Change::ModifyIndex { .. } => ChangeTag::ModifyIndex,
            Change::RenameIndex { .. } => ChangeTag::RenameIndex,
            Change::AddPrimaryKey(_) => ChangeTag::AddPrimaryKey,
            Change::DropPrimaryKey(_) => ChangeTag::DropPrimaryKey,
            Change::ModifyPrimaryKey { .. } => ChangeTag::ModifyPrimaryKey,
            Change::AddForeignKey(_) => ChangeTag::AddForeignKey,
            Change::DropForeignKey(_) => ChangeTag::DropForeignKey,
            Change::ModifyForeignKey { .. } => ChangeTag::ModifyForeignKey,
            Change::AddCheck(_) => ChangeTag::AddCheck,
            Change::DropCheck(_) => ChangeTag::DropCheck,
            Change::ModifyCheck { .. } => ChangeTag::ModifyCheck,
            Change::AddObject(_) => ChangeTag::AddObject,
            Change::DropObject(_) => ChangeTag::DropObject,
            Change::ModifyObject { .. } => ChangeTag::ModifyObject,
            Change::AddAttr(_) => ChangeTag::AddAttr,
            Change::DropAttr(_) => ChangeTag::DropAttr,
            Change::ModifyAttr { .. } => ChangeTag::ModifyAttr,
            Change::Cascaded(_) => ChangeTag::Cascaded,
        }
    }

    /// Returns true if this change removes an entity
    pub fn is_drop(&self) -> bool {
        matches!(
            self,
            Change::DropSchema(_)
                | Change::DropTable(_)
                | Change::DropColumn(_)
                | Change::DropIndex(_)
                | Change::DropPrimaryKey(_)
                | Change::DropForeignKey(_)
                | Change::DropCheck(_)
                | Change::DropObject(_)
                | Change::DropAttr(_)
                | Change::Cascaded(_)
        )
    }

    /// Returns true if this change creates an entity
    pub fn is_add(&self) -> bool {
        matches!(
            self,
            Change::AddSchema(_)
                | Change::AddTable(_)
                | Change::AddColumn(_)
                | Change::AddIndex(_)
                | Change::AddPrimaryKey(_)
                | Change::AddForeignKey(_)
                | Change::AddCheck(_)
                | Change::AddObject(_)
                | Change::AddAttr(_)
        )
    }

    /// Facets of a Modify change; `None` for every other variant.
    pub fn facets(&self) -> Option<ChangeKind> {
        match self {
            Change::ModifyColumn { change, .. }
            | Change::ModifyIndex { change, .. }
            | Change::ModifyPrimaryKey { change, .. }
            | Change::ModifyForeignKey { change, .. }
            | Change::ModifyCheck { change, .. }
            | Change::ModifyObject { change, .. } => Some(*change),
            _ => None,
        }
    }

    /// Child changes of a ModifyTable or ModifySchema.
    pub fn children(&self) -> &[Change] {
        match self {
            Change::ModifyTable { changes, .. } | Change::ModifySchema { changes, .. } => changes,
            _ => &[],
        }
    }

    /// Schema a top-level change applies to.
    pub fn schema_name(&self) -> Option<&str> {
        match self {
            Change::AddSchema(s) | Change::DropSchema(s) => Some(&s.name),
            Change::ModifySchema { schema, .. } => Some(&schema.name),
            Change::AddTable(t) | Change::DropTable(t) => Some(&t.schema),
            Change::ModifyTable { table, .. } => Some(&table.schema),
            Change::RenameTable { schema, .. } => Some(schema),
            Change::AddObject(o) | Change::DropObject(o) => Some(o.schema()),
            Change::ModifyObject { to, .. } => Some(to.schema()),
            _ => None,
        }
    }

    /// Table a top-level change applies to. Renames report their new name.
    pub fn table_name(&self) -> Option<&str> {
        match self {
            Change::AddTable(t) | Change::DropTable(t) => Some(&t.name),
            Change::ModifyTable { table, .. } => Some(&table.name),
            Change::RenameTable { to, .. } => Some(to),
            _ => None,
        }
    }

    /// The structural inverse of this change: applying a change and then its reverse
    /// leaves the schema as it was.
    pub fn reverse(&self) -> Change {
        match self {
            Change::AddSchema(s) => Change::DropSchema(s.clone()),
            Change::DropSchema(s) => Change::AddSchema(s.clone()),
            Change::ModifySchema { schema, changes } => Change::ModifySchema {
                schema: schema.clone(),
                changes: reverse_all(changes),
            },
            Change::AddTable(t) => Change::DropTable(t.clone()),
            Change::DropTable(t) => Change::AddTable(t.clone()),
            Change::ModifyTable { table, changes } => Change::ModifyTable {
                table: table.clone(),
                changes: reverse_all(changes),
            },
            Change::RenameTable { schema, from, to } => Change::RenameTable {
                schema: schema.clone(),
                from: to.clone(),
                to: from.clone(),
            },
            Change::AddColumn(c) => Change::DropColumn(c.clone()),
            Change::DropColumn(c) => Change::AddColumn(c.clone()),
            Change::ModifyColumn { from, to, change } => Change::ModifyColumn {
                from: to.clone(),
                to: from.clone(),
                change: *change,
            },
            Change::RenameColumn { from, to } => Change::RenameColumn {
                from: to.clone(),
                to: from.clone(),
            },
            Change::AddIndex(i) => Change::DropIndex(i.clone()),
            Change::DropIndex(i) => Change::AddIndex(i.clone()),
            Change::ModifyIndex { from, to, change } => Change::ModifyIndex {
                from: to.clone(),
                to: from.clone(),
                change: *change,
            },
            Change::RenameIndex { from, to } => Change::RenameIndex {
                from: to.clone(),
                to: from.clone(),
            },
            Change::AddPrimaryKey(i) => Change::DropPrimaryKey(i.clone()),
            Change::DropPrimaryKey(i) => Change::AddPrimaryKey(i.clone()),
            Change::ModifyPrimaryKey { from, to, change } => Change::ModifyPrimaryKey {
                from: to.clone(),
                to: from.clone(),
                change: *change,
            },
            Change::AddForeignKey(f) => Change::DropForeignKey(f.clone()),
            Change::DropForeignKey(f) => Change::AddForeignKey(f.clone()),
            Change::ModifyForeignKey { from, to, change } => Change::ModifyForeignKey {
                from: to.clone(),
                to: from.clone(),
                change: *change,
            },
            Change::AddCheck(c) => Change::DropCheck(c.clone()),
            Change::DropCheck(c) => Change::AddCheck(c.clone()),
            Change::ModifyCheck { from, to, change } => Change::ModifyCheck {
                from: to.clone(),
                to: from.clone(),
                change: *change,
            },
            Change::AddObject(o) => Change::DropObject(o.clone()),
            Change::DropObject(o) => Change::AddObject(o.clone()),
            Change::ModifyObject { from, to, change } => Change::ModifyObject {
                from: to.clone(),
                to: from.clone(),
                change: *change,
            },
            Change::AddAttr(a) => Change::DropAttr(a.clone()),
            Change::DropAttr(a) => Change::AddAttr(a.clone()),
            Change::ModifyAttr { from, to } => Change::ModifyAttr {
                from: to.clone(),
                to: from.clone(),
            },
            Change::Cascaded(c) => c.reverse(),
        }
    }
}

fn reverse_all(changes: &[Change]) -> Vec<Change> {
    changes.iter().rev().map(Change::reverse).collect()
}

impl fmt::Display for Change {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Change::AddSchema(s) => write!(f, "add schema {}", s.name),
            Change::DropSchema(s) => write!(f, "drop schema {}", s.name),
            Change::ModifySchema { schema, changes } => {
                write!(f, "modify schema {} ({} changes)", schema.name, changes.len())
            }
            Change::AddTable(t) => write!(f, "add table {}.{}", t.schema, t.name),
            Change::DropTable(t) => write!(f, "drop table {}.{}", t.schema, t.name),
            Change::ModifyTable { table, changes } => {
                write!(f, "modify table {}.{} (", table.schema, table.name)?;
                for (i, c) in changes.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{c}")?;
                }
                write!(f, ")")
            }
            Change::RenameTable { schema, from, to } => {
                write!(f, "rename table {schema}.{from} to {to}")
            }
            Change::AddColumn(c) => write!(f, "add column {}", c.name),
            Change::DropColumn(c) => write!(f, "drop column {}", c.name),
            Change::ModifyColumn { to, change, .. } => {
                write!(f, "modify column {} [{change}]", to.name)
            }
            Change::RenameColumn { from, to } => {
                write!(f, "rename column {} to {}", from.name, to.name)
            }
            Change::AddIndex(i) => write!(f, "add index {}", i.name),
            Change::DropIndex(i) => write!(f, "drop index {}", i.name),
            Change::ModifyIndex { to, change, .. } => {
                write!(f, "modify index {} [{change}]", to.name)
            }
            Change::RenameIndex { from, to } => {
                write!(f, "rename index {} to {}", from.name, to.name)
            }
            Change::AddPrimaryKey(_) => write!(f, "add primary key"),
            Change::DropPrimaryKey(_) => write!(f, "drop primary key"),
            Change::ModifyPrimaryKey { change, .. } => write!(f, "modify primary key [{change}]"),
            Change::AddForeignKey(k) => write!(f, "add foreign key {}", k.symbol),
            Change::DropForeignKey(k) => write!(f, "drop foreign key {}", k.symbol),
            Change::ModifyForeignKey { to, change, .. } => {
                write!(f, "modify foreign key {} [{change}]", to.symbol)
            }
            Change::AddCheck(c) => write!(f, "add check {}", c.name),
            Change::DropCheck(c) => write!(f, "drop check {}", c.name),
            Change::ModifyCheck { to, change, .. } => {
                write!(f, "modify check {} [{change}]", to.name)
            }
            Change::AddObject(o) => write!(f, "add {} {}.{}", o.kind(), o.schema(), o.name()),
            Change::DropObject(o) => write!(f, "drop {} {}.{}", o.kind(), o.schema(), o.name()),
            Change::ModifyObject { to, change, .. } => {
                write!(f, "modify {} {}.{} [{change}]", to.kind(), to.schema(), to.name())
            }
            Change::AddAttr(a) => write!(f, "add {}", a.key()),
            Change::DropAttr(a) => write!(f, "drop {}", a.key()),
            Change::ModifyAttr { to, .. } => write!(f, "modify {}", to.key()),
            Change::Cascaded(c) => write!(f, "{c} (cascaded)"),
        }
    }
}
