//! Reference renderer producing generic ANSI-style DDL.
//!
//! Every change kind of the generic model is rendered. Dialect objects and dialect
//! attributes carry payloads this renderer knows nothing about, so they fail with a
//! render error instead of producing guessed SQL.

pub mod constraint;
pub mod index;
pub mod table;

pub use constraint::{render_add_constraint, render_drop_constraint};
pub use index::{render_create_index, render_drop_index};
pub use table::{column_definition, render_create_table};

use anyhow::{Context, bail};
use tracing::debug;

use crate::catalog::attr::{AttrKey, has};
use crate::catalog::{Attr, Column, Object, Table};
use crate::diff::{Change, ChangeKind};
use crate::render::sql::constraint::{check_clause, foreign_key_clause, primary_key_clause};
use crate::render::sql::table::default_sql;
use crate::render::{
    Action, ChangeRenderer, Hint, Rendered, escape_string, qualified, quote_ident,
    render_comment_sql,
};

#[derive(Debug, Clone, Copy, Default)]
pub struct AnsiRenderer;

impl AnsiRenderer {
    pub fn new() -> Self {
        Self
    }

    fn actions(&self, change: &Change, hints: &[Hint]) -> anyhow::Result<Vec<Action>> {
        match change {
            Change::AddSchema(s) => {
                let mut out = vec![Action::new(format!("CREATE SCHEMA {};", quote_ident(&s.name)))];
                if let Some(comment) = s.comment() {
                    out.push(render_comment_sql("SCHEMA", &quote_ident(&s.name), Some(comment)));
                }
                Ok(out)
            }
            Change::DropSchema(s) => Ok(vec![Action::destructive(format!(
                "DROP SCHEMA {};",
                quote_ident(&s.name)
            ))]),
            Change::ModifySchema { schema, changes } => {
                let ident = quote_ident(&schema.name);
                let mut out = Vec::new();
                for c in changes {
                    out.extend(attr_actions("SCHEMA", &ident, c)?);
                }
                Ok(out)
            }

            Change::AddTable(t) => Ok(create_table(t)),
            Change::DropTable(t) => Ok(vec![Action::destructive(format!(
                "DROP TABLE {};",
                qualified(&t.schema, &t.name)
            ))]),
            Change::RenameTable { schema, from, to } => Ok(vec![Action::new(format!(
                "ALTER TABLE {} RENAME TO {};",
                qualified(schema, from),
                quote_ident(to)
            ))]),
            Change::ModifyTable { table, changes } => {
                let ident = qualified(&table.schema, &table.name);
                let mut out = Vec::new();
                for hint in hints {
                    match hint {
                        Hint::Lock(mode) => {
                            out.push(Action::new(format!("LOCK TABLE {} IN {} MODE;", ident, mode)))
                        }
                        Hint::Custom { key, .. } => debug!("Ignoring hint {} for {}", key, ident),
                        Hint::Concurrent => {}
                    }
                }
                for c in changes {
                    let actions = table_change(table, &ident, c, hints)
                        .with_context(|| format!("failed to render {} on {}", c, ident))?;
                    out.extend(actions);
                }
                Ok(out)
            }

            Change::AddObject(_) | Change::DropObject(_) | Change::ModifyObject { .. } => {
                object_actions(change)
            }

            Change::AddAttr(_) | Change::DropAttr(_) | Change::ModifyAttr { .. } => {
                bail!("realm attribute changes are not supported by the ANSI renderer")
            }

            other => bail!("{} is only valid inside a table change", other),
        }
    }
}

impl ChangeRenderer for AnsiRenderer {
    fn render(&self, change: &Change, hints: &[Hint]) -> anyhow::Result<Rendered> {
        let rendered = Rendered::new(change.to_string(), self.actions(change, hints)?);
        if !reversible(change) {
            return Ok(rendered);
        }
        match self.actions(&change.reverse(), &[]) {
            Ok(reverse) => Ok(rendered.with_reverse(reverse)),
            Err(e) => {
                debug!("No reverse for {}: {:#}", change, e);
                Ok(rendered)
            }
        }
    }

    fn requires_no_transaction(&self, change: &Change, hints: &[Hint]) -> bool {
        let concurrent_build = hints.contains(&Hint::Concurrent)
            && change.children().iter().any(|c| {
                matches!(
                    c,
                    Change::AddIndex(_) | Change::DropIndex(_) | Change::ModifyIndex { .. }
                )
            });
        // ALTER TYPE ... ADD VALUE
        let enum_values = matches!(
            change,
            Change::ModifyObject { change, .. } if change.is(ChangeKind::VALUES)
        );
        concurrent_build || enum_values
    }
}

/// Whether the inverse of `change` restores the previous state exactly.
fn reversible(change: &Change) -> bool {
    let system_named = |attrs: &[Attr]| has(attrs, &AttrKey::SystemNamed);
    match change {
        Change::DropForeignKey(fk) | Change::ModifyForeignKey { from: fk, .. } => {
            !fk.is_system_named()
        }
        Change::DropCheck(c) | Change::ModifyCheck { from: c, .. } => {
            !c.name.is_empty() && !system_named(&c.attrs)
        }
        Change::DropIndex(i)
        | Change::ModifyIndex { from: i, .. }
        | Change::DropPrimaryKey(i)
        | Change::ModifyPrimaryKey { from: i, .. } => !system_named(&i.attrs),
        // the previous expression's data cannot be recomputed
        Change::ModifyColumn { change, .. } => !change.is(ChangeKind::GENERATED),
        // enum values cannot be removed
        Change::ModifyObject { change, .. } => !change.is(ChangeKind::VALUES),
        Change::ModifyTable { changes, .. } | Change::ModifySchema { changes, .. } => {
            changes.iter().all(reversible)
        }
        Change::Cascaded(inner) => reversible(inner),
        _ => true,
    }
}

fn create_table(t: &Table) -> Vec<Action> {
    let ident = qualified(&t.schema, &t.name);
    let mut out = vec![Action::new(render_create_table(t))];
    for index in &t.indexes {
        out.push(Action::new(render_create_index(&t.schema, &t.name, index, false)));
    }
    if let Some(comment) = t.comment() {
        out.push(render_comment_sql("TABLE", &ident, Some(comment)));
    }
    for column in &t.columns {
        if let Some(comment) = column.comment() {
            let target = format!("{}.{}", ident, quote_ident(&column.name));
            out.push(render_comment_sql("COLUMN", &target, Some(comment)));
        }
    }
    for index in &t.indexes {
        if let Some(comment) = index.comment() {
            out.push(render_comment_sql("INDEX", &qualified(&t.schema, &index.name), Some(comment)));
        }
    }
    out
}

fn table_change(
    table: &Table,
    ident: &str,
    change: &Change,
    hints: &[Hint],
) -> anyhow::Result<Vec<Action>> {
    let concurrent = hints.contains(&Hint::Concurrent);
    let index_comment = |index: &crate::catalog::Index| {
        render_comment_sql("INDEX", &qualified(&table.schema, &index.name), index.comment())
    };

    let actions = match change {
        Change::AddColumn(col) => {
            let mut out = vec![Action::new(format!(
                "ALTER TABLE {} ADD COLUMN {};",
                ident,
                column_definition(col)
            ))];
            if let Some(comment) = col.comment() {
                out.push(column_comment(ident, col, Some(comment)));
            }
            out
        }
        Change::DropColumn(col) => vec![Action::destructive(format!(
            "ALTER TABLE {} DROP COLUMN {};",
            ident,
            quote_ident(&col.name)
        ))],
        Change::RenameColumn { from, to } => vec![Action::new(format!(
            "ALTER TABLE {} RENAME COLUMN {} TO {};",
            ident,
            quote_ident(&from.name),
            quote_ident(&to.name)
        ))],
        Change::ModifyColumn { from, to, change } => alter_column(ident, from, to, *change)?,

        Change::AddIndex(index) => {
            let mut out = vec![Action::new(render_create_index(
                &table.schema,
                &table.name,
                index,
                concurrent,
            ))];
            if index.comment().is_some() {
                out.push(index_comment(index));
            }
            out
        }
        Change::DropIndex(index) => {
            vec![Action::new(render_drop_index(&table.schema, index, concurrent))]
        }
        Change::ModifyIndex { from, to, change } => {
            if *change == ChangeKind::COMMENT {
                vec![index_comment(to)]
            } else {
                let mut out = vec![
                    Action::new(render_drop_index(&table.schema, from, concurrent)),
                    Action::new(render_create_index(&table.schema, &table.name, to, concurrent)),
                ];
                if to.comment().is_some() {
                    out.push(index_comment(to));
                }
                out
            }
        }
        Change::RenameIndex { from, to } => vec![Action::new(format!(
            "ALTER INDEX {} RENAME TO {};",
            qualified(&table.schema, &from.name),
            quote_ident(&to.name)
        ))],

        Change::AddPrimaryKey(pk) => vec![Action::new(render_add_constraint(
            ident,
            &primary_key_clause(pk),
        ))],
        Change::DropPrimaryKey(pk) => vec![drop_primary_key(ident, &pk.name)],
        Change::ModifyPrimaryKey { from, to, .. } => vec![
            drop_primary_key(ident, &from.name),
            Action::new(render_add_constraint(ident, &primary_key_clause(to))),
        ],

        Change::AddForeignKey(fk) => vec![Action::new(render_add_constraint(
            ident,
            &foreign_key_clause(fk, &table.schema),
        ))],
        Change::DropForeignKey(fk) => vec![drop_constraint(ident, "foreign key", &fk.symbol)?],
        Change::ModifyForeignKey { from, to, .. } => vec![
            drop_constraint(ident, "foreign key", &from.symbol)?,
            Action::new(render_add_constraint(
                ident,
                &foreign_key_clause(to, &table.schema),
            )),
        ],

        Change::AddCheck(check) => {
            vec![Action::new(render_add_constraint(ident, &check_clause(check)))]
        }
        Change::DropCheck(check) => vec![drop_constraint(ident, "check", &check.name)?],
        Change::ModifyCheck { from, to, .. } => vec![
            drop_constraint(ident, "check", &from.name)?,
            Action::new(render_add_constraint(ident, &check_clause(to))),
        ],

        Change::AddAttr(_) | Change::DropAttr(_) | Change::ModifyAttr { .. } => {
            attr_actions("TABLE", ident, change)?
        }

        // the column drop takes it along
        Change::Cascaded(_) => Vec::new(),

        other => bail!("{} cannot appear inside a table change", other),
    };
    Ok(actions)
}

fn column_comment(table: &str, column: &Column, comment: Option<&str>) -> Action {
    let target = format!("{}.{}", table, quote_ident(&column.name));
    render_comment_sql("COLUMN", &target, comment)
}

fn drop_primary_key(table: &str, name: &str) -> Action {
    if name.is_empty() {
        Action::new(format!("ALTER TABLE {} DROP PRIMARY KEY;", table))
    } else {
        Action::new(render_drop_constraint(table, name))
    }
}

fn drop_constraint(table: &str, kind: &str, name: &str) -> anyhow::Result<Action> {
    if name.is_empty() {
        bail!("cannot drop unnamed {} on {}", kind, table);
    }
    Ok(Action::new(render_drop_constraint(table, name)))
}

fn alter_column(
    table: &str,
    from: &Column,
    to: &Column,
    change: ChangeKind,
) -> anyhow::Result<Vec<Action>> {
    let column = quote_ident(&to.name);
    let alter = |clause: String| Action::new(format!("ALTER TABLE {} ALTER COLUMN {} {};", table, column, clause));

    // A generation expression cannot be altered in place
    if change.is(ChangeKind::GENERATED) {
        let mut out = vec![
            Action::destructive(format!("ALTER TABLE {} DROP COLUMN {};", table, column)),
            Action::new(format!("ALTER TABLE {} ADD COLUMN {};", table, column_definition(to))),
        ];
        if let Some(comment) = to.comment() {
            out.push(column_comment(table, to, Some(comment)));
        }
        return Ok(out);
    }

    if change.is(ChangeKind::ATTR) {
        bail!("dialect attributes of column {} cannot be rendered", to.name);
    }

    let mut out = Vec::new();
    if change.intersects(ChangeKind::TYPE | ChangeKind::CHARSET | ChangeKind::COLLATE) {
        let mut clause = format!("TYPE {}", to.ty.ty);
        if let Some(charset) = to.charset() {
            clause.push_str(&format!(" CHARACTER SET {}", charset));
        }
        if let Some(collation) = to.collation() {
            clause.push_str(&format!(" COLLATE {}", quote_ident(collation)));
        }
        out.push(alter(clause));
    }
    if change.is(ChangeKind::NULL) {
        out.push(alter(if to.ty.null {
            "DROP NOT NULL".to_string()
        } else {
            "SET NOT NULL".to_string()
        }));
    }
    if change.is(ChangeKind::DEFAULT) {
        out.push(alter(match &to.default {
            Some(default) => format!("SET DEFAULT {}", default_sql(default)),
            None => "DROP DEFAULT".to_string(),
        }));
    }
    if change.is(ChangeKind::IDENTITY) {
        match (from.identity(), to.identity()) {
            (None, Some(identity)) => out.push(alter(format!(
                "ADD GENERATED {} AS IDENTITY (START WITH {} INCREMENT BY {})",
                identity.generation, identity.start, identity.increment
            ))),
            (Some(_), None) => out.push(alter("DROP IDENTITY".to_string())),
            (Some(_), Some(identity)) => out.push(alter(format!(
                "SET GENERATED {} SET START WITH {} SET INCREMENT BY {}",
                identity.generation, identity.start, identity.increment
            ))),
            (None, None) => {}
        }
    }
    if change.is(ChangeKind::COMMENT) {
        out.push(column_comment(table, to, to.comment()));
    }
    Ok(out)
}

/// Comment changes on a schema or table. Other attributes are dialect territory.
fn attr_actions(object_type: &str, ident: &str, change: &Change) -> anyhow::Result<Vec<Action>> {
    let action = match change {
        Change::AddAttr(Attr::Comment(text)) | Change::ModifyAttr { to: Attr::Comment(text), .. } => {
            render_comment_sql(object_type, ident, Some(text))
        }
        Change::DropAttr(Attr::Comment(_)) => render_comment_sql(object_type, ident, None),
        Change::AddAttr(a) | Change::DropAttr(a) | Change::ModifyAttr { to: a, .. } => {
            bail!("{} of {} {} is not supported by the ANSI renderer", a.key(), object_type.to_lowercase(), ident)
        }
        other => bail!("{} is not an attribute change", other),
    };
    Ok(vec![action])
}

fn object_actions(change: &Change) -> anyhow::Result<Vec<Action>> {
    let actions = match change {
        Change::AddObject(Object::Enum { schema, name, values }) => {
            let values: Vec<String> = values.iter().map(|v| escape_string(v)).collect();
            vec![Action::new(format!(
                "CREATE TYPE {} AS ENUM ({});",
                qualified(schema, name),
                values.join(", ")
            ))]
        }
        Change::DropObject(Object::Enum { schema, name, .. }) => {
            vec![Action::new(format!("DROP TYPE {};", qualified(schema, name)))]
        }
        Change::ModifyObject {
            from: Object::Enum { values: old, .. },
            to: Object::Enum { schema, name, values: new },
            ..
        } => alter_enum(&qualified(schema, name), old, new)?,
        Change::AddObject(o) | Change::DropObject(o) | Change::ModifyObject { to: o, .. } => {
            bail!(
                "{} {}.{} is not supported by the ANSI renderer",
                o.kind(),
                o.schema(),
                o.name()
            )
        }
        other => bail!("{} is not an object change", other),
    };
    Ok(actions)
}

/// ADD VALUE statements turning `old` into `new`. Existing values must survive in their
/// original order.
fn alter_enum(ident: &str, old: &[String], new: &[String]) -> anyhow::Result<Vec<Action>> {
    let kept: Vec<&String> = new.iter().filter(|v| old.contains(v)).collect();
    if kept.len() != old.len() || kept.iter().zip(old).any(|(a, b)| *a != b) {
        bail!("enum {} drops or reorders values, which cannot be altered in place", ident);
    }

    let mut out = Vec::new();
    let mut previous: Option<&String> = None;
    for value in new {
        if !old.contains(value) {
            let position = match (previous, old.first()) {
                (Some(p), _) => format!(" AFTER {}", escape_string(p)),
                (None, Some(first)) => format!(" BEFORE {}", escape_string(first)),
                (None, None) => String::new(),
            };
            out.push(Action::new(format!(
                "ALTER TYPE {} ADD VALUE {}{};",
                ident,
                escape_string(value),
                position
            )));
        }
        previous = Some(value);
    }
    Ok(out)
}
