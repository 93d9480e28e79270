//! Table constraint clauses: primary keys, foreign keys and checks

use crate::catalog::attr::{self, AttrKey};
use crate::catalog::{Check, ForeignKey, Index, ReferenceAction};
use crate::render::sql::index::part_sql;
use crate::render::{qualified, quote_ident};

fn constraint_prefix(name: &str) -> String {
    if name.is_empty() {
        String::new()
    } else {
        format!("CONSTRAINT {} ", quote_ident(name))
    }
}

fn column_list(columns: &[String]) -> String {
    columns
        .iter()
        .map(|c| quote_ident(c))
        .collect::<Vec<_>>()
        .join(", ")
}

pub fn primary_key_clause(pk: &Index) -> String {
    let parts: Vec<String> = pk.parts.iter().map(part_sql).collect();
    format!(
        "{}PRIMARY KEY ({})",
        constraint_prefix(&pk.name),
        parts.join(", ")
    )
}

/// FOREIGN KEY clause. The referenced table is always schema-qualified, falling back to
/// `owner_schema`.
pub fn foreign_key_clause(fk: &ForeignKey, owner_schema: &str) -> String {
    let mut sql = format!(
        "{}FOREIGN KEY ({}) REFERENCES {} ({})",
        constraint_prefix(&fk.symbol),
        column_list(&fk.columns),
        qualified(fk.ref_schema_or(owner_schema), &fk.ref_table),
        column_list(&fk.ref_columns)
    );

    // NO ACTION is implied
    if let Some(action) = fk.on_update.filter(|a| *a != ReferenceAction::NoAction) {
        sql.push_str(&format!(" ON UPDATE {}", action));
    }
    if let Some(action) = fk.on_delete.filter(|a| *a != ReferenceAction::NoAction) {
        sql.push_str(&format!(" ON DELETE {}", action));
    }
    sql
}

pub fn check_clause(check: &Check) -> String {
    let mut sql = format!("{}CHECK ({})", constraint_prefix(&check.name), check.expr);
    if attr::has(&check.attrs, &AttrKey::NoInherit) {
        sql.push_str(" NO INHERIT");
    }
    if attr::has(&check.attrs, &AttrKey::NotEnforced) {
        sql.push_str(" NOT ENFORCED");
    }
    sql
}

pub fn render_add_constraint(table: &str, clause: &str) -> String {
    format!("ALTER TABLE {} ADD {};", table, clause)
}

pub fn render_drop_constraint(table: &str, name: &str) -> String {
    format!("ALTER TABLE {} DROP CONSTRAINT {};", table, quote_ident(name))
}
