//! CREATE TABLE statements and column definitions

use crate::catalog::{Column, ColumnDefault, GeneratedKind, Table};
use crate::render::sql::constraint::{check_clause, foreign_key_clause, primary_key_clause};
use crate::render::{qualified, quote_ident};

pub fn default_sql(default: &ColumnDefault) -> &str {
    match default {
        ColumnDefault::Literal(s) | ColumnDefault::Raw(s) => s,
    }
}

/// Column definition as used by CREATE TABLE and ADD COLUMN.
pub fn column_definition(column: &Column) -> String {
    let mut def = format!("{} {}", quote_ident(&column.name), column.ty.ty);

    if let Some(charset) = column.charset() {
        def.push_str(&format!(" CHARACTER SET {}", charset));
    }
    if let Some(collation) = column.collation() {
        def.push_str(&format!(" COLLATE {}", quote_ident(collation)));
    }

    // Generated expression comes before default and not null
    if let Some(generated) = &column.generated {
        let kind = match generated.kind {
            GeneratedKind::Stored => "STORED",
            GeneratedKind::Virtual => "VIRTUAL",
        };
        def.push_str(&format!(" GENERATED ALWAYS AS ({}) {}", generated.expr, kind));
    }

    if let Some(identity) = column.identity() {
        def.push_str(&format!(
            " GENERATED {} AS IDENTITY (START WITH {} INCREMENT BY {})",
            identity.generation, identity.start, identity.increment
        ));
    }

    if let Some(default) = &column.default {
        def.push_str(&format!(" DEFAULT {}", default_sql(default)));
    }

    if !column.ty.null {
        def.push_str(" NOT NULL");
    }

    def
}

/// Render a complete CREATE TABLE statement: columns, then the primary key, foreign
/// keys and checks as table constraints. Indexes and comments are separate statements.
pub fn render_create_table(table: &Table) -> String {
    let mut definitions: Vec<String> = table
        .columns
        .iter()
        .map(|c| format!("    {}", column_definition(c)))
        .collect();

    if let Some(pk) = &table.primary_key {
        definitions.push(format!("    {}", primary_key_clause(pk)));
    }
    for fk in &table.foreign_keys {
        definitions.push(format!("    {}", foreign_key_clause(fk, &table.schema)));
    }
    for check in &table.checks {
        definitions.push(format!("    {}", check_clause(check)));
    }

    format!(
        "CREATE TABLE {} (\n{}\n);",
        qualified(&table.schema, &table.name),
        definitions.join(",\n")
    )
}
