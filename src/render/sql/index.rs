//! CREATE INDEX statements

use crate::catalog::attr::{self, AttrKey};
use crate::catalog::{Attr, Index, IndexPart, NullsOrder, PartTarget};
use crate::render::{qualified, quote_ident};

/// One key part: column or parenthesized expression, then collation, operator class,
/// direction and a nulls ordering that differs from the direction's default.
pub fn part_sql(part: &IndexPart) -> String {
    let mut spec = match &part.target {
        PartTarget::Column(name) => quote_ident(name),
        PartTarget::Expr(expr) => format!("({})", expr),
    };

    for a in &part.attrs {
        match a {
            Attr::Collation(c) => spec.push_str(&format!(" COLLATE {}", quote_ident(c))),
            Attr::OpClass(op) => spec.push_str(&format!(" {}", op)),
            _ => {}
        }
    }

    if part.desc {
        spec.push_str(" DESC");
    }

    let default_nulls = if part.desc {
        NullsOrder::First
    } else {
        NullsOrder::Last
    };
    if let Some(Attr::NullsOrder(nulls)) = attr::find(&part.attrs, &AttrKey::NullsOrder)
        && *nulls != default_nulls
    {
        spec.push_str(&format!(" {}", nulls));
    }

    spec
}

/// Render a complete CREATE INDEX statement for an index of `schema.table`.
pub fn render_create_index(schema: &str, table: &str, index: &Index, concurrent: bool) -> String {
    let mut sql = String::from("CREATE ");
    if index.unique {
        sql.push_str("UNIQUE ");
    }
    sql.push_str("INDEX ");
    if concurrent {
        sql.push_str("CONCURRENTLY ");
    }
    sql.push_str(&quote_ident(&index.name));
    sql.push_str(" ON ");
    sql.push_str(&qualified(schema, table));

    if let Some(Attr::IndexType(method)) = attr::find(&index.attrs, &AttrKey::IndexType) {
        sql.push_str(&format!(" USING {}", method));
    }

    let parts: Vec<String> = index.parts.iter().map(part_sql).collect();
    sql.push_str(&format!(" ({})", parts.join(", ")));

    for a in &index.attrs {
        match a {
            Attr::IndexInclude(columns) if !columns.is_empty() => {
                let columns: Vec<String> = columns.iter().map(|c| quote_ident(c)).collect();
                sql.push_str(&format!(" INCLUDE ({})", columns.join(", ")));
            }
            Attr::StorageParams(params) if !params.is_empty() => {
                let params: Vec<String> =
                    params.iter().map(|(k, v)| format!("{} = {}", k, v)).collect();
                sql.push_str(&format!(" WITH ({})", params.join(", ")));
            }
            _ => {}
        }
    }

    if let Some(Attr::IndexPredicate(predicate)) = attr::find(&index.attrs, &AttrKey::IndexPredicate)
    {
        sql.push_str(&format!(" WHERE {}", predicate));
    }

    sql.push(';');
    sql
}

pub fn render_drop_index(schema: &str, index: &Index, concurrent: bool) -> String {
    let concurrently = if concurrent { "CONCURRENTLY " } else { "" };
    format!("DROP INDEX {}{};", concurrently, qualified(schema, &index.name))
}
