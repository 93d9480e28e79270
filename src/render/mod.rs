//! Render contract between the plan assembler and a dialect.
//!
//! A [`ChangeRenderer`] turns one ordered [`Change`] into forward actions and, when the
//! inverse can be expressed, reverse actions. An optional [`Annotator`] attaches
//! execution hints to a change before it is rendered; hints never alter what the
//! change does structurally.

pub mod sql;

pub use sql::AnsiRenderer;

use crate::diff::Change;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Safety {
    Safe,
    Destructive,
}

/// One executable statement.
#[derive(Debug, Clone, PartialEq)]
pub struct Action {
    pub safety: Safety,
    pub sql: String,
}

impl Action {
    pub fn new(sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            safety: Safety::Safe,
        }
    }

    pub fn destructive(sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            safety: Safety::Destructive,
        }
    }
}

/// Result of rendering one change.
#[derive(Debug, Clone, PartialEq)]
pub struct Rendered {
    pub forward: Vec<Action>,
    /// `None` when the change cannot be undone structurally.
    pub reverse: Option<Vec<Action>>,
    pub description: String,
}

impl Rendered {
    pub fn new(description: impl Into<String>, forward: Vec<Action>) -> Self {
        Self {
            forward,
            reverse: None,
            description: description.into(),
        }
    }

    pub fn with_reverse(mut self, reverse: Vec<Action>) -> Self {
        self.reverse = Some(reverse);
        self
    }

    pub fn is_reversible(&self) -> bool {
        self.reverse.is_some()
    }
}

/// Engine-specific execution hint attached to a change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Hint {
    /// Build indexes without blocking writers.
    Concurrent,
    /// Take an explicit table lock of the given mode first.
    Lock(String),
    Custom { key: String, value: String },
}

/// Attaches hints to changes before rendering.
pub trait Annotator: Send + Sync {
    fn annotate(&self, change: &Change) -> Vec<Hint>;
}

impl<F> Annotator for F
where
    F: Fn(&Change) -> Vec<Hint> + Send + Sync,
{
    fn annotate(&self, change: &Change) -> Vec<Hint> {
        self(change)
    }
}

/// Dialect collaborator producing statements for changes.
pub trait ChangeRenderer {
    fn render(&self, change: &Change, hints: &[Hint]) -> anyhow::Result<Rendered>;

    /// Whether the rendered change must run outside a transaction.
    fn requires_no_transaction(&self, _change: &Change, _hints: &[Hint]) -> bool {
        false
    }
}

pub fn quote_ident(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}

pub fn escape_string(s: &str) -> String {
    format!("'{}'", s.replace('\'', "''"))
}

/// `schema.name`, quoted. An empty schema is left out.
pub fn qualified(schema: &str, name: &str) -> String {
    if schema.is_empty() {
        quote_ident(name)
    } else {
        format!("{}.{}", quote_ident(schema), quote_ident(name))
    }
}

/// COMMENT ON statement setting or clearing a comment
pub fn render_comment_sql(object_type: &str, identifier: &str, comment: Option<&str>) -> Action {
    let sql = match comment {
        Some(text) => format!(
            "COMMENT ON {} {} IS {};",
            object_type,
            identifier,
            escape_string(text)
        ),
        None => format!("COMMENT ON {} {} IS NULL;", object_type, identifier),
    };
    Action::new(sql)
}
