//! Foreign keys and referential actions
use std::fmt;

use super::attr::{self, Attr};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReferenceAction {
    NoAction,
    Restrict,
    Cascade,
    SetNull,
    SetDefault,
}

impl ReferenceAction {
    /// Parse an inspected rule. An empty rule is "unspecified" and yields `None`.
    pub fn from_sql(rule: &str) -> Option<Self> {
        match rule.trim().to_ascii_uppercase().as_str() {
            "NO ACTION" => Some(ReferenceAction::NoAction),
            "RESTRICT" => Some(ReferenceAction::Restrict),
            "CASCADE" => Some(ReferenceAction::Cascade),
            "SET NULL" => Some(ReferenceAction::SetNull),
            "SET DEFAULT" => Some(ReferenceAction::SetDefault),
            _ => None,
        }
    }

    /// Unspecified rules behave as `NO ACTION`.
    pub fn or_default(action: Option<Self>) -> Self {
        action.unwrap_or(ReferenceAction::NoAction)
    }
}

impl fmt::Display for ReferenceAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ReferenceAction::NoAction => "NO ACTION",
            ReferenceAction::Restrict => "RESTRICT",
            ReferenceAction::Cascade => "CASCADE",
            ReferenceAction::SetNull => "SET NULL",
            ReferenceAction::SetDefault => "SET DEFAULT",
        };
        write!(f, "{s}")
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ForeignKey {
    pub symbol: String,
    /// Owning table (non-owning back reference by name).
    pub table: String,
    pub columns: Vec<String>,
    /// Schema of the referenced table, `None` for the owning table's schema.
    pub ref_schema: Option<String>,
    pub ref_table: String,
    /// Positionally paired with `columns`.
    pub ref_columns: Vec<String>,
    pub on_update: Option<ReferenceAction>,
    pub on_delete: Option<ReferenceAction>,
    pub attrs: Vec<Attr>,
}

impl ForeignKey {
    pub fn new<S: Into<String>>(
        symbol: impl Into<String>,
        columns: impl IntoIterator<Item = S>,
        ref_table: impl Into<String>,
        ref_columns: impl IntoIterator<Item = S>,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            table: String::new(),
            columns: columns.into_iter().map(Into::into).collect(),
            ref_schema: None,
            ref_table: ref_table.into(),
            ref_columns: ref_columns.into_iter().map(Into::into).collect(),
            on_update: None,
            on_delete: None,
            attrs: Vec::new(),
        }
    }

    pub fn in_ref_schema(mut self, schema: impl Into<String>) -> Self {
        self.ref_schema = Some(schema.into());
        self
    }

    pub fn on_delete(mut self, action: ReferenceAction) -> Self {
        self.on_delete = Some(action);
        self
    }

    pub fn on_update(mut self, action: ReferenceAction) -> Self {
        self.on_update = Some(action);
        self
    }

    pub fn with_attr(mut self, attr: Attr) -> Self {
        attr::set(&mut self.attrs, attr);
        self
    }

    /// Referenced schema, falling back to the schema of the owning table.
    pub fn ref_schema_or<'a>(&'a self, owner_schema: &'a str) -> &'a str {
        self.ref_schema.as_deref().unwrap_or(owner_schema)
    }

    /// Whether the key points back at its own table.
    pub fn is_self_reference(&self, owner_schema: &str) -> bool {
        self.ref_table == self.table && self.ref_schema_or(owner_schema) == owner_schema
    }

    pub fn is_system_named(&self) -> bool {
        self.symbol.is_empty() || attr::has(&self.attrs, &attr::AttrKey::SystemNamed)
    }
}
