//! Indexes and primary keys
use super::attr::{self, Attr};

/// What an index part covers: a column of the owning table or a raw expression.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PartTarget {
    Column(String),
    Expr(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct IndexPart {
    /// Position of the part inside the index, starting at 1.
    pub seq: usize,
    pub target: PartTarget,
    pub desc: bool,
    /// Nulls ordering, operator class, collation.
    pub attrs: Vec<Attr>,
}

impl IndexPart {
    pub fn column(name: impl Into<String>) -> Self {
        Self {
            seq: 0,
            target: PartTarget::Column(name.into()),
            desc: false,
            attrs: Vec::new(),
        }
    }

    pub fn expr(expr: impl Into<String>) -> Self {
        Self {
            seq: 0,
            target: PartTarget::Expr(expr.into()),
            desc: false,
            attrs: Vec::new(),
        }
    }

    pub fn descending(mut self) -> Self {
        self.desc = true;
        self
    }

    pub fn with_attr(mut self, attr: Attr) -> Self {
        attr::set(&mut self.attrs, attr);
        self
    }

    pub fn column_name(&self) -> Option<&str> {
        match &self.target {
            PartTarget::Column(c) => Some(c.as_str()),
            PartTarget::Expr(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Index {
    pub name: String,
    pub unique: bool,
    /// Owning table (non-owning back reference by name).
    pub table: String,
    pub parts: Vec<IndexPart>,
    /// Index method, predicate, storage parameters, comment.
    pub attrs: Vec<Attr>,
}

impl Index {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            unique: false,
            table: String::new(),
            parts: Vec::new(),
            attrs: Vec::new(),
        }
    }

    pub fn unique(name: impl Into<String>) -> Self {
        Self {
            unique: true,
            ..Self::new(name)
        }
    }

    /// Index over the given columns, in order.
    pub fn on_columns<S: Into<String>>(mut self, columns: impl IntoIterator<Item = S>) -> Self {
        for c in columns {
            self = self.with_part(IndexPart::column(c));
        }
        self
    }

    pub fn with_part(mut self, mut part: IndexPart) -> Self {
        part.seq = self.parts.len() + 1;
        self.parts.push(part);
        self
    }

    pub fn with_attr(mut self, attr: Attr) -> Self {
        attr::set(&mut self.attrs, attr);
        self
    }

    /// Names of the columns referenced by column parts, in part order.
    pub fn column_names(&self) -> Vec<&str> {
        self.parts.iter().filter_map(|p| p.column_name()).collect()
    }

    pub fn has_expressions(&self) -> bool {
        self.parts
            .iter()
            .any(|p| matches!(p.target, PartTarget::Expr(_)))
    }

    pub fn comment(&self) -> Option<&str> {
        attr::comment(&self.attrs)
    }
}
