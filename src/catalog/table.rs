//! Tables and columns
use super::attr::{self, Attr, Identity};
use super::check::Check;
use super::foreign_key::ForeignKey;
use super::id::ObjectId;
use super::index::Index;
use super::types::{ColumnType, Type};

#[derive(Debug, Clone, PartialEq)]
pub enum ColumnDefault {
    /// A literal value such as `0`, `'active'` or `true`.
    Literal(String),
    /// A raw SQL expression such as `now()` or `'x'::text`.
    Raw(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeneratedKind {
    Stored,
    Virtual,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedExpr {
    pub expr: String,
    pub kind: GeneratedKind,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub ty: ColumnType,
    pub default: Option<ColumnDefault>,
    pub generated: Option<GeneratedExpr>,
    /// Comment, charset, collation, identity and dialect attributes.
    pub attrs: Vec<Attr>,
    /// Names of the indexes covering this column. Populated when indexes are attached to
    /// the table; never consulted by the differ.
    pub indexes: Vec<String>,
}

impl Column {
    pub fn new(name: impl Into<String>, ty: ColumnType) -> Self {
        Self {
            name: name.into(),
            ty,
            default: None,
            generated: None,
            attrs: Vec::new(),
            indexes: Vec::new(),
        }
    }

    /// Non-null column of the given type.
    pub fn of(name: impl Into<String>, ty: Type) -> Self {
        Self::new(name, ColumnType::new(ty))
    }

    /// Nullable column of the given type.
    pub fn nullable(name: impl Into<String>, ty: Type) -> Self {
        Self::new(name, ColumnType::nullable(ty))
    }

    pub fn with_default(mut self, default: ColumnDefault) -> Self {
        self.default = Some(default);
        self
    }

    pub fn with_generated(mut self, expr: impl Into<String>, kind: GeneratedKind) -> Self {
        self.generated = Some(GeneratedExpr {
            expr: expr.into(),
            kind,
        });
        self
    }

    pub fn with_attr(mut self, attr: Attr) -> Self {
        attr::set(&mut self.attrs, attr);
        self
    }

    pub fn comment(&self) -> Option<&str> {
        attr::comment(&self.attrs)
    }

    pub fn charset(&self) -> Option<&str> {
        attr::charset(&self.attrs)
    }

    pub fn collation(&self) -> Option<&str> {
        attr::collation(&self.attrs)
    }

    pub fn identity(&self) -> Option<&Identity> {
        attr::identity(&self.attrs)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    /// Owning schema (non-owning back reference by name).
    pub schema: String,
    pub name: String,
    pub columns: Vec<Column>,
    pub primary_key: Option<Index>,
    pub indexes: Vec<Index>,
    pub foreign_keys: Vec<ForeignKey>,
    pub checks: Vec<Check>,
    pub attrs: Vec<Attr>,
}

impl Table {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            schema: String::new(),
            name: name.into(),
            columns: Vec::new(),
            primary_key: None,
            indexes: Vec::new(),
            foreign_keys: Vec::new(),
            checks: Vec::new(),
            attrs: Vec::new(),
        }
    }

    pub fn id(&self) -> ObjectId {
        ObjectId::Table {
            schema: self.schema.clone(),
            name: self.name.clone(),
        }
    }

    pub fn in_schema(mut self, schema: impl Into<String>) -> Self {
        self.schema = schema.into();
        self
    }

    pub fn with_column(mut self, column: Column) -> Self {
        self.columns.push(column);
        self
    }

    pub fn with_columns(mut self, columns: impl IntoIterator<Item = Column>) -> Self {
        self.columns.extend(columns);
        self
    }

    pub fn with_primary_key(mut self, mut pk: Index) -> Self {
        pk.table = self.name.clone();
        pk.unique = true;
        self.link_index(&pk.name, &key_columns(&pk));
        self.primary_key = Some(pk);
        self
    }

    pub fn with_index(mut self, mut index: Index) -> Self {
        index.table = self.name.clone();
        self.link_index(&index.name, &key_columns(&index));
        self.indexes.push(index);
        self
    }

    pub fn with_foreign_key(mut self, mut fk: ForeignKey) -> Self {
        fk.table = self.name.clone();
        self.foreign_keys.push(fk);
        self
    }

    pub fn with_check(mut self, mut check: Check) -> Self {
        check.table = self.name.clone();
        self.checks.push(check);
        self
    }

    pub fn with_attr(mut self, attr: Attr) -> Self {
        attr::set(&mut self.attrs, attr);
        self
    }

    fn link_index(&mut self, index: &str, columns: &[String]) {
        for name in columns {
            if let Some(col) = self.columns.iter_mut().find(|c| &c.name == name)
                && !col.indexes.iter().any(|i| i == index)
            {
                col.indexes.push(index.to_string());
            }
        }
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn index(&self, name: &str) -> Option<&Index> {
        self.indexes.iter().find(|i| i.name == name)
    }

    pub fn foreign_key(&self, symbol: &str) -> Option<&ForeignKey> {
        self.foreign_keys.iter().find(|f| f.symbol == symbol)
    }

    pub fn check(&self, name: &str) -> Option<&Check> {
        self.checks.iter().find(|c| c.name == name)
    }

    pub fn comment(&self) -> Option<&str> {
        attr::comment(&self.attrs)
    }

    /// Whether `columns` are exactly the key columns of the primary key or of a unique
    /// index declared on this table.
    pub fn has_key_on(&self, columns: &[String]) -> bool {
        let matches = |idx: &Index| {
            !idx.has_expressions()
                && idx.column_names().len() == columns.len()
                && idx
                    .column_names()
                    .iter()
                    .zip(columns)
                    .all(|(a, b)| *a == b.as_str())
        };
        self.primary_key.as_ref().is_some_and(matches)
            || self.indexes.iter().filter(|i| i.unique).any(matches)
    }

    /// Enum types used by any column, as `(schema, name)` resolved against this table's schema.
    pub fn enum_refs(&self) -> Vec<(String, String)> {
        self.columns
            .iter()
            .filter_map(|c| c.ty.ty.enum_ref())
            .map(|(schema, name)| {
                (
                    schema.unwrap_or(&self.schema).to_string(),
                    name.to_string(),
                )
            })
            .collect()
    }
}

fn key_columns(index: &Index) -> Vec<String> {
    index.column_names().into_iter().map(String::from).collect()
}
