//! Schema model: the typed description of a database structure that both the "current"
//! and the "desired" side of a diff are expressed in.
//!
//! Ownership always runs parent to child: a [`Realm`] owns its [`Schema`]s, a schema owns
//! its [`Table`]s and [`Object`]s, a table owns its columns, indexes, foreign keys and
//! checks. Back references (table → schema, index → table, column → indexes) are names
//! resolved through the lookup helpers, never owning pointers. The model is read-only
//! once handed to the differ.

pub mod attr;
pub mod check;
pub mod foreign_key;
pub mod id;
pub mod index;
pub mod schema;
pub mod table;
pub mod types;

pub use attr::{Attr, AttrKey, Identity, NullsOrder};
pub use check::Check;
pub use foreign_key::{ForeignKey, ReferenceAction};
pub use id::ObjectId;
pub use index::{Index, IndexPart, PartTarget};
pub use schema::{Object, Schema};
pub use table::{Column, ColumnDefault, GeneratedExpr, GeneratedKind, Table};
pub use types::{ColumnType, DialectType, IntegerSize, TimeKind, Type};

/// The full set of schemas reachable through one connection.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Realm {
    pub schemas: Vec<Schema>,
    /// Realm-wide attributes such as a server collation.
    pub attrs: Vec<Attr>,
}

impl Realm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_schema(mut self, schema: Schema) -> Self {
        self.schemas.push(schema);
        self
    }

    pub fn with_attr(mut self, attr: Attr) -> Self {
        attr::set(&mut self.attrs, attr);
        self
    }

    pub fn schema(&self, name: &str) -> Option<&Schema> {
        self.schemas.iter().find(|s| s.name == name)
    }

    pub fn table(&self, schema: &str, name: &str) -> Option<&Table> {
        self.schema(schema).and_then(|s| s.table(name))
    }

    pub fn tables(&self) -> impl Iterator<Item = &Table> {
        self.schemas.iter().flat_map(|s| s.tables.iter())
    }

    /// Check if the realm contains an entity with the given id.
    pub fn contains_id(&self, id: &ObjectId) -> bool {
        match id {
            ObjectId::Realm => true,
            ObjectId::Schema { name } => self.schema(name).is_some(),
            ObjectId::Table { schema, name } => self.table(schema, name).is_some(),
            ObjectId::Column {
                schema,
                table,
                name,
            } => self
                .table(schema, table)
                .is_some_and(|t| t.column(name).is_some()),
            ObjectId::Index {
                schema,
                table,
                name,
            } => self
                .table(schema, table)
                .is_some_and(|t| t.index(name).is_some()),
            ObjectId::PrimaryKey { schema, table } => self
                .table(schema, table)
                .is_some_and(|t| t.primary_key.is_some()),
            ObjectId::ForeignKey {
                schema,
                table,
                symbol,
            } => self
                .table(schema, table)
                .is_some_and(|t| t.foreign_key(symbol).is_some()),
            ObjectId::Check {
                schema,
                table,
                name,
            } => self
                .table(schema, table)
                .is_some_and(|t| t.check(name).is_some()),
            ObjectId::Object { schema, kind, name } => self
                .schema(schema)
                .is_some_and(|s| s.object(kind, name).is_some()),
        }
    }
}
