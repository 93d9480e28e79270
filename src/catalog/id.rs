use std::fmt;

/// A globally unique identifier for any entity a diff can talk about.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ObjectId {
    Realm,
    Schema {
        name: String,
    },
    Table {
        schema: String,
        name: String,
    },
    Column {
        schema: String,
        table: String,
        name: String,
    },
    Index {
        schema: String,
        table: String,
        name: String,
    },
    PrimaryKey {
        schema: String,
        table: String,
    },
    ForeignKey {
        schema: String,
        table: String,
        symbol: String,
    },
    Check {
        schema: String,
        table: String,
        name: String,
    },
    Object {
        schema: String,
        kind: String,
        name: String,
    },
}

impl ObjectId {
    /// Schema the entity lives in. `None` for the realm itself.
    pub fn schema(&self) -> Option<&str> {
        match self {
            ObjectId::Realm => None,
            ObjectId::Schema { name } => Some(name.as_str()),
            ObjectId::Table { schema, .. }
            | ObjectId::Column { schema, .. }
            | ObjectId::Index { schema, .. }
            | ObjectId::PrimaryKey { schema, .. }
            | ObjectId::ForeignKey { schema, .. }
            | ObjectId::Check { schema, .. }
            | ObjectId::Object { schema, .. } => Some(schema.as_str()),
        }
    }

    /// Owning table, for table-scoped entities.
    pub fn table(&self) -> Option<&str> {
        match self {
            ObjectId::Table { name, .. } => Some(name.as_str()),
            ObjectId::Column { table, .. }
            | ObjectId::Index { table, .. }
            | ObjectId::PrimaryKey { table, .. }
            | ObjectId::ForeignKey { table, .. }
            | ObjectId::Check { table, .. } => Some(table.as_str()),
            _ => None,
        }
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Realm => write!(f, "realm"),
            Self::Schema { name } => write!(f, "schema {name}"),
            Self::Table { schema, name } => write!(f, "table {schema}.{name}"),
            Self::Column {
                schema,
                table,
                name,
            } => write!(f, "column {schema}.{table}.{name}"),
            Self::Index {
                schema,
                table,
                name,
            } => write!(f, "index {name} on {schema}.{table}"),
            Self::PrimaryKey { schema, table } => write!(f, "primary key of {schema}.{table}"),
            Self::ForeignKey {
                schema,
                table,
                symbol,
            } => write!(f, "foreign key {symbol} on {schema}.{table}"),
            Self::Check {
                schema,
                table,
                name,
            } => write!(f, "check {name} on {schema}.{table}"),
            Self::Object { schema, kind, name } => write!(f, "{kind} {schema}.{name}"),
        }
    }
}
