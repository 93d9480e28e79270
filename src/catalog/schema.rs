use super::attr::{self, Attr};
use super::id::ObjectId;
use super::table::Table;

/// Schema-scoped entity that is not a table.
#[derive(Debug, Clone, PartialEq)]
pub enum Object {
    Enum {
        schema: String,
        name: String,
        values: Vec<String>,
    },
    Dialect {
        schema: String,
        kind: String,
        name: String,
        payload: serde_json::Value,
    },
}

impl Object {
    pub fn enum_type<S: Into<String>>(name: impl Into<String>, values: impl IntoIterator<Item = S>) -> Self {
        Object::Enum {
            schema: String::new(),
            name: name.into(),
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Object::Enum { name, .. } | Object::Dialect { name, .. } => name,
        }
    }

    pub fn kind(&self) -> &str {
        match self {
            Object::Enum { .. } => "enum",
            Object::Dialect { kind, .. } => kind,
        }
    }

    pub fn schema(&self) -> &str {
        match self {
            Object::Enum { schema, .. } | Object::Dialect { schema, .. } => schema,
        }
    }

    pub(crate) fn set_schema(&mut self, name: &str) {
        match self {
            Object::Enum { schema, .. } | Object::Dialect { schema, .. } => {
                *schema = name.to_string()
            }
        }
    }

    pub fn id(&self) -> ObjectId {
        ObjectId::Object {
            schema: self.schema().to_string(),
            kind: self.kind().to_string(),
            name: self.name().to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Schema {
    pub name: String,
    /// Declaration order.
    pub tables: Vec<Table>,
    pub objects: Vec<Object>,
    /// Comment, charset, collation.
    pub attrs: Vec<Attr>,
}

impl Schema {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tables: Vec::new(),
            objects: Vec::new(),
            attrs: Vec::new(),
        }
    }

    pub fn id(&self) -> ObjectId {
        ObjectId::Schema {
            name: self.name.clone(),
        }
    }

    /// Attach a table, pointing its back reference at this schema.
    pub fn with_table(mut self, table: Table) -> Self {
        self.tables.push(table.in_schema(self.name.clone()));
        self
    }

    pub fn with_tables(mut self, tables: impl IntoIterator<Item = Table>) -> Self {
        for t in tables {
            self = self.with_table(t);
        }
        self
    }

    pub fn with_object(mut self, mut object: Object) -> Self {
        object.set_schema(&self.name);
        self.objects.push(object);
        self
    }

    pub fn with_attr(mut self, attr: Attr) -> Self {
        attr::set(&mut self.attrs, attr);
        self
    }

    pub fn table(&self, name: &str) -> Option<&Table> {
        self.tables.iter().find(|t| t.name == name)
    }

    pub fn object(&self, kind: &str, name: &str) -> Option<&Object> {
        self.objects
            .iter()
            .find(|o| o.kind() == kind && o.name() == name)
    }

    pub fn comment(&self) -> Option<&str> {
        attr::comment(&self.attrs)
    }
}
