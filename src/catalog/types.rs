//! Column type vocabulary.
//!
//! A closed set of generic kinds plus two escape hatches: [`Type::Unsupported`] for raw
//! text nothing could classify and [`Type::Dialect`] for a dialect-specific payload that
//! only the owning driver knows how to compare.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IntegerSize {
    Small,
    Regular,
    Big,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimeKind {
    Date,
    Time,
    Timestamp,
    TimestampTz,
    Interval,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DialectType {
    pub dialect: String,
    pub name: String,
    pub payload: serde_json::Value,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Type {
    Integer {
        size: IntegerSize,
        unsigned: bool,
    },
    String {
        size: Option<u32>,
        /// Fixed-width (`CHAR(n)`) rather than varying.
        fixed: bool,
    },
    Decimal {
        precision: Option<u32>,
        scale: Option<u32>,
    },
    Float {
        precision: Option<u32>,
    },
    Boolean,
    Time {
        kind: TimeKind,
        precision: Option<u32>,
    },
    Enum {
        /// Schema of the enum object, `None` for the column's own schema.
        schema: Option<String>,
        name: String,
        values: Vec<String>,
    },
    Binary {
        size: Option<u32>,
    },
    Spatial {
        name: String,
    },
    Json {
        binary: bool,
    },
    Uuid,
    Unsupported {
        raw: String,
    },
    Dialect(DialectType),
}

impl Type {
    pub fn integer() -> Self {
        Type::Integer {
            size: IntegerSize::Regular,
            unsigned: false,
        }
    }

    pub fn bigint() -> Self {
        Type::Integer {
            size: IntegerSize::Big,
            unsigned: false,
        }
    }

    pub fn text() -> Self {
        Type::String {
            size: None,
            fixed: false,
        }
    }

    pub fn varchar(size: u32) -> Self {
        Type::String {
            size: Some(size),
            fixed: false,
        }
    }

    /// Short name of the generic kind, used in error messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Type::Integer { .. } => "integer",
            Type::String { .. } => "string",
            Type::Decimal { .. } => "decimal",
            Type::Float { .. } => "float",
            Type::Boolean => "boolean",
            Type::Time { .. } => "time",
            Type::Enum { .. } => "enum",
            Type::Binary { .. } => "binary",
            Type::Spatial { .. } => "spatial",
            Type::Json { .. } => "json",
            Type::Uuid => "uuid",
            Type::Unsupported { .. } => "unsupported",
            Type::Dialect(_) => "dialect",
        }
    }

    /// The enum object this type refers to, if any.
    pub fn enum_ref(&self) -> Option<(Option<&str>, &str)> {
        match self {
            Type::Enum { schema, name, .. } => Some((schema.as_deref(), name.as_str())),
            _ => None,
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Integer { size, unsigned } => {
                let name = match size {
                    IntegerSize::Small => "smallint",
                    IntegerSize::Regular => "integer",
                    IntegerSize::Big => "bigint",
                };
                if *unsigned {
                    write!(f, "{name} unsigned")
                } else {
                    write!(f, "{name}")
                }
            }
            Type::String { size, fixed } => match (size, fixed) {
                (Some(n), true) => write!(f, "char({n})"),
                (Some(n), false) => write!(f, "varchar({n})"),
                (None, true) => write!(f, "char"),
                (None, false) => write!(f, "text"),
            },
            Type::Decimal { precision, scale } => match (precision, scale) {
                (Some(p), Some(s)) => write!(f, "decimal({p},{s})"),
                (Some(p), None) => write!(f, "decimal({p})"),
                _ => write!(f, "decimal"),
            },
            Type::Float { precision } => match precision {
                Some(p) => write!(f, "float({p})"),
                None => write!(f, "float"),
            },
            Type::Boolean => write!(f, "boolean"),
            Type::Time { kind, precision } => {
                let name = match kind {
                    TimeKind::Date => "date",
                    TimeKind::Time => "time",
                    TimeKind::Timestamp => "timestamp",
                    TimeKind::TimestampTz => "timestamptz",
                    TimeKind::Interval => "interval",
                };
                match precision {
                    Some(p) if *kind != TimeKind::Date => write!(f, "{name}({p})"),
                    _ => write!(f, "{name}"),
                }
            }
            Type::Enum { schema, name, .. } => match schema {
                Some(s) => write!(f, "{s}.{name}"),
                None => write!(f, "{name}"),
            },
            Type::Binary { size } => match size {
                Some(n) => write!(f, "varbinary({n})"),
                None => write!(f, "blob"),
            },
            Type::Spatial { name } => write!(f, "{name}"),
            Type::Json { binary } => {
                if *binary {
                    write!(f, "jsonb")
                } else {
                    write!(f, "json")
                }
            }
            Type::Uuid => write!(f, "uuid"),
            Type::Unsupported { raw } => write!(f, "{raw}"),
            Type::Dialect(d) => write!(f, "{}", d.name),
        }
    }
}

/// A column's type together with its nullability.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnType {
    pub ty: Type,
    pub null: bool,
    /// Type text as it was inspected, before any classification.
    pub raw: Option<String>,
}

impl ColumnType {
    pub fn new(ty: Type) -> Self {
        Self {
            ty,
            null: false,
            raw: None,
        }
    }

    pub fn nullable(ty: Type) -> Self {
        Self {
            ty,
            null: true,
            raw: None,
        }
    }

    pub fn with_raw(mut self, raw: impl Into<String>) -> Self {
        self.raw = Some(raw.into());
        self
    }
}
