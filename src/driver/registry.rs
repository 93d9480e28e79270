//! Type spellings and aliases owned by a driver.
//!
//! Each driver builds its own [`Registry`] and hands it to the differ through
//! [`DiffDriver::registry`](super::DiffDriver::registry). There is no shared, process-wide
//! list of types.

use crate::catalog::{IntegerSize, TimeKind, Type};

/// One named type of a dialect's vocabulary.
#[derive(Debug, Clone)]
pub struct TypeSpec {
    /// Canonical spelling, e.g. `character varying`.
    pub name: String,
    /// Other spellings that denote the same type, e.g. `varchar`.
    pub aliases: Vec<String>,
    /// Builds the generic type from the numeric arguments written after the name.
    pub build: fn(&[u32]) -> Type,
}

impl TypeSpec {
    pub fn new(name: impl Into<String>, build: fn(&[u32]) -> Type) -> Self {
        Self {
            name: name.into(),
            aliases: Vec::new(),
            build,
        }
    }

    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.aliases.push(alias.into());
        self
    }

    fn matches(&self, name: &str) -> bool {
        self.name == name || self.aliases.iter().any(|a| a == name)
    }
}

/// A type name split into its parts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedType {
    pub name: String,
    pub args: Vec<u32>,
    pub unsigned: bool,
}

#[derive(Debug, Clone, Default)]
pub struct Registry {
    specs: Vec<TypeSpec>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_spec(mut self, spec: TypeSpec) -> Self {
        self.specs.push(spec);
        self
    }

    pub fn specs(&self) -> &[TypeSpec] {
        &self.specs
    }

    /// Find a spec by canonical name or alias (case-insensitive).
    pub fn lookup(&self, name: &str) -> Option<&TypeSpec> {
        let name = collapse_whitespace(name).to_ascii_lowercase();
        self.specs.iter().find(|s| s.matches(&name))
    }

    /// Classify raw type text such as `varchar(255)` or `int unsigned`.
    /// Returns `None` when no spec knows the name or the arguments are malformed.
    pub fn parse(&self, raw: &str) -> Option<Type> {
        let parsed = split_type(raw)?;
        let spec = self.lookup(&parsed.name)?;
        let mut ty = (spec.build)(&parsed.args);
        if parsed.unsigned
            && let Type::Integer { unsigned, .. } = &mut ty
        {
            *unsigned = true;
        }
        Some(ty)
    }

    /// Rewrite raw type text with the canonical spelling of its name.
    pub fn canonical(&self, raw: &str) -> Option<String> {
        let parsed = split_type(raw)?;
        let spec = self.lookup(&parsed.name)?;
        let mut out = spec.name.clone();
        if !parsed.args.is_empty() {
            let args: Vec<String> = parsed.args.iter().map(u32::to_string).collect();
            out.push('(');
            out.push_str(&args.join(","));
            out.push(')');
        }
        if parsed.unsigned {
            out.push_str(" unsigned");
        }
        Some(out)
    }

    /// The registry used by the generic driver.
    pub fn standard() -> Self {
        fn int(size: IntegerSize) -> Type {
            Type::Integer {
                size,
                unsigned: false,
            }
        }
        fn time(kind: TimeKind, args: &[u32]) -> Type {
            Type::Time {
                kind,
                precision: args.first().copied(),
            }
        }

        Registry::new()
            .with_spec(TypeSpec::new("smallint", |_| int(IntegerSize::Small)).alias("int2"))
            .with_spec(
                TypeSpec::new("integer", |_| int(IntegerSize::Regular))
                    .alias("int")
                    .alias("int4"),
            )
            .with_spec(TypeSpec::new("bigint", |_| int(IntegerSize::Big)).alias("int8"))
            .with_spec(
                TypeSpec::new("character varying", |a| Type::String {
                    size: a.first().copied(),
                    fixed: false,
                })
                .alias("varchar"),
            )
            .with_spec(
                TypeSpec::new("character", |a| Type::String {
                    size: Some(a.first().copied().unwrap_or(1)),
                    fixed: true,
                })
                .alias("char")
                .alias("bpchar"),
            )
            .with_spec(TypeSpec::new("text", |_| Type::text()))
            .with_spec(
                TypeSpec::new("numeric", |a| Type::Decimal {
                    precision: a.first().copied(),
                    scale: a.get(1).copied(),
                })
                .alias("decimal"),
            )
            .with_spec(
                TypeSpec::new("float", |a| Type::Float {
                    precision: Some(float_bucket(a.first().copied())),
                })
                .alias("double precision")
                .alias("float8"),
            )
            .with_spec(
                TypeSpec::new("real", |_| Type::Float {
                    precision: Some(24),
                })
                .alias("float4"),
            )
            .with_spec(TypeSpec::new("boolean", |_| Type::Boolean).alias("bool"))
            .with_spec(TypeSpec::new("date", |_| Type::Time {
                kind: TimeKind::Date,
                precision: None,
            }))
            .with_spec(TypeSpec::new("time", |a| time(TimeKind::Time, a)))
            .with_spec(
                TypeSpec::new("timestamp", |a| time(TimeKind::Timestamp, a))
                    .alias("timestamp without time zone"),
            )
            .with_spec(
                TypeSpec::new("timestamptz", |a| time(TimeKind::TimestampTz, a))
                    .alias("timestamp with time zone"),
            )
            .with_spec(TypeSpec::new("interval", |a| time(TimeKind::Interval, a)))
            .with_spec(
                TypeSpec::new("varbinary", |a| Type::Binary {
                    size: a.first().copied(),
                })
                .alias("binary varying"),
            )
            .with_spec(
                TypeSpec::new("blob", |_| Type::Binary { size: None })
                    .alias("bytea")
                    .alias("binary large object"),
            )
            .with_spec(TypeSpec::new("json", |_| Type::Json { binary: false }))
            .with_spec(TypeSpec::new("jsonb", |_| Type::Json { binary: true }))
            .with_spec(TypeSpec::new("uuid", |_| Type::Uuid))
            .with_spec(TypeSpec::new("geometry", |_| Type::Spatial {
                name: "geometry".into(),
            }))
            .with_spec(TypeSpec::new("point", |_| Type::Spatial {
                name: "point".into(),
            }))
    }
}

/// Floating point precisions collapse to single (24 bits) or double (53 bits).
pub fn float_bucket(precision: Option<u32>) -> u32 {
    match precision {
        Some(p) if p <= 24 => 24,
        _ => 53,
    }
}

/// Split `name(arg, ...) [unsigned]` into its parts.
pub fn split_type(raw: &str) -> Option<ParsedType> {
    let text = collapse_whitespace(raw).to_ascii_lowercase();
    let (text, unsigned) = match text.strip_suffix(" unsigned") {
        Some(rest) => (rest.to_string(), true),
        None => (text, false),
    };

    let (name, args) = match text.find('(') {
        Some(open) => {
            let close = text.rfind(')')?;
            if close < open {
                return None;
            }
            let args = text[open + 1..close]
                .split(',')
                .map(|a| a.trim().parse::<u32>().ok())
                .collect::<Option<Vec<_>>>()?;
            // `timestamp(3) with time zone` keeps its trailing words
            let name = format!("{} {}", text[..open].trim(), text[close + 1..].trim());
            (name.trim().to_string(), args)
        }
        None => (text, Vec::new()),
    };

    if name.is_empty() {
        return None;
    }
    Some(ParsedType {
        name,
        args,
        unsigned,
    })
}

fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}
