//! Capability interface between the generic differ and a database dialect.
//!
//! The differ never compares types, defaults, index attributes or referential actions
//! by structural equality. It asks the [`DiffDriver`] instead. Provided methods carry
//! the generic behaviour, so a dialect only overrides what it does differently.

pub mod registry;
pub mod standard;

pub use registry::{Registry, TypeSpec};
pub use standard::StandardDriver;

use std::collections::BTreeMap;

use crate::catalog::{
    Attr, AttrKey, ColumnDefault, ColumnType, GeneratedExpr, Index, IndexPart, NullsOrder,
    ObjectId, Realm, ReferenceAction, Schema, Table, Type,
};
use crate::diff::operations::Change;
use crate::error::DiffError;

/// How the database treats indexes and foreign keys whose columns are dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DependentDrop {
    /// Dependents must be dropped explicitly before their columns.
    #[default]
    Explicit,
    /// Dropping a column removes every index and foreign key built only on dropped
    /// columns, so drops for those are emitted as [`Change::Cascaded`] and render no
    /// statement.
    Implicit,
}

pub trait DiffDriver: Send + Sync {
    /// Dialect tag, matched against [`Type::Dialect`] and [`Attr::Dialect`] payloads.
    fn name(&self) -> &str;

    fn registry(&self) -> &Registry;

    /// Canonicalize an inspected snapshot before it is compared.
    fn normalize(&self, realm: &mut Realm) -> Result<(), DiffError> {
        let _ = realm;
        Ok(())
    }

    /// Whether two column types denote the same logical type. Nullability is compared
    /// separately.
    fn types_equal(
        &self,
        id: &ObjectId,
        from: &ColumnType,
        to: &ColumnType,
    ) -> Result<bool, DiffError> {
        types_equal(self.name(), self.registry(), id, &from.ty, &to.ty)
    }

    fn defaults_equal(&self, from: Option<&ColumnDefault>, to: Option<&ColumnDefault>) -> bool {
        match (from, to) {
            (None, None) => true,
            (Some(a), Some(b)) => canonical_default(a) == canonical_default(b),
            _ => false,
        }
    }

    /// Whether two generated-column definitions are the same. A change of the generation
    /// kind is always a change; expression text is compared after whitespace collapsing.
    fn generated_equal(&self, from: Option<&GeneratedExpr>, to: Option<&GeneratedExpr>) -> bool {
        match (from, to) {
            (None, None) => true,
            (Some(a), Some(b)) => {
                a.kind == b.kind && canonical_expr(&a.expr) == canonical_expr(&b.expr)
            }
            _ => false,
        }
    }

    /// Whether the index-level attributes (method, predicate, include columns, storage
    /// parameters) differ. Comments are a separate facet.
    fn index_attrs_changed(
        &self,
        id: &ObjectId,
        from: &Index,
        to: &Index,
    ) -> Result<bool, DiffError> {
        let from_attrs = index_attrs(&from.attrs);
        let to_attrs = index_attrs(&to.attrs);
        if from_attrs.keys().ne(to_attrs.keys()) {
            return Ok(true);
        }
        for (key, a) in &from_attrs {
            if let Some(b) = to_attrs.get(key)
                && !index_attr_equal(self.name(), id, a, b)?
            {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Whether the attributes of two index parts at the same position differ. An absent
    /// nulls ordering equals the default for the part's direction.
    fn index_part_attrs_changed(&self, from: &IndexPart, to: &IndexPart) -> bool {
        if nulls_order(from) != nulls_order(to) {
            return true;
        }
        let rest = |p: &IndexPart| -> BTreeMap<AttrKey, Attr> {
            p.attrs
                .iter()
                .filter(|a| !matches!(a, Attr::NullsOrder(_)))
                .map(|a| (a.key(), a.clone()))
                .collect()
        };
        rest(from) != rest(to)
    }

    /// Unspecified referential actions are treated as `NO ACTION`.
    fn reference_actions_equal(
        &self,
        from: Option<ReferenceAction>,
        to: Option<ReferenceAction>,
    ) -> bool {
        ReferenceAction::or_default(from) == ReferenceAction::or_default(to)
    }

    fn schema_attr_diff(&self, from: &Schema, to: &Schema) -> Result<Vec<Change>, DiffError> {
        attr_changes(self.name(), &from.id(), &from.attrs, &to.attrs)
    }

    fn table_attr_diff(&self, from: &Table, to: &Table) -> Result<Vec<Change>, DiffError> {
        attr_changes(self.name(), &from.id(), &from.attrs, &to.attrs)
    }

    fn dependent_drop_policy(&self) -> DependentDrop {
        DependentDrop::Explicit
    }
}

/// Generic type equality. Aliased spellings are expected to be collapsed by
/// [`DiffDriver::normalize`]; unclassified raw text is retried through the registry.
pub fn types_equal(
    driver: &str,
    registry: &Registry,
    id: &ObjectId,
    from: &Type,
    to: &Type,
) -> Result<bool, DiffError> {
    let schema = id.schema().unwrap_or_default();
    let equal = match (from, to) {
        (Type::Unsupported { raw: a }, Type::Unsupported { raw: b }) => {
            canonical_expr(a).eq_ignore_ascii_case(&canonical_expr(b))
        }
        (Type::Unsupported { raw }, other) | (other, Type::Unsupported { raw }) => {
            match registry.parse(raw) {
                Some(parsed) => types_equal(driver, registry, id, &parsed, other)?,
                None => false,
            }
        }
        (Type::Dialect(a), Type::Dialect(b)) if a == b => true,
        (Type::Dialect(d), _) | (_, Type::Dialect(d)) => {
            return Err(DiffError::UnsupportedType {
                driver: driver.to_string(),
                id: id.clone(),
                ty: format!("{}:{}", d.dialect, d.name),
            });
        }
        (
            Type::Integer {
                size: s1,
                unsigned: u1,
            },
            Type::Integer {
                size: s2,
                unsigned: u2,
            },
        ) => s1 == s2 && u1 == u2,
        (Type::String { size: s1, fixed: f1 }, Type::String { size: s2, fixed: f2 }) => {
            let width = |size: &Option<u32>, fixed: bool| if fixed { size.or(Some(1)) } else { *size };
            f1 == f2 && width(s1, *f1) == width(s2, *f2)
        }
        (
            Type::Decimal {
                precision: p1,
                scale: s1,
            },
            Type::Decimal {
                precision: p2,
                scale: s2,
            },
        ) => p1 == p2 && (p1.is_none() || s1.unwrap_or(0) == s2.unwrap_or(0)),
        (Type::Float { precision: p1 }, Type::Float { precision: p2 }) => {
            registry::float_bucket(*p1) == registry::float_bucket(*p2)
        }
        (Type::Boolean, Type::Boolean) | (Type::Uuid, Type::Uuid) => true,
        (
            Type::Time {
                kind: k1,
                precision: p1,
            },
            Type::Time {
                kind: k2,
                precision: p2,
            },
        ) => k1 == k2 && (*k1 == crate::catalog::TimeKind::Date || p1.unwrap_or(6) == p2.unwrap_or(6)),
        (
            Type::Enum {
                schema: s1,
                name: n1,
                values: v1,
            },
            Type::Enum {
                schema: s2,
                name: n2,
                values: v2,
            },
        ) => {
            s1.as_deref().unwrap_or(schema) == s2.as_deref().unwrap_or(schema)
                && n1 == n2
                && v1 == v2
        }
        (Type::Binary { size: s1 }, Type::Binary { size: s2 }) => s1 == s2,
        (Type::Spatial { name: a }, Type::Spatial { name: b }) => a.eq_ignore_ascii_case(b),
        (Type::Json { binary: a }, Type::Json { binary: b }) => a == b,
        _ => false,
    };
    Ok(equal)
}

/// Canonical text of a default: casts and wrapping parentheses removed, literals reduced
/// to their value.
pub fn canonical_default(default: &ColumnDefault) -> String {
    match default {
        ColumnDefault::Literal(v) => canonical_literal(v),
        ColumnDefault::Raw(expr) => canonical_literal(&strip_casts(expr)),
    }
}

/// Strip redundant `::type` suffixes and outer parentheses until the text is stable.
pub fn strip_casts(expr: &str) -> String {
    let mut text = expr.trim().to_string();
    loop {
        let before = text.clone();
        if let Some(inner) = strip_outer_parens(&text) {
            text = inner.trim().to_string();
        }
        if let Some(pos) = last_cast(&text) {
            let target = &text[pos + 2..];
            if !text[..pos].trim().is_empty() && is_type_name(target) {
                text = text[..pos].trim().to_string();
            }
        }
        if text == before {
            return text;
        }
    }
}

fn canonical_literal(value: &str) -> String {
    let v = value.trim();
    if v.len() >= 2 && v.starts_with('\'') && v.ends_with('\'') {
        return v[1..v.len() - 1].replace("''", "'");
    }
    if let Ok(n) = v.parse::<f64>()
        && n.is_finite()
    {
        return n.to_string();
    }
    match v.to_ascii_lowercase().as_str() {
        "true" | "false" | "null" => v.to_ascii_lowercase(),
        _ => canonical_expr(v),
    }
}

fn canonical_expr(expr: &str) -> String {
    expr.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn strip_outer_parens(text: &str) -> Option<&str> {
    let inner = text.strip_prefix('(')?.strip_suffix(')')?;
    // "(a) + (b)" is not wrapped as a whole
    let mut depth = 0i32;
    let mut quoted = false;
    for c in inner.chars() {
        match c {
            '\'' => quoted = !quoted,
            '(' if !quoted => depth += 1,
            ')' if !quoted => {
                depth -= 1;
                if depth < 0 {
                    return None;
                }
            }
            _ => {}
        }
    }
    (depth == 0).then_some(inner)
}

/// Byte offset of the last `::` outside quotes and parentheses.
fn last_cast(text: &str) -> Option<usize> {
    let bytes = text.as_bytes();
    let mut quoted = false;
    let mut depth = 0i32;
    let mut found = None;
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'\'' => quoted = !quoted,
            b'(' if !quoted => depth += 1,
            b')' if !quoted => depth -= 1,
            b':' if !quoted && depth == 0 && bytes.get(i + 1) == Some(&b':') => {
                found = Some(i);
                i += 1;
            }
            _ => {}
        }
        i += 1;
    }
    found
}

fn is_type_name(text: &str) -> bool {
    let text = text.trim();
    !text.is_empty()
        && text.chars().all(|c| {
            c.is_ascii_alphanumeric() || matches!(c, ' ' | '_' | '.' | '"' | '(' | ')' | ',' | '[' | ']')
        })
}

fn nulls_order(part: &IndexPart) -> NullsOrder {
    part.attrs
        .iter()
        .find_map(|a| match a {
            Attr::NullsOrder(o) => Some(*o),
            _ => None,
        })
        .unwrap_or(if part.desc {
            NullsOrder::First
        } else {
            NullsOrder::Last
        })
}

fn index_attrs(attrs: &[Attr]) -> BTreeMap<AttrKey, &Attr> {
    attrs
        .iter()
        .filter(|a| !matches!(a, Attr::Comment(_)))
        // btree is the default method everywhere
        .filter(|a| !matches!(a, Attr::IndexType(t) if t.eq_ignore_ascii_case("btree")))
        .map(|a| (a.key(), a))
        .collect()
}

fn index_attr_equal(driver: &str, id: &ObjectId, a: &Attr, b: &Attr) -> Result<bool, DiffError> {
    Ok(match (a, b) {
        (Attr::IndexType(x), Attr::IndexType(y)) => x.eq_ignore_ascii_case(y),
        (Attr::IndexPredicate(x), Attr::IndexPredicate(y)) => {
            canonical_expr(&strip_casts(x)) == canonical_expr(&strip_casts(y))
        }
        (Attr::StorageParams(x), Attr::StorageParams(y)) => {
            let mut x = x.clone();
            let mut y = y.clone();
            x.sort();
            y.sort();
            x == y
        }
        (Attr::Dialect { dialect, .. }, _) if dialect != driver && a != b => {
            return Err(DiffError::UnsupportedAttr {
                driver: driver.to_string(),
                id: id.clone(),
                attr: a.key().to_string(),
            });
        }
        _ => a == b,
    })
}

/// Add, drop and modify changes between two attribute lists, keyed by [`AttrKey`].
/// Drops come first in `from` order, then adds and modifies in `to` order.
pub fn attr_changes(
    driver: &str,
    id: &ObjectId,
    from: &[Attr],
    to: &[Attr],
) -> Result<Vec<Change>, DiffError> {
    let mut changes = Vec::new();
    for a in from {
        if !to.iter().any(|b| b.key() == a.key()) {
            changes.push(Change::DropAttr(a.clone()));
        }
    }
    for b in to {
        match from.iter().find(|a| a.key() == b.key()) {
            None => changes.push(Change::AddAttr(b.clone())),
            Some(a) if a != b => {
                if let Attr::Dialect { dialect, .. } = a
                    && dialect != driver
                {
                    return Err(DiffError::UnsupportedAttr {
                        driver: driver.to_string(),
                        id: id.clone(),
                        attr: a.key().to_string(),
                    });
                }
                changes.push(Change::ModifyAttr {
                    from: a.clone(),
                    to: b.clone(),
                });
            }
            Some(_) => {}
        }
    }
    Ok(changes)
}
