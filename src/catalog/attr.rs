//! Attribute vocabulary shared by realms, schemas, tables, columns, indexes and constraints.
//!
//! The generic kinds cover what every dialect has some version of. Anything else travels
//! as [`Attr::Dialect`], an opaque payload tagged with the dialect that produced it; the
//! generic differ only ever compares those payloads for equality or hands them to the
//! driver.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum NullsOrder {
    First,
    Last,
}

impl fmt::Display for NullsOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NullsOrder::First => write!(f, "NULLS FIRST"),
            NullsOrder::Last => write!(f, "NULLS LAST"),
        }
    }
}

/// Identity / auto-increment metadata of a column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    /// `ALWAYS` or `BY DEFAULT`
    pub generation: String,
    pub start: i64,
    pub increment: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Attr {
    Comment(String),
    Charset(String),
    Collation(String),
    /// Table storage engine.
    Engine(String),
    Identity(Identity),
    /// Index method (btree, hash, gin, ...).
    IndexType(String),
    /// Partial-index predicate.
    IndexPredicate(String),
    /// Covering columns of an index.
    IndexInclude(Vec<String>),
    StorageParams(Vec<(String, String)>),
    /// Operator class of an index part.
    OpClass(String),
    NullsOrder(NullsOrder),
    /// Check constraint is declared but not enforced.
    NotEnforced,
    /// Check constraint is not inherited by child tables.
    NoInherit,
    /// The constraint name was generated by the database, so it cannot be recreated
    /// under the same name.
    SystemNamed,
    Dialect {
        dialect: String,
        name: String,
        value: serde_json::Value,
    },
}

/// Identity of an attribute for matching purposes: two attributes with the same key
/// describe the same facet and are compared, attributes with distinct keys are
/// added or dropped.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AttrKey {
    Comment,
    Charset,
    Collation,
    Engine,
    Identity,
    IndexType,
    IndexPredicate,
    IndexInclude,
    StorageParams,
    OpClass,
    NullsOrder,
    NotEnforced,
    NoInherit,
    SystemNamed,
    Dialect { dialect: String, name: String },
}

impl Attr {
    pub fn key(&self) -> AttrKey {
        match self {
            Attr::Comment(_) => AttrKey::Comment,
            Attr::Charset(_) => AttrKey::Charset,
            Attr::Collation(_) => AttrKey::Collation,
            Attr::Engine(_) => AttrKey::Engine,
            Attr::Identity(_) => AttrKey::Identity,
            Attr::IndexType(_) => AttrKey::IndexType,
            Attr::IndexPredicate(_) => AttrKey::IndexPredicate,
            Attr::IndexInclude(_) => AttrKey::IndexInclude,
            Attr::StorageParams(_) => AttrKey::StorageParams,
            Attr::OpClass(_) => AttrKey::OpClass,
            Attr::NullsOrder(_) => AttrKey::NullsOrder,
            Attr::NotEnforced => AttrKey::NotEnforced,
            Attr::NoInherit => AttrKey::NoInherit,
            Attr::SystemNamed => AttrKey::SystemNamed,
            Attr::Dialect { dialect, name, .. } => AttrKey::Dialect {
                dialect: dialect.clone(),
                name: name.clone(),
            },
        }
    }
}

impl fmt::Display for AttrKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttrKey::Comment => write!(f, "comment"),
            AttrKey::Charset => write!(f, "charset"),
            AttrKey::Collation => write!(f, "collation"),
            AttrKey::Engine => write!(f, "engine"),
            AttrKey::Identity => write!(f, "identity"),
            AttrKey::IndexType => write!(f, "index type"),
            AttrKey::IndexPredicate => write!(f, "index predicate"),
            AttrKey::IndexInclude => write!(f, "include columns"),
            AttrKey::StorageParams => write!(f, "storage parameters"),
            AttrKey::OpClass => write!(f, "operator class"),
            AttrKey::NullsOrder => write!(f, "nulls order"),
            AttrKey::NotEnforced => write!(f, "not enforced"),
            AttrKey::NoInherit => write!(f, "no inherit"),
            AttrKey::SystemNamed => write!(f, "system name"),
            AttrKey::Dialect { dialect, name } => write!(f, "{dialect} {name}"),
        }
    }
}

pub fn find<'a>(attrs: &'a [Attr], key: &AttrKey) -> Option<&'a Attr> {
    attrs.iter().find(|a| &a.key() == key)
}

pub fn has(attrs: &[Attr], key: &AttrKey) -> bool {
    find(attrs, key).is_some()
}

pub fn comment(attrs: &[Attr]) -> Option<&str> {
    attrs.iter().find_map(|a| match a {
        Attr::Comment(c) => Some(c.as_str()),
        _ => None,
    })
}

pub fn charset(attrs: &[Attr]) -> Option<&str> {
    attrs.iter().find_map(|a| match a {
        Attr::Charset(c) => Some(c.as_str()),
        _ => None,
    })
}

pub fn collation(attrs: &[Attr]) -> Option<&str> {
    attrs.iter().find_map(|a| match a {
        Attr::Collation(c) => Some(c.as_str()),
        _ => None,
    })
}

pub fn identity(attrs: &[Attr]) -> Option<&Identity> {
    attrs.iter().find_map(|a| match a {
        Attr::Identity(i) => Some(i),
        _ => None,
    })
}

/// Replace the attribute with the same key, or append it.
pub fn set(attrs: &mut Vec<Attr>, attr: Attr) {
    let key = attr.key();
    match attrs.iter_mut().find(|a| a.key() == key) {
        Some(existing) => *existing = attr,
        None => attrs.push(attr),
    }
}
