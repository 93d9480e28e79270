//! Facet bitmask carried by every Modify change.
use std::fmt;
use std::ops::{BitOr, BitOrAssign};

/// Set of facets that differ between a matched pair of entities.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ChangeKind(u32);

impl ChangeKind {
    pub const NONE: ChangeKind = ChangeKind(0);
    pub const TYPE: ChangeKind = ChangeKind(1 << 0);
    pub const NULL: ChangeKind = ChangeKind(1 << 1);
    pub const DEFAULT: ChangeKind = ChangeKind(1 << 2);
    pub const COMMENT: ChangeKind = ChangeKind(1 << 3);
    pub const CHARSET: ChangeKind = ChangeKind(1 << 4);
    pub const COLLATE: ChangeKind = ChangeKind(1 << 5);
    pub const GENERATED: ChangeKind = ChangeKind(1 << 6);
    pub const IDENTITY: ChangeKind = ChangeKind(1 << 7);
    pub const ATTR: ChangeKind = ChangeKind(1 << 8);
    pub const UNIQUE: ChangeKind = ChangeKind(1 << 9);
    pub const PARTS: ChangeKind = ChangeKind(1 << 10);
    pub const COLUMN: ChangeKind = ChangeKind(1 << 11);
    pub const REF_COLUMN: ChangeKind = ChangeKind(1 << 12);
    pub const REF_TABLE: ChangeKind = ChangeKind(1 << 13);
    pub const UPDATE_ACTION: ChangeKind = ChangeKind(1 << 14);
    pub const DELETE_ACTION: ChangeKind = ChangeKind(1 << 15);
    pub const EXPR: ChangeKind = ChangeKind(1 << 16);
    pub const VALUES: ChangeKind = ChangeKind(1 << 17);

    const NAMES: [(ChangeKind, &'static str); 18] = [
        (Self::TYPE, "type"),
        (Self::NULL, "null"),
        (Self::DEFAULT, "default"),
        (Self::COMMENT, "comment"),
        (Self::CHARSET, "charset"),
        (Self::COLLATE, "collate"),
        (Self::GENERATED, "generated"),
        (Self::IDENTITY, "identity"),
        (Self::ATTR, "attr"),
        (Self::UNIQUE, "unique"),
        (Self::PARTS, "parts"),
        (Self::COLUMN, "column"),
        (Self::REF_COLUMN, "ref_column"),
        (Self::REF_TABLE, "ref_table"),
        (Self::UPDATE_ACTION, "update_action"),
        (Self::DELETE_ACTION, "delete_action"),
        (Self::EXPR, "expr"),
        (Self::VALUES, "values"),
    ];

    pub const fn union(self, other: ChangeKind) -> ChangeKind {
        ChangeKind(self.0 | other.0)
    }

    /// Whether every bit of `other` is set.
    pub fn is(self, other: ChangeKind) -> bool {
        other.0 != 0 && self.0 & other.0 == other.0
    }

    /// Whether any bit of `other` is set.
    pub fn intersects(self, other: ChangeKind) -> bool {
        self.0 & other.0 != 0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn bits(self) -> u32 {
        self.0
    }

    pub fn names(self) -> Vec<&'static str> {
        Self::NAMES
            .iter()
            .filter(|(k, _)| self.is(*k))
            .map(|(_, n)| *n)
            .collect()
    }
}

impl BitOr for ChangeKind {
    type Output = ChangeKind;

    fn bitor(self, rhs: ChangeKind) -> ChangeKind {
        self.union(rhs)
    }
}

impl BitOrAssign for ChangeKind {
    fn bitor_assign(&mut self, rhs: ChangeKind) {
        self.0 |= rhs.0;
    }
}

impl fmt::Debug for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ChangeKind({})", self)
    }
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return write!(f, "none");
        }
        write!(f, "{}", self.names().join("|"))
    }
}
