use glob::Pattern;

use crate::catalog::Realm;
use crate::config::types::{ObjectExclude, ObjectInclude, Objects};

/// Decides which schemas and tables take part in a diff. Filtered entities are
/// invisible to the differ on both sides, so they never produce changes.
#[derive(Debug, Clone, Default)]
pub struct ObjectFilter {
    include: ObjectInclude,
    exclude: ObjectExclude,
}

impl ObjectFilter {
    pub fn new(config: &Objects) -> Self {
        Self {
            include: config.include.clone(),
            exclude: config.exclude.clone(),
        }
    }

    /// True when no pattern is configured and every object passes.
    pub fn is_empty(&self) -> bool {
        self.include.schemas.is_empty()
            && self.include.tables.is_empty()
            && self.exclude.schemas.is_empty()
            && self.exclude.tables.is_empty()
    }

    pub fn should_include_schema(&self, schema_name: &str) -> bool {
        if self.matches_patterns(&self.exclude.schemas, schema_name) {
            return false;
        }

        if !self.include.schemas.is_empty() {
            return self.matches_patterns(&self.include.schemas, schema_name);
        }

        true
    }

    pub fn should_include_table(&self, schema_name: &str, table_name: &str) -> bool {
        if !self.should_include_schema(schema_name) {
            return false;
        }

        if self.matches_table(&self.exclude.tables, schema_name, table_name) {
            return false;
        }

        if !self.include.tables.is_empty() {
            return self.matches_table(&self.include.tables, schema_name, table_name);
        }

        true
    }

    /// Remove excluded schemas and tables from a snapshot.
    pub fn filter_realm(&self, mut realm: Realm) -> Realm {
        if self.is_empty() {
            return realm;
        }

        realm
            .schemas
            .retain(|schema| self.should_include_schema(&schema.name));

        for schema in &mut realm.schemas {
            let schema_name = schema.name.clone();
            schema
                .tables
                .retain(|table| self.should_include_table(&schema_name, &table.name));
        }

        realm
    }

    // Patterns with a dot match the qualified name, others the bare table name.
    fn matches_table(&self, patterns: &[String], schema_name: &str, table_name: &str) -> bool {
        let qualified = format!("{}.{}", schema_name, table_name);
        patterns.iter().any(|pattern| {
            let name = if pattern.contains('.') {
                qualified.as_str()
            } else {
                table_name
            };
            self.matches_patterns(std::slice::from_ref(pattern), name)
        })
    }

    /// Check if a name matches any of the glob patterns
    fn matches_patterns(&self, patterns: &[String], name: &str) -> bool {
        if patterns.is_empty() {
            return false;
        }

        patterns.iter().any(|pattern| {
            Pattern::new(pattern)
                .map(|p| p.matches(name))
                .unwrap_or(false)
        })
    }
}
