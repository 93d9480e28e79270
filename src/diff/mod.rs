//! Entity differ.
//!
//! Matches entities by name at every level (realm, schema, table, then columns,
//! indexes, foreign keys and checks) and classifies them into Add, Drop and Modify
//! changes. A matched pair without any differing facet produces nothing.

pub mod cascade;
mod checks;
mod columns;
mod foreign_keys;
mod indexes;
mod matching;
mod objects;
pub mod operations;
pub mod options;
pub mod order;
mod renames;
mod schemas;
mod tables;

pub use operations::{Change, ChangeKind, ChangeTag};
pub use options::{DiffHook, DiffOptions, RenameHint, RenameKind};
pub use order::order_changes;

use tracing::info;

use crate::catalog::{ObjectId, Realm, Schema, Table};
use crate::driver::{DiffDriver, attr_changes};
use crate::error::DiffError;
use matching::pair;
use renames::Renamed;

/// Shared state of one diff invocation.
pub(crate) struct Differ<'a> {
    pub driver: &'a dyn DiffDriver,
    pub opts: &'a DiffOptions,
    pub renamed: Renamed,
}

impl<'a> Differ<'a> {
    pub fn new(driver: &'a dyn DiffDriver, opts: &'a DiffOptions) -> Self {
        Self {
            driver,
            opts,
            renamed: Renamed::default(),
        }
    }

    fn realm(&self, from: &Realm, to: &Realm) -> Result<Vec<Change>, DiffError> {
        let mut out = attr_changes(self.driver.name(), &ObjectId::Realm, &from.attrs, &to.attrs)?;
        let paired = pair("realm", &from.schemas, &to.schemas, self.opts.case_insensitive)?;
        for old in paired.dropped {
            out.extend(schemas::diff(self, Some(old), None)?);
        }
        for (old, new) in paired.desired {
            out.extend(schemas::diff(self, old, Some(new))?);
        }
        Ok(out)
    }
}

/// Filter, normalize and apply rename hints to copies of both snapshots.
fn prepare<'a>(
    driver: &'a dyn DiffDriver,
    opts: &'a DiffOptions,
    mut from: Realm,
    mut to: Realm,
    filter: bool,
) -> Result<(Differ<'a>, Realm, Realm), DiffError> {
    if filter {
        from = opts.filter.filter_realm(from);
        to = opts.filter.filter_realm(to);
    }
    if opts.normalize {
        driver.normalize(&mut from)?;
        driver.normalize(&mut to)?;
    }
    let mut differ = Differ::new(driver, opts);
    differ.renamed = renames::apply(&opts.renames, &mut from, &to);
    Ok((differ, from, to))
}

/// Changes turning the `from` realm into the `to` realm.
pub fn realm_diff(
    driver: &dyn DiffDriver,
    from: &Realm,
    to: &Realm,
    opts: &DiffOptions,
) -> Result<Vec<Change>, DiffError> {
    info!("Diffing realms...");
    let (d, from, to) = prepare(driver, opts, from.clone(), to.clone(), true)?;
    let changes = opts.post_process(d.realm(&from, &to)?);
    info!("Diff complete: {} changes", changes.len());
    Ok(changes)
}

/// Changes turning the `from` schema into the `to` schema.
pub fn schema_diff(
    driver: &dyn DiffDriver,
    from: &Schema,
    to: &Schema,
    opts: &DiffOptions,
) -> Result<Vec<Change>, DiffError> {
    info!("Diffing schema {}...", to.name);
    let wrap = |s: &Schema| Realm::new().with_schema(s.clone());
    let (d, from, to) = prepare(driver, opts, wrap(from), wrap(to), true)?;
    let changes = match (from.schemas.first(), to.schemas.first()) {
        (Some(f), Some(t)) => schemas::changes(&d, f, t)?,
        // excluded by the object filter
        _ => Vec::new(),
    };
    Ok(opts.post_process(changes))
}

/// Sub-changes turning the `from` table into the `to` table, in execution order. These
/// are the children a ModifyTable would carry.
pub fn table_diff(
    driver: &dyn DiffDriver,
    from: &Table,
    to: &Table,
    opts: &DiffOptions,
) -> Result<Vec<Change>, DiffError> {
    let wrap = |t: &Table| Realm::new().with_schema(Schema::new(t.schema.clone()).with_table(t.clone()));
    let (d, from, to) = prepare(driver, opts, wrap(from), wrap(to), false)?;
    let first = |r: &Realm| r.schemas.first().and_then(|s| s.tables.first()).cloned();
    let changes = match (first(&from), first(&to)) {
        (Some(f), Some(t)) => tables::changes(&d, &f, &t)?,
        _ => Vec::new(),
    };
    Ok(opts.post_process(changes))
}
