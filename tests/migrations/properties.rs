//! Property tests over randomly generated snapshots: up to five tables in `public`, each
//! with a key, a payload column, two unnamed checks and foreign keys to any table
//! present (itself included). Every property runs under both dependent-drop policies.

use crate::helpers::fixtures::empty;
use crate::helpers::migration::MigrationTestHelper;
use proptest::prelude::*;
use schemaplan::catalog::{Check, Column, ForeignKey, Index, Realm, Schema, Table, Type};
use schemaplan::diff::Change;
use schemaplan::driver::{DependentDrop, StandardDriver};

const NAMES: [&str; 5] = ["t0", "t1", "t2", "t3", "t4"];

type TableSpec = (bool, usize, Vec<usize>);

fn build(specs: Vec<TableSpec>) -> Realm {
    let present: Vec<bool> = specs.iter().map(|(p, _, _)| *p).collect();
    let mut schema = Schema::new("public");

    for (i, (is_present, payload, refs)) in specs.into_iter().enumerate() {
        if !is_present {
            continue;
        }
        let payload_type = match payload {
            0 => Type::integer(),
            1 => Type::bigint(),
            _ => Type::text(),
        };
        let mut table = Table::new(NAMES[i])
            .with_column(Column::of("id", Type::integer()))
            .with_column(Column::nullable("payload", payload_type))
            .with_primary_key(Index::new(format!("{}_pkey", NAMES[i])).on_columns(["id"]))
            .with_check(Check::new("", "id > 0"))
            .with_check(Check::new("", "id < 1000000"));

        let mut targets = refs;
        targets.sort();
        targets.dedup();
        for target in targets.into_iter().filter(|t| present[*t]) {
            let column = format!("ref_{}", NAMES[target]);
            table = table
                .with_column(Column::nullable(column.clone(), Type::integer()))
                .with_foreign_key(ForeignKey::new(
                    format!("{}_{}_fk", NAMES[i], column),
                    [column],
                    NAMES[target].to_string(),
                    ["id".to_string()],
                ));
        }
        schema = schema.with_table(table);
    }

    Realm::new().with_schema(schema)
}

fn specs_strategy() -> impl Strategy<Value = Vec<TableSpec>> {
    prop::collection::vec(
        (
            any::<bool>(),
            0..3usize,
            prop::collection::vec(0..NAMES.len(), 0..3),
        ),
        NAMES.len(),
    )
}

fn realm_strategy() -> impl Strategy<Value = Realm> {
    specs_strategy().prop_map(build)
}

/// A snapshot and a reduction of it: some tables dropped, and some foreign key columns
/// dropped together with their keys, often while the referenced table goes away too.
fn shrink_strategy() -> impl Strategy<Value = (Realm, Realm)> {
    (
        specs_strategy(),
        prop::collection::vec(any::<bool>(), NAMES.len()),
        prop::collection::vec(any::<bool>(), NAMES.len()),
    )
        .prop_map(|(specs, keep_table, keep_refs)| {
            let reduced = specs
                .iter()
                .enumerate()
                .map(|(i, (present, payload, refs))| {
                    let refs = if keep_refs[i] { refs.clone() } else { Vec::new() };
                    (*present && keep_table[i], *payload, refs)
                })
                .collect();
            (build(specs), build(reduced))
        })
}

fn policy_strategy() -> impl Strategy<Value = DependentDrop> {
    prop_oneof![Just(DependentDrop::Explicit), Just(DependentDrop::Implicit)]
}

fn helper(policy: DependentDrop) -> MigrationTestHelper {
    MigrationTestHelper::new().with_driver(StandardDriver::new().with_dependent_drop(policy))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_diff_is_reflexive(realm in realm_strategy(), policy in policy_strategy()) {
        let changes = helper(policy).diff(&realm, &realm).unwrap();
        prop_assert!(changes.is_empty(), "{:?}", changes);
    }

    #[test]
    fn prop_add_and_drop_are_symmetric(realm in realm_strategy(), policy in policy_strategy()) {
        let helper = helper(policy);
        let tables = realm.tables().count();

        let adds = helper.diff(&empty(), &realm).unwrap();
        let drops = helper.diff(&realm, &empty()).unwrap();

        prop_assert_eq!(adds.len(), tables);
        prop_assert_eq!(drops.len(), tables);
        prop_assert!(adds.iter().all(|c| matches!(c, Change::AddTable(_))));
        prop_assert!(drops.iter().all(|c| matches!(c, Change::DropTable(_))));
        for (add, drop) in adds.iter().zip(&drops) {
            prop_assert_eq!(add.reverse().tag(), drop.tag());
        }
    }

    #[test]
    fn prop_plans_apply_in_dependency_order(
        from in realm_strategy(),
        to in realm_strategy(),
        policy in policy_strategy(),
    ) {
        let result = helper(policy).run_migration_test(&from, &to, |_, _| Ok(()));
        prop_assert!(result.is_ok(), "{:#}", result.unwrap_err());
    }

    #[test]
    fn prop_reductions_apply_in_dependency_order(
        (from, to) in shrink_strategy(),
        policy in policy_strategy(),
    ) {
        let result = helper(policy).run_migration_test(&from, &to, |_, _| Ok(()));
        prop_assert!(result.is_ok(), "{:#}", result.unwrap_err());
    }

    #[test]
    fn prop_ordering_keeps_every_change(
        from in realm_strategy(),
        to in realm_strategy(),
        policy in policy_strategy(),
    ) {
        let helper = helper(policy);
        let changes = helper.diff(&from, &to).unwrap();
        let ordered = helper.ordered(&from, &to).unwrap();

        let tables = |cs: &[Change]| {
            let mut names: Vec<String> = cs
                .iter()
                .filter(|c| !matches!(c, Change::ModifyTable { .. }))
                .map(|c| c.to_string())
                .collect();
            names.sort();
            names
        };
        // detaching only ever adds ModifyTable steps
        prop_assert_eq!(tables(&changes), tables(&ordered));
    }
}
