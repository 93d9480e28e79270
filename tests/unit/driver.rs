//! Driver behaviour observed through the public diff entry points.

use anyhow::Result;
use rstest::rstest;
use schemaplan::catalog::{Column, ColumnDefault, ColumnType, Index, Realm, Schema, Table, Type};
use schemaplan::diff::{Change, ChangeKind, DiffOptions, realm_diff, table_diff};
use schemaplan::driver::{DependentDrop, DiffDriver, Registry, StandardDriver};

fn single(column: Column) -> Realm {
    Realm::new().with_schema(
        Schema::new("public").with_table(Table::new("t").with_column(column)),
    )
}

fn raw(raw: &str) -> Column {
    Column::new(
        "c",
        ColumnType::new(Type::Unsupported {
            raw: raw.to_string(),
        }),
    )
}

#[rstest]
#[case::int_alias("int4", Type::integer(), false)]
#[case::upper_case("INTEGER", Type::integer(), false)]
#[case::varchar_alias("character varying(10)", Type::varchar(10), false)]
#[case::float_bucket("double precision", Type::Float { precision: Some(53) }, false)]
#[case::size_change("varchar(20)", Type::varchar(10), true)]
#[case::kind_change("bigint", Type::integer(), true)]
fn test_raw_types_are_classified(
    #[case] inspected: &str,
    #[case] declared: Type,
    #[case] changed: bool,
) -> Result<()> {
    let changes = realm_diff(
        &StandardDriver::new(),
        &single(raw(inspected)),
        &single(Column::of("c", declared)),
        &DiffOptions::default(),
    )?;

    assert_eq!(!changes.is_empty(), changed, "{:?}", changes);
    if changed {
        let Change::ModifyTable { changes, .. } = &changes[0] else {
            panic!("expected ModifyTable");
        };
        let [Change::ModifyColumn { change, .. }] = changes.as_slice() else {
            panic!("expected one ModifyColumn, got {:?}", changes);
        };
        assert!(change.is(ChangeKind::TYPE));
    }
    Ok(())
}

/// A dialect that considers every default equal.
struct LenientDefaults(StandardDriver);

impl DiffDriver for LenientDefaults {
    fn name(&self) -> &str {
        "lenient"
    }

    fn registry(&self) -> &Registry {
        self.0.registry()
    }

    fn defaults_equal(&self, _from: Option<&ColumnDefault>, _to: Option<&ColumnDefault>) -> bool {
        true
    }
}

#[test]
fn test_overridden_capability_is_consulted() -> Result<()> {
    let from = Table::new("t").in_schema("public").with_column(
        Column::of("c", Type::integer()).with_default(ColumnDefault::Literal("1".into())),
    );
    let to = Table::new("t").in_schema("public").with_column(
        Column::of("c", Type::integer()).with_default(ColumnDefault::Literal("2".into())),
    );

    let standard = table_diff(&StandardDriver::new(), &from, &to, &DiffOptions::default())?;
    assert_eq!(standard.len(), 1);

    let lenient = table_diff(
        &LenientDefaults(StandardDriver::new()),
        &from,
        &to,
        &DiffOptions::default(),
    )?;
    assert!(lenient.is_empty());
    Ok(())
}

#[rstest]
#[case::explicit(DependentDrop::Explicit, vec!["drop index legacy_idx", "drop column legacy"])]
#[case::implicit(DependentDrop::Implicit, vec!["drop index legacy_idx (cascaded)", "drop column legacy"])]
fn test_dependent_drop_policy(
    #[case] policy: DependentDrop,
    #[case] expected: Vec<&str>,
) -> Result<()> {
    let from = Table::new("t")
        .in_schema("public")
        .with_column(Column::of("id", Type::integer()))
        .with_column(Column::of("legacy", Type::text()))
        .with_index(Index::new("legacy_idx").on_columns(["legacy"]));
    let to = Table::new("t")
        .in_schema("public")
        .with_column(Column::of("id", Type::integer()));

    let driver = StandardDriver::new().with_dependent_drop(policy);
    let changes = table_diff(&driver, &from, &to, &DiffOptions::default())?;
    let names: Vec<String> = changes.iter().map(|c| c.to_string()).collect();

    assert_eq!(names, expected);
    Ok(())
}
