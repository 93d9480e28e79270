use crate::helpers::fixtures::{blog, pets, public, users};
use crate::helpers::migration::MigrationTestHelper;
use anyhow::Result;
use schemaplan::catalog::{Column, ColumnDefault, Realm, Type};
use schemaplan::diff::{Change, ChangeKind, DiffOptions, RenameHint};

#[test]
fn test_create_schema_from_empty() -> Result<()> {
    let helper = MigrationTestHelper::new();

    helper.run_migration_test(&Realm::new(), &blog(), |plan, final_state| {
        assert_eq!(plan.steps[0].description, "add schema public");
        assert_eq!(plan.steps[1].description, "add enum public.mood");

        let position = |name: &str| {
            plan.steps
                .iter()
                .position(|s| s.description == format!("add table public.{name}"))
                .unwrap()
        };
        assert!(position("users") < position("posts"));
        assert!(position("posts") < position("comments"));

        assert_eq!(final_state.tables().count(), 3);
        assert!(plan.reversible);
        assert!(plan.transactional);
        Ok(())
    })
}

#[test]
fn test_drop_schema_to_empty() -> Result<()> {
    let helper = MigrationTestHelper::new();

    helper.run_migration_test(&blog(), &Realm::new(), |plan, final_state| {
        assert!(final_state.schemas.is_empty());
        assert!(plan.is_destructive());
        assert_eq!(plan.steps.last().unwrap().description, "drop schema public");
        Ok(())
    })
}

#[test]
fn test_users_pets_example() -> Result<()> {
    let helper = MigrationTestHelper::new();
    let current = public([users()]);
    let desired = public([users().with_column(Column::of("name", Type::text())), pets()]);

    helper.run_migration_test(&current, &desired, |plan, _| {
        let steps: Vec<&str> = plan.steps.iter().map(|s| s.description.as_str()).collect();
        assert_eq!(
            steps,
            vec![
                "modify table public.users (add column name)",
                "add table public.pets",
            ]
        );
        assert!(plan.reversible);
        Ok(())
    })
}

#[test]
fn test_identical_realms_produce_no_steps() -> Result<()> {
    let helper = MigrationTestHelper::new();
    let plan = helper.plan(&blog(), &blog())?;

    assert!(plan.is_empty());
    assert_eq!(plan.render_sql(), "-- No changes detected\n");
    assert_eq!(plan.render_reverse_sql().as_deref(), Some(""));
    Ok(())
}

#[test]
fn test_modify_column_default_only() -> Result<()> {
    let helper = MigrationTestHelper::new();
    let current = public([users().with_column(
        Column::of("status", Type::text()).with_default(ColumnDefault::Literal("'new'".into())),
    )]);
    let desired = public([users().with_column(
        Column::of("status", Type::text()).with_default(ColumnDefault::Literal("'active'".into())),
    )]);

    helper.run_migration_test(&current, &desired, |plan, _| {
        let [step] = plan.steps.as_slice() else {
            panic!("expected one step, got {}", plan.steps.len());
        };
        let Change::ModifyTable { changes, .. } = &step.change else {
            panic!("expected ModifyTable, got {}", step.change);
        };
        match changes.as_slice() {
            [Change::ModifyColumn { change, .. }] => assert_eq!(*change, ChangeKind::DEFAULT),
            other => panic!("unexpected children {:?}", other),
        }
        assert_eq!(
            plan.render_sql(),
            "ALTER TABLE \"public\".\"users\" ALTER COLUMN \"status\" SET DEFAULT 'active';"
        );
        Ok(())
    })
}

#[test]
fn test_equivalent_defaults_are_not_changes() -> Result<()> {
    let helper = MigrationTestHelper::new();
    let current = public([users().with_column(
        Column::of("status", Type::text()).with_default(ColumnDefault::Raw("'new'::text".into())),
    )]);
    let desired = public([users().with_column(
        Column::of("status", Type::text()).with_default(ColumnDefault::Literal("'new'".into())),
    )]);

    assert!(helper.diff(&current, &desired)?.is_empty());
    Ok(())
}

#[test]
fn test_rename_table_with_hint() -> Result<()> {
    let helper = MigrationTestHelper::new()
        .with_options(DiffOptions::new().rename(RenameHint::table("public", "people", "users")));

    let mut people = users();
    people.name = "people".into();

    helper.run_migration_test(&public([people]), &public([users()]), |plan, _| {
        let steps: Vec<&str> = plan.steps.iter().map(|s| s.description.as_str()).collect();
        assert_eq!(steps, vec!["rename table public.people to users"]);
        assert_eq!(
            plan.render_sql(),
            "ALTER TABLE \"public\".\"people\" RENAME TO \"users\";"
        );
        Ok(())
    })
}

#[test]
fn test_without_hint_rename_is_drop_and_add() -> Result<()> {
    let helper = MigrationTestHelper::new();
    let mut people = users();
    people.name = "people".into();

    helper.run_migration_test(&public([people]), &public([users()]), |plan, _| {
        let steps: Vec<&str> = plan.steps.iter().map(|s| s.description.as_str()).collect();
        assert_eq!(steps, vec!["drop table public.people", "add table public.users"]);
        Ok(())
    })
}
