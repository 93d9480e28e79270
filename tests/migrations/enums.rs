use crate::helpers::fixtures::{public, users};
use crate::helpers::migration::MigrationTestHelper;
use anyhow::Result;
use schemaplan::catalog::{Column, Object, Realm, Schema, Type};
use schemaplan::error::PlanError;
use schemaplan::migrate::{PlanOptions, Planner};
use schemaplan::render::AnsiRenderer;

fn mood_column() -> Column {
    Column::nullable(
        "mood",
        Type::Enum {
            schema: None,
            name: "mood".into(),
            values: vec!["happy".into(), "sad".into()],
        },
    )
}

fn with_mood(values: &[&str], column: bool) -> Realm {
    let users = if column {
        users().with_column(mood_column())
    } else {
        users()
    };
    Realm::new().with_schema(
        Schema::new("public")
            .with_object(Object::enum_type("mood", values.iter().copied()))
            .with_table(users),
    )
}

#[test]
fn test_enum_created_before_its_column() -> Result<()> {
    let helper = MigrationTestHelper::new();

    helper.run_migration_test(&public([users()]), &with_mood(&["happy", "sad"], true), |plan, _| {
        let steps: Vec<&str> = plan.steps.iter().map(|s| s.description.as_str()).collect();
        assert_eq!(
            steps,
            vec!["add enum public.mood", "modify table public.users (add column mood)"]
        );
        assert_eq!(
            plan.steps[0].forward[0].sql,
            "CREATE TYPE \"public\".\"mood\" AS ENUM ('happy', 'sad');"
        );
        Ok(())
    })
}

#[test]
fn test_enum_dropped_after_its_column() -> Result<()> {
    let helper = MigrationTestHelper::new();

    helper.run_migration_test(&with_mood(&["happy", "sad"], true), &public([users()]), |plan, _| {
        let steps: Vec<&str> = plan.steps.iter().map(|s| s.description.as_str()).collect();
        assert_eq!(
            steps,
            vec!["modify table public.users (drop column mood)", "drop enum public.mood"]
        );
        Ok(())
    })
}

#[test]
fn test_appended_value_is_not_transactional() -> Result<()> {
    let helper = MigrationTestHelper::new();
    let current = with_mood(&["happy", "sad"], false);
    let desired = with_mood(&["meh", "happy", "sad", "angry"], false);

    helper.run_migration_test(&current, &desired, |plan, _| {
        assert!(!plan.transactional);
        assert!(!plan.reversible);
        assert_eq!(
            plan.render_sql(),
            "ALTER TYPE \"public\".\"mood\" ADD VALUE 'meh' BEFORE 'happy';\n\n\
             ALTER TYPE \"public\".\"mood\" ADD VALUE 'angry' AFTER 'sad';"
        );
        assert!(plan.render_reverse_sql().is_none());
        Ok(())
    })
}

#[test]
fn test_irreversible_plan_rejected_on_request() -> Result<()> {
    let helper = MigrationTestHelper::new();
    let changes = helper.diff(
        &with_mood(&["happy"], false),
        &with_mood(&["happy", "sad"], false),
    )?;

    let renderer = AnsiRenderer::new();
    let err = Planner::new(&renderer)
        .with_options(PlanOptions {
            allow_irreversible: false,
            transactional: true,
        })
        .plan(changes, "add_sad")
        .unwrap_err();

    match err {
        PlanError::Irreversible { name, steps } => {
            assert_eq!(name, "add_sad");
            assert_eq!(steps, vec!["modify enum public.mood [values]"]);
        }
        other => panic!("expected Irreversible, got {other}"),
    }
    Ok(())
}

#[test]
fn test_removed_value_fails_to_render() -> Result<()> {
    let helper = MigrationTestHelper::new();
    let err = helper
        .plan(&with_mood(&["happy", "sad"], false), &with_mood(&["happy"], false))
        .unwrap_err();

    assert!(format!("{:#}", err).contains("drops or reorders values"));
    Ok(())
}
