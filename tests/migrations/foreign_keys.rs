use crate::helpers::fixtures::{empty, mutual, pets, public, users};
use crate::helpers::migration::MigrationTestHelper;
use anyhow::Result;
use schemaplan::catalog::{Column, ForeignKey, Index, Realm, Schema, Table, Type};
use schemaplan::diff::Change;
use schemaplan::driver::{DependentDrop, StandardDriver};
use schemaplan::error::{OrderError, PlanError};
use schemaplan::migrate::Planner;
use schemaplan::render::AnsiRenderer;

fn descriptions(plan: &schemaplan::migrate::Plan) -> Vec<&str> {
    plan.steps.iter().map(|s| s.description.as_str()).collect()
}

#[test]
fn test_mutual_references_are_created_then_linked() -> Result<()> {
    let helper = MigrationTestHelper::new();

    helper.run_migration_test(&empty(), &mutual("a", "b"), |plan, _| {
        assert_eq!(
            descriptions(plan),
            vec![
                "add table public.a",
                "add table public.b",
                "modify table public.a (add foreign key a_other_fk)",
                "modify table public.b (add foreign key b_other_fk)",
            ]
        );
        Ok(())
    })
}

#[test]
fn test_mutual_references_are_unlinked_then_dropped() -> Result<()> {
    let helper = MigrationTestHelper::new();

    helper.run_migration_test(&mutual("a", "b"), &empty(), |plan, _| {
        assert_eq!(
            descriptions(plan),
            vec![
                "modify table public.a (drop foreign key a_other_fk)",
                "modify table public.b (drop foreign key b_other_fk)",
                "drop table public.a",
                "drop table public.b",
            ]
        );
        Ok(())
    })
}

#[test]
fn test_mutual_references_roundtrip() -> Result<()> {
    MigrationTestHelper::new().run_roundtrip_test(&public([users()]), &mutual("a", "b"))
}

#[test]
fn test_cascaded_key_released_before_referenced_table_drop() -> Result<()> {
    let helper = MigrationTestHelper::new()
        .with_driver(StandardDriver::new().with_dependent_drop(DependentDrop::Implicit));
    let mut orphaned = pets();
    orphaned.columns.retain(|c| c.name != "owner_id");
    orphaned.foreign_keys.clear();

    helper.run_migration_test(&public([users(), pets()]), &public([orphaned.clone()]), |plan, _| {
        assert_eq!(
            descriptions(plan),
            vec![
                "modify table public.pets (drop foreign key pets_owner_fk (cascaded), drop column owner_id)",
                "drop table public.users",
            ]
        );
        assert_eq!(plan.steps[0].forward.len(), 1);
        assert_eq!(
            plan.steps[0].forward[0].sql,
            "ALTER TABLE \"public\".\"pets\" DROP COLUMN \"owner_id\";"
        );
        Ok(())
    })?;

    helper.run_migration_test(&public([orphaned]), &public([users(), pets()]), |_, _| Ok(()))
}

#[test]
fn test_self_reference_on_key_stays_inline() -> Result<()> {
    let nodes = Table::new("nodes")
        .with_columns([
            Column::of("id", Type::integer()),
            Column::nullable("parent_id", Type::integer()),
        ])
        .with_primary_key(Index::new("nodes_pkey").on_columns(["id"]))
        .with_foreign_key(ForeignKey::new("nodes_parent_fk", ["parent_id"], "nodes", ["id"]));

    MigrationTestHelper::new().run_migration_test(&empty(), &public([nodes]), |plan, _| {
        assert_eq!(descriptions(plan), vec!["add table public.nodes"]);
        Ok(())
    })
}

#[test]
fn test_self_reference_without_key_is_detached() -> Result<()> {
    let nodes = Table::new("nodes")
        .with_columns([
            Column::of("id", Type::integer()),
            Column::nullable("parent_id", Type::integer()),
        ])
        .with_foreign_key(ForeignKey::new("nodes_parent_fk", ["parent_id"], "nodes", ["id"]));

    MigrationTestHelper::new().run_migration_test(&empty(), &public([nodes]), |plan, _| {
        assert_eq!(
            descriptions(plan),
            vec![
                "add table public.nodes",
                "modify table public.nodes (add foreign key nodes_parent_fk)",
            ]
        );
        let Change::AddTable(created) = &plan.steps[0].change else {
            panic!("expected AddTable");
        };
        assert!(created.foreign_keys.is_empty());
        Ok(())
    })
}

#[test]
fn test_retargeted_key_waits_for_new_table() -> Result<()> {
    let owners = Table::new("owners")
        .with_column(Column::of("id", Type::integer()))
        .with_primary_key(Index::new("owners_pkey").on_columns(["id"]));
    let mut retargeted = pets();
    retargeted.foreign_keys[0].ref_table = "owners".into();

    let current = public([users(), pets()]);
    let desired = public([retargeted, users(), owners]);

    MigrationTestHelper::new().run_migration_test(&current, &desired, |plan, _| {
        let steps = descriptions(plan);
        let owners = steps.iter().position(|s| *s == "add table public.owners").unwrap();
        let pets = steps
            .iter()
            .position(|s| s.starts_with("modify table public.pets"))
            .unwrap();
        assert!(owners < pets, "{:?}", steps);
        Ok(())
    })
}

#[test]
fn test_cross_schema_reference() -> Result<()> {
    let orders = Table::new("orders")
        .with_columns([
            Column::of("id", Type::integer()),
            Column::of("user_id", Type::integer()),
        ])
        .with_primary_key(Index::new("orders_pkey").on_columns(["id"]))
        .with_foreign_key(
            ForeignKey::new("orders_user_fk", ["user_id"], "users", ["id"]).in_ref_schema("public"),
        );

    let current = empty();
    let desired = Realm::new()
        .with_schema(Schema::new("app").with_table(orders))
        .with_schema(Schema::new("public").with_table(users()));

    MigrationTestHelper::new().run_migration_test(&current, &desired, |plan, _| {
        let steps = descriptions(plan);
        let users = steps.iter().position(|s| *s == "add table public.users").unwrap();
        let orders = steps.iter().position(|s| *s == "add table app.orders").unwrap();
        assert!(users < orders, "{:?}", steps);
        assert_eq!(steps[0], "add schema app");
        Ok(())
    })
}

#[test]
fn test_rename_swap_is_unresolvable() {
    let changes = vec![
        Change::RenameTable {
            schema: "public".into(),
            from: "a".into(),
            to: "b".into(),
        },
        Change::RenameTable {
            schema: "public".into(),
            from: "b".into(),
            to: "a".into(),
        },
    ];

    let renderer = AnsiRenderer::new();
    let err = Planner::new(&renderer).plan(changes, "swap").unwrap_err();
    match err {
        PlanError::Order(OrderError::UnresolvableCycle { tables, changes }) => {
            assert_eq!(tables, vec!["public.a", "public.b"]);
            assert_eq!(changes.len(), 2);
        }
        other => panic!("expected UnresolvableCycle, got {other}"),
    }
}
