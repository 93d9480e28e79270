//! SQL output snapshot tests using insta
//!
//! These tests verify that SQL generation is stable and produces expected output.
//! Snapshot testing helps catch unintended changes to SQL formatting.
//!
//! To update snapshots after intentional changes:
//! ```bash
//! cargo insta review
//! ```

use crate::helpers::fixtures::{empty, mutual, pets, public, users};
use crate::helpers::migration::MigrationTestHelper;
use anyhow::Result;
use insta::assert_snapshot;
use schemaplan::catalog::{Column, Index, Type};
use schemaplan::diff::Change;
use schemaplan::migrate::Planner;
use schemaplan::render::{AnsiRenderer, Hint};

#[test]
fn test_snapshot_users_pets() -> Result<()> {
    let helper = MigrationTestHelper::new();
    let current = public([users()]);
    let desired = public([users().with_column(Column::of("name", Type::text())), pets()]);

    let plan = helper.plan(&current, &desired)?;

    assert_snapshot!(plan.render_sql(), @r#"
    ALTER TABLE "public"."users" ADD COLUMN "name" text NOT NULL;

    CREATE TABLE "public"."pets" (
        "id" integer NOT NULL,
        "owner_id" integer NOT NULL,
        CONSTRAINT "pets_pkey" PRIMARY KEY ("id"),
        CONSTRAINT "pets_owner_fk" FOREIGN KEY ("owner_id") REFERENCES "public"."users" ("id")
    );
    "#);

    assert_snapshot!(plan.render_reverse_sql().unwrap(), @r#"
    DROP TABLE "public"."pets";

    ALTER TABLE "public"."users" DROP COLUMN "name";
    "#);

    Ok(())
}

#[test]
fn test_snapshot_mutual_references() -> Result<()> {
    let plan = MigrationTestHelper::new().plan(&empty(), &mutual("a", "b"))?;

    assert_snapshot!(plan.render_sql(), @r#"
    CREATE TABLE "public"."a" (
        "id" integer NOT NULL,
        "other_id" integer,
        CONSTRAINT "a_pkey" PRIMARY KEY ("id")
    );

    CREATE TABLE "public"."b" (
        "id" integer NOT NULL,
        "other_id" integer,
        CONSTRAINT "b_pkey" PRIMARY KEY ("id")
    );

    ALTER TABLE "public"."a" ADD CONSTRAINT "a_other_fk" FOREIGN KEY ("other_id") REFERENCES "public"."b" ("id");

    ALTER TABLE "public"."b" ADD CONSTRAINT "b_other_fk" FOREIGN KEY ("other_id") REFERENCES "public"."a" ("id");
    "#);

    Ok(())
}

#[test]
fn test_snapshot_hinted_index_build() -> Result<()> {
    let helper = MigrationTestHelper::new();
    let with_email = users().with_column(Column::of("email", Type::text()));
    let current = public([with_email.clone()]);
    let desired = public([with_email.with_index(Index::new("users_email_idx").on_columns(["email"]))]);

    let annotator = |change: &Change| match change {
        Change::ModifyTable { .. } => vec![Hint::Lock("SHARE".into()), Hint::Concurrent],
        _ => Vec::new(),
    };
    let renderer = AnsiRenderer::new();
    let plan = Planner::new(&renderer)
        .with_annotator(&annotator)
        .plan(helper.diff(&current, &desired)?, "email_idx")?;

    assert!(!plan.transactional);
    assert_eq!(plan.steps[0].hints.len(), 2);
    assert_snapshot!(plan.render_sql(), @r#"
    LOCK TABLE "public"."users" IN SHARE MODE;

    CREATE INDEX CONCURRENTLY "users_email_idx" ON "public"."users" ("email");
    "#);

    // hints are not carried to the reverse
    assert_snapshot!(plan.render_reverse_sql().unwrap(), @r#"DROP INDEX "public"."users_email_idx";"#);

    Ok(())
}
