use anyhow::Result;
use schemaplan::catalog::{Column, Realm, Schema, Table, Type};
use schemaplan::config::{self, ConfigBuilder, ConfigInput, DiffInput, ObjectExcludeInput, ObjectsInput};
use schemaplan::diff::{ChangeTag, realm_diff};
use schemaplan::driver::StandardDriver;
use std::fs;
use tempfile::TempDir;

/// Integration tests for config files driving a diff end to end
mod config_integration_tests {
    use super::*;

    fn realm(tables: &[&str]) -> Realm {
        let mut public = Schema::new("public");
        let mut scratch = Schema::new("scratch");
        for name in tables {
            let table = Table::new(*name).with_column(Column::of("id", Type::integer()));
            public = public.with_table(table.clone());
            scratch = scratch.with_table(table);
        }
        Realm::new().with_schema(public).with_schema(scratch)
    }

    #[test]
    fn test_overrides_win_over_file() -> Result<()> {
        let file_config = ConfigInput {
            diff: Some(DiffInput {
                case_insensitive: Some(true),
                ..Default::default()
            }),
            objects: Some(ObjectsInput {
                include: None,
                exclude: Some(ObjectExcludeInput {
                    schemas: Some(vec!["temp_*".to_string()]),
                    tables: None,
                }),
            }),
            plan: None,
        };

        let overrides = ConfigInput {
            diff: Some(DiffInput {
                case_insensitive: Some(false),
                ..Default::default()
            }),
            ..Default::default()
        };

        let config = ConfigBuilder::new()
            .with_file(file_config)
            .with_overrides(overrides)
            .resolve()?;

        assert!(!config.diff.case_insensitive);
        // Verify exclude patterns from file config
        assert_eq!(config.objects.exclude.schemas, vec!["temp_*".to_string()]);

        Ok(())
    }

    #[test]
    fn test_config_file_filters_and_skips() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let config_path = temp_dir.path().join("schemaplan.yaml");
        fs::write(
            &config_path,
            r#"
diff:
  skip_changes: [drop_table]
objects:
  exclude:
    schemas: ["scratch"]
    tables: ["audit_*"]
"#,
        )?;

        let config = config::load(&config_path)?;
        let opts = config.diff_options();

        let current = realm(&["users", "legacy", "audit_log"]);
        let desired = realm(&["users", "orders", "audit_events"]);

        let changes = realm_diff(&StandardDriver::new(), &current, &desired, &opts)?;
        let names: Vec<String> = changes.iter().map(|c| c.to_string()).collect();

        // scratch is invisible, audit tables are invisible, drops are skipped
        assert_eq!(names, vec!["add table public.orders"]);
        assert!(changes.iter().all(|c| c.tag() != ChangeTag::DropTable));

        Ok(())
    }

    #[test]
    fn test_missing_config_file_resolves_to_defaults() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let config = config::load(temp_dir.path().join("absent.yaml"))?;

        assert_eq!(config.plan.name, "migration");
        assert!(config.plan_options().allow_irreversible);
        assert!(config.diff_options().filter.is_empty());

        Ok(())
    }
}
