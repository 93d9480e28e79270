// Migration integration tests
// Tests for diff generation, ordering, rendering, and end-to-end plan application

pub mod enums;
pub mod foreign_keys;
pub mod properties;
pub mod sql_snapshots;
pub mod tables;
