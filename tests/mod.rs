// Integration tests for schemaplan

pub mod helpers;
pub mod migrations;
pub mod unit;
