pub mod fixtures;
pub mod migration;
pub mod simulator;
