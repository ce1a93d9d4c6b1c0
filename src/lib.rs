//! Settings loading and deployment planning for dye-managed Django projects.

pub mod cli;
pub mod config;
pub mod deploy;
pub mod migration;
