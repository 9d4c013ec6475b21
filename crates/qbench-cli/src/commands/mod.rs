//! CLI command implementations.

pub mod backends;
pub mod common;
pub mod config;
pub mod run;
