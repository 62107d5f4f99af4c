// ABOUTME: Library root for skylift - exposes public types for testing.
// ABOUTME: The main binary is in main.rs.

pub mod cdn;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod health;
pub mod infra;
pub mod output;
pub mod release;
pub mod sync;
pub mod types;
