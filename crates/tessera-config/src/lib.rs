//! # Tessera Config
//!
//! Configuration management for Tessera.
//! Supports layered configuration from TOML files, a `.env` file and
//! `TESSERA_*` environment variables, validated before use.

mod app_config;
mod loader;
mod validation;

pub use app_config::*;
pub use loader::*;
pub use validation::*;
