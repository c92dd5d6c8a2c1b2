//! # Bazaar Config
//!
//! Layered configuration for the marketplace backend: TOML files under
//! `config/`, then `BAZAAR__*` environment variables.

mod app_config;
mod loader;

pub use app_config::*;
pub use loader::*;
