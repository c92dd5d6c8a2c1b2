//! # Bazaar Server Library
//!
//! Dependency wiring and startup for the Bazaar marketplace server.

pub mod app;
pub mod di;
pub mod startup;
