//! # Bazaar REST
//!
//! REST API layer using Axum for the Bazaar marketplace backend.
//! Serves the category catalog, authentication, account management, pricing
//! settings, and health checks.

pub mod controllers;
pub mod extractors;
pub mod middleware;
pub mod openapi;
pub mod responses;
pub mod router;
pub mod state;

pub use router::*;
pub use state::*;
