//! # Bazaar Service
//!
//! Business logic for the Bazaar marketplace backend: the cached category
//! catalog, account management, and token-based authentication.

pub mod auth_service;
pub mod cache;
pub mod catalog_service;
pub mod dto;
pub mod impls;
pub mod observer;
pub mod seeder;
pub mod user_cache;
pub mod user_service;

#[cfg(test)]
pub(crate) mod test_support;

pub use auth_service::*;
pub use cache::*;
pub use catalog_service::*;
pub use dto::*;
pub use impls::*;
pub use observer::*;
pub use seeder::*;
pub use user_cache::*;
pub use user_service::*;
