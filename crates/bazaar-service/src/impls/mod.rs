//! Service implementations.
//!
//! This module contains the concrete implementations of service traits.

pub mod catalog_service_impl;
pub mod user_service_impl;

pub use catalog_service_impl::CatalogServiceImpl;
pub use user_service_impl::UserServiceImpl;
