//! Data Transfer Objects for the service layer.

mod auth_dto;
mod catalog_dto;
mod pricing_dto;
mod user_dto;

pub use auth_dto::*;
pub use catalog_dto::*;
pub use pricing_dto::*;
pub use user_dto::*;
