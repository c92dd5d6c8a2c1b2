//! MySQL repository implementations.

mod access_token_repository;
mod category_repository;
mod question_repository;
mod user_repository;

pub use access_token_repository::*;
pub use category_repository::*;
pub use question_repository::*;
pub use user_repository::*;
