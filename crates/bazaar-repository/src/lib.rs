//! # Bazaar Repository
//!
//! Persistence for the catalog taxonomy, questions, users, and access token
//! records.
//!
//! ```text
//! Service
//!   ↓  Arc<dyn CategoryRepository> / QuestionRepository / ...
//! MySqlCategoryRepository, ...   (SQLx)
//!   ↓
//! MySQL
//! ```

pub mod mysql;
pub mod pool;
pub mod traits;

pub use mysql::*;
pub use pool::*;
pub use traits::*;
