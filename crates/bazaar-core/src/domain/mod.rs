//! Marketplace domain: the category taxonomy, its dynamic attribute
//! questions, and the account records used for authentication.

pub mod entities;
pub mod tree;
pub mod value_objects;

pub use entities::*;
pub use tree::*;
pub use value_objects::*;
