//! # Bazaar Security
//!
//! JWT access tokens backed by server-side records, Argon2 password
//! hashing, and resource authorization policies.

pub mod authorization;
pub mod jwt;
pub mod password;

pub use authorization::*;
pub use jwt::*;
pub use password::*;
