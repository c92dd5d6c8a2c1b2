//! Domain entities.

mod access_token;
mod category;
mod question;
mod user;

pub use access_token::*;
pub use category::*;
pub use question::*;
pub use user::*;
