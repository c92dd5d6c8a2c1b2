//! Value objects.

mod email;
mod role;
mod status;

pub use email::*;
pub use role::*;
pub use status::*;
