//! Caching infrastructure for the service layer.
//!
//! A JSON-over-strings cache abstraction with Redis and in-process backends,
//! plus the stampede guard used for expensive read-through entries such as
//! the category tree.

mod cache_interface;
pub mod cache_keys;
mod memory_cache;
mod read_through;
mod redis_cache;
mod single_flight;

pub use cache_interface::{CacheExt, CacheInterface};
pub use memory_cache::MemoryCacheService;
pub use read_through::StampedeGuard;
pub use redis_cache::RedisCacheService;
pub use single_flight::SingleFlight;
