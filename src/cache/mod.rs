//! Optional side-cache: key/value store with TTL plus the per-page TTL policy.

pub mod policy;
pub mod redis_store;
pub mod store;

pub use policy::{page_ttl, until_utc_midnight, PAGE_SIZE};
pub use redis_store::RedisStore;
pub use store::{CacheStore, MemoryStore, SharedCache};
