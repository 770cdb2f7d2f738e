#[cfg(feature = "otel")]
mod otel;
#[cfg(feature = "otel")]
pub use otel::{init_otel, shutdown_otel};

#[cfg(feature = "mongo")]
pub mod db;
#[cfg(feature = "mongo")]
pub use db::{ensure_indexes, init_mongo, mongo};

#[cfg(feature = "redis")]
pub mod redis;
#[cfg(feature = "redis")]
pub use redis::{init_redis, redis};

#[cfg(feature = "crypto")]
pub mod crypto;

#[cfg(feature = "env")]
mod env;
#[cfg(feature = "env")]
pub use env::env;
