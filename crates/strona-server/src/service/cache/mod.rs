//! Cache management services.
//!
//! - [`HealthCache`] - Health check caching with configurable TTL

mod health_cache;

pub use health_cache::HealthCache;
