#![doc = include_str!("../README.md")]

mod builder;
mod cache;
mod error;
mod metrics;
mod store;
mod traits;

pub use builder::CacheBuilder;
pub use cache::Cache;
pub use error::CacheError;
pub use metrics::CacheMetrics;
pub use traits::{Loader, RemovalListener, Weigher};
