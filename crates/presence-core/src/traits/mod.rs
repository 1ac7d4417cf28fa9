//! Core traits defined in `presence-core` and implemented by other crates.

pub mod cache;

pub use cache::CacheProvider;
