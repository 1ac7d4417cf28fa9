//! # presence-database
//!
//! PostgreSQL connection management and concrete repository
//! implementations for presence sessions, presence aggregates, and the
//! profile / group-membership tables the presence engine reads from.

pub mod connection;
pub mod migration;
pub mod repositories;

pub use connection::DatabasePool;
