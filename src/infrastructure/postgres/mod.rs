//! PostgreSQL persistence module.
//!
//! Provides connection pooling for the users table.

pub mod pool;

pub use pool::{PostgresPool, PostgresPoolError};
