//! Common library for the Arena platform
//!
//! This crate provides shared functionality used across different services
//! in the Arena platform, including database connectivity, session cache
//! access, the shared error taxonomy and the internal account lookup client.

pub mod cache;
pub mod client;
pub mod database;
pub mod error;
pub mod models;

/// Example usage of the database module
///
/// ```rust,no_run
/// use common::database::{DatabaseConfig, init_pool, health_check};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let config = DatabaseConfig::from_env()?;
///     let pool = init_pool(&config).await?;
///     let is_healthy = health_check(&pool).await?;
///     println!("Database health check: {}", is_healthy);
///     Ok(())
/// }
/// ```
pub fn example_usage() {}
