//! SQLite persistence layer for cash-track
//!
//! Provides persistent storage for:
//! - Users and their cutoff day
//! - Transactions (chat entries and uploaded slips)
//! - Dashboard aggregates over confirmed rows

pub mod client;
pub mod dashboard;
pub mod error;
pub mod repository;
pub mod schema;
pub mod transactions;
pub mod users;

pub use client::{SqliteClient, SqliteConfig};
pub use error::PersistenceError;
pub use repository::SqliteRepository;

/// Open the database, ensure the schema and the default user
pub async fn init(config: SqliteConfig) -> Result<SqliteRepository, PersistenceError> {
    let client = SqliteClient::open(config).await?;
    client.ensure_schema().await?;

    let repository = SqliteRepository::new(client);
    repository.ensure_default().await?;

    Ok(repository)
}
