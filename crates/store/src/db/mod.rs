//! Database operations for the store `PostgreSQL` schema.
//!
//! # Schema: `store`
//!
//! ## Tables
//!
//! - `promotion`, `collection`, `product`, `product_promotions` - catalog
//! - `customer`, `address` - customers and their one-to-one address
//! - `order`, `order_item` - order history (`RESTRICT` foreign keys)
//! - `cart`, `cart_item` - carts (`CASCADE` foreign keys)
//!
//! Delete policies are enforced by the database. A blocked delete surfaces as
//! [`RepositoryError::Protected`], a duplicate unique value as
//! [`RepositoryError::Conflict`].
//!
//! # Transactions
//!
//! Repositories run each statement on the pool. Writes that must commit
//! together (seeding) use the module-level functions such as
//! [`products::insert`], which accept any executor:
//!
//! ```ignore
//! let mut tx = pool.begin().await?;
//! let collection = collections::insert(&mut *tx, "Baking").await?;
//! tx.commit().await?;
//! ```
//!
//! # Migrations
//!
//! Migrations are stored in `crates/store/migrations/`, embedded in
//! [`MIGRATOR`], and run via:
//! ```bash
//! cargo run -p emporium-cli -- migrate
//! ```

pub mod addresses;
pub mod carts;
pub mod collections;
pub mod customers;
pub mod orders;
pub mod products;
pub mod promotions;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::migrate::Migrator;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub use addresses::AddressRepository;
pub use carts::CartRepository;
pub use collections::CollectionRepository;
pub use customers::CustomerRepository;
pub use orders::OrderRepository;
pub use products::ProductRepository;
pub use promotions::PromotionRepository;

/// Embedded schema migrations.
pub static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., unique email).
    #[error("constraint violation: {0}")]
    Conflict(String),

    /// A foreign key blocked the operation (protected delete or dangling reference).
    #[error("protected: {0}")]
    Protected(String),
}

impl RepositoryError {
    /// Classify a write error, turning unique and foreign-key violations into
    /// [`RepositoryError::Conflict`] and [`RepositoryError::Protected`].
    ///
    /// `context` names the operation and is used as the error message.
    pub(crate) fn from_write(err: sqlx::Error, context: &str) -> Self {
        if let sqlx::Error::Database(ref db_err) = err {
            if db_err.is_unique_violation() {
                return Self::Conflict(context.to_owned());
            }
            if db_err.is_foreign_key_violation() {
                let detail = db_err
                    .constraint()
                    .map_or_else(|| context.to_owned(), |c| format!("{context} ({c})"));
                return Self::Protected(detail);
            }
        }
        Self::Database(err)
    }
}

/// Turn a `DELETE`'s affected row count into `NotFound` when nothing matched.
pub(crate) const fn ensure_deleted(rows_affected: u64) -> Result<(), RepositoryError> {
    if rows_affected == 0 {
        Err(RepositoryError::NotFound)
    } else {
        Ok(())
    }
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

/// Run all pending migrations against `pool`.
///
/// # Errors
///
/// Returns `MigrateError` if a migration fails or the applied history diverges.
pub async fn migrate(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    MIGRATOR.run(pool).await
}
