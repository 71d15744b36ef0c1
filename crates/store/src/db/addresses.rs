//! Address repository. Addresses are keyed by their customer.

use sqlx::{PgExecutor, PgPool};

use emporium_core::CustomerId;

use super::{RepositoryError, ensure_deleted};
use crate::models::Address;

/// Repository for customer address operations.
pub struct AddressRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> AddressRepository<'a> {
    /// Create a new address repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Set a customer's address, replacing any existing one.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Protected` if the customer does not exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn upsert(
        &self,
        customer_id: CustomerId,
        street: &str,
        city: &str,
    ) -> Result<Address, RepositoryError> {
        upsert(self.pool, customer_id, street, city).await
    }

    /// Get a customer's address, if they have one.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, customer_id: CustomerId) -> Result<Option<Address>, RepositoryError> {
        let address = sqlx::query_as::<_, Address>(
            "SELECT customer_id, street, city FROM store.address WHERE customer_id = $1",
        )
        .bind(customer_id)
        .fetch_optional(self.pool)
        .await?;

        Ok(address)
    }

    /// Remove a customer's address.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the customer has no address.
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn delete(&self, customer_id: CustomerId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM store.address WHERE customer_id = $1")
            .bind(customer_id)
            .execute(self.pool)
            .await?;

        ensure_deleted(result.rows_affected())
    }
}

// =============================================================================
// Executor-level operations
// =============================================================================

/// Insert or replace a customer's address.
///
/// # Errors
///
/// Returns `RepositoryError::Protected` if the customer does not exist.
/// Returns `RepositoryError::Database` for other database errors.
pub async fn upsert<'e, E>(
    executor: E,
    customer_id: CustomerId,
    street: &str,
    city: &str,
) -> Result<Address, RepositoryError>
where
    E: PgExecutor<'e>,
{
    let address = sqlx::query_as::<_, Address>(
        r"
        INSERT INTO store.address (customer_id, street, city)
        VALUES ($1, $2, $3)
        ON CONFLICT (customer_id) DO UPDATE
            SET street = EXCLUDED.street, city = EXCLUDED.city
        RETURNING customer_id, street, city
        ",
    )
    .bind(customer_id)
    .bind(street)
    .bind(city)
    .fetch_one(executor)
    .await
    .map_err(|e| RepositoryError::from_write(e, "set address"))?;

    Ok(address)
}
