//! Customer repository.

use sqlx::{PgExecutor, PgPool};

use emporium_core::{CustomerId, Email, MembershipTier};

use super::{RepositoryError, ensure_deleted};
use crate::models::{CreateCustomerInput, Customer};

const CUSTOMER_COLUMNS: &str = "id, first_name, last_name, email, phone, birth_date, membership";

/// Repository for customer database operations.
pub struct CustomerRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CustomerRepository<'a> {
    /// Create a new customer repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Create a new customer.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the email already exists.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(&self, input: &CreateCustomerInput) -> Result<Customer, RepositoryError> {
        insert(self.pool, input).await
    }

    /// Get a customer by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no customer has this ID.
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: CustomerId) -> Result<Customer, RepositoryError> {
        sqlx::query_as::<_, Customer>(&format!(
            "SELECT {CUSTOMER_COLUMNS} FROM store.customer WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)
    }

    /// Get a customer by their email address.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_email(&self, email: &Email) -> Result<Option<Customer>, RepositoryError> {
        let customer = sqlx::query_as::<_, Customer>(&format!(
            "SELECT {CUSTOMER_COLUMNS} FROM store.customer WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(self.pool)
        .await?;

        Ok(customer)
    }

    /// List all customers ordered by name.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self) -> Result<Vec<Customer>, RepositoryError> {
        let customers = sqlx::query_as::<_, Customer>(&format!(
            "SELECT {CUSTOMER_COLUMNS} FROM store.customer ORDER BY last_name, first_name, id"
        ))
        .fetch_all(self.pool)
        .await?;

        Ok(customers)
    }

    /// Change a customer's membership tier.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the customer does not exist.
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn set_membership(
        &self,
        id: CustomerId,
        membership: MembershipTier,
    ) -> Result<Customer, RepositoryError> {
        sqlx::query_as::<_, Customer>(&format!(
            "UPDATE store.customer SET membership = $2 WHERE id = $1 RETURNING {CUSTOMER_COLUMNS}"
        ))
        .bind(id)
        .bind(membership)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)
    }

    /// Delete a customer. Their address is removed with them.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Protected` if the customer has placed orders.
    /// Returns `RepositoryError::NotFound` if the customer does not exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn delete(&self, id: CustomerId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM store.customer WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await
            .map_err(|e| RepositoryError::from_write(e, "delete customer"))?;

        ensure_deleted(result.rows_affected())
    }
}

// =============================================================================
// Executor-level operations
// =============================================================================

/// Insert a customer.
///
/// # Errors
///
/// Returns `RepositoryError::Conflict` if the email already exists.
/// Returns `RepositoryError::Database` for other database errors.
pub async fn insert<'e, E>(
    executor: E,
    input: &CreateCustomerInput,
) -> Result<Customer, RepositoryError>
where
    E: PgExecutor<'e>,
{
    let customer = sqlx::query_as::<_, Customer>(&format!(
        r"
        INSERT INTO store.customer
            (first_name, last_name, email, phone, birth_date, membership)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING {CUSTOMER_COLUMNS}
        "
    ))
    .bind(&input.first_name)
    .bind(&input.last_name)
    .bind(&input.email)
    .bind(&input.phone)
    .bind(input.birth_date)
    .bind(input.membership)
    .fetch_one(executor)
    .await
    .map_err(|e| RepositoryError::from_write(e, "email already exists"))?;

    tracing::info!(customer_id = %customer.id, "Created customer");
    Ok(customer)
}
