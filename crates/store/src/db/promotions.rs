//! Promotion repository.

use sqlx::{PgExecutor, PgPool};

use emporium_core::{Discount, PromotionId};

use super::{RepositoryError, ensure_deleted};
use crate::models::Promotion;

/// Repository for promotion database operations.
pub struct PromotionRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> PromotionRepository<'a> {
    /// Create a new promotion repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Create a promotion.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create(
        &self,
        description: &str,
        discount: Discount,
    ) -> Result<Promotion, RepositoryError> {
        insert(self.pool, description, discount).await
    }

    /// Get a promotion by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no promotion has this ID.
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: PromotionId) -> Result<Promotion, RepositoryError> {
        sqlx::query_as::<_, Promotion>(
            "SELECT id, description, discount FROM store.promotion WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)
    }

    /// List all promotions.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self) -> Result<Vec<Promotion>, RepositoryError> {
        let promotions = sqlx::query_as::<_, Promotion>(
            "SELECT id, description, discount FROM store.promotion ORDER BY id",
        )
        .fetch_all(self.pool)
        .await?;

        Ok(promotions)
    }

    /// Delete a promotion. Its product links are removed with it.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the promotion does not exist.
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn delete(&self, id: PromotionId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM store.promotion WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        ensure_deleted(result.rows_affected())
    }
}

// =============================================================================
// Executor-level operations
// =============================================================================

/// Insert a promotion.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the insert fails.
pub async fn insert<'e, E>(
    executor: E,
    description: &str,
    discount: Discount,
) -> Result<Promotion, RepositoryError>
where
    E: PgExecutor<'e>,
{
    let promotion = sqlx::query_as::<_, Promotion>(
        r"
        INSERT INTO store.promotion (description, discount)
        VALUES ($1, $2)
        RETURNING id, description, discount
        ",
    )
    .bind(description)
    .bind(discount)
    .fetch_one(executor)
    .await?;

    Ok(promotion)
}
