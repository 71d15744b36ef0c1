//! Collection repository.

use sqlx::{PgExecutor, PgPool};

use emporium_core::{CollectionId, ProductId};

use super::{RepositoryError, ensure_deleted};
use crate::models::Collection;

/// Repository for collection database operations.
pub struct CollectionRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CollectionRepository<'a> {
    /// Create a new collection repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Create a collection with no featured product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create(&self, title: &str) -> Result<Collection, RepositoryError> {
        insert(self.pool, title).await
    }

    /// Get a collection by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no collection has this ID.
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: CollectionId) -> Result<Collection, RepositoryError> {
        sqlx::query_as::<_, Collection>(
            "SELECT id, title, featured_product_id FROM store.collection WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)
    }

    /// List all collections ordered by title.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self) -> Result<Vec<Collection>, RepositoryError> {
        let collections = sqlx::query_as::<_, Collection>(
            "SELECT id, title, featured_product_id FROM store.collection ORDER BY title, id",
        )
        .fetch_all(self.pool)
        .await?;

        Ok(collections)
    }

    /// Set or clear the featured product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the collection does not exist.
    /// Returns `RepositoryError::Protected` if the product does not exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn set_featured_product(
        &self,
        id: CollectionId,
        product_id: Option<ProductId>,
    ) -> Result<Collection, RepositoryError> {
        update_featured_product(self.pool, id, product_id).await
    }

    /// Delete a collection.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Protected` if any product belongs to the collection.
    /// Returns `RepositoryError::NotFound` if the collection does not exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn delete(&self, id: CollectionId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM store.collection WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await
            .map_err(|e| RepositoryError::from_write(e, "delete collection"))?;

        ensure_deleted(result.rows_affected())
    }
}

// =============================================================================
// Executor-level operations
// =============================================================================

/// Insert a collection with no featured product.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the insert fails.
pub async fn insert<'e, E>(executor: E, title: &str) -> Result<Collection, RepositoryError>
where
    E: PgExecutor<'e>,
{
    let collection = sqlx::query_as::<_, Collection>(
        r"
        INSERT INTO store.collection (title)
        VALUES ($1)
        RETURNING id, title, featured_product_id
        ",
    )
    .bind(title)
    .fetch_one(executor)
    .await?;

    Ok(collection)
}

/// Set or clear a collection's featured product.
///
/// # Errors
///
/// Returns `RepositoryError::NotFound` if the collection does not exist.
/// Returns `RepositoryError::Protected` if the product does not exist.
/// Returns `RepositoryError::Database` for other database errors.
pub async fn update_featured_product<'e, E>(
    executor: E,
    id: CollectionId,
    product_id: Option<ProductId>,
) -> Result<Collection, RepositoryError>
where
    E: PgExecutor<'e>,
{
    sqlx::query_as::<_, Collection>(
        r"
        UPDATE store.collection
        SET featured_product_id = $2
        WHERE id = $1
        RETURNING id, title, featured_product_id
        ",
    )
    .bind(id)
    .bind(product_id)
    .fetch_optional(executor)
    .await
    .map_err(|e| RepositoryError::from_write(e, "set featured product"))?
    .ok_or(RepositoryError::NotFound)
}
