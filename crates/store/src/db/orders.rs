//! Order repository.
//!
//! Orders are history. Every foreign key around them is `RESTRICT`, so deleting
//! an order with items, or a customer or product an order refers to, fails
//! with `RepositoryError::Protected`.

use sqlx::{PgExecutor, PgPool};

use emporium_core::{CustomerId, OrderId, PaymentStatus, Price, ProductId, Quantity};

use super::{RepositoryError, ensure_deleted};
use crate::models::{Order, OrderItem};

/// Repository for order database operations.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Place a new, pending order for a customer.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Protected` if the customer does not exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(&self, customer_id: CustomerId) -> Result<Order, RepositoryError> {
        insert(self.pool, customer_id).await
    }

    /// Get an order by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no order has this ID.
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: OrderId) -> Result<Order, RepositoryError> {
        sqlx::query_as::<_, Order>(
            r#"
            SELECT id, placed_at, payment_status, customer_id
            FROM store."order"
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)
    }

    /// List a customer's orders, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_customer(
        &self,
        customer_id: CustomerId,
    ) -> Result<Vec<Order>, RepositoryError> {
        let orders = sqlx::query_as::<_, Order>(
            r#"
            SELECT id, placed_at, payment_status, customer_id
            FROM store."order"
            WHERE customer_id = $1
            ORDER BY placed_at DESC, id DESC
            "#,
        )
        .bind(customer_id)
        .fetch_all(self.pool)
        .await?;

        Ok(orders)
    }

    /// Record a payment status change.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the order does not exist.
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn set_payment_status(
        &self,
        id: OrderId,
        status: PaymentStatus,
    ) -> Result<Order, RepositoryError> {
        update_payment_status(self.pool, id, status).await
    }

    /// Add a product line to an order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Protected` if the order or product does not exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn add_item(
        &self,
        order_id: OrderId,
        product_id: ProductId,
        quantity: Quantity,
        unit_price: Price,
    ) -> Result<OrderItem, RepositoryError> {
        insert_item(self.pool, order_id, product_id, quantity, unit_price).await
    }

    /// List the items on an order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn items(&self, order_id: OrderId) -> Result<Vec<OrderItem>, RepositoryError> {
        let items = sqlx::query_as::<_, OrderItem>(
            r"
            SELECT id, order_id, product_id, quantity, unit_price
            FROM store.order_item
            WHERE order_id = $1
            ORDER BY id
            ",
        )
        .bind(order_id)
        .fetch_all(self.pool)
        .await?;

        Ok(items)
    }

    /// Delete an order that has no items.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Protected` if the order has items.
    /// Returns `RepositoryError::NotFound` if the order does not exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn delete(&self, id: OrderId) -> Result<(), RepositoryError> {
        let result = sqlx::query(r#"DELETE FROM store."order" WHERE id = $1"#)
            .bind(id)
            .execute(self.pool)
            .await
            .map_err(|e| RepositoryError::from_write(e, "delete order"))?;

        ensure_deleted(result.rows_affected())
    }
}

// =============================================================================
// Executor-level operations
// =============================================================================

/// Insert a pending order for a customer.
///
/// # Errors
///
/// Returns `RepositoryError::Protected` if the customer does not exist.
/// Returns `RepositoryError::Database` for other database errors.
pub async fn insert<'e, E>(executor: E, customer_id: CustomerId) -> Result<Order, RepositoryError>
where
    E: PgExecutor<'e>,
{
    let order = sqlx::query_as::<_, Order>(
        r#"
        INSERT INTO store."order" (customer_id)
        VALUES ($1)
        RETURNING id, placed_at, payment_status, customer_id
        "#,
    )
    .bind(customer_id)
    .fetch_one(executor)
    .await
    .map_err(|e| RepositoryError::from_write(e, "create order"))?;

    tracing::info!(order_id = %order.id, customer_id = %customer_id, "Placed order");
    Ok(order)
}

/// Change an order's payment status.
///
/// # Errors
///
/// Returns `RepositoryError::NotFound` if the order does not exist.
/// Returns `RepositoryError::Database` if the query fails.
pub async fn update_payment_status<'e, E>(
    executor: E,
    id: OrderId,
    status: PaymentStatus,
) -> Result<Order, RepositoryError>
where
    E: PgExecutor<'e>,
{
    let order = sqlx::query_as::<_, Order>(
        r#"
        UPDATE store."order"
        SET payment_status = $2
        WHERE id = $1
        RETURNING id, placed_at, payment_status, customer_id
        "#,
    )
    .bind(id)
    .bind(status)
    .fetch_optional(executor)
    .await?
    .ok_or(RepositoryError::NotFound)?;

    tracing::info!(order_id = %id, status = %status, "Updated payment status");
    Ok(order)
}

/// Insert an order line.
///
/// # Errors
///
/// Returns `RepositoryError::Protected` if the order or product does not exist.
/// Returns `RepositoryError::Database` for other database errors.
pub async fn insert_item<'e, E>(
    executor: E,
    order_id: OrderId,
    product_id: ProductId,
    quantity: Quantity,
    unit_price: Price,
) -> Result<OrderItem, RepositoryError>
where
    E: PgExecutor<'e>,
{
    let item = sqlx::query_as::<_, OrderItem>(
        r"
        INSERT INTO store.order_item (order_id, product_id, quantity, unit_price)
        VALUES ($1, $2, $3, $4)
        RETURNING id, order_id, product_id, quantity, unit_price
        ",
    )
    .bind(order_id)
    .bind(product_id)
    .bind(quantity)
    .bind(unit_price)
    .fetch_one(executor)
    .await
    .map_err(|e| RepositoryError::from_write(e, "add order item"))?;

    Ok(item)
}
