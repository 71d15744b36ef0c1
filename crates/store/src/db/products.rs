//! Product repository: lookups, filtered listings, preloads and aggregates.

use std::collections::HashMap;

use chrono::NaiveDate;
use sqlx::{PgExecutor, PgPool, Postgres, QueryBuilder};

use emporium_core::{CollectionId, Discount, Price, ProductId, PromotionId};

use super::{RepositoryError, ensure_deleted};
use crate::models::{
    Collection, CreateProductInput, Product, ProductAggregates, ProductFilter, ProductSortField,
    ProductSummary, ProductWithCollection, ProductWithPromotions, Promotion, UpdateProductInput,
};

const PRODUCT_COLUMNS: &str =
    "p.id, p.title, p.description, p.price, p.inventory, p.last_update, p.collection_id";

// =============================================================================
// Internal Row Types
// =============================================================================

/// Internal row type for the product/collection join.
#[derive(Debug, sqlx::FromRow)]
struct ProductWithCollectionRow {
    id: ProductId,
    title: String,
    description: String,
    price: Price,
    inventory: i32,
    last_update: NaiveDate,
    collection_id: CollectionId,
    collection_title: String,
    collection_featured_product_id: Option<ProductId>,
}

impl From<ProductWithCollectionRow> for ProductWithCollection {
    fn from(row: ProductWithCollectionRow) -> Self {
        Self {
            product: Product {
                id: row.id,
                title: row.title,
                description: row.description,
                price: row.price,
                inventory: row.inventory,
                last_update: row.last_update,
                collection_id: row.collection_id,
            },
            collection: Collection {
                id: row.collection_id,
                title: row.collection_title,
                featured_product_id: row.collection_featured_product_id,
            },
        }
    }
}

/// Internal row type for one product/promotion link.
#[derive(Debug, sqlx::FromRow)]
struct PromotionLinkRow {
    product_id: ProductId,
    id: PromotionId,
    description: String,
    discount: Discount,
}

/// Repository for product database operations.
pub struct ProductRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProductRepository<'a> {
    /// Create a new product repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List every product with its collection, loaded in a single joined query.
    ///
    /// `collection_id` is non-nullable, so the inner join yields exactly one
    /// row per product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn all_with_collection(&self) -> Result<Vec<ProductWithCollection>, RepositoryError> {
        select_with_collection(self.pool).await
    }

    /// Load the product listing and its aggregates from one snapshot.
    ///
    /// Both queries run in a single `REPEATABLE READ` transaction, so the
    /// listing length always equals `count` even while products are being
    /// written concurrently.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the transaction or either query fails.
    pub async fn snapshot_with_aggregates(
        &self,
    ) -> Result<(Vec<ProductWithCollection>, ProductAggregates), RepositoryError> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ, READ ONLY")
            .execute(&mut *tx)
            .await?;

        let products = select_with_collection(&mut *tx).await?;
        let aggregates = select_aggregates(&mut *tx).await?;
        tx.commit().await?;

        Ok((products, aggregates))
    }

    /// List every product with its promotions.
    ///
    /// Runs two queries regardless of the number of products: one for the
    /// products and one for all of their promotion links.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if either query fails.
    pub async fn all_with_promotions(&self) -> Result<Vec<ProductWithPromotions>, RepositoryError> {
        let products = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM store.product p ORDER BY p.id"
        ))
        .fetch_all(self.pool)
        .await?;

        if products.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<i32> = products.iter().map(|p| p.id.as_i32()).collect();
        let links = sqlx::query_as::<_, PromotionLinkRow>(
            r"
            SELECT pp.product_id, pr.id, pr.description, pr.discount
            FROM store.product_promotions pp
            INNER JOIN store.promotion pr ON pr.id = pp.promotion_id
            WHERE pp.product_id = ANY($1)
            ORDER BY pp.product_id, pr.id
            ",
        )
        .bind(&ids)
        .fetch_all(self.pool)
        .await?;

        Ok(attach_promotions(products, links))
    }

    /// Count products and find the lowest price across the whole table.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn aggregate(&self) -> Result<ProductAggregates, RepositoryError> {
        select_aggregates(self.pool).await
    }

    /// Get a product by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no product has this ID.
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: ProductId) -> Result<Product, RepositoryError> {
        self.find(id).await?.ok_or(RepositoryError::NotFound)
    }

    /// Find a product by ID, returning `None` if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn find(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let product = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM store.product p WHERE p.id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(product)
    }

    /// List products matching a filter.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn filter(&self, filter: &ProductFilter) -> Result<Vec<Product>, RepositoryError> {
        let products = build_filter_query(filter)
            .build_query_as::<Product>()
            .fetch_all(self.pool)
            .await?;

        Ok(products)
    }

    /// List every product's ID, title and description with its collection's title.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn titles_with_collection(&self) -> Result<Vec<ProductSummary>, RepositoryError> {
        let rows = sqlx::query_as::<_, ProductSummary>(
            r"
            SELECT p.id, p.title, p.description, c.title AS collection_title
            FROM store.product p
            INNER JOIN store.collection c ON c.id = p.collection_id
            ORDER BY p.id
            ",
        )
        .fetch_all(self.pool)
        .await?;

        Ok(rows)
    }

    /// Create a new product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Protected` if the collection does not exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(&self, input: &CreateProductInput) -> Result<Product, RepositoryError> {
        insert(self.pool, input).await
    }

    /// Update a product. `last_update` is refreshed by the database.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product does not exist.
    /// Returns `RepositoryError::Protected` if the new collection does not exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn update(
        &self,
        id: ProductId,
        input: &UpdateProductInput,
    ) -> Result<Product, RepositoryError> {
        let product = sqlx::query_as::<_, Product>(
            r"
            UPDATE store.product AS p
            SET
                title = COALESCE($2, p.title),
                description = COALESCE($3, p.description),
                price = COALESCE($4, p.price),
                inventory = COALESCE($5, p.inventory),
                collection_id = COALESCE($6, p.collection_id)
            WHERE p.id = $1
            RETURNING p.id, p.title, p.description, p.price, p.inventory, p.last_update,
                      p.collection_id
            ",
        )
        .bind(id)
        .bind(input.title.as_deref())
        .bind(input.description.as_deref())
        .bind(input.price)
        .bind(input.inventory)
        .bind(input.collection_id)
        .fetch_optional(self.pool)
        .await
        .map_err(|e| RepositoryError::from_write(e, "update product"))?
        .ok_or(RepositoryError::NotFound)?;

        Ok(product)
    }

    /// Delete a product.
    ///
    /// Cart lines and promotion links go with it, and any collection featuring
    /// it loses its featured product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Protected` if an order item references the product.
    /// Returns `RepositoryError::NotFound` if the product does not exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn delete(&self, id: ProductId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM store.product WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await
            .map_err(|e| RepositoryError::from_write(e, "delete product"))?;

        ensure_deleted(result.rows_affected())
    }

    /// Link a promotion to a product. Linking an already-linked pair is a no-op.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Protected` if either side does not exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn add_promotion(
        &self,
        product_id: ProductId,
        promotion_id: PromotionId,
    ) -> Result<(), RepositoryError> {
        link_promotion(self.pool, product_id, promotion_id).await
    }

    /// Unlink a promotion from a product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the pair was not linked.
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn remove_promotion(
        &self,
        product_id: ProductId,
        promotion_id: PromotionId,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            "DELETE FROM store.product_promotions WHERE product_id = $1 AND promotion_id = $2",
        )
        .bind(product_id)
        .bind(promotion_id)
        .execute(self.pool)
        .await?;

        ensure_deleted(result.rows_affected())
    }
}

// =============================================================================
// Executor-level operations
// =============================================================================
//
// These take any Postgres executor so they can run on the pool or inside a
// caller's transaction (`&mut *tx`).

async fn select_with_collection<'e, E>(
    executor: E,
) -> Result<Vec<ProductWithCollection>, RepositoryError>
where
    E: PgExecutor<'e>,
{
    let rows = sqlx::query_as::<_, ProductWithCollectionRow>(
        r"
        SELECT
            p.id, p.title, p.description, p.price, p.inventory, p.last_update,
            p.collection_id,
            c.title AS collection_title,
            c.featured_product_id AS collection_featured_product_id
        FROM store.product p
        INNER JOIN store.collection c ON c.id = p.collection_id
        ORDER BY p.id
        ",
    )
    .fetch_all(executor)
    .await?;

    Ok(rows.into_iter().map(Into::into).collect())
}

/// Count products and find the lowest price.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the query fails.
async fn select_aggregates<'e, E>(executor: E) -> Result<ProductAggregates, RepositoryError>
where
    E: PgExecutor<'e>,
{
    let aggregates = sqlx::query_as::<_, ProductAggregates>(
        r"
        SELECT COUNT(id) AS count, MIN(price) AS min_price
        FROM store.product
        ",
    )
    .fetch_one(executor)
    .await?;

    Ok(aggregates)
}

/// Insert a product.
///
/// # Errors
///
/// Returns `RepositoryError::Protected` if the collection does not exist.
/// Returns `RepositoryError::Database` for other database errors.
pub async fn insert<'e, E>(
    executor: E,
    input: &CreateProductInput,
) -> Result<Product, RepositoryError>
where
    E: PgExecutor<'e>,
{
    let product = sqlx::query_as::<_, Product>(
        r"
        INSERT INTO store.product AS p (title, description, price, inventory, collection_id)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING p.id, p.title, p.description, p.price, p.inventory, p.last_update,
                  p.collection_id
        ",
    )
    .bind(&input.title)
    .bind(&input.description)
    .bind(input.price)
    .bind(input.inventory)
    .bind(input.collection_id)
    .fetch_one(executor)
    .await
    .map_err(|e| RepositoryError::from_write(e, "create product"))?;

    tracing::debug!(product_id = %product.id, "Created product");
    Ok(product)
}

/// Link a promotion to a product, ignoring an existing link.
///
/// # Errors
///
/// Returns `RepositoryError::Protected` if either side does not exist.
/// Returns `RepositoryError::Database` for other database errors.
pub async fn link_promotion<'e, E>(
    executor: E,
    product_id: ProductId,
    promotion_id: PromotionId,
) -> Result<(), RepositoryError>
where
    E: PgExecutor<'e>,
{
    sqlx::query(
        r"
        INSERT INTO store.product_promotions (product_id, promotion_id)
        VALUES ($1, $2)
        ON CONFLICT (product_id, promotion_id) DO NOTHING
        ",
    )
    .bind(product_id)
    .bind(promotion_id)
    .execute(executor)
    .await
    .map_err(|e| RepositoryError::from_write(e, "add promotion to product"))?;

    Ok(())
}

/// Group promotion links under their products, keeping product order.
fn attach_promotions(
    products: Vec<Product>,
    links: Vec<PromotionLinkRow>,
) -> Vec<ProductWithPromotions> {
    let mut by_product: HashMap<ProductId, Vec<Promotion>> = HashMap::new();
    for link in links {
        by_product.entry(link.product_id).or_default().push(Promotion {
            id: link.id,
            description: link.description,
            discount: link.discount,
        });
    }

    products
        .into_iter()
        .map(|product| {
            let promotions = by_product.remove(&product.id).unwrap_or_default();
            ProductWithPromotions {
                product,
                promotions,
            }
        })
        .collect()
}

/// Build the `SELECT` for [`ProductRepository::filter`].
fn build_filter_query(filter: &ProductFilter) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::new(format!("SELECT {PRODUCT_COLUMNS} FROM store.product p"));

    if filter.has_criteria() {
        let joiner = if filter.any { " OR " } else { " AND " };
        qb.push(" WHERE (");
        let mut first = true;
        let mut next = |qb: &mut QueryBuilder<'static, Postgres>| {
            if !first {
                qb.push(joiner);
            }
            first = false;
        };

        if let Some((min, max)) = filter.price_between {
            next(&mut qb);
            qb.push("p.price BETWEEN ")
                .push_bind(min)
                .push(" AND ")
                .push_bind(max);
        }
        if let Some(price) = filter.price_below {
            next(&mut qb);
            qb.push("p.price < ").push_bind(price);
        }
        if let Some(units) = filter.inventory_below {
            next(&mut qb);
            qb.push("p.inventory < ").push_bind(units);
        }
        if let Some(year) = filter.updated_in_year {
            next(&mut qb);
            qb.push("EXTRACT(YEAR FROM p.last_update) = ").push_bind(year);
        }
        if let Some(present) = filter.has_description {
            next(&mut qb);
            qb.push("(p.description <> '') = ").push_bind(present);
        }
        if filter.inventory_matches_price {
            next(&mut qb);
            qb.push("p.inventory = p.price");
        }
        qb.push(")");
    }

    let (field, direction) = filter.order_by.unwrap_or_default();
    qb.push(" ORDER BY ")
        .push(field.column())
        .push(" ")
        .push(direction.keyword());
    if field != ProductSortField::Id {
        qb.push(", p.id");
    }

    if let Some(limit) = filter.limit {
        qb.push(" LIMIT ").push_bind(i64::from(limit));
    }
    if let Some(offset) = filter.offset {
        qb.push(" OFFSET ").push_bind(i64::from(offset));
    }

    qb
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::models::SortDirection;

    fn product(id: i32) -> Product {
        Product {
            id: ProductId::new(id),
            title: format!("Product {id}"),
            description: "desc".to_string(),
            price: Price::from_cents(1000).unwrap(),
            inventory: 3,
            last_update: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            collection_id: CollectionId::new(1),
        }
    }

    fn link(product_id: i32, promotion_id: i32) -> PromotionLinkRow {
        PromotionLinkRow {
            product_id: ProductId::new(product_id),
            id: PromotionId::new(promotion_id),
            description: format!("Promo {promotion_id}"),
            discount: Discount::new(0.1).unwrap(),
        }
    }

    #[test]
    fn test_attach_promotions_keeps_every_product_once() {
        let products = vec![product(1), product(2), product(3)];
        let links = vec![link(1, 10), link(1, 11), link(3, 10)];

        let grouped = attach_promotions(products, links);

        let ids: Vec<i32> = grouped.iter().map(|p| p.product.id.as_i32()).collect();
        assert_eq!(ids, [1, 2, 3]);
        let counts: Vec<usize> = grouped.iter().map(|p| p.promotions.len()).collect();
        assert_eq!(counts, [2, 0, 1]);
        assert_eq!(grouped[0].promotions[1].id, PromotionId::new(11));
    }

    #[test]
    fn test_filter_without_criteria_selects_all() {
        let qb = build_filter_query(&ProductFilter::default());
        assert_eq!(
            qb.sql(),
            format!("SELECT {PRODUCT_COLUMNS} FROM store.product p ORDER BY p.id ASC")
        );
    }

    #[test]
    fn test_filter_and_combines_conditions() {
        let filter = ProductFilter::default()
            .inventory_below(10)
            .price_below(Price::from_cents(2000).unwrap());
        let sql = build_filter_query(&filter).sql().to_owned();

        assert!(sql.contains("WHERE (p.price < $1 AND p.inventory < $2)"), "{sql}");
    }

    #[test]
    fn test_filter_or_combines_conditions() {
        let filter = ProductFilter::default()
            .inventory_below(10)
            .price_below(Price::from_cents(2000).unwrap())
            .match_any();
        let sql = build_filter_query(&filter).sql().to_owned();

        assert!(sql.contains("WHERE (p.price < $1 OR p.inventory < $2)"), "{sql}");
    }

    #[test]
    fn test_filter_range_year_and_description() {
        let filter = ProductFilter::default()
            .price_between(Price::from_cents(2000).unwrap(), Price::from_cents(3000).unwrap())
            .updated_in_year(2021)
            .has_description(false);
        let sql = build_filter_query(&filter).sql().to_owned();

        assert!(sql.contains("p.price BETWEEN $1 AND $2"), "{sql}");
        assert!(sql.contains("EXTRACT(YEAR FROM p.last_update) = $3"), "{sql}");
        assert!(sql.contains("(p.description <> '') = $4"), "{sql}");
    }

    #[test]
    fn test_filter_inventory_matches_price() {
        let sql = build_filter_query(&ProductFilter::default().inventory_matches_price())
            .sql()
            .to_owned();
        assert!(sql.contains("WHERE (p.inventory = p.price)"), "{sql}");

        let filter = ProductFilter::default()
            .inventory_below(3)
            .inventory_matches_price()
            .match_any();
        let sql = build_filter_query(&filter).sql().to_owned();
        assert!(sql.contains("WHERE (p.inventory < $1 OR p.inventory = p.price)"), "{sql}");
    }

    #[test]
    fn test_filter_ordering_and_slicing() {
        let filter = ProductFilter::default()
            .order_by(ProductSortField::Title, SortDirection::Descending)
            .offset(5)
            .limit(5);
        let sql = build_filter_query(&filter).sql().to_owned();

        assert!(sql.ends_with("ORDER BY p.title DESC, p.id LIMIT $1 OFFSET $2"), "{sql}");
    }
}
