//! Catalog domain models: promotions, collections and products.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use emporium_core::{CollectionId, Discount, Price, ProductId, PromotionId};

/// A promotion that can apply to any number of products.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Promotion {
    /// Unique promotion ID.
    pub id: PromotionId,
    /// Short description shown to shoppers.
    pub description: String,
    /// Discount amount.
    pub discount: Discount,
}

/// A named group of products.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Collection {
    /// Unique collection ID.
    pub id: CollectionId,
    /// Collection title.
    pub title: String,
    /// Product highlighted for this collection. Cleared when that product is deleted.
    pub featured_product_id: Option<ProductId>,
}

/// A product for sale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Product {
    /// Unique product ID.
    pub id: ProductId,
    /// Product title.
    pub title: String,
    /// Long-form description.
    pub description: String,
    /// Unit price.
    pub price: Price,
    /// Units in stock.
    pub inventory: i32,
    /// Date of the last insert or update, maintained by the database.
    pub last_update: NaiveDate,
    /// Collection this product belongs to.
    pub collection_id: CollectionId,
}

/// A product with its collection loaded in the same query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProductWithCollection {
    /// The product itself.
    #[serde(flatten)]
    pub product: Product,
    /// The collection the product belongs to.
    pub collection: Collection,
}

/// A product with all of its promotions.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductWithPromotions {
    /// The product itself.
    #[serde(flatten)]
    pub product: Product,
    /// Promotions linked to the product, ordered by ID.
    pub promotions: Vec<Promotion>,
}

/// A narrow projection of a product and its collection title.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct ProductSummary {
    /// Product ID.
    pub id: ProductId,
    /// Product title.
    pub title: String,
    /// Product description.
    pub description: String,
    /// Title of the product's collection.
    pub collection_title: String,
}

/// Aggregates computed over the whole product table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, sqlx::FromRow)]
pub struct ProductAggregates {
    /// Number of products.
    pub count: i64,
    /// Lowest product price, `None` when there are no products.
    pub min_price: Option<Price>,
}

/// Input for creating a product.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateProductInput {
    /// Product title.
    pub title: String,
    /// Long-form description.
    pub description: String,
    /// Unit price.
    pub price: Price,
    /// Units in stock.
    pub inventory: i32,
    /// Collection the product belongs to.
    pub collection_id: CollectionId,
}

/// Input for updating a product. `None` fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateProductInput {
    /// Product title.
    pub title: Option<String>,
    /// Long-form description.
    pub description: Option<String>,
    /// Unit price.
    pub price: Option<Price>,
    /// Units in stock.
    pub inventory: Option<i32>,
    /// Collection the product belongs to.
    pub collection_id: Option<CollectionId>,
}

/// Column a product listing can be sorted by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductSortField {
    #[default]
    Id,
    Title,
    Price,
    LastUpdate,
}

impl ProductSortField {
    /// Qualified column name used in `ORDER BY`.
    #[must_use]
    pub const fn column(self) -> &'static str {
        match self {
            Self::Id => "p.id",
            Self::Title => "p.title",
            Self::Price => "p.price",
            Self::LastUpdate => "p.last_update",
        }
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

impl SortDirection {
    /// SQL keyword for this direction.
    #[must_use]
    pub const fn keyword(self) -> &'static str {
        match self {
            Self::Ascending => "ASC",
            Self::Descending => "DESC",
        }
    }
}

/// Filter criteria for listing products.
///
/// Set criteria are combined with `AND` unless [`ProductFilter::any`] is set,
/// in which case a product matching any one of them is returned. A filter with
/// no criteria matches every product.
///
/// ```
/// use emporium_core::Price;
/// use emporium_store::models::{ProductFilter, ProductSortField, SortDirection};
///
/// # fn main() -> Result<(), emporium_core::PriceError> {
/// let cheap_or_scarce = ProductFilter::default()
///     .inventory_below(10)
///     .price_below(Price::from_cents(2000)?)
///     .match_any()
///     .order_by(ProductSortField::Title, SortDirection::Descending)
///     .limit(5);
/// assert!(cheap_or_scarce.any);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductFilter {
    /// Inclusive price range.
    pub price_between: Option<(Price, Price)>,
    /// Price strictly below this value.
    pub price_below: Option<Price>,
    /// Inventory strictly below this value.
    pub inventory_below: Option<i32>,
    /// Calendar year of the last update.
    pub updated_in_year: Option<i32>,
    /// Whether the description is non-empty.
    pub has_description: Option<bool>,
    /// Inventory equal to the product's own price (a column-to-column comparison).
    #[serde(default)]
    pub inventory_matches_price: bool,
    /// Combine criteria with `OR` instead of `AND`.
    #[serde(default)]
    pub any: bool,
    /// Sort order, by product ID ascending when unset.
    pub order_by: Option<(ProductSortField, SortDirection)>,
    /// Maximum number of results.
    pub limit: Option<u32>,
    /// Number of results to skip.
    pub offset: Option<u32>,
}

impl ProductFilter {
    /// Restrict to prices in `min..=max`.
    #[must_use]
    pub const fn price_between(mut self, min: Price, max: Price) -> Self {
        self.price_between = Some((min, max));
        self
    }

    /// Restrict to prices below `price`.
    #[must_use]
    pub const fn price_below(mut self, price: Price) -> Self {
        self.price_below = Some(price);
        self
    }

    /// Restrict to inventory below `units`.
    #[must_use]
    pub const fn inventory_below(mut self, units: i32) -> Self {
        self.inventory_below = Some(units);
        self
    }

    /// Restrict to products last updated in `year`.
    #[must_use]
    pub const fn updated_in_year(mut self, year: i32) -> Self {
        self.updated_in_year = Some(year);
        self
    }

    /// Restrict by whether the description is empty.
    #[must_use]
    pub const fn has_description(mut self, present: bool) -> Self {
        self.has_description = Some(present);
        self
    }

    /// Restrict to products whose inventory equals their price.
    #[must_use]
    pub const fn inventory_matches_price(mut self) -> Self {
        self.inventory_matches_price = true;
        self
    }

    /// Match products satisfying any criterion rather than all of them.
    #[must_use]
    pub const fn match_any(mut self) -> Self {
        self.any = true;
        self
    }

    /// Sort the results.
    #[must_use]
    pub const fn order_by(mut self, field: ProductSortField, direction: SortDirection) -> Self {
        self.order_by = Some((field, direction));
        self
    }

    /// Return at most `limit` products.
    #[must_use]
    pub const fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Skip the first `offset` products.
    #[must_use]
    pub const fn offset(mut self, offset: u32) -> Self {
        self.offset = Some(offset);
        self
    }

    /// Whether any criterion is set.
    #[must_use]
    pub const fn has_criteria(&self) -> bool {
        self.price_between.is_some()
            || self.price_below.is_some()
            || self.inventory_below.is_some()
            || self.updated_in_year.is_some()
            || self.has_description.is_some()
            || self.inventory_matches_price
    }
}
