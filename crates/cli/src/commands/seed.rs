//! Seed the store database with demonstration data.
//!
//! Reads a YAML catalog (the bundled `seed/catalog.yaml` unless a file is
//! given), validates its cross references, then inserts promotions,
//! collections, products, customers, addresses and orders in one transaction.
//! Seeding is skipped when the catalog already has products. A failed seed
//! writes nothing, so it can be retried after fixing the cause.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use chrono::NaiveDate;
use serde::Deserialize;
use sqlx::PgPool;
use tracing::{error, info};

use emporium_core::{Discount, Email, MembershipTier, PaymentStatus, Price, ProductId, Quantity};
use emporium_store::db::{
    ProductRepository, RepositoryError, addresses, collections, customers, orders, products,
    promotions,
};
use emporium_store::models::{CreateCustomerInput, CreateProductInput};

use super::connect;

const BUNDLED_CATALOG: &str = include_str!("../../seed/catalog.yaml");

/// Top-level seed file.
#[derive(Debug, Deserialize)]
pub struct SeedData {
    #[serde(default)]
    pub promotions: Vec<SeedPromotion>,
    #[serde(default)]
    pub collections: Vec<SeedCollection>,
    #[serde(default)]
    pub customers: Vec<SeedCustomer>,
}

#[derive(Debug, Deserialize)]
pub struct SeedPromotion {
    pub description: String,
    pub discount: Discount,
}

#[derive(Debug, Deserialize)]
pub struct SeedCollection {
    pub title: String,
    /// Title of a product in this collection.
    pub featured: Option<String>,
    #[serde(default)]
    pub products: Vec<SeedProduct>,
}

#[derive(Debug, Deserialize)]
pub struct SeedProduct {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub price: Price,
    pub inventory: i32,
    /// Promotion descriptions.
    #[serde(default)]
    pub promotions: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct SeedCustomer {
    pub first_name: String,
    pub last_name: String,
    pub email: Email,
    pub phone: String,
    pub birth_date: Option<NaiveDate>,
    #[serde(default)]
    pub membership: MembershipTier,
    pub address: Option<SeedAddress>,
    #[serde(default)]
    pub orders: Vec<SeedOrder>,
}

#[derive(Debug, Deserialize)]
pub struct SeedAddress {
    pub street: String,
    pub city: String,
}

#[derive(Debug, Deserialize)]
pub struct SeedOrder {
    #[serde(default)]
    pub payment_status: PaymentStatus,
    pub items: Vec<SeedOrderItem>,
}

#[derive(Debug, Deserialize)]
pub struct SeedOrderItem {
    /// Product title.
    pub product: String,
    pub quantity: Quantity,
}

impl SeedData {
    /// Parse a YAML seed document.
    ///
    /// # Errors
    ///
    /// Returns the YAML error if the document does not match the seed format.
    pub fn from_yaml(content: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(content)
    }

    /// Check cross references by name. Returns one message per problem.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        let mut promotions = HashSet::new();
        for promotion in &self.promotions {
            if !promotions.insert(promotion.description.as_str()) {
                errors.push(format!("duplicate promotion {:?}", promotion.description));
            }
        }

        let mut products = HashSet::new();
        for collection in &self.collections {
            for product in &collection.products {
                if !products.insert(product.title.as_str()) {
                    errors.push(format!("duplicate product {:?}", product.title));
                }
                for name in &product.promotions {
                    if !promotions.contains(name.as_str()) {
                        errors.push(format!(
                            "product {:?} references unknown promotion {name:?}",
                            product.title
                        ));
                    }
                }
            }
            if let Some(featured) = &collection.featured
                && !collection.products.iter().any(|p| &p.title == featured)
            {
                errors.push(format!(
                    "collection {:?} features {featured:?}, which is not one of its products",
                    collection.title
                ));
            }
        }

        let mut emails = HashSet::new();
        for customer in &self.customers {
            if !emails.insert(customer.email.as_str()) {
                errors.push(format!("duplicate customer email {}", customer.email));
            }
            for order in &customer.orders {
                if order.items.is_empty() {
                    errors.push(format!("order for {} has no items", customer.email));
                }
                for item in &order.items {
                    if !products.contains(item.product.as_str()) {
                        errors.push(format!(
                            "order for {} references unknown product {:?}",
                            customer.email, item.product
                        ));
                    }
                }
            }
        }

        errors
    }

    fn product_count(&self) -> usize {
        self.collections.iter().map(|c| c.products.len()).sum()
    }
}

/// Seed demonstration data.
///
/// # Arguments
///
/// * `file_path` - YAML file to load; the bundled catalog when `None`
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed, fails validation,
/// or a database operation fails. A failed seed leaves the database unchanged.
pub async fn run(file_path: Option<&str>) -> Result<(), Box<dyn std::error::Error>> {
    let content = match file_path {
        Some(path) => {
            let path = Path::new(path);
            if !path.exists() {
                return Err(format!("File not found: {}", path.display()).into());
            }
            info!(path = %path.display(), "Loading seed data from file");
            tokio::fs::read_to_string(path).await?
        }
        None => BUNDLED_CATALOG.to_string(),
    };

    let data = SeedData::from_yaml(&content)?;

    let errors = data.validate();
    if !errors.is_empty() {
        error!("Seed data validation failed:");
        for err in &errors {
            error!("  - {err}");
        }
        return Err(format!("{} validation errors found", errors.len()).into());
    }

    let pool = connect().await?;

    let existing = ProductRepository::new(&pool).aggregate().await?;
    if existing.count > 0 {
        info!(
            products = existing.count,
            "Catalog already has products, skipping seed"
        );
        return Ok(());
    }

    info!(
        promotions = data.promotions.len(),
        collections = data.collections.len(),
        products = data.product_count(),
        customers = data.customers.len(),
        "Seeding store"
    );

    let summary = apply(&pool, &data).await.inspect_err(|e| {
        error!(error = %e, "Seeding failed, nothing was written");
    })?;

    info!("Seeding complete!");
    info!("  Promotions: {}", summary.promotions);
    info!("  Products: {}", summary.products);
    info!("  Customers: {}", summary.customers);
    info!("  Orders: {}", summary.orders);

    Ok(())
}

/// Row counts written by [`apply`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SeedSummary {
    pub promotions: usize,
    pub products: usize,
    pub customers: usize,
    pub orders: usize,
}

/// Insert validated seed data in a single transaction.
///
/// Either every row is committed or, on the first failing statement, none are.
///
/// # Errors
///
/// Returns the first `RepositoryError` raised; the transaction is rolled back.
pub async fn apply(pool: &PgPool, data: &SeedData) -> Result<SeedSummary, RepositoryError> {
    let mut tx = pool.begin().await?;
    let mut summary = SeedSummary::default();

    let mut promotion_ids = HashMap::new();
    for promotion in &data.promotions {
        let created =
            promotions::insert(&mut *tx, &promotion.description, promotion.discount).await?;
        promotion_ids.insert(promotion.description.as_str(), created.id);
    }
    summary.promotions = promotion_ids.len();

    let mut product_ids: HashMap<&str, (ProductId, Price)> = HashMap::new();
    for collection in &data.collections {
        let created = collections::insert(&mut *tx, &collection.title).await?;

        for product in &collection.products {
            let input = CreateProductInput {
                title: product.title.clone(),
                description: product.description.clone(),
                price: product.price,
                inventory: product.inventory,
                collection_id: created.id,
            };
            let row = products::insert(&mut *tx, &input).await?;
            for name in &product.promotions {
                if let Some(&promotion_id) = promotion_ids.get(name.as_str()) {
                    products::link_promotion(&mut *tx, row.id, promotion_id).await?;
                }
            }
            product_ids.insert(product.title.as_str(), (row.id, row.price));
        }

        if let Some(&(featured_id, _)) = collection
            .featured
            .as_deref()
            .and_then(|title| product_ids.get(title))
        {
            collections::update_featured_product(&mut *tx, created.id, Some(featured_id)).await?;
        }
    }
    summary.products = product_ids.len();

    for customer in &data.customers {
        let input = CreateCustomerInput {
            first_name: customer.first_name.clone(),
            last_name: customer.last_name.clone(),
            email: customer.email.clone(),
            phone: customer.phone.clone(),
            birth_date: customer.birth_date,
            membership: customer.membership,
        };
        let created = customers::insert(&mut *tx, &input).await?;

        if let Some(address) = &customer.address {
            addresses::upsert(&mut *tx, created.id, &address.street, &address.city).await?;
        }

        for order in &customer.orders {
            let placed = orders::insert(&mut *tx, created.id).await?;
            for item in &order.items {
                if let Some(&(product_id, price)) = product_ids.get(item.product.as_str()) {
                    orders::insert_item(&mut *tx, placed.id, product_id, item.quantity, price)
                        .await?;
                }
            }
            if order.payment_status != PaymentStatus::Pending {
                orders::update_payment_status(&mut *tx, placed.id, order.payment_status).await?;
            }
            summary.orders += 1;
        }
        summary.customers += 1;
    }

    tx.commit().await?;
    Ok(summary)
}
