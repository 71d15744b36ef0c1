//! Integration tests for Emporium.
//!
//! # Running Tests
//!
//! ```bash
//! # Point the tests at a scratch database
//! export TEST_DATABASE_URL=postgres://localhost/emporium_test
//!
//! # Run the ignored database tests
//! cargo test -p emporium-integration-tests -- --ignored
//! ```
//!
//! Each test creates its own rows with unique names and never assumes an
//! empty table. Migrations are applied on connect.
//!
//! # Test Categories
//!
//! - `catalog` - Products, collections, promotions and their delete policies
//! - `customers` - Customers, addresses, orders and carts
//! - `playground` - Playground query consistency and the HTTP page

use secrecy::SecretString;
use sqlx::PgPool;
use uuid::Uuid;

use emporium_core::{CollectionId, Email, Price};
use emporium_store::db::{self, CollectionRepository, CustomerRepository, ProductRepository};
use emporium_store::models::{Collection, CreateCustomerInput, CreateProductInput, Customer, Product};

/// Database URL for tests: `TEST_DATABASE_URL`, else `STORE_DATABASE_URL`.
#[must_use]
pub fn database_url() -> SecretString {
    dotenvy::dotenv().ok();

    let url = std::env::var("TEST_DATABASE_URL")
        .or_else(|_| std::env::var("STORE_DATABASE_URL"))
        .unwrap_or_else(|_| "postgres://localhost/emporium_test".to_string());
    SecretString::from(url)
}

/// Base URL for a running store server (configurable via environment).
#[must_use]
pub fn store_base_url() -> String {
    std::env::var("STORE_BASE_URL").unwrap_or_else(|_| "http://localhost:8000".to_string())
}

/// Connect to the test database and apply pending migrations.
///
/// # Panics
///
/// Panics if the database is unreachable or a migration fails.
pub async fn test_pool() -> PgPool {
    let pool = db::create_pool(&database_url())
        .await
        .expect("Failed to connect to test database");
    db::migrate(&pool)
        .await
        .expect("Failed to apply migrations");
    pool
}

/// A unique name starting with `prefix`, for titles and emails.
#[must_use]
pub fn unique(prefix: &str) -> String {
    format!("{prefix}-{}", Uuid::new_v4().simple())
}

/// Price from a cent amount.
///
/// # Panics
///
/// Panics if the amount is out of range.
#[must_use]
pub fn price(cents: i64) -> Price {
    Price::from_cents(cents).expect("valid test price")
}

/// Create a collection with a unique title.
///
/// # Panics
///
/// Panics if the insert fails.
pub async fn create_collection(pool: &PgPool) -> Collection {
    CollectionRepository::new(pool)
        .create(&unique("collection"))
        .await
        .expect("Failed to create collection")
}

/// Create a product in `collection_id`.
///
/// # Panics
///
/// Panics if the insert fails.
pub async fn create_product(
    pool: &PgPool,
    collection_id: CollectionId,
    cents: i64,
    inventory: i32,
) -> Product {
    let input = CreateProductInput {
        title: unique("product"),
        description: "Integration test product".to_string(),
        price: price(cents),
        inventory,
        collection_id,
    };
    ProductRepository::new(pool)
        .create(&input)
        .await
        .expect("Failed to create product")
}

/// Create a customer with a unique email.
///
/// # Panics
///
/// Panics if the insert fails.
pub async fn create_customer(pool: &PgPool) -> Customer {
    CustomerRepository::new(pool)
        .create(&customer_input(&unique("customer")))
        .await
        .expect("Failed to create customer")
}

/// Customer input whose email local part is `local`.
///
/// # Panics
///
/// Panics if `local` does not form a valid email address.
#[must_use]
pub fn customer_input(local: &str) -> CreateCustomerInput {
    CreateCustomerInput {
        first_name: "Test".to_string(),
        last_name: "Customer".to_string(),
        email: Email::parse(&format!("{local}@example.com")).expect("valid test email"),
        phone: "555-0199".to_string(),
        birth_date: None,
        membership: emporium_core::MembershipTier::default(),
    }
}
