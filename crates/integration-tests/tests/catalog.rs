//! Integration tests for the catalog: products, collections and promotions.
//!
//! These tests require a running `PostgreSQL` database (see the crate docs).

use emporium_core::{Discount, ProductId, Quantity};
use emporium_integration_tests::{
    create_collection, create_customer, create_product, price, test_pool, unique,
};
use emporium_store::db::{
    CartRepository, CollectionRepository, OrderRepository, ProductRepository, PromotionRepository,
    RepositoryError,
};
use emporium_store::models::{ProductFilter, ProductSortField, SortDirection, UpdateProductInput};

// ============================================================================
// Lookups
// ============================================================================

#[tokio::test]
#[ignore = "Requires running PostgreSQL database"]
async fn test_get_and_find_product() {
    let pool = test_pool().await;
    let collection = create_collection(&pool).await;
    let product = create_product(&pool, collection.id, 1250, 4).await;
    let repo = ProductRepository::new(&pool);

    let fetched = repo.get(product.id).await.expect("get product");
    assert_eq!(fetched, product);
    assert_eq!(fetched.price.to_string(), "12.50");

    assert_eq!(repo.find(product.id).await.expect("find product"), Some(product));

    let missing = ProductId::new(i32::MAX);
    assert!(matches!(repo.get(missing).await, Err(RepositoryError::NotFound)));
    assert_eq!(repo.find(missing).await.expect("find missing"), None);
}

#[tokio::test]
#[ignore = "Requires running PostgreSQL database"]
async fn test_product_with_collection_preload() {
    let pool = test_pool().await;
    let collection = create_collection(&pool).await;
    let first = create_product(&pool, collection.id, 100, 1).await;
    let second = create_product(&pool, collection.id, 200, 1).await;

    let rows = ProductRepository::new(&pool)
        .all_with_collection()
        .await
        .expect("load products");

    let ours: Vec<_> = rows
        .iter()
        .filter(|row| row.product.collection_id == collection.id)
        .collect();
    assert_eq!(ours.len(), 2, "one row per product, not per collection");
    assert_eq!(ours[0].product.id, first.id);
    assert_eq!(ours[1].product.id, second.id);
    assert!(ours.iter().all(|row| row.collection == collection));
    assert!(rows.windows(2).all(|w| w[0].product.id < w[1].product.id));
}

#[tokio::test]
#[ignore = "Requires running PostgreSQL database"]
async fn test_titles_with_collection() {
    let pool = test_pool().await;
    let collection = create_collection(&pool).await;
    let product = create_product(&pool, collection.id, 300, 1).await;

    let summaries = ProductRepository::new(&pool)
        .titles_with_collection()
        .await
        .expect("load summaries");
    let summary = summaries
        .iter()
        .find(|s| s.id == product.id)
        .expect("summary for product");

    assert_eq!(summary.title, product.title);
    assert_eq!(summary.collection_title, collection.title);
}

// ============================================================================
// Writes
// ============================================================================

#[tokio::test]
#[ignore = "Requires running PostgreSQL database"]
async fn test_update_product() {
    let pool = test_pool().await;
    let collection = create_collection(&pool).await;
    let other = create_collection(&pool).await;
    let product = create_product(&pool, collection.id, 500, 10).await;
    let repo = ProductRepository::new(&pool);

    let updated = repo
        .update(
            product.id,
            &UpdateProductInput {
                price: Some(price(450)),
                collection_id: Some(other.id),
                ..Default::default()
            },
        )
        .await
        .expect("update product");

    assert_eq!(updated.title, product.title);
    assert_eq!(updated.inventory, 10);
    assert_eq!(updated.price, price(450));
    assert_eq!(updated.collection_id, other.id);
    assert!(updated.last_update >= product.last_update);

    let missing = repo
        .update(ProductId::new(i32::MAX), &UpdateProductInput::default())
        .await;
    assert!(matches!(missing, Err(RepositoryError::NotFound)));
}

#[tokio::test]
#[ignore = "Requires running PostgreSQL database"]
async fn test_product_requires_existing_collection() {
    let pool = test_pool().await;
    let collection = create_collection(&pool).await;
    let product = create_product(&pool, collection.id, 500, 10).await;

    let result = ProductRepository::new(&pool)
        .update(
            product.id,
            &UpdateProductInput {
                collection_id: Some(emporium_core::CollectionId::new(i32::MAX)),
                ..Default::default()
            },
        )
        .await;
    assert!(matches!(result, Err(RepositoryError::Protected(_))));
}

// ============================================================================
// Filters
// ============================================================================

#[tokio::test]
#[ignore = "Requires running PostgreSQL database"]
async fn test_filter_price_range_and_inventory() {
    let pool = test_pool().await;
    let collection = create_collection(&pool).await;
    // Prices from 9000.00 to 9010.00 are only used by this test.
    let low = create_product(&pool, collection.id, 900_000, 2).await;
    let mid = create_product(&pool, collection.id, 900_500, 50).await;
    let high = create_product(&pool, collection.id, 901_000, 5).await;
    let repo = ProductRepository::new(&pool);

    let in_range = repo
        .filter(&ProductFilter::default().price_between(price(900_000), price(901_000)))
        .await
        .expect("filter by range");
    let ids: Vec<_> = in_range.iter().map(|p| p.id).collect();
    assert!(ids.contains(&low.id) && ids.contains(&mid.id) && ids.contains(&high.id));

    let scarce = repo
        .filter(
            &ProductFilter::default()
                .price_between(price(900_000), price(901_000))
                .inventory_below(10)
                .order_by(ProductSortField::Price, SortDirection::Descending),
        )
        .await
        .expect("filter by range and inventory");
    // Earlier runs leave rows in the same band, so only look at ours.
    let ours = [low.id, mid.id, high.id];
    let ids: Vec<_> = scarce
        .iter()
        .map(|p| p.id)
        .filter(|id| ours.contains(id))
        .collect();
    assert_eq!(ids, vec![high.id, low.id]);

    let first_page = repo
        .filter(
            &ProductFilter::default()
                .price_between(price(900_000), price(901_000))
                .order_by(ProductSortField::Price, SortDirection::Ascending)
                .limit(1)
                .offset(1),
        )
        .await
        .expect("filter with paging");
    assert_eq!(first_page.len(), 1);
}

#[tokio::test]
#[ignore = "Requires running PostgreSQL database"]
async fn test_filter_match_any() {
    let pool = test_pool().await;
    let collection = create_collection(&pool).await;
    let product = create_product(&pool, collection.id, 1, 1_000_000).await;

    let any = ProductRepository::new(&pool)
        .filter(
            &ProductFilter::default()
                .price_below(price(2))
                .inventory_below(i32::MIN)
                .match_any(),
        )
        .await
        .expect("filter with OR");
    assert!(any.iter().any(|p| p.id == product.id));

    let all = ProductRepository::new(&pool)
        .filter(
            &ProductFilter::default()
                .price_below(price(2))
                .inventory_below(i32::MIN),
        )
        .await
        .expect("filter with AND");
    assert!(all.is_empty());
}

#[tokio::test]
#[ignore = "Requires running PostgreSQL database"]
async fn test_filter_inventory_matches_price() {
    let pool = test_pool().await;
    let collection = create_collection(&pool).await;
    let matching = create_product(&pool, collection.id, 700, 7).await;
    let other = create_product(&pool, collection.id, 700, 8).await;

    let found = ProductRepository::new(&pool)
        .filter(
            &ProductFilter::default()
                .inventory_matches_price()
                .limit(u32::MAX),
        )
        .await
        .expect("filter on inventory = price");
    let ids: Vec<_> = found.iter().map(|p| p.id).collect();

    assert!(ids.contains(&matching.id));
    assert!(!ids.contains(&other.id));
}

// ============================================================================
// Promotions
// ============================================================================

#[tokio::test]
#[ignore = "Requires running PostgreSQL database"]
async fn test_promotions_preload() {
    let pool = test_pool().await;
    let collection = create_collection(&pool).await;
    let product = create_product(&pool, collection.id, 700, 3).await;
    let bare = create_product(&pool, collection.id, 800, 3).await;
    let promotions = PromotionRepository::new(&pool);
    let products = ProductRepository::new(&pool);

    let spring = promotions
        .create(&unique("spring"), Discount::new(0.1).expect("discount"))
        .await
        .expect("create promotion");
    let clearance = promotions
        .create(&unique("clearance"), Discount::new(0.5).expect("discount"))
        .await
        .expect("create promotion");

    products.add_promotion(product.id, clearance.id).await.expect("link");
    products.add_promotion(product.id, spring.id).await.expect("link");
    // Linking twice is a no-op.
    products.add_promotion(product.id, spring.id).await.expect("relink");

    let loaded = products.all_with_promotions().await.expect("preload");
    let with = loaded
        .iter()
        .find(|p| p.product.id == product.id)
        .expect("promoted product");
    let promo_ids: Vec<_> = with.promotions.iter().map(|p| p.id).collect();
    assert_eq!(promo_ids, vec![spring.id, clearance.id]);

    let without = loaded
        .iter()
        .find(|p| p.product.id == bare.id)
        .expect("bare product");
    assert!(without.promotions.is_empty());

    products
        .remove_promotion(product.id, spring.id)
        .await
        .expect("unlink");
    assert!(matches!(
        products.remove_promotion(product.id, spring.id).await,
        Err(RepositoryError::NotFound)
    ));

    // Deleting a promotion removes its links but not the product.
    promotions.delete(clearance.id).await.expect("delete promotion");
    let loaded = products.all_with_promotions().await.expect("preload");
    let with = loaded
        .iter()
        .find(|p| p.product.id == product.id)
        .expect("product survives");
    assert!(with.promotions.is_empty());
}

// ============================================================================
// Delete policies
// ============================================================================

#[tokio::test]
#[ignore = "Requires running PostgreSQL database"]
async fn test_collection_with_products_is_protected() {
    let pool = test_pool().await;
    let collection = create_collection(&pool).await;
    let product = create_product(&pool, collection.id, 100, 1).await;
    let collections = CollectionRepository::new(&pool);

    assert!(matches!(
        collections.delete(collection.id).await,
        Err(RepositoryError::Protected(_))
    ));

    ProductRepository::new(&pool)
        .delete(product.id)
        .await
        .expect("delete product");
    collections
        .delete(collection.id)
        .await
        .expect("delete empty collection");
    assert!(matches!(
        collections.get(collection.id).await,
        Err(RepositoryError::NotFound)
    ));
}

#[tokio::test]
#[ignore = "Requires running PostgreSQL database"]
async fn test_deleting_featured_product_clears_feature() {
    let pool = test_pool().await;
    let collection = create_collection(&pool).await;
    let product = create_product(&pool, collection.id, 100, 1).await;
    let collections = CollectionRepository::new(&pool);

    let featured = collections
        .set_featured_product(collection.id, Some(product.id))
        .await
        .expect("feature product");
    assert_eq!(featured.featured_product_id, Some(product.id));

    ProductRepository::new(&pool)
        .delete(product.id)
        .await
        .expect("delete product");

    let reloaded = collections.get(collection.id).await.expect("collection survives");
    assert_eq!(reloaded.featured_product_id, None);
}

#[tokio::test]
#[ignore = "Requires running PostgreSQL database"]
async fn test_ordered_product_is_protected_and_cart_lines_cascade() {
    let pool = test_pool().await;
    let collection = create_collection(&pool).await;
    let ordered = create_product(&pool, collection.id, 100, 1).await;
    let carted = create_product(&pool, collection.id, 100, 1).await;
    let customer = create_customer(&pool).await;
    let products = ProductRepository::new(&pool);
    let carts = CartRepository::new(&pool);
    let orders = OrderRepository::new(&pool);
    let one = Quantity::new(1).expect("quantity");

    let order = orders.create(customer.id).await.expect("create order");
    orders
        .add_item(order.id, ordered.id, one, ordered.price)
        .await
        .expect("add order item");
    assert!(matches!(
        products.delete(ordered.id).await,
        Err(RepositoryError::Protected(_))
    ));

    let cart = carts.create().await.expect("create cart");
    carts.add_item(cart.id, carted.id, one).await.expect("add cart item");
    products.delete(carted.id).await.expect("delete carted product");
    assert!(carts.items(cart.id).await.expect("cart items").is_empty());
    assert!(carts.get(cart.id).await.is_ok());
}
