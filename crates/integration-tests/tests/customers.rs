//! Integration tests for customers, addresses, orders and carts.
//!
//! These tests require a running `PostgreSQL` database (see the crate docs).

use emporium_core::{CartItemId, CustomerId, MembershipTier, OrderId, PaymentStatus, Quantity};
use emporium_integration_tests::{
    create_collection, create_customer, create_product, customer_input, test_pool, unique,
};
use emporium_store::db::{
    AddressRepository, CartRepository, CustomerRepository, OrderRepository, RepositoryError,
};

// ============================================================================
// Customers
// ============================================================================

#[tokio::test]
#[ignore = "Requires running PostgreSQL database"]
async fn test_create_customer_defaults_to_bronze() {
    let pool = test_pool().await;
    let customer = create_customer(&pool).await;

    assert_eq!(customer.membership, MembershipTier::Bronze);

    let repo = CustomerRepository::new(&pool);
    let by_email = repo
        .get_by_email(&customer.email)
        .await
        .expect("lookup by email");
    assert_eq!(by_email, Some(customer.clone()));
    assert!(repo.list().await.expect("list").contains(&customer));
}

#[tokio::test]
#[ignore = "Requires running PostgreSQL database"]
async fn test_duplicate_email_is_conflict() {
    let pool = test_pool().await;
    let repo = CustomerRepository::new(&pool);
    let input = customer_input(&unique("dup"));

    repo.create(&input).await.expect("first insert");
    let second = repo.create(&input).await;

    assert!(matches!(second, Err(RepositoryError::Conflict(_))));
}

#[tokio::test]
#[ignore = "Requires running PostgreSQL database"]
async fn test_set_membership() {
    let pool = test_pool().await;
    let customer = create_customer(&pool).await;
    let repo = CustomerRepository::new(&pool);

    let gold = repo
        .set_membership(customer.id, MembershipTier::Gold)
        .await
        .expect("upgrade");
    assert_eq!(gold.membership, MembershipTier::Gold);
    assert_eq!(
        repo.get(customer.id).await.expect("reload").membership,
        MembershipTier::Gold
    );

    let missing = repo
        .set_membership(CustomerId::new(i32::MAX), MembershipTier::Silver)
        .await;
    assert!(matches!(missing, Err(RepositoryError::NotFound)));
}

// ============================================================================
// Addresses
// ============================================================================

#[tokio::test]
#[ignore = "Requires running PostgreSQL database"]
async fn test_address_is_one_per_customer() {
    let pool = test_pool().await;
    let customer = create_customer(&pool).await;
    let addresses = AddressRepository::new(&pool);

    assert_eq!(addresses.get(customer.id).await.expect("no address"), None);

    addresses
        .upsert(customer.id, "1 First St", "Springfield")
        .await
        .expect("set address");
    let replaced = addresses
        .upsert(customer.id, "2 Second Ave", "Shelbyville")
        .await
        .expect("replace address");
    assert_eq!(replaced.street, "2 Second Ave");
    assert_eq!(
        addresses.get(customer.id).await.expect("reload"),
        Some(replaced)
    );

    let orphan = addresses
        .upsert(CustomerId::new(i32::MAX), "Nowhere", "Nowhere")
        .await;
    assert!(matches!(orphan, Err(RepositoryError::Protected(_))));
}

#[tokio::test]
#[ignore = "Requires running PostgreSQL database"]
async fn test_deleting_customer_removes_address() {
    let pool = test_pool().await;
    let customer = create_customer(&pool).await;
    let addresses = AddressRepository::new(&pool);
    addresses
        .upsert(customer.id, "3 Third Rd", "Ogdenville")
        .await
        .expect("set address");

    CustomerRepository::new(&pool)
        .delete(customer.id)
        .await
        .expect("delete customer");

    assert_eq!(addresses.get(customer.id).await.expect("lookup"), None);
}

// ============================================================================
// Orders
// ============================================================================

#[tokio::test]
#[ignore = "Requires running PostgreSQL database"]
async fn test_order_lifecycle() {
    let pool = test_pool().await;
    let collection = create_collection(&pool).await;
    let product = create_product(&pool, collection.id, 250, 10).await;
    let customer = create_customer(&pool).await;
    let orders = OrderRepository::new(&pool);

    let order = orders.create(customer.id).await.expect("place order");
    assert_eq!(order.payment_status, PaymentStatus::Pending);
    assert_eq!(order.customer_id, customer.id);

    let item = orders
        .add_item(
            order.id,
            product.id,
            Quantity::new(3).expect("quantity"),
            product.price,
        )
        .await
        .expect("add item");
    assert_eq!(item.line_total().to_string(), "7.50");
    assert_eq!(orders.items(order.id).await.expect("items"), vec![item]);

    let paid = orders
        .set_payment_status(order.id, PaymentStatus::Complete)
        .await
        .expect("mark paid");
    assert_eq!(paid.payment_status, PaymentStatus::Complete);
    assert_eq!(paid.placed_at, order.placed_at);

    let history = orders
        .list_for_customer(customer.id)
        .await
        .expect("history");
    assert_eq!(history, vec![paid]);
}

#[tokio::test]
#[ignore = "Requires running PostgreSQL database"]
async fn test_order_history_is_protected() {
    let pool = test_pool().await;
    let collection = create_collection(&pool).await;
    let product = create_product(&pool, collection.id, 100, 1).await;
    let customer = create_customer(&pool).await;
    let customers = CustomerRepository::new(&pool);
    let orders = OrderRepository::new(&pool);

    let order = orders.create(customer.id).await.expect("place order");
    orders
        .add_item(
            order.id,
            product.id,
            Quantity::new(1).expect("quantity"),
            product.price,
        )
        .await
        .expect("add item");

    assert!(matches!(
        customers.delete(customer.id).await,
        Err(RepositoryError::Protected(_))
    ));
    assert!(matches!(
        orders.delete(order.id).await,
        Err(RepositoryError::Protected(_))
    ));

    // An order with no items can be deleted.
    let empty = orders.create(customer.id).await.expect("place empty order");
    orders.delete(empty.id).await.expect("delete empty order");
    assert!(matches!(
        orders.get(empty.id).await,
        Err(RepositoryError::NotFound)
    ));
    assert!(matches!(
        orders.delete(OrderId::new(i32::MAX)).await,
        Err(RepositoryError::NotFound)
    ));
}

#[tokio::test]
#[ignore = "Requires running PostgreSQL database"]
async fn test_order_for_missing_customer_is_rejected() {
    let pool = test_pool().await;
    let result = OrderRepository::new(&pool)
        .create(CustomerId::new(i32::MAX))
        .await;
    assert!(matches!(result, Err(RepositoryError::Protected(_))));
}

// ============================================================================
// Carts
// ============================================================================

#[tokio::test]
#[ignore = "Requires running PostgreSQL database"]
async fn test_cart_items_cascade_with_cart() {
    let pool = test_pool().await;
    let collection = create_collection(&pool).await;
    let first = create_product(&pool, collection.id, 100, 1).await;
    let second = create_product(&pool, collection.id, 200, 1).await;
    let carts = CartRepository::new(&pool);

    let cart = carts.create().await.expect("create cart");
    let line = carts
        .add_item(cart.id, first.id, Quantity::new(2).expect("quantity"))
        .await
        .expect("add first");
    carts
        .add_item(cart.id, second.id, Quantity::new(1).expect("quantity"))
        .await
        .expect("add second");
    assert_eq!(carts.items(cart.id).await.expect("items").len(), 2);

    carts.delete_item(line.id).await.expect("remove line");
    assert!(matches!(
        carts.delete_item(CartItemId::new(i32::MAX)).await,
        Err(RepositoryError::NotFound)
    ));
    assert_eq!(carts.items(cart.id).await.expect("items").len(), 1);

    carts.delete(cart.id).await.expect("delete cart");
    assert!(carts.items(cart.id).await.expect("items").is_empty());
    assert!(matches!(
        carts.get(cart.id).await,
        Err(RepositoryError::NotFound)
    ));
}
