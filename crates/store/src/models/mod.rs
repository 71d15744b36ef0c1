//! Domain models for the store schema.
//!
//! Each type mirrors one table (or one joined projection of tables) and is
//! built from validated core types, so a value that exists in Rust always fits
//! its column.
//!
//! # Relationships
//!
//! ```text
//! Promotion  *---*  Product  *---1  Collection
//!                      |              (featured_product: 0..1 Product, SET NULL)
//!          OrderItem --+-- CartItem
//!              |              |
//!            Order          Cart
//!              |
//!           Customer 1---0..1 Address
//! ```

pub mod cart;
pub mod catalog;
pub mod customer;
pub mod order;

pub use cart::{Cart, CartItem};
pub use catalog::{
    Collection, CreateProductInput, Product, ProductAggregates, ProductFilter, ProductSortField,
    ProductSummary, ProductWithCollection, ProductWithPromotions, Promotion, SortDirection,
    UpdateProductInput,
};
pub use customer::{Address, CreateCustomerInput, Customer};
pub use order::{Order, OrderItem};
