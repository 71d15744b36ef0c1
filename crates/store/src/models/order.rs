//! Order domain models.
//!
//! Orders and their items are kept as history: the foreign keys from
//! `order` to `customer` and from `order_item` to `order` and `product` are
//! `RESTRICT`, so none of those rows can be deleted while referenced.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use emporium_core::{CustomerId, OrderId, OrderItemId, PaymentStatus, Price, ProductId, Quantity};

/// A placed order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Order {
    /// Unique order ID.
    pub id: OrderId,
    /// When the order was placed, set once on insert.
    pub placed_at: DateTime<Utc>,
    /// Payment status.
    pub payment_status: PaymentStatus,
    /// Customer who placed the order.
    pub customer_id: CustomerId,
}

/// One product line on an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct OrderItem {
    /// Unique item ID.
    pub id: OrderItemId,
    /// Order this line belongs to.
    pub order_id: OrderId,
    /// Product ordered.
    pub product_id: ProductId,
    /// Units ordered.
    pub quantity: Quantity,
    /// Price per unit at the time of ordering.
    pub unit_price: Price,
}

impl OrderItem {
    /// `quantity * unit_price`.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.unit_price.amount() * Decimal::from(self.quantity.get())
    }
}
