//! Cart domain models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use emporium_core::{CartId, CartItemId, ProductId, Quantity};

/// A shopping cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Cart {
    /// Unique cart ID.
    pub id: CartId,
    /// When the cart was created.
    pub created_at: DateTime<Utc>,
}

/// One product line in a cart. Removed with its cart or its product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct CartItem {
    /// Unique item ID.
    pub id: CartItemId,
    /// Cart this line belongs to.
    pub cart_id: CartId,
    /// Product in the cart.
    pub product_id: ProductId,
    /// Units in the cart.
    pub quantity: Quantity,
}
