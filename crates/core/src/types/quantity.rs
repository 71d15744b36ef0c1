//! Non-negative small-integer quantities for order and cart lines.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Error returned when a value does not fit a [`Quantity`].
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("quantity must be between 0 and {max}, got {value}")]
pub struct QuantityError {
    /// The rejected value.
    pub value: i64,
    /// Inclusive upper bound.
    pub max: i16,
}

/// A line-item quantity, stored as `SMALLINT CHECK (quantity >= 0)`.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(try_from = "i64", into = "i16")]
pub struct Quantity(i16);

impl Quantity {
    /// Largest quantity a `SMALLINT` column holds.
    pub const MAX: i16 = i16::MAX;

    /// Create a quantity.
    ///
    /// # Errors
    ///
    /// Returns [`QuantityError`] if `value` is negative or above [`Quantity::MAX`].
    pub fn new(value: i64) -> Result<Self, QuantityError> {
        i16::try_from(value)
            .ok()
            .filter(|v| *v >= 0)
            .map(Self)
            .ok_or(QuantityError {
                value,
                max: Self::MAX,
            })
    }

    /// The quantity as a signed 16-bit integer (the column type).
    #[must_use]
    pub const fn get(&self) -> i16 {
        self.0
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<i64> for Quantity {
    type Error = QuantityError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Quantity> for i16 {
    fn from(quantity: Quantity) -> Self {
        quantity.0
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for Quantity {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <i16 as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <i16 as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for Quantity {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let raw = <i16 as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        Ok(Self::new(i64::from(raw))?)
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for Quantity {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <i16 as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.0, buf)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_bounds() {
        assert_eq!(Quantity::new(0).unwrap().get(), 0);
        assert_eq!(Quantity::new(32_767).unwrap().get(), 32_767);
        assert!(Quantity::new(-1).is_err());
        assert!(Quantity::new(32_768).is_err());
    }

    #[test]
    fn test_error_message() {
        let err = Quantity::new(-3).unwrap_err();
        assert_eq!(err.to_string(), "quantity must be between 0 and 32767, got -3");
    }

    #[test]
    fn test_serde() {
        let qty: Quantity = serde_json::from_str("4").unwrap();
        assert_eq!(qty.get(), 4);
        assert_eq!(serde_json::to_string(&qty).unwrap(), "4");
        assert!(serde_json::from_str::<Quantity>("-4").is_err());
    }
}
