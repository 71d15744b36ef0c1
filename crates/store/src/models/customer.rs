//! Customer domain models.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use emporium_core::{CustomerId, Email, MembershipTier};

/// A store customer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Customer {
    /// Unique customer ID.
    pub id: CustomerId,
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Email address, unique across customers.
    pub email: Email,
    /// Contact phone number.
    pub phone: String,
    /// Date of birth, if known.
    pub birth_date: Option<NaiveDate>,
    /// Membership tier.
    pub membership: MembershipTier,
}

impl Customer {
    /// First and last name separated by a space.
    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Input for creating a customer.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateCustomerInput {
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Email address.
    pub email: Email,
    /// Contact phone number.
    pub phone: String,
    /// Date of birth, if known.
    pub birth_date: Option<NaiveDate>,
    /// Membership tier, Bronze unless given.
    #[serde(default)]
    pub membership: MembershipTier,
}

/// A customer's postal address. The customer ID is the primary key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Address {
    /// Owning customer.
    pub customer_id: CustomerId,
    /// Street line.
    pub street: String,
    /// City.
    pub city: String,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_full_name() {
        let customer = Customer {
            id: CustomerId::new(1),
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            email: Email::parse("ada@example.com").unwrap(),
            phone: "555-0100".to_string(),
            birth_date: None,
            membership: MembershipTier::Gold,
        };
        assert_eq!(customer.full_name(), "Ada Lovelace");
    }

    #[test]
    fn test_create_input_defaults_to_bronze() {
        let input: CreateCustomerInput = serde_json::from_str(
            r#"{"first_name":"Ada","last_name":"Lovelace","email":"ada@example.com","phone":"555-0100","birth_date":null}"#,
        )
        .unwrap();
        assert_eq!(input.membership, MembershipTier::Bronze);
    }

    #[test]
    fn test_create_input_rejects_bad_email() {
        let result = serde_json::from_str::<CreateCustomerInput>(
            r#"{"first_name":"A","last_name":"B","email":"nope","phone":"1","birth_date":null}"#,
        );
        assert!(result.is_err());
    }
}
