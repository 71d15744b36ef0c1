//! Single-character choice enums.
//!
//! Both enums are persisted as a one-character code in a `VARCHAR(1)` column
//! guarded by a `CHECK` constraint, and serialized to JSON as snake case names.

use core::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Error returned when a stored code does not name a known variant.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown {kind} code: {code:?}")]
pub struct CodeError {
    /// Which enum was being decoded.
    pub kind: &'static str,
    /// The rejected code.
    pub code: String,
}

/// Implements code/label conversions and `sqlx` text mapping for a choice enum.
macro_rules! choice_enum {
    ($name:ident, $kind:literal, { $($variant:ident => ($code:literal, $label:literal)),+ $(,)? }) => {
        impl $name {
            /// Every variant, in declaration order.
            pub const ALL: &'static [Self] = &[$(Self::$variant),+];

            /// The single-character code stored in the database.
            #[must_use]
            pub const fn code(self) -> &'static str {
                match self {
                    $(Self::$variant => $code),+
                }
            }

            /// Human-readable label.
            #[must_use]
            pub const fn label(self) -> &'static str {
                match self {
                    $(Self::$variant => $label),+
                }
            }

            /// Look up a variant by its stored code.
            ///
            /// # Errors
            ///
            /// Returns [`CodeError`] for codes that name no variant.
            pub fn from_code(code: &str) -> Result<Self, CodeError> {
                match code {
                    $($code => Ok(Self::$variant),)+
                    other => Err(CodeError {
                        kind: $kind,
                        code: other.to_owned(),
                    }),
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.label())
            }
        }

        impl FromStr for $name {
            type Err = CodeError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::from_code(s)
            }
        }

        #[cfg(feature = "postgres")]
        impl sqlx::Type<sqlx::Postgres> for $name {
            fn type_info() -> sqlx::postgres::PgTypeInfo {
                <String as sqlx::Type<sqlx::Postgres>>::type_info()
            }

            fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
                <String as sqlx::Type<sqlx::Postgres>>::compatible(ty)
            }
        }

        #[cfg(feature = "postgres")]
        impl<'r> sqlx::Decode<'r, sqlx::Postgres> for $name {
            fn decode(
                value: sqlx::postgres::PgValueRef<'r>,
            ) -> Result<Self, sqlx::error::BoxDynError> {
                let code = <&str as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
                Ok(Self::from_code(code)?)
            }
        }

        #[cfg(feature = "postgres")]
        impl sqlx::Encode<'_, sqlx::Postgres> for $name {
            fn encode_by_ref(
                &self,
                buf: &mut sqlx::postgres::PgArgumentBuffer,
            ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
                <&str as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.code(), buf)
            }
        }
    };
}

/// Customer membership tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum MembershipTier {
    #[default]
    Bronze,
    Silver,
    Gold,
}

choice_enum!(MembershipTier, "membership", {
    Bronze => ("B", "Bronze"),
    Silver => ("S", "Silver"),
    Gold => ("G", "Gold"),
});

/// Order payment status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    #[default]
    Pending,
    Complete,
    Failed,
}

choice_enum!(PaymentStatus, "payment status", {
    Pending => ("P", "Pending"),
    Complete => ("C", "Complete"),
    Failed => ("F", "Failed"),
});

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        assert_eq!(MembershipTier::default(), MembershipTier::Bronze);
        assert_eq!(PaymentStatus::default(), PaymentStatus::Pending);
    }

    #[test]
    fn test_codes_roundtrip() {
        for tier in MembershipTier::ALL {
            assert_eq!(MembershipTier::from_code(tier.code()).unwrap(), *tier);
        }
        for status in PaymentStatus::ALL {
            assert_eq!(status.code().parse::<PaymentStatus>().unwrap(), *status);
        }
    }

    #[test]
    fn test_codes_are_single_characters() {
        let codes: Vec<&str> = MembershipTier::ALL
            .iter()
            .map(|t| t.code())
            .chain(PaymentStatus::ALL.iter().map(|s| s.code()))
            .collect();
        assert!(codes.iter().all(|c| c.len() == 1));
        assert_eq!(codes, ["B", "S", "G", "P", "C", "F"]);
    }

    #[test]
    fn test_unknown_code() {
        let err = MembershipTier::from_code("X").unwrap_err();
        assert_eq!(err.to_string(), "unknown membership code: \"X\"");
        assert!(PaymentStatus::from_code("").is_err());
    }

    #[test]
    fn test_display_uses_label() {
        assert_eq!(MembershipTier::Gold.to_string(), "Gold");
        assert_eq!(PaymentStatus::Failed.to_string(), "Failed");
    }

    #[test]
    fn test_serde_names() {
        assert_eq!(
            serde_json::to_string(&PaymentStatus::Complete).unwrap(),
            "\"complete\""
        );
        let tier: MembershipTier = serde_json::from_str("\"silver\"").unwrap();
        assert_eq!(tier, MembershipTier::Silver);
    }
}
