//! User role value object.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Marketplace roles, ordered by privilege.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    /// Buys listed products.
    #[default]
    Customer,
    /// Lists products for sale.
    Seller,
    /// Moderates listings and users.
    Moderator,
    /// Manages the catalog taxonomy and accounts.
    Admin,
}

impl UserRole {
    /// Privilege level, higher means more access.
    #[must_use]
    pub const fn level(&self) -> u8 {
        match self {
            Self::Customer => 1,
            Self::Seller => 2,
            Self::Moderator => 3,
            Self::Admin => 4,
        }
    }

    /// Checks if this role has at least the permissions of the required role.
    #[must_use]
    pub const fn has_permission(&self, required: Self) -> bool {
        self.level() >= required.level()
    }

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Customer => "customer",
            Self::Seller => "seller",
            Self::Moderator => "moderator",
            Self::Admin => "admin",
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UserRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "customer" | "user" => Ok(Self::Customer),
            "seller" => Ok(Self::Seller),
            "moderator" | "mod" => Ok(Self::Moderator),
            "admin" | "administrator" => Ok(Self::Admin),
            other => Err(format!("unknown role: {other}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_hierarchy() {
        assert!(UserRole::Admin.has_permission(UserRole::Seller));
        assert!(UserRole::Seller.has_permission(UserRole::Customer));
        assert!(!UserRole::Customer.has_permission(UserRole::Seller));
        assert!(!UserRole::Moderator.has_permission(UserRole::Admin));
    }

    #[test]
    fn test_role_round_trip_through_str() {
        for role in [UserRole::Customer, UserRole::Seller, UserRole::Moderator, UserRole::Admin] {
            assert_eq!(role.as_str().parse::<UserRole>().unwrap(), role);
        }
        assert!("root".parse::<UserRole>().is_err());
    }
}
