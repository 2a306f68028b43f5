//! Customer profiles as seen by the booking core.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::CustomerId;

/// Loyalty tier derived from lifetime spend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum LoyaltyTier {
    /// Under 100 000 FCFA.
    Bronze,
    /// From 100 000 FCFA.
    Silver,
    /// From 200 000 FCFA.
    Gold,
    /// From 500 000 FCFA.
    Platinum,
}

impl LoyaltyTier {
    /// Tier for a lifetime spend of `total_spent` FCFA.
    #[must_use]
    pub const fn for_spend(total_spent: u64) -> Self {
        match total_spent {
            500_000.. => Self::Platinum,
            200_000.. => Self::Gold,
            100_000.. => Self::Silver,
            _ => Self::Bronze,
        }
    }
}

/// A customer profile from the user store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct UserProfile {
    /// Customer identifier.
    pub id: CustomerId,
    /// Display name.
    pub name: String,
    /// Phone number.
    pub phone: String,
    /// Email address.
    pub email: String,
    /// Reservations ever created.
    pub total_appointments: u32,
    /// Lifetime spend on completed reservations.
    pub total_spent: u64,
    /// Accrued loyalty points.
    pub loyalty_points: u64,
    /// Reservations the customer cancelled.
    pub cancellations: u32,
    /// Account creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl UserProfile {
    /// Creates an empty profile.
    #[must_use]
    pub fn new(
        id: CustomerId,
        name: impl Into<String>,
        phone: impl Into<String>,
        email: impl Into<String>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            phone: phone.into(),
            email: email.into(),
            total_appointments: 0,
            total_spent: 0,
            loyalty_points: 0,
            cancellations: 0,
            created_at: Utc::now(),
        }
    }

    /// Current loyalty tier.
    #[must_use]
    pub const fn loyalty_tier(&self) -> LoyaltyTier {
        LoyaltyTier::for_spend(self.total_spent)
    }
}
