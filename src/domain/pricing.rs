//! Reservation pricing.
//!
//! `total = tier_price + service_fee + round(tier_price * tax_rate)`.
//! Amounts are whole FCFA. The tax rate is kept in basis points so the
//! rounding is exact integer arithmetic (half-up).

use serde::Serialize;
use utoipa::ToSchema;

use super::{ServiceCatalogEntry, Tier};

/// Flat fee added to every reservation.
pub const SERVICE_FEE: u64 = 2_000;

/// Tax rate in basis points (8%).
pub const TAX_RATE_BPS: u64 = 800;

/// Itemised price of a reservation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct PriceBreakdown {
    /// Catalog price for the selected tier.
    pub tier_price: u64,
    /// Flat service fee.
    pub service_fee: u64,
    /// Tax on the tier price, rounded half-up.
    pub tax: u64,
    /// Amount charged to the customer.
    pub total: u64,
}

/// Fee and tax policy applied on top of catalog prices.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PricingPolicy {
    service_fee: u64,
    tax_rate_bps: u64,
}

impl PricingPolicy {
    /// Creates a policy with a custom fee and tax rate.
    #[must_use]
    pub const fn new(service_fee: u64, tax_rate_bps: u64) -> Self {
        Self {
            service_fee,
            tax_rate_bps,
        }
    }

    /// Tax on `amount`, rounded half-up to the nearest unit.
    #[must_use]
    pub const fn tax(&self, amount: u64) -> u64 {
        amount
            .saturating_mul(self.tax_rate_bps)
            .saturating_add(5_000)
            / 10_000
    }

    /// Prices `entry` at `tier`.
    #[must_use]
    pub const fn quote(&self, entry: &ServiceCatalogEntry, tier: Tier) -> PriceBreakdown {
        let tier_price = entry.tier_price(tier);
        let tax = self.tax(tier_price);
        PriceBreakdown {
            tier_price,
            service_fee: self.service_fee,
            tax,
            total: tier_price
                .saturating_add(self.service_fee)
                .saturating_add(tax),
        }
    }
}

impl Default for PricingPolicy {
    fn default() -> Self {
        Self::new(SERVICE_FEE, TAX_RATE_BPS)
    }
}
