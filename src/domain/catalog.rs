//! Service catalog reference data.
//!
//! Catalog entries are seeded at startup and never mutated at runtime.
//! Prices are whole FCFA amounts.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::ServiceId;

/// Service speed class. Affects the price and the queue speed factor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    /// Regular reservation.
    Standard,
    /// Priority reservation, served faster and charged more.
    Express,
}

impl Tier {
    /// Returns the tier as a static string slice.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Standard => "standard",
            Self::Express => "express",
        }
    }

    /// Parses a tier from its wire name.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "standard" => Some(Self::Standard),
            "express" => Some(Self::Express),
            _ => None,
        }
    }
}

/// Catalog category of a service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ServiceCategory {
    /// Men's cuts and beard work.
    Men,
    /// Women's cuts.
    Women,
    /// Children's cuts.
    Child,
    /// Service performed at the customer's home.
    HouseCall,
}

/// A bookable service with its duration and per-tier prices.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ServiceCatalogEntry {
    /// Catalog identifier.
    pub id: ServiceId,
    /// Service category.
    pub category: ServiceCategory,
    /// Nominal duration used to derive a reservation's end time.
    pub duration_minutes: u32,
    /// Price of a standard reservation.
    pub standard_price: u64,
    /// Price of an express reservation.
    pub express_price: u64,
    /// Display name.
    pub name: String,
    /// Display description.
    pub description: String,
}

impl ServiceCatalogEntry {
    /// Returns the catalog price for the given tier.
    #[must_use]
    pub const fn tier_price(&self, tier: Tier) -> u64 {
        match tier {
            Tier::Standard => self.standard_price,
            Tier::Express => self.express_price,
        }
    }
}

/// Returns the catalog seeded at startup.
#[must_use]
pub fn seeded_catalog() -> Vec<ServiceCatalogEntry> {
    let entry = |id: &str,
                 category: ServiceCategory,
                 duration_minutes: u32,
                 standard_price: u64,
                 express_price: u64,
                 name: &str,
                 description: &str| ServiceCatalogEntry {
        id: ServiceId::from(id),
        category,
        duration_minutes,
        standard_price,
        express_price,
        name: name.to_string(),
        description: description.to_string(),
    };

    vec![
        entry(
            "homme_classic",
            ServiceCategory::Men,
            30,
            8_000,
            10_000,
            "Coupe Classique Homme",
            "Coupe professionnelle avec finition parfaite",
        ),
        entry(
            "homme_barbe",
            ServiceCategory::Men,
            20,
            5_000,
            7_000,
            "Taille de Barbe Premium",
            "Taille et contours de barbe",
        ),
        entry(
            "homme_complet",
            ServiceCategory::Men,
            45,
            12_000,
            15_000,
            "Service Complet Homme",
            "Coupe, barbe et soins",
        ),
        entry(
            "enfant_coupe",
            ServiceCategory::Child,
            25,
            5_000,
            7_000,
            "Coupe Enfant Spécialisée",
            "Coupe douce spécialement conçue pour les enfants",
        ),
        entry(
            "femme_coupe",
            ServiceCategory::Women,
            40,
            8_000,
            10_000,
            "Coupe Femme Moderne",
            "Coupe et mise en forme moderne",
        ),
        entry(
            "domicile_service",
            ServiceCategory::HouseCall,
            60,
            30_000,
            30_000,
            "Service Premium à Domicile",
            "Service complet dans le confort de votre domicile",
        ),
    ]
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn seeded_catalog_has_unique_ids() {
        let catalog = seeded_catalog();
        let mut ids: Vec<_> = catalog.iter().map(|e| e.id.clone()).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), catalog.len());
    }

    #[test]
    fn tier_price_selects_column() {
        let catalog = seeded_catalog();
        let Some(classic) = catalog.iter().find(|e| e.id.as_str() == "homme_classic") else {
            panic!("homme_classic is seeded");
        };
        assert_eq!(classic.tier_price(Tier::Standard), 8_000);
        assert_eq!(classic.tier_price(Tier::Express), 10_000);
    }

    #[test]
    fn tier_wire_names() {
        assert_eq!(Tier::parse("express"), Some(Tier::Express));
        assert_eq!(Tier::parse("Express"), None);
        assert_eq!(Tier::Standard.as_str(), "standard");
        assert_eq!(
            serde_json::to_string(&ServiceCategory::HouseCall).unwrap_or_default(),
            "\"house_call\""
        );
    }
}
