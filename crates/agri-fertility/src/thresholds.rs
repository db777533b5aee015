//! Classification boundaries for nutrients and gatekeeper measurements.
//!
//! All nutrient values are in kg/ha, EC in dS/m and organic carbon in
//! percent of dry soil.

use serde::{Deserialize, Serialize};

// ============================================================================
// Nutrients
// ============================================================================

/// Nitrogen below this is infertile
pub const N_LOW: f64 = 280.0;
/// Nitrogen above this is very fertile
pub const N_MEDIUM_UPPER: f64 = 560.0;

pub const P_LOW: f64 = 10.0;
pub const P_MEDIUM_UPPER: f64 = 25.0;

pub const K_LOW: f64 = 110.0;
pub const K_MEDIUM_UPPER: f64 = 280.0;

// ============================================================================
// Gatekeepers
// ============================================================================

pub const PH_HIGHLY_ACIDIC_UPPER: f64 = 5.5;
pub const PH_OPTIMAL_LOWER: f64 = 6.0;
pub const PH_OPTIMAL_UPPER: f64 = 7.5;
pub const PH_ALKALINE_LOWER: f64 = 8.5;

pub const EC_GOOD_UPPER: f64 = 2.0;
pub const EC_MODERATE_UPPER: f64 = 4.0;

pub const OC_LOW_UPPER: f64 = 0.5;
pub const OC_AVERAGE_UPPER: f64 = 0.75;

/// The three primary nutrients
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Nutrient {
    #[serde(rename = "N")]
    Nitrogen,
    #[serde(rename = "P")]
    Phosphorus,
    #[serde(rename = "K")]
    Potassium,
}

impl Nutrient {
    pub const ALL: [Nutrient; 3] = [Nutrient::Nitrogen, Nutrient::Phosphorus, Nutrient::Potassium];

    pub fn name(&self) -> &'static str {
        match self {
            Nutrient::Nitrogen => "Nitrogen",
            Nutrient::Phosphorus => "Phosphorus",
            Nutrient::Potassium => "Potassium",
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            Nutrient::Nitrogen => "N",
            Nutrient::Phosphorus => "P",
            Nutrient::Potassium => "K",
        }
    }
}

/// Lower and upper boundary of the FERTILE band for one nutrient
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct NutrientBounds {
    pub low: f64,
    pub medium_upper: f64,
}

/// Static classification boundaries
pub struct ThresholdTable;

impl ThresholdTable {
    pub fn nutrient(nutrient: Nutrient) -> NutrientBounds {
        match nutrient {
            Nutrient::Nitrogen => NutrientBounds { low: N_LOW, medium_upper: N_MEDIUM_UPPER },
            Nutrient::Phosphorus => NutrientBounds { low: P_LOW, medium_upper: P_MEDIUM_UPPER },
            Nutrient::Potassium => NutrientBounds { low: K_LOW, medium_upper: K_MEDIUM_UPPER },
        }
    }
}
