//! Nutrient band classification

use serde::{Deserialize, Serialize};

use crate::thresholds::{Nutrient, ThresholdTable};

/// Three-level nutrient band, ordered from worst to best
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NutrientBand {
    Infertile,
    Fertile,
    VeryFertile,
}

impl NutrientBand {
    pub fn label(&self) -> &'static str {
        match self {
            NutrientBand::Infertile => "Infertile",
            NutrientBand::Fertile => "Fertile",
            NutrientBand::VeryFertile => "Very Fertile",
        }
    }
}

impl std::fmt::Display for NutrientBand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Whether a nutrient clears its LOW threshold
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NutrientStatus {
    Ok,
    Critical,
}

/// Classify a nutrient value.
///
/// Below LOW is infertile, LOW up to and including MEDIUM_UPPER is fertile,
/// anything above is very fertile.
pub fn classify(value: f64, nutrient: Nutrient) -> NutrientBand {
    let bounds = ThresholdTable::nutrient(nutrient);
    if value < bounds.low {
        NutrientBand::Infertile
    } else if value <= bounds.medium_upper {
        NutrientBand::Fertile
    } else {
        NutrientBand::VeryFertile
    }
}

pub fn status(value: f64, nutrient: Nutrient) -> NutrientStatus {
    if value >= ThresholdTable::nutrient(nutrient).low {
        NutrientStatus::Ok
    } else {
        NutrientStatus::Critical
    }
}

/// Overall NPK band: the weakest of the three.
///
/// VERY_FERTILE therefore needs all three nutrients to be very fertile.
pub fn npk_overall(bands: [NutrientBand; 3]) -> NutrientBand {
    bands.into_iter().min().unwrap_or(NutrientBand::Infertile)
}
