//! Liebig's Law of the Minimum scoring.
//!
//! Nutrients set the size of the pool; the weakest gatekeeper decides how
//! much of that pool the crop can use.

use serde::Serialize;
use tracing::debug;

use crate::classifier::{self, NutrientBand, NutrientStatus};
use crate::gatekeeper::{self, Gatekeeper, GatekeeperResult};
use crate::sample::SoilSample;
use crate::thresholds::Nutrient;

/// Final fertility class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FertilityClass {
    Optimal,
    High,
    Moderate,
    Low,
    Infertile,
}

impl FertilityClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            FertilityClass::Optimal => "OPTIMAL",
            FertilityClass::High => "HIGH",
            FertilityClass::Moderate => "MODERATE",
            FertilityClass::Low => "LOW",
            FertilityClass::Infertile => "INFERTILE",
        }
    }
}

impl std::fmt::Display for FertilityClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// How urgently a field needs intervention
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActionPriority {
    Critical,
    Medium,
    Low,
}

impl ActionPriority {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionPriority::Critical => "CRITICAL",
            ActionPriority::Medium => "MEDIUM",
            ActionPriority::Low => "LOW",
        }
    }
}

impl From<FertilityClass> for ActionPriority {
    fn from(class: FertilityClass) -> Self {
        match class {
            FertilityClass::Infertile => ActionPriority::Critical,
            FertilityClass::Low => ActionPriority::Medium,
            _ => ActionPriority::Low,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct NutrientAssessment {
    pub nutrient: Nutrient,
    pub value: f64,
    pub band: NutrientBand,
    pub status: NutrientStatus,
}

impl NutrientAssessment {
    fn new(nutrient: Nutrient, value: f64) -> Self {
        Self {
            nutrient,
            value,
            band: classifier::classify(value, nutrient),
            status: classifier::status(value, nutrient),
        }
    }
}

/// Complete, immutable result of scoring one sample
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FertilityAssessment {
    pub sample: SoilSample,
    pub nitrogen: NutrientAssessment,
    pub phosphorus: NutrientAssessment,
    pub potassium: NutrientAssessment,
    pub npk_overall: NutrientBand,
    pub ph: GatekeeperResult,
    pub ec: GatekeeperResult,
    pub organic_carbon: GatekeeperResult,
    pub index_score: f64,
    pub limiting_factor: Gatekeeper,
    pub limiting_factor_strength: f64,
    pub final_score: f64,
    pub classification: FertilityClass,
    pub description: String,
}

impl FertilityAssessment {
    pub fn action_priority(&self) -> ActionPriority {
        self.classification.into()
    }

    pub fn gatekeepers(&self) -> [&GatekeeperResult; 3] {
        [&self.ph, &self.ec, &self.organic_carbon]
    }
}

/// Organic carbon as a multiplier.
///
/// Values above 1.0 are read as whole percentages and divided by 100; values
/// at or below 1.0 are used as they are. An entry of exactly 1.0 therefore
/// counts as 1.0, while 1.01 counts as 0.0101.
pub fn normalize_organic_carbon(oc: f64) -> f64 {
    if oc > 1.0 { oc / 100.0 } else { oc }
}

/// (N + P + K) × normalised organic carbon
pub fn index_score(nitrogen: f64, phosphorus: f64, potassium: f64, oc: f64) -> f64 {
    (nitrogen + phosphorus + potassium) * normalize_organic_carbon(oc)
}

/// The weakest gatekeeper; ties go to pH, then EC, then organic carbon
pub fn limiting_factor(results: [&GatekeeperResult; 3]) -> (Gatekeeper, f64) {
    let strength = results
        .iter()
        .map(|r| r.correction_factor)
        .fold(f64::INFINITY, f64::min);

    let factor = Gatekeeper::PRIORITY
        .into_iter()
        .find(|g| {
            results
                .iter()
                .any(|r| r.gatekeeper == *g && r.correction_factor == strength)
        })
        .unwrap_or(Gatekeeper::OrganicCarbon);

    (factor, strength)
}

/// Decision table evaluated top-down, then the trailing INFERTILE override
pub fn classify_fertility(final_score: f64, strength: f64, ph_correction: f64) -> FertilityClass {
    let class = if final_score > 400.0 && strength > 0.8 && ph_correction > 0.8 {
        FertilityClass::Optimal
    } else if final_score > 200.0 && strength > 0.6 {
        FertilityClass::High
    } else if final_score > 100.0 && strength > 0.3 {
        FertilityClass::Moderate
    } else {
        FertilityClass::Low
    };

    if strength < 0.3 {
        FertilityClass::Infertile
    } else {
        class
    }
}

pub fn describe(class: FertilityClass, limiting: Gatekeeper) -> String {
    match class {
        FertilityClass::Optimal => "Excellent soil fertility with all parameters balanced".to_string(),
        FertilityClass::High => "Good soil fertility, minor adjustments recommended".to_string(),
        FertilityClass::Moderate => "Fair soil fertility, some limitations present".to_string(),
        FertilityClass::Low => "Poor soil fertility, significant improvements needed".to_string(),
        FertilityClass::Infertile => {
            format!("Infertile due to {} being the limiting factor", limiting.limiting_name())
        }
    }
}

/// Stateless fertility scorer
#[derive(Debug, Clone, Copy, Default)]
pub struct FertilityScorer;

impl FertilityScorer {
    pub fn new() -> Self {
        Self
    }

    pub fn assess(&self, sample: &SoilSample) -> FertilityAssessment {
        let nitrogen = NutrientAssessment::new(Nutrient::Nitrogen, sample.nitrogen());
        let phosphorus = NutrientAssessment::new(Nutrient::Phosphorus, sample.phosphorus());
        let potassium = NutrientAssessment::new(Nutrient::Potassium, sample.potassium());
        let npk_overall = classifier::npk_overall([nitrogen.band, phosphorus.band, potassium.band]);

        // All three always run; none short-circuits the others.
        let ph = gatekeeper::assess_ph(sample.ph());
        let ec = gatekeeper::assess_ec(sample.ec());
        let organic_carbon = gatekeeper::assess_organic_carbon(sample.organic_carbon());

        let index_score = index_score(
            sample.nitrogen(),
            sample.phosphorus(),
            sample.potassium(),
            sample.organic_carbon(),
        );
        let (limiting_factor, limiting_factor_strength) = limiting_factor([&ph, &ec, &organic_carbon]);
        let final_score = index_score * limiting_factor_strength;
        let classification =
            classify_fertility(final_score, limiting_factor_strength, ph.correction_factor);

        debug!(
            index_score,
            final_score,
            limiting = limiting_factor.limiting_name(),
            class = classification.as_str(),
            "Scored soil sample"
        );

        FertilityAssessment {
            sample: *sample,
            nitrogen,
            phosphorus,
            potassium,
            npk_overall,
            ph,
            ec,
            organic_carbon,
            index_score,
            limiting_factor,
            limiting_factor_strength,
            final_score,
            classification,
            description: describe(classification, limiting_factor),
        }
    }
}

/// Score a validated sample
pub fn assess_fertility(sample: &SoilSample) -> FertilityAssessment {
    FertilityScorer::new().assess(sample)
}
