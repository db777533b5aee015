//! Soil fertility scoring using Liebig's Law of the Minimum
//!
//! A [`SoilSample`] flows through the nutrient classifier and the three
//! gatekeeper assessors into [`FertilityScorer`], whose
//! [`FertilityAssessment`] drives the recommendation text and the report.
//! Every step is a pure function of the sample.

pub mod batch;
pub mod classifier;
pub mod gatekeeper;
pub mod recommendation;
pub mod report;
pub mod sample;
pub mod scorer;
pub mod thresholds;

pub use batch::{FieldInput, FieldOutcome, FieldSummary, assess_batch, parse_batch, summarize};
pub use classifier::{NutrientBand, NutrientStatus};
pub use gatekeeper::{Gatekeeper, GatekeeperResult};
pub use report::render_report;
pub use sample::{RawSample, SoilSample};
pub use scorer::{
    ActionPriority, FertilityAssessment, FertilityClass, FertilityScorer, NutrientAssessment,
    assess_fertility,
};
pub use thresholds::{Nutrient, ThresholdTable};
