//! Batch assessment of many named fields

use agri_core::Result;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::sample::{RawSample, SoilSample};
use crate::scorer::{FertilityAssessment, FertilityScorer};

/// One named field as read from batch JSON
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FieldInput {
    #[serde(alias = "field", alias = "Field")]
    pub name: String,
    #[serde(flatten)]
    pub measurements: RawSample,
}

/// Outcome for one field; a bad field does not abort the batch
#[derive(Debug, Clone)]
pub struct FieldOutcome {
    pub name: String,
    pub result: std::result::Result<FertilityAssessment, String>,
}

/// Compact summary row for one assessed field
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldSummary {
    pub field: String,
    pub n_kg_ha: f64,
    pub p_kg_ha: f64,
    pub k_kg_ha: f64,
    pub ph: f64,
    pub ec_ds_m: f64,
    pub oc_percent: f64,
    pub index_score: f64,
    pub final_score: f64,
    pub npk_status: String,
    pub limiting_factor: String,
    pub fertility_class: String,
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

impl FieldSummary {
    pub fn new(name: &str, assessment: &FertilityAssessment) -> Self {
        let s = &assessment.sample;
        Self {
            field: name.to_string(),
            n_kg_ha: s.nitrogen(),
            p_kg_ha: s.phosphorus(),
            k_kg_ha: s.potassium(),
            ph: s.ph(),
            ec_ds_m: s.ec(),
            oc_percent: s.organic_carbon(),
            index_score: round2(assessment.index_score),
            final_score: round2(assessment.final_score),
            npk_status: assessment.npk_overall.label().to_string(),
            limiting_factor: assessment.limiting_factor.limiting_name().to_string(),
            fertility_class: assessment.classification.as_str().to_string(),
        }
    }
}

/// Parse a JSON array of named fields
pub fn parse_batch(json: &str) -> Result<Vec<FieldInput>> {
    Ok(serde_json::from_str(json)?)
}

/// Validate and score every field
pub fn assess_batch(fields: Vec<FieldInput>) -> Vec<FieldOutcome> {
    let scorer = FertilityScorer::new();
    let outcomes: Vec<FieldOutcome> = fields
        .into_iter()
        .map(|field| {
            let result = SoilSample::try_from(field.measurements)
                .map(|sample| scorer.assess(&sample))
                .map_err(|e| {
                    warn!(field = %field.name, error = %e, "Skipping invalid field");
                    e.to_string()
                });
            FieldOutcome { name: field.name, result }
        })
        .collect();

    info!(
        fields = outcomes.len(),
        failed = outcomes.iter().filter(|o| o.result.is_err()).count(),
        "Batch assessment finished"
    );
    outcomes
}

/// Summary rows for the fields that scored successfully
pub fn summarize(outcomes: &[FieldOutcome]) -> Vec<FieldSummary> {
    outcomes
        .iter()
        .filter_map(|o| o.result.as_ref().ok().map(|a| FieldSummary::new(&o.name, a)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use insta::assert_yaml_snapshot;

    const FIELDS: &str = r#"[
        {"name": "Field A", "N": 500, "P": 20, "K": 250, "pH": 4.5, "EC": 1.5, "OC": 0.8},
        {"name": "Field B", "N": 400, "P": 20, "K": 200, "pH": 6.8, "EC": 1.2, "OC": 0.9},
        {"name": "Broken", "N": 400, "P": 20, "K": 200, "pH": 15.0, "EC": 1.2, "OC": 0.9},
        {"name": "Field D", "N": 400, "P": 18, "K": 200, "pH": 6.5, "EC": 5.2, "OC": 0.8}
    ]"#;

    #[test]
    fn test_invalid_field_does_not_abort_batch() {
        let outcomes = assess_batch(parse_batch(FIELDS).unwrap());
        assert_eq!(outcomes.len(), 4);
        assert!(outcomes[0].result.is_ok());
        assert!(outcomes[2].result.as_ref().unwrap_err().contains("pH"));
        assert_eq!(summarize(&outcomes).len(), 3);
    }

    #[test]
    fn test_malformed_json_is_an_error() {
        assert!(parse_batch("{not json").is_err());
        assert!(parse_batch(r#"[{"name": "x", "N": 1}]"#).is_err());
    }

    #[test]
    fn test_summary_rows() {
        let outcomes = assess_batch(parse_batch(FIELDS).unwrap());
        let summary = summarize(&outcomes);
        assert_yaml_snapshot!(summary[1], @r"
        field: Field B
        n_kg_ha: 400.0
        p_kg_ha: 20.0
        k_kg_ha: 200.0
        ph: 6.8
        ec_ds_m: 1.2
        oc_percent: 0.9
        index_score: 558.0
        final_score: 558.0
        npk_status: Fertile
        limiting_factor: pH (Nutrient Availability)
        fertility_class: OPTIMAL
        ");
        assert_eq!(summary[2].limiting_factor, "EC / Salinity (Osmotic Stress)");
        assert_eq!(summary[2].fertility_class, "INFERTILE");
    }
}
