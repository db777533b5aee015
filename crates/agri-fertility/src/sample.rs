//! Validated soil measurements

use agri_core::{Error, Result};
use serde::{Deserialize, Serialize};

/// Six soil measurements for one field.
///
/// Only constructed through [`SoilSample::new`], which rejects values no
/// soil test can produce. The scorer downstream assumes validated input.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SoilSample {
    nitrogen_kg_ha: f64,
    phosphorus_kg_ha: f64,
    potassium_kg_ha: f64,
    ph: f64,
    ec_ds_m: f64,
    organic_carbon_percent: f64,
}

impl SoilSample {
    pub fn new(
        nitrogen_kg_ha: f64,
        phosphorus_kg_ha: f64,
        potassium_kg_ha: f64,
        ph: f64,
        ec_ds_m: f64,
        organic_carbon_percent: f64,
    ) -> Result<Self> {
        let named = [
            ("nitrogen", nitrogen_kg_ha),
            ("phosphorus", phosphorus_kg_ha),
            ("potassium", potassium_kg_ha),
            ("pH", ph),
            ("EC", ec_ds_m),
            ("organic carbon", organic_carbon_percent),
        ];

        for (name, value) in named {
            if !value.is_finite() {
                return Err(Error::InvalidInput(format!("{} must be a finite number", name)));
            }
            if value < 0.0 {
                return Err(Error::InvalidInput(format!(
                    "{} cannot be negative (got {})",
                    name, value
                )));
            }
        }

        if ph > 14.0 {
            return Err(Error::InvalidInput(format!("pH must be between 0 and 14 (got {})", ph)));
        }

        Ok(Self {
            nitrogen_kg_ha,
            phosphorus_kg_ha,
            potassium_kg_ha,
            ph,
            ec_ds_m,
            organic_carbon_percent,
        })
    }

    pub fn nitrogen(&self) -> f64 {
        self.nitrogen_kg_ha
    }

    pub fn phosphorus(&self) -> f64 {
        self.phosphorus_kg_ha
    }

    pub fn potassium(&self) -> f64 {
        self.potassium_kg_ha
    }

    pub fn ph(&self) -> f64 {
        self.ph
    }

    pub fn ec(&self) -> f64 {
        self.ec_ds_m
    }

    pub fn organic_carbon(&self) -> f64 {
        self.organic_carbon_percent
    }
}

/// Unvalidated measurements as they arrive from JSON input
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RawSample {
    #[serde(alias = "N", alias = "nitrogen")]
    pub nitrogen_kg_ha: f64,
    #[serde(alias = "P", alias = "phosphorus")]
    pub phosphorus_kg_ha: f64,
    #[serde(alias = "K", alias = "potassium")]
    pub potassium_kg_ha: f64,
    #[serde(alias = "pH")]
    pub ph: f64,
    #[serde(alias = "EC", alias = "ec")]
    pub ec_ds_m: f64,
    #[serde(alias = "OC", alias = "oc")]
    pub organic_carbon_percent: f64,
}

impl TryFrom<RawSample> for SoilSample {
    type Error = Error;

    fn try_from(raw: RawSample) -> Result<Self> {
        SoilSample::new(
            raw.nitrogen_kg_ha,
            raw.phosphorus_kg_ha,
            raw.potassium_kg_ha,
            raw.ph,
            raw.ec_ds_m,
            raw.organic_carbon_percent,
        )
    }
}
