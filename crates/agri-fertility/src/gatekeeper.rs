//! Gatekeeper assessors for pH, salinity and organic carbon.
//!
//! Each assessor is a step function from a raw measurement to a label and a
//! correction factor in [0, 1]. 1.0 means no limitation; 0.1-0.2 is severe.
//! Boundary inclusion is part of the contract:
//!
//! | pH            | label             | factor |
//! |---------------|-------------------|--------|
//! | < 5.5         | Highly Acidic     | 0.2    |
//! | [5.5, 6.0)    | Suboptimal        | 0.6    |
//! | [6.0, 7.5]    | Optimal           | 1.0    |
//! | (7.5, 8.5)    | Slightly Alkaline | 0.7    |
//! | >= 8.5        | Highly Alkaline   | 0.2    |

use serde::Serialize;

use crate::thresholds::*;

/// The three non-nutrient soil properties that throttle nutrient use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Gatekeeper {
    Ph,
    Ec,
    OrganicCarbon,
}

impl Gatekeeper {
    /// Tie-break priority when several share the minimum factor
    pub const PRIORITY: [Gatekeeper; 3] = [Gatekeeper::Ph, Gatekeeper::Ec, Gatekeeper::OrganicCarbon];

    /// Name used when this gatekeeper is the limiting factor
    pub fn limiting_name(&self) -> &'static str {
        match self {
            Gatekeeper::Ph => "pH (Nutrient Availability)",
            Gatekeeper::Ec => "EC / Salinity (Osmotic Stress)",
            Gatekeeper::OrganicCarbon => "Organic Carbon (Biological Activity)",
        }
    }
}

impl std::fmt::Display for Gatekeeper {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.limiting_name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GatekeeperResult {
    pub gatekeeper: Gatekeeper,
    pub label: &'static str,
    pub range: &'static str,
    pub correction_factor: f64,
}

impl GatekeeperResult {
    fn new(gatekeeper: Gatekeeper, label: &'static str, range: &'static str, correction_factor: f64) -> Self {
        Self { gatekeeper, label, range, correction_factor }
    }

    /// "Highly Acidic (< 5.5)"
    pub fn display_label(&self) -> String {
        format!("{} ({})", self.label, self.range)
    }
}

pub fn assess_ph(ph: f64) -> GatekeeperResult {
    let g = Gatekeeper::Ph;
    if ph < PH_HIGHLY_ACIDIC_UPPER {
        GatekeeperResult::new(g, "Highly Acidic", "< 5.5", 0.2)
    } else if ph < PH_OPTIMAL_LOWER {
        GatekeeperResult::new(g, "Suboptimal", "5.5-6.0", 0.6)
    } else if ph <= PH_OPTIMAL_UPPER {
        GatekeeperResult::new(g, "Optimal", "6.0-7.5", 1.0)
    } else if ph < PH_ALKALINE_LOWER {
        GatekeeperResult::new(g, "Slightly Alkaline", "7.5-8.5", 0.7)
    } else {
        GatekeeperResult::new(g, "Highly Alkaline", "> 8.5", 0.2)
    }
}

pub fn assess_ec(ec: f64) -> GatekeeperResult {
    let g = Gatekeeper::Ec;
    if ec <= EC_GOOD_UPPER {
        GatekeeperResult::new(g, "Good", "0-2 dS/m", 1.0)
    } else if ec <= EC_MODERATE_UPPER {
        GatekeeperResult::new(g, "Moderate", "2-4 dS/m", 0.6)
    } else {
        GatekeeperResult::new(g, "Saline", "> 4 dS/m", 0.1)
    }
}

pub fn assess_organic_carbon(oc_percent: f64) -> GatekeeperResult {
    let g = Gatekeeper::OrganicCarbon;
    if oc_percent < OC_LOW_UPPER {
        GatekeeperResult::new(g, "Low", "< 0.5%", 0.2)
    } else if oc_percent <= OC_AVERAGE_UPPER {
        GatekeeperResult::new(g, "Average", "0.5-0.75%", 0.6)
    } else {
        GatekeeperResult::new(g, "High", "> 0.75%", 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ph(value: f64) -> (&'static str, f64) {
        let result = assess_ph(value);
        (result.label, result.correction_factor)
    }

    #[test]
    fn test_ph_boundaries() {
        assert_eq!(ph(5.49), ("Highly Acidic", 0.2));
        assert_eq!(ph(5.5), ("Suboptimal", 0.6));
        assert_eq!(ph(5.99), ("Suboptimal", 0.6));
        assert_eq!(ph(6.0), ("Optimal", 1.0));
        assert_eq!(ph(7.5), ("Optimal", 1.0));
        assert_eq!(ph(7.51), ("Slightly Alkaline", 0.7));
        assert_eq!(ph(8.49), ("Slightly Alkaline", 0.7));
        assert_eq!(ph(8.5), ("Highly Alkaline", 0.2));
    }

    #[test]
    fn test_ec_boundaries() {
        assert_eq!(assess_ec(0.0).label, "Good");
        assert_eq!(assess_ec(2.0).correction_factor, 1.0);
        assert_eq!(assess_ec(2.01).label, "Moderate");
        assert_eq!(assess_ec(4.0).correction_factor, 0.6);
        assert_eq!(assess_ec(4.01).label, "Saline");
        assert_eq!(assess_ec(4.01).correction_factor, 0.1);
    }

    #[test]
    fn test_organic_carbon_boundaries() {
        assert_eq!(assess_organic_carbon(0.49).correction_factor, 0.2);
        assert_eq!(assess_organic_carbon(0.5).label, "Average");
        assert_eq!(assess_organic_carbon(0.75).label, "Average");
        assert_eq!(assess_organic_carbon(0.76).label, "High");
        assert_eq!(assess_organic_carbon(0.76).correction_factor, 1.0);
    }

    #[test]
    fn test_factors_stay_in_unit_interval() {
        let mut x = -1.0;
        while x < 16.0 {
            for result in [assess_ph(x), assess_ec(x), assess_organic_carbon(x)] {
                assert!((0.0..=1.0).contains(&result.correction_factor));
            }
            x += 0.05;
        }
    }

    #[test]
    fn test_display_label() {
        assert_eq!(assess_ph(4.5).display_label(), "Highly Acidic (< 5.5)");
        assert_eq!(assess_ec(5.0).display_label(), "Saline (> 4 dS/m)");
        assert_eq!(Gatekeeper::Ec.to_string(), "EC / Salinity (Osmotic Stress)");
    }
}
