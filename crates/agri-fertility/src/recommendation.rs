//! Rule-based soil recommendations.
//!
//! Each rule maps a measurement falling below a threshold to a fixed text
//! line. Sections always appear in the same order; only their contents vary.

use crate::sample::SoilSample;
use crate::scorer::FertilityAssessment;
use crate::thresholds::*;

const RULE: &str = "================================================================================";

struct Builder {
    lines: Vec<String>,
}

impl Builder {
    fn new() -> Self {
        Self { lines: Vec::new() }
    }

    fn heading(&mut self, title: &str) {
        if !self.lines.is_empty() {
            self.lines.push(String::new());
        }
        self.lines.push(title.to_string());
        self.lines.push(RULE.to_string());
    }

    fn line(&mut self, text: impl Into<String>) {
        self.lines.push(text.into());
    }

    fn bullet(&mut self, text: impl AsRef<str>) {
        self.lines.push(format!("  • {}", text.as_ref()));
    }

    fn finish(self) -> String {
        self.lines.join("\n")
    }
}

fn nutrient_status(out: &mut Builder, name: &str, value: f64, low: f64, medium_upper: f64) {
    if value < low {
        out.bullet(format!("{}: Critical deficiency - Immediate action needed", name));
    } else if value < medium_upper {
        out.bullet(format!("{}: Below optimal - Consider supplementation", name));
    }
}

/// Build the recommendation text for a scored sample
pub fn generate(sample: &SoilSample, assessment: &FertilityAssessment) -> String {
    let (n, p, k) = (sample.nitrogen(), sample.phosphorus(), sample.potassium());
    let (ph, ec, oc) = (sample.ph(), sample.ec(), sample.organic_carbon());
    let mut out = Builder::new();

    out.heading("🌱 SOIL HEALTH ASSESSMENT");
    out.line(format!(
        "Limiting factor: {} (strength {:.2})",
        assessment.limiting_factor.limiting_name(),
        assessment.limiting_factor_strength
    ));

    out.line("");
    out.line("NUTRIENT STATUS:");
    nutrient_status(&mut out, "NITROGEN", n, N_LOW, N_MEDIUM_UPPER);
    nutrient_status(&mut out, "PHOSPHORUS", p, P_LOW, P_MEDIUM_UPPER);
    nutrient_status(&mut out, "POTASSIUM", k, K_LOW, K_MEDIUM_UPPER);

    out.line("");
    out.line("SOIL CONDITION:");
    if ph < PH_HIGHLY_ACIDIC_UPPER {
        out.bullet(format!("pH: {:.1} (Highly Acidic) - Requires pH adjustment", ph));
    } else if ph < PH_OPTIMAL_LOWER {
        out.bullet(format!("pH: {:.1} (Slightly Acidic) - Monitor or adjust", ph));
    } else {
        out.bullet(format!("pH: {:.1} (Within optimal range)", ph));
    }
    if ec > EC_MODERATE_UPPER {
        out.bullet(format!("SALINITY: {:.1} dS/m (High) - Requires remediation", ec));
    } else if ec > EC_GOOD_UPPER {
        out.bullet(format!("SALINITY: {:.1} dS/m (Moderate) - Monitor", ec));
    }
    if oc < OC_AVERAGE_UPPER {
        out.bullet(format!("ORGANIC MATTER: {:.1}% (Low) - Needs improvement", oc));
    }

    out.heading("🌿 RECOMMENDED ECO-FRIENDLY AMENDMENTS");
    out.line("1. ORGANIC MATTER (The 'Fuel'):");
    out.bullet("COMPOST/VERMICOMPOST: 2-3 tons/acre (rich in nutrients & microbes)");
    out.bullet("GREEN MANURE: Grow and incorporate legumes (clover, alfalfa, cowpea)");
    out.bullet("SEAWEED/KELP MEAL: 100-200 kg/acre (trace minerals & growth stimulants)");

    out.line("");
    out.line("2. BIOFERTILIZERS (The 'Engine'):");
    if n < N_MEDIUM_UPPER {
        out.bullet("NITROGEN-FIXING BACTERIA: Rhizobium for legumes, Azotobacter for non-legumes");
    }
    if p < P_MEDIUM_UPPER {
        out.bullet("PHOSPHATE SOLUBILIZING BACTERIA (PSB): Unlocks phosphorus in soil");
    }
    out.bullet("MYCORRHIZAL FUNGI: Improves nutrient and water uptake (apply at planting)");

    out.line("");
    out.line("3. MINERAL AMENDMENTS (The 'Foundations'):");
    out.bullet("ROCK DUST: 500-1000 kg/acre (provides 70+ trace minerals)");
    if ph < PH_OPTIMAL_LOWER {
        out.bullet("AGRICULTURAL LIME: 2-5 tons/acre (raises pH, adds calcium)");
    }
    if ec > EC_GOOD_UPPER {
        out.bullet("GYPSUM: 1-2 tons/acre (improves soil structure, reduces salinity)");
    }
    out.bullet("BIOCHAR: 2-5 tons/acre (improves water retention & microbial habitat)");

    out.heading("🌍 SOIL BUILDING PRACTICES");
    out.bullet("COVER CROPPING: Plant nitrogen-fixing legumes in off-seasons");
    out.bullet("CROP ROTATION: Rotate heavy feeders with soil builders");
    out.bullet("REDUCED TILLAGE: Preserve soil structure and microbial life");
    out.bullet("MULCHING: 2-4 inches of organic mulch to retain moisture");

    out.heading("📅 RECOMMENDED IMPLEMENTATION");
    out.line("1. IMMEDIATE (0-2 weeks):");
    out.line("   • Apply compost/vermicompost");
    out.line("   • Inoculate with biofertilizers");
    out.line("   • Apply mineral amendments based on soil test");
    out.line("");
    out.line("2. SHORT-TERM (2-8 weeks):");
    out.line("   • Plant green manure/cover crops");
    out.line("   • Apply foliar sprays (seaweed extract, compost tea)");
    out.line("");
    out.line("3. LONG-TERM (2+ months):");
    out.line("   • Establish permanent soil cover");
    out.line("   • Implement crop rotation plan");
    out.line("   • Regular soil testing (every 6-12 months)");

    out.heading("🔍 MONITORING & MAINTENANCE");
    out.bullet("Test soil every 6-12 months");
    out.bullet("Observe plant health and growth patterns");
    out.bullet("Adjust practices based on results");
    out.bullet("Keep records of inputs and outcomes");

    out.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scorer::assess_fertility;

    fn recommend(n: f64, p: f64, k: f64, ph: f64, ec: f64, oc: f64) -> String {
        let sample = SoilSample::new(n, p, k, ph, ec, oc).unwrap();
        let assessment = assess_fertility(&sample);
        generate(&sample, &assessment)
    }

    #[test]
    fn test_sections_in_fixed_order() {
        let text = recommend(100.0, 5.0, 80.0, 5.2, 0.8, 0.3);
        let order = [
            "SOIL HEALTH ASSESSMENT",
            "NUTRIENT STATUS:",
            "SOIL CONDITION:",
            "ORGANIC MATTER (The 'Fuel')",
            "BIOFERTILIZERS (The 'Engine')",
            "MINERAL AMENDMENTS (The 'Foundations')",
            "SOIL BUILDING PRACTICES",
            "RECOMMENDED IMPLEMENTATION",
            "MONITORING & MAINTENANCE",
        ];
        let positions: Vec<usize> = order
            .iter()
            .map(|heading| text.find(heading).unwrap_or_else(|| panic!("missing {}", heading)))
            .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_poor_soil_rules_fire() {
        let text = recommend(100.0, 5.0, 80.0, 5.2, 0.8, 0.3);
        assert!(text.contains("NITROGEN: Critical deficiency"));
        assert!(text.contains("PHOSPHORUS: Critical deficiency"));
        assert!(text.contains("POTASSIUM: Critical deficiency"));
        assert!(text.contains("pH: 5.2 (Highly Acidic)"));
        assert!(text.contains("ORGANIC MATTER: 0.3% (Low)"));
        assert!(text.contains("AGRICULTURAL LIME"));
        assert!(text.contains("NITROGEN-FIXING BACTERIA"));
        assert!(text.contains("PHOSPHATE SOLUBILIZING BACTERIA"));
        assert!(!text.contains("GYPSUM"));
        assert!(!text.contains("SALINITY"));
    }

    #[test]
    fn test_rich_soil_omits_conditional_lines() {
        let text = recommend(600.0, 30.0, 300.0, 6.8, 1.0, 0.9);
        assert!(!text.contains("NITROGEN:"));
        assert!(!text.contains("Critical deficiency"));
        assert!(!text.contains("Below optimal"));
        assert!(text.contains("pH: 6.8 (Within optimal range)"));
        assert!(!text.contains("AGRICULTURAL LIME"));
        assert!(!text.contains("NITROGEN-FIXING"));
        assert!(!text.contains("PSB"));
        assert!(text.contains("MYCORRHIZAL FUNGI"));
    }

    #[test]
    fn test_salinity_lines() {
        let moderate = recommend(400.0, 20.0, 200.0, 6.5, 3.0, 0.8);
        assert!(moderate.contains("SALINITY: 3.0 dS/m (Moderate) - Monitor"));
        assert!(moderate.contains("GYPSUM"));

        let high = recommend(400.0, 20.0, 200.0, 6.5, 5.2, 0.8);
        assert!(high.contains("SALINITY: 5.2 dS/m (High) - Requires remediation"));
    }

    #[test]
    fn test_below_optimal_nutrients() {
        let text = recommend(400.0, 20.0, 200.0, 5.8, 1.0, 0.8);
        assert!(text.contains("NITROGEN: Below optimal"));
        assert!(text.contains("PHOSPHORUS: Below optimal"));
        assert!(text.contains("POTASSIUM: Below optimal"));
        assert!(text.contains("pH: 5.8 (Slightly Acidic)"));
    }
}
