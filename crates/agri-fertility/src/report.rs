//! Plain-text fertility report

use crate::recommendation;
use crate::scorer::FertilityAssessment;

const RULE: &str = "================================================================================";

/// Render the sectioned report for one field.
///
/// Scores are rounded to two decimals for display only.
pub fn render_report(assessment: &FertilityAssessment, field_name: &str) -> String {
    let s = &assessment.sample;
    let mut report = Vec::new();

    report.push(RULE.to_string());
    report.push(format!("COMPREHENSIVE SOIL FERTILITY ANALYSIS - {}", field_name));
    report.push("Using Liebig's Law of the Minimum".to_string());
    report.push(RULE.to_string());

    report.push(String::new());
    report.push("[PARAMETER CLASSIFICATIONS]".to_string());
    report.push(format!(
        "  Nitrogen (N):      {:>7.0} kg/ha -> {}",
        s.nitrogen(),
        assessment.nitrogen.band
    ));
    report.push(format!(
        "  Phosphorus (P):    {:>7.1} kg/ha -> {}",
        s.phosphorus(),
        assessment.phosphorus.band
    ));
    report.push(format!(
        "  Potassium (K):     {:>7.0} kg/ha -> {}",
        s.potassium(),
        assessment.potassium.band
    ));
    report.push(format!("  NPK Overall:                    {}", assessment.npk_overall));

    report.push(String::new());
    report.push("[CRITICAL GATEWAY FACTORS]".to_string());
    report.push(format!(
        "  pH Level:          {:>7.2}      -> {} (Correction: {})",
        s.ph(),
        assessment.ph.display_label(),
        assessment.ph.correction_factor
    ));
    report.push(format!(
        "  EC (Salinity):     {:>7.2} dS/m -> {} (Correction: {})",
        s.ec(),
        assessment.ec.display_label(),
        assessment.ec.correction_factor
    ));
    report.push(format!(
        "  Organic Carbon:    {:>7.2} %    -> {} (Quality: {})",
        s.organic_carbon(),
        assessment.organic_carbon.display_label(),
        assessment.organic_carbon.correction_factor
    ));

    report.push(String::new());
    report.push("[LIEBIG'S LAW ANALYSIS]".to_string());
    report.push(format!("  Fertility Index Score:         {:.2}", assessment.index_score));
    report.push(format!(
        "  Limiting Factor:               {}",
        assessment.limiting_factor.limiting_name()
    ));
    report.push(format!(
        "  Limiting Factor Strength:      {:.2} (out of 1.0)",
        assessment.limiting_factor_strength
    ));
    report.push(format!("  Final Corrected Score:         {:.2}", assessment.final_score));

    report.push(String::new());
    report.push("[FINAL FERTILITY CLASSIFICATION]".to_string());
    report.push(format!("  Status:    {}", assessment.classification));
    report.push(format!("  Summary:   {}", assessment.description));
    report.push(format!("  Priority:  {}", assessment.action_priority().as_str()));

    report.push(String::new());
    report.push("[RECOMMENDATIONS]".to_string());
    report.push(recommendation::generate(s, assessment));
    report.push(RULE.to_string());

    report.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sample::SoilSample;
    use crate::scorer::assess_fertility;
    use insta::assert_snapshot;

    fn header(report: &str) -> String {
        report
            .lines()
            .take_while(|line| *line != "[RECOMMENDATIONS]")
            .collect::<Vec<_>>()
            .join("\n")
            .trim_end()
            .to_string()
    }

    #[test]
    fn test_report_for_acidic_field() {
        let sample = SoilSample::new(500.0, 20.0, 250.0, 4.5, 1.5, 0.8).unwrap();
        let report = render_report(&assess_fertility(&sample), "Field A");

        assert_snapshot!(header(&report), @r"
        ================================================================================
        COMPREHENSIVE SOIL FERTILITY ANALYSIS - Field A
        Using Liebig's Law of the Minimum
        ================================================================================

        [PARAMETER CLASSIFICATIONS]
          Nitrogen (N):          500 kg/ha -> Fertile
          Phosphorus (P):       20.0 kg/ha -> Fertile
          Potassium (K):         250 kg/ha -> Fertile
          NPK Overall:                    Fertile

        [CRITICAL GATEWAY FACTORS]
          pH Level:             4.50      -> Highly Acidic (< 5.5) (Correction: 0.2)
          EC (Salinity):        1.50 dS/m -> Good (0-2 dS/m) (Correction: 1)
          Organic Carbon:       0.80 %    -> High (> 0.75%) (Quality: 1)

        [LIEBIG'S LAW ANALYSIS]
          Fertility Index Score:         616.00
          Limiting Factor:               pH (Nutrient Availability)
          Limiting Factor Strength:      0.20 (out of 1.0)
          Final Corrected Score:         123.20

        [FINAL FERTILITY CLASSIFICATION]
          Status:    INFERTILE
          Summary:   Infertile due to pH (Nutrient Availability) being the limiting factor
          Priority:  CRITICAL
        ");
    }

    #[test]
    fn test_report_ends_with_recommendations() {
        let sample = SoilSample::new(400.0, 20.0, 200.0, 6.8, 1.2, 0.9).unwrap();
        let report = render_report(&assess_fertility(&sample), "Field B");
        assert!(report.contains("Status:    OPTIMAL"));
        assert!(report.contains("[RECOMMENDATIONS]\n🌱 SOIL HEALTH ASSESSMENT"));
        assert!(report.ends_with(RULE));
    }
}
