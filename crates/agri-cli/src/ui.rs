//! Terminal rendering for the CLI

use agri_core::{CapabilityStatus, KnowledgeAnswer};
use agri_fertility::{
    ActionPriority, FertilityAssessment, FertilityClass, FieldOutcome, Gatekeeper, NutrientAssessment,
    NutrientStatus,
};
use colored::*;
use crossterm::terminal::size;

/// Display startup banner
pub fn display_banner() {
    let terminal_width = size().map(|(w, _)| w as usize).unwrap_or(80);
    let banner_width = std::cmp::min(67, terminal_width.saturating_sub(4)).max(40);

    let top_border = format!("┌{}┐", "─".repeat(banner_width - 2));
    let bottom_border = format!("└{}┘", "─".repeat(banner_width - 2));
    let empty_line = format!("│{}│", " ".repeat(banner_width - 2));

    println!();
    println!("{}", top_border.green());
    println!("{}", empty_line.green());

    let title = "AgriSage - Soil & Crop Advisor";
    println!(
        "│  {}{}│",
        title.green().bold(),
        " ".repeat(banner_width.saturating_sub(title.chars().count() + 4))
    );
    println!("{}", empty_line.green());

    let version = concat!("v", env!("CARGO_PKG_VERSION"), " • Liebig's Law of the Minimum");
    println!(
        "│  {}{}│",
        version.dimmed(),
        " ".repeat(banner_width.saturating_sub(version.chars().count() + 4))
    );
    println!("{}", bottom_border.green());
    println!();
}

fn class_colored(class: FertilityClass) -> ColoredString {
    let text = class.as_str();
    match class {
        FertilityClass::Optimal | FertilityClass::High => text.green().bold(),
        FertilityClass::Moderate => text.yellow().bold(),
        FertilityClass::Low | FertilityClass::Infertile => text.red().bold(),
    }
}

fn priority_colored(priority: ActionPriority) -> ColoredString {
    match priority {
        ActionPriority::Critical => priority.as_str().red().bold(),
        ActionPriority::Medium => priority.as_str().yellow(),
        ActionPriority::Low => priority.as_str().green(),
    }
}

fn nutrient_line(n: &NutrientAssessment) -> String {
    let marker = match n.status {
        NutrientStatus::Ok => "✓".green(),
        NutrientStatus::Critical => "✗".red(),
    };
    format!(
        "  {} {:<11} {:>8.1} kg/ha  {}",
        marker,
        n.nutrient.name(),
        n.value,
        n.band
    )
}

fn short_name(gatekeeper: Gatekeeper) -> &'static str {
    match gatekeeper {
        Gatekeeper::Ph => "pH",
        Gatekeeper::Ec => "EC",
        Gatekeeper::OrganicCarbon => "Organic Carbon",
    }
}

/// Compact coloured summary of one assessment
pub fn render_assessment(assessment: &FertilityAssessment, field_name: &str) -> String {
    let mut lines = Vec::new();
    lines.push(format!("{} {}", "🌱".green(), field_name.bold()));
    for n in [&assessment.nitrogen, &assessment.phosphorus, &assessment.potassium] {
        lines.push(nutrient_line(n));
    }
    for g in assessment.gatekeepers() {
        lines.push(format!(
            "  • {:<15} {} (x{})",
            short_name(g.gatekeeper),
            g.display_label(),
            g.correction_factor
        ));
    }
    lines.push(format!(
        "  Index {:.2} → Final {:.2}  limited by {}",
        assessment.index_score,
        assessment.final_score,
        assessment.limiting_factor.limiting_name()
    ));
    lines.push(format!(
        "  {} {}  Priority: {}",
        class_colored(assessment.classification),
        assessment.description.dimmed(),
        priority_colored(assessment.action_priority())
    ));
    lines.join("\n")
}

/// Render an answer with its provenance
pub fn render_answer(answer: &KnowledgeAnswer) -> String {
    let confidence = format!("{:.0}%", answer.confidence * 100.0);
    let confidence = if answer.confidence >= 0.85 {
        confidence.green()
    } else if answer.confidence >= 0.5 {
        confidence.yellow()
    } else {
        confidence.red()
    };

    let mut lines = vec![
        format!("{} {}", "📘".cyan(), answer.title.bold()),
        String::new(),
        answer.answer.clone(),
        String::new(),
        format!(
            "{} confidence {} • {} source(s) • {}",
            "ℹ".dimmed(),
            confidence,
            answer.source_count,
            answer.source_kind
        ),
    ];
    if !answer.sources.is_empty() {
        lines.push(format!("  {}", answer.sources.join(", ").dimmed()));
    }
    lines.join("\n")
}

/// One line per capability
pub fn render_status(statuses: &[CapabilityStatus]) -> String {
    statuses
        .iter()
        .map(|s| {
            let mark = if s.available { "✅" } else { "⚪" };
            let state = if s.available { "available".green() } else { "not configured".dimmed() };
            match &s.detail {
                Some(detail) => format!("{} {:<17} {} ({})", mark, s.capability.name(), state, detail),
                None => format!("{} {:<17} {}", mark, s.capability.name(), state),
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Table of batch results, failed fields included
pub fn render_batch_table(outcomes: &[FieldOutcome]) -> String {
    let mut lines = vec![format!(
        "{:<16} {:>9} {:>9}  {:<13} {}",
        "Field", "Index", "Final", "NPK", "Class"
    )
    .bold()
    .to_string()];

    for outcome in outcomes {
        match &outcome.result {
            Ok(a) => lines.push(format!(
                "{:<16} {:>9.2} {:>9.2}  {:<13} {}",
                outcome.name,
                a.index_score,
                a.final_score,
                a.npk_overall.label(),
                class_colored(a.classification)
            )),
            Err(e) => lines.push(format!("{:<16} {} {}", outcome.name, "error:".red(), e)),
        }
    }
    lines.join("\n")
}
