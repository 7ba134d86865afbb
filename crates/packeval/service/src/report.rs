//! Human-readable evaluation report
//!
//! Renders a record (usually a completed one) into the plain-text report
//! served by the API and printed by operators.

use packeval_types::EvaluationRecord;
use std::fmt::Write;

/// Format an evaluation record as a readable report
pub fn format_report(record: &EvaluationRecord) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "=== PACKAGING EVALUATION RESULTS ===");
    let _ = writeln!(out, "Concept: {}", record.concept);
    if let Some(evaluation) = &record.final_evaluation {
        let _ = writeln!(out, "Score: {}/10", evaluation.feasibility_score);
        let _ = writeln!(
            out,
            "Decision: {}",
            if evaluation.go_decision { "GO" } else { "NO-GO" }
        );
        let _ = writeln!(out, "Recommendation: {}", evaluation.executive_summary);
    }

    let _ = writeln!(out, "\n=== COMPONENTS ===");
    for component in &record.components {
        let _ = writeln!(
            out,
            "- {} ({}): {}",
            component.name, component.material, component.function
        );
    }

    if let Some(technical) = &record.technical_assessment {
        let _ = writeln!(out, "\n=== TECHNICAL ASSESSMENT ===");
        let _ = writeln!(
            out,
            "Overall: {}",
            if technical.overall_feasible {
                "Feasible"
            } else {
                "Not Feasible"
            }
        );
        let _ = writeln!(out, "{}", technical.technical_summary);
    }

    if let Some(operational) = &record.operational_assessment {
        let _ = writeln!(out, "\n=== OPERATIONAL ASSESSMENT ===");
        let _ = writeln!(out, "Supply Chain Impact: {}", operational.supply_chain_impact);
        let _ = writeln!(out, "Cost Impact: {}", operational.cost_impact);
    }

    if let Some(reflection) = &record.reflection_notes {
        let _ = writeln!(out, "\n=== REFLECTION NOTES ===");
        if !reflection.blind_spots.is_empty() {
            let _ = writeln!(out, "Blind Spots:");
            for spot in &reflection.blind_spots {
                let _ = writeln!(out, "- {}", spot);
            }
        }
        if !reflection.questions.is_empty() {
            let _ = writeln!(out, "Open Questions:");
            for question in &reflection.questions {
                let _ = writeln!(out, "- {}", question);
            }
        }
    }

    let _ = writeln!(out, "\n=== AGENT MESSAGES ===");
    for message in record.messages() {
        let _ = writeln!(out, "[{}] {}", message.agent, message.content);
    }

    out
}
