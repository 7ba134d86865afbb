//! Context formatting for the reasoning calls
//!
//! Each step submits one formatted context block to the reasoning
//! collaborator. The wording here is deliberately plain; the structure
//! (which record fields feed which step) is what matters to the workflow.

use packeval_types::Component;

use crate::retrieval::RetrievedPassage;

pub const ENGINEER_PERSONA: &str = "You are a specialized packaging engineer with expertise in \
     materials, manufacturing processes, and structural design. \
     Respond with a single JSON object matching the requested schema.";

/// Render the component list as a prompt block
pub fn components_block(components: &[Component]) -> String {
    components
        .iter()
        .map(|c| {
            format!(
                "- {} (Material: {}, Function: {})",
                c.name, c.material, c.function
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Render retrieved knowledge-base passages, empty string when none
pub fn references_block(references: &[RetrievedPassage]) -> String {
    if references.is_empty() {
        return String::new();
    }
    let entries = references
        .iter()
        .map(|p| format!("- {}", p.content))
        .collect::<Vec<_>>()
        .join("\n");
    format!("\n## Knowledge Base References\n{}\n", entries)
}

pub fn image_analysis_prompt(concept: &str) -> String {
    format!(
        "# Packaging Concept Image Analysis\n\n\
         Analyze the attached packaging concept images: identify visible \
         components, assess the materials from their appearance, and note \
         structural design features and manufacturing implications.\n\n\
         ## Packaging Concept Text Description\n{}",
        concept
    )
}

pub fn concept_breakdown_prompt(concept: &str, image_summary: Option<&str>) -> String {
    format!(
        "# Packaging Concept Breakdown\n\n\
         Break the packaging concept into its components, both visible and \
         hidden. For each component specify name, material, function, and \
         requirements.\n\n\
         ## Packaging Concept\n{}\n\n\
         ## Image Analysis\n{}",
        concept,
        image_summary.unwrap_or("No image analysis available")
    )
}

pub fn technical_prompt(components: &[Component], references: &[RetrievedPassage]) -> String {
    format!(
        "# Technical Feasibility Assessment\n\n\
         Evaluate each component's technical feasibility considering material \
         properties and manufacturing processes, then give an overall verdict.\n\n\
         ## Components\n{}\n{}",
        components_block(components),
        references_block(references)
    )
}

pub fn operations_prompt(
    components: &[Component],
    technical_summary: Option<&str>,
    references: &[RetrievedPassage],
) -> String {
    format!(
        "# Operational Impact Assessment\n\n\
         Assess supply chain impact, required production changes, cost \
         implications, and overall operational feasibility.\n\n\
         ## Components\n{}\n\n\
         ## Technical Assessment\n{}\n{}",
        components_block(components),
        technical_summary.unwrap_or("No technical assessment available"),
        references_block(references)
    )
}

pub fn reflection_prompt(technical_summary: &str, operational_summary: &str) -> String {
    format!(
        "# Assessment Reflection\n\n\
         Review the assessments for blind spots, raise open questions, and \
         recommend whether further iteration is needed.\n\n\
         ## Technical Assessment\n{}\n\n\
         ## Operational Assessment\n{}",
        technical_summary, operational_summary
    )
}

pub fn final_evaluation_prompt(
    technical_summary: &str,
    operational_summary: &str,
    reflection_summary: &str,
) -> String {
    format!(
        "# Final Evaluation\n\n\
         Produce an overall feasibility score (1-10), key strengths and \
         challenges, improvement recommendations, a go/no-go decision, \
         action items, and an executive summary.\n\n\
         ## Technical Assessment\n{}\n\n\
         ## Operational Assessment\n{}\n\n\
         ## Reflection Notes\n{}",
        technical_summary, operational_summary, reflection_summary
    )
}
