//! Output formatting utilities

use crate::application::{ExprCheck, GenerateReport};
use crate::domain::effects::{EffectCategory, Effects};
use crate::domain::extract::Extraction;
use crate::domain::graph::GraphArtifact;
use crate::domain::index::IndexArtifact;
use crate::domain::tags::TagKind;

fn push_effects(output: &mut String, effects: &Effects, indent: &str) {
    for category in EffectCategory::ALL {
        let tokens = effects.get(category);
        if tokens.is_empty() {
            continue;
        }
        let joined: Vec<&str> = tokens.iter().map(String::as_str).collect();
        output.push_str(&format!("{}{}: {}\n", indent, category, joined.join(", ")));
    }
}

/// Format an extraction: one section per block, then the totals
pub fn format_extraction(extraction: &Extraction) -> String {
    if extraction.auto.is_empty() {
        return "No effects found".to_string();
    }

    let mut output = String::new();
    for (i, block) in extraction.blocks.iter().enumerate() {
        output.push_str(&format!("Block {}\n", i + 1));
        push_effects(&mut output, block, "  ");
    }
    output.push_str("Total\n");
    push_effects(&mut output, &extraction.auto, "  ");
    output
}

/// Format expression checks, one line per input
pub fn format_checks(checks: &[ExprCheck]) -> String {
    let mut output = String::new();
    for check in checks {
        match &check.result {
            Ok(expr) => output.push_str(&format!("✓ {} ({})\n", expr, expr.side())),
            Err(errors) => {
                output.push_str(&format!("✗ {}\n", check.input));
                for message in errors.messages() {
                    output.push_str(&format!("    {}\n", message));
                }
            }
        }
    }
    output
}

/// Format the tag kind catalogue
pub fn format_kinds(kinds: &[TagKind]) -> String {
    let width = kinds.iter().map(|k| k.template.len()).max().unwrap_or(0);
    let mut output = String::new();
    for kind in kinds {
        output.push_str(&format!(
            "{:<width$}  {:<8}  {}: {}\n",
            kind.template,
            kind.side.to_string(),
            kind.label,
            kind.help,
            width = width
        ));
    }
    output
}

pub fn format_generate_report(report: &GenerateReport) -> String {
    let mut output = format!("Tagged {} cards", report.tagged);
    if report.skipped_alt_art > 0 {
        output.push_str(&format!(" ({} alternate arts skipped)", report.skipped_alt_art));
    }
    if report.overrides_applied > 0 || !report.overrides_skipped.is_empty() {
        output.push_str(&format!(
            "\nApplied {} overrides, skipped {}",
            report.overrides_applied,
            report.overrides_skipped.len()
        ));
    }
    output
}

pub fn format_index_summary(artifact: &IndexArtifact) -> String {
    format!(
        "Indexed {} cards ({} source): {} produces keys, {} requires keys",
        artifact.meta.cards,
        artifact.meta.source,
        artifact.index.by_produces.len(),
        artifact.index.by_requires.len()
    )
}

pub fn format_graph_summary(artifact: &GraphArtifact) -> String {
    format!(
        "Wrote {} edges over {} nodes",
        artifact.edges.len(),
        artifact.nodes.len()
    )
}
