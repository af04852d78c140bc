//! Plain-text rendering of the results browser and history for the terminal.

use pharmaguard_client::browser::{AssessmentDetails, AssessmentView};
use pharmaguard_client::selector::CatalogEntry;
use pharmaguard_client::{AnalysisRecord, ResultsView};

pub fn results(view: &ResultsView) -> String {
    if let Some(message) = view.empty_message {
        return format!("{message}\n");
    }
    let mut lines = Vec::new();
    for item in &view.items {
        lines.push(header(item));
        if let Some(details) = &item.details {
            lines.extend(detail_lines(details));
        }
    }
    lines.join("\n") + "\n"
}

fn header(item: &AssessmentView) -> String {
    let marker = if item.expanded { "v" } else { ">" };
    format!(
        "{marker} {:>2}. {:<14} {} [{}]",
        item.index + 1,
        item.drug,
        item.badge,
        item.category.as_str().to_uppercase()
    )
}

fn detail_lines(d: &AssessmentDetails) -> Vec<String> {
    let mut lines = vec![
        format!("      Severity:      {}", d.severity),
        format!("      Confidence:    {}", d.confidence),
        format!("      Primary Gene:  {}", d.primary_gene),
        format!("      Phenotype:     {}", d.phenotype),
        format!("      Diplotype:     {}", d.diplotype),
    ];
    if let Some(explanation) = &d.explanation {
        lines.push(format!("      AI Explanation: {explanation}"));
    }
    lines.push(format!("      {}", d.recommendation_title));
    lines.push(format!("        {}", d.recommendation));
    if let Some(dose) = &d.dose_adjustment {
        lines.push(format!("        Dose Adjustment: {dose}"));
    }
    if let Some(monitoring) = &d.monitoring_advice {
        lines.push(format!("        Monitoring: {monitoring}"));
    }
    lines
}

pub fn catalog(entries: &[CatalogEntry]) -> String {
    entries
        .iter()
        .map(|e| format!("{:<14} {}", e.code.as_str(), e.gene))
        .collect::<Vec<_>>()
        .join("\n")
        + "\n"
}

pub fn history(records: &[AnalysisRecord]) -> String {
    if records.is_empty() {
        return "No analyses recorded yet.\n".to_string();
    }
    records
        .iter()
        .map(|r| {
            let drugs: Vec<_> = r.drugs.iter().map(|d| d.as_str()).collect();
            let risks: Vec<_> = r
                .result
                .iter()
                .map(|a| format!("{}={}", a.drug, a.risk_label().unwrap_or("Unknown Risk")))
                .collect();
            format!(
                "{}  {}  {}  [{}]  {}",
                r.created_at.format("%Y-%m-%d %H:%M:%S"),
                r.id,
                r.file_name,
                drugs.join(", "),
                risks.join(" ")
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
        + "\n"
}
