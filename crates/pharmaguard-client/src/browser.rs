//! Single-expansion results browser with JSON export.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use pharmaguard_common::{AnalysisResult, PerDrugAssessment, Result, RiskCategory};

pub const REPORT_FILE_NAME: &str = "pharmacogenomic_report.json";

const NOT_AVAILABLE: &str = "N/A";
const DEFAULT_GUIDELINE: &str = "CPIC";

/// Rendered form of the whole result.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultsView {
    pub items: Vec<AssessmentView>,
    /// Set when there is nothing to list.
    pub empty_message: Option<&'static str>,
}

/// Accordion header, plus details when expanded.
#[derive(Debug, Clone, PartialEq)]
pub struct AssessmentView {
    pub index: usize,
    pub drug: String,
    pub badge: String,
    pub category: RiskCategory,
    pub expanded: bool,
    pub details: Option<AssessmentDetails>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AssessmentDetails {
    pub severity: String,
    pub confidence: String,
    pub primary_gene: String,
    pub phenotype: String,
    pub diplotype: String,
    pub explanation: Option<String>,
    pub recommendation_title: String,
    pub recommendation: String,
    pub dose_adjustment: Option<String>,
    pub monitoring_advice: Option<String>,
}

fn present(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

fn or_placeholder(value: Option<&str>, placeholder: &str) -> String {
    present(value).unwrap_or(placeholder).to_string()
}

impl AssessmentDetails {
    fn from_assessment(a: &PerDrugAssessment) -> Self {
        let risk = a.risk_assessment.as_ref();
        let profile = a.pharmacogenomic_profile.as_ref();
        let rec = a.clinical_recommendation.as_ref();
        let llm = a.llm_generated_explanation.as_ref();

        Self {
            severity: or_placeholder(risk.and_then(|r| r.severity.as_deref()), NOT_AVAILABLE),
            confidence: risk
                .and_then(|r| r.confidence_score)
                .map(|c| format!("{}%", (c * 100.0).round()))
                .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
            primary_gene: or_placeholder(profile.and_then(|p| p.primary_gene.as_deref()), NOT_AVAILABLE),
            phenotype: or_placeholder(profile.and_then(|p| p.phenotype.as_deref()), NOT_AVAILABLE),
            diplotype: or_placeholder(profile.and_then(|p| p.diplotype.as_deref()), NOT_AVAILABLE),
            explanation: present(llm.and_then(|l| l.summary.as_deref())).map(String::from),
            recommendation_title: format!(
                "Clinical Recommendation ({})",
                present(rec.and_then(|r| r.guideline_source.as_deref())).unwrap_or(DEFAULT_GUIDELINE)
            ),
            recommendation: or_placeholder(
                rec.and_then(|r| r.recommendation_summary.as_deref()),
                "No specific recommendation provided.",
            ),
            dose_adjustment: present(rec.and_then(|r| r.dose_adjustment.as_deref())).map(String::from),
            monitoring_advice: present(rec.and_then(|r| r.monitoring_advice.as_deref())).map(String::from),
        }
    }
}

/// Browses one [`AnalysisResult`]. A new result gets a new browser, which
/// starts with the first assessment expanded.
#[derive(Debug, Clone)]
pub struct ResultsBrowser {
    result: Arc<AnalysisResult>,
    expanded: Option<usize>,
}

impl ResultsBrowser {
    pub fn new(result: Arc<AnalysisResult>) -> Self {
        let expanded = if result.is_empty() { None } else { Some(0) };
        Self { result, expanded }
    }

    pub fn result(&self) -> &Arc<AnalysisResult> {
        &self.result
    }

    pub fn expanded(&self) -> Option<usize> {
        self.expanded
    }

    pub fn is_expanded(&self, index: usize) -> bool {
        self.expanded == Some(index)
    }

    /// Collapse `index` if it is expanded, otherwise expand it exclusively.
    /// Out-of-range indices are ignored.
    pub fn toggle(&mut self, index: usize) {
        if index >= self.result.len() {
            return;
        }
        self.expanded = if self.expanded == Some(index) { None } else { Some(index) };
    }

    pub fn render(&self) -> ResultsView {
        let items: Vec<AssessmentView> = self
            .result
            .iter()
            .enumerate()
            .map(|(index, a)| {
                let expanded = self.is_expanded(index);
                AssessmentView {
                    index,
                    drug: or_placeholder(Some(a.drug.as_str()), "Unknown Drug"),
                    badge: or_placeholder(a.risk_label(), "Unknown Risk"),
                    category: a.risk_category(),
                    expanded,
                    details: expanded.then(|| AssessmentDetails::from_assessment(a)),
                }
            })
            .collect();

        ResultsView {
            empty_message: items.is_empty().then_some("No assessment results available."),
            items,
        }
    }

    /// Pretty JSON of the complete result, for the clipboard.
    pub fn copy_as_json(&self) -> Result<String> {
        Ok(self.result.to_pretty_json()?)
    }

    /// Write the report into `dir` and return its path.
    pub async fn download_as_json(&self, dir: &Path) -> Result<PathBuf> {
        let path = dir.join(REPORT_FILE_NAME);
        tokio::fs::write(&path, self.copy_as_json()?).await?;
        tracing::info!(path = %path.display(), "Wrote pharmacogenomic report");
        Ok(path)
    }
}
