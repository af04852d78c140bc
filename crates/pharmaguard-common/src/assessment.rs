//! Per-drug clinical assessment as returned by the analysis service.
//!
//! Every field except `drug` is optional on the wire. Keys the service adds
//! beyond the known ones are kept in `extra` so an exported report carries
//! the complete payload.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::risk::{classify, RiskCategory};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PerDrugAssessment {
    /// Empty when the service sent no drug or `null`.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub drug: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub risk_assessment: Option<RiskAssessment>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pharmacogenomic_profile: Option<PharmacogenomicProfile>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clinical_recommendation: Option<ClinicalRecommendation>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub llm_generated_explanation: Option<LlmExplanation>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RiskAssessment {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub risk_label: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub severity: Option<String>,

    /// Expected in [0, 1].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence_score: Option<f64>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PharmacogenomicProfile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary_gene: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phenotype: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diplotype: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClinicalRecommendation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guideline_source: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recommendation_summary: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dose_adjustment: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub monitoring_advice: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LlmExplanation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl PerDrugAssessment {
    pub fn risk_label(&self) -> Option<&str> {
        self.risk_assessment
            .as_ref()
            .and_then(|r| r.risk_label.as_deref())
    }

    /// Presentational triage category derived from the risk label.
    pub fn risk_category(&self) -> RiskCategory {
        classify(self.risk_label())
    }
}

/// Ordered assessments of one analysis run, in server response order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnalysisResult(Vec<PerDrugAssessment>);

impl AnalysisResult {
    pub fn new(assessments: Vec<PerDrugAssessment>) -> Self {
        Self(assessments)
    }

    pub fn assessments(&self) -> &[PerDrugAssessment] {
        &self.0
    }

    pub fn get(&self, index: usize) -> Option<&PerDrugAssessment> {
        self.0.get(index)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PerDrugAssessment> {
        self.0.iter()
    }

    /// Drug identifiers in result order.
    pub fn drugs(&self) -> Vec<&str> {
        self.0.iter().map(|a| a.drug.as_str()).collect()
    }

    /// Pretty-printed JSON of the complete result.
    pub fn to_pretty_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

impl<'a> IntoIterator for &'a AnalysisResult {
    type Item = &'a PerDrugAssessment;
    type IntoIter = std::slice::Iter<'a, PerDrugAssessment>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
