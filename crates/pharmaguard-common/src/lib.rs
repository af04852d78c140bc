//! pharmaguard-common — Shared data model, risk triage, and errors used across all PharmaGuard crates.

pub mod error;
pub mod drugs;
pub mod assessment;
pub mod risk;

// Re-export commonly used types
pub use assessment::{
    AnalysisResult, ClinicalRecommendation, LlmExplanation, PerDrugAssessment,
    PharmacogenomicProfile, RiskAssessment,
};
pub use drugs::DrugCode;
pub use error::{NormalizeError, PharmaGuardError, Result, ValidationError, GENERIC_FAILURE_MESSAGE};
pub use risk::{classify, RiskCategory};
