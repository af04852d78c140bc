//! Risk-label triage used to colour assessment badges.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskCategory {
    Safe,
    Adjust,
    Danger,
    Unknown,
}

impl RiskCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskCategory::Safe    => "safe",
            RiskCategory::Adjust  => "adjust",
            RiskCategory::Danger  => "danger",
            RiskCategory::Unknown => "unknown",
        }
    }
}

const SAFE_KEYWORDS: &[&str] = &["safe", "normal"];
const ADJUST_KEYWORDS: &[&str] = &["adjust", "moderate"];
const DANGER_KEYWORDS: &[&str] = &["toxic", "ineffective", "high", "critical"];

/// Map a free-text risk label to a category.
///
/// Keyword groups are checked in order Safe, Adjust, Danger; a label that
/// matches several groups takes the first one. "Normal-high" is Safe.
pub fn classify(label: Option<&str>) -> RiskCategory {
    let l = match label {
        Some(l) if !l.is_empty() => l.to_lowercase(),
        _ => return RiskCategory::Unknown,
    };
    let has_any = |words: &[&str]| words.iter().any(|w| l.contains(w));

    if has_any(SAFE_KEYWORDS)        { RiskCategory::Safe }
    else if has_any(ADJUST_KEYWORDS) { RiskCategory::Adjust }
    else if has_any(DANGER_KEYWORDS) { RiskCategory::Danger }
    else                             { RiskCategory::Unknown }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_and_missing_are_unknown() {
        assert_eq!(classify(None), RiskCategory::Unknown);
        assert_eq!(classify(Some("")), RiskCategory::Unknown);
    }

    #[test]
    fn test_known_labels() {
        assert_eq!(classify(Some("Safe")), RiskCategory::Safe);
        assert_eq!(classify(Some("Normal Metabolizer")), RiskCategory::Safe);
        assert_eq!(classify(Some("Adjust Dosage")), RiskCategory::Adjust);
        assert_eq!(classify(Some("MODERATE")), RiskCategory::Adjust);
        assert_eq!(classify(Some("Toxic")), RiskCategory::Danger);
        assert_eq!(classify(Some("Ineffective")), RiskCategory::Danger);
        assert_eq!(classify(Some("High risk")), RiskCategory::Danger);
        assert_eq!(classify(Some("critical")), RiskCategory::Danger);
        assert_eq!(classify(Some("Indeterminate")), RiskCategory::Unknown);
    }

    #[test]
    fn test_earlier_group_wins() {
        assert_eq!(classify(Some("Safe but high exposure")), RiskCategory::Safe);
        assert_eq!(classify(Some("Adjust: toxic at standard dose")), RiskCategory::Adjust);
        assert_eq!(classify(Some("Normal dose, moderate monitoring")), RiskCategory::Safe);
        assert_eq!(classify(Some("Moderate-high")), RiskCategory::Adjust);
    }

    #[test]
    fn test_substring_matching() {
        // "unsafe" contains "safe"; the rule is substring based.
        assert_eq!(classify(Some("Unsafe")), RiskCategory::Safe);
        assert_eq!(classify(Some("Highly variable")), RiskCategory::Danger);
    }
}
