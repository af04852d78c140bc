//! Response normalisation: one tagged decode of the service payload into an
//! ordered [`AnalysisResult`].
//!
//! The service answers with either a single assessment object or an array of
//! them. Order is kept exactly as received.

use pharmaguard_common::{AnalysisResult, NormalizeError, PerDrugAssessment, PharmaGuardError};
use serde::Deserialize;
use serde_json::{Map, Value};

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawResponse {
    Many(Vec<Value>),
    One(Map<String, Value>),
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null      => "null",
        Value::Bool(_)   => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_)  => "array",
        Value::Object(_) => "object",
    }
}

/// Normalise an already-parsed JSON payload.
pub fn normalize(raw: Value) -> Result<AnalysisResult, NormalizeError> {
    let kind = kind_of(&raw);
    let items = match serde_json::from_value::<RawResponse>(raw) {
        Ok(RawResponse::Many(items)) => items,
        Ok(RawResponse::One(map)) => vec![Value::Object(map)],
        Err(_) => {
            return Err(NormalizeError::UnexpectedFormat(format!(
                "expected an assessment object or array, got {kind}"
            )))
        }
    };

    let first = items.first().ok_or(NormalizeError::EmptyResult)?;
    if !first.get("drug").is_some_and(Value::is_string) {
        return Err(NormalizeError::UnexpectedFormat(
            "first assessment has no drug field".to_string(),
        ));
    }

    let assessments = items
        .into_iter()
        .enumerate()
        .map(|(i, item)| {
            if !item.is_object() {
                return Err(NormalizeError::UnexpectedFormat(format!(
                    "assessment {i} is a {}, expected an object",
                    kind_of(&item)
                )));
            }
            serde_json::from_value::<PerDrugAssessment>(item)
                .map_err(|e| NormalizeError::UnexpectedFormat(format!("assessment {i}: {e}")))
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(AnalysisResult::new(assessments))
}

/// Parse a raw response body and normalise it.
pub fn decode_body(body: &[u8]) -> Result<AnalysisResult, PharmaGuardError> {
    let raw: Value = serde_json::from_slice(body).map_err(PharmaGuardError::Parse)?;
    Ok(normalize(raw)?)
}
