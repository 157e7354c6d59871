use std::sync::LazyLock;

use regex::Regex;
use serde::Deserialize;

use super::AdvisorError;
use crate::models::HealthInsights;

static FENCED_JSON: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)```(?:json)?\s*(.*?)```").unwrap());

/// Locate the JSON object in a model response: the first fenced block if
/// present, otherwise the outermost `{ ... }` span.
fn extract_json(response: &str) -> Result<&str, AdvisorError> {
    if let Some(captures) = FENCED_JSON.captures(response) {
        if let Some(body) = captures.get(1) {
            return Ok(body.as_str().trim());
        }
    }

    let start = response
        .find('{')
        .ok_or_else(|| AdvisorError::MalformedResponse("No JSON object found".into()))?;
    let end = response
        .rfind('}')
        .filter(|end| *end > start)
        .ok_or_else(|| AdvisorError::MalformedResponse("Unclosed JSON object".into()))?;
    Ok(&response[start..=end])
}

/// Parse the insight response into its three sections.
pub fn parse_insights_response(response: &str) -> Result<HealthInsights, AdvisorError> {
    #[derive(Deserialize)]
    struct RawInsights {
        #[serde(alias = "potentialHealthIssues", alias = "potential_health_issues")]
        potential_issues: String,
        #[serde(alias = "lifestyleImprovements", alias = "lifestyle_improvements")]
        lifestyle_advice: String,
        #[serde(alias = "whenToConsultSpecialist", alias = "when_to_consult_specialist")]
        specialist_guidance: String,
    }

    let json_str = extract_json(response)?;
    let raw: RawInsights =
        serde_json::from_str(json_str).map_err(|e| AdvisorError::JsonParsing(e.to_string()))?;

    Ok(HealthInsights {
        potential_issues: raw.potential_issues.trim().to_string(),
        lifestyle_advice: raw.lifestyle_advice.trim().to_string(),
        specialist_guidance: raw.specialist_guidance.trim().to_string(),
    })
}

/// Free-text replies only need to be non-empty.
pub fn parse_text_response(response: &str) -> Result<String, AdvisorError> {
    let trimmed = response.trim();
    if trimmed.is_empty() {
        return Err(AdvisorError::MalformedResponse("Empty response".into()));
    }
    Ok(trimmed.to_string())
}
