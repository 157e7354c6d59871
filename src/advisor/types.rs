use serde::{Deserialize, Serialize};

use crate::catalog;
use crate::models::{LabPanel, ScanResult};

/// Input for the combined insight call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsightRequest {
    /// e.g. "CT scan shows: Possible benign tumor with 87.46% confidence."
    pub scan_summary: String,
    /// e.g. "Abnormal values found: ALT, GGT."
    pub abnormal_tests: String,
}

impl InsightRequest {
    pub fn from_results(scan: &ScanResult, panel: &LabPanel) -> Self {
        let keys: Vec<&str> = panel.abnormal().map(|o| o.test.as_str()).collect();
        let list = if keys.is_empty() {
            "None".to_string()
        } else {
            keys.join(", ")
        };
        Self {
            scan_summary: scan.summary(),
            abnormal_tests: format!("Abnormal values found: {list}."),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatRequest {
    pub panel: Option<LabPanel>,
    pub question: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatReply {
    pub reply: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExplanationRequest {
    /// "KEY (Display name)" per abnormal observation.
    pub abnormal_values: Vec<String>,
}

impl ExplanationRequest {
    pub fn from_panel(panel: &LabPanel) -> Self {
        Self {
            abnormal_values: panel.abnormal().map(|o| catalog::describe(o.test)).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Explanation {
    pub explanation: String,
}
