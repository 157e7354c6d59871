use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::enums::ScanClassification;

/// Reference served for the heat-map overlay of every analyzed scan.
pub const HEATMAP_REF: &str = "/heatmap.png";

/// An uploaded scan image. The bytes never enter the engine; only the
/// preview reference handed out to the presentation layer is kept.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanUpload {
    pub file_name: String,
    pub media_type: String,
    pub preview_ref: String,
    pub uploaded_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanResult {
    pub classification: ScanClassification,
    /// Percentage in [0, 100].
    pub confidence: f64,
    pub auxiliary_image_ref: String,
    pub analyzed_at: DateTime<Utc>,
}

impl ScanResult {
    /// One-line summary handed to the insight collaborator.
    pub fn summary(&self) -> String {
        format!(
            "CT scan shows: {} with {:.2}% confidence.",
            self.classification, self.confidence
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_uses_label_and_two_decimals() {
        let result = ScanResult {
            classification: ScanClassification::PossibleBenign,
            confidence: 87.456,
            auxiliary_image_ref: HEATMAP_REF.into(),
            analyzed_at: Utc::now(),
        };
        assert_eq!(
            result.summary(),
            "CT scan shows: Possible benign tumor with 87.46% confidence."
        );
    }
}
