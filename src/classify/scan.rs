//! CT scan triage heuristic.
//!
//! A layered randomized classifier: a base draw picks the class, blood panel
//! evidence can downgrade a malignant call to "needs review", and a final
//! ambiguity overlay can turn any non-clear result into "needs review".
//! Every threshold is a strict `>` comparison and every confidence band
//! consumes exactly one fresh draw.

use serde::{Deserialize, Serialize};

use super::random::RandomSource;
use crate::models::{LabPanel, ScanClassification};

const NO_TUMOR_BAND: (f64, f64) = (90.0, 99.0);
const BENIGN_BAND: (f64, f64) = (80.0, 95.0);
const MALIGNANT_BAND: (f64, f64) = (75.0, 98.0);

/// Ceiling applied when a malignant call meets an all-normal panel.
const NORMAL_PANEL_CEILING: f64 = 75.0;
const FEW_ABNORMAL_BAND: (f64, f64) = (65.0, 80.0);
const NO_PANEL_BAND: (f64, f64) = (60.0, 80.0);
const AMBIGUITY_BAND: (f64, f64) = (50.0, 70.0);

/// Panels with fewer abnormal observations than this count as "few".
const FEW_ABNORMAL_LIMIT: usize = 3;

const NO_TUMOR_THRESHOLD: f64 = 0.5;
const BENIGN_THRESHOLD: f64 = 0.2;
const FEW_ABNORMAL_COIN: f64 = 0.5;
const AMBIGUITY_THRESHOLD: f64 = 0.8;

/// What the blood panel contributes to a scan classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "panel", rename_all = "snake_case")]
pub enum PanelEvidence {
    Absent,
    Present { abnormal: usize },
}

impl PanelEvidence {
    pub fn from_panel(panel: Option<&LabPanel>) -> Self {
        match panel {
            Some(p) => Self::Present {
                abnormal: p.abnormal_count(),
            },
            None => Self::Absent,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScanAssessment {
    pub classification: ScanClassification,
    pub confidence: f64,
}

/// Run the heuristic once.
pub fn classify_scan(evidence: PanelEvidence, random: &mut dyn RandomSource) -> ScanAssessment {
    let r = random.next_unit();
    let (mut classification, mut confidence) = if r > NO_TUMOR_THRESHOLD {
        (ScanClassification::NoTumor, draw(random, NO_TUMOR_BAND))
    } else if r > BENIGN_THRESHOLD {
        (ScanClassification::PossibleBenign, draw(random, BENIGN_BAND))
    } else {
        (
            ScanClassification::PossibleMalignant,
            draw(random, MALIGNANT_BAND),
        )
    };

    if classification == ScanClassification::PossibleMalignant {
        match evidence {
            PanelEvidence::Present { abnormal: 0 } => {
                classification = ScanClassification::Uncertain;
                confidence = confidence.min(NORMAL_PANEL_CEILING);
            }
            PanelEvidence::Present { abnormal } if abnormal < FEW_ABNORMAL_LIMIT => {
                if random.next_unit() > FEW_ABNORMAL_COIN {
                    classification = ScanClassification::Uncertain;
                    confidence = draw(random, FEW_ABNORMAL_BAND);
                }
            }
            PanelEvidence::Present { .. } => {}
            PanelEvidence::Absent => {
                classification = ScanClassification::Uncertain;
                confidence = draw(random, NO_PANEL_BAND);
            }
        }
    }

    if classification != ScanClassification::NoTumor && random.next_unit() > AMBIGUITY_THRESHOLD {
        classification = ScanClassification::Uncertain;
        confidence = draw(random, AMBIGUITY_BAND);
    }

    tracing::debug!(
        ?evidence,
        classification = %classification,
        confidence,
        "scan heuristic resolved"
    );

    ScanAssessment {
        classification,
        confidence: confidence.clamp(0.0, 100.0),
    }
}

fn draw(random: &mut dyn RandomSource, (low, high): (f64, f64)) -> f64 {
    random.uniform(low, high)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::random::{EntropySource, ScriptedSource};

    fn run(evidence: PanelEvidence, draws: &[f64]) -> (ScanAssessment, usize) {
        let mut source = ScriptedSource::new(draws);
        let result = classify_scan(evidence, &mut source);
        (result, source.remaining())
    }

    fn assert_close(actual: f64, expected: f64) {
        assert!((actual - expected).abs() < 1e-9, "{actual} != {expected}");
    }

    #[test]
    fn high_draw_is_no_tumor_without_overlay() {
        for evidence in [PanelEvidence::Absent, PanelEvidence::Present { abnormal: 5 }] {
            let (result, left) = run(evidence, &[0.9, 0.5]);
            assert_eq!(result.classification, ScanClassification::NoTumor);
            assert_close(result.confidence, 94.5);
            // No refinement and no overlay draw.
            assert_eq!(left, 0);
        }
    }

    #[test]
    fn tie_at_one_half_is_benign() {
        let (result, left) = run(PanelEvidence::Absent, &[0.5, 0.0, 0.1]);
        assert_eq!(result.classification, ScanClassification::PossibleBenign);
        assert_close(result.confidence, 80.0);
        assert_eq!(left, 0);
    }

    #[test]
    fn tie_at_one_fifth_is_malignant() {
        let (result, _) = run(PanelEvidence::Present { abnormal: 4 }, &[0.2, 0.0, 0.1]);
        assert_eq!(result.classification, ScanClassification::PossibleMalignant);
        assert_close(result.confidence, 75.0);
    }

    #[test]
    fn benign_can_be_overlaid_with_ambiguity() {
        let (result, left) = run(PanelEvidence::Absent, &[0.3, 0.5, 0.85, 0.5]);
        assert_eq!(result.classification, ScanClassification::Uncertain);
        assert_close(result.confidence, 60.0);
        assert_eq!(left, 0);
    }

    #[test]
    fn malignant_without_panel_needs_review() {
        // r = 0.1, base confidence, refinement confidence, overlay miss.
        let (result, left) = run(PanelEvidence::Absent, &[0.1, 0.9, 0.25, 0.3]);
        assert_eq!(result.classification, ScanClassification::Uncertain);
        assert_close(result.confidence, 65.0);
        assert!((60.0..=80.0).contains(&result.confidence));
        assert_eq!(left, 0);
    }

    #[test]
    fn malignant_without_panel_then_overlay_rebands() {
        let (result, left) = run(PanelEvidence::Absent, &[0.1, 0.9, 0.25, 0.95, 0.5]);
        assert_eq!(result.classification, ScanClassification::Uncertain);
        assert_close(result.confidence, 60.0);
        assert_eq!(left, 0);
    }

    #[test]
    fn malignant_with_normal_panel_is_capped() {
        // Base confidence 0.99 → 97.77, capped to 75.
        let (result, left) = run(PanelEvidence::Present { abnormal: 0 }, &[0.1, 0.99, 0.1]);
        assert_eq!(result.classification, ScanClassification::Uncertain);
        assert_close(result.confidence, 75.0);
        assert_eq!(left, 0);
    }

    #[test]
    fn cap_pins_confidence_at_ceiling() {
        // The malignant band starts at the ceiling, so the cap always lands on it.
        let (result, _) = run(PanelEvidence::Present { abnormal: 0 }, &[0.1, 0.0, 0.1]);
        assert_eq!(result.classification, ScanClassification::Uncertain);
        assert_close(result.confidence, 75.0);

        let (low, _) = run(PanelEvidence::Present { abnormal: 0 }, &[0.0, 0.0, 0.8]);
        // 0.8 is not strictly greater than the overlay threshold.
        assert_eq!(low.classification, ScanClassification::Uncertain);
        assert_close(low.confidence, 75.0);
    }

    #[test]
    fn few_abnormal_values_flip_on_coin() {
        let (flipped, left) = run(
            PanelEvidence::Present { abnormal: 2 },
            &[0.1, 0.5, 0.6, 0.0, 0.1],
        );
        assert_eq!(flipped.classification, ScanClassification::Uncertain);
        assert_close(flipped.confidence, 65.0);
        assert_eq!(left, 0);

        let (kept, left) = run(
            PanelEvidence::Present { abnormal: 1 },
            &[0.1, 0.5, 0.5, 0.1],
        );
        assert_eq!(kept.classification, ScanClassification::PossibleMalignant);
        assert_close(kept.confidence, 86.5);
        assert_eq!(left, 0);
    }

    #[test]
    fn many_abnormal_values_never_take_the_few_branch() {
        for abnormal in 3..=16 {
            // Only r, base confidence and the overlay draw are consumed.
            let (result, left) = run(PanelEvidence::Present { abnormal }, &[0.1, 0.5, 0.1]);
            assert_eq!(result.classification, ScanClassification::PossibleMalignant);
            assert_close(result.confidence, 86.5);
            assert_eq!(left, 0, "abnormal = {abnormal}");
        }
    }

    #[test]
    fn confidence_stays_in_percent_range() {
        let mut source = EntropySource::seeded(42);
        let mut random_evidence = EntropySource::seeded(7);
        for _ in 0..10_000 {
            let pick = (random_evidence.next_unit() * 6.0) as usize;
            let evidence = match pick {
                0 => PanelEvidence::Absent,
                n => PanelEvidence::Present { abnormal: n - 1 },
            };
            let result = classify_scan(evidence, &mut source);
            assert!(
                (0.0..=100.0).contains(&result.confidence),
                "confidence {} out of range",
                result.confidence
            );
        }
    }

    #[test]
    fn evidence_from_panel() {
        assert_eq!(PanelEvidence::from_panel(None), PanelEvidence::Absent);
        let empty = LabPanel::default();
        assert_eq!(
            PanelEvidence::from_panel(Some(&empty)),
            PanelEvidence::Present { abnormal: 0 }
        );
    }
}
