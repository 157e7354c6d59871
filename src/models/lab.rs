use serde::{Deserialize, Serialize};

use super::enums::{BloodTestKey, LabStatus};

/// Inclusive reference interval for a lab value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReferenceRange {
    pub low: f64,
    pub high: f64,
}

impl ReferenceRange {
    pub const fn new(low: f64, high: f64) -> Self {
        Self { low, high }
    }
}

impl std::fmt::Display for ReferenceRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} - {}", self.low, self.high)
    }
}

/// One classified value from a submitted panel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabObservation {
    pub test: BloodTestKey,
    pub value: f64,
    pub unit: String,
    pub range: ReferenceRange,
    pub status: LabStatus,
}

impl LabObservation {
    pub fn is_abnormal(&self) -> bool {
        self.status == LabStatus::Abnormal
    }
}

/// The observations of one submitted form, in catalog order.
///
/// An empty panel is still a panel: it counts as present with zero
/// abnormal observations.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LabPanel {
    observations: Vec<LabObservation>,
}

impl LabPanel {
    pub fn new(observations: Vec<LabObservation>) -> Self {
        Self { observations }
    }

    pub fn observations(&self) -> &[LabObservation] {
        &self.observations
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    pub fn get(&self, test: BloodTestKey) -> Option<&LabObservation> {
        self.observations.iter().find(|o| o.test == test)
    }

    pub fn abnormal(&self) -> impl Iterator<Item = &LabObservation> {
        self.observations.iter().filter(|o| o.is_abnormal())
    }

    pub fn abnormal_count(&self) -> usize {
        self.abnormal().count()
    }

    pub fn abnormal_keys(&self) -> Vec<BloodTestKey> {
        self.abnormal().map(|o| o.test).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn obs(test: BloodTestKey, value: f64, status: LabStatus) -> LabObservation {
        LabObservation {
            test,
            value,
            unit: "U/L".into(),
            range: ReferenceRange::new(0.0, 10.0),
            status,
        }
    }

    #[test]
    fn range_displays_like_the_form() {
        assert_eq!(ReferenceRange::new(7.0, 56.0).to_string(), "7 - 56");
        assert_eq!(ReferenceRange::new(0.1, 1.2).to_string(), "0.1 - 1.2");
    }

    #[test]
    fn abnormal_helpers_filter_by_status() {
        let panel = LabPanel::new(vec![
            obs(BloodTestKey::Afp, 5.0, LabStatus::Normal),
            obs(BloodTestKey::Alt, 200.0, LabStatus::Abnormal),
            obs(BloodTestKey::Ggt, 0.0, LabStatus::Borderline),
        ]);
        assert_eq!(panel.abnormal_count(), 1);
        assert_eq!(panel.abnormal_keys(), vec![BloodTestKey::Alt]);
        assert!(panel.get(BloodTestKey::Afp).is_some());
        assert!(panel.get(BloodTestKey::Wbc).is_none());
    }

    #[test]
    fn panel_serializes_as_plain_list() {
        let panel = LabPanel::new(vec![obs(BloodTestKey::Afp, 5.0, LabStatus::Normal)]);
        let json = serde_json::to_value(&panel).unwrap();
        assert!(json.is_array());
        assert_eq!(json[0]["test"], "AFP");
        assert_eq!(json[0]["status"], "Normal");
    }
}
