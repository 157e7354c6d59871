use crate::catalog;
use crate::models::{BloodTestKey, LabObservation, LabStatus, ReferenceRange};

/// Classify a value against its reference range.
///
/// Both bounds are inclusive: a value sitting exactly on `low` or `high`
/// is Normal. `Borderline` is never produced.
pub fn classify_value(value: f64, range: &ReferenceRange) -> LabStatus {
    if value < range.low || value > range.high {
        LabStatus::Abnormal
    } else {
        LabStatus::Normal
    }
}

/// Build a classified observation from a catalog key and a numeric value.
pub fn observe(test: BloodTestKey, value: f64) -> LabObservation {
    let reference = catalog::blood_test(test);
    LabObservation {
        test,
        value,
        unit: reference.unit.to_string(),
        range: reference.range,
        status: classify_value(value, &reference.range),
    }
}
