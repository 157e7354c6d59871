//! Blood test reference catalog: display name, unit and reference range
//! for each of the sixteen panel keys.

use crate::models::{BloodTestKey, ReferenceRange};

/// Reference data for one panel key.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BloodTest {
    pub key: BloodTestKey,
    pub name: &'static str,
    /// Empty for unitless ratios.
    pub unit: &'static str,
    pub range: ReferenceRange,
}

const fn test(
    key: BloodTestKey,
    name: &'static str,
    unit: &'static str,
    low: f64,
    high: f64,
) -> BloodTest {
    BloodTest {
        key,
        name,
        unit,
        range: ReferenceRange::new(low, high),
    }
}

/// The full catalog, in form order.
pub static BLOOD_TESTS: [BloodTest; 16] = [
    test(BloodTestKey::Afp, "Alpha-fetoprotein", "ng/mL", 0.0, 10.0),
    test(BloodTestKey::Alt, "Alanine Aminotransferase (SGPT)", "U/L", 7.0, 56.0),
    test(BloodTestKey::Ast, "Aspartate Aminotransferase (SGOT)", "U/L", 10.0, 40.0),
    test(BloodTestKey::BilirubinTotal, "Bilirubin – Total", "mg/dL", 0.1, 1.2),
    test(BloodTestKey::BilirubinDirect, "Bilirubin – Direct", "mg/dL", 0.0, 0.3),
    test(BloodTestKey::BilirubinIndirect, "Bilirubin – Indirect", "mg/dL", 0.2, 0.8),
    test(BloodTestKey::Alp, "Alkaline Phosphatase", "IU/L", 44.0, 147.0),
    test(BloodTestKey::Ggt, "Gamma-Glutamyl Transferase", "IU/L", 0.0, 30.0),
    test(BloodTestKey::TotalProtein, "Total Proteins", "g/dL", 6.0, 8.3),
    test(BloodTestKey::Albumin, "Serum Albumin", "g/dL", 3.5, 5.5),
    test(BloodTestKey::Globulin, "Serum Globulin", "g/dL", 2.0, 3.5),
    test(BloodTestKey::AgRatio, "A/G Ratio", "", 1.1, 2.5),
    test(BloodTestKey::Wbc, "White Blood Cell Count", "x10^9/L", 4.5, 11.0),
    test(BloodTestKey::Rbc, "Red Blood Cell Count", "x10^12/L", 4.2, 5.9),
    test(BloodTestKey::Hemoglobin, "Hemoglobin", "g/dL", 13.5, 17.5),
    test(BloodTestKey::Hematocrit, "Hematocrit", "%", 41.0, 53.0),
];

/// Look up the reference data for a key.
pub fn blood_test(key: BloodTestKey) -> &'static BloodTest {
    // BLOOD_TESTS follows the variant declaration order.
    &BLOOD_TESTS[key as usize]
}

/// "AFP (Alpha-fetoprotein)", the form used when asking for explanations.
pub fn describe(key: BloodTestKey) -> String {
    format!("{} ({})", key, blood_test(key).name)
}
