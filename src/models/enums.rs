use serde::{Deserialize, Serialize};

use super::ModelError;

/// Macro to generate enum with as_str + std::str::FromStr pattern
macro_rules! str_enum {
    ($name:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(#[serde(rename = $s)] $variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $s),+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = ModelError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($s => Ok(Self::$variant)),+,
                    _ => Err(ModelError::InvalidEnum {
                        field: stringify!($name).into(),
                        value: s.into(),
                    }),
                }
            }
        }
    };
}

str_enum!(BloodTestKey {
    Afp => "AFP",
    Alt => "ALT",
    Ast => "AST",
    BilirubinTotal => "BilirubinTotal",
    BilirubinDirect => "BilirubinDirect",
    BilirubinIndirect => "BilirubinIndirect",
    Alp => "ALP",
    Ggt => "GGT",
    TotalProtein => "TotalProtein",
    Albumin => "Albumin",
    Globulin => "Globulin",
    AgRatio => "AGRatio",
    Wbc => "WBC",
    Rbc => "RBC",
    Hemoglobin => "Hemoglobin",
    Hematocrit => "Hematocrit",
});

impl BloodTestKey {
    /// Every panel key, in form order.
    pub const ALL: [BloodTestKey; 16] = [
        Self::Afp,
        Self::Alt,
        Self::Ast,
        Self::BilirubinTotal,
        Self::BilirubinDirect,
        Self::BilirubinIndirect,
        Self::Alp,
        Self::Ggt,
        Self::TotalProtein,
        Self::Albumin,
        Self::Globulin,
        Self::AgRatio,
        Self::Wbc,
        Self::Rbc,
        Self::Hemoglobin,
        Self::Hematocrit,
    ];
}

str_enum!(LabStatus {
    Normal => "Normal",
    // Reserved for future range bands; the range classifier never assigns it.
    Borderline => "Borderline",
    Abnormal => "Abnormal",
});

str_enum!(ScanClassification {
    NoTumor => "No tumor detected",
    PossibleBenign => "Possible benign tumor",
    PossibleMalignant => "Possible malignant tumor",
    Uncertain => "Uncertain / Needs Review",
});

str_enum!(AnalysisState {
    Idle => "idle",
    Loading => "loading",
    Success => "success",
    Error => "error",
});

str_enum!(AnalysisKind {
    Scan => "scan",
    Panel => "panel",
    Insights => "insights",
});

str_enum!(ChatSender {
    User => "user",
    Bot => "bot",
});

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn blood_test_keys_use_form_identifiers() {
        assert_eq!(BloodTestKey::Afp.as_str(), "AFP");
        assert_eq!(BloodTestKey::AgRatio.as_str(), "AGRatio");
        assert_eq!(
            BloodTestKey::from_str("BilirubinIndirect").unwrap(),
            BloodTestKey::BilirubinIndirect
        );
    }

    #[test]
    fn all_keys_are_distinct_and_parse_back() {
        for key in BloodTestKey::ALL {
            assert_eq!(BloodTestKey::from_str(key.as_str()).unwrap(), key);
        }
        let mut names: Vec<&str> = BloodTestKey::ALL.iter().map(|k| k.as_str()).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), 16);
    }

    #[test]
    fn unknown_key_is_rejected() {
        let err = BloodTestKey::from_str("LDL").unwrap_err();
        assert!(err.to_string().contains("LDL"));
    }

    #[test]
    fn scan_classification_serializes_as_label() {
        let json = serde_json::to_string(&ScanClassification::Uncertain).unwrap();
        assert_eq!(json, "\"Uncertain / Needs Review\"");
        let back: ScanClassification = serde_json::from_str("\"No tumor detected\"").unwrap();
        assert_eq!(back, ScanClassification::NoTumor);
    }

    #[test]
    fn analysis_state_is_lowercase_on_the_wire() {
        assert_eq!(
            serde_json::to_string(&AnalysisState::Loading).unwrap(),
            "\"loading\""
        );
        assert_eq!(AnalysisKind::Insights.to_string(), "insights");
    }
}
