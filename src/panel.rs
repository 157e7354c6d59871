//! Blood panel form → classified `LabPanel`.
//!
//! The form arrives as raw text per field. Fields that are empty, not
//! numeric, or not finite are dropped; they are never defaulted to zero.

use std::collections::BTreeMap;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::classify::observe;
use crate::models::{BloodTestKey, LabPanel};

/// Raw panel form: field name → entered text.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PanelForm {
    fields: BTreeMap<String, String>,
}

impl PanelForm {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, field: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(field, value);
        self
    }

    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<String>) {
        self.fields.insert(field.into(), value.into());
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields.get(field).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for PanelForm {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut form = Self::new();
        for (k, v) in iter {
            form.insert(k, v);
        }
        form
    }
}

/// Coerce one field. `None` means the field is dropped from the panel.
pub fn coerce_value(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Classify every numeric field of the form, in catalog order.
pub fn build_panel(form: &PanelForm) -> LabPanel {
    for field in form.fields.keys() {
        if BloodTestKey::from_str(field).is_err() {
            tracing::warn!(field = %field, "ignoring unknown panel field");
        }
    }

    let observations = BloodTestKey::ALL
        .iter()
        .filter_map(|&key| {
            let raw = form.get(key.as_str())?;
            match coerce_value(raw) {
                Some(value) => Some(observe(key, value)),
                None => {
                    tracing::debug!(test = %key, "dropping non-numeric panel field");
                    None
                }
            }
        })
        .collect();

    LabPanel::new(observations)
}
