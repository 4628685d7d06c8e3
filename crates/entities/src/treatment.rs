//! Treatment catalog entries.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A bookable treatment with its price and ordered slot labels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TreatmentOption {
    /// Unique identifier.
    #[serde(rename = "_id", default = "Uuid::new_v4")]
    pub id: Uuid,
    /// Treatment name, unique across the catalog.
    pub name: String,
    /// Price in the configured currency.
    #[serde(default)]
    pub price: f64,
    /// Slot labels in schedule order.
    #[serde(default)]
    pub slots: Vec<String>,
}

impl TreatmentOption {
    /// Creates a new treatment option.
    pub fn new(name: impl Into<String>, price: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            price,
            slots: Vec::new(),
        }
    }

    /// Sets the slot labels.
    pub fn with_slots<I, T>(mut self, slots: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.slots = slots.into_iter().map(Into::into).collect();
        self
    }

    /// Returns true if `slot` is one of this treatment's labels.
    pub fn has_slot(&self, slot: &str) -> bool {
        self.slots.iter().any(|s| s == slot)
    }
}

/// Name-only projection of a treatment option.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreatmentName {
    /// Identifier of the treatment option.
    #[serde(rename = "_id")]
    pub id: Uuid,
    /// Treatment name.
    pub name: String,
}

impl From<&TreatmentOption> for TreatmentName {
    fn from(option: &TreatmentOption) -> Self {
        Self {
            id: option.id,
            name: option.name.clone(),
        }
    }
}
