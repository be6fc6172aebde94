use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One completed document analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Assessment {
    pub id: i32,
    pub product: String,
    pub filename: String,
    pub summary: String,
    pub controls: Vec<String>,
    pub risks: Vec<String>,
    pub created_at: DateTime<Utc>,
}

/// Fields for a new assessment; `id` and `created_at` are assigned by the store.
#[derive(Debug, Clone, PartialEq)]
pub struct NewAssessment {
    pub product: String,
    pub filename: String,
    pub summary: String,
    pub controls: Vec<String>,
    pub risks: Vec<String>,
}

/// Partial edit. `None` (omitted or JSON `null`) keeps the stored value.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct AssessmentPatch {
    pub product: Option<String>,
    pub summary: Option<String>,
    pub controls: Option<Vec<String>>,
    pub risks: Option<Vec<String>>,
}

#[cfg(test)]
impl AssessmentPatch {
    /// Merges the provided fields over `assessment`; the in-memory store's
    /// counterpart of the `COALESCE` update.
    pub fn apply_to(self, assessment: &mut Assessment) {
        if let Some(product) = self.product {
            assessment.product = product;
        }
        if let Some(summary) = self.summary {
            assessment.summary = summary;
        }
        if let Some(controls) = self.controls {
            assessment.controls = controls;
        }
        if let Some(risks) = self.risks {
            assessment.risks = risks;
        }
    }
}
