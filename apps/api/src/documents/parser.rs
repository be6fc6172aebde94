//! Turns a raw provider reply into an analysis result.
//!
//! A reply that is not a JSON object becomes the summary verbatim, with no
//! controls or risks. Callers default the absent parts before persisting.

use serde::Serialize;
use serde_json::{Map, Value};
use tracing::warn;

/// Transient result of parsing one reply. Absent keys stay `None`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AnalysisResult {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub controls: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub risks: Option<Vec<String>>,
}

impl AnalysisResult {
    fn plain_summary(raw: &str) -> Self {
        Self {
            summary: Some(raw.to_string()),
            controls: None,
            risks: None,
        }
    }
}

pub fn parse_analysis(raw: &str) -> AnalysisResult {
    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Object(object)) => match from_object(&object) {
            Some(result) => result,
            None => {
                warn!("Provider reply has unexpected key shapes; storing it as plain summary");
                AnalysisResult::plain_summary(raw)
            }
        },
        Ok(_) => {
            warn!("Provider reply is JSON but not an object; storing it as plain summary");
            AnalysisResult::plain_summary(raw)
        }
        Err(e) => {
            warn!("Provider reply is not JSON ({e}); storing it as plain summary");
            AnalysisResult::plain_summary(raw)
        }
    }
}

/// `None` when one of the known keys holds a value that cannot be a
/// summary or a statement list.
fn from_object(object: &Map<String, Value>) -> Option<AnalysisResult> {
    let summary = match object.get("summary") {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s.clone()),
        Some(other @ (Value::Object(_) | Value::Array(_))) => Some(other.to_string()),
        Some(_) => return None,
    };
    Some(AnalysisResult {
        summary,
        controls: statements(object.get("controls"))?,
        risks: statements(object.get("risks"))?,
    })
}

/// Outer `None` means unusable shape; inner `None` means absent.
fn statements(value: Option<&Value>) -> Option<Option<Vec<String>>> {
    match value {
        None | Some(Value::Null) => Some(None),
        Some(Value::Array(items)) => Some(Some(
            items
                .iter()
                .filter(|item| !item.is_null())
                .map(|item| match item {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                })
                .collect(),
        )),
        Some(_) => None,
    }
}
