//! Analysis domain models.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A validated request to analyze a business idea.
///
/// Only constructed through [`AnalysisRequest::new`] or
/// [`super::parse_request`], so every field is a non-empty string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnalysisRequest {
    idea: String,
    industry: String,
    city: String,
}

impl AnalysisRequest {
    pub(crate) fn from_parts(idea: String, industry: String, city: String) -> Self {
        Self {
            idea,
            industry,
            city,
        }
    }

    pub fn idea(&self) -> &str {
        &self.idea
    }

    pub fn industry(&self) -> &str {
        &self.industry
    }

    pub fn city(&self) -> &str {
        &self.city
    }

    /// Positional arguments for the collaborator, in contract order.
    pub fn args(&self) -> [&str; 3] {
        [&self.idea, &self.industry, &self.city]
    }
}

/// Opaque JSON produced by the analysis collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnalysisResult(Value);

impl AnalysisResult {
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    pub fn into_inner(self) -> Value {
        self.0
    }
}
