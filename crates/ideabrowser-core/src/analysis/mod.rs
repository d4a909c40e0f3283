//! Analysis requests and results.
//!
//! A field counts as present only when it is a non-empty JSON string.
//! Absent keys, `null`, `""`, numbers, booleans, arrays and objects are all
//! reported as missing. Whitespace is kept as-is.

pub mod model;

use serde_json::Value;

use crate::error::{IdeaError, IdeaResult};
use model::AnalysisRequest;

/// Field names in the order they are passed to the collaborator.
pub const REQUIRED_FIELDS: [&str; 3] = ["idea", "industry", "city"];

impl AnalysisRequest {
    /// Build a request from raw field values.
    pub fn new(
        idea: impl Into<String>,
        industry: impl Into<String>,
        city: impl Into<String>,
    ) -> IdeaResult<Self> {
        let (idea, industry, city) = (idea.into(), industry.into(), city.into());

        let missing: Vec<&'static str> = REQUIRED_FIELDS
            .iter()
            .zip([&idea, &industry, &city])
            .filter(|(_, value)| value.is_empty())
            .map(|(name, _)| *name)
            .collect();

        if !missing.is_empty() {
            return Err(IdeaError::validation(missing));
        }

        Ok(Self::from_parts(idea, industry, city))
    }
}

/// Validate a decoded request body.
///
/// Anything other than a JSON object is treated as an object with no fields.
pub fn parse_request(body: &Value) -> IdeaResult<AnalysisRequest> {
    let values = REQUIRED_FIELDS.map(|name| present_field(body, name));
    let missing: Vec<&'static str> = REQUIRED_FIELDS
        .iter()
        .zip(values.iter())
        .filter(|(_, value)| value.is_none())
        .map(|(name, _)| *name)
        .collect();

    match values {
        [Some(idea), Some(industry), Some(city)] => AnalysisRequest::new(idea, industry, city),
        _ => Err(IdeaError::validation(missing)),
    }
}

fn present_field<'a>(body: &'a Value, name: &str) -> Option<&'a str> {
    body.get(name)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
}
