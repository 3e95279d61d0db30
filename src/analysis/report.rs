//! ESG report schema and decoding of raw analyzer output

use crate::analysis::analyzer::{AnalysisFailure, AnalysisRequest};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// Highest score a pillar can receive
pub const MAX_SCORE: u8 = 100;

/// Assessment of one ESG pillar
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryScore {
    /// Disclosure confidence, 0 to 100
    pub score: u8,
    pub assessment: String,
    pub gaps: Option<String>,
}

/// Structured findings for one analyzed page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub company_name: String,
    pub url: String,
    pub summary: String,
    pub environmental: CategoryScore,
    pub social: CategoryScore,
    pub governance: CategoryScore,
    pub timestamp: String,
}

impl AnalysisReport {
    /// Mean of the three pillar scores
    pub fn average_score(&self) -> f64 {
        let total = u32::from(self.environmental.score)
            + u32::from(self.social.score)
            + u32::from(self.governance.score);
        f64::from(total) / 3.0
    }

    /// Pillars in display order, with their titles
    pub fn pillars(&self) -> [(&'static str, &CategoryScore); 3] {
        [
            ("Environmental", &self.environmental),
            ("Social", &self.social),
            ("Governance", &self.governance),
        ]
    }
}

/// Ways a decoded document can fail to be a report
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SchemaError {
    #[error("expected a JSON object")]
    NotAnObject,

    #[error("missing required field `{0}`")]
    MissingField(String),

    #[error("field `{field}` must be {expected}")]
    WrongType {
        field: String,
        expected: &'static str,
    },

    #[error("score for `{field}` out of range: {value}")]
    ScoreOutOfRange { field: String, value: String },
}

/// Decodes and validates raw analyzer output into a report
///
/// An optional Markdown code fence around the JSON is tolerated. `url` and
/// `timestamp` fall back to the request's values when the analyzer leaves
/// them out.
pub fn decode_report(
    raw: &str,
    request: &AnalysisRequest<'_>,
) -> Result<AnalysisReport, AnalysisFailure> {
    let value: Value = serde_json::from_str(strip_code_fence(raw))?;
    Ok(validate_report(&value, request)?)
}

/// Removes a surrounding ``` fence (with optional language tag)
pub fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };

    let body = match rest.find('\n') {
        Some(newline) => &rest[newline + 1..],
        None => rest,
    };
    let body = body.trim_end();
    body.strip_suffix("```").unwrap_or(body).trim()
}

fn validate_report(
    value: &Value,
    request: &AnalysisRequest<'_>,
) -> Result<AnalysisReport, SchemaError> {
    let object = value.as_object().ok_or(SchemaError::NotAnObject)?;

    Ok(AnalysisReport {
        company_name: required_string(object, "company_name", "company_name")?,
        url: optional_string(object, "url", "url")?.unwrap_or_else(|| request.url.to_string()),
        summary: required_string(object, "summary", "summary")?,
        environmental: category(object, "environmental")?,
        social: category(object, "social")?,
        governance: category(object, "governance")?,
        timestamp: optional_string(object, "timestamp", "timestamp")?
            .unwrap_or_else(|| request.timestamp()),
    })
}

fn category(object: &Map<String, Value>, key: &str) -> Result<CategoryScore, SchemaError> {
    let inner = match object.get(key) {
        None | Some(Value::Null) => return Err(SchemaError::MissingField(key.to_string())),
        Some(value) => value.as_object().ok_or_else(|| SchemaError::WrongType {
            field: key.to_string(),
            expected: "an object",
        })?,
    };

    Ok(CategoryScore {
        score: score(inner, &format!("{}.score", key))?,
        assessment: required_string(inner, "assessment", &format!("{}.assessment", key))?,
        gaps: optional_string(inner, "gaps", &format!("{}.gaps", key))?,
    })
}

fn score(object: &Map<String, Value>, path: &str) -> Result<u8, SchemaError> {
    let value = match object.get("score") {
        None | Some(Value::Null) => return Err(SchemaError::MissingField(path.to_string())),
        Some(value) => value,
    };

    let out_of_range = || SchemaError::ScoreOutOfRange {
        field: path.to_string(),
        value: value.to_string(),
    };

    let number = match value {
        Value::Number(number) => number,
        _ => {
            return Err(SchemaError::WrongType {
                field: path.to_string(),
                expected: "an integer",
            })
        }
    };

    if let Some(int) = number.as_i64() {
        return u8::try_from(int)
            .ok()
            .filter(|score| *score <= MAX_SCORE)
            .ok_or_else(out_of_range);
    }

    // Whole-valued floats such as 85.0 are accepted as integers
    match number.as_f64() {
        Some(float) if float.fract() == 0.0 => {
            if (0.0..=f64::from(MAX_SCORE)).contains(&float) {
                Ok(float as u8)
            } else {
                Err(out_of_range())
            }
        }
        Some(_) => Err(SchemaError::WrongType {
            field: path.to_string(),
            expected: "an integer",
        }),
        None => Err(out_of_range()),
    }
}

fn required_string(
    object: &Map<String, Value>,
    key: &str,
    path: &str,
) -> Result<String, SchemaError> {
    optional_string(object, key, path)?.ok_or_else(|| SchemaError::MissingField(path.to_string()))
}

/// Absent, null and blank strings all read as `None`
fn optional_string(
    object: &Map<String, Value>,
    key: &str,
    path: &str,
) -> Result<Option<String>, SchemaError> {
    match object.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) if s.trim().is_empty() => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.trim().to_string())),
        Some(_) => Err(SchemaError::WrongType {
            field: path.to_string(),
            expected: "a string",
        }),
    }
}
