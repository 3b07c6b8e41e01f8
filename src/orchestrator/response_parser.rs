use std::fmt;
use std::str::FromStr;

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::extract::field_model::{ExtractionData, FieldSummary};
use crate::extractor::protocol::FieldFill;
use crate::fill::fill_model::FillValue;

/// Keys under which a JSON reply may wrap its suggestion array, in order.
const WRAPPER_KEYS: &[&str] = &["suggestions", "fields", "data"];

const ID_KEYS: &[&str] = &["id", "fieldId"];
const VALUE_KEYS: &[&str] = &["suggestedValue", "value", "answer"];

/// One externally supplied value for one field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Suggestion {
    pub field_id: String,
    pub suggested_value: FillValue,
}

impl Suggestion {
    pub fn new(field_id: impl Into<String>, value: impl Into<FillValue>) -> Self {
        Self {
            field_id: field_id.into(),
            suggested_value: value.into(),
        }
    }
}

impl From<Suggestion> for FieldFill {
    fn from(s: Suggestion) -> Self {
        FieldFill {
            field_id: s.field_id,
            value: s.suggested_value,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ParseError {
    /// Reply was not JSON, or not the expected shape, and had no usable
    /// embedded array either.
    InvalidJson(String),
    /// An embedded `[...]` was found but did not parse.
    EmbeddedJson(String),
    /// Text mode matches against field labels, so it needs an extraction.
    NoExtraction,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::InvalidJson(msg) => write!(f, "Invalid JSON format: {}", msg),
            ParseError::EmbeddedJson(msg) => write!(f, "Could not parse JSON: {}", msg),
            ParseError::NoExtraction => {
                write!(f, "No form data available. Please extract fields first")
            }
        }
    }
}

impl std::error::Error for ParseError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseFormat {
    #[default]
    Json,
    Text,
}

impl FromStr for ResponseFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(ResponseFormat::Json),
            "text" => Ok(ResponseFormat::Text),
            other => Err(format!("unknown response format '{}' (expected json or text)", other)),
        }
    }
}

pub fn parse_response(
    text: &str,
    format: ResponseFormat,
    extraction: Option<&ExtractionData>,
) -> Result<Vec<Suggestion>, ParseError> {
    match format {
        ResponseFormat::Json => parse_json_response(text),
        ResponseFormat::Text => parse_text_response(text, extraction),
    }
}

// ============================================================================
// JSON mode
// ============================================================================

/// Parse a JSON reply: a bare array, or an object wrapping one. If that
/// fails for any reason, retry on the span from the first `[` to the last
/// `]` so arrays embedded in prose still work.
pub fn parse_json_response(text: &str) -> Result<Vec<Suggestion>, ParseError> {
    let first_error = match serde_json::from_str::<Value>(text.trim()) {
        Ok(value) => match suggestion_array(&value) {
            Some(items) => return Ok(validate_suggestions(items)),
            None => "expected array of field suggestions".to_string(),
        },
        Err(e) => e.to_string(),
    };

    let Some(embedded) = embedded_array(text) else {
        return Err(ParseError::InvalidJson(first_error));
    };
    let value: Value =
        serde_json::from_str(embedded).map_err(|e| ParseError::EmbeddedJson(e.to_string()))?;
    match value.as_array() {
        Some(items) => Ok(validate_suggestions(items)),
        None => Err(ParseError::EmbeddedJson("expected array of suggestions".into())),
    }
}

fn suggestion_array(value: &Value) -> Option<&Vec<Value>> {
    if let Some(items) = value.as_array() {
        return Some(items);
    }
    WRAPPER_KEYS
        .iter()
        .find_map(|key| value.get(*key).and_then(Value::as_array))
}

fn embedded_array(text: &str) -> Option<&str> {
    let start = text.find('[')?;
    let end = text.rfind(']')?;
    (start < end).then(|| &text[start..=end])
}

/// Keep the suggestion-shaped entries and normalize their spelling.
/// Entries without an id or without a usable value are dropped.
pub fn validate_suggestions(items: &[Value]) -> Vec<Suggestion> {
    items.iter().filter_map(normalize_suggestion).collect()
}

fn normalize_suggestion(item: &Value) -> Option<Suggestion> {
    let obj = item.as_object()?;

    let field_id = ID_KEYS
        .iter()
        .find_map(|key| obj.get(*key).and_then(Value::as_str))
        .filter(|id| !id.is_empty())?;

    let value = VALUE_KEYS
        .iter()
        .find_map(|key| obj.get(*key).filter(|v| has_value(v)))?;

    Some(Suggestion::new(field_id, json_to_fill_value(value)))
}

fn has_value(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::String(s) => !s.is_empty(),
        _ => true,
    }
}

fn json_to_fill_value(value: &Value) -> FillValue {
    match value {
        Value::Bool(b) => FillValue::Bool(*b),
        Value::Number(n) => FillValue::Number(n.clone()),
        Value::String(s) => FillValue::Text(s.clone()),
        Value::Null => FillValue::Null,
        other => FillValue::Text(other.to_string()),
    }
}

// ============================================================================
// Text mode
// ============================================================================

/// Parse loose `Label: value` / `Label - value` / `Label = value` lines, or
/// a field id followed by a separator and a value. Fields are tried in
/// extraction order; each takes the first line that yields a value.
pub fn parse_text_response(
    text: &str,
    extraction: Option<&ExtractionData>,
) -> Result<Vec<Suggestion>, ParseError> {
    let extraction = extraction.ok_or(ParseError::NoExtraction)?;
    let lines: Vec<&str> = text.lines().collect();

    Ok(extraction
        .fields
        .iter()
        .filter_map(|field| {
            let patterns = field_patterns(field);
            lines
                .iter()
                .find_map(|line| patterns.iter().find_map(|re| capture_value(re, line)))
                .map(|value| Suggestion::new(field.id.clone(), value))
        })
        .collect())
}

/// Label pattern first, then id pattern. Matching is case-insensitive.
fn field_patterns(field: &FieldSummary) -> Vec<Regex> {
    [field.label.as_str(), field.id.as_str()]
        .iter()
        .filter(|key| !key.trim().is_empty())
        .filter_map(|key| {
            Regex::new(&format!(r"(?i){}\s*[:=\-]\s*(.*)$", regex::escape(key.trim()))).ok()
        })
        .collect()
}

fn capture_value(re: &Regex, line: &str) -> Option<String> {
    let caps = re.captures(line)?;
    let value = unquote(caps.get(1)?.as_str().trim());
    (!value.is_empty()).then(|| value.to_string())
}

fn unquote(value: &str) -> &str {
    for quote in ['"', '\''] {
        if let Some(inner) = value
            .strip_prefix(quote)
            .and_then(|v| v.strip_suffix(quote))
        {
            return inner.trim();
        }
    }
    value
}
