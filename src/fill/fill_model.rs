use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::dom::dom_model::{DomError, Element};

// ============================================================================
// Fill inputs
// ============================================================================

/// A value to write into a control, as it arrives over the wire.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FillValue {
    Bool(bool),
    Number(serde_json::Number),
    Text(String),
    #[default]
    Null,
}

impl FillValue {
    /// String form used for text-like controls and option matching.
    pub fn as_text(&self) -> String {
        match self {
            FillValue::Bool(b) => b.to_string(),
            FillValue::Number(n) => n.to_string(),
            FillValue::Text(s) => s.clone(),
            FillValue::Null => String::new(),
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            FillValue::Bool(b) => Value::Bool(*b),
            FillValue::Number(n) => Value::Number(n.clone()),
            FillValue::Text(s) => Value::String(s.clone()),
            FillValue::Null => Value::Null,
        }
    }
}

impl From<&str> for FillValue {
    fn from(value: &str) -> Self {
        FillValue::Text(value.to_string())
    }
}

impl From<String> for FillValue {
    fn from(value: String) -> Self {
        FillValue::Text(value)
    }
}

impl From<bool> for FillValue {
    fn from(value: bool) -> Self {
        FillValue::Bool(value)
    }
}

// ============================================================================
// Control dispatch
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    Checkbox,
    Radio,
    Date,
    /// text, email, tel, url, password, search, number and the rest.
    Text,
}

/// Closed set of control kinds the injector knows how to fill.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControlKind {
    Input(InputKind),
    Select,
    TextArea,
    Unsupported(String),
}

impl ControlKind {
    pub fn of(el: &Element) -> Self {
        match el.tag.as_str() {
            "input" => ControlKind::Input(match el.control_type().as_str() {
                "checkbox" => InputKind::Checkbox,
                "radio" => InputKind::Radio,
                "date" => InputKind::Date,
                _ => InputKind::Text,
            }),
            "select" => ControlKind::Select,
            "textarea" => ControlKind::TextArea,
            other => ControlKind::Unsupported(other.to_string()),
        }
    }
}

// ============================================================================
// Fill outcomes
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum FillError {
    /// No descriptor with this id in the current extraction.
    FieldNotFound { field_id: String },
    /// The descriptor's locator no longer resolves.
    ElementNotFound { locator: String },
    UnsupportedElement { tag: String },
    NoMatchingOption { value: String },
    /// Anything that went wrong while writing into the document.
    Injection(String),
}

impl fmt::Display for FillError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FillError::FieldNotFound { .. } => write!(f, "Field not found"),
            FillError::ElementNotFound { locator } => {
                write!(f, "Element not found for selector: {}", locator)
            }
            FillError::UnsupportedElement { tag } => {
                write!(f, "Unsupported element type: {}", tag)
            }
            FillError::NoMatchingOption { value } => {
                write!(f, "No matching option found for value: {}", value)
            }
            FillError::Injection(msg) => write!(f, "Injection failed: {}", msg),
        }
    }
}

impl std::error::Error for FillError {}

impl From<DomError> for FillError {
    fn from(err: DomError) -> Self {
        FillError::Injection(err.to_string())
    }
}

/// Per-field outcome as it crosses the message channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FillResult {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl FillResult {
    pub fn filled(value: Value) -> Self {
        Self {
            success: true,
            value: Some(value),
            error: None,
        }
    }

    pub fn failed(error: &FillError) -> Self {
        Self {
            success: false,
            value: None,
            error: Some(error.to_string()),
        }
    }
}

impl From<Result<Value, FillError>> for FillResult {
    fn from(outcome: Result<Value, FillError>) -> Self {
        match outcome {
            Ok(value) => FillResult::filled(value),
            Err(err) => FillResult::failed(&err),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FillSummary {
    pub total: usize,
    pub successful: usize,
    pub failed: usize,
}
