use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::locator::locator::Locator;

/// Form key used for fields outside any `<form>`.
pub const NO_FORM: &str = "no-form";

/// Inferred domain meaning of a field, distinct from its native control type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SemanticType {
    Email,
    Phone,
    Name,
    Address,
    Date,
    Password,
    Number,
    Url,
    Company,
    Title,
    Text,
}

impl SemanticType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SemanticType::Email => "email",
            SemanticType::Phone => "phone",
            SemanticType::Name => "name",
            SemanticType::Address => "address",
            SemanticType::Date => "date",
            SemanticType::Password => "password",
            SemanticType::Number => "number",
            SemanticType::Url => "url",
            SemanticType::Company => "company",
            SemanticType::Title => "title",
            SemanticType::Text => "text",
        }
    }
}

impl fmt::Display for SemanticType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectOption {
    pub value: String,
    pub text: String,
}

/// Validation attributes reflected straight off the control.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Constraints {
    pub required: bool,
    pub min_length: Option<u32>,
    pub max_length: Option<u32>,
    pub pattern: Option<String>,
    pub min: Option<String>,
    pub max: Option<String>,
    pub step: Option<String>,
}

impl Constraints {
    /// True when no constraint is set at all.
    pub fn is_unconstrained(&self) -> bool {
        !self.required
            && self.min_length.is_none()
            && self.max_length.is_none()
            && self.pattern.is_none()
            && self.min.is_none()
            && self.max.is_none()
            && self.step.is_none()
    }
}

/// Descriptive element attributes. Not used for resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementInfo {
    pub tag_name: String,
    #[serde(rename = "type")]
    pub input_type: Option<String>,
    pub name: Option<String>,
    pub id: Option<String>,
    pub class_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldAnalysis {
    pub field_type: String,
    pub semantic_type: SemanticType,
    pub constraints: Constraints,
    pub options: Vec<SelectOption>,
    pub placeholder: Option<String>,
    pub current_value: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldContext {
    pub form_id: Option<String>,
    pub form_action: Option<String>,
    pub section_class: Option<String>,
    pub section_id: Option<String>,
    pub field_index: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub top: f64,
    pub left: f64,
    pub width: f64,
    pub height: f64,
}

/// Everything extraction knows about one form control.
///
/// Rebuilt from scratch on every extraction pass. Holds a `Locator`, never a
/// node handle: the control is re-resolved against the live document at the
/// moment it is filled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldDescriptor {
    pub id: String,
    pub label: String,
    pub element_info: ElementInfo,
    pub analysis: FieldAnalysis,
    pub context: FieldContext,
    pub locator: Locator,
    pub position: Position,
}

impl FieldDescriptor {
    pub fn form_key(&self) -> &str {
        self.context.form_id.as_deref().unwrap_or(NO_FORM)
    }
}

// ============================================================================
// Orchestrator-facing projections
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldSummary {
    pub id: String,
    pub label: String,
    #[serde(rename = "type")]
    pub field_type: String,
    pub semantic_type: SemanticType,
    pub required: bool,
    pub placeholder: Option<String>,
    pub current_value: Option<String>,
    pub options: Vec<SelectOption>,
    pub constraints: Constraints,
    /// Enclosing form key (`no-form` outside any form).
    pub context: String,
}

impl From<&FieldDescriptor> for FieldSummary {
    fn from(field: &FieldDescriptor) -> Self {
        Self {
            id: field.id.clone(),
            label: field.label.clone(),
            field_type: field.analysis.field_type.clone(),
            semantic_type: field.analysis.semantic_type,
            required: field.analysis.constraints.required,
            placeholder: field.analysis.placeholder.clone(),
            current_value: field.analysis.current_value.clone(),
            options: field.analysis.options.clone(),
            constraints: field.analysis.constraints.clone(),
            context: field.form_key().to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormGroupEntry {
    pub id: String,
    pub label: String,
    pub semantic_type: SemanticType,
    pub required: bool,
}

/// Payload of an `extractFields` reply.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionData {
    pub timestamp: String,
    pub page_url: String,
    pub page_title: String,
    pub total_fields: usize,
    pub fields: Vec<FieldSummary>,
    pub form_groups: BTreeMap<String, Vec<FormGroupEntry>>,
    /// Structural hash of the extraction; stable across passes over an
    /// unchanged document.
    pub fingerprint: String,
}

/// Lightweight row returned by `getAllFields`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldListing {
    pub id: String,
    pub label: String,
    pub semantic_type: SemanticType,
    pub selector: Locator,
}

impl From<&FieldDescriptor> for FieldListing {
    fn from(field: &FieldDescriptor) -> Self {
        Self {
            id: field.id.clone(),
            label: field.label.clone(),
            semantic_type: field.analysis.semantic_type,
            selector: field.locator.clone(),
        }
    }
}
