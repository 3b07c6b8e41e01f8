use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::extract::field_model::{
    Constraints, ExtractionData, FieldSummary, FormGroupEntry, SelectOption, SemanticType,
};

const PURPOSE: &str =
    "Analyze these form fields and provide appropriate values based on the field types and labels";
const RESPONSE_FORMAT: &str =
    "Return suggestions as an array of objects with 'id' and 'suggestedValue' properties";
const NOTES: &str = "Consider semantic types, constraints, and context when suggesting values";

/// The document handed to a human or AI agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AiPayload {
    pub page_info: PageInfo,
    pub form_fields: Vec<PayloadField>,
    pub form_groups: BTreeMap<String, Vec<FormGroupEntry>>,
    pub instructions: Instructions,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageInfo {
    pub url: String,
    pub title: String,
    pub timestamp: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PayloadField {
    pub id: String,
    pub label: String,
    #[serde(rename = "type")]
    pub field_type: String,
    pub semantic_type: SemanticType,
    pub required: bool,
    pub placeholder: Option<String>,
    pub current_value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<SelectOption>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub constraints: Option<Constraints>,
}

impl From<&FieldSummary> for PayloadField {
    fn from(field: &FieldSummary) -> Self {
        Self {
            id: field.id.clone(),
            label: field.label.clone(),
            field_type: field.field_type.clone(),
            semantic_type: field.semantic_type,
            required: field.required,
            placeholder: field.placeholder.clone(),
            current_value: field.current_value.clone(),
            options: (!field.options.is_empty()).then(|| field.options.clone()),
            constraints: (!field.constraints.is_unconstrained())
                .then(|| field.constraints.clone()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Instructions {
    pub purpose: String,
    pub response_format: String,
    pub notes: String,
}

impl Default for Instructions {
    fn default() -> Self {
        Self {
            purpose: PURPOSE.to_string(),
            response_format: RESPONSE_FORMAT.to_string(),
            notes: NOTES.to_string(),
        }
    }
}

pub fn build_ai_payload(data: &ExtractionData) -> AiPayload {
    AiPayload {
        page_info: PageInfo {
            url: data.page_url.clone(),
            title: data.page_title.clone(),
            timestamp: data.timestamp.clone(),
        },
        form_fields: data.fields.iter().map(PayloadField::from).collect(),
        form_groups: data.form_groups.clone(),
        instructions: Instructions::default(),
    }
}
