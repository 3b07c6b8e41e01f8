use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::extract::field_model::{ExtractionData, FieldDescriptor, FieldListing};
use crate::fill::fill_model::{FillResult, FillSummary, FillValue};

// ============================================================================
// Requests (Orchestrator → Field Extractor)
// ============================================================================

/// One message on the extractor channel, keyed by `action`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum Request {
    ExtractFields,
    FillField {
        field_id: String,
        #[serde(default)]
        value: FillValue,
    },
    FillMultipleFields {
        fields: Vec<FieldFill>,
    },
    DebugField {
        field_id: String,
    },
    GetAllFields,
}

/// One entry of a batch fill. Accepts the suggestion spelling
/// (`id`/`suggestedValue`) as well as the canonical one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldFill {
    #[serde(alias = "id")]
    pub field_id: String,
    #[serde(default, alias = "suggestedValue")]
    pub value: FillValue,
}

impl FieldFill {
    pub fn new(field_id: impl Into<String>, value: impl Into<FillValue>) -> Self {
        Self {
            field_id: field_id.into(),
            value: value.into(),
        }
    }
}

// ============================================================================
// Responses (Field Extractor → Orchestrator)
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchFillResponse {
    pub success: bool,
    /// field id → success flag; keys are exactly the requested ids.
    pub results: BTreeMap<String, bool>,
    pub detailed_results: BTreeMap<String, FillResult>,
    pub summary: FillSummary,
}

impl BatchFillResponse {
    /// Fold per-field outcomes, in request order, into the batch reply.
    /// A repeated id keeps its last outcome but still counts towards `total`.
    pub fn from_outcomes(outcomes: Vec<(String, FillResult)>) -> Self {
        let mut summary = FillSummary {
            total: outcomes.len(),
            ..FillSummary::default()
        };
        let mut results = BTreeMap::new();
        let mut detailed_results = BTreeMap::new();

        for (field_id, result) in outcomes {
            if result.success {
                summary.successful += 1;
            } else {
                summary.failed += 1;
            }
            results.insert(field_id.clone(), result.success);
            detailed_results.insert(field_id, result);
        }

        Self {
            success: true,
            results,
            detailed_results,
            summary,
        }
    }

    pub fn failed_ids(&self) -> Vec<&str> {
        self.results
            .iter()
            .filter(|(_, ok)| !**ok)
            .map(|(id, _)| id.as_str())
            .collect()
    }
}

/// What `debugField` found out about the live element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DebugElementInfo {
    pub tag_name: String,
    #[serde(rename = "type")]
    pub input_type: String,
    pub id: Option<String>,
    pub name: Option<String>,
    pub class_name: Option<String>,
    pub value: String,
    pub checked: bool,
    pub visible: bool,
    pub disabled: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DebugInfo {
    pub field_found: bool,
    pub element_found: bool,
    pub field_data: Option<FieldDescriptor>,
    pub element_info: Option<DebugElementInfo>,
}

/// Reply to a `Request`. Untagged on the wire; the shape identifies it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Response {
    Extracted { success: bool, data: ExtractionData },
    Filled { success: bool, result: FillResult },
    BatchFilled(BatchFillResponse),
    Debug { success: bool, debug: DebugInfo },
    Fields { success: bool, fields: Vec<FieldListing> },
    Error { success: bool, error: String },
}

impl Response {
    pub fn error(message: impl Into<String>) -> Self {
        Response::Error {
            success: false,
            error: message.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        match self {
            Response::Extracted { success, .. }
            | Response::Filled { success, .. }
            | Response::Debug { success, .. }
            | Response::Fields { success, .. }
            | Response::Error { success, .. } => *success,
            Response::BatchFilled(batch) => batch.success,
        }
    }
}

