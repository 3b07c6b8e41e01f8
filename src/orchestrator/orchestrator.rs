use serde::Serialize;

use crate::error::AutofillError;
use crate::extract::field_model::ExtractionData;
use crate::extractor::protocol::{BatchFillResponse, DebugInfo, FieldFill};
use crate::extractor::service::ExtractorClient;
use crate::fill::fill_model::{FillSummary, FillValue};
use crate::orchestrator::ai_payload::{build_ai_payload, AiPayload};
use crate::orchestrator::response_parser::{
    parse_json_response, parse_response, ResponseFormat, Suggestion,
};
use crate::orchestrator::suggest::SuggestionSource;

// ============================================================================
// Fill report
// ============================================================================

/// One suggestion as it came back from the extractor.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FillReportEntry {
    pub field_id: String,
    /// Field label from the extraction, or the id when the field is unknown.
    pub label: String,
    pub suggested_value: FillValue,
    pub success: bool,
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FillReport {
    pub entries: Vec<FillReportEntry>,
    pub summary: FillSummary,
}

impl FillReport {
    pub fn empty() -> Self {
        Self {
            entries: Vec::new(),
            summary: FillSummary::default(),
        }
    }

    fn build(
        suggestions: Vec<Suggestion>,
        batch: &BatchFillResponse,
        extraction: Option<&ExtractionData>,
    ) -> Self {
        let entries = suggestions
            .into_iter()
            .map(|s| {
                let label = extraction
                    .and_then(|data| data.fields.iter().find(|f| f.id == s.field_id))
                    .map(|f| f.label.clone())
                    .unwrap_or_else(|| s.field_id.clone());
                let detail = batch.detailed_results.get(&s.field_id);
                FillReportEntry {
                    success: batch.results.get(&s.field_id).copied().unwrap_or(false),
                    error: detail.and_then(|d| d.error.clone()),
                    label,
                    field_id: s.field_id,
                    suggested_value: s.suggested_value,
                }
            })
            .collect();

        Self {
            entries,
            summary: batch.summary,
        }
    }

    pub fn all_filled(&self) -> bool {
        self.summary.failed == 0
    }

    pub fn failed_ids(&self) -> Vec<&str> {
        self.entries
            .iter()
            .filter(|e| !e.success)
            .map(|e| e.field_id.as_str())
            .collect()
    }

    /// The one-line status shown after a fill.
    pub fn message(&self) -> String {
        if self.summary.total == 0 {
            return "No valid field suggestions found in response".to_string();
        }
        format!(
            "Successfully filled {}/{} fields!",
            self.summary.successful, self.summary.total
        )
    }
}

// ============================================================================
// Orchestrator
// ============================================================================

/// UI-side driver: extracts, exposes the payload, turns agent replies into
/// suggestions and sends them back for filling.
pub struct Orchestrator {
    client: ExtractorClient,
    current: Option<ExtractionData>,
}

impl Orchestrator {
    pub fn new(client: ExtractorClient) -> Self {
        Self {
            client,
            current: None,
        }
    }

    pub fn client(&self) -> &ExtractorClient {
        &self.client
    }

    /// Most recent extraction, if any.
    pub fn current(&self) -> Option<&ExtractionData> {
        self.current.as_ref()
    }

    pub async fn extract(&mut self) -> Result<&ExtractionData, AutofillError> {
        let data = self.client.extract_fields().await?;
        Ok(self.current.insert(data))
    }

    pub fn payload(&self) -> Result<AiPayload, AutofillError> {
        self.current
            .as_ref()
            .map(build_ai_payload)
            .ok_or(AutofillError::NoExtraction)
    }

    pub fn parse(&self, text: &str, format: ResponseFormat) -> Result<Vec<Suggestion>, AutofillError> {
        Ok(parse_response(text, format, self.current.as_ref())?)
    }

    /// Send suggestions to the extractor in order. An empty list fills
    /// nothing and reports so.
    pub async fn fill_suggestions(
        &self,
        suggestions: Vec<Suggestion>,
    ) -> Result<FillReport, AutofillError> {
        if suggestions.is_empty() {
            return Ok(FillReport::empty());
        }

        let fills: Vec<FieldFill> = suggestions.iter().cloned().map(FieldFill::from).collect();
        let batch = self.client.fill_multiple_fields(fills).await?;
        Ok(FillReport::build(suggestions, &batch, self.current.as_ref()))
    }

    /// Parse a pasted reply and fill what it suggests.
    pub async fn apply_response(
        &self,
        text: &str,
        format: ResponseFormat,
    ) -> Result<FillReport, AutofillError> {
        let suggestions = self.parse(text, format)?;
        self.fill_suggestions(suggestions).await
    }

    /// Ask `source` for values and fill them, extracting first if needed.
    pub async fn suggest_and_fill(
        &mut self,
        source: &dyn SuggestionSource,
    ) -> Result<FillReport, AutofillError> {
        if self.current.is_none() {
            self.extract().await?;
        }
        let payload = self.payload()?;
        let reply = source.suggest(&payload).await?;
        let suggestions = parse_json_response(&reply)?;
        self.fill_suggestions(suggestions).await
    }

    /// `debugField` for every failed entry of a report, in report order.
    pub async fn debug_failed(
        &self,
        report: &FillReport,
    ) -> Result<Vec<(String, DebugInfo)>, AutofillError> {
        let mut debug = Vec::new();
        for field_id in report.failed_ids() {
            let info = self.client.debug_field(field_id).await?;
            debug.push((field_id.to_string(), info));
        }
        Ok(debug)
    }
}
