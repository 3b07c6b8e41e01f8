use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::error::AutofillError;
use crate::extract::field_model::SemanticType;
use crate::orchestrator::ai_payload::{AiPayload, PayloadField};

pub const DEFAULT_OLLAMA_ENDPOINT: &str = "http://localhost:11434/api/generate";
pub const DEFAULT_OLLAMA_MODEL: &str = "qwen2.5:1.5b";

/// Something that answers an `AiPayload` with a free-form reply, the way a
/// human pasting into the popup or a model would.
#[async_trait]
pub trait SuggestionSource: Send + Sync {
    fn name(&self) -> &str;

    async fn suggest(&self, payload: &AiPayload) -> Result<String, AutofillError>;
}

// ============================================================================
// Mock source (deterministic, no network)
// ============================================================================

/// Answers with a JSON array of plausible values for every field.
pub struct MockSuggestionSource;

#[async_trait]
impl SuggestionSource for MockSuggestionSource {
    fn name(&self) -> &str {
        "mock"
    }

    async fn suggest(&self, payload: &AiPayload) -> Result<String, AutofillError> {
        let suggestions: Vec<Value> = payload
            .form_fields
            .iter()
            .filter_map(|field| {
                guess_field_value(field).map(|value| json!({ "id": field.id, "suggestedValue": value }))
            })
            .collect();

        serde_json::to_string_pretty(&suggestions).map_err(|source| AutofillError::JsonSerialize {
            context: "mock suggestions".into(),
            source,
        })
    }
}

/// Value the mock source proposes for one field. Selects take their first
/// option with a non-empty value and are skipped when they have none.
pub fn guess_field_value(field: &PayloadField) -> Option<Value> {
    match field.field_type.as_str() {
        "checkbox" | "radio" => Some(Value::Bool(true)),
        "select-one" | "select-multiple" => {
            let options = field.options.as_deref().unwrap_or_default();
            options
                .iter()
                .find(|opt| !opt.value.is_empty())
                .or_else(|| options.first())
                .map(|opt| Value::String(opt.value.clone()))
        }
        _ => Some(Value::String(guess_value(&field.label, field.semantic_type))),
    }
}

/// Derive a sensible fill value from the field's label and semantic type.
pub fn guess_value(label: &str, semantic_type: SemanticType) -> String {
    let l = label.to_lowercase();

    // Label hints the rule table does not classify
    if l.contains("zip") || l.contains("postal") {
        return "90210".into();
    }
    if l.contains("username") {
        return "testuser".into();
    }
    if l.contains("search") || l.contains("query") {
        return "test query".into();
    }

    match semantic_type {
        SemanticType::Email => "user@example.com".into(),
        SemanticType::Phone => "555-0100".into(),
        SemanticType::Name => "Jane Doe".into(),
        SemanticType::Address => "123 Main Street".into(),
        SemanticType::Date => "2025-01-15".into(),
        SemanticType::Password => "TestPass123!".into(),
        SemanticType::Number => "42".into(),
        SemanticType::Url => "https://example.com".into(),
        SemanticType::Company => "Acme Corp".into(),
        SemanticType::Title => "Engineer".into(),
        SemanticType::Text => "test".into(),
    }
}

// ============================================================================
// Ollama source
// ============================================================================

pub struct OllamaSuggestionSource {
    client: reqwest::Client,
    pub endpoint: String,
    pub model: String,
}

impl Default for OllamaSuggestionSource {
    fn default() -> Self {
        Self::new(DEFAULT_OLLAMA_ENDPOINT, DEFAULT_OLLAMA_MODEL)
    }
}

#[derive(Serialize)]
struct OllamaRequest {
    model: String,
    prompt: String,
    stream: bool,
    format: &'static str,
}

#[derive(Deserialize)]
struct OllamaResponse {
    response: String,
}

impl OllamaSuggestionSource {
    pub fn new(endpoint: &str, model: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.to_string(),
            model: model.to_string(),
        }
    }

    pub fn build_prompt(&self, payload: &AiPayload) -> Result<String, AutofillError> {
        let fields = serde_json::to_string_pretty(payload).map_err(|source| {
            AutofillError::JsonSerialize {
                context: "AI payload".into(),
                source,
            }
        })?;

        Ok(format!(
r#"You are filling in a web form. Propose a realistic value for every field below.

FORM DATA:
{}

Respond with ONLY valid JSON of the form
{{"suggestions":[{{"id":"<field id>","suggestedValue":"<value>"}}]}}
Use an option value for select fields and true or false for checkboxes."#,
            fields
        ))
    }
}

#[async_trait]
impl SuggestionSource for OllamaSuggestionSource {
    fn name(&self) -> &str {
        "llm"
    }

    async fn suggest(&self, payload: &AiPayload) -> Result<String, AutofillError> {
        let request = OllamaRequest {
            model: self.model.clone(),
            prompt: self.build_prompt(payload)?,
            stream: false,
            format: "json",
        };

        let response = self
            .client
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await
            .map_err(|e| AutofillError::Inference(format!("Request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AutofillError::Inference(format!("API error {}: {}", status, body)));
        }

        let ollama: OllamaResponse = response
            .json()
            .await
            .map_err(|e| AutofillError::Inference(format!("Parse error: {}", e)))?;
        Ok(ollama.response)
    }
}
