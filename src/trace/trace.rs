use serde::Serialize;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::fill::fill_model::FillResult;

/// One line of the JSONL trace: what the extractor did and how it went.
#[derive(Debug, Serialize)]
pub struct TraceEvent {
    pub timestamp_ms: u128,
    pub operation: String,

    pub field_id: Option<String>,
    pub outcome: Option<String>,
    pub detail: Option<String>,

    pub count: Option<usize>,
}

impl TraceEvent {
    pub fn now(operation: &str) -> Self {
        Self {
            timestamp_ms: SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_millis())
                .unwrap_or_default(),
            operation: operation.to_string(),
            field_id: None,
            outcome: None,
            detail: None,
            count: None,
        }
    }

    pub fn with_field(mut self, field_id: &str) -> Self {
        self.field_id = Some(field_id.to_string());
        self
    }

    pub fn with_outcome(mut self, outcome: impl ToString) -> Self {
        self.outcome = Some(outcome.to_string());
        self
    }

    pub fn with_detail(mut self, detail: impl ToString) -> Self {
        self.detail = Some(detail.to_string());
        self
    }

    pub fn with_count(mut self, count: usize) -> Self {
        self.count = Some(count);
        self
    }

    pub fn with_fill_result(self, result: &FillResult) -> Self {
        match &result.error {
            Some(error) => self.with_outcome("failed").with_detail(error),
            None => self.with_outcome("filled"),
        }
    }
}
