use std::sync::{Arc, MutexGuard, PoisonError};

use serde_json::Value;

use crate::dom::dom_model::{Document, SharedDocument};
use crate::extract::discovery::{discover_fields, prepare_extraction};
use crate::extract::field_model::{ExtractionData, FieldDescriptor, FieldListing};
use crate::extractor::protocol::{
    BatchFillResponse, DebugElementInfo, DebugInfo, FieldFill, Request, Response,
};
use crate::fill::fill_model::{FillError, FillResult, FillValue};
use crate::fill::injector::inject;
use crate::fill::nudge::{schedule_autocomplete_nudge, NudgeConfig};
use crate::trace::logger::TraceLogger;
use crate::trace::trace::TraceEvent;

/// Page-side half of the pair: owns the document and the descriptors of the
/// most recent extraction pass.
pub struct FieldExtractor {
    document: SharedDocument,
    fields: Vec<FieldDescriptor>,
    nudge: NudgeConfig,
    trace: Arc<TraceLogger>,
}

impl FieldExtractor {
    pub fn new(document: SharedDocument) -> Self {
        Self {
            document,
            fields: Vec::new(),
            nudge: NudgeConfig::default(),
            trace: Arc::new(TraceLogger::disabled()),
        }
    }

    pub fn from_document(document: Document) -> Self {
        Self::new(Arc::new(std::sync::Mutex::new(document)))
    }

    pub fn with_nudge(mut self, nudge: NudgeConfig) -> Self {
        self.nudge = nudge;
        self
    }

    pub fn with_trace(mut self, trace: Arc<TraceLogger>) -> Self {
        self.trace = trace;
        self
    }

    pub fn document(&self) -> &SharedDocument {
        &self.document
    }

    /// Descriptors from the last `extract`; empty before the first pass.
    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    pub fn field(&self, field_id: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.id == field_id)
    }

    // A panicked nudge task cannot leave the document half-written: every
    // mutation under the lock is a single assignment or event push.
    fn lock(&self) -> MutexGuard<'_, Document> {
        self.document.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Swap in a new page. Descriptors from the old page are dropped and
    /// pending nudges for it are discarded.
    pub fn load(&mut self, page: Document) {
        self.lock().replace(page);
        self.fields.clear();
    }

    // ========================================================================
    // Extraction
    // ========================================================================

    /// Walk the document and replace the stored descriptor set.
    pub fn extract(&mut self) -> ExtractionData {
        let (fields, data) = {
            let doc = self.lock();
            let fields = discover_fields(&doc);
            let data = prepare_extraction(&doc, &fields);
            (fields, data)
        };
        self.fields = fields;

        self.trace.log(
            &TraceEvent::now("extract")
                .with_count(data.total_fields)
                .with_detail(&data.fingerprint),
        );
        data
    }

    pub fn all_fields(&self) -> Vec<FieldListing> {
        self.fields.iter().map(FieldListing::from).collect()
    }

    // ========================================================================
    // Filling
    // ========================================================================

    /// Fill one field. Never fails: every problem comes back as a failed
    /// `FillResult`.
    pub fn fill_field(&self, field_id: &str, value: &FillValue) -> FillResult {
        let result = FillResult::from(self.try_fill(field_id, value));
        self.trace.log(
            &TraceEvent::now("fill")
                .with_field(field_id)
                .with_fill_result(&result),
        );
        result
    }

    fn try_fill(&self, field_id: &str, value: &FillValue) -> Result<Value, FillError> {
        let field = self.field(field_id).ok_or_else(|| FillError::FieldNotFound {
            field_id: field_id.to_string(),
        })?;

        let mut doc = self.lock();
        let node = field
            .locator
            .resolve(&doc)
            .ok_or_else(|| FillError::ElementNotFound {
                locator: field.locator.to_string(),
            })?;

        let injection = inject(&mut doc, node, value)?;
        if injection.autocomplete {
            let generation = doc.generation();
            drop(doc);
            schedule_autocomplete_nudge(&self.document, node, generation, &self.nudge);
        }
        Ok(injection.value)
    }

    /// Fill fields one after another in the given order.
    pub fn fill_multiple(&self, fills: &[FieldFill]) -> BatchFillResponse {
        let outcomes = fills
            .iter()
            .map(|fill| (fill.field_id.clone(), self.fill_field(&fill.field_id, &fill.value)))
            .collect();
        let batch = BatchFillResponse::from_outcomes(outcomes);

        self.trace.log(
            &TraceEvent::now("fill_multiple")
                .with_count(batch.summary.total)
                .with_outcome(format!(
                    "{}/{} filled",
                    batch.summary.successful, batch.summary.total
                )),
        );
        batch
    }

    // ========================================================================
    // Diagnostics
    // ========================================================================

    pub fn debug_field(&self, field_id: &str) -> DebugInfo {
        let Some(field) = self.field(field_id) else {
            return DebugInfo {
                field_found: false,
                element_found: false,
                field_data: None,
                element_info: None,
            };
        };

        let doc = self.lock();
        let element_info = field.locator.resolve(&doc).and_then(|node| {
            let el = doc.element(node)?;
            Some(DebugElementInfo {
                tag_name: el.tag.to_uppercase(),
                input_type: el.control_type(),
                id: el.id().map(str::to_string),
                name: el.name().map(str::to_string),
                class_name: el.class_name().map(str::to_string),
                value: doc.control_value(node),
                checked: el.state.checked,
                visible: doc.is_rendered(node),
                disabled: el.has_attr("disabled"),
            })
        });

        self.trace.log(
            &TraceEvent::now("debug")
                .with_field(field_id)
                .with_outcome(if element_info.is_some() { "resolved" } else { "unresolved" }),
        );

        DebugInfo {
            field_found: true,
            element_found: element_info.is_some(),
            field_data: Some(field.clone()),
            element_info,
        }
    }

    // ========================================================================
    // Message dispatch
    // ========================================================================

    /// Answer one request. Events observed while serving the previous
    /// request (including late nudge keys) are discarded first so a
    /// long-lived page does not accumulate them.
    pub fn handle(&mut self, request: Request) -> Response {
        self.lock().take_events();

        match request {
            Request::ExtractFields => Response::Extracted {
                success: true,
                data: self.extract(),
            },
            Request::FillField { field_id, value } => {
                let result = self.fill_field(&field_id, &value);
                Response::Filled {
                    success: result.success,
                    result,
                }
            }
            Request::FillMultipleFields { fields } => {
                Response::BatchFilled(self.fill_multiple(&fields))
            }
            Request::DebugField { field_id } => Response::Debug {
                success: true,
                debug: self.debug_field(&field_id),
            },
            Request::GetAllFields => Response::Fields {
                success: true,
                fields: self.all_fields(),
            },
        }
    }
}
