use std::sync::{Arc, Mutex, PoisonError};

use crate::cli::config::RunSettings;
use crate::dom::dom_model::{Document, SharedDocument};
use crate::error::AutofillError;
use crate::extractor::field_extractor::FieldExtractor;
use crate::extractor::service::{serve_stdio, spawn_extractor};
use crate::orchestrator::orchestrator::{FillReport, Orchestrator};
use crate::orchestrator::response_parser::ResponseFormat;
use crate::orchestrator::suggest::{
    MockSuggestionSource, OllamaSuggestionSource, SuggestionSource, DEFAULT_OLLAMA_ENDPOINT,
    DEFAULT_OLLAMA_MODEL,
};
use crate::report::console::{format_debug, format_field_list, format_fill_report};
use crate::trace::logger::TraceLogger;

// ============================================================================
// extract subcommand
// ============================================================================

pub async fn cmd_extract(
    page: &str,
    output: Option<&str>,
    settings: &RunSettings,
) -> Result<(), Box<dyn std::error::Error>> {
    let (_, mut orchestrator) = start_session(page, settings)?;

    let data = orchestrator.extract().await?;
    if settings.verbose > 0 {
        eprint!("{}", format_field_list(data));
    }

    let payload = serde_json::to_string_pretty(&orchestrator.payload()?)?;
    write_or_print(&payload, output)?;
    Ok(())
}

// ============================================================================
// fill subcommand
// ============================================================================

/// Fill from a reply file and return whether every suggestion landed.
pub async fn cmd_fill(
    page: &str,
    response: &str,
    format: &str,
    output: Option<&str>,
    settings: &RunSettings,
) -> Result<bool, Box<dyn std::error::Error>> {
    let format: ResponseFormat = format.parse()?;
    let reply = std::fs::read_to_string(response).map_err(|source| AutofillError::Io {
        context: format!("reading response '{}'", response),
        source,
    })?;

    let (document, mut orchestrator) = start_session(page, settings)?;
    let data = orchestrator.extract().await?;
    if settings.verbose > 0 {
        eprintln!("Extracted {} fields from {}", data.total_fields, data.page_url);
    }

    let report = orchestrator.apply_response(&reply, format).await?;
    finish(&orchestrator, &document, &report, output, settings).await
}

// ============================================================================
// suggest subcommand
// ============================================================================

pub async fn cmd_suggest(
    page: &str,
    analyzer: &str,
    output: Option<&str>,
    settings: &RunSettings,
) -> Result<bool, Box<dyn std::error::Error>> {
    let source = build_source(analyzer, settings);
    let (document, mut orchestrator) = start_session(page, settings)?;

    if settings.verbose > 0 {
        eprintln!("Requesting suggestions from '{}' source...", source.name());
    }

    let report = orchestrator.suggest_and_fill(source.as_ref()).await?;
    finish(&orchestrator, &document, &report, output, settings).await
}

// ============================================================================
// serve subcommand
// ============================================================================

pub async fn cmd_serve(page: &str, settings: &RunSettings) -> Result<(), Box<dyn std::error::Error>> {
    let document = load_page(page)?;
    let mut extractor = build_extractor(Arc::new(Mutex::new(document)), settings);

    if settings.verbose > 0 {
        eprintln!("Serving extractor requests for {} on stdin/stdout", page);
    }

    let answered = serve_stdio(&mut extractor).await?;
    if settings.verbose > 0 {
        eprintln!("Answered {} requests", answered);
    }
    Ok(())
}

// ============================================================================
// Helpers
// ============================================================================

/// Read and parse a page snapshot file.
pub fn load_page(path: &str) -> Result<Document, AutofillError> {
    let json = std::fs::read_to_string(path).map_err(|source| AutofillError::SnapshotRead {
        path: path.to_string(),
        source,
    })?;
    Document::from_json(&json).map_err(|source| AutofillError::JsonParse {
        context: format!("page snapshot '{}'", path),
        source,
    })
}

fn build_extractor(document: SharedDocument, settings: &RunSettings) -> FieldExtractor {
    let trace = TraceLogger::from_path(settings.trace_path.as_deref());
    FieldExtractor::new(document)
        .with_nudge(settings.nudge)
        .with_trace(Arc::new(trace))
}

/// Load the page, put an extractor on its own task and hand back an
/// orchestrator wired to it, plus the document for writing back.
fn start_session(
    page: &str,
    settings: &RunSettings,
) -> Result<(SharedDocument, Orchestrator), AutofillError> {
    let document: SharedDocument = Arc::new(Mutex::new(load_page(page)?));
    let extractor = build_extractor(SharedDocument::clone(&document), settings);
    let (client, _task) = spawn_extractor(extractor);
    Ok((document, Orchestrator::new(client)))
}

/// Build the suggestion source by name.
fn build_source(name: &str, settings: &RunSettings) -> Box<dyn SuggestionSource> {
    match name {
        "llm" => {
            let endpoint = settings
                .ollama_endpoint
                .as_deref()
                .unwrap_or(DEFAULT_OLLAMA_ENDPOINT);
            let model = settings.ollama_model.as_deref().unwrap_or(DEFAULT_OLLAMA_MODEL);
            Box::new(OllamaSuggestionSource::new(endpoint, model))
        }
        _ => Box::new(MockSuggestionSource),
    }
}

/// Print the report, debug failures when verbose, write the filled page.
async fn finish(
    orchestrator: &Orchestrator,
    document: &SharedDocument,
    report: &FillReport,
    output: Option<&str>,
    settings: &RunSettings,
) -> Result<bool, Box<dyn std::error::Error>> {
    print!("{}", format_fill_report(report));

    if settings.verbose > 0 && !report.all_filled() {
        let debug = orchestrator.debug_failed(report).await?;
        eprint!("{}", format_debug(&debug));
    }

    if let Some(path) = output {
        let snapshot = document
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .to_snapshot();
        std::fs::write(path, serde_json::to_string_pretty(&snapshot)?)?;
        if settings.verbose > 0 {
            eprintln!("Wrote filled page to {}", path);
        }
    }

    Ok(report.all_filled())
}

fn write_or_print(content: &str, output: Option<&str>) -> Result<(), Box<dyn std::error::Error>> {
    match output {
        Some(path) => std::fs::write(path, content)?,
        None => println!("{}", content),
    }
    Ok(())
}
