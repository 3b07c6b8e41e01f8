use std::fmt;

use crate::orchestrator::response_parser::ParseError;

#[derive(Debug)]
pub enum AutofillError {
    /// Page snapshot could not be read from disk
    SnapshotRead { path: String, source: std::io::Error },

    /// JSON parsing failed (snapshot, wire message, or backend reply)
    JsonParse { context: String, source: serde_json::Error },

    /// JSON serialization failed (payload, report, or snapshot write-back)
    JsonSerialize { context: String, source: serde_json::Error },

    /// Request channel to the field extractor is closed
    Channel(String),

    /// Field extractor rejected the request
    Extractor(String),

    /// Field extractor answered with a response of the wrong shape
    UnexpectedResponse { expected: String },

    /// Text-mode parsing needs field labels from a prior extraction
    NoExtraction,

    /// Agent reply could not be turned into suggestions
    ResponseParse(ParseError),

    /// Suggestion backend failed (HTTP, model, or malformed reply)
    Inference(String),

    /// Generic IO failure (stdio server, output files)
    Io { context: String, source: std::io::Error },
}

impl fmt::Display for AutofillError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AutofillError::SnapshotRead { path, source } => {
                write!(f, "Failed to read page snapshot '{}': {}", path, source)
            }
            AutofillError::JsonParse { context, source } => {
                write!(f, "JSON parse error ({}): {}", context, source)
            }
            AutofillError::JsonSerialize { context, source } => {
                write!(f, "JSON serialize error ({}): {}", context, source)
            }
            AutofillError::Channel(msg) => write!(f, "Extractor channel closed: {}", msg),
            AutofillError::Extractor(msg) => write!(f, "Field extractor error: {}", msg),
            AutofillError::UnexpectedResponse { expected } => {
                write!(f, "Unexpected extractor response (expected {})", expected)
            }
            AutofillError::NoExtraction => {
                write!(f, "No fields extracted yet; run an extraction first")
            }
            AutofillError::ResponseParse(err) => write!(f, "Could not parse response: {}", err),
            AutofillError::Inference(msg) => write!(f, "Suggestion backend failed: {}", msg),
            AutofillError::Io { context, source } => write!(f, "IO error ({}): {}", context, source),
        }
    }
}

impl std::error::Error for AutofillError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AutofillError::SnapshotRead { source, .. } => Some(source),
            AutofillError::JsonParse { source, .. } => Some(source),
            AutofillError::JsonSerialize { source, .. } => Some(source),
            AutofillError::ResponseParse(err) => Some(err),
            AutofillError::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<ParseError> for AutofillError {
    fn from(err: ParseError) -> Self {
        match err {
            ParseError::NoExtraction => AutofillError::NoExtraction,
            other => AutofillError::ResponseParse(other),
        }
    }
}
