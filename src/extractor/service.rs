use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

use crate::error::AutofillError;
use crate::extract::field_model::{ExtractionData, FieldListing};
use crate::extractor::field_extractor::FieldExtractor;
use crate::extractor::protocol::{BatchFillResponse, DebugInfo, FieldFill, Request, Response};
use crate::fill::fill_model::{FillResult, FillValue};

/// Requests waiting for the extractor task.
const CHANNEL_CAPACITY: usize = 32;

type Envelope = (Request, oneshot::Sender<Response>);

// ============================================================================
// In-process channel
// ============================================================================

/// Move the extractor onto its own task. Requests are handled strictly one
/// at a time, in arrival order. The task ends when every client is dropped.
pub fn spawn_extractor(extractor: FieldExtractor) -> (ExtractorClient, JoinHandle<FieldExtractor>) {
    let (sender, receiver) = mpsc::channel(CHANNEL_CAPACITY);
    let handle = tokio::spawn(run_extractor(extractor, receiver));
    (ExtractorClient { sender }, handle)
}

async fn run_extractor(
    mut extractor: FieldExtractor,
    mut receiver: mpsc::Receiver<Envelope>,
) -> FieldExtractor {
    while let Some((request, reply)) = receiver.recv().await {
        let response = extractor.handle(request);
        // Caller gave up waiting; the work is done regardless.
        let _ = reply.send(response);
    }
    extractor
}

/// Orchestrator-side handle to a running extractor.
#[derive(Clone)]
pub struct ExtractorClient {
    sender: mpsc::Sender<Envelope>,
}

impl ExtractorClient {
    pub async fn send(&self, request: Request) -> Result<Response, AutofillError> {
        let (reply, response) = oneshot::channel();
        self.sender
            .send((request, reply))
            .await
            .map_err(|e| AutofillError::Channel(e.to_string()))?;
        response
            .await
            .map_err(|e| AutofillError::Channel(e.to_string()))
    }

    pub async fn extract_fields(&self) -> Result<ExtractionData, AutofillError> {
        match self.send(Request::ExtractFields).await? {
            Response::Extracted { data, .. } => Ok(data),
            other => Err(unexpected(other, "extraction data")),
        }
    }

    pub async fn fill_field(
        &self,
        field_id: &str,
        value: impl Into<FillValue>,
    ) -> Result<FillResult, AutofillError> {
        let request = Request::FillField {
            field_id: field_id.to_string(),
            value: value.into(),
        };
        match self.send(request).await? {
            Response::Filled { result, .. } => Ok(result),
            other => Err(unexpected(other, "fill result")),
        }
    }

    pub async fn fill_multiple_fields(
        &self,
        fields: Vec<FieldFill>,
    ) -> Result<BatchFillResponse, AutofillError> {
        match self.send(Request::FillMultipleFields { fields }).await? {
            Response::BatchFilled(batch) => Ok(batch),
            other => Err(unexpected(other, "batch fill results")),
        }
    }

    pub async fn debug_field(&self, field_id: &str) -> Result<DebugInfo, AutofillError> {
        let request = Request::DebugField {
            field_id: field_id.to_string(),
        };
        match self.send(request).await? {
            Response::Debug { debug, .. } => Ok(debug),
            other => Err(unexpected(other, "debug info")),
        }
    }

    pub async fn all_fields(&self) -> Result<Vec<FieldListing>, AutofillError> {
        match self.send(Request::GetAllFields).await? {
            Response::Fields { fields, .. } => Ok(fields),
            other => Err(unexpected(other, "field list")),
        }
    }
}

fn unexpected(response: Response, expected: &str) -> AutofillError {
    match response {
        Response::Error { error, .. } => AutofillError::Extractor(error),
        _ => AutofillError::UnexpectedResponse {
            expected: expected.to_string(),
        },
    }
}

// ============================================================================
// Newline-delimited JSON over a byte stream
// ============================================================================

/// Serve one JSON request per input line, one JSON response per output
/// line, until the input closes. Bad lines get an error response and the
/// loop carries on. Returns the number of requests answered.
pub async fn serve_lines<R, W>(
    extractor: &mut FieldExtractor,
    reader: R,
    mut writer: W,
) -> Result<usize, AutofillError>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = reader.lines();
    let mut answered = 0;

    while let Some(line) = lines.next_line().await.map_err(|source| AutofillError::Io {
        context: "reading request".into(),
        source,
    })? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let response = match serde_json::from_str::<Request>(line) {
            Ok(request) => extractor.handle(request),
            Err(e) => Response::error(format!("Invalid request: {}", e)),
        };

        let json = serde_json::to_string(&response).map_err(|source| {
            AutofillError::JsonSerialize {
                context: "response line".into(),
                source,
            }
        })?;
        write_line(&mut writer, &json)
            .await
            .map_err(|source| AutofillError::Io {
                context: "writing response".into(),
                source,
            })?;
        answered += 1;
    }

    Ok(answered)
}

async fn write_line<W: AsyncWrite + Unpin>(writer: &mut W, line: &str) -> std::io::Result<()> {
    writer.write_all(line.as_bytes()).await?;
    writer.write_all(b"\n").await?;
    writer.flush().await
}

/// `serve_lines` bound to the process's stdin and stdout.
pub async fn serve_stdio(extractor: &mut FieldExtractor) -> Result<usize, AutofillError> {
    let stdin = tokio::io::BufReader::new(tokio::io::stdin());
    serve_lines(extractor, stdin, tokio::io::stdout()).await
}
