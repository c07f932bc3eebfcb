//! Workflows API and workflow-shape stream events.

use async_trait::async_trait;

use crate::client::PalaverClient;
use crate::error::{Error, Result};
use crate::stream::{EventProcessor, EventStream, LineReader};
use crate::types::{
    ResumeWorkflowRequest, RunWorkflowRequest, RunWorkflowResponse, WorkflowError,
    WorkflowInterrupt, WorkflowMessage,
};

/// A decoded workflow stream event.
///
/// Every variant carries the event's 0-based sequence id from the `id:` line.
#[derive(Debug, Clone)]
pub enum WorkflowEvent {
    /// A content chunk from a workflow node.
    Message {
        /// Sequence id.
        id: u64,
        /// The chunk.
        message: WorkflowMessage,
    },
    /// The run is interrupted and must be resumed.
    Interrupt {
        /// Sequence id.
        id: u64,
        /// The interrupt to answer.
        interrupt: WorkflowInterrupt,
    },
    /// The run reported an error.
    Error {
        /// Sequence id.
        id: u64,
        /// The error payload.
        error: WorkflowError,
    },
    /// The run finished.
    Done {
        /// Sequence id.
        id: u64,
    },
}

impl WorkflowEvent {
    /// Whether this event terminates the stream.
    pub fn is_done(&self) -> bool {
        matches!(self, WorkflowEvent::Done { .. })
    }
}

/// Decode one workflow event from its sequence id, tag, and data payload.
/// Unknown tags are read as messages, matching the server's habit of adding
/// message-like events.
fn parse_workflow_event(id: u64, event: &str, data: &str) -> Result<WorkflowEvent> {
    match event {
        "Message" => Ok(WorkflowEvent::Message {
            id,
            message: serde_json::from_str(data)?,
        }),
        "Interrupt" => Ok(WorkflowEvent::Interrupt {
            id,
            interrupt: serde_json::from_str(data)?,
        }),
        "Error" => Ok(WorkflowEvent::Error {
            id,
            error: serde_json::from_str(data)?,
        }),
        "Done" => Ok(WorkflowEvent::Done { id }),
        _ => Ok(WorkflowEvent::Message {
            id,
            message: serde_json::from_str(data)?,
        }),
    }
}

/// Workflow events are framed as an `id:` line, an `event:` line, then a
/// `data:` line.
pub struct WorkflowEventProcessor;

#[async_trait]
impl EventProcessor for WorkflowEventProcessor {
    type Event = WorkflowEvent;

    async fn process(
        &mut self,
        line: &str,
        lines: &mut LineReader,
    ) -> Result<Option<(WorkflowEvent, bool)>> {
        let Some(id) = line.strip_prefix("id:") else {
            return Ok(None);
        };
        let id: u64 = id.trim().parse().unwrap_or_default();

        let event_line = lines
            .next_line()
            .await?
            .ok_or_else(|| Error::Stream("stream ended before event line".to_string()))?;
        let event = event_line
            .strip_prefix("event:")
            .ok_or_else(|| Error::Stream(format!("expected event line, got: {event_line}")))?
            .trim()
            .to_string();

        let data_line = lines
            .next_line()
            .await?
            .ok_or_else(|| Error::Stream("stream ended before data line".to_string()))?;
        let data = data_line
            .strip_prefix("data:")
            .ok_or_else(|| Error::Stream(format!("expected data line, got: {data_line}")))?
            .trim();

        let event = parse_workflow_event(id, &event, data)?;
        let done = event.is_done();
        Ok(Some((event, done)))
    }
}

/// Stream of workflow events.
pub type WorkflowEventStream = EventStream<WorkflowEventProcessor>;

/// Streaming workflow endpoints take no query parameters.
const NO_QUERY: &[(&str, String)] = &[];

/// Workflows API client.
pub struct WorkflowsApi {
    client: PalaverClient,
}

impl WorkflowsApi {
    pub(crate) fn new(client: PalaverClient) -> Self {
        Self { client }
    }

    /// Run a workflow without streaming.
    pub async fn run(&self, request: RunWorkflowRequest) -> Result<RunWorkflowResponse> {
        self.client.post("v1/workflows/run", &request).await
    }

    /// Run a workflow and stream its events.
    pub async fn stream(&self, request: RunWorkflowRequest) -> Result<WorkflowEventStream> {
        let response = self
            .client
            .post_stream("v1/workflows/stream_run", NO_QUERY, &request)
            .await?;
        EventStream::from_response(response, WorkflowEventProcessor).await
    }

    /// Resume an interrupted workflow run, streaming the continuation.
    pub async fn resume(&self, request: ResumeWorkflowRequest) -> Result<WorkflowEventStream> {
        let response = self
            .client
            .post_stream("v1/workflows/stream_resume", NO_QUERY, &request)
            .await?;
        EventStream::from_response(response, WorkflowEventProcessor).await
    }
}
