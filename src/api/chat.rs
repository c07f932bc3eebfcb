//! Chat API and chat-shape stream events.

use std::time::Duration;

use async_trait::async_trait;
use tokio::time::Instant;

use crate::client::PalaverClient;
use crate::error::{Error, Result};
use crate::stream::{EventProcessor, EventStream, LineReader};
use crate::types::{
    Chat, ChatPoll, ChatStatus, CreateChatRequest, Message, SubmitToolOutputsRequest, WorkflowDebug,
};

/// A decoded chat stream event.
///
/// Variants mirror the server's event tags; tags this client does not know
/// come through as [`Unrecognized`](ChatEvent::Unrecognized) so new server
/// events never break decoding.
#[derive(Debug, Clone)]
pub enum ChatEvent {
    /// The chat turn was created.
    ChatCreated(Chat),
    /// The bot started processing.
    ChatInProgress(Chat),
    /// The chat turn completed.
    ChatCompleted(Chat),
    /// The chat turn failed.
    ChatFailed(Chat),
    /// The turn is interrupted pending tool outputs.
    ChatRequiresAction(Chat),
    /// Incremental answer content.
    MessageDelta(Message),
    /// A message finished.
    MessageCompleted(Message),
    /// Incremental audio content.
    AudioDelta(Message),
    /// The stream ended normally.
    Done {
        /// Debug info the server may attach to the terminal event.
        debug: Option<WorkflowDebug>,
    },
    /// An event tag this client does not recognize.
    Unrecognized {
        /// The raw event tag.
        event: String,
    },
}

impl ChatEvent {
    /// Whether this event terminates the stream.
    pub fn is_done(&self) -> bool {
        matches!(self, ChatEvent::Done { .. })
    }

    /// The chat payload, for lifecycle events.
    pub fn chat(&self) -> Option<&Chat> {
        match self {
            ChatEvent::ChatCreated(chat)
            | ChatEvent::ChatInProgress(chat)
            | ChatEvent::ChatCompleted(chat)
            | ChatEvent::ChatFailed(chat)
            | ChatEvent::ChatRequiresAction(chat) => Some(chat),
            _ => None,
        }
    }

    /// The message payload, for message-bearing events.
    pub fn message(&self) -> Option<&Message> {
        match self {
            ChatEvent::MessageDelta(message)
            | ChatEvent::MessageCompleted(message)
            | ChatEvent::AudioDelta(message) => Some(message),
            _ => None,
        }
    }
}

/// Decode one chat event from its tag and data payload.
///
/// An `error`-tagged event is a stream failure, not an event: the data string
/// becomes the error message.
fn parse_chat_event(event: &str, data: &str) -> Result<ChatEvent> {
    match event {
        "done" => {
            let mut debug = None;
            if !data.is_empty() && data != "[DONE]" {
                // The trailing payload is optional debug info; a payload we
                // can't read is not worth failing a finished stream over.
                match serde_json::from_str::<WorkflowDebug>(data) {
                    Ok(parsed) => debug = Some(parsed),
                    Err(err) => {
                        tracing::warn!(%err, data, "ignoring unparseable payload on done event")
                    }
                }
            }
            Ok(ChatEvent::Done { debug })
        }
        "error" => Err(Error::Stream(data.to_string())),
        "conversation.message.delta" => Ok(ChatEvent::MessageDelta(serde_json::from_str(data)?)),
        "conversation.message.completed" => {
            Ok(ChatEvent::MessageCompleted(serde_json::from_str(data)?))
        }
        "conversation.audio.delta" => Ok(ChatEvent::AudioDelta(serde_json::from_str(data)?)),
        "conversation.chat.created" => Ok(ChatEvent::ChatCreated(serde_json::from_str(data)?)),
        "conversation.chat.in_progress" => {
            Ok(ChatEvent::ChatInProgress(serde_json::from_str(data)?))
        }
        "conversation.chat.completed" => Ok(ChatEvent::ChatCompleted(serde_json::from_str(data)?)),
        "conversation.chat.failed" => Ok(ChatEvent::ChatFailed(serde_json::from_str(data)?)),
        "conversation.chat.requires_action" => {
            Ok(ChatEvent::ChatRequiresAction(serde_json::from_str(data)?))
        }
        other => Ok(ChatEvent::Unrecognized {
            event: other.to_string(),
        }),
    }
}

/// Chat events are framed as an `event:` line followed by a `data:` line.
pub struct ChatEventProcessor;

#[async_trait]
impl EventProcessor for ChatEventProcessor {
    type Event = ChatEvent;

    async fn process(
        &mut self,
        line: &str,
        lines: &mut LineReader,
    ) -> Result<Option<(ChatEvent, bool)>> {
        let Some(event) = line.strip_prefix("event:") else {
            return Ok(None);
        };
        let event = event.trim();

        let data_line = lines
            .next_line()
            .await?
            .ok_or_else(|| Error::Stream("stream ended before data line".to_string()))?;
        let data = data_line
            .strip_prefix("data:")
            .ok_or_else(|| Error::Stream(format!("expected data line, got: {data_line}")))?
            .trim();

        let event = parse_chat_event(event, data)?;
        let done = event.is_done();
        Ok(Some((event, done)))
    }
}

/// Stream of chat events.
pub type ChatEventStream = EventStream<ChatEventProcessor>;

/// Chat API client.
pub struct ChatApi {
    client: PalaverClient,
}

impl ChatApi {
    pub(crate) fn new(client: PalaverClient) -> Self {
        Self { client }
    }

    /// Start a chat turn without streaming. Poll
    /// [`retrieve`](ChatApi::retrieve) for completion, or use
    /// [`create_and_poll`](ChatApi::create_and_poll).
    pub async fn create(&self, mut request: CreateChatRequest) -> Result<Chat> {
        request.stream = Some(false);
        request.auto_save_history = Some(true);
        let query = conversation_query(request.conversation_id.as_deref());
        self.client.post_with_query("v1/chat", &query, &request).await
    }

    /// Start a chat turn and stream its events.
    pub async fn stream(&self, mut request: CreateChatRequest) -> Result<ChatEventStream> {
        request.stream = Some(true);
        let query = conversation_query(request.conversation_id.as_deref());
        let response = self.client.post_stream("v1/chat", &query, &request).await?;
        EventStream::from_response(response, ChatEventProcessor).await
    }

    /// Get the current state of a chat turn.
    pub async fn retrieve(&self, conversation_id: &str, chat_id: &str) -> Result<Chat> {
        self.client
            .get_with_query(
                "v1/chat/retrieve",
                &[("conversation_id", conversation_id), ("chat_id", chat_id)],
            )
            .await
    }

    /// Cancel an in-progress chat turn.
    pub async fn cancel(&self, conversation_id: &str, chat_id: &str) -> Result<Chat> {
        self.client
            .post(
                "v1/chat/cancel",
                &serde_json::json!({
                    "conversation_id": conversation_id,
                    "chat_id": chat_id,
                }),
            )
            .await
    }

    /// Submit tool outputs for an interrupted chat turn.
    pub async fn submit_tool_outputs(
        &self,
        mut request: SubmitToolOutputsRequest,
    ) -> Result<Chat> {
        request.stream = Some(false);
        let query = [
            ("conversation_id", request.conversation_id.clone()),
            ("chat_id", request.chat_id.clone()),
        ];
        self.client
            .post_with_query("v1/chat/submit_tool_outputs", &query, &request)
            .await
    }

    /// Submit tool outputs and stream the continuation.
    pub async fn stream_submit_tool_outputs(
        &self,
        mut request: SubmitToolOutputsRequest,
    ) -> Result<ChatEventStream> {
        request.stream = Some(true);
        let query = [
            ("conversation_id", request.conversation_id.clone()),
            ("chat_id", request.chat_id.clone()),
        ];
        let response = self
            .client
            .post_stream("v1/chat/submit_tool_outputs", &query, &request)
            .await?;
        EventStream::from_response(response, ChatEventProcessor).await
    }

    /// List the messages produced by a chat turn.
    pub async fn messages(&self, conversation_id: &str, chat_id: &str) -> Result<Vec<Message>> {
        self.client
            .get_with_query(
                "v1/chat/messages",
                &[("conversation_id", conversation_id), ("chat_id", chat_id)],
            )
            .await
    }

    /// Start a chat turn and poll until it reaches a terminal status,
    /// then fetch its messages.
    ///
    /// Polls once per second. When `timeout_secs` elapses first, the turn is
    /// cancelled and the cancelled state returned. Timeout enforcement lives
    /// here, in calling code; the transport has no deadline of its own.
    pub async fn create_and_poll(
        &self,
        request: CreateChatRequest,
        timeout_secs: Option<u64>,
    ) -> Result<ChatPoll> {
        let mut chat = self.create(request).await?;
        let conversation_id = chat.conversation_id.clone();
        let started = Instant::now();

        while !is_terminal(chat.status) {
            tokio::time::sleep(Duration::from_secs(1)).await;
            if let Some(limit) = timeout_secs {
                if started.elapsed() >= Duration::from_secs(limit) {
                    tracing::info!(chat_id = %chat.id, limit, "chat polling timed out, cancelling");
                    chat = self.cancel(&conversation_id, &chat.id).await?;
                    break;
                }
            }
            chat = self.retrieve(&conversation_id, &chat.id).await?;
        }

        let messages = self.messages(&conversation_id, &chat.id).await?;
        Ok(ChatPoll { chat, messages })
    }
}

fn is_terminal(status: ChatStatus) -> bool {
    matches!(
        status,
        ChatStatus::Completed
            | ChatStatus::Failed
            | ChatStatus::Cancelled
            | ChatStatus::RequiresAction
    )
}

fn conversation_query(conversation_id: Option<&str>) -> Vec<(&'static str, String)> {
    match conversation_id {
        Some(id) => vec![("conversation_id", id.to_string())],
        None => Vec::new(),
    }
}
