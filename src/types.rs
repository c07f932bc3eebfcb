//! Request and response types for the Palaver API.
//!
//! These types mirror the platform's wire contract.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// ─────────────────────────────────────────────────────────────────────────────
// Messages
// ─────────────────────────────────────────────────────────────────────────────

/// Who sent a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageRole {
    /// Sent by the end user.
    User,
    /// Sent by the bot.
    Assistant,
    /// Role the client does not recognize.
    #[serde(other)]
    Unknown,
}

impl Default for MessageRole {
    fn default() -> Self {
        MessageRole::Unknown
    }
}

/// What kind of message this is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageType {
    /// A user question.
    Question,
    /// The bot's answer.
    Answer,
    /// Intermediate function-call record.
    FunctionCall,
    /// Tool execution output.
    ToolOutput,
    /// Tool response content.
    ToolResponse,
    /// Follow-up suggestion.
    FollowUp,
    /// Partial content of a streamed answer.
    Verbose,
    #[serde(other)]
    Unknown,
}

impl Default for MessageType {
    fn default() -> Self {
        MessageType::Unknown
    }
}

/// Encoding of the message content field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageContentType {
    /// Plain text.
    Text,
    /// JSON-serialized list of multimodal objects.
    ObjectString,
    /// Message card payload.
    Card,
    /// Audio chunk (base64 in `content`).
    Audio,
    #[serde(other)]
    Unknown,
}

impl Default for MessageContentType {
    fn default() -> Self {
        MessageContentType::Text
    }
}

/// A message within a conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    /// The entity that sent this message.
    #[serde(default)]
    pub role: MessageRole,
    /// The type of message.
    #[serde(rename = "type", default)]
    pub message_type: MessageType,
    /// The content of the message. Plain text, or JSON for multimodal and
    /// card content.
    pub content: String,
    /// The encoding of `content`.
    #[serde(default)]
    pub content_type: MessageContentType,
    /// Caller-supplied key-value metadata, echoed back on retrieval.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub meta_data: HashMap<String, String>,
    /// Message ID.
    #[serde(default)]
    pub id: String,
    /// Conversation the message belongs to.
    #[serde(default)]
    pub conversation_id: String,
    /// Context section within the conversation history.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub section_id: String,
    /// Bot the message was addressed to.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub bot_id: String,
    /// Chat turn the message was produced in.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub chat_id: String,
    /// Creation time (Unix seconds).
    #[serde(default)]
    pub created_at: i64,
    /// Last update time (Unix seconds).
    #[serde(default)]
    pub updated_at: i64,
}

impl Message {
    /// Build a plain-text user question.
    pub fn user_text(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            message_type: MessageType::Question,
            content: content.into(),
            content_type: MessageContentType::Text,
            meta_data: HashMap::new(),
            id: String::new(),
            conversation_id: String::new(),
            section_id: String::new(),
            bot_id: String::new(),
            chat_id: String::new(),
            created_at: 0,
            updated_at: 0,
        }
    }

    /// Build a plain-text assistant answer.
    pub fn assistant_text(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Assistant,
            message_type: MessageType::Answer,
            ..Self::user_text(content)
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Chat
// ─────────────────────────────────────────────────────────────────────────────

/// The running status of a chat turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChatStatus {
    /// The chat has been created.
    Created,
    /// The bot is processing.
    InProgress,
    /// Processing finished and the turn ended.
    Completed,
    /// The turn failed.
    Failed,
    /// Interrupted; tool outputs must be submitted to continue.
    RequiresAction,
    /// Cancelled by the user.
    #[serde(rename = "canceled")]
    Cancelled,
    #[serde(other)]
    Unknown,
}

/// A chat turn.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chat {
    /// Chat ID.
    pub id: String,
    /// Conversation the chat belongs to.
    pub conversation_id: String,
    /// Bot handling the chat.
    #[serde(default)]
    pub bot_id: String,
    /// Creation time (Unix seconds).
    #[serde(default)]
    pub created_at: i64,
    /// Completion time (Unix seconds), when finished.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<i64>,
    /// Failure time (Unix seconds), when failed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failed_at: Option<i64>,
    /// Caller-supplied metadata.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub meta_data: HashMap<String, String>,
    /// Error details for failed turns.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_error: Option<ChatError>,
    /// Current status.
    pub status: ChatStatus,
    /// What the caller must do to continue an interrupted turn.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required_action: Option<RequiredAction>,
    /// Token consumption for the turn.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<ChatUsage>,
}

/// Error detail attached to a failed chat.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatError {
    /// Error code; 0 means success.
    pub code: i64,
    /// Error message.
    pub msg: String,
}

/// Token usage for a chat turn.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChatUsage {
    /// Total tokens consumed, input plus output.
    pub token_count: i64,
    /// Output tokens.
    pub output_count: i64,
    /// Input tokens.
    pub input_count: i64,
}

/// Action required to continue an interrupted chat.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequiredAction {
    /// Action kind; currently always `submit_tool_outputs`.
    #[serde(rename = "type")]
    pub action_type: String,
    /// Tool results the caller must submit.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub submit_tool_outputs: Option<SubmitToolOutputs>,
}

/// Tool calls awaiting results.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitToolOutputs {
    /// The pending calls.
    pub tool_calls: Vec<ToolCall>,
}

/// One pending tool call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCall {
    /// ID to report the result under.
    pub id: String,
    /// Tool kind; currently always `function`.
    #[serde(rename = "type")]
    pub call_type: String,
    /// The function to execute.
    pub function: ToolCallFunction,
}

/// Function details of a tool call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCallFunction {
    /// Function name.
    pub name: String,
    /// JSON-encoded arguments.
    pub arguments: String,
}

/// A tool execution result reported back to the server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolOutput {
    /// The tool call this result answers.
    pub tool_call_id: String,
    /// The execution result.
    pub output: String,
}

/// Debug info optionally attached to terminal stream events.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowDebug {
    /// URL of the debug page for this run.
    pub debug_url: String,
}

/// Request to start a chat turn.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CreateChatRequest {
    /// Conversation the chat takes place in. Sent as a query parameter.
    #[serde(skip)]
    pub conversation_id: Option<String>,
    /// The bot to chat with.
    pub bot_id: String,
    /// The end user on whose behalf the call is made.
    pub user_id: String,
    /// Additional messages for this turn; the last one is the query.
    #[serde(rename = "additional_messages", skip_serializing_if = "Vec::is_empty")]
    pub messages: Vec<Message>,
    /// Set by the SDK depending on the calling method.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stream: Option<bool>,
    /// Custom variables substituted into the bot's prompt.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub custom_variables: HashMap<String, String>,
    /// Whether to save this turn into the conversation history.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_save_history: Option<bool>,
    /// Caller-supplied metadata.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub meta_data: HashMap<String, String>,
}

/// Request to submit tool outputs for an interrupted chat.
#[derive(Debug, Clone, Serialize)]
pub struct SubmitToolOutputsRequest {
    /// Conversation the chat takes place in. Sent as a query parameter.
    #[serde(skip)]
    pub conversation_id: String,
    /// The interrupted chat. Sent as a query parameter.
    #[serde(skip)]
    pub chat_id: String,
    /// The tool results.
    pub tool_outputs: Vec<ToolOutput>,
    /// Set by the SDK depending on the calling method.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stream: Option<bool>,
}

/// Final state of a polled chat: the finished turn plus its messages.
#[derive(Debug, Clone)]
pub struct ChatPoll {
    /// The finished (or cancelled) chat.
    pub chat: Chat,
    /// All messages produced by the turn.
    pub messages: Vec<Message>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Bots
// ─────────────────────────────────────────────────────────────────────────────

/// Summary info for a published bot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BotSummary {
    /// Bot ID.
    pub bot_id: String,
    /// Display name.
    #[serde(rename = "bot_name")]
    pub name: String,
    /// Description shown to users.
    #[serde(default)]
    pub description: String,
    /// Avatar URL.
    #[serde(default)]
    pub icon_url: String,
    /// Last publish time (Unix seconds, as reported).
    #[serde(default)]
    pub publish_time: String,
}

/// Full bot configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bot {
    /// Bot ID.
    pub bot_id: String,
    /// Display name.
    pub name: String,
    /// Description shown to users.
    #[serde(default)]
    pub description: String,
    /// Avatar URL.
    #[serde(default)]
    pub icon_url: String,
    /// Creation time (Unix seconds).
    #[serde(default)]
    pub create_time: i64,
    /// Last update time (Unix seconds).
    #[serde(default)]
    pub update_time: i64,
    /// Current version tag.
    #[serde(default)]
    pub version: String,
    /// System prompt.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt_info: Option<BotPromptInfo>,
    /// Opening dialog configuration.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub onboarding_info: Option<BotOnboardingInfo>,
}

/// A bot's system prompt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BotPromptInfo {
    /// Prompt text.
    pub prompt: String,
}

/// A bot's opening dialog.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BotOnboardingInfo {
    /// Opening message.
    #[serde(default)]
    pub prologue: String,
    /// Suggested first questions.
    #[serde(default)]
    pub suggested_questions: Vec<String>,
}

/// Query for listing published bots in a workspace.
#[derive(Debug, Clone, Default)]
pub struct ListBotsRequest {
    /// Workspace to list from.
    pub workspace_id: String,
    /// 1-based page to start at; 0 starts at page 1.
    pub page_num: usize,
    /// Items per page; 0 uses the default of 20.
    pub page_size: usize,
}

// ─────────────────────────────────────────────────────────────────────────────
// Conversations
// ─────────────────────────────────────────────────────────────────────────────

/// A conversation: an ordered message history shared across chat turns.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Conversation {
    /// Conversation ID.
    pub id: String,
    /// Creation time (Unix seconds).
    #[serde(default)]
    pub created_at: i64,
    /// Caller-supplied metadata.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub meta_data: HashMap<String, String>,
    /// Latest context section.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub last_section_id: String,
}

/// Request to create a conversation.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CreateConversationRequest {
    /// Initial messages to seed the history with.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub messages: Vec<Message>,
    /// Caller-supplied metadata.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub meta_data: HashMap<String, String>,
    /// Bot to bind the conversation to.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bot_id: Option<String>,
}

/// Query for listing messages in a conversation.
#[derive(Debug, Clone, Default)]
pub struct ListMessagesRequest {
    /// Conversation to list from.
    pub conversation_id: String,
    /// Items per page; 0 uses the default of 50.
    pub limit: usize,
    /// Continuation token: list messages before this message ID.
    pub before_id: Option<String>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Workflows
// ─────────────────────────────────────────────────────────────────────────────

/// Request to run a workflow.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunWorkflowRequest {
    /// Workflow to run.
    pub workflow_id: String,
    /// Input parameters keyed by the workflow's input names.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub parameters: HashMap<String, serde_json::Value>,
    /// Bot context for workflows that reference bot variables.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bot_id: Option<String>,
    /// Run asynchronously and poll for the result instead of waiting.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_async: Option<bool>,
}

/// Result of a non-streaming workflow run.
#[derive(Debug, Clone, Deserialize)]
pub struct RunWorkflowResponse {
    /// Execution output, usually JSON-serialized.
    #[serde(default)]
    pub data: String,
    /// URL of the debug page for this run.
    #[serde(default)]
    pub debug_url: String,
    /// Execution id for async runs.
    #[serde(default)]
    pub execute_id: String,
}

/// Request to resume an interrupted workflow run.
#[derive(Debug, Clone, Serialize)]
pub struct ResumeWorkflowRequest {
    /// Workflow to resume.
    pub workflow_id: String,
    /// The interrupt event being answered.
    pub event_id: String,
    /// Data answering the interrupt, e.g. the user's reply.
    pub resume_data: String,
    /// The interrupt type, echoed from the interrupt event.
    pub interrupt_type: i64,
}

/// A streamed message produced by a workflow node.
#[derive(Debug, Clone, Deserialize)]
pub struct WorkflowMessage {
    /// Message content chunk.
    pub content: String,
    /// Title of the producing node.
    #[serde(default)]
    pub node_title: String,
    /// Sequence number of the chunk within the node, as reported.
    #[serde(default)]
    pub node_seq_id: String,
    /// Whether this is the node's final chunk.
    #[serde(default)]
    pub node_is_finish: bool,
}

/// A workflow interrupt that must be answered via resume.
#[derive(Debug, Clone, Deserialize)]
pub struct WorkflowInterrupt {
    /// Interrupt detail.
    pub interrupt_data: WorkflowInterruptData,
    /// Title of the interrupting node.
    #[serde(default)]
    pub node_title: String,
}

/// Interrupt detail carried in an interrupt event.
#[derive(Debug, Clone, Deserialize)]
pub struct WorkflowInterruptData {
    /// Event id to pass back when resuming.
    pub event_id: String,
    /// Interrupt type to echo back when resuming.
    #[serde(rename = "type")]
    pub interrupt_type: i64,
}

/// A workflow-level error event payload.
#[derive(Debug, Clone, Deserialize)]
pub struct WorkflowError {
    /// Error code; 0 means success.
    pub error_code: i64,
    /// Error message.
    pub error_message: String,
}

// ─────────────────────────────────────────────────────────────────────────────
// Datasets
// ─────────────────────────────────────────────────────────────────────────────

/// A knowledge dataset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dataset {
    /// Dataset ID.
    pub dataset_id: String,
    /// Display name.
    pub name: String,
    /// Description.
    #[serde(default)]
    pub description: String,
    /// Number of documents in the dataset.
    #[serde(default)]
    pub doc_count: usize,
    /// Creation time (Unix seconds).
    #[serde(default)]
    pub create_time: i64,
}

/// Query for listing datasets in a workspace.
#[derive(Debug, Clone, Default)]
pub struct ListDatasetsRequest {
    /// Workspace to list from.
    pub workspace_id: String,
    /// Filter by dataset name, when set.
    pub name: Option<String>,
    /// 1-based page to start at; 0 starts at page 1.
    pub page_num: usize,
    /// Items per page; 0 uses the default of 10.
    pub page_size: usize,
}

/// A document inside a dataset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    /// Document ID.
    pub document_id: String,
    /// File name.
    pub name: String,
    /// Character count.
    #[serde(default)]
    pub char_count: usize,
    /// Processing status, as reported.
    #[serde(default)]
    pub status: i64,
    /// Creation time (Unix seconds).
    #[serde(default)]
    pub create_time: i64,
    /// Last update time (Unix seconds).
    #[serde(default)]
    pub update_time: i64,
}

// ─────────────────────────────────────────────────────────────────────────────
// Files
// ─────────────────────────────────────────────────────────────────────────────

/// An uploaded file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileInfo {
    /// File ID.
    pub id: String,
    /// Original file name.
    #[serde(default)]
    pub file_name: String,
    /// Size in bytes.
    #[serde(default)]
    pub bytes: u64,
    /// Upload time (Unix seconds).
    #[serde(default)]
    pub created_at: i64,
}
