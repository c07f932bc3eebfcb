//! API endpoint implementations.

mod bots;
mod chat;
mod conversations;
mod datasets;
mod files;
mod workflows;

pub use bots::BotsApi;
pub use chat::{ChatApi, ChatEvent, ChatEventProcessor, ChatEventStream};
pub use conversations::ConversationsApi;
pub use datasets::DatasetsApi;
pub use files::FilesApi;
pub use workflows::{WorkflowEvent, WorkflowEventProcessor, WorkflowEventStream, WorkflowsApi};
