//! HTTP client SDK for the Palaver conversational AI platform.
//!
//! This crate provides a typed async client for the platform API: bots,
//! chat, conversations, workflows, datasets, and files. List endpoints come
//! back as a [`Paginator`] that fetches pages on demand; streaming endpoints
//! come back as an [`EventStream`] of typed events.
//!
//! # Example
//!
//! ```no_run
//! use palaver::{ChatEvent, CreateChatRequest, Message, PalaverClient};
//!
//! # async fn example() -> palaver::Result<()> {
//! let client = PalaverClient::builder()
//!     .auth_token(std::env::var("PALAVER_API_TOKEN").unwrap_or_default())
//!     .build()?;
//!
//! // Stream a chat turn.
//! let request = CreateChatRequest {
//!     bot_id: "bot_id".to_string(),
//!     user_id: "user_id".to_string(),
//!     messages: vec![Message::user_text("Hello!")],
//!     ..Default::default()
//! };
//! let mut events = client.chat().stream(request).await?;
//! while let Some(event) = events.recv().await? {
//!     match event {
//!         ChatEvent::MessageDelta(message) => print!("{}", message.content),
//!         ChatEvent::Done { .. } => println!(),
//!         _ => {}
//!     }
//! }
//! events.close();
//!
//! // Iterate a paginated listing.
//! let mut bots = client.bots().list(Default::default()).await?;
//! while bots.next().await {
//!     if let Some(bot) = bots.current() {
//!         println!("{}: {}", bot.bot_id, bot.name);
//!     }
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # API Coverage
//!
//! - **Bots**: list published bots, retrieve configuration
//! - **Chat**: create turns, stream events, poll to completion, tool outputs
//! - **Conversations**: create, retrieve, paginated message history
//! - **Workflows**: run, stream, resume after interrupts
//! - **Datasets**: list datasets and their documents
//! - **Files**: upload and retrieve

pub mod api;
pub mod auth;
pub mod client;
pub mod error;
pub mod pagination;
pub mod stream;
pub mod types;

pub use api::{
    BotsApi, ChatApi, ChatEvent, ChatEventStream, ConversationsApi, DatasetsApi, FilesApi,
    WorkflowEvent, WorkflowEventStream, WorkflowsApi,
};
pub use auth::{StaticToken, TokenProvider};
pub use client::{ClientBuilder, PalaverClient};
pub use error::{Error, Result};
pub use pagination::{PageFetcher, PageRequest, PageResponse, Paginator, DEFAULT_PAGE_SIZE};
pub use stream::{EventProcessor, EventStream, LineReader};
pub use types::*;
