//! Conversations API.

use futures::FutureExt;
use serde::Deserialize;

use crate::client::PalaverClient;
use crate::error::Result;
use crate::pagination::{PageFetcher, PageRequest, PageResponse, Paginator};
use crate::types::{Conversation, CreateConversationRequest, ListMessagesRequest, Message};

/// Default page size for message listings.
const DEFAULT_MESSAGE_LIMIT: usize = 50;

/// Conversations API client.
pub struct ConversationsApi {
    client: PalaverClient,
}

impl ConversationsApi {
    pub(crate) fn new(client: PalaverClient) -> Self {
        Self { client }
    }

    /// Create a conversation.
    pub async fn create(&self, request: CreateConversationRequest) -> Result<Conversation> {
        self.client.post("v1/conversations", &request).await
    }

    /// Get a conversation.
    pub async fn retrieve(&self, conversation_id: &str) -> Result<Conversation> {
        self.client
            .get(&format!("v1/conversations/{conversation_id}"))
            .await
    }

    /// List the messages in a conversation, newest first, by continuation
    /// token.
    pub async fn messages(&self, request: ListMessagesRequest) -> Result<Paginator<Message>> {
        let limit = if request.limit == 0 {
            DEFAULT_MESSAGE_LIMIT
        } else {
            request.limit
        };
        let client = self.client.clone();
        let conversation_id = request.conversation_id;

        let fetcher: PageFetcher<Message> = Box::new(move |page: PageRequest| {
            let client = client.clone();
            let path = format!("v1/conversations/{conversation_id}/messages");
            async move {
                let mut query = vec![("limit", page.page_size.to_string())];
                if let Some(token) = &page.page_token {
                    query.push(("before_id", token.clone()));
                }
                let data: ListMessagesData = client.get_with_query(&path, &query).await?;
                Ok(PageResponse {
                    has_more: data.has_more,
                    total: 0,
                    items: data.items,
                    next_token: data.last_id,
                    log_id: None,
                })
            }
            .boxed()
        });

        Paginator::by_token(fetcher, limit, request.before_id).await
    }
}

#[derive(Debug, Deserialize)]
struct ListMessagesData {
    #[serde(default)]
    has_more: bool,
    #[serde(default)]
    items: Vec<Message>,
    /// ID of the oldest message in this batch; the `before_id` for the next
    /// fetch.
    #[serde(default)]
    last_id: Option<String>,
}
