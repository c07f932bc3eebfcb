//! Bots API.

use futures::FutureExt;
use serde::Deserialize;

use crate::client::PalaverClient;
use crate::error::Result;
use crate::pagination::{PageFetcher, PageRequest, PageResponse, Paginator, DEFAULT_PAGE_SIZE};
use crate::types::{Bot, BotSummary, ListBotsRequest};

/// Bots API client.
pub struct BotsApi {
    client: PalaverClient,
}

impl BotsApi {
    pub(crate) fn new(client: PalaverClient) -> Self {
        Self { client }
    }

    /// List published bots in a workspace, page by page.
    pub async fn list(&self, request: ListBotsRequest) -> Result<Paginator<BotSummary>> {
        let page_size = if request.page_size == 0 {
            DEFAULT_PAGE_SIZE
        } else {
            request.page_size
        };
        let client = self.client.clone();
        let workspace_id = request.workspace_id;

        let fetcher: PageFetcher<BotSummary> = Box::new(move |page: PageRequest| {
            let client = client.clone();
            let workspace_id = workspace_id.clone();
            async move {
                let query = [
                    ("workspace_id", workspace_id),
                    ("page_num", page.page_num.to_string()),
                    ("page_size", page.page_size.to_string()),
                ];
                let data: ListBotsData = client.get_with_query("v1/bots", &query).await?;
                Ok(PageResponse {
                    // The endpoint reports no has_more flag; a full page
                    // means there may be another one.
                    has_more: data.items.len() >= page.page_size,
                    total: data.total,
                    items: data.items,
                    next_token: None,
                    log_id: None,
                })
            }
            .boxed()
        });

        Paginator::by_number(fetcher, page_size, request.page_num).await
    }

    /// Get a bot's full configuration.
    pub async fn retrieve(&self, bot_id: &str) -> Result<Bot> {
        self.client.get(&format!("v1/bots/{bot_id}")).await
    }
}

#[derive(Debug, Deserialize)]
struct ListBotsData {
    #[serde(default)]
    total: usize,
    #[serde(default)]
    items: Vec<BotSummary>,
}
