//! Datasets API.

use futures::FutureExt;
use serde::Deserialize;

use crate::client::PalaverClient;
use crate::error::Result;
use crate::pagination::{PageFetcher, PageRequest, PageResponse, Paginator};
use crate::types::{Dataset, Document, ListDatasetsRequest};

/// Default page size for dataset listings.
const DEFAULT_DATASET_PAGE_SIZE: usize = 10;

/// Default page size for document listings.
const DEFAULT_DOCUMENT_PAGE_SIZE: usize = 10;

/// Datasets API client.
pub struct DatasetsApi {
    client: PalaverClient,
}

impl DatasetsApi {
    pub(crate) fn new(client: PalaverClient) -> Self {
        Self { client }
    }

    /// List datasets in a workspace, page by page.
    pub async fn list(&self, request: ListDatasetsRequest) -> Result<Paginator<Dataset>> {
        let page_size = if request.page_size == 0 {
            DEFAULT_DATASET_PAGE_SIZE
        } else {
            request.page_size
        };
        let client = self.client.clone();
        let workspace_id = request.workspace_id;
        let name = request.name;

        let fetcher: PageFetcher<Dataset> = Box::new(move |page: PageRequest| {
            let client = client.clone();
            let workspace_id = workspace_id.clone();
            let name = name.clone();
            async move {
                let mut query = vec![
                    ("workspace_id", workspace_id),
                    ("page_num", page.page_num.to_string()),
                    ("page_size", page.page_size.to_string()),
                ];
                if let Some(name) = name {
                    query.push(("name", name));
                }
                let data: ListDatasetsData = client.get_with_query("v1/datasets", &query).await?;
                Ok(PageResponse {
                    // No reported flag; infer from position against the total.
                    has_more: page.page_num * page.page_size < data.total,
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

    /// List the documents in a dataset, page by page.
    pub async fn documents(
        &self,
        dataset_id: &str,
        page_num: usize,
        page_size: usize,
    ) -> Result<Paginator<Document>> {
        let page_size = if page_size == 0 {
            DEFAULT_DOCUMENT_PAGE_SIZE
        } else {
            page_size
        };
        let client = self.client.clone();
        let path = format!("v1/datasets/{dataset_id}/documents");

        let fetcher: PageFetcher<Document> = Box::new(move |page: PageRequest| {
            let client = client.clone();
            let path = path.clone();
            async move {
                let query = [
                    ("page", page.page_num.to_string()),
                    ("size", page.page_size.to_string()),
                ];
                let data: ListDocumentsData = client.get_with_query(&path, &query).await?;
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

        Paginator::by_number(fetcher, page_size, page_num).await
    }
}

#[derive(Debug, Deserialize)]
struct ListDatasetsData {
    #[serde(default)]
    total: usize,
    #[serde(default)]
    items: Vec<Dataset>,
}

#[derive(Debug, Deserialize)]
struct ListDocumentsData {
    #[serde(default)]
    total: usize,
    #[serde(default)]
    items: Vec<Document>,
}
