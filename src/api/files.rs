//! Files API.

use crate::client::PalaverClient;
use crate::error::Result;
use crate::types::FileInfo;

/// Files API client.
pub struct FilesApi {
    client: PalaverClient,
}

impl FilesApi {
    pub(crate) fn new(client: PalaverClient) -> Self {
        Self { client }
    }

    /// Upload a file for use in messages and datasets.
    pub async fn upload(&self, file_name: impl Into<String>, content: Vec<u8>) -> Result<FileInfo> {
        self.client
            .upload("v1/files/upload", file_name.into(), content)
            .await
    }

    /// Get an uploaded file's metadata.
    pub async fn retrieve(&self, file_id: &str) -> Result<FileInfo> {
        self.client.get(&format!("v1/files/{file_id}")).await
    }
}
