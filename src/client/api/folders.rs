//! Scan folders

use super::ApiContext;
use crate::client::payload::{self, Record};
use crate::error::Result;

/// Folder operations
#[derive(Clone, Copy)]
pub struct FoldersApi<'a> {
    ctx: ApiContext<'a>,
}

impl<'a> FoldersApi<'a> {
    pub fn new(ctx: ApiContext<'a>) -> Self {
        Self { ctx }
    }

    pub async fn list(&self) -> Result<Vec<Record>> {
        let raw = self.ctx.transport.get("/was/v2/folders").await?;
        Ok(payload::records_under(raw, &["items", "folders"]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::api::test_support;

    #[tokio::test]
    async fn test_list_folders() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/was/v2/folders")
            .with_body(r#"{"folders":[{"folder_id":"f1","name":"Prod"}]}"#)
            .create_async()
            .await;

        let (transport, _) = test_support::transport(&server.url());
        let folders = FoldersApi::new(ApiContext::new(&transport, None))
            .list()
            .await
            .unwrap();
        assert_eq!(folders[0]["name"], "Prod");
    }
}
