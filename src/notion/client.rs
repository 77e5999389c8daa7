use crate::config::ExportConfig;
use crate::domain::{Block, PageRecord};
use crate::notion::NotionApi;
use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::future::Future;
use std::pin::Pin;
use tracing::{debug, warn};

pub const NOTION_VERSION: &str = "2022-06-28";
const BLOCK_PAGE_SIZE: u32 = 100;

#[derive(Deserialize)]
struct QueryResponse {
    results: Vec<PageRecord>,
    #[serde(default)]
    has_more: bool,
}

#[derive(Deserialize)]
struct BlockChildrenResponse {
    results: Vec<Block>,
    #[serde(default)]
    has_more: bool,
    #[serde(default)]
    next_cursor: Option<String>,
}

#[derive(Deserialize)]
struct ErrorResponse {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

pub struct HttpNotionClient {
    pub client: Client,
    pub base_url: String,
    pub secret: String,
}

impl HttpNotionClient {
    pub fn new(base_url: String, secret: String) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            secret,
        }
    }

    pub fn from_config(config: &ExportConfig) -> Self {
        Self::new(config.api_url.clone(), config.notion_secret.clone())
    }

    // decodes a success body, or turns Notion's error envelope into a readable error
    async fn decode<T: DeserializeOwned>(response: Response, what: &str) -> Result<T> {
        let status = response.status();
        if !status.is_success() {
            let detail = response
                .json::<ErrorResponse>()
                .await
                .ok()
                .map(|e| {
                    format!(
                        "{}: {}",
                        e.code.unwrap_or_default(),
                        e.message.unwrap_or_default()
                    )
                })
                .unwrap_or_default();
            bail!("Notion rejected {}. Status: {} {}", what, status, detail);
        }

        response
            .json::<T>()
            .await
            .with_context(|| format!("Failed to decode Notion response for {}", what))
    }

    // one level of children, following the cursor until the listing is exhausted
    async fn block_children(&self, block_id: &str) -> Result<Vec<Block>> {
        let mut blocks = Vec::new();
        let mut cursor: Option<String> = None;

        loop {
            let mut url = format!(
                "{}/blocks/{}/children?page_size={}",
                self.base_url, block_id, BLOCK_PAGE_SIZE
            );
            if let Some(start) = &cursor {
                url.push_str(&format!("&start_cursor={}", start));
            }

            let response = self
                .client
                .get(&url)
                .bearer_auth(&self.secret)
                .header("Notion-Version", NOTION_VERSION)
                .send()
                .await
                .with_context(|| format!("Failed to connect to Notion for block {}", block_id))?;

            let page: BlockChildrenResponse =
                Self::decode(response, &format!("children of block {}", block_id)).await?;
            blocks.extend(page.results);

            match (page.has_more, page.next_cursor) {
                (true, Some(next)) => cursor = Some(next),
                _ => break,
            }
        }

        Ok(blocks)
    }

    fn block_tree<'a>(
        &'a self,
        block_id: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<Block>>> + Send + 'a>> {
        Box::pin(async move {
            let mut blocks = self.block_children(block_id).await?;
            for block in blocks.iter_mut() {
                if block.descends_inline() {
                    let id = block.id.clone();
                    block.children = self.block_tree(&id).await?;
                }
            }
            Ok(blocks)
        })
    }
}

#[async_trait]
impl NotionApi for HttpNotionClient {
    async fn query_database(&self, database_id: &str) -> Result<Vec<PageRecord>> {
        let url = format!("{}/databases/{}/query", self.base_url, database_id);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.secret)
            .header("Notion-Version", NOTION_VERSION)
            .json(&serde_json::json!({}))
            .send()
            .await
            .with_context(|| format!("Failed to connect to Notion for database {}", database_id))?;

        let query: QueryResponse =
            Self::decode(response, &format!("query of database {}", database_id)).await?;

        // only the first batch is exported
        if query.has_more {
            warn!(
                "Database {} has more rows than one query returns, the rest are not exported",
                database_id
            );
        }

        debug!("Database {} returned {} pages", database_id, query.results.len());
        Ok(query.results)
    }

    async fn page_blocks(&self, page_id: &str) -> Result<Vec<Block>> {
        self.block_tree(page_id).await
    }
}
