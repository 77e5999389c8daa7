use crate::domain::{Block, PageRecord};
use anyhow::Result;
use async_trait::async_trait;

pub mod client;

// the exporter only ever needs two things from the workspace: the rows of one database
// and the content tree of a page
#[async_trait]
pub trait NotionApi: Send + Sync {
    async fn query_database(&self, database_id: &str) -> Result<Vec<PageRecord>>;
    async fn page_blocks(&self, page_id: &str) -> Result<Vec<Block>>;
}
