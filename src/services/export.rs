use crate::config::{ConcurrencyPolicy, ExportConfig};
use crate::domain::{ExtractedPost, PageRecord};
use crate::io::local::{ensure_dir, write_post};
use crate::io::{ImageFetcher, verify_file_stem};
use crate::notion::NotionApi;
use crate::parser::frontmatter::{build_front_matter, cover_image_url, resolve_filename};
use crate::parser::markdown::blocks_to_markdown;
use crate::services::images::{localize_cover, localize_images};
use anyhow::{Context, Result};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::task::JoinSet;
use tracing::{error, info};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExportReport {
    pub listed: usize,
    pub written: usize,
    pub failed: usize,
}

pub struct ExportService {
    notion: Box<dyn NotionApi>,
    fetcher: Box<dyn ImageFetcher>,
    config: Arc<ExportConfig>,
}

impl ExportService {
    pub fn new(
        notion: Box<dyn NotionApi>,
        fetcher: Box<dyn ImageFetcher>,
        config: Arc<ExportConfig>,
    ) -> Self {
        Self {
            notion,
            fetcher,
            config,
        }
    }

    /// Exports every page of the configured database.
    ///
    /// Only preparing the output dirs and listing the database can fail the run. A page
    /// that fails is logged and counted, the other pages carry on.
    pub async fn export_all(self: &Arc<Self>) -> Result<ExportReport> {
        ensure_dir(&self.config.posts_dir)?;
        ensure_dir(&self.config.images_dir)?;

        let pages = self
            .notion
            .query_database(&self.config.database_id)
            .await
            .context("Failed to retrieve pages from database")?;

        let total = pages.len();
        info!(
            "Exporting {} pages ({}, {})",
            total, self.config.profile, self.config.concurrency
        );

        let outcomes = match self.config.concurrency {
            ConcurrencyPolicy::Sequential => self.export_sequential(pages).await,
            ConcurrencyPolicy::Parallel => self.export_parallel(pages).await,
        };

        let written = outcomes.iter().filter(|ok| **ok).count();
        let report = ExportReport {
            listed: total,
            written,
            failed: total - written,
        };

        info!(
            "Export complete: {} of {} pages written, {} failed",
            report.written, report.listed, report.failed
        );
        Ok(report)
    }

    async fn export_sequential(&self, pages: Vec<PageRecord>) -> Vec<bool> {
        let total = pages.len();
        let mut outcomes = Vec::with_capacity(total);
        for (index, page) in pages.iter().enumerate() {
            outcomes.push(self.export_page(index, total, page).await);
        }
        outcomes
    }

    async fn export_parallel(self: &Arc<Self>, pages: Vec<PageRecord>) -> Vec<bool> {
        let total = pages.len();
        let mut tasks = JoinSet::new();

        for (index, page) in pages.into_iter().enumerate() {
            let service = Arc::clone(self);
            tasks.spawn(async move { service.export_page(index, total, &page).await });
        }

        // wait for every sibling, a failing page never cancels the others
        let mut outcomes = Vec::with_capacity(total);
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(ok) => outcomes.push(ok),
                Err(e) => {
                    error!("Page export task aborted: {}", e);
                    outcomes.push(false);
                }
            }
        }
        outcomes
    }

    // page boundary: every error below here stays local to the page
    async fn export_page(&self, index: usize, total: usize, page: &PageRecord) -> bool {
        let filename = resolve_filename(page);
        info!("Processing page {} of {}: {}", index + 1, total, filename);

        match self.extract_page(page, &filename).await {
            Ok(_) => true,
            Err(e) => {
                error!("Error extracting page content for {}: {:#}", filename, e);
                false
            }
        }
    }

    /// Converts one page and writes it to the posts dir, returning the written path.
    pub async fn extract_page(&self, page: &PageRecord, filename: &str) -> Result<PathBuf> {
        verify_file_stem(filename)?;

        let blocks = self
            .notion
            .page_blocks(&page.id)
            .await
            .with_context(|| format!("Failed to load content of page {}", page.id))?;

        let body = blocks_to_markdown(&blocks);
        let body = localize_images(body, filename, self.fetcher.as_ref(), &self.config).await?;

        // required fields are checked before the cover is downloaded
        let mut front_matter = build_front_matter(page, filename, None)?;
        if let Some(url) = cover_image_url(page) {
            front_matter.image =
                Some(localize_cover(url, filename, self.fetcher.as_ref(), &self.config).await?);
        }

        let post = ExtractedPost {
            filename: filename.to_string(),
            front_matter,
            body,
        };

        let path = write_post(&self.config.posts_dir, &post).await?;
        info!(
            "Saved {} ({:016x})",
            path.display(),
            xxhash_rust::xxh3::xxh3_64(post.render().as_bytes())
        );

        Ok(path)
    }
}
