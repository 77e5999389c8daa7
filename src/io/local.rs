use crate::domain::ExtractedPost;
use crate::io::{ImageFetcher, verify_file_stem};
use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use reqwest::Client;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;

pub struct HttpImageFetcher {
    pub client: Client,
}

impl HttpImageFetcher {
    pub fn new() -> Self {
        Self {
            client: Client::new(),
        }
    }
}

#[async_trait]
impl ImageFetcher for HttpImageFetcher {
    async fn fetch(&self, url: &str, dest: &Path) -> Result<()> {
        let mut response = self
            .client
            .get(url)
            .send()
            .await
            .with_context(|| format!("Failed to request image {}", url))?;

        if !response.status().is_success() {
            bail!("Image host rejected {}. Status: {}", url, response.status());
        }

        let mut file = tokio::fs::File::create(dest)
            .await
            .with_context(|| format!("Failed to create {}", dest.display()))?;

        // stream chunk by chunk, the body is never held in memory as a whole
        while let Some(chunk) = response
            .chunk()
            .await
            .with_context(|| format!("Failed to read image body from {}", url))?
        {
            file.write_all(&chunk)
                .await
                .with_context(|| format!("Failed to write {}", dest.display()))?;
        }

        file.flush()
            .await
            .with_context(|| format!("Failed to flush {}", dest.display()))?;

        Ok(())
    }
}

// idempotent, called once for each output dir before any page is processed
pub fn ensure_dir(dir: &Path) -> Result<()> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create directory {}", dir.display()))
}

/// Writes the post to `<posts_dir>/<filename>.md`, overwriting any earlier export.
pub async fn write_post(posts_dir: &Path, post: &ExtractedPost) -> Result<PathBuf> {
    verify_file_stem(&post.filename)?;
    let path = posts_dir.join(post.file_name());

    tokio::fs::write(&path, post.render())
        .await
        .with_context(|| format!("Failed to write post {}", path.display()))?;

    Ok(path)
}
