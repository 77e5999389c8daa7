use anyhow::{Result, bail};
use async_trait::async_trait;
use std::path::{Component, Path};

pub mod local;

#[async_trait]
pub trait ImageFetcher: Send + Sync {
    /// Downloads `url` into the file at `dest`, replacing whatever was there.
    async fn fetch(&self, url: &str, dest: &Path) -> Result<()>;
}

// page-derived names become file names inside the output dirs, so they must stay a
// single normal path component
pub fn verify_file_stem(stem: &str) -> Result<&str> {
    let mut components = Path::new(stem).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) if !stem.contains(['/', '\\']) => Ok(stem),
        _ => bail!("Refusing to use '{}' as a file name: not a single path component", stem),
    }
}
