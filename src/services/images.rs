use crate::config::ExportConfig;
use crate::io::ImageFetcher;
use anyhow::{Context, Result};
use regex::Regex;
use std::sync::LazyLock;
use tracing::debug;

// image markup pointing at an https resource. the alt text stays inside one bracket pair,
// relative, http and data urls are not matched
static REMOTE_IMAGE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"!\[[^\]]*\]\((https://[^)\s]+)\)").unwrap());

/// Remote image URLs in order of appearance, repeats included.
pub fn find_remote_images(markdown: &str) -> Vec<String> {
    REMOTE_IMAGE_RE
        .captures_iter(markdown)
        .filter_map(|caps| caps.get(1).map(|m| m.as_str().to_string()))
        .collect()
}

// extension of the url's last path segment, query string ignored. ".png", or "" when
// there is none
pub fn image_extension(url: &str) -> String {
    let path = url.split('?').next().unwrap_or(url);
    let name = path.rsplit('/').next().unwrap_or(path);
    match name.rfind('.') {
        Some(idx) if idx > 0 => name[idx..].to_string(),
        _ => String::new(),
    }
}

pub fn cover_file_name(filename: &str, url: &str) -> String {
    format!("{}-cover{}", filename, image_extension(url))
}

pub fn inline_file_name(filename: &str, ordinal: usize, url: &str) -> String {
    format!("{}-{}{}", filename, ordinal, image_extension(url))
}

/// Downloads every remote image of `markdown` and points the markup at the local copies.
///
/// Ordinals follow the order of the matches. Each match downloads and then rewrites every
/// `](url)` target equal to its url, so a repeated url is rewritten once under its first
/// ordinal and a longer url sharing its prefix is left for its own match.
pub async fn localize_images(
    mut markdown: String,
    filename: &str,
    fetcher: &dyn ImageFetcher,
    config: &ExportConfig,
) -> Result<String> {
    let urls = find_remote_images(&markdown);

    for (idx, url) in urls.iter().enumerate() {
        let file_name = inline_file_name(filename, idx + 1, url);
        let dest = config.images_dir.join(&file_name);

        debug!("Downloading {} -> {}", url, dest.display());
        fetcher
            .fetch(url, &dest)
            .await
            .with_context(|| format!("Failed to download image {} for {}", url, filename))?;

        markdown = markdown.replace(
            &format!("]({})", url),
            &format!("]({})", config.image_link(&file_name)),
        );
    }

    Ok(markdown)
}

/// Downloads a cover image and returns the link for the front matter.
pub async fn localize_cover(
    url: &str,
    filename: &str,
    fetcher: &dyn ImageFetcher,
    config: &ExportConfig,
) -> Result<String> {
    let file_name = cover_file_name(filename, url);
    let dest = config.images_dir.join(&file_name);

    debug!("Downloading cover {} -> {}", url, dest.display());
    fetcher
        .fetch(url, &dest)
        .await
        .with_context(|| format!("Failed to download cover image {} for {}", url, filename))?;

    Ok(config.image_link(&file_name))
}
