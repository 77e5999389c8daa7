use anyhow::{Context, Result, bail};
use derive_more::derive::Display;
use std::path::{Path, PathBuf};

pub const DEFAULT_API_URL: &str = "https://api.notion.com/v1";

// the two layouts the blog has used. each one fixes where posts and images go, how posts
// link to images, and which concurrency policy it runs with unless overridden
#[derive(Clone, Copy, Debug, PartialEq, Eq, Display)]
pub enum ExportProfile {
    #[display("assets")]
    Assets,
    #[display("public")]
    Public,
}

impl ExportProfile {
    pub fn parse(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "assets" => Ok(ExportProfile::Assets),
            "public" => Ok(ExportProfile::Public),
            other => bail!("Unknown EXPORT_PROFILE '{}', expected 'assets' or 'public'", other),
        }
    }

    pub fn posts_subdir(&self) -> &'static str {
        "src/content/posts"
    }

    pub fn images_subdir(&self) -> &'static str {
        match self {
            ExportProfile::Assets => "src/assets/images",
            ExportProfile::Public => "public/images",
        }
    }

    /// Prefix written in front of an image file name inside a post.
    pub fn image_link_prefix(&self) -> &'static str {
        match self {
            ExportProfile::Assets => "../../assets/images",
            ExportProfile::Public => "/images",
        }
    }

    pub fn default_concurrency(&self) -> ConcurrencyPolicy {
        match self {
            ExportProfile::Assets => ConcurrencyPolicy::Parallel,
            ExportProfile::Public => ConcurrencyPolicy::Sequential,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Display)]
pub enum ConcurrencyPolicy {
    #[display("parallel")]
    Parallel,
    #[display("sequential")]
    Sequential,
}

impl ConcurrencyPolicy {
    pub fn parse(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "parallel" => Ok(ConcurrencyPolicy::Parallel),
            "sequential" => Ok(ConcurrencyPolicy::Sequential),
            other => bail!(
                "Unknown EXPORT_CONCURRENCY '{}', expected 'parallel' or 'sequential'",
                other
            ),
        }
    }
}

#[derive(Clone, Debug)]
pub struct ExportConfig {
    pub notion_secret: String,
    pub database_id: String,
    pub api_url: String,
    pub profile: ExportProfile,
    pub concurrency: ConcurrencyPolicy,
    pub posts_dir: PathBuf,
    pub images_dir: PathBuf,
    pub image_link_prefix: String,
}

impl ExportConfig {
    pub fn from_env() -> Result<Self> {
        let notion_secret = std::env::var("NOTION_SECRET")
            .context("Failed to determine NOTION_SECRET from environment variables")?;

        let database_id = std::env::var("NOTION_DATABASE_ID")
            .context("Failed to determine NOTION_DATABASE_ID from environment variables")?;

        let api_url = std::env::var("NOTION_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string());

        let profile = match std::env::var("EXPORT_PROFILE") {
            Ok(val) => ExportProfile::parse(&val)?,
            Err(_) => ExportProfile::Assets,
        };

        let concurrency = match std::env::var("EXPORT_CONCURRENCY") {
            Ok(val) => ConcurrencyPolicy::parse(&val)?,
            Err(_) => profile.default_concurrency(),
        };

        let root = PathBuf::from(std::env::var("EXPORT_ROOT").unwrap_or_else(|_| ".".to_string()));

        let mut config = Self::for_profile(profile, &root, notion_secret, database_id);
        config.api_url = api_url;
        config.concurrency = concurrency;
        Ok(config)
    }

    /// Builds a config with the profile's layout rooted at `root`.
    pub fn for_profile(
        profile: ExportProfile,
        root: &Path,
        notion_secret: String,
        database_id: String,
    ) -> Self {
        Self {
            notion_secret,
            database_id,
            api_url: DEFAULT_API_URL.to_string(),
            profile,
            concurrency: profile.default_concurrency(),
            posts_dir: root.join(profile.posts_subdir()),
            images_dir: root.join(profile.images_subdir()),
            image_link_prefix: profile.image_link_prefix().to_string(),
        }
    }

    pub fn image_link(&self, file_name: &str) -> String {
        format!("{}/{}", self.image_link_prefix.trim_end_matches('/'), file_name)
    }
}
