//! Site configuration (_config.yml)

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::{Error, Result};

/// Main site configuration
///
/// All keys are optional in the file; every field has a default so an
/// absent `_config.yml` yields a usable configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    // Site
    pub title: String,
    pub subtitle: String,
    pub author: String,
    pub url: String,

    // Pagination
    pub page_size: usize,
    pub pagination_dir: String,

    // Directories (relative to the source directory / output root)
    pub asset_base_path: String,
    pub tag_dir: String,
    pub archive_dir: String,

    /// Expected pattern for the front-matter `date` key.
    pub date_format: String,

    /// Syntect theme used for fenced code blocks.
    pub highlight_theme: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: "Blog".to_string(),
            subtitle: String::new(),
            author: String::new(),
            url: "http://example.com".to_string(),

            page_size: 10,
            pagination_dir: "page".to_string(),

            asset_base_path: "assets".to_string(),
            tag_dir: "tags".to_string(),
            archive_dir: "archives".to_string(),

            date_format: "%Y-%m-%d %H:%M:%S".to_string(),

            highlight_theme: "base16-ocean.dark".to_string(),
        }
    }
}

impl SiteConfig {
    /// Load configuration from a file.
    ///
    /// An unreadable or invalid file is fatal: silently falling back to
    /// defaults would publish the site under the wrong title and URL.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| Error::Config {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        let config: SiteConfig = serde_yaml::from_str(&content).map_err(|e| Error::Config {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        Ok(config)
    }
}
