//! quill: a static blog generator for front-matter Markdown posts
//!
//! The pipeline has four stages wired one direction: the content loader
//! parses posts out of the source directory, the indexer builds the tag
//! and time-bucket lookup structures, the renderer converts each body to
//! HTML, and the assembler writes the navigable output tree.

pub mod assemble;
pub mod commands;
pub mod config;
pub mod content;
pub mod error;
pub mod index;
pub mod render;
pub mod templates;

use std::path::{Path, PathBuf};

pub use commands::build::BuildSummary;
use error::Result;

/// One publishing run's configuration and directory layout. Built once
/// per run and passed into each stage; no process-wide state.
#[derive(Clone)]
pub struct Site {
    /// Site configuration
    pub config: config::SiteConfig,
    /// Source directory holding `_posts`, assets, and `_config.yml`
    pub source_dir: PathBuf,
    /// Output directory
    pub output_dir: PathBuf,
}

impl Site {
    /// Create a site from a source and output directory. Reads
    /// `<source>/_config.yml` when present; a `page_size` override (from
    /// the CLI) wins over the file value.
    pub fn new<P: AsRef<Path>, Q: AsRef<Path>>(
        source_dir: P,
        output_dir: Q,
        page_size: Option<usize>,
    ) -> Result<Self> {
        let source_dir = source_dir.as_ref().to_path_buf();
        let config_path = source_dir.join("_config.yml");

        let mut config = if config_path.exists() {
            config::SiteConfig::load(&config_path)?
        } else {
            config::SiteConfig::default()
        };
        if let Some(page_size) = page_size {
            config.page_size = page_size;
        }

        Ok(Self {
            config,
            source_dir,
            output_dir: output_dir.as_ref().to_path_buf(),
        })
    }

    /// Run the full pipeline.
    pub fn build(&self) -> Result<BuildSummary> {
        commands::build::run(self)
    }

    /// Remove the output directory.
    pub fn clean(&self) -> Result<()> {
        commands::clean::run(self)
    }
}
