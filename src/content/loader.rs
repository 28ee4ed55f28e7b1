//! Content loader - loads documents from the source directory

use chrono::NaiveDate;
use std::fs;
use std::path::Path;
use walkdir::WalkDir;

use super::document::{strip_date_prefix, Document, DocumentId};
use super::frontmatter::FrontMatter;
use crate::config::SiteConfig;
use crate::error::{Error, Issue, Result};

/// Everything one scan produced: the loadable documents plus the issues
/// for the files that were skipped.
#[derive(Debug, Default)]
pub struct LoadOutcome {
    pub documents: Vec<Document>,
    pub issues: Vec<Issue>,
}

/// Loads documents from `<source>/_posts`.
pub struct ContentLoader<'a> {
    config: &'a SiteConfig,
    source_dir: &'a Path,
}

impl<'a> ContentLoader<'a> {
    pub fn new(config: &'a SiteConfig, source_dir: &'a Path) -> Self {
        Self { config, source_dir }
    }

    /// Scan the posts directory and load every markdown file.
    ///
    /// Malformed documents are skipped and reported through the outcome;
    /// only a missing source directory is fatal. Files are visited in
    /// file-name order so re-scanning an unchanged tree yields the same
    /// sequence.
    pub fn load(&self) -> Result<LoadOutcome> {
        if !self.source_dir.exists() {
            return Err(Error::SourceMissing(self.source_dir.to_path_buf()));
        }

        let posts_dir = self.source_dir.join("_posts");
        let mut outcome = LoadOutcome::default();
        if !posts_dir.exists() {
            tracing::warn!("no _posts directory under {:?}", self.source_dir);
            return Ok(outcome);
        }

        for entry in WalkDir::new(&posts_dir)
            .follow_links(true)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let path = entry.path();
            if !path.is_file() || !is_markdown_file(path) {
                continue;
            }
            match self.load_document(path) {
                Ok(doc) => {
                    tracing::debug!("loaded {} from {:?}", doc.id, path);
                    outcome.documents.push(doc);
                }
                Err(issue) => outcome.issues.push(issue),
            }
        }

        tracing::info!(
            "loaded {} document(s), skipped {}",
            outcome.documents.len(),
            outcome.issues.len()
        );
        Ok(outcome)
    }

    /// Load a single document. Any per-file failure maps to a
    /// skip-and-report issue rather than an error.
    fn load_document(&self, path: &Path) -> std::result::Result<Document, Issue> {
        let malformed = |reason: String| Issue::MalformedMetadata {
            path: path.to_path_buf(),
            reason,
        };

        let content = fs::read_to_string(path).map_err(|e| malformed(e.to_string()))?;
        let (fm, body) = FrontMatter::parse(&content).map_err(|e| malformed(e.to_string()))?;
        fm.validate().map_err(|e| malformed(e.to_string()))?;

        let stem = path
            .file_stem()
            .and_then(|s| s.to_str())
            .ok_or_else(|| malformed("file name is not valid UTF-8".to_string()))?;

        // Publication date: front-matter `date` first, then the
        // YYYY-MM-DD- file-name prefix. A document with neither cannot be
        // ordered and is skipped.
        let date = match fm.parse_date(&self.config.date_format) {
            Ok(Some(dt)) => dt,
            Ok(None) => date_from_stem(stem)
                .ok_or_else(|| malformed("no `date` key and no date prefix in file name".into()))?,
            Err(e) => return Err(malformed(e.to_string())),
        };

        Ok(Document {
            id: DocumentId::new(stem),
            title: fm.title.clone().unwrap_or_default(),
            subtitle: fm.subtitle,
            date,
            tags: fm.tags,
            author: fm.author,
            layout: fm.layout.unwrap_or_default(),
            body: body.to_string(),
            thumbnail: fm.thumbnail_img,
            comments: fm.comments.unwrap_or(true),
            slug: slug::slugify(strip_date_prefix(stem)),
            source: path.to_path_buf(),
        })
    }
}

/// Check if a file is a markdown file
fn is_markdown_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e == "md" || e == "markdown")
        .unwrap_or(false)
}

/// Parse the `YYYY-MM-DD-` prefix of a post file stem.
fn date_from_stem(stem: &str) -> Option<chrono::NaiveDateTime> {
    // get() rather than a slice: byte 10 of an arbitrary file name may
    // not be a char boundary
    let prefix = stem.get(..10)?;
    let date = NaiveDate::parse_from_str(prefix, "%Y-%m-%d").ok()?;
    stem.as_bytes().get(10).filter(|b| **b == b'-')?;
    date.and_hms_opt(0, 0, 0)
}
