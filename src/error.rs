//! Error taxonomy for a publishing run
//!
//! Two tiers: [`Error`] is fatal and aborts the run with a non-zero exit;
//! [`Issue`] is document-scoped, recoverable, and accumulated into an
//! [`IssueReport`] that is summarized at the end of the run.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Fatal errors. No partial-output guarantee once one of these is raised.
#[derive(Error, Debug)]
pub enum Error {
    #[error("source directory not found: {0:?}")]
    SourceMissing(PathBuf),

    #[error("failed to load configuration from {path:?}: {reason}")]
    Config { path: PathBuf, reason: String },

    #[error("duplicate document identifier `{id}` ({first:?} and {second:?})")]
    DuplicateId {
        id: String,
        first: PathBuf,
        second: PathBuf,
    },

    #[error("failed to write output at {path:?}: {source}")]
    OutputWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("template error: {0}")]
    Template(#[from] tera::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Recoverable, document-scoped issues. The offending document is skipped
/// (or rendered with a placeholder) and the run continues.
#[derive(Debug, Clone)]
pub enum Issue {
    /// The front-matter block is missing, unparseable, or lacks a
    /// required key. The document is excluded from the run.
    MalformedMetadata { path: PathBuf, reason: String },

    /// An image reference did not resolve under the asset base path.
    /// The page renders with a broken-link placeholder.
    UnresolvedAsset { document: String, reference: String },
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Issue::MalformedMetadata { path, reason } => {
                write!(f, "malformed metadata in {:?}: {}", path, reason)
            }
            Issue::UnresolvedAsset {
                document,
                reference,
            } => {
                write!(f, "unresolved asset `{}` in {}", reference, document)
            }
        }
    }
}

/// Accumulator for recoverable issues across all pipeline stages.
#[derive(Debug, Default)]
pub struct IssueReport {
    issues: Vec<Issue>,
}

impl IssueReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, issue: Issue) {
        tracing::warn!("{}", issue);
        self.issues.push(issue);
    }

    pub fn extend<I: IntoIterator<Item = Issue>>(&mut self, issues: I) {
        for issue in issues {
            self.push(issue);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }

    pub fn len(&self) -> usize {
        self.issues.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Issue> {
        self.issues.iter()
    }

    /// Log the end-of-run summary.
    pub fn summarize(&self) {
        if self.issues.is_empty() {
            return;
        }
        tracing::warn!("{} issue(s) reported during this run:", self.issues.len());
        for issue in &self.issues {
            tracing::warn!("  - {}", issue);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_accumulates() {
        let mut report = IssueReport::new();
        assert!(report.is_empty());

        report.push(Issue::MalformedMetadata {
            path: PathBuf::from("bad.md"),
            reason: "missing required key `title`".to_string(),
        });
        report.push(Issue::UnresolvedAsset {
            document: "2024-01-01-hello".to_string(),
            reference: "img/missing.png".to_string(),
        });

        assert_eq!(report.len(), 2);
        let rendered: Vec<String> = report.iter().map(|i| i.to_string()).collect();
        assert!(rendered[0].contains("missing required key"));
        assert!(rendered[1].contains("img/missing.png"));
    }
}
