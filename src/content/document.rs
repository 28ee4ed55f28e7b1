//! Document model

use chrono::{Datelike, NaiveDateTime};
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

/// Unique identifier of a document, derived from the source file stem.
///
/// Identifiers order lexically, which doubles as the tie-break for
/// documents sharing a publication date.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct DocumentId(String);

impl DocumentId {
    pub fn new<S: Into<String>>(id: S) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One parsed post: front-matter metadata plus raw body.
///
/// Immutable after load within a single publishing run.
#[derive(Debug, Clone)]
pub struct Document {
    /// Unique identifier (source file stem)
    pub id: DocumentId,

    /// Post title
    pub title: String,

    /// Optional subtitle
    pub subtitle: Option<String>,

    /// Publication date
    pub date: NaiveDateTime,

    /// Ordered tags, duplicates removed
    pub tags: Vec<String>,

    /// Optional author override (site author otherwise)
    pub author: Option<String>,

    /// Layout declared in the front-matter
    pub layout: String,

    /// Raw markdown body
    pub body: String,

    /// Thumbnail image reference
    pub thumbnail: Option<String>,

    /// Whether comments are enabled
    pub comments: bool,

    /// URL-friendly name (file stem without any date prefix)
    pub slug: String,

    /// Full source file path
    pub source: PathBuf,
}

impl Document {
    /// URL path of the standalone page, e.g. `2024/01/hello-world/`.
    pub fn url_path(&self) -> String {
        format!(
            "{}/{:02}/{}/",
            self.date.year(),
            self.date.month(),
            self.slug
        )
    }
}

/// Strip a leading `YYYY-MM-DD-` date prefix from a file stem.
///
/// Post files commonly follow the `2024-01-15-hello-world.md` convention;
/// the slug should not repeat the date already present in the URL.
pub fn strip_date_prefix(stem: &str) -> &str {
    let bytes = stem.as_bytes();
    if bytes.len() > 11
        && bytes[..10]
            .iter()
            .enumerate()
            .all(|(i, b)| if i == 4 || i == 7 { *b == b'-' } else { b.is_ascii_digit() })
        && bytes[10] == b'-'
    {
        &stem[11..]
    } else {
        stem
    }
}
