//! Metadata indexer
//!
//! Consumes the full document set (the pipeline's synchronization point)
//! and produces the lookup structures the assembler navigates by: the
//! global reverse-chronological ordering, the tag index, and the
//! year/month time-bucket index. All three are rebuilt from scratch each
//! run; ordering is deterministic with identifier lexical order breaking
//! date ties.

use chrono::Datelike;
use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;

use crate::content::{Document, DocumentId};
use crate::error::{Error, Result};

/// A year/month bucket. Orders chronologically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimeBucket {
    pub year: i32,
    pub month: u32,
}

impl TimeBucket {
    fn of(doc: &Document) -> Self {
        Self {
            year: doc.date.year(),
            month: doc.date.month(),
        }
    }
}

/// Index over all loaded documents.
#[derive(Debug, Default)]
pub struct SiteIndex {
    /// All identifiers, newest first (identifier order on equal dates).
    ordered: Vec<DocumentId>,
    by_tag: BTreeMap<String, Vec<DocumentId>>,
    by_bucket: BTreeMap<TimeBucket, Vec<DocumentId>>,
}

impl SiteIndex {
    /// Build the index. Two documents resolving to the same identifier
    /// make the output ambiguous and abort the run.
    pub fn build(documents: &[Document]) -> Result<Self> {
        let mut seen: HashMap<&DocumentId, &PathBuf> = HashMap::new();
        for doc in documents {
            if let Some(first) = seen.insert(&doc.id, &doc.source) {
                return Err(Error::DuplicateId {
                    id: doc.id.to_string(),
                    first: first.clone(),
                    second: doc.source.clone(),
                });
            }
        }

        let mut sorted: Vec<&Document> = documents.iter().collect();
        sorted.sort_by(|a, b| b.date.cmp(&a.date).then_with(|| a.id.cmp(&b.id)));

        let mut index = SiteIndex::default();
        for doc in sorted {
            index.ordered.push(doc.id.clone());
            for tag in &doc.tags {
                if tag.trim().is_empty() {
                    continue;
                }
                index
                    .by_tag
                    .entry(tag.clone())
                    .or_default()
                    .push(doc.id.clone());
            }
            index
                .by_bucket
                .entry(TimeBucket::of(doc))
                .or_default()
                .push(doc.id.clone());
        }

        tracing::info!(
            "indexed {} document(s), {} tag(s), {} time bucket(s)",
            index.ordered.len(),
            index.by_tag.len(),
            index.by_bucket.len()
        );
        Ok(index)
    }

    /// All identifiers, newest first.
    pub fn ordered(&self) -> &[DocumentId] {
        &self.ordered
    }

    /// Tags in name order, each with its documents (newest first).
    pub fn tags(&self) -> impl Iterator<Item = (&str, &[DocumentId])> {
        self.by_tag.iter().map(|(t, ids)| (t.as_str(), &ids[..]))
    }

    pub fn documents_for_tag(&self, tag: &str) -> Option<&[DocumentId]> {
        self.by_tag.get(tag).map(|ids| &ids[..])
    }

    /// Time buckets, newest first.
    pub fn buckets(&self) -> impl Iterator<Item = (TimeBucket, &[DocumentId])> {
        self.by_bucket.iter().rev().map(|(b, ids)| (*b, &ids[..]))
    }
}
