//! Renderer stage - markdown to display HTML, one document at a time

mod markdown;

pub use markdown::MarkdownRenderer;

use rayon::prelude::*;

use crate::content::{Document, DocumentId};
use crate::error::Issue;

/// Display-ready output of one document. Ephemeral: owned by the
/// assembler for the duration of a run, never persisted.
#[derive(Debug)]
pub struct RenderedPage {
    pub id: DocumentId,
    pub html: String,
    pub issues: Vec<Issue>,
}

/// Render every document. Documents are independent of each other, so
/// this fans out across the rayon pool; the output order matches the
/// input order.
pub fn render_documents(documents: &[Document], renderer: &MarkdownRenderer) -> Vec<RenderedPage> {
    documents
        .par_iter()
        .map(|doc| {
            let (html, issues) = renderer.render(doc.id.as_str(), &doc.body);
            RenderedPage {
                id: doc.id.clone(),
                html,
                issues,
            }
        })
        .collect()
}
