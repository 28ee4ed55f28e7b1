//! Content module - documents, front-matter, and loading

mod document;
mod frontmatter;
pub mod loader;

pub use document::{Document, DocumentId};
pub use frontmatter::FrontMatter;
pub use loader::{ContentLoader, LoadOutcome};
