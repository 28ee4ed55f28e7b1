//! Run the full publishing pipeline

use crate::assemble::Assembler;
use crate::content::ContentLoader;
use crate::error::{IssueReport, Result};
use crate::index::SiteIndex;
use crate::render::{render_documents, MarkdownRenderer};
use crate::Site;

/// What one run produced.
#[derive(Debug)]
pub struct BuildSummary {
    pub documents: usize,
    pub pages_written: usize,
    pub report: IssueReport,
}

/// Load, index, render, assemble. Recoverable issues accumulate into the
/// summary; fatal errors propagate immediately.
pub fn run(site: &Site) -> Result<BuildSummary> {
    let start = std::time::Instant::now();
    let mut report = IssueReport::new();

    let loader = ContentLoader::new(&site.config, &site.source_dir);
    let outcome = loader.load()?;
    report.extend(outcome.issues);

    // Barrier: the index needs the complete document set.
    let index = SiteIndex::build(&outcome.documents)?;

    let renderer = MarkdownRenderer::new(
        &site.config.highlight_theme,
        site.source_dir.join(&site.config.asset_base_path),
    );
    let pages = render_documents(&outcome.documents, &renderer);
    for page in &pages {
        report.extend(page.issues.iter().cloned());
    }

    let assembler = Assembler::new(&site.config, &site.source_dir, &site.output_dir)?;
    let pages_written = assembler.assemble(&outcome.documents, &index, &pages)?;

    report.summarize();
    tracing::info!(
        "built {} document(s) in {:.2}s",
        outcome.documents.len(),
        start.elapsed().as_secs_f64()
    );

    Ok(BuildSummary {
        documents: outcome.documents.len(),
        pages_written,
        report,
    })
}
