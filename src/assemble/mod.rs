//! Site assembler - writes the navigable output tree
//!
//! Consumes the index and the rendered pages and emits the paginated
//! listing, per-tag pages, per-post pages, the archive, the Atom feed,
//! and the search index, plus copied assets. Every write failure is
//! fatal: a partially written site must not look like a successful run.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use tera::Context;
use walkdir::WalkDir;

use crate::config::SiteConfig;
use crate::content::{Document, DocumentId};
use crate::error::{Error, Result};
use crate::index::SiteIndex;
use crate::render::RenderedPage;
use crate::templates::{
    ArchiveBucketData, ConfigData, PaginationData, PostSummary, TagRef, TemplateRenderer,
};

/// Tag name -> slug for the whole run. Distinct tags can slugify to the
/// same string (`C++` and `c` both give `c`); later ones get a numeric
/// suffix so no tag page overwrites another.
fn tag_slugs(index: &SiteIndex) -> BTreeMap<String, String> {
    let mut slugs = BTreeMap::new();
    let mut taken: HashSet<String> = HashSet::new();
    for (tag, _) in index.tags() {
        let base = slug::slugify(tag);
        if base.is_empty() {
            slugs.insert(tag.to_string(), base);
            continue;
        }
        let mut candidate = base.clone();
        let mut n = 2;
        while !taken.insert(candidate.clone()) {
            candidate = format!("{}-{}", base, n);
            n += 1;
        }
        if candidate != base {
            tracing::warn!(
                "tag `{}` slug collides with another tag, using `{}`",
                tag,
                candidate
            );
        }
        slugs.insert(tag.to_string(), candidate);
    }
    slugs
}

pub struct Assembler<'a> {
    config: &'a SiteConfig,
    output_dir: &'a Path,
    asset_dir: PathBuf,
    renderer: TemplateRenderer,
}

impl<'a> Assembler<'a> {
    pub fn new(config: &'a SiteConfig, source_dir: &Path, output_dir: &'a Path) -> Result<Self> {
        Ok(Self {
            config,
            output_dir,
            asset_dir: source_dir.join(&config.asset_base_path),
            renderer: TemplateRenderer::new()?,
        })
    }

    /// Write the whole site. Returns the number of pages written.
    pub fn assemble(
        &self,
        documents: &[Document],
        index: &SiteIndex,
        pages: &[RenderedPage],
    ) -> Result<usize> {
        self.create_dir(self.output_dir)?;

        let docs: HashMap<&DocumentId, &Document> =
            documents.iter().map(|d| (&d.id, d)).collect();
        let rendered: HashMap<&DocumentId, &RenderedPage> =
            pages.iter().map(|p| (&p.id, p)).collect();

        let slugs = tag_slugs(index);

        let mut written = 0;
        written += self.write_index_pages(index, &docs, &slugs)?;
        written += self.write_post_pages(index, &docs, &rendered, &slugs)?;
        written += self.write_tag_pages(index, &docs, &slugs)?;
        written += self.write_archive_page(index, &docs, &slugs)?;
        written += self.write_feed(index, &docs, &rendered)?;
        written += self.write_search_index(index, &docs, &rendered)?;
        self.copy_assets()?;

        tracing::info!("wrote {} page(s) to {:?}", written, self.output_dir);
        Ok(written)
    }

    fn config_data(&self) -> ConfigData {
        ConfigData {
            title: self.config.title.clone(),
            subtitle: self.config.subtitle.clone(),
            author: self.config.author.clone(),
            url: self.config.url.clone(),
            tag_dir: self.config.tag_dir.clone(),
            archive_dir: self.config.archive_dir.clone(),
        }
    }

    fn base_context(&self) -> Context {
        let mut context = Context::new();
        context.insert("config", &self.config_data());
        context
    }

    fn summary(&self, doc: &Document, slugs: &BTreeMap<String, String>) -> PostSummary {
        let tags = doc
            .tags
            .iter()
            .map(|tag| TagRef {
                name: tag.clone(),
                url: format!(
                    "/{}/{}/",
                    self.config.tag_dir,
                    slugs.get(tag).map(String::as_str).unwrap_or_default()
                ),
            })
            .collect();
        PostSummary {
            title: doc.title.clone(),
            subtitle: doc.subtitle.clone(),
            date: doc.date.format("%Y-%m-%d").to_string(),
            url: format!("/{}", doc.url_path()),
            tags,
            author: doc.author.clone(),
        }
    }

    fn summaries(
        &self,
        ids: &[DocumentId],
        docs: &HashMap<&DocumentId, &Document>,
        slugs: &BTreeMap<String, String>,
    ) -> Vec<PostSummary> {
        ids.iter()
            .filter_map(|id| docs.get(id))
            .map(|d| self.summary(d, slugs))
            .collect()
    }

    /// Reverse-chronological paginated listing: `index.html` plus
    /// `page/<n>/index.html` for the later pages.
    fn write_index_pages(
        &self,
        index: &SiteIndex,
        docs: &HashMap<&DocumentId, &Document>,
        slugs: &BTreeMap<String, String>,
    ) -> Result<usize> {
        let per_page = self.config.page_size.max(1);
        let ordered = index.ordered();
        let total_pages = ordered.len().div_ceil(per_page).max(1);
        let pagination_dir = &self.config.pagination_dir;

        let page_link = |n: usize| -> String {
            if n == 1 {
                "/".to_string()
            } else {
                format!("/{}/{}/", pagination_dir, n)
            }
        };

        let mut written = 0;
        for page_num in 1..=total_pages {
            let start = (page_num - 1) * per_page;
            let end = (start + per_page).min(ordered.len());
            let page_posts = self.summaries(&ordered[start..end], docs, slugs);

            let pagination = PaginationData {
                current: page_num,
                total: total_pages,
                prev_link: (page_num > 1).then(|| page_link(page_num - 1)),
                next_link: (page_num < total_pages).then(|| page_link(page_num + 1)),
            };

            let mut context = self.base_context();
            context.insert("page_posts", &page_posts);
            context.insert("pagination", &pagination);

            let html = self.renderer.render("index.html", &context)?;
            let rel = if page_num == 1 {
                PathBuf::from("index.html")
            } else {
                PathBuf::from(pagination_dir)
                    .join(page_num.to_string())
                    .join("index.html")
            };
            self.write_page(&rel, &html)?;
            written += 1;
        }
        Ok(written)
    }

    /// One standalone page per document.
    fn write_post_pages(
        &self,
        index: &SiteIndex,
        docs: &HashMap<&DocumentId, &Document>,
        rendered: &HashMap<&DocumentId, &RenderedPage>,
        slugs: &BTreeMap<String, String>,
    ) -> Result<usize> {
        let mut written = 0;
        for id in index.ordered() {
            let (Some(doc), Some(page)) = (docs.get(id), rendered.get(id)) else {
                continue;
            };

            let mut context = self.base_context();
            context.insert("post", &self.summary(doc, slugs));
            context.insert("content", &page.html);
            context.insert("thumbnail", &doc.thumbnail);
            context.insert("comments", &doc.comments);

            let html = self.renderer.render("post.html", &context)?;
            let rel = PathBuf::from(doc.url_path()).join("index.html");
            self.write_page(&rel, &html)?;
            written += 1;
        }
        Ok(written)
    }

    /// One listing page per tag, under `<tag_dir>/<slug>/`.
    fn write_tag_pages(
        &self,
        index: &SiteIndex,
        docs: &HashMap<&DocumentId, &Document>,
        slugs: &BTreeMap<String, String>,
    ) -> Result<usize> {
        let mut written = 0;
        for (tag, ids) in index.tags() {
            let Some(tag_slug) = slugs.get(tag).filter(|s| !s.is_empty()) else {
                continue;
            };

            let mut context = self.base_context();
            context.insert("tag_name", tag);
            context.insert("tag_posts", &self.summaries(ids, docs, slugs));

            let html = self.renderer.render("tag.html", &context)?;
            let rel = PathBuf::from(&self.config.tag_dir)
                .join(tag_slug)
                .join("index.html");
            self.write_page(&rel, &html)?;
            written += 1;
        }
        Ok(written)
    }

    /// Archive page grouped by time bucket, newest first.
    fn write_archive_page(
        &self,
        index: &SiteIndex,
        docs: &HashMap<&DocumentId, &Document>,
        slugs: &BTreeMap<String, String>,
    ) -> Result<usize> {
        let buckets: Vec<ArchiveBucketData> = index
            .buckets()
            .map(|(bucket, ids)| ArchiveBucketData {
                year: bucket.year,
                month: bucket.month,
                label: format!("{}-{:02}", bucket.year, bucket.month),
                posts: self.summaries(ids, docs, slugs),
            })
            .collect();

        let mut context = self.base_context();
        context.insert("buckets", &buckets);

        let html = self.renderer.render("archive.html", &context)?;
        let rel = PathBuf::from(&self.config.archive_dir).join("index.html");
        self.write_page(&rel, &html)?;
        Ok(1)
    }

    /// Atom feed over the newest posts. The feed's `updated` stamp is
    /// the newest post date, not the wall clock, so repeated runs over
    /// an unchanged source stay byte-identical.
    fn write_feed(
        &self,
        index: &SiteIndex,
        docs: &HashMap<&DocumentId, &Document>,
        rendered: &HashMap<&DocumentId, &RenderedPage>,
    ) -> Result<usize> {
        let base_url = self.config.url.trim_end_matches('/');
        let newest = index
            .ordered()
            .first()
            .and_then(|id| docs.get(id))
            .map(|d| d.date)
            .unwrap_or_default();

        let mut feed = String::new();
        feed.push_str("<?xml version=\"1.0\" encoding=\"utf-8\"?>\n");
        feed.push_str("<feed xmlns=\"http://www.w3.org/2005/Atom\">\n");
        feed.push_str(&format!(
            "  <title>{}</title>\n",
            escape_xml(&self.config.title)
        ));
        feed.push_str(&format!(
            "  <link href=\"{}/atom.xml\" rel=\"self\"/>\n",
            base_url
        ));
        feed.push_str(&format!("  <link href=\"{}/\"/>\n", base_url));
        feed.push_str(&format!(
            "  <updated>{}</updated>\n",
            newest.format("%Y-%m-%dT%H:%M:%SZ")
        ));
        feed.push_str(&format!("  <id>{}/</id>\n", base_url));
        feed.push_str(&format!(
            "  <author><name>{}</name></author>\n",
            escape_xml(&self.config.author)
        ));

        for id in index.ordered().iter().take(20) {
            let (Some(doc), Some(page)) = (docs.get(id), rendered.get(id)) else {
                continue;
            };
            let url = format!("{}/{}", base_url, doc.url_path());
            feed.push_str("  <entry>\n");
            feed.push_str(&format!("    <title>{}</title>\n", escape_xml(&doc.title)));
            feed.push_str(&format!("    <link href=\"{}\"/>\n", url));
            feed.push_str(&format!("    <id>{}</id>\n", url));
            feed.push_str(&format!(
                "    <published>{}</published>\n",
                doc.date.format("%Y-%m-%dT%H:%M:%SZ")
            ));
            feed.push_str(&format!(
                "    <updated>{}</updated>\n",
                doc.date.format("%Y-%m-%dT%H:%M:%SZ")
            ));
            feed.push_str(&format!(
                "    <content type=\"html\"><![CDATA[{}]]></content>\n",
                page.html
            ));
            feed.push_str("  </entry>\n");
        }
        feed.push_str("</feed>\n");

        self.write_page(Path::new("atom.xml"), &feed)?;
        Ok(1)
    }

    /// JSON search index over titles, tags, and stripped content.
    fn write_search_index(
        &self,
        index: &SiteIndex,
        docs: &HashMap<&DocumentId, &Document>,
        rendered: &HashMap<&DocumentId, &RenderedPage>,
    ) -> Result<usize> {
        let entries: Vec<serde_json::Value> = index
            .ordered()
            .iter()
            .filter_map(|id| Some((docs.get(id)?, rendered.get(id)?)))
            .map(|(doc, page)| {
                serde_json::json!({
                    "title": doc.title,
                    "url": format!("/{}", doc.url_path()),
                    "date": doc.date.format("%Y-%m-%d").to_string(),
                    "tags": doc.tags,
                    "content": strip_html(&page.html),
                })
            })
            .collect();

        let json = serde_json::to_string_pretty(&entries).expect("search entries serialize");
        self.write_page(Path::new("search.json"), &json)?;
        Ok(1)
    }

    /// Copy media assets under the configured asset base path.
    fn copy_assets(&self) -> Result<()> {
        if !self.asset_dir.exists() {
            return Ok(());
        }
        let dest_root = self.output_dir.join(&self.config.asset_base_path);

        for entry in WalkDir::new(&self.asset_dir)
            .follow_links(true)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let path = entry.path();
            if !path.is_file() {
                continue;
            }
            let relative = path.strip_prefix(&self.asset_dir).unwrap_or(path);
            let dest = dest_root.join(relative);
            if let Some(parent) = dest.parent() {
                self.create_dir(parent)?;
            }
            fs::copy(path, &dest).map_err(|e| Error::OutputWrite {
                path: dest.clone(),
                source: e,
            })?;
        }
        Ok(())
    }

    fn write_page(&self, rel: &Path, content: &str) -> Result<()> {
        let path = self.output_dir.join(rel);
        if let Some(parent) = path.parent() {
            self.create_dir(parent)?;
        }
        fs::write(&path, content).map_err(|e| Error::OutputWrite {
            path: path.clone(),
            source: e,
        })?;
        tracing::debug!("wrote {:?}", path);
        Ok(())
    }

    fn create_dir(&self, path: &Path) -> Result<()> {
        fs::create_dir_all(path).map_err(|e| Error::OutputWrite {
            path: path.to_path_buf(),
            source: e,
        })
    }
}

/// Strip HTML tags from content
fn strip_html(html: &str) -> String {
    let mut result = String::new();
    let mut in_tag = false;
    for c in html.chars() {
        match c {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if !in_tag => result.push(c),
            _ => {}
        }
    }
    result
}

/// Escape XML special characters
fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn doc(id: &str, tags: &[&str]) -> Document {
        Document {
            id: DocumentId::new(id),
            title: id.to_string(),
            subtitle: None,
            date: NaiveDate::from_ymd_opt(2024, 1, 1)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap(),
            tags: tags.iter().map(|t| t.to_string()).collect(),
            author: None,
            layout: "post".to_string(),
            body: String::new(),
            thumbnail: None,
            comments: true,
            slug: id.to_string(),
            source: PathBuf::from(format!("_posts/{}.md", id)),
        }
    }

    #[test]
    fn test_tag_slugs_unique_tags() {
        let docs = vec![doc("a", &["Rust", "Web Dev"])];
        let index = SiteIndex::build(&docs).unwrap();
        let slugs = tag_slugs(&index);
        assert_eq!(slugs["Rust"], "rust");
        assert_eq!(slugs["Web Dev"], "web-dev");
    }

    #[test]
    fn test_colliding_tag_slugs_disambiguated() {
        // `C++` and `c` both slugify to `c`
        let docs = vec![doc("a", &["C++"]), doc("b", &["c"])];
        let index = SiteIndex::build(&docs).unwrap();
        let slugs = tag_slugs(&index);
        assert_eq!(slugs["C++"], "c");
        assert_eq!(slugs["c"], "c-2");
    }

    #[test]
    fn test_strip_html() {
        assert_eq!(strip_html("<p>Hello <b>world</b></p>"), "Hello world");
    }

    #[test]
    fn test_escape_xml() {
        assert_eq!(escape_xml("a < b & c"), "a &lt; b &amp; c");
    }
}
