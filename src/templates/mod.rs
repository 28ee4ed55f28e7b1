//! Built-in templates using the Tera template engine
//!
//! The default theme is embedded directly in the binary, so a site
//! builds with no theme directory on disk.

use serde::Serialize;
use tera::{Context, Tera};

use crate::error::Result;

/// Template renderer with the embedded default theme.
pub struct TemplateRenderer {
    tera: Tera,
}

impl TemplateRenderer {
    pub fn new() -> Result<Self> {
        let mut tera = Tera::default();

        // The templates emit pre-rendered HTML fragments; autoescaping
        // would double-escape them.
        tera.autoescape_on(vec![]);

        tera.add_raw_templates(vec![
            ("layout.html", include_str!("builtin/layout.html")),
            ("index.html", include_str!("builtin/index.html")),
            ("post.html", include_str!("builtin/post.html")),
            ("tag.html", include_str!("builtin/tag.html")),
            ("archive.html", include_str!("builtin/archive.html")),
        ])?;

        Ok(Self { tera })
    }

    pub fn render(&self, template_name: &str, context: &Context) -> Result<String> {
        Ok(self.tera.render(template_name, context)?)
    }
}

/// Data structures for template context

#[derive(Debug, Clone, Serialize)]
pub struct ConfigData {
    pub title: String,
    pub subtitle: String,
    pub author: String,
    pub url: String,
    pub tag_dir: String,
    pub archive_dir: String,
}

/// One document as it appears in a listing.
#[derive(Debug, Clone, Serialize)]
pub struct PostSummary {
    pub title: String,
    pub subtitle: Option<String>,
    pub date: String,
    pub url: String,
    pub tags: Vec<TagRef>,
    pub author: Option<String>,
}

/// A tag link. The URL is computed once by the assembler so every page
/// agrees on the slug, including disambiguated collision slugs.
#[derive(Debug, Clone, Serialize)]
pub struct TagRef {
    pub name: String,
    pub url: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct PaginationData {
    pub current: usize,
    pub total: usize,
    pub prev_link: Option<String>,
    pub next_link: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ArchiveBucketData {
    pub year: i32,
    pub month: u32,
    pub label: String,
    pub posts: Vec<PostSummary>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_templates_compile() {
        TemplateRenderer::new().unwrap();
    }

    #[test]
    fn test_render_index() {
        let renderer = TemplateRenderer::new().unwrap();
        let mut context = Context::new();
        context.insert(
            "config",
            &ConfigData {
                title: "My Blog".to_string(),
                subtitle: String::new(),
                author: "me".to_string(),
                url: "http://example.com".to_string(),
                tag_dir: "tags".to_string(),
                archive_dir: "archives".to_string(),
            },
        );
        context.insert(
            "page_posts",
            &vec![PostSummary {
                title: "Hello".to_string(),
                subtitle: None,
                date: "2024-01-15".to_string(),
                url: "/2024/01/hello/".to_string(),
                tags: vec![TagRef {
                    name: "x".to_string(),
                    url: "/tags/x/".to_string(),
                }],
                author: None,
            }],
        );
        context.insert(
            "pagination",
            &PaginationData {
                current: 1,
                total: 1,
                prev_link: None,
                next_link: None,
            },
        );

        let html = renderer.render("index.html", &context).unwrap();
        assert!(html.contains("My Blog"));
        assert!(html.contains("Hello"));
        assert!(html.contains("/2024/01/hello/"));
    }
}
