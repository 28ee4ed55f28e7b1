//! Markdown rendering with syntax highlighting and asset checking

use pulldown_cmark::{html, CodeBlockKind, CowStr, Event, Options, Parser, Tag, TagEnd};
use std::path::PathBuf;
use syntect::highlighting::ThemeSet;
use syntect::html::highlighted_html_for_string;
use syntect::parsing::SyntaxSet;

use crate::error::Issue;

/// Markdown renderer. Pure function of its inputs: no clock access and no
/// mutable state, so identical input always yields identical output.
pub struct MarkdownRenderer {
    syntax_set: SyntaxSet,
    theme_set: ThemeSet,
    theme_name: String,
    asset_base: PathBuf,
}

impl MarkdownRenderer {
    pub fn new(theme: &str, asset_base: PathBuf) -> Self {
        Self {
            syntax_set: SyntaxSet::load_defaults_newlines(),
            theme_set: ThemeSet::load_defaults(),
            theme_name: theme.to_string(),
            asset_base,
        }
    }

    /// Render markdown to HTML, collecting unresolved-asset issues.
    pub fn render(&self, document: &str, markdown: &str) -> (String, Vec<Issue>) {
        let options = Options::ENABLE_TABLES
            | Options::ENABLE_FOOTNOTES
            | Options::ENABLE_STRIKETHROUGH
            | Options::ENABLE_TASKLISTS
            | Options::ENABLE_GFM;
        let parser = Parser::new_ext(markdown, options);

        let mut events: Vec<Event> = Vec::new();
        let mut issues: Vec<Issue> = Vec::new();

        let mut in_code = false;
        let mut code_lang: Option<String> = None;
        let mut code_buf = String::new();

        // (dest, title) of the image currently open, if any
        let mut image: Option<(String, String)> = None;
        let mut alt = String::new();

        for event in parser {
            match event {
                Event::Start(Tag::CodeBlock(kind)) => {
                    in_code = true;
                    code_lang = match kind {
                        CodeBlockKind::Fenced(lang) if !lang.is_empty() => {
                            // "rust,ignore" style annotations: the language is
                            // the first token
                            lang.split([',', ' ']).next().map(|s| s.to_string())
                        }
                        _ => None,
                    };
                    code_buf.clear();
                }
                Event::End(TagEnd::CodeBlock) => {
                    in_code = false;
                    let highlighted = self.highlight_code(&code_buf, code_lang.take().as_deref());
                    events.push(Event::Html(CowStr::from(highlighted)));
                }
                Event::Text(text) if in_code => {
                    code_buf.push_str(&text);
                }
                Event::Start(Tag::Image {
                    dest_url, title, ..
                }) => {
                    image = Some((dest_url.to_string(), title.to_string()));
                    alt.clear();
                }
                Event::Text(text) if image.is_some() => {
                    alt.push_str(&text);
                }
                Event::End(TagEnd::Image) => {
                    if let Some((dest, title)) = image.take() {
                        let tag = self.image_html(document, &dest, &title, &alt, &mut issues);
                        events.push(Event::Html(CowStr::from(tag)));
                    }
                }
                other => events.push(other),
            }
        }

        let mut html_output = String::new();
        html::push_html(&mut html_output, events.into_iter());

        (html_output, issues)
    }

    /// Emit an `<img>` tag, or a broken-link placeholder when a local
    /// reference does not resolve under the asset base path. References
    /// are left as written; only their existence is checked.
    fn image_html(
        &self,
        document: &str,
        dest: &str,
        title: &str,
        alt: &str,
        issues: &mut Vec<Issue>,
    ) -> String {
        if is_remote_reference(dest) || self.resolves(dest) {
            let title_attr = if title.is_empty() {
                String::new()
            } else {
                format!(r#" title="{}""#, html_escape(title))
            };
            format!(
                r#"<img src="{}" alt="{}"{}>"#,
                html_escape(dest),
                html_escape(alt),
                title_attr
            )
        } else {
            issues.push(Issue::UnresolvedAsset {
                document: document.to_string(),
                reference: dest.to_string(),
            });
            format!(
                r#"<span class="broken-asset" data-src="{}">{}</span>"#,
                html_escape(dest),
                html_escape(alt)
            )
        }
    }

    fn resolves(&self, dest: &str) -> bool {
        self.asset_base.join(dest.trim_start_matches('/')).is_file()
    }

    /// Highlight a fenced code block, preserving the declared language as
    /// a class on the emitted markup.
    fn highlight_code(&self, code: &str, lang: Option<&str>) -> String {
        let lang = lang.unwrap_or("text");

        let syntax = self
            .syntax_set
            .find_syntax_by_token(lang)
            .or_else(|| self.syntax_set.find_syntax_by_extension(lang))
            .unwrap_or_else(|| self.syntax_set.find_syntax_plain_text());

        let theme = self
            .theme_set
            .themes
            .get(&self.theme_name)
            .unwrap_or_else(|| {
                self.theme_set
                    .themes
                    .values()
                    .next()
                    .expect("No themes available")
            });

        match highlighted_html_for_string(code, &self.syntax_set, syntax, theme) {
            Ok(highlighted) => {
                format!(
                    r#"<figure class="highlight language-{}">{}</figure>"#,
                    lang, highlighted
                )
            }
            Err(_) => {
                let escaped = html_escape(code);
                format!(
                    r#"<pre><code class="language-{}">{}</code></pre>"#,
                    lang, escaped
                )
            }
        }
    }
}

fn is_remote_reference(dest: &str) -> bool {
    dest.starts_with("http://")
        || dest.starts_with("https://")
        || dest.starts_with("//")
        || dest.starts_with("data:")
}

/// Simple HTML escaping
fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}
