//! HTML rendering for posts and the listing page.
//!
//! The build pipeline only talks to the [`PageRenderer`] trait: given a post's
//! source text it wants HTML plus the post's metadata, and given the listing
//! items it wants the index page. [`HtmlRenderer`] is the stock
//! implementation:
//!
//! - front-matter is split off with [`parse_header`](crate::frontmatter::parse_header)
//! - the body is converted with [pulldown-cmark](https://docs.rs/pulldown-cmark)
//!   (CommonMark, fenced code, tables, strikethrough)
//! - pages are laid out with [maud](https://maud.lambda.xyz/), so every
//!   interpolated value is HTML-escaped
//!
//! ## Stylesheet
//!
//! Every page inlines one stylesheet. If the template root holds a
//! `style.css` it is used; otherwise the one embedded from `static/style.css`
//! at compile time. The file is read once, when the renderer is built.

use crate::config::SiteConfig;
use crate::frontmatter::{self, HeaderError};
use crate::toc::TocItem;
use crate::types::{Properties, TIMESTAMP_FORMAT};
use chrono::NaiveDateTime;
use maud::{DOCTYPE, Markup, PreEscaped, html};
use pulldown_cmark::{Options, Parser, html as md_html};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

const CSS_STATIC: &str = include_str!("../static/style.css");

/// Name of the optional stylesheet override in the template root.
pub const STYLESHEET_FILENAME: &str = "style.css";

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("cannot read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("cannot write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("malformed front-matter: {0}")]
    Header(#[from] HeaderError),
}

/// A post's source, as handed to the renderer.
#[derive(Debug, Clone)]
pub struct SourceDocument<'a> {
    pub slug: &'a str,
    pub text: &'a str,
    /// Modification time of the source file, the fallback publish date.
    pub modified: NaiveDateTime,
    /// When this build started.
    pub built_at: NaiveDateTime,
}

/// Output of rendering one post.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedPage {
    pub html: String,
    pub properties: Properties,
    /// Resolved publish date, carried unchanged into the manifest.
    pub date: NaiveDateTime,
}

/// The rendering seam between the build pipeline and page templates.
pub trait PageRenderer {
    /// Render a single post.
    fn render_page(&self, doc: &SourceDocument<'_>) -> Result<RenderedPage, RenderError>;

    /// Render the listing page. `items` arrive in display order and may be empty.
    fn render_toc(&self, items: &[TocItem]) -> String;
}

/// Stock renderer: markdown via pulldown-cmark, layout via maud.
#[derive(Debug, Clone)]
pub struct HtmlRenderer {
    css: String,
    site_title: String,
}

impl HtmlRenderer {
    /// Build a renderer for a site, loading the stylesheet override if present.
    pub fn new(config: &SiteConfig) -> Result<Self, RenderError> {
        let css = load_stylesheet(&config.template_root)?;
        Ok(Self {
            css,
            site_title: config.site_title.clone(),
        })
    }

    /// A renderer with the embedded stylesheet.
    pub fn with_defaults(site_title: &str) -> Self {
        Self {
            css: CSS_STATIC.to_string(),
            site_title: site_title.to_string(),
        }
    }
}

/// Read `style.css` from the template root, or fall back to the embedded one.
fn load_stylesheet(template_root: &Path) -> Result<String, RenderError> {
    let path = template_root.join(STYLESHEET_FILENAME);
    match fs::read_to_string(&path) {
        Ok(css) => Ok(css),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(CSS_STATIC.to_string()),
        Err(source) => Err(RenderError::Read { path, source }),
    }
}

impl PageRenderer for HtmlRenderer {
    fn render_page(&self, doc: &SourceDocument<'_>) -> Result<RenderedPage, RenderError> {
        let header = frontmatter::parse_header(doc.text)?;
        let date = frontmatter::resolve_date(&header.properties, doc.modified)?;
        let body = markdown_to_html(&doc.text[header.body_offset..]);

        let html = render_post(
            &self.site_title,
            &self.css,
            doc.slug,
            &header.properties,
            date,
            doc.built_at,
            &body,
        );
        Ok(RenderedPage {
            html: html.into_string(),
            properties: header.properties,
            date,
        })
    }

    fn render_toc(&self, items: &[TocItem]) -> String {
        render_listing(&self.site_title, &self.css, items).into_string()
    }
}

/// Convert a markdown body to HTML.
pub fn markdown_to_html(markdown: &str) -> String {
    let options = Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH;
    let parser = Parser::new_ext(markdown, options);
    let mut out = String::new();
    md_html::push_html(&mut out, parser);
    out
}

// ============================================================================
// HTML Components
// ============================================================================

/// Renders the base HTML document structure
fn base_document(
    title: &str,
    css: &str,
    description: Option<&str>,
    content: Markup,
) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                @if let Some(desc) = description {
                    meta name="description" content=(desc);
                }
                title { (title) }
                style { (PreEscaped(css)) }
            }
            body {
                (content)
            }
        }
    }
}

/// Renders the header linking back to the listing
fn site_header(site_title: &str) -> Markup {
    html! {
        header.site-header {
            nav {
                a href="/" { (site_title) }
            }
        }
    }
}

fn render_post(
    site_title: &str,
    css: &str,
    slug: &str,
    properties: &Properties,
    date: NaiveDateTime,
    built_at: NaiveDateTime,
    body_html: &str,
) -> Markup {
    let date_str = date.format(TIMESTAMP_FORMAT).to_string();
    let built_str = built_at.format(TIMESTAMP_FORMAT).to_string();
    let title = properties
        .get("title")
        .cloned()
        .unwrap_or_else(|| date_str.clone());
    let description = properties
        .get("description")
        .or_else(|| properties.get("desc"))
        .map(String::as_str);

    let content = html! {
        (site_header(site_title))
        main.post-page {
            article id=(slug) {
                header {
                    h1 { (title) }
                    p.post-meta {
                        time datetime=(date.format("%Y-%m-%dT%H:%M:%S").to_string()) { (date_str) }
                        @if let Some(author) = properties.get("author") {
                            " · " (author)
                        }
                    }
                }
                (PreEscaped(body_html))
                footer.post-meta {
                    "Built " (built_str)
                }
            }
        }
    };

    base_document(&title, css, description, content)
}

fn render_listing(site_title: &str, css: &str, items: &[TocItem]) -> Markup {
    let content = html! {
        (site_header(site_title))
        main.toc-page {
            h1 { (site_title) }
            @if items.is_empty() {
                p.toc-empty { "Nothing has been published yet." }
            } @else {
                ol.toc {
                    @for item in items {
                        li.toc-item id=(item.id) {
                            h2 { a href=(item.url) { (item.title) } }
                            span.toc-date { (item.date) }
                            @if let Some(desc) = &item.description {
                                p.toc-desc { (desc) }
                            }
                        }
                    }
                }
            }
        }
    };

    base_document(site_title, css, None, content)
}

// ============================================================================
// Tests
// ============================================================================
