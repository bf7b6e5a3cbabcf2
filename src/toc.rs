//! The listing page (`<output_root>/index.html`).
//!
//! Built from the manifest of live posts after rendering, so posts that were
//! carried forward unchanged appear alongside freshly rendered ones.
//!
//! ## Ordering
//!
//! Newest first: publish date descending. Posts sharing a publish date are
//! ordered by slug ascending, so the page is identical across runs.

use crate::manifest::{Manifest, ManifestEntry};
use crate::render::PageRenderer;
use crate::types::{LISTING_DATE_FORMAT, PAGE_FILENAME};
use std::cmp::Reverse;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// One row of the listing page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TocItem {
    pub id: String,
    /// The `title` property, or the publish date when there is none.
    pub title: String,
    /// Site-absolute URL of the post's directory.
    pub url: String,
    pub date: String,
    pub description: Option<String>,
}

impl TocItem {
    pub fn from_entry(slug: &str, entry: &ManifestEntry) -> Self {
        let date = entry.date.format(LISTING_DATE_FORMAT).to_string();
        Self {
            id: slug.to_string(),
            title: entry.title().map(str::to_string).unwrap_or_else(|| date.clone()),
            url: format!("/{slug}"),
            date,
            description: entry.description().map(str::to_string),
        }
    }
}

/// Listing rows for every post in the manifest, in display order.
pub fn toc_items(manifest: &Manifest) -> Vec<TocItem> {
    let mut entries: Vec<(&String, &ManifestEntry)> = manifest.entries.iter().collect();
    entries.sort_by(|(a_slug, a), (b_slug, b)| {
        Reverse(a.date).cmp(&Reverse(b.date)).then_with(|| a_slug.cmp(b_slug))
    });
    entries
        .into_iter()
        .map(|(slug, entry)| TocItem::from_entry(slug, entry))
        .collect()
}

/// Render the listing page and write it to `<output_root>/index.html`.
pub fn write_toc(
    output_root: &Path,
    manifest: &Manifest,
    renderer: &dyn PageRenderer,
) -> io::Result<PathBuf> {
    let html = renderer.render_toc(&toc_items(manifest));
    fs::create_dir_all(output_root)?;
    let path = output_root.join(PAGE_FILENAME);
    fs::write(&path, html)?;
    Ok(path)
}
