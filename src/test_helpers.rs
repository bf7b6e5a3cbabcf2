//! Shared test utilities for the quire test suite.
//!
//! Provides fixture setup, post writers, and constructors for manifest data
//! so module tests can stay focused on behavior.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let (tmp, config) = setup_site();
//! write_post(&config.content_root, "hello", "%title: Hello\nbody");
//! let report = build_at(&config, &renderer(&config), timestamp("2024-01-01 00:00:00"), &mut |_| {}).unwrap();
//! assert_eq!(rendered_slugs(&report), vec!["first-light", "hello", "no-front-matter", "on-rust"]);
//! ```

use chrono::NaiveDateTime;
use std::path::Path;
use tempfile::TempDir;

use crate::config::SiteConfig;
use crate::manifest::ManifestEntry;
use crate::pipeline::BuildReport;
use crate::render::HtmlRenderer;
use crate::types::{Properties, SOURCE_FILENAME};

// =========================================================================
// Fixture setup
// =========================================================================

/// Copy `fixtures/content/` to a temp directory and return it.
///
/// Tests get an isolated copy they can mutate without affecting other tests
/// or the source fixtures.
pub fn setup_fixtures() -> TempDir {
    let tmp = TempDir::new().unwrap();
    copy_fixtures(tmp.path());
    tmp
}

/// A temp site: fixtures under `content/`, output under `docs/`, manifest
/// at `manifest.json`, template root `static/` (empty, so the embedded
/// stylesheet is used).
pub fn setup_site() -> (TempDir, SiteConfig) {
    let tmp = TempDir::new().unwrap();
    let content = tmp.path().join("content");
    std::fs::create_dir_all(&content).unwrap();
    copy_fixtures(&content);
    let config = site_config(tmp.path());
    (tmp, config)
}

/// A temp site with an empty content directory.
pub fn setup_empty_site() -> (TempDir, SiteConfig) {
    let tmp = TempDir::new().unwrap();
    std::fs::create_dir_all(tmp.path().join("content")).unwrap();
    let config = site_config(tmp.path());
    (tmp, config)
}

fn site_config(root: &Path) -> SiteConfig {
    SiteConfig {
        content_root: root.join("content"),
        template_root: root.join("static"),
        output_root: root.join("docs"),
        manifest_path: root.join("manifest.json"),
        site_title: "Test Posts".to_string(),
    }
}

fn copy_fixtures(dst: &Path) {
    let fixtures = Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures/content");
    copy_dir_recursive(&fixtures, dst).unwrap();
}

fn copy_dir_recursive(src: &Path, dst: &Path) -> std::io::Result<()> {
    for entry in std::fs::read_dir(src)? {
        let entry = entry?;
        let src_path = entry.path();
        let dst_path = dst.join(entry.file_name());

        if src_path.is_dir() {
            std::fs::create_dir_all(&dst_path)?;
            copy_dir_recursive(&src_path, &dst_path)?;
        } else {
            std::fs::copy(&src_path, &dst_path)?;
        }
    }
    Ok(())
}

/// Write `<root>/<slug>/index.md`, creating the post directory.
pub fn write_post(root: &Path, slug: &str, text: &str) {
    let dir = root.join(slug);
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join(SOURCE_FILENAME), text).unwrap();
}

pub fn renderer(config: &SiteConfig) -> HtmlRenderer {
    HtmlRenderer::new(config).unwrap()
}

// =========================================================================
// Manifest data
// =========================================================================

/// Parse `"YYYY-MM-DD HH:MM:SS"`. Panics on malformed input.
pub fn timestamp(s: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
        .unwrap_or_else(|e| panic!("bad test timestamp {s:?}: {e}"))
}

/// A manifest entry with no properties and fixed dates.
pub fn entry(slug: &str, hash: &str) -> ManifestEntry {
    ManifestEntry {
        id: slug.to_string(),
        hash: hash.to_string(),
        properties: Properties::new(),
        date: timestamp("2024-01-01 00:00:00"),
        time: timestamp("2024-01-02 00:00:00"),
    }
}

// =========================================================================
// Report extractors
// =========================================================================

/// Slugs rendered by a build, in render order.
pub fn rendered_slugs(report: &BuildReport) -> Vec<&str> {
    report.rendered.iter().map(String::as_str).collect()
}

/// Slugs whose render failed, in render order.
pub fn failed_slugs(report: &BuildReport) -> Vec<&str> {
    report.failed.iter().map(|f| f.slug.as_str()).collect()
}
