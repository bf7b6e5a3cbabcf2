//! Shared types used across the scan, render, and listing stages.
//!
//! Front-matter properties and the date formats are persisted in the build
//! manifest, so every module must agree on them.

use std::collections::BTreeMap;
use std::path::{Component, Path};

/// Front-matter properties: `%key: value` header lines, keyed by `key`.
///
/// A `BTreeMap` so the manifest serializes in a stable key order.
pub type Properties = BTreeMap<String, String>;

/// Name of the source file every document directory must contain.
pub const SOURCE_FILENAME: &str = "index.md";

/// Name of the rendered page inside each output directory, and of the listing page.
pub const PAGE_FILENAME: &str = "index.html";

/// Format of the front-matter `date` property.
pub const FRONT_MATTER_DATE_FORMAT: &str = "%Y-%m-%d";

/// Format used for publish dates and build times on post pages.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d, %H:%M:%S";

/// Format used for dates in the listing page.
pub const LISTING_DATE_FORMAT: &str = "%Y-%m-%d";

/// Whether `slug` names exactly one plain directory under a root.
///
/// Slugs come from directory names when scanning, but the manifest is an
/// external file and may hold anything. Output paths are only derived from
/// slugs that pass this check. [`PAGE_FILENAME`] is rejected since
/// `<output_root>/index.html` is the listing page.
pub fn is_valid_slug(slug: &str) -> bool {
    if slug.is_empty() || slug.starts_with('.') || slug == PAGE_FILENAME {
        return false;
    }
    let mut components = Path::new(slug).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    )
}
