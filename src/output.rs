//! CLI output formatting for builds and dry runs.
//!
//! # Information-First Display
//!
//! Output is **information-centric, not file-centric**. Each post leads with
//! its positional index and slug or title; paths follow as secondary context
//! after `→` or on indented `Source:` lines.
//!
//! # Output Format
//!
//! ## Check (dry run)
//!
//! ```text
//! New
//!     001 fresh
//!         Source: content/fresh/index.md
//! Updated
//!     001 on-rust
//!         Source: content/on-rust/index.md
//! Deleted
//!     001 old-post
//! Unchanged: 2
//!
//! 1 new post; 1 update; 1 deletion.
//! ```
//!
//! ## Build
//!
//! ```text
//! 1 new post; 1 update; 1 deletion.
//! Deleted old-post/
//! 001 Fresh → fresh/index.html
//! 002 On Rust → on-rust/index.html
//! Listing → docs/index.html (4 posts)
//! Manifest → manifest.json (4 posts)
//!
//! Rendered 2 posts, 0 failed, 4 listed
//! ```
//!
//! # Architecture
//!
//! Every `format_*` function is pure and returns `Vec<String>` for
//! testability; `print_*` wrappers write to stdout. Build events are
//! formatted one at a time as the build reports them.

use crate::pipeline::{BuildEvent, BuildReport, Plan};
use crate::scan::ContentScan;
use std::collections::BTreeSet;

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

fn posts(n: usize) -> String {
    if n == 1 {
        "1 post".to_string()
    } else {
        format!("{n} posts")
    }
}

// ============================================================================
// Check output
// ============================================================================

/// Format the dry-run plan: each non-empty set as a section.
pub fn format_plan(plan: &Plan) -> Vec<String> {
    let r = &plan.reconciliation;
    let mut lines = Vec::new();

    push_section(&mut lines, "New", &r.new, Some(&plan.scan));
    push_section(&mut lines, "Updated", &r.updated, Some(&plan.scan));
    push_section(&mut lines, "Deleted", &r.deleted, None);
    lines.push(format!("Unchanged: {}", r.unchanged.len()));

    if !plan.scan.skipped.is_empty() {
        lines.push("Unreadable (previous output kept)".to_string());
        for path in plan.scan.skipped.values() {
            lines.push(format!("    {}", path.display()));
        }
    }

    lines.push(String::new());
    lines.push(r.to_string());
    lines
}

fn push_section(
    lines: &mut Vec<String>,
    heading: &str,
    slugs: &BTreeSet<String>,
    scan: Option<&ContentScan>,
) {
    if slugs.is_empty() {
        return;
    }
    lines.push(heading.to_string());
    for (i, slug) in slugs.iter().enumerate() {
        lines.push(format!("    {} {}", format_index(i + 1), slug));
        if let Some(doc) = scan.and_then(|s| s.documents.get(slug)) {
            lines.push(format!("        Source: {}", doc.path.display()));
        }
    }
}

/// Print the dry-run plan to stdout.
pub fn print_plan(plan: &Plan) {
    for line in format_plan(plan) {
        println!("{}", line);
    }
}

// ============================================================================
// Build output
// ============================================================================

/// Format a single build event as display lines.
///
/// Rendered posts are numbered by `position`, the count of posts rendered so
/// far including this one.
pub fn format_build_event(event: &BuildEvent<'_>, position: usize) -> Vec<String> {
    match event {
        BuildEvent::Stage(_) => Vec::new(),
        BuildEvent::Planned(plan) => vec![plan.to_string()],
        BuildEvent::Deleted(slug) => vec![format!("Deleted {}/", slug)],
        BuildEvent::MissingOutput(slug) => {
            vec![format!("Deleted {}/ (output was already gone)", slug)]
        }
        BuildEvent::Rendered { slug, title } => vec![format!(
            "{} {} \u{2192} {}/index.html",
            format_index(position),
            title.unwrap_or(slug),
            slug
        )],
        BuildEvent::RenderFailed { slug, error } => {
            vec![format!("Failed {}: {}", slug, error)]
        }
        BuildEvent::TocWritten { path, entries } => vec![format!(
            "Listing \u{2192} {} ({})",
            path.display(),
            posts(*entries)
        )],
        BuildEvent::ManifestSaved { path, entries } => vec![format!(
            "Manifest \u{2192} {} ({})",
            path.display(),
            posts(*entries)
        )],
    }
}

/// Format the closing summary of a build.
pub fn format_build_summary(report: &BuildReport) -> Vec<String> {
    let mut lines = vec![
        String::new(),
        format!(
            "Rendered {}, {} failed, {} listed",
            posts(report.rendered.len()),
            report.failed.len(),
            report.live
        ),
    ];
    if !report.skipped_sources.is_empty() {
        lines.push(format!(
            "Skipped {} unreadable source(s):",
            report.skipped_sources.len()
        ));
        for path in &report.skipped_sources {
            lines.push(format!("    {}", path.display()));
        }
    }
    for failure in &report.failed {
        lines.push(format!("    {}: {}", failure.slug, failure.error));
    }
    lines
}

/// Print the closing summary of a build to stdout.
pub fn print_build_summary(report: &BuildReport) {
    for line in format_build_summary(report) {
        println!("{}", line);
    }
}
