//! The build: scan → reconcile → purge → render → listing → persist.
//!
//! One build is one sequential pass over the content directory:
//!
//! ```text
//! Init → Scanned → Reconciled → Purged → Rendered → TocBuilt → Persisted → Done
//! ```
//!
//! - **Scanned**: [`scan`](crate::scan::scan) fingerprints every post; the
//!   previous manifest is loaded. The output directory is created only once
//!   both have succeeded.
//! - **Reconciled**: [`reconcile`](crate::reconcile::reconcile) splits slugs
//!   into new, updated, deleted, and unchanged.
//! - **Purged**: output directories of deleted posts are removed. This is the
//!   only irreversible step and runs before anything can fail half-way
//!   through rendering.
//! - **Rendered**: exactly the new and updated posts are rendered. Unchanged
//!   posts keep their previous manifest entry untouched.
//! - **TocBuilt**: the listing page is rebuilt from the resulting manifest.
//! - **Persisted**: the manifest is saved atomically.
//!
//! Any stage failure aborts the run before the manifest is written, so the
//! manifest on disk never describes work that didn't happen.
//!
//! ## Render Failures
//!
//! One bad post does not stop the build. Its error is logged and recorded in
//! [`BuildReport::failed`], and the build continues:
//!
//! - a **new** post that fails is left out of the manifest and the listing,
//!   and is tried again next run
//! - an **updated** post that fails keeps its previous entry (and its
//!   previous page on disk); its stale fingerprint makes the next run retry
//!
//! ## Concurrency
//!
//! A build owns the output directory and the manifest for its whole
//! duration. Two builds against the same pair are not supported; callers
//! running builds concurrently must serialize them.

use crate::config::SiteConfig;
use crate::manifest::{Manifest, ManifestEntry, ManifestError};
use crate::reconcile::{Reconciliation, reconcile};
use crate::render::{PageRenderer, RenderError, SourceDocument};
use crate::scan::{self, ContentScan, FoundDocument, ScanError};
use crate::toc;
use crate::types::{PAGE_FILENAME, is_valid_slug};
use chrono::{DateTime, Local, NaiveDateTime};
use std::collections::BTreeSet;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Progress of a build. Each state is entered once, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum BuildStage {
    Init,
    Scanned,
    Reconciled,
    Purged,
    Rendered,
    TocBuilt,
    Persisted,
    Done,
}

impl fmt::Display for BuildStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BuildStage::Init => "init",
            BuildStage::Scanned => "scanned",
            BuildStage::Reconciled => "reconciled",
            BuildStage::Purged => "purged",
            BuildStage::Rendered => "rendered",
            BuildStage::TocBuilt => "toc-built",
            BuildStage::Persisted => "persisted",
            BuildStage::Done => "done",
        };
        f.write_str(name)
    }
}

#[derive(Error, Debug)]
pub enum BuildError {
    #[error("cannot create output directory {path}: {source}")]
    OutputRoot {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error(transparent)]
    Scan(#[from] ScanError),
    #[error(transparent)]
    Manifest(#[from] ManifestError),
    #[error("cannot delete {path}: {source}")]
    Purge {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("cannot write listing page in {path}: {source}")]
    Toc {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("cannot persist manifest: {0}")]
    Persist(#[source] ManifestError),
}

impl BuildError {
    /// The last stage the build completed before failing.
    pub fn stage(&self) -> BuildStage {
        match self {
            BuildError::Scan(_) => BuildStage::Init,
            BuildError::Manifest(_) | BuildError::OutputRoot { .. } => BuildStage::Scanned,
            BuildError::Purge { .. } => BuildStage::Reconciled,
            BuildError::Toc { .. } => BuildStage::Rendered,
            BuildError::Persist(_) => BuildStage::TocBuilt,
        }
    }
}

/// A post that could not be rendered.
#[derive(Debug)]
pub struct RenderFailure {
    pub slug: String,
    pub error: RenderError,
}

/// What a build did.
#[derive(Debug)]
pub struct BuildReport {
    pub plan: Reconciliation,
    /// Slugs rendered successfully, in slug order.
    pub rendered: Vec<String>,
    pub failed: Vec<RenderFailure>,
    /// Deleted slugs whose output directory was already gone.
    pub missing_outputs: Vec<String>,
    /// Sources the scanner could not read. Their previous entries and pages
    /// are kept.
    pub skipped_sources: Vec<PathBuf>,
    /// Posts in the persisted manifest (and the listing).
    pub live: usize,
    pub toc_path: PathBuf,
    pub manifest_path: PathBuf,
}

impl BuildReport {
    pub fn has_failures(&self) -> bool {
        !self.failed.is_empty()
    }
}

/// Progress notifications, delivered as the build runs.
#[derive(Debug)]
pub enum BuildEvent<'a> {
    Stage(BuildStage),
    Planned(&'a Reconciliation),
    Deleted(&'a str),
    MissingOutput(&'a str),
    Rendered {
        slug: &'a str,
        title: Option<&'a str>,
    },
    RenderFailed {
        slug: &'a str,
        error: &'a RenderError,
    },
    TocWritten {
        path: &'a Path,
        entries: usize,
    },
    ManifestSaved {
        path: &'a Path,
        entries: usize,
    },
}

/// Result of a dry run.
#[derive(Debug)]
pub struct Plan {
    pub scan: ContentScan,
    pub reconciliation: Reconciliation,
}

/// Run a build stamped with the current local time, without progress events.
pub fn build(
    config: &SiteConfig,
    renderer: &dyn PageRenderer,
) -> Result<BuildReport, BuildError> {
    build_at(config, renderer, Local::now().naive_local(), &mut |_| {})
}

/// Run a build, stamping rendered posts with `built_at` and reporting
/// progress through `on_event`.
pub fn build_at(
    config: &SiteConfig,
    renderer: &dyn PageRenderer,
    built_at: NaiveDateTime,
    on_event: &mut dyn FnMut(&BuildEvent<'_>),
) -> Result<BuildReport, BuildError> {
    enter(BuildStage::Init, on_event);

    let scan = scan::scan(&config.content_root)?;
    let manifest = Manifest::load(&config.manifest_path)?;
    enter(BuildStage::Scanned, on_event);

    fs::create_dir_all(&config.output_root).map_err(|source| BuildError::OutputRoot {
        path: config.output_root.clone(),
        source,
    })?;

    let plan = reconcile(&scan, &manifest);
    tracing::info!(
        new = plan.new.len(),
        updated = plan.updated.len(),
        deleted = plan.deleted.len(),
        unchanged = plan.unchanged.len(),
        held = plan.held.len(),
        "reconciled"
    );
    on_event(&BuildEvent::Planned(&plan));
    enter(BuildStage::Reconciled, on_event);

    let missing_outputs = purge(&config.output_root, &plan.deleted, on_event)?;
    enter(BuildStage::Purged, on_event);

    let mut next = manifest;
    for slug in &plan.deleted {
        next.remove(slug);
    }

    let mut rendered = Vec::new();
    let mut failed = Vec::new();
    for slug in plan.to_render() {
        let Some(found) = scan.documents.get(slug) else {
            continue;
        };
        match render_document(slug, found, renderer, &config.output_root, built_at) {
            Ok(entry) => {
                on_event(&BuildEvent::Rendered {
                    slug,
                    title: entry.title(),
                });
                next.insert(entry);
                rendered.push(slug.to_string());
            }
            Err(error) => {
                tracing::warn!(slug = %slug, error = %error, "skipping post that failed to render");
                on_event(&BuildEvent::RenderFailed {
                    slug,
                    error: &error,
                });
                failed.push(RenderFailure {
                    slug: slug.to_string(),
                    error,
                });
            }
        }
    }
    enter(BuildStage::Rendered, on_event);

    let toc_path =
        toc::write_toc(&config.output_root, &next, renderer).map_err(|source| BuildError::Toc {
            path: config.output_root.clone(),
            source,
        })?;
    on_event(&BuildEvent::TocWritten {
        path: &toc_path,
        entries: next.len(),
    });
    enter(BuildStage::TocBuilt, on_event);

    next.save(&config.manifest_path).map_err(BuildError::Persist)?;
    on_event(&BuildEvent::ManifestSaved {
        path: &config.manifest_path,
        entries: next.len(),
    });
    enter(BuildStage::Persisted, on_event);

    let report = BuildReport {
        plan,
        rendered,
        failed,
        missing_outputs,
        skipped_sources: scan.skipped.into_values().collect(),
        live: next.len(),
        toc_path,
        manifest_path: config.manifest_path.clone(),
    };
    enter(BuildStage::Done, on_event);
    Ok(report)
}

fn enter(stage: BuildStage, on_event: &mut dyn FnMut(&BuildEvent<'_>)) {
    tracing::debug!(%stage, "build stage");
    on_event(&BuildEvent::Stage(stage));
}

/// Scan and reconcile without touching the output directory or manifest.
pub fn plan(config: &SiteConfig) -> Result<Plan, BuildError> {
    let scan = scan::scan(&config.content_root)?;
    let manifest = Manifest::load(&config.manifest_path)?;
    let reconciliation = reconcile(&scan, &manifest);
    Ok(Plan {
        scan,
        reconciliation,
    })
}

/// Remove the output directory of every deleted slug.
///
/// Returns the slugs whose directory was already gone. Slugs that are not a
/// single plain path component are never turned into paths.
fn purge(
    output_root: &Path,
    deleted: &BTreeSet<String>,
    on_event: &mut dyn FnMut(&BuildEvent<'_>),
) -> Result<Vec<String>, BuildError> {
    let mut missing = Vec::new();
    for slug in deleted {
        if !is_valid_slug(slug) {
            tracing::warn!(slug = %slug, "refusing to delete output for invalid slug in manifest");
            continue;
        }
        let dir = output_root.join(slug);
        match fs::remove_dir_all(&dir) {
            Ok(()) => on_event(&BuildEvent::Deleted(slug)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                tracing::warn!(path = %dir.display(), "did not find directory to delete");
                on_event(&BuildEvent::MissingOutput(slug));
                missing.push(slug.clone());
            }
            Err(source) => return Err(BuildError::Purge { path: dir, source }),
        }
    }
    Ok(missing)
}

/// Read, render, and write one post, returning its new manifest entry.
fn render_document(
    slug: &str,
    found: &FoundDocument,
    renderer: &dyn PageRenderer,
    output_root: &Path,
    built_at: NaiveDateTime,
) -> Result<ManifestEntry, RenderError> {
    let read_err = |source| RenderError::Read {
        path: found.path.clone(),
        source,
    };
    let text = fs::read_to_string(&found.path).map_err(read_err)?;
    let modified = fs::metadata(&found.path)
        .and_then(|m| m.modified())
        .map_err(read_err)?;
    let modified = DateTime::<Local>::from(modified).naive_local();

    let page = renderer.render_page(&SourceDocument {
        slug,
        text: &text,
        modified,
        built_at,
    })?;

    let dir = output_root.join(slug);
    let path = dir.join(PAGE_FILENAME);
    let write_err = |source| RenderError::Write {
        path: path.clone(),
        source,
    };
    fs::create_dir_all(&dir).map_err(write_err)?;
    fs::write(&path, &page.html).map_err(write_err)?;

    Ok(ManifestEntry {
        id: slug.to_string(),
        hash: found.hash.clone(),
        properties: page.properties,
        date: page.date,
        time: built_at,
    })
}
