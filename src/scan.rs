//! Content directory scanning.
//!
//! Stage 1 of the build. Lists the posts present on disk and fingerprints each
//! one so the reconciler can tell what changed since the last build.
//!
//! ## Directory Structure
//!
//! ```text
//! content/                 # Content root
//! ├── hello-world/         # Post, slug "hello-world"
//! │   └── index.md
//! ├── second-post/
//! │   ├── index.md
//! │   └── notes.txt        # Ignored; only index.md is fingerprinted
//! ├── drafts/              # No index.md: not a post
//! └── .git/                # Hidden: ignored
//! ```
//!
//! ## Fingerprints
//!
//! A post's fingerprint is the SHA-256 of its `index.md` bytes, hex encoded.
//! Content-based rather than mtime-based so it survives `git checkout`, which
//! resets modification times. The file is streamed through the hasher, so
//! memory use does not grow with document size.
//!
//! ## Failure Modes
//!
//! A missing or unreadable content root aborts the scan. A single post that
//! cannot be read does not: it is logged and listed in
//! [`ContentScan::skipped`] instead of [`ContentScan::documents`]. It still
//! exists on disk, so the build keeps its previous output rather than
//! treating it as deleted.
//!
//! A directory named like the listing page (`index.html`) is not a post:
//! its output directory would take the listing page's place.

use crate::types::{SOURCE_FILENAME, is_valid_slug};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{self, BufReader};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("content root not found: {0}")]
    MissingRoot(PathBuf),
    #[error("content root is not a directory: {0}")]
    NotADirectory(PathBuf),
    #[error("cannot read content root {path}: {source}")]
    Unreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// A post found on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FoundDocument {
    /// Path to the post's `index.md`.
    pub path: PathBuf,
    /// Hex SHA-256 of the source file.
    pub hash: String,
}

/// Result of scanning the content root.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContentScan {
    /// Posts keyed by slug.
    pub documents: BTreeMap<String, FoundDocument>,
    /// Posts whose source exists but could not be fingerprinted, keyed by
    /// slug, with the source path.
    pub skipped: BTreeMap<String, PathBuf>,
}

impl ContentScan {
    pub fn hash_of(&self, slug: &str) -> Option<&str> {
        self.documents.get(slug).map(|d| d.hash.as_str())
    }
}

pub fn scan(root: &Path) -> Result<ContentScan, ScanError> {
    if !root.exists() {
        return Err(ScanError::MissingRoot(root.to_path_buf()));
    }
    if !root.is_dir() {
        return Err(ScanError::NotADirectory(root.to_path_buf()));
    }

    let unreadable = |source| ScanError::Unreadable {
        path: root.to_path_buf(),
        source,
    };

    let mut result = ContentScan::default();
    for entry in fs::read_dir(root).map_err(unreadable)? {
        let entry = match entry {
            Ok(e) => e,
            Err(err) => {
                tracing::warn!(root = %root.display(), error = %err, "skipping unreadable entry");
                continue;
            }
        };
        let dir = entry.path();
        if !dir.is_dir() {
            continue;
        }

        let Some(slug) = entry.file_name().to_str().map(str::to_string) else {
            tracing::warn!(path = %dir.display(), "skipping directory with non UTF-8 name");
            continue;
        };
        if !is_valid_slug(&slug) {
            if !slug.starts_with('.') {
                tracing::warn!(path = %dir.display(), "skipping directory that cannot be a slug");
            }
            continue;
        }

        let source = dir.join(SOURCE_FILENAME);
        if !source.is_file() {
            tracing::debug!(path = %dir.display(), "no {SOURCE_FILENAME}, not a post");
            continue;
        }

        match hash_file(&source) {
            Ok(hash) => {
                result
                    .documents
                    .insert(slug, FoundDocument { path: source, hash });
            }
            Err(err) => {
                tracing::warn!(path = %source.display(), error = %err, "skipping unreadable post");
                result.skipped.insert(slug, source);
            }
        }
    }

    Ok(result)
}

/// SHA-256 hash of a file's contents, returned as a hex string.
///
/// Reads through a buffered reader so the whole file is never held in memory.
pub fn hash_file(path: &Path) -> io::Result<String> {
    let mut reader = BufReader::new(File::open(path)?);
    let mut hasher = Sha256::new();
    io::copy(&mut reader, &mut hasher)?;
    Ok(format!("{:x}", hasher.finalize()))
}
