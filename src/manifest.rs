//! Build manifest: the record of what the last build produced.
//!
//! The manifest maps each post's slug to the fingerprint it was rendered from,
//! its front-matter, its publish date, and when it was built. The reconciler
//! diffs it against a fresh scan to decide what to render and what to delete;
//! the listing page is built from it.
//!
//! ## Storage
//!
//! A pretty-printed JSON object keyed by slug:
//!
//! ```json
//! {
//!   "hello-world": {
//!     "id": "hello-world",
//!     "hash": "b94d27b9...",
//!     "properties": { "title": "Hello", "date": "2024-01-05" },
//!     "date": "2024-01-05T00:00:00",
//!     "time": "2024-03-01T10:12:44"
//!   }
//! }
//! ```
//!
//! Entries are stored in a `BTreeMap`, so an unchanged manifest serializes to
//! identical bytes on every run.
//!
//! ## Recovery
//!
//! A missing manifest is a first build. A manifest that fails to parse is
//! logged and replaced with an empty one: every post on disk is then treated
//! as new and rendered again, and output directories of posts deleted since
//! the last good manifest are left behind. Re-rendering is cheap; refusing to
//! build is not.
//!
//! ## Atomic Saves
//!
//! [`Manifest::save`] writes to a temporary file in the manifest's directory
//! and renames it over the old one, so a crash mid-write leaves the previous
//! manifest intact.

use crate::types::Properties;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ManifestError {
    #[error("cannot read manifest {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("malformed manifest: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("cannot write manifest {path}: {source}")]
    Persist {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Persisted state of one rendered post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestEntry {
    /// The post's slug, repeated for readers of the raw JSON.
    pub id: String,
    /// Fingerprint of the source the output was rendered from.
    pub hash: String,
    /// Front-matter properties as written in the source.
    #[serde(default)]
    pub properties: Properties,
    /// Publish date: front-matter `date`, else the source's modification time.
    pub date: NaiveDateTime,
    /// When the post was last rendered.
    pub time: NaiveDateTime,
}

impl ManifestEntry {
    pub fn title(&self) -> Option<&str> {
        self.properties.get("title").map(String::as_str)
    }

    /// Listing description: the `description` property, else `desc`.
    pub fn description(&self) -> Option<&str> {
        self.properties
            .get("description")
            .or_else(|| self.properties.get("desc"))
            .map(String::as_str)
    }
}

/// Slug → entry for every post the last build produced.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Manifest {
    pub entries: BTreeMap<String, ManifestEntry>,
}

impl Manifest {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Parse manifest JSON, failing on malformed input.
    pub fn parse(content: &str) -> Result<Self, ManifestError> {
        Ok(serde_json::from_str(content)?)
    }

    /// Load the manifest at `path`.
    ///
    /// Returns an empty manifest if the file doesn't exist or can't be parsed;
    /// the latter is logged as a warning. Fails only if the file exists but
    /// can't be read.
    pub fn load(path: &Path) -> Result<Self, ManifestError> {
        let content = match fs::read_to_string(path) {
            Ok(c) => c,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                tracing::info!(path = %path.display(), "no manifest found, starting empty");
                return Ok(Self::empty());
            }
            Err(source) => {
                return Err(ManifestError::Io {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };
        match Self::parse(&content) {
            Ok(manifest) => Ok(manifest),
            Err(err) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %err,
                    "failed to load manifest, starting with a fresh one; every post will be rebuilt"
                );
                Ok(Self::empty())
            }
        }
    }

    /// Save to `path`, replacing any existing manifest atomically.
    pub fn save(&self, path: &Path) -> Result<(), ManifestError> {
        let persist_err = |source| ManifestError::Persist {
            path: path.to_path_buf(),
            source,
        };
        let json =
            serde_json::to_string_pretty(self).map_err(|e| persist_err(io::Error::other(e)))?;

        let dir = match path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        fs::create_dir_all(dir).map_err(persist_err)?;

        let mut tmp = NamedTempFile::new_in(dir).map_err(persist_err)?;
        tmp.write_all(json.as_bytes()).map_err(persist_err)?;
        tmp.write_all(b"\n").map_err(persist_err)?;
        tmp.as_file().sync_all().map_err(persist_err)?;
        tmp.persist(path).map_err(|e| persist_err(e.error))?;
        Ok(())
    }

    pub fn get(&self, slug: &str) -> Option<&ManifestEntry> {
        self.entries.get(slug)
    }

    pub fn contains(&self, slug: &str) -> bool {
        self.entries.contains_key(slug)
    }

    pub fn insert(&mut self, entry: ManifestEntry) {
        self.entries.insert(entry.id.clone(), entry);
    }

    pub fn remove(&mut self, slug: &str) -> Option<ManifestEntry> {
        self.entries.remove(slug)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn slugs(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }
}
