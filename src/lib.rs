//! # Quire
//!
//! A small incremental static site generator for a directory of posts.
//! Every subdirectory of the content root holding an `index.md` is a post;
//! each becomes `<output_root>/<slug>/index.html`, and a listing page at
//! `<output_root>/index.html` links to all of them, newest first.
//!
//! # Architecture: One Incremental Pass
//!
//! A build compares the content directory against a JSON manifest written by
//! the previous build, and does only the work the difference calls for:
//!
//! ```text
//! 1. Scan        content/       →  slug → SHA-256 of index.md
//! 2. Reconcile   scan + manifest →  new / updated / deleted / unchanged
//! 3. Purge       deleted        →  remove docs/<slug>/
//! 4. Render      new ∪ updated  →  docs/<slug>/index.html
//! 5. Listing     manifest       →  docs/index.html
//! 6. Persist     manifest       →  manifest.json (atomic)
//! ```
//!
//! Unchanged posts are neither read nor rendered; their manifest entries are
//! carried forward as they are. Building twice in a row renders nothing the
//! second time and leaves the manifest byte-for-byte identical.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`scan`] | Walks the content root, fingerprints every `index.md` |
//! | [`manifest`] | The persisted record of the last build; load, save atomically |
//! | [`reconcile`] | Pure diff of a scan against a manifest |
//! | [`frontmatter`] | `%key: value` header lines at the top of a post |
//! | [`render`] | Markdown to HTML, post and listing pages via Maud |
//! | [`toc`] | Listing rows, ordering, and writing the listing page |
//! | [`pipeline`] | The build state machine tying the stages together |
//! | [`config`] | `config.toml` loading and validation |
//! | [`types`] | Shared constants and slug validation |
//! | [`output`] | CLI output formatting for builds and dry runs |
//!
//! # Design Decisions
//!
//! ## Content Fingerprints, Not Timestamps
//!
//! A post is out of date when the SHA-256 of its `index.md` differs from the
//! one recorded in the manifest. Touching a file without editing it, checking
//! the tree out fresh, or copying it to another machine does not trigger a
//! rebuild.
//!
//! ## Maud for HTML
//!
//! Pages are generated with [Maud](https://maud.lambda.xyz/): malformed markup
//! is a compile error and every interpolated value is escaped. Only the
//! rendered Markdown body and the stylesheet are inserted raw.
//!
//! ## The Manifest Is the Source of Truth for the Listing
//!
//! The listing page is rebuilt from the manifest after rendering, never from
//! the pages on disk. A post that failed to render for the first time is not
//! in the manifest and therefore not listed.

pub mod config;
pub mod frontmatter;
pub mod manifest;
pub mod output;
pub mod pipeline;
pub mod reconcile;
pub mod render;
pub mod scan;
pub mod toc;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;
