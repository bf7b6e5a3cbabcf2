//! Diffing the content directory against the last build.
//!
//! The reconciler is the heart of incremental builds. Given a fresh
//! [`ContentScan`] and the previous [`Manifest`], it sorts every slug either
//! one knows about into exactly one of four sets:
//!
//! | Set | On disk | In manifest | Fingerprint |
//! |-----|---------|-------------|-------------|
//! | `new` | yes | no | - |
//! | `updated` | yes | yes | differs |
//! | `unchanged` | yes | yes | equal |
//! | `deleted` | no | yes | - |
//! | `held` | unreadable | yes | - |
//!
//! The build renders `new ∪ updated`, deletes the output of `deleted`, and does
//! nothing at all for `unchanged` or `held`. A post whose source exists but
//! could not be read is `held`: it is still on disk, so its previous entry
//! and page are kept until it can be read again. Running a build twice over the same content
//! therefore renders nothing the second time.
//!
//! Reconciliation is pure: no filesystem access, no logging.

use crate::manifest::Manifest;
use crate::scan::ContentScan;
use std::collections::BTreeSet;
use std::fmt;

/// Classification of every known slug for one build.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reconciliation {
    /// On disk, not in the manifest.
    pub new: BTreeSet<String>,
    /// On disk and in the manifest, with a different fingerprint.
    pub updated: BTreeSet<String>,
    /// In the manifest, gone from disk.
    pub deleted: BTreeSet<String>,
    /// On disk and in the manifest, fingerprint unchanged.
    pub unchanged: BTreeSet<String>,
    /// In the manifest, on disk but unreadable this run.
    pub held: BTreeSet<String>,
    /// On disk and in the manifest (`updated ∪ unchanged`).
    pub common: BTreeSet<String>,
}

pub fn reconcile(scan: &ContentScan, manifest: &Manifest) -> Reconciliation {
    let found: BTreeSet<&str> = scan.documents.keys().map(String::as_str).collect();
    let known: BTreeSet<&str> = manifest.slugs().collect();

    let new = owned(found.difference(&known));
    let (held, deleted): (BTreeSet<String>, BTreeSet<String>) = known
        .difference(&found)
        .map(|slug| slug.to_string())
        .partition(|slug| scan.skipped.contains_key(slug));
    let common = owned(found.intersection(&known));

    let (updated, unchanged): (BTreeSet<String>, BTreeSet<String>) =
        common.iter().cloned().partition(|slug| {
            let current = scan.hash_of(slug);
            let previous = manifest.get(slug).map(|e| e.hash.as_str());
            current != previous
        });

    Reconciliation {
        new,
        updated,
        deleted,
        unchanged,
        held,
        common,
    }
}

fn owned<T: ToString>(slugs: impl Iterator<Item = T>) -> BTreeSet<String> {
    slugs.map(|s| s.to_string()).collect()
}

impl Reconciliation {
    /// Slugs that need rendering, in slug order.
    pub fn to_render(&self) -> impl Iterator<Item = &str> {
        self.new.union(&self.updated).map(String::as_str)
    }

    /// Whether the build has nothing to render or delete.
    pub fn is_noop(&self) -> bool {
        self.new.is_empty() && self.updated.is_empty() && self.deleted.is_empty()
    }

    /// Total number of slugs classified.
    pub fn total(&self) -> usize {
        self.new.len()
            + self.updated.len()
            + self.deleted.len()
            + self.unchanged.len()
            + self.held.len()
    }
}

fn plural(n: usize, singular: &str) -> String {
    if n == 1 {
        format!("{n} {singular}")
    } else {
        format!("{n} {singular}s")
    }
}

impl fmt::Display for Reconciliation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}; {}; {}.",
            plural(self.new.len(), "new post"),
            plural(self.updated.len(), "update"),
            plural(self.deleted.len(), "deletion"),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scan::FoundDocument;
    use crate::test_helpers::entry;
    use std::path::PathBuf;

    fn scan_of(docs: &[(&str, &str)]) -> ContentScan {
        let mut scan = ContentScan::default();
        for (slug, hash) in docs {
            scan.documents.insert(
                slug.to_string(),
                FoundDocument {
                    path: PathBuf::from(format!("content/{slug}/index.md")),
                    hash: hash.to_string(),
                },
            );
        }
        scan
    }

    fn manifest_of(docs: &[(&str, &str)]) -> Manifest {
        let mut m = Manifest::empty();
        for (slug, hash) in docs {
            m.insert(entry(slug, hash));
        }
        m
    }

    fn set(items: &[&str]) -> BTreeSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn mixed_changes() {
        let manifest = manifest_of(&[("a", "h_a"), ("b", "h_b")]);
        let scan = scan_of(&[("a", "h_a2"), ("c", "h_c")]);

        let r = reconcile(&scan, &manifest);
        assert_eq!(r.new, set(&["c"]));
        assert_eq!(r.updated, set(&["a"]));
        assert_eq!(r.deleted, set(&["b"]));
        assert!(r.unchanged.is_empty());
        assert_eq!(r.common, set(&["a"]));
    }

    #[test]
    fn first_build_everything_new() {
        let scan = scan_of(&[("a", "1"), ("b", "2")]);
        let r = reconcile(&scan, &Manifest::empty());
        assert_eq!(r.new, set(&["a", "b"]));
        assert!(r.updated.is_empty() && r.deleted.is_empty() && r.unchanged.is_empty());
    }

    #[test]
    fn empty_content_deletes_everything() {
        let manifest = manifest_of(&[("a", "1"), ("b", "2")]);
        let r = reconcile(&ContentScan::default(), &manifest);
        assert_eq!(r.deleted, set(&["a", "b"]));
        assert!(r.new.is_empty() && r.updated.is_empty() && r.unchanged.is_empty());
    }

    #[test]
    fn unchanged_content_is_noop() {
        let manifest = manifest_of(&[("a", "1"), ("b", "2")]);
        let scan = scan_of(&[("a", "1"), ("b", "2")]);

        let r = reconcile(&scan, &manifest);
        assert!(r.is_noop());
        assert_eq!(r.unchanged, set(&["a", "b"]));
        assert_eq!(r.to_render().count(), 0);
    }

    #[test]
    fn both_empty() {
        let r = reconcile(&ContentScan::default(), &Manifest::empty());
        assert!(r.is_noop());
        assert_eq!(r.total(), 0);
    }

    #[test]
    fn sets_are_disjoint_and_cover_all_slugs() {
        let manifest = manifest_of(&[("a", "1"), ("b", "2"), ("c", "3"), ("d", "4")]);
        let scan = scan_of(&[("b", "2"), ("c", "x"), ("e", "5"), ("f", "6")]);
        let r = reconcile(&scan, &manifest);

        let sets = [&r.new, &r.updated, &r.deleted, &r.unchanged, &r.held];
        for (i, x) in sets.iter().enumerate() {
            for y in &sets[i + 1..] {
                assert!(x.is_disjoint(y), "{x:?} overlaps {y:?}");
            }
        }

        let union: BTreeSet<String> = sets.iter().flat_map(|s| s.iter().cloned()).collect();
        assert_eq!(union, set(&["a", "b", "c", "d", "e", "f"]));
        assert_eq!(r.total(), 6);
        assert_eq!(
            r.common,
            r.updated.union(&r.unchanged).cloned().collect::<BTreeSet<_>>()
        );
    }

    #[test]
    fn unreadable_post_is_held_not_deleted() {
        let manifest = manifest_of(&[("a", "1"), ("b", "2")]);
        let mut scan = scan_of(&[("a", "1")]);
        scan.skipped.insert("b".to_string(), PathBuf::from("content/b/index.md"));

        let r = reconcile(&scan, &manifest);
        assert_eq!(r.held, set(&["b"]));
        assert!(r.deleted.is_empty());
        assert!(r.is_noop());
        assert_eq!(r.total(), 2);
    }

    #[test]
    fn unreadable_post_unknown_to_manifest_is_ignored() {
        let mut scan = scan_of(&[("a", "1")]);
        scan.skipped.insert("b".to_string(), PathBuf::from("content/b/index.md"));

        let r = reconcile(&scan, &Manifest::empty());
        assert_eq!(r.new, set(&["a"]));
        assert!(r.held.is_empty() && r.deleted.is_empty());
    }

    #[test]
    fn to_render_is_new_and_updated_in_order() {
        let manifest = manifest_of(&[("b", "old"), ("d", "same")]);
        let scan = scan_of(&[("a", "1"), ("b", "new"), ("c", "3"), ("d", "same")]);
        let r = reconcile(&scan, &manifest);
        assert_eq!(r.to_render().collect::<Vec<_>>(), vec!["a", "b", "c"]);
    }

    // =========================================================================
    // Display
    // =========================================================================

    #[test]
    fn display_pluralizes() {
        let manifest = manifest_of(&[("a", "h_a"), ("b", "h_b")]);
        let scan = scan_of(&[("a", "h_a2"), ("c", "h_c")]);
        let r = reconcile(&scan, &manifest);
        assert_eq!(r.to_string(), "1 new post; 1 update; 1 deletion.");

        assert_eq!(
            Reconciliation::default().to_string(),
            "0 new posts; 0 updates; 0 deletions."
        );
    }
}
