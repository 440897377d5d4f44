//! Patch sequencing.
//!
//! Application order is strictly the declaration order inside the variant:
//! later patches may depend textually on earlier ones, so reordering is a
//! correctness bug. Window expiry is data: a patch whose version window has
//! closed drops out silently with no code change.

use alembic_schema::{Patch, Variant, Version};

/// Return the variant's applicable patches in declaration order.
///
/// `upstream` is the version of the source being patched: the recipe's
/// upstream version for an archive variant, `None` for a version-control
/// checkout. A patch with a bounded window is excluded when the version is
/// outside the window, and excluded outright when no version is known:
/// there is nothing to test the window against, and a tip checkout already
/// carries its release fixes.
pub fn sequence_patches(variant: &Variant, upstream: Option<&Version>) -> Vec<Patch> {
    variant
        .patches
        .iter()
        .filter(|patch| {
            if !patch.window.is_bounded() {
                return true;
            }
            match upstream {
                Some(version) => patch.window.contains(version),
                None => {
                    tracing::debug!(url = %patch.url, "windowed patch excluded: no upstream version");
                    false
                }
            }
        })
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use alembic_schema::{Sha256Digest, SourceSpec, VersionWindow};

    fn patch(url: &str, window: VersionWindow) -> Patch {
        Patch {
            url: url.to_string(),
            sha256: Sha256Digest::compute(url.as_bytes()),
            window,
        }
    }

    fn variant(patches: Vec<Patch>) -> Variant {
        Variant {
            name: "stable".into(),
            default: true,
            source: SourceSpec::Repository {
                url: "https://example.com/pkg.git".into(),
                reference: "master".into(),
            },
            patches,
            dependencies: vec![],
        }
    }

    fn v(s: &str) -> Version {
        s.parse().unwrap()
    }

    #[test]
    fn declaration_order_is_preserved() {
        let variant = variant(vec![
            patch("https://example.com/a.patch", VersionWindow::default()),
            patch("https://example.com/b.patch", VersionWindow::default()),
            patch("https://example.com/c.patch", VersionWindow::default()),
        ]);
        let seq = sequence_patches(&variant, Some(&v("3.3a")));
        let urls: Vec<&str> = seq.iter().map(|p| p.url.as_str()).collect();
        assert_eq!(
            urls,
            [
                "https://example.com/a.patch",
                "https://example.com/b.patch",
                "https://example.com/c.patch"
            ]
        );
    }

    #[test]
    fn expired_window_drops_out_idempotently() {
        let variant = variant(vec![
            patch("https://example.com/a.patch", VersionWindow::default()),
            patch("https://example.com/b.patch", VersionWindow::only(v("3.3a"))),
            patch("https://example.com/c.patch", VersionWindow::default()),
        ]);

        let in_window = sequence_patches(&variant, Some(&v("3.3a")));
        assert_eq!(in_window.len(), 3);

        // Recipe advanced past 3.3a: b disappears, a and c keep their order.
        let advanced = sequence_patches(&variant, Some(&v("3.4")));
        let urls: Vec<&str> = advanced.iter().map(|p| p.url.as_str()).collect();
        assert_eq!(
            urls,
            ["https://example.com/a.patch", "https://example.com/c.patch"]
        );
    }

    #[test]
    fn windowed_patch_excluded_without_upstream_version() {
        let variant = variant(vec![
            patch("https://example.com/a.patch", VersionWindow::only(v("3.3a"))),
            patch("https://example.com/b.patch", VersionWindow::default()),
        ]);
        let seq = sequence_patches(&variant, None);
        let urls: Vec<&str> = seq.iter().map(|p| p.url.as_str()).collect();
        assert_eq!(urls, ["https://example.com/b.patch"]);
    }
}
