//! End-to-end resolution scenarios over the built-in tmux recipe.

use alembic_core::builtin;
use alembic_core::paths::Layout;
use alembic_core::resolve::resolve;
use alembic_core::select::VariantRequest;
use alembic_schema::{BuildMode, ConditionError, EnvironmentFacts, OsFamily, Phase, SourceSpec};

fn facts(os: OsFamily, version: Option<&str>, mode: BuildMode) -> EnvironmentFacts {
    EnvironmentFacts {
        os,
        os_version: version.map(|v| v.parse().unwrap()),
        build_mode: mode,
    }
}

fn layout() -> Layout {
    Layout::new("/srv/alembic", "tmux")
}

#[test]
fn stable_on_recent_macos() {
    let recipe = builtin::tmux();
    let resolution = resolve(
        &recipe,
        &facts(OsFamily::Macos, Some("10.13"), BuildMode::Stable),
        &VariantRequest::Default,
        &layout(),
    )
    .unwrap();

    assert_eq!(resolution.variant, "stable");
    assert!(matches!(resolution.source, SourceSpec::Archive { .. }));

    // utf8proc is in scope at 10.13 and the configure flag rides along.
    let names: Vec<&str> = resolution
        .dependencies
        .iter()
        .map(|d| d.name.as_str())
        .collect();
    assert!(names.contains(&"utf8proc"));
    assert!(resolution.plan.render().contains("--enable-utf8proc"));

    // Autotools are head-only and must not leak into a stable resolution.
    for tool in ["autoconf", "automake", "libtool", "bison"] {
        assert!(!names.contains(&tool), "{tool} resolved for stable");
    }

    // Both patches apply at the pinned upstream version.
    assert_eq!(resolution.patches.len(), 2);
}

#[test]
fn head_on_linux_pulls_in_the_toolchain() {
    let recipe = builtin::tmux();
    let resolution = resolve(
        &recipe,
        &facts(OsFamily::Linux, None, BuildMode::Head),
        &VariantRequest::Named("head".into()),
        &layout(),
    )
    .unwrap();

    assert_eq!(resolution.variant, "head");
    assert!(matches!(
        resolution.source,
        SourceSpec::Repository { ref reference, .. } if reference == "master"
    ));

    let build_deps: Vec<&str> = resolution
        .dependencies
        .iter()
        .filter(|d| d.phase == Phase::Build)
        .map(|d| d.name.as_str())
        .collect();
    for tool in ["autoconf", "automake", "libtool", "bison", "pkg-config"] {
        assert!(build_deps.contains(&tool), "{tool} missing from build deps");
    }

    // A moving checkout has no release version, so windowed patches drop.
    assert!(resolution.patches.is_empty());
    assert!(resolution.plan.render().contains("run sh autogen.sh"));
}

#[test]
fn patch_window_expiry_preserves_order() {
    let mut recipe = builtin::tmux();
    // Expire the first patch while the second becomes unbounded.
    recipe.variants[0].patches[1].window = Default::default();
    recipe.version = "3.4".parse().unwrap();

    let resolution = resolve(
        &recipe,
        &facts(OsFamily::Linux, None, BuildMode::Stable),
        &VariantRequest::Default,
        &layout(),
    )
    .unwrap();

    assert_eq!(resolution.patches.len(), 1);
    assert!(resolution.patches[0].url.contains("tmux-eaw-fix"));
}

#[test]
fn resolution_is_deterministic() {
    let recipe = builtin::tmux();
    let f = facts(OsFamily::Macos, Some("10.13"), BuildMode::Stable);
    let first = resolve(&recipe, &f, &VariantRequest::Default, &layout()).unwrap();
    let second = resolve(&recipe, &f, &VariantRequest::Default, &layout()).unwrap();
    assert_eq!(
        serde_json::to_string(&first).unwrap(),
        serde_json::to_string(&second).unwrap()
    );
}

#[test]
fn selection_is_total_over_requests() {
    let recipe = builtin::tmux();
    let f = facts(OsFamily::Linux, None, BuildMode::Stable);
    for request in [
        VariantRequest::Default,
        VariantRequest::Named("stable".into()),
        VariantRequest::Named("head".into()),
        VariantRequest::Named("nightly".into()),
    ] {
        // Every request yields either a resolution or a structured error,
        // never a panic.
        let _ = resolve(&recipe, &f, &request, &layout());
    }
}

#[test]
fn macos_without_version_cannot_decide_version_gates() {
    let recipe = builtin::tmux();
    let err = resolve(
        &recipe,
        &facts(OsFamily::Macos, None, BuildMode::Stable),
        &VariantRequest::Default,
        &layout(),
    )
    .unwrap_err();
    assert!(matches!(
        err,
        alembic_core::error::ResolveError::Condition(ConditionError::MissingOsVersion { .. })
    ));
}

#[test]
fn linux_never_needs_an_os_version() {
    let recipe = builtin::tmux();
    // Version gates for other families must not consult the version at all.
    let resolution = resolve(
        &recipe,
        &facts(OsFamily::Linux, None, BuildMode::Stable),
        &VariantRequest::Default,
        &layout(),
    )
    .unwrap();
    assert!(
        resolution
            .dependencies
            .iter()
            .any(|d| d.name == "utf8proc")
    );
}
