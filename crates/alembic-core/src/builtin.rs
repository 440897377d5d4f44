//! Built-in recipe for the tmux terminal multiplexer.
//!
//! Serves as the reference recipe for the resolver and as the default
//! recipe of the CLI. User-authored recipes load from TOML via
//! [`crate::load`] instead.

use alembic_schema::{
    BuildMode, Command, Condition, Conditional, Configure, Dependency, EnvMutation, InstallDir,
    InstallProcedure, OsFamily, Patch, Phase, Placement, PlacementSource, Recipe, Resource,
    ResourceKind, Sha256Digest, SourceSpec, TestProcedure, Variant, Version, VersionWindow,
};

fn digest(hex: &str) -> Sha256Digest {
    // Literals below are fixed upstream digests; length is known valid.
    Sha256Digest::new(hex).unwrap_or_else(|e| panic!("builtin digest invalid: {e}"))
}

fn version(s: &str) -> Version {
    s.parse()
        .unwrap_or_else(|e| panic!("builtin version invalid: {e}"))
}

/// macOS Sierra, the oldest release whose libc agrees with utf8proc
/// character widths.
const SIERRA: &str = "10.12";
/// macOS High Sierra, baseline for enabling utf8proc at configure time.
const HIGH_SIERRA: &str = "10.13";

/// The tmux recipe.
pub fn tmux() -> Recipe {
    let linux_or_sierra = Condition::AnyOf(vec![
        Condition::Os(OsFamily::Linux),
        Condition::OsAtLeast {
            os: OsFamily::Macos,
            min: version(SIERRA),
        },
    ]);

    let stable = Variant {
        name: "stable".into(),
        default: true,
        source: SourceSpec::Archive {
            url: "https://github.com/tmux/tmux/releases/download/3.3a/tmux-3.3a.tar.gz".into(),
            sha256: digest("e4fd347843bd0772c4f48d6dde625b0b109b7a380ff15db21e97c11a4dcdf93f"),
        },
        patches: vec![
            // CVE-2022-47016; the upstream commit does not apply to 3.3a.
            Patch {
                url: "https://raw.githubusercontent.com/NixOS/nixpkgs/2821a121dc2acf2fe07d9636ee35ff61807087ea/pkgs/tools/misc/tmux/CVE-2022-47016.patch".into(),
                sha256: digest("c1284aace9231e736ace52333ec91726d3dfda58d3a3404b67c6f40bf5ed28a4"),
                window: VersionWindow::only(version("3.3a")),
            },
            Patch {
                url: "https://raw.githubusercontent.com/z80oolong/tmux-eaw-fix/master/tmux-3.3a-fix.diff".into(),
                sha256: digest("69bd95a15b8526b17e41ef0c8dd63295571a2c6607859809ca8c496beb3ccd7e"),
                window: VersionWindow::only(version("3.3a")),
            },
        ],
        dependencies: vec![],
    };

    let head = Variant {
        name: "head".into(),
        default: false,
        source: SourceSpec::Repository {
            url: "https://github.com/tmux/tmux.git".into(),
            reference: "master".into(),
        },
        patches: vec![],
        dependencies: vec![
            Dependency::new("autoconf", Phase::Build),
            Dependency::new("automake", Phase::Build),
            Dependency::new("libtool", Phase::Build),
            // macOS ships bison; only Linux needs it installed.
            Dependency::gated("bison", Phase::Build, Condition::Os(OsFamily::Linux)),
        ],
    };

    Recipe {
        name: "tmux".into(),
        description: "Terminal multiplexer".into(),
        homepage: "https://tmux.github.io/".into(),
        license: "ISC".into(),
        version: version("3.3a"),
        revision: 2,
        variants: vec![stable, head],
        dependencies: vec![
            Dependency::new("pkg-config", Phase::Build),
            Dependency::new("libevent", Phase::Runtime),
            Dependency::new("ncurses", Phase::Runtime),
            // Old macOS libc disagrees with utf8proc character widths.
            Dependency::gated("utf8proc", Phase::Runtime, linux_or_sierra),
        ],
        resources: vec![Resource {
            name: "completion".into(),
            url: "https://raw.githubusercontent.com/imomaliev/tmux-bash-completion/f5d53239f7658f8e8fbaf02535cc369009c436d6/completions/tmux".into(),
            sha256: digest("b5f7bbd78f9790026bbff16fc6e3fe4070d067f58f943e156bd1a8c3c99f6a6f"),
            kind: ResourceKind::Completion,
        }],
        install: InstallProcedure {
            env: vec![EnvMutation {
                var: "LDFLAGS".into(),
                append: "-lresolv".into(),
            }],
            prepare: vec![Conditional {
                value: Command::new("sh", &["autogen.sh"]),
                when: Condition::Mode(BuildMode::Head),
            }],
            configure: Configure {
                program: "./configure".into(),
                args: vec![
                    "--disable-dependency-tracking".into(),
                    "--prefix={prefix}".into(),
                    "--sysconfdir={etc}".into(),
                ],
                conditional_args: vec![
                    // The ncurses-provided tmux-256color terminfo breaks
                    // tools linked against the very old macOS ncurses.
                    Conditional {
                        value: "--with-TERM=screen-256color".into(),
                        when: Condition::Os(OsFamily::Macos),
                    },
                    Conditional {
                        value: "--enable-utf8proc".into(),
                        when: Condition::AnyOf(vec![
                            Condition::OsAtLeast {
                                os: OsFamily::Macos,
                                min: version(HIGH_SIERRA),
                            },
                            Condition::Os(OsFamily::Linux),
                        ]),
                    },
                ],
            },
            build: vec![Command::new("make", &["install"])],
            artifacts: vec![
                Placement {
                    source: PlacementSource::BuildTree("example_tmux.conf".into()),
                    dest: InstallDir::PkgShare,
                },
                Placement {
                    source: PlacementSource::Resource("completion".into()),
                    dest: InstallDir::BashCompletion,
                },
            ],
        },
        test: TestProcedure {
            version_args: vec!["-V".into()],
            server_args: vec!["-S".into(), "{socket}".into(), "-f".into(), "/dev/null".into()],
            client_args: vec!["-S".into(), "{socket}".into(), "list-sessions".into()],
            expected_diagnostic: "no server running on {socket}".into(),
            socket_timeout_secs: 10,
        },
        caveats: Some(
            "Example configuration has been installed to:\n  {pkgshare}".into(),
        ),
    }
}
