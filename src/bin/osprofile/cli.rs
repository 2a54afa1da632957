//! CLI definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;

/// osprofile - Resolve OS facilities, header imports and platform bindings from a probe
#[derive(Parser)]
#[command(name = "osprofile")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Resolve a probe into a platform profile
    Resolve(ResolveArgs),

    /// Explain how one facility was resolved
    Explain(ExplainArgs),

    /// Show the declaration imports a probe needs
    Imports(ImportsArgs),

    /// Show the platform bindings for a probe
    Bindings(BindingsArgs),

    /// List the facility catalogue, or describe one facility
    Catalog(CatalogArgs),

    /// Compare the profiles of two probes
    Diff(DiffArgs),

    /// Convert an autoconf config.h into a probe
    Convert(ConvertArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

/// Resolution policy flags shared by commands that resolve a probe.
#[derive(Args, Clone, Default)]
pub struct PolicyArgs {
    /// Do not apply built-in platform overrides
    #[arg(long)]
    pub no_overrides: bool,

    /// Let the select-based poller use poll()
    #[arg(long)]
    pub poll_for_select: bool,

    /// Treat a capability as present (repeatable)
    #[arg(long, value_name = "FLAG")]
    pub assume: Vec<String>,

    /// Treat a capability as absent (repeatable)
    #[arg(long, value_name = "FLAG")]
    pub deny: Vec<String>,
}

#[derive(Args)]
pub struct ResolveArgs {
    /// Probe file (TOML)
    pub probe: PathBuf,

    /// Output format: json, toml, header
    #[arg(long, short = 'f')]
    pub format: Option<String>,

    /// Write to a file instead of stdout
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,

    #[command(flatten)]
    pub policy: PolicyArgs,
}

#[derive(Args)]
pub struct ExplainArgs {
    /// Probe file (TOML)
    pub probe: PathBuf,

    /// Facility to explain (e.g. monotonic-clock)
    pub facility: String,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,

    #[command(flatten)]
    pub policy: PolicyArgs,
}

#[derive(Args)]
pub struct ImportsArgs {
    /// Probe file (TOML)
    pub probe: PathBuf,

    /// Only list headers the probe reports as present
    #[arg(long)]
    pub available: bool,

    /// Print #include directives instead of header names
    #[arg(long)]
    pub include: bool,

    #[command(flatten)]
    pub policy: PolicyArgs,
}

#[derive(Args)]
pub struct BindingsArgs {
    /// Probe file (TOML)
    pub probe: PathBuf,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,

    #[command(flatten)]
    pub policy: PolicyArgs,
}

#[derive(Args)]
pub struct CatalogArgs {
    /// Facility to describe in full
    pub facility: Option<String>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args)]
pub struct DiffArgs {
    /// First probe file
    pub left: PathBuf,

    /// Second probe file
    pub right: PathBuf,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,

    /// Exit with status 1 when the profiles differ
    #[arg(long)]
    pub exit_code: bool,

    #[command(flatten)]
    pub policy: PolicyArgs,
}

#[derive(Args)]
pub struct ConvertArgs {
    /// Path to config.h
    pub config_h: PathBuf,

    /// OS family to record in the probe (posix, win32, generic)
    #[arg(long)]
    pub family: Option<String>,

    /// Target platform (linux, macos, ios, cygwin, windows, other)
    #[arg(long)]
    pub target: Option<String>,

    /// Minimum macOS version, as in MAC_OS_X_VERSION_MIN_REQUIRED (e.g. 101100)
    #[arg(long)]
    pub min_macos_version: Option<u32>,

    /// Write to a file instead of stdout
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,
}

#[derive(Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}
