//! osprofile CLI - resolve a platform profile from probed capabilities

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;

use cli::{Cli, Commands};
use osprofile::core::ProbeError;
use osprofile::util::diagnostic::{self, Diagnostic};

fn main() {
    let cli = Cli::parse();
    let color = !cli.no_color;

    if let Err(e) = run(cli) {
        report(&e, color);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let filter = if cli.verbose {
        EnvFilter::new("osprofile=debug")
    } else {
        EnvFilter::new("osprofile=info")
    };

    // Profiles and probes go to stdout, so logs stay on stderr.
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_ansi(!cli.no_color)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Resolve(args) => commands::resolve::execute(args),
        Commands::Explain(args) => commands::explain::execute(args),
        Commands::Imports(args) => commands::imports::execute(args),
        Commands::Bindings(args) => commands::bindings::execute(args),
        Commands::Catalog(args) => commands::catalog::execute(args),
        Commands::Diff(args) => commands::diff::execute(args),
        Commands::Convert(args) => commands::convert::execute(args),
        Commands::Completions(args) => commands::completions::execute(args),
    }
}

/// Print an error. Diagnostics keep their context and suggestions; probe
/// syntax errors get a source snippet.
fn report(err: &anyhow::Error, color: bool) {
    if let Some(diag) = err.downcast_ref::<Diagnostic>() {
        diagnostic::emit(diag, color);
        return;
    }

    if let Some(ProbeError::Syntax(syntax)) = err.downcast_ref::<ProbeError>() {
        let handler = if color {
            miette::GraphicalReportHandler::new()
        } else {
            miette::GraphicalReportHandler::new_themed(miette::GraphicalTheme::unicode_nocolor())
        };
        let mut out = String::new();
        if handler.render_report(&mut out, syntax.as_ref()).is_ok() {
            eprint!("{}", out);
            return;
        }
    }

    eprintln!("error: {:#}", err);
}
