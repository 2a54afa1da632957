//! `osprofile resolve` command

use anyhow::{Context, Result};

use crate::cli::ResolveArgs;
use crate::commands::{current_config, resolve_options, write_output};
use osprofile::emit::{render, OutputFormat};
use osprofile::ops::resolve_probe_file;

pub fn execute(args: ResolveArgs) -> Result<()> {
    let config = current_config()?;
    let options = resolve_options(&config, &args.policy);

    let format = match &args.format {
        Some(s) => s.parse::<OutputFormat>()?,
        None => config.format().unwrap_or_default(),
    };

    let profile = resolve_probe_file(&args.probe, &options)?;

    for facility in profile.selections.unavailable() {
        tracing::debug!("{} is unavailable", facility);
    }

    let content = render(&profile, format)
        .with_context(|| format!("failed to render profile as {}", format))?;
    write_output(&content, args.output.as_deref())
}
