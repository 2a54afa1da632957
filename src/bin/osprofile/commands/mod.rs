//! Command implementations

pub mod bindings;
pub mod catalog;
pub mod completions;
pub mod convert;
pub mod diff;
pub mod explain;
pub mod imports;
pub mod resolve;

use std::path::Path;

use anyhow::{Context, Result};

use crate::cli::PolicyArgs;
use osprofile::util::config::{global_config_path, load_config, project_config_path};
use osprofile::util::Config;
use osprofile::ResolveOptions;

/// Load the merged global and project configuration for the current directory.
pub fn current_config() -> Result<Config> {
    let cwd = std::env::current_dir().context("failed to get current directory")?;
    Ok(load_config(
        global_config_path().as_deref(),
        &project_config_path(&cwd),
    ))
}

/// Resolution policy from config, with command-line flags taking precedence.
pub fn resolve_options(config: &Config, policy: &PolicyArgs) -> ResolveOptions {
    let mut options = config.resolve_options();

    if policy.no_overrides {
        options.apply_overrides = false;
    }
    if policy.poll_for_select {
        options.poll_for_select = true;
    }

    options.assume.retain(|f| !policy.deny.contains(f));
    options.deny.retain(|f| !policy.assume.contains(f));
    for flag in &policy.assume {
        if !options.assume.contains(flag) {
            options.assume.push(flag.clone());
        }
    }
    for flag in &policy.deny {
        if !options.deny.contains(flag) {
            options.deny.push(flag.clone());
        }
    }

    tracing::debug!(
        "policy: overrides={}, poll_for_select={}, assume={:?}, deny={:?}",
        options.apply_overrides,
        options.poll_for_select,
        options.assume,
        options.deny
    );

    options
}

/// Write output to a file, or stdout when no path is given.
pub fn write_output(content: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, content)
                .with_context(|| format!("failed to write {}", path.display()))?;
            tracing::info!("wrote {}", path.display());
        }
        None => print!("{}", content),
    }
    Ok(())
}
