//! `osprofile bindings` command

use anyhow::{Context, Result};

use crate::cli::BindingsArgs;
use crate::commands::{current_config, resolve_options};
use osprofile::ops::resolve_probe_file;

pub fn execute(args: BindingsArgs) -> Result<()> {
    let config = current_config()?;
    let options = resolve_options(&config, &args.policy);
    let profile = resolve_probe_file(&args.probe, &options)?;

    if args.json {
        let json = serde_json::to_string_pretty(&profile.bindings)
            .context("failed to serialize bindings")?;
        println!("{}", json);
        return Ok(());
    }

    if profile.bindings.is_empty() {
        println!("no bindings");
        return Ok(());
    }

    let width = profile
        .bindings
        .iter()
        .map(|b| b.name.len())
        .max()
        .unwrap_or(0);
    for binding in profile.bindings.iter() {
        println!("{:<width$}  {}", binding.name, binding.value, width = width);
    }

    Ok(())
}
