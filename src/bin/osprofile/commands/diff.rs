//! `osprofile diff` command

use anyhow::{Context, Result};

use crate::cli::DiffArgs;
use crate::commands::{current_config, resolve_options};
use osprofile::ops::{diff_profiles, format_diff, resolve_probe_file};

pub fn execute(args: DiffArgs) -> Result<()> {
    let config = current_config()?;
    let options = resolve_options(&config, &args.policy);

    let left = resolve_probe_file(&args.left, &options)?;
    let right = resolve_probe_file(&args.right, &options)?;
    let diff = diff_profiles(&left, &right);

    if args.json {
        let json = serde_json::to_string_pretty(&diff).context("failed to serialize diff")?;
        println!("{}", json);
    } else {
        print!("{}", format_diff(&diff));
    }

    if args.exit_code && !diff.is_empty() {
        std::process::exit(1);
    }

    Ok(())
}
