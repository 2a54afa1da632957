//! `osprofile imports` command
//!
//! Lists the headers the resolved facilities need, in canonical order.

use anyhow::Result;

use crate::cli::ImportsArgs;
use crate::commands::{current_config, resolve_options};
use osprofile::ops::resolve_probe_file;

pub fn execute(args: ImportsArgs) -> Result<()> {
    let config = current_config()?;
    let options = resolve_options(&config, &args.policy);
    let profile = resolve_probe_file(&args.probe, &options)?;

    let imports = if args.available {
        profile.imports.available(&profile.capabilities)
    } else {
        profile.imports.clone()
    };

    for import in imports.iter() {
        if args.include {
            println!("{}", import.include_directive());
        } else {
            println!("{}", import.header());
        }
    }

    Ok(())
}
