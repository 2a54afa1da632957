//! `osprofile explain` command

use anyhow::{Context, Result};

use crate::cli::ExplainArgs;
use crate::commands::{current_config, resolve_options};
use osprofile::ops::{explain, format_explanation, load_probe};
use osprofile::Resolver;

pub fn execute(args: ExplainArgs) -> Result<()> {
    let config = current_config()?;
    let options = resolve_options(&config, &args.policy);

    let probe = load_probe(&args.probe)?;
    let resolver =
        Resolver::builtin(options).map_err(|e| e.to_diagnostic())?;

    let explanation = explain(&resolver, &probe, &args.facility)?;

    if args.json {
        let json = serde_json::to_string_pretty(&explanation)
            .context("failed to serialize explanation")?;
        println!("{}", json);
    } else {
        print!("{}", format_explanation(&explanation));
    }

    Ok(())
}
