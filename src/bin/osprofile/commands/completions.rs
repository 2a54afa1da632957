//! `osprofile completions bash > /etc/bash_completion.d/osprofile`

use anyhow::Result;
use clap::CommandFactory;

use crate::cli::{Cli, CompletionsArgs};

pub fn execute(args: CompletionsArgs) -> Result<()> {
    let mut cmd = Cli::command();
    tracing::debug!("generating {} completions", args.shell);
    clap_complete::generate(args.shell, &mut cmd, "osprofile", &mut std::io::stdout());
    Ok(())
}
