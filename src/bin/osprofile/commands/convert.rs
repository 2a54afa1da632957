//! `osprofile convert` command

use anyhow::{Context, Result};

use crate::cli::ConvertArgs;
use crate::commands::write_output;
use osprofile::core::{OsFamily, PlatformKind, TargetPlatform};
use osprofile::ops::convert_config_file;

pub fn execute(args: ConvertArgs) -> Result<()> {
    let family = args.family.as_deref().map(str::parse::<OsFamily>).transpose()?;
    let kind = match args.target.as_deref() {
        Some(s) => s.parse::<PlatformKind>()?,
        None => PlatformKind::default(),
    };
    let mut target = TargetPlatform::new(kind);
    if let Some(version) = args.min_macos_version {
        target = target.with_min_macos_version(version);
    }

    let report = convert_config_file(&args.config_h, family, target)?;

    for name in &report.unknown {
        tracing::warn!("{} does not match any capability osprofile reads", name);
    }
    tracing::info!(
        "converted {} capabilities ({} reported absent)",
        report.probe.capabilities.len(),
        report.undefined.len()
    );

    let content = report
        .probe
        .to_toml()
        .context("failed to serialize probe")?;
    write_output(&content, args.output.as_deref())
}
