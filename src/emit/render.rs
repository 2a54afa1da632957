//! Rendering profiles for consumers.

use std::fmt;
use std::str::FromStr;

use anyhow::{Context, Result};

use crate::core::profile::PlatformProfile;
use crate::core::selection::Selection;

/// How a profile is written out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Json,
    Toml,
    /// A C header of `#define`s and `#include`s
    Header,
}

impl OutputFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Toml => "toml",
            OutputFormat::Header => "header",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for OutputFormat {
    type Err = FormatParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(OutputFormat::Json),
            "toml" => Ok(OutputFormat::Toml),
            "header" | "h" | "c" => Ok(OutputFormat::Header),
            _ => Err(FormatParseError(s.to_string())),
        }
    }
}

/// Error returned when parsing an invalid output format.
#[derive(Debug, Clone)]
pub struct FormatParseError(pub String);

impl fmt::Display for FormatParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "invalid output format '{}', valid values: json, toml, header",
            self.0
        )
    }
}

impl std::error::Error for FormatParseError {}

/// Render a profile.
pub fn render(profile: &PlatformProfile, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => {
            serde_json::to_string_pretty(profile).context("failed to serialize profile as JSON")
        }
        OutputFormat::Toml => {
            toml::to_string_pretty(profile).context("failed to serialize profile as TOML")
        }
        OutputFormat::Header => Ok(render_header(profile)),
    }
}

/// Render a profile as a self-contained C header.
///
/// Imports are limited to the headers the probe reports as present.
pub fn render_header(profile: &PlatformProfile) -> String {
    let mut out = String::new();

    out.push_str(&format!(
        "/* Generated by osprofile {} for {} ({}). Do not edit. */\n",
        env!("CARGO_PKG_VERSION"),
        profile.family,
        profile.target
    ));
    out.push_str(&format!("/* fingerprint: {} */\n\n", profile.fingerprint));
    out.push_str("#ifndef OSPROFILE_H\n#define OSPROFILE_H\n\n");

    for symbol in &profile.symbols {
        out.push_str(&format!("#define {}\n", symbol));
    }

    let notes: Vec<String> = profile
        .selections
        .iter()
        .filter_map(|(facility, selection)| match selection {
            Selection::Disabled { reason } => Some(format!("{}: disabled ({})", facility, reason)),
            Selection::Chosen { option, .. } if selection.is_overridden() => {
                Some(format!("{}: forced to {}", facility, option))
            }
            _ => None,
        })
        .collect();
    if !notes.is_empty() {
        out.push('\n');
        for note in notes {
            out.push_str(&format!("/* {} */\n", note));
        }
    }

    let imports = profile.imports.available(&profile.capabilities);
    if !imports.is_empty() {
        out.push('\n');
        for import in imports.iter() {
            out.push_str(&import.include_directive());
            out.push('\n');
        }
    }

    if !profile.bindings.is_empty() {
        out.push('\n');
        for binding in profile.bindings.iter() {
            out.push_str(&binding.to_c());
            out.push('\n');
        }
    }

    out.push_str("\n#endif /* OSPROFILE_H */\n");
    out
}
