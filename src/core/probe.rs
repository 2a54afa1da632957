//! Probe descriptions: the capability table produced by platform probing.
//!
//! A probe is a small TOML document:
//!
//! ```toml
//! [platform]
//! family = "posix"          # optional, pins the OS family
//! target = "macos"          # optional, scopes overrides
//! min_macos_version = 101100
//!
//! [capabilities]
//! has-nanosleep = true
//! has-openat = false
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use miette::{NamedSource, SourceSpan};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::capability::{self, CapabilitySet};
use crate::core::family::{OsFamily, PlatformKind, TargetPlatform};
use crate::util::diagnostic::{suggestions, Diagnostic, ProbeSyntaxError};

/// Errors from loading a probe.
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("failed to read probe {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Syntax(Box<ProbeSyntaxError>),

    #[error("invalid capability name `{0}` (expected kebab-case, e.g. `has-nanosleep`)")]
    InvalidCapability(String),

    #[error("{0}")]
    InvalidFamily(String),

    #[error("{0}")]
    InvalidTarget(String),
}

impl ProbeError {
    /// Convert to a user-facing diagnostic. Syntax errors are reported with
    /// their source snippet instead and have none.
    pub fn to_diagnostic(&self) -> Option<Diagnostic> {
        let diag = match self {
            ProbeError::Io { path, source } => Diagnostic::error(self.to_string())
                .with_location(path)
                .with_context(source.to_string())
                .with_suggestion(suggestions::NO_PROBE),
            ProbeError::Syntax(_) => return None,
            ProbeError::InvalidCapability(_) => {
                Diagnostic::error(self.to_string()).with_suggestion(suggestions::CAPABILITY_NAME)
            }
            ProbeError::InvalidFamily(_) | ProbeError::InvalidTarget(_) => {
                Diagnostic::error(self.to_string())
            }
        };
        Some(diag)
    }
}

#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
struct RawProbe {
    #[serde(default, skip_serializing_if = "RawPlatform::is_empty")]
    platform: RawPlatform,
    #[serde(default)]
    capabilities: BTreeMap<String, bool>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
struct RawPlatform {
    #[serde(skip_serializing_if = "Option::is_none")]
    family: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    target: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    min_macos_version: Option<u32>,
}

impl RawPlatform {
    fn is_empty(&self) -> bool {
        self.family.is_none() && self.target.is_none() && self.min_macos_version.is_none()
    }
}

/// The raw input of one resolution pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Probe {
    /// Explicit family tag, if the probe carried one
    pub family: Option<OsFamily>,
    /// The platform being configured
    pub target: TargetPlatform,
    /// Flags that hold
    pub capabilities: CapabilitySet,
}

impl Probe {
    /// Create a probe from capability flags alone.
    pub fn new(capabilities: CapabilitySet) -> Self {
        Probe {
            family: None,
            target: TargetPlatform::default(),
            capabilities,
        }
    }

    /// Pin the OS family.
    pub fn with_family(mut self, family: OsFamily) -> Self {
        self.family = Some(family);
        self
    }

    /// Set the target platform.
    pub fn with_target(mut self, target: TargetPlatform) -> Self {
        self.target = target;
        self
    }

    /// Load a probe from a file.
    pub fn load(path: &Path) -> Result<Self, ProbeError> {
        let content = std::fs::read_to_string(path).map_err(|source| ProbeError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        Self::parse(&content, &path.display().to_string())
    }

    /// Parse a probe from TOML text. `name` labels the source in diagnostics.
    pub fn parse(content: &str, name: &str) -> Result<Self, ProbeError> {
        let raw: RawProbe = toml::from_str(content).map_err(|e| {
            let span = e.span().map(|r| SourceSpan::from(r.start..r.end));
            ProbeError::Syntax(Box::new(ProbeSyntaxError {
                message: e.message().to_string(),
                src: NamedSource::new(name, content.to_string()),
                span,
            }))
        })?;

        if let Some(bad) = raw
            .capabilities
            .keys()
            .find(|name| !capability::is_valid_name(name))
        {
            return Err(ProbeError::InvalidCapability(bad.clone()));
        }

        let family = raw
            .platform
            .family
            .map(|f| f.parse::<OsFamily>())
            .transpose()
            .map_err(|e| ProbeError::InvalidFamily(e.to_string()))?;

        let kind = raw
            .platform
            .target
            .map(|t| t.parse::<PlatformKind>())
            .transpose()
            .map_err(|e| ProbeError::InvalidTarget(e.to_string()))?
            .unwrap_or_default();

        Ok(Probe {
            family,
            target: TargetPlatform {
                kind,
                min_macos_version: raw.platform.min_macos_version,
            },
            capabilities: CapabilitySet::from_map(&raw.capabilities),
        })
    }

    /// Render the probe back to TOML, listing present flags only.
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        let raw = RawProbe {
            platform: RawPlatform {
                family: self.family.map(|f| f.as_str().to_string()),
                target: (self.target.kind != PlatformKind::Other)
                    .then(|| self.target.kind.as_str().to_string()),
                min_macos_version: self.target.min_macos_version,
            },
            capabilities: self
                .capabilities
                .iter()
                .map(|flag| (flag.to_string(), true))
                .collect(),
        };

        toml::to_string_pretty(&raw)
    }
}
