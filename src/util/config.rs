//! Configuration file support.
//!
//! Two locations are read:
//! - Global: `~/.osprofile/config.toml` - user-wide defaults
//! - Project: `.osprofile/config.toml` - per-project policy
//!
//! Project config takes precedence over global config.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::emit::render::OutputFormat;
use crate::resolver::ResolveOptions;

/// osprofile configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Resolution policy
    pub resolve: ResolveConfig,

    /// Capability masks
    pub capabilities: CapabilityConfig,

    /// Output settings
    pub output: OutputConfig,
}

/// Resolution policy.
///
/// Booleans are optional so a project file can turn off what the global
/// file turned on.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolveConfig {
    /// Use poll(2) to implement select (default false)
    pub poll_for_select: Option<bool>,

    /// Apply platform overrides (default true)
    pub overrides: Option<bool>,
}

/// Capability masks applied before resolution.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CapabilityConfig {
    /// Flags treated as present
    pub assume: Vec<String>,

    /// Flags treated as absent
    pub deny: Vec<String>,
}

/// Output settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Default output format (json, toml, header)
    pub format: Option<String>,
}

impl Config {
    /// Load configuration from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("failed to parse config file: {}", path.display()))
    }

    /// Load configuration with fallback to defaults if the file is missing or broken.
    pub fn load_or_default(path: &Path) -> Self {
        if path.exists() {
            Self::load(path).unwrap_or_else(|e| {
                tracing::warn!("Failed to load config from {}: {:#}", path.display(), e);
                Self::default()
            })
        } else {
            Self::default()
        }
    }

    /// Merge another config into this one (other takes precedence).
    ///
    /// Mask lists are unioned; a flag cannot be both assumed and denied, so
    /// a later deny removes an earlier assume and vice versa.
    pub fn merge(&mut self, other: Config) {
        if other.resolve.poll_for_select.is_some() {
            self.resolve.poll_for_select = other.resolve.poll_for_select;
        }
        if other.resolve.overrides.is_some() {
            self.resolve.overrides = other.resolve.overrides;
        }

        self.capabilities
            .assume
            .retain(|f| !other.capabilities.deny.contains(f));
        self.capabilities
            .deny
            .retain(|f| !other.capabilities.assume.contains(f));
        for flag in other.capabilities.assume {
            if !self.capabilities.assume.contains(&flag) {
                self.capabilities.assume.push(flag);
            }
        }
        for flag in other.capabilities.deny {
            if !self.capabilities.deny.contains(&flag) {
                self.capabilities.deny.push(flag);
            }
        }

        if other.output.format.is_some() {
            self.output.format = other.output.format;
        }
    }

    /// The resolution policy this config describes.
    pub fn resolve_options(&self) -> ResolveOptions {
        let defaults = ResolveOptions::default();
        ResolveOptions {
            poll_for_select: self
                .resolve
                .poll_for_select
                .unwrap_or(defaults.poll_for_select),
            apply_overrides: self.resolve.overrides.unwrap_or(defaults.apply_overrides),
            assume: self.capabilities.assume.clone(),
            deny: self.capabilities.deny.clone(),
        }
    }

    /// Parse the output format from the config string.
    pub fn format(&self) -> Option<OutputFormat> {
        self.output.format.as_ref().and_then(|s| match s.parse() {
            Ok(format) => Some(format),
            Err(e) => {
                tracing::warn!("ignoring output.format: {}", e);
                None
            }
        })
    }
}

/// Load merged configuration from global and project locations.
///
/// Order of precedence (highest to lowest):
/// 1. Project config (.osprofile/config.toml)
/// 2. Global config (~/.osprofile/config.toml)
/// 3. Defaults
pub fn load_config(global_path: Option<&Path>, project_path: &Path) -> Config {
    let mut config = Config::default();

    if let Some(global_path) = global_path {
        config.merge(Config::load_or_default(global_path));
    }

    config.merge(Config::load_or_default(project_path));

    config
}

/// Get the global config directory (~/.osprofile).
pub fn global_config_dir() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|b| b.home_dir().join(".osprofile"))
}

/// Get the global config path (~/.osprofile/config.toml).
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("config.toml"))
}

/// Get the project config path (.osprofile/config.toml).
pub fn project_config_path(project_root: &Path) -> PathBuf {
    project_root.join(".osprofile").join("config.toml")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        let options = config.resolve_options();
        assert!(!options.poll_for_select);
        assert!(options.apply_overrides);
        assert!(options.assume.is_empty());
        assert!(config.format().is_none());
    }

    #[test]
    fn test_config_load() {
        let tmp = TempDir::new().unwrap();
        let config_path = tmp.path().join("config.toml");

        std::fs::write(
            &config_path,
            r#"
[resolve]
poll_for_select = true
overrides = false

[capabilities]
assume = ["has-dlopen"]
deny = ["has-ppoll"]

[output]
format = "header"
"#,
        )
        .unwrap();

        let config = Config::load(&config_path).unwrap();
        let options = config.resolve_options();
        assert!(options.poll_for_select);
        assert!(!options.apply_overrides);
        assert_eq!(options.assume, vec!["has-dlopen"]);
        assert_eq!(options.deny, vec!["has-ppoll"]);
        assert_eq!(config.format(), Some(OutputFormat::Header));
    }

    #[test]
    fn test_config_rejects_unknown_types() {
        let tmp = TempDir::new().unwrap();
        let config_path = tmp.path().join("config.toml");
        std::fs::write(&config_path, "[resolve]\npoll_for_select = \"yes\"\n").unwrap();

        assert!(Config::load(&config_path).is_err());
        assert_eq!(Config::load_or_default(&config_path), Config::default());
    }

    #[test]
    fn test_config_merge() {
        let mut base = Config::default();
        base.resolve.poll_for_select = Some(true);
        base.capabilities.assume = vec!["has-poll".to_string(), "has-dlopen".to_string()];

        let mut project = Config::default();
        project.resolve.overrides = Some(false);
        project.capabilities.deny = vec!["has-poll".to_string()];

        base.merge(project);

        assert_eq!(base.resolve.poll_for_select, Some(true)); // Not overridden
        assert_eq!(base.resolve.overrides, Some(false));
        assert_eq!(base.capabilities.assume, vec!["has-dlopen"]);
        assert_eq!(base.capabilities.deny, vec!["has-poll"]);
    }

    #[test]
    fn test_project_can_turn_off_global_setting() {
        let mut base = Config::default();
        base.resolve.poll_for_select = Some(true);

        let mut project = Config::default();
        project.resolve.poll_for_select = Some(false);
        base.merge(project);

        assert!(!base.resolve_options().poll_for_select);
    }

    #[test]
    fn test_load_config_precedence() {
        let tmp = TempDir::new().unwrap();
        let global_path = tmp.path().join("global.toml");
        let project_path = tmp.path().join("project.toml");

        std::fs::write(
            &global_path,
            r#"
[resolve]
poll_for_select = true

[output]
format = "json"
"#,
        )
        .unwrap();

        std::fs::write(
            &project_path,
            r#"
[output]
format = "toml"
"#,
        )
        .unwrap();

        let config = load_config(Some(&global_path), &project_path);
        assert!(config.resolve_options().poll_for_select);
        assert_eq!(config.format(), Some(OutputFormat::Toml));

        let missing = load_config(None, &tmp.path().join("nope.toml"));
        assert_eq!(missing, Config::default());
    }
}
