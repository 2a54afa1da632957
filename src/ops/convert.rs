//! Convert an autoconf `config.h` into a probe.
//!
//! ```bash
//! osprofile convert config.h --target macos > probe.toml
//! ```
//!
//! `#define HAVE_X 1` becomes `has-x = true`; `#undef HAVE_X` (commented
//! out or not) and `#define HAVE_X 0` are dropped. Other macros are ignored.

use std::path::Path;
use std::sync::OnceLock;

use anyhow::{Context, Result};
use regex::Regex;

use crate::core::capability::{self, CapabilitySet};
use crate::core::family::{OsFamily, TargetPlatform};
use crate::core::probe::Probe;

/// Result of converting a `config.h`.
#[derive(Debug, Clone)]
pub struct ConvertReport {
    pub probe: Probe,
    /// `HAVE_` macros explicitly reported absent
    pub undefined: Vec<String>,
    /// `HAVE_` macros the catalogue never reads
    pub unknown: Vec<String>,
}

fn define_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^\s*#\s*define\s+(HAVE_\w+)(?:\s+(\S+))?").expect("valid regex")
    })
}

fn undef_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^\s*(?:/\*\s*)?#\s*undef\s+(HAVE_\w+)").expect("valid regex")
    })
}

/// Convert `config.h` text.
///
/// `known` is the set of flags worth reporting on; macros that map to
/// anything else are still converted but listed in `unknown`.
pub fn convert_config_header(
    content: &str,
    family: Option<OsFamily>,
    target: TargetPlatform,
    known: &dyn Fn(&str) -> bool,
) -> ConvertReport {
    let mut present = Vec::new();
    let mut undefined = Vec::new();
    let mut unknown = Vec::new();

    for line in content.lines() {
        if let Some(caps) = define_re().captures(line) {
            let name = &caps[1];
            if caps.get(2).is_some_and(|v| v.as_str() == "0") {
                undefined.push(name.to_string());
                continue;
            }
            let Some(flag) = capability::from_have_macro(name) else {
                continue;
            };
            if !known(&flag) {
                unknown.push(name.to_string());
            }
            present.push(flag);
        } else if let Some(caps) = undef_re().captures(line) {
            undefined.push(caps[1].to_string());
        }
    }

    tracing::debug!(
        "config.h: {} defined, {} undefined, {} unknown",
        present.len(),
        undefined.len(),
        unknown.len()
    );

    let mut probe = Probe::new(CapabilitySet::from_names(present)).with_target(target);
    if let Some(family) = family {
        probe = probe.with_family(family);
    }

    ConvertReport {
        probe,
        undefined,
        unknown,
    }
}

/// Convert a `config.h` file, checking flags against the built-in catalogue.
pub fn convert_config_file(
    path: &Path,
    family: Option<OsFamily>,
    target: TargetPlatform,
) -> Result<ConvertReport> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;

    let catalog = crate::catalog::Catalog::builtin()
        .map_err(|e| e.to_diagnostic())?;
    let known = catalog.known_capabilities();
    let headers = crate::catalog::Catalog::header_capabilities();
    let is_known = |flag: &str| {
        known.contains(flag)
            || headers.contains(flag)
            || crate::emit::bindings::BINDING_CAPABILITIES.contains(&flag)
    };

    Ok(convert_config_header(&content, family, target, &is_known))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::family::PlatformKind;

    const CONFIG_H: &str = r#"
/* config.h.  Generated from config.h.in by configure.  */
#define HAVE_NANOSLEEP 1
#define HAVE_CLOCK_GETTIME 1
#define HAVE_SYS_TIME_H 1
#define HAVE__NSGETENVIRON 1
#define HAVE_Sleep 1
#define HAVE_FROBNICATE 1
#define HAVE_POLL 0
/* #undef HAVE_OPENAT */
#undef HAVE_FSTATAT
#define PACKAGE_NAME "gambit"
"#;

    fn anything(_: &str) -> bool {
        true
    }

    #[test]
    fn test_convert_defines() {
        let report = convert_config_header(CONFIG_H, None, TargetPlatform::default(), &anything);
        let caps = &report.probe.capabilities;

        assert!(caps.has("has-nanosleep"));
        assert!(caps.has("has-clock-gettime"));
        assert!(caps.has("has-sys-time-h"));
        assert!(caps.has("has-nsgetenviron"));
        assert!(caps.has("has-win32-sleep"));
        assert!(!caps.has("has-poll"));
        assert!(!caps.has("has-openat"));
        assert_eq!(
            report.undefined,
            ["HAVE_POLL", "HAVE_OPENAT", "HAVE_FSTATAT"]
        );
    }

    #[test]
    fn test_convert_reports_unknown_macros() {
        let known = |flag: &str| flag != "has-frobnicate";
        let report = convert_config_header(CONFIG_H, None, TargetPlatform::default(), &known);
        assert_eq!(report.unknown, ["HAVE_FROBNICATE"]);
        assert!(report.probe.capabilities.has("has-frobnicate"));
    }

    #[test]
    fn test_convert_carries_platform() {
        let report = convert_config_header(
            CONFIG_H,
            Some(OsFamily::Posix),
            TargetPlatform::new(PlatformKind::Macos).with_min_macos_version(101100),
            &anything,
        );

        let toml = report.probe.to_toml().unwrap();
        assert!(toml.contains("family = \"posix\""));
        assert!(toml.contains("target = \"macos\""));
        assert!(toml.contains("min_macos_version = 101100"));
        assert!(toml.contains("has-nanosleep = true"));

        // The output is itself a valid probe.
        let parsed = Probe::parse(&toml, "converted.toml").unwrap();
        assert_eq!(parsed, report.probe);
    }

    #[test]
    fn test_converted_linux_header_keeps_defaults() {
        let config_h = "#define HAVE_WAITPID 1\n#define HAVE_SETITIMER 1\n#define HAVE_SELECT 1\n";
        let report = convert_config_header(
            config_h,
            None,
            TargetPlatform::new(PlatformKind::Linux),
            &anything,
        );

        let profile = crate::ops::profile::resolve_profile(
            &report.probe,
            &crate::resolver::ResolveOptions::default(),
        )
        .unwrap();
        assert_eq!(
            profile.selections.option("heartbeat-timer"),
            Some("itimer_virtual")
        );
        assert!(profile.defines("USE_ASYNC_DEVICE_SELECT_ABORT"));
        assert!(!profile.defines("USE_ITIMER_REAL"));
    }

    #[test]
    fn test_convert_file_uses_catalog() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("config.h");
        std::fs::write(&path, CONFIG_H).unwrap();

        let report = convert_config_file(&path, None, TargetPlatform::default()).unwrap();
        assert_eq!(report.unknown, ["HAVE_FROBNICATE"]);
    }
}
