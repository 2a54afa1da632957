//! Probe -> profile.

use std::path::Path;

use anyhow::{Context, Result};

use crate::core::probe::Probe;
use crate::core::profile::PlatformProfile;
use crate::emit;
use crate::resolver::{ResolveOptions, Resolver};

/// Resolve a probe into a full platform profile.
pub fn resolve_profile(probe: &Probe, options: &ResolveOptions) -> Result<PlatformProfile> {
    let resolver = Resolver::builtin(options.clone())
        .map_err(|e| e.to_diagnostic())
        .context("built-in catalogue is invalid")?;

    Ok(profile_with(&resolver, probe))
}

/// Resolve a probe with an existing resolver.
pub fn profile_with(resolver: &Resolver, probe: &Probe) -> PlatformProfile {
    let resolution = resolver.resolve(probe);
    let unavailable = resolution.selections.unavailable().len();
    tracing::info!(
        "resolved {} facilities for {} ({} unavailable, {} overridden)",
        resolution.selections.len(),
        resolution.family,
        unavailable,
        resolution.overrides.len()
    );

    emit::build_profile(resolver.catalog(), resolution)
}

/// Load a probe file. Errors become diagnostics except syntax errors,
/// which keep their source for a snippet report.
pub fn load_probe(path: &Path) -> Result<Probe> {
    Probe::load(path).map_err(|e| match e.to_diagnostic() {
        Some(diag) => diag.into(),
        None => e.into(),
    })
}

/// Load a probe file and resolve it.
pub fn resolve_probe_file(path: &Path, options: &ResolveOptions) -> Result<PlatformProfile> {
    let probe = load_probe(path)?;
    resolve_profile(&probe, options)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::capability::CapabilitySet;
    use crate::core::family::{OsFamily, PlatformKind, TargetPlatform};
    use crate::core::import::DeclarationImport;
    use crate::emit::render::{render, render_header, OutputFormat};
    use tempfile::TempDir;

    fn macos_probe() -> Probe {
        Probe::new(CapabilitySet::from_names([
            "has-waitpid",
            "has-open",
            "has-openat",
            "has-stat",
            "has-fstatat",
            "supports-long-path",
            "has-setitimer",
            "has-socket",
            "has-getaddrinfo",
            "has-shut-rd",
            "has-shut-wr",
            "has-nsgetenviron",
            "has-mach-absolute-time",
            "has-clock-gettime",
        ]))
        .with_target(TargetPlatform::new(PlatformKind::Macos))
    }

    #[test]
    fn test_openat_profile() {
        let probe = Probe::new(CapabilitySet::from_names([
            "has-open",
            "has-openat",
            "has-stat",
            "has-fstatat",
            "supports-long-path",
        ]))
        .with_family(OsFamily::Posix);

        let profile = resolve_profile(&probe, &ResolveOptions::default()).unwrap();
        assert!(profile.defines("USE_openat"));
        assert!(profile.defines("USE_fstatat"));
        assert!(profile.defines("USE_POSIX"));
        assert!(profile.defines("___SUPPORT_LONG_PATH"));
        assert!(profile.imports.contains(DeclarationImport::SysTypesH));
        assert!(profile.imports.contains(DeclarationImport::SysStatH));
    }

    #[test]
    fn test_macos_profile() {
        let profile = resolve_profile(&macos_probe(), &ResolveOptions::default()).unwrap();

        assert!(profile.defines("USE_ITIMER_REAL"));
        assert!(profile.defines("USE_environ"));
        assert!(profile.defines("USE_mach_absolute_time"));
        assert_eq!(
            profile.bindings.get("HEARTBEAT_SIG").map(|v| v.to_string()).as_deref(),
            Some("SIGALRM")
        );
        assert!(profile.bindings.contains("SOCKET_TYPE"));
        assert!(profile.overrides.iter().any(|o| o.facility == "heartbeat-timer"));
    }

    #[test]
    fn test_profile_is_deterministic() {
        let a = resolve_profile(&macos_probe(), &ResolveOptions::default()).unwrap();
        let b = resolve_profile(&macos_probe(), &ResolveOptions::default()).unwrap();
        assert_eq!(a, b);
        assert_eq!(
            render(&a, OutputFormat::Json).unwrap(),
            render(&b, OutputFormat::Json).unwrap()
        );
    }

    #[test]
    fn test_render_formats() {
        let profile = resolve_profile(&macos_probe(), &ResolveOptions::default()).unwrap();

        let json: serde_json::Value =
            serde_json::from_str(&render(&profile, OutputFormat::Json).unwrap()).unwrap();
        assert_eq!(json["family"], "posix");
        assert_eq!(json["target"]["kind"], "macos");

        let toml_text = render(&profile, OutputFormat::Toml).unwrap();
        assert!(toml_text.contains("family = \"posix\""));

        let header = render_header(&profile);
        assert!(header.contains("#ifndef OSPROFILE_H"));
        assert!(header.contains("#define USE_openat\n"));
        assert!(header.contains("#include <fcntl.h>"));
        assert!(header.contains("#define HEARTBEAT_ITIMER ITIMER_REAL"));
        assert!(header.contains("/* heartbeat-timer: forced to itimer_real */"));
        assert!(header.trim_end().ends_with("#endif /* OSPROFILE_H */"));
    }

    #[test]
    fn test_header_respects_reported_headers() {
        let probe = Probe::new(CapabilitySet::from_names([
            "has-waitpid",
            "has-open",
            "has-fcntl-h",
        ]));
        let profile = resolve_profile(&probe, &ResolveOptions::default()).unwrap();
        let header = render_header(&profile);

        assert!(header.contains("#include <fcntl.h>"));
        assert!(!header.contains("#include <sys/stat.h>"));
    }

    #[test]
    fn test_resolve_probe_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("probe.toml");
        std::fs::write(
            &path,
            r#"
[platform]
family = "posix"

[capabilities]
has-nanosleep = true
has-sleep = true
"#,
        )
        .unwrap();

        let profile = resolve_probe_file(&path, &ResolveOptions::default()).unwrap();
        assert!(profile.defines("USE_nanosleep"));
        assert!(!profile.defines("USE_sleep"));

        let err = resolve_probe_file(&tmp.path().join("missing.toml"), &ResolveOptions::default())
            .unwrap_err();
        let diag = err.downcast_ref::<crate::util::diagnostic::Diagnostic>().unwrap();
        assert!(diag.location.as_ref().unwrap().ends_with("missing.toml"));

        std::fs::write(&path, "[capabilities]\nhas-poll = maybe\n").unwrap();
        let err = load_probe(&path).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<crate::core::ProbeError>(),
            Some(crate::core::ProbeError::Syntax(_))
        ));
    }
}
