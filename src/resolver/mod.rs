//! Facility resolution.
//!
//! One pass turns a probe into a selection table:
//!
//! 1. classify the OS family (explicit tag, or the `os-family` facility),
//! 2. derive the effective capability set from the family strategy and the
//!    configured masks,
//! 3. resolve every facility in visiting order, first match wins,
//! 4. apply platform overrides and re-resolve whatever depends on them.
//!
//! The resolver is pure and deterministic - the same probe and options
//! always produce the same table.

pub mod errors;
pub mod order;
pub mod overrides;
pub mod resolve;

pub use errors::CatalogError;
pub use overrides::{AppliedOverride, Override, OverrideAction, PlatformScope, BUILTIN_OVERRIDES};
pub use resolve::{evaluate_option, explain_facility, resolve_facility, Eligibility};

use crate::catalog::{Catalog, OS_FAMILY};
use crate::core::capability::CapabilitySet;
use crate::core::family::{OsFamily, TargetPlatform};
use crate::core::probe::Probe;
use crate::core::selection::{Origin, Selection, SelectionTable};

/// Flag reporting poll(2); masked unless poll is enabled for select.
pub const POLL_CAPABILITY: &str = "has-poll";

/// Policy knobs for a resolution pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolveOptions {
    /// Allow `poll` as the select implementation
    pub poll_for_select: bool,
    /// Apply platform overrides
    pub apply_overrides: bool,
    /// Flags to treat as present
    pub assume: Vec<String>,
    /// Flags to treat as absent (wins over everything)
    pub deny: Vec<String>,
}

impl Default for ResolveOptions {
    fn default() -> Self {
        ResolveOptions {
            poll_for_select: false,
            apply_overrides: true,
            assume: Vec::new(),
            deny: Vec::new(),
        }
    }
}

/// The outcome of one resolution pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    /// Classified OS family
    pub family: OsFamily,
    /// Target platform from the probe
    pub target: TargetPlatform,
    /// Capability flags the facilities were resolved against
    pub capabilities: CapabilitySet,
    /// Final selections, in visiting order
    pub selections: SelectionTable,
    /// Selections the override pass changed
    pub overrides: Vec<AppliedOverride>,
}

/// Resolves probes against a validated catalogue.
#[derive(Debug, Clone)]
pub struct Resolver {
    catalog: Catalog,
    overrides: Vec<Override>,
    options: ResolveOptions,
}

impl Resolver {
    /// Create a resolver with the built-in overrides.
    pub fn new(catalog: Catalog, options: ResolveOptions) -> Result<Self, CatalogError> {
        Resolver {
            catalog,
            overrides: Vec::new(),
            options,
        }
        .with_overrides(BUILTIN_OVERRIDES.to_vec())
    }

    /// Create a resolver over the built-in catalogue.
    pub fn builtin(options: ResolveOptions) -> Result<Self, CatalogError> {
        Resolver::new(Catalog::builtin()?, options)
    }

    /// Replace the override rules.
    pub fn with_overrides(mut self, overrides: Vec<Override>) -> Result<Self, CatalogError> {
        overrides::validate_overrides(&self.catalog, &overrides)?;
        self.overrides = overrides;
        Ok(self)
    }

    /// The catalogue in use.
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// The override rules in use.
    pub fn overrides(&self) -> &[Override] {
        &self.overrides
    }

    /// The policy in use.
    pub fn options(&self) -> &ResolveOptions {
        &self.options
    }

    /// Classify the family and compute the capability set facilities are
    /// resolved against.
    pub fn prepare(&self, probe: &Probe) -> (Selection, OsFamily, CapabilitySet) {
        let probed = probe
            .capabilities
            .with(probe.target.implied_capabilities().iter().copied())
            .with(self.options.assume.iter().cloned())
            .without(self.options.deny.iter());

        let classification = match probe.family {
            Some(family) => Selection::Chosen {
                option: family.as_str(),
                origin: Origin::Explicit,
            },
            None => match self.catalog.get(OS_FAMILY) {
                Some(facility) => {
                    resolve_facility(facility, &probed, None, &SelectionTable::new())
                }
                None => Selection::Unavailable,
            },
        };

        let family = classification
            .option()
            .and_then(OsFamily::from_option)
            .unwrap_or(OsFamily::Generic);

        let strategy = family.strategy();
        let mut effective = probed
            .with(strategy.implied_capabilities.iter().copied())
            .without(strategy.suppressed_capabilities.iter())
            .without(self.options.deny.iter());
        if !self.options.poll_for_select {
            effective = effective.without([POLL_CAPABILITY]);
        }

        (classification, family, effective)
    }

    /// Resolve a probe.
    pub fn resolve(&self, probe: &Probe) -> Resolution {
        let (classification, family, capabilities) = self.prepare(probe);
        tracing::debug!(
            "classified as {} ({} effective capabilities)",
            family,
            capabilities.len()
        );

        let mut selections = SelectionTable::new();
        for facility in self.catalog.visiting_order() {
            let selection = if facility.id == OS_FAMILY {
                classification
            } else {
                resolve_facility(facility, &capabilities, Some(family), &selections)
            };
            tracing::trace!("{} -> {}", facility.id, selection.label());
            selections.insert(facility.id, selection);
        }

        let (selections, applied) = if self.options.apply_overrides {
            overrides::apply_overrides(
                &self.catalog,
                &selections,
                &capabilities,
                family,
                &probe.target,
                &self.overrides,
            )
        } else {
            (selections, Vec::new())
        };

        Resolution {
            family,
            target: probe.target,
            capabilities,
            selections,
            overrides: applied,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::family::PlatformKind;

    fn resolver() -> Resolver {
        Resolver::builtin(ResolveOptions::default()).unwrap()
    }

    fn probe(flags: &[&str]) -> Probe {
        Probe::new(CapabilitySet::from_names(flags.iter().copied()))
    }

    fn linux_flags() -> Vec<&'static str> {
        vec![
            "has-waitpid",
            "supports-long-path",
            "has-open",
            "has-openat",
            "has-stat",
            "has-fstatat",
            "has-opendir",
            "has-fdopendir",
            "has-rename",
            "has-renameat",
            "has-renameat2",
            "has-sys-syscall-h",
            "has-linux-fs-h",
            "has-clock-gettime",
            "has-gettimeofday",
            "has-nanosleep",
            "has-setitimer",
            "has-socket",
            "has-getaddrinfo",
            "has-select",
            "has-poll",
            "has-ppoll",
            "has-sysctl",
            "has-dlopen",
            "has-sigaction",
            "has-sigemptyset",
            "has-sigaddset",
            "has-sigprocmask",
        ]
    }

    #[test]
    fn test_classification_heuristic() {
        let r = resolver();
        assert_eq!(r.resolve(&probe(&["has-waitpid"])).family, OsFamily::Posix);
        assert_eq!(r.resolve(&probe(&["os-win32"])).family, OsFamily::Win32);
        assert_eq!(r.resolve(&probe(&[])).family, OsFamily::Generic);

        let windows = probe(&[]).with_target(TargetPlatform::new(PlatformKind::Windows));
        assert_eq!(r.resolve(&windows).family, OsFamily::Win32);
    }

    #[test]
    fn test_explicit_family_wins() {
        let resolution = resolver().resolve(&probe(&["has-waitpid"]).with_family(OsFamily::Generic));
        assert_eq!(resolution.family, OsFamily::Generic);
        assert_eq!(
            resolution.selections.get(OS_FAMILY),
            Some(&Selection::Chosen {
                option: "generic",
                origin: Origin::Explicit
            })
        );
    }

    #[test]
    fn test_exactly_one_selection_per_facility() {
        let r = resolver();
        let resolution = r.resolve(&probe(&linux_flags()));
        assert_eq!(resolution.selections.len(), r.catalog().len());
        for facility in r.catalog().facilities() {
            assert!(resolution.selections.get(facility.id).is_some(), "{}", facility.id);
        }
    }

    #[test]
    fn test_deterministic() {
        let r = resolver();
        let p = probe(&linux_flags());
        assert_eq!(r.resolve(&p), r.resolve(&p));

        let mut reversed = linux_flags();
        reversed.reverse();
        assert_eq!(r.resolve(&p), r.resolve(&probe(&reversed)));
    }

    #[test]
    fn test_openat_and_fstatat_example() {
        let r = resolver();
        let resolution = r.resolve(
            &probe(&["has-openat", "has-fstatat", "supports-long-path"])
                .with_family(OsFamily::Posix),
        );

        let sel = &resolution.selections;
        assert_eq!(sel.option("open"), Some("openat"));
        assert_eq!(sel.option("stat"), Some("fstatat"));

        // Against the same platform without the two calls, exactly the
        // shared file headers are added, each once.
        let baseline = r.resolve(&probe(&["supports-long-path"]).with_family(OsFamily::Posix));
        let with_calls = crate::emit::aggregate_imports(r.catalog(), sel);
        let without = crate::emit::aggregate_imports(r.catalog(), &baseline.selections);
        let added: Vec<&str> = with_calls
            .difference(&without)
            .iter()
            .map(|i| i.header())
            .collect();
        assert_eq!(added, ["unistd.h", "sys/types.h", "sys/stat.h", "fcntl.h"]);
        assert!(without.difference(&with_calls).is_empty());
    }

    #[test]
    fn test_at_variant_implies_base_call() {
        let resolution = resolver().resolve(
            &probe(&["has-open", "has-openat", "has-stat", "has-fstatat", "supports-long-path"])
                .with_family(OsFamily::Posix),
        );
        assert_eq!(resolution.selections.option("open"), Some("openat"));
        assert_eq!(resolution.selections.option("stat"), Some("fstatat"));

        let without_long_path = resolver().resolve(
            &probe(&["has-openat", "has-fstatat"]).with_family(OsFamily::Posix),
        );
        assert!(!without_long_path.selections.get("open").unwrap().is_available());
        assert!(!without_long_path.selections.get("stat").unwrap().is_available());
    }

    #[test]
    fn test_openat_needs_long_path() {
        let resolution = resolver().resolve(
            &probe(&["has-open", "has-openat", "has-stat", "has-fstatat"])
                .with_family(OsFamily::Posix),
        );
        assert_eq!(resolution.selections.option("open"), Some("open"));
        assert_eq!(resolution.selections.option("stat"), Some("stat"));
    }

    #[test]
    fn test_dependency_enforcement() {
        let r = resolver();
        let resolution = r.resolve(&probe(&linux_flags()));

        for (id, selection) in resolution.selections.iter() {
            let Some(option) = selection.option() else {
                continue;
            };
            let facility = r.catalog().get(id).unwrap();
            let spec = facility.option(option).unwrap();
            if matches!(selection, Selection::Chosen { origin: Origin::Capabilities, .. }) {
                for prerequisite in spec.prerequisites {
                    assert!(
                        prerequisite.holds(&resolution.selections),
                        "{}={} violates {}",
                        id,
                        option,
                        prerequisite
                    );
                }
            }
        }
    }

    #[test]
    fn test_priority_respected() {
        // Both nanosleep and sleep exist; nanosleep is declared first.
        let resolution = resolver().resolve(&probe(&["has-waitpid", "has-sleep", "has-nanosleep"]));
        assert_eq!(resolution.selections.option("sleep"), Some("nanosleep"));

        let resolution = resolver().resolve(&probe(&["has-waitpid", "has-sleep"]));
        assert_eq!(resolution.selections.option("sleep"), Some("sleep"));
    }

    #[test]
    fn test_poll_masked_by_default() {
        let p = probe(&linux_flags());

        let resolution = resolver().resolve(&p);
        assert_eq!(resolution.selections.option("select-multiplexing"), Some("select"));
        assert_eq!(resolution.selections.option("poll-timeout"), None);
        assert!(!resolution.capabilities.has(POLL_CAPABILITY));

        let with_poll = Resolver::builtin(ResolveOptions {
            poll_for_select: true,
            ..ResolveOptions::default()
        })
        .unwrap()
        .resolve(&p);
        assert_eq!(with_poll.selections.option("select-multiplexing"), Some("poll"));
        assert_eq!(with_poll.selections.option("poll-timeout"), Some("ppoll"));
        assert_eq!(with_poll.selections.option("timespec"), Some("timespec"));
    }

    #[test]
    fn test_assume_and_deny() {
        let resolver = Resolver::builtin(ResolveOptions {
            assume: vec!["has-dlopen".to_string()],
            deny: vec!["has-nanosleep".to_string()],
            ..ResolveOptions::default()
        })
        .unwrap();

        let resolution = resolver.resolve(&probe(&["has-waitpid", "has-nanosleep", "has-sleep"]));
        assert_eq!(resolution.selections.option("dynamic-loader"), Some("dlopen"));
        assert_eq!(resolution.selections.option("sleep"), Some("sleep"));
    }

    #[test]
    fn test_win32_strategy_implies_capabilities() {
        let resolution = resolver().resolve(&probe(&["os-win32", "has-inet-pton"]));
        let sel = &resolution.selections;

        assert_eq!(resolution.family, OsFamily::Win32);
        assert_eq!(sel.option("dynamic-loader"), Some("LoadLibrary"));
        assert_eq!(sel.option("sleep"), Some("Sleep"));
        assert_eq!(sel.option("process-time"), Some("GetProcessTimes"));
        assert_eq!(sel.option("networking"), Some("winsock"));
        assert_eq!(sel.option("select-multiplexing"), Some("MsgWaitForMultipleObjects"));
        assert_eq!(sel.option("filetime"), Some("FILETIME"));
        // inet_pton is masked on Win32 even when probed.
        assert_eq!(sel.option("inet-pton"), None);
        // POSIX-only file operations are never chosen.
        assert_eq!(sel.option("open"), None);
    }

    #[test]
    fn test_networking_gates_lookups() {
        let without = resolver().resolve(&probe(&["has-waitpid", "has-getaddrinfo"]));
        assert_eq!(without.selections.option("networking"), None);
        assert_eq!(without.selections.option("getaddrinfo"), None);

        let with = resolver().resolve(&probe(&["has-waitpid", "has-socket", "has-getaddrinfo"]));
        assert_eq!(with.selections.option("networking"), Some("bsd_sockets"));
        assert_eq!(with.selections.option("getaddrinfo"), Some("getaddrinfo"));
    }

    #[test]
    fn test_broken_virtual_timer_forced_to_real() {
        let flags = ["has-waitpid", "has-setitimer"];

        let linux = resolver()
            .resolve(&probe(&flags).with_target(TargetPlatform::new(PlatformKind::Linux)));
        assert_eq!(linux.selections.option("heartbeat-timer"), Some("itimer_virtual"));

        for kind in [PlatformKind::Macos, PlatformKind::Cygwin] {
            let resolution =
                resolver().resolve(&probe(&flags).with_target(TargetPlatform::new(kind)));
            assert_eq!(
                resolution.selections.get("heartbeat-timer"),
                Some(&Selection::Chosen {
                    option: "itimer_real",
                    origin: Origin::Forced {
                        reason: if kind == PlatformKind::Macos {
                            "ITIMER_VIRTUAL is broken on macOS"
                        } else {
                            "ITIMER_VIRTUAL is broken on Cygwin"
                        }
                    }
                })
            );
        }
    }

    #[test]
    fn test_negative_flags_rule_out_defaults() {
        let flags = ["has-waitpid", "has-setitimer"];
        let defaults = resolver().resolve(&probe(&flags));
        assert_eq!(defaults.selections.option("heartbeat-timer"), Some("itimer_virtual"));
        assert_eq!(
            defaults.selections.option("async-device-select-abort"),
            Some("thread_system")
        );

        let lacking = resolver().resolve(&probe(&[
            "has-waitpid",
            "has-setitimer",
            "lacks-itimer-virtual",
            "no-thread-system",
        ]));
        assert_eq!(lacking.selections.option("heartbeat-timer"), Some("itimer_real"));
        assert!(!lacking
            .selections
            .get("async-device-select-abort")
            .unwrap()
            .is_available());

        // Win32 aborts a select whether or not a thread system exists.
        let win32 = resolver()
            .resolve(&probe(&["no-thread-system"]).with_family(OsFamily::Win32));
        assert_eq!(
            win32.selections.option("async-device-select-abort"),
            Some("win32")
        );
    }

    #[test]
    fn test_ios_disables_claimed_features() {
        let flags = ["has-waitpid", "has-clock-gettime", "has-gettimeofday"];
        let ios = resolver().resolve(&probe(&flags).with_target(TargetPlatform::new(PlatformKind::Ios)));
        let sel = &ios.selections;

        assert!(matches!(sel.get("nonblocking-file-io"), Some(Selection::Disabled { .. })));
        assert!(matches!(sel.get("clock-gettime"), Some(Selection::Disabled { .. })));
        // Dependents fall back once the clock is disabled.
        assert_eq!(sel.option("realtime-clock"), Some("gettimeofday"));
        assert_eq!(sel.option("monotonic-clock"), None);

        let other = resolver().resolve(&probe(&flags));
        assert_eq!(other.selections.option("realtime-clock"), Some("clock_gettime_realtime"));
        assert_eq!(
            other.selections.option("nonblocking-file-io"),
            Some("nonblocking_file_io")
        );
    }

    #[test]
    fn test_old_macos_loses_clock_gettime() {
        let flags = ["has-waitpid", "has-clock-gettime", "has-gettimeofday"];
        let target = TargetPlatform::new(PlatformKind::Macos).with_min_macos_version(101100);
        let resolution = resolver().resolve(&probe(&flags).with_target(target));

        assert_eq!(resolution.selections.option("realtime-clock"), Some("gettimeofday"));
        assert!(resolution
            .overrides
            .iter()
            .any(|o| o.facility == "realtime-clock"
                && matches!(o.cause, overrides::Cause::Downstream { of: "clock-gettime" })));
    }

    #[test]
    fn test_macos_excludes_stat64() {
        let flags = ["has-waitpid", "has-stat", "has-stat64", "has-struct-stat64"];
        let linux = resolver()
            .resolve(&probe(&flags).with_target(TargetPlatform::new(PlatformKind::Linux)));
        assert_eq!(linux.selections.option("stat"), Some("stat64"));

        let macos = resolver()
            .resolve(&probe(&flags).with_target(TargetPlatform::new(PlatformKind::Macos)));
        assert_eq!(macos.selections.option("stat"), Some("stat"));
    }

    #[test]
    fn test_overrides_can_be_turned_off() {
        let flags = ["has-waitpid", "has-setitimer"];
        let resolver = Resolver::builtin(ResolveOptions {
            apply_overrides: false,
            ..ResolveOptions::default()
        })
        .unwrap();

        let resolution =
            resolver.resolve(&probe(&flags).with_target(TargetPlatform::new(PlatformKind::Macos)));
        assert_eq!(
            resolution.selections.option("heartbeat-timer"),
            Some("itimer_virtual")
        );
        assert!(resolution.overrides.is_empty());
    }

    #[test]
    fn test_linux_disables_sysctl() {
        let resolution = resolver().resolve(
            &probe(&linux_flags()).with_target(TargetPlatform::new(PlatformKind::Linux)),
        );
        assert!(matches!(
            resolution.selections.get("sysctl"),
            Some(Selection::Disabled { .. })
        ));
        assert_eq!(
            resolution.selections.option("atomic-rename"),
            Some("renameat2")
        );
        assert_eq!(
            resolution.selections.option("renameat2-syscall"),
            Some("renameat2_syscall")
        );
    }
}
