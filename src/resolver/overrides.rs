//! Platform overrides.
//!
//! Probing can be right about an API being present and still wrong about it
//! working. Overrides pin selections for specific target platforms and win
//! over anything the capability flags say. After pinning, every facility
//! whose prerequisites read a changed selection is resolved again so the
//! final table stays consistent.

use std::collections::HashMap;
use std::fmt;

use serde::Serialize;

use crate::catalog::Catalog;
use crate::core::capability::CapabilitySet;
use crate::core::facility::{FacilityId, Stage};
use crate::core::family::{OsFamily, PlatformKind, TargetPlatform};
use crate::core::selection::{Origin, Selection, SelectionTable};
use crate::resolver::errors::CatalogError;
use crate::resolver::resolve::resolve_excluding;

/// Which targets an override applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlatformScope {
    /// Every target of this kind
    Platform(PlatformKind),
    /// macOS targets whose minimum version is below the given one
    MacosBefore(u32),
}

impl PlatformScope {
    /// Check if the scope covers a target.
    ///
    /// A macOS target with no declared minimum version is assumed recent.
    pub fn matches(&self, target: &TargetPlatform) -> bool {
        match self {
            PlatformScope::Platform(kind) => target.kind == *kind,
            PlatformScope::MacosBefore(version) => {
                target.kind == PlatformKind::Macos
                    && target.min_macos_version.is_some_and(|v| v < *version)
            }
        }
    }
}

impl fmt::Display for PlatformScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlatformScope::Platform(kind) => write!(f, "{}", kind),
            PlatformScope::MacosBefore(version) => write!(f, "macos < {}", version),
        }
    }
}

/// What an override does to its facility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "action", content = "option", rename_all = "snake_case")]
pub enum OverrideAction {
    /// Select this option regardless of capabilities.
    Force(&'static str),
    /// Select nothing.
    Disable,
    /// Drop one candidate and let resolution fall through to the next.
    Exclude(&'static str),
}

impl fmt::Display for OverrideAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OverrideAction::Force(option) => write!(f, "force {}", option),
            OverrideAction::Disable => write!(f, "disable"),
            OverrideAction::Exclude(option) => write!(f, "exclude {}", option),
        }
    }
}

/// A platform-scoped rule on one facility.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Override {
    pub scope: PlatformScope,
    pub facility: FacilityId,
    pub action: OverrideAction,
    pub reason: &'static str,
}

/// Overrides for platforms known to misreport their capabilities.
pub const BUILTIN_OVERRIDES: &[Override] = &[
    Override {
        scope: PlatformScope::Platform(PlatformKind::Ios),
        facility: "nonblocking-file-io",
        action: OverrideAction::Disable,
        reason: "iOS claims nonblocking file I/O but does not support it",
    },
    Override {
        scope: PlatformScope::Platform(PlatformKind::Ios),
        facility: "clock-gettime",
        action: OverrideAction::Disable,
        reason: "iOS declares clock_gettime but it is unusable",
    },
    Override {
        scope: PlatformScope::MacosBefore(101200),
        facility: "clock-gettime",
        action: OverrideAction::Disable,
        reason: "clock_gettime is only available since macOS 10.12",
    },
    Override {
        scope: PlatformScope::Platform(PlatformKind::Macos),
        facility: "heartbeat-timer",
        action: OverrideAction::Force("itimer_real"),
        reason: "ITIMER_VIRTUAL is broken on macOS",
    },
    Override {
        scope: PlatformScope::Platform(PlatformKind::Cygwin),
        facility: "heartbeat-timer",
        action: OverrideAction::Force("itimer_real"),
        reason: "ITIMER_VIRTUAL is broken on Cygwin",
    },
    Override {
        scope: PlatformScope::Platform(PlatformKind::Macos),
        facility: "stat",
        action: OverrideAction::Exclude("stat64"),
        reason: "stat64 is deprecated on macOS",
    },
    Override {
        scope: PlatformScope::Platform(PlatformKind::Linux),
        facility: "sysctl",
        action: OverrideAction::Disable,
        reason: "sysctl is deprecated on Linux",
    },
    Override {
        scope: PlatformScope::Platform(PlatformKind::Linux),
        facility: "sysctlbyname",
        action: OverrideAction::Disable,
        reason: "sysctlbyname is not provided on Linux",
    },
];

/// Why a selection changed in the override pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Cause {
    /// An override on this facility
    Override {
        action: OverrideAction,
        reason: &'static str,
    },
    /// A prerequisite facility changed
    Downstream { of: FacilityId },
}

impl fmt::Display for Cause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cause::Override { action, reason } => write!(f, "{}: {}", action, reason),
            Cause::Downstream { of } => write!(f, "re-resolved after `{}` changed", of),
        }
    }
}

/// One selection the override pass changed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AppliedOverride {
    pub facility: FacilityId,
    pub before: Selection,
    pub after: Selection,
    pub cause: Cause,
}

/// Check that every override names a real facility and option.
pub fn validate_overrides(catalog: &Catalog, overrides: &[Override]) -> Result<(), CatalogError> {
    for rule in overrides {
        let Some(facility) = catalog.get(rule.facility) else {
            return Err(CatalogError::UnknownFacility {
                facility: rule.facility.to_string(),
                referenced_by: format!("override for {}", rule.scope),
            });
        };

        if let OverrideAction::Force(option) | OverrideAction::Exclude(option) = rule.action {
            if facility.option(option).is_none() {
                return Err(CatalogError::UnknownOption {
                    facility: rule.facility.to_string(),
                    option: option.to_string(),
                    referenced_by: format!("override for {}", rule.scope),
                });
            }
        }
    }
    Ok(())
}

/// Apply the overrides that match `target` to a capability-driven table.
///
/// Returns the final table and the list of selections that changed.
pub fn apply_overrides(
    catalog: &Catalog,
    selections: &SelectionTable,
    capabilities: &CapabilitySet,
    family: OsFamily,
    target: &TargetPlatform,
    overrides: &[Override],
) -> (SelectionTable, Vec<AppliedOverride>) {
    let mut pins: HashMap<FacilityId, &Override> = HashMap::new();
    let mut exclusions: HashMap<FacilityId, Vec<&Override>> = HashMap::new();

    for rule in overrides.iter().filter(|r| r.scope.matches(target)) {
        match rule.action {
            // Later pins replace earlier ones.
            OverrideAction::Force(_) | OverrideAction::Disable => {
                pins.insert(rule.facility, rule);
            }
            OverrideAction::Exclude(_) => exclusions.entry(rule.facility).or_default().push(rule),
        }
    }

    if pins.is_empty() && exclusions.is_empty() {
        return (selections.clone(), Vec::new());
    }

    let mut table = SelectionTable::new();
    let mut applied = Vec::new();

    for facility in catalog.visiting_order() {
        let Some(before) = selections.get(facility.id).copied() else {
            continue;
        };

        if facility.stage == Stage::Classification
            && (pins.contains_key(facility.id) || exclusions.contains_key(facility.id))
        {
            tracing::warn!(
                "ignoring override on classification facility `{}`",
                facility.id
            );
            table.insert(facility.id, before);
            continue;
        }

        let (after, cause) = if let Some(rule) = pins.get(facility.id) {
            let after = match rule.action {
                OverrideAction::Force(option) => Selection::Chosen {
                    option,
                    origin: Origin::Forced {
                        reason: rule.reason,
                    },
                },
                _ => Selection::Disabled {
                    reason: rule.reason,
                },
            };
            (
                after,
                Cause::Override {
                    action: rule.action,
                    reason: rule.reason,
                },
            )
        } else if let Some(rules) = exclusions.get(facility.id) {
            let excluded: Vec<&str> = rules
                .iter()
                .filter_map(|r| match r.action {
                    OverrideAction::Exclude(option) => Some(option),
                    _ => None,
                })
                .collect();
            let after =
                resolve_excluding(facility, capabilities, Some(family), &table, &excluded);
            let rule = rules[0];
            (
                after,
                Cause::Override {
                    action: rule.action,
                    reason: rule.reason,
                },
            )
        } else if let Some(changed) = facility
            .dependencies()
            .into_iter()
            .find(|dep| selections.get(dep) != table.get(dep))
        {
            let after = resolve_excluding(facility, capabilities, Some(family), &table, &[]);
            (after, Cause::Downstream { of: changed })
        } else {
            table.insert(facility.id, before);
            continue;
        };

        if after != before {
            tracing::debug!(
                "override: {} {} -> {} ({})",
                facility.id,
                before.label(),
                after.label(),
                cause
            );
            applied.push(AppliedOverride {
                facility: facility.id,
                before,
                after,
                cause,
            });
        }
        table.insert(facility.id, after);
    }

    (table, applied)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scope_matching() {
        let macos_old = TargetPlatform::new(PlatformKind::Macos).with_min_macos_version(101100);
        let macos_new = TargetPlatform::new(PlatformKind::Macos).with_min_macos_version(101300);
        let macos_any = TargetPlatform::new(PlatformKind::Macos);

        let scope = PlatformScope::MacosBefore(101200);
        assert!(scope.matches(&macos_old));
        assert!(!scope.matches(&macos_new));
        assert!(!scope.matches(&macos_any));
        assert!(!scope.matches(&TargetPlatform::new(PlatformKind::Linux)));

        assert!(PlatformScope::Platform(PlatformKind::Ios)
            .matches(&TargetPlatform::new(PlatformKind::Ios)));
    }

    #[test]
    fn test_builtin_overrides_are_valid() {
        let catalog = Catalog::builtin().unwrap();
        validate_overrides(&catalog, BUILTIN_OVERRIDES).unwrap();
    }

    #[test]
    fn test_validate_rejects_unknown_targets() {
        let catalog = Catalog::builtin().unwrap();

        let bad_facility = [Override {
            scope: PlatformScope::Platform(PlatformKind::Linux),
            facility: "teleport",
            action: OverrideAction::Disable,
            reason: "",
        }];
        assert!(matches!(
            validate_overrides(&catalog, &bad_facility),
            Err(CatalogError::UnknownFacility { .. })
        ));

        let bad_option = [Override {
            scope: PlatformScope::Platform(PlatformKind::Linux),
            facility: "sleep",
            action: OverrideAction::Force("usleep"),
            reason: "",
        }];
        assert!(matches!(
            validate_overrides(&catalog, &bad_option),
            Err(CatalogError::UnknownOption { .. })
        ));
    }

    #[test]
    fn test_no_matching_override_is_identity() {
        let catalog = Catalog::builtin().unwrap();
        let mut table = SelectionTable::new();
        table.insert(
            "sleep",
            Selection::Chosen {
                option: "nanosleep",
                origin: Origin::Capabilities,
            },
        );

        let (after, applied) = apply_overrides(
            &catalog,
            &table,
            &CapabilitySet::new(),
            OsFamily::Posix,
            &TargetPlatform::new(PlatformKind::Other),
            BUILTIN_OVERRIDES,
        );
        assert_eq!(after, table);
        assert!(applied.is_empty());
    }

    #[test]
    fn test_cause_display() {
        let cause = Cause::Override {
            action: OverrideAction::Force("itimer_real"),
            reason: "broken",
        };
        assert_eq!(cause.to_string(), "force itimer_real: broken");
        assert_eq!(
            Cause::Downstream { of: "clock-gettime" }.to_string(),
            "re-resolved after `clock-gettime` changed"
        );
    }
}
