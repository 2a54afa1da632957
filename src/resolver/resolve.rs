//! Single-facility resolution.
//!
//! First match wins: candidates are scanned in declared priority order and
//! the first eligible one is chosen. Later candidates are never looked at
//! once one matches, even if their requirements also hold.

use std::fmt;

use serde::Serialize;

use crate::core::capability::CapabilitySet;
use crate::core::facility::{FacilitySpec, OptionSpec, Prerequisite};
use crate::core::family::OsFamily;
use crate::core::selection::{Origin, Selection, SelectionTable};

/// Whether one candidate may be chosen, and if not, why.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Eligibility {
    /// All requirements hold.
    Eligible,
    /// The candidate was removed by an exclusion override.
    Excluded,
    /// The candidate is not valid on the classified family.
    WrongFamily { family: OsFamily },
    /// Some required capability flags do not hold.
    MissingCapabilities { flags: Vec<&'static str> },
    /// A flag that rules the candidate out holds.
    RuledOut { flags: Vec<&'static str> },
    /// A prerequisite on another facility's selection does not hold.
    UnmetPrerequisite {
        #[serde(serialize_with = "serialize_display")]
        prerequisite: Prerequisite,
    },
}

fn serialize_display<S: serde::Serializer>(
    value: &Prerequisite,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.collect_str(value)
}

impl Eligibility {
    /// Check if the candidate may be chosen.
    pub fn is_eligible(&self) -> bool {
        matches!(self, Eligibility::Eligible)
    }
}

impl fmt::Display for Eligibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Eligibility::Eligible => write!(f, "eligible"),
            Eligibility::Excluded => write!(f, "excluded by platform override"),
            Eligibility::WrongFamily { family } => write!(f, "not available on {}", family),
            Eligibility::MissingCapabilities { flags } => {
                write!(f, "missing {}", flags.join(", "))
            }
            Eligibility::RuledOut { flags } => write!(f, "ruled out by {}", flags.join(", ")),
            Eligibility::UnmetPrerequisite { prerequisite } => {
                write!(f, "requires {}", prerequisite)
            }
        }
    }
}

/// Evaluate one candidate.
///
/// `family` is `None` while the family itself is being classified; no
/// family filter applies then.
pub fn evaluate_option(
    option: &OptionSpec,
    capabilities: &CapabilitySet,
    family: Option<OsFamily>,
    prior: &SelectionTable,
) -> Eligibility {
    if let Some(family) = family {
        if !option.allows_family(family) {
            return Eligibility::WrongFamily { family };
        }
    }

    let missing = capabilities.missing(option.requires);
    if !missing.is_empty() {
        return Eligibility::MissingCapabilities { flags: missing };
    }

    let ruled_out: Vec<&'static str> = option
        .unless
        .iter()
        .copied()
        .filter(|flag| capabilities.has(flag))
        .collect();
    if !ruled_out.is_empty() {
        return Eligibility::RuledOut { flags: ruled_out };
    }

    if let Some(unmet) = option.prerequisites.iter().find(|p| !p.holds(prior)) {
        return Eligibility::UnmetPrerequisite {
            prerequisite: *unmet,
        };
    }

    Eligibility::Eligible
}

/// Resolve one facility against the capability flags and prior selections.
pub fn resolve_facility(
    facility: &FacilitySpec,
    capabilities: &CapabilitySet,
    family: Option<OsFamily>,
    prior: &SelectionTable,
) -> Selection {
    resolve_excluding(facility, capabilities, family, prior, &[])
}

/// Like [`resolve_facility`], but skipping the `excluded` candidates.
pub fn resolve_excluding(
    facility: &FacilitySpec,
    capabilities: &CapabilitySet,
    family: Option<OsFamily>,
    prior: &SelectionTable,
    excluded: &[&str],
) -> Selection {
    facility
        .options
        .iter()
        .filter(|o| !excluded.contains(&o.name))
        .find(|o| evaluate_option(o, capabilities, family, prior).is_eligible())
        .map(|o| Selection::Chosen {
            option: o.name,
            origin: Origin::Capabilities,
        })
        .unwrap_or(Selection::Unavailable)
}

/// Evaluate every candidate of a facility, in priority order.
pub fn explain_facility(
    facility: &FacilitySpec,
    capabilities: &CapabilitySet,
    family: Option<OsFamily>,
    prior: &SelectionTable,
    excluded: &[&str],
) -> Vec<(&'static str, Eligibility)> {
    facility
        .options
        .iter()
        .map(|o| {
            let eligibility = if excluded.contains(&o.name) {
                Eligibility::Excluded
            } else {
                evaluate_option(o, capabilities, family, prior)
            };
            (o.name, eligibility)
        })
        .collect()
}
