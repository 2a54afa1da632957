//! Explain why a facility resolved the way it did.
//!
//! ```bash
//! osprofile explain probe.toml monotonic-clock
//! ```
//!
//! Every candidate is listed in priority order with the reason it was or
//! was not eligible, followed by any override that changed the outcome and
//! the facilities that read this one.

use anyhow::Result;
use serde::Serialize;

use crate::core::facility::{FacilityId, Stage};
use crate::core::family::OsFamily;
use crate::core::probe::Probe;
use crate::core::selection::{ProfileError, Selection};
use crate::resolver::overrides::OverrideAction;
use crate::resolver::{explain_facility, AppliedOverride, Eligibility, Resolver};

/// One candidate in an explanation.
#[derive(Debug, Clone, Serialize)]
pub struct CandidateReport {
    pub option: &'static str,
    pub rank: usize,
    #[serde(flatten)]
    pub eligibility: Eligibility,
    /// Whether this candidate is the final selection
    pub selected: bool,
}

/// Full explanation for one facility.
#[derive(Debug, Clone, Serialize)]
pub struct Explanation {
    pub facility: FacilityId,
    pub description: &'static str,
    pub stage: Stage,
    pub family: OsFamily,
    pub candidates: Vec<CandidateReport>,
    pub selection: Selection,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub applied_override: Option<AppliedOverride>,
    pub dependencies: Vec<FacilityId>,
    pub dependents: Vec<FacilityId>,
}

/// Explain one facility for a probe.
pub fn explain(resolver: &Resolver, probe: &Probe, facility_id: &str) -> Result<Explanation> {
    let Some(facility) = resolver.catalog().get(facility_id) else {
        let err = ProfileError::UnknownFacility {
            facility: facility_id.to_string(),
        };
        return Err(err.to_diagnostic().into());
    };

    let resolution = resolver.resolve(probe);

    let excluded: Vec<&str> = if resolver.options().apply_overrides {
        resolver
            .overrides()
            .iter()
            .filter(|o| o.facility == facility.id && o.scope.matches(&probe.target))
            .filter_map(|o| match o.action {
                OverrideAction::Exclude(option) => Some(option),
                _ => None,
            })
            .collect()
    } else {
        Vec::new()
    };

    // Classification runs before any family is known.
    let family = match facility.stage {
        Stage::Classification => None,
        _ => Some(resolution.family),
    };

    let selection = resolution
        .selections
        .get(facility.id)
        .copied()
        .unwrap_or(Selection::Unavailable);

    let candidates = explain_facility(
        facility,
        &resolution.capabilities,
        family,
        &resolution.selections,
        &excluded,
    )
    .into_iter()
    .enumerate()
    .map(|(rank, (option, eligibility))| CandidateReport {
        option,
        rank,
        eligibility,
        selected: selection.option() == Some(option),
    })
    .collect();

    let applied_override = resolution
        .overrides
        .iter()
        .find(|o| o.facility == facility.id)
        .cloned();

    Ok(Explanation {
        facility: facility.id,
        description: facility.description,
        stage: facility.stage,
        family: resolution.family,
        candidates,
        selection,
        applied_override,
        dependencies: facility.dependencies(),
        dependents: resolver.catalog().downstream_of(facility.id),
    })
}

/// Format an explanation for the terminal.
pub fn format_explanation(explanation: &Explanation) -> String {
    let mut out = format!(
        "{} ({}, {} stage) on {}\n",
        explanation.facility, explanation.description, explanation.stage, explanation.family
    );

    for candidate in &explanation.candidates {
        let marker = if candidate.selected { "=>" } else { "  " };
        out.push_str(&format!(
            "{} {}. {:<28} {}\n",
            marker,
            candidate.rank + 1,
            candidate.option,
            candidate.eligibility
        ));
    }

    out.push_str(&format!("\nselection: {}\n", describe(&explanation.selection)));

    if let Some(ref applied) = explanation.applied_override {
        out.push_str(&format!(
            "override: {} -> {} ({})\n",
            applied.before.label(),
            applied.after.label(),
            applied.cause
        ));
    }

    if !explanation.dependencies.is_empty() {
        out.push_str(&format!("reads: {}\n", explanation.dependencies.join(", ")));
    }
    if !explanation.dependents.is_empty() {
        out.push_str(&format!("read by: {}\n", explanation.dependents.join(", ")));
    }

    out
}

fn describe(selection: &Selection) -> String {
    match selection {
        Selection::Chosen { option, origin } => format!("{} ({})", option, origin),
        Selection::Unavailable => "none (no eligible candidate)".to_string(),
        Selection::Disabled { reason } => format!("none (disabled: {})", reason),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::capability::CapabilitySet;
    use crate::core::family::{PlatformKind, TargetPlatform};
    use crate::resolver::ResolveOptions;

    fn resolver() -> Resolver {
        Resolver::builtin(ResolveOptions::default()).unwrap()
    }

    #[test]
    fn test_explain_sleep() {
        let probe = Probe::new(CapabilitySet::from_names(["has-waitpid", "has-sleep"]));
        let explanation = explain(&resolver(), &probe, "sleep").unwrap();

        assert_eq!(explanation.candidates.len(), 3);
        assert!(!explanation.candidates[0].selected);
        assert!(explanation.candidates[2].selected);
        assert_eq!(explanation.selection.option(), Some("sleep"));

        let text = format_explanation(&explanation);
        assert!(text.contains("missing has-nanosleep"));
        assert!(text.contains("=> 3. sleep"));
    }

    #[test]
    fn test_explain_excluded_candidate() {
        let probe = Probe::new(CapabilitySet::from_names([
            "has-waitpid",
            "has-stat",
            "has-stat64",
            "has-struct-stat64",
        ]))
        .with_target(TargetPlatform::new(PlatformKind::Macos));

        let explanation = explain(&resolver(), &probe, "stat").unwrap();
        assert_eq!(explanation.candidates[0].eligibility, Eligibility::Excluded);
        assert_eq!(explanation.selection.option(), Some("stat"));
        assert!(explanation.applied_override.is_some());
    }

    #[test]
    fn test_explain_disabled_facility() {
        let probe = Probe::new(CapabilitySet::from_names(["has-waitpid", "has-clock-gettime"]))
            .with_target(TargetPlatform::new(PlatformKind::Ios));

        let explanation = explain(&resolver(), &probe, "clock-gettime").unwrap();
        assert!(matches!(explanation.selection, Selection::Disabled { .. }));
        // The candidate itself is still eligible; the override is what removed it.
        assert!(explanation.candidates[0].eligibility.is_eligible());
        assert!(explanation.dependents.contains(&"realtime-clock"));

        let text = format_explanation(&explanation);
        assert!(text.contains("none (disabled:"));
    }

    #[test]
    fn test_explain_classification() {
        let probe = Probe::new(CapabilitySet::from_names(["os-win32"]));
        let explanation = explain(&resolver(), &probe, "os-family").unwrap();
        assert_eq!(explanation.family, OsFamily::Win32);
        assert_eq!(explanation.selection.option(), Some("win32"));
    }

    #[test]
    fn test_explain_unknown_facility() {
        let probe = Probe::new(CapabilitySet::new());
        let err = explain(&resolver(), &probe, "teleport").unwrap_err();
        assert!(err.to_string().contains("unknown facility `teleport`"));
    }
}
