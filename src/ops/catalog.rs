//! Catalogue listing.

use serde::Serialize;

use crate::catalog::Catalog;
use crate::core::facility::{FacilityId, FacilitySpec, Stage};
use crate::resolver::Override;

/// One facility, flattened for display.
#[derive(Debug, Clone, Serialize)]
pub struct FacilitySummary {
    pub id: FacilityId,
    pub description: &'static str,
    pub stage: Stage,
    pub options: Vec<&'static str>,
}

impl From<&FacilitySpec> for FacilitySummary {
    fn from(facility: &FacilitySpec) -> Self {
        FacilitySummary {
            id: facility.id,
            description: facility.description,
            stage: facility.stage,
            options: facility.options.iter().map(|o| o.name).collect(),
        }
    }
}

/// List facilities in visiting order.
pub fn list_facilities(catalog: &Catalog) -> Vec<FacilitySummary> {
    catalog.visiting_order().map(FacilitySummary::from).collect()
}

/// Format the facility list as a table.
pub fn format_catalog(summaries: &[FacilitySummary]) -> String {
    let width = summaries.iter().map(|s| s.id.len()).max().unwrap_or(0);
    let mut out = String::new();
    let mut stage = None;

    for summary in summaries {
        if stage != Some(summary.stage) {
            stage = Some(summary.stage);
            out.push_str(&format!("{}:\n", summary.stage));
        }
        out.push_str(&format!(
            "  {:<width$}  {}\n",
            summary.id,
            summary.options.join(" > "),
            width = width
        ));
    }

    out
}

/// Describe one facility in full, including the overrides that touch it.
pub fn describe_facility(facility: &FacilitySpec, overrides: &[Override]) -> String {
    let mut out = format!(
        "{}: {} ({} stage)\n\ncandidates, highest priority first:\n",
        facility.id, facility.description, facility.stage
    );

    for (i, option) in facility.options.iter().enumerate() {
        out.push_str(&format!("  {}. {}\n", i + 1, option.name));
        if !option.requires.is_empty() {
            out.push_str(&format!("       requires: {}\n", option.requires.join(", ")));
        }
        if !option.unless.is_empty() {
            out.push_str(&format!("       unless:   {}\n", option.unless.join(", ")));
        }
        if !option.families.is_empty() {
            let families: Vec<&str> = option.families.iter().map(|f| f.as_str()).collect();
            out.push_str(&format!("       families: {}\n", families.join(", ")));
        }
        for prerequisite in option.prerequisites {
            out.push_str(&format!("       after:    {}\n", prerequisite));
        }
        if !option.imports.is_empty() {
            let headers: Vec<&str> = option.imports.iter().map(|i| i.header()).collect();
            out.push_str(&format!("       imports:  {}\n", headers.join(", ")));
        }
        let symbols = option.symbol_names();
        if !symbols.is_empty() {
            out.push_str(&format!("       defines:  {}\n", symbols.join(", ")));
        }
    }

    let relevant: Vec<&Override> = overrides
        .iter()
        .filter(|o| o.facility == facility.id)
        .collect();
    if !relevant.is_empty() {
        out.push_str("\noverrides:\n");
        for rule in relevant {
            out.push_str(&format!("  {}: {} ({})\n", rule.scope, rule.action, rule.reason));
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::BUILTIN_OVERRIDES;

    #[test]
    fn test_list_starts_with_classification() {
        let catalog = Catalog::builtin().unwrap();
        let summaries = list_facilities(&catalog);
        assert_eq!(summaries.len(), catalog.len());
        assert_eq!(summaries[0].id, "os-family");
        assert_eq!(summaries[0].options, ["posix", "win32", "generic"]);

        let text = format_catalog(&summaries);
        assert!(text.starts_with("classification:\n"));
        assert!(text.contains("nanosleep > Sleep > sleep"));
    }

    #[test]
    fn test_describe_shows_overrides() {
        let catalog = Catalog::builtin().unwrap();
        let text = describe_facility(catalog.get("heartbeat-timer").unwrap(), BUILTIN_OVERRIDES);

        assert!(text.contains("1. itimer_virtual"));
        assert!(text.contains("unless:   lacks-itimer-virtual"));
        assert!(text.contains("after:    heartbeat-interface is setitimer"));
        assert!(text.contains("defines:  USE_ITIMER_REAL"));
        assert!(text.contains("macos: force itimer_real"));
        assert!(text.contains("cygwin: force itimer_real"));
    }
}
