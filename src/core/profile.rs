//! The immutable result of configuring one platform.

use serde::Serialize;

use crate::core::binding::BindingTable;
use crate::core::capability::CapabilitySet;
use crate::core::family::{OsFamily, TargetPlatform};
use crate::core::import::ImportSet;
use crate::core::selection::{Selection, SelectionTable};
use crate::resolver::AppliedOverride;
use crate::util::hash::Fingerprint;

/// Everything a platform layer needs: which primitives to use, which
/// declarations to import, and the bindings that hide family differences.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlatformProfile {
    pub family: OsFamily,
    /// Stable hash of the outputs
    pub fingerprint: String,
    /// `USE_` symbols of chosen, non-silent options
    pub symbols: Vec<String>,
    pub imports: ImportSet,
    /// Capability flags the pass resolved against
    pub capabilities: CapabilitySet,
    pub target: TargetPlatform,
    pub bindings: BindingTable,
    pub selections: SelectionTable,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub overrides: Vec<AppliedOverride>,
}

impl PlatformProfile {
    /// Assemble a profile and compute its fingerprint.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        family: OsFamily,
        target: TargetPlatform,
        capabilities: CapabilitySet,
        selections: SelectionTable,
        overrides: Vec<AppliedOverride>,
        symbols: Vec<String>,
        imports: ImportSet,
        bindings: BindingTable,
    ) -> Self {
        let fingerprint = fingerprint(family, &selections, &imports, &bindings);
        PlatformProfile {
            family,
            fingerprint,
            symbols,
            imports,
            capabilities,
            target,
            bindings,
            selections,
            overrides,
        }
    }

    /// Check whether a `USE_` symbol is defined.
    pub fn defines(&self, symbol: &str) -> bool {
        self.symbols.iter().any(|s| s == symbol)
    }

    /// Short form of the fingerprint for display.
    pub fn short_fingerprint(&self) -> &str {
        &self.fingerprint[..self.fingerprint.len().min(16)]
    }
}

/// The fingerprint covers the outputs only, so two probes that differ in
/// irrelevant flags produce the same fingerprint.
fn fingerprint(
    family: OsFamily,
    selections: &SelectionTable,
    imports: &ImportSet,
    bindings: &BindingTable,
) -> String {
    let mut fp = Fingerprint::new();
    fp.update_str(family.as_str());

    for (facility, selection) in selections.iter() {
        fp.update_str(facility);
        match selection {
            Selection::Chosen { option, .. } => fp.update_opt(Some(*option)),
            Selection::Unavailable | Selection::Disabled { .. } => fp.update_opt(None),
        };
    }

    for import in imports.iter() {
        fp.update_str(import.header());
    }

    for binding in bindings.iter() {
        fp.update_str(&binding.name).update_str(&binding.value.to_string());
    }

    fp.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::binding::Binding;
    use crate::core::import::DeclarationImport;
    use crate::core::selection::Origin;

    fn table(option: &'static str) -> SelectionTable {
        let mut table = SelectionTable::new();
        table.insert(
            "sleep",
            Selection::Chosen {
                option,
                origin: Origin::Capabilities,
            },
        );
        table
    }

    fn profile(option: &'static str, capabilities: &[&str]) -> PlatformProfile {
        let mut bindings = BindingTable::new();
        bindings.insert(Binding::integer("NETDB_SUCCESS", 0));
        PlatformProfile::new(
            OsFamily::Posix,
            TargetPlatform::default(),
            CapabilitySet::from_names(capabilities.iter().copied()),
            table(option),
            Vec::new(),
            vec![format!("USE_{}", option)],
            [DeclarationImport::TimeH].into_iter().collect(),
            bindings,
        )
    }

    #[test]
    fn test_fingerprint_tracks_outputs() {
        let a = profile("nanosleep", &["has-nanosleep"]);
        let b = profile("nanosleep", &["has-nanosleep", "has-unrelated"]);
        let c = profile("sleep", &["has-sleep"]);

        assert_eq!(a.fingerprint, b.fingerprint);
        assert_ne!(a.fingerprint, c.fingerprint);
        assert_eq!(a.short_fingerprint().len(), 16);
    }

    #[test]
    fn test_defines() {
        let p = profile("nanosleep", &[]);
        assert!(p.defines("USE_nanosleep"));
        assert!(!p.defines("USE_sleep"));
    }
}
