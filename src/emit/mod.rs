//! Turning a resolution into consumable output.
//!
//! - `USE_` symbols for every chosen option
//! - the aggregated declaration imports
//! - platform bindings
//! - rendering as JSON, TOML or a C header

pub mod bindings;
pub mod imports;
pub mod render;

pub use bindings::emit_bindings;
pub use imports::aggregate_imports;
pub use render::{render, OutputFormat};

use crate::catalog::Catalog;
use crate::core::profile::PlatformProfile;
use crate::core::selection::SelectionTable;
use crate::resolver::Resolution;

/// `USE_` symbols of chosen options, in visiting order, without duplicates.
///
/// Silent options export nothing; they exist only to be read by other
/// facilities.
pub fn exported_symbols(catalog: &Catalog, selections: &SelectionTable) -> Vec<String> {
    let mut symbols: Vec<String> = Vec::new();

    for (facility, selection) in selections.iter() {
        let Some(spec) = selection
            .option()
            .and_then(|option| catalog.get(facility)?.option(option))
        else {
            continue;
        };
        for symbol in spec.symbol_names() {
            if !symbols.contains(&symbol) {
                symbols.push(symbol);
            }
        }
    }

    symbols
}

/// Assemble the full profile for a resolution.
pub fn build_profile(catalog: &Catalog, resolution: Resolution) -> PlatformProfile {
    let symbols = exported_symbols(catalog, &resolution.selections);
    let imports = aggregate_imports(catalog, &resolution.selections);
    let bindings = emit_bindings(
        resolution.family,
        &resolution.selections,
        &resolution.capabilities,
        &imports,
    );

    PlatformProfile::new(
        resolution.family,
        resolution.target,
        resolution.capabilities,
        resolution.selections,
        resolution.overrides,
        symbols,
        imports,
        bindings,
    )
}
