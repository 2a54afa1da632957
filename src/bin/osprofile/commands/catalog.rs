//! `osprofile catalog` command

use anyhow::{Context, Result};

use crate::cli::CatalogArgs;
use osprofile::core::ProfileError;
use osprofile::ops::{describe_facility, format_catalog, list_facilities, FacilitySummary};
use osprofile::resolver::BUILTIN_OVERRIDES;
use osprofile::Catalog;

pub fn execute(args: CatalogArgs) -> Result<()> {
    let catalog = Catalog::builtin().map_err(|e| e.to_diagnostic())?;

    let Some(id) = args.facility else {
        let summaries = list_facilities(&catalog);
        if args.json {
            let json = serde_json::to_string_pretty(&summaries)
                .context("failed to serialize catalogue")?;
            println!("{}", json);
        } else {
            print!("{}", format_catalog(&summaries));
        }
        return Ok(());
    };

    let Some(facility) = catalog.get(&id) else {
        let err = ProfileError::UnknownFacility { facility: id };
        return Err(err.to_diagnostic().into());
    };

    if args.json {
        let json = serde_json::to_string_pretty(&FacilitySummary::from(facility))
            .context("failed to serialize facility")?;
        println!("{}", json);
    } else {
        print!("{}", describe_facility(facility, BUILTIN_OVERRIDES));
    }

    Ok(())
}
