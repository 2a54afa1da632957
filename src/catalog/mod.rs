//! The facility catalogue.
//!
//! The built-in catalogue is plain `const` data split by concern. A
//! [`Catalog`] validates it once and fixes the visiting order, so resolution
//! itself never has to deal with malformed declarations.

use std::collections::{BTreeSet, HashMap, HashSet};

use crate::core::capability;
use crate::core::facility::{FacilityId, FacilitySpec};
use crate::core::family::OsFamily;
use crate::core::import::DeclarationImport;
use crate::resolver::errors::CatalogError;
use crate::resolver::order;

mod files;
mod net;
mod system;
mod terminal;
mod time;

pub(crate) const POSIX: &[OsFamily] = &[OsFamily::Posix];
pub(crate) const WIN32: &[OsFamily] = &[OsFamily::Win32];
pub(crate) const NOT_WIN32: &[OsFamily] = &[OsFamily::Posix, OsFamily::Generic];
pub(crate) const POSIX_OR_WIN32: &[OsFamily] = &[OsFamily::Posix, OsFamily::Win32];

/// The facility that classifies the OS family. It is always visited first.
pub const OS_FAMILY: FacilityId = "os-family";

/// A validated facility catalogue with a fixed visiting order.
#[derive(Debug, Clone)]
pub struct Catalog {
    facilities: Vec<FacilitySpec>,
    index: HashMap<FacilityId, usize>,
    order: Vec<usize>,
}

impl Catalog {
    /// The built-in catalogue.
    pub fn builtin() -> Result<Self, CatalogError> {
        let facilities = [
            system::FACILITIES,
            files::FACILITIES,
            time::FACILITIES,
            net::FACILITIES,
            terminal::FACILITIES,
        ]
        .concat();

        Catalog::new(facilities)
    }

    /// Validate a catalogue and compute its visiting order.
    pub fn new(facilities: Vec<FacilitySpec>) -> Result<Self, CatalogError> {
        let mut index = HashMap::new();
        for (i, facility) in facilities.iter().enumerate() {
            if index.insert(facility.id, i).is_some() {
                return Err(CatalogError::DuplicateFacility {
                    facility: facility.id.to_string(),
                });
            }
        }

        for facility in &facilities {
            validate_facility(facility, &facilities, &index)?;
        }

        let order = order::visiting_order(&facilities)?;
        tracing::debug!("catalogue validated: {} facilities", facilities.len());

        Ok(Catalog {
            facilities,
            index,
            order,
        })
    }

    /// Look up a facility.
    pub fn get(&self, id: &str) -> Option<&FacilitySpec> {
        self.index.get(id).map(|&i| &self.facilities[i])
    }

    /// Check whether a facility exists.
    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// Facilities in declaration order.
    pub fn facilities(&self) -> impl Iterator<Item = &FacilitySpec> {
        self.facilities.iter()
    }

    /// Facilities in visiting order.
    pub fn visiting_order(&self) -> impl Iterator<Item = &FacilitySpec> {
        self.order.iter().map(move |&i| &self.facilities[i])
    }

    /// Facilities that read `id`, directly or transitively, in visiting order.
    pub fn downstream_of(&self, id: &str) -> Vec<FacilityId> {
        let downstream: HashSet<usize> = order::downstream_of(&self.facilities, id)
            .into_iter()
            .collect();

        self.order
            .iter()
            .filter(|i| downstream.contains(i))
            .map(|&i| self.facilities[i].id)
            .collect()
    }

    /// Every capability flag the catalogue or the family strategies mention.
    pub fn known_capabilities(&self) -> BTreeSet<&'static str> {
        let mut known: BTreeSet<&'static str> = self
            .facilities
            .iter()
            .flat_map(|f| f.options.iter())
            .flat_map(|o| o.requires.iter().chain(o.unless).copied())
            .collect();

        for family in OsFamily::ALL {
            let strategy = family.strategy();
            known.extend(strategy.implied_capabilities.iter().copied());
            known.extend(strategy.suppressed_capabilities.iter().copied());
        }

        known
    }

    /// Header availability flags for every declaration import.
    pub fn header_capabilities() -> BTreeSet<String> {
        DeclarationImport::ALL
            .iter()
            .filter_map(|i| i.probe_flag())
            .collect()
    }

    /// Number of facilities.
    pub fn len(&self) -> usize {
        self.facilities.len()
    }

    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.facilities.is_empty()
    }
}

fn validate_facility(
    facility: &FacilitySpec,
    facilities: &[FacilitySpec],
    index: &HashMap<FacilityId, usize>,
) -> Result<(), CatalogError> {
    if facility.options.is_empty() {
        return Err(CatalogError::EmptyFacility {
            facility: facility.id.to_string(),
        });
    }

    let mut seen = HashSet::new();
    for option in facility.options {
        if !seen.insert(option.name) {
            return Err(CatalogError::DuplicateOption {
                facility: facility.id.to_string(),
                option: option.name.to_string(),
            });
        }

        if let Some(flag) = option
            .requires
            .iter()
            .chain(option.unless)
            .find(|f| !capability::is_valid_name(f))
        {
            return Err(CatalogError::InvalidCapability {
                facility: facility.id.to_string(),
                option: option.name.to_string(),
                flag: flag.to_string(),
            });
        }

        let referenced_by = format!("{}={}", facility.id, option.name);
        for prerequisite in option.prerequisites {
            for dep in prerequisite.facilities() {
                let Some(&dep_index) = index.get(dep) else {
                    return Err(CatalogError::UnknownFacility {
                        facility: dep.to_string(),
                        referenced_by,
                    });
                };

                let dependency = &facilities[dep_index];
                if dependency.stage > facility.stage {
                    return Err(CatalogError::StageInversion {
                        facility: facility.id.to_string(),
                        stage: facility.stage,
                        dependency: dep.to_string(),
                        dependency_stage: dependency.stage,
                    });
                }
            }

            for (dep, name) in prerequisite.named_options() {
                let known = index
                    .get(dep)
                    .is_some_and(|&i| facilities[i].option(name).is_some());
                if !known {
                    return Err(CatalogError::UnknownOption {
                        facility: dep.to_string(),
                        option: name.to_string(),
                        referenced_by,
                    });
                }
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::facility::{OptionSpec, Prerequisite, Stage};

    const X: &[OptionSpec] = &[OptionSpec::new("x")];
    const NEEDS_LATER: &[OptionSpec] =
        &[OptionSpec::new("x").after(&[Prerequisite::Selected("later")])];
    const NEEDS_MISSING: &[OptionSpec] =
        &[OptionSpec::new("x").after(&[Prerequisite::Selected("missing")])];
    const NEEDS_BAD_OPTION: &[OptionSpec] =
        &[OptionSpec::new("x").after(&[Prerequisite::OneOf("a", &["nope"])])];
    const DUPLICATED: &[OptionSpec] = &[OptionSpec::new("x"), OptionSpec::new("x")];
    const BAD_FLAG: &[OptionSpec] = &[OptionSpec::new("x").requires(&["HAVE_X"])];

    fn facility(id: &'static str, stage: Stage, options: &'static [OptionSpec]) -> FacilitySpec {
        FacilitySpec {
            id,
            description: "",
            stage,
            options,
        }
    }

    #[test]
    fn test_builtin_catalog_is_valid() {
        let catalog = Catalog::builtin().unwrap();
        assert!(catalog.len() > 50);
        assert_eq!(catalog.visiting_order().next().map(|f| f.id), Some(OS_FAMILY));
    }

    #[test]
    fn test_builtin_order_respects_prerequisites() {
        let catalog = Catalog::builtin().unwrap();
        let position: HashMap<&str, usize> = catalog
            .visiting_order()
            .enumerate()
            .map(|(i, f)| (f.id, i))
            .collect();

        for facility in catalog.facilities() {
            for dep in facility.dependencies() {
                assert!(
                    position[dep] < position[facility.id],
                    "{} visited before its prerequisite {}",
                    facility.id,
                    dep
                );
            }
        }
    }

    #[test]
    fn test_downstream_in_visiting_order() {
        let catalog = Catalog::builtin().unwrap();
        let downstream = catalog.downstream_of("open");
        assert!(downstream.contains(&"stat"));
        assert!(downstream.contains(&"atomic-rename"));
        assert!(downstream.contains(&"renameat2-syscall"));
        assert!(!downstream.contains(&"sleep"));

        let rename = downstream.iter().position(|f| *f == "rename").unwrap();
        let atomic = downstream.iter().position(|f| *f == "atomic-rename").unwrap();
        assert!(rename < atomic);
    }

    #[test]
    fn test_known_capabilities() {
        let catalog = Catalog::builtin().unwrap();
        let known = catalog.known_capabilities();
        assert!(known.contains("has-nanosleep"));
        assert!(known.contains("supports-long-path"));
        assert!(known.contains("has-inet-pton"));
        assert!(Catalog::header_capabilities().contains("has-sys-time-h"));
    }

    #[test]
    fn test_rejects_invalid_catalogs() {
        let dup = Catalog::new(vec![facility("a", Stage::Base, X), facility("a", Stage::Base, X)]);
        assert!(matches!(dup, Err(CatalogError::DuplicateFacility { .. })));

        let dup_opt = Catalog::new(vec![facility("a", Stage::Base, DUPLICATED)]);
        assert!(matches!(dup_opt, Err(CatalogError::DuplicateOption { .. })));

        let empty = Catalog::new(vec![facility("a", Stage::Base, &[])]);
        assert!(matches!(empty, Err(CatalogError::EmptyFacility { .. })));

        let missing = Catalog::new(vec![facility("a", Stage::Base, NEEDS_MISSING)]);
        assert!(matches!(missing, Err(CatalogError::UnknownFacility { .. })));

        let bad_option = Catalog::new(vec![
            facility("a", Stage::Base, X),
            facility("b", Stage::Base, NEEDS_BAD_OPTION),
        ]);
        assert!(matches!(bad_option, Err(CatalogError::UnknownOption { .. })));

        let bad_flag = Catalog::new(vec![facility("a", Stage::Base, BAD_FLAG)]);
        assert!(matches!(bad_flag, Err(CatalogError::InvalidCapability { .. })));

        let inverted = Catalog::new(vec![
            facility("early", Stage::Base, NEEDS_LATER),
            facility("later", Stage::Composite, X),
        ]);
        assert!(matches!(inverted, Err(CatalogError::StageInversion { .. })));
    }
}
