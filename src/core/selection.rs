//! Selections: the resolved option per facility.
//!
//! "No option" is an explicit state. `Unavailable` means no candidate was
//! eligible; `Disabled` means an override turned the facility off. Both are
//! queryable, so consumers never have to re-check capability flags to learn
//! whether a facility can be relied on.

use std::collections::BTreeMap;
use std::fmt;

use serde::ser::SerializeSeq;
use serde::{Serialize, Serializer};
use thiserror::Error;

use crate::core::facility::FacilityId;
use crate::util::diagnostic::{suggestions, Diagnostic};

/// Why an option was chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Origin {
    /// First eligible candidate given the capability flags
    Capabilities,
    /// Supplied explicitly by the probe (OS family tag)
    Explicit,
    /// Forced by a platform override
    Forced { reason: &'static str },
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Origin::Capabilities => write!(f, "first eligible candidate"),
            Origin::Explicit => write!(f, "explicit in probe"),
            Origin::Forced { reason } => write!(f, "forced: {}", reason),
        }
    }
}

/// The resolution of one facility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum Selection {
    /// An option was chosen.
    Chosen {
        option: &'static str,
        origin: Origin,
    },
    /// No candidate was eligible.
    Unavailable,
    /// An override turned the facility off.
    Disabled { reason: &'static str },
}

impl Selection {
    /// The chosen option, if any.
    pub fn option(&self) -> Option<&'static str> {
        match self {
            Selection::Chosen { option, .. } => Some(*option),
            _ => None,
        }
    }

    /// Whether an option was chosen.
    pub fn is_available(&self) -> bool {
        matches!(self, Selection::Chosen { .. })
    }

    /// Whether the selection came from an override.
    pub fn is_overridden(&self) -> bool {
        matches!(
            self,
            Selection::Disabled { .. }
                | Selection::Chosen {
                    origin: Origin::Forced { .. },
                    ..
                }
        )
    }

    /// Short display form (`openat`, `unavailable`, `disabled`).
    pub fn label(&self) -> &'static str {
        match self {
            Selection::Chosen { option, .. } => *option,
            Selection::Unavailable => "unavailable",
            Selection::Disabled { .. } => "disabled",
        }
    }
}

/// Errors consumers get when they depend on a facility that has no selection.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ProfileError {
    #[error("facility `{facility}` is unavailable: no candidate's capabilities are satisfied")]
    FacilityUnavailable { facility: String },

    #[error("facility `{facility}` is disabled on this platform: {reason}")]
    FacilityDisabled { facility: String, reason: String },

    #[error("unknown facility `{facility}`")]
    UnknownFacility { facility: String },
}

impl ProfileError {
    /// Convert to a user-friendly diagnostic.
    pub fn to_diagnostic(&self) -> Diagnostic {
        match self {
            ProfileError::FacilityUnavailable { facility } => {
                Diagnostic::error(format!("facility `{}` is unavailable", facility))
                    .with_context("none of its candidates had all required capabilities")
                    .with_suggestion(format!(
                        "Run `osprofile explain <probe> {}` to see why each candidate was rejected",
                        facility
                    ))
            }
            ProfileError::FacilityDisabled { facility, reason } => {
                Diagnostic::error(format!("facility `{}` is disabled", facility))
                    .with_context(reason.clone())
                    .with_suggestion("Resolve with `--no-overrides` to see the probed selection")
            }
            ProfileError::UnknownFacility { facility } => {
                Diagnostic::error(format!("unknown facility `{}`", facility))
                    .with_suggestion(suggestions::UNKNOWN_FACILITY)
            }
        }
    }
}

/// Exactly one selection per facility, kept in visiting order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionTable {
    order: Vec<FacilityId>,
    selections: BTreeMap<FacilityId, Selection>,
}

impl SelectionTable {
    /// Create an empty table.
    pub fn new() -> Self {
        SelectionTable::default()
    }

    /// Record (or replace) the selection for a facility.
    pub fn insert(&mut self, facility: FacilityId, selection: Selection) {
        if self.selections.insert(facility, selection).is_none() {
            self.order.push(facility);
        }
    }

    /// Get the selection for a facility.
    pub fn get(&self, facility: &str) -> Option<&Selection> {
        self.selections.get(facility)
    }

    /// The chosen option for a facility, if any.
    pub fn option(&self, facility: &str) -> Option<&'static str> {
        self.get(facility).and_then(Selection::option)
    }

    /// Check whether a facility chose a specific option.
    pub fn is_selected(&self, facility: &str, option: &str) -> bool {
        self.option(facility) == Some(option)
    }

    /// The chosen option, or an error explaining why there is none.
    pub fn require(&self, facility: &str) -> Result<&'static str, ProfileError> {
        match self.get(facility) {
            Some(Selection::Chosen { option, .. }) => Ok(*option),
            Some(Selection::Unavailable) => Err(ProfileError::FacilityUnavailable {
                facility: facility.to_string(),
            }),
            Some(Selection::Disabled { reason }) => Err(ProfileError::FacilityDisabled {
                facility: facility.to_string(),
                reason: reason.to_string(),
            }),
            None => Err(ProfileError::UnknownFacility {
                facility: facility.to_string(),
            }),
        }
    }

    /// Iterate in visiting order.
    pub fn iter(&self) -> impl Iterator<Item = (FacilityId, &Selection)> + '_ {
        self.order
            .iter()
            .filter_map(move |f| self.selections.get(f).map(|s| (*f, s)))
    }

    /// Facilities that ended up without an option.
    pub fn unavailable(&self) -> Vec<FacilityId> {
        self.iter()
            .filter(|(_, s)| !s.is_available())
            .map(|(f, _)| f)
            .collect()
    }

    /// Number of facilities.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

impl Serialize for SelectionTable {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        #[derive(Serialize)]
        struct Entry<'a> {
            facility: &'a str,
            #[serde(flatten)]
            selection: &'a Selection,
        }

        let mut seq = serializer.serialize_seq(Some(self.len()))?;
        for (facility, selection) in self.iter() {
            seq.serialize_element(&Entry {
                facility,
                selection,
            })?;
        }
        seq.end()
    }
}
