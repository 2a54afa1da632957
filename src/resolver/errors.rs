//! Catalogue validation errors and diagnostics.

use thiserror::Error;

use crate::core::facility::Stage;
use crate::util::diagnostic::Diagnostic;

/// A facility catalogue that cannot be resolved deterministically.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CatalogError {
    #[error("facility `{facility}` is declared more than once")]
    DuplicateFacility { facility: String },

    #[error("facility `{facility}` declares option `{option}` more than once")]
    DuplicateOption { facility: String, option: String },

    #[error("facility `{facility}` has no options")]
    EmptyFacility { facility: String },

    #[error("`{referenced_by}` depends on unknown facility `{facility}`")]
    UnknownFacility {
        facility: String,
        referenced_by: String,
    },

    #[error("`{referenced_by}` depends on unknown option `{facility}={option}`")]
    UnknownOption {
        facility: String,
        option: String,
        referenced_by: String,
    },

    #[error("`{option}` of `{facility}` requires malformed capability `{flag}`")]
    InvalidCapability {
        facility: String,
        option: String,
        flag: String,
    },

    #[error("`{facility}` ({stage}) depends on `{dependency}` from the later {dependency_stage} stage")]
    StageInversion {
        facility: String,
        stage: Stage,
        dependency: String,
        dependency_stage: Stage,
    },

    #[error("cycle detected in facility prerequisites")]
    CycleDetected { facilities: Vec<String> },
}

impl CatalogError {
    /// Convert to a user-friendly diagnostic.
    pub fn to_diagnostic(&self) -> Diagnostic {
        let diag = Diagnostic::error(self.to_string());
        match self {
            CatalogError::CycleDetected { facilities } => diag
                .with_context(format!("cycle: {}", facilities.join(" -> ")))
                .with_suggestion("Break the cycle by removing one of the prerequisites"),
            CatalogError::StageInversion { .. } => diag.with_suggestion(
                "Move the dependency to an earlier stage or the dependent to a later one",
            ),
            CatalogError::UnknownFacility { .. } | CatalogError::UnknownOption { .. } => {
                diag.with_suggestion("Check the prerequisite for typos")
            }
            _ => diag,
        }
    }
}
