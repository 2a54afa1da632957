//! Core data types.
//!
//! - Capability flags and probes (the input of a pass)
//! - OS families, target platforms and their strategies
//! - Facility and option declarations
//! - Selections, declaration imports and bindings (the output)

pub mod binding;
pub mod capability;
pub mod facility;
pub mod family;
pub mod import;
pub mod probe;
pub mod profile;
pub mod selection;

pub use binding::{Binding, BindingTable, BindingValue};
pub use capability::CapabilitySet;
pub use facility::{FacilityId, FacilitySpec, OptionSpec, Prerequisite, Stage};
pub use family::{OsFamily, PlatformKind, TargetPlatform};
pub use import::{DeclarationImport, ImportSet};
pub use probe::{Probe, ProbeError};
pub use profile::PlatformProfile;
pub use selection::{Origin, ProfileError, Selection, SelectionTable};
