//! osprofile - OS facility resolution for portable C runtimes
//!
//! Given the capability flags a platform probe reported, this crate picks
//! one implementation for every OS facility (first eligible candidate in
//! priority order), applies platform overrides, and emits the `USE_`
//! symbols, declaration imports and bindings a platform layer needs.

pub mod catalog;
pub mod core;
pub mod emit;
pub mod ops;
pub mod resolver;
pub mod util;

pub use crate::catalog::Catalog;
pub use crate::core::{
    CapabilitySet, OsFamily, PlatformKind, PlatformProfile, Probe, Selection, SelectionTable,
    TargetPlatform,
};
pub use crate::resolver::{Resolution, ResolveOptions, Resolver};
