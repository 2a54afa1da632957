//! High-level operations.
//!
//! This module contains the implementation of osprofile commands.

pub mod catalog;
pub mod convert;
pub mod diff;
pub mod explain;
pub mod profile;

pub use catalog::{describe_facility, format_catalog, list_facilities, FacilitySummary};
pub use convert::{convert_config_file, convert_config_header, ConvertReport};
pub use diff::{diff_profiles, format_diff, ProfileDiff};
pub use explain::{explain, format_explanation, Explanation};
pub use profile::{load_probe, profile_with, resolve_probe_file, resolve_profile};
