//! Capability flags reported by the probing phase.
//!
//! A capability is a boolean fact about the target platform's API surface
//! (`has-nanosleep`, `has-sys-time-h`, `supports-long-path`). Flags are
//! kebab-case; a flag that is absent from the set is false.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};

/// `HAVE_` macros whose generic kebab-case spelling would collide with
/// another macro (autoconf probes are case-sensitive, capability names are not).
const MACRO_ALIASES: &[(&str, &str)] = &[("HAVE_Sleep", "has-win32-sleep")];

/// Returns true if `name` is a well-formed capability name.
///
/// Names are lowercase ASCII letters, digits and single dashes, and must
/// start with a letter.
pub fn is_valid_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_lowercase() => {}
        _ => return false,
    }
    !name.ends_with('-')
        && !name.contains("--")
        && name
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
}

/// Convert an autoconf `HAVE_` macro name into a capability name.
///
/// `HAVE_CLOCK_GETTIME` becomes `has-clock-gettime`, `HAVE_SYS_TIME_H`
/// becomes `has-sys-time-h` and `HAVE__NSGETENVIRON` becomes
/// `has-nsgetenviron`. Returns `None` for names that are not `HAVE_` macros.
pub fn from_have_macro(macro_name: &str) -> Option<String> {
    if let Some((_, alias)) = MACRO_ALIASES.iter().find(|(m, _)| *m == macro_name) {
        return Some((*alias).to_string());
    }

    let rest = macro_name.strip_prefix("HAVE_")?;
    let words: Vec<String> = rest
        .split('_')
        .filter(|w| !w.is_empty())
        .map(|w| w.to_ascii_lowercase())
        .collect();

    if words.is_empty() {
        return None;
    }

    Some(format!("has-{}", words.join("-")))
}

/// The immutable set of capability flags for one resolution pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CapabilitySet {
    flags: BTreeSet<String>,
}

impl CapabilitySet {
    /// Create an empty set.
    pub fn new() -> Self {
        CapabilitySet::default()
    }

    /// Build a set from the names of the flags that hold.
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        CapabilitySet {
            flags: names.into_iter().map(Into::into).collect(),
        }
    }

    /// Build a set from a name -> present map, keeping only present flags.
    pub fn from_map(map: &BTreeMap<String, bool>) -> Self {
        CapabilitySet {
            flags: map
                .iter()
                .filter(|(_, present)| **present)
                .map(|(name, _)| name.clone())
                .collect(),
        }
    }

    /// Check whether a flag holds.
    pub fn has(&self, name: &str) -> bool {
        self.flags.contains(name)
    }

    /// Flags from `names` that do not hold.
    pub fn missing<'a>(&self, names: &[&'a str]) -> Vec<&'a str> {
        names.iter().copied().filter(|n| !self.has(n)).collect()
    }

    /// Return a copy with the given flags added.
    pub fn with<I, S>(&self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut flags = self.flags.clone();
        flags.extend(names.into_iter().map(Into::into));
        CapabilitySet { flags }
    }

    /// Return a copy with the given flags removed.
    pub fn without<I, S>(&self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut flags = self.flags.clone();
        for name in names {
            flags.remove(name.as_ref());
        }
        CapabilitySet { flags }
    }

    /// Whether the probe reported any header availability flag (`has-*-h`).
    pub fn reports_headers(&self) -> bool {
        self.flags
            .iter()
            .any(|f| f.starts_with("has-") && f.ends_with("-h"))
    }

    /// Iterate over present flags in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.flags.iter().map(String::as_str)
    }

    /// Number of present flags.
    pub fn len(&self) -> usize {
        self.flags.len()
    }

    /// Check if no flag holds.
    pub fn is_empty(&self) -> bool {
        self.flags.is_empty()
    }
}

impl fmt::Display for CapabilitySet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.iter().collect();
        write!(f, "{{{}}}", names.join(", "))
    }
}

impl<S: Into<String>> FromIterator<S> for CapabilitySet {
    fn from_iter<T: IntoIterator<Item = S>>(iter: T) -> Self {
        CapabilitySet::from_names(iter)
    }
}
