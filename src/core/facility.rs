//! Facility and implementation-option declarations.
//!
//! A facility is an abstract OS service the runtime needs ("monotonic clock",
//! "dynamic-library loader"). It carries a fixed, priority-ordered list of
//! implementation options. Everything here is `'static` data so the whole
//! catalogue can live in constant tables.

use std::fmt;

use serde::Serialize;

use crate::core::family::OsFamily;
use crate::core::import::DeclarationImport;
use crate::core::selection::SelectionTable;

/// Identifier of a facility (kebab-case, e.g. `realtime-clock`).
pub type FacilityId = &'static str;

/// Resolution tier. Facilities are visited tier by tier, and a prerequisite
/// may only point at the same or an earlier tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    /// OS family classification
    Classification,
    /// Base operations
    Base,
    /// `at`-suffixed and syscall-level refinements of base operations
    Refinement,
    /// Higher-level facilities composed from lower-level selections
    Composite,
}

impl Stage {
    /// Get the stage name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Classification => "classification",
            Stage::Base => "base",
            Stage::Refinement => "refinement",
            Stage::Composite => "composite",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A dependency edge from an option to another facility's selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Prerequisite {
    /// The facility selected any option.
    Selected(FacilityId),
    /// The facility selected one of these options.
    OneOf(FacilityId, &'static [&'static str]),
    /// The facility did not select any of these options (unavailable counts).
    NoneOf(FacilityId, &'static [&'static str]),
    /// At least one of the nested prerequisites holds.
    AnyOf(&'static [Prerequisite]),
}

impl Prerequisite {
    /// Facilities this prerequisite reads.
    pub fn facilities(&self) -> Vec<FacilityId> {
        match self {
            Prerequisite::Selected(f)
            | Prerequisite::OneOf(f, _)
            | Prerequisite::NoneOf(f, _) => vec![*f],
            Prerequisite::AnyOf(inner) => inner.iter().flat_map(|p| p.facilities()).collect(),
        }
    }

    /// `(facility, option)` pairs this prerequisite names explicitly.
    pub fn named_options(&self) -> Vec<(FacilityId, &'static str)> {
        match self {
            Prerequisite::Selected(_) => Vec::new(),
            Prerequisite::OneOf(f, opts) | Prerequisite::NoneOf(f, opts) => {
                opts.iter().map(|o| (*f, *o)).collect()
            }
            Prerequisite::AnyOf(inner) => inner.iter().flat_map(|p| p.named_options()).collect(),
        }
    }

    /// Evaluate against selections made so far.
    ///
    /// A facility that has not been resolved yet counts as unavailable.
    pub fn holds(&self, prior: &SelectionTable) -> bool {
        match self {
            Prerequisite::Selected(f) => prior.option(f).is_some(),
            Prerequisite::OneOf(f, opts) => prior.option(f).is_some_and(|o| opts.contains(&o)),
            Prerequisite::NoneOf(f, opts) => !prior.option(f).is_some_and(|o| opts.contains(&o)),
            Prerequisite::AnyOf(inner) => inner.iter().any(|p| p.holds(prior)),
        }
    }
}

impl fmt::Display for Prerequisite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Prerequisite::Selected(id) => write!(f, "{} selected", id),
            Prerequisite::OneOf(id, opts) => write!(f, "{} is {}", id, opts.join(" | ")),
            Prerequisite::NoneOf(id, opts) => write!(f, "{} is not {}", id, opts.join(" | ")),
            Prerequisite::AnyOf(inner) => {
                let parts: Vec<String> = inner.iter().map(|p| p.to_string()).collect();
                write!(f, "any of ({})", parts.join(", "))
            }
        }
    }
}

/// One concrete primitive that can satisfy a facility.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OptionSpec {
    /// Option name, also the default `USE_` symbol suffix
    pub name: &'static str,
    /// Capability flags that must all hold
    pub requires: &'static [&'static str],
    /// Capability flags that rule the option out when any holds
    pub unless: &'static [&'static str],
    /// Families the option is valid on (empty = any)
    pub families: &'static [OsFamily],
    /// Selections on other facilities that must all hold
    pub prerequisites: &'static [Prerequisite],
    /// Declaration imports needed when selected
    pub imports: &'static [DeclarationImport],
    /// Exported macro names (empty = `USE_<name>`)
    pub symbols: &'static [&'static str],
    /// Exports no symbols at all
    pub silent: bool,
}

impl OptionSpec {
    /// An option with no requirements that exports `USE_<name>`.
    pub const fn new(name: &'static str) -> Self {
        OptionSpec {
            name,
            requires: &[],
            unless: &[],
            families: &[],
            prerequisites: &[],
            imports: &[],
            symbols: &[],
            silent: false,
        }
    }

    /// Set the required capability flags.
    pub const fn requires(self, requires: &'static [&'static str]) -> Self {
        OptionSpec { requires, ..self }
    }

    /// Rule the option out when any of these flags holds.
    ///
    /// For primitives that are assumed present unless the probe reports
    /// otherwise.
    pub const fn unless(self, unless: &'static [&'static str]) -> Self {
        OptionSpec { unless, ..self }
    }

    /// Restrict the option to some families.
    pub const fn families(self, families: &'static [OsFamily]) -> Self {
        OptionSpec { families, ..self }
    }

    /// Set the prerequisites on other facilities.
    pub const fn after(self, prerequisites: &'static [Prerequisite]) -> Self {
        OptionSpec {
            prerequisites,
            ..self
        }
    }

    /// Set the declaration imports.
    pub const fn imports(self, imports: &'static [DeclarationImport]) -> Self {
        OptionSpec { imports, ..self }
    }

    /// Export these macro names instead of `USE_<name>`.
    pub const fn exports(self, symbols: &'static [&'static str]) -> Self {
        OptionSpec { symbols, ..self }
    }

    /// Export nothing; the selection is only consumed through bindings.
    pub const fn silent(self) -> Self {
        OptionSpec {
            silent: true,
            ..self
        }
    }

    /// Whether the option may be selected on `family`.
    pub fn allows_family(&self, family: OsFamily) -> bool {
        self.families.is_empty() || self.families.contains(&family)
    }

    /// Macro names this option defines when selected.
    pub fn symbol_names(&self) -> Vec<String> {
        if self.silent {
            Vec::new()
        } else if self.symbols.is_empty() {
            vec![format!("USE_{}", self.name)]
        } else {
            self.symbols.iter().map(|s| s.to_string()).collect()
        }
    }
}

/// An abstract facility with its ordered candidates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FacilitySpec {
    /// Facility identifier
    pub id: FacilityId,
    /// Short human-readable description
    pub description: &'static str,
    /// Resolution tier
    pub stage: Stage,
    /// Candidates, highest priority first
    pub options: &'static [OptionSpec],
}

impl FacilitySpec {
    /// Look up an option by name.
    pub fn option(&self, name: &str) -> Option<&'static OptionSpec> {
        self.options.iter().find(|o| o.name == name)
    }

    /// Priority rank of an option (0 = most preferred).
    pub fn rank(&self, name: &str) -> Option<usize> {
        self.options.iter().position(|o| o.name == name)
    }

    /// Facilities referenced by any option's prerequisites.
    pub fn dependencies(&self) -> Vec<FacilityId> {
        let mut deps: Vec<FacilityId> = self
            .options
            .iter()
            .flat_map(|o| o.prerequisites.iter().flat_map(|p| p.facilities()))
            .collect();
        deps.sort_unstable();
        deps.dedup();
        deps
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::selection::{Origin, Selection};

    const PIPE: FacilitySpec = FacilitySpec {
        id: "pipe",
        description: "anonymous pipe",
        stage: Stage::Base,
        options: &[
            OptionSpec::new("pipe").requires(&["has-pipe"]),
            OptionSpec::new("socketpair").requires(&["has-socketpair"]),
        ],
    };

    #[test]
    fn test_option_builder() {
        let opt = OptionSpec::new("openat")
            .requires(&["has-openat", "supports-long-path"])
            .families(&[OsFamily::Posix])
            .after(&[Prerequisite::OneOf("open", &["open"])])
            .imports(&[DeclarationImport::FcntlH]);

        assert_eq!(opt.requires.len(), 2);
        assert!(opt.allows_family(OsFamily::Posix));
        assert!(!opt.allows_family(OsFamily::Win32));
        assert_eq!(opt.symbol_names(), vec!["USE_openat"]);
    }

    #[test]
    fn test_symbol_names() {
        assert_eq!(
            OptionSpec::new("stat64").exports(&["USE_stat"]).symbol_names(),
            vec!["USE_stat"]
        );
        assert!(OptionSpec::new("itimer_virtual").silent().symbol_names().is_empty());
        assert!(OptionSpec::new("x").allows_family(OsFamily::Generic));
    }

    #[test]
    fn test_rank_and_lookup() {
        assert_eq!(PIPE.rank("pipe"), Some(0));
        assert_eq!(PIPE.rank("socketpair"), Some(1));
        assert_eq!(PIPE.rank("fifo"), None);
        assert!(PIPE.option("socketpair").is_some());
    }

    #[test]
    fn test_prerequisite_evaluation() {
        let mut table = SelectionTable::new();
        table.insert(
            "open",
            Selection::Chosen {
                option: "open",
                origin: Origin::Capabilities,
            },
        );
        table.insert("pty-interface", Selection::Unavailable);

        assert!(Prerequisite::Selected("open").holds(&table));
        assert!(Prerequisite::OneOf("open", &["open"]).holds(&table));
        assert!(!Prerequisite::OneOf("open", &["openat"]).holds(&table));
        assert!(!Prerequisite::Selected("pty-interface").holds(&table));
        assert!(Prerequisite::NoneOf("pty-interface", &["openpty"]).holds(&table));
        // Not yet resolved counts as unavailable.
        assert!(!Prerequisite::Selected("stat").holds(&table));

        let any = Prerequisite::AnyOf(&[
            Prerequisite::Selected("stat"),
            Prerequisite::Selected("open"),
        ]);
        assert!(any.holds(&table));
        assert_eq!(any.facilities(), vec!["stat", "open"]);
    }

    #[test]
    fn test_prerequisite_display() {
        assert_eq!(
            Prerequisite::OneOf("select-multiplexing", &["poll", "select"]).to_string(),
            "select-multiplexing is poll | select"
        );
    }
}
