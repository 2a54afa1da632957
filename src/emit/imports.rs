//! Declaration-import aggregation.

use crate::catalog::Catalog;
use crate::core::import::ImportSet;
use crate::core::selection::SelectionTable;

/// Union of the imports every chosen option needs.
///
/// The classification facility contributes the family-wide imports (the
/// Win32 option pulls in `windows.h` and friends), so they need no special
/// case here. Facilities the catalogue does not know are skipped.
pub fn aggregate_imports(catalog: &Catalog, selections: &SelectionTable) -> ImportSet {
    let mut imports = ImportSet::new();

    for (facility, selection) in selections.iter() {
        let Some(option) = selection.option() else {
            continue;
        };
        match catalog.get(facility).and_then(|f| f.option(option)) {
            Some(spec) => imports.extend(spec.imports.iter().copied()),
            None => tracing::debug!("no declaration for {}={}", facility, option),
        }
    }

    imports
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::import::DeclarationImport;
    use crate::core::selection::{Origin, Selection};

    fn chosen(option: &'static str) -> Selection {
        Selection::Chosen {
            option,
            origin: Origin::Capabilities,
        }
    }

    fn table(entries: &[(&'static str, &'static str)]) -> SelectionTable {
        let mut table = SelectionTable::new();
        for &(facility, option) in entries {
            table.insert(facility, chosen(option));
        }
        table
    }

    #[test]
    fn test_shared_headers_appear_once() {
        let catalog = Catalog::builtin().unwrap();
        let imports = aggregate_imports(&catalog, &table(&[("open", "openat"), ("stat", "fstatat")]));

        let headers: Vec<&str> = imports.iter().map(|i| i.header()).collect();
        assert_eq!(headers, ["unistd.h", "sys/types.h", "sys/stat.h", "fcntl.h"]);
        assert!(imports.contains(DeclarationImport::FcntlH));
    }

    #[test]
    fn test_aggregation_is_idempotent() {
        let catalog = Catalog::builtin().unwrap();
        let selections = table(&[("sleep", "nanosleep"), ("realtime-clock", "clock_gettime_realtime")]);

        let once = aggregate_imports(&catalog, &selections);
        let twice = once.union(&aggregate_imports(&catalog, &selections));
        assert_eq!(once, twice);
        // Both options need time.h; it is listed once.
        assert_eq!(once.len(), 1);
    }

    #[test]
    fn test_aggregation_is_commutative() {
        let catalog = Catalog::builtin().unwrap();
        let entries = [
            ("dynamic-loader", "dlopen"),
            ("process-time", "getrusage"),
            ("sleep", "sleep"),
            ("pty-interface", "openpty"),
        ];

        let forward = aggregate_imports(&catalog, &table(&entries));

        let mut reversed = entries;
        reversed.reverse();
        assert_eq!(forward, aggregate_imports(&catalog, &table(&reversed)));

        // Rotations too.
        for shift in 1..entries.len() {
            let mut rotated = entries;
            rotated.rotate_left(shift);
            assert_eq!(forward, aggregate_imports(&catalog, &table(&rotated)));
        }
    }

    #[test]
    fn test_unchosen_facilities_add_nothing() {
        let catalog = Catalog::builtin().unwrap();
        let mut selections = SelectionTable::new();
        selections.insert("sleep", Selection::Unavailable);
        selections.insert("clock-gettime", Selection::Disabled { reason: "broken" });

        assert!(aggregate_imports(&catalog, &selections).is_empty());
    }
}
