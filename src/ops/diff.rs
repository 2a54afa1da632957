//! Compare two profiles.

use serde::Serialize;

use crate::core::facility::FacilityId;
use crate::core::import::DeclarationImport;
use crate::core::profile::PlatformProfile;
use crate::core::selection::Selection;

/// A facility whose selection differs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelectionChange {
    pub facility: FacilityId,
    pub left: Option<Selection>,
    pub right: Option<Selection>,
}

/// A binding whose value differs or that exists on one side only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BindingChange {
    pub name: String,
    pub left: Option<String>,
    pub right: Option<String>,
}

/// Differences between two profiles.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProfileDiff {
    pub selections: Vec<SelectionChange>,
    pub imports_added: Vec<DeclarationImport>,
    pub imports_removed: Vec<DeclarationImport>,
    pub bindings: Vec<BindingChange>,
}

impl ProfileDiff {
    pub fn is_empty(&self) -> bool {
        self.selections.is_empty()
            && self.imports_added.is_empty()
            && self.imports_removed.is_empty()
            && self.bindings.is_empty()
    }
}

/// Compare `left` to `right`. Added and removed are from `left`'s point of view.
pub fn diff_profiles(left: &PlatformProfile, right: &PlatformProfile) -> ProfileDiff {
    let mut selections = Vec::new();
    for (facility, l) in left.selections.iter() {
        let r = right.selections.get(facility);
        if r != Some(l) {
            selections.push(SelectionChange {
                facility,
                left: Some(*l),
                right: r.copied(),
            });
        }
    }
    for (facility, r) in right.selections.iter() {
        if left.selections.get(facility).is_none() {
            selections.push(SelectionChange {
                facility,
                left: None,
                right: Some(*r),
            });
        }
    }

    let mut bindings = Vec::new();
    for binding in left.bindings.iter() {
        let l = binding.value.to_string();
        let r = right.bindings.get(&binding.name).map(|v| v.to_string());
        if r.as_ref() != Some(&l) {
            bindings.push(BindingChange {
                name: binding.name.clone(),
                left: Some(l),
                right: r,
            });
        }
    }
    for binding in right.bindings.iter() {
        if !left.bindings.contains(&binding.name) {
            bindings.push(BindingChange {
                name: binding.name.clone(),
                left: None,
                right: Some(binding.value.to_string()),
            });
        }
    }

    ProfileDiff {
        selections,
        imports_added: right.imports.difference(&left.imports),
        imports_removed: left.imports.difference(&right.imports),
        bindings,
    }
}

/// Format a diff for the terminal.
pub fn format_diff(diff: &ProfileDiff) -> String {
    if diff.is_empty() {
        return "profiles are identical\n".to_string();
    }

    let mut out = String::new();

    if !diff.selections.is_empty() {
        out.push_str("selections:\n");
        for change in &diff.selections {
            out.push_str(&format!(
                "  {:<28} {} -> {}\n",
                change.facility,
                label(change.left.as_ref()),
                label(change.right.as_ref())
            ));
        }
    }

    if !diff.imports_added.is_empty() || !diff.imports_removed.is_empty() {
        out.push_str("imports:\n");
        for import in &diff.imports_removed {
            out.push_str(&format!("  - {}\n", import));
        }
        for import in &diff.imports_added {
            out.push_str(&format!("  + {}\n", import));
        }
    }

    if !diff.bindings.is_empty() {
        out.push_str("bindings:\n");
        for change in &diff.bindings {
            out.push_str(&format!(
                "  {:<28} {} -> {}\n",
                change.name,
                change.left.as_deref().unwrap_or("(none)"),
                change.right.as_deref().unwrap_or("(none)")
            ));
        }
    }

    out
}

fn label(selection: Option<&Selection>) -> &'static str {
    selection.map_or("(absent)", Selection::label)
}
