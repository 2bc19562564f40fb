//! Menu visibility resolution.
//!
//! An item is visible iff it has no requirement or the actor can `view` the
//! required fragment. Category visibility is always derived from its members.

use serde::Serialize;
use tracing::trace;

use campus_auth::{Action, CapabilitySet, has_capability};

use crate::item::{MenuCategory, MenuItem};

/// A category with the entries visible in it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MenuSection<'a> {
    pub category: MenuCategory,
    pub items: Vec<&'a MenuItem>,
}

/// A blank `requires` counts as no requirement.
fn is_visible(item: &MenuItem, capabilities: &CapabilitySet) -> bool {
    match item.requires.as_deref().filter(|f| !f.trim().is_empty()) {
        None => true,
        Some(fragment) => has_capability(capabilities, fragment, Action::View),
    }
}

/// Visible entries, in input order. Duplicates are kept.
pub fn filter<'a>(items: &'a [MenuItem], capabilities: &CapabilitySet) -> Vec<&'a MenuItem> {
    let visible: Vec<&MenuItem> = items.iter().filter(|i| is_visible(i, capabilities)).collect();
    trace!(total = items.len(), visible = visible.len(), "menu filtered");
    visible
}

pub fn is_category_visible(items: &[MenuItem], capabilities: &CapabilitySet, category: MenuCategory) -> bool {
    items
        .iter()
        .any(|i| i.category == category && is_visible(i, capabilities))
}

/// Categories with at least one visible entry, in order of first appearance.
pub fn visible_categories(items: &[MenuItem], capabilities: &CapabilitySet) -> Vec<MenuCategory> {
    let mut out: Vec<MenuCategory> = Vec::new();
    for item in filter(items, capabilities) {
        if !out.contains(&item.category) {
            out.push(item.category);
        }
    }
    out
}

/// Visible entries grouped under their categories. Sections follow
/// [`visible_categories`]; entries keep their input order.
pub fn sections<'a>(items: &'a [MenuItem], capabilities: &CapabilitySet) -> Vec<MenuSection<'a>> {
    let visible = filter(items, capabilities);
    let mut out: Vec<MenuSection<'a>> = Vec::new();
    for item in visible {
        match out.iter_mut().find(|s| s.category == item.category) {
            Some(section) => section.items.push(item),
            None => out.push(MenuSection {
                category: item.category,
                items: vec![item],
            }),
        }
    }
    out
}
