//! Category tree for the navigation sidebar.
//!
//! Node IDs are plain strings: the root is `""`, its children are the
//! synthetic `"featured"` entry followed by the category names, and each
//! category lists the IDs of its apps.

use crate::catalog::Catalog;

use std::collections::HashMap;

pub const ROOT_NODE: &str = "";
pub const FEATURED_NODE: &str = "featured";

/// Category -> app IDs, plus the root listing.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CategoryTree {
    nodes: HashMap<String, Vec<String>>,
}

impl CategoryTree {
    /// Group a catalog by category.
    ///
    /// Apps inside a category are ordered by case-insensitive name, while
    /// the categories themselves use plain byte order. Apps without a
    /// category are left out of the tree.
    pub fn build(catalog: &Catalog) -> Self {
        let mut nodes: HashMap<String, Vec<String>> = HashMap::new();

        // Display order first, so grouping inherits it.
        for app in &catalog.order_for_display() {
            if app.category.is_empty() {
                continue;
            }
            nodes
                .entry(app.category.clone())
                .or_default()
                .push(app.id.clone());
        }

        let mut categories: Vec<String> = nodes.keys().cloned().collect();
        categories.sort();

        let mut root = Vec::with_capacity(categories.len() + 1);
        root.push(FEATURED_NODE.to_string());
        root.extend(categories);
        nodes.insert(ROOT_NODE.to_string(), root);

        Self { nodes }
    }

    /// Child node IDs. Leaves have none.
    pub fn children(&self, node: &str) -> &[String] {
        self.nodes.get(node).map(Vec::as_slice).unwrap_or_default()
    }

    /// Real categories, without the featured entry.
    pub fn categories(&self) -> &[String] {
        self.children(ROOT_NODE).get(1..).unwrap_or_default()
    }

    /// Whether the node can be expanded.
    pub fn is_branch(&self, node: &str) -> bool {
        if node == ROOT_NODE {
            return true;
        }
        if node == FEATURED_NODE {
            return false;
        }

        self.categories().iter().any(|cat| cat == node)
    }

    /// Label shown for a node.
    pub fn title(&self, node: &str, catalog: &Catalog) -> String {
        if node == FEATURED_NODE {
            return "Featured".to_string();
        }
        if self.is_branch(node) {
            return capitalize(node);
        }

        catalog
            .get(node)
            .map(|app| app.name.clone())
            .unwrap_or_default()
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
