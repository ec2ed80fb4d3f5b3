//! Store browser: sidebar tree, featured page and the selected app.

use crate::panels::detail::{AppDetail, InstallPhase};
use crate::panels::events::StoreEvent;
use crate::services::catalog::LoadedCatalog;
use crate::services::images::{ImageRequest, Selection};
use capy_catalog::{
    AppRecord, Catalog, CategoryTree, FEATURED_NODE, FeaturedCard, PreferenceStore, ROOT_NODE,
};
use log::debug;
use std::fmt::Write;
use std::sync::Arc;

/// What the main area shows.
#[derive(Clone, Debug, PartialEq)]
pub enum Page {
    Featured,
    App(AppDetail),
}

pub struct Browser {
    catalog: Arc<Catalog>,
    tree: CategoryTree,
    featured: Vec<FeaturedCard>,
    selection: Arc<Selection>,
    prefs: Arc<dyn PreferenceStore>,
    self_package: String,
    page: Page,
}

impl Browser {
    pub fn new(
        loaded: LoadedCatalog,
        selection: Arc<Selection>,
        prefs: Arc<dyn PreferenceStore>,
        self_package: impl Into<String>,
    ) -> Self {
        let tree = CategoryTree::build(&loaded.catalog);
        Self {
            catalog: loaded.catalog,
            tree,
            featured: loaded.featured,
            selection,
            prefs,
            self_package: self_package.into(),
            page: Page::Featured,
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn tree(&self) -> &CategoryTree {
        &self.tree
    }

    pub fn featured(&self) -> &[FeaturedCard] {
        &self.featured
    }

    pub fn page(&self) -> &Page {
        &self.page
    }

    pub fn detail(&self) -> Option<&AppDetail> {
        match self.page() {
            Page::App(detail) => Some(detail),
            Page::Featured => None,
        }
    }

    /// Swap in a freshly loaded catalog. The selected app stays selected if
    /// it still exists, otherwise the featured page is shown.
    pub fn replace_catalog(&mut self, loaded: LoadedCatalog) -> Vec<ImageRequest> {
        self.tree = CategoryTree::build(&loaded.catalog);
        self.catalog = loaded.catalog;
        self.featured = loaded.featured;

        match self.detail().map(|d| d.app_id.clone()) {
            Some(id) if self.catalog.contains(&id) => self.select(&id),
            Some(_) => {
                self.show_featured();
                Vec::new()
            }
            None => Vec::new(),
        }
    }

    /// Handle a tree click. Categories only expand, `featured` shows the
    /// landing page and app IDs open the detail page.
    pub fn select(&mut self, node: &str) -> Vec<ImageRequest> {
        if node == FEATURED_NODE {
            self.show_featured();
            return Vec::new();
        }
        if self.tree.is_branch(node) {
            return Vec::new();
        }

        let Some(app) = self.catalog.get(node) else {
            return Vec::new();
        };

        let generation = self.selection.select(&app.id);
        let detail = AppDetail::load(app, generation, self.prefs.as_ref(), &self.self_package);
        let requests = detail.image_requests(app);
        self.page = Page::App(detail);
        requests
    }

    fn show_featured(&mut self) {
        self.selection.clear();
        self.page = Page::Featured;
    }

    /// Apply a bus event. Returns whether the view changed.
    pub fn on_event(&mut self, event: &StoreEvent) -> bool {
        match event {
            StoreEvent::Image(loaded) => match &mut self.page {
                Page::App(detail) => detail.apply_image(loaded),
                Page::Featured => false,
            },
            StoreEvent::InstallFinished { app_id, success } => {
                debug!("Install of {} finished, success: {}", app_id, success);
                if self.detail().is_some_and(|d| d.app_id == *app_id) {
                    self.finish_install();
                    true
                } else {
                    false
                }
            }
        }
    }

    /// The selected app, if its install button can be pressed.
    pub fn installable(&self) -> Option<&AppRecord> {
        let detail = self.detail()?;
        if !detail.install.enabled() {
            return None;
        }
        self.catalog.get(&detail.app_id)
    }

    /// Mark the selected app as installing.
    pub fn begin_install(&mut self) {
        if let Page::App(detail) = &mut self.page {
            detail.install = InstallPhase::Installing;
        }
    }

    /// Leave the installing state; the button reflects whatever the store
    /// now records, so a failed install falls back to the previous state.
    pub fn finish_install(&mut self) {
        if let Page::App(detail) = &mut self.page {
            if let Some(app) = self.catalog.get(&detail.app_id) {
                detail.refresh_install(app, self.prefs.as_ref(), &self.self_package);
            }
        }
    }

    /// Sidebar tree as indented text, categories expanded.
    pub fn render_sidebar(&self) -> String {
        let mut out = String::new();
        for node in self.tree.children(ROOT_NODE) {
            let _ = writeln!(out, "{}", self.tree.title(node, &self.catalog));
            if node == FEATURED_NODE {
                for card in &self.featured {
                    let name = self.tree.title(card.app_id(), &self.catalog);
                    let _ = writeln!(out, "  ★ {} ({})", name, card.app_id());
                }
                continue;
            }
            for id in self.tree.children(node) {
                let _ = writeln!(out, "  {} ({})", self.tree.title(id, &self.catalog), id);
            }
        }
        out
    }
}
