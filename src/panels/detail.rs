//! App detail view model.
//!
//! Holds what the detail page shows for the selected app: text fields,
//! icon and screenshot slots, and the install button.

use crate::functions::formatting::{format_release_date, website_link};
use crate::services::images::{ImageLoaded, ImageRequest, ImageSlot};
use capy_catalog::{AppRecord, InstallState, PreferenceStore, is_installed};
use std::fmt::Write;
use std::path::PathBuf;
use url::Url;

/// Screenshots shown per app.
pub const SCREENSHOT_SLOTS: usize = 5;

/// State of one image slot.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ImageState {
    /// Nothing to show (no URL).
    Empty,
    Loading,
    Ready(PathBuf),
    /// The load failed; a warning icon is shown instead.
    Placeholder,
}

/// Install progress as shown on the button.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InstallPhase {
    NotInstalled,
    Installing,
    Installed,
    UpgradeAvailable,
}

impl From<InstallState> for InstallPhase {
    fn from(state: InstallState) -> Self {
        match state {
            InstallState::NotInstalled => InstallPhase::NotInstalled,
            InstallState::Installed => InstallPhase::Installed,
            InstallState::UpgradeAvailable => InstallPhase::UpgradeAvailable,
        }
    }
}

impl InstallPhase {
    /// Button label.
    pub fn label(self) -> &'static str {
        match self {
            InstallPhase::NotInstalled => "Install",
            InstallPhase::Installing => "Installing…",
            InstallPhase::Installed => "Installed",
            InstallPhase::UpgradeAvailable => "Upgrade",
        }
    }

    /// Whether the button can be pressed.
    pub fn enabled(self) -> bool {
        matches!(
            self,
            InstallPhase::NotInstalled | InstallPhase::UpgradeAvailable
        )
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct AppDetail {
    pub app_id: String,
    pub generation: u64,
    pub name: String,
    pub developer: String,
    pub version: String,
    pub date: String,
    pub summary: String,
    /// Link label and target. None when the website is not a usable URL.
    pub website: Option<(String, Url)>,
    pub icon: ImageState,
    pub screenshots: Vec<ImageState>,
    pub install: InstallPhase,
}

impl AppDetail {
    /// Build the detail for `app`, shown under selection `generation`.
    /// Image slots start out loading; see [`AppDetail::image_requests`].
    pub fn load(
        app: &AppRecord,
        generation: u64,
        store: &dyn PreferenceStore,
        self_package: &str,
    ) -> Self {
        let slot_state = |url: &str| {
            if url.is_empty() {
                ImageState::Empty
            } else {
                ImageState::Loading
            }
        };

        Self {
            app_id: app.id.clone(),
            generation,
            name: app.name.clone(),
            developer: app.developer.clone(),
            version: app.version.clone(),
            date: format_release_date(app.release_date),
            summary: app.summary.clone(),
            website: website_link(&app.website),
            icon: slot_state(&app.icon),
            screenshots: app
                .screenshots
                .iter()
                .take(SCREENSHOT_SLOTS)
                .map(|shot| slot_state(&shot.image))
                .collect(),
            install: install_phase(app, store, self_package),
        }
    }

    /// Image loads needed to fill the slots.
    pub fn image_requests(&self, app: &AppRecord) -> Vec<ImageRequest> {
        let request = |slot, url: &str| ImageRequest {
            app_id: self.app_id.clone(),
            generation: self.generation,
            slot,
            url: url.to_string(),
        };

        std::iter::once(request(ImageSlot::Icon, &app.icon))
            .chain(
                app.screenshots
                    .iter()
                    .take(SCREENSHOT_SLOTS)
                    .enumerate()
                    .map(|(i, shot)| request(ImageSlot::Screenshot(i), &shot.image)),
            )
            .filter(|req| !req.url.is_empty())
            .collect()
    }

    /// Apply a finished image load. Results for another app or an older
    /// selection are ignored; returns whether anything changed.
    pub fn apply_image(&mut self, loaded: &ImageLoaded) -> bool {
        if loaded.app_id != self.app_id || loaded.generation != self.generation {
            return false;
        }

        let state = match &loaded.result {
            Ok(path) => ImageState::Ready(path.clone()),
            Err(_) => ImageState::Placeholder,
        };

        let slot = match loaded.slot {
            ImageSlot::Icon => &mut self.icon,
            ImageSlot::Screenshot(i) => match self.screenshots.get_mut(i) {
                Some(slot) => slot,
                None => return false,
            },
        };
        *slot = state;
        true
    }

    /// Re-read the install state, e.g. after an install attempt.
    pub fn refresh_install(&mut self, app: &AppRecord, store: &dyn PreferenceStore, self_package: &str) {
        self.install = install_phase(app, store, self_package);
    }

    /// Plain-text rendering.
    pub fn render(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "Name:      {}", self.name);
        let _ = writeln!(out, "Developer: {}", self.developer);
        match &self.website {
            Some((host, url)) => {
                let _ = writeln!(out, "Website:   {} <{}>", host, url);
            }
            None => {
                let _ = writeln!(out, "Website:");
            }
        }
        let _ = writeln!(out, "Summary:   {}", self.summary);
        let _ = writeln!(out, "Date:      {}    Version: {}", self.date, self.version);
        let _ = writeln!(out, "Icon:      {}", describe(&self.icon));
        for (i, shot) in self.screenshots.iter().enumerate() {
            let _ = writeln!(out, "Screen {}:  {}", i + 1, describe(shot));
        }
        let _ = write!(
            out,
            "[ {} ]{}",
            self.install.label(),
            if self.install.enabled() { "" } else { " (disabled)" }
        );
        out
    }
}

fn install_phase(app: &AppRecord, store: &dyn PreferenceStore, self_package: &str) -> InstallPhase {
    if !self_package.is_empty() && app.source.package == self_package {
        return InstallPhase::Installed;
    }
    is_installed(store, app).into()
}

fn describe(state: &ImageState) -> String {
    match state {
        ImageState::Empty => "-".to_string(),
        ImageState::Loading => "loading…".to_string(),
        ImageState::Ready(path) => path.display().to_string(),
        ImageState::Placeholder => "⚠ unavailable".to_string(),
    }
}
