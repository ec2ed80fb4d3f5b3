//! App installation through an external helper.
//!
//! The helper (by default `fyne get`) does the actual work. We hand it the
//! package path, the app ID and a downloaded copy of the icon, and record the
//! installed version once it reports success.

use crate::config::InstallerConfig;
use crate::panels::events::{self, StoreEvent};
use crate::services::images::fetch_bytes;
use capy_catalog::{AppRecord, PreferenceError, PreferenceStore, mark_installed};
use log::{error, info, warn};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Install failures. Reported to the user; catalog state is left as is.
#[derive(Debug, thiserror::Error)]
pub enum InstallError {
    #[error("{0} has no package to install")]
    NoPackage(String),

    #[error("Failed to start installer {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Installer exited with {0}")]
    Failed(std::process::ExitStatus),

    #[error("Installed, but recording it failed: {0}")]
    Record(#[from] PreferenceError),
}

/// Performs the actual install of a package.
pub trait Installer {
    fn install(&self, package: &str, app_id: &str, icon: Option<&Path>) -> Result<(), InstallError>;
}

/// Runs a configured command line.
///
/// `{package}` and `{id}` are substituted in `args`; `icon_args` are
/// appended (with `{icon}` substituted) only when an icon was downloaded.
#[derive(Clone, Debug)]
pub struct CommandInstaller {
    config: InstallerConfig,
}

impl CommandInstaller {
    pub fn new(config: InstallerConfig) -> Self {
        Self { config }
    }

    /// Arguments for one install.
    pub fn command_args(&self, package: &str, app_id: &str, icon: Option<&Path>) -> Vec<String> {
        let substitute = |arg: &String| arg.replace("{package}", package).replace("{id}", app_id);

        // Icon flags go before the package argument.
        let split = self
            .config
            .args
            .iter()
            .position(|arg| arg.contains("{package}"))
            .unwrap_or(self.config.args.len());
        let (head, tail) = self.config.args.split_at(split);

        let mut args: Vec<String> = head.iter().map(substitute).collect();
        if let Some(icon) = icon {
            let icon = icon.to_string_lossy();
            args.extend(
                self.config
                    .icon_args
                    .iter()
                    .map(|arg| substitute(arg).replace("{icon}", &icon)),
            );
        }
        args.extend(tail.iter().map(substitute));
        args
    }
}

impl Installer for CommandInstaller {
    fn install(&self, package: &str, app_id: &str, icon: Option<&Path>) -> Result<(), InstallError> {
        let args = self.command_args(package, app_id, icon);
        info!("Running {} {}", self.config.program, args.join(" "));

        let status = Command::new(&self.config.program)
            .args(&args)
            .status()
            .map_err(|source| InstallError::Spawn {
                program: self.config.program.clone(),
                source,
            })?;

        if status.success() {
            Ok(())
        } else {
            Err(InstallError::Failed(status))
        }
    }
}

/// Download the app icon to a temporary file for the installer.
/// Failures are logged and the install goes ahead without an icon.
pub fn download_icon(app: &AppRecord) -> Option<PathBuf> {
    if app.icon.is_empty() {
        return None;
    }

    let data = match fetch_bytes(&app.icon) {
        Ok(data) => data,
        Err(e) => {
            warn!("Failed to access icon url {}: {}", app.icon, e);
            return None;
        }
    };

    let tmp = std::env::temp_dir().join(format!("capystore-icon-{}.png", app.id));
    if let Err(e) = fs::write(&tmp, data) {
        warn!("Failed to write icon to {}: {}", tmp.display(), e);
        return None;
    }

    Some(tmp)
}

/// Install an app and record its version.
///
/// The temporary icon is removed on every path.
pub fn install_app(
    installer: &dyn Installer,
    store: &dyn PreferenceStore,
    app: &AppRecord,
) -> Result<(), InstallError> {
    if app.source.package.is_empty() {
        return Err(InstallError::NoPackage(app.id.clone()));
    }

    let icon = download_icon(app);
    let result = installer
        .install(&app.source.package, &app.id, icon.as_deref())
        .and_then(|_| Ok(mark_installed(store, app)?));

    if let Some(icon) = icon {
        let _ = fs::remove_file(icon);
    }

    match &result {
        Ok(()) => info!("Installed {} {}", app.id, app.effective_version()),
        Err(e) => error!("Install of {} failed: {}", app.id, e),
    }
    events::send(StoreEvent::InstallFinished {
        app_id: app.id.clone(),
        success: result.is_ok(),
    });

    result
}
