//! CapyStore - App store browser
//!
//! Loads the app catalog once per run, shows it as a category tree with a
//! featured page, opens app details with images loaded in the background,
//! and installs apps through an external helper.

mod config;
mod event_bus;
mod functions;
mod panels;
mod services;

use capy_catalog::{JsonPreferences, PreferenceStore, paths};
use clap::{Parser, Subcommand};
use config::StoreConfig;
use log::{error, info, warn};
use panels::browser::Browser;
use panels::events;
use services::images::{ImageLoader, Selection};
use services::install::{CommandInstaller, install_app};
use std::error::Error;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// How long `show` waits for background images.
const IMAGE_WAIT: Duration = Duration::from_secs(10);

#[derive(Parser, Debug)]
#[command(name = "capy-store")]
#[command(about = "Browse and install apps from the store catalog")]
struct Args {
    /// Config file (defaults to the XDG config location)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Platform used for the compatibility filter
    #[arg(long)]
    platform: Option<String>,

    /// Show apps for every platform
    #[arg(long)]
    all: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the category tree
    List,
    /// Show one app's details
    Show { id: String },
    /// Install or upgrade an app
    Install { id: String },
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let config_path = args.config.clone().unwrap_or_else(paths::config_path);
    let mut config = StoreConfig::load(&config_path);
    if !config_path.exists() {
        // Leave an editable copy of the defaults behind.
        if let Err(e) = config.save(&config_path) {
            warn!("Failed to write default config {}: {}", config_path.display(), e);
        }
    }
    if let Some(platform) = args.platform {
        config.platform = Some(platform);
    }

    info!("Starting CapyStore for {}", config.platform());

    let loader = services::catalog::loader_for(&config);
    let loaded = match services::catalog::load(&loader, &config, args.all) {
        Ok(loaded) => loaded,
        Err(e) => {
            error!("Load error: {}", e);
            return Err(e.into());
        }
    };

    let prefs: Arc<dyn PreferenceStore> = Arc::new(JsonPreferences::open(config.preferences_path())?);
    let selection = Arc::new(Selection::new());
    let mut browser = Browser::new(loaded, selection.clone(), prefs.clone(), config.self_package.clone());

    match args.command.unwrap_or(Command::List) {
        Command::List => {
            println!(
                "{} apps in {} categories for {}, {} featured\n",
                browser.catalog().len(),
                browser.tree().categories().len(),
                config.platform(),
                browser.featured().len()
            );
            print!("{}", browser.render_sidebar());
        }
        Command::Show { id } => {
            let images = ImageLoader::new(config.image_cache_dir(), selection, events::sender().clone());
            show(&mut browser, &images, &id)?;
        }
        Command::Install { id } => {
            install(&mut browser, prefs.as_ref(), &config, &id, args.all)?;
        }
    }

    Ok(())
}

/// Print a detail page, then reprint it as background images arrive.
fn show(browser: &mut Browser, images: &ImageLoader, id: &str) -> Result<(), Box<dyn Error>> {
    let mut rx = events::subscribe();
    let requests = browser.select(id);
    let Some(detail) = browser.detail() else {
        return Err(format!("No app {} in the catalog", id).into());
    };
    println!("{}", detail.render());

    let mut pending = requests.len();
    for request in requests {
        images.request(request);
    }

    let started = Instant::now();
    while pending > 0 && started.elapsed() < IMAGE_WAIT {
        std::thread::sleep(Duration::from_millis(event_bus::EVENT_POLL_INTERVAL_MS));
        let mut changed = false;
        for event in event_bus::drain(&mut rx) {
            if browser.on_event(&event) {
                pending -= 1;
                changed = true;
            }
        }
        if changed {
            if let Some(detail) = browser.detail() {
                println!("\n{}", detail.render());
            }
        }
    }

    Ok(())
}

fn install(
    browser: &mut Browser,
    prefs: &dyn PreferenceStore,
    config: &StoreConfig,
    id: &str,
    all_platforms: bool,
) -> Result<(), Box<dyn Error>> {
    browser.select(id);
    let Some(detail) = browser.detail() else {
        return Err(format!("No app {} in the catalog", id).into());
    };
    let Some(app) = browser.installable().cloned() else {
        println!("{} is already {}", detail.name, detail.install.label().to_lowercase());
        return Ok(());
    };

    println!("Please wait while {} is installed...", app.name);
    let mut rx = events::subscribe();
    browser.begin_install();
    let installer = CommandInstaller::new(config.installer.clone());
    let result = install_app(&installer, prefs, &app);
    for event in event_bus::drain(&mut rx) {
        browser.on_event(&event);
    }
    if result.is_ok() {
        refresh(browser, config, all_platforms);
    }

    if let Some(detail) = browser.detail() {
        println!("{}", detail.render());
    }

    match result {
        Ok(()) => {
            println!("App was installed successfully :)");
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}

/// Reload the catalog in place, keeping the current selection if it survives.
fn refresh(browser: &mut Browser, config: &StoreConfig, all_platforms: bool) {
    let loader = services::catalog::loader_for(config);
    match services::catalog::load(&loader, config, all_platforms) {
        Ok(loaded) => {
            browser.replace_catalog(loaded);
        }
        Err(e) => warn!("Failed to refresh catalog: {}", e),
    }
}
