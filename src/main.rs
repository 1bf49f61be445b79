use std::path::PathBuf;

use honeycomb::logging;
use honeycomb::settings;
use tracing::info;

mod app;

fn main() -> eframe::Result<()> {
    let settings_path = settings::config_path().unwrap_or_else(|| PathBuf::from("settings.toml"));
    let loaded = settings::load_settings(&settings_path);
    let found = loaded.is_some();
    let settings = loaded.unwrap_or_default();
    logging::init(&settings.log_filter);
    if found {
        info!(path = %settings_path.display(), "loaded settings");
    } else {
        info!(path = %settings_path.display(), "no settings file, using defaults");
    }

    let native_options = eframe::NativeOptions::default();
    eframe::run_native(
        "Honeycomb",
        native_options,
        Box::new(move |cc| Ok(Box::new(app::HoneycombApp::new(cc, settings, settings_path)))),
    )
}
