mod domain;
mod infrastructure;
mod presentation;

use domain::settings::SettingsService;
use eframe::egui;
use infrastructure::bluetooth::{platform_advertiser, AdvertiserHandle};
use infrastructure::logging;
use presentation::app::BeaconApp;

fn main() -> anyhow::Result<()> {
    let mut settings = SettingsService::new()?;

    let logging_guard = logging::init_logger(&settings.get().log_settings)
        .map_err(|e| eprintln!("Failed to initialize logging: {}", e))
        .ok();

    tracing::info!("Starting BLE Beacon Broadcaster");
    tracing::debug!("Settings file: {}", settings.path().display());

    if let Err(e) = settings.seed_default_preset() {
        tracing::warn!("Could not persist the default preset: {}", e);
    }
    tracing::info!("Loaded {} preset(s)", settings.presets().len());

    let advertiser = platform_advertiser();
    tracing::info!("Using the {} advertiser", advertiser.name());
    let advertiser = AdvertiserHandle::spawn(advertiser)?;

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([720.0, 680.0])
            .with_title("BLE Beacon Broadcaster"),
        ..Default::default()
    };

    eframe::run_native(
        "BLE Beacon Broadcaster",
        options,
        Box::new(move |cc| {
            Ok(Box::new(BeaconApp::new(
                cc,
                settings,
                advertiser,
                logging_guard,
            )))
        }),
    )
    .map_err(|e| anyhow::anyhow!("UI error: {}", e))?;

    tracing::info!("Shut down");
    Ok(())
}
